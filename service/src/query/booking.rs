//! [`Query`] collection related to a single [`Booking`].

use common::operations::By;

use crate::domain::{booking, Booking};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Booking`] by its [`booking::Id`].
pub type ById = DatabaseQuery<By<Option<Booking>, booking::Id>>;

/// Queries a [`Booking`] by its [`booking::Code`].
pub type ByCode<'c> = DatabaseQuery<By<Option<Booking>, &'c booking::Code>>;

#[cfg(test)]
mod spec {
    use crate::{domain::booking, fixture, Query as _};

    use super::{ByCode, ById};

    #[tokio::test]
    async fn selects_by_id_and_code() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 2).await;
        let booked = fixture::reserve(&svc, "Sea Pearl").await.unwrap();

        let by_code =
            svc.execute(ByCode::by(&booked.code)).await.unwrap().unwrap();
        assert_eq!(by_code.id, booked.id);

        let by_id = svc.execute(ById::by(booked.id)).await.unwrap().unwrap();
        assert_eq!(by_id.code, booked.code);

        let unknown = booking::Code::generate();
        assert!(svc.execute(ByCode::by(&unknown)).await.unwrap().is_none());
    }
}
