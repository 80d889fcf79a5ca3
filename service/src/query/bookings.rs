//! [`Query`] collection related to the multiple [`Booking`]s.

use std::ops::Range;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{booking, Phone},
    infra::{database, Database},
    read, Query, Service,
};
#[cfg(doc)]
use crate::domain::Booking;

use super::DatabaseQuery;

/// Queries a list of [`Booking`]s.
pub type List = DatabaseQuery<
    By<read::booking::list::Page, read::booking::list::Selector>,
>;

/// [`Query`] of the [`Booking`]s made with the provided contact [`Phone`].
#[derive(Clone, Debug)]
pub struct ByPhone {
    /// Contact [`Phone`] of the [`Booking`]s.
    pub phone: Phone,

    /// Pagination arguments.
    pub arguments: read::booking::list::Arguments,
}

/// [`Query`] of the not cancelled [`Booking`]s created in the provided range.
#[derive(Clone, Debug)]
pub struct CreatedBetween {
    /// Range of [`booking::CreationDateTime`]s, exclusive at the end.
    pub range: Range<booking::CreationDateTime>,

    /// Pagination arguments.
    pub arguments: read::booking::list::Arguments,
}

impl<Db> Query<ByPhone> for Service<Db>
where
    Db: Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
        Ok = read::booking::list::Page,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ByPhone { phone, arguments }: ByPhone,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(List::by(read::booking::list::Selector {
            arguments,
            filter: read::booking::list::Filter {
                phone: Some(phone),
                ..read::booking::list::Filter::default()
            },
        }))
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<Db> Query<CreatedBetween> for Service<Db>
where
    Db: Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
        Ok = read::booking::list::Page,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        CreatedBetween { range, arguments }: CreatedBetween,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(List::by(read::booking::list::Selector {
            arguments,
            filter: read::booking::list::Filter {
                created: Some(range),
                ..read::booking::list::Filter::default()
            },
        }))
        .await
        .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::{
        command::{CancelBooking, ReserveSeat},
        domain::{booking, Phone},
        fixture,
        infra::Memory,
        read::{
            self,
            booking::list::{Meal, Status},
        },
        Command as _, Service,
    };

    use super::{ByPhone, CreatedBetween, List};

    async fn codes(
        svc: &Service<Memory>,
        status: Option<Status>,
        meal: Option<Meal>,
    ) -> Vec<booking::Code> {
        svc.execute(List::by(read::booking::list::Selector {
            arguments: read::booking::list::Arguments::default(),
            filter: read::booking::list::Filter {
                status,
                meal,
                ..read::booking::list::Filter::default()
            },
        }))
        .await
        .unwrap()
        .nodes
        .into_iter()
        .map(|b| b.code)
        .collect()
    }

    #[tokio::test]
    async fn filters_by_status_and_meal() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 10).await;

        let plain = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        let insured = svc
            .execute(ReserveSeat {
                extras: booking::Extras {
                    insurance: true,
                    veg_lunch: 2,
                    ..booking::Extras::default()
                },
                ..fixture::reserve_seat("Sea Pearl")
            })
            .await
            .unwrap();
        let guided = svc
            .execute(ReserveSeat {
                extras: booking::Extras {
                    tour_guide: true,
                    non_veg_lunch: 1,
                    ..booking::Extras::default()
                },
                ..fixture::reserve_seat("Sea Pearl")
            })
            .await
            .unwrap();
        _ = svc
            .execute(CancelBooking {
                code: guided.code.clone(),
                reason: None,
            })
            .await
            .unwrap();

        assert_eq!(codes(&svc, None, None).await.len(), 3);
        assert_eq!(codes(&svc, Some(Status::Cancelled), None).await, [
            guided.code.clone()
        ]);
        assert_eq!(codes(&svc, Some(Status::NotCancelled), None).await, [
            plain.code.clone(),
            insured.code.clone(),
        ]);
        assert_eq!(codes(&svc, Some(Status::WithInsurance), None).await, [
            insured.code.clone()
        ]);
        assert!(codes(&svc, Some(Status::WithTourGuide), None)
            .await
            .is_empty());
        assert_eq!(codes(&svc, None, Some(Meal::Both)).await, [
            insured.code.clone()
        ]);
        assert!(codes(&svc, None, Some(Meal::NonVeg)).await.is_empty());
    }

    #[tokio::test]
    async fn selects_by_phone() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 10).await;
        let other = Phone::new("9123456780").unwrap();

        _ = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        let mine = svc
            .execute(ReserveSeat {
                phone: other.clone(),
                ..fixture::reserve_seat("Sea Pearl")
            })
            .await
            .unwrap();

        let page = svc
            .execute(ByPhone {
                phone: other,
                arguments: read::booking::list::Arguments::default(),
            })
            .await
            .unwrap();
        assert_eq!(
            page.nodes.iter().map(|b| b.id).collect::<Vec<_>>(),
            [mine.id],
        );
    }

    #[tokio::test]
    async fn created_between_excludes_cancelled() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 10).await;
        let start = DateTime::now().start_of_day();

        let kept = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        let cancelled = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        _ = svc
            .execute(CancelBooking {
                code: cancelled.code,
                reason: None,
            })
            .await
            .unwrap();

        let page = svc
            .execute(CreatedBetween {
                range: start.coerce()
                    ..(start + Duration::from_secs(86_400)).coerce(),
                arguments: read::booking::list::Arguments::default(),
            })
            .await
            .unwrap();
        assert_eq!(
            page.nodes.iter().map(|b| b.id).collect::<Vec<_>>(),
            [kept.id],
        );

        let page = svc
            .execute(CreatedBetween {
                range: (start - Duration::from_secs(86_400)).coerce()
                    ..start.coerce(),
                arguments: read::booking::list::Arguments::default(),
            })
            .await
            .unwrap();
        assert!(page.nodes.is_empty());
    }
}
