//! [`Command`] for cancelling a [`Booking`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Boat;
use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`].
///
/// The seat reserved by the [`Booking`] is not returned to its [`Boat`].
#[derive(Clone, Debug)]
pub struct CancelBooking {
    /// [`booking::Code`] of the [`Booking`] to be cancelled.
    pub code: booking::Code,

    /// [`booking::CancellationReason`] of the cancellation, if any.
    pub reason: Option<booking::CancellationReason>,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Db: for<'c> Database<
            Select<By<Option<Booking>, &'c booking::Code>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking { code, reason } = cmd;

        let booking_id = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(&code)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::BookingNotExists(code.clone()))
            .map_err(tracerr::wrap!())?
            .id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent cancellations.
        tx.execute(Lock(By::<Booking, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(code))
            .map_err(tracerr::wrap!())?;

        if booking.is_cancelled() {
            return Err(tracerr::new!(E::AlreadyCancelled(booking.code)));
        }

        booking.cancelled_at = Some(DateTime::now().coerce());
        booking.refund_status = booking::RefundStatus::NotApplicable;
        booking.cancellation_reason = reason;

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is already cancelled.
    #[display("`Booking(code: {_0})` is already cancelled")]
    #[from(ignore)]
    AlreadyCancelled(#[error(not(source))] booking::Code),

    /// [`Booking`] doesn't exist.
    #[display("`Booking(code: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Code),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::booking::{self, CancellationReason, RefundStatus},
        fixture, Command as _,
    };

    use super::{CancelBooking, ExecutionError};

    #[tokio::test]
    async fn cancels_without_restoring_seat() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 2).await;
        let reserved = fixture::reserve(&svc, "Sea Pearl").await.unwrap();

        let cancelled = svc
            .execute(CancelBooking {
                code: reserved.code.clone(),
                reason: CancellationReason::new("Weather"),
            })
            .await
            .unwrap();
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.refund_status, RefundStatus::NotApplicable);
        assert_eq!(
            cancelled.cancellation_reason.map(|r| r.to_string()),
            Some("Weather".into()),
        );
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 1);
    }

    #[tokio::test]
    async fn rejects_second_cancellation_leaving_booking_unchanged() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 2).await;
        let reserved = fixture::reserve(&svc, "Sea Pearl").await.unwrap();

        let first = svc
            .execute(CancelBooking {
                code: reserved.code.clone(),
                reason: None,
            })
            .await
            .unwrap();

        let err = svc
            .execute(CancelBooking {
                code: reserved.code.clone(),
                reason: CancellationReason::new("Again"),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::AlreadyCancelled(c) if *c == reserved.code),
            "{err}",
        );

        let stored = fixture::booking(&svc, reserved.id).await;
        assert_eq!(stored.cancelled_at, first.cancelled_at);
        assert_eq!(stored.refund_status, RefundStatus::NotApplicable);
        assert_eq!(stored.cancellation_reason, None);
    }

    #[tokio::test]
    async fn fails_for_unknown_code() {
        let svc = fixture::service();
        let code = booking::Code::generate();

        let err = svc
            .execute(CancelBooking {
                code: code.clone(),
                reason: None,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::BookingNotExists(c) if *c == code),
            "{err}",
        );
    }
}
