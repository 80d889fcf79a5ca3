//! [`Command`] for reserving a seat on a [`Boat`].

use common::{
    operations::{By, Commit, Insert, Reserve, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{boat, booking, Boat, Booking, Phone},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for reserving a seat on a [`Boat`] and creating a new
/// [`Booking`] for it.
///
/// Both effects become visible together, or none of them does.
#[derive(Clone, Debug)]
pub struct ReserveSeat {
    /// [`boat::Name`] of the [`Boat`] to reserve a seat on.
    pub boat_name: boat::Name,

    /// Contact [`Phone`] of a new [`Booking`].
    pub phone: Phone,

    /// [`booking::JourneyDateTime`] of a new [`Booking`].
    pub journey_at: booking::JourneyDateTime,

    /// [`booking::Passengers`] of a new [`Booking`].
    pub passengers: booking::Passengers,

    /// [`booking::Extras`] of a new [`Booking`].
    pub extras: booking::Extras,

    /// [`booking::Payment`] made for a new [`Booking`].
    pub payment: booking::Payment,
}

impl<Db> Command<ReserveSeat> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'n> Database<
            Reserve<By<Option<Boat>, &'n boat::Name>>,
            Ok = Option<Boat>,
            Err = Traced<database::Error>,
        > + for<'n> Database<
            Select<By<Option<Boat>, &'n boat::Name>>,
            Ok = Option<Boat>,
            Err = Traced<database::Error>,
        > + for<'c> Database<
            Select<By<Option<Booking>, &'c booking::Code>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ReserveSeat) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReserveSeat {
            boat_name,
            phone,
            journey_at,
            passengers,
            extras,
            payment,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let reserved = tx
            .execute(Reserve(By::<Option<Boat>, _>::new(&boat_name)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if reserved.is_none() {
            // Nothing is changed, so only the failed precondition is left to
            // be found out.
            let boat = tx
                .execute(Select(By::<Option<Boat>, _>::new(&boat_name)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            return Err(tracerr::new!(match boat {
                None => E::BoatNotExists(boat_name),
                Some(b) if !b.is_active => E::BoatInactive(boat_name),
                Some(_) => E::NoCapacity(boat_name),
            }));
        }

        let attempts = self.config().booking_code_attempts;
        let mut code = None;
        for _ in 0..attempts {
            let candidate = booking::Code::generate();
            let existing = tx
                .execute(Select(By::<Option<Booking>, _>::new(&candidate)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if existing.is_none() {
                code = Some(candidate);
                break;
            }
            tracing::debug!(code = %candidate, "`booking::Code` collision");
        }
        let code = code
            .ok_or(E::CodeGenerationFailed(attempts))
            .map_err(tracerr::wrap!())?;

        let booking = Booking {
            id: booking::Id::new(),
            code,
            boat_name,
            phone,
            journey_at,
            passengers,
            extras,
            payment,
            refund_status: booking::RefundStatus::NotDisbursed,
            cancellation_reason: None,
            created_at: DateTime::now().coerce(),
            cancelled_at: None,
        };

        tx.execute(Insert(booking.clone()))
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

/// Error of [`ReserveSeat`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Boat`] doesn't accept reservations.
    #[display("`Boat(name: {_0})` is inactive")]
    #[from(ignore)]
    BoatInactive(#[error(not(source))] boat::Name),

    /// [`Boat`] doesn't exist.
    #[display("`Boat(name: {_0})` does not exist")]
    #[from(ignore)]
    BoatNotExists(#[error(not(source))] boat::Name),

    /// Unique [`booking::Code`] wasn't generated in the configured number of
    /// attempts.
    #[display("Failed to generate unique `booking::Code` in {_0} attempts")]
    #[from(ignore)]
    CodeGenerationFailed(#[error(not(source))] u8),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Boat`] has no available seats.
    #[display("`Boat(name: {_0})` has no available seats")]
    #[from(ignore)]
    NoCapacity(#[error(not(source))] boat::Name),
}

#[cfg(test)]
mod spec {
    use futures::future;

    use crate::{command::UpdateBoatActivity, fixture, read, Command as _};

    use super::ExecutionError;

    #[tokio::test]
    async fn sells_out_sea_pearl() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 2).await;

        let a = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 1);
        assert!(!a.is_cancelled());
        assert_eq!(a.boat_name, boat.name);

        let b = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 0);
        assert_ne!(a.code, b.code);

        let err = fixture::reserve(&svc, "Sea Pearl").await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::NoCapacity(_)),
            "{err}",
        );
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 0);

        let ledger =
            fixture::bookings(&svc, read::booking::list::Filter::default())
                .await;
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_reservations_of_last_seat() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 1).await;

        let results = future::join_all(
            (0..8).map(|_| fixture::reserve(&svc, "Sea Pearl")),
        )
        .await;

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(e) if matches!(e.as_ref(), ExecutionError::NoCapacity(_)),
                )
            })
            .count();
        assert_eq!(succeeded, 1);
        assert_eq!(rejected, 7);
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 0);
    }

    #[tokio::test]
    async fn never_oversells_capacity() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 5).await;

        let results = future::join_all(
            (0..20).map(|_| fixture::reserve(&svc, "Sea Pearl")),
        )
        .await;
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 5);

        let ledger = fixture::bookings(&svc, read::booking::list::Filter {
            status: Some(read::booking::list::Status::NotCancelled),
            ..read::booking::list::Filter::default()
        })
        .await;
        assert!(ledger.iter().all(|b| b.boat_name == boat.name));
        assert_eq!(ledger.len(), 5);
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 0);
    }

    #[tokio::test]
    async fn rejects_inactive_boat_without_effects() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 4).await;
        _ = svc
            .execute(UpdateBoatActivity {
                boat_id: boat.id,
                is_active: false,
            })
            .await
            .unwrap();

        let err = fixture::reserve(&svc, "Sea Pearl").await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::BoatInactive(_)),
            "{err}",
        );
        assert_eq!(fixture::boat(&svc, boat.id).await.seats.available(), 4);
        assert!(fixture::bookings(&svc, read::booking::list::Filter::default())
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_boat() {
        let svc = fixture::service();

        let err = fixture::reserve(&svc, "Black Pearl").await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::BoatNotExists(_)),
            "{err}",
        );
    }
}
