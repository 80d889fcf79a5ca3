//! [`Command`] for updating activity of a [`Boat`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{boat, Boat},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for activating or deactivating a [`Boat`].
///
/// Deactivated [`Boat`]s reject new reservations, keeping their available
/// seats untouched.
#[derive(Clone, Copy, Debug)]
pub struct UpdateBoatActivity {
    /// ID of the [`Boat`] to be updated.
    pub boat_id: boat::Id,

    /// Indicator whether the [`Boat`] should accept reservations.
    pub is_active: bool,
}

impl<Db> Command<UpdateBoatActivity> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Boat>, boat::Id>>,
            Ok = Option<Boat>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Boat, boat::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Boat>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Boat;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateBoatActivity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBoatActivity { boat_id, is_active } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Boat`.
        tx.execute(Lock(By::<Boat, _>::new(boat_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut boat = tx
            .execute(Select(By::<Option<Boat>, _>::new(boat_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BoatNotExists(boat_id))
            .map_err(tracerr::wrap!())?;
        if boat.is_active == is_active {
            return Ok(boat);
        }

        boat.is_active = is_active;
        tx.execute(Update(boat.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(boat)
    }
}

/// Error of [`UpdateBoatActivity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Boat`] doesn't exist.
    #[display("`Boat(id: {_0})` does not exist")]
    #[from(ignore)]
    BoatNotExists(#[error(not(source))] boat::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{fixture, domain::boat, Command as _};

    use super::{ExecutionError, UpdateBoatActivity};

    #[tokio::test]
    async fn toggles_activity_keeping_seats() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 3).await;
        fixture::reserve(&svc, "Sea Pearl").await.unwrap();

        let boat = svc
            .execute(UpdateBoatActivity {
                boat_id: boat.id,
                is_active: false,
            })
            .await
            .unwrap();
        assert!(!boat.is_active);
        assert_eq!(boat.seats.available(), 2);

        let boat = svc
            .execute(UpdateBoatActivity {
                boat_id: boat.id,
                is_active: true,
            })
            .await
            .unwrap();
        assert!(boat.is_active);
        assert_eq!(boat.seats.available(), 2);
    }

    #[tokio::test]
    async fn fails_for_unknown_boat() {
        let svc = fixture::service();
        let id = boat::Id::new();

        let err = svc
            .execute(UpdateBoatActivity {
                boat_id: id,
                is_active: true,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::BoatNotExists(i) if *i == id),
            "{err}",
        );
    }
}
