//! [`Command`] for scheduling activation of a [`Boat`].

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

/// [`Command`] for setting the date a [`Boat`] is expected to accept
/// reservations again.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleBoatActivation {
    /// ID of the [`Boat`] to be updated.
    pub boat_id: boat::Id,

    /// [`boat::ActivationDateTime`] to be set, or [`None`] to unset it.
    pub at: Option<boat::ActivationDateTime>,
}

impl<Db> Command<ScheduleBoatActivation> for Service<Db>
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
        cmd: ScheduleBoatActivation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ScheduleBoatActivation { boat_id, at } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Boat, _>::new(boat_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut boat = tx
            .execute(Select(By::<Option<Boat>, _>::new(boat_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BoatNotExists(boat_id))
            .map_err(tracerr::wrap!())?;
        if boat.will_activate_at == at {
            return Ok(boat);
        }

        boat.will_activate_at = at;
        tx.execute(Update(boat.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(boat)
    }
}

/// Error of [`ScheduleBoatActivation`] [`Command`] execution.
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
    use common::DateTime;

    use crate::{fixture, Command as _};

    use super::ScheduleBoatActivation;

    #[tokio::test]
    async fn sets_and_unsets_activation_date() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 3).await;
        let at = DateTime::from_date("2030-05-01").unwrap().coerce();

        let boat = svc
            .execute(ScheduleBoatActivation {
                boat_id: boat.id,
                at: Some(at),
            })
            .await
            .unwrap();
        assert_eq!(boat.will_activate_at, Some(at));
        assert_eq!(boat.seats.available(), 3);

        let boat = svc
            .execute(ScheduleBoatActivation {
                boat_id: boat.id,
                at: None,
            })
            .await
            .unwrap();
        assert_eq!(boat.will_activate_at, None);
    }
}
