//! [`Command`] for updating a [`boat::Price`].

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

/// [`Command`] for updating a single [`boat::Price`] of a [`Boat`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateBoatPrice {
    /// ID of the [`Boat`] to be updated.
    pub boat_id: boat::Id,

    /// [`boat::PriceField`] to be updated.
    pub field: boat::PriceField,

    /// New [`boat::Price`] of the `field`.
    pub price: boat::Price,
}

impl<Db> Command<UpdateBoatPrice> for Service<Db>
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
        cmd: UpdateBoatPrice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBoatPrice {
            boat_id,
            field,
            price,
        } = cmd;

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
        if boat.prices.get(field) == price {
            return Ok(boat);
        }

        boat.prices.set(field, price);
        tx.execute(Update(boat.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(boat)
    }
}

/// Error of [`UpdateBoatPrice`] [`Command`] execution.
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
    use crate::{
        fixture,
        domain::boat::{Price, PriceField},
        Command as _,
    };

    use super::UpdateBoatPrice;

    #[tokio::test]
    async fn updates_single_field() {
        let svc = fixture::service();
        let boat = fixture::active_boat(&svc, "Sea Pearl", 3).await;
        let price = "1499.50".parse::<Price>().unwrap();

        let boat = svc
            .execute(UpdateBoatPrice {
                boat_id: boat.id,
                field: PriceField::VegLunch,
                price,
            })
            .await
            .unwrap();
        assert_eq!(boat.prices.get(PriceField::VegLunch), price);
        assert_eq!(boat.prices.get(PriceField::Adult), Price::ZERO);
    }
}
