//! [`Command`] for registering a new [`Boat`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{boat, Boat, Phone},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Boat`].
///
/// The registered [`Boat`] is inactive, with all its seats available.
#[derive(Clone, Debug)]
pub struct RegisterBoat {
    /// Unique [`boat::Name`] of a new [`Boat`].
    pub name: boat::Name,

    /// [`boat::Capacity`] of a new [`Boat`].
    pub capacity: boat::Capacity,

    /// [`Phone`] of a new [`Boat`]'s owner.
    pub owner_phone: Option<Phone>,

    /// Photos of a new [`Boat`].
    pub photos: Vec<boat::PhotoUrl>,

    /// [`boat::Amenities`] of a new [`Boat`].
    pub amenities: boat::Amenities,

    /// [`boat::SafetyFeatures`] of a new [`Boat`].
    pub safety_features: boat::SafetyFeatures,

    /// [`boat::MealOptions`] of a new [`Boat`].
    pub meals: boat::MealOptions,

    /// [`boat::PriceList`] of a new [`Boat`].
    pub prices: boat::PriceList,
}

impl<Db> Command<RegisterBoat> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'n> Database<
            Select<By<Option<Boat>, &'n boat::Name>>,
            Ok = Option<Boat>,
            Err = Traced<database::Error>,
        > + for<'n> Database<
            Lock<By<Boat, &'n boat::Name>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Boat>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Boat;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterBoat) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterBoat {
            name,
            capacity,
            owner_phone,
            photos,
            amenities,
            safety_features,
            meals,
            prices,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent registration of the same `boat::Name`.
        tx.execute(Lock(By::<Boat, _>::new(&name)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Boat>, _>::new(&name)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::NameOccupied(name)));
        }

        let boat = Boat {
            id: boat::Id::new(),
            name,
            seats: boat::Seats::new(capacity),
            is_active: false,
            will_activate_at: None,
            owner_phone,
            photos,
            amenities,
            safety_features,
            meals,
            prices,
            created_at: DateTime::now().coerce(),
        };

        let inserted = tx.execute(Insert(boat.clone())).await;
        if let Err(e) = &inserted {
            if e.as_ref().is_unique_violation(Some(constraint::BOAT_NAME)) {
                return Err(tracerr::new!(E::NameOccupied(boat.name)));
            }
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(boat)
    }
}

/// Error of [`RegisterBoat`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`boat::Name`] is already occupied.
    #[display("`{_0}` boat name is occupied")]
    NameOccupied(#[error(not(source))] boat::Name),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        fixture,
        domain::Boat,
        infra::Database as _,
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn registers_inactive_boat_with_all_seats_available() {
        let svc = fixture::service();

        let boat = svc
            .execute(fixture::register_boat("Sea Pearl", 12))
            .await
            .unwrap();
        assert!(!boat.is_active);
        assert_eq!(boat.seats.available(), 12);
        assert_eq!(u16::from(boat.seats.capacity()), 12);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Boat>, _>::new(boat.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, boat.name);
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn rejects_occupied_name() {
        let svc = fixture::service();
        _ = svc
            .execute(fixture::register_boat("Sea Pearl", 12))
            .await
            .unwrap();

        let err = svc
            .execute(fixture::register_boat("Sea Pearl", 4))
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::NameOccupied(n) if n.to_string() == "Sea Pearl",
            ),
            "{err}",
        );
    }
}
