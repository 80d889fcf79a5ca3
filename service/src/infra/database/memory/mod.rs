//! In-memory [`Database`] implementation.
//!
//! Mirrors the semantics of the [`Postgres`] one: a transaction holds the
//! whole store exclusively from [`Transact`] until [`Commit`] (or drop), and
//! its writes become visible only once committed.
//!
//! [`Postgres`]: crate::infra::Postgres

mod impls;

use std::{future::Future, sync::Arc};

use common::operations::{Commit, Transact};
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{Boat, Booking},
    infra::{database, Database},
};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default)]
pub struct Memory<A = NonTx>(A);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Data kept by a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// Registered [`Boat`]s in insertion order.
    boats: Vec<Boat>,

    /// Created [`Booking`]s in insertion order.
    bookings: Vec<Booking>,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`Store`].
    store: Arc<Mutex<Store>>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Staged`] changes, if not committed yet.
    staged: Arc<Mutex<Option<Staged>>>,
}

/// Changes of a [`Tx`] not committed yet.
#[derive(Debug)]
struct Staged {
    /// Exclusive access to the shared [`Store`].
    guard: OwnedMutexGuard<Store>,

    /// Working copy of the [`Store`].
    store: Store,
}

/// Access to the [`Store`] of a [`Memory`] client.
pub trait Access {
    /// Applies the provided function to the [`Store`].
    ///
    /// # Errors
    ///
    /// If the function fails, or the [`Store`] cannot be accessed anymore.
    fn access<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, Error>,
    ) -> impl Future<Output = Result<T, Traced<database::Error>>>;
}

impl Access for NonTx {
    async fn access<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, Error>,
    ) -> Result<T, Traced<database::Error>> {
        let mut store = self.store.lock().await;
        f(&mut store).map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Access for Tx {
    async fn access<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, Error>,
    ) -> Result<T, Traced<database::Error>> {
        let mut staged = self.staged.lock().await;
        let Some(staged) = staged.as_mut() else {
            return Err(tracerr::new!(database::Error::from(Error::Committed)));
        };
        f(&mut staged.store).map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0.store).lock_owned().await;
        let store = Store::clone(&guard);
        Ok(Memory(Tx {
            staged: Arc::new(Mutex::new(Some(Staged { guard, store }))),
        }))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let Some(Staged { mut guard, store }) =
            self.0.staged.lock().await.take()
        else {
            return Err(tracerr::new!(database::Error::from(Error::Committed)));
        };
        *guard = store;
        Ok(())
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Transaction is already committed.
    #[display("Transaction is already committed")]
    Committed,

    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |x| x == *c),
            Self::Committed => false,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Commit, Insert, Select, Transact};

    use crate::{
        domain::{boat, Boat},
        infra::{database::constraint, Database},
        read,
    };

    use super::Memory;

    fn boat(name: &str) -> Boat {
        Boat {
            id: boat::Id::new(),
            name: boat::Name::new(name).unwrap(),
            seats: boat::Seats::new(boat::Capacity::new(2).unwrap()),
            is_active: true,
            will_activate_at: None,
            owner_phone: None,
            photos: vec![],
            amenities: boat::Amenities::default(),
            safety_features: boat::SafetyFeatures::default(),
            meals: boat::MealOptions::default(),
            prices: boat::PriceList::default(),
            created_at: common::DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn commits_staged_changes() {
        let db = Memory::new();
        let b = boat("Sea Pearl");

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(b.clone())).await.unwrap();

        let staged = tx
            .execute(Select(By::<Option<Boat>, _>::new(b.id)))
            .await
            .unwrap();
        assert!(staged.is_some());

        tx.execute(Commit).await.unwrap();
        assert!(tx.execute(Commit).await.is_err());

        let committed = db
            .execute(Select(By::<Option<Boat>, _>::new(b.id)))
            .await
            .unwrap();
        assert!(committed.is_some());
    }

    #[tokio::test]
    async fn rolls_back_on_drop() {
        let db = Memory::new();
        let b = boat("Sea Pearl");

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(b.clone())).await.unwrap();
        drop(tx);

        let found = db
            .execute(Select(By::<Option<Boat>, _>::new(b.id)))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_names() {
        let db = Memory::new();
        db.execute(Insert(boat("Sea Pearl"))).await.unwrap();

        let err = db.execute(Insert(boat("Sea Pearl"))).await.unwrap_err();
        assert!(err.as_ref().is_unique_violation(Some(constraint::BOAT_NAME)));
        assert!(!err.as_ref().is_unique_violation(Some(constraint::BOOKING_CODE)));
    }

    #[tokio::test]
    async fn orders_by_creation_then_id() {
        let db = Memory::new();
        let created_at = common::DateTime::now().coerce();
        let first = Boat {
            id: uuid::Uuid::from_u128(1).into(),
            created_at,
            ..boat("Sea Pearl")
        };
        let second = Boat {
            id: uuid::Uuid::from_u128(2).into(),
            created_at,
            ..boat("River Queen")
        };
        db.execute(Insert(second.clone())).await.unwrap();
        db.execute(Insert(first.clone())).await.unwrap();

        let page = db
            .execute(Select(By::<read::boat::list::Page, _>::new(
                read::boat::list::Selector {
                    arguments: read::boat::list::Arguments::default(),
                    filter: read::boat::list::Filter::default(),
                },
            )))
            .await
            .unwrap();

        let ids = page.nodes.iter().map(|b| b.id).collect::<Vec<_>>();
        assert_eq!(ids, [first.id, second.id]);
    }
}
