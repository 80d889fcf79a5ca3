//! Postgres [`Database`] implementation.
//!
//! Boats and bookings live in the tables created by the embedded
//! [`refinery`] migrations. [`Lock`]s are taken by upserting into the
//! dedicated `*_lock` tables, so they're held until the transaction ends.
//!
//! [`Lock`]: common::operations::Lock

pub mod client;
pub mod connection;
mod fuzz_pattern;
mod impls;
mod migration;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::Config;
pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
    fuzz_pattern::FuzzPattern,
};

/// Postgres [`Database`] over either a [`NonTx`] or a [`Tx`] client.
#[derive(Clone, Debug, Deref)]
pub struct Postgres<C = NonTx>(C);

impl Postgres {
    /// Creates a new [`Postgres`] database connecting with the provided
    /// [`Config`].
    ///
    /// No connection is established until the first statement is run.
    ///
    /// # Errors
    ///
    /// If the [`Config`] doesn't describe a valid [`connection::Pool`].
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        conf.create_pool(Some(Runtime::Tokio1), NoTls)
            .map(|pool| Self(NonTx::from_pool(pool)))
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Error of the [`Postgres`] database.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed to run.
    #[display("statement failed: {_0}")]
    Connection(connection::Error),

    /// [`Config`] doesn't describe a valid [`connection::Pool`].
    #[display("cannot create `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// No connection could be taken out of the [`connection::Pool`].
    #[display("cannot take a pooled connection: {_0}")]
    PoolError(connection::PoolError),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of a unique constraint,
    /// the provided one if [`Some`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        let Self::Connection(e) = self else {
            return false;
        };
        let Some(db) = e.as_db_error() else {
            return false;
        };
        db.code() == &SqlState::UNIQUE_VIOLATION
            && constraint.map_or(true, |c| db.constraint() == Some(c))
    }
}
