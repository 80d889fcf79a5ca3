//! Lazily connected Postgres clients.
//!
//! Neither client takes a connection out of the [`connection::Pool`] until
//! the first statement is run.

use std::{future::Future, sync::Arc};

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Connection slot shared by all the clones of a client.
#[derive(Debug)]
struct Lazy<C>(Arc<RwLock<Option<C>>>);

impl<C> Clone for Lazy<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> Lazy<C> {
    /// Creates a new empty [`Lazy`] slot.
    fn empty() -> Self {
        Self(Arc::new(RwLock::new(None)))
    }

    /// Returns the connection in this slot, filling the slot with the `init`
    /// result if it's empty.
    async fn get_or_try_init<F>(
        &self,
        init: impl FnOnce() -> F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: Future<Output = Result<C, Traced<database::Error>>>,
    {
        {
            let slot = self.0.read().await;
            if slot.is_some() {
                return Ok(RwLockReadGuard::map(slot, |c| {
                    c.as_ref().expect("checked to be filled")
                }));
            }
        }

        let mut slot = self.0.write().await;
        if slot.is_none() {
            *slot = Some(init().await.map_err(tracerr::wrap!())?);
        }
        Ok(RwLockReadGuard::map(slot.downgrade(), |c| {
            c.as_ref().expect("filled under the write lock")
        }))
    }

    /// Empties this slot, returning the connection it held.
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}

/// Takes a fresh connection out of the provided [`connection::Pool`].
async fn pooled(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Non-transactional Postgres client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] connections are taken from.
    pool: connection::Pool,

    /// Connection taken for running statements, if any.
    connection: Lazy<connection::NonTx>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Lazy::empty(),
        }
    }

    /// Takes a fresh connection out of the [`connection::Pool`], bypassing
    /// the one this [`NonTx`] client holds.
    pub(crate) async fn pooled(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        pooled(&self.pool).await.map_err(tracerr::wrap!())
    }

    /// Returns the connection of this [`NonTx`] client, taking one out of the
    /// [`connection::Pool`] if there is none yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.connection.get_or_try_init(|| pooled(&self.pool)).await
    }
}

/// Transactional Postgres client.
///
/// The transaction starts with the first statement run and reuses the
/// connection of the [`NonTx`] client this [`Tx`] was created from, if that
/// one has any.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take a connection from, if the origin has
    /// none.
    pool: connection::Pool,

    /// [`NonTx`] client this [`Tx`] was created from, until the transaction
    /// starts.
    origin: Arc<Mutex<Option<NonTx>>>,

    /// Connection with the started transaction.
    tx: Lazy<connection::Tx>,
}

impl Tx {
    /// Creates a new [`Tx`] client out of the provided [`NonTx`] one.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            origin: Arc::new(Mutex::new(Some(client))),
            tx: Lazy::empty(),
        }
    }

    /// Starts the transaction of this [`Tx`] client.
    async fn begin(&self) -> Result<connection::Tx, Traced<database::Error>> {
        let origin = self.origin.lock().await.take();
        let reused = match origin {
            Some(client) => client.connection.take().await,
            None => None,
        };
        let conn = match reused {
            Some(conn) => conn,
            None => pooled(&self.pool).await.map_err(tracerr::wrap!())?,
        };
        connection::Tx::from_non_tx(conn)
            .await
            .map_err(tracerr::wrap!())
    }

    /// Returns the connection of this [`Tx`] client, starting the
    /// transaction if it's not started yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.tx.get_or_try_init(|| self.begin()).await
    }

    /// Commits the transaction of this [`Tx`] client, if it was started.
    ///
    /// # Errors
    ///
    /// If Postgres fails to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.tx.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

/// Implements [`Connection`] for a client by running statements on its lazily
/// obtained connection.
macro_rules! impl_connection {
    ($($ty:ty),+ $(,)?) => {$(
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    )+};
}

impl_connection!(NonTx, Tx);
