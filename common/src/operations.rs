//! Abstract operations executed by [`Handler`]s.
//!
//! An operation names what to do, while its argument (usually a [`By`])
//! names what to do it with.

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads stored values.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Serializes concurrent modifications of a value until the current
/// transaction ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Claims a unit of a value in a single atomic step, or does nothing at all
/// if there is none left.
#[derive(Clone, Copy, Debug)]
pub struct Reserve<T>(pub T);

/// Starts a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// [`Handler`] running operations inside the transaction started by `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Argument of an operation over `W` values, identified by `B`.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Values the operation is over.
    what: PhantomData<W>,

    /// Identification of the values.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] identifying `W` values by the provided `by`.
    #[must_use]
    pub const fn new(by: B) -> Self {
        Self {
            what: PhantomData,
            by,
        }
    }

    /// Returns the identification of the values.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
