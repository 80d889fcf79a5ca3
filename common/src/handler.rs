//! [`Handler`] abstractions.

use std::future::Future;

/// Something executing `Args` asynchronously.
///
/// Commands, queries and database operations are all [`Handler`]s of their
/// argument types, so a single value (a service or a database client) may
/// handle many different operations.
pub trait Handler<Args = ()> {
    /// Result of a successful execution.
    type Ok;

    /// Error of a failed execution.
    type Err;

    /// Executes the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
