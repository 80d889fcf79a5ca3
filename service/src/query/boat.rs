//! [`Query`] collection related to a single [`Boat`].

use common::operations::By;

use crate::domain::{boat, Boat};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Boat`] by its [`boat::Id`].
pub type ById = DatabaseQuery<By<Option<Boat>, boat::Id>>;

/// Queries a [`Boat`] by its [`boat::Name`].
pub type ByName<'n> = DatabaseQuery<By<Option<Boat>, &'n boat::Name>>;
