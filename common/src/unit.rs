//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity cancellation.
#[derive(Clone, Copy, Debug)]
pub struct Cancellation;

/// Marker type describing an entity (re)activation.
#[derive(Clone, Copy, Debug)]
pub struct Activation;

/// Marker type describing a journey departure.
#[derive(Clone, Copy, Debug)]
pub struct Journey;
