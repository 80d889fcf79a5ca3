//! Read entities definitions.

pub mod boat;
pub mod booking;
pub mod report;
