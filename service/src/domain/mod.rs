//! Domain definitions.

pub mod boat;
pub mod booking;
mod phone;

pub use self::{boat::Boat, booking::Booking, phone::Phone};
