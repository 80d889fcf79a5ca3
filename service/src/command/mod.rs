//! [`Command`] definition.

pub mod cancel_booking;
pub mod register_boat;
pub mod reserve_seat;
pub mod schedule_boat_activation;
pub mod update_boat_activity;
pub mod update_boat_price;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_booking::CancelBooking, register_boat::RegisterBoat,
    reserve_seat::ReserveSeat, schedule_boat_activation::ScheduleBoatActivation,
    update_boat_activity::UpdateBoatActivity,
    update_boat_price::UpdateBoatPrice,
};
