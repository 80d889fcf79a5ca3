//! Shared helpers for [`Service`] tests over a [`Memory`] database.

use common::{
    operations::{By, Select},
    pagination::Arguments,
    Currency, DateTime, Money,
};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    command::{reserve_seat, RegisterBoat, ReserveSeat, UpdateBoatActivity},
    domain::{boat, booking, Boat, Booking, Phone},
    infra::{Database as _, Memory},
    read, Command as _, Config, Service,
};

/// Creates a new [`Service`] over an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(Config::default(), Memory::new())
}

/// Creates a [`RegisterBoat`] command with the provided `name` and number of
/// `seats`.
pub(crate) fn register_boat(name: &str, seats: u16) -> RegisterBoat {
    RegisterBoat {
        name: boat::Name::new(name).unwrap(),
        capacity: boat::Capacity::new(seats).unwrap(),
        owner_phone: None,
        photos: vec![],
        amenities: boat::Amenities::default(),
        safety_features: boat::SafetyFeatures::default(),
        meals: boat::MealOptions::default(),
        prices: boat::PriceList::default(),
    }
}

/// Registers a new [`Boat`] and activates it.
pub(crate) async fn active_boat(
    svc: &Service<Memory>,
    name: &str,
    seats: u16,
) -> Boat {
    let boat = svc.execute(register_boat(name, seats)).await.unwrap();
    svc.execute(UpdateBoatActivity {
        boat_id: boat.id,
        is_active: true,
    })
    .await
    .unwrap()
}

/// Creates a [`ReserveSeat`] command for the [`Boat`] with the provided
/// `name`.
pub(crate) fn reserve_seat(name: &str) -> ReserveSeat {
    ReserveSeat {
        boat_name: boat::Name::new(name).unwrap(),
        phone: Phone::new("9876543210").unwrap(),
        journey_at: DateTime::from_date("2030-05-01").unwrap().coerce(),
        passengers: booking::Passengers::new(vec![booking::Passenger {
            full_name: booking::FullName::new("Anna Joseph").unwrap(),
            age: booking::Age::new(30).unwrap(),
            gender: booking::Gender::Female,
        }])
        .unwrap(),
        extras: booking::Extras::default(),
        payment: booking::Payment::new(
            Money {
                amount: Decimal::from(1500),
                currency: Currency::Inr,
            },
            booking::PaymentKind::Online,
        )
        .unwrap(),
    }
}

/// Reserves a seat on the [`Boat`] with the provided `name`.
pub(crate) async fn reserve(
    svc: &Service<Memory>,
    name: &str,
) -> Result<Booking, Traced<reserve_seat::ExecutionError>> {
    svc.execute(reserve_seat(name)).await
}

/// Returns the stored [`Boat`] with the provided ID.
pub(crate) async fn boat(svc: &Service<Memory>, id: boat::Id) -> Boat {
    svc.database()
        .execute(Select(By::<Option<Boat>, _>::new(id)))
        .await
        .unwrap()
        .unwrap()
}

/// Returns the stored [`Booking`] with the provided ID.
pub(crate) async fn booking(svc: &Service<Memory>, id: booking::Id) -> Booking {
    svc.database()
        .execute(Select(By::<Option<Booking>, _>::new(id)))
        .await
        .unwrap()
        .unwrap()
}

/// Returns all the stored [`Booking`]s passing the provided `filter`.
pub(crate) async fn bookings(
    svc: &Service<Memory>,
    filter: read::booking::list::Filter,
) -> Vec<Booking> {
    svc.database()
        .execute(Select(By::<read::booking::list::Page, _>::new(
            read::booking::list::Selector {
                arguments: Arguments {
                    offset: 0,
                    limit: Arguments::MAX_LIMIT,
                },
                filter,
            },
        )))
        .await
        .unwrap()
        .nodes
}
