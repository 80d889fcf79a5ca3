//! [`Boat`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Percent};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Phone;

/// Boat running tours.
#[derive(Clone, Debug)]
pub struct Boat {
    /// ID of this [`Boat`].
    pub id: Id,

    /// Unique [`Name`] of this [`Boat`].
    pub name: Name,

    /// [`Seats`] of this [`Boat`].
    pub seats: Seats,

    /// Indicator whether this [`Boat`] accepts reservations.
    pub is_active: bool,

    /// [`DateTime`] when this [`Boat`] is expected to accept reservations
    /// again, if known.
    pub will_activate_at: Option<ActivationDateTime>,

    /// [`Phone`] of this [`Boat`]'s owner.
    pub owner_phone: Option<Phone>,

    /// Photos of this [`Boat`].
    pub photos: Vec<PhotoUrl>,

    /// [`Amenities`] available on this [`Boat`].
    pub amenities: Amenities,

    /// [`SafetyFeatures`] of this [`Boat`].
    pub safety_features: SafetyFeatures,

    /// [`MealOptions`] served on this [`Boat`].
    pub meals: MealOptions,

    /// [`PriceList`] of this [`Boat`].
    pub prices: PriceList,

    /// [`DateTime`] when this [`Boat`] was registered.
    pub created_at: CreationDateTime,
}

impl Boat {
    /// Indicates whether a seat on this [`Boat`] may be reserved right now.
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.seats.available() > 0
    }
}

/// ID of a [`Boat`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    derive_more::FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Boat`].
#[derive(
    AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 128
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Total number of seats on a [`Boat`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Capacity(u16);

impl Capacity {
    /// Creates a new [`Capacity`] if the given number of `seats` is at least
    /// `1`.
    #[must_use]
    pub fn new(seats: u16) -> Option<Self> {
        (seats >= 1).then_some(Self(seats))
    }
}

impl TryFrom<i32> for Capacity {
    type Error = &'static str;

    fn try_from(seats: i32) -> Result<Self, Self::Error> {
        u16::try_from(seats)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Capacity`")
    }
}

/// Seating of a [`Boat`].
///
/// Number of available seats never exceeds the [`Capacity`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Seats {
    /// Total [`Capacity`].
    capacity: Capacity,

    /// Number of seats still available for reservation.
    available: u16,
}

impl Seats {
    /// Creates new [`Seats`] with all of them available.
    #[must_use]
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            available: capacity.0,
        }
    }

    /// Creates new [`Seats`] with the given number of `available` ones.
    ///
    /// [`None`] is returned if `available` exceeds the `capacity`.
    #[must_use]
    pub fn from_parts(capacity: Capacity, available: u16) -> Option<Self> {
        (available <= capacity.0).then_some(Self {
            capacity,
            available,
        })
    }

    /// Returns the total [`Capacity`].
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Returns the number of seats available for reservation.
    #[must_use]
    pub fn available(&self) -> u16 {
        self.available
    }

    /// Returns the number of reserved seats.
    #[must_use]
    pub fn booked(&self) -> u16 {
        self.capacity.0 - self.available
    }

    /// Reserves a single seat.
    ///
    /// [`None`] is returned if there are no available seats.
    #[must_use]
    pub fn reserve(self) -> Option<Self> {
        Some(Self {
            capacity: self.capacity,
            available: self.available.checked_sub(1)?,
        })
    }

    /// Returns the [`Percent`] of booked seats.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn occupancy(&self) -> Percent {
        Percent::ratio(self.booked().into(), self.capacity.0.into())
            .expect("booked seats never exceed non-zero capacity")
    }
}

/// Public URL of a [`Boat`] photo.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PhotoUrl(String);

impl PhotoUrl {
    /// Creates a new [`PhotoUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`PhotoUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        !url.is_empty()
            && url.len() <= 2048
            && !url.contains(char::is_whitespace)
    }
}

impl FromStr for PhotoUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PhotoUrl`")
    }
}

/// Amenities available on a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Amenities {
    /// Clean restrooms.
    pub clean_restrooms: bool,

    /// Comfortable seating.
    pub comfortable_seating: bool,

    /// Onboard dining.
    pub onboard_dining: bool,

    /// WiFi access.
    pub wifi_access: bool,

    /// Entertainment system.
    pub entertainment_system: bool,

    /// Air conditioning.
    pub air_conditioning: bool,
}

impl Amenities {
    /// Returns human-readable labels of the available [`Amenities`].
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.clean_restrooms, "Clean Restrooms"),
            (self.comfortable_seating, "Comfortable Seating"),
            (self.onboard_dining, "Onboard Dining"),
            (self.wifi_access, "WiFi Access"),
            (self.entertainment_system, "Entertainment System"),
            (self.air_conditioning, "Air Conditioning"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// Safety features of a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SafetyFeatures {
    /// Life jackets.
    pub life_jackets: bool,

    /// Emergency kit.
    pub emergency_kit: bool,

    /// Fire extinguishers.
    pub fire_extinguishers: bool,
}

impl SafetyFeatures {
    /// Returns human-readable labels of the present [`SafetyFeatures`].
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.life_jackets, "Life Jackets"),
            (self.emergency_kit, "Emergency Kit"),
            (self.fire_extinguishers, "Fire Extinguishers"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect()
    }
}

/// Meal options served on a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct MealOptions {
    /// Both vegetarian and non-vegetarian meals.
    pub veg_non_veg: bool,

    /// Pure vegetarian meals only.
    pub pure_veg: bool,
}

impl MealOptions {
    /// Returns human-readable labels of the served [`MealOptions`].
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        [(self.veg_non_veg, "Veg & Non-Veg"), (self.pure_veg, "Pure Veg")]
            .into_iter()
            .filter_map(|(on, label)| on.then_some(label))
            .collect()
    }
}

define_kind! {
    #[doc = "Priced item of a [`PriceList`]."]
    enum PriceField {
        #[doc = "Adult ticket."]
        Adult = 1,

        #[doc = "Child ticket."]
        Child = 2,

        #[doc = "Private 4-seater car transfer."]
        PrivateCar4Seater = 3,

        #[doc = "Private 7-seater car transfer."]
        PrivateCar7Seater = 4,

        #[doc = "Shared ride transfer."]
        SharedRides = 5,

        #[doc = "Breakfast."]
        Breakfast = 6,

        #[doc = "Vegetarian lunch."]
        VegLunch = 7,

        #[doc = "Non-vegetarian lunch."]
        NonVegLunch = 8,

        #[doc = "Tour guide."]
        TourGuide = 9,

        #[doc = "Travel insurance."]
        Insurance = 10,
    }
}

/// Non-negative price of a [`PriceField`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Zero [`Price`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Price`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount.is_zero() || amount.is_sign_positive()).then_some(Self(amount))
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

/// [`Price`]s of every [`PriceField`] of a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PriceList([Price; PriceField::ALL.len()]);

impl PriceList {
    /// Returns the [`Price`] of the provided [`PriceField`].
    #[must_use]
    pub fn get(&self, field: PriceField) -> Price {
        self.0[Self::index(field)]
    }

    /// Sets the [`Price`] of the provided [`PriceField`].
    pub fn set(&mut self, field: PriceField, price: Price) {
        self.0[Self::index(field)] = price;
    }

    /// Returns this [`PriceList`] with the [`Price`] of the provided
    /// [`PriceField`] replaced.
    #[must_use]
    pub fn with(mut self, field: PriceField, price: Price) -> Self {
        self.set(field, price);
        self
    }

    /// Iterates over all the [`PriceField`]s along with their [`Price`]s.
    pub fn iter(&self) -> impl Iterator<Item = (PriceField, Price)> + '_ {
        PriceField::ALL.iter().map(|&f| (f, self.get(f)))
    }

    /// Returns index of the provided [`PriceField`] in this [`PriceList`].
    fn index(field: PriceField) -> usize {
        // `PriceField` discriminants are sequential starting from `1`.
        usize::from(field.u8()) - 1
    }
}

impl FromIterator<(PriceField, Price)> for PriceList {
    fn from_iter<T: IntoIterator<Item = (PriceField, Price)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::default(), |list, (f, p)| list.with(f, p))
    }
}

/// [`DateTime`] when a [`Boat`] was registered.
pub type CreationDateTime = DateTimeOf<(Boat, unit::Creation)>;

/// [`DateTime`] when a [`Boat`] is expected to be active again.
pub type ActivationDateTime = DateTimeOf<(Boat, unit::Activation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{
        Amenities, Capacity, Name, Price, PriceField, PriceList, Seats,
    };

    #[test]
    fn name_format() {
        assert!(Name::new("Sea Pearl").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" Sea Pearl").is_none());
        assert!(Name::new("Sea Pearl ").is_none());
        assert!(Name::new("x".repeat(129)).is_none());
    }

    #[test]
    fn capacity_is_positive() {
        assert!(Capacity::new(0).is_none());
        assert!(Capacity::new(1).is_some());
        assert!(Capacity::try_from(-1).is_err());
        assert!(Capacity::try_from(70_000).is_err());
        assert_eq!(u16::from(Capacity::try_from(12).unwrap()), 12);
    }

    #[test]
    fn reserves_until_exhausted() {
        let seats = Seats::new(Capacity::new(2).unwrap());
        assert_eq!(seats.available(), 2);

        let seats = seats.reserve().unwrap();
        assert_eq!(seats.available(), 1);
        assert_eq!(seats.booked(), 1);

        let seats = seats.reserve().unwrap();
        assert_eq!(seats.available(), 0);
        assert_eq!(seats.booked(), 2);

        assert_eq!(seats.reserve(), None);
    }

    #[test]
    fn available_never_exceeds_capacity() {
        let capacity = Capacity::new(3).unwrap();
        assert!(Seats::from_parts(capacity, 3).is_some());
        assert!(Seats::from_parts(capacity, 0).is_some());
        assert!(Seats::from_parts(capacity, 4).is_none());
    }

    #[test]
    fn occupancy() {
        let capacity = Capacity::new(4).unwrap();
        let seats = Seats::from_parts(capacity, 1).unwrap();
        assert_eq!(seats.occupancy().value(), Decimal::from(75));
        assert_eq!(Seats::new(capacity).occupancy().value(), Decimal::ZERO);
    }

    #[test]
    fn price_is_not_negative() {
        assert!(Price::new(Decimal::ZERO).is_some());
        assert!(Price::new(Decimal::from(250)).is_some());
        assert!(Price::new(Decimal::from(-1)).is_none());
        assert!("12.50".parse::<Price>().is_ok());
        assert!("-12.50".parse::<Price>().is_err());
    }

    #[test]
    fn price_list_fields() {
        let adult = Price::new(Decimal::from(1200)).unwrap();
        let insurance = Price::new(Decimal::from(99)).unwrap();

        let list = PriceList::default()
            .with(PriceField::Adult, adult)
            .with(PriceField::Insurance, insurance);

        assert_eq!(list.get(PriceField::Adult), adult);
        assert_eq!(list.get(PriceField::Insurance), insurance);
        assert_eq!(list.get(PriceField::Child), Price::ZERO);
        assert_eq!(list.iter().count(), PriceField::ALL.len());

        let collected = list.iter().collect::<PriceList>();
        assert_eq!(collected, list);
    }

    #[test]
    fn amenity_labels() {
        let amenities = Amenities {
            wifi_access: true,
            air_conditioning: true,
            ..Amenities::default()
        };
        assert_eq!(amenities.labels(), ["WiFi Access", "Air Conditioning"]);
        assert!(Amenities::default().labels().is_empty());
    }
}
