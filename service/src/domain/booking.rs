//! [`Booking`] definitions.

use std::{fmt, str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Deref, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use super::Boat;
use super::{boat, Phone};

/// Reservation of a seat on a [`Boat`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// Human-readable [`Code`] of this [`Booking`].
    pub code: Code,

    /// Name of the reserved [`Boat`].
    ///
    /// This is a weak reference: the [`Boat`] is not guaranteed to exist.
    pub boat_name: boat::Name,

    /// Contact [`Phone`] of this [`Booking`].
    pub phone: Phone,

    /// [`DateTime`] of the journey.
    pub journey_at: JourneyDateTime,

    /// [`Passengers`] of this [`Booking`].
    pub passengers: Passengers,

    /// Ordered [`Extras`].
    pub extras: Extras,

    /// [`Payment`] made for this [`Booking`].
    pub payment: Payment,

    /// [`RefundStatus`] of this [`Booking`].
    pub refund_status: RefundStatus,

    /// Reason this [`Booking`] was cancelled with, if any.
    pub cancellation_reason: Option<CancellationReason>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was cancelled, if it was.
    pub cancelled_at: Option<CancellationDateTime>,
}

impl Booking {
    /// Indicates whether this [`Booking`] is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

/// ID of a [`Booking`].
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

/// Human-readable code of a [`Booking`], like `BK-7Q2M9XK4`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Prefix of every [`Code`].
    const PREFIX: &'static str = "BK-";

    /// [Crockford's Base32] alphabet the [`Code`] characters are drawn from.
    ///
    /// [Crockford's Base32]: https://www.crockford.com/base32.html
    const ALPHABET: &'static [u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

    /// Number of characters following the [`Code::PREFIX`].
    const LEN: usize = 8;

    /// Generates a new random [`Code`].
    #[must_use]
    pub fn generate() -> Self {
        let bits = Uuid::new_v4().as_u128();
        let code = (0..Self::LEN)
            .map(|i| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "masked to 5 bits"
                )]
                let idx = ((bits >> (i * 5)) & 0x1F) as usize;
                char::from(Self::ALPHABET[idx])
            })
            .collect::<String>();
        Self(format!("{}{code}", Self::PREFIX))
    }

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Code`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^BK-[0-9A-HJKMNP-TV-Z]{8}$").expect("valid regex")
        });

        REGEX.is_match(code.as_ref())
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// Passenger of a [`Booking`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Passenger {
    /// [`FullName`] of this [`Passenger`].
    pub full_name: FullName,

    /// [`Age`] of this [`Passenger`].
    pub age: Age,

    /// [`Gender`] of this [`Passenger`].
    pub gender: Gender,
}

/// Full name of a [`Passenger`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FullName(String);

impl FullName {
    /// Creates a new [`FullName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`FullName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 256
    }
}

impl FromStr for FullName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FullName`")
    }
}

/// Age of a [`Passenger`] in full years.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Age(u8);

impl Age {
    /// [`Age`] since which a [`Passenger`] is considered an adult.
    pub const ADULT: Self = Self(18);

    /// Maximum possible [`Age`].
    const MAX: u8 = 150;

    /// Creates a new [`Age`] if the given number of `years` is sane.
    #[must_use]
    pub fn new(years: u8) -> Option<Self> {
        (years <= Self::MAX).then_some(Self(years))
    }

    /// Indicates whether this [`Age`] is an adult one.
    #[must_use]
    pub fn is_adult(self) -> bool {
        self >= Self::ADULT
    }
}

impl TryFrom<i16> for Age {
    type Error = &'static str;

    fn try_from(years: i16) -> Result<Self, Self::Error> {
        u8::try_from(years)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Age`")
    }
}

define_kind! {
    #[doc = "Gender of a [`Passenger`]."]
    enum Gender {
        #[doc = "Male."]
        Male = 1,

        #[doc = "Female."]
        Female = 2,

        #[doc = "Other."]
        Other = 3,
    }
}

/// Non-empty list of [`Passenger`]s.
#[derive(Clone, Debug, Deref, Eq, PartialEq)]
#[deref(forward)]
pub struct Passengers(Vec<Passenger>);

impl Passengers {
    /// Creates new [`Passengers`] if the given list is not empty.
    #[must_use]
    pub fn new(passengers: Vec<Passenger>) -> Option<Self> {
        (!passengers.is_empty()).then_some(Self(passengers))
    }

    /// Returns [`PassengerSummary`] of these [`Passengers`].
    #[must_use]
    pub fn summary(&self) -> PassengerSummary {
        let adults = self.0.iter().filter(|p| p.age.is_adult()).count();
        PassengerSummary {
            adults,
            kids: self.0.len() - adults,
        }
    }
}

impl From<Passengers> for Vec<Passenger> {
    fn from(passengers: Passengers) -> Self {
        passengers.0
    }
}

/// Number of adults and kids among [`Passengers`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PassengerSummary {
    /// Number of adult [`Passenger`]s.
    pub adults: usize,

    /// Number of [`Passenger`]s younger than [`Age::ADULT`].
    pub kids: usize,
}

impl Display for PassengerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        write!(
            f,
            "{} Adult{}, {} Kid{}",
            self.adults,
            plural(self.adults),
            self.kids,
            plural(self.kids),
        )
    }
}

/// Extras ordered along with a [`Booking`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Extras {
    /// Private 4-seater car transfer.
    pub private_car_4_seater: bool,

    /// Private 7-seater car transfer.
    pub private_car_7_seater: bool,

    /// Shared ride transfer.
    pub shared_rides: bool,

    /// Number of breakfasts.
    pub breakfast: u16,

    /// Number of vegetarian lunches.
    pub veg_lunch: u16,

    /// Number of non-vegetarian lunches.
    pub non_veg_lunch: u16,

    /// Tour guide.
    pub tour_guide: bool,

    /// Travel insurance.
    pub insurance: bool,
}

impl Extras {
    /// Returns the total number of ordered meals.
    #[must_use]
    pub fn meals(&self) -> u32 {
        u32::from(self.breakfast)
            + u32::from(self.veg_lunch)
            + u32::from(self.non_veg_lunch)
    }
}

/// Payment made for a [`Booking`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Payment {
    /// Paid amount.
    amount: Money,

    /// [`PaymentKind`] used.
    kind: PaymentKind,
}

impl Payment {
    /// Creates a new [`Payment`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: Money, kind: PaymentKind) -> Option<Self> {
        (!amount.is_negative()).then_some(Self { amount, kind })
    }

    /// Returns the paid amount.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the [`PaymentKind`] used.
    #[must_use]
    pub fn kind(&self) -> PaymentKind {
        self.kind
    }
}

define_kind! {
    #[doc = "Kind of a [`Payment`]."]
    enum PaymentKind {
        #[doc = "Paid online."]
        Online = 1,

        #[doc = "Paid in cash."]
        Cash = 2,
    }
}

define_kind! {
    #[doc = "Refund status of a [`Booking`]."]
    enum RefundStatus {
        #[doc = "Refund is not disbursed yet."]
        NotDisbursed = 1,

        #[doc = "Refund is not applicable."]
        NotApplicable = 2,

        #[doc = "Refund is disbursed."]
        Disbursed = 3,
    }
}

/// Reason a [`Booking`] is cancelled with.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Creates a new [`CancellationReason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`CancellationReason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 1024
    }
}

impl FromStr for CancellationReason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CancellationReason`")
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was cancelled.
pub type CancellationDateTime = DateTimeOf<(Booking, unit::Cancellation)>;

/// [`DateTime`] of a [`Booking`] journey.
pub type JourneyDateTime = DateTimeOf<(Booking, unit::Journey)>;

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use common::{Currency, Money};
    use rust_decimal::Decimal;

    use super::{
        Age, Code, FullName, Gender, Passenger, Passengers, Payment,
        PaymentKind,
    };

    fn passenger(age: u8) -> Passenger {
        Passenger {
            full_name: FullName::new("Anna Joseph").unwrap(),
            age: Age::new(age).unwrap(),
            gender: Gender::Female,
        }
    }

    #[test]
    fn generated_code_is_valid() {
        let codes = (0..1000).map(|_| Code::generate()).collect::<Vec<_>>();
        for code in &codes {
            assert!(Code::new(code.to_string()).is_some(), "{code}");
        }
        assert!(codes.iter().collect::<HashSet<_>>().len() > 990);
    }

    #[test]
    fn code_format() {
        assert!(Code::new("BK-7Q2M9XK4").is_some());
        assert!(Code::new("BK-7Q2M9XK").is_none());
        assert!(Code::new("bk-7Q2M9XK4").is_none());
        assert!(Code::new("BK-7Q2M9XKI").is_none());
        assert!(Code::new("BK-7Q2M9XKU").is_none());
    }

    #[test]
    fn passengers_are_not_empty() {
        assert!(Passengers::new(vec![]).is_none());
        assert!(Passengers::new(vec![passenger(30)]).is_some());
    }

    #[test]
    fn passenger_summary() {
        let summary = Passengers::new(vec![
            passenger(34),
            passenger(18),
            passenger(17),
        ])
        .unwrap()
        .summary();
        assert_eq!(summary.adults, 2);
        assert_eq!(summary.kids, 1);
        assert_eq!(summary.to_string(), "2 Adults, 1 Kid");

        let summary = Passengers::new(vec![passenger(40)]).unwrap().summary();
        assert_eq!(summary.to_string(), "1 Adult, 0 Kids");
    }

    #[test]
    fn age_bounds() {
        assert!(Age::new(0).is_some());
        assert!(Age::new(151).is_none());
        assert!(Age::try_from(-3_i16).is_err());
        assert!(!Age::new(17).unwrap().is_adult());
        assert!(Age::new(18).unwrap().is_adult());
    }

    #[test]
    fn payment_is_not_negative() {
        let amount = |a: i64| Money {
            amount: Decimal::from(a),
            currency: Currency::Inr,
        };
        assert!(Payment::new(amount(0), PaymentKind::Cash).is_some());
        assert!(Payment::new(amount(1500), PaymentKind::Online).is_some());
        assert!(Payment::new(amount(-1), PaymentKind::Online).is_none());
    }
}
