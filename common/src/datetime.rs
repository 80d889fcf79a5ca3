//! UTC date and time tagged with what it describes.

use std::{cmp::Ordering, marker::PhantomData, ops, time::Duration};

use derive_more::{Debug, Display, Error};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date,
    Month, OffsetDateTime, Time, UtcOffset,
};

/// Untagged date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time of microsecond precision, tagged with the `Of` type.
///
/// The tag prevents, for example, a boat activation moment from being passed
/// where a booking journey date is expected. Use [`DateTimeOf::coerce()`] to
/// retag explicitly.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Moment in UTC, truncated to microseconds.
    utc: OffsetDateTime,

    /// What this moment describes.
    #[debug(skip)]
    tag: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Wraps the provided moment, which must already be in UTC and truncated
    /// to microseconds.
    const fn wrap(utc: OffsetDateTime) -> Self {
        Self {
            utc,
            tag: PhantomData,
        }
    }

    /// Returns the current moment.
    #[must_use]
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        let micros = now.nanosecond() / 1_000 * 1_000;
        Self::wrap(now.replace_nanosecond(micros).unwrap_or(now))
    }

    /// Parses an [RFC 3339] date and time.
    ///
    /// # Errors
    ///
    /// If the `input` is not an [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        let dt = OffsetDateTime::parse(input, &Rfc3339)
            .map_err(ParseError::Malformed)?;
        dt.try_into().map_err(ParseError::OutOfRange)
    }

    /// Parses a `YYYY-MM-DD` date into the UTC midnight of that date.
    ///
    /// # Errors
    ///
    /// If the `input` is not a `YYYY-MM-DD` date.
    pub fn from_date(input: &str) -> Result<Self, ParseError> {
        Date::parse(input, format_description!("[year]-[month]-[day]"))
            .map(|d| Self::wrap(d.midnight().assume_utc()))
            .map_err(ParseError::Malformed)
    }

    /// Parses either an [RFC 3339] date and time or a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// If the `input` is in neither of these formats. The [RFC 3339] parsing
    /// error is reported then.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_rfc3339(input)
            .or_else(|e| Self::from_date(input).map_err(|_| e))
    }

    /// Formats this moment as [RFC 3339].
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        // Only years outside `0..=9999` fail, and those are never parsed nor
        // produced by `now()`.
        self.utc.format(&Rfc3339).unwrap_or_else(|e| {
            panic!("`DateTime` out of RFC 3339 range: {e}")
        })
    }

    /// Retags this moment.
    #[must_use]
    pub const fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf::wrap(self.utc)
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.utc.year()
    }

    /// Calendar month, in `1..=12`.
    #[must_use]
    pub fn month(&self) -> u8 {
        self.utc.month().into()
    }

    /// Returns the UTC midnight of this moment's day.
    #[must_use]
    pub fn start_of_day(self) -> Self {
        Self::wrap(self.utc.replace_time(Time::MIDNIGHT))
    }

    /// Returns the UTC midnight of the first day of the month lying the
    /// given number of `months` away from this moment's month.
    ///
    /// [`None`] if that month is out of range.
    #[must_use]
    pub fn start_of_month(self, months: i32) -> Option<Self> {
        let current = self.year().checked_mul(12)? + i32::from(self.month());
        let target = current.checked_add(months)? - 1;
        let month = u8::try_from(target.rem_euclid(12) + 1).ok()?;
        Date::from_calendar_date(
            target.div_euclid(12),
            Month::try_from(month).ok()?,
            1,
        )
        .ok()
        .map(|d| Self::wrap(d.midnight().assume_utc()))
    }
}

/// Error of parsing a [`DateTime`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ParseError {
    /// Input is not in the expected format.
    #[display("malformed date and time: {_0}")]
    Malformed(time::error::Parse),

    /// Input is well-formed, but doesn't fit into a [`DateTime`].
    #[display("date and time out of range: {_0}")]
    OutOfRange(time::error::ComponentRange),
}

impl<Of: ?Sized> TryFrom<OffsetDateTime> for DateTimeOf<Of> {
    type Error = time::error::ComponentRange;

    fn try_from(dt: OffsetDateTime) -> Result<Self, Self::Error> {
        let utc = dt.to_offset(UtcOffset::UTC);
        utc.replace_microsecond(utc.microsecond()).map(Self::wrap)
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.utc
    }
}

impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Of: ?Sized> Copy for DateTimeOf<Of> {}

impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}
impl<Of: ?Sized> Eq for DateTimeOf<Of> {}

impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self::wrap(self.utc + rhs)
    }
}

impl<Of: ?Sized> ops::Sub<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        Self::wrap(self.utc - rhs)
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    //! `TIMESTAMPTZ` mapping.

    use std::error::Error as StdError;

    use postgres_types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    };
    use time::OffsetDateTime;

    use super::DateTimeOf;

    type BoxError = Box<dyn StdError + Send + Sync>;

    impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
        accepts!(TIMESTAMPTZ);

        fn from_sql(ty: &Type, raw: &[u8]) -> Result<Self, BoxError> {
            Ok(OffsetDateTime::from_sql(ty, raw)?.try_into()?)
        }
    }

    impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
        accepts!(TIMESTAMPTZ);
        to_sql_checked!();

        fn to_sql(
            &self,
            ty: &Type,
            w: &mut BytesMut,
        ) -> Result<IsNull, BoxError> {
            self.utc.to_sql(ty, w)
        }
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! [RFC 3339] string representation.
    //!
    //! Plain `YYYY-MM-DD` dates are accepted as well.
    //!
    //! [RFC 3339]: https://tools.ietf.org/html/rfc3339

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::DateTimeOf;

    impl<Of: ?Sized> Serialize for DateTimeOf<Of> {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&self.to_rfc3339())
        }
    }

    impl<'de, Of: ?Sized> Deserialize<'de> for DateTimeOf<Of> {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let input = String::deserialize(d)?;
            Self::parse(&input).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use super::DateTime;

    #[test]
    fn parses_rfc3339_and_dates() {
        let dt = DateTime::parse("2024-03-15T10:20:30Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-15T10:20:30Z");

        let dt = DateTime::parse("2024-03-15T12:20:30+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-15T10:20:30Z");

        let dt = DateTime::parse("2024-03-15").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-15T00:00:00Z");

        assert!(DateTime::parse("15/03/2024").is_err());
        assert!(DateTime::parse("2024-13-01").is_err());
    }

    #[test]
    fn day_and_month_boundaries() {
        let dt = DateTime::parse("2024-03-15T10:20:30Z").unwrap();

        assert_eq!(dt.start_of_day().to_rfc3339(), "2024-03-15T00:00:00Z");
        assert_eq!(
            dt.start_of_month(0).unwrap().to_rfc3339(),
            "2024-03-01T00:00:00Z",
        );
        assert_eq!(
            dt.start_of_month(1).unwrap().to_rfc3339(),
            "2024-04-01T00:00:00Z",
        );
        assert_eq!(
            dt.start_of_month(-3).unwrap().to_rfc3339(),
            "2023-12-01T00:00:00Z",
        );
        assert_eq!(
            dt.start_of_month(10).unwrap().to_rfc3339(),
            "2025-01-01T00:00:00Z",
        );
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 3);
    }

    #[test]
    fn now_has_microsecond_precision() {
        let now = time::OffsetDateTime::from(DateTime::now());
        assert_eq!(now.nanosecond() % 1_000, 0);
    }
}
