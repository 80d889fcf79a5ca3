//! [`Percent`]-related definitions.

use derive_more::Display;
use rust_decimal::Decimal;

/// Percentage in the `0..=100` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "Decimal", into = "Decimal")
)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] if the provided `val` lies in the `0..=100`
    /// range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Calculates the [`Percent`] the `part` makes of the `whole`, rounded to
    /// 2 decimal places.
    ///
    /// [`None`] if the `whole` is zero or the `part` exceeds it.
    #[must_use]
    pub fn ratio(part: u32, whole: u32) -> Option<Self> {
        if whole == 0 {
            return None;
        }
        let ratio = Decimal::from(part) * Decimal::ONE_HUNDRED
            / Decimal::from(whole);
        Self::new(ratio.round_dp(2))
    }

    /// Returns the [`Decimal`] value of this [`Percent`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl From<Percent> for Decimal {
    fn from(p: Percent) -> Self {
        p.0
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = &'static str;

    fn try_from(val: Decimal) -> Result<Self, Self::Error> {
        Self::new(val).ok_or("percent out of `0..=100` range")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::Percent;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn bounds() {
        assert!(Percent::new(decimal("0")).is_some());
        assert!(Percent::new(decimal("100")).is_some());
        assert!(Percent::new(decimal("-0.01")).is_none());
        assert!(Percent::new(decimal("100.01")).is_none());
    }

    #[test]
    fn ratio() {
        assert_eq!(Percent::ratio(1, 2).unwrap().value(), decimal("50"));
        assert_eq!(Percent::ratio(1, 3).unwrap().value(), decimal("33.33"));
        assert_eq!(Percent::ratio(2, 3).unwrap().value(), decimal("66.67"));
        assert_eq!(Percent::ratio(0, 7).unwrap().value(), decimal("0"));
        assert_eq!(Percent::ratio(7, 7).unwrap().value(), decimal("100"));
        assert!(Percent::ratio(1, 0).is_none());
        assert!(Percent::ratio(8, 7).is_none());
    }
}
