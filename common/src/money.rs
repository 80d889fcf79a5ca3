//! [`Money`]-related definitions.

use std::fmt;

use rust_decimal::Decimal;

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Indicates whether this [`Money`] amount is below zero.
    ///
    /// A negative zero is not.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

/// Trailing zeros of the amount are omitted.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.currency)
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Indian Rupee."]
        Inr = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Euro."]
        Eur = 3,
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn inr(amount: &str) -> Money {
        Money {
            amount: amount.parse().unwrap(),
            currency: Currency::Inr,
        }
    }

    #[test]
    fn displays_normalized_amount() {
        assert_eq!(inr("1499.50").to_string(), "1499.5 INR");
        assert_eq!(inr("1500.00").to_string(), "1500 INR");
        assert_eq!(Money::zero(Currency::Eur).to_string(), "0 EUR");
    }

    #[test]
    fn sign() {
        assert!(!Money::zero(Currency::Inr).is_negative());
        assert!(!inr("0.00").is_negative());
        assert!(!inr("-0").is_negative());
        assert!(inr("-1.5").is_negative());
        assert!(!Money {
            amount: Decimal::ONE,
            currency: Currency::Usd,
        }
        .is_negative());
    }

    #[test]
    fn currency_codes() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!("EUR".parse::<Currency>(), Ok(Currency::Eur));
        assert!("usd".parse::<Currency>().is_err());
    }
}
