//! Report read definitions.

use std::fmt;

use common::Currency;
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::{Boat, Booking};

/// Total numbers of [`Booking`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    /// Number of not cancelled [`Booking`]s.
    pub bookings: u64,

    /// Number of cancelled [`Booking`]s.
    pub cancellations: u64,
}

/// Total numbers of meals ordered along with [`Booking`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MealTotals {
    /// Number of breakfasts.
    pub breakfast: u64,

    /// Number of vegetarian lunches.
    pub veg: u64,

    /// Number of non-vegetarian lunches.
    pub non_veg: u64,
}

impl MealTotals {
    /// Returns the total number of meals.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.breakfast + self.veg + self.non_veg
    }
}

/// Calendar month.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Month {
    /// Year of this [`Month`].
    pub year: i32,

    /// Number of this [`Month`] in the year, in `1..=12` range.
    pub month: u8,
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Payments of [`Booking`]s journeying in a [`Month`], in a single
/// [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonthlyRevenue {
    /// [`Month`] of the journeys.
    pub month: Month,

    /// [`Currency`] of the payments.
    pub currency: Currency,

    /// Sum of payments of all the [`Booking`]s.
    pub revenue: Decimal,

    /// Sum of payments of cancelled [`Booking`]s.
    pub cancelled: Decimal,
}

pub mod meals_by_boat {
    //! Meals per [`Boat`] definitions.

    use common::define_pagination;

    use crate::domain::boat;
    #[cfg(doc)]
    use crate::domain::{Boat, Booking};

    define_pagination!(Row, ());

    /// Meals ordered along with not cancelled [`Booking`]s of a single
    /// [`Boat`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Row {
        /// Name of the [`Boat`].
        pub boat_name: boat::Name,

        /// Number of passengers of the [`Booking`]s.
        pub passengers: u64,

        /// Number of breakfasts.
        pub breakfast: u64,

        /// Number of vegetarian lunches.
        pub veg: u64,

        /// Number of non-vegetarian lunches.
        pub non_veg: u64,
    }

    impl Row {
        /// Returns the total number of meals in this [`Row`].
        #[must_use]
        pub fn total(&self) -> u64 {
            self.breakfast + self.veg + self.non_veg
        }
    }
}
