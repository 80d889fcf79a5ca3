//! [`Booking`]-related read definitions.

#[cfg(doc)]
use crate::domain::Booking;

pub mod list {
    //! [`Booking`] list definitions.

    use std::ops::{Range, RangeInclusive};

    use common::define_pagination;

    use crate::domain::{booking, Booking, Phone};

    define_pagination!(Booking, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`Status`] of the [`Booking`]s to select, if any.
        pub status: Option<Status>,

        /// [`Meal`]s the [`Booking`]s to select must have ordered, if any.
        ///
        /// Excludes cancelled [`Booking`]s.
        pub meal: Option<Meal>,

        /// Contact [`Phone`] of the [`Booking`]s to select, if any.
        pub phone: Option<Phone>,

        /// Range the journey of the [`Booking`]s to select falls into, if any.
        pub journey: Option<RangeInclusive<booking::JourneyDateTime>>,

        /// Range the creation of the [`Booking`]s to select falls into, if
        /// any.
        ///
        /// Excludes cancelled [`Booking`]s.
        pub created: Option<Range<booking::CreationDateTime>>,
    }

    impl Filter {
        /// Checks whether the provided [`Booking`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, booking: &Booking) -> bool {
            let Self {
                status,
                meal,
                phone,
                journey,
                created,
            } = self;

            status.map_or(true, |s| s.matches(booking))
                && meal.map_or(true, |m| {
                    !booking.is_cancelled() && m.matches(&booking.extras)
                })
                && phone.as_ref().map_or(true, |p| *p == booking.phone)
                && journey
                    .as_ref()
                    .map_or(true, |r| r.contains(&booking.journey_at))
                && created.as_ref().map_or(true, |r| {
                    !booking.is_cancelled() && r.contains(&booking.created_at)
                })
        }
    }

    /// Status of a [`Booking`] to select.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Status {
        /// Cancelled [`Booking`]s.
        Cancelled,

        /// Not cancelled [`Booking`]s.
        NotCancelled,

        /// Not cancelled [`Booking`]s with an insurance.
        WithInsurance,

        /// Not cancelled [`Booking`]s with a tour guide.
        WithTourGuide,
    }

    impl Status {
        /// Checks whether the provided [`Booking`] has this [`Status`].
        #[must_use]
        pub fn matches(self, booking: &Booking) -> bool {
            match self {
                Self::Cancelled => booking.is_cancelled(),
                Self::NotCancelled => !booking.is_cancelled(),
                Self::WithInsurance => {
                    !booking.is_cancelled() && booking.extras.insurance
                }
                Self::WithTourGuide => {
                    !booking.is_cancelled() && booking.extras.tour_guide
                }
            }
        }
    }

    /// Meals ordered along with a [`Booking`].
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Meal {
        /// At least one vegetarian lunch.
        Veg,

        /// At least one non-vegetarian lunch.
        NonVeg,

        /// At least one lunch of any kind.
        Both,
    }

    impl Meal {
        /// Checks whether the provided [`booking::Extras`] contain this
        /// [`Meal`].
        #[must_use]
        pub fn matches(self, extras: &booking::Extras) -> bool {
            match self {
                Self::Veg => extras.veg_lunch > 0,
                Self::NonVeg => extras.non_veg_lunch > 0,
                Self::Both => extras.veg_lunch > 0 || extras.non_veg_lunch > 0,
            }
        }
    }
}
