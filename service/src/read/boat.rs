//! [`Boat`]-related read definitions.

#[cfg(doc)]
use crate::domain::Boat;

/// Selector of all the active [`Boat`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct Active;

pub mod list {
    //! [`Boat`] list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{boat, Boat};

    define_pagination!(Boat, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`boat::Name`] (or its part) to fuzzy search for.
        pub name: Option<boat::Name>,

        /// Activity of the [`Boat`]s to select, if any.
        pub is_active: Option<bool>,

        /// Indicator whether to select only [`Boat`]s with available seats.
        pub has_available_seats: bool,
    }

    impl Filter {
        /// Checks whether the provided [`Boat`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, boat: &Boat) -> bool {
            let Self {
                name,
                is_active,
                has_available_seats,
            } = self;

            name.as_ref().map_or(true, |n| fuzzy_match(n, &boat.name))
                && is_active.map_or(true, |a| a == boat.is_active)
                && (!has_available_seats || boat.seats.available() > 0)
        }
    }

    /// Checks whether any word of the `pattern` is contained in the `name`,
    /// ignoring case.
    fn fuzzy_match(pattern: &boat::Name, name: &boat::Name) -> bool {
        let name = AsRef::<str>::as_ref(name).to_lowercase();
        AsRef::<str>::as_ref(pattern)
            .split_whitespace()
            .any(|w| name.contains(&w.to_lowercase()))
    }

    /// Total count of [`Boat`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);

    #[cfg(test)]
    mod spec {
        use crate::domain::boat;

        use super::fuzzy_match;

        fn name(s: &str) -> boat::Name {
            boat::Name::new(s).unwrap()
        }

        #[test]
        fn matches_any_word_ignoring_case() {
            assert!(fuzzy_match(&name("pearl"), &name("Sea Pearl")));
            assert!(fuzzy_match(&name("RIVER sea"), &name("Sea Pearl")));
            assert!(fuzzy_match(&name("a"), &name("Sea Pearl")));
        }

        #[test]
        fn rejects_when_no_word_is_contained() {
            assert!(!fuzzy_match(&name("river"), &name("Sea Pearl")));
            assert!(!fuzzy_match(&name("pearls"), &name("Sea Pearl")));
        }
    }
}
