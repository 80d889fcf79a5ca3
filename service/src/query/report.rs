//! Report [`Query`] collection.

pub mod occupancy;
pub mod revenue;

use common::operations::By;

use crate::read::report::{meals_by_boat, MealTotals};
#[cfg(doc)]
use crate::{domain::Booking, Query};

use super::DatabaseQuery;

pub use self::{occupancy::Occupancy, revenue::Revenue};

/// Queries total numbers of not cancelled and cancelled [`Booking`]s.
pub type Totals = DatabaseQuery<By<crate::read::report::Totals, ()>>;

/// Queries total numbers of meals ordered along with all the [`Booking`]s.
pub type Meals = DatabaseQuery<By<MealTotals, ()>>;

/// Queries numbers of meals grouped by boats.
pub type MealsByBoat =
    DatabaseQuery<By<meals_by_boat::Page, meals_by_boat::Selector>>;

#[cfg(test)]
mod spec {
    use crate::{
        command::{CancelBooking, ReserveSeat},
        domain::booking,
        fixture,
        read::report::{meals_by_boat, MealTotals, Totals as TotalsRow},
        Command as _,
    };

    use super::{Meals, MealsByBoat, Totals};

    fn with_meals(
        name: &str,
        breakfast: u16,
        veg_lunch: u16,
        non_veg_lunch: u16,
    ) -> ReserveSeat {
        ReserveSeat {
            extras: booking::Extras {
                breakfast,
                veg_lunch,
                non_veg_lunch,
                ..booking::Extras::default()
            },
            ..fixture::reserve_seat(name)
        }
    }

    #[tokio::test]
    async fn counts_totals_and_meals() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 10).await;
        _ = fixture::active_boat(&svc, "River Queen", 10).await;

        _ = svc.execute(with_meals("Sea Pearl", 1, 2, 0)).await.unwrap();
        _ = svc.execute(with_meals("River Queen", 0, 1, 3)).await.unwrap();
        let cancelled =
            svc.execute(with_meals("Sea Pearl", 4, 0, 0)).await.unwrap();
        _ = svc
            .execute(CancelBooking {
                code: cancelled.code,
                reason: None,
            })
            .await
            .unwrap();

        let totals = svc.execute(Totals::by(())).await.unwrap();
        assert_eq!(totals, TotalsRow {
            bookings: 2,
            cancellations: 1,
        });

        let meals = svc.execute(Meals::by(())).await.unwrap();
        assert_eq!(meals, MealTotals {
            breakfast: 5,
            veg: 3,
            non_veg: 3,
        });
        assert_eq!(meals.total(), 11);

        let page = svc
            .execute(MealsByBoat::by(meals_by_boat::Selector {
                arguments: meals_by_boat::Arguments::default(),
                filter: (),
            }))
            .await
            .unwrap();
        let rows = page
            .nodes
            .iter()
            .map(|r| (r.boat_name.to_string(), r.passengers, r.total()))
            .collect::<Vec<_>>();
        assert_eq!(rows, [
            ("River Queen".to_owned(), 1, 4),
            ("Sea Pearl".to_owned(), 1, 3),
        ]);
        assert!(!page.has_more);
    }
}
