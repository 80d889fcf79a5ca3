//! Meal statistics endpoints.

use axum::{extract::Query, Extension};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{query, read, Query as _};

use crate::{api, AsError, Data, Error, Service};

/// Numbers of ordered meals.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Number of breakfasts.
    pub breakfast: u64,

    /// Number of vegetarian lunches.
    pub veg: u64,

    /// Number of non-vegetarian lunches.
    pub non_veg: u64,

    /// Total number of meals.
    pub total_meals: u64,
}

impl From<read::report::MealTotals> for Statistics {
    fn from(totals: read::report::MealTotals) -> Self {
        Self {
            breakfast: totals.breakfast,
            veg: totals.veg,
            non_veg: totals.non_veg,
            total_meals: totals.total(),
        }
    }
}

/// Returns numbers of meals ordered along with all the bookings.
#[tracing::instrument(skip_all)]
pub async fn statistics(
    Extension(svc): Extension<Service>,
) -> crate::Result<Statistics> {
    svc.execute(query::report::Meals::by(()))
        .await
        .map(|t| Data(t.into()))
        .map_err(AsError::into_error)
}

/// Meals ordered on a single boat.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoatMeals {
    /// Name of the boat.
    pub boat_name: String,

    /// Number of passengers.
    pub passengers: u64,

    /// Numbers of the ordered meals.
    #[serde(flatten)]
    pub meals: Statistics,
}

impl From<read::report::meals_by_boat::Row> for BoatMeals {
    fn from(row: read::report::meals_by_boat::Row) -> Self {
        Self {
            meals: Statistics {
                breakfast: row.breakfast,
                veg: row.veg,
                non_veg: row.non_veg,
                total_meals: row.total(),
            },
            boat_name: row.boat_name.to_string(),
            passengers: row.passengers,
        }
    }
}

/// Lists numbers of meals of not cancelled bookings per boat, ordered by the
/// boat name.
#[tracing::instrument(skip_all)]
pub async fn by_boat(
    Extension(svc): Extension<Service>,
    WithRejection(Query(pagination), _): WithRejection<
        Query<api::Pagination>,
        Error,
    >,
) -> crate::Result<api::Page<BoatMeals>> {
    let page = svc
        .execute(query::report::MealsByBoat::by(
            read::report::meals_by_boat::Selector {
                arguments: pagination.arguments()?,
                filter: (),
            },
        ))
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(api::Page::from_page(page, BoatMeals::from)))
}

/// Query parameters of the meal overview.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OverviewParams {
    /// Number of bookings to skip.
    pub skip: Option<i64>,

    /// Maximum number of bookings to return.
    pub limit: Option<i64>,

    /// Ordered lunches to filter by: `veg`, `nonVeg` or `both`.
    #[serde(rename = "mealType")]
    pub meal_type: Option<String>,
}

/// Parses a [`read::booking::list::Meal`] out of its query value.
fn parse_meal(value: &str) -> Result<read::booking::list::Meal, Error> {
    use read::booking::list::Meal as M;

    match value {
        "veg" => Ok(M::Veg),
        "nonVeg" => Ok(M::NonVeg),
        "both" => Ok(M::Both),
        _ => {
            Err(Error::validation(
                "mealType",
                &format_args!("unknown `{value}`"),
            ))
        }
    }
}

/// Builds the meal overview [`read::booking::list::Filter`] out of the
/// optional `mealType` query value.
///
/// Without a meal type every not cancelled booking is selected.
fn overview_filter(
    meal_type: Option<&str>,
) -> Result<read::booking::list::Filter, Error> {
    Ok(read::booking::list::Filter {
        status: Some(read::booking::list::Status::NotCancelled),
        meal: meal_type.map(parse_meal).transpose()?,
        ..read::booking::list::Filter::default()
    })
}

/// Lists not cancelled bookings, optionally having lunches of some type
/// ordered.
#[tracing::instrument(skip_all)]
pub async fn overview(
    Extension(svc): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<
        Query<OverviewParams>,
        Error,
    >,
) -> crate::Result<api::Page<api::booking::Booking>> {
    let OverviewParams {
        skip,
        limit,
        meal_type,
    } = params;

    let selector = read::booking::list::Selector {
        arguments: api::Pagination { skip, limit }.arguments()?,
        filter: overview_filter(meal_type.as_deref())?,
    };
    api::booking::list_by(&svc, selector).await
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use service::{
        domain::boat,
        read::{
            booking::list::{Meal, Status},
            report::meals_by_boat::Row,
        },
    };

    use super::{overview_filter, parse_meal, BoatMeals, OverviewParams};

    #[test]
    fn flattens_boat_meals() {
        let row = Row {
            boat_name: boat::Name::new("Sea Pearl").unwrap(),
            passengers: 5,
            breakfast: 2,
            veg: 3,
            non_veg: 1,
        };

        assert_eq!(
            serde_json::to_value(BoatMeals::from(row)).unwrap(),
            json!({
                "boatName": "Sea Pearl",
                "passengers": 5,
                "breakfast": 2,
                "veg": 3,
                "nonVeg": 1,
                "totalMeals": 6,
            }),
        );
    }

    #[test]
    fn rejects_unknown_meal() {
        assert!(parse_meal("nonVeg").is_ok());
        let err = parse_meal("vegan").unwrap_err();
        assert!(err.message.contains("`mealType`"), "{err}");
    }

    #[test]
    fn overview_without_meal_type_selects_all_not_cancelled() {
        let filter = overview_filter(None).unwrap();

        assert_eq!(filter.status, Some(Status::NotCancelled));
        assert_eq!(filter.meal, None);
    }

    #[test]
    fn overview_filters_by_meal_type() {
        let params: OverviewParams =
            serde_json::from_value(json!({"mealType": "nonVeg"})).unwrap();
        let filter = overview_filter(params.meal_type.as_deref()).unwrap();

        assert_eq!(filter.status, Some(Status::NotCancelled));
        assert_eq!(filter.meal, Some(Meal::NonVeg));
        assert!(overview_filter(Some("vegan")).is_err());
    }
}
