//! REST API definitions.

pub mod boat;
pub mod booking;
pub mod dashboard;
pub mod meal;
pub mod pricing;

use std::{fmt, str::FromStr};

use axum::{
    routing::{get, post, put},
    Router,
};
use common::{pagination, DateTime};
use serde::{Deserialize, Serialize};

use crate::{Data, Error};

/// Builds the [`Router`] serving the whole REST API.
///
/// Handlers expect the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/boat/addBoat", post(boat::add))
        .route("/boat/getBoatList", get(boat::list))
        .route("/boat/getBoatById/:id", get(boat::by_id))
        .route(
            "/boat/updateActiveStatusOfBoat/:id",
            put(boat::update_activity),
        )
        .route("/boat/updateWillActive/:id", put(boat::schedule_activation))
        .route("/boat/mobile", get(boat::available))
        .route("/boat/mobile/:id", get(boat::features))
        .route("/booking/book", post(booking::book))
        .route("/booking/cancelBooking", put(booking::cancel))
        .route("/booking/getBookingData", get(booking::list))
        .route("/booking/getCancelledBookings", get(booking::cancelled))
        .route(
            "/booking/getBookingsWithInsurance",
            get(booking::with_insurance),
        )
        .route(
            "/booking/getBookingsWithTourGuide",
            get(booking::with_tour_guide),
        )
        .route("/booking/getTodaysBookings", get(booking::todays))
        .route("/booking/getBookingById/:id", get(booking::by_id))
        .route("/booking/getBookingByPhone/:phone", get(booking::by_phone))
        .route("/pricing/getBoatsWithPrices", get(pricing::list))
        .route("/pricing/updatePrice/:id", put(pricing::update))
        .route("/meal/getStatistics", get(meal::statistics))
        .route("/meal/getMealBoatViaDetails", get(meal::by_boat))
        .route("/meal/getBookingOverview", get(meal::overview))
        .route("/dashboard/getGraphOfBookedSeat", get(dashboard::occupancy))
        .route(
            "/dashboard/getTotalBookingsAndCancellations",
            get(dashboard::totals),
        )
        .route("/dashboard/getStatsForGraph", get(dashboard::revenue))
}

/// Liveness probe.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
async fn liveness() -> Data<&'static str> {
    Data("server is running")
}

/// Pagination query parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Pagination {
    /// Number of items to skip.
    pub skip: Option<i64>,

    /// Maximum number of items to return.
    pub limit: Option<i64>,
}

impl Pagination {
    /// Validates these [`Pagination`] parameters into
    /// [`pagination::Arguments`].
    ///
    /// # Errors
    ///
    /// Names the invalid parameter if any.
    pub fn arguments(self) -> Result<pagination::Arguments, Error> {
        let Self { skip, limit } = self;
        if skip.is_some_and(|s| s < 0) {
            return Err(Error::validation("skip", &"must not be negative"));
        }
        pagination::Arguments::new(skip, limit).ok_or_else(|| {
            Error::validation(
                "limit",
                &format_args!(
                    "must be in `1..={}` range",
                    pagination::Arguments::MAX_LIMIT,
                ),
            )
        })
    }
}

/// A page of serialized nodes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Nodes on this [`Page`].
    pub items: Vec<T>,

    /// Number of nodes skipped before this [`Page`].
    pub skip: usize,

    /// Maximum number of nodes on this [`Page`].
    pub limit: usize,

    /// Indicator whether there are more nodes after this [`Page`].
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Converts the provided [`pagination::Page`] into a serializable one.
    pub fn from_page<I>(
        page: pagination::Page<I>,
        f: impl FnMut(I) -> T,
    ) -> Self {
        let pagination::Page {
            nodes,
            offset,
            limit,
            has_more,
        } = page;
        Self {
            items: nodes.into_iter().map(f).collect(),
            skip: offset,
            limit,
            has_more,
        }
    }
}

/// Parses the request `field` out of the provided `value`.
///
/// # Errors
///
/// Names the `field` if the `value` is malformed.
pub fn parse<T>(field: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e| Error::validation(field, &e))
}

/// Checks that the request `field` is provided.
///
/// # Errors
///
/// Names the `field` if it's missing.
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::missing(field))
}

/// Parses a [`DateTime`] out of the request `field`, accepting either an
/// RFC 3339 date and time or a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Names the `field` if the `value` is malformed.
pub fn date_time(field: &str, value: &str) -> Result<DateTime, Error> {
    DateTime::parse(value).map_err(|e| Error::validation(field, &e))
}

#[cfg(test)]
mod spec {
    use common::pagination::Arguments;

    use super::{required, Pagination};

    #[test]
    fn validates_pagination() {
        assert_eq!(
            Pagination::default().arguments().unwrap(),
            Arguments {
                offset: 0,
                limit: 10,
            },
        );
        assert_eq!(
            Pagination {
                skip: Some(20),
                limit: Some(100),
            }
            .arguments()
            .unwrap(),
            Arguments {
                offset: 20,
                limit: 100,
            },
        );

        for (skip, limit, field) in [
            (Some(-1), None, "`skip`"),
            (None, Some(0), "`limit`"),
            (None, Some(-3), "`limit`"),
            (None, Some(101), "`limit`"),
        ] {
            let err = Pagination { skip, limit }.arguments().unwrap_err();
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
            assert!(err.message.contains(field), "{err}");
        }
    }

    #[test]
    fn names_missing_field() {
        let err = required::<u8>("boatName", None).unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.message, "Missing `boatName`");
    }
}
