//! Dashboard endpoints.

use axum::{extract::Query, Extension};
use axum_extra::extract::WithRejection;
use common::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{query, read, Query as _};

use crate::{AsError, Data, Error, Service};

/// Seat occupancy of a boat.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy {
    /// Name of the boat.
    pub boat_name: String,

    /// Total number of seats.
    pub capacity: u16,

    /// Number of seats still available.
    pub available_seats: u16,

    /// Percent of the booked seats, rounded to 2 decimal places.
    pub booked_percent: Decimal,
}

impl From<query::report::occupancy::Row> for Occupancy {
    fn from(row: query::report::occupancy::Row) -> Self {
        Self {
            boat_name: row.boat_name.to_string(),
            capacity: row.capacity.into(),
            available_seats: row.available,
            booked_percent: row.booked.into(),
        }
    }
}

/// Returns seat occupancy of every active boat.
#[tracing::instrument(skip_all)]
pub async fn occupancy(
    Extension(svc): Extension<Service>,
) -> crate::Result<Vec<Occupancy>> {
    let rows = svc
        .execute(query::report::Occupancy)
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(rows.into_iter().map(Occupancy::from).collect()))
}

/// Total numbers of bookings.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Number of not cancelled bookings.
    pub total_bookings: u64,

    /// Number of cancelled bookings.
    pub total_cancellations: u64,
}

/// Returns total numbers of bookings and cancellations.
#[tracing::instrument(skip_all)]
pub async fn totals(
    Extension(svc): Extension<Service>,
) -> crate::Result<Totals> {
    let read::report::Totals {
        bookings,
        cancellations,
    } = svc
        .execute(query::report::Totals::by(()))
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(Totals {
        total_bookings: bookings,
        total_cancellations: cancellations,
    }))
}

/// Query parameters of the revenue graph.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct RevenueParams {
    /// Number of the last months to report, the current one included.
    pub months: Option<u8>,
}

/// Revenue of a single month in a single currency.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    /// Month as `YYYY-MM`.
    pub month: String,

    /// Currency of the amounts.
    pub currency: Currency,

    /// Sum of payments of all the bookings.
    pub revenue: Decimal,

    /// Sum of payments of cancelled bookings.
    pub cancelled: Decimal,
}

impl From<read::report::MonthlyRevenue> for Revenue {
    fn from(r: read::report::MonthlyRevenue) -> Self {
        Self {
            month: r.month.to_string(),
            currency: r.currency,
            revenue: r.revenue,
            cancelled: r.cancelled,
        }
    }
}

/// Returns monthly revenue over the last months.
#[tracing::instrument(skip_all)]
pub async fn revenue(
    Extension(svc): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<
        Query<RevenueParams>,
        Error,
    >,
) -> crate::Result<Vec<Revenue>> {
    let report = params.months.map_or_else(
        query::report::Revenue::default,
        |months| query::report::Revenue { months },
    );

    let rows = svc.execute(report).await.map_err(AsError::into_error)?;
    Ok(Data(rows.into_iter().map(Revenue::from).collect()))
}

#[cfg(test)]
mod spec {
    use common::Currency;
    use rust_decimal::Decimal;
    use serde_json::json;
    use service::read::report::{Month, MonthlyRevenue};

    use super::Revenue;

    #[test]
    fn renders_revenue_month() {
        let row = Revenue::from(MonthlyRevenue {
            month: Month {
                year: 2030,
                month: 5,
            },
            currency: Currency::Inr,
            revenue: Decimal::from(4500),
            cancelled: Decimal::from(1500),
        });

        assert_eq!(
            serde_json::to_value(row).unwrap(),
            json!({
                "month": "2030-05",
                "currency": "INR",
                "revenue": "4500",
                "cancelled": "1500",
            }),
        );
    }
}
