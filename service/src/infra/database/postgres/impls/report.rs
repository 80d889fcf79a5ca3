//! Report-related [`Database`] implementations.

use std::ops::Range;

use common::{
    operations::{By, Select},
    Currency,
};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{boat, booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::report::{meals_by_boat, MealTotals, Month, MonthlyRevenue, Totals},
};

/// Reads a non-negative aggregated count out of the provided `column`.
fn count(row: &Row, column: &str) -> u64 {
    u64::try_from(row.get::<_, i64>(column)).expect("counts are non-negative")
}

impl<C> Database<Select<By<Totals, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Totals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Totals, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*) FILTER (WHERE cancelled_at IS NULL) \
                       AS bookings, \
                   COUNT(*) FILTER (WHERE cancelled_at IS NOT NULL) \
                       AS cancellations \
            FROM bookings";
        let row = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists");
        Ok(Totals {
            bookings: count(&row, "bookings"),
            cancellations: count(&row, "cancellations"),
        })
    }
}

impl<C> Database<Select<By<MealTotals, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = MealTotals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<MealTotals, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COALESCE(SUM(breakfast), 0)::INT8 AS breakfast, \
                   COALESCE(SUM(veg_lunch), 0)::INT8 AS veg, \
                   COALESCE(SUM(non_veg_lunch), 0)::INT8 AS non_veg \
            FROM bookings";
        let row = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists");
        Ok(MealTotals {
            breakfast: count(&row, "breakfast"),
            veg: count(&row, "veg"),
            non_veg: count(&row, "non_veg"),
        })
    }
}

impl<C>
    Database<Select<By<Vec<MonthlyRevenue>, Range<booking::JourneyDateTime>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<MonthlyRevenue>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<MonthlyRevenue>, Range<booking::JourneyDateTime>>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let Range { start, end } = by.into_inner();

        const SQL: &str = "\
            SELECT EXTRACT(YEAR FROM journey_at AT TIME ZONE 'UTC')::INT4 \
                       AS year, \
                   EXTRACT(MONTH FROM journey_at AT TIME ZONE 'UTC')::INT2 \
                       AS month, \
                   payment_currency AS currency, \
                   SUM(payment_amount) AS revenue, \
                   SUM(payment_amount) \
                       FILTER (WHERE cancelled_at IS NOT NULL) \
                       AS cancelled \
            FROM bookings \
            WHERE journey_at >= $1::TIMESTAMPTZ \
              AND journey_at < $2::TIMESTAMPTZ \
            GROUP BY year, month, currency \
            ORDER BY year ASC, month ASC, currency ASC";
        Ok(self
            .query(SQL, &[&start, &end])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| MonthlyRevenue {
                month: Month {
                    year: row.get("year"),
                    month: u8::try_from(row.get::<_, i16>("month"))
                        .expect("months are in `1..=12` range"),
                },
                currency: row.get::<_, Currency>("currency"),
                revenue: row
                    .get::<_, Option<Decimal>>("revenue")
                    .unwrap_or_default(),
                cancelled: row
                    .get::<_, Option<Decimal>>("cancelled")
                    .unwrap_or_default(),
            })
            .collect())
    }
}

impl<C> Database<Select<By<meals_by_boat::Page, meals_by_boat::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = meals_by_boat::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<meals_by_boat::Page, meals_by_boat::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let meals_by_boat::Selector { arguments, .. } = by.into_inner();

        let limit = i64::try_from(arguments.fetch_limit())
            .expect("bounded by `Arguments::MAX_LIMIT`");
        let offset = i64::try_from(arguments.offset).unwrap_or(i64::MAX);

        const SQL: &str = "\
            SELECT b.boat_name, \
                   COALESCE(SUM(p.count), 0)::INT8 AS passengers, \
                   COALESCE(SUM(b.breakfast), 0)::INT8 AS breakfast, \
                   COALESCE(SUM(b.veg_lunch), 0)::INT8 AS veg, \
                   COALESCE(SUM(b.non_veg_lunch), 0)::INT8 AS non_veg \
            FROM bookings AS b \
            LEFT JOIN (\
                SELECT booking_id, COUNT(*) AS count \
                FROM booking_passengers \
                GROUP BY booking_id\
            ) AS p ON p.booking_id = b.id \
            WHERE b.cancelled_at IS NULL \
            GROUP BY b.boat_name \
            ORDER BY b.boat_name ASC \
            LIMIT $1::INT8 OFFSET $2::INT8";
        let rows = self
            .query(SQL, &[&limit, &offset])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(meals_by_boat::Page::from_overfetched(
            &arguments,
            rows.iter().map(|row| meals_by_boat::Row {
                boat_name: row.get::<_, boat::Name>("boat_name"),
                passengers: count(row, "passengers"),
                breakfast: count(row, "breakfast"),
                veg: count(row, "veg"),
                non_veg: count(row, "non_veg"),
            }),
        ))
    }
}
