//! [`Revenue`] report definition.

use std::ops::Range;

use common::{
    operations::{By, Select},
    DateTime,
};
use rust_decimal::Decimal;
use smart_default::SmartDefault;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Booking;
use crate::{
    domain::booking,
    infra::{database, Database},
    read::report::{Month, MonthlyRevenue},
    Query, Service,
};

/// [`Query`] of the monthly revenue over the last months, the current one
/// included.
///
/// [`Booking`]s are attributed to the month of their journey. Months without
/// any [`Booking`]s are reported with zero revenue in the default
/// [`Currency`] of the [`Service`].
///
/// [`Currency`]: common::Currency
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Revenue {
    /// Number of the months to report.
    #[default(3)]
    pub months: u8,
}

impl<Db> Query<Revenue> for Service<Db>
where
    Db: Database<
        Select<By<Vec<MonthlyRevenue>, Range<booking::JourneyDateTime>>>,
        Ok = Vec<MonthlyRevenue>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<MonthlyRevenue>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Revenue { months }: Revenue,
    ) -> Result<Self::Ok, Self::Err> {
        if months == 0 {
            return Ok(vec![]);
        }

        let now = DateTime::now();
        let (Some(start), Some(end)) = (
            now.start_of_month(1 - i32::from(months)),
            now.start_of_month(1),
        ) else {
            tracing::warn!(%months, "revenue period is out of date range");
            return Ok(vec![]);
        };

        let mut rows = self
            .database()
            .execute(Select(By::<Vec<MonthlyRevenue>, _>::new(
                start.coerce()..end.coerce(),
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let currency = self.config().default_currency;
        let mut month = Some(start);
        while let Some(m) = month.filter(|m| *m < end) {
            let key = Month {
                year: m.year(),
                month: m.month(),
            };
            if !rows.iter().any(|r| r.month == key) {
                rows.push(MonthlyRevenue {
                    month: key,
                    currency,
                    revenue: Decimal::ZERO,
                    cancelled: Decimal::ZERO,
                });
            }
            month = m.start_of_month(1);
        }
        rows.sort_by_key(|r| (r.month, r.currency.u8()));

        Ok(rows)
    }
}

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::{
        command::{CancelBooking, ReserveSeat},
        domain::booking,
        fixture, Command as _,
    };

    use super::Revenue;

    fn paid(name: &str, amount: i64, journey_at: DateTime) -> ReserveSeat {
        ReserveSeat {
            journey_at: journey_at.coerce(),
            payment: booking::Payment::new(
                Money {
                    amount: Decimal::from(amount),
                    currency: Currency::Inr,
                },
                booking::PaymentKind::Cash,
            )
            .unwrap(),
            ..fixture::reserve_seat(name)
        }
    }

    #[tokio::test]
    async fn sums_payments_per_journey_month() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 10).await;

        let this_month = DateTime::now().start_of_month(0).unwrap();
        let last_month = DateTime::now().start_of_month(-1).unwrap();
        let long_ago = DateTime::now().start_of_month(-5).unwrap();

        _ = svc.execute(paid("Sea Pearl", 1000, this_month)).await.unwrap();
        _ = svc.execute(paid("Sea Pearl", 500, this_month)).await.unwrap();
        let cancelled =
            svc.execute(paid("Sea Pearl", 700, last_month)).await.unwrap();
        _ = svc.execute(paid("Sea Pearl", 9000, long_ago)).await.unwrap();
        _ = svc
            .execute(CancelBooking {
                code: cancelled.code,
                reason: None,
            })
            .await
            .unwrap();

        let rows = svc.execute(Revenue::default()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].month < w[1].month));

        assert_eq!(rows[0].revenue, Decimal::ZERO);
        assert_eq!(rows[1].month.month, last_month.month());
        assert_eq!(rows[1].revenue, Decimal::from(700));
        assert_eq!(rows[1].cancelled, Decimal::from(700));
        assert_eq!(rows[2].month.month, this_month.month());
        assert_eq!(rows[2].revenue, Decimal::from(1500));
        assert_eq!(rows[2].cancelled, Decimal::ZERO);
    }
}
