//! [`Occupancy`] report definition.

use common::{
    operations::{By, Select},
    Percent,
};
use tracerr::Traced;

use crate::{
    domain::{boat, Boat},
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] of the seat occupancy of every active [`Boat`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Occupancy;

/// Seat occupancy of a single [`Boat`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    /// [`boat::Name`] of the [`Boat`].
    pub boat_name: boat::Name,

    /// [`boat::Capacity`] of the [`Boat`].
    pub capacity: boat::Capacity,

    /// Number of seats still available on the [`Boat`].
    pub available: u16,

    /// [`Percent`] of the booked seats.
    pub booked: Percent,
}

impl<Db> Query<Occupancy> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Boat>, read::boat::Active>>,
        Ok = Vec<Boat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Row>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Occupancy) -> Result<Self::Ok, Self::Err> {
        let boats = self
            .database()
            .execute(Select(By::<Vec<Boat>, _>::new(read::boat::Active)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(boats
            .into_iter()
            .map(|b| Row {
                booked: b.seats.occupancy(),
                capacity: b.seats.capacity(),
                available: b.seats.available(),
                boat_name: b.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{fixture, Query as _};

    use super::Occupancy;

    #[tokio::test]
    async fn calculates_booked_percent_of_active_boats() {
        let svc = fixture::service();
        _ = fixture::active_boat(&svc, "Sea Pearl", 3).await;
        _ = svc
            .execute(fixture::register_boat("River Queen", 4))
            .await
            .unwrap();
        _ = fixture::reserve(&svc, "Sea Pearl").await.unwrap();

        let rows = svc.execute(Occupancy).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].boat_name.to_string(), "Sea Pearl");
        assert_eq!(rows[0].available, 2);
        assert_eq!(Decimal::from(rows[0].booked), Decimal::new(3333, 2));
    }
}
