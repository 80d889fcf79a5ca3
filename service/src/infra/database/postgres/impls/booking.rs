//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Currency, Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{
        self,
        booking::list::{Meal, Status},
    },
};

/// Reads a [`booking::Extras`] count out of the provided `column`.
fn count(row: &Row, column: &str) -> u16 {
    u16::try_from(row.get::<_, i32>(column)).expect("written from `u16`")
}

/// Reads a [`Booking`] out of a `bookings` table [`Row`] and its
/// [`booking::Passengers`].
fn from_row(row: &Row, passengers: booking::Passengers) -> Booking {
    Booking {
        id: row.get("id"),
        code: row.get("code"),
        boat_name: row.get("boat_name"),
        phone: row.get("phone"),
        journey_at: row.get("journey_at"),
        passengers,
        extras: booking::Extras {
            private_car_4_seater: row.get("private_car_4_seater"),
            private_car_7_seater: row.get("private_car_7_seater"),
            shared_rides: row.get("shared_rides"),
            breakfast: count(row, "breakfast"),
            veg_lunch: count(row, "veg_lunch"),
            non_veg_lunch: count(row, "non_veg_lunch"),
            tour_guide: row.get("tour_guide"),
            insurance: row.get("insurance"),
        },
        payment: booking::Payment::new(
            Money {
                amount: row.get("payment_amount"),
                currency: row.get::<_, Currency>("payment_currency"),
            },
            row.get("payment_kind"),
        )
        .expect("`payment_amount` CHECK constraint"),
        refund_status: row.get("refund_status"),
        cancellation_reason: row.get("cancellation_reason"),
        created_at: row.get("created_at"),
        cancelled_at: row.get("cancelled_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<booking::Id, Booking>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[booking::Id]>,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[booking::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const PASSENGERS_SQL: &str = "\
            SELECT booking_id, full_name, age, gender \
            FROM booking_passengers \
            WHERE booking_id = ANY($1::UUID[]) \
            ORDER BY booking_id, position";
        let mut passengers = self
            .query(PASSENGERS_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let passenger = booking::Passenger {
                    full_name: row.get("full_name"),
                    age: booking::Age::try_from(row.get::<_, i16>("age"))
                        .expect("`age` CHECK constraint"),
                    gender: row.get("gender"),
                };
                (row.get::<_, booking::Id>("booking_id"), passenger)
            })
            .into_group_map();

        const SQL: &str = "\
            SELECT id, code, boat_name, phone, journey_at, \
                   private_car_4_seater, private_car_7_seater, shared_rides, \
                   breakfast, veg_lunch, non_veg_lunch, \
                   tour_guide, insurance, \
                   payment_amount, payment_currency, payment_kind, \
                   refund_status, cancellation_reason, \
                   created_at, cancelled_at \
            FROM bookings \
            WHERE id = ANY($1::UUID[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .filter_map(|row| {
                let id = row.get("id");
                // Inserted along with the booking in a single transaction.
                let list = booking::Passengers::new(
                    passengers.remove(&id).unwrap_or_default(),
                )?;
                Some((id, from_row(row, list)))
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, [booking::Id; 1]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'c, C> Database<Select<By<Option<Booking>, &'c booking::Code>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Booking>, booking::Id>>,
        Ok = Option<Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, &'c booking::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE code = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, booking::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            code,
            boat_name,
            phone,
            journey_at,
            passengers,
            extras,
            payment,
            refund_status,
            cancellation_reason,
            created_at,
            cancelled_at,
        } = booking;
        let breakfast = i32::from(extras.breakfast);
        let veg_lunch = i32::from(extras.veg_lunch);
        let non_veg_lunch = i32::from(extras.non_veg_lunch);
        let amount = payment.amount();
        let kind = payment.kind();

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, code, boat_name, phone, journey_at, \
                private_car_4_seater, private_car_7_seater, shared_rides, \
                breakfast, veg_lunch, non_veg_lunch, \
                tour_guide, insurance, \
                payment_amount, payment_currency, payment_kind, \
                refund_status, cancellation_reason, \
                created_at, cancelled_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ, \
                $6::BOOLEAN, $7::BOOLEAN, $8::BOOLEAN, \
                $9::INT4, $10::INT4, $11::INT4, \
                $12::BOOLEAN, $13::BOOLEAN, \
                $14::NUMERIC, $15::INT2, $16::INT2, \
                $17::INT2, $18::VARCHAR, \
                $19::TIMESTAMPTZ, $20::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &code,
                &boat_name,
                &phone,
                &journey_at,
                &extras.private_car_4_seater,
                &extras.private_car_7_seater,
                &extras.shared_rides,
                &breakfast,
                &veg_lunch,
                &non_veg_lunch,
                &extras.tour_guide,
                &extras.insurance,
                &amount.amount,
                &amount.currency,
                &kind,
                &refund_status,
                &cancellation_reason,
                &created_at,
                &cancelled_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        let positions = (1..).take(passengers.len()).collect::<Vec<i16>>();
        let names = passengers
            .iter()
            .map(|p| p.full_name.as_ref())
            .collect::<Vec<&str>>();
        let ages = passengers
            .iter()
            .map(|p| i16::from(u8::from(p.age)))
            .collect::<Vec<_>>();
        let genders = passengers.iter().map(|p| p.gender).collect::<Vec<_>>();

        const PASSENGERS_SQL: &str = "\
            INSERT INTO booking_passengers (\
                booking_id, position, full_name, age, gender\
            ) \
            SELECT $1::UUID, p.position, p.full_name, p.age, p.gender \
            FROM UNNEST(\
                $2::INT2[], $3::VARCHAR[], $4::INT2[], $5::INT2[]\
            ) AS p(position, full_name, age, gender)";
        self.exec(PASSENGERS_SQL, &[&id, &positions, &names, &ages, &genders])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        // Everything else is immutable once the `Booking` is created.
        let Booking {
            id,
            refund_status,
            cancellation_reason,
            cancelled_at,
            ..
        } = booking;

        const SQL: &str = "\
            UPDATE bookings \
            SET refund_status = $2::INT2, \
                cancellation_reason = $3::VARCHAR, \
                cancelled_at = $4::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[&id, &refund_status, &cancellation_reason, &cancelled_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO bookings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, Vec<booking::Id>>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector {
            arguments,
            filter:
                read::booking::list::Filter {
                    status,
                    meal,
                    phone,
                    journey,
                    created,
                },
        } = by.into_inner();

        let limit = i64::try_from(arguments.fetch_limit())
            .expect("bounded by `Arguments::MAX_LIMIT`");
        let offset = i64::try_from(arguments.offset).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];

        let phone_idx = phone.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let journey_idx = journey.as_ref().map(|r| {
            ps.push(r.start());
            ps.push(r.end());
            (ps.len() - 1, ps.len())
        });
        let created_idx = created.as_ref().map(|r| {
            ps.push(&r.start);
            ps.push(&r.end);
            (ps.len() - 1, ps.len())
        });

        let sql = format!(
            "SELECT id \
             FROM bookings \
             WHERE TRUE \
                   {status_filtering} \
                   {meal_filtering} \
                   {phone_filtering} \
                   {journey_filtering} \
                   {created_filtering} \
             ORDER BY created_at ASC, id ASC \
             LIMIT $1::INT8 OFFSET $2::INT8",
            status_filtering = match status {
                None => "",
                Some(Status::Cancelled) => "AND cancelled_at IS NOT NULL",
                Some(Status::NotCancelled) => "AND cancelled_at IS NULL",
                Some(Status::WithInsurance) => {
                    "AND cancelled_at IS NULL AND insurance"
                }
                Some(Status::WithTourGuide) => {
                    "AND cancelled_at IS NULL AND tour_guide"
                }
            },
            meal_filtering = match meal {
                None => "",
                Some(Meal::Veg) => "AND cancelled_at IS NULL AND veg_lunch > 0",
                Some(Meal::NonVeg) => {
                    "AND cancelled_at IS NULL AND non_veg_lunch > 0"
                }
                Some(Meal::Both) => {
                    "AND cancelled_at IS NULL \
                     AND (veg_lunch > 0 OR non_veg_lunch > 0)"
                }
            },
            phone_filtering = phone_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND phone = ${idx}::VARCHAR"))
            }),
            journey_filtering =
                journey_idx.into_iter().format_with("", |(from, to), f| {
                    f(&format_args!(
                        "AND journey_at BETWEEN ${from}::TIMESTAMPTZ \
                                            AND ${to}::TIMESTAMPTZ"
                    ))
                }),
            created_filtering =
                created_idx.into_iter().format_with("", |(from, to), f| {
                    f(&format_args!(
                        "AND cancelled_at IS NULL \
                         AND created_at >= ${from}::TIMESTAMPTZ \
                         AND created_at < ${to}::TIMESTAMPTZ"
                    ))
                }),
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<booking::Id>>();

        let mut bookings = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(read::booking::list::Page::from_overfetched(
            &arguments,
            ids.into_iter().filter_map(|id| bookings.remove(&id)),
        ))
    }
}

