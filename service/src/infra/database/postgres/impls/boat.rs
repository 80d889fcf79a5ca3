//! [`Boat`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Reserve, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        boat::{self, PriceField},
        Boat,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Returns the `boats` column storing the [`boat::Price`] of the provided
/// [`PriceField`].
const fn price_column(field: PriceField) -> &'static str {
    match field {
        PriceField::Adult => "price_adult",
        PriceField::Child => "price_child",
        PriceField::PrivateCar4Seater => "price_private_car_4_seater",
        PriceField::PrivateCar7Seater => "price_private_car_7_seater",
        PriceField::SharedRides => "price_shared_rides",
        PriceField::Breakfast => "price_breakfast",
        PriceField::VegLunch => "price_veg_lunch",
        PriceField::NonVegLunch => "price_non_veg_lunch",
        PriceField::TourGuide => "price_tour_guide",
        PriceField::Insurance => "price_insurance",
    }
}

/// Reads a [`Boat`] out of a `boats` table [`Row`].
fn from_row(row: &Row) -> Boat {
    let capacity = boat::Capacity::try_from(row.get::<_, i32>("capacity"))
        .expect("`capacity` CHECK constraint");
    let available = u16::try_from(row.get::<_, i32>("available_seats"))
        .expect("`available_seats` CHECK constraint");
    Boat {
        id: row.get("id"),
        name: row.get("name"),
        seats: boat::Seats::from_parts(capacity, available)
            .expect("`available_seats` CHECK constraint"),
        is_active: row.get("is_active"),
        will_activate_at: row.get("will_activate_at"),
        owner_phone: row.get("owner_phone"),
        photos: row.get("photos"),
        amenities: boat::Amenities {
            clean_restrooms: row.get("clean_restrooms"),
            comfortable_seating: row.get("comfortable_seating"),
            onboard_dining: row.get("onboard_dining"),
            wifi_access: row.get("wifi_access"),
            entertainment_system: row.get("entertainment_system"),
            air_conditioning: row.get("air_conditioning"),
        },
        safety_features: boat::SafetyFeatures {
            life_jackets: row.get("life_jackets"),
            emergency_kit: row.get("emergency_kit"),
            fire_extinguishers: row.get("fire_extinguishers"),
        },
        meals: boat::MealOptions {
            veg_non_veg: row.get("veg_non_veg"),
            pure_veg: row.get("pure_veg"),
        },
        prices: PriceField::ALL
            .iter()
            .map(|&f| (f, row.get(price_column(f))))
            .collect(),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<boat::Id, Boat>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[boat::Id]>,
{
    type Ok = HashMap<boat::Id, Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<boat::Id, Boat>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[boat::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, name, \
                   capacity, available_seats, \
                   is_active, will_activate_at, \
                   owner_phone, photos, \
                   clean_restrooms, comfortable_seating, onboard_dining, \
                   wifi_access, entertainment_system, air_conditioning, \
                   life_jackets, emergency_kit, fire_extinguishers, \
                   veg_non_veg, pure_veg, \
                   price_adult, price_child, \
                   price_private_car_4_seater, price_private_car_7_seater, \
                   price_shared_rides, price_breakfast, \
                   price_veg_lunch, price_non_veg_lunch, \
                   price_tour_guide, price_insurance, \
                   created_at \
            FROM boats \
            WHERE id = ANY($1::UUID[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let boat = from_row(row);
                (boat.id, boat)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Boat>, boat::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<boat::Id, Boat>, [boat::Id; 1]>>,
        Ok = HashMap<boat::Id, Boat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Boat>, boat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'n, C> Database<Select<By<Option<Boat>, &'n boat::Name>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Boat>, boat::Id>>,
        Ok = Option<Boat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Boat>, &'n boat::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM boats \
            WHERE name = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&name])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, boat::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Boat>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Boat>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(boat): Insert<Boat>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(boat)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Boat>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(boat): Update<Boat>,
    ) -> Result<Self::Ok, Self::Err> {
        let Boat {
            id,
            name,
            seats,
            is_active,
            will_activate_at,
            owner_phone,
            photos,
            amenities,
            safety_features,
            meals,
            prices,
            created_at,
        } = boat;
        let capacity = i32::from(u16::from(seats.capacity()));
        let available = i32::from(seats.available());
        let prices = prices.iter().map(|(_, p)| p).collect::<Vec<_>>();

        // `capacity` and `available_seats` are written on creation only, and
        // are changed by `Reserve` afterwards.
        const SQL: &str = "\
            INSERT INTO boats (\
                id, name, \
                capacity, available_seats, \
                is_active, will_activate_at, \
                owner_phone, photos, \
                clean_restrooms, comfortable_seating, onboard_dining, \
                wifi_access, entertainment_system, air_conditioning, \
                life_jackets, emergency_kit, fire_extinguishers, \
                veg_non_veg, pure_veg, \
                price_adult, price_child, \
                price_private_car_4_seater, price_private_car_7_seater, \
                price_shared_rides, price_breakfast, \
                price_veg_lunch, price_non_veg_lunch, \
                price_tour_guide, price_insurance, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::INT4, $4::INT4, \
                $5::BOOLEAN, $6::TIMESTAMPTZ, \
                $7::VARCHAR, $8::VARCHAR[], \
                $9::BOOLEAN, $10::BOOLEAN, $11::BOOLEAN, \
                $12::BOOLEAN, $13::BOOLEAN, $14::BOOLEAN, \
                $15::BOOLEAN, $16::BOOLEAN, $17::BOOLEAN, \
                $18::BOOLEAN, $19::BOOLEAN, \
                $20::NUMERIC, $21::NUMERIC, \
                $22::NUMERIC, $23::NUMERIC, \
                $24::NUMERIC, $25::NUMERIC, \
                $26::NUMERIC, $27::NUMERIC, \
                $28::NUMERIC, $29::NUMERIC, \
                $30::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                is_active = EXCLUDED.is_active, \
                will_activate_at = EXCLUDED.will_activate_at, \
                owner_phone = EXCLUDED.owner_phone, \
                photos = EXCLUDED.photos, \
                clean_restrooms = EXCLUDED.clean_restrooms, \
                comfortable_seating = EXCLUDED.comfortable_seating, \
                onboard_dining = EXCLUDED.onboard_dining, \
                wifi_access = EXCLUDED.wifi_access, \
                entertainment_system = EXCLUDED.entertainment_system, \
                air_conditioning = EXCLUDED.air_conditioning, \
                life_jackets = EXCLUDED.life_jackets, \
                emergency_kit = EXCLUDED.emergency_kit, \
                fire_extinguishers = EXCLUDED.fire_extinguishers, \
                veg_non_veg = EXCLUDED.veg_non_veg, \
                pure_veg = EXCLUDED.pure_veg, \
                price_adult = EXCLUDED.price_adult, \
                price_child = EXCLUDED.price_child, \
                price_private_car_4_seater = \
                    EXCLUDED.price_private_car_4_seater, \
                price_private_car_7_seater = \
                    EXCLUDED.price_private_car_7_seater, \
                price_shared_rides = EXCLUDED.price_shared_rides, \
                price_breakfast = EXCLUDED.price_breakfast, \
                price_veg_lunch = EXCLUDED.price_veg_lunch, \
                price_non_veg_lunch = EXCLUDED.price_non_veg_lunch, \
                price_tour_guide = EXCLUDED.price_tour_guide, \
                price_insurance = EXCLUDED.price_insurance";
        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![
            &id,
            &name,
            &capacity,
            &available,
            &is_active,
            &will_activate_at,
            &owner_phone,
            &photos,
            &amenities.clean_restrooms,
            &amenities.comfortable_seating,
            &amenities.onboard_dining,
            &amenities.wifi_access,
            &amenities.entertainment_system,
            &amenities.air_conditioning,
            &safety_features.life_jackets,
            &safety_features.emergency_kit,
            &safety_features.fire_extinguishers,
            &meals.veg_non_veg,
            &meals.pure_veg,
        ];
        for price in prices.iter() {
            ps.push(price);
        }
        ps.push(&created_at);
        self.exec(SQL, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Boat, boat::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Boat, boat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: boat::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO boats_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<'n, C> Database<Lock<By<Boat, &'n boat::Name>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Boat, &'n boat::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();

        const SQL: &str = "\
            INSERT INTO boats_creation_lock \
            VALUES ($1::VARCHAR) \
            ON CONFLICT (name) DO UPDATE \
            SET name = EXCLUDED.name";
        self.exec(SQL, &[&name])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<'n, C> Database<Reserve<By<Option<Boat>, &'n boat::Name>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Boat>, boat::Id>>,
        Ok = Option<Boat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Reserve(by): Reserve<By<Option<Boat>, &'n boat::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();

        const SQL: &str = "\
            UPDATE boats \
            SET available_seats = available_seats - 1 \
            WHERE name = $1::VARCHAR \
              AND is_active \
              AND available_seats > 0 \
            RETURNING id";
        let Some(row) = self
            .query_opt(SQL, &[&name])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, boat::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<read::boat::list::Page, read::boat::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<boat::Id, Boat>, Vec<boat::Id>>>,
        Ok = HashMap<boat::Id, Boat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::boat::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::boat::list::Page, read::boat::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::boat::list::Selector {
            arguments,
            filter:
                read::boat::list::Filter {
                    name,
                    is_active,
                    has_available_seats,
                },
        } = by.into_inner();

        let limit = i64::try_from(arguments.fetch_limit())
            .expect("bounded by `Arguments::MAX_LIMIT`");
        let offset = i64::try_from(arguments.offset).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];

        let name_pattern = name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let name_pattern_idx = name_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });
        let is_active_idx = is_active.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM boats \
             WHERE TRUE \
                   {name_filtering} \
                   {activity_filtering} \
                   {seats_filtering} \
             ORDER BY created_at ASC, id ASC \
             LIMIT $1::INT8 OFFSET $2::INT8",
            name_filtering =
                name_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(name) SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
            activity_filtering =
                is_active_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND is_active = ${idx}::BOOLEAN"))
                }),
            seats_filtering = if has_available_seats {
                "AND available_seats > 0"
            } else {
                ""
            },
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<boat::Id>>();

        let mut boats = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(read::boat::list::Page::from_overfetched(
            &arguments,
            ids.into_iter().filter_map(|id| boats.remove(&id)),
        ))
    }
}

impl<C> Database<Select<By<read::boat::list::TotalCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::boat::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::boat::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM boats";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}

impl<C> Database<Select<By<Vec<Boat>, read::boat::Active>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<boat::Id, Boat>, Vec<boat::Id>>>,
        Ok = HashMap<boat::Id, Boat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Boat>, read::boat::Active>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id \
            FROM boats \
            WHERE is_active \
            ORDER BY created_at ASC, id ASC";
        let ids = self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<boat::Id>>();

        let mut boats = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.into_iter().filter_map(|id| boats.remove(&id)).collect())
    }
}
