//! [`Database`] operations of [`Memory`].

use std::{
    collections::{btree_map::Entry, BTreeMap},
    ops::Range,
};

use common::operations::{By, Insert, Lock, Reserve, Select, Update};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{boat, booking, Boat, Booking},
    infra::{
        database::{self, constraint},
        Database,
    },
    read::{
        self,
        report::{meals_by_boat, MealTotals, Month, MonthlyRevenue, Totals},
    },
};

use super::{Access, Error, Memory, Store};

impl Store {
    /// Returns [`Boat`]s passing the provided predicate, ordered by their
    /// creation and ID.
    fn boats_where(&self, mut f: impl FnMut(&Boat) -> bool) -> Vec<Boat> {
        let mut boats =
            self.boats.iter().filter(|b| f(b)).cloned().collect::<Vec<_>>();
        boats.sort_by_key(|b| (b.created_at, b.id));
        boats
    }

    /// Returns [`Booking`]s passing the provided predicate, ordered by their
    /// creation and ID.
    fn bookings_where(
        &self,
        mut f: impl FnMut(&Booking) -> bool,
    ) -> Vec<Booking> {
        let mut bookings = self
            .bookings
            .iter()
            .filter(|b| f(b))
            .cloned()
            .collect::<Vec<_>>();
        bookings.sort_by_key(|b| (b.created_at, b.id));
        bookings
    }
}

impl<A: Access> Database<Select<By<Option<Boat>, boat::Id>>> for Memory<A> {
    type Ok = Option<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Boat>, boat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .access(|s| Ok(s.boats.iter().find(|b| b.id == id).cloned()))
            .await
    }
}

impl<'n, A: Access> Database<Select<By<Option<Boat>, &'n boat::Name>>>
    for Memory<A>
{
    type Ok = Option<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Boat>, &'n boat::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();
        self.0
            .access(|s| Ok(s.boats.iter().find(|b| &b.name == name).cloned()))
            .await
    }
}

impl<A: Access> Database<Insert<Boat>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(boat): Insert<Boat>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(boat)).await.map_err(tracerr::wrap!())
    }
}

impl<A: Access> Database<Update<Boat>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(boat): Update<Boat>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| {
                if s.boats.iter().any(|b| b.name == boat.name && b.id != boat.id)
                {
                    return Err(Error::UniqueViolation(constraint::BOAT_NAME));
                }
                if let Some(stored) = s.boats.iter_mut().find(|b| b.id == boat.id)
                {
                    // Seats are changed by reservations only.
                    *stored = Boat {
                        seats: stored.seats,
                        ..boat
                    };
                } else {
                    s.boats.push(boat);
                }
                Ok(())
            })
            .await
    }
}

impl<A: Access> Database<Lock<By<Boat, boat::Id>>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Boat, boat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions hold the whole store exclusively.
        Ok(())
    }
}

impl<'n, A: Access> Database<Lock<By<Boat, &'n boat::Name>>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Boat, &'n boat::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<'n, A: Access> Database<Reserve<By<Option<Boat>, &'n boat::Name>>>
    for Memory<A>
{
    type Ok = Option<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Reserve(by): Reserve<By<Option<Boat>, &'n boat::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();
        self.0
            .access(|s| {
                Ok(s.boats
                    .iter_mut()
                    .find(|b| &b.name == name && b.is_active)
                    .and_then(|b| {
                        b.seats = b.seats.reserve()?;
                        Some(b.clone())
                    }))
            })
            .await
    }
}

impl<A: Access>
    Database<Select<By<read::boat::list::Page, read::boat::list::Selector>>>
    for Memory<A>
{
    type Ok = read::boat::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::boat::list::Page, read::boat::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::boat::list::Selector { arguments, filter } = by.into_inner();
        self.0
            .access(|s| Ok(arguments.apply(s.boats_where(|b| filter.matches(b)))))
            .await
    }
}

impl<A: Access> Database<Select<By<read::boat::list::TotalCount, ()>>>
    for Memory<A>
{
    type Ok = read::boat::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::boat::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| {
                Ok(i32::try_from(s.boats.len()).unwrap_or(i32::MAX).into())
            })
            .await
    }
}

impl<A: Access> Database<Select<By<Vec<Boat>, read::boat::Active>>>
    for Memory<A>
{
    type Ok = Vec<Boat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Boat>, read::boat::Active>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.access(|s| Ok(s.boats_where(|b| b.is_active))).await
    }
}

impl<A: Access> Database<Select<By<Option<Booking>, booking::Id>>>
    for Memory<A>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .access(|s| Ok(s.bookings.iter().find(|b| b.id == id).cloned()))
            .await
    }
}

impl<'c, A: Access> Database<Select<By<Option<Booking>, &'c booking::Code>>>
    for Memory<A>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, &'c booking::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        self.0
            .access(|s| {
                Ok(s.bookings.iter().find(|b| &b.code == code).cloned())
            })
            .await
    }
}

impl<A: Access> Database<Insert<Booking>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<A: Access> Database<Update<Booking>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| {
                if s.bookings
                    .iter()
                    .any(|b| b.code == booking.code && b.id != booking.id)
                {
                    return Err(Error::UniqueViolation(
                        constraint::BOOKING_CODE,
                    ));
                }
                if let Some(stored) =
                    s.bookings.iter_mut().find(|b| b.id == booking.id)
                {
                    *stored = booking;
                } else {
                    s.bookings.push(booking);
                }
                Ok(())
            })
            .await
    }
}

impl<A: Access> Database<Lock<By<Booking, booking::Id>>> for Memory<A> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<A: Access>
    Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
    > for Memory<A>
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector { arguments, filter } =
            by.into_inner();
        self.0
            .access(|s| {
                Ok(arguments.apply(s.bookings_where(|b| filter.matches(b))))
            })
            .await
    }
}

impl<A: Access> Database<Select<By<Totals, ()>>> for Memory<A> {
    type Ok = Totals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Totals, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| {
                Ok(s.bookings.iter().fold(Totals::default(), |mut t, b| {
                    if b.is_cancelled() {
                        t.cancellations += 1;
                    } else {
                        t.bookings += 1;
                    }
                    t
                }))
            })
            .await
    }
}

impl<A: Access> Database<Select<By<MealTotals, ()>>> for Memory<A> {
    type Ok = MealTotals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<MealTotals, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .access(|s| {
                Ok(s.bookings.iter().fold(MealTotals::default(), |mut t, b| {
                    t.breakfast += u64::from(b.extras.breakfast);
                    t.veg += u64::from(b.extras.veg_lunch);
                    t.non_veg += u64::from(b.extras.non_veg_lunch);
                    t
                }))
            })
            .await
    }
}

impl<A: Access>
    Database<Select<By<Vec<MonthlyRevenue>, Range<booking::JourneyDateTime>>>>
    for Memory<A>
{
    type Ok = Vec<MonthlyRevenue>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<MonthlyRevenue>, Range<booking::JourneyDateTime>>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let range = by.into_inner();
        self.0
            .access(|s| {
                let mut months = BTreeMap::<(Month, u8), MonthlyRevenue>::new();
                for b in s.bookings.iter().filter(|b| range.contains(&b.journey_at))
                {
                    let month = Month {
                        year: b.journey_at.year(),
                        month: b.journey_at.month(),
                    };
                    let paid = b.payment.amount();
                    let row = months
                        .entry((month, paid.currency.u8()))
                        .or_insert(MonthlyRevenue {
                            month,
                            currency: paid.currency,
                            revenue: Decimal::ZERO,
                            cancelled: Decimal::ZERO,
                        });
                    row.revenue += paid.amount;
                    if b.is_cancelled() {
                        row.cancelled += paid.amount;
                    }
                }
                Ok(months.into_values().collect())
            })
            .await
    }
}

impl<A: Access>
    Database<Select<By<meals_by_boat::Page, meals_by_boat::Selector>>>
    for Memory<A>
{
    type Ok = meals_by_boat::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<meals_by_boat::Page, meals_by_boat::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let meals_by_boat::Selector { arguments, .. } = by.into_inner();
        self.0
            .access(|s| {
                let mut rows = BTreeMap::<boat::Name, meals_by_boat::Row>::new();
                for b in s.bookings.iter().filter(|b| !b.is_cancelled()) {
                    let row = match rows.entry(b.boat_name.clone()) {
                        Entry::Occupied(e) => e.into_mut(),
                        Entry::Vacant(e) => e.insert(meals_by_boat::Row {
                            boat_name: b.boat_name.clone(),
                            passengers: 0,
                            breakfast: 0,
                            veg: 0,
                            non_veg: 0,
                        }),
                    };
                    row.passengers +=
                        u64::try_from(b.passengers.len()).unwrap_or(u64::MAX);
                    row.breakfast += u64::from(b.extras.breakfast);
                    row.veg += u64::from(b.extras.veg_lunch);
                    row.non_veg += u64::from(b.extras.non_veg_lunch);
                }
                Ok(arguments.apply(rows.into_values()))
            })
            .await
    }
}
