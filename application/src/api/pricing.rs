//! Pricing endpoints.

use axum::{extract::Path, Extension, Json};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::boat::{self, PriceField},
    query, Command as _,
};
use uuid::Uuid;

use crate::{api, AsError, Data, Error, Service};

/// Prices of a [`Boat`].
///
/// [`Boat`]: service::domain::Boat
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prices {
    /// Adult ticket.
    pub adult: Decimal,

    /// Child ticket.
    pub child: Decimal,

    /// Private 4-seater car transfer.
    pub private_car_4_seater: Decimal,

    /// Private 7-seater car transfer.
    pub private_car_7_seater: Decimal,

    /// Shared ride transfer.
    pub shared_rides: Decimal,

    /// Breakfast.
    pub breakfast: Decimal,

    /// Vegetarian lunch.
    pub veg_lunch: Decimal,

    /// Non-vegetarian lunch.
    pub non_veg_lunch: Decimal,

    /// Tour guide.
    pub tour_guide: Decimal,

    /// Travel insurance.
    pub insurance: Decimal,
}

impl Prices {
    /// Returns the price of the provided [`PriceField`].
    fn get_mut(&mut self, field: PriceField) -> &mut Decimal {
        match field {
            PriceField::Adult => &mut self.adult,
            PriceField::Child => &mut self.child,
            PriceField::PrivateCar4Seater => &mut self.private_car_4_seater,
            PriceField::PrivateCar7Seater => &mut self.private_car_7_seater,
            PriceField::SharedRides => &mut self.shared_rides,
            PriceField::Breakfast => &mut self.breakfast,
            PriceField::VegLunch => &mut self.veg_lunch,
            PriceField::NonVegLunch => &mut self.non_veg_lunch,
            PriceField::TourGuide => &mut self.tour_guide,
            PriceField::Insurance => &mut self.insurance,
        }
    }

    /// Validates these [`Prices`] into a [`boat::PriceList`].
    ///
    /// # Errors
    ///
    /// Names the negative price if any.
    pub fn into_list(mut self) -> Result<boat::PriceList, Error> {
        PriceField::ALL
            .iter()
            .map(|&f| {
                boat::Price::new(*self.get_mut(f))
                    .map(|p| (f, p))
                    .ok_or_else(|| {
                        Error::validation(
                            field_name(f),
                            &"must not be negative",
                        )
                    })
            })
            .collect()
    }
}

impl From<boat::PriceList> for Prices {
    fn from(list: boat::PriceList) -> Self {
        list.iter().fold(Self::default(), |mut prices, (f, p)| {
            *prices.get_mut(f) = p.into();
            prices
        })
    }
}

/// Returns the request field name of the provided [`PriceField`].
#[must_use]
pub fn field_name(field: PriceField) -> &'static str {
    match field {
        PriceField::Adult => "adult",
        PriceField::Child => "child",
        PriceField::PrivateCar4Seater => "privateCar4Seater",
        PriceField::PrivateCar7Seater => "privateCar7Seater",
        PriceField::SharedRides => "sharedRides",
        PriceField::Breakfast => "breakfast",
        PriceField::VegLunch => "vegLunch",
        PriceField::NonVegLunch => "nonVegLunch",
        PriceField::TourGuide => "tourGuide",
        PriceField::Insurance => "insurance",
    }
}

/// Parses a [`PriceField`] out of its request field name.
fn parse_field(name: &str) -> Option<PriceField> {
    PriceField::ALL.iter().copied().find(|&f| field_name(f) == name)
}

/// Active boat along with its [`Prices`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedBoat {
    /// ID of the boat.
    pub id: Uuid,

    /// Name of the boat.
    pub name: String,

    /// [`Prices`] of the boat.
    pub prices: Prices,
}

/// Lists all the active boats along with their [`Prices`].
#[tracing::instrument(skip_all)]
pub async fn list(
    Extension(svc): Extension<Service>,
) -> crate::Result<Vec<PricedBoat>> {
    let boats = svc
        .execute(query::boats::Priced::by(service::read::boat::Active))
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(
        boats
            .into_iter()
            .map(|b| PricedBoat {
                id: b.id.into(),
                name: b.name.to_string(),
                prices: b.prices.into(),
            })
            .collect(),
    ))
}

/// Request to update a single price.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrice {
    /// Name of the priced field.
    pub field: Option<String>,

    /// New price.
    pub price: Option<Decimal>,
}

/// Updates a single price of a boat.
#[tracing::instrument(skip_all, fields(boat.id = %id))]
pub async fn update(
    Extension(svc): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
    WithRejection(Json(body), _): WithRejection<Json<UpdatePrice>, Error>,
) -> crate::Result<api::boat::Boat> {
    let field = api::required("field", body.field)?;
    let field = parse_field(&field).ok_or_else(|| {
        Error::validation("field", &format_args!("unknown `{field}`"))
    })?;
    let price = boat::Price::new(api::required("price", body.price)?)
        .ok_or_else(|| Error::validation("price", &"must not be negative"))?;

    let boat = svc
        .execute(command::UpdateBoatPrice {
            boat_id: id.into(),
            field,
            price,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(boat.into()))
}

impl AsError for command::update_boat_price::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BoatNotExists(_) => {
                Some(api::boat::BoatError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use service::domain::boat::{Price, PriceField, PriceList};

    use super::{field_name, parse_field, Prices};

    #[test]
    fn converts_price_list() {
        let list = PriceList::default()
            .with(PriceField::Adult, Price::new(Decimal::from(1200)).unwrap())
            .with(
                PriceField::NonVegLunch,
                Price::new(Decimal::new(2505, 1)).unwrap(),
            );

        let prices = Prices::from(list);
        assert_eq!(prices.adult, Decimal::from(1200));
        assert_eq!(prices.non_veg_lunch, Decimal::new(2505, 1));
        assert_eq!(prices.child, Decimal::ZERO);
        assert_eq!(prices.into_list().unwrap(), list);
    }

    #[test]
    fn rejects_negative_price_naming_field() {
        let prices = Prices {
            shared_rides: Decimal::from(-1),
            ..Prices::default()
        };

        let err = prices.into_list().unwrap_err();
        assert!(err.message.contains("`sharedRides`"), "{err}");
    }

    #[test]
    fn field_names_round_trip() {
        for &f in PriceField::ALL {
            assert_eq!(parse_field(field_name(f)), Some(f));
        }
        assert_eq!(parse_field("lunch"), None);
    }
}
