//! [`Boat`]-related endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use futures::TryFutureExt as _;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, boat, Phone},
    query, read, Command as _,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Data, Error, Service};

define_error! {
    enum BoatError {
        #[code = "BOAT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Boat` with the specified ID does not exist"]
        NotExists,

        #[code = "BOAT_NAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`Boat` with the specified name already exists"]
        NameOccupied,
    }
}

/// A boat running tours.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Boat {
    /// ID of this [`Boat`].
    pub id: Uuid,

    /// Unique name of this [`Boat`].
    pub name: String,

    /// Total number of seats.
    pub capacity: u16,

    /// Number of seats still available for booking.
    pub available_seats: u16,

    /// Number of already booked seats.
    pub booked_seats: u16,

    /// Indicator whether this [`Boat`] accepts bookings.
    pub is_active: bool,

    /// Date and time when this [`Boat`] is expected back in service.
    pub will_active_at: Option<String>,

    /// Contact phone of this [`Boat`]'s owner.
    pub owner_phone: Option<String>,

    /// Public URLs of this [`Boat`]'s photos.
    pub photos: Vec<String>,

    /// [`Amenities`] of this [`Boat`].
    pub amenities: Amenities,

    /// [`SafetyFeatures`] of this [`Boat`].
    pub safety_features: SafetyFeatures,

    /// [`MealOptions`] served on this [`Boat`].
    pub meals: MealOptions,

    /// Prices of this [`Boat`].
    pub prices: api::pricing::Prices,

    /// Date and time when this [`Boat`] was registered.
    pub created_at: String,
}

impl From<domain::Boat> for Boat {
    fn from(boat: domain::Boat) -> Self {
        Self {
            id: boat.id.into(),
            name: boat.name.to_string(),
            capacity: boat.seats.capacity().into(),
            available_seats: boat.seats.available(),
            booked_seats: boat.seats.booked(),
            is_active: boat.is_active,
            will_active_at: boat.will_activate_at.map(|at| at.to_rfc3339()),
            owner_phone: boat.owner_phone.map(|p| p.to_string()),
            photos: boat.photos.iter().map(ToString::to_string).collect(),
            amenities: boat.amenities.into(),
            safety_features: boat.safety_features.into(),
            meals: boat.meals.into(),
            prices: boat.prices.into(),
            created_at: boat.created_at.to_rfc3339(),
        }
    }
}

/// Amenities available on a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Amenities {
    /// Clean restrooms.
    pub clean_restrooms: bool,

    /// Comfortable seating.
    pub comfortable_seating: bool,

    /// Onboard dining.
    pub onboard_dining: bool,

    /// WiFi access.
    pub wifi_access: bool,

    /// Entertainment system.
    pub entertainment_system: bool,

    /// Air conditioning.
    pub air_conditioning: bool,
}

impl From<boat::Amenities> for Amenities {
    fn from(a: boat::Amenities) -> Self {
        Self {
            clean_restrooms: a.clean_restrooms,
            comfortable_seating: a.comfortable_seating,
            onboard_dining: a.onboard_dining,
            wifi_access: a.wifi_access,
            entertainment_system: a.entertainment_system,
            air_conditioning: a.air_conditioning,
        }
    }
}

impl From<Amenities> for boat::Amenities {
    fn from(a: Amenities) -> Self {
        Self {
            clean_restrooms: a.clean_restrooms,
            comfortable_seating: a.comfortable_seating,
            onboard_dining: a.onboard_dining,
            wifi_access: a.wifi_access,
            entertainment_system: a.entertainment_system,
            air_conditioning: a.air_conditioning,
        }
    }
}

/// Safety features of a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SafetyFeatures {
    /// Life jackets.
    pub life_jackets: bool,

    /// Emergency kit.
    pub emergency_kit: bool,

    /// Fire extinguishers.
    pub fire_extinguishers: bool,
}

impl From<boat::SafetyFeatures> for SafetyFeatures {
    fn from(s: boat::SafetyFeatures) -> Self {
        Self {
            life_jackets: s.life_jackets,
            emergency_kit: s.emergency_kit,
            fire_extinguishers: s.fire_extinguishers,
        }
    }
}

impl From<SafetyFeatures> for boat::SafetyFeatures {
    fn from(s: SafetyFeatures) -> Self {
        Self {
            life_jackets: s.life_jackets,
            emergency_kit: s.emergency_kit,
            fire_extinguishers: s.fire_extinguishers,
        }
    }
}

/// Meal options served on a [`Boat`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealOptions {
    /// Both vegetarian and non-vegetarian meals.
    pub veg_non_veg: bool,

    /// Vegetarian meals only.
    pub pure_veg: bool,
}

impl From<boat::MealOptions> for MealOptions {
    fn from(m: boat::MealOptions) -> Self {
        Self {
            veg_non_veg: m.veg_non_veg,
            pure_veg: m.pure_veg,
        }
    }
}

impl From<MealOptions> for boat::MealOptions {
    fn from(m: MealOptions) -> Self {
        Self {
            veg_non_veg: m.veg_non_veg,
            pure_veg: m.pure_veg,
        }
    }
}

/// Request to register a new [`Boat`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewBoat {
    /// Unique name of a new [`Boat`].
    pub name: Option<String>,

    /// Total number of seats of a new [`Boat`].
    pub capacity: Option<i32>,

    /// Contact phone of a new [`Boat`]'s owner.
    pub owner_phone: Option<String>,

    /// Public URLs of a new [`Boat`]'s photos.
    pub photos: Vec<String>,

    /// [`Amenities`] of a new [`Boat`].
    pub amenities: Amenities,

    /// [`SafetyFeatures`] of a new [`Boat`].
    pub safety_features: SafetyFeatures,

    /// [`MealOptions`] of a new [`Boat`].
    pub meals: MealOptions,

    /// Prices of a new [`Boat`].
    pub prices: api::pricing::Prices,
}

impl NewBoat {
    /// Validates this [`NewBoat`] request into a [`command::RegisterBoat`].
    ///
    /// # Errors
    ///
    /// Names the first missing or malformed field.
    pub fn into_command(self) -> Result<command::RegisterBoat, Error> {
        let Self {
            name,
            capacity,
            owner_phone,
            photos,
            amenities,
            safety_features,
            meals,
            prices,
        } = self;

        let name = api::required("name", name)?;
        let name = api::parse::<boat::Name>("name", name.trim())?;
        let capacity = api::required("capacity", capacity)?;
        let capacity = boat::Capacity::try_from(capacity)
            .map_err(|_| Error::validation("capacity", &"must be positive"))?;
        let owner_phone = owner_phone
            .map(|p| api::parse::<Phone>("ownerPhone", &p))
            .transpose()?;
        let photos = photos
            .iter()
            .map(|url| api::parse::<boat::PhotoUrl>("photos", url))
            .collect::<Result<_, _>>()?;

        Ok(command::RegisterBoat {
            name,
            capacity,
            owner_phone,
            photos,
            amenities: amenities.into(),
            safety_features: safety_features.into(),
            meals: meals.into(),
            prices: prices.into_list()?,
        })
    }
}

/// Registers a new [`Boat`].
#[tracing::instrument(skip_all, fields(boat.name = tracing::field::Empty))]
pub async fn add(
    Extension(svc): Extension<Service>,
    WithRejection(Json(body), _): WithRejection<Json<NewBoat>, Error>,
) -> crate::Result<Boat> {
    let cmd = body.into_command()?;
    _ = tracing::Span::current()
        .record("boat.name", tracing::field::display(&cmd.name));

    let boat = svc.execute(cmd).await.map_err(AsError::into_error)?;
    Ok(Data(boat.into()))
}

/// Query parameters of the [`Boat`] list.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    /// Number of [`Boat`]s to skip.
    pub skip: Option<i64>,

    /// Maximum number of [`Boat`]s to return.
    pub limit: Option<i64>,

    /// Name (or its part) to search for.
    pub name: Option<String>,

    /// Activity of the [`Boat`]s to return.
    pub is_active: Option<bool>,
}

/// [`Boat`]s page along with the total number of registered boats.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoatList {
    /// Requested page.
    #[serde(flatten)]
    pub page: api::Page<Boat>,

    /// Number of all registered boats, regardless of the filter.
    pub total_count: i32,
}

/// Lists registered [`Boat`]s in their registration order.
#[tracing::instrument(skip_all)]
pub async fn list(
    Extension(svc): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> crate::Result<BoatList> {
    let ListParams {
        skip,
        limit,
        name,
        is_active,
    } = params;

    let arguments = api::Pagination { skip, limit }.arguments()?;
    let name = name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| api::parse::<boat::Name>("name", n))
        .transpose()?;

    let page = svc
        .execute(query::boats::List::by(read::boat::list::Selector {
            arguments,
            filter: read::boat::list::Filter {
                name,
                is_active,
                has_available_seats: false,
            },
        }))
        .map_err(AsError::into_error);
    let total = svc
        .execute(query::boats::TotalCount::by(()))
        .map_err(AsError::into_error);
    let (page, total) = futures::try_join!(page, total)?;

    Ok(Data(BoatList {
        page: api::Page::from_page(page, Boat::from),
        total_count: total.into(),
    }))
}

/// Fetches the [`domain::Boat`] with the provided ID.
async fn fetch(svc: &Service, id: Uuid) -> Result<domain::Boat, Error> {
    svc.execute(query::boat::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| BoatError::NotExists.into())
}

/// Returns the [`Boat`] with the provided ID.
#[tracing::instrument(skip_all, fields(boat.id = %id))]
pub async fn by_id(
    Extension(svc): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> crate::Result<Boat> {
    fetch(&svc, id).await.map(|b| Data(b.into()))
}

/// Request to switch activity of a [`Boat`].
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Indicator whether the [`Boat`] should accept bookings.
    pub is_active: Option<bool>,
}

/// Switches activity of a [`Boat`].
#[tracing::instrument(skip_all, fields(boat.id = %id))]
pub async fn update_activity(
    Extension(svc): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
    WithRejection(Json(body), _): WithRejection<Json<Activity>, Error>,
) -> crate::Result<Boat> {
    let is_active = api::required("isActive", body.is_active)?;

    let boat = svc
        .execute(command::UpdateBoatActivity {
            boat_id: id.into(),
            is_active,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(boat.into()))
}

/// Request to schedule a [`Boat`] back into service.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    /// Date (and time) when the [`Boat`] is expected back in service.
    ///
    /// `null` clears the schedule.
    pub will_active_at: Option<String>,
}

/// Schedules (or clears) the upcoming availability of a [`Boat`].
#[tracing::instrument(skip_all, fields(boat.id = %id))]
pub async fn schedule_activation(
    Extension(svc): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
    WithRejection(Json(body), _): WithRejection<Json<Activation>, Error>,
) -> crate::Result<Boat> {
    let at = body
        .will_active_at
        .as_deref()
        .map(|at| api::date_time("willActiveAt", at))
        .transpose()?
        .map(|at| at.coerce());

    let boat = svc
        .execute(command::ScheduleBoatActivation {
            boat_id: id.into(),
            at,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(boat.into()))
}

/// Brief of a [`Boat`] open for bookings.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableBoat {
    /// ID of the [`Boat`].
    pub id: Uuid,

    /// Name of the [`Boat`].
    pub name: String,

    /// Public URLs of the [`Boat`]'s photos.
    pub photos: Vec<String>,

    /// Number of seats still available for booking.
    pub available_seats: u16,

    /// Price of an adult ticket.
    pub adult_price: Decimal,
}

impl From<domain::Boat> for AvailableBoat {
    fn from(boat: domain::Boat) -> Self {
        Self {
            id: boat.id.into(),
            name: boat.name.to_string(),
            photos: boat.photos.iter().map(ToString::to_string).collect(),
            available_seats: boat.seats.available(),
            adult_price: boat.prices.get(boat::PriceField::Adult).into(),
        }
    }
}

/// Lists active [`Boat`]s having seats available.
#[tracing::instrument(skip_all)]
pub async fn available(
    Extension(svc): Extension<Service>,
    WithRejection(Query(pagination), _): WithRejection<
        Query<api::Pagination>,
        Error,
    >,
) -> crate::Result<api::Page<AvailableBoat>> {
    let page = svc
        .execute(query::boats::Available {
            arguments: pagination.arguments()?,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(api::Page::from_page(page, AvailableBoat::from)))
}

/// Human-readable features of a [`Boat`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    /// Name of the [`Boat`].
    pub name: String,

    /// Public URLs of the [`Boat`]'s photos.
    pub photos: Vec<String>,

    /// Labels of the available amenities.
    pub amenities: Vec<&'static str>,

    /// Labels of the safety features.
    pub safety_features: Vec<&'static str>,

    /// Labels of the served meals.
    pub meals: Vec<&'static str>,
}

impl From<domain::Boat> for Features {
    fn from(boat: domain::Boat) -> Self {
        Self {
            name: boat.name.to_string(),
            photos: boat.photos.iter().map(ToString::to_string).collect(),
            amenities: boat.amenities.labels(),
            safety_features: boat.safety_features.labels(),
            meals: boat.meals.labels(),
        }
    }
}

/// Returns human-readable [`Features`] of a [`Boat`].
#[tracing::instrument(skip_all, fields(boat.id = %id))]
pub async fn features(
    Extension(svc): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> crate::Result<Features> {
    fetch(&svc, id).await.map(|b| Data(b.into()))
}

impl AsError for command::register_boat::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NameOccupied(_) => Some(BoatError::NameOccupied.into()),
        }
    }
}

impl AsError for command::update_boat_activity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BoatNotExists(_) => Some(BoatError::NotExists.into()),
        }
    }
}

impl AsError for command::schedule_boat_activation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BoatNotExists(_) => Some(BoatError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use serde_json::json;
    use service::domain::boat::PriceField;

    use super::{MealOptions, NewBoat};

    fn request(body: serde_json::Value) -> NewBoat {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn builds_registration_command() {
        let cmd = request(json!({
            "name": "  Sea Pearl ",
            "capacity": 12,
            "ownerPhone": "9876543210",
            "photos": ["https://cdn.example.com/pearl.jpg"],
            "amenities": {"wifiAccess": true},
            "meals": {"pureVeg": true},
            "prices": {"adult": 1500},
        }))
        .into_command()
        .unwrap();

        assert_eq!(cmd.name.to_string(), "Sea Pearl");
        assert_eq!(u16::from(cmd.capacity), 12);
        assert_eq!(cmd.owner_phone.unwrap().to_string(), "9876543210");
        assert_eq!(cmd.photos.len(), 1);
        assert!(cmd.amenities.wifi_access);
        assert!(!cmd.amenities.air_conditioning);
        assert!(cmd.meals.pure_veg);
        assert_eq!(
            Decimal::from(cmd.prices.get(PriceField::Adult)),
            Decimal::from(1500),
        );
        assert_eq!(
            Decimal::from(cmd.prices.get(PriceField::Child)),
            Decimal::ZERO,
        );
    }

    #[test]
    fn names_invalid_field() {
        for (body, field) in [
            (json!({"capacity": 3}), "`name`"),
            (json!({"name": "Pearl"}), "`capacity`"),
            (json!({"name": "Pearl", "capacity": 0}), "`capacity`"),
            (
                json!({"name": "Pearl", "capacity": 3, "ownerPhone": "12"}),
                "`ownerPhone`",
            ),
            (
                json!({"name": "Pearl", "capacity": 3, "photos": [""]}),
                "`photos`",
            ),
            (
                json!({
                    "name": "Pearl",
                    "capacity": 3,
                    "prices": {"tourGuide": -5},
                }),
                "`tourGuide`",
            ),
        ] {
            let err = request(body).into_command().unwrap_err();
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
            assert!(err.message.contains(field), "{err}");
        }
    }

    #[test]
    fn meal_options_default_to_none() {
        let meals: MealOptions = serde_json::from_value(json!({})).unwrap();
        assert!(!meals.veg_non_veg && !meals.pure_veg);
    }
}
