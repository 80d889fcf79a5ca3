//! [`Booking`]-related endpoints.

use std::{ops::RangeInclusive, time::Duration};

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use common::{Currency, DateTime, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, boat, booking, Phone},
    query, read, Command as _,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Data, Error, Service};

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` does not exist"]
        NotExists,

        #[code = "BOOKING_ALREADY_CANCELLED"]
        #[status = CONFLICT]
        #[message = "`Booking` is already cancelled"]
        AlreadyCancelled,

        #[code = "BOAT_INACTIVE"]
        #[status = CONFLICT]
        #[message = "`Boat` is inactive"]
        BoatInactive,

        #[code = "NO_CAPACITY"]
        #[status = CONFLICT]
        #[message = "`Boat` has no available seats"]
        NoCapacity,
    }
}

/// A booked seat on a boat tour.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Uuid,

    /// Human-readable code of this [`Booking`].
    pub code: String,

    /// Name of the booked boat.
    pub boat_name: String,

    /// Contact phone.
    pub phone: String,

    /// Date and time of the tour.
    pub journey_at: String,

    /// [`Passenger`]s of this [`Booking`].
    pub passengers: Vec<Passenger>,

    /// Number of adults and kids, like `2 Adults, 1 Kid`.
    pub passenger_summary: String,

    /// [`Extras`] ordered along with this [`Booking`].
    pub extras: Extras,

    /// [`Payment`] made for this [`Booking`].
    pub payment: Payment,

    /// Refund status of this [`Booking`].
    pub refund_status: String,

    /// Indicator whether this [`Booking`] is cancelled.
    pub is_cancelled: bool,

    /// Reason this [`Booking`] was cancelled with.
    pub cancellation_reason: Option<String>,

    /// Date and time when this [`Booking`] was made.
    pub created_at: String,

    /// Date and time when this [`Booking`] was cancelled.
    pub cancelled_at: Option<String>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id.into(),
            is_cancelled: booking.is_cancelled(),
            code: booking.code.to_string(),
            boat_name: booking.boat_name.to_string(),
            phone: booking.phone.to_string(),
            journey_at: booking.journey_at.to_rfc3339(),
            passenger_summary: booking.passengers.summary().to_string(),
            passengers: booking.passengers.iter().map(Into::into).collect(),
            extras: booking.extras.into(),
            payment: Payment {
                amount: booking.payment.amount(),
                kind: booking.payment.kind().to_string(),
            },
            refund_status: booking.refund_status.to_string(),
            cancellation_reason: booking
                .cancellation_reason
                .map(|r| r.to_string()),
            created_at: booking.created_at.to_rfc3339(),
            cancelled_at: booking.cancelled_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Passenger of a [`Booking`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    /// Full name of this [`Passenger`].
    pub full_name: String,

    /// Age of this [`Passenger`] in full years.
    pub age: u8,

    /// Gender of this [`Passenger`].
    pub gender: String,
}

impl From<&booking::Passenger> for Passenger {
    fn from(p: &booking::Passenger) -> Self {
        Self {
            full_name: p.full_name.to_string(),
            age: p.age.into(),
            gender: p.gender.to_string(),
        }
    }
}

/// Extras ordered along with a [`Booking`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Extras {
    /// Private 4-seater car transfer.
    pub private_car_4_seater: bool,

    /// Private 7-seater car transfer.
    pub private_car_7_seater: bool,

    /// Shared ride transfer.
    pub shared_rides: bool,

    /// Number of breakfasts.
    pub breakfast: u16,

    /// Number of vegetarian lunches.
    pub veg_lunch: u16,

    /// Number of non-vegetarian lunches.
    pub non_veg_lunch: u16,

    /// Tour guide.
    pub tour_guide: bool,

    /// Travel insurance.
    pub insurance: bool,
}

impl From<booking::Extras> for Extras {
    fn from(e: booking::Extras) -> Self {
        Self {
            private_car_4_seater: e.private_car_4_seater,
            private_car_7_seater: e.private_car_7_seater,
            shared_rides: e.shared_rides,
            breakfast: e.breakfast,
            veg_lunch: e.veg_lunch,
            non_veg_lunch: e.non_veg_lunch,
            tour_guide: e.tour_guide,
            insurance: e.insurance,
        }
    }
}

impl From<Extras> for booking::Extras {
    fn from(e: Extras) -> Self {
        Self {
            private_car_4_seater: e.private_car_4_seater,
            private_car_7_seater: e.private_car_7_seater,
            shared_rides: e.shared_rides,
            breakfast: e.breakfast,
            veg_lunch: e.veg_lunch,
            non_veg_lunch: e.non_veg_lunch,
            tour_guide: e.tour_guide,
            insurance: e.insurance,
        }
    }
}

/// Payment made for a [`Booking`].
#[derive(Clone, Debug, Serialize)]
pub struct Payment {
    /// Paid amount.
    pub amount: Money,

    /// Kind of the payment, like `ONLINE` or `CASH`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Request to book a seat.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewBooking {
    /// Name of the boat to book a seat on.
    pub boat_name: Option<String>,

    /// Contact phone.
    pub phone: Option<String>,

    /// Date (and time) of the tour.
    pub journey_at: Option<String>,

    /// Passengers of the new [`Booking`].
    pub passengers: Vec<NewPassenger>,

    /// [`Extras`] to order.
    pub extras: Extras,

    /// Payment made for the new [`Booking`].
    pub payment: Option<NewPayment>,
}

/// Passenger of a [`NewBooking`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPassenger {
    /// Full name of the passenger.
    pub full_name: Option<String>,

    /// Age of the passenger in full years.
    pub age: Option<i16>,

    /// Gender of the passenger: `male`, `female` or `other`.
    pub gender: Option<String>,
}

/// Payment of a [`NewBooking`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPayment {
    /// Paid amount.
    pub amount: Option<Decimal>,

    /// Currency of the paid amount.
    pub currency: Option<Currency>,

    /// Kind of the payment: `online` or `cash`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl NewPassenger {
    /// Validates this [`NewPassenger`] into a [`booking::Passenger`].
    fn into_passenger(self) -> Result<booking::Passenger, Error> {
        let Self {
            full_name,
            age,
            gender,
        } = self;

        let full_name = api::required("passengers.fullName", full_name)?;
        let age = api::required("passengers.age", age)?;
        let gender = api::required("passengers.gender", gender)?;
        Ok(booking::Passenger {
            full_name: api::parse("passengers.fullName", full_name.trim())?,
            age: booking::Age::try_from(age)
                .map_err(|e| Error::validation("passengers.age", &e))?,
            gender: api::parse(
                "passengers.gender",
                &gender.trim().to_uppercase(),
            )?,
        })
    }
}

impl NewBooking {
    /// Validates this [`NewBooking`] request into a [`command::ReserveSeat`].
    ///
    /// Payments not specifying a [`Currency`] are made in the provided
    /// `default_currency`.
    ///
    /// # Errors
    ///
    /// Names the first missing or malformed field.
    pub fn into_command(
        self,
        default_currency: Currency,
    ) -> Result<command::ReserveSeat, Error> {
        let Self {
            boat_name,
            phone,
            journey_at,
            passengers,
            extras,
            payment,
        } = self;

        let boat_name = api::required("boatName", boat_name)?;
        let boat_name = api::parse::<boat::Name>("boatName", boat_name.trim())?;
        let phone = api::required("phone", phone)?;
        let phone = api::parse::<Phone>("phone", phone.trim())?;
        let journey_at = api::required("journeyAt", journey_at)?;
        let journey_at = api::date_time("journeyAt", &journey_at)?.coerce();

        let passengers = passengers
            .into_iter()
            .map(NewPassenger::into_passenger)
            .collect::<Result<Vec<_>, _>>()?;
        let passengers = booking::Passengers::new(passengers).ok_or_else(|| {
            Error::validation("passengers", &"must not be empty")
        })?;

        let payment = api::required("payment", payment)?;
        let amount = api::required("payment.amount", payment.amount)?;
        let kind = api::required("payment.type", payment.kind)?;
        let payment = booking::Payment::new(
            Money {
                amount,
                currency: payment.currency.unwrap_or(default_currency),
            },
            api::parse("payment.type", &kind.trim().to_uppercase())?,
        )
        .ok_or_else(|| {
            Error::validation("payment.amount", &"must not be negative")
        })?;

        Ok(command::ReserveSeat {
            boat_name,
            phone,
            journey_at,
            passengers,
            extras: extras.into(),
            payment,
        })
    }
}

/// Books a seat on a boat tour.
#[tracing::instrument(skip_all, fields(boat.name = tracing::field::Empty))]
pub async fn book(
    Extension(svc): Extension<Service>,
    WithRejection(Json(body), _): WithRejection<Json<NewBooking>, Error>,
) -> crate::Result<Booking> {
    let cmd = body.into_command(svc.config().default_currency)?;
    _ = tracing::Span::current()
        .record("boat.name", tracing::field::display(&cmd.boat_name));

    let booking = svc.execute(cmd).await.map_err(AsError::into_error)?;
    tracing::info!(booking.code = %booking.code, "seat reserved");
    Ok(Data(booking.into()))
}

/// Request to cancel a [`Booking`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cancellation {
    /// Code of the [`Booking`] to cancel.
    pub code: Option<String>,

    /// Reason of the cancellation.
    pub reason: Option<String>,
}

/// Cancels a [`Booking`].
///
/// The seat of the cancelled [`Booking`] is not returned to the boat.
#[tracing::instrument(skip_all, fields(booking.code = tracing::field::Empty))]
pub async fn cancel(
    Extension(svc): Extension<Service>,
    WithRejection(Json(body), _): WithRejection<Json<Cancellation>, Error>,
) -> crate::Result<Booking> {
    let code = api::required("code", body.code)?;
    let code = api::parse::<booking::Code>("code", code.trim())?;
    _ = tracing::Span::current()
        .record("booking.code", tracing::field::display(&code));
    let reason = body
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| api::parse("reason", r))
        .transpose()?;

    let booking = svc
        .execute(command::CancelBooking { code, reason })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(booking.into()))
}

/// Query parameters of a [`Booking`] list.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Number of [`Booking`]s to skip.
    pub skip: Option<i64>,

    /// Maximum number of [`Booking`]s to return.
    pub limit: Option<i64>,

    /// Status of the [`Booking`]s to return: `cancelled`, `notCancelled`,
    /// `withInsurance` or `withTourGuide`.
    pub status: Option<String>,

    /// Earliest journey date (inclusive).
    pub from: Option<String>,

    /// Latest journey date (inclusive).
    pub to: Option<String>,
}

impl ListParams {
    /// Validates these [`ListParams`] into a [`read::booking::list::Selector`].
    ///
    /// # Errors
    ///
    /// Names the first malformed parameter.
    pub fn selector(self) -> Result<read::booking::list::Selector, Error> {
        let Self {
            skip,
            limit,
            status,
            from,
            to,
        } = self;

        Ok(read::booking::list::Selector {
            arguments: api::Pagination { skip, limit }.arguments()?,
            filter: read::booking::list::Filter {
                status: status.as_deref().map(parse_status).transpose()?,
                journey: journey(from, to)?,
                ..read::booking::list::Filter::default()
            },
        })
    }
}

/// Parses a [`read::booking::list::Status`] out of its query value.
fn parse_status(value: &str) -> Result<read::booking::list::Status, Error> {
    use read::booking::list::Status as S;

    match value {
        "cancelled" => Ok(S::Cancelled),
        "notCancelled" => Ok(S::NotCancelled),
        "withInsurance" => Ok(S::WithInsurance),
        "withTourGuide" => Ok(S::WithTourGuide),
        _ => Err(Error::validation(
            "status",
            &format_args!("unknown `{value}`"),
        )),
    }
}

/// Parses an inclusive journey range out of its query bounds.
///
/// Either both bounds or none of them must be provided.
fn journey(
    from: Option<String>,
    to: Option<String>,
) -> Result<Option<RangeInclusive<booking::JourneyDateTime>>, Error> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }
    let from = api::date_time("from", &api::required("from", from)?)?;
    let to = api::date_time("to", &api::required("to", to)?)?;
    if from > to {
        return Err(Error::validation("to", &"must not precede `from`"));
    }
    Ok(Some(from.coerce()..=to.coerce()))
}

/// Executes the [`query::bookings::List`] with the provided `selector`.
pub(crate) async fn list_by(
    svc: &Service,
    selector: read::booking::list::Selector,
) -> crate::Result<api::Page<Booking>> {
    let page = svc
        .execute(query::bookings::List::by(selector))
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(api::Page::from_page(page, Booking::from)))
}

/// Lists [`Booking`]s in their creation order.
#[tracing::instrument(skip_all)]
pub async fn list(
    Extension(svc): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> crate::Result<api::Page<Booking>> {
    list_by(&svc, params.selector()?).await
}

/// Lists cancelled [`Booking`]s.
#[tracing::instrument(skip_all)]
pub async fn cancelled(
    Extension(svc): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> crate::Result<api::Page<Booking>> {
    let mut selector = ListParams {
        status: None,
        ..params
    }
    .selector()?;
    selector.filter.status = Some(read::booking::list::Status::Cancelled);
    list_by(&svc, selector).await
}

/// Lists not cancelled [`Booking`]s with the provided `status`.
async fn list_with(
    svc: &Service,
    pagination: api::Pagination,
    status: read::booking::list::Status,
) -> crate::Result<api::Page<Booking>> {
    let selector = read::booking::list::Selector {
        arguments: pagination.arguments()?,
        filter: read::booking::list::Filter {
            status: Some(status),
            ..read::booking::list::Filter::default()
        },
    };
    list_by(svc, selector).await
}

/// Lists not cancelled [`Booking`]s with an insurance.
#[tracing::instrument(skip_all)]
pub async fn with_insurance(
    Extension(svc): Extension<Service>,
    WithRejection(Query(pagination), _): WithRejection<
        Query<api::Pagination>,
        Error,
    >,
) -> crate::Result<api::Page<Booking>> {
    list_with(
        &svc,
        pagination,
        read::booking::list::Status::WithInsurance,
    )
    .await
}

/// Lists not cancelled [`Booking`]s with a tour guide.
#[tracing::instrument(skip_all)]
pub async fn with_tour_guide(
    Extension(svc): Extension<Service>,
    WithRejection(Query(pagination), _): WithRejection<
        Query<api::Pagination>,
        Error,
    >,
) -> crate::Result<api::Page<Booking>> {
    list_with(
        &svc,
        pagination,
        read::booking::list::Status::WithTourGuide,
    )
    .await
}

/// Lists not cancelled [`Booking`]s made today (in UTC).
#[tracing::instrument(skip_all)]
pub async fn todays(
    Extension(svc): Extension<Service>,
    WithRejection(Query(pagination), _): WithRejection<
        Query<api::Pagination>,
        Error,
    >,
) -> crate::Result<api::Page<Booking>> {
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    let today = DateTime::now().start_of_day();
    let page = svc
        .execute(query::bookings::CreatedBetween {
            range: today.coerce()..(today + DAY).coerce(),
            arguments: pagination.arguments()?,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(api::Page::from_page(page, Booking::from)))
}

/// Returns the [`Booking`] with the provided ID or [`booking::Code`].
#[tracing::instrument(skip_all, fields(booking.id = %id))]
pub async fn by_id(
    Extension(svc): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<String>, Error>,
) -> crate::Result<Booking> {
    let booking = match id.trim().parse::<Uuid>() {
        Ok(id) => svc.execute(query::booking::ById::by(id.into())).await,
        Err(_) => {
            let code = api::parse::<booking::Code>("id", id.trim())?;
            svc.execute(query::booking::ByCode::by(&code)).await
        }
    };
    booking
        .map_err(AsError::into_error)?
        .map(|b| Data(b.into()))
        .ok_or_else(|| BookingError::NotExists.into())
}

/// Lists [`Booking`]s made with the provided contact phone.
#[tracing::instrument(skip_all)]
pub async fn by_phone(
    Extension(svc): Extension<Service>,
    WithRejection(Path(phone), _): WithRejection<Path<String>, Error>,
    WithRejection(Query(pagination), _): WithRejection<
        Query<api::Pagination>,
        Error,
    >,
) -> crate::Result<api::Page<Booking>> {
    let phone = api::parse::<Phone>("phone", phone.trim())?;

    let page = svc
        .execute(query::bookings::ByPhone {
            phone,
            arguments: pagination.arguments()?,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Data(api::Page::from_page(page, Booking::from)))
}

impl AsError for command::reserve_seat::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BoatNotExists(_) => {
                Some(api::boat::BoatError::NotExists.into())
            }
            Self::BoatInactive(_) => Some(BookingError::BoatInactive.into()),
            Self::NoCapacity(_) => Some(BookingError::NoCapacity.into()),
            Self::CodeGenerationFailed(_) => None,
        }
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => Some(BookingError::NotExists.into()),
            Self::AlreadyCancelled(_) => {
                Some(BookingError::AlreadyCancelled.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Currency;
    use rust_decimal::Decimal;
    use serde_json::json;
    use service::domain::booking::{Gender, PaymentKind};

    use super::{journey, parse_status, ListParams, NewBooking};

    fn request(body: serde_json::Value) -> NewBooking {
        serde_json::from_value(body).unwrap()
    }

    fn valid() -> serde_json::Value {
        json!({
            "boatName": "Sea Pearl",
            "phone": "9876543210",
            "journeyAt": "2030-05-01",
            "passengers": [
                {"fullName": "Anna Joseph", "age": 30, "gender": "female"},
                {"fullName": "Ravi Joseph", "age": 7, "gender": "MALE"},
            ],
            "extras": {"vegLunch": 2, "insurance": true},
            "payment": {"amount": 3000, "type": "online"},
        })
    }

    #[test]
    fn builds_reservation_command() {
        let cmd = request(valid()).into_command(Currency::Inr).unwrap();

        assert_eq!(cmd.boat_name.to_string(), "Sea Pearl");
        assert_eq!(cmd.passengers.len(), 2);
        assert_eq!(cmd.passengers[0].gender, Gender::Female);
        assert_eq!(cmd.passengers.summary().to_string(), "1 Adult, 1 Kid");
        assert_eq!(cmd.extras.veg_lunch, 2);
        assert!(cmd.extras.insurance);
        assert!(!cmd.extras.tour_guide);
        assert_eq!(cmd.payment.kind(), PaymentKind::Online);
        assert_eq!(cmd.payment.amount().amount, Decimal::from(3000));
        assert_eq!(cmd.payment.amount().currency, Currency::Inr);
        assert_eq!(cmd.journey_at.to_rfc3339(), "2030-05-01T00:00:00Z");
    }

    #[test]
    fn keeps_provided_currency() {
        let mut body = valid();
        body["payment"]["currency"] = json!("USD");

        let cmd = request(body).into_command(Currency::Inr).unwrap();
        assert_eq!(cmd.payment.amount().currency, Currency::Usd);
    }

    #[test]
    fn names_invalid_field() {
        for (field, value, name) in [
            ("boatName", json!(null), "`boatName`"),
            ("phone", json!("123"), "`phone`"),
            ("journeyAt", json!("tomorrow"), "`journeyAt`"),
            ("passengers", json!([]), "`passengers`"),
            (
                "passengers",
                json!([{"fullName": "Anna", "age": 200, "gender": "female"}]),
                "`passengers.age`",
            ),
            (
                "passengers",
                json!([{"fullName": "Anna", "age": 20, "gender": "robot"}]),
                "`passengers.gender`",
            ),
            ("payment", json!(null), "`payment`"),
            (
                "payment",
                json!({"amount": -1, "type": "cash"}),
                "`payment.amount`",
            ),
            (
                "payment",
                json!({"amount": 10, "type": "cheque"}),
                "`payment.type`",
            ),
        ] {
            let mut body = valid();
            body[field] = value;

            let err = request(body).into_command(Currency::Inr).unwrap_err();
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
            assert!(err.message.contains(name), "{field}: {err}");
        }
    }

    #[test]
    fn parses_list_filters() {
        assert!(parse_status("withTourGuide").is_ok());
        assert!(parse_status("all").is_err());

        assert!(journey(None, None).unwrap().is_none());
        let range = journey(
            Some("2030-05-01".to_owned()),
            Some("2030-05-31".to_owned()),
        )
        .unwrap()
        .unwrap();
        assert!(range.start() < range.end());

        let err = journey(Some("2030-05-01".to_owned()), None).unwrap_err();
        assert!(err.message.contains("`to`"), "{err}");
        let err = journey(
            Some("2030-05-31".to_owned()),
            Some("2030-05-01".to_owned()),
        )
        .unwrap_err();
        assert!(err.message.contains("`to`"), "{err}");

        let err = ListParams {
            status: Some("archived".to_owned()),
            ..ListParams::default()
        }
        .selector()
        .unwrap_err();
        assert!(err.message.contains("`status`"), "{err}");
    }
}
