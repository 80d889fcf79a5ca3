//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
pub mod error;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tokio as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// Successful response carrying the provided `data`.
#[derive(Clone, Copy, Debug)]
pub struct Data<T>(pub T);

/// Envelope of a successful response.
#[derive(Debug, Serialize)]
struct Success<T> {
    /// Always `true`.
    success: bool,

    /// Payload of the response.
    data: T,
}

impl<T: Serialize> IntoResponse for Data<T> {
    fn into_response(self) -> Response {
        Json(Success {
            success: true,
            data: self.0,
        })
        .into_response()
    }
}

/// Result of a REST API handler.
pub type Result<T> = std::result::Result<Data<T>, Error>;

#[cfg(test)]
mod spec {
    use axum::{body, response::IntoResponse as _};
    use serde_json::json;

    use super::Data;

    #[tokio::test]
    async fn wraps_data_into_envelope() {
        let resp = Data(json!({"availableSeats": 1})).into_response();
        assert_eq!(resp.status(), http::StatusCode::OK);

        let bytes = body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"success": true, "data": {"availableSeats": 1}}),
        );
    }
}
