//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};

/// Defines a fieldless enum of failures, each having its own [`Error`] code,
/// [`http::StatusCode`] and message.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[doc = ::core::concat!("`", ::core::stringify!($name), "` failure.")]
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error,
            Eq,
            PartialEq,
        )]
        pub enum $name {
            $(
                #[doc = $message]
                #[display($message)]
                $variant,
            )*
        }

        impl $name {
            /// Returns the code of this failure.
            #[must_use]
            pub const fn code(self) -> $crate::error::Code {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            /// Returns the [`http::StatusCode`] to respond with.
            #[must_use]
            pub const fn status_code(self) -> ::http::StatusCode {
                match self {
                    $(Self::$variant => ::http::StatusCode::$status_code,)*
                }
            }
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                Self::new(err.code(), err.status_code(), err.to_string())
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Details of an internal [`Error`], not meant for end users.
    pub detail: Option<String>,
}

impl Error {
    /// Creates a new [`Error`] meant for end users.
    #[must_use]
    pub const fn new(
        code: Code,
        status_code: http::StatusCode,
        message: String,
    ) -> Self {
        Self {
            code,
            status_code,
            backtrace: None,
            message,
            detail: None,
        }
    }

    /// Creates a new [`Error`] representing an internal server error, hiding
    /// the provided `msg` in its [`Error::detail`].
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            detail: Some(msg.to_string()),
            ..Self::new(
                "INTERNAL_SERVER_ERROR",
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            )
        }
    }

    /// Attaches the provided [`Trace`] to this [`Error`].
    #[must_use]
    fn with_trace(self, trace: &Trace) -> Self {
        Self {
            backtrace: Some(trace.clone()),
            ..self
        }
    }

    /// Creates a new [`Error`] rejecting the provided request `field`.
    #[must_use]
    pub fn validation(field: &str, reason: &impl fmt::Display) -> Self {
        Self::new(
            "VALIDATION_ERROR",
            http::StatusCode::BAD_REQUEST,
            format!("Invalid `{field}`: {reason}"),
        )
    }

    /// Creates a new [`Error`] rejecting the missing request `field`.
    #[must_use]
    pub fn missing(field: &str) -> Self {
        Self::new(
            "VALIDATION_ERROR",
            http::StatusCode::BAD_REQUEST,
            format!("Missing `{field}`"),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            detail,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}{}",
            detail.iter().format_with("", |d, f| f(&format_args!(": {d}"))),
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

/// Envelope of a failed response.
#[derive(Debug, Serialize)]
struct Failure<'e> {
    /// Always `false`.
    success: bool,

    /// [`Error`] code.
    code: Code,

    /// [`Error`] message.
    message: &'e str,

    /// Details of an internal [`Error`] along with its trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{self}");
        }

        let detail = self.detail.as_ref().map(|d| {
            let trace = self
                .backtrace
                .iter()
                .flat_map(|t| t.iter())
                .format_with("\n", |frame, f| f(&format_args!("{frame}")));
            format!("{d}\n{trace}").trim_end().to_owned()
        });
        let body = Failure {
            success: false,
            code: self.code,
            message: &self.message,
            detail,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Conversion of failures into [`Error`]s shown to API users.
pub trait AsError {
    /// Returns the [`Error`] describing this failure to API users.
    ///
    /// [`None`] if this failure is internal.
    fn try_as_error(&self) -> Option<Error>;

    /// Returns the [`Error`] describing this failure to API users, hiding an
    /// internal one behind [`Error::internal()`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| Error::internal(&self))
    }

    /// Same as [`AsError::as_error()`], but consumes this failure.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref()
            .try_as_error()
            .map(|e| e.with_trace(self.trace()))
    }

    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.as_ref()
            .try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
            .with_trace(self.trace())
    }
}

/// Makes the provided extractor rejections [`Error`]s naming the rejected
/// part of the request.
macro_rules! impl_rejection {
    ($($rejection:ty => $part:literal),* $(,)?) => {$(
        impl AsError for $rejection {
            fn try_as_error(&self) -> Option<Error> {
                Some(Error::validation($part, &self.body_text()))
            }
        }

        impl From<$rejection> for Error {
            fn from(rejection: $rejection) -> Self {
                rejection.as_error()
            }
        }
    )*};
}

impl_rejection! {
    JsonRejection => "body",
    PathRejection => "path",
    QueryRejection => "query",
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use axum::{body, response::IntoResponse as _};
    use serde_json::{json, Value};

    use crate::define_error;

    use super::{AsError, Error};

    define_error! {
        enum TestError {
            #[code = "BOAT_INACTIVE"]
            #[status = CONFLICT]
            #[message = "`Boat` is inactive"]
            Inactive,
        }
    }

    async fn body_of(err: Error) -> (http::StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_domain_error_without_detail() {
        let (status, body) = body_of(TestError::Inactive.into()).await;

        assert_eq!(status, http::StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({
                "success": false,
                "code": "BOAT_INACTIVE",
                "message": "`Boat` is inactive",
            }),
        );
    }

    #[tokio::test]
    async fn renders_internal_error_with_detail() {
        let (status, body) =
            body_of(Error::internal(&"connection reset")).await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("INTERNAL_SERVER_ERROR"));
        assert_eq!(body["detail"], json!("connection reset"));
    }

    #[tokio::test]
    async fn renders_validation_error_naming_field() {
        let (status, body) =
            body_of(Error::validation("limit", &"must be in 1..=100")).await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
        assert_eq!(body["message"], json!("Invalid `limit`: must be in 1..=100"));
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn unmapped_errors_become_internal() {
        #[derive(Debug, derive_more::Display)]
        #[display("pool timed out")]
        struct Unmapped;

        impl AsError for Unmapped {
            fn try_as_error(&self) -> Option<Error> {
                None
            }
        }

        let err = Unmapped.into_error();
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail.as_deref(), Some("pool timed out"));
    }
}
