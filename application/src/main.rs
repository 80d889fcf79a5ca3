use std::{future::IntoFuture as _, io, sync::OnceLock, time};

use application::{api, config, Args, Config};
use axum::{extract::MatchedPath, Extension, Router};
use axum_client_ip::InsecureClientIp;
use futures::TryFutureExt as _;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// Levels written to stderr rather than stdout.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Maximum level to log, known once [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(log_layer(io::stdout, false))
        .with(log_layer(io::stderr, true))
        .init();

    _ = start().await;
}

/// Creates a compact log layer writing the spans and the events, either of
/// the [`STDERR_LEVELS`] or not, to the provided `writer`.
fn log_layer<S, W>(
    writer: W,
    stderr: bool,
) -> impl tracing_subscriber::Layer<S>
where
    S: log::Subscriber
        + for<'s> tracing_subscriber::registry::LookupSpan<'s>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
            meta.is_span()
                || STDERR_LEVELS.contains(meta.level()) == stderr
                    && max >= *meta.level()
        }))
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level)
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;
    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;

    let app = api::router()
        .layer(Extension(Service::new(service.into(), postgres)))
        .layer(cors(&server.cors)?);
    let app = traced(app);

    let addr = (server.host.as_str(), server.port);
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        log::error!("failed to listen on `{}:{}`: {e}", addr.0, addr.1);
    })?;
    log::info!("listening on `{}:{}`", addr.0, addr.1);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .map_err(|e| log::error!("webserver failed: {e}"))
        .await?;

    log::info!("webserver stopped");
    Ok(())
}

/// Creates a [`CorsLayer`] allowing the configured origins to call the API.
///
/// The `*` origin allows any.
fn cors(conf: &config::Cors) -> Result<CorsLayer, ()> {
    let allowed = if conf.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        conf.origins
            .iter()
            .map(|origin| {
                origin.parse::<http::HeaderValue>().map_err(|e| {
                    log::error!("`{origin}` is not a valid CORS origin: {e}");
                })
            })
            .collect::<Result<Vec<_>, _>>()?
            .into()
    };

    Ok(CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
            http::Method::PUT,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_origin(allowed))
}

/// Wraps every request to the provided [`Router`] into an `HTTP request`
/// span, logging its status and duration once responded.
fn traced(app: Router) -> Router {
    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(|r: &http::Request<_>| {
                let client_ip =
                    InsecureClientIp::from(r.headers(), r.extensions())
                        .map(|ip| ip.0.to_string())
                        .ok();
                log::info_span!(
                    "HTTP request",
                    http.client_ip = client_ip,
                    http.flavor = ?r.version(),
                    http.method = r.method().as_str(),
                    http.route = r
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str),
                    http.target = r
                        .uri()
                        .path_and_query()
                        .map(http::uri::PathAndQuery::as_str),
                    http.user_agent = r
                        .headers()
                        .get(http::header::USER_AGENT)
                        .and_then(|h| h.to_str().ok()),
                    http.status_code = log::field::Empty,
                )
            })
            .on_response(
                |r: &http::Response<_>,
                 dur: time::Duration,
                 span: &log::Span| {
                    let status = r.status();
                    _ = span.record(
                        "http.status_code",
                        log::field::display(status.as_u16()),
                    );

                    let duration = format!("{}ms", dur.as_millis());
                    if status.is_client_error() || status.is_server_error() {
                        log::error!(%duration);
                    } else {
                        log::info!(%duration);
                    }
                },
            ),
    )
}

/// Resolves once the process is asked to stop with `SIGINT` or `SIGTERM`.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("cannot listen for `SIGINT`: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut s) => drop(s.recv().await),
            Err(e) => {
                log::error!("cannot listen for `SIGTERM`: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => log::info!("`SIGINT` received, shutting down"),
        () = terminate => log::info!("`SIGTERM` received, shutting down"),
    }
}
