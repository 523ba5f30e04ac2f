use std::net::SocketAddr;

use axum::{routing::get, Router};
use time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::state::AppState;
use crate::{auth, pages};

/// Assemble the full router: the gated index, the login page, the auth
/// endpoints, and the static fallback.
///
/// Only `/` is auth-gated. Every other path falls through to `ServeDir` and
/// is served without a session check.
pub fn build_app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.session.secure)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session.ttl_minutes,
        )));

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login_page))
        .merge(auth::router())
        .fallback_service(static_files)
        .with_state(state)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "5001".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
