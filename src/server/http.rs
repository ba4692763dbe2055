//! HTTP surface
//!
//! A thin axum server exposing the enforcement surface: a public liveness
//! endpoint, an identity endpoint, and an authorization decision endpoint.
//! The trust gate runs as middleware in front of everything under `/api`;
//! routes under `/pub` are explicitly public and bypass it entirely.

use crate::access::{AccessEngine, AuthenticatedUser, System, Verb};
use crate::identity::{RequestMetadata, REAL_IP};
use crate::server::trust::{client_origin, TrustedNetworks};
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared state for request handlers
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<AccessEngine>,
    pub trusted: Arc<TrustedNetworks>,
}

/// The caller as established by the trust gate
#[derive(Debug, Clone)]
pub enum Caller {
    /// Origin inside the local-network allowlist; authorization bypassed
    Trusted,
    /// Resolved through the permission engine
    User(AuthenticatedUser),
}

impl Caller {
    /// Whether this caller may apply `verb` to `resource` within `system`
    pub fn allows(&self, system: System, resource: &str, verb: Verb) -> bool {
        match self {
            Caller::Trusted => true,
            Caller::User(user) => user.is_allowed(system, resource, verb),
        }
    }

    /// Username, when one was resolved
    pub fn username(&self) -> Option<&str> {
        match self {
            Caller::Trusted => None,
            Caller::User(user) => Some(&user.username),
        }
    }
}

/// Collect request metadata for identity resolution and origin checks
///
/// The socket peer address fills the direct-origin slot only when no
/// explicit real-ip header is present, so a reverse proxy's hint wins.
pub fn build_metadata(headers: &HeaderMap, peer: Option<SocketAddr>) -> RequestMetadata {
    let mut metadata = RequestMetadata::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            metadata.insert(name.as_str(), value);
        }
    }
    if let Some(peer) = peer {
        if !metadata.contains(REAL_IP) {
            metadata.insert(REAL_IP, peer.ip().to_string());
        }
    }
    metadata
}

/// Trust-gate middleware
///
/// Trusted origins pass without touching the permission engine. Everyone
/// else is resolved through it; any failure is a denial. Successful calls
/// get a [`Caller`] extension for endpoint-level checks.
pub async fn trust_gate(
    State(state): State<ServerState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0);
    let metadata = build_metadata(request.headers(), peer);

    match client_origin(&metadata) {
        Some(origin) if state.trusted.contains(origin) => {
            debug!(%origin, "origin inside trusted networks, bypassing authorization");
            request.extensions_mut().insert(Caller::Trusted);
            return next.run(request).await;
        }
        Some(origin) => {
            debug!(%origin, "origin outside trusted networks");
        }
        None => {
            // Fail closed: unresolvable origin gets no bypass.
            warn!("could not resolve request origin");
        }
    }

    match state.engine.get_user(&metadata) {
        Ok(user) => {
            debug!(user = %user.username, "authenticated");
            request.extensions_mut().insert(Caller::User(user));
            next.run(request).await
        }
        Err(err) => {
            warn!(error = %err, "denying unauthenticated request");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// Liveness endpoint; served outside the trust gate
async fn ping() -> &'static str {
    "pong"
}

#[derive(Serialize)]
struct WhoAmI {
    username: Option<String>,
    trusted: bool,
    systems: Vec<String>,
}

async fn whoami(Extension(caller): Extension<Caller>) -> Json<WhoAmI> {
    let (trusted, systems) = match &caller {
        Caller::Trusted => (true, Vec::new()),
        Caller::User(user) => {
            let mut systems: Vec<String> =
                user.rules.keys().map(|s| s.as_str().to_string()).collect();
            systems.sort();
            (false, systems)
        }
    };

    Json(WhoAmI {
        username: caller.username().map(str::to_string),
        trusted,
        systems,
    })
}

#[derive(Deserialize)]
struct CheckParams {
    system: String,
    resource: String,
    verb: String,
}

#[derive(Serialize)]
struct CheckResult {
    allowed: bool,
}

/// Authorization decision endpoint
///
/// Exercises the same `is_allowed` query downstream call sites use.
async fn check(
    Extension(caller): Extension<Caller>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResult>, StatusCode> {
    let system = System::try_parse(&params.system).ok_or(StatusCode::BAD_REQUEST)?;
    let verb = Verb::try_parse(&params.verb).ok_or(StatusCode::BAD_REQUEST)?;

    Ok(Json(CheckResult {
        allowed: caller.allows(system, &params.resource, verb),
    }))
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/v1/whoami", get(whoami))
        .route("/v1/check", get(check))
        .route_layer(middleware::from_fn_with_state(state.clone(), trust_gate));

    Router::new()
        .route("/pub/ping", get(ping))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until ctrl-c
pub async fn run(state: ServerState, bind: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(bind).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("received shutdown signal");
    })
    .await?;

    Ok(())
}
