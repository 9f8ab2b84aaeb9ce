use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use std::sync::Arc;

use crate::{categories, cost_centers, entries};
use engine::Engine;

/// The single account allowed to use the API.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub credentials: Arc<Credentials>,
    /// Zone used to resolve "today" for settlements.
    pub timezone: Tz,
}

impl ServerState {
    pub fn new(engine: Engine, credentials: Credentials, timezone: Tz) -> Self {
        Self {
            engine: Arc::new(engine),
            credentials: Arc::new(credentials),
            timezone,
        }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if auth_header.username() != state.credentials.username
        || auth_header.password() != state.credentials.password
    {
        tracing::debug!(username = auth_header.username(), "rejected credentials");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route("/categories/{id}", delete(categories::remove))
        .route(
            "/cost-centers",
            get(cost_centers::list).post(cost_centers::create),
        )
        .route("/cost-centers/{id}", delete(cost_centers::remove))
        .route("/entries", get(entries::list).post(entries::create))
        .route("/entries/recent", get(entries::recent))
        .route("/entries/summary", get(entries::summary))
        .route(
            "/entries/{id}",
            get(entries::get).put(entries::update).delete(entries::remove),
        )
        .route("/entries/{id}/clone", post(entries::clone))
        .route("/entries/{id}/pay", post(entries::pay))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
