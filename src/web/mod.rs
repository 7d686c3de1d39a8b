//! Thin request handler: validates the request, invokes the replay guard and
//! resolver, and serializes the result.

mod error;

use crate::config::Config;
use crate::error::TtpError;
use crate::replay::{self, ReplayOutcome};
use crate::resolver;
use crate::ring::Ring;
use crate::store::{SharedStore, REQUEST_PREFIX, TRIPLE_PREFIX};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use error::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Clone)]
struct AxumState {
    store: SharedStore,
    config: Config,
}

pub async fn run(config: Config, store: SharedStore) -> anyhow::Result<()> {
    tracing::debug!("running the beaver triple ttp");
    let port = config.listen_port;
    let axum_state = AxumState { store, config };

    let app = Router::new()
        // healthcheck endpoint
        .route(
            "/",
            get(|| async move {
                tracing::info!("beaver ttp is ready to accept connections");
                StatusCode::OK
            }),
        )
        .route("/api/beaver/share", post(share))
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .layer(Extension(axum_state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(?addr, "starting http server");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

#[derive(Deserialize)]
struct ShareRequest {
    session_id: Option<String>,
    party_id: Option<i64>,
    triple_id: Option<i64>,
    ring: Option<String>,
}

#[derive(Serialize)]
struct ShareWire {
    a: String,
    b: String,
    c: String,
}

#[derive(Serialize)]
struct ShareResponse {
    session_id: String,
    triple_id: u64,
    party_id: u8,
    share: ShareWire,
}

fn validate(request: ShareRequest) -> std::result::Result<(String, u64, u8, Ring), TtpError> {
    let session_id = request
        .session_id
        .ok_or_else(|| TtpError::missing_field("session_id"))?;

    let triple_id = request
        .triple_id
        .ok_or_else(|| TtpError::missing_field("triple_id"))?;
    if triple_id < 0 {
        return Err(TtpError::invalid_value("triple_id must be a non-negative integer"));
    }
    let triple_id = triple_id as u64;

    let party_id = request
        .party_id
        .ok_or_else(|| TtpError::missing_field("party_id"))?;
    if party_id != 0 && party_id != 1 {
        return Err(TtpError::invalid_value(format!(
            "party_id must be 0 or 1, got {party_id}"
        )));
    }
    let party_id = party_id as u8;

    let ring_name = request.ring.ok_or_else(|| TtpError::missing_field("ring"))?;
    let ring = Ring::parse(&ring_name).ok_or_else(|| {
        TtpError::invalid_value(format!("ring must be 'Z2^64' or 'Z2', got '{ring_name}'"))
    })?;

    Ok((session_id, triple_id, party_id, ring))
}

#[tracing::instrument(level = "debug", skip_all)]
async fn share(
    Extension(state): Extension<AxumState>,
    WithRejection(Json(request), _): WithRejection<Json<ShareRequest>, error::Error>,
) -> Result<Json<ShareResponse>> {
    let (session_id, triple_id, party_id, ring) = validate(request)?;
    tracing::debug!(%session_id, triple_id, party_id, %ring, "share request");

    match replay::claim(
        state.store.as_ref(),
        &session_id,
        triple_id,
        party_id,
        state.config.triple_ttl(),
    )
    .await?
    {
        ReplayOutcome::DoubleRequest => {
            tracing::warn!(%session_id, triple_id, party_id, "double request detected");
            return Err(TtpError::DoubleRequest.into());
        }
        ReplayOutcome::Granted => {}
    }

    let record = resolver::resolve(
        state.store.as_ref(),
        &session_id,
        triple_id,
        ring,
        state.config.resolver_config(),
    )
    .await?;

    let share = record
        .share_for(party_id)
        .expect("party_id was validated to be 0 or 1 above");

    Ok(Json(ShareResponse {
        session_id,
        triple_id,
        party_id,
        share: ShareWire {
            a: share.a.to_string(),
            b: share.b.to_string(),
            c: share.c.to_string(),
        },
    }))
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    store: &'static str,
}

#[tracing::instrument(level = "debug", skip_all)]
async fn health(Extension(state): Extension<AxumState>) -> (StatusCode, Json<HealthBody>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthBody {
                status: "healthy",
                store: "connected",
            }),
        ),
        Err(err) => {
            tracing::warn!(%err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody {
                    status: "unhealthy",
                    store: "disconnected",
                }),
            )
        }
    }
}

#[derive(Serialize)]
struct StatsBody {
    active_triples: u64,
    active_requests: u64,
    ttl_seconds: u64,
}

#[tracing::instrument(level = "debug", skip_all)]
async fn stats(Extension(state): Extension<AxumState>) -> Result<Json<StatsBody>> {
    let active_triples = state.store.count_prefix(TRIPLE_PREFIX).await?;
    let active_requests = state.store.count_prefix(REQUEST_PREFIX).await?;
    Ok(Json(StatsBody {
        active_triples,
        active_requests,
        ttl_seconds: state.config.ttl_seconds,
    }))
}
