use crate::api::ListingQuery;
use crate::form::schema;
use crate::models::Listing;
use crate::server::error::{ServerError, ServerResult};
use crate::store::ListingCollection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// State shared by the listing handlers
#[derive(Debug)]
pub struct AppState {
    pub collection: ListingCollection,
    /// Pass-phrase create requests must carry, when set
    pub admin_password: Option<String>,
}

pub fn listing_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/properties", get(list_listings).post(create_listing))
        .route("/api/properties/:slug", get(get_listing))
        .with_state(state)
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_listing(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Listing>)> {
    let Json(document) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    if let Some(expected) = &state.admin_password {
        let supplied = document.get("password").and_then(Value::as_str);
        if supplied != Some(expected.as_str()) {
            return Err(ServerError::Unauthorized);
        }
    }

    let payload = schema::validate(&document).map_err(ServerError::Invalid)?;
    let listing = state.collection.insert(payload.listing).await?;
    info!("Created listing '{}'", listing.slug);
    Ok((StatusCode::CREATED, Json(listing)))
}

async fn list_listings(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<Listing>>> {
    let Query(query) = query.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    let listings = state.collection.list(&query).await;
    debug!("Listing {} properties ({:?})", listings.len(), query);
    Ok(Json(listings))
}

async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ServerResult<Json<Listing>> {
    state
        .collection
        .get(&slug)
        .await
        .map(Json)
        .ok_or(ServerError::NotFound)
}
