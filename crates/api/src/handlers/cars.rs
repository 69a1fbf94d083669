//! Handlers for the `/cars` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use carstock_core::error::CoreError;
use carstock_core::pagination;
use carstock_core::types::DbId;
use carstock_core::validation::{self, DUPLICATE_CAR_MESSAGE};
use carstock_db::models::car::{
    CarItem, CarItemRow, CarListQuery, CarPage, CarRecord, CreateCar, UpdateCar,
};
use carstock_db::repositories::CarRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

/// Query parameters for the listing endpoint.
///
/// `page`, `limit`, and `year` are accepted as raw strings: a value
/// that does not parse falls back to its default instead of failing
/// the request.
#[derive(Debug, Deserialize)]
pub struct ListCarsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
}

/// Response body for a successful creation.
#[derive(Debug, Serialize)]
pub struct CarCreated {
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/cars
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCar>,
) -> AppResult<(StatusCode, Json<CarCreated>)> {
    let car = validation::validate_new_car(
        input.brand.as_deref(),
        input.model.as_deref(),
        input.year,
        input.items.as_deref(),
        validation::current_year(),
    )?;

    if CarRepo::find_duplicate(&state.pool, &car.brand, &car.model, car.year)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            DUPLICATE_CAR_MESSAGE.into(),
        )));
    }

    let id = CarRepo::create(&state.pool, &car).await?;
    tracing::debug!(id, brand = %car.brand, model = %car.model, "Car created");

    Ok((StatusCode::CREATED, Json(CarCreated { id })))
}

/// GET /api/v1/cars
///
/// Returns `{count, pages, data}`, or 204 when nothing matches.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListCarsParams>,
) -> AppResult<Response> {
    let query = CarListQuery {
        brand: params.brand.filter(|b| !b.is_empty()),
        model: params.model.filter(|m| !m.is_empty()),
        year: params.year.as_deref().and_then(|y| y.parse().ok()),
        page: pagination::page_from_query(params.page.as_deref()),
        limit: pagination::limit_from_query(params.limit.as_deref()),
    };

    let count = CarRepo::count(&state.pool, &query).await?;
    if count == 0 {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let cars = CarRepo::list_page(&state.pool, &query).await?;
    let ids: Vec<DbId> = cars.iter().map(|car| car.id).collect();
    let mut items_by_car = group_items(CarRepo::items_for_cars(&state.pool, &ids).await?);

    let data = cars
        .into_iter()
        .map(|car| {
            let items = items_by_car.remove(&car.id).unwrap_or_default();
            CarRecord::new(car, items)
        })
        .collect();

    let page = CarPage {
        count,
        pages: pagination::total_pages(count, query.limit),
        data,
    };
    Ok(Json(page).into_response())
}

/// GET /api/v1/cars/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CarRecord>> {
    let car = CarRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("car")))?;
    let items = CarRepo::items_for_car(&state.pool, id).await?;

    Ok(Json(CarRecord::new(car, items)))
}

/// PATCH /api/v1/cars/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCar>,
) -> AppResult<StatusCode> {
    if CarRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound("car")));
    }

    let patch = validation::validate_car_patch(
        input.brand.as_deref(),
        input.model.as_deref(),
        input.year,
        input.items.as_deref(),
        validation::current_year(),
    )?;

    if CarRepo::find_update_conflict(&state.pool, id, &patch)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            DUPLICATE_CAR_MESSAGE.into(),
        )));
    }

    CarRepo::update(&state.pool, id, &patch).await?;
    tracing::debug!(id, "Car updated");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cars/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = CarRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::debug!(id, "Car deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound("car")))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Group a flat item listing by owning car id, keeping row order.
fn group_items(rows: Vec<CarItemRow>) -> HashMap<DbId, Vec<CarItem>> {
    let mut by_car: HashMap<DbId, Vec<CarItem>> = HashMap::new();
    for row in rows {
        by_car
            .entry(row.car_id)
            .or_default()
            .push(CarItem { name: row.name });
    }
    by_car
}
