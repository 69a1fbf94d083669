//! Car and car-item models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use carstock_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `cars` table.
#[derive(Debug, Clone, FromRow)]
pub struct Car {
    pub id: DbId,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One equipment item of a car, as exposed by the API.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CarItem {
    pub name: String,
}

/// An item row joined with its owning car id, used when loading items
/// for a whole page of cars in one query.
#[derive(Debug, Clone, FromRow)]
pub struct CarItemRow {
    pub car_id: DbId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for `POST /cars`.
///
/// Every field is optional at the serde level so missing fields produce
/// the field-specific validation messages instead of a bare 422.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCar {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub items: Option<Vec<String>>,
}

/// DTO for `PATCH /cars/{id}`. Absent fields leave the stored value
/// untouched; a supplied `items` list replaces the whole set.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCar {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub items: Option<Vec<String>>,
}

/// Normalized filter and pagination inputs for the listing query.
///
/// Built by the handler after parameter normalization; `page` and
/// `limit` are already defaulted and clamped.
#[derive(Debug, Clone)]
pub struct CarListQuery {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub page: i64,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// DTOs (response payloads)
// ---------------------------------------------------------------------------

/// A car with its item set, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CarRecord {
    pub id: DbId,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub items: Vec<CarItem>,
}

impl CarRecord {
    pub fn new(car: Car, items: Vec<CarItem>) -> Self {
        Self {
            id: car.id,
            brand: car.brand,
            model: car.model,
            year: car.year,
            items,
        }
    }
}

/// One page of the filtered listing: total match count, total pages,
/// and the page's records.
#[derive(Debug, Clone, Serialize)]
pub struct CarPage {
    pub count: i64,
    pub pages: i64,
    pub data: Vec<CarRecord>,
}
