//! Repository for the `cars` and `car_items` tables.
//!
//! Provides car CRUD, the duplicate-car lookups behind the conflict
//! rule, and the filtered, paginated listing query.

use sqlx::PgPool;

use carstock_core::pagination;
use carstock_core::types::DbId;
use carstock_core::validation::{CarPatch, NewCar};

use crate::models::car::{Car, CarItem, CarItemRow, CarListQuery};

/// Column list for `cars` SELECT queries.
const CAR_COLUMNS: &str = "id, brand, model, year, created_at, updated_at";

/// Provides CRUD operations for cars and their item sets.
pub struct CarRepo;

impl CarRepo {
    /// Insert a car and its item set in one transaction.
    ///
    /// The caller passes an already validated [`NewCar`], so `items` is
    /// de-duplicated. Returns the generated id.
    pub async fn create(pool: &PgPool, car: &NewCar) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO cars (brand, model, year) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&car.brand)
        .bind(&car.model)
        .bind(car.year)
        .fetch_one(&mut *tx)
        .await?;

        for name in &car.items {
            sqlx::query("INSERT INTO car_items (car_id, name) VALUES ($1, $2)")
                .bind(id)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Find a car by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Car>, sqlx::Error> {
        let query = format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1");
        sqlx::query_as::<_, Car>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the item set of a single car, in insertion order.
    pub async fn items_for_car(pool: &PgPool, car_id: DbId) -> Result<Vec<CarItem>, sqlx::Error> {
        sqlx::query_as::<_, CarItem>(
            "SELECT name FROM car_items WHERE car_id = $1 ORDER BY id",
        )
        .bind(car_id)
        .fetch_all(pool)
        .await
    }

    /// Load the items of a whole page of cars in one query.
    pub async fn items_for_cars(
        pool: &PgPool,
        car_ids: &[DbId],
    ) -> Result<Vec<CarItemRow>, sqlx::Error> {
        if car_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CarItemRow>(
            "SELECT car_id, name FROM car_items WHERE car_id = ANY($1) ORDER BY id",
        )
        .bind(car_ids)
        .fetch_all(pool)
        .await
    }

    /// Find a car with exactly this (brand, model, year) combination.
    ///
    /// Backs the duplicate pre-check on creation. The unique constraint
    /// on the table catches whatever slips between this check and the
    /// insert.
    pub async fn find_duplicate(
        pool: &PgPool,
        brand: &str,
        model: &str,
        year: i32,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM cars WHERE brand = $1 AND model = $2 AND year = $3",
        )
        .bind(brand)
        .bind(model)
        .bind(year)
        .fetch_optional(pool)
        .await
    }

    /// Find a car other than `id` matching the fields supplied in `patch`.
    ///
    /// Each supplied field contributes one equality condition; omitted
    /// fields constrain nothing. A patch with no fields matches nothing.
    pub async fn find_update_conflict(
        pool: &PgPool,
        id: DbId,
        patch: &CarPatch,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<BindValue> = Vec::new();
        let mut bind_idx = 2u32; // $1 is the car id being updated

        if let Some(ref brand) = patch.brand {
            conditions.push(format!("brand = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(brand.clone()));
        }
        if let Some(ref model) = patch.model {
            conditions.push(format!("model = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(model.clone()));
        }
        if let Some(year) = patch.year {
            conditions.push(format!("year = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(BindValue::Int(year));
        }

        if conditions.is_empty() {
            return Ok(None);
        }

        let query = format!(
            "SELECT id FROM cars WHERE id <> $1 AND {} LIMIT 1",
            conditions.join(" AND ")
        );

        let q = sqlx::query_scalar::<_, DbId>(&query).bind(id);
        bind_scalar_values(q, &bind_values).fetch_optional(pool).await
    }

    /// Count cars matching the listing filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &CarListQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_car_filter(params);
        let query = format!("SELECT COUNT(*)::BIGINT FROM cars {where_clause}");

        let q = sqlx::query_scalar::<_, i64>(&query);
        bind_scalar_values(q, &bind_values).fetch_one(pool).await
    }

    /// Fetch one page of the filtered listing, ordered by id.
    pub async fn list_page(pool: &PgPool, params: &CarListQuery) -> Result<Vec<Car>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_car_filter(params);

        let query = format!(
            "SELECT {CAR_COLUMNS} FROM cars {where_clause} \
             ORDER BY id \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_car_values(sqlx::query_as::<_, Car>(&query), &bind_values);
        q.bind(params.limit)
            .bind(pagination::offset(params.page, params.limit))
            .fetch_all(pool)
            .await
    }

    /// Apply a normalized patch: overwrite the supplied scalar fields and,
    /// if an item list was supplied, replace the whole item set. Runs in
    /// one transaction so the update is all-or-nothing.
    pub async fn update(pool: &PgPool, id: DbId, patch: &CarPatch) -> Result<(), sqlx::Error> {
        if patch.is_noop() {
            return Ok(());
        }

        let mut tx = pool.begin().await?;

        let mut sets: Vec<String> = Vec::new();
        let mut bind_values: Vec<BindValue> = Vec::new();
        let mut bind_idx = 2u32; // $1 is the car id

        if let Some(ref brand) = patch.brand {
            sets.push(format!("brand = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(brand.clone()));
        }
        if let Some(ref model) = patch.model {
            sets.push(format!("model = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(model.clone()));
        }
        if let Some(year) = patch.year {
            sets.push(format!("year = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(BindValue::Int(year));
        }

        if !sets.is_empty() {
            sets.push("updated_at = now()".to_string());
            let query = format!("UPDATE cars SET {} WHERE id = $1", sets.join(", "));

            let mut q = sqlx::query(&query).bind(id);
            for val in &bind_values {
                match val {
                    BindValue::Text(v) => q = q.bind(v.as_str()),
                    BindValue::Int(v) => q = q.bind(*v),
                }
            }
            q.execute(&mut *tx).await?;
        }

        if let Some(ref items) = patch.items {
            sqlx::query("DELETE FROM car_items WHERE car_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for name in items {
                sqlx::query("INSERT INTO car_items (car_id, name) VALUES ($1, $2)")
                    .bind(id)
                    .bind(name)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a car by ID. Cascade deletes its items.
    ///
    /// Returns `true` if a car was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Filter building
// ---------------------------------------------------------------------------

/// A deferred bind value for dynamically built queries.
enum BindValue {
    Text(String),
    Int(i32),
}

/// Build the WHERE clause for the listing filter.
///
/// `brand` and `model` match by substring containment, `year` by
/// greater-or-equal. Returns the clause (possibly empty), the values to
/// bind, and the next free placeholder index.
fn build_car_filter(params: &CarListQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    if let Some(ref brand) = params.brand {
        conditions.push(format!("brand LIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{brand}%")));
    }
    if let Some(ref model) = params.model {
        conditions.push(format!("model LIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{model}%")));
    }
    if let Some(year) = params.year {
        conditions.push(format!("year >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Int(year));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_car_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Int(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_scalar_values<'q, O>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Int(v) => q = q.bind(*v),
        }
    }
    q
}
