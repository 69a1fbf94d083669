//! Validation rules for car records.
//!
//! A car is accepted only when brand, model, year, and a non-empty item
//! list are present, and the year falls inside a rolling ten-year window
//! ending at the current calendar year. Item lists are de-duplicated
//! before they ever reach the database.

use chrono::Datelike;

use crate::error::CoreError;

/// Width of the accepted model-year window, in years.
pub const YEAR_WINDOW_YEARS: i32 = 10;

/// Message returned when a (brand, model, year) combination already exists.
pub const DUPLICATE_CAR_MESSAGE: &str = "there is already a car with this data";

/// A fully validated payload for creating a car.
///
/// Produced by [`validate_new_car`]; `items` is already de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub items: Vec<String>,
}

/// A normalized partial update.
///
/// Empty strings in the submitted payload count as "not supplied" and
/// are dropped here, so `Some` always means "overwrite with this value".
/// A supplied `items` list replaces the stored set wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarPatch {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub items: Option<Vec<String>>,
}

impl CarPatch {
    /// True when the patch carries no field at all.
    pub fn is_noop(&self) -> bool {
        self.brand.is_none() && self.model.is_none() && self.year.is_none() && self.items.is_none()
    }
}

/// The current calendar year (UTC), the upper bound of the year window.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Validate a creation payload and normalize it into a [`NewCar`].
///
/// Fields are checked in a fixed order so the caller always gets the
/// first missing field's message. An empty string or an empty item list
/// counts as missing.
pub fn validate_new_car(
    brand: Option<&str>,
    model: Option<&str>,
    year: Option<i32>,
    items: Option<&[String]>,
    today_year: i32,
) -> Result<NewCar, CoreError> {
    let brand = non_empty(brand).ok_or_else(|| required("brand"))?;
    let model = non_empty(model).ok_or_else(|| required("model"))?;
    let year = year.ok_or_else(|| required("year"))?;
    let items = items
        .filter(|i| !i.is_empty())
        .ok_or_else(|| CoreError::Validation("items are required".into()))?;

    validate_year(year, today_year)?;

    Ok(NewCar {
        brand: brand.to_string(),
        model: model.to_string(),
        year,
        items: dedup_items(items),
    })
}

/// Validate an update payload and normalize it into a [`CarPatch`].
///
/// Only a supplied `year` is validated; other fields are passed through
/// after empty-string normalization. A supplied `items` list (even an
/// empty one) replaces the stored set, de-duplicated.
pub fn validate_car_patch(
    brand: Option<&str>,
    model: Option<&str>,
    year: Option<i32>,
    items: Option<&[String]>,
    today_year: i32,
) -> Result<CarPatch, CoreError> {
    if let Some(year) = year {
        validate_year(year, today_year)?;
    }

    Ok(CarPatch {
        brand: non_empty(brand).map(str::to_string),
        model: non_empty(model).map(str::to_string),
        year,
        items: items.map(dedup_items),
    })
}

/// Check that `year` lies in `[today_year - YEAR_WINDOW_YEARS, today_year]`.
pub fn validate_year(year: i32, today_year: i32) -> Result<(), CoreError> {
    let min = today_year - YEAR_WINDOW_YEARS;
    if year < min || year > today_year {
        return Err(CoreError::Validation(format!(
            "year should be between {min} and {today_year}"
        )));
    }
    Ok(())
}

/// Collapse duplicate item names, preserving first-seen order.
pub fn dedup_items(items: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Treat `None` and `Some("")` alike: the field was not supplied.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn required(field: &str) -> CoreError {
    CoreError::Validation(format!("{field} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2025;

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_a_complete_payload() {
        let car = validate_new_car(
            Some("Volkswagen"),
            Some("Gol"),
            Some(2021),
            Some(&items(&["ABS", "Airbag"])),
            YEAR,
        )
        .unwrap();

        assert_eq!(car.brand, "Volkswagen");
        assert_eq!(car.model, "Gol");
        assert_eq!(car.year, 2021);
        assert_eq!(car.items, items(&["ABS", "Airbag"]));
    }

    #[test]
    fn rejects_missing_fields_with_field_specific_messages() {
        let cases: [(Option<&str>, Option<&str>, Option<i32>, &str); 4] = [
            (None, Some("Gol"), Some(2021), "brand is required"),
            (Some(""), Some("Gol"), Some(2021), "brand is required"),
            (Some("VW"), None, Some(2021), "model is required"),
            (Some("VW"), Some("Gol"), None, "year is required"),
        ];

        for (brand, model, year, expected) in cases {
            let err =
                validate_new_car(brand, model, year, Some(&items(&["ABS"])), YEAR).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn rejects_missing_or_empty_items() {
        for list in [None, Some(vec![])] {
            let err = validate_new_car(
                Some("VW"),
                Some("Gol"),
                Some(2021),
                list.as_deref(),
                YEAR,
            )
            .unwrap_err();
            assert_eq!(err.to_string(), "items are required");
        }
    }

    #[test]
    fn year_window_is_inclusive_on_both_ends() {
        assert!(validate_year(YEAR, YEAR).is_ok());
        assert!(validate_year(YEAR - YEAR_WINDOW_YEARS, YEAR).is_ok());
    }

    #[test]
    fn rejects_years_outside_the_window() {
        for bad in [YEAR + 1, YEAR - YEAR_WINDOW_YEARS - 1] {
            let err = validate_year(bad, YEAR).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("year should be between {} and {YEAR}", YEAR - YEAR_WINDOW_YEARS)
            );
        }
    }

    #[test]
    fn duplicate_items_collapse_preserving_order() {
        let deduped = dedup_items(&items(&["A", "A", "B", "A", "C", "B"]));
        assert_eq!(deduped, items(&["A", "B", "C"]));
    }

    #[test]
    fn patch_drops_empty_strings_but_keeps_supplied_values() {
        let patch = validate_car_patch(
            Some(""),
            Some("Polo"),
            None,
            None,
            YEAR,
        )
        .unwrap();

        assert_eq!(patch.brand, None);
        assert_eq!(patch.model.as_deref(), Some("Polo"));
        assert_eq!(patch.year, None);
        assert_eq!(patch.items, None);
    }

    #[test]
    fn patch_validates_a_supplied_year() {
        let err = validate_car_patch(None, None, Some(YEAR + 1), None, YEAR).unwrap_err();
        assert!(err.to_string().starts_with("year should be between"));
    }

    #[test]
    fn patch_dedups_a_supplied_item_list() {
        let patch =
            validate_car_patch(None, None, None, Some(&items(&["A", "A", "B"])), YEAR).unwrap();
        assert_eq!(patch.items, Some(items(&["A", "B"])));
    }

    #[test]
    fn empty_patch_is_a_noop() {
        let patch = validate_car_patch(None, Some(""), None, None, YEAR).unwrap();
        assert!(patch.is_noop());
    }
}
