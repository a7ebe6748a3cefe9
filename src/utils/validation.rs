//! Centralized validation and helper functions.

use crate::core::error::AssociationError;

/// Maximum number of rows accepted from a single table file (DOS protection)
pub const MAX_ROWS: usize = 50_000_000;

/// Maximum length of a column name in a table header
pub const MAX_COLUMN_NAME_LENGTH: usize = 255;

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_ROWS}"
        ))
    } else {
        None
    }
}

/// Validate a column name from a table header.
///
/// # Examples
///
/// ```
/// use cluster_validation::utils::validation::is_valid_column_name;
///
/// assert!(is_valid_column_name("ra_cen_0"));
/// assert!(is_valid_column_name("halo.mass"));
/// assert!(!is_valid_column_name(""));
/// assert!(!is_valid_column_name("halo mass"));
/// assert!(!is_valid_column_name("0ra"));
/// ```
#[must_use]
pub fn is_valid_column_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_COLUMN_NAME_LENGTH
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// A matching threshold must be a finite, non-negative number.
///
/// # Errors
///
/// Returns `AssociationError::InvalidParameter` otherwise.
pub fn check_threshold(name: &str, value: f64) -> Result<(), AssociationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AssociationError::invalid(format!(
            "{name} must be a finite number >= 0, got {value}"
        )))
    }
}

/// A probability cut must lie in [0, 1].
///
/// # Errors
///
/// Returns `AssociationError::InvalidParameter` otherwise.
pub fn check_probability_threshold(name: &str, value: f64) -> Result<(), AssociationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AssociationError::invalid(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

/// Right ascension in any finite value (wrapped later), declination in [-90, 90].
///
/// # Errors
///
/// Returns `AssociationError::Schema` naming the offending column and row.
pub fn check_sky_position(
    ra_column: &str,
    dec_column: &str,
    row: usize,
    ra: f64,
    dec: f64,
) -> Result<(), AssociationError> {
    if !ra.is_finite() {
        return Err(AssociationError::schema(format!(
            "column '{ra_column}' row {row}: right ascension {ra} is not finite"
        )));
    }
    if !dec.is_finite() || !(-90.0..=90.0).contains(&dec) {
        return Err(AssociationError::schema(format!(
            "column '{dec_column}' row {row}: declination {dec} outside [-90, 90]"
        )));
    }
    Ok(())
}

/// Finite value >= 0 (redshift, richness).
///
/// # Errors
///
/// Returns `AssociationError::Schema` naming the offending column and row.
pub fn check_non_negative(column: &str, row: usize, value: f64) -> Result<(), AssociationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AssociationError::schema(format!(
            "column '{column}' row {row}: {value} must be finite and >= 0"
        )))
    }
}

/// Finite value > 0 (halo mass).
///
/// # Errors
///
/// Returns `AssociationError::Schema` naming the offending column and row.
pub fn check_positive(column: &str, row: usize, value: f64) -> Result<(), AssociationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AssociationError::schema(format!(
            "column '{column}' row {row}: {value} must be finite and > 0"
        )))
    }
}

/// Membership probability in [0, 1].
///
/// # Errors
///
/// Returns `AssociationError::Schema` naming the offending column and row.
pub fn check_probability(column: &str, row: usize, value: f64) -> Result<(), AssociationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AssociationError::schema(format!(
            "column '{column}' row {row}: probability {value} outside [0, 1]"
        )))
    }
}

/// Compute a signature hash from a list of (halo, cluster) index pairs.
///
/// The signature is computed by:
/// 1. Sorting the pairs
/// 2. Joining them as `halo:cluster` with commas
/// 3. Computing MD5 of the concatenated string
///
/// This provides a deterministic identifier for an assignment, so two runs can
/// be compared for bit-identical output.
#[must_use]
pub fn compute_signature(pairs: impl IntoIterator<Item = (usize, usize)>) -> String {
    let mut sorted: Vec<(usize, usize)> = pairs.into_iter().collect();
    if sorted.is_empty() {
        return String::new();
    }
    sorted.sort_unstable();
    let concatenated = sorted
        .iter()
        .map(|(h, c)| format!("{h}:{c}"))
        .collect::<Vec<_>>()
        .join(",");
    let digest = md5::compute(concatenated.as_bytes());
    format!("{digest:x}")
}
