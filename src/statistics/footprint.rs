use serde::{Deserialize, Serialize};

use crate::core::error::AssociationError;

/// Wrap a right ascension into [0, 360)
fn wrap_ra(ra: f64) -> f64 {
    let wrapped = ra.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// A rectangle on the sky, degrees, bounds inclusive.
///
/// When `ra_min > ra_max` the box wraps through RA = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyBox {
    pub ra_min: f64,
    pub ra_max: f64,
    pub dec_min: f64,
    pub dec_max: f64,
}

impl SkyBox {
    #[must_use]
    pub fn contains(&self, ra: f64, dec: f64) -> bool {
        if dec < self.dec_min || dec > self.dec_max {
            return false;
        }
        let ra = wrap_ra(ra);
        let (lo, hi) = (wrap_ra(self.ra_min), wrap_ra(self.ra_max));
        if lo <= hi {
            (lo..=hi).contains(&ra)
        } else {
            ra >= lo || ra <= hi
        }
    }
}

/// Sky coverage of a catalog as a union of boxes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Footprint {
    pub boxes: Vec<SkyBox>,
}

impl Footprint {
    #[must_use]
    pub fn new(boxes: Vec<SkyBox>) -> Self {
        Self { boxes }
    }

    #[must_use]
    pub fn contains(&self, ra: f64, dec: f64) -> bool {
        self.boxes.iter().any(|b| b.contains(ra, dec))
    }
}

/// Inclusive redshift interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RedshiftRange {
    pub min: f64,
    pub max: f64,
}

impl RedshiftRange {
    #[must_use]
    pub fn contains(&self, redshift: f64) -> bool {
        (self.min..=self.max).contains(&redshift)
    }
}

/// The region of sky and redshift a catalog is complete over.
///
/// An absent bound places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Footprint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redshift_range: Option<RedshiftRange>,
}

impl CatalogMeta {
    /// Unrestricted metadata
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check that the bounds describe a usable region
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::InvalidParameter` for non-finite bounds,
    /// an inverted redshift range, or an inverted declination range.
    pub fn validate(&self) -> Result<(), AssociationError> {
        if let Some(range) = &self.redshift_range {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(AssociationError::invalid(format!(
                    "redshift range [{}, {}] is not a valid interval",
                    range.min, range.max
                )));
            }
        }
        for sky in self.footprint.iter().flat_map(|f| f.boxes.iter()) {
            let finite = [sky.ra_min, sky.ra_max, sky.dec_min, sky.dec_max]
                .iter()
                .all(|v| v.is_finite());
            if !finite || sky.dec_min > sky.dec_max {
                return Err(AssociationError::invalid(format!(
                    "footprint box {sky:?} is not a valid region"
                )));
            }
        }
        Ok(())
    }

    /// Whether an object at this position lies in the region
    #[must_use]
    pub fn contains(&self, ra: f64, dec: f64, redshift: f64) -> bool {
        self.redshift_range.map_or(true, |r| r.contains(redshift))
            && self.footprint.as_ref().map_or(true, |f| f.contains(ra, dec))
    }
}
