use serde::{Deserialize, Serialize};

use crate::core::columns::ColumnNames;
use crate::core::error::AssociationError;
use crate::core::table::Table;
use crate::utils::validation::{check_non_negative, check_positive, check_sky_position};

/// A galaxy from the truth catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Galaxy {
    pub id: i64,

    /// Weak reference to the host halo
    pub halo_id: i64,

    /// Right ascension, degrees
    pub ra: f64,

    /// Declination, degrees
    pub dec: f64,

    pub redshift: f64,

    /// Mass of the host halo
    pub halo_mass: f64,

    /// Central galaxies define their halo's position
    pub is_central: bool,
}

/// A true dark-matter halo, positioned on its central galaxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Halo {
    pub id: i64,
    pub ra: f64,
    pub dec: f64,
    pub redshift: f64,
    pub mass: f64,
    pub is_central: bool,
}

impl Halo {
    pub fn new(id: i64, ra: f64, dec: f64, redshift: f64, mass: f64) -> Self {
        Self {
            id,
            ra,
            dec,
            redshift,
            mass,
            is_central: true,
        }
    }
}

/// Truth galaxies, the superset table halos are derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalaxyCatalog {
    pub galaxies: Vec<Galaxy>,
}

impl GalaxyCatalog {
    #[must_use]
    pub fn new(galaxies: Vec<Galaxy>) -> Self {
        Self { galaxies }
    }

    /// Read galaxies from a columnar table
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if a column is missing, has the
    /// wrong kind, or holds an out-of-range value.
    pub fn from_table(table: &Table, names: &ColumnNames) -> Result<Self, AssociationError> {
        let ids = table.ints(&names.galaxy_id)?;
        let halo_ids = table.ints(&names.halo_id)?;
        let ra = table.floats(&names.galaxy_ra)?;
        let dec = table.floats(&names.galaxy_dec)?;
        let redshift = table.floats(&names.galaxy_redshift)?;
        let mass = table.floats(&names.halo_mass)?;
        let central = table.bools(&names.is_central)?;

        let mut galaxies = Vec::with_capacity(table.num_rows());
        for row in 0..table.num_rows() {
            check_sky_position(&names.galaxy_ra, &names.galaxy_dec, row, ra[row], dec[row])?;
            check_non_negative(&names.galaxy_redshift, row, redshift[row])?;
            check_positive(&names.halo_mass, row, mass[row])?;
            galaxies.push(Galaxy {
                id: ids[row],
                halo_id: halo_ids[row],
                ra: ra[row],
                dec: dec[row],
                redshift: redshift[row],
                halo_mass: mass[row],
                is_central: central[row],
            });
        }
        Ok(Self { galaxies })
    }

    /// Halos, taken as the central galaxies in table order
    #[must_use]
    pub fn centrals(&self) -> HaloCatalog {
        HaloCatalog::new(
            self.galaxies
                .iter()
                .filter(|g| g.is_central)
                .map(|g| Halo {
                    id: g.halo_id,
                    ra: g.ra,
                    dec: g.dec,
                    redshift: g.redshift,
                    mass: g.halo_mass,
                    is_central: true,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.galaxies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.galaxies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Galaxy> {
        self.galaxies.iter()
    }
}

/// The truth halo population; indices into `halos` are the halo indices used
/// by the match structures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HaloCatalog {
    pub halos: Vec<Halo>,
}

impl HaloCatalog {
    #[must_use]
    pub fn new(halos: Vec<Halo>) -> Self {
        Self { halos }
    }

    /// Read a table with one row per halo.
    ///
    /// Uses the truth column names: `halo_id`, `ra`, `dec`, `redshift`,
    /// `halo_mass`. The central flag is not required.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if a column is missing, has the
    /// wrong kind, or holds an out-of-range value.
    pub fn from_table(table: &Table, names: &ColumnNames) -> Result<Self, AssociationError> {
        let ids = table.ints(&names.halo_id)?;
        let ra = table.floats(&names.galaxy_ra)?;
        let dec = table.floats(&names.galaxy_dec)?;
        let redshift = table.floats(&names.galaxy_redshift)?;
        let mass = table.floats(&names.halo_mass)?;

        let mut halos = Vec::with_capacity(table.num_rows());
        for row in 0..table.num_rows() {
            check_sky_position(&names.galaxy_ra, &names.galaxy_dec, row, ra[row], dec[row])?;
            check_non_negative(&names.galaxy_redshift, row, redshift[row])?;
            check_positive(&names.halo_mass, row, mass[row])?;
            halos.push(Halo::new(ids[row], ra[row], dec[row], redshift[row], mass[row]));
        }
        Ok(Self { halos })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.halos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.halos.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Halo> {
        self.halos.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Halo> {
        self.halos.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Column;

    fn truth_table() -> Table {
        Table::new()
            .with_column("galaxy_id", Column::Int(vec![10, 11, 12, 20]))
            .unwrap()
            .with_column("halo_id", Column::Int(vec![1, 1, 1, 2]))
            .unwrap()
            .with_column("ra", Column::Float(vec![10.0, 10.01, 9.99, 50.0]))
            .unwrap()
            .with_column("dec", Column::Float(vec![-5.0, -5.01, -4.99, 20.0]))
            .unwrap()
            .with_column("redshift", Column::Float(vec![0.3, 0.31, 0.29, 0.8]))
            .unwrap()
            .with_column("halo_mass", Column::Float(vec![2e14, 2e14, 2e14, 5e14]))
            .unwrap()
            .with_column("is_central", Column::Bool(vec![true, false, false, true]))
            .unwrap()
    }

    #[test]
    fn test_galaxies_from_table() {
        let galaxies = GalaxyCatalog::from_table(&truth_table(), &ColumnNames::default()).unwrap();
        assert_eq!(galaxies.len(), 4);
        assert_eq!(galaxies.galaxies[1].halo_id, 1);
        assert!(!galaxies.galaxies[1].is_central);
    }

    #[test]
    fn test_centrals_define_halos() {
        let galaxies = GalaxyCatalog::from_table(&truth_table(), &ColumnNames::default()).unwrap();
        let halos = galaxies.centrals();
        assert_eq!(halos.len(), 2);
        assert_eq!(halos.halos[0].id, 1);
        assert!((halos.halos[0].ra - 10.0).abs() < 1e-12);
        assert_eq!(halos.halos[1].id, 2);
        assert!((halos.halos[1].mass - 5e14).abs() < 1.0);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let names = ColumnNames {
            is_central: "central".to_string(),
            ..ColumnNames::default()
        };
        let result = GalaxyCatalog::from_table(&truth_table(), &names);
        assert!(matches!(result, Err(AssociationError::Schema(_))));
    }

    #[test]
    fn test_negative_redshift_rejected() {
        let table = Table::new()
            .with_column("halo_id", Column::Int(vec![1]))
            .unwrap()
            .with_column("ra", Column::Float(vec![1.0]))
            .unwrap()
            .with_column("dec", Column::Float(vec![1.0]))
            .unwrap()
            .with_column("redshift", Column::Float(vec![-0.1]))
            .unwrap()
            .with_column("halo_mass", Column::Float(vec![1e14]))
            .unwrap();
        let result = HaloCatalog::from_table(&table, &ColumnNames::default());
        assert!(matches!(result, Err(AssociationError::Schema(_))));
    }
}
