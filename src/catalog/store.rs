use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::catalog::filter::Filter;
use crate::core::error::AssociationError;
use crate::core::table::Table;
use crate::parsing::tsv::{parse_table_file, ParseError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] ParseError),

    #[error("Unknown quantity '{0}'")]
    UnknownQuantity(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    Association(#[from] AssociationError),
}

/// Source of flat catalog tables.
///
/// Implementations return a table holding exactly the requested quantities,
/// restricted to the rows accepted by `filter`. Filter columns need not be
/// among the requested quantities.
pub trait CatalogAdapter {
    /// Human-readable catalog name
    fn name(&self) -> &str;

    /// Every quantity this catalog can provide
    fn list_quantities(&self) -> Vec<String>;

    /// Fetch a table of quantities, optionally row-filtered
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownQuantity` for a quantity or filter column
    /// the catalog does not provide, or `CatalogError::InvalidFilter` for a
    /// filter that does not fit the column kinds.
    fn get_table(
        &self,
        quantities: &BTreeSet<String>,
        filter: Option<&Filter>,
    ) -> Result<Table, CatalogError>;
}

/// A catalog backed by one in-memory table
#[derive(Debug, Clone)]
pub struct TableCatalog {
    name: String,
    table: Table,
}

impl TableCatalog {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    /// Load a catalog from a TSV/CSV file (optionally gzip-compressed)
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let table = parse_table_file(path)?;
        debug!(
            path = %path.display(),
            rows = table.num_rows(),
            "loaded catalog table"
        );
        Ok(Self::new(path.display().to_string(), table))
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Number of rows in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.num_rows()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl CatalogAdapter for TableCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_quantities(&self) -> Vec<String> {
        self.table.column_names().map(str::to_string).collect()
    }

    fn get_table(
        &self,
        quantities: &BTreeSet<String>,
        filter: Option<&Filter>,
    ) -> Result<Table, CatalogError> {
        if let Some(missing) = quantities.iter().find(|q| !self.table.has_column(q)) {
            return Err(CatalogError::UnknownQuantity(missing.clone()));
        }

        let selected = self.table.select(quantities)?;
        match filter {
            Some(filter) => {
                let mask = filter.evaluate(&self.table)?;
                let filtered = selected.filter_rows(&mask)?;
                debug!(
                    catalog = %self.name,
                    filter = %filter,
                    kept = filtered.num_rows(),
                    total = self.table.num_rows(),
                    "filtered catalog query"
                );
                Ok(filtered)
            }
            None => Ok(selected),
        }
    }
}
