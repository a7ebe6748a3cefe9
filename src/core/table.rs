use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::AssociationError;

/// Kind of values stored in a [`Column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Float,
    Int,
    Bool,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float => write!(f, "float"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// A single cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Numeric view of the value; booleans have none
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) => None,
        }
    }
}

/// A named column of equal-kind values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Float(_) => ColumnKind::Float,
            Self::Int(_) => ColumnKind::Int,
            Self::Bool(_) => ColumnKind::Bool,
        }
    }

    #[must_use]
    pub fn value(&self, row: usize) -> Option<Value> {
        match self {
            Self::Float(v) => v.get(row).copied().map(Value::Float),
            Self::Int(v) => v.get(row).copied().map(Value::Int),
            Self::Bool(v) => v.get(row).copied().map(Value::Bool),
        }
    }

    /// Copy out the given rows, in the given order
    fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Float(v) => Self::Float(rows.iter().map(|&r| v[r]).collect()),
            Self::Int(v) => Self::Int(rows.iter().map(|&r| v[r]).collect()),
            Self::Bool(v) => Self::Bool(rows.iter().map(|&r| v[r]).collect()),
        }
    }
}

/// A set of equal-length named columns.
///
/// Tables are immutable snapshots once built: row selection and column
/// projection return new tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: BTreeMap<String, Column>,
    num_rows: usize,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column insertion
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the column length differs from
    /// the existing columns or the name is already present.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, AssociationError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Add a column to the table
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the column length differs from
    /// the existing columns or the name is already present.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), AssociationError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(AssociationError::schema(format!(
                "duplicate column '{name}'"
            )));
        }
        if !self.columns.is_empty() && column.len() != self.num_rows {
            return Err(AssociationError::schema(format!(
                "column '{name}' has {} rows, expected {}",
                column.len(),
                self.num_rows
            )));
        }
        self.num_rows = column.len();
        self.columns.insert(name, column);
        Ok(())
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Look up a column by name
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the column is absent.
    pub fn column(&self, name: &str) -> Result<&Column, AssociationError> {
        self.columns
            .get(name)
            .ok_or_else(|| AssociationError::schema(format!("missing column '{name}'")))
    }

    /// Numeric column as floats (integer columns are widened)
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the column is absent or boolean.
    pub fn floats(&self, name: &str) -> Result<Vec<f64>, AssociationError> {
        match self.column(name)? {
            Column::Float(v) => Ok(v.clone()),
            #[allow(clippy::cast_precision_loss)]
            Column::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Column::Bool(_) => Err(AssociationError::schema(format!(
                "column '{name}' is bool, expected a numeric column"
            ))),
        }
    }

    /// Integer column
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the column is absent or not integral.
    pub fn ints(&self, name: &str) -> Result<Vec<i64>, AssociationError> {
        match self.column(name)? {
            Column::Int(v) => Ok(v.clone()),
            other => Err(AssociationError::schema(format!(
                "column '{name}' is {}, expected int",
                other.kind()
            ))),
        }
    }

    /// Boolean column (integer columns holding only 0 and 1 are accepted)
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the column is absent or cannot
    /// be read as booleans.
    pub fn bools(&self, name: &str) -> Result<Vec<bool>, AssociationError> {
        match self.column(name)? {
            Column::Bool(v) => Ok(v.clone()),
            Column::Int(v) => v
                .iter()
                .enumerate()
                .map(|(row, &x)| match x {
                    0 => Ok(false),
                    1 => Ok(true),
                    _ => Err(AssociationError::schema(format!(
                        "column '{name}' row {row}: {x} is not a boolean"
                    ))),
                })
                .collect(),
            Column::Float(_) => Err(AssociationError::schema(format!(
                "column '{name}' is float, expected bool"
            ))),
        }
    }

    /// Project onto a subset of columns
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` naming the first absent column.
    pub fn select(&self, names: &BTreeSet<String>) -> Result<Self, AssociationError> {
        let mut columns = BTreeMap::new();
        for name in names {
            columns.insert(name.clone(), self.column(name)?.clone());
        }
        Ok(Self {
            columns,
            num_rows: self.num_rows,
        })
    }

    /// Keep the rows whose mask entry is true
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if the mask length differs from the
    /// row count.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self, AssociationError> {
        if mask.len() != self.num_rows {
            return Err(AssociationError::schema(format!(
                "row mask has {} entries, table has {} rows",
                mask.len(),
                self.num_rows
            )));
        }
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Ok(Self {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.take(&rows)))
                .collect(),
            num_rows: rows.len(),
        })
    }
}
