//! Readers for flat catalog tables.
//!
//! Catalogs are exchanged as delimited text with one header line of column
//! names. Supported layouts:
//!
//! | Extension | Delimiter |
//! |-----------|-----------|
//! | `.tsv`, `.txt` (and anything else) | tab |
//! | `.csv` | comma |
//!
//! Any of these may be gzip-compressed with a trailing `.gz`.

pub mod tsv;
