use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::core::table::{Column, Table};
use crate::utils::validation::{check_row_limit, is_valid_column_name};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("Too many rows (limit: {0})")]
    TooManyRows(usize),
}

/// Field delimiter implied by a file name.
///
/// `.csv` (optionally `.gz`) is comma-separated; everything else is
/// tab-separated.
#[must_use]
pub fn delimiter_for_path(path: &Path) -> char {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".csv") {
        ','
    } else {
        '\t'
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Parse a delimited table file, decompressing `.gz` files on the fly
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_table_file(path: &Path) -> Result<Table, ParseError> {
    let file = std::fs::File::open(path)?;
    let mut content = String::new();
    if is_gzipped(path) {
        GzDecoder::new(file).read_to_string(&mut content)?;
    } else {
        let mut file = file;
        file.read_to_string(&mut content)?;
    }
    parse_table_text(&content, delimiter_for_path(path))
}

/// Parse delimited text with a header line of column names.
///
/// Blank lines and lines starting with `#` are skipped. Each column's kind is
/// inferred from its values: integer if every value parses as one, then
/// float, then boolean (`True`/`False`, any case).
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a missing or malformed header,
/// ragged rows, or a column whose values fit no kind, or
/// `ParseError::TooManyRows` if the row limit is exceeded.
pub fn parse_table_text(text: &str, delimiter: char) -> Result<Table, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'));

    let Some((_, header)) = lines.next() else {
        return Err(ParseError::InvalidFormat("missing header line".to_string()));
    };
    let names = parse_header(header, delimiter)?;

    let mut cells: Vec<Vec<&str>> = vec![Vec::new(); names.len()];
    let mut num_rows = 0usize;
    for (line_num, line) in lines {
        if check_row_limit(num_rows).is_some() {
            return Err(ParseError::TooManyRows(num_rows));
        }
        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if fields.len() != names.len() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} fields, header has {}",
                fields.len(),
                names.len()
            )));
        }
        for (column, field) in cells.iter_mut().zip(fields) {
            column.push(field);
        }
        num_rows += 1;
    }

    let mut table = Table::new();
    for (name, values) in names.into_iter().zip(cells) {
        let column = infer_column(&name, &values)?;
        table
            .push_column(name, column)
            .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
    }
    Ok(table)
}

fn parse_header(line: &str, delimiter: char) -> Result<Vec<String>, ParseError> {
    let names: Vec<String> = line
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    for name in &names {
        if !is_valid_column_name(name) {
            return Err(ParseError::InvalidFormat(format!(
                "Invalid column name '{name}'"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(ParseError::InvalidFormat(format!(
                "Duplicate column name '{name}'"
            )));
        }
    }
    Ok(names)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn infer_column(name: &str, values: &[&str]) -> Result<Column, ParseError> {
    if let Ok(ints) = values.iter().map(|v| v.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
        return Ok(Column::Int(ints));
    }
    if let Ok(floats) = values
        .iter()
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
    {
        return Ok(Column::Float(floats));
    }
    if let Some(bools) = values.iter().map(|v| parse_bool(v)).collect::<Option<Vec<_>>>() {
        return Ok(Column::Bool(bools));
    }
    let bad = values
        .iter()
        .find(|v| v.parse::<f64>().is_err() && parse_bool(v).is_none())
        .copied()
        .unwrap_or_default();
    Err(ParseError::InvalidFormat(format!(
        "Column '{name}' has a value that is neither numeric nor boolean: '{bad}'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::ColumnKind;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_parse_tsv_text() {
        let tsv = "# exported halo catalog\n\
                   galaxy_id\thalo_id\tra\tdec\tredshift\thalo_mass\tis_central\n\
                   1\t10\t10.0\t-5.5\t0.3\t2e14\tTrue\n\
                   \n\
                   2\t10\t10.01\t-5.49\t0.301\t2e14\tFalse\n";
        let table = parse_table_text(tsv, '\t').unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("galaxy_id").unwrap().kind(), ColumnKind::Int);
        assert_eq!(table.column("ra").unwrap().kind(), ColumnKind::Float);
        assert_eq!(table.column("is_central").unwrap().kind(), ColumnKind::Bool);
        assert_eq!(table.floats("halo_mass").unwrap(), vec![2e14, 2e14]);
        assert_eq!(table.bools("is_central").unwrap(), vec![true, false]);
    }

    #[test]
    fn test_parse_csv_mixed_numeric_column() {
        let csv = "cluster_id,richness\n1,20\n2,35.5\n";
        let table = parse_table_text(csv, ',').unwrap();
        assert_eq!(table.column("richness").unwrap().kind(), ColumnKind::Float);
        assert_eq!(table.floats("richness").unwrap(), vec![20.0, 35.5]);
    }

    #[test]
    fn test_header_only_table() {
        let table = parse_table_text("cluster_id\tra_cen_0\n", '\t').unwrap();
        assert_eq!(table.num_rows(), 0);
        assert!(table.has_column("ra_cen_0"));
    }

    #[test]
    fn test_invalid_tables() {
        assert!(matches!(
            parse_table_text("# only a comment\n", '\t'),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_table_text("a\ta\n1\t2\n", '\t'),
            Err(ParseError::InvalidFormat(msg)) if msg.contains("Duplicate")
        ));
        assert!(matches!(
            parse_table_text("a\tb\n1\n", '\t'),
            Err(ParseError::InvalidFormat(msg)) if msg.contains("Line 2")
        ));
        assert!(matches!(
            parse_table_text("name\nabc\n", '\t'),
            Err(ParseError::InvalidFormat(msg)) if msg.contains("abc")
        ));
        assert!(matches!(
            parse_table_text("halo mass\n1\n", '\t'),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_delimiter_for_path() {
        assert_eq!(delimiter_for_path(Path::new("clusters.csv")), ',');
        assert_eq!(delimiter_for_path(Path::new("clusters.CSV.gz")), ',');
        assert_eq!(delimiter_for_path(Path::new("truth.tsv.gz")), '\t');
        assert_eq!(delimiter_for_path(Path::new("truth.txt")), '\t');
    }

    #[test]
    fn test_parse_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.csv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(b"cluster_id_member,id_member,p_member\n7,100,0.9\n7,101,0.4\n")
            .unwrap();
        encoder.finish().unwrap();

        let table = parse_table_file(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.floats("p_member").unwrap(), vec![0.9, 0.4]);
    }
}
