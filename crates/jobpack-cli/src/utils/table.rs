use super::parser;
use crate::error::{CliError, Result};
use jobpack::core::models::format::ArgumentList;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

/// Reads a CSV job table: one job per record, one column per type code.
pub fn read_job_table(path: &Path, codes: &str, options: TableOptions) -> Result<Vec<ArgumentList>> {
    debug!("Reading job table from {:?} with type codes '{}'", path, codes);
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| parse_error(e.into()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| parse_error(e.into()))?;
        let line = record.position().map_or(0, |p| p.line());
        let fields: Vec<&str> = record.iter().collect();
        let row = parser::parse_row(codes, fields.iter().copied())
            .map_err(|e| parse_error(anyhow::anyhow!("line {}: {}", line, e)))?;
        rows.push(row);
    }
    debug!("Job table yielded {} rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const DEFAULT_OPTIONS: TableOptions = TableOptions {
        delimiter: b',',
        has_headers: true,
    };

    #[test]
    fn reads_one_job_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        fs::write(
            &path,
            "movie,frames,dose\nmovie_0001.tif,40,1.5\nmovie_0002.tif,38,1.25\n",
        )
        .unwrap();

        let rows = read_job_table(&path, "tif", DEFAULT_OPTIONS).unwrap();
        assert_eq!(rows.len(), 2);
        let second = rows[1].as_slice();
        assert_eq!(second[0].text().unwrap(), "movie_0002.tif");
        assert_eq!(second[1].integer().unwrap(), 38);
        assert_eq!(second[2].float().unwrap(), 1.25);
    }

    #[test]
    fn honors_delimiter_and_headerless_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.tsv");
        fs::write(&path, "a.mrc\t1\nb.mrc\t2\n").unwrap();

        let options = TableOptions {
            delimiter: b'\t',
            has_headers: false,
        };
        let rows = read_job_table(&path, "tu", options).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_slice()[1].unsigned_integer().unwrap(), 1);
    }

    #[test]
    fn bad_cell_reports_file_and_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        fs::write(&path, "movie,frames\nok.tif,1\nbad.tif,many\n").unwrap();

        let err = read_job_table(&path, "ti", DEFAULT_OPTIONS).unwrap_err();
        match err {
            CliError::FileParsing { path: p, source } => {
                assert_eq!(p, path);
                assert!(source.to_string().contains("line 3"));
            }
            other => panic!("expected a parsing error, got {:?}", other),
        }
    }

    #[test]
    fn short_record_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        fs::write(&path, "movie,frames\nonly.tif\n").unwrap();
        assert!(read_job_table(&path, "ti", DEFAULT_OPTIONS).is_err());
    }

    #[test]
    fn missing_table_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let result = read_job_table(&dir.path().join("absent.csv"), "t", DEFAULT_OPTIONS);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
