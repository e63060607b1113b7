//! Tab-separated table files: one header line, one record per line.
//!
//! Columns are matched by header name, so reordered or missing columns still
//! load (missing ones read as empty).

use super::DatabaseError;
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A record type stored as one TSV line.
pub trait Row: Sized {
    const COLUMNS: &'static [&'static str];

    fn to_fields(&self) -> Vec<String>;

    fn from_fields(fields: &[String]) -> Result<Self, String>;
}

pub fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

pub fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub struct TsvFile<R> {
    path: PathBuf,
    _row: PhantomData<fn() -> R>,
}

impl<R> Clone for TsvFile<R> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _row: PhantomData,
        }
    }
}

impl<R: Row> TsvFile<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every row. A missing file is an empty table.
    pub fn load(&self) -> Result<Vec<R>, DatabaseError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut lines = content.lines();
        let Some(header) = lines.next() else {
            return Ok(Vec::new());
        };

        let positions: HashMap<&str, usize> = header
            .split('\t')
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            let fields: Vec<String> = R::COLUMNS
                .iter()
                .map(|col| {
                    positions
                        .get(col)
                        .and_then(|&pos| cells.get(pos))
                        .map(|cell| unescape(cell))
                        .unwrap_or_default()
                })
                .collect();

            let row = R::from_fields(&fields).map_err(|reason| DatabaseError::Malformed {
                file: self.path.display().to_string(),
                line: i + 2,
                reason,
            })?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Rewrite the whole file. Writes to a sibling temp file first and
    /// renames it over the original.
    pub fn store(&self, rows: &[R]) -> Result<(), DatabaseError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut body = R::COLUMNS.join("\t");
        body.push('\n');
        for row in rows {
            let line: Vec<String> = row.to_fields().iter().map(|f| escape(f)).collect();
            body.push_str(&line.join("\t"));
            body.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Parse an optional numeric cell: empty means `None`.
pub fn parse_opt<T: std::str::FromStr>(field: &str, column: &str) -> Result<Option<T>, String> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| format!("invalid {} '{}'", column, field))
}

pub fn parse_req<T: std::str::FromStr>(field: &str, column: &str) -> Result<T, String> {
    parse_opt(field, column)?.ok_or_else(|| format!("missing {}", column))
}

pub fn opt_string(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

pub fn fmt_opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair {
        id: u64,
        note: String,
    }

    impl Row for Pair {
        const COLUMNS: &'static [&'static str] = &["id", "note"];

        fn to_fields(&self) -> Vec<String> {
            vec![self.id.to_string(), self.note.clone()]
        }

        fn from_fields(fields: &[String]) -> Result<Self, String> {
            Ok(Self {
                id: parse_req(&fields[0], "id")?,
                note: fields[1].clone(),
            })
        }
    }

    #[test]
    fn test_escape_special_characters() {
        let raw = "tab\there\nnew\\line";
        assert_eq!(escape(raw), "tab\\there\\nnew\\\\line");
        assert_eq!(unescape(&escape(raw)), raw);
        assert!(!escape(raw).contains('\t'));
    }

    #[test]
    fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file: TsvFile<Pair> = TsvFile::new(dir.path().join("pairs.csv"));

        assert!(file.load().unwrap().is_empty());

        let rows = vec![
            Pair { id: 1, note: "plain".into() },
            Pair { id: 2, note: "with\ttab".into() },
        ];
        file.store(&rows).unwrap();
        assert_eq!(file.load().unwrap(), rows);
    }

    #[test]
    fn test_columns_matched_by_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        fs::write(&path, "note\tid\textra\nhello\t9\tignored\n").unwrap();

        let file: TsvFile<Pair> = TsvFile::new(&path);
        let rows = file.load().unwrap();
        assert_eq!(rows, vec![Pair { id: 9, note: "hello".into() }]);
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        fs::write(&path, "id\tnote\n1\tok\nabc\tbad\n").unwrap();

        let file: TsvFile<Pair> = TsvFile::new(&path);
        match file.load() {
            Err(DatabaseError::Malformed { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed error, got {:?}", other.map(|r| r.len())),
        }
    }
}
