//! Schema-checked loading of the reference table and retailer feeds.
//!
//! Tables arrive as a JSON array of objects or as JSON Lines. Every row must
//! carry every required column (values may be null); a missing column fails
//! the whole run before any stage starts.

use crate::error::{ErrorContext, IngestErrorKind, OpportunityError, Result};
use crate::model::{ProductRecord, ReferenceRow, RetailerRow};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Columns every reference row must carry.
pub const REFERENCE_REQUIRED: &[&str] = &[
    "code",
    "product_name",
    "brands",
    "categories_tags",
    "energy_kcal_100g",
    "sugars_100g",
    "saturated_fat_100g",
    "sodium_100g",
    "nutriscore_grade",
];

/// Columns every retailer row must carry.
pub const RETAILER_REQUIRED: &[&str] = &["name", "categories"];

type Row = Map<String, Value>;

/// On-disk layout of an input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A single JSON array of objects
    JsonArray,
    /// One JSON object per line
    JsonLines,
}

impl InputFormat {
    /// `.jsonl`/`.ndjson` files are JSON Lines; otherwise sniff the first
    /// non-whitespace character.
    #[must_use]
    pub fn detect(path: &Path, content: &str) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        if matches!(ext.as_deref(), Some("jsonl" | "ndjson")) {
            return Self::JsonLines;
        }
        if content.trim_start().starts_with('[') {
            Self::JsonArray
        } else {
            Self::JsonLines
        }
    }
}

/// A retailer feed named on the command line as `ID:COUNTRY:FILE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerFeed {
    pub id: String,
    pub country: String,
    pub path: PathBuf,
}

impl FromStr for RetailerFeed {
    type Err = OpportunityError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(country), Some(path))
                if !id.trim().is_empty() && !country.trim().is_empty() && !path.is_empty() =>
            {
                Ok(Self {
                    id: id.trim().to_lowercase(),
                    country: country.trim().to_lowercase(),
                    path: PathBuf::from(path),
                })
            }
            _ => Err(OpportunityError::ingest(
                "parsing retailer argument",
                IngestErrorKind::InvalidRetailerFeed(s.to_string()),
            )),
        }
    }
}

/// Parse table content into JSON object rows.
pub fn parse_rows(content: &str, format: InputFormat) -> Result<Vec<Row>> {
    let values: Vec<Value> = match format {
        InputFormat::JsonArray => serde_json::from_str(content)?,
        InputFormat::JsonLines => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    OpportunityError::ingest(
                        "reading JSON Lines",
                        IngestErrorKind::InvalidJsonLine {
                            line: i + 1,
                            message: e.to_string(),
                        },
                    )
                })
            })
            .collect::<Result<_>>()?,
    };
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Value::Object(map) => Ok(map),
            _ => Err(OpportunityError::ingest(
                "reading table rows",
                IngestErrorKind::NotAnObject { row },
            )),
        })
        .collect()
}

/// Read a table file into JSON object rows.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path).map_err(|e| OpportunityError::io(path, e))?;
    parse_rows(&content, InputFormat::detect(path, &content))
        .with_context(|| format!("loading {}", path.display()))
}

/// Fail with [`OpportunityError::SchemaMismatch`] unless every row carries
/// every `required` column.
pub fn check_columns(table: &str, rows: &[Row], required: &[&str]) -> Result<()> {
    let mut missing: BTreeSet<&str> = BTreeSet::new();
    let mut affected = 0;
    for row in rows {
        let mut row_missing = false;
        for column in required {
            if !row.contains_key(*column) {
                missing.insert(*column);
                row_missing = true;
            }
        }
        if row_missing {
            affected += 1;
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    Err(OpportunityError::schema_mismatch(
        table,
        missing.into_iter().map(str::to_string).collect(),
        affected,
    ))
}

fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(row, map)| {
            serde_json::from_value(Value::Object(map)).map_err(|e| {
                OpportunityError::ingest(
                    format!("decoding {table} table"),
                    IngestErrorKind::InvalidRow {
                        row,
                        message: e.to_string(),
                    },
                )
            })
        })
        .collect()
}

/// Schema-check and decode reference rows. Row order is the ingestion order.
pub fn reference_records(rows: Vec<Row>) -> Result<Vec<ProductRecord>> {
    check_columns("reference", &rows, REFERENCE_REQUIRED)?;
    let decoded: Vec<ReferenceRow> = decode_rows("reference", rows)?;
    Ok(decoded
        .into_iter()
        .zip(0u64..)
        .map(|(row, seq)| row.into_record(seq))
        .collect())
}

/// Schema-check and decode the rows of one retailer feed.
pub fn retailer_records(feed: &RetailerFeed, rows: Vec<Row>) -> Result<Vec<ProductRecord>> {
    check_columns(&feed.id, &rows, RETAILER_REQUIRED)?;
    let decoded: Vec<RetailerRow> = decode_rows(&feed.id, rows)?;
    Ok(decoded
        .into_iter()
        .zip(0u64..)
        .map(|(row, seq)| row.into_record(&feed.id, &feed.country, seq))
        .collect())
}

/// Load the reference table from disk.
pub fn load_reference(path: &Path) -> Result<Vec<ProductRecord>> {
    let records = reference_records(read_rows(path)?)?;
    tracing::info!(rows = records.len(), path = %path.display(), "loaded reference table");
    Ok(records)
}

/// Load one retailer feed from disk.
pub fn load_retailer(feed: &RetailerFeed) -> Result<Vec<ProductRecord>> {
    let records = retailer_records(feed, read_rows(&feed.path)?)?;
    if records.is_empty() {
        tracing::warn!(retailer = %feed.id, "retailer feed is empty");
    } else {
        tracing::info!(retailer = %feed.id, rows = records.len(), "loaded retailer feed");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<Row> {
        parse_rows(json, InputFormat::JsonArray).unwrap()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            InputFormat::detect(Path::new("off.jsonl"), "[]"),
            InputFormat::JsonLines
        );
        assert_eq!(
            InputFormat::detect(Path::new("off.json"), "  [{}]"),
            InputFormat::JsonArray
        );
        assert_eq!(
            InputFormat::detect(Path::new("off.json"), "{}\n{}"),
            InputFormat::JsonLines
        );
    }

    #[test]
    fn test_json_lines_skip_blank_and_report_line() {
        let parsed = parse_rows("{\"name\":\"a\"}\n\n{\"name\":\"b\"}\n", InputFormat::JsonLines)
            .unwrap();
        assert_eq!(parsed.len(), 2);

        let err = parse_rows("{\"name\":\"a\"}\n{oops\n", InputFormat::JsonLines).unwrap_err();
        assert!(err.to_string().contains("JSON Lines"), "{err}");
        match err {
            OpportunityError::Ingest {
                source: IngestErrorKind::InvalidJsonLine { line, .. },
                ..
            } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_non_object_row_rejected() {
        assert!(parse_rows("[1, 2]", InputFormat::JsonArray).is_err());
    }

    #[test]
    fn test_schema_mismatch_counts_rows_and_columns() {
        let table = rows(r#"[{"name": "a", "categories": null}, {"name": "b"}, {"brand": "x"}]"#);
        match check_columns("mercadona", &table, RETAILER_REQUIRED).unwrap_err() {
            OpportunityError::SchemaMismatch {
                table,
                missing,
                rows,
            } => {
                assert_eq!(table, "mercadona");
                assert_eq!(missing, vec!["categories".to_string(), "name".to_string()]);
                assert_eq!(rows, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_null_values_pass_the_schema_check() {
        let feed: RetailerFeed = "ah:nl:ah.json".parse().unwrap();
        let table = rows(r#"[{"name": null, "categories": null, "price": 1.5}]"#);
        let records = retailer_records(&feed, table).unwrap();
        assert_eq!(records[0].price, Some(1.5));
        assert_eq!(records[0].source.retailer_id(), Some("ah"));
    }

    #[test]
    fn test_reference_records_decode() {
        let table = rows(
            r#"[{"code": 8410000, "product_name": "Yogur", "brands": "Danone",
                 "categories_tags": "en:dairies,en:yogurts", "energy_kcal_100g": 60,
                 "sugars_100g": 4.0, "saturated_fat_100g": 1.0, "sodium_100g": 0.04,
                 "nutriscore_grade": "not-applicable"}]"#,
        );
        let records = reference_records(table).unwrap();
        assert_eq!(records[0].code.as_deref(), Some("8410000"));
        assert_eq!(records[0].categories.len(), 2);
        assert!(records[0].grade.is_none());
    }

    #[test]
    fn test_retailer_feed_parse() {
        let feed: RetailerFeed = "Mercadona:ES:data/mercadona.json".parse().unwrap();
        assert_eq!(feed.id, "mercadona");
        assert_eq!(feed.country, "es");
        assert_eq!(feed.path, PathBuf::from("data/mercadona.json"));

        let windows: RetailerFeed = "lidl:de:C:\\feeds\\lidl.json".parse().unwrap();
        assert_eq!(windows.path, PathBuf::from("C:\\feeds\\lidl.json"));

        assert!("mercadona:es".parse::<RetailerFeed>().is_err());
        assert!(":es:file.json".parse::<RetailerFeed>().is_err());
    }
}
