//! Unified error types for pl-opportunity.
//!
//! Missing data is never an error in this crate: it is carried as explicit
//! sentinel states. The errors below are the conditions under which a run
//! cannot produce trustworthy output.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OpportunityError {
    /// Required input columns are absent; raised before any stage runs
    #[error(
        "Schema mismatch in {table} table: missing column(s) {} in {rows} row(s)",
        missing.join(", ")
    )]
    SchemaMismatch {
        table: String,
        missing: Vec<String>,
        rows: usize,
    },

    /// Errors while reading an input table
    #[error("Failed to ingest input: {context}")]
    Ingest {
        context: String,
        #[source]
        source: IngestErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific ingestion error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IngestErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid JSON on line {line}: {message}")]
    InvalidJsonLine { line: usize, message: String },

    #[error("Row {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("Row {row} has an invalid value: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Invalid retailer argument '{0}' (expected ID:COUNTRY:FILE)")]
    InvalidRetailerFeed(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for pl-opportunity operations
pub type Result<T> = std::result::Result<T, OpportunityError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl OpportunityError {
    /// Create a schema mismatch error
    pub fn schema_mismatch(table: impl Into<String>, missing: Vec<String>, rows: usize) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            missing,
            rows,
        }
    }

    /// Create an ingestion error with context
    pub fn ingest(context: impl Into<String>, source: IngestErrorKind) -> Self {
        Self::Ingest {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error was raised by the input schema check
    #[must_use]
    pub const fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for OpportunityError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for OpportunityError {
    fn from(err: serde_json::Error) -> Self {
        Self::ingest(
            "JSON deserialization",
            IngestErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// ```ignore
/// use pl_opportunity::error::ErrorContext;
///
/// let content = std::fs::read_to_string(path).context("reading reference table")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error, prepending it to any existing context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<OpportunityError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: OpportunityError, new_ctx: &str) -> OpportunityError {
    match err {
        OpportunityError::Ingest {
            context: existing,
            source,
        } => OpportunityError::Ingest {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OpportunityError::Io {
            path,
            message,
            source,
        } => OpportunityError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        OpportunityError::Config(msg) => OpportunityError::Config(chain_context(new_ctx, &msg)),
        OpportunityError::Validation(msg) => {
            OpportunityError::Validation(chain_context(new_ctx, &msg))
        }
        schema @ OpportunityError::SchemaMismatch { .. } => schema,
    }
}

/// `"new: existing"`, or just `new` when nothing existed.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = OpportunityError::schema_mismatch(
            "reference",
            vec!["sodium_100g".to_string(), "brands".to_string()],
            12,
        );
        let display = err.to_string();
        assert!(display.contains("reference"), "{display}");
        assert!(display.contains("sodium_100g, brands"), "{display}");
        assert!(display.contains("12 row(s)"), "{display}");
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_io_error_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = OpportunityError::io("/data/off.jsonl", io_err);
        assert!(err.to_string().contains("/data/off.jsonl"));
    }

    #[test]
    fn test_context_chaining() {
        let initial: Result<()> = Err(OpportunityError::ingest(
            "initial context",
            IngestErrorKind::NotAnObject { row: 3 },
        ));
        match initial.context("outer context") {
            Err(OpportunityError::Ingest { context, .. }) => {
                assert_eq!(context, "outer context: initial context");
            }
            other => panic!("expected Ingest error, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_mismatch_keeps_shape_under_context() {
        let initial: Result<()> = Err(OpportunityError::schema_mismatch("mercadona", vec![], 1));
        assert!(initial.context("loading").is_err_and(|e| e.is_schema_mismatch()));
    }
}
