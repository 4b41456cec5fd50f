use serde::{Deserialize, Serialize};

/// Unified error type for codescope.
#[derive(Debug, thiserror::Error)]
pub enum CodescopeError {
    #[error("Project is not initialized at {0} (run init first)")]
    NotInitialized(String),

    #[error("Project is already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("Parse failure in {path}: {message}")]
    ParseFailure { path: String, message: String },

    #[error("Unsupported language for {0}")]
    LanguageUnsupported(String),

    #[error("File {path} exceeds the size limit ({size} > {limit} bytes)")]
    OversizedFile { path: String, size: u64, limit: u64 },

    #[error("Store integrity error: {0}")]
    StoreIntegrity(String),

    #[error("Another writer holds the store lock (pid {holder_pid})")]
    LockContention { holder_pid: u32 },

    #[error("Path escapes the project root: {0}")]
    PathEscape(String),

    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Vector error: {0}")]
    Vector(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid node kind: {0}")]
    InvalidNodeKind(String),

    #[error("Invalid edge kind: {0}")]
    InvalidEdgeKind(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The kind of a contained, per-file warning recorded in an index summary.
///
/// These are the error kinds that never abort a batch: the offending file is
/// skipped (or partially indexed) and the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    ParseFailure,
    LanguageUnsupported,
    OversizedFile,
    ReadFailure,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure => write!(f, "parse_failure"),
            Self::LanguageUnsupported => write!(f, "language_unsupported"),
            Self::OversizedFile => write!(f, "oversized_file"),
            Self::ReadFailure => write!(f, "read_failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_path_and_kind() {
        let err = CodescopeError::OversizedFile {
            path: "big/blob.ts".to_string(),
            size: 2048,
            limit: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("big/blob.ts"));
        assert!(msg.contains("2048"));
    }

    #[test]
    fn io_errors_convert() {
        fn read() -> Result<String, CodescopeError> {
            Ok(std::fs::read_to_string("/nonexistent/codescope")?)
        }
        assert!(matches!(read(), Err(CodescopeError::Io(_))));
    }

    #[test]
    fn warning_kind_display() {
        assert_eq!(WarningKind::ParseFailure.to_string(), "parse_failure");
        assert_eq!(WarningKind::OversizedFile.to_string(), "oversized_file");
    }
}
