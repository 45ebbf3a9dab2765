/// Crate-level error types for folio diagnostics.
use std::path::PathBuf;

/// All fatal errors in folio carry enough context to produce a useful
/// diagnostic without a debugger. Unresolved references are not errors and
/// never show up here.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The layout engine refused an operation. Aborts the run.
    #[error("layout backend failed during {operation}: {reason}")]
    Backend {
        /// Backend operation that failed, e.g. `go_to_page`.
        operation: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed. Covers malformed model files,
    /// including list kinds outside the supported set.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The documentation model file does not exist on disk.
    #[error("model not found: {}", path.display())]
    ModelNotFound {
        /// Path to the missing model file.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A list was closed or itemised while no list was open.
    #[error("unbalanced list: {event} in `{entity}` with no open list")]
    UnbalancedList {
        /// Anchor of the entity whose markup was being rendered.
        entity: String,
        /// Structural event that found the list stack empty.
        event: &'static str,
    },

    /// Paper size name not in the supported set.
    #[error("unknown paper size: `{name}`")]
    UnknownPaperSize {
        /// Name as given in config or on the command line.
        name: String,
    },
}
