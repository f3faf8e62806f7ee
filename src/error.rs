/// Error types for the simulation core and its configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Recoverable, frame-local failures.  The offending action is skipped for
/// the current frame; the step itself carries on.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SimError {
    /// Firing at the exact muzzle position leaves no direction to travel in.
    #[error("cannot aim from ({x}, {y}) at itself")]
    DegenerateDirection { x: f64, y: f64 },
}

/// Startup failures.  These are fatal: the binary reports them and exits.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}
