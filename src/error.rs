use std::path::PathBuf;
use thiserror::Error;

/// Umlizer error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path \"{}\" doesn't exist.", .0.display())]
    PathNotFound(PathBuf),

    #[error("\"{}\" is not a .{extension} source file", .path.display())]
    UnsupportedSource {
        path: PathBuf,
        extension: &'static str,
    },

    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Interrupted")]
    Interrupted,

    #[error("Internal invariant violated: {0}")]
    Invariant(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for umlizer operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }

    /// Create an internal invariant error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }

    /// Create a render error
    pub fn render(msg: impl Into<String>) -> Self {
        Error::Render(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error must abort the whole run rather than skip a file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Interrupted | Error::Invariant(_) | Error::PathNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_unsupported_source_display() {
        let err = Error::UnsupportedSource {
            path: PathBuf::from("README.md"),
            extension: "py",
        };
        assert_eq!(err.to_string(), "\"README.md\" is not a .py source file");
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path \"/some/path\" doesn't exist.");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("/foo/bar.py", "unexpected token");
        assert!(err.to_string().contains("/foo/bar.py"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("target must not be empty");
        assert_eq!(err.to_string(), "Config validation error: target must not be empty");
    }

    #[test]
    fn test_invariant_error() {
        let err = Error::invariant("entity without a name");
        assert_eq!(err.to_string(), "Internal invariant violated: entity without a name");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::Interrupted.is_fatal());
        assert!(Error::invariant("x").is_fatal());
        assert!(Error::PathNotFound(PathBuf::from("x")).is_fatal());
        assert!(!Error::parse("a.py", "bad").is_fatal());
        assert!(!Error::parser("bad").is_fatal());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
