use std::path::PathBuf;
use thiserror::Error;

/// Gendoc error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parser error: {0}")]
    Parser(String),

    /// A node reached the documentation walker that it has no rule for.
    #[error("Unsupported syntax: {kind} at {location}")]
    UnsupportedSyntax { kind: String, location: String },

    /// A symbol that must be visited has no declaration to visit.
    #[error("Symbol has no declarations: {0}")]
    MissingDeclaration(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for gendoc operations
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

    /// Create an unsupported syntax error
    pub fn unsupported(kind: impl Into<String>, location: impl Into<String>) -> Self {
        Error::UnsupportedSyntax {
            kind: kind.into(),
            location: location.into(),
        }
    }

    /// Create a missing declaration error
    pub fn missing_declaration(symbol: impl Into<String>) -> Self {
        Error::MissingDeclaration(symbol.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
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
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/mod.ts"));
        assert_eq!(err.to_string(), "Path not found: /some/mod.ts");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("/foo/bar.ts", "unexpected token");
        assert!(err.to_string().contains("/foo/bar.ts"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("extensions must not be empty");
        assert_eq!(
            err.to_string(),
            "Config validation error: extensions must not be empty"
        );
    }

    #[test]
    fn test_unsupported_syntax_display() {
        let err = Error::unsupported("EnumDeclaration", "mod.ts:3");
        assert_eq!(err.to_string(), "Unsupported syntax: EnumDeclaration at mod.ts:3");
    }

    #[test]
    fn test_missing_declaration_display() {
        let err = Error::missing_declaration("Widget");
        assert_eq!(err.to_string(), "Symbol has no declarations: Widget");
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_parser_error() {
        let err = Error::parser("language version mismatch");
        assert_eq!(err.to_string(), "Parser error: language version mismatch");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
