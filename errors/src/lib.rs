use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common error for tokenizing, parsing and rendering templates
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum TemplateError {
    #[error("LexicalError: {0}")]
    LexicalError(LexicalError),
    #[error("ParseError: {0}")]
    ParseError(ParseError),
    #[error("ContextError: {0}")]
    ContextError(ContextError),
}

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum LexicalError {
    #[error("Directive is never closed, expected '{terminator}' before the end of the template")]
    UnterminatedDirective { terminator: char },
}

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum ParseError {
    #[error("Block '{opener}' is never closed, expected {expected}")]
    UnterminatedBlock { opener: String, expected: String },
    #[error("Directive '{0}' is malformed, expected it to end with ')'")]
    MalformedDirective(String),
}

/// Failures while building a context from data files or assignments
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum ContextError {
    #[error("Unable to read '{path}': {message}")]
    UnreadableFile { path: String, message: String },
    #[error("Unsupported data file '{0}', expected a .json or .toml file")]
    UnsupportedFormat(String),
    #[error("Data in '{path}' is invalid: {message}")]
    InvalidData { path: String, message: String },
    #[error("Data in '{0}' must be a mapping at the top level")]
    NotAMapping(String),
    #[error("Invalid assignment '{0}', should be formatted as KEY=VALUE")]
    InvalidAssignment(String),
}

macro_rules! impl_from_error {
    ($($error:tt),+) => {$(
        impl From<$error> for TemplateError {
            fn from(e: $error) -> Self {
                TemplateError::$error(e)
            }
        }
    )+};
}

impl_from_error!(LexicalError, ParseError, ContextError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_prefixes_messages_with_the_error_kind() {
        let err: TemplateError = ParseError::UnterminatedBlock {
            opener: "if(x)".to_string(),
            expected: "'endif'".to_string(),
        }
        .into();

        assert_eq!(
            "ParseError: Block 'if(x)' is never closed, expected 'endif'",
            err.to_string()
        );
    }

    #[test]
    fn it_converts_lexical_errors() {
        let err: TemplateError = LexicalError::UnterminatedDirective { terminator: '}' }.into();

        assert_eq!(
            TemplateError::LexicalError(LexicalError::UnterminatedDirective { terminator: '}' }),
            err
        );
        assert_eq!(
            "LexicalError: Directive is never closed, expected '}' before the end of the template",
            err.to_string()
        );
    }
}
