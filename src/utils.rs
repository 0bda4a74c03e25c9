use std::io;
use thiserror::Error;

/// Custom error types for the grammar engine
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Lexing error at position {position}: {message}")]
    Lex { position: usize, message: String },

    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Empty production: {0}")]
    EmptyProduction(String),

    #[error("Unknown symbols used in rules: {}", .0.join(", "))]
    UnknownSymbols(Vec<String>),

    #[error("No rule found for start symbol <{0}>")]
    MissingStartRule(String),

    #[error("Terminal and non-terminal symbols with same name: {}", .0.join(", "))]
    NameCollision(Vec<String>),

    #[error("No rule found for non-terminal <{0}>")]
    MissingRule(String),

    #[error("Decision source returned index {index} for {bound} alternatives")]
    IndexOutOfBounds { index: usize, bound: usize },

    #[error("Generation exceeded the limit of {limit}")]
    RecursionLimit { limit: usize },
}

/// The error classes a caller can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Lexing,
    Parsing,
    Construction,
    Generation,
    BoundedRecursion,
}

impl GrammarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrammarError::Io(_) => ErrorKind::Io,
            GrammarError::Lex { .. } => ErrorKind::Lexing,
            GrammarError::Parse { .. } => ErrorKind::Parsing,
            GrammarError::InvalidGrammar(_)
            | GrammarError::EmptyProduction(_)
            | GrammarError::UnknownSymbols(_)
            | GrammarError::MissingStartRule(_)
            | GrammarError::NameCollision(_) => ErrorKind::Construction,
            GrammarError::MissingRule(_) | GrammarError::IndexOutOfBounds { .. } => {
                ErrorKind::Generation
            }
            GrammarError::RecursionLimit { .. } => ErrorKind::BoundedRecursion,
        }
    }

    pub(crate) fn lex(position: usize, message: impl Into<String>) -> Self {
        GrammarError::Lex {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        GrammarError::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Trait extension for Option<T> to convert to GrammarError
pub trait OptionExt<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| GrammarError::InvalidGrammar(f()))
    }
}
