use lalrpop_util::{lexer::Token, ParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("macro syntax error: {0}")]
    MacroSyntax(String),

    #[error("netlist syntax error: {0}")]
    NetlistSyntax(String),

    #[error("width mismatch: {0}")]
    WidthMismatch(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An error raised while compiling one line, tagged with its 1-based line in the source file.
#[derive(Debug, Error)]
#[error("[line {line}] {kind}")]
pub struct CompileError {
    pub line: usize,
    pub kind: ErrorKind,
}

impl CompileError {
    pub fn new(line: usize, kind: ErrorKind) -> Self {
        Self { line, kind }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

// Describe a lalrpop failure in terms of the text the user wrote
pub(crate) fn describe_parse_error(text: &str, err: ParseError<usize, Token<'_>, &'static str>) -> String {
    match err {
        ParseError::InvalidToken { location } => {
            format!("invalid token at column {} in `{}`", location + 1, text.trim())
        }
        ParseError::UnrecognizedEof { .. } => {
            format!("unexpected end of line in `{}`", text.trim())
        }
        ParseError::UnrecognizedToken { token, .. } => {
            format!("unexpected `{}` in `{}`", token.1, text.trim())
        }
        ParseError::ExtraToken { token } => {
            format!("extra `{}` in `{}`", token.1, text.trim())
        }
        ParseError::User { error } => {
            format!("{} in `{}`", error, text.trim())
        }
    }
}
