use lalrpop_util::{lexer::Token, ParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("assembly syntax error: {0}")]
    AssemblySyntax(String),

    #[error("immediate out of range: {0}")]
    ImmediateRange(String),

    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    #[error("label `{0}` is already defined")]
    DuplicateLabel(String),

    #[error("malformed include: {0}")]
    MalformedInclude(String),

    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An assembler error tagged with the 1-based source line it was raised on.
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

pub(crate) fn describe_parse_error(text: &str, err: ParseError<usize, Token<'_>, &'static str>) -> String {
    let text = text.trim();
    match err {
        ParseError::InvalidToken { location } => {
            format!("invalid token at column {} in `{text}`", location + 1)
        }
        ParseError::UnrecognizedEof { expected, .. } => {
            format!("`{text}` ends early, expected one of {}", expected.join(" "))
        }
        ParseError::UnrecognizedToken { token, .. } => format!("unexpected `{}` in `{text}`", token.1),
        ParseError::ExtraToken { token } => format!("extra `{}` in `{text}`", token.1),
        ParseError::User { error } => format!("{error} in `{text}`"),
    }
}
