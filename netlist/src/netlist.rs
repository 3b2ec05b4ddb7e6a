use lalrpop_util::lalrpop_mod;
lalrpop_mod!(netlist_grammar);

use crate::error::{describe_parse_error, CompileError, CompileResult, ErrorKind};
use crate::macros::SourceLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDecl {
    pub name: String,
    pub width: Option<u32>,
}

/// An operand as written: `name`, `name[bit]` or a literal of digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Name(String),
    Bit(String, u32),
    Literal(String),
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Name(name) => write!(f, "{name}"),
            Arg::Bit(name, bit) => write!(f, "{name}[{bit}]"),
            Arg::Literal(digits) => write!(f, "{digits}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Input(Vec<InputDecl>),
    Output(Vec<String>),
    Ghost(String),
    GhostEnd,
    /// `dest = OP args..`, `dest = OP:width args..` or `OP:width dest = args..`
    Gate {
        dest: String,
        op: String,
        width: Option<u32>,
        args: Vec<Arg>,
    },
    /// `dest = lhs & rhs`
    Infix {
        dest: String,
        op: InfixOp,
        lhs: Arg,
        rhs: Arg,
    },
}

/// Parses single lines of expanded netlist source.
pub struct LineParser {
    parser: netlist_grammar::LineParser,
}

impl LineParser {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            parser: netlist_grammar::LineParser::new(),
        }
    }

    /// `None` for blank and comment lines.
    pub fn parse(&self, line: &SourceLine) -> CompileResult<Option<Statement>> {
        self.parser.parse(&line.text).map_err(|err| {
            CompileError::new(
                line.line,
                ErrorKind::NetlistSyntax(describe_parse_error(&line.text, err)),
            )
        })
    }
}
