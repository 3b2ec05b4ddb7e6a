use lalrpop_util::lalrpop_mod;
lalrpop_mod!(assembly_grammar);

use crate::datatypes::{Imm16, Register};
use crate::error::{describe_parse_error, CompileError, CompileResult, ErrorKind};
use std::path::{Path, PathBuf};

/// An operand as written: a register or other name, `$label`, or a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Name(String),
    Label(String),
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Ram,
    Rom1,
    Rom2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Always,
    IfEqual,
    IfZero,
}

/// One line of assembly source, before pseudo-ops are expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Stop,
    Wait,
    Return,
    Call(String),
    Rsc(String),
    Label(String),
    Load {
        dest: String,
        bank: Bank,
        addr: Operand,
    },
    Store {
        addr: Operand,
        src: Operand,
    },
    Alu {
        op: AluOp,
        dest: String,
        lhs: Operand,
        rhs: Operand,
    },
    Move {
        dest: String,
        src: Operand,
    },
    Compare {
        lhs: Operand,
        rhs: Operand,
    },
    Jump {
        kind: JumpKind,
        target: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Mov,
    And,
    Or,
    Xor,
    Comp,
    Jump,
    JumpE,
    JumpZ,
    Load,
    Store,
    Rom1,
    Rom2,
}

impl Opcode {
    /// The 5 bit opcode field.
    pub fn bits(&self) -> u32 {
        match self {
            Opcode::Add => 0b00000,
            Opcode::Sub => 0b00001,
            Opcode::Mul => 0b00010,
            Opcode::Mov => 0b00011,
            Opcode::And => 0b00100,
            Opcode::Or => 0b00101,
            Opcode::Xor => 0b00110,
            Opcode::Comp => 0b10001,
            Opcode::Jump => 0b11000,
            Opcode::JumpE => 0b11001,
            Opcode::JumpZ => 0b11011,
            Opcode::Load => 0b01100,
            Opcode::Store => 0b11100,
            Opcode::Rom1 => 0b01110,
            Opcode::Rom2 => 0b01111,
        }
    }
}

impl From<AluOp> for Opcode {
    fn from(op: AluOp) -> Self {
        match op {
            AluOp::Add => Opcode::Add,
            AluOp::Sub => Opcode::Sub,
            AluOp::Mul => Opcode::Mul,
            AluOp::And => Opcode::And,
            AluOp::Or => Opcode::Or,
            AluOp::Xor => Opcode::Xor,
        }
    }
}

impl From<Bank> for Opcode {
    fn from(bank: Bank) -> Self {
        match bank {
            Bank::Ram => Opcode::Load,
            Bank::Rom1 => Opcode::Rom1,
            Bank::Rom2 => Opcode::Rom2,
        }
    }
}

impl From<JumpKind> for Opcode {
    fn from(kind: JumpKind) -> Self {
        match kind {
            JumpKind::Always => Opcode::Jump,
            JumpKind::IfEqual => Opcode::JumpE,
            JumpKind::IfZero => Opcode::JumpZ,
        }
    }
}

/// The last field of an instruction: a register, or a 16 bit value known now or after labels are bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Register(Register),
    Immediate(Imm16),
    Label(String),
    /// The address of this instruction plus the offset, as saved by `call`.
    ReturnAddress(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Label(String),
    RawWord(u32),
    Move {
        dest: Register,
        source: Source,
    },
    ThreeOperand {
        opcode: Opcode,
        a: Register,
        b: Register,
        c: Source,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithLine<T> {
    pub line: usize,
    pub t: T,
}

fn register(line: usize, name: &str) -> CompileResult<Register> {
    Register::parse(name).ok_or_else(|| CompileError::new(line, ErrorKind::UnknownRegister(name.to_string())))
}

fn immediate(line: usize, literal: &str) -> CompileResult<Imm16> {
    Imm16::parse(literal).ok_or_else(|| {
        CompileError::new(
            line,
            ErrorKind::ImmediateRange(format!("{literal} does not fit in 16 bits")),
        )
    })
}

fn register_operand(line: usize, operand: &Operand) -> CompileResult<Register> {
    match operand {
        Operand::Name(name) => register(line, name),
        Operand::Label(name) => register(line, &format!("${name}")),
        Operand::Literal(literal) => register(line, literal),
    }
}

fn source_operand(line: usize, operand: &Operand) -> CompileResult<Source> {
    Ok(match operand {
        Operand::Name(name) => Source::Register(register(line, name)?),
        Operand::Label(name) => Source::Label(name.clone()),
        Operand::Literal(literal) => Source::Immediate(immediate(line, literal)?),
    })
}

fn raw_word(line: usize, literal: &str) -> CompileResult<u32> {
    let is_binary = literal.bytes().all(|b| b == b'0' || b == b'1');
    if literal.len() == 32 && is_binary {
        return u32::from_str_radix(literal, 2).map_err(|_| {
            CompileError::new(line, ErrorKind::ImmediateRange(format!("{literal} does not fit in 32 bits")))
        });
    }
    // sixteen binary digits or a decimal number, zero extended
    Ok(immediate(line, literal)?.as_u32())
}

/// Expand one parsed line into the instructions it stands for.
pub fn lower_statement(line: usize, statement: Statement) -> CompileResult<Vec<Instruction>> {
    let three = |opcode, a, b, c| Instruction::ThreeOperand { opcode, a, b, c };
    Ok(match statement {
        // the simulator halts on a store of 0 to address 0
        Statement::Stop => vec![
            Instruction::Move {
                dest: Register::R0,
                source: Source::Immediate(Imm16::ZERO),
            },
            three(Opcode::Store, Register::R0, Register::R0, Source::Immediate(Imm16::ZERO)),
        ],
        Statement::Wait => vec![
            Instruction::Move {
                dest: Register::R0,
                source: Source::Immediate(Imm16::ONE),
            },
            three(Opcode::Store, Register::R0, Register::R0, Source::Immediate(Imm16::ONE)),
        ],
        Statement::Call(name) => vec![
            Instruction::Move {
                dest: Register::LINK,
                source: Source::ReturnAddress(2),
            },
            three(Opcode::Jump, Register::R0, Register::R0, Source::Label(name)),
        ],
        Statement::Return => vec![three(
            Opcode::Jump,
            Register::R0,
            Register::R0,
            Source::Register(Register::LINK),
        )],
        Statement::Rsc(literal) => vec![Instruction::RawWord(raw_word(line, &literal)?)],
        Statement::Label(name) => vec![Instruction::Label(name)],
        Statement::Load { dest, bank, addr } => vec![three(
            bank.into(),
            register(line, &dest)?,
            Register::R0,
            source_operand(line, &addr)?,
        )],
        Statement::Store { addr, src } => vec![three(
            Opcode::Store,
            Register::R0,
            register_operand(line, &src)?,
            source_operand(line, &addr)?,
        )],
        Statement::Alu { op, dest, lhs, rhs } => vec![three(
            op.into(),
            register(line, &dest)?,
            register_operand(line, &lhs)?,
            source_operand(line, &rhs)?,
        )],
        Statement::Move { dest, src } => vec![Instruction::Move {
            dest: register(line, &dest)?,
            source: source_operand(line, &src)?,
        }],
        Statement::Compare { lhs, rhs } => vec![three(
            Opcode::Comp,
            Register::R0,
            register_operand(line, &lhs)?,
            source_operand(line, &rhs)?,
        )],
        Statement::Jump { kind, target } => vec![three(
            kind.into(),
            Register::R0,
            Register::R0,
            source_operand(line, &target)?,
        )],
    })
}

/// Read a resource file and cut its `0`/`1` characters into 32 bit words.
pub fn read_include(path: &Path) -> Result<Vec<u32>, ErrorKind> {
    // any byte other than ASCII 0/1 is ignored, so the file need not be UTF-8
    let bytes = std::fs::read(path)?;
    let bits = bytes.into_iter().filter(|b| *b == b'0' || *b == b'1').collect::<Vec<_>>();
    if bits.len() % 32 != 0 {
        return Err(ErrorKind::MalformedInclude(format!(
            "{} holds {} bits, not a multiple of 32",
            path.display(),
            bits.len()
        )));
    }
    Ok(bits
        .chunks(32)
        .map(|word| word.iter().fold(0u32, |acc, b| (acc << 1) | (*b == b'1') as u32))
        .collect())
}

// `include <file>` names a path, which the line grammar has no token for
fn include_target(text: &str) -> Option<&str> {
    let text = text.split("//").next().unwrap_or_default().trim();
    let rest = text.strip_prefix("include")?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Turns source lines into instructions, resolving `include` against a base directory.
pub struct AssemblyParser {
    parser: assembly_grammar::LineParser,
    include_dir: PathBuf,
}

impl AssemblyParser {
    pub fn new(include_dir: impl AsRef<Path>) -> Self {
        Self {
            parser: assembly_grammar::LineParser::new(),
            include_dir: include_dir.as_ref().to_path_buf(),
        }
    }

    pub fn parse_statement(&self, line: usize, text: &str) -> CompileResult<Option<Statement>> {
        self.parser
            .parse(text)
            .map_err(|err| CompileError::new(line, ErrorKind::AssemblySyntax(describe_parse_error(text, err))))
    }

    pub fn parse_line(&self, line: usize, text: &str) -> CompileResult<Vec<WithLine<Instruction>>> {
        let instructions = if let Some(file) = include_target(text) {
            let path = self.include_dir.join(file);
            log::debug!("including {}", path.display());
            read_include(&path)
                .map_err(|kind| CompileError::new(line, kind))?
                .into_iter()
                .map(Instruction::RawWord)
                .collect()
        } else {
            match self.parse_statement(line, text)? {
                Some(statement) => lower_statement(line, statement)?,
                None => vec![],
            }
        };
        Ok(instructions.into_iter().map(|t| WithLine { line, t }).collect())
    }

    /// Parse every line of `lines`, numbering them from 1.
    pub fn parse_program<S: AsRef<str>>(&self, lines: &[S]) -> CompileResult<Vec<WithLine<Instruction>>> {
        let mut instructions = vec![];
        for (i, text) in lines.iter().enumerate() {
            instructions.extend(self.parse_line(i + 1, text.as_ref())?);
        }
        Ok(instructions)
    }
}
