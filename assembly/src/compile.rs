use crate::assembly::{Instruction, Opcode, Source, WithLine};
use crate::datatypes::{Imm16, Register};
use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::memory::Rom;
use std::collections::HashMap;

/// Label name to the address of the first instruction after it.
pub type LabelTable = HashMap<String, usize>;

/// Bind every label to the number of instructions before it, and drop the labels from the stream.
pub fn collect_labels(
    instructions: Vec<WithLine<Instruction>>,
) -> CompileResult<(LabelTable, Vec<WithLine<Instruction>>)> {
    let mut labels = LabelTable::new();
    let mut program = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        match instruction.t {
            Instruction::Label(name) => {
                if labels.contains_key(&name) {
                    return Err(CompileError::new(instruction.line, ErrorKind::DuplicateLabel(name)));
                }
                log::debug!("label {name} = {}", program.len());
                labels.insert(name, program.len());
            }
            t => program.push(WithLine {
                line: instruction.line,
                t,
            }),
        }
    }
    Ok((labels, program))
}

/// Encodes instructions once every label has an address.
pub struct Encoder<'a> {
    labels: &'a LabelTable,
}

impl<'a> Encoder<'a> {
    pub fn new(labels: &'a LabelTable) -> Self {
        Self { labels }
    }

    fn address(&self, value: usize) -> Result<Imm16, ErrorKind> {
        i64::try_from(value)
            .ok()
            .and_then(Imm16::from_i64)
            .ok_or_else(|| ErrorKind::ImmediateRange(format!("address {value} does not fit in 16 bits")))
    }

    fn resolve(&self, source: &Source, index: usize) -> Result<Imm16, ErrorKind> {
        match source {
            Source::Register(_) => Err(ErrorKind::ImmediateRange("a register is not a value".to_string())),
            Source::Immediate(imm) => Ok(*imm),
            Source::Label(name) => match self.labels.get(name) {
                Some(addr) => self.address(*addr),
                None => Err(ErrorKind::UndefinedLabel(name.clone())),
            },
            Source::ReturnAddress(offset) => self.address(index + *offset as usize),
        }
    }

    // imm16 . 00 . a . b . opcode . 1   or   0{14} . c . a . b . opcode . 0
    fn word(&self, opcode: Opcode, a: Register, b: Register, c: &Source, index: usize) -> Result<u32, ErrorKind> {
        let fields = (a.as_u32() << 10) | (b.as_u32() << 6) | (opcode.bits() << 1);
        Ok(match c {
            Source::Register(c) => (c.as_u32() << 14) | fields,
            _ => (self.resolve(c, index)?.as_u32() << 16) | fields | 1,
        })
    }

    /// Encode the instruction at ROM address `index`.
    pub fn encode(&self, instruction: &Instruction, index: usize) -> Result<u32, ErrorKind> {
        match instruction {
            Instruction::RawWord(word) => Ok(*word),
            // a move is the MOV opcode with the source in the last field
            Instruction::Move { dest, source } => self.word(Opcode::Mov, *dest, Register::R0, source, index),
            Instruction::ThreeOperand { opcode, a, b, c } => self.word(*opcode, *a, *b, c, index),
            Instruction::Label(name) => Err(ErrorKind::AssemblySyntax(format!(
                "label `{name}` reached the encoder"
            ))),
        }
    }
}

/// Resolve labels and encode the whole program.
pub fn compile_instructions(instructions: Vec<WithLine<Instruction>>) -> CompileResult<Rom> {
    let (labels, program) = collect_labels(instructions)?;
    let encoder = Encoder::new(&labels);
    let mut words = Vec::with_capacity(program.len());
    for (index, instruction) in program.iter().enumerate() {
        let word = encoder
            .encode(&instruction.t, index)
            .map_err(|kind| CompileError::new(instruction.line, kind))?;
        log::trace!("{index}: {word:032b} (line {})", instruction.line);
        words.push(word);
    }
    log::debug!("{} labels, {} words", labels.len(), words.len());
    Ok(Rom::new(words))
}
