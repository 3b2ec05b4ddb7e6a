mod assembly;
mod compile;
mod datatypes;
mod error;
mod memory;

use std::path::Path;

pub use assembly::{lower_statement, read_include, AssemblyParser};
pub use assembly::{AluOp, Bank, Instruction, JumpKind, Opcode, Operand, Source, Statement, WithLine};
pub use compile::{collect_labels, compile_instructions, Encoder, LabelTable};
pub use datatypes::{Imm16, Register};
pub use error::{CompileError, CompileResult, ErrorKind};
pub use memory::Rom;

/// Assemble a program, resolving `include` paths against `include_dir`.
///
/// A `stop` is always assembled after the last source line, so the program halts
/// even when it runs off its end and a trailing `label` names the halt sequence.
pub fn assemble(source: &str, include_dir: impl AsRef<Path>) -> CompileResult<Rom> {
    let mut lines = source.lines().collect::<Vec<_>>();
    lines.push("stop");
    let instructions = AssemblyParser::new(include_dir).parse_program(&lines)?;
    log::debug!("{} source lines, {} instructions", lines.len(), instructions.len());
    compile_instructions(instructions)
}

/// Read and assemble a source file; `include` paths are relative to its directory.
pub fn assemble_file(path: impl AsRef<Path>) -> CompileResult<Rom> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| CompileError::new(0, e.into()))?;
    let include_dir = path.parent().unwrap_or_else(|| Path::new(""));
    assemble(&source, include_dir)
}
