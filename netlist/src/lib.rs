mod compile;
mod error;
mod expr;
mod ir;
mod macros;
mod netlist;

use std::path::Path;

pub use compile::compile_netlist;
pub use compile::generate_ir_string;
pub use compile::CompiledNetlist;
pub use compile::NetlistCompiler;
pub use compile::{ADDRESS_SIZE, RAM_WORD_SIZE, ROM_WORD_SIZE};
pub use error::{CompileError, CompileResult, ErrorKind};
pub use expr::{evaluate, Bindings};
pub use ir::{Gate, GateKind, GateType, LogicOp, Signal, SignalId};
pub use macros::{expand_macros, SourceLine, MAX_FOR_ITERATIONS};
pub use netlist::{Arg, InfixOp, InputDecl, LineParser, Statement};

/// Read and compile a netlist source file.
pub fn compile_netlist_file(path: impl AsRef<Path>) -> CompileResult<CompiledNetlist> {
    let source = std::fs::read_to_string(path).map_err(|e| CompileError::new(0, e.into()))?;
    compile_netlist(&source.lines().collect::<Vec<_>>())
}
