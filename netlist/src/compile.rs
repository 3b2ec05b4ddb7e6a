use log::{debug, trace};
use std::collections::{HashMap, HashSet};

use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::ir::{Gate, GateKind, GateType, LogicOp, Signal, SignalId};
use crate::macros::{expand_macros, SourceLine};
use crate::netlist::{Arg, InfixOp, LineParser, Statement};

pub const RAM_WORD_SIZE: u32 = 16;
pub const ROM_WORD_SIZE: u32 = 32;
pub const ADDRESS_SIZE: u32 = 16;

/// The result of one compilation: gates in emission order and the resolved I/O signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledNetlist {
    gates: Vec<Gate>,
    inputs: Vec<SignalId>,
    outputs: Vec<SignalId>,
    signals: Vec<Signal>,
}

impl CompiledNetlist {
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn inputs(&self) -> &[SignalId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[SignalId] {
        &self.outputs
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// The text artifact consumed by the simulator.
    pub fn to_ir_string(&self) -> String {
        let join = |ids: &[SignalId]| {
            ids.iter()
                .map(|id| id.index().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut out = String::new();
        out.push_str(&format!("# INPUTS: {}\n", join(&self.inputs)));
        out.push_str(&format!("# OUTPUTS: {}\n", join(&self.outputs)));
        out.push_str(&format!("# SIGNALS: {}\n", self.signal_count()));
        for gate in &self.gates {
            out.push_str(&format!("{gate}\n"));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::Map::new();
        json.insert(
            "inputs".to_string(),
            serde_json::Value::Array(self.inputs.iter().map(|id| id.index().into()).collect()),
        );
        json.insert(
            "outputs".to_string(),
            serde_json::Value::Array(self.outputs.iter().map(|id| id.index().into()).collect()),
        );
        json.insert("signals".to_string(), self.signal_count().into());
        json.insert(
            "gates".to_string(),
            serde_json::Value::Array(self.gates.iter().map(Gate::to_json).collect()),
        );
        serde_json::Value::Object(json)
    }
}

/// Per-compilation state. A fresh one is built for every call to [`compile_netlist`].
#[derive(Debug, Default)]
pub struct NetlistCompiler {
    signals: Vec<Signal>,
    signal_lookup: HashMap<String, SignalId>,
    // signals whose width is settled: declared, defined by a gate, or compiler-made
    settled: HashSet<SignalId>,
    gates: Vec<Gate>,
    const_cache: HashMap<String, SignalId>,
    index_cache: HashMap<(String, u32), SignalId>,
    enabled_if: Option<SignalId>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

fn syntax_error(line: usize, message: impl Into<String>) -> CompileError {
    CompileError::new(line, ErrorKind::NetlistSyntax(message.into()))
}

fn is_binary(digits: &str) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c == '0' || c == '1')
}

impl NetlistCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    fn signal(&self, id: SignalId) -> &Signal {
        &self.signals[id.index()]
    }

    fn size_of(&self, id: SignalId) -> u32 {
        self.signal(id).size
    }

    /// Look a signal up by name, creating it with `size` on first use.
    ///
    /// A signal created this way only has a provisional width until it is
    /// declared or defined, see [`Self::settle`].
    pub fn get_or_create_signal(&mut self, name: &str, size: u32) -> SignalId {
        if let Some(id) = self.signal_lookup.get(name) {
            return *id;
        }
        let id = SignalId::new(self.signals.len());
        self.signals.push(Signal {
            name: name.to_string(),
            id,
            size,
        });
        self.signal_lookup.insert(name.to_string(), id);
        id
    }

    /// Fix the width of `id`, unless it was already fixed.
    fn settle(&mut self, id: SignalId, size: u32) {
        if self.settled.insert(id) {
            self.signals[id.index()].size = size;
        }
    }

    fn emit(&mut self, output: Option<SignalId>, size: u32, kind: GateKind) {
        let gate = Gate {
            id: self.gates.len(),
            output,
            size,
            enabled_if: self.enabled_if,
            kind,
        };
        trace!("{gate}");
        self.gates.push(gate);
    }

    fn create_const(&mut self, line: usize, digits: &str) -> CompileResult<SignalId> {
        if let Some(id) = self.const_cache.get(digits) {
            return Ok(*id);
        }
        let value = u64::from_str_radix(digits, 2)
            .map_err(|_| syntax_error(line, format!("constant `{digits}` is wider than 64 bits")))?;
        let id = self.get_or_create_signal(&format!("__const_{digits}"), digits.len() as u32);
        self.settle(id, digits.len() as u32);
        let size = self.size_of(id);
        self.emit(Some(id), size, GateKind::Const { value });
        self.const_cache.insert(digits.to_string(), id);
        Ok(id)
    }

    /// Resolve an operand to a signal, emitting CONST/INDEX gates as needed.
    pub fn parse_arg(&mut self, line: usize, arg: &Arg, default_size: u32) -> CompileResult<SignalId> {
        match arg {
            Arg::Literal(digits) => {
                if !is_binary(digits) {
                    return Err(syntax_error(line, format!("`{digits}` is not a binary constant")));
                }
                self.create_const(line, digits)
            }
            Arg::Bit(base, bit) => {
                let key = (base.clone(), *bit);
                if let Some(id) = self.index_cache.get(&key) {
                    return Ok(*id);
                }
                let input = self.get_or_create_signal(base, 1);
                let id = self.get_or_create_signal(&format!("__idx_{base}_{bit}"), 1);
                self.settle(id, 1);
                self.emit(Some(id), 1, GateKind::Index { input, bit: *bit });
                self.index_cache.insert(key, id);
                Ok(id)
            }
            Arg::Name(name) => Ok(self.get_or_create_signal(name, default_size)),
        }
    }

    fn parse_args(&mut self, line: usize, args: &[Arg]) -> CompileResult<Vec<SignalId>> {
        args.iter().map(|arg| self.parse_arg(line, arg, 1)).collect()
    }

    fn expect_number(line: usize, arg: &Arg) -> CompileResult<u32> {
        match arg {
            Arg::Literal(digits) => digits
                .parse()
                .map_err(|_| syntax_error(line, format!("`{digits}` is too large"))),
            other => Err(syntax_error(line, format!("expected a bit position, found `{other}`"))),
        }
    }

    fn expect_address(&self, line: usize, op: GateType, addr: SignalId) -> CompileResult<()> {
        let size = self.size_of(addr);
        if size != ADDRESS_SIZE {
            return Err(CompileError::new(
                line,
                ErrorKind::WidthMismatch(format!(
                    "{} address `{}` must be {ADDRESS_SIZE} bits wide, found {size}",
                    op.mnemonic(),
                    self.signal(addr).name
                )),
            ));
        }
        Ok(())
    }

    fn concat_width(line: usize, high: u32, low: u32) -> CompileResult<u32> {
        high.checked_add(low).ok_or_else(|| {
            CompileError::new(
                line,
                ErrorKind::WidthMismatch(format!("CONCAT of {high} and {low} bits is too wide")),
            )
        })
    }

    fn define(&mut self, dest: &str, size: u32, kind: GateKind) {
        let output = self.get_or_create_signal(dest, size);
        self.settle(output, size);
        let size = self.size_of(output);
        self.emit(Some(output), size, kind);
    }

    fn compile_gate(
        &mut self,
        line: usize,
        dest: &str,
        op: &str,
        width: Option<u32>,
        args: &[Arg],
    ) -> CompileResult<()> {
        let gate_type = GateType::from_mnemonic(op)
            .ok_or_else(|| syntax_error(line, format!("unknown operator `{op}`")))?;

        if let Some(width) = width {
            if gate_type != GateType::Buf {
                return Err(syntax_error(line, format!("only BUF takes a width, found `{op}:{width}`")));
            }
            if width == 0 {
                return Err(syntax_error(line, "BUF width must be at least 1"));
            }
        }

        let arity_ok = match gate_type {
            GateType::Not | GateType::Buf | GateType::Load | GateType::Rom | GateType::Const => args.len() == 1,
            GateType::And
            | GateType::Or
            | GateType::Xor
            | GateType::Nand
            | GateType::Nor
            | GateType::Nxor
            | GateType::Store
            | GateType::Index => args.len() == 2,
            GateType::Mux | GateType::Sub => args.len() == 3,
            GateType::Concat => args.len() >= 2,
        };
        if !arity_ok {
            return Err(syntax_error(
                line,
                format!(
                    "wrong number of operands for {}: {}",
                    gate_type.mnemonic(),
                    args.len()
                ),
            ));
        }

        match gate_type {
            GateType::Const => {
                let digits = match &args[0] {
                    Arg::Literal(digits) if is_binary(digits) => digits,
                    other => {
                        return Err(syntax_error(line, format!("CONST needs binary digits, found `{other}`")))
                    }
                };
                let value = u64::from_str_radix(digits, 2)
                    .map_err(|_| syntax_error(line, format!("constant `{digits}` is wider than 64 bits")))?;
                self.define(dest, digits.len() as u32, GateKind::Const { value });
            }
            GateType::Buf => {
                let (input, output) = match width {
                    Some(width) => {
                        let input = self.parse_arg(line, &args[0], width)?;
                        let output = self.get_or_create_signal(dest, width);
                        if self.settled.contains(&output) && self.size_of(output) != width {
                            return Err(CompileError::new(
                                line,
                                ErrorKind::WidthMismatch(format!(
                                    "`{dest}` is {} bits wide, BUF declares {width}",
                                    self.size_of(output)
                                )),
                            ));
                        }
                        self.settle(output, width);
                        (input, output)
                    }
                    None => {
                        let input = self.parse_arg(line, &args[0], 1)?;
                        let output = self.get_or_create_signal(dest, self.size_of(input));
                        self.settle(output, self.size_of(input));
                        (input, output)
                    }
                };
                let size = self.size_of(output);
                self.emit(Some(output), size, GateKind::Buf { input });
            }
            GateType::Concat => {
                let operands = self.parse_args(line, args)?;
                let tmp_name = format!("__tmp_concat_{}", self.gates.len());
                let last = operands[operands.len() - 1];
                let mut acc = operands[0];
                for (i, next) in operands[1..operands.len() - 1].iter().enumerate() {
                    let low_width = self.size_of(*next);
                    let size = Self::concat_width(line, self.size_of(acc), low_width)?;
                    let tmp = self.get_or_create_signal(&format!("{tmp_name}_{}", i + 1), size);
                    self.settle(tmp, size);
                    let size = self.size_of(tmp);
                    self.emit(
                        Some(tmp),
                        size,
                        GateKind::Concat {
                            high: acc,
                            low: *next,
                            low_width,
                        },
                    );
                    acc = tmp;
                }
                let low_width = self.size_of(last);
                let size = Self::concat_width(line, self.size_of(acc), low_width)?;
                self.define(
                    dest,
                    size,
                    GateKind::Concat {
                        high: acc,
                        low: last,
                        low_width,
                    },
                );
            }
            GateType::Index => {
                let input = self.parse_arg(line, &args[0], 1)?;
                let bit = Self::expect_number(line, &args[1])?;
                self.define(dest, 1, GateKind::Index { input, bit });
            }
            GateType::Sub => {
                let input = self.parse_arg(line, &args[0], 1)?;
                let lo = Self::expect_number(line, &args[1])?;
                let hi = Self::expect_number(line, &args[2])?;
                if hi < lo {
                    return Err(syntax_error(line, format!("SUB range {lo}..{hi} is empty")));
                }
                let size = (hi - lo).checked_add(1).ok_or_else(|| {
                    CompileError::new(line, ErrorKind::WidthMismatch(format!("SUB range {lo}..{hi} is too wide")))
                })?;
                self.define(dest, size, GateKind::Sub { input, lo });
            }
            GateType::Load | GateType::Rom => {
                let addr = self.parse_arg(line, &args[0], 1)?;
                self.expect_address(line, gate_type, addr)?;
                if gate_type == GateType::Load {
                    self.define(dest, RAM_WORD_SIZE, GateKind::Load { addr });
                } else {
                    self.define(dest, ROM_WORD_SIZE, GateKind::Rom { addr });
                }
            }
            GateType::Store => {
                let addr = self.parse_arg(line, &args[0], 1)?;
                let value = self.parse_arg(line, &args[1], 1)?;
                self.expect_address(line, gate_type, addr)?;
                self.emit(None, RAM_WORD_SIZE, GateKind::Store { addr, value });
            }
            GateType::Not => {
                let a = self.parse_arg(line, &args[0], 1)?;
                self.define(dest, self.size_of(a), GateKind::Not { a });
            }
            GateType::Mux => {
                let operands = self.parse_args(line, args)?;
                let size = operands.iter().map(|id| self.size_of(*id)).max().unwrap_or(1);
                self.define(
                    dest,
                    size,
                    GateKind::Mux {
                        select: operands[0],
                        if_false: operands[1],
                        if_true: operands[2],
                    },
                );
            }
            GateType::And | GateType::Or | GateType::Xor | GateType::Nand | GateType::Nor | GateType::Nxor => {
                let op = match gate_type {
                    GateType::And => LogicOp::And,
                    GateType::Or => LogicOp::Or,
                    GateType::Xor => LogicOp::Xor,
                    GateType::Nand => LogicOp::Nand,
                    GateType::Nor => LogicOp::Nor,
                    _ => LogicOp::Nxor,
                };
                self.compile_logic(line, dest, op, &args[0], &args[1])?;
            }
        }
        Ok(())
    }

    fn compile_logic(&mut self, line: usize, dest: &str, op: LogicOp, lhs: &Arg, rhs: &Arg) -> CompileResult<()> {
        let a = self.parse_arg(line, lhs, 1)?;
        let b = self.parse_arg(line, rhs, 1)?;
        let size = self.size_of(a).max(self.size_of(b));
        self.define(dest, size, GateKind::Logic { op, a, b });
        Ok(())
    }

    /// Compile one line of macro-expanded source.
    pub fn compile_line(&mut self, parser: &LineParser, line: &SourceLine) -> CompileResult<()> {
        let Some(statement) = parser.parse(line)? else {
            return Ok(());
        };
        let n = line.line;
        match statement {
            Statement::Input(decls) => {
                for decl in decls {
                    let width = decl.width.unwrap_or(1);
                    let id = self.get_or_create_signal(&decl.name, width);
                    self.settle(id, width);
                    self.inputs.push(decl.name);
                }
            }
            Statement::Output(names) => {
                for name in names {
                    self.get_or_create_signal(&name, 1);
                    self.outputs.push(name);
                }
            }
            Statement::Ghost(name) => {
                self.enabled_if = Some(self.get_or_create_signal(&name, 1));
            }
            Statement::GhostEnd => {
                self.enabled_if = None;
            }
            Statement::Gate {
                dest,
                op,
                width,
                args,
            } => self.compile_gate(n, &dest, &op, width, &args)?,
            Statement::Infix { dest, op, lhs, rhs } => {
                let op = match op {
                    InfixOp::And => LogicOp::And,
                    InfixOp::Or => LogicOp::Or,
                    InfixOp::Xor => LogicOp::Xor,
                };
                self.compile_logic(n, &dest, op, &lhs, &rhs)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> CompiledNetlist {
        let resolve = |names: &[String]| {
            names
                .iter()
                .map(|name| self.signal_lookup[name.as_str()])
                .collect::<Vec<_>>()
        };
        let inputs = resolve(&self.inputs);
        let outputs = resolve(&self.outputs);
        CompiledNetlist {
            gates: self.gates,
            inputs,
            outputs,
            signals: self.signals,
        }
    }
}

/// Macro-expand and compile a whole netlist.
pub fn compile_netlist<S: AsRef<str>>(lines: &[S]) -> CompileResult<CompiledNetlist> {
    let expanded = expand_macros(lines)?;
    debug!("{} source lines expanded to {}", lines.len(), expanded.len());

    let parser = LineParser::new();
    let mut compiler = NetlistCompiler::new();
    for line in &expanded {
        compiler.compile_line(&parser, line)?;
    }
    let netlist = compiler.finish();
    debug!(
        "compiled {} gates over {} signals",
        netlist.gates.len(),
        netlist.signal_count()
    );
    Ok(netlist)
}

/// Compile the IR text for a netlist.
pub fn generate_ir_string<S: AsRef<str>>(lines: &[S]) -> CompileResult<String> {
    Ok(compile_netlist(lines)?.to_ir_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> CompiledNetlist {
        compile_netlist(&source.lines().collect::<Vec<_>>()).unwrap()
    }

    fn compile_err(source: &str) -> CompileError {
        compile_netlist(&source.lines().collect::<Vec<_>>()).unwrap_err()
    }

    fn id(netlist: &CompiledNetlist, name: &str) -> SignalId {
        netlist.signal(name).unwrap().id
    }

    #[test]
    fn infix_and_of_two_inputs() {
        let netlist = compile("INPUT A B\nOUTPUT C\nC = A & B");
        assert_eq!(netlist.gates().len(), 1);
        let gate = &netlist.gates()[0];
        assert_eq!(gate.gate_type(), GateType::And);
        assert_eq!(gate.size, 1);
        assert_eq!(gate.output, Some(id(&netlist, "C")));
        assert_eq!(
            gate.kind,
            GateKind::Logic {
                op: LogicOp::And,
                a: id(&netlist, "A"),
                b: id(&netlist, "B"),
            }
        );
        assert_eq!(netlist.inputs(), &[SignalId::new(0), SignalId::new(1)]);
        assert_eq!(netlist.outputs(), &[SignalId::new(2)]);
    }

    #[test]
    fn logic_width_is_widest_operand() {
        let netlist = compile("INPUT A:8 B\nC = xor A B");
        assert_eq!(netlist.gates()[0].size, 8);
        assert_eq!(netlist.signal("C").unwrap().size, 8);
    }

    #[test]
    fn constants_are_shared() {
        let netlist = compile("INPUT A:4\nX = AND A 0101\nY = OR A 0101\nZ = OR A 0110");
        let consts = netlist
            .gates()
            .iter()
            .filter(|g| g.gate_type() == GateType::Const)
            .collect::<Vec<_>>();
        assert_eq!(consts.len(), 2);
        assert_eq!(consts[0].const_value(), Some(5));
        assert_eq!(consts[0].size, 4);
        let shared = netlist.signal("__const_0101").unwrap().id;
        assert_eq!(netlist.gates()[1].inputs()[1], shared.index());
        assert_eq!(netlist.gates()[2].inputs()[1], shared.index());
    }

    #[test]
    fn bit_access_is_shared() {
        let netlist = compile("INPUT A:4\nX = AND A[2] A[2]\nY = NOT A[2]\nZ = NOT A[3]");
        let indexes = netlist
            .gates()
            .iter()
            .filter(|g| g.gate_type() == GateType::Index)
            .collect::<Vec<_>>();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].const_value(), Some(2));
        assert_eq!(indexes[0].inputs()[0], id(&netlist, "A").index());
        assert_eq!(indexes[0].size, 1);
    }

    #[test]
    fn concat_folds_left() {
        let netlist = compile("INPUT a b c\nd = CONCAT a b c");
        let gates = netlist.gates();
        assert_eq!(gates.len(), 2);
        assert!(gates.iter().all(|g| g.gate_type() == GateType::Concat));

        let tmp = gates[0].output.unwrap();
        assert_eq!(gates[0].size, 2);
        assert_eq!(gates[0].inputs()[..2], [id(&netlist, "a").index(), id(&netlist, "b").index()]);
        assert_eq!(gates[1].size, 3);
        assert_eq!(gates[1].inputs()[..2], [tmp.index(), id(&netlist, "c").index()]);
        assert_eq!(gates[1].output, Some(id(&netlist, "d")));
        assert_eq!(netlist.signal("d").unwrap().size, 3);
    }

    #[test]
    fn two_operand_concat_records_low_width() {
        let netlist = compile("INPUT a:3 b:5\nd = CONCAT a b");
        assert_eq!(netlist.gates()[0].size, 8);
        assert_eq!(netlist.gates()[0].const_value(), Some(5));
    }

    #[test]
    fn slices_and_indexes() {
        let netlist = compile("INPUT a:16\nlo = SUB a 4 7\nb = INDEX a 15");
        assert_eq!(netlist.gates()[0].size, 4);
        assert_eq!(netlist.gates()[0].const_value(), Some(4));
        assert_eq!(netlist.gates()[1].size, 1);
        assert_eq!(netlist.gates()[1].const_value(), Some(15));
    }

    #[test]
    fn memory_gates() {
        let netlist = compile("INPUT addr:16 v:16\nx = LOAD addr\ni = ROM addr\nSTORE_OUT = STORE addr v");
        let gates = netlist.gates();
        assert_eq!(gates[0].size, 16);
        assert_eq!(gates[1].size, 32);
        assert_eq!(gates[2].output, None);
        assert_eq!(gates[2].id, 2);
        assert!(netlist.signal("STORE_OUT").is_none());
    }

    #[test]
    fn narrow_address_is_rejected() {
        let err = compile_err("INPUT addr:8\nx = LOAD addr");
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ErrorKind::WidthMismatch(_)));
        let err = compile_err("INPUT addr:8 v\ns = STORE addr v");
        assert!(matches!(err.kind, ErrorKind::WidthMismatch(_)));
    }

    #[test]
    fn sized_buf_overrides_width() {
        let netlist = compile("INPUT a\nr = BUF:16 next\nx = BUF a");
        assert_eq!(netlist.signal("next").unwrap().size, 16);
        assert_eq!(netlist.signal("r").unwrap().size, 16);
        assert_eq!(netlist.gates()[0].size, 16);
        assert_eq!(netlist.gates()[1].size, 1);
    }

    #[test]
    fn output_declared_before_definition_takes_gate_width() {
        let netlist = compile("INPUT a:4 b:4\nOUTPUT s\ns = OR a b");
        assert_eq!(netlist.signal("s").unwrap().size, 4);
        assert_eq!(netlist.gates()[0].size, 4);
    }

    #[test]
    fn conflicting_buf_width_is_rejected() {
        let err = compile_err("INPUT a:8\nx = BUF:8 a\nx = BUF:4 a");
        assert_eq!(err.line, 3);
        assert!(matches!(err.kind, ErrorKind::WidthMismatch(_)));
    }

    #[test]
    fn widths_past_u32_are_rejected() {
        let err = compile_err("INPUT a:8\nx = SUB a 0 4294967295");
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ErrorKind::WidthMismatch(_)));

        let err = compile_err("INPUT a:4294967295 b:1\nx = CONCAT a b");
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ErrorKind::WidthMismatch(_)));

        let err = compile_err("INPUT a:4294967294 b c\nx = CONCAT a b c");
        assert!(matches!(err.kind, ErrorKind::WidthMismatch(_)));
    }

    #[test]
    fn forward_reference_keeps_provisional_width() {
        // NOT sees `x` before its BUF:4 definition, so it stays one bit wide
        let netlist = compile("INPUT a:4\ny = NOT x\nx = BUF:4 a");
        assert_eq!(netlist.gates()[0].gate_type(), GateType::Not);
        assert_eq!(netlist.gates()[0].size, 1);
        assert_eq!(netlist.signal("y").unwrap().size, 1);
        assert_eq!(netlist.signal("x").unwrap().size, 4);
        assert_eq!(netlist.gates()[1].size, 4);
    }

    #[test]
    fn const_gate_width_is_literal_length() {
        let netlist = compile("k = CONST 00000011");
        assert_eq!(netlist.gates()[0].size, 8);
        assert_eq!(netlist.gates()[0].const_value(), Some(3));
    }

    #[test]
    fn ghost_tags_following_gates() {
        let netlist = compile("INPUT en a b\nGHOST en\nx = AND a b\nGHOST_END\ny = OR a b");
        assert_eq!(netlist.gates()[0].enabled_if, Some(id(&netlist, "en")));
        assert_eq!(netlist.gates()[1].enabled_if, None);
    }

    #[test]
    fn syntax_errors() {
        for source in [
            "x = FROB a b",
            "x = AND a",
            "x = NOT a b",
            "x = MUX a b",
            "x = SUB a 7 4",
            "x = CONST abc",
            "x = AND a 0123",
            "x = NOT:4 a",
            "just words here",
        ] {
            let err = compile_err(source);
            assert!(matches!(err.kind, ErrorKind::NetlistSyntax(_)), "{source}");
        }
    }

    #[test]
    fn errors_report_source_line_through_macros() {
        let err = compile_err("INPUT a\nFOR i IN 0 TO 1:\nx{i} = FROB a\nEND");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn for_loop_builds_gates() {
        let netlist = compile("INPUT A:4 B:4\nFOR i IN 0 TO 3:\nOUT{i} = AND A[{i}] B[{i}]\nEND");
        let ands = netlist
            .gates()
            .iter()
            .filter(|g| g.gate_type() == GateType::And)
            .count();
        assert_eq!(ands, 4);
        assert!(netlist.signal("OUT3").is_some());
    }

    #[test]
    fn ir_text_layout() {
        let ir = generate_ir_string(&["INPUT a b", "OUTPUT c", "c = nand a b"]).unwrap();
        assert_eq!(
            ir,
            "# INPUTS: 0, 1\n\
             # OUTPUTS: 2\n\
             # SIGNALS: 3\n\
             GateIR(id=0, type='NAND', output=2, input1=0, input2=1, input3=0, size=1, enabled_if=-1, const_value=None)\n"
        );
    }
}
