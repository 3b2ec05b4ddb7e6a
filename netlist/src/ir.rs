use std::fmt;

/// Handle of a signal in the compiler's signal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub id: SignalId,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateType {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Nxor,
    Not,
    Const,
    Mux,
    Concat,
    Index,
    Sub,
    Buf,
    Load,
    Store,
    Rom,
}

impl GateType {
    pub const ALL: [GateType; 16] = [
        GateType::And,
        GateType::Or,
        GateType::Xor,
        GateType::Nand,
        GateType::Nor,
        GateType::Nxor,
        GateType::Not,
        GateType::Const,
        GateType::Mux,
        GateType::Concat,
        GateType::Index,
        GateType::Sub,
        GateType::Buf,
        GateType::Load,
        GateType::Store,
        GateType::Rom,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Xor => "XOR",
            GateType::Nand => "NAND",
            GateType::Nor => "NOR",
            GateType::Nxor => "NXOR",
            GateType::Not => "NOT",
            GateType::Const => "CONST",
            GateType::Mux => "MUX",
            GateType::Concat => "CONCAT",
            GateType::Index => "INDEX",
            GateType::Sub => "SUB",
            GateType::Buf => "BUF",
            GateType::Load => "LOAD",
            GateType::Store => "STORE",
            GateType::Rom => "ROM",
        }
    }

    /// Case-insensitive lookup of an operator name.
    pub fn from_mnemonic(op: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.mnemonic().eq_ignore_ascii_case(op))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Nxor,
}

/// What a gate computes, with exactly the operands its shape needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateKind {
    Logic {
        op: LogicOp,
        a: SignalId,
        b: SignalId,
    },
    Not {
        a: SignalId,
    },
    Const {
        value: u64,
    },
    Mux {
        select: SignalId,
        if_false: SignalId,
        if_true: SignalId,
    },
    /// `(high << low_width) | low`
    Concat {
        high: SignalId,
        low: SignalId,
        low_width: u32,
    },
    Index {
        input: SignalId,
        bit: u32,
    },
    /// Bits `lo..lo + size` of `input`
    Sub {
        input: SignalId,
        lo: u32,
    },
    Buf {
        input: SignalId,
    },
    Load {
        addr: SignalId,
    },
    Store {
        addr: SignalId,
        value: SignalId,
    },
    Rom {
        addr: SignalId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub id: usize,
    /// `None` only for STORE
    pub output: Option<SignalId>,
    pub size: u32,
    pub enabled_if: Option<SignalId>,
    pub kind: GateKind,
}

impl Gate {
    pub fn gate_type(&self) -> GateType {
        match &self.kind {
            GateKind::Logic { op, .. } => match op {
                LogicOp::And => GateType::And,
                LogicOp::Or => GateType::Or,
                LogicOp::Xor => GateType::Xor,
                LogicOp::Nand => GateType::Nand,
                LogicOp::Nor => GateType::Nor,
                LogicOp::Nxor => GateType::Nxor,
            },
            GateKind::Not { .. } => GateType::Not,
            GateKind::Const { .. } => GateType::Const,
            GateKind::Mux { .. } => GateType::Mux,
            GateKind::Concat { .. } => GateType::Concat,
            GateKind::Index { .. } => GateType::Index,
            GateKind::Sub { .. } => GateType::Sub,
            GateKind::Buf { .. } => GateType::Buf,
            GateKind::Load { .. } => GateType::Load,
            GateKind::Store { .. } => GateType::Store,
            GateKind::Rom { .. } => GateType::Rom,
        }
    }

    /// The `input1..input3` fields of the flat record, unused slots as 0.
    pub fn inputs(&self) -> [usize; 3] {
        let ids = match &self.kind {
            GateKind::Logic { a, b, .. } => [Some(a), Some(b), None],
            GateKind::Not { a } => [Some(a), None, None],
            GateKind::Const { .. } => [None, None, None],
            GateKind::Mux {
                select,
                if_false,
                if_true,
            } => [Some(select), Some(if_false), Some(if_true)],
            GateKind::Concat { high, low, .. } => [Some(high), Some(low), None],
            GateKind::Index { input, .. } => [Some(input), None, None],
            GateKind::Sub { input, .. } => [Some(input), None, None],
            GateKind::Buf { input } => [Some(input), None, None],
            GateKind::Load { addr } => [Some(addr), None, None],
            GateKind::Store { addr, value } => [Some(addr), Some(value), None],
            GateKind::Rom { addr } => [Some(addr), None, None],
        };
        ids.map(|id| id.map_or(0, SignalId::index))
    }

    pub fn const_value(&self) -> Option<u64> {
        match &self.kind {
            GateKind::Const { value } => Some(*value),
            GateKind::Concat { low_width, .. } => Some(*low_width as u64),
            GateKind::Index { bit, .. } => Some(*bit as u64),
            GateKind::Sub { lo, .. } => Some(*lo as u64),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let [input1, input2, input3] = self.inputs();
        serde_json::json!({
            "id": self.id,
            "type": self.gate_type().mnemonic(),
            "output": self.output.map(|s| s.index()),
            "input1": input1,
            "input2": input2,
            "input3": input3,
            "size": self.size,
            "enabled_if": self.enabled_if.map(|s| s.index()),
            "const_value": self.const_value(),
        })
    }
}

fn index_or_none(id: Option<SignalId>) -> i64 {
    id.map_or(-1, |s| s.index() as i64)
}

/// One line of the IR text read by the simulator.
impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [input1, input2, input3] = self.inputs();
        write!(
            f,
            "GateIR(id={}, type='{}', output={}, input1={}, input2={}, input3={}, size={}, enabled_if={}, const_value=",
            self.id,
            self.gate_type().mnemonic(),
            index_or_none(self.output),
            input1,
            input2,
            input3,
            self.size,
            index_or_none(self.enabled_if),
        )?;
        match self.const_value() {
            Some(value) => write!(f, "{value})"),
            None => write!(f, "None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_lookup_ignores_case() {
        assert_eq!(GateType::from_mnemonic("nxor"), Some(GateType::Nxor));
        assert_eq!(GateType::from_mnemonic("Concat"), Some(GateType::Concat));
        assert_eq!(GateType::from_mnemonic("ADDER"), None);
    }

    #[test]
    fn renders_simulator_record() {
        let gate = Gate {
            id: 4,
            output: Some(SignalId::new(7)),
            size: 3,
            enabled_if: None,
            kind: GateKind::Concat {
                high: SignalId::new(5),
                low: SignalId::new(2),
                low_width: 1,
            },
        };
        assert_eq!(
            gate.to_string(),
            "GateIR(id=4, type='CONCAT', output=7, input1=5, input2=2, input3=0, size=3, enabled_if=-1, const_value=1)"
        );
    }

    #[test]
    fn renders_store_without_output() {
        let gate = Gate {
            id: 0,
            output: None,
            size: 16,
            enabled_if: Some(SignalId::new(9)),
            kind: GateKind::Store {
                addr: SignalId::new(1),
                value: SignalId::new(2),
            },
        };
        assert_eq!(
            gate.to_string(),
            "GateIR(id=0, type='STORE', output=-1, input1=1, input2=2, input3=0, size=16, enabled_if=9, const_value=None)"
        );
        assert_eq!(gate.to_json()["output"], serde_json::Value::Null);
        assert_eq!(gate.to_json()["enabled_if"], 9);
    }
}
