//! Integer expressions used by `{...}` interpolation, `IF` conditions and `FOR` bounds.
//!
//! The language is deliberately tiny: integer literals, macro variables,
//! `+ - * / // % **`, comparisons and `and`/`or`/`not`. Booleans are the
//! integers 1 and 0.

use lalrpop_util::lalrpop_mod;
use std::collections::HashMap;

use crate::error::describe_parse_error;

lalrpop_mod!(macro_expr);

pub type Bindings = HashMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(i64),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// `a < b <= c`: every adjacent pair must hold, each operand evaluated once
    Chain(Box<Expr>, Vec<(BinOp, Box<Expr>)>),
}

impl Expr {
    pub fn parse(text: &str) -> Result<Box<Expr>, String> {
        macro_expr::ExprParser::new()
            .parse(text)
            .map_err(|err| describe_parse_error(text, err))
    }

    pub fn eval(&self, bindings: &Bindings) -> Result<i64, String> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| format!("unknown macro variable `{name}`")),
            Expr::Unary(op, operand) => {
                let v = operand.eval(bindings)?;
                match op {
                    UnaryOp::Neg => v.checked_neg().ok_or_else(overflow),
                    UnaryOp::Not => Ok((v == 0) as i64),
                }
            }
            Expr::Binary(BinOp::And, l, r) => {
                // short-circuit, so `i > 0 and 10 / i > 2` is safe
                if l.eval(bindings)? == 0 {
                    Ok(0)
                } else {
                    Ok((r.eval(bindings)? != 0) as i64)
                }
            }
            Expr::Binary(BinOp::Or, l, r) => {
                if l.eval(bindings)? != 0 {
                    Ok(1)
                } else {
                    Ok((r.eval(bindings)? != 0) as i64)
                }
            }
            Expr::Chain(first, rest) => {
                let mut lhs = first.eval(bindings)?;
                for (op, operand) in rest {
                    let rhs = operand.eval(bindings)?;
                    if apply(*op, lhs, rhs)? == 0 {
                        return Ok(0);
                    }
                    lhs = rhs;
                }
                Ok(1)
            }
            Expr::Binary(op, l, r) => {
                let a = l.eval(bindings)?;
                let b = r.eval(bindings)?;
                apply(*op, a, b)
            }
        }
    }
}

fn overflow() -> String {
    "integer overflow in macro expression".to_string()
}

fn apply(op: BinOp, a: i64, b: i64) -> Result<i64, String> {
    match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow),
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow),
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow),
        BinOp::Div => floor_div(a, b),
        BinOp::Rem => {
            if b == 0 {
                return Err("division by zero in macro expression".to_string());
            }
            // only i64::MIN % -1 overflows, and it divides exactly
            let r = a.checked_rem(b).unwrap_or(0);
            if r != 0 && (r < 0) != (b < 0) {
                r.checked_add(b).ok_or_else(overflow)
            } else {
                Ok(r)
            }
        }
        BinOp::Pow => {
            if b < 0 {
                return Err(format!("negative exponent in `{a} ** {b}`"));
            }
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).ok_or_else(overflow)
        }
        BinOp::Eq => Ok((a == b) as i64),
        BinOp::Ne => Ok((a != b) as i64),
        BinOp::Lt => Ok((a < b) as i64),
        BinOp::Le => Ok((a <= b) as i64),
        BinOp::Gt => Ok((a > b) as i64),
        BinOp::Ge => Ok((a >= b) as i64),
        BinOp::And | BinOp::Or => unreachable!("handled with short-circuit"),
    }
}

// Rounds toward negative infinity
fn floor_div(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 {
        return Err("division by zero in macro expression".to_string());
    }
    let q = a.checked_div(b).ok_or_else(overflow)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Parse and evaluate `text` in one step.
pub fn evaluate(text: &str, bindings: &Bindings) -> Result<i64, String> {
    Expr::parse(text)?.eval(bindings)
}
