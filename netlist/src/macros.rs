//! Textual `FOR`/`IF` macro expansion, run over netlist source before compilation.
//!
//! ```text
//! FOR i IN 0 TO 3:
//!     OUT{i} = AND A[{i}] B[{i}]
//! END
//!
//! IF WIDTH > 8:
//!     X = BUF:16 Y
//! ELSE:
//!     X = BUF:8 Y
//! ENDIF
//! ```
//!
//! `FOR` bodies are expanded recursively, so they may nest further `FOR` and
//! `IF` blocks. `IF`/`ELSE` branches are only interpolated: a `FOR` or `IF`
//! inside a branch is passed through as text.

use log::debug;

use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::expr::{evaluate, Bindings};

/// Upper bound on `FOR` iterations per expansion, across all loops.
pub const MAX_FOR_ITERATIONS: usize = 100_000;

/// A line of expanded source together with the line of the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

fn macro_error(line: usize, message: impl Into<String>) -> CompileError {
    CompileError::new(line, ErrorKind::MacroSyntax(message.into()))
}

fn is_for_header(trimmed: &str) -> bool {
    trimmed.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("FOR "))
}

fn is_if_header(trimmed: &str) -> bool {
    trimmed.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("IF "))
}

fn is_keyword(trimmed: &str, keyword: &str) -> bool {
    trimmed.eq_ignore_ascii_case(keyword)
}

/// Replace every `{expr}` span with the value of `expr` under `bindings`.
pub fn interpolate(text: &str, bindings: &Bindings) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' && close > 0 => {
                let value = evaluate(&after[..close], bindings)?;
                out.push_str(&value.to_string());
                rest = &after[close + 1..];
            }
            _ => {
                // not a `{expr}` span, keep the brace as written
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

struct ForHeader {
    var: String,
    start: i64,
    end: i64,
}

// FOR <var> IN <expr> TO <expr>:
fn parse_for_header(text: &str, bindings: &Bindings) -> Result<ForHeader, String> {
    let invalid = || format!("invalid FOR header `{}`", text.trim());
    let body = text.trim().strip_suffix(':').ok_or_else(invalid)?;
    let tokens = body.split_whitespace().collect::<Vec<_>>();
    if tokens.len() < 5 || !tokens[2].eq_ignore_ascii_case("IN") {
        return Err(invalid());
    }
    let var = tokens[1];
    let valid_var = var.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_var {
        return Err(invalid());
    }
    let to = tokens[3..]
        .iter()
        .position(|t| t.eq_ignore_ascii_case("TO"))
        .map(|p| p + 3)
        .ok_or_else(invalid)?;
    if to == 3 || to == tokens.len() - 1 {
        return Err(invalid());
    }
    let start = evaluate(&tokens[3..to].join(" "), bindings)?;
    let end = evaluate(&tokens[to + 1..].join(" "), bindings)?;
    Ok(ForHeader {
        var: var.to_string(),
        start,
        end,
    })
}

struct MacroExpander {
    iterations: usize,
}

impl MacroExpander {
    fn interpolate_line(&self, line: &SourceLine, bindings: &Bindings) -> CompileResult<SourceLine> {
        if line.text.trim_start().starts_with('#') {
            return Ok(line.clone());
        }
        let text = interpolate(&line.text, bindings).map_err(|e| macro_error(line.line, e))?;
        Ok(SourceLine::new(line.line, text))
    }

    fn expand_block(&mut self, block: &[SourceLine], bindings: &Bindings) -> CompileResult<Vec<SourceLine>> {
        let mut expanded = vec![];
        let mut i = 0;
        while i < block.len() {
            let header = &block[i];
            let trimmed = header.text.trim();

            if is_for_header(trimmed) {
                let for_header = interpolate(trimmed, bindings)
                    .and_then(|text| parse_for_header(&text, bindings))
                    .map_err(|e| macro_error(header.line, e))?;

                // collect up to the matching END
                let mut body = vec![];
                let mut depth = 1;
                i += 1;
                while i < block.len() {
                    let inner = block[i].text.trim();
                    if is_for_header(inner) {
                        depth += 1;
                    } else if is_keyword(inner, "END") {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    body.push(block[i].clone());
                    i += 1;
                }
                if depth != 0 {
                    return Err(macro_error(header.line, "FOR without matching END"));
                }

                debug!(
                    "line {}: FOR {} IN {} TO {} over {} lines",
                    header.line,
                    for_header.var,
                    for_header.start,
                    for_header.end,
                    body.len()
                );
                for value in for_header.start..=for_header.end {
                    self.iterations += 1;
                    if self.iterations > MAX_FOR_ITERATIONS {
                        return Err(macro_error(
                            header.line,
                            format!("more than {MAX_FOR_ITERATIONS} FOR iterations"),
                        ));
                    }
                    let mut inner_bindings = bindings.clone();
                    inner_bindings.insert(for_header.var.clone(), value);
                    expanded.extend(self.expand_block(&body, &inner_bindings)?);
                }
                // skip the END
                i += 1;
            } else if is_if_header(trimmed) {
                let condition = trimmed[3..].trim().trim_end_matches(':');
                let holds = interpolate(condition, bindings)
                    .and_then(|text| evaluate(&text, bindings))
                    .map_err(|e| macro_error(header.line, e))?
                    != 0;

                let mut then_branch = vec![];
                let mut else_branch = vec![];
                let mut in_else = false;
                let mut closed = false;
                i += 1;
                while i < block.len() {
                    let inner = block[i].text.trim();
                    if is_keyword(inner, "ENDIF") {
                        closed = true;
                        break;
                    } else if !in_else && is_keyword(inner, "ELSE:") {
                        in_else = true;
                    } else if in_else {
                        else_branch.push(&block[i]);
                    } else {
                        then_branch.push(&block[i]);
                    }
                    i += 1;
                }
                if !closed {
                    return Err(macro_error(header.line, "IF without matching ENDIF"));
                }

                debug!("line {}: IF `{}` is {}", header.line, condition, holds);
                let kept = if holds { then_branch } else { else_branch };
                for line in kept {
                    expanded.push(self.interpolate_line(line, bindings)?);
                }
                // skip the ENDIF
                i += 1;
            } else if ["END", "ENDIF", "ELSE:"].iter().any(|k| is_keyword(trimmed, k)) {
                return Err(macro_error(header.line, format!("unexpected `{trimmed}` outside a block")));
            } else {
                expanded.push(self.interpolate_line(header, bindings)?);
                i += 1;
            }
        }
        Ok(expanded)
    }
}

/// Expand every macro in `lines`, numbering the input from 1.
pub fn expand_macros<S: AsRef<str>>(lines: &[S]) -> CompileResult<Vec<SourceLine>> {
    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, text)| SourceLine::new(i + 1, text.as_ref().trim_end_matches(['\n', '\r'])))
        .collect::<Vec<_>>();
    let mut expander = MacroExpander { iterations: 0 };
    expander.expand_block(&numbered, &Bindings::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn for_expands_inclusive_range() {
        let out = expand_macros(&["FOR i IN 0 TO 2:", "OUT{i} = AND A B", "END"]).unwrap();
        assert_eq!(
            texts(&out),
            vec!["OUT0 = AND A B", "OUT1 = AND A B", "OUT2 = AND A B"]
        );
        assert!(out.iter().all(|l| l.line == 2));
    }

    #[test]
    fn nested_for_sees_outer_binding() {
        let out = expand_macros(&[
            "FOR i IN 0 TO 1:",
            "FOR j IN 0 TO {i}:",
            "X{i}_{j} = BUF A[{i * 2 + j}]",
            "END",
            "END",
        ])
        .unwrap();
        assert_eq!(
            texts(&out),
            vec!["X0_0 = BUF A[0]", "X1_0 = BUF A[2]", "X1_1 = BUF A[3]"]
        );
    }

    #[test]
    fn if_inside_for_picks_branch_per_iteration() {
        let out = expand_macros(&[
            "FOR i IN 0 TO 2:",
            "IF i % 2 == 0:",
            "E{i} = NOT A",
            "ELSE:",
            "O{i} = BUF A",
            "ENDIF",
            "END",
        ])
        .unwrap();
        assert_eq!(texts(&out), vec!["E0 = NOT A", "O1 = BUF A", "E2 = NOT A"]);
    }

    #[test]
    fn if_accepts_a_comparison_chain() {
        let out = expand_macros(&[
            "FOR i IN 0 TO 4:",
            "IF 0 < i < 3:",
            "M{i} = BUF A",
            "ENDIF",
            "END",
        ])
        .unwrap();
        assert_eq!(texts(&out), vec!["M1 = BUF A", "M2 = BUF A"]);
    }

    #[test]
    fn if_branch_is_not_expanded_again() {
        let out = expand_macros(&["IF 1:", "FOR k IN 0 TO 1:", "END", "ENDIF"]);
        // the inner FOR/END are passed through verbatim; the stray END is then
        // left for the compiler to reject
        let out = out.unwrap();
        assert_eq!(texts(&out), vec!["FOR k IN 0 TO 1:", "END"]);
    }

    #[test]
    fn empty_range_emits_nothing() {
        let out = expand_macros(&["FOR i IN 3 TO 2:", "X = BUF A", "END"]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn plain_lines_and_comments_pass_through() {
        let out = expand_macros(&["# width {n} comment", "INPUT A:4", ""]).unwrap();
        assert_eq!(texts(&out), vec!["# width {n} comment", "INPUT A:4", ""]);
        assert_eq!(out[1].line, 2);
    }

    #[test]
    fn unterminated_blocks_fail() {
        let err = expand_macros(&["X = BUF A", "FOR i IN 0 TO 2:", "X = BUF A"]).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ErrorKind::MacroSyntax(_)));

        let err = expand_macros(&["IF 1:", "X = BUF A"]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MacroSyntax(_)));
    }

    #[test]
    fn malformed_headers_fail() {
        for header in ["FOR i 0 TO 2:", "FOR i IN 0 TO 2", "FOR 1 IN 0 TO 2:", "FOR i IN TO 2:"] {
            let err = expand_macros(&[header, "END"]).unwrap_err();
            assert!(matches!(err.kind, ErrorKind::MacroSyntax(_)), "{header}");
        }
    }

    #[test]
    fn stray_terminators_fail() {
        let err = expand_macros(&["X = BUF A", "ENDIF"]).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn unbound_variable_fails() {
        let err = expand_macros(&["X{k} = BUF A"]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MacroSyntax(_)));
    }

    #[test]
    fn lone_braces_are_kept() {
        assert_eq!(interpolate("a {} b {", &Bindings::new()).unwrap(), "a {} b {");
    }

    #[test]
    fn runaway_loops_are_capped() {
        let err = expand_macros(&["FOR i IN 0 TO 1000000:", "X = BUF A", "END"]).unwrap_err();
        assert!(err.to_string().contains("FOR iterations"));
    }
}
