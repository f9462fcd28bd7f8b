// src/analysis/expression.rs
//! Evaluation of the model's `A - B - C + D + E` answer.
//!
//! Only five unsigned integer operands joined by exactly `-`, `-`, `-`, `+`,
//! `+` are accepted. Anything else is rejected rather than guessed at.

use crate::utils::error::AnalysisError;
use once_cell::sync::Lazy;
use regex::Regex;

const OPERATORS: [Op; 4] = [Op::Sub, Op::Sub, Op::Add, Op::Add];

// First run of digits, whitespace and +/- that contains at least one digit.
static EXPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\d\s+\-]*\d[\d\s+\-]*").expect("Failed to compile EXPRESSION_RE")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
}

/// Pulls the expression out of `response` and computes it.
pub fn evaluate_ebitda(response: &str) -> Result<i64, AnalysisError> {
    let candidate = EXPRESSION_RE
        .find(response)
        .ok_or(AnalysisError::NoExpression)?
        .as_str();

    let compact: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    tracing::debug!("Evaluating expression '{}'", compact);

    let (first, rest) = parse(&compact)?;
    rest.into_iter().try_fold(first, |acc, (op, value)| {
        match op {
            Op::Add => acc.checked_add(value),
            Op::Sub => acc.checked_sub(value),
        }
        .ok_or(AnalysisError::Overflow)
    })
}

fn parse(compact: &str) -> Result<(i64, Vec<(Op, i64)>), AnalysisError> {
    let mut ops = Vec::with_capacity(OPERATORS.len());
    let mut operands = Vec::with_capacity(OPERATORS.len() + 1);
    let mut start = 0;

    for (i, c) in compact.char_indices() {
        let op = match c {
            '+' => Op::Add,
            '-' => Op::Sub,
            _ => continue,
        };
        operands.push(operand(&compact[start..i])?);
        ops.push(op);
        start = i + 1;
    }
    operands.push(operand(&compact[start..])?);

    if ops != OPERATORS {
        return Err(AnalysisError::Malformed(format!(
            "expected A-B-C+D+E, got '{}'",
            compact
        )));
    }

    let mut operands = operands.into_iter();
    let first = operands.next().ok_or_else(|| AnalysisError::Malformed(compact.to_string()))?;
    Ok((first, ops.into_iter().zip(operands).collect()))
}

fn operand(digits: &str) -> Result<i64, AnalysisError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AnalysisError::Malformed(format!("'{}' is not an unsigned integer", digits)));
    }
    digits.parse::<i64>().map_err(|_| AnalysisError::Overflow)
}
