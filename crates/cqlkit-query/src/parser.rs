//! Infix to postfix conversion (shunting-yard)
//!
//! Precedence from tightest to loosest: `NOT` (unary, right-associative),
//! `AND`, `OR`. An open parenthesis on the operator stack is a barrier that
//! is never popped by an operator.

use crate::lexer::{Comparison, LogicalOp, Paren, Token};
use cqlkit_core::{Error, Result, SyntaxError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One step of a postfix program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Push the outcome of an atomic comparison
    Test(Comparison),
    /// Combine the top operand(s) of the stack
    Apply(LogicalOp),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Test(comparison) => write!(f, "{comparison}"),
            Instruction::Apply(LogicalOp::And) => f.write_str("AND"),
            Instruction::Apply(LogicalOp::Or) => f.write_str("OR"),
            Instruction::Apply(LogicalOp::Not) => f.write_str("NOT"),
        }
    }
}

/// Entries on the operator stack
#[derive(Debug, Clone, Copy)]
enum Pending {
    Open,
    Op(LogicalOp),
}

/// Convert an infix token sequence to postfix order
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Instruction>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Pending> = Vec::new();

    for token in tokens {
        match token {
            Token::Comparison(comparison) => output.push(Instruction::Test(comparison)),
            Token::Paren(Paren::Open) => stack.push(Pending::Open),
            Token::Paren(Paren::Close) => loop {
                match stack.pop() {
                    Some(Pending::Open) => break,
                    Some(Pending::Op(op)) => output.push(Instruction::Apply(op)),
                    None => return Err(SyntaxError::MismatchedParentheses.into()),
                }
            },
            Token::Logical(current) => {
                while let Some(&Pending::Op(top)) = stack.last() {
                    let pops = top.precedence() > current.precedence()
                        || (top.precedence() == current.precedence()
                            && current.is_left_associative());
                    if !pops {
                        break;
                    }
                    stack.pop();
                    output.push(Instruction::Apply(top));
                }
                stack.push(Pending::Op(current));
            }
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Op(op) => output.push(Instruction::Apply(op)),
            Pending::Open => return Err(SyntaxError::MismatchedParentheses.into()),
        }
    }

    debug!(instructions = output.len(), "Converted CQL query to postfix");
    Ok(output)
}

/// Check that a postfix program leaves exactly one value on the stack.
///
/// An empty program is malformed.
pub fn check_structure(program: &[Instruction]) -> Result<()> {
    let mut depth = 0usize;
    for instruction in program {
        match instruction {
            Instruction::Test(_) => depth += 1,
            Instruction::Apply(op) => {
                if depth < op.arity() {
                    return Err(underflow(*op));
                }
                depth -= op.arity() - 1;
            }
        }
    }

    match depth {
        1 => Ok(()),
        _ => Err(malformed()),
    }
}

pub(crate) fn underflow(op: LogicalOp) -> Error {
    let message = match op {
        LogicalOp::Not => "Invalid expression: NOT requires an operand.",
        LogicalOp::And => "Invalid expression: AND requires two operands.",
        LogicalOp::Or => "Invalid expression: OR requires two operands.",
    };
    Error::StructuralEvaluation(message.to_string())
}

pub(crate) fn malformed() -> Error {
    Error::StructuralEvaluation(
        "Invalid expression: operands are not joined by AND/OR.".to_string(),
    )
}
