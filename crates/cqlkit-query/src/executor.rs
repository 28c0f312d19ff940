//! Postfix evaluation
//!
//! Walks a postfix program against one record with a stack of booleans.
//! Evaluation is pure: it reads the record and the label store, nothing else.

use crate::compare::evaluate_comparison;
use crate::lexer::LogicalOp;
use crate::parser::{Instruction, malformed, underflow};
use cqlkit_core::{LabelStore, Record, Result};
use tracing::trace;

/// Evaluate a postfix program against one record.
///
/// An empty program evaluates to `false`.
pub fn evaluate(program: &[Instruction], record: &Record, labels: &dyn LabelStore) -> Result<bool> {
    if program.is_empty() {
        return Ok(false);
    }

    let mut stack: Vec<bool> = Vec::with_capacity(program.len());
    for instruction in program {
        match instruction {
            Instruction::Test(comparison) => {
                let outcome = evaluate_comparison(comparison, record, labels);
                trace!(%comparison, outcome, "Evaluated comparison");
                stack.push(outcome);
            }
            Instruction::Apply(LogicalOp::Not) => {
                let operand = stack.pop().ok_or_else(|| underflow(LogicalOp::Not))?;
                stack.push(!operand);
            }
            Instruction::Apply(op @ (LogicalOp::And | LogicalOp::Or)) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return Err(underflow(*op));
                };
                stack.push(match op {
                    LogicalOp::And => left && right,
                    _ => left || right,
                });
            }
        }
    }

    match stack.as_slice() {
        [result] => Ok(*result),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Comparison, ComparisonOp, Literal};
    use cqlkit_core::{Error, NoLabels};
    use serde_json::json;

    fn test(field: &str, value: &str) -> Instruction {
        Instruction::Test(Comparison {
            field: field.to_string(),
            op: ComparisonOp::Equals,
            value: Literal::String(value.to_string()),
        })
    }

    fn run(program: &[Instruction]) -> Result<bool> {
        let record = json!({"type": "page", "status": "current"});
        evaluate(program, &record, &NoLabels)
    }

    #[test]
    fn test_empty_program_matches_nothing() {
        assert!(!run(&[]).unwrap());
    }

    #[test]
    fn test_single_comparison() {
        assert!(run(&[test("type", "page")]).unwrap());
        assert!(!run(&[test("type", "comment")]).unwrap());
    }

    #[test]
    fn test_connectives() {
        let and = Instruction::Apply(LogicalOp::And);
        let or = Instruction::Apply(LogicalOp::Or);
        let not = Instruction::Apply(LogicalOp::Not);

        assert!(run(&[test("type", "page"), test("status", "current"), and.clone()]).unwrap());
        assert!(!run(&[test("type", "page"), test("status", "draft"), and]).unwrap());
        assert!(run(&[test("type", "comment"), test("status", "current"), or.clone()]).unwrap());
        assert!(!run(&[test("type", "comment"), test("status", "draft"), or]).unwrap());
        assert!(!run(&[test("type", "page"), not.clone()]).unwrap());
        assert!(run(&[test("type", "comment"), not]).unwrap());
    }

    #[test]
    fn test_structural_errors() {
        let programs = [
            vec![Instruction::Apply(LogicalOp::Not)],
            vec![test("type", "page"), Instruction::Apply(LogicalOp::And)],
            vec![test("type", "page"), test("status", "current")],
        ];
        for program in programs {
            let err = run(&program).unwrap_err();
            assert!(matches!(err, Error::StructuralEvaluation(_)), "{program:?}");
        }
    }
}
