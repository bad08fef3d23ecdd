//! Condition tree evaluation.
//!
//! Evaluation is total: an unresolvable path or a type-mismatched ordering
//! comparison evaluates to `false`, so an absent field can never trigger an
//! action.

use crate::path::{resolve_operand, EvalContext};
use crate::types::{BoolOp, CompareOp, ConditionNode, Value};

/// Evaluate a condition tree against the context.
pub fn evaluate_condition(node: &ConditionNode, ctx: &EvalContext) -> bool {
    match node {
        ConditionNode::Comparison { op, left, right } => compare(
            *op,
            resolve_operand(left, ctx),
            resolve_operand(right, ctx),
        ),
        ConditionNode::Boolean { op, children } => match op {
            BoolOp::And => children.iter().all(|child| evaluate_condition(child, ctx)),
            BoolOp::Or => children.iter().any(|child| evaluate_condition(child, ctx)),
        },
    }
}

fn compare(op: CompareOp, left: Option<&Value>, right: Option<&Value>) -> bool {
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Neq => left != right,
        CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
            let (Some(l), Some(r)) = (left.and_then(Value::as_number), right.and_then(Value::as_number))
            else {
                return false;
            };
            match op {
                CompareOp::Lt => l < r,
                CompareOp::Lte => l <= r,
                CompareOp::Gt => l > r,
                _ => l >= r,
            }
        }
    }
}
