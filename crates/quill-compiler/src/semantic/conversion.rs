//! Implicit int/double conversions.
//!
//! Two rules share the same single cast kind per direction:
//! - assignment-like coercion (assignment, initializers, call arguments)
//!   converts the value to the target's type in either direction
//! - binary promotion widens the int side of a mixed pair to double

use quill_core::{CastKind, DataType};

/// How a value reaches a target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Types already match.
    Identity,
    /// Wrap the value in a cast node.
    Cast(CastKind),
}

/// Find the coercion from `source` into a slot of type `target`.
///
/// Returns `None` when no implicit conversion exists (anything involving
/// boolean, except boolean to boolean).
pub fn find_coercion(source: DataType, target: DataType) -> Option<Coercion> {
    if source == target {
        return Some(Coercion::Identity);
    }
    CastKind::between(source, target).map(Coercion::Cast)
}

/// Result of promoting two numeric operands to a common type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    /// Common operand type
    pub operand_type: DataType,
    /// Widen the left operand
    pub cast_left: bool,
    /// Widen the right operand
    pub cast_right: bool,
}

/// Promote a numeric operand pair, or `None` if either is not numeric.
pub fn promote(left: DataType, right: DataType) -> Option<Promotion> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }

    let promotion = match (left, right) {
        (DataType::Int, DataType::Double) => Promotion {
            operand_type: DataType::Double,
            cast_left: true,
            cast_right: false,
        },
        (DataType::Double, DataType::Int) => Promotion {
            operand_type: DataType::Double,
            cast_left: false,
            cast_right: true,
        },
        _ => Promotion {
            operand_type: left,
            cast_left: false,
            cast_right: false,
        },
    };
    Some(promotion)
}
