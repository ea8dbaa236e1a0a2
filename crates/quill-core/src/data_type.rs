//! Value types and the implicit conversions between them.

use std::fmt;

/// The resolved type of an expression or declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `boolean`, stored as an int (0 or 1) by the VM.
    Boolean,
    /// `int`
    Int,
    /// `double`
    Double,
}

impl DataType {
    /// Source-level name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Int => "int",
            DataType::Double => "double",
        }
    }

    /// Whether the type takes part in arithmetic.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a synthetic conversion node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    /// Widen an int to a double.
    IntToDouble,
    /// Truncate a double to an int.
    DoubleToInt,
}

impl CastKind {
    /// The conversion that turns `from` into `to`, if one exists.
    ///
    /// Identity and boolean conversions return `None`.
    pub fn between(from: DataType, to: DataType) -> Option<CastKind> {
        match (from, to) {
            (DataType::Int, DataType::Double) => Some(CastKind::IntToDouble),
            (DataType::Double, DataType::Int) => Some(CastKind::DoubleToInt),
            _ => None,
        }
    }

    /// Type produced by the conversion.
    pub fn target(&self) -> DataType {
        match self {
            CastKind::IntToDouble => DataType::Double,
            CastKind::DoubleToInt => DataType::Int,
        }
    }

    /// Type consumed by the conversion.
    pub fn source(&self) -> DataType {
        match self {
            CastKind::IntToDouble => DataType::Int,
            CastKind::DoubleToInt => DataType::Double,
        }
    }
}
