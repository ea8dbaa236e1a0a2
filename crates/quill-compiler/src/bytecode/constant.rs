//! Constant pool for compiled executables.
//!
//! Append-only and never deduplicated: every literal gets a fresh slot, so
//! the index returned is always that of the newly appended entry.

use std::fmt;

/// Values stored in the constant pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    /// 32-bit signed integer (booleans lower to 0/1).
    Int(i32),
    /// 64-bit float.
    Double(f64),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "int {}", v),
            Constant::Double(v) => write!(f, "double {}", v),
        }
    }
}

/// Executable-level constant pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    constants: Vec<Constant>,
}

impl ConstantPool {
    /// Create a new empty constant pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constant, returning its index.
    pub fn push(&mut self, constant: Constant) -> usize {
        self.constants.push(constant);
        self.constants.len() - 1
    }

    /// Append an int constant.
    pub fn push_int(&mut self, value: i32) -> usize {
        self.push(Constant::Int(value))
    }

    /// Append a double constant.
    pub fn push_double(&mut self, value: f64) -> usize {
        self.push(Constant::Double(value))
    }

    /// Get a constant by index.
    pub fn get(&self, index: usize) -> Option<&Constant> {
        self.constants.get(index)
    }

    /// Number of constants.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Iterate in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }
}
