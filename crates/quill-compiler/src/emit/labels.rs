//! Label ids for conditional jumps.
//!
//! A conditional's ENTER marker issues a fresh id for its forward `GOTO` and
//! its LEAVE marker resolves the innermost pending id into a `LABEL`. Ids
//! grow monotonically for the whole unit and pending ids are kept in stack
//! order, so nested conditionals pair up without a control-flow graph.

use quill_core::InternalError;
use tracing::debug;

/// Default limit on nested conditionals.
pub const DEFAULT_MAX_LABEL_DEPTH: usize = 100;

/// Pending label ids, innermost last.
#[derive(Debug)]
pub struct LabelStack {
    /// Next id to hand out
    next_id: u32,
    /// Issued but not yet resolved
    pending: Vec<u16>,
    max_depth: usize,
}

impl LabelStack {
    /// Create a label stack allowing `max_depth` pending ids.
    pub fn new(max_depth: usize) -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
            max_depth,
        }
    }

    /// Issue a new id and mark it pending.
    pub fn issue(&mut self) -> Result<u16, InternalError> {
        if self.pending.len() >= self.max_depth {
            return Err(InternalError::LabelOverflow {
                limit: self.max_depth,
            });
        }

        let id = u16::try_from(self.next_id).map_err(|_| InternalError::IndexOverflow {
            what: "label",
            index: self.next_id as usize,
        })?;
        self.next_id += 1;
        self.pending.push(id);
        debug!(id, depth = self.pending.len(), "issued label");
        Ok(id)
    }

    /// Resolve the innermost pending id.
    pub fn resolve(&mut self) -> Result<u16, InternalError> {
        let id = self.pending.pop().ok_or(InternalError::LabelUnderflow)?;
        debug!(id, depth = self.pending.len(), "resolved label");
        Ok(id)
    }

    /// Number of pending ids.
    pub fn depth(&self) -> usize {
        self.pending.len()
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u32 {
        self.next_id
    }
}

impl Default for LabelStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LABEL_DEPTH)
    }
}
