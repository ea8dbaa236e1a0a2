//! CompilationContext - state shared by the passes of one compilation unit.

use crate::scope::ScopeLedger;

/// Per-unit compilation state.
///
/// Passed by reference into each pass instead of living in a global. A
/// second unit compiled concurrently needs its own context.
#[derive(Debug, Default)]
pub struct CompilationContext {
    ledger: ScopeLedger,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose ledger allows `max_depth` nested blocks.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            ledger: ScopeLedger::with_max_depth(max_depth),
        }
    }

    pub fn ledger(&self) -> &ScopeLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ScopeLedger {
        &mut self.ledger
    }
}
