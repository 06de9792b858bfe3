//! Two-buffer expression accumulator.
//!
//! `committed` holds operands and operators already locked in by an operator
//! press (and possibly a trailing `expr=` restored from history); `pending`
//! holds the operand being typed or the last result. Invalid presses are
//! silent no-ops.

use tracing::debug;

use crate::evaluator::{format_number, Evaluator, Operator};

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    committed: String,
    pending: String,
    evaluator: Evaluator,
}

impl Calculator {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            committed: String::new(),
            pending: String::new(),
            evaluator,
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn add_digit_or_point(&mut self, token: &str) {
        if token == "." && (self.pending.contains('.') || self.pending.is_empty()) {
            return;
        }
        self.pending.push_str(token);
    }

    pub fn add_operator(&mut self, op: Operator) {
        // An empty committed buffer counts as numeric.
        let ends_numeric = self.committed.chars().last().map_or(true, is_digit);
        if !ends_numeric && self.pending.is_empty() {
            return;
        }
        if self.pending.is_empty() {
            return;
        }
        self.committed.push_str(&self.pending);
        self.committed.push(op.symbol());
        self.pending.clear();
    }

    pub fn evaluate(&mut self) {
        if self.committed.is_empty() || self.pending.is_empty() {
            return;
        }
        if let Some(eq) = self.committed.rfind('=') {
            self.committed.drain(..=eq);
        }
        let expr = format!("{}{}", self.committed, self.pending);
        let outcome = self.evaluator.evaluate(&expr);
        self.pending = format_number(outcome.value);
        self.committed.clear();
        debug!(%expr, result = %self.pending, "evaluated");
    }

    pub fn cancel(&mut self) {
        self.committed.clear();
        self.pending.clear();
    }

    pub fn cancel_last_entry(&mut self) {
        self.pending.pop();
    }

    /// `committed + pending`, or `None` while either buffer is empty.
    pub fn current_expression(&self) -> Option<String> {
        if self.committed.is_empty() || self.pending.is_empty() {
            None
        } else {
            Some(format!("{}{}", self.committed, self.pending))
        }
    }

    /// Overwrites both buffers, e.g. with an entry loaded from history.
    pub fn restore(&mut self, committed: impl Into<String>, pending: impl Into<String>) {
        self.committed = committed.into();
        self.pending = pending.into();
    }
}
