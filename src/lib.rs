//! Button-driven arithmetic calculator core: a two-buffer expression
//! accumulator, a last-match-wins recursive evaluator and a three-line
//! rolling history kept in a pluggable key-value store.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod keypad;
pub mod logging;
pub mod store;
pub mod ui;

pub use accumulator::Calculator;
pub use error::{Anomaly, ConfigError, StoreError};
pub use evaluator::{Evaluation, Evaluator, Operator, PriorityOrder};
pub use history::History;
pub use keypad::{Button, Session};
pub use store::{FileStore, KeyValueStore, MemoryStore};
