//! Recursive string-splitting evaluator.
//!
//! The operator to split on is picked by a [`PriorityOrder`] scan: every
//! operator of the list that occurs in the input is a match, and the last
//! match wins. With the default order `/ * + -` this makes `-` the loosest
//! and `/` the tightest binding operator. The input is split at the rightmost
//! occurrence of the chosen operator and both halves are evaluated again.
//! Fragments without an operator are read as integers, so a fraction carried
//! in from an earlier result is truncated.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Anomaly, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Sub => left - right,
            Operator::Mul => left * right,
            Operator::Div => left / right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Scan order used to pick the split operator. Later entries override
/// earlier ones, so the last entry binds loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityOrder([Operator; 4]);

impl PriorityOrder {
    pub fn new(order: [Operator; 4]) -> Result<Self, ConfigError> {
        let complete = Operator::ALL.iter().all(|op| order.contains(op));
        if !complete {
            let given = order.iter().map(|op| op.symbol()).collect();
            return Err(ConfigError::InvalidPriority { given });
        }
        Ok(Self(order))
    }

    pub fn operators(&self) -> &[Operator; 4] {
        &self.0
    }

    /// The operator `expr` is split on, if it contains any.
    pub fn select(&self, expr: &str) -> Option<Operator> {
        self.0
            .iter()
            .rev()
            .copied()
            .find(|op| expr.contains(op.symbol()))
    }
}

impl Default for PriorityOrder {
    fn default() -> Self {
        Self([Operator::Div, Operator::Mul, Operator::Add, Operator::Sub])
    }
}

impl FromStr for PriorityOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPriority { given: s.to_string() };
        let ops = s
            .chars()
            .map(Operator::from_symbol)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;
        let order: [Operator; 4] = ops.try_into().map_err(|_| invalid())?;
        Self::new(order).map_err(|_| invalid())
    }
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.0 {
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub anomalies: Vec<Anomaly>,
}

impl Evaluation {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    order: PriorityOrder,
}

impl Evaluator {
    pub fn new(order: PriorityOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> PriorityOrder {
        self.order
    }

    pub fn evaluate(&self, expr: &str) -> Evaluation {
        let mut anomalies = Vec::new();
        let value = self.eval(expr, &mut anomalies);
        if !anomalies.is_empty() {
            debug!(expr, ?anomalies, value, "evaluation passed through anomalies");
        }
        Evaluation { value, anomalies }
    }

    fn eval(&self, expr: &str, anomalies: &mut Vec<Anomaly>) -> f64 {
        let Some(op) = self.order.select(expr) else {
            return operand(expr, anomalies);
        };
        // select() only returns operators present in expr
        let Some(index) = expr.rfind(op.symbol()) else {
            return f64::NAN;
        };
        let left = self.eval(&expr[..index], anomalies);
        let right = self.eval(&expr[index + 1..], anomalies);
        if op == Operator::Div && right == 0.0 {
            anomalies.push(Anomaly::DivisionByZero);
        }
        op.apply(left, right)
    }
}

fn operand(fragment: &str, anomalies: &mut Vec<Anomaly>) -> f64 {
    if fragment.is_empty() {
        anomalies.push(Anomaly::EmptyOperand);
        return f64::NAN;
    }
    let (value, consumed) = parse_int_prefix(fragment);
    if consumed != fragment.len() {
        anomalies.push(Anomaly::Malformed {
            fragment: fragment.to_string(),
        });
    }
    value
}

/// Lenient integer parse: skips leading whitespace, takes an optional sign
/// and as many decimal digits as follow. Trailing garbage is ignored; no
/// digits at all yields NaN.
pub fn parse_int(s: &str) -> f64 {
    parse_int_prefix(s).0
}

fn parse_int_prefix(s: &str) -> (f64, usize) {
    let trimmed = s.trim_start();
    let mut start = s.len() - trimmed.len();
    let mut negative = false;
    if let Some(sign) = trimmed.chars().next().filter(|c| *c == '+' || *c == '-') {
        negative = sign == '-';
        start += 1;
    }
    let digits = s[start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return (f64::NAN, 0);
    }
    let end = start + digits;
    let magnitude: f64 = s[start..end].parse().unwrap_or(f64::NAN);
    (if negative { -magnitude } else { magnitude }, end)
}

/// Renders a result the way the display shows it.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        // shortest round-trip mantissa, explicit sign on the exponent
        let exp = format!("{value:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        value.to_string()
    }
}
