// Buttons and the dispatch from a button press to the calculator core
use tracing::debug;

use crate::accumulator::Calculator;
use crate::error::StoreError;
use crate::evaluator::Operator;
use crate::history::History;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Digit(char),
    Point,
    Operator(Operator),
    Equal,
    Cancel,
    CancelEntry,
    History,
}

impl Button {
    pub fn label(self) -> String {
        match self {
            Button::Digit(d) => d.to_string(),
            Button::Point => ".".into(),
            Button::Operator(op) => op.symbol().to_string(),
            Button::Equal => "=".into(),
            Button::Cancel => "C".into(),
            Button::CancelEntry => "CE".into(),
            Button::History => "H".into(),
        }
    }
}

/// Rows of the on-screen keypad, top to bottom.
pub const KEYPAD: &[&[Button]] = &[
    &[Button::Cancel, Button::CancelEntry, Button::History, Button::Operator(Operator::Div)],
    &[Button::Digit('7'), Button::Digit('8'), Button::Digit('9'), Button::Operator(Operator::Mul)],
    &[Button::Digit('4'), Button::Digit('5'), Button::Digit('6'), Button::Operator(Operator::Sub)],
    &[Button::Digit('1'), Button::Digit('2'), Button::Digit('3'), Button::Operator(Operator::Add)],
    &[Button::Point, Button::Digit('0'), Button::Equal],
];

pub struct Session<S> {
    calculator: Calculator,
    history: History<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(calculator: Calculator, history: History<S>) -> Self {
        Self { calculator, history }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn history(&self) -> &History<S> {
        &self.history
    }

    pub fn press(&mut self, button: Button) -> Result<(), StoreError> {
        debug!(?button, "press");
        match button {
            Button::Digit(d) => self.calculator.add_digit_or_point(&d.to_string()),
            Button::Point => self.calculator.add_digit_or_point("."),
            Button::Operator(op) => self.calculator.add_operator(op),
            Button::Equal => {
                let expression = self.calculator.current_expression();
                self.calculator.evaluate();
                self.history.record(expression.as_deref(), &self.calculator)?;
            }
            Button::Cancel => self.calculator.cancel(),
            Button::CancelEntry => self.calculator.cancel_last_entry(),
            Button::History => self.history.load_next(&mut self.calculator)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn session() -> Session<MemoryStore> {
        Session::new(Calculator::default(), History::new(MemoryStore::new()))
    }

    fn press_all(session: &mut Session<MemoryStore>, labels: &str) {
        for c in labels.chars() {
            let button = match c {
                '.' => Button::Point,
                '=' => Button::Equal,
                d if d.is_ascii_digit() => Button::Digit(d),
                op => Button::Operator(Operator::from_symbol(op).expect("operator")),
            };
            session.press(button).unwrap();
        }
    }

    #[test]
    fn equal_records_expression_and_result() {
        let mut session = session();
        press_all(&mut session, "6+2*3=");
        assert_eq!(session.calculator().pending(), "12");
        assert_eq!(session.history().entries().unwrap(), vec!["6+2*3= 12"]);
    }

    #[test]
    fn equal_without_expression_records_nothing() {
        let mut session = session();
        press_all(&mut session, "5=");
        assert!(session.history().entries().unwrap().is_empty());
    }

    #[test]
    fn history_button_restores_entry() {
        let mut session = session();
        press_all(&mut session, "9-4=");
        session.press(Button::Cancel).unwrap();
        session.press(Button::History).unwrap();
        assert_eq!(session.calculator().committed(), "9-4=");
        assert_eq!(session.calculator().pending(), "5");

        press_all(&mut session, "*2=");
        assert_eq!(session.calculator().pending(), "10");
        assert_eq!(
            session.history().entries().unwrap(),
            vec!["9-4= 5", "9-4=5*2= 10"]
        );
    }

    #[test]
    fn cancel_entry_trims_pending() {
        let mut session = session();
        press_all(&mut session, "12");
        session.press(Button::CancelEntry).unwrap();
        assert_eq!(session.calculator().pending(), "1");
    }

    #[test]
    fn keypad_has_every_button_once() {
        let buttons: Vec<Button> = KEYPAD.iter().flat_map(|row| row.iter().copied()).collect();
        assert_eq!(buttons.len(), 19);
        for d in '0'..='9' {
            assert!(buttons.contains(&Button::Digit(d)));
        }
        for op in Operator::ALL {
            assert!(buttons.contains(&Button::Operator(op)));
        }
        for (i, b) in buttons.iter().enumerate() {
            assert!(!buttons[i + 1..].contains(b), "duplicate {b:?}");
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Button::CancelEntry.label(), "CE");
        assert_eq!(Button::Operator(Operator::Mul).label(), "*");
        assert_eq!(Button::Digit('7').label(), "7");
    }
}
