// Rolling result history kept in a key-value store
use tracing::debug;

use crate::accumulator::Calculator;
use crate::error::StoreError;
use crate::store::KeyValueStore;

pub const HISTORY_KEY: &str = "history";
pub const INDEX_KEY: &str = "index";
pub const HISTORY_CAPACITY: usize = 3;
pub const DELIMITER: &str = "= ";

pub struct History<S> {
    store: S,
    cap: usize,
}

impl<S: KeyValueStore> History<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cap: HISTORY_CAPACITY,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored lines, oldest first. Empty if nothing was recorded yet.
    pub fn entries(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read()?.unwrap_or_default())
    }

    /// Appends `"<expression>= <pending>"`, evicting the oldest line when full.
    pub fn record(&mut self, expression: Option<&str>, calc: &Calculator) -> Result<(), StoreError> {
        let Some(expression) = expression else {
            return Ok(());
        };
        let mut items = self.entries()?;
        if items.len() >= self.cap {
            items.drain(..=items.len() - self.cap);
        }
        items.push(format!("{expression}{DELIMITER}{}", calc.pending()));
        self.store.set(HISTORY_KEY, serde_json::to_string(&items)?)?;
        debug!(len = items.len(), "recorded history entry");
        Ok(())
    }

    /// Loads the entry under the advanced cursor into `calc`.
    pub fn load_next(&mut self, calc: &mut Calculator) -> Result<(), StoreError> {
        let items = match self.read()? {
            Some(items) if !items.is_empty() => items,
            _ => return Ok(()),
        };
        let index = self.advance_cursor(items.len() - 1)?;
        let (committed, pending) = split_entry(&items[index]);
        calc.restore(committed, pending);
        debug!(index, "loaded history entry");
        Ok(())
    }

    fn read(&self) -> Result<Option<Vec<String>>, StoreError> {
        match self.store.get(HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(None),
        }
    }

    fn advance_cursor(&mut self, max_index: usize) -> Result<usize, StoreError> {
        let last = self
            .store
            .get(INDEX_KEY)?
            .and_then(|raw| raw.trim().parse::<usize>().ok());
        let next = match last {
            Some(last) if last < max_index => last + 1,
            _ => 0,
        };
        self.store.set(INDEX_KEY, next.to_string())?;
        Ok(next)
    }
}

/// Splits a stored line on the first `"= "`. The `=` stays with the
/// committed part so a following operator chains onto the old result.
pub fn split_entry(entry: &str) -> (&str, &str) {
    match entry.find(DELIMITER) {
        Some(at) => (&entry[..=at], &entry[at + DELIMITER.len()..]),
        None => (entry, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn calc_showing(pending: &str) -> Calculator {
        let mut calc = Calculator::default();
        calc.restore("", pending);
        calc
    }

    #[test]
    fn record_formats_expression_and_result() {
        let mut history = History::new(MemoryStore::new());
        history.record(Some("6+2*3"), &calc_showing("12")).unwrap();
        assert_eq!(history.entries().unwrap(), vec!["6+2*3= 12"]);
        assert_eq!(
            history.store().get(HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["6+2*3= 12"]"#)
        );
    }

    #[test]
    fn record_without_expression_is_ignored() {
        let mut history = History::new(MemoryStore::new());
        history.record(None, &calc_showing("5")).unwrap();
        assert_eq!(history.store().get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn keeps_last_three() {
        let mut history = History::new(MemoryStore::new());
        for n in 1..=4 {
            let expr = format!("{n}+0");
            history.record(Some(expr.as_str()), &calc_showing(&n.to_string())).unwrap();
        }
        assert_eq!(
            history.entries().unwrap(),
            vec!["2+0= 2", "3+0= 3", "4+0= 4"]
        );
    }

    #[test]
    fn load_without_history_is_a_no_op() {
        let mut history = History::new(MemoryStore::new());
        let mut calc = calc_showing("9");
        history.load_next(&mut calc).unwrap();
        assert_eq!(calc.pending(), "9");
        assert_eq!(history.store().get(INDEX_KEY).unwrap(), None);
    }

    #[test]
    fn load_cycles_and_wraps() {
        let mut history = History::new(MemoryStore::new());
        for (expr, result) in [("1+1", "2"), ("2*3", "6"), ("8/2", "4")] {
            history.record(Some(expr), &calc_showing(result)).unwrap();
        }

        let mut calc = Calculator::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            history.load_next(&mut calc).unwrap();
            seen.push((calc.committed().to_string(), calc.pending().to_string()));
        }
        let pairs: Vec<(&str, &str)> = seen.iter().map(|(c, p)| (c.as_str(), p.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("1+1=", "2"), ("2*3=", "6"), ("8/2=", "4"), ("1+1=", "2")]
        );
        assert_eq!(history.store().get(INDEX_KEY).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn stale_cursor_restarts_at_zero() {
        let mut store = MemoryStore::new();
        store.set(INDEX_KEY, "7".to_string()).unwrap();
        store.set(HISTORY_KEY, r#"["1+1= 2"]"#.to_string()).unwrap();
        let mut history = History::new(store);
        let mut calc = Calculator::default();
        history.load_next(&mut calc).unwrap();
        assert_eq!(calc.pending(), "2");
        assert_eq!(history.store().get(INDEX_KEY).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn loaded_entry_evaluates_to_its_result() {
        let mut history = History::new(MemoryStore::new());
        history.record(Some("5+3"), &calc_showing("8")).unwrap();
        let mut calc = Calculator::default();
        history.load_next(&mut calc).unwrap();
        calc.evaluate();
        assert_eq!(calc.committed(), "");
        assert_eq!(calc.pending(), "8");
    }

    #[test]
    fn corrupt_history_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "{".to_string()).unwrap();
        let history = History::new(store);
        assert!(matches!(history.entries(), Err(StoreError::Json(_))));
    }

    #[test]
    fn split_entry_keeps_equal_sign() {
        assert_eq!(split_entry("12/4= 3"), ("12/4=", "3"));
        assert_eq!(split_entry("no delimiter"), ("no delimiter", ""));
        assert_eq!(split_entry("1/0= Infinity"), ("1/0=", "Infinity"));
    }
}
