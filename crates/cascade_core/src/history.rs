//! Append-only log of per-iteration states.
//!
//! One run owns one `History`: it is cleared at run start, populated by the
//! engine, read by stop conditions, and handed to the caller afterwards.
//! Entry 0 is the initial state; entries are never mutated retroactively.

use std::marker::PhantomData;

use serde::Serialize;

use crate::errors::HistoryError;
use crate::record::Record;
use crate::traits::Scalar;

/// Ordered sequence of states with a schema frozen by the first record.
#[derive(Debug, Clone)]
pub struct History<T, R> {
    schema: Vec<String>,
    states: Vec<R>,
    _scalar: PhantomData<T>,
}

/// Tabular view of a completed history: rows indexed by iteration, one
/// column per schema variable. External exporters (plotting, LaTeX, JSON
/// serializers) consume this view, never the internal log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<T> {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<T>>,
}

impl<T: Scalar, R: Record<T>> History<T, R> {
    pub fn new() -> Self {
        Self {
            schema: Vec::new(),
            states: Vec::new(),
            _scalar: PhantomData,
        }
    }

    /// Appends a state. The first recorded state freezes the schema; any
    /// later state whose key set differs is rejected whole (no partial
    /// record is stored).
    pub fn record(&mut self, state: R) -> Result<(), HistoryError> {
        let names = state.names();
        if self.states.is_empty() {
            self.schema = names.iter().map(|n| n.to_string()).collect();
            self.states.push(state);
            return Ok(());
        }

        let missing: Vec<String> = self
            .schema
            .iter()
            .filter(|s| !names.iter().any(|n| *n == s.as_str()))
            .cloned()
            .collect();
        let extra: Vec<String> = names
            .iter()
            .filter(|n| !self.schema.iter().any(|s| s == **n))
            .map(|n| n.to_string())
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(HistoryError::SchemaMismatch { missing, extra });
        }

        self.states.push(state);
        Ok(())
    }

    /// Value of `name` in the most recent state. `Ok(None)` when nothing
    /// has been recorded yet; `UnknownVariable` when `name` is not part of
    /// the schema.
    pub fn latest(&self, name: &str) -> Result<Option<T>, HistoryError> {
        let Some(last) = self.states.last() else {
            return Ok(None);
        };
        match last.value(name) {
            Some(value) => Ok(Some(value)),
            None => Err(self.unknown(name)),
        }
    }

    /// Value of `name` at an iteration index. Negative indices count from
    /// the end (`-1` = latest, `-2` = second-to-last); non-negative indices
    /// are absolute iteration numbers.
    pub fn at(&self, index: isize, name: &str) -> Result<T, HistoryError> {
        let len = self.states.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        if resolved < 0 || resolved >= len {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.states.len(),
            });
        }
        match self.states[resolved as usize].value(name) {
            Some(value) => Ok(value),
            None => Err(self.unknown(name)),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Variable names of the frozen schema (empty before the first record).
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn last_state(&self) -> Option<&R> {
        self.states.last()
    }

    pub fn states(&self) -> &[R] {
        &self.states
    }

    /// Drops all recorded states and unfreezes the schema.
    pub fn clear(&mut self) {
        self.schema.clear();
        self.states.clear();
    }

    /// Materializes the log as a table, columns in schema order.
    pub fn to_table(&self) -> Table<T> {
        let rows = self
            .states
            .iter()
            .map(|state| {
                self.schema
                    .iter()
                    .map(|name| {
                        state
                            .value(name)
                            .expect("record() enforces the schema invariant")
                    })
                    .collect()
            })
            .collect();
        Table {
            columns: self.schema.clone(),
            rows,
        }
    }

    fn unknown(&self, name: &str) -> HistoryError {
        HistoryError::UnknownVariable {
            name: name.to_string(),
            known: self.schema.clone(),
        }
    }
}

impl<T: Scalar, R: Record<T>> Default for History<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VarMap;

    fn state(entries: &[(&str, f64)]) -> VarMap<f64> {
        entries
            .iter()
            .map(|(n, v)| (n.to_string(), *v))
            .collect()
    }

    #[test]
    fn length_grows_by_one_per_record() {
        let mut history: History<f64, VarMap<f64>> = History::new();
        assert!(history.is_empty());
        for i in 0..5 {
            history.record(state(&[("x", i as f64)])).unwrap();
            assert_eq!(history.len(), i + 1);
        }
    }

    #[test]
    fn differing_key_set_is_rejected_without_partial_record() {
        let mut history: History<f64, VarMap<f64>> = History::new();
        history.record(state(&[("x", 1.0), ("y", 2.0)])).unwrap();

        let err = history
            .record(state(&[("x", 1.0), ("z", 3.0)]))
            .expect_err("schema mismatch expected");
        match err {
            HistoryError::SchemaMismatch { missing, extra } => {
                assert_eq!(missing, vec!["y".to_string()]);
                assert_eq!(extra, vec!["z".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(history.len(), 1);

        // A subset is rejected too.
        assert!(history.record(state(&[("x", 1.0)])).is_err());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn latest_returns_sentinel_on_empty_history() {
        let history: History<f64, VarMap<f64>> = History::new();
        assert_eq!(history.latest("x").unwrap(), None);
    }

    #[test]
    fn latest_rejects_unknown_variable() {
        let mut history: History<f64, VarMap<f64>> = History::new();
        history.record(state(&[("x", 1.0)])).unwrap();
        let err = history.latest("nope").expect_err("unknown variable");
        assert!(format!("{err}").contains("unknown variable 'nope'"));
    }

    #[test]
    fn at_resolves_relative_and_absolute_indices() {
        let mut history: History<f64, VarMap<f64>> = History::new();
        for i in 0..4 {
            history.record(state(&[("x", i as f64)])).unwrap();
        }
        assert_eq!(history.at(0, "x").unwrap(), 0.0);
        assert_eq!(history.at(3, "x").unwrap(), 3.0);
        assert_eq!(history.at(-1, "x").unwrap(), 3.0);
        assert_eq!(history.at(-2, "x").unwrap(), 2.0);

        assert!(matches!(
            history.at(4, "x"),
            Err(HistoryError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(matches!(
            history.at(-5, "x"),
            Err(HistoryError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn to_table_uses_schema_order() {
        let mut history: History<f64, VarMap<f64>> = History::new();
        history.record(state(&[("b", 1.0), ("a", 2.0)])).unwrap();
        history.record(state(&[("a", 4.0), ("b", 3.0)])).unwrap();

        let table = history.to_table();
        assert_eq!(table.columns, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(table.rows, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn clear_unfreezes_the_schema() {
        let mut history: History<f64, VarMap<f64>> = History::new();
        history.record(state(&[("x", 1.0)])).unwrap();
        history.clear();
        assert!(history.is_empty());
        history.record(state(&[("y", 1.0)])).unwrap();
        assert_eq!(history.schema(), &["y".to_string()]);
    }
}
