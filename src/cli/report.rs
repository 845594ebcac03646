use std::sync::Mutex;

use crate::{types::MatchTableRow, utils};

const COLUMN_WIDTH: usize = 60;

/// What happened to a single query during gather.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The search never ran or never finished.
    Pending,
    NotFound,
    Added { name: String, candidates: usize },
    /// The best candidate is already used by the query at `slot`.
    Duplicate { name: String, slot: usize },
}

/// Per-query outcomes, filled concurrently from the gather callback.
pub struct Report {
    outcomes: Mutex<Vec<Outcome>>,
}

impl Report {
    pub fn new(size: usize) -> Self {
        Self {
            outcomes: Mutex::new(vec![Outcome::Pending; size]),
        }
    }

    pub fn set(&self, slot: usize, outcome: Outcome) {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = outcomes.get_mut(slot) {
            *entry = outcome;
        }
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Table rows in input order; positions are 1-based like line numbers.
    pub fn rows(&self, queries: &[String]) -> Vec<MatchTableRow> {
        queries
            .iter()
            .zip(self.outcomes())
            .enumerate()
            .map(|(i, (query, outcome))| {
                let (track, status) = match outcome {
                    Outcome::Pending => (String::new(), "skipped".to_string()),
                    Outcome::NotFound => (String::new(), "not found".to_string()),
                    Outcome::Added { name, candidates } if candidates > 1 => {
                        (name, format!("added (1 of {})", candidates))
                    }
                    Outcome::Added { name, .. } => (name, "added".to_string()),
                    Outcome::Duplicate { name, slot } => {
                        (name, format!("duplicate of #{}", slot + 1))
                    }
                };

                MatchTableRow {
                    position: i + 1,
                    query: utils::truncate(query, COLUMN_WIDTH),
                    track: utils::truncate(&track, COLUMN_WIDTH),
                    status,
                }
            })
            .collect()
    }
}
