//! Query state shared by the lookup tools
//!
//! Each tool keeps one `QueryController`: the state of its latest submission
//! and its search history. A submission is split in two so the lock is not
//! held while the request is in flight: `begin` validates the input and hands
//! out a sequence-numbered `PendingQuery`, `resolve` applies the outcome.
//! Outcomes of anything but the most recently issued query are discarded.

use serde::Serialize;
use tracing::debug;

use super::error::ToolError;
use crate::session::SearchHistory;

/// State of a tool's displayed result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryState<T> {
    Idle,
    Loading { query: String },
    Success { query: String, data: T },
    Failure { query: String, message: String },
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading { .. })
    }
}

/// Ticket for an in-flight submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    seq: u64,
    query: String,
}

impl PendingQuery {
    /// Trimmed query as sent to the API
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Whether a resolved outcome made it into the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Applied,
    Superseded,
}

#[derive(Debug, Clone)]
pub struct QueryController<T> {
    state: QueryState<T>,
    history: SearchHistory,
    issued: u64,
    empty_input_message: &'static str,
}

impl<T> QueryController<T> {
    pub fn new(history_cap: usize, empty_input_message: &'static str) -> Self {
        Self {
            state: QueryState::Idle,
            history: SearchHistory::new(history_cap),
            issued: 0,
            empty_input_message,
        }
    }

    /// Validate the input and move to `Loading`
    pub fn begin(&mut self, input: &str) -> Result<PendingQuery, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::validation(self.empty_input_message));
        }

        self.issued += 1;
        self.state = QueryState::Loading {
            query: query.to_string(),
        };
        Ok(PendingQuery {
            seq: self.issued,
            query: query.to_string(),
        })
    }

    /// Apply the outcome of a submission if it is still the latest one
    pub fn resolve(&mut self, pending: PendingQuery, outcome: Result<T, String>) -> Resolution {
        if pending.seq != self.issued {
            debug!(
                seq = pending.seq,
                latest = self.issued,
                query = %pending.query,
                "Discarding superseded response"
            );
            return Resolution::Superseded;
        }

        self.state = match outcome {
            Ok(data) => {
                self.history.record(&pending.query);
                QueryState::Success {
                    query: pending.query,
                    data,
                }
            }
            Err(message) => QueryState::Failure {
                query: pending.query,
                message,
            },
        };
        Resolution::Applied
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn current(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> QueryController<u32> {
        QueryController::new(10, "Please enter an ingredient name")
    }

    #[test]
    fn test_empty_input_rejected() {
        let mut c = controller();
        let err = c.begin("   ").unwrap_err();
        assert!(matches!(err, ToolError::Validation(ref m) if m == "Please enter an ingredient name"));
        assert_eq!(c.state(), &QueryState::Idle);
    }

    #[test]
    fn test_success_records_history() {
        let mut c = controller();
        let pending = c.begin("  Milk ").unwrap();
        assert_eq!(pending.query(), "Milk");
        assert!(c.state().is_loading());

        assert_eq!(c.resolve(pending, Ok(7)), Resolution::Applied);
        assert_eq!(c.current(), Some(&7));
        assert_eq!(c.history().entries(), &["milk"]);
    }

    #[test]
    fn test_failure_leaves_history_alone() {
        let mut c = controller();
        let pending = c.begin("unobtainium").unwrap();
        c.resolve(pending, Err("No substitutes found".into()));
        assert!(matches!(c.state(), QueryState::Failure { message, .. } if message == "No substitutes found"));
        assert!(c.history().is_empty());
        assert_eq!(c.current(), None);
    }

    #[test]
    fn test_superseded_response_discarded() {
        let mut c = controller();
        let first = c.begin("milk").unwrap();
        let second = c.begin("butter").unwrap();

        assert_eq!(c.resolve(second, Ok(2)), Resolution::Applied);
        assert_eq!(c.resolve(first, Ok(1)), Resolution::Superseded);

        assert_eq!(c.current(), Some(&2));
        assert_eq!(c.history().entries(), &["butter"]);
    }

    #[test]
    fn test_success_replaces_failure() {
        let mut c = controller();
        let p = c.begin("x").unwrap();
        c.resolve(p, Err("boom".into()));
        let p = c.begin("y").unwrap();
        c.resolve(p, Ok(3));
        assert!(matches!(c.state(), QueryState::Success { query, data: 3 } if query == "y"));
    }
}
