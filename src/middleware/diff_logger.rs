//! Logging [Middleware](crate::middleware::Middleware) which publishes
//! a structural diff of every committed update, rather than whole
//! snapshots. The diff is produced with [serde_diff] and rendered as
//! JSON.

use super::{CommitFn, LogLevel, Middleware};
use crate::Store;
use serde_diff::{Diff, SerdeDiff};
use std::rc::Rc;

/// Render the changes between `prev` and `next` as a JSON encoded
/// list of [serde_diff] commands.
pub fn describe_diff<State: SerdeDiff>(
    prev: &State,
    next: &State,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Diff::serializable(prev, next))
}

/// Logs the difference between the previous and next snapshot of
/// every committed update.
pub struct DiffLoggerMiddleware {
    log_level: LogLevel,
}

impl DiffLoggerMiddleware {
    pub fn new() -> Self {
        Self {
            log_level: LogLevel::default(),
        }
    }

    /// Set the level at which the diffs from this middleware will be
    /// logged.
    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

impl Default for DiffLoggerMiddleware {
    fn default() -> Self {
        DiffLoggerMiddleware::new()
    }
}

impl<State> Middleware<State> for DiffLoggerMiddleware
where
    State: SerdeDiff,
{
    fn on_commit(
        &self,
        store: &Store<State>,
        next: Option<Rc<State>>,
        commit: CommitFn<State>,
    ) -> Option<Rc<State>> {
        let prev = store.state();
        let committed = commit(store, next);

        if let Some(next) = &committed {
            match describe_diff(&*prev, &**next) {
                Ok(diff) => self.log_level.log(format!("state diff: {}", diff)),
                Err(error) => log::warn!("unable to serialize state diff: {}", error),
            }
        }

        committed
    }
}
