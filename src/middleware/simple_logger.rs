use super::{CommitFn, LogLevel, Middleware, NotifyFn};
use crate::Store;
use std::{fmt::Debug, rc::Rc};

/// Logs the previous and next snapshot of every committed update
/// using the [log] crate.
pub struct SimpleLoggerMiddleware {
    log_level: LogLevel,
}

impl SimpleLoggerMiddleware {
    pub fn new() -> Self {
        SimpleLoggerMiddleware {
            log_level: LogLevel::default(),
        }
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

impl Default for SimpleLoggerMiddleware {
    fn default() -> Self {
        SimpleLoggerMiddleware::new()
    }
}

impl<State> Middleware<State> for SimpleLoggerMiddleware
where
    State: Debug,
{
    fn on_commit(
        &self,
        store: &Store<State>,
        next: Option<Rc<State>>,
        commit: CommitFn<State>,
    ) -> Option<Rc<State>> {
        self.log_level
            .log(format!("prev state: {:?}", store.state()));

        let committed = commit(store, next);

        match &committed {
            Some(state) => self.log_level.log(format!("next state: {:?}", state)),
            None => self.log_level.log("next state: None (vetoed)"),
        }

        committed
    }

    fn on_notify(
        &self,
        store: &Store<State>,
        state: Rc<State>,
        notify: NotifyFn<State>,
    ) -> Option<Rc<State>> {
        self.log_level.log("notifying listeners");
        notify(store, state)
    }
}
