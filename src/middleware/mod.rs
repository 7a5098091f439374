//! [Middleware] used to modify the behaviour of a [Store] during a
//! [Store::update()]. This module also contains some simple
//! middleware implementations which can be used as utilities in an
//! application.

#[cfg(feature = "diff_logger")]
pub mod diff_logger;
pub mod simple_logger;

use crate::Store;
use std::rc::Rc;

/// Executes subsequent middleware and then replaces the state of the
/// [Store] with the provided snapshot. Returns the committed
/// snapshot, or `None` if nothing was committed.
pub type CommitFn<State> = fn(&Store<State>, Option<Rc<State>>) -> Option<Rc<State>>;

/// Executes subsequent middleware and then hands the snapshot back to
/// the [Store] so that the listeners can be notified. Returning `None`
/// suppresses the notification.
pub type NotifyFn<State> = fn(&Store<State>, Rc<State>) -> Option<Rc<State>>;

/// Levels used by the logging middleware in this module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Warn,
    Info,
}

impl LogLevel {
    pub fn log<S: AsRef<str>>(&self, message: S) {
        match self {
            LogLevel::Trace => log::trace!("{}", message.as_ref()),
            LogLevel::Debug => log::debug!("{}", message.as_ref()),
            LogLevel::Warn => log::warn!("{}", message.as_ref()),
            LogLevel::Info => log::info!("{}", message.as_ref()),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

/// `Middleware` used to modify the behaviour of a [Store] during a
/// [Store::update()].
///
/// Middleware only sees updates which actually produced a new
/// snapshot; no-op edits are discarded before the chain runs.
pub trait Middleware<State> {
    /// This method is invoked by the [Store] during an update, after
    /// the new snapshot has been produced and just before it replaces
    /// the current state. It is necessary to call the provided
    /// `commit` function, which executes subsequent middleware and
    /// stores the snapshot, and usually its result is returned from
    /// this method.
    ///
    /// [Store::state()] still returns the previous snapshot until
    /// `commit` has run. Passing `None` to `commit` vetoes the update.
    fn on_commit(
        &self,
        store: &Store<State>,
        next: Option<Rc<State>>,
        commit: CommitFn<State>,
    ) -> Option<Rc<State>> {
        commit(store, next)
    }

    /// This method is invoked by the [Store] after the snapshot has
    /// been committed, just before the listeners are notified. It is
    /// necessary to call the provided `notify` function, which
    /// executes subsequent middleware and then allows the listeners
    /// to be notified.
    fn on_notify(
        &self,
        store: &Store<State>,
        state: Rc<State>,
        notify: NotifyFn<State>,
    ) -> Option<Rc<State>> {
        notify(store, state)
    }
}
