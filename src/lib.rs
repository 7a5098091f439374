//! A todo list application core, built around a [Store] holding
//! immutable snapshots of the [AppState].
//!
//! Every change goes through [Store::update()], which lets an edit
//! function modify a draft of the current snapshot. Only edits which
//! actually change something produce a new snapshot and notify the
//! subscribers. The [Actions] simulate asynchronous fetch, save and
//! remove operations, and the views in [views] are kept in sync with
//! the store by [Provider](provider::Provider)s, all wired together
//! by [App].

mod actions;
mod app;
mod config;
pub mod error;
mod listener;
pub mod middleware;
mod produce;
pub mod provider;
mod state;
mod store;
pub mod views;

pub use actions::Actions;
pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use listener::*;
pub use produce::produce;
pub use state::{seed_todos, AppState, Todo, TodoDraft, TodoId, TodoPatch};
pub use store::{Store, StoreRef, Subscription};
