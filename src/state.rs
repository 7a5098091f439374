//! The application state held by the [Store](crate::Store), and the
//! todo records it is made of.

use serde::{Deserialize, Serialize};
use serde_diff::SerdeDiff;
use std::fmt;

/// Identifier of a saved [Todo].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TodoId(u64);

impl TodoId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A saved todo, as displayed in the list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, SerdeDiff)]
pub struct Todo {
    #[serde_diff(opaque)]
    pub id: TodoId,
    pub title: String,
    pub done: bool,
}

/// The todo currently loaded into the editor. A draft without an `id`
/// has never been saved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, SerdeDiff)]
pub struct TodoDraft {
    #[serde_diff(opaque)]
    pub id: Option<TodoId>,
    pub title: String,
    pub done: bool,
}

impl TodoDraft {
    /// Merge the fields present in `patch` into this draft.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }

    /// The saved form of this draft, if it has been saved before.
    pub fn to_todo(&self) -> Option<Todo> {
        self.id.map(|id| Todo {
            id,
            title: self.title.clone(),
            done: self.done,
        })
    }
}

impl From<&Todo> for TodoDraft {
    fn from(todo: &Todo) -> Self {
        Self {
            id: Some(todo.id),
            title: todo.title.clone(),
            done: todo.done,
        }
    }
}

/// A partial edit of a [TodoDraft]. Fields left as `None` are not
/// changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TodoPatch {
    pub fn title<S: Into<String>>(title: S) -> Self {
        Self {
            title: Some(title.into()),
            done: None,
        }
    }

    pub fn done(done: bool) -> Self {
        Self {
            title: None,
            done: Some(done),
        }
    }
}

/// The whole state of the application.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, SerdeDiff)]
pub struct AppState {
    /// A fetch is in flight.
    pub loading: bool,
    /// A save or delete is in flight.
    pub saving: bool,
    /// The todo being edited.
    pub todo: TodoDraft,
    /// Saved todos in display order.
    pub todos: Vec<Todo>,
    /// The highest id ever handed out. Ids of removed todos stay
    /// below it and are never handed out again.
    pub last_id: u64,
}

impl AppState {
    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// The id for the next newly saved todo.
    pub(crate) fn next_id(&self) -> TodoId {
        let listed = self.todos.iter().map(|todo| todo.id.get()).max().unwrap_or(0);
        TodoId::new(self.last_id.max(listed) + 1)
    }

    /// Replace the entry with the same id as `todo`. Returns `false`
    /// if there is no such entry.
    pub(crate) fn replace(&mut self, todo: Todo) -> bool {
        match self.todos.iter_mut().find(|entry| entry.id == todo.id) {
            Some(entry) => {
                *entry = todo;
                true
            }
            None => false,
        }
    }
}

/// The records loaded by [fetch_todos()](crate::Actions::fetch_todos()).
pub fn seed_todos() -> Vec<Todo> {
    vec![
        Todo {
            id: TodoId::new(1),
            title: "Buy groceries".to_string(),
            done: false,
        },
        Todo {
            id: TodoId::new(2),
            title: "Walk the dog".to_string(),
            done: true,
        },
        Todo {
            id: TodoId::new(3),
            title: "Write documentation".to_string(),
            done: false,
        },
    ]
}
