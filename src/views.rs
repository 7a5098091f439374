//! The todo list and editor views, and the selectors feeding them.

use crate::{provider::View, AppState, Todo, TodoDraft};

const DISABLED: &str = " (disabled)";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListProps {
    pub loading: bool,
    pub todos: Vec<Todo>,
}

impl ListProps {
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.done).count()
    }
}

pub fn select_list(state: &AppState) -> ListProps {
    ListProps {
        loading: state.loading,
        todos: state.todos.clone(),
    }
}

/// Shows `Loading` while a fetch is in flight, otherwise every todo
/// followed by a count of the completed ones.
#[derive(Debug, Default)]
pub struct TodoListView;

impl View for TodoListView {
    type Props = ListProps;

    fn render(&self, props: &ListProps) -> String {
        if props.loading {
            return "Loading".to_string();
        }

        let mut lines: Vec<String> = props
            .todos
            .iter()
            .map(|todo| format!("{} {}", checkbox(todo.done), todo.title))
            .collect();
        lines.push(format!(
            "{} of {} completed",
            props.completed_count(),
            props.todos.len()
        ));
        lines.join("\n")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorProps {
    pub todo: TodoDraft,
    pub saving: bool,
}

impl EditorProps {
    /// Inputs and buttons are disabled while a save or delete is in
    /// flight.
    pub fn controls_enabled(&self) -> bool {
        !self.saving
    }

    /// Only todos which were saved before can be deleted.
    pub fn can_delete(&self) -> bool {
        self.todo.id.is_some()
    }
}

pub fn select_editor(state: &AppState) -> EditorProps {
    EditorProps {
        todo: state.todo.clone(),
        saving: state.saving,
    }
}

/// The form bound to the todo being edited.
#[derive(Debug, Default)]
pub struct TodoEditorView;

impl View for TodoEditorView {
    type Props = EditorProps;

    fn render(&self, props: &EditorProps) -> String {
        let suffix = if props.controls_enabled() { "" } else { DISABLED };

        let mut lines = vec![
            format!("title: {}{}", props.todo.title, suffix),
            format!("{} done{}", checkbox(props.todo.done), suffix),
            format!("[save]{}", suffix),
        ];
        if props.can_delete() {
            lines.push(format!("[delete]{}", suffix));
        }
        lines.join("\n")
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}
