use crate::{
    error::{Error, Result},
    provider::{Provider, Selector},
    views::{select_editor, select_list, TodoEditorView, TodoListView},
    Actions, AppState, Config, StoreRef, TodoId, TodoPatch,
};

/// The todo application: a store, the actions operating on it, and
/// the list and editor views mounted against it.
///
/// Interactions are routed through the editor's gating rules: while a
/// save or delete is in flight the editor rejects input with
/// [Error::Busy].
pub struct App {
    actions: Actions,
    list: Provider<AppState, TodoListView>,
    editor: Provider<AppState, TodoEditorView>,
}

impl App {
    /// Create the application with an empty state.
    pub fn new(config: Config) -> Self {
        Self::with_store(StoreRef::new(AppState::default()), config)
    }

    /// Create the application around an existing store, for example
    /// one with middleware already added.
    pub fn with_store(store: StoreRef<AppState>, config: Config) -> Self {
        let list = Provider::mount(&store, TodoListView, Selector::new(select_list));
        let editor = Provider::mount(&store, TodoEditorView, Selector::new(select_editor));

        Self {
            actions: Actions::new(store, config),
            list,
            editor,
        }
    }

    pub fn store(&self) -> &StoreRef<AppState> {
        self.actions.store()
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn list(&self) -> &Provider<AppState, TodoListView> {
        &self.list
    }

    pub fn editor(&self) -> &Provider<AppState, TodoEditorView> {
        &self.editor
    }

    /// The current output of both views.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.list.output(), self.editor.output())
    }

    /// Load the todo list.
    pub async fn mount(&self) -> Result<()> {
        self.actions.fetch_todos().await
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.editor.props().controls_enabled() {
            Ok(())
        } else {
            Err(Error::Busy)
        }
    }

    pub fn input_title(&self, title: &str) -> Result<()> {
        self.ensure_editable()?;
        self.actions.update_todo(TodoPatch::title(title));
        Ok(())
    }

    pub fn toggle_done(&self) -> Result<()> {
        self.ensure_editable()?;
        let done = !self.editor.props().todo.done;
        self.actions.update_todo(TodoPatch::done(done));
        Ok(())
    }

    pub async fn submit(&self) -> Result<TodoId> {
        self.ensure_editable()?;
        self.actions.save_todo().await
    }

    /// Delete the todo in the editor. Only available for todos which
    /// were saved before.
    pub async fn delete(&self) -> Result<()> {
        self.ensure_editable()?;
        let todo = self.editor.props().todo.to_todo().ok_or(Error::Unsaved)?;
        self.actions.remove_todo(&todo).await
    }

    /// Load the listed todo with `id` into the editor.
    pub fn select(&self, id: TodoId) -> Result<()> {
        let todo = self
            .list
            .props()
            .todos
            .into_iter()
            .find(|todo| todo.id == id)
            .ok_or(Error::NotFound(id))?;
        self.actions.select_todo(&todo);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::{error::Error, Config, TodoId};
    use std::time::Duration;

    fn app() -> App {
        App::new(Config::new().latency(Duration::from_millis(100)))
    }

    #[tokio::test(start_paused = true)]
    async fn mount_shows_loading_then_list() {
        let app = app();
        assert_eq!("0 of 0 completed", app.list().output());

        let fetch = app.mount();
        tokio::pin!(fetch);
        assert!(tokio::time::timeout(Duration::from_millis(1), &mut fetch)
            .await
            .is_err());
        assert_eq!("Loading", app.list().output());

        fetch.await.expect("fetch succeeds");
        assert_eq!(
            "[ ] Buy groceries\n[x] Walk the dog\n[ ] Write documentation\n1 of 3 completed",
            app.list().output()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submit_adds_todo_to_list() {
        let app = app();
        app.mount().await.expect("fetch succeeds");

        app.input_title("Feed the cat").expect("editor enabled");
        assert_eq!("title: Feed the cat\n[ ] done\n[save]", app.editor().output());

        let id = app.submit().await.expect("save succeeds");
        assert_eq!(TodoId::new(4), id);
        assert!(app.list().output().contains("[ ] Feed the cat"));
        assert!(app.list().output().ends_with("1 of 4 completed"));
        assert_eq!("title: \n[ ] done\n[save]", app.editor().output());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_on_selected_todo_updates_list_immediately() {
        let app = app();
        app.mount().await.expect("fetch succeeds");

        app.select(TodoId::new(1)).expect("todo is listed");
        app.toggle_done().expect("editor enabled");

        assert!(app.list().output().starts_with("[x] Buy groceries"));
        assert!(app.editor().output().contains("[delete]"));
    }

    #[tokio::test(start_paused = true)]
    async fn editor_is_busy_while_saving() {
        let app = app();
        app.mount().await.expect("fetch succeeds");
        app.input_title("Feed the cat").expect("editor enabled");

        let save = app.submit();
        tokio::pin!(save);
        assert!(tokio::time::timeout(Duration::from_millis(1), &mut save)
            .await
            .is_err());

        assert!(app.editor().output().contains("[save] (disabled)"));
        assert_eq!(Err(Error::Busy), app.input_title("Changed my mind"));
        assert_eq!(Err(Error::Busy), app.toggle_done());

        save.await.expect("save succeeds");
        assert!(app.input_title("Next").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_removes_selected_todo() {
        let app = app();
        app.mount().await.expect("fetch succeeds");

        app.select(TodoId::new(2)).expect("todo is listed");
        app.delete().await.expect("delete succeeds");

        assert!(!app.list().output().contains("Walk the dog"));
        assert!(!app.editor().output().contains("[delete]"));
        assert!(!app.store().state().saving);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_requires_saved_todo() {
        let app = app();
        app.input_title("Not saved").expect("editor enabled");
        assert_eq!(Err(Error::Unsaved), app.delete().await);
    }

    #[test]
    fn select_unknown_todo_fails() {
        let app = app();
        assert_eq!(Err(Error::NotFound(TodoId::new(9))), app.select(TodoId::new(9)));
    }

    #[test]
    fn unchanged_input_does_not_rerender() {
        let app = app();
        app.input_title("Same").expect("editor enabled");
        let renders = app.editor().render_count();

        app.input_title("Same").expect("editor enabled");
        assert_eq!(renders, app.editor().render_count());
        assert_eq!(1, app.list().render_count());
    }
}
