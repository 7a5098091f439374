//! Action functions which drive the [AppState] through the
//! [Store](crate::Store), some of them after a simulated latency.

use crate::{
    error::{Error, Operation, Result},
    state::seed_todos,
    AppState, Config, StoreRef, Todo, TodoDraft, TodoId, TodoPatch,
};
use tokio::time::{sleep, timeout};

/// The state flag raised while an operation is in flight.
#[derive(Clone, Copy, Debug)]
enum Flag {
    Loading,
    Saving,
}

impl Flag {
    fn field(self, state: &mut AppState) -> &mut bool {
        match self {
            Flag::Loading => &mut state.loading,
            Flag::Saving => &mut state.saving,
        }
    }
}

/// Raises a [Flag] when created and lowers it again when dropped, so
/// that failed or cancelled operations never leave it raised.
///
/// Successful operations lower the flag in their final update, which
/// turns the reset on drop into a no-op update.
struct InFlight {
    store: StoreRef<AppState>,
    flag: Flag,
}

impl InFlight {
    fn begin(store: &StoreRef<AppState>, flag: Flag) -> Self {
        store.update(move |state: &mut AppState| *flag.field(state) = true);
        Self {
            store: store.clone(),
            flag,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let flag = self.flag;
        self.store
            .update(move |state: &mut AppState| *flag.field(state) = false);
    }
}

/// The operations available to the views.
///
/// Concurrent operations are not serialized against each other; they
/// resolve in the order their timers fire.
pub struct Actions {
    store: StoreRef<AppState>,
    config: Config,
}

impl Actions {
    pub fn new(store: StoreRef<AppState>, config: Config) -> Self {
        Self {
            store,
            config,
        }
    }

    pub fn store(&self) -> &StoreRef<AppState> {
        &self.store
    }

    /// Wait for the configured latency, failing if it exceeds the
    /// configured timeout.
    async fn simulate(&self, operation: Operation) -> Result<()> {
        let latency = sleep(self.config.latency);

        match self.config.timeout {
            Some(limit) => timeout(limit, latency).await.map_err(|_| {
                log::warn!("{} timed out after {:?}", operation, limit);
                Error::Timeout { operation, limit }
            }),
            None => {
                latency.await;
                Ok(())
            }
        }
    }

    /// Load the todo list, raising `loading` while the fetch is in
    /// flight.
    pub async fn fetch_todos(&self) -> Result<()> {
        log::debug!("fetching todos");
        let _in_flight = InFlight::begin(&self.store, Flag::Loading);
        self.simulate(Operation::Fetch).await?;

        let todos = seed_todos();
        let count = todos.len();
        self.store.update(move |state: &mut AppState| {
            state.todos = todos;
            state.loading = false;
        });

        log::info!("fetched {} todos", count);
        Ok(())
    }

    /// Save the todo in the editor, appending it to the list if it is
    /// new, or replacing the entry with the same id otherwise. The
    /// editor is reset afterwards.
    ///
    /// The draft is captured when the save starts; edits made while
    /// the save is in flight are not saved.
    pub async fn save_todo(&self) -> Result<TodoId> {
        let draft = self.store.state().todo.clone();
        if draft.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }

        log::debug!("saving todo {:?}", draft.title);
        let _in_flight = InFlight::begin(&self.store, Flag::Saving);
        self.simulate(Operation::Save).await?;

        let state = self.store.state();
        let id = match draft.id {
            Some(id) if state.find(id).is_none() => {
                log::warn!("todo {} was removed before it could be saved", id);
                return Err(Error::NotFound(id));
            }
            Some(id) => id,
            None => state.next_id(),
        };

        let saved = Todo {
            id,
            title: draft.title,
            done: draft.done,
        };
        self.store.update(move |state: &mut AppState| {
            state.last_id = state.last_id.max(saved.id.get());
            if !state.replace(saved.clone()) {
                state.todos.push(saved);
            }
            state.todo = TodoDraft::default();
            state.saving = false;
        });

        log::info!("saved todo {}", id);
        Ok(id)
    }

    /// Remove `todo` from the list and reset the editor.
    pub async fn remove_todo(&self, todo: &Todo) -> Result<()> {
        let id = todo.id;

        log::debug!("removing todo {}", id);
        let _in_flight = InFlight::begin(&self.store, Flag::Saving);
        self.simulate(Operation::Remove).await?;

        self.store.update(move |state: &mut AppState| {
            state.todos.retain(|todo| todo.id != id);
            state.todo = TodoDraft::default();
            state.saving = false;
        });

        log::info!("removed todo {}", id);
        Ok(())
    }

    /// Merge `patch` into the todo in the editor. A todo which was
    /// saved before is updated in the list straight away.
    pub fn update_todo(&self, patch: TodoPatch) {
        self.store.update(move |state: &mut AppState| {
            state.todo.apply(patch);
            if let Some(todo) = state.todo.to_todo() {
                state.replace(todo);
            }
        });
    }

    /// Load `todo` into the editor, replacing whatever was there.
    pub fn select_todo(&self, todo: &Todo) {
        let draft = TodoDraft::from(todo);
        self.store
            .update(move |state: &mut AppState| state.todo = draft);
    }
}

#[cfg(test)]
mod tests {
    use super::Actions;
    use crate::{
        error::{Error, Operation},
        AppState, Callback, Config, StoreRef, TodoDraft, TodoId, TodoPatch,
    };
    use std::{cell::RefCell, rc::Rc, time::Duration};

    const LATENCY: Duration = Duration::from_millis(100);

    fn actions(config: Config) -> Actions {
        Actions::new(StoreRef::new(AppState::default()), config)
    }

    /// Records `(loading, saving)` of every snapshot the store
    /// publishes.
    fn record_flags(
        store: &StoreRef<AppState>,
    ) -> (Callback<AppState>, Rc<RefCell<Vec<(bool, bool)>>>) {
        let record = Rc::new(RefCell::new(Vec::new()));
        let record_copy = record.clone();
        let callback = Callback::new(move |state: Rc<AppState>| {
            record_copy
                .borrow_mut()
                .push((state.loading, state.saving));
        });
        let _subscription = store.subscribe(&callback);
        (callback, record)
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_replaces_todos_and_clears_loading() {
        let actions = actions(Config::new().latency(LATENCY));
        let (_callback, record) = record_flags(actions.store());

        actions.fetch_todos().await.expect("fetch succeeds");

        let state = actions.store().state();
        assert_eq!(3, state.todos.len());
        assert!(!state.loading);
        assert_eq!(vec![(true, false), (false, false)], *record.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_for_latency() {
        let actions = actions(Config::new().latency(LATENCY));
        let started = tokio::time::Instant::now();

        actions.fetch_todos().await.expect("fetch succeeds");
        assert!(started.elapsed() >= LATENCY);
    }

    #[tokio::test(start_paused = true)]
    async fn save_new_todo_appends() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.fetch_todos().await.expect("fetch succeeds");
        actions.update_todo(TodoPatch {
            title: Some("Feed the cat".to_string()),
            done: Some(true),
        });

        let (_callback, record) = record_flags(actions.store());
        let id = actions.save_todo().await.expect("save succeeds");

        let state = actions.store().state();
        assert_eq!(4, state.todos.len());
        let saved = state.todos.last().expect("saved todo");
        assert_eq!(id, saved.id);
        assert_eq!("Feed the cat", saved.title);
        assert!(saved.done);
        assert_eq!(TodoDraft::default(), state.todo);
        assert!(!state.saving);
        assert_eq!(vec![(false, true), (false, false)], *record.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn save_existing_todo_replaces_entry() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.fetch_todos().await.expect("fetch succeeds");

        let first = actions.store().state().todos[0].clone();
        actions.select_todo(&first);
        actions.update_todo(TodoPatch::title("Buy more groceries"));

        let id = actions.save_todo().await.expect("save succeeds");

        let state = actions.store().state();
        assert_eq!(first.id, id);
        assert_eq!(3, state.todos.len());
        assert_eq!("Buy more groceries", state.todos[0].title);
        assert_eq!(TodoDraft::default(), state.todo);
    }

    #[tokio::test(start_paused = true)]
    async fn save_rejects_blank_title() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.update_todo(TodoPatch::title("   "));

        let (_callback, record) = record_flags(actions.store());
        assert_eq!(Err(Error::EmptyTitle), actions.save_todo().await);

        let state = actions.store().state();
        assert!(!state.saving);
        assert_eq!("   ", state.todo.title);
        assert!(record.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn remove_filters_todo() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.fetch_todos().await.expect("fetch succeeds");

        let second = actions.store().state().todos[1].clone();
        actions.select_todo(&second);
        actions.remove_todo(&second).await.expect("remove succeeds");

        let state = actions.store().state();
        assert_eq!(2, state.todos.len());
        assert!(state.find(second.id).is_none());
        assert!(!state.saving);
        assert_eq!(TodoDraft::default(), state.todo);
    }

    #[tokio::test(start_paused = true)]
    async fn update_done_propagates_synchronously() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.fetch_todos().await.expect("fetch succeeds");

        let first = actions.store().state().todos[0].clone();
        assert!(!first.done);
        actions.select_todo(&first);
        actions.update_todo(TodoPatch::done(true));

        let state = actions.store().state();
        assert!(state.todo.done);
        assert!(state.todos[0].done);
        assert_eq!(first.title, state.todos[0].title);
    }

    #[tokio::test(start_paused = true)]
    async fn update_new_draft_leaves_list_alone() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.fetch_todos().await.expect("fetch succeeds");
        let before = actions.store().state().todos.clone();

        actions.update_todo(TodoPatch::title("Buy groceries"));

        let state = actions.store().state();
        assert_eq!("Buy groceries", state.todo.title);
        assert_eq!(before, state.todos);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_never_reused() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.fetch_todos().await.expect("fetch succeeds");

        actions.update_todo(TodoPatch::title("First"));
        let first = actions.save_todo().await.expect("save succeeds");
        assert_eq!(TodoId::new(4), first);

        let saved = actions.store().state().todos[3].clone();
        actions.remove_todo(&saved).await.expect("remove succeeds");

        actions.update_todo(TodoPatch::title("Second"));
        let second = actions.save_todo().await.expect("save succeeds");
        assert_eq!(TodoId::new(5), second);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_never_reused_across_actions() {
        let store = StoreRef::new(AppState::default());
        let first = Actions::new(store.clone(), Config::new().latency(LATENCY));
        let second = Actions::new(store.clone(), Config::new().latency(LATENCY));
        first.fetch_todos().await.expect("fetch succeeds");

        first.update_todo(TodoPatch::title("From first"));
        let a = first.save_todo().await.expect("save succeeds");

        second.update_todo(TodoPatch::title("From second"));
        let b = second.save_todo().await.expect("save succeeds");
        let removed = store.state().find(b).cloned().expect("saved todo");
        second.remove_todo(&removed).await.expect("remove succeeds");

        first.update_todo(TodoPatch::title("From first again"));
        let c = first.save_todo().await.expect("save succeeds");

        assert_eq!(TodoId::new(4), a);
        assert_eq!(TodoId::new(5), b);
        assert_eq!(TodoId::new(6), c);
        assert_eq!(6, store.state().last_id);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_lowers_flag_and_keeps_state() {
        let timeout = Duration::from_millis(50);
        let actions = actions(Config::new().latency(LATENCY).timeout(timeout));
        actions.update_todo(TodoPatch::title("Too slow"));

        let result = actions.save_todo().await;
        assert_eq!(
            Err(Error::Timeout {
                operation: Operation::Save,
                limit: timeout,
            }),
            result
        );

        let state = actions.store().state();
        assert!(!state.saving);
        assert!(state.todos.is_empty());
        assert_eq!("Too slow", state.todo.title);

        assert!(actions.fetch_todos().await.is_err());
        assert!(!actions.store().state().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_save_lowers_flag() {
        let actions = actions(Config::new().latency(LATENCY));
        actions.update_todo(TodoPatch::title("Never saved"));

        let cancelled =
            tokio::time::timeout(Duration::from_millis(10), actions.save_todo()).await;
        assert!(cancelled.is_err());

        let state = actions.store().state();
        assert!(!state.saving);
        assert!(state.todos.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn save_of_removed_todo_fails() {
        let store = StoreRef::new(AppState::default());
        let slow = Actions::new(store.clone(), Config::new().latency(LATENCY));
        let fast = Actions::new(store.clone(), Config::new().latency(LATENCY / 2));
        fast.fetch_todos().await.expect("fetch succeeds");

        let first = store.state().todos[0].clone();
        slow.select_todo(&first);

        let (saved, removed) = tokio::join!(slow.save_todo(), fast.remove_todo(&first));

        assert_eq!(Err(Error::NotFound(first.id)), saved);
        assert_eq!(Ok(()), removed);
        let state = store.state();
        assert!(state.find(first.id).is_none());
        assert!(!state.saving);
    }
}
