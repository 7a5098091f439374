use crate::{middleware::Middleware, produce::produce, AsListener, Listener};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt::Debug,
    ops::Deref,
    rc::Rc,
};

/// Handle for a listener registered with [Store::subscribe()], used
/// to remove it again with [Store::unsubscribe()].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use = "keep the Subscription in order to unsubscribe later"]
pub struct Subscription(u64);

/// A [Listener] registered with the [Store].
struct ListenerEntry<State> {
    subscription: Subscription,
    listener: Listener<State>,
}

impl<State> Debug for ListenerEntry<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListenerEntry({:?})", self.subscription)
    }
}

/// A modification of the [Store] itself, to be stored in a queue and
/// executed at the start of the next update cycle.
enum StoreModification<State> {
    AddListener(ListenerEntry<State>),
    RemoveListener(Subscription),
    AddMiddleware(Rc<dyn Middleware<State>>),
}

/// A queued edit, taking the current snapshot and producing the next
/// one.
type Edit<State> = Box<dyn FnOnce(&Rc<State>) -> Rc<State>>;

/// A wrapper for an [Rc] reference to a [Store].
///
/// This wrapper exists to provide a standard interface for actions,
/// providers and other components which require a long living
/// reference to the store in order to update it or subscribe to it.
pub struct StoreRef<State>(Rc<Store<State>>);

impl<State> StoreRef<State> {
    pub fn new(initial_state: State) -> Self {
        Self(Rc::new(Store::new(initial_state)))
    }
}

impl<State> Clone for StoreRef<State> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<State> Deref for StoreRef<State> {
    type Target = Store<State>;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<State> PartialEq for StoreRef<State> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<State> Debug for StoreRef<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreRef(store @ {:p})", &*self.0)
    }
}

/// This struct is designed to operate as the single source of truth
/// for the "immutable" state of an application.
///
/// The current snapshot ([Store::state()]) can only be replaced by
/// calling [Store::update()] or [Store::apply()]. Snapshots are never
/// mutated; the previous one remains valid for anyone still holding
/// it.
///
/// Listeners subscribe with [Store::subscribe()] and are invoked, in
/// subscription order, every time an update produces a new snapshot.
/// Updates which change nothing are discarded without notifying
/// anybody.
pub struct Store<State> {
    /// This lock is used to prevent update recursion.
    update_lock: RefCell<()>,
    /// Queue of edits to be processed by [Store::apply()].
    update_queue: RefCell<VecDeque<Edit<State>>>,
    /// Queue of [StoreModification]s to be executed before the next
    /// edit is processed.
    modification_queue: RefCell<VecDeque<StoreModification<State>>>,
    /// The current snapshot.
    state: RefCell<Rc<State>>,
    /// The listeners, in subscription order.
    listeners: RefCell<Vec<ListenerEntry<State>>>,
    /// Middleware which modifies the functionality of this store.
    middleware: RefCell<Vec<Rc<dyn Middleware<State>>>>,
    /// Used during recursive execution of [Middleware] to keep track
    /// of the middleware currently executing. It is an index into
    /// [Store::middleware].
    prev_middleware: Cell<i32>,
    next_subscription: Cell<u64>,
}

impl<State> Store<State> {
    /// Create a new [Store] holding `initial_state` as its first
    /// snapshot.
    pub fn new(initial_state: State) -> Self {
        Self {
            update_lock: RefCell::new(()),
            update_queue: RefCell::new(VecDeque::new()),
            modification_queue: RefCell::new(VecDeque::new()),
            state: RefCell::new(Rc::new(initial_state)),
            listeners: RefCell::new(Vec::new()),
            middleware: RefCell::new(Vec::new()),
            prev_middleware: Cell::new(-1),
            next_subscription: Cell::new(0),
        }
    }

    /// Get the current snapshot stored in this store.
    pub fn state(&self) -> Rc<State> {
        self.state.borrow().clone()
    }

    /// Replace the current snapshot without invoking middleware.
    fn commit(&self, next: Option<Rc<State>>) -> Option<Rc<State>> {
        if let Some(next) = &next {
            *self.state.borrow_mut() = next.clone();
        }
        next
    }

    /// Commit `next`, invoking all middleware's
    /// [on_commit()](Middleware::on_commit()) first.
    fn middleware_commit(&self, next: Rc<State>) -> Option<Rc<State>> {
        self.prev_middleware.set(-1);
        self.middleware_commit_next(Some(next))
    }

    /// A recursive function which executes each middleware for this
    /// store, and invokes the next middleware, until all middleware
    /// has been invoked, at which point the snapshot is committed.
    fn middleware_commit_next(&self, next: Option<Rc<State>>) -> Option<Rc<State>> {
        let current_middleware = self.prev_middleware.get() + 1;
        self.prev_middleware.set(current_middleware);

        if current_middleware == self.middleware.borrow().len() as i32 {
            return self.commit(next);
        }

        let middleware = self.middleware.borrow()[current_middleware as usize].clone();
        middleware.on_commit(self, next, Self::middleware_commit_next)
    }

    /// Run all middleware's [on_notify()](Middleware::on_notify()),
    /// returning the snapshot the listeners should receive.
    fn middleware_notify(&self, state: Rc<State>) -> Option<Rc<State>> {
        self.prev_middleware.set(-1);
        self.middleware_notify_next(state)
    }

    fn middleware_notify_next(&self, state: Rc<State>) -> Option<Rc<State>> {
        let current_middleware = self.prev_middleware.get() + 1;
        self.prev_middleware.set(current_middleware);

        if current_middleware == self.middleware.borrow().len() as i32 {
            return Some(state);
        }

        let middleware = self.middleware.borrow()[current_middleware as usize].clone();
        middleware.on_notify(self, state, Self::middleware_notify_next)
    }

    /// Invoke every live listener with `state`, in subscription order,
    /// and forget the listeners whose callback has been dropped.
    fn notify_listeners(&self, state: &Rc<State>) {
        let mut dropped: Vec<Subscription> = Vec::new();

        for entry in self.listeners.borrow().iter() {
            match entry.listener.as_callback() {
                Some(callback) => callback.emit(state.clone()),
                None => dropped.push(entry.subscription),
            }
        }

        if !dropped.is_empty() {
            log::trace!("pruning {} dropped listener(s)", dropped.len());
            self.listeners
                .borrow_mut()
                .retain(|entry| !dropped.contains(&entry.subscription));
        }
    }

    fn process_pending_modifications(&self) {
        while let Some(modification) = self.modification_queue.borrow_mut().pop_front() {
            match modification {
                StoreModification::AddListener(entry) => {
                    self.listeners.borrow_mut().push(entry);
                }
                StoreModification::RemoveListener(subscription) => {
                    self.listeners
                        .borrow_mut()
                        .retain(|entry| entry.subscription != subscription);
                }
                StoreModification::AddMiddleware(middleware) => {
                    self.middleware.borrow_mut().push(middleware);
                }
            }
        }
    }

    /// Run a single edit through the middleware and notify the
    /// listeners if it produced a new snapshot.
    fn run_edit(&self, edit: Edit<State>) {
        let prev_state = self.state();
        let next_state = edit(&prev_state);

        if Rc::ptr_eq(&prev_state, &next_state) {
            log::trace!("update produced no changes, listeners not notified");
            return;
        }

        let committed = if self.middleware.borrow().is_empty() {
            self.commit(Some(next_state))
        } else {
            self.middleware_commit(next_state)
        };

        let committed = match committed {
            Some(committed) => committed,
            None => {
                log::trace!("update vetoed by middleware");
                return;
            }
        };

        let notify_state = if self.middleware.borrow().is_empty() {
            Some(committed)
        } else {
            self.middleware_notify(committed)
        };

        if let Some(state) = notify_state {
            self.notify_listeners(&state);
        }
    }

    /// Update the state by letting `edit` modify a draft of the
    /// current snapshot.
    ///
    /// The draft becomes the new snapshot only if it differs from the
    /// current one, see [produce()](crate::produce()). When nothing
    /// changed the listeners are not notified.
    ///
    /// When called from within a listener or middleware, the update
    /// is queued and processed once the current update has finished.
    pub fn update<F>(&self, edit: F)
    where
        State: Clone + PartialEq + 'static,
        F: FnOnce(&mut State) + 'static,
    {
        self.apply(move |state: &Rc<State>| produce(state, edit));
    }

    /// Update the state with a function mapping the current snapshot
    /// to the next one. Returning the same [Rc] (by pointer) is
    /// treated as "no change" and does not notify the listeners.
    pub fn apply<F>(&self, f: F)
    where
        State: 'static,
        F: FnOnce(&Rc<State>) -> Rc<State> + 'static,
    {
        self.apply_impl(Box::new(f));
    }

    /// Concrete version of [Store::apply()], to avoid generating
    /// multiple versions of the update loop per closure type.
    fn apply_impl(&self, edit: Edit<State>) {
        self.update_queue.borrow_mut().push_back(edit);

        // If the lock fails to acquire, then an update is already in
        // progress, and will pick this edit up from the queue.
        if let Ok(_lock) = self.update_lock.try_borrow_mut() {
            loop {
                let edit = self.update_queue.borrow_mut().pop_front();

                match edit {
                    Some(edit) => {
                        self.process_pending_modifications();
                        self.run_edit(edit);
                    }
                    None => break,
                }
            }
        }
    }

    /// Subscribe a [Listener] to new snapshots produced by this
    /// store.
    ///
    /// The listener is a weak reference; when the strong reference
    /// associated with it (usually [Callback](crate::Callback)) is
    /// dropped, the listener will be removed from this store upon the
    /// next notification. The subscription takes effect at the start
    /// of the next update.
    pub fn subscribe<L: AsListener<State>>(&self, listener: L) -> Subscription {
        let subscription = Subscription(self.next_subscription.get());
        self.next_subscription.set(subscription.0 + 1);

        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddListener(ListenerEntry {
                subscription,
                listener: listener.as_listener(),
            }));

        subscription
    }

    /// Remove a listener previously registered with
    /// [Store::subscribe()]. Takes effect at the start of the next
    /// update.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::RemoveListener(subscription));
    }

    /// Add [Middleware] to modify the behaviour of this [Store]
    /// during an update.
    pub fn add_middleware<M: Middleware<State> + 'static>(&self, middleware: M) {
        self.modification_queue
            .borrow_mut()
            .push_back(StoreModification::AddMiddleware(Rc::new(middleware)));
    }
}
