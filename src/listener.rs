use std::rc::{Rc, Weak};

/// A trait to take a [Callback] or other custom callback type and
/// produce a [Listener], a weak reference to that callback.
pub trait AsListener<State> {
    /// Produce a [Listener], a weak reference to this callback.
    fn as_listener(&self) -> Listener<State>;
}

/// A weak reference to a callback function (usually [Callback]) which
/// is notified of new [Store](crate::Store) snapshots.
#[derive(Clone)]
pub struct Listener<State>(Weak<dyn Fn(Rc<State>)>);

impl<State> Listener<State> {
    /// Attempt to upgrade the weak reference in this listener to a
    /// [Callback], otherwise if unable to, returns `None`.
    pub fn as_callback(&self) -> Option<Callback<State>> {
        self.0.upgrade().map(Callback)
    }
}

impl<State> AsListener<State> for Listener<State> {
    fn as_listener(&self) -> Listener<State> {
        Listener(self.0.clone())
    }
}

/// A wrapper for a callback which is notified of new
/// [Store](crate::Store) snapshots.
///
/// The store only keeps a weak reference, so the subscription lives
/// exactly as long as the owner keeps this callback alive.
#[derive(Clone)]
pub struct Callback<State>(Rc<dyn Fn(Rc<State>)>);

impl<State> AsListener<State> for &Callback<State> {
    fn as_listener(&self) -> Listener<State> {
        Listener(Rc::downgrade(&self.0))
    }
}

impl<State> Callback<State> {
    pub fn new<C: Fn(Rc<State>) + 'static>(closure: C) -> Self {
        Callback(Rc::new(closure))
    }

    pub fn emit(&self, state: Rc<State>) {
        (self.0)(state)
    }
}

impl<C, State> From<C> for Callback<State>
where
    C: Fn(Rc<State>) + 'static,
{
    fn from(closure: C) -> Self {
        Callback(Rc::new(closure))
    }
}
