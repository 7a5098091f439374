//! Mounting [View]s against a [Store](crate::Store).
//!
//! A [Provider] owns the subscription of one view. It uses a
//! [Selector] to map every new snapshot to the props of its view, and
//! only renders the view again when those props changed.

use crate::{Callback, StoreRef, Subscription};
use std::{
    cell::{Cell, RefCell},
    fmt::Debug,
    rc::{Rc, Weak},
};

/// A presentational component, rendering its props as text.
pub trait View {
    type Props: Clone + PartialEq;

    fn render(&self, props: &Self::Props) -> String;
}

/// A pure function mapping the whole state to the props needed by a
/// single [View].
pub struct Selector<State, Props>(fn(&State) -> Props);

impl<State, Props> Selector<State, Props> {
    pub fn new(function: fn(&State) -> Props) -> Self {
        Self(function)
    }

    pub fn select(&self, state: &State) -> Props {
        (self.0)(state)
    }
}

impl<State, Props> Clone for Selector<State, Props> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<State, Props> PartialEq for Selector<State, Props> {
    fn eq(&self, other: &Selector<State, Props>) -> bool {
        (self.0 as *const ()) == (other.0 as *const ())
    }
}

impl<State, Props> Debug for Selector<State, Props> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Selector(function @ {:p})", self.0 as *const ())
    }
}

/// The part of a [Provider] shared with its store callback.
struct Mounted<State, V: View> {
    view: V,
    selector: Selector<State, V::Props>,
    props: RefCell<V::Props>,
    output: RefCell<String>,
    renders: Cell<usize>,
}

impl<State, V: View> Mounted<State, V> {
    /// Select the props from `state`, rendering the view if they
    /// changed. Returns whether the view was rendered.
    fn state_update(&self, state: &State) -> bool {
        let props = self.selector.select(state);
        if *self.props.borrow() == props {
            return false;
        }

        *self.output.borrow_mut() = self.view.render(&props);
        *self.props.borrow_mut() = props;
        self.renders.set(self.renders.get() + 1);
        true
    }
}

/// A container which keeps a [View] in sync with a store.
///
/// The view is rendered once when mounted, and again whenever a new
/// snapshot selects different props. Dropping the provider ends its
/// subscription.
pub struct Provider<State, V: View> {
    mounted: Rc<Mounted<State, V>>,
    store: StoreRef<State>,
    subscription: Subscription,
    _callback: Callback<State>,
}

impl<State, V> Provider<State, V>
where
    State: 'static,
    V: View + 'static,
{
    pub fn mount(store: &StoreRef<State>, view: V, selector: Selector<State, V::Props>) -> Self {
        let props = selector.select(&store.state());
        let output = view.render(&props);

        let mounted = Rc::new(Mounted {
            view,
            selector,
            props: RefCell::new(props),
            output: RefCell::new(output),
            renders: Cell::new(1),
        });

        let weak_mounted: Weak<Mounted<State, V>> = Rc::downgrade(&mounted);
        let callback: Callback<State> = Callback::new(move |state: Rc<State>| {
            if let Some(mounted) = weak_mounted.upgrade() {
                mounted.state_update(&state);
            }
        });
        let subscription = store.subscribe(&callback);

        Self {
            mounted,
            store: store.clone(),
            subscription,
            _callback: callback,
        }
    }
}

impl<State, V: View> Provider<State, V> {
    /// The props the view was last rendered with.
    pub fn props(&self) -> V::Props {
        self.mounted.props.borrow().clone()
    }

    /// The most recent render of the view.
    pub fn output(&self) -> String {
        self.mounted.output.borrow().clone()
    }

    /// How many times the view has been rendered, including the
    /// initial render on mount.
    pub fn render_count(&self) -> usize {
        self.mounted.renders.get()
    }
}

impl<State, V: View> Drop for Provider<State, V> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
