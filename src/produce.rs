//! The immutable-update helper used by [Store::update()](crate::Store::update()).

use std::rc::Rc;

/// Produce the next snapshot of `base` by letting `recipe` edit a
/// draft copy of it.
///
/// `base` itself is never modified. When the edited draft compares
/// equal to `base`, the draft is discarded and a clone of the `base`
/// [Rc] is returned, so callers can detect a no-op edit with
/// [Rc::ptr_eq()].
pub fn produce<State, F>(base: &Rc<State>, recipe: F) -> Rc<State>
where
    State: Clone + PartialEq,
    F: FnOnce(&mut State),
{
    let mut draft = State::clone(base);
    recipe(&mut draft);

    if draft == **base {
        base.clone()
    } else {
        Rc::new(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::produce;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    struct TestState {
        counter: i32,
        names: Vec<String>,
    }

    fn base() -> Rc<TestState> {
        Rc::new(TestState {
            counter: 1,
            names: vec!["a".to_string()],
        })
    }

    #[test]
    fn edit_produces_new_snapshot() {
        let base = base();
        let next = produce(&base, |draft| draft.names.push("b".to_string()));

        assert!(!Rc::ptr_eq(&base, &next));
        assert_eq!(vec!["a".to_string()], base.names);
        assert_eq!(vec!["a".to_string(), "b".to_string()], next.names);
    }

    #[test]
    fn untouched_draft_returns_base() {
        let base = base();
        let next = produce(&base, |_| {});
        assert!(Rc::ptr_eq(&base, &next));
    }

    #[test]
    fn edit_that_restores_value_returns_base() {
        let base = base();
        let next = produce(&base, |draft| {
            draft.counter += 1;
            draft.counter -= 1;
        });
        assert!(Rc::ptr_eq(&base, &next));
    }
}
