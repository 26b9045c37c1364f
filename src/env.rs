// ABOUTME: Scope frames making up the evaluator's environment stack

use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// One lexical scope level: an insertion-ordered mapping from name to
/// value. Redeclaring a name appends a second binding; the newest one
/// wins on lookup. Frames are shared by reference between the evaluator's
/// stack and closure snapshots.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: RefCell<Vec<(String, Value)>>,
}

pub type ScopeRef = Rc<Scope>;

impl Scope {
    pub fn new() -> ScopeRef {
        Rc::new(Scope::default())
    }

    /// Appends a binding to this frame, shadowing earlier bindings of the
    /// same name for subsequent lookups.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().push((name, value));
    }

    /// Looks up `name` in this frame only, newest binding first.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings
            .borrow()
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
    }

    /// Updates the newest binding for `name` in this frame. Returns false
    /// when the frame has no such binding.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        match self
            .bindings
            .borrow_mut()
            .iter_mut()
            .rev()
            .find(|(bound, _)| bound == name)
        {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
