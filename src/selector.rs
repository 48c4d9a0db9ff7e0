use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::state::{ResourcesState, Slice};

type Compute<T> = Box<dyn Fn(&ResourcesState) -> T>;

/// A derived accessor over [`ResourcesState`].
///
/// Remembers the result of its last evaluation together with the versions
/// of the slices it declared. `select` returns that result as long as those
/// versions are unchanged and recomputes otherwise; changes to undeclared
/// slices never trigger work.
pub struct Selector<T> {
    name: &'static str,
    deps: &'static [Slice],
    compute: Compute<T>,
    last: RefCell<Option<(Vec<u64>, Rc<T>)>>,
    recomputations: Cell<usize>,
}

impl<T> Selector<T> {
    pub fn new(
        name: &'static str,
        deps: &'static [Slice],
        compute: impl Fn(&ResourcesState) -> T + 'static,
    ) -> Self {
        Self {
            name,
            deps,
            compute: Box::new(compute),
            last: RefCell::new(None),
            recomputations: Cell::new(0),
        }
    }

    pub fn select(&self, state: &ResourcesState) -> Rc<T> {
        let versions: Vec<u64> = self.deps.iter().map(|s| state.version(*s)).collect();
        if let Some((seen, value)) = self.last.borrow().as_ref() {
            if *seen == versions {
                return Rc::clone(value);
            }
        }

        tracing::debug!("selector {} recomputing", self.name);
        let value = Rc::new((self.compute)(state));
        self.recomputations.set(self.recomputations.get() + 1);
        *self.last.borrow_mut() = Some((versions, Rc::clone(&value)));
        value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dependencies(&self) -> &'static [Slice] {
        self.deps
    }

    /// How many times `select` actually evaluated.
    pub fn recomputations(&self) -> usize {
        self.recomputations.get()
    }
}

impl<T> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("recomputations", &self.recomputations.get())
            .finish()
    }
}
