#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::Cell;

/// Room for a single page-wide object. A failed construction leaves the slot
/// free for another attempt.
pub struct PageSlot {
    taken: Cell<bool>,
}

impl PageSlot {
    pub const fn new() -> Self {
        Self {
            taken: Cell::new(false),
        }
    }

    /// Run `build` unless the slot is already taken, in which case the error
    /// from `taken` is returned.
    pub fn fill<T, E>(
        &self,
        build: impl FnOnce() -> Result<T, E>,
        taken: impl FnOnce() -> E,
    ) -> Result<T, E> {
        if self.taken.replace(true) {
            return Err(taken());
        }
        let built = build();
        if built.is_err() {
            self.taken.set(false);
        }
        built
    }
}
