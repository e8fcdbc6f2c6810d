//! Publish-once memo cells
//!
//! Racing initializers may each compute a value; the first to publish wins
//! and everyone else drops their copy and returns the winner's. Failed
//! computations publish nothing, so a later call retries.

use once_cell::race::OnceBox;
use std::fmt;

use modview_core::errors::Result;

pub struct Memo<T> {
    cell: OnceBox<T>,
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceBox::new(),
        }
    }

    /// Published value, if any
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(|| Box::new(f()))
    }

    /// # Errors
    ///
    /// Whatever `f` returns; the cell stays empty.
    pub fn get_or_try_init<F>(&self, f: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.cell.get_or_try_init(|| f().map(Box::new))
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Memo").field(value).finish(),
            None => f.write_str("Memo(<pending>)"),
        }
    }
}
