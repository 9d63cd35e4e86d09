//! Multi-collection transactions.
//!
//! A transaction stages writes in an overlay that reads through to the
//! committed store. Nothing is visible to other readers until the whole
//! transaction succeeds; the overlay is then applied in one step that
//! cannot fail.

mod operation;
mod state;

pub use operation::Operation;
pub use state::{PendingWrite, Transaction};
