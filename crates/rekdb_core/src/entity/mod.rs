//! Records and the in-process record store.

mod record;
mod store;

pub use record::{Attributes, NewRecord, Patch, Record, RESERVED_FIELDS};
pub use store::RecordStore;
