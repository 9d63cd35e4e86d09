//! Typed entity kinds and the schema boundary.

mod codec;
mod schema;
mod typed;

pub use codec::{Entity, EntityKind, KeyStrategy};
pub use schema::{KindSchema, Schema, SchemaRegistry};
pub use typed::Collection;
