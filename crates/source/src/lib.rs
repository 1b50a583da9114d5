//! Backend row access and boundary coercion into entity snapshots.

pub mod file;
pub mod memory;
pub mod row;
pub mod snapshot;
pub mod source;

pub use file::JsonFileSource;
pub use memory::MemorySource;
pub use row::RawRow;
pub use source::{Collection, SnapshotSource};
