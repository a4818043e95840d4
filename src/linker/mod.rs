pub mod foreign_key;

pub use foreign_key::{ForeignKeyLinker, ForeignKeyLinkerStats};
