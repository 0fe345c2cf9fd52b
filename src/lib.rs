//! gendoc - Generate API documentation entries from TypeScript modules
//!
//! Loads a root TypeScript file together with the local modules it imports,
//! then walks outward from its exports. Every class, function and method
//! reachable through exports and through the types used in their signatures
//! becomes a flat JSON documentation entry.

pub mod checker;
pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod output;
pub mod parser;

// Re-export main types
pub use checker::{Program, TypeChecker};
pub use config::Config;
pub use docs::{generate, ArgEntry, DocEntry, EntryKind, GenerateOptions, Generator};
pub use error::{Error, Result};
pub use output::JsonWriter;
