// Parser module for lowering TypeScript sources into a syntax arena

pub mod ast;
pub mod jsdoc;
mod typescript;

pub use ast::*;
pub use jsdoc::{JsDoc, JsDocTag};
pub use typescript::{TsVariant, TypeScriptParser};
