// Program model and type-checking service
//
// `Program` loads and binds the sources; the `TypeChecker` trait is the view
// of it the documentation generator works against.

mod binder;
pub mod program;
pub mod resolve;
pub mod symbols;
pub mod types;

pub use program::{Program, SourceFile};
pub use resolve::{FsHost, MemoryHost, ModuleKind, ModuleResolver, SourceHost};
pub use symbols::{AliasTarget, FileScope, Symbol, SymbolFlags, SymbolId};
pub use types::{display_parts_to_string, DisplayPart, DisplayPartKind, Signature, Type};

use crate::error::Result;
use crate::parser::ast::{FileId, NodeId, SyntaxNode};

/// Symbol, type and signature queries over a typed program
pub trait TypeChecker {
    fn source_files(&self) -> &[SourceFile];

    fn source_file(&self, file: FileId) -> &SourceFile;

    /// File the program was created from
    fn root_file(&self) -> &SourceFile;

    fn node(&self, id: NodeId) -> &SyntaxNode;

    /// `path:line` of a node, for diagnostics
    fn location(&self, id: NodeId) -> String;

    /// Symbol declared by `node`. A source file yields its module symbol.
    fn symbol_at_location(&self, node: NodeId) -> Option<SymbolId>;

    /// Exported symbols of a module symbol, possibly aliases
    fn exports_of_module(&self, module: SymbolId) -> Vec<SymbolId>;

    fn symbol(&self, id: SymbolId) -> &Symbol;

    /// Original symbol behind an alias, `None` if it cannot be resolved
    fn aliased_symbol(&self, alias: SymbolId) -> Option<SymbolId>;

    fn documentation_comment(&self, symbol: SymbolId) -> Vec<DisplayPart>;

    fn signature_from_declaration(&self, decl: NodeId) -> Result<Signature>;

    fn signature_to_string(&self, signature: &Signature) -> String;

    fn type_of_symbol_at_location(&self, symbol: SymbolId, node: NodeId) -> Type;

    fn type_to_string(&self, ty: &Type) -> String;
}

impl TypeChecker for Program {
    fn source_files(&self) -> &[SourceFile] {
        Program::source_files(self)
    }

    fn source_file(&self, file: FileId) -> &SourceFile {
        Program::source_file(self, file)
    }

    fn root_file(&self) -> &SourceFile {
        Program::root_file(self)
    }

    fn node(&self, id: NodeId) -> &SyntaxNode {
        Program::node(self, id)
    }

    fn location(&self, id: NodeId) -> String {
        Program::location(self, id)
    }

    fn symbol_at_location(&self, node: NodeId) -> Option<SymbolId> {
        Program::symbol_at_location(self, node)
    }

    fn exports_of_module(&self, module: SymbolId) -> Vec<SymbolId> {
        Program::exports_of_module(self, module)
    }

    fn symbol(&self, id: SymbolId) -> &Symbol {
        Program::symbol(self, id)
    }

    fn aliased_symbol(&self, alias: SymbolId) -> Option<SymbolId> {
        Program::aliased_symbol(self, alias)
    }

    fn documentation_comment(&self, symbol: SymbolId) -> Vec<DisplayPart> {
        Program::documentation_comment(self, symbol)
    }

    fn signature_from_declaration(&self, decl: NodeId) -> Result<Signature> {
        Program::signature_from_declaration(self, decl)
    }

    fn signature_to_string(&self, signature: &Signature) -> String {
        Program::signature_to_string(self, signature)
    }

    fn type_of_symbol_at_location(&self, symbol: SymbolId, node: NodeId) -> Type {
        Program::type_of_symbol_at_location(self, symbol, node)
    }

    fn type_to_string(&self, ty: &Type) -> String {
        Program::type_to_string(self, ty)
    }
}
