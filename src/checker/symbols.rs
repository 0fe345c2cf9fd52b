// Symbol table

use crate::parser::ast::{FileId, NodeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Index of a symbol in the `SymbolTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol declares
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymbolFlags(u32);

impl SymbolFlags {
    pub const NONE: Self = Self(0);
    pub const VARIABLE: Self = Self(1 << 0);
    pub const FUNCTION: Self = Self(1 << 1);
    pub const CLASS: Self = Self(1 << 2);
    pub const INTERFACE: Self = Self(1 << 3);
    pub const TYPE_ALIAS: Self = Self(1 << 4);
    pub const ENUM: Self = Self(1 << 5);
    pub const MODULE: Self = Self(1 << 6);
    /// Import binding or re-export standing for another symbol
    pub const ALIAS: Self = Self(1 << 7);
    pub const METHOD: Self = Self(1 << 8);
    pub const PROPERTY: Self = Self(1 << 9);
    pub const CONSTRUCTOR: Self = Self(1 << 10);
    pub const GET_ACCESSOR: Self = Self(1 << 11);
    pub const SET_ACCESSOR: Self = Self(1 << 12);
    pub const PARAMETER: Self = Self(1 << 13);
    pub const SIGNATURE: Self = Self(1 << 14);
    /// Anonymous `{ ... }` type or function type
    pub const TYPE_LITERAL: Self = Self(1 << 15);
    pub const OBJECT_LITERAL: Self = Self(1 << 16);

    /// Declarations usable in a type position
    pub const TYPE: Self = Self(
        Self::CLASS.0 | Self::INTERFACE.0 | Self::TYPE_ALIAS.0 | Self::ENUM.0 | Self::TYPE_LITERAL.0,
    );

    const NAMES: [(SymbolFlags, &'static str); 17] = [
        (Self::VARIABLE, "Variable"),
        (Self::FUNCTION, "Function"),
        (Self::CLASS, "Class"),
        (Self::INTERFACE, "Interface"),
        (Self::TYPE_ALIAS, "TypeAlias"),
        (Self::ENUM, "Enum"),
        (Self::MODULE, "Module"),
        (Self::ALIAS, "Alias"),
        (Self::METHOD, "Method"),
        (Self::PROPERTY, "Property"),
        (Self::CONSTRUCTOR, "Constructor"),
        (Self::GET_ACCESSOR, "GetAccessor"),
        (Self::SET_ACCESSOR, "SetAccessor"),
        (Self::PARAMETER, "Parameter"),
        (Self::SIGNATURE, "Signature"),
        (Self::TYPE_LITERAL, "TypeLiteral"),
        (Self::OBJECT_LITERAL, "ObjectLiteral"),
    ];

    /// All bits of `other` are set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Any bit of `other` is set
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SymbolFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SymbolFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SymbolFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

/// What an alias symbol stands for, resolved lazily once every file is bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// `export { a as b }` or `export default a` naming a local of `file`
    Local { file: FileId, name: String },
    /// Binding imported from, or re-exported from, `specifier` as written in `file`.
    /// `imported` is an export name, `default`, or `*` for the whole module.
    Module {
        file: FileId,
        specifier: String,
        imported: String,
    },
}

/// A named entity of the program
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub flags: SymbolFlags,
    /// Declaration nodes in source order
    pub declarations: Vec<NodeId>,
    /// Class, interface or type literal declaring this member
    pub parent: Option<SymbolId>,
    pub(crate) alias: Option<AliasTarget>,
}

impl Symbol {
    pub fn is_alias(&self) -> bool {
        self.flags.contains(SymbolFlags::ALIAS)
    }
}

/// Module-level bindings of one source file
#[derive(Debug, Clone)]
pub struct FileScope {
    /// Symbol of the file itself
    pub module: SymbolId,
    /// Top-level declarations and imports by local name
    pub locals: HashMap<String, SymbolId>,
    /// Exported names in declaration order
    pub exports: Vec<(String, SymbolId)>,
    /// Specifiers of `export * from "..."`, in order
    pub star_exports: Vec<String>,
}

impl FileScope {
    pub fn export(&self, name: &str) -> Option<SymbolId> {
        self.exports
            .iter()
            .find(|(exported, _)| exported == name)
            .map(|(_, id)| *id)
    }
}

/// Storage for all symbols of a program
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        let mut flags = SymbolFlags::CLASS;
        flags |= SymbolFlags::INTERFACE;
        assert!(flags.contains(SymbolFlags::CLASS));
        assert!(flags.contains(SymbolFlags::CLASS | SymbolFlags::INTERFACE));
        assert!(!flags.contains(SymbolFlags::CLASS | SymbolFlags::ALIAS));
        assert!(flags.intersects(SymbolFlags::TYPE));
        assert!(!SymbolFlags::VARIABLE.intersects(SymbolFlags::TYPE));
        assert!(SymbolFlags::NONE.is_empty());
    }

    #[test]
    fn test_flags_debug() {
        let flags = SymbolFlags::FUNCTION | SymbolFlags::ALIAS;
        assert_eq!(format!("{:?}", flags), "Function | Alias");
        assert_eq!(format!("{:?}", SymbolFlags::NONE), "None");
    }

    #[test]
    fn test_table_and_scope() {
        let mut table = SymbolTable::new();
        let id = table.alloc(Symbol {
            name: "Foo".to_string(),
            flags: SymbolFlags::CLASS,
            declarations: vec![NodeId(3)],
            parent: None,
            alias: None,
        });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(id).name, "Foo");
        assert!(!table.get(id).is_alias());

        table.get_mut(id).declarations.push(NodeId(7));
        assert_eq!(table.get(id).declarations.len(), 2);

        let scope = FileScope {
            module: id,
            locals: HashMap::new(),
            exports: vec![("Foo".to_string(), id)],
            star_exports: Vec::new(),
        };
        assert_eq!(scope.export("Foo"), Some(id));
        assert_eq!(scope.export("Bar"), None);
    }
}
