// Documentation generation
//
// Walks outward from the root module's exports, following every type that
// shows up in a documented signature, and collects one entry per class,
// method and property it reaches.

pub mod entry;
mod extract;
mod visitor;
pub mod worklist;

pub use entry::{ArgEntry, DocEntry, EntryKind};
pub use worklist::Worklist;

use crate::checker::{SymbolId, TypeChecker};
use crate::error::{Error, Result};
use std::collections::HashSet;
use tracing::{debug, info};

/// Options that change what goes into the entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Attach `path#Lstart-Lend` locators to entries
    pub source_locators: bool,
}

/// Worklist-driven entry generator over a type checker
pub struct Generator<'c, C: TypeChecker + ?Sized> {
    checker: &'c C,
    options: GenerateOptions,
    worklist: Worklist,
    output: Vec<DocEntry>,
}

impl<'c, C: TypeChecker + ?Sized> Generator<'c, C> {
    pub fn new(checker: &'c C, options: GenerateOptions) -> Self {
        Self {
            checker,
            options,
            worklist: Worklist::new(),
            output: Vec::new(),
        }
    }

    /// Request every export of the root module, in export order
    pub fn seed_root(&mut self) -> Result<()> {
        let checker = self.checker;
        let root = checker.root_file();
        let module = checker.symbol_at_location(root.root).ok_or_else(|| {
            Error::missing_declaration(format!("module symbol of {}", root.path.display()))
        })?;

        let exports = checker.exports_of_module(module);
        debug!(file = %root.path.display(), exports = exports.len(), "seeding from root module");
        for symbol in exports {
            self.worklist.request_visit(checker, symbol)?;
        }
        Ok(())
    }

    /// Visit queued declarations until the worklist runs dry
    pub fn drain(&mut self) -> Result<()> {
        while let Some(decl) = self.worklist.pop() {
            self.visit(decl)?;
        }
        Ok(())
    }

    /// Symbols scheduled so far, alias-resolved
    pub fn history(&self) -> &HashSet<SymbolId> {
        self.worklist.history()
    }

    pub fn entries(&self) -> &[DocEntry] {
        &self.output
    }

    pub fn into_entries(self) -> Vec<DocEntry> {
        self.output
    }
}

/// Generate entries for everything reachable from the root file's exports
pub fn generate<C: TypeChecker + ?Sized>(checker: &C, options: GenerateOptions) -> Result<Vec<DocEntry>> {
    let mut generator = Generator::new(checker, options);
    generator.seed_root()?;
    generator.drain()?;

    info!(
        entries = generator.entries().len(),
        symbols = generator.history().len(),
        "documentation generated"
    );
    Ok(generator.into_entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Program;
    use crate::config::CompilerOptions;

    fn program(files: &[(&str, &str)]) -> Program {
        Program::from_sources(files[0].0, files.iter().copied(), &CompilerOptions::default()).unwrap()
    }

    fn names(entries: &[DocEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_empty_module() {
        let program = program(&[("mod.ts", "const hidden = 1;\n")]);
        let entries = generate(&program, GenerateOptions::default()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_types_in_signatures_are_followed() {
        let program = program(&[(
            "mod.ts",
            "class Point { x: number = 0; }\nexport function origin(): Point { return new Point(); }\n",
        )]);
        let entries = generate(&program, GenerateOptions::default()).unwrap();
        assert_eq!(names(&entries), vec!["origin", "Point", "Point.x"]);
    }

    #[test]
    fn test_history_records_anonymous_types() {
        let program = program(&[(
            "mod.ts",
            "export function configure(opts: { verbose: boolean }): void {}\n",
        )]);
        let mut generator = Generator::new(&program, GenerateOptions::default());
        generator.seed_root().unwrap();
        generator.drain().unwrap();

        assert_eq!(names(generator.entries()), vec!["configure"]);
        let anonymous: Vec<_> = generator
            .history()
            .iter()
            .map(|s| program.symbol(*s).name.as_str())
            .filter(|name| *name == "__type")
            .collect();
        assert_eq!(anonymous.len(), 1);
    }

    #[test]
    fn test_cyclic_references_terminate() {
        let program = program(&[
            ("a.ts", "import { B } from \"./b\";\nexport class A { b(): B { return new B(); } }\n"),
            ("b.ts", "import { A } from \"./a\";\nexport class B { a(): A { return new A(); } }\n"),
        ]);
        let entries = generate(&program, GenerateOptions::default()).unwrap();
        assert_eq!(names(&entries), vec!["A", "A.b", "B", "B.a"]);
    }

    #[test]
    fn test_unsupported_export_stops_generation() {
        let program = program(&[("mod.ts", "export enum Color { Red }\n")]);
        let err = generate(&program, GenerateOptions::default()).unwrap_err();
        match err {
            Error::UnsupportedSyntax { kind, location } => {
                assert_eq!(kind, "EnumDeclaration");
                assert_eq!(location, "mod.ts:1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
