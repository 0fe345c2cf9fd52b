// Program model
//
// Loads the root file and every local module it imports or re-exports from,
// lowers them into one arena, binds symbols and links module specifiers.

use crate::checker::binder;
use crate::checker::resolve::{normalize, FsHost, MemoryHost, ModuleKind, ModuleResolver, SourceHost};
use crate::checker::symbols::{AliasTarget, FileScope, Symbol, SymbolId, SymbolTable};
use crate::config::CompilerOptions;
use crate::error::{Error, Result};
use crate::parser::ast::{FileId, NodeId, SyntaxArena, SyntaxKind, SyntaxNode};
use crate::parser::TypeScriptParser;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed file of the program
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    /// `SourceFile` node in the arena
    pub root: NodeId,
    pub is_declaration_file: bool,
}

/// Typed program built from a root file and its local imports
#[derive(Debug)]
pub struct Program {
    pub(crate) options: CompilerOptions,
    pub(crate) files: Vec<SourceFile>,
    pub(crate) scopes: Vec<FileScope>,
    pub(crate) arena: SyntaxArena,
    pub(crate) symbols: SymbolTable,
    pub(crate) node_symbols: HashMap<NodeId, SymbolId>,
    /// Specifier as written in a file, resolved to the file it names
    links: HashMap<(FileId, String), FileId>,
}

impl Program {
    /// Load the program rooted at `root` from disk
    pub fn create(root: &Path, options: &CompilerOptions) -> Result<Self> {
        Self::load(root, options, &FsHost)
    }

    /// Build a program from in-memory sources
    pub fn from_sources<P, S>(
        root: impl AsRef<Path>,
        files: impl IntoIterator<Item = (P, S)>,
        options: &CompilerOptions,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        S: Into<String>,
    {
        let mut host = MemoryHost::new();
        for (path, source) in files {
            host.add(path, source);
        }
        Self::load(root.as_ref(), options, &host)
    }

    fn load(root: &Path, options: &CompilerOptions, host: &dyn SourceHost) -> Result<Self> {
        if !host.file_exists(root) {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        let mut parser = TypeScriptParser::new()?;
        let resolver = ModuleResolver::new(options);

        let mut program = Program {
            options: options.clone(),
            files: Vec::new(),
            scopes: Vec::new(),
            arena: SyntaxArena::new(),
            symbols: SymbolTable::new(),
            node_symbols: HashMap::new(),
            links: HashMap::new(),
        };

        // File ids are handed out in discovery order, which is also parse order
        let root_path = normalize(root);
        let mut ids: HashMap<PathBuf, FileId> = HashMap::from([(root_path.clone(), FileId(0))]);
        let mut queue: VecDeque<PathBuf> = VecDeque::from([root_path]);

        while let Some(path) = queue.pop_front() {
            let id = FileId(program.files.len() as u32);
            debug!(path = %path.display(), "loading source file");

            let source = host.read_file(&path)?;
            let root_node = parser.parse_source(&source, &path, id, &mut program.arena)?;
            let module_name = module_name(&path);
            let scope = binder::bind_file(
                &program.arena,
                id,
                root_node,
                &module_name,
                &mut program.symbols,
                &mut program.node_symbols,
            );

            for specifier in module_specifiers(&program.arena, root_node) {
                match resolver.resolve(&specifier, &path, host) {
                    ModuleKind::Local(target) => {
                        let next = FileId(ids.len() as u32);
                        let target_id = *ids.entry(target.clone()).or_insert_with(|| {
                            queue.push_back(target);
                            next
                        });
                        program.links.insert((id, specifier), target_id);
                    }
                    ModuleKind::External => {
                        debug!(specifier = %specifier, "not following external module");
                    }
                }
            }

            program.files.push(SourceFile {
                id,
                is_declaration_file: path.to_string_lossy().ends_with(".d.ts"),
                path,
                root: root_node,
            });
            program.scopes.push(scope);
        }

        debug!(
            files = program.files.len(),
            nodes = program.arena.len(),
            symbols = program.symbols.len(),
            "program loaded"
        );
        Ok(program)
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn source_file(&self, file: FileId) -> &SourceFile {
        &self.files[file.index()]
    }

    /// The file the program was created from
    pub fn root_file(&self) -> &SourceFile {
        &self.files[0]
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        self.arena.get(id)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    pub fn symbol_at_location(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    pub(crate) fn scope(&self, file: FileId) -> &FileScope {
        &self.scopes[file.index()]
    }

    /// File a specifier written in `file` resolved to
    pub(crate) fn linked_file(&self, file: FileId, specifier: &str) -> Option<FileId> {
        self.links.get(&(file, specifier.to_string())).copied()
    }

    /// Follow an alias chain to the symbol it finally names.
    ///
    /// Non-alias symbols resolve to themselves. Returns `None` when a link in
    /// the chain points outside the program or the chain is circular.
    pub fn aliased_symbol(&self, symbol: SymbolId) -> Option<SymbolId> {
        let mut current = symbol;
        let mut seen = HashSet::new();
        while let Some(target) = &self.symbols.get(current).alias {
            if !seen.insert(current) {
                return None;
            }
            current = self.resolve_alias_target(target)?;
        }
        Some(current)
    }

    fn resolve_alias_target(&self, target: &AliasTarget) -> Option<SymbolId> {
        match target {
            AliasTarget::Local { file, name } => self.scope(*file).locals.get(name).copied(),
            AliasTarget::Module {
                file,
                specifier,
                imported,
            } => {
                let target_file = self.linked_file(*file, specifier)?;
                if imported == "*" {
                    Some(self.scope(target_file).module)
                } else {
                    self.export_named(target_file, imported, &mut HashSet::new())
                }
            }
        }
    }

    /// Export `name` of `file`, looking through `export *` for non-default names
    pub(crate) fn export_named(&self, file: FileId, name: &str, visited: &mut HashSet<FileId>) -> Option<SymbolId> {
        if !visited.insert(file) {
            return None;
        }
        let scope = self.scope(file);
        if let Some(symbol) = scope.export(name) {
            return Some(symbol);
        }
        if name == "default" {
            return None;
        }
        scope
            .star_exports
            .iter()
            .filter_map(|specifier| self.linked_file(file, specifier))
            .find_map(|target| self.export_named(target, name, visited))
    }

    /// Symbols exported from a module, in declaration order, followed by
    /// `export *` re-exports that are not shadowed by a local export
    pub fn exports_of_module(&self, module: SymbolId) -> Vec<SymbolId> {
        let Some(file) = self.module_file(module) else {
            return Vec::new();
        };
        self.collect_exports(file, &mut HashSet::new())
            .into_iter()
            .map(|(_, symbol)| symbol)
            .collect()
    }

    fn collect_exports(&self, file: FileId, visited: &mut HashSet<FileId>) -> Vec<(String, SymbolId)> {
        if !visited.insert(file) {
            return Vec::new();
        }
        let scope = self.scope(file);
        let mut exports = scope.exports.clone();

        for specifier in &scope.star_exports {
            let Some(target) = self.linked_file(file, specifier) else {
                debug!(specifier = %specifier, "skipping `export *` from external module");
                continue;
            };
            for (name, symbol) in self.collect_exports(target, visited) {
                if name != "default" && !exports.iter().any(|(existing, _)| *existing == name) {
                    exports.push((name, symbol));
                }
            }
        }

        exports
    }

    /// File whose module symbol is `module`
    fn module_file(&self, module: SymbolId) -> Option<FileId> {
        self.scopes
            .iter()
            .position(|scope| scope.module == module)
            .map(|index| self.files[index].id)
    }

    /// `path:line` of a node, for diagnostics
    pub fn location(&self, node: NodeId) -> String {
        let node = self.arena.get(node);
        format!(
            "{}:{}",
            self.source_file(node.file).path.display(),
            node.span.start_line
        )
    }
}

/// Module specifiers of imports and re-exports, in order
fn module_specifiers(arena: &SyntaxArena, root: NodeId) -> Vec<String> {
    let SyntaxKind::SourceFile { statements } = &arena.get(root).kind else {
        return Vec::new();
    };

    let mut specifiers: Vec<String> = Vec::new();
    for &statement in statements {
        let specifier = match &arena.get(statement).kind {
            SyntaxKind::ImportSpecifier { module, .. } => Some(module),
            SyntaxKind::ExportSpecifier {
                module: Some(module),
                ..
            } => Some(module),
            SyntaxKind::ExportStar { module } => Some(module),
            _ => None,
        };
        if let Some(specifier) = specifier {
            if !specifiers.contains(specifier) {
                specifiers.push(specifier.clone());
            }
        }
    }
    specifiers
}

/// Module name of a file: its path without the source extension
fn module_name(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/");
    [".d.ts", ".tsx", ".ts", ".mts", ".cts"]
        .iter()
        .find_map(|ext| display.strip_suffix(ext))
        .map(str::to_string)
        .unwrap_or(display)
}
