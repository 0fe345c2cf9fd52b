// Binder
//
// Creates symbols for one lowered source file: module-level declarations,
// imports and exports first, then every nested node that can carry a symbol
// (members, parameters, anonymous types, function expressions).

use crate::checker::symbols::{AliasTarget, FileScope, Symbol, SymbolFlags, SymbolId, SymbolTable};
use crate::parser::ast::{ExprKind, FileId, NodeId, SyntaxArena, SyntaxKind, SyntaxNode};
use std::collections::HashMap;
use tracing::trace;

pub(crate) struct Binder<'a> {
    arena: &'a SyntaxArena,
    symbols: &'a mut SymbolTable,
    node_symbols: &'a mut HashMap<NodeId, SymbolId>,
    file: FileId,
}

/// Bind the file rooted at `root`, returning its module scope
pub(crate) fn bind_file(
    arena: &SyntaxArena,
    file: FileId,
    root: NodeId,
    module_name: &str,
    symbols: &mut SymbolTable,
    node_symbols: &mut HashMap<NodeId, SymbolId>,
) -> FileScope {
    let mut binder = Binder {
        arena,
        symbols,
        node_symbols,
        file,
    };
    binder.bind(root, module_name)
}

impl<'a> Binder<'a> {
    fn new_symbol(
        &mut self,
        name: impl Into<String>,
        flags: SymbolFlags,
        declaration: NodeId,
        parent: Option<SymbolId>,
        alias: Option<AliasTarget>,
    ) -> SymbolId {
        self.symbols.alloc(Symbol {
            name: name.into(),
            flags,
            declarations: vec![declaration],
            parent,
            alias,
        })
    }

    fn bind(&mut self, root: NodeId, module_name: &str) -> FileScope {
        let arena = self.arena;
        let module = self.new_symbol(
            format!("\"{}\"", module_name),
            SymbolFlags::MODULE,
            root,
            None,
            None,
        );
        self.node_symbols.insert(root, module);

        let mut scope = FileScope {
            module,
            locals: HashMap::new(),
            exports: Vec::new(),
            star_exports: Vec::new(),
        };

        if let SyntaxKind::SourceFile { statements } = &arena.get(root).kind {
            for &statement in statements {
                self.bind_statement(statement, &mut scope);
            }
        }

        self.bind_nested();
        scope
    }

    fn bind_statement(&mut self, id: NodeId, scope: &mut FileScope) {
        let arena = self.arena;
        let node = arena.get(id);

        match &node.kind {
            SyntaxKind::ImportSpecifier { module, imported } => {
                let Some(local) = node.name_text() else {
                    return;
                };
                let target = AliasTarget::Module {
                    file: self.file,
                    specifier: module.clone(),
                    imported: imported.clone(),
                };
                let symbol = self.new_symbol(local, SymbolFlags::ALIAS, id, None, Some(target));
                self.node_symbols.insert(id, symbol);
                scope.locals.insert(local.to_string(), symbol);
            }
            SyntaxKind::ExportSpecifier { module, local } => {
                let exported = node.name_text().unwrap_or(local.as_str());
                let target = match module {
                    Some(specifier) => AliasTarget::Module {
                        file: self.file,
                        specifier: specifier.clone(),
                        imported: local.clone(),
                    },
                    None => AliasTarget::Local {
                        file: self.file,
                        name: local.clone(),
                    },
                };
                let symbol = self.new_symbol(exported, SymbolFlags::ALIAS, id, None, Some(target));
                self.node_symbols.insert(id, symbol);
                push_export(scope, exported, symbol);
            }
            SyntaxKind::ExportStar { module } => scope.star_exports.push(module.clone()),
            kind => {
                if let Some(flags) = declaration_flags(kind) {
                    self.bind_declaration(id, node, flags, scope);
                } else if node.modifiers.default {
                    self.bind_default_expression(id, node, scope);
                }
            }
        }
    }

    fn bind_declaration(&mut self, id: NodeId, node: &SyntaxNode, flags: SymbolFlags, scope: &mut FileScope) {
        let local_name = node.name_text().map(str::to_string);
        let symbol_name = local_name.clone().unwrap_or_else(|| "default".to_string());

        let existing = local_name
            .as_ref()
            .and_then(|name| scope.locals.get(name))
            .copied()
            .filter(|s| !self.symbols.get(*s).is_alias());

        // Same-named declarations merge (overloads, interface merging, class + interface)
        let symbol = match existing {
            Some(symbol) => {
                let merged = self.symbols.get_mut(symbol);
                merged.declarations.push(id);
                merged.flags |= flags;
                symbol
            }
            None => {
                let symbol = self.new_symbol(symbol_name.clone(), flags, id, None, None);
                if let Some(name) = local_name {
                    scope.locals.insert(name, symbol);
                }
                symbol
            }
        };
        self.node_symbols.insert(id, symbol);

        if node.modifiers.export {
            let exported = if node.modifiers.default {
                "default"
            } else {
                symbol_name.as_str()
            };
            push_export(scope, exported, symbol);
        }
    }

    /// `export default <expression>`
    fn bind_default_expression(&mut self, id: NodeId, node: &SyntaxNode, scope: &mut FileScope) {
        let symbol = match &node.kind {
            // `export default foo` re-exports the local `foo`
            SyntaxKind::Expression {
                text,
                kind: ExprKind::Other,
            } if is_identifier(text) => {
                let target = AliasTarget::Local {
                    file: self.file,
                    name: text.clone(),
                };
                self.new_symbol("default", SymbolFlags::ALIAS, id, None, Some(target))
            }
            SyntaxKind::FunctionExpression(_) => {
                self.new_symbol("default", SymbolFlags::FUNCTION, id, None, None)
            }
            _ => self.new_symbol("default", SymbolFlags::VARIABLE, id, None, None),
        };
        self.node_symbols.insert(id, symbol);
        push_export(scope, "default", symbol);
    }

    /// Give a symbol to every nested node of this file that declares something
    fn bind_nested(&mut self) {
        let arena = self.arena;

        for (id, node) in arena.iter() {
            if node.file != self.file || self.node_symbols.contains_key(&id) {
                continue;
            }

            let (name, flags) = match &node.kind {
                SyntaxKind::Parameter { .. } => (
                    node.name_text().unwrap_or("__param").to_string(),
                    SymbolFlags::PARAMETER,
                ),
                SyntaxKind::Constructor(_) => ("constructor".to_string(), SymbolFlags::CONSTRUCTOR),
                SyntaxKind::MethodDeclaration(_) | SyntaxKind::MethodSignature(_) => {
                    (member_symbol_name(node), SymbolFlags::METHOD)
                }
                SyntaxKind::PropertyDeclaration { .. } | SyntaxKind::PropertySignature { .. } => {
                    (member_symbol_name(node), SymbolFlags::PROPERTY)
                }
                SyntaxKind::GetAccessor(_) => (member_symbol_name(node), SymbolFlags::GET_ACCESSOR),
                SyntaxKind::SetAccessor(_) => (member_symbol_name(node), SymbolFlags::SET_ACCESSOR),
                SyntaxKind::CallSignature(_) => (
                    node.name_text().unwrap_or("__call").to_string(),
                    SymbolFlags::SIGNATURE,
                ),
                SyntaxKind::FunctionType(_) | SyntaxKind::TypeLiteral { .. } => {
                    ("__type".to_string(), SymbolFlags::TYPE_LITERAL)
                }
                SyntaxKind::ObjectLiteralExpression { .. } => {
                    ("__object".to_string(), SymbolFlags::OBJECT_LITERAL)
                }
                SyntaxKind::FunctionExpression(_) => {
                    // A function stored in a variable or property is that variable's value
                    if let Some(owner) = self.initializer_owner(id, node) {
                        self.node_symbols.insert(id, owner);
                        continue;
                    }
                    (
                        node.name_text().unwrap_or("__function").to_string(),
                        SymbolFlags::FUNCTION,
                    )
                }
                _ => continue,
            };

            let parent = node.parent.and_then(|p| self.node_symbols.get(&p).copied());
            trace!(name = %name, flags = ?flags, "bound nested symbol");
            let symbol = self.new_symbol(name, flags, id, parent, None);
            self.node_symbols.insert(id, symbol);
        }
    }

    /// Symbol of the variable or property whose initializer is `id`
    fn initializer_owner(&self, id: NodeId, node: &SyntaxNode) -> Option<SymbolId> {
        let parent = node.parent?;
        match &self.arena.get(parent).kind {
            SyntaxKind::VariableDeclaration {
                initializer: Some(init),
                ..
            }
            | SyntaxKind::PropertyDeclaration {
                initializer: Some(init),
                ..
            } if *init == id => self.node_symbols.get(&parent).copied(),
            _ => None,
        }
    }
}

/// Symbol flags of a module-level declaration kind
fn declaration_flags(kind: &SyntaxKind) -> Option<SymbolFlags> {
    match kind {
        SyntaxKind::ClassDeclaration { .. } => Some(SymbolFlags::CLASS),
        SyntaxKind::InterfaceDeclaration { .. } => Some(SymbolFlags::INTERFACE),
        SyntaxKind::TypeAliasDeclaration { .. } => Some(SymbolFlags::TYPE_ALIAS),
        SyntaxKind::FunctionDeclaration(_) => Some(SymbolFlags::FUNCTION),
        SyntaxKind::VariableDeclaration { .. } => Some(SymbolFlags::VARIABLE),
        SyntaxKind::EnumDeclaration { .. } => Some(SymbolFlags::ENUM),
        SyntaxKind::ModuleDeclaration => Some(SymbolFlags::MODULE),
        _ => None,
    }
}

fn member_symbol_name(node: &SyntaxNode) -> String {
    node.name
        .as_ref()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "__missing".to_string())
}

fn push_export(scope: &mut FileScope, name: &str, symbol: SymbolId) {
    if scope.export(name).is_none() {
        scope.exports.push((name.to_string(), symbol));
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TypeScriptParser;
    use std::path::Path;

    struct Bound {
        arena: SyntaxArena,
        symbols: SymbolTable,
        node_symbols: HashMap<NodeId, SymbolId>,
        scope: FileScope,
    }

    fn bind_source(source: &str) -> Bound {
        let mut parser = TypeScriptParser::new().unwrap();
        let mut arena = SyntaxArena::new();
        let root = parser
            .parse_source(source, Path::new("mod.ts"), FileId(0), &mut arena)
            .unwrap();
        let mut symbols = SymbolTable::new();
        let mut node_symbols = HashMap::new();
        let scope = bind_file(&arena, FileId(0), root, "mod", &mut symbols, &mut node_symbols);
        Bound {
            arena,
            symbols,
            node_symbols,
            scope,
        }
    }

    fn export_names(bound: &Bound) -> Vec<&str> {
        bound.scope.exports.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_module_symbol() {
        let bound = bind_source("export const a = 1;");
        let module = bound.symbols.get(bound.scope.module);
        assert_eq!(module.name, "\"mod\"");
        assert!(module.flags.contains(SymbolFlags::MODULE));
    }

    #[test]
    fn test_exports_in_order() {
        let bound = bind_source(
            "export class A {}\nfunction hidden() {}\nexport function b() {}\nexport default class C {}\n",
        );
        assert_eq!(export_names(&bound), vec!["A", "b", "default"]);
        assert!(bound.scope.locals.contains_key("hidden"));
        assert!(bound.scope.locals.contains_key("C"));
    }

    #[test]
    fn test_overloads_merge() {
        let bound = bind_source("export function f(x: string): void;\nexport function f(x: any) {}\n");
        assert_eq!(export_names(&bound), vec!["f"]);
        let symbol = bound.symbols.get(bound.scope.locals["f"]);
        assert_eq!(symbol.declarations.len(), 2);
    }

    #[test]
    fn test_aliases() {
        let bound = bind_source("import { x as y } from \"./dep\";\nclass Foo {}\nexport { Foo as Bar, y };\n");
        assert_eq!(export_names(&bound), vec!["Bar", "y"]);

        let import = bound.symbols.get(bound.scope.locals["y"]);
        assert!(import.is_alias());
        assert_eq!(
            import.alias,
            Some(AliasTarget::Module {
                file: FileId(0),
                specifier: "./dep".to_string(),
                imported: "x".to_string(),
            })
        );

        let bar = bound.symbols.get(bound.scope.export("Bar").unwrap());
        assert_eq!(
            bar.alias,
            Some(AliasTarget::Local {
                file: FileId(0),
                name: "Foo".to_string(),
            })
        );
    }

    #[test]
    fn test_default_identifier_export_is_alias() {
        let bound = bind_source("function run() {}\nexport default run;\n");
        let default = bound.symbols.get(bound.scope.export("default").unwrap());
        assert!(default.is_alias());
    }

    #[test]
    fn test_nested_symbols() {
        let bound = bind_source(
            "export class Foo {\n  add(x: number): number { return x; }\n  cb = () => 1;\n}\nexport type Options = { verbose: boolean };\n",
        );

        let mut by_name: HashMap<&str, SymbolFlags> = HashMap::new();
        for (id, _) in bound.arena.iter() {
            if let Some(symbol) = bound.node_symbols.get(&id) {
                let symbol = bound.symbols.get(*symbol);
                by_name.insert(symbol.name.as_str(), symbol.flags);
            }
        }

        assert!(by_name["add"].contains(SymbolFlags::METHOD));
        assert!(by_name["x"].contains(SymbolFlags::PARAMETER));
        assert!(by_name["cb"].contains(SymbolFlags::PROPERTY));
        assert!(by_name["__type"].contains(SymbolFlags::TYPE_LITERAL));
        assert!(by_name["verbose"].contains(SymbolFlags::PROPERTY));
    }

    #[test]
    fn test_function_initializer_shares_owner_symbol() {
        let bound = bind_source("export const double = (n: number) => n * 2;\n");
        let variable = bound.scope.locals["double"];
        let SyntaxKind::VariableDeclaration {
            initializer: Some(init),
            ..
        } = &bound.arena.get(bound.symbols.get(variable).declarations[0]).kind
        else {
            panic!("expected initialized variable");
        };
        assert_eq!(bound.node_symbols.get(init), Some(&variable));
    }

    #[test]
    fn test_member_parent() {
        let bound = bind_source("export interface Shape { area(): number; }\n");
        let shape = bound.scope.locals["Shape"];
        let area = bound
            .arena
            .iter()
            .find(|(_, n)| n.name_text() == Some("area"))
            .map(|(id, _)| bound.node_symbols[&id])
            .unwrap();
        assert_eq!(bound.symbols.get(area).parent, Some(shape));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("run"));
        assert!(is_identifier("$scope_1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier(""));
    }
}
