// TypeScript parser using tree-sitter
//
// Parses a file with tree-sitter-typescript and lowers the declarations we
// document (plus everything they can reference) into the shared syntax arena.
// Statement bodies are not lowered; only their `return` shape is recorded.

use crate::error::{Error, Result};
use crate::parser::ast::*;
use crate::parser::jsdoc::{self, JsDoc};
use std::path::Path;
use tracing::warn;
use tree_sitter::{Node, Parser};

/// Supported TypeScript variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TsVariant {
    TypeScript,
    Tsx,
}

impl TsVariant {
    /// Detect variant from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            // Plain JavaScript parses with the TypeScript grammar
            "js" | "mjs" | "cjs" => Some(Self::TypeScript),
            "jsx" => Some(Self::Tsx),
            _ => None,
        }
    }
}

/// Parser for TypeScript source files
pub struct TypeScriptParser {
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl TypeScriptParser {
    /// Create a new TypeScript/TSX parser
    pub fn new() -> Result<Self> {
        let mut ts_parser = Parser::new();
        let ts_language = tree_sitter_typescript::language_typescript();
        ts_parser.set_language(&ts_language).map_err(|e| {
            Error::Parser(format!("Failed to set TypeScript language: {}", e))
        })?;

        let mut tsx_parser = Parser::new();
        let tsx_language = tree_sitter_typescript::language_tsx();
        tsx_parser.set_language(&tsx_language).map_err(|e| {
            Error::Parser(format!("Failed to set TSX language: {}", e))
        })?;

        Ok(Self { ts_parser, tsx_parser })
    }

    /// Parse TypeScript source and lower it into `arena`.
    ///
    /// Returns the `SourceFile` node of the file.
    pub fn parse_source(
        &mut self,
        source: &str,
        path: &Path,
        file: FileId,
        arena: &mut SyntaxArena,
    ) -> Result<NodeId> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("ts");
        let parser = match TsVariant::from_extension(ext) {
            Some(TsVariant::Tsx) => &mut self.tsx_parser,
            _ => &mut self.ts_parser,
        };

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(path, "tree-sitter produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            warn!(path = %path.display(), "source has syntax errors, documenting what parsed");
        }

        let mut lowering = Lowering {
            arena,
            source: source.as_bytes(),
            file,
        };
        Ok(lowering.program(root))
    }
}

/// Walks one tree-sitter tree and allocates arena nodes
struct Lowering<'a> {
    arena: &'a mut SyntaxArena,
    source: &'a [u8],
    file: FileId,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node) -> &'a str {
        let source: &'a [u8] = self.source;
        std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
    }

    /// Allocate a node whose kind is filled in once its children are lowered
    fn begin(
        &mut self,
        node: Node,
        parent: Option<NodeId>,
        name: Option<MemberName>,
        modifiers: Modifiers,
        jsdoc: Option<JsDoc>,
    ) -> NodeId {
        self.arena.alloc(SyntaxNode {
            kind: SyntaxKind::Unknown {
                kind: node.kind().to_string(),
            },
            name,
            file: self.file,
            parent,
            span: Span {
                start_line: node.start_position().row + 1,
                end_line: node.end_position().row + 1,
            },
            modifiers,
            jsdoc,
        })
    }

    fn finish(&mut self, id: NodeId, kind: SyntaxKind) -> NodeId {
        self.arena.get_mut(id).kind = kind;
        id
    }

    fn program(&mut self, root: Node) -> NodeId {
        let id = self.begin(root, None, None, Modifiers::default(), None);
        let statements = self.statements(root, id);
        self.finish(id, SyntaxKind::SourceFile { statements })
    }

    /// Lower top-level statements, attaching each JSDoc block to the next statement
    fn statements(&mut self, container: Node, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut doc: Option<JsDoc> = None;

        let mut cursor = container.walk();
        for child in container.named_children(&mut cursor) {
            if child.kind() == "comment" {
                self.track_doc(child, &mut doc);
                continue;
            }
            out.extend(self.statement(child, parent, doc.take()));
        }

        out
    }

    fn track_doc(&self, comment: Node, doc: &mut Option<JsDoc>) {
        let text = self.text(comment);
        if jsdoc::is_jsdoc(text) {
            *doc = Some(jsdoc::parse(text, comment.start_position().row + 1));
        }
    }

    fn statement(&mut self, node: Node, parent: NodeId, doc: Option<JsDoc>) -> Vec<NodeId> {
        match node.kind() {
            "export_statement" => self.export_statement(node, parent, doc),
            "import_statement" => self.import_statement(node, parent),
            _ => self.declaration(node, parent, doc, Modifiers::default()),
        }
    }

    fn declaration(
        &mut self,
        node: Node,
        parent: NodeId,
        doc: Option<JsDoc>,
        mut modifiers: Modifiers,
    ) -> Vec<NodeId> {
        match node.kind() {
            "class_declaration" | "class" => vec![self.class(node, parent, doc, modifiers)],
            "abstract_class_declaration" => {
                modifiers.is_abstract = true;
                vec![self.class(node, parent, doc, modifiers)]
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                vec![self.function_declaration(node, parent, doc, modifiers)]
            }
            "lexical_declaration" | "variable_declaration" => {
                self.variables(node, parent, doc, modifiers)
            }
            "interface_declaration" => vec![self.interface(node, parent, doc, modifiers)],
            "type_alias_declaration" => vec![self.type_alias(node, parent, doc, modifiers)],
            "enum_declaration" => vec![self.enumeration(node, parent, doc, modifiers)],
            "module" | "internal_module" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| MemberName::Identifier(string_value(self.text(n)).to_string()));
                let id = self.begin(node, Some(parent), name, modifiers, doc);
                vec![self.finish(id, SyntaxKind::ModuleDeclaration)]
            }
            "ambient_declaration" => {
                modifiers.declare = true;
                let inner = {
                    let mut cursor = node.walk();
                    let found = node
                        .named_children(&mut cursor)
                        .find(|c| c.kind() != "comment");
                    found
                };
                match inner {
                    Some(inner) => self.declaration(inner, parent, doc, modifiers),
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn export_statement(&mut self, node: Node, parent: NodeId, doc: Option<JsDoc>) -> Vec<NodeId> {
        let modifiers = Modifiers {
            export: true,
            default: has_child_kind(node, "default"),
            ..Modifiers::default()
        };

        if let Some(decl) = node.child_by_field_name("declaration") {
            return self.declaration(decl, parent, doc, modifiers);
        }

        if let Some(value) = node.child_by_field_name("value") {
            return vec![self.default_export(value, parent, doc, modifiers)];
        }

        let module = node
            .child_by_field_name("source")
            .map(|s| string_value(self.text(s)).to_string());

        let mut out = Vec::new();
        let mut saw_clause = false;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "export_clause" => {
                    saw_clause = true;
                    let mut spec_cursor = child.walk();
                    for spec in child.named_children(&mut spec_cursor) {
                        if spec.kind() != "export_specifier" {
                            continue;
                        }
                        let Some(name_node) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let local = string_value(self.text(name_node)).to_string();
                        let exported = spec
                            .child_by_field_name("alias")
                            .map(|a| string_value(self.text(a)).to_string())
                            .unwrap_or_else(|| local.clone());
                        let id = self.begin(
                            spec,
                            Some(parent),
                            Some(MemberName::Identifier(exported)),
                            modifiers,
                            None,
                        );
                        out.push(self.finish(
                            id,
                            SyntaxKind::ExportSpecifier {
                                module: module.clone(),
                                local,
                            },
                        ));
                    }
                }
                "namespace_export" => {
                    saw_clause = true;
                    tracing::debug!("skipping `export * as` namespace re-export");
                }
                _ => {}
            }
        }

        if !saw_clause && has_child_kind(node, "*") {
            if let Some(module) = module {
                let id = self.begin(node, Some(parent), None, modifiers, None);
                out.push(self.finish(id, SyntaxKind::ExportStar { module }));
            }
        }

        out
    }

    /// `export default <expression>`
    fn default_export(
        &mut self,
        value: Node,
        parent: NodeId,
        doc: Option<JsDoc>,
        modifiers: Modifiers,
    ) -> NodeId {
        match value.kind() {
            "class" => self.class(value, parent, doc, modifiers),
            // `export default function () {}` is a declaration, not an expression
            "function_expression" | "function" | "generator_function" => {
                self.function_declaration(value, parent, doc, modifiers)
            }
            _ => {
                let id = self.expression(value, parent);
                let node = self.arena.get_mut(id);
                node.modifiers = modifiers;
                node.jsdoc = doc;
                id
            }
        }
    }

    fn import_statement(&mut self, node: Node, parent: NodeId) -> Vec<NodeId> {
        let Some(source) = node.child_by_field_name("source") else {
            return Vec::new();
        };
        let module = string_value(self.text(source)).to_string();

        let mut out = Vec::new();
        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for binding in clause.named_children(&mut clause_cursor) {
                match binding.kind() {
                    "identifier" => {
                        let local = self.text(binding).to_string();
                        out.push(self.import_specifier(binding, parent, &module, "default", local));
                    }
                    "named_imports" => {
                        let mut named_cursor = binding.walk();
                        for spec in binding.named_children(&mut named_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name_node) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = string_value(self.text(name_node)).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| self.text(a).to_string())
                                .unwrap_or_else(|| imported.clone());
                            out.push(self.import_specifier(spec, parent, &module, &imported, local));
                        }
                    }
                    "namespace_import" => {
                        let ident = {
                            let mut ns_cursor = binding.walk();
                            let found = binding
                                .named_children(&mut ns_cursor)
                                .find(|c| c.kind() == "identifier");
                            found
                        };
                        if let Some(ident) = ident {
                            let local = self.text(ident).to_string();
                            out.push(self.import_specifier(binding, parent, &module, "*", local));
                        }
                    }
                    _ => {}
                }
            }
        }

        out
    }

    fn import_specifier(
        &mut self,
        node: Node,
        parent: NodeId,
        module: &str,
        imported: &str,
        local: String,
    ) -> NodeId {
        let id = self.begin(
            node,
            Some(parent),
            Some(MemberName::Identifier(local)),
            Modifiers::default(),
            None,
        );
        self.finish(
            id,
            SyntaxKind::ImportSpecifier {
                module: module.to_string(),
                imported: imported.to_string(),
            },
        )
    }

    fn class(&mut self, node: Node, parent: NodeId, doc: Option<JsDoc>, modifiers: Modifiers) -> NodeId {
        let name = node
            .child_by_field_name("name")
            .map(|n| MemberName::Identifier(self.text(n).to_string()));
        let id = self.begin(node, Some(parent), name, modifiers, doc);

        let type_parameters = self.type_parameters(node.child_by_field_name("type_parameters"), id);

        let mut heritage = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "class_heritage" {
                let mut heritage_cursor = child.walk();
                for clause in child.named_children(&mut heritage_cursor) {
                    heritage.push(normalize(self.text(clause)));
                }
            }
        }

        let members = match node.child_by_field_name("body") {
            Some(body) => self.class_members(body, id),
            None => Vec::new(),
        };

        self.finish(
            id,
            SyntaxKind::ClassDeclaration {
                type_parameters,
                heritage,
                members,
            },
        )
    }

    fn class_members(&mut self, body: Node, class_id: NodeId) -> Vec<NodeId> {
        let mut members = Vec::new();
        let mut doc: Option<JsDoc> = None;

        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "comment" => self.track_doc(child, &mut doc),
                "decorator" => {}
                _ => members.push(self.class_member(child, class_id, doc.take())),
            }
        }

        members
    }

    fn class_member(&mut self, node: Node, class_id: NodeId, doc: Option<JsDoc>) -> NodeId {
        let name = node.child_by_field_name("name").map(|n| self.member_name(n));
        let modifiers = member_modifiers(node, self);

        match node.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                let accessor = accessor_keyword(node);
                let is_constructor = matches!(
                    &name,
                    Some(MemberName::Identifier(n)) | Some(MemberName::StringLiteral(n)) if n == "constructor"
                );
                let id = self.begin(node, Some(class_id), name, modifiers, doc);
                let func = self.function_like(node, id);
                let kind = match accessor {
                    Some("get") => SyntaxKind::GetAccessor(func),
                    Some("set") => SyntaxKind::SetAccessor(func),
                    _ if is_constructor => SyntaxKind::Constructor(func),
                    _ => SyntaxKind::MethodDeclaration(func),
                };
                self.finish(id, kind)
            }
            "public_field_definition" | "field_definition" => {
                let optional = has_child_kind(node, "?");
                let id = self.begin(node, Some(class_id), name, modifiers, doc);
                let ty = node
                    .child_by_field_name("type")
                    .map(|t| self.type_node(t, id));
                let initializer = node
                    .child_by_field_name("value")
                    .map(|v| self.expression(v, id));
                self.finish(
                    id,
                    SyntaxKind::PropertyDeclaration {
                        ty,
                        initializer,
                        optional,
                    },
                )
            }
            "index_signature" => {
                let text = normalize(self.text(node));
                let id = self.begin(node, Some(class_id), None, modifiers, doc);
                self.finish(id, SyntaxKind::IndexSignature { text })
            }
            "class_static_block" => {
                let id = self.begin(node, Some(class_id), None, modifiers, doc);
                self.finish(id, SyntaxKind::StaticBlock)
            }
            _ => self.begin(node, Some(class_id), name, modifiers, doc),
        }
    }

    /// Members of an interface body or an object type
    fn type_members(&mut self, container: Node, owner: NodeId) -> Vec<NodeId> {
        let mut members = Vec::new();
        let mut doc: Option<JsDoc> = None;

        let mut cursor = container.walk();
        for child in container.named_children(&mut cursor) {
            let doc_here = match child.kind() {
                "comment" => {
                    self.track_doc(child, &mut doc);
                    continue;
                }
                _ => doc.take(),
            };

            let name = child.child_by_field_name("name").map(|n| self.member_name(n));
            let modifiers = member_modifiers(child, self);

            let id = match child.kind() {
                "property_signature" => {
                    let optional = has_child_kind(child, "?");
                    let id = self.begin(child, Some(owner), name, modifiers, doc_here);
                    let ty = child
                        .child_by_field_name("type")
                        .map(|t| self.type_node(t, id));
                    self.finish(id, SyntaxKind::PropertySignature { ty, optional })
                }
                "method_signature" => {
                    let id = self.begin(child, Some(owner), name, modifiers, doc_here);
                    let func = self.function_like(child, id);
                    self.finish(id, SyntaxKind::MethodSignature(func))
                }
                "call_signature" | "construct_signature" => {
                    let name = (child.kind() == "construct_signature")
                        .then(|| MemberName::Identifier("new".to_string()));
                    let id = self.begin(child, Some(owner), name, modifiers, doc_here);
                    let func = self.function_like(child, id);
                    self.finish(id, SyntaxKind::CallSignature(func))
                }
                "index_signature" => {
                    let text = normalize(self.text(child));
                    let id = self.begin(child, Some(owner), None, modifiers, doc_here);
                    self.finish(id, SyntaxKind::IndexSignature { text })
                }
                _ => continue,
            };
            members.push(id);
        }

        members
    }

    fn member_name(&self, node: Node) -> MemberName {
        match node.kind() {
            "private_property_identifier" => MemberName::PrivateIdentifier(self.text(node).to_string()),
            "string" => MemberName::StringLiteral(string_value(self.text(node)).to_string()),
            "number" => MemberName::NumericLiteral(self.text(node).to_string()),
            "computed_property_name" => {
                let expr = node.named_child(0);
                match expr {
                    Some(e) if e.kind() == "member_expression" => {
                        let object = e.child_by_field_name("object").map(|o| normalize(self.text(o)));
                        let member = e.child_by_field_name("property").map(|p| self.text(p).to_string());
                        match (object, member) {
                            (Some(object), Some(member)) => {
                                MemberName::Computed(ComputedName::PropertyAccess { object, member })
                            }
                            _ => MemberName::Computed(ComputedName::Other(normalize(self.text(e)))),
                        }
                    }
                    Some(e) => MemberName::Computed(ComputedName::Other(normalize(self.text(e)))),
                    None => MemberName::Computed(ComputedName::Other(String::new())),
                }
            }
            _ => MemberName::Identifier(self.text(node).to_string()),
        }
    }

    fn function_declaration(
        &mut self,
        node: Node,
        parent: NodeId,
        doc: Option<JsDoc>,
        mut modifiers: Modifiers,
    ) -> NodeId {
        modifiers.is_async = has_child_kind(node, "async");
        let name = node
            .child_by_field_name("name")
            .map(|n| MemberName::Identifier(self.text(n).to_string()));
        let id = self.begin(node, Some(parent), name, modifiers, doc);
        let func = self.function_like(node, id);
        self.finish(id, SyntaxKind::FunctionDeclaration(func))
    }

    fn variables(
        &mut self,
        node: Node,
        parent: NodeId,
        mut doc: Option<JsDoc>,
        modifiers: Modifiers,
    ) -> Vec<NodeId> {
        let is_const = node.kind() == "lexical_declaration" && has_child_kind(node, "const");

        let mut out = Vec::new();
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            // Destructuring declarations have no single name to document
            let Some(name_node) = declarator
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
            else {
                continue;
            };
            let name = MemberName::Identifier(self.text(name_node).to_string());
            let id = self.begin(declarator, Some(parent), Some(name), modifiers, doc.take());
            let ty = declarator
                .child_by_field_name("type")
                .map(|t| self.type_node(t, id));
            let initializer = declarator
                .child_by_field_name("value")
                .map(|v| self.expression(v, id));
            out.push(self.finish(
                id,
                SyntaxKind::VariableDeclaration {
                    ty,
                    initializer,
                    is_const,
                },
            ));
        }

        out
    }

    fn interface(&mut self, node: Node, parent: NodeId, doc: Option<JsDoc>, modifiers: Modifiers) -> NodeId {
        let name = node
            .child_by_field_name("name")
            .map(|n| MemberName::Identifier(self.text(n).to_string()));
        let id = self.begin(node, Some(parent), name, modifiers, doc);
        let type_parameters = self.type_parameters(node.child_by_field_name("type_parameters"), id);

        let body = node.child_by_field_name("body").or_else(|| {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|c| matches!(c.kind(), "interface_body" | "object_type"));
            found
        });
        let members = match body {
            Some(body) => self.type_members(body, id),
            None => Vec::new(),
        };

        self.finish(
            id,
            SyntaxKind::InterfaceDeclaration {
                type_parameters,
                members,
            },
        )
    }

    fn type_alias(&mut self, node: Node, parent: NodeId, doc: Option<JsDoc>, modifiers: Modifiers) -> NodeId {
        let name = node
            .child_by_field_name("name")
            .map(|n| MemberName::Identifier(self.text(n).to_string()));
        let id = self.begin(node, Some(parent), name, modifiers, doc);
        let type_parameters = self.type_parameters(node.child_by_field_name("type_parameters"), id);
        let ty = match node.child_by_field_name("value") {
            Some(value) => self.type_node(value, id),
            None => TypeNode::Keyword("any".to_string()),
        };
        self.finish(id, SyntaxKind::TypeAliasDeclaration { type_parameters, ty })
    }

    fn enumeration(&mut self, node: Node, parent: NodeId, doc: Option<JsDoc>, modifiers: Modifiers) -> NodeId {
        let name = node
            .child_by_field_name("name")
            .map(|n| MemberName::Identifier(self.text(n).to_string()));
        let id = self.begin(node, Some(parent), name, modifiers, doc);

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                let name_node = match member.kind() {
                    "enum_assignment" => member.child_by_field_name("name"),
                    "property_identifier" | "string" => Some(member),
                    _ => None,
                };
                if let Some(n) = name_node {
                    members.push(string_value(self.text(n)).to_string());
                }
            }
        }

        self.finish(id, SyntaxKind::EnumDeclaration { members })
    }

    fn function_like(&mut self, node: Node, owner: NodeId) -> FunctionLike {
        let type_parameters =
            self.type_parameters(field_or_kind(node, "type_parameters", "type_parameters"), owner);

        let parameters = if let Some(params) = field_or_kind(node, "parameters", "formal_parameters") {
            self.parameters(params, owner)
        } else if let Some(param) = node.child_by_field_name("parameter") {
            vec![self.bare_parameter(param, owner)]
        } else {
            Vec::new()
        };

        let return_type = node
            .child_by_field_name("return_type")
            .map(|r| self.return_type(r, owner));

        let body = node.child_by_field_name("body");
        let returns_value = match body {
            Some(b) if b.kind() == "statement_block" => contains_return_value(b),
            // Arrow function with an expression body
            Some(_) => true,
            None => false,
        };

        FunctionLike {
            type_parameters,
            parameters,
            return_type,
            has_body: body.is_some(),
            returns_value,
            is_arrow: node.kind() == "arrow_function",
        }
    }

    fn return_type(&mut self, node: Node, owner: NodeId) -> TypeNode {
        match node.kind() {
            "type_predicate_annotation" | "type_predicate" => TypeNode::Keyword("boolean".to_string()),
            "asserts_annotation" | "asserts" => TypeNode::Keyword("void".to_string()),
            _ => self.type_node(node, owner),
        }
    }

    fn parameters(&mut self, params: Node, owner: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = params.walk();
        for child in params.named_children(&mut cursor) {
            match child.kind() {
                "required_parameter" | "optional_parameter" => {
                    let index = out.len();
                    if let Some(id) = self.parameter(child, owner, index) {
                        out.push(id);
                    }
                }
                "identifier" => out.push(self.bare_parameter(child, owner)),
                _ => {}
            }
        }
        out
    }

    fn parameter(&mut self, node: Node, owner: NodeId, index: usize) -> Option<NodeId> {
        let pattern = node.child_by_field_name("pattern");
        let (name, rest) = match pattern {
            Some(p) if p.kind() == "rest_pattern" => {
                let name = p
                    .named_child(0)
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_else(|| format!("__{}", index));
                (name, true)
            }
            Some(p) if p.kind() == "identifier" => (self.text(p).to_string(), false),
            // `this` parameters are not part of the call signature
            Some(p) if p.kind() == "this" => return None,
            _ => (format!("__{}", index), false),
        };

        let id = self.begin(
            node,
            Some(owner),
            Some(MemberName::Identifier(name)),
            Modifiers::default(),
            None,
        );
        let ty = node
            .child_by_field_name("type")
            .map(|t| self.type_node(t, id));
        let initializer = node
            .child_by_field_name("value")
            .map(|v| self.expression(v, id));

        Some(self.finish(
            id,
            SyntaxKind::Parameter {
                ty,
                initializer,
                optional: node.kind() == "optional_parameter",
                rest,
            },
        ))
    }

    /// Untyped `x` in `x => x`
    fn bare_parameter(&mut self, node: Node, owner: NodeId) -> NodeId {
        let name = MemberName::Identifier(self.text(node).to_string());
        let id = self.begin(node, Some(owner), Some(name), Modifiers::default(), None);
        self.finish(
            id,
            SyntaxKind::Parameter {
                ty: None,
                initializer: None,
                optional: false,
                rest: false,
            },
        )
    }

    fn type_parameters(&mut self, node: Option<Node>, owner: NodeId) -> Vec<TypeParameter> {
        let Some(node) = node else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut cursor = node.walk();
        for param in node.named_children(&mut cursor) {
            if param.kind() != "type_parameter" {
                continue;
            }
            let Some(name) = param.child_by_field_name("name") else {
                continue;
            };
            let constraint = param
                .child_by_field_name("constraint")
                .and_then(|c| c.named_child(0))
                .map(|t| self.type_node(t, owner));
            let default = param
                .child_by_field_name("value")
                .and_then(|v| v.named_child(0))
                .map(|t| self.type_node(t, owner));
            out.push(TypeParameter {
                name: self.text(name).to_string(),
                constraint,
                default,
            });
        }
        out
    }

    fn type_node(&mut self, node: Node, owner: NodeId) -> TypeNode {
        match node.kind() {
            "type_annotation" | "opting_type_annotation" | "omitting_type_annotation" => {
                match node.named_child(0) {
                    Some(inner) => self.type_node(inner, owner),
                    None => TypeNode::Other(normalize(self.text(node))),
                }
            }
            "predefined_type" => TypeNode::Keyword(self.text(node).to_string()),
            "this_type" => TypeNode::Keyword("this".to_string()),
            "type_identifier" | "identifier" | "nested_type_identifier" => TypeNode::Reference {
                name: normalize(self.text(node)),
                args: Vec::new(),
            },
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| normalize(self.text(n)))
                    .unwrap_or_default();
                let mut args = Vec::new();
                if let Some(type_args) = node.child_by_field_name("type_arguments") {
                    let mut cursor = type_args.walk();
                    for arg in type_args.named_children(&mut cursor) {
                        if arg.kind() != "comment" {
                            args.push(self.type_node(arg, owner));
                        }
                    }
                }
                TypeNode::Reference { name, args }
            }
            "array_type" => match node.named_child(0) {
                Some(inner) => TypeNode::Array(Box::new(self.type_node(inner, owner))),
                None => TypeNode::Other(normalize(self.text(node))),
            },
            "tuple_type" => {
                let mut elements = Vec::new();
                let mut cursor = node.walk();
                for element in node.named_children(&mut cursor) {
                    elements.push(self.type_node(element, owner));
                }
                TypeNode::Tuple(elements)
            }
            "union_type" => TypeNode::Union(self.flatten_types(node, "union_type", owner)),
            "intersection_type" => {
                TypeNode::Intersection(self.flatten_types(node, "intersection_type", owner))
            }
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => TypeNode::Parenthesized(Box::new(self.type_node(inner, owner))),
                None => TypeNode::Other(normalize(self.text(node))),
            },
            "function_type" | "constructor_type" => {
                let id = self.begin(node, Some(owner), None, Modifiers::default(), None);
                let func = self.function_like(node, id);
                self.finish(id, SyntaxKind::FunctionType(func));
                TypeNode::Function(id)
            }
            "object_type" => {
                let id = self.begin(node, Some(owner), None, Modifiers::default(), None);
                let members = self.type_members(node, id);
                self.finish(id, SyntaxKind::TypeLiteral { members });
                TypeNode::TypeLiteral(id)
            }
            "literal_type" => TypeNode::Literal(normalize(self.text(node))),
            "type_query" => {
                let operand = node
                    .named_child(0)
                    .map(|n| normalize(self.text(n)))
                    .unwrap_or_default();
                TypeNode::Query(operand)
            }
            _ => TypeNode::Other(normalize(self.text(node))),
        }
    }

    /// Collect the members of nested binary union/intersection nodes
    fn flatten_types(&mut self, node: Node, kind: &str, owner: NodeId) -> Vec<TypeNode> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == kind {
                out.extend(self.flatten_types(child, kind, owner));
            } else if child.kind() != "comment" {
                out.push(self.type_node(child, owner));
            }
        }
        out
    }

    fn expression(&mut self, node: Node, owner: NodeId) -> NodeId {
        let expr_kind = match node.kind() {
            "parenthesized_expression" => {
                let inner = {
                    let mut cursor = node.walk();
                    let found = node
                        .named_children(&mut cursor)
                        .find(|c| c.kind() != "comment");
                    found
                };
                if let Some(inner) = inner {
                    return self.expression(inner, owner);
                }
                ExprKind::Other
            }
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| MemberName::Identifier(self.text(n).to_string()));
                let modifiers = Modifiers {
                    is_async: has_child_kind(node, "async"),
                    ..Modifiers::default()
                };
                let id = self.begin(node, Some(owner), name, modifiers, None);
                let func = self.function_like(node, id);
                return self.finish(id, SyntaxKind::FunctionExpression(func));
            }
            "string" => {
                let value = string_value(self.text(node)).to_string();
                let id = self.begin(node, Some(owner), None, Modifiers::default(), None);
                return self.finish(id, SyntaxKind::StringLiteral { value });
            }
            "object" => return self.object_literal(node, owner),
            "number" => ExprKind::Number,
            "true" | "false" => ExprKind::Boolean,
            "null" => ExprKind::Null,
            "undefined" => ExprKind::Undefined,
            "template_string" => ExprKind::Template,
            "array" => ExprKind::Array,
            "new_expression" => ExprKind::New(
                node.child_by_field_name("constructor")
                    .map(|c| normalize(self.text(c)))
                    .unwrap_or_default(),
            ),
            _ => ExprKind::Other,
        };

        let text = normalize(self.text(node));
        let id = self.begin(node, Some(owner), None, Modifiers::default(), None);
        self.finish(id, SyntaxKind::Expression { text, kind: expr_kind })
    }

    fn object_literal(&mut self, node: Node, owner: NodeId) -> NodeId {
        let id = self.begin(node, Some(owner), None, Modifiers::default(), None);

        let mut properties = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "pair" => {
                    let (Some(key), Some(value)) =
                        (child.child_by_field_name("key"), child.child_by_field_name("value"))
                    else {
                        continue;
                    };
                    let key = self.member_name(key).to_string();
                    let value = self.expression(value, id);
                    properties.push((key, value));
                }
                "shorthand_property_identifier" => {
                    let key = self.text(child).to_string();
                    let value = self.expression(child, id);
                    properties.push((key, value));
                }
                "method_definition" => {
                    let Some(key) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let key = self.member_name(key);
                    let value = self.begin(child, Some(id), Some(key.clone()), Modifiers::default(), None);
                    let func = self.function_like(child, value);
                    self.finish(value, SyntaxKind::FunctionExpression(func));
                    properties.push((key.to_string(), value));
                }
                _ => {}
            }
        }

        self.finish(id, SyntaxKind::ObjectLiteralExpression { properties })
    }
}

/// Modifier keywords written before a member's name
fn member_modifiers(node: Node, lowering: &Lowering) -> Modifiers {
    let mut modifiers = Modifiers::default();
    let name_start = node
        .child_by_field_name("name")
        .map(|n| n.start_byte())
        .unwrap_or(usize::MAX);

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.start_byte() >= name_start {
            break;
        }
        match child.kind() {
            "accessibility_modifier" => match lowering.text(child) {
                "private" => modifiers.private = true,
                "protected" => modifiers.protected = true,
                _ => {}
            },
            "static" => modifiers.is_static = true,
            "readonly" => modifiers.readonly = true,
            "abstract" => modifiers.is_abstract = true,
            "async" => modifiers.is_async = true,
            "declare" => modifiers.declare = true,
            _ => {}
        }
    }
    modifiers
}

/// `get`/`set` keyword of an accessor, looked up before the member name
fn accessor_keyword(node: Node) -> Option<&'static str> {
    let name_start = node.child_by_field_name("name")?.start_byte();
    let mut cursor = node.walk();
    let mut found = None;
    for child in node.children(&mut cursor) {
        if child.start_byte() >= name_start {
            break;
        }
        match child.kind() {
            "get" => found = Some("get"),
            "set" => found = Some("set"),
            _ => {}
        }
    }
    found
}

/// Child in `field`, or the first child of `kind` for rules that leave it unnamed
fn field_or_kind<'t>(node: Node<'t>, field: &str, kind: &str) -> Option<Node<'t>> {
    node.child_by_field_name(field).or_else(|| {
        let mut cursor = node.walk();
        let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
        found
    })
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

fn is_function_boundary(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
            | "class"
            | "class_declaration"
    )
}

/// True if a `return <expr>` occurs in `node` outside nested functions
fn contains_return_value(node: Node) -> bool {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "return_statement" {
            let mut ret_cursor = child.walk();
            if child.named_children(&mut ret_cursor).any(|c| c.kind() != "comment") {
                return true;
            }
        } else if !is_function_boundary(child.kind()) && contains_return_value(child) {
            return true;
        }
    }
    false
}

/// Strip the quotes of a string literal
fn string_value(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Collapse whitespace runs so multi-line source renders on one line
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(source: &str) -> (SyntaxArena, NodeId) {
        let mut parser = TypeScriptParser::new().unwrap();
        let mut arena = SyntaxArena::new();
        let root = parser
            .parse_source(source, Path::new("test.ts"), FileId(0), &mut arena)
            .unwrap();
        (arena, root)
    }

    fn statements(arena: &SyntaxArena, root: NodeId) -> Vec<NodeId> {
        match &arena.get(root).kind {
            SyntaxKind::SourceFile { statements } => statements.clone(),
            other => panic!("expected source file, got {:?}", other),
        }
    }

    #[test]
    fn test_variant_detection() {
        assert_eq!(TsVariant::from_extension("ts"), Some(TsVariant::TypeScript));
        assert_eq!(TsVariant::from_extension("tsx"), Some(TsVariant::Tsx));
        assert_eq!(TsVariant::from_extension("mts"), Some(TsVariant::TypeScript));
        assert_eq!(TsVariant::from_extension("py"), None);
    }

    #[test]
    fn test_normalize_and_string_value() {
        assert_eq!(normalize("Map<\n  string,\n  number>"), "Map< string, number>");
        assert_eq!(string_value("\"./util\""), "./util");
        assert_eq!(string_value("'x'"), "x");
    }

    #[test]
    fn test_class_members() {
        let source = r#"
/** A counter. */
export class Counter {
  /** Current value. */
  count: number = 0;
  private secret = 1;
  #hidden = 2;
  constructor(start: number) {}
  get value(): number { return this.count; }
  set value(v: number) {}
  add(n: number): void {}
  handler = (e: string) => {};
  [Symbol.iterator]() {}
}
"#;
        let (arena, root) = lower(source);
        let stmts = statements(&arena, root);
        assert_eq!(stmts.len(), 1);

        let class = arena.get(stmts[0]);
        assert_eq!(class.name_text(), Some("Counter"));
        assert!(class.modifiers.export);
        assert_eq!(class.jsdoc.as_ref().unwrap().description, "A counter.");

        let SyntaxKind::ClassDeclaration { members, .. } = &class.kind else {
            panic!("expected class");
        };
        let kinds: Vec<&str> = members.iter().map(|m| arena.get(*m).kind.name()).collect();
        assert_eq!(
            kinds,
            vec![
                "PropertyDeclaration",
                "PropertyDeclaration",
                "PropertyDeclaration",
                "Constructor",
                "GetAccessor",
                "SetAccessor",
                "MethodDeclaration",
                "PropertyDeclaration",
                "MethodDeclaration",
            ]
        );

        let count = arena.get(members[0]);
        assert_eq!(count.jsdoc.as_ref().unwrap().description, "Current value.");
        assert!(arena.get(members[1]).modifiers.private);
        assert!(arena.get(members[2]).name.as_ref().unwrap().is_private_identifier());

        let SyntaxKind::PropertyDeclaration { initializer: Some(init), .. } = &arena.get(members[7]).kind else {
            panic!("expected initialized property");
        };
        assert!(arena.get(*init).is_function_like());

        assert_eq!(
            arena.get(members[8]).name,
            Some(MemberName::Computed(ComputedName::PropertyAccess {
                object: "Symbol".to_string(),
                member: "iterator".to_string(),
            }))
        );
    }

    #[test]
    fn test_function_signature() {
        let (arena, root) = lower("export function identity<T>(x: T, y?: number, ...rest: string[]): T { return x; }");
        let stmts = statements(&arena, root);
        let func = arena.get(stmts[0]);
        let SyntaxKind::FunctionDeclaration(f) = &func.kind else {
            panic!("expected function");
        };
        assert_eq!(f.type_parameters[0].name, "T");
        assert_eq!(f.parameters.len(), 3);
        assert!(f.returns_value);
        assert_eq!(
            f.return_type,
            Some(TypeNode::Reference {
                name: "T".to_string(),
                args: vec![]
            })
        );

        let SyntaxKind::Parameter { optional, .. } = &arena.get(f.parameters[1]).kind else {
            panic!("expected parameter");
        };
        assert!(*optional);
        let SyntaxKind::Parameter { rest, ty, .. } = &arena.get(f.parameters[2]).kind else {
            panic!("expected parameter");
        };
        assert!(*rest);
        assert!(matches!(ty, Some(TypeNode::Array(_))));
    }

    #[test]
    fn test_void_body_has_no_return_value() {
        let (arena, root) = lower("function f() { const g = () => { return 1; }; return; }");
        let stmts = statements(&arena, root);
        let SyntaxKind::FunctionDeclaration(f) = &arena.get(stmts[0]).kind else {
            panic!("expected function");
        };
        assert!(!f.returns_value);
    }

    #[test]
    fn test_imports_and_exports() {
        let source = r#"
import Default, { a, b as c } from "./dep";
import * as ns from "./ns";
export { a as x, c };
export { y } from "./other";
export * from "./all";
"#;
        let (arena, root) = lower(source);
        let kinds: Vec<SyntaxKind> = statements(&arena, root)
            .into_iter()
            .map(|s| arena.get(s).kind.clone())
            .collect();

        assert_eq!(
            kinds[0],
            SyntaxKind::ImportSpecifier {
                module: "./dep".to_string(),
                imported: "default".to_string()
            }
        );
        assert_eq!(
            kinds[2],
            SyntaxKind::ImportSpecifier {
                module: "./dep".to_string(),
                imported: "b".to_string()
            }
        );
        assert_eq!(
            kinds[3],
            SyntaxKind::ImportSpecifier {
                module: "./ns".to_string(),
                imported: "*".to_string()
            }
        );
        assert_eq!(
            kinds[4],
            SyntaxKind::ExportSpecifier {
                module: None,
                local: "a".to_string()
            }
        );
        assert_eq!(
            kinds[6],
            SyntaxKind::ExportSpecifier {
                module: Some("./other".to_string()),
                local: "y".to_string()
            }
        );
        assert_eq!(
            kinds[7],
            SyntaxKind::ExportStar {
                module: "./all".to_string()
            }
        );
    }

    #[test]
    fn test_type_nodes() {
        let source = "type T = Map<string, Foo[]> | { a: number } | ((x: number) => void) | null;";
        let (arena, root) = lower(source);
        let stmts = statements(&arena, root);
        let SyntaxKind::TypeAliasDeclaration { ty: TypeNode::Union(members), .. } = &arena.get(stmts[0]).kind else {
            panic!("expected union alias");
        };
        assert_eq!(members.len(), 4);
        assert!(matches!(&members[0], TypeNode::Reference { name, args } if name == "Map" && args.len() == 2));
        assert!(matches!(members[1], TypeNode::TypeLiteral(_)));
        assert!(matches!(&members[2], TypeNode::Parenthesized(inner) if matches!(**inner, TypeNode::Function(_))));
        assert!(matches!(&members[3], TypeNode::Literal(t) | TypeNode::Keyword(t) if t == "null"));
    }

    #[test]
    fn test_default_export_expression() {
        let (arena, root) = lower("export default \"hello\";");
        let stmts = statements(&arena, root);
        let node = arena.get(stmts[0]);
        assert!(node.modifiers.export && node.modifiers.default);
        assert_eq!(
            node.kind,
            SyntaxKind::StringLiteral {
                value: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_variables_and_interfaces() {
        let source = r#"
/** Doubles. */
export const double = (n: number): number => n * 2, other = 3;
interface Shape { /** Area. */ area(): number; name?: string; }
"#;
        let (arena, root) = lower(source);
        let stmts = statements(&arena, root);
        assert_eq!(stmts.len(), 3);

        let double = arena.get(stmts[0]);
        assert_eq!(double.jsdoc.as_ref().unwrap().description, "Doubles.");
        assert!(arena.get(stmts[1]).jsdoc.is_none());

        let SyntaxKind::InterfaceDeclaration { members, .. } = &arena.get(stmts[2]).kind else {
            panic!("expected interface");
        };
        assert_eq!(members.len(), 2);
        assert_eq!(arena.get(members[0]).kind.name(), "MethodSignature");
        assert_eq!(arena.get(members[0]).jsdoc.as_ref().unwrap().description, "Area.");
        assert!(matches!(arena.get(members[1]).kind, SyntaxKind::PropertySignature { optional: true, .. }));
    }
}
