// Types, signatures and documentation comments
//
// Types come from annotations where present; otherwise a small inference
// covers literal initializers, `new` expressions, object literals and
// function values. Rendering follows the compiler's display style, so
// signatures print as `<T>(x: T, y?: number) => T`.

use crate::checker::program::Program;
use crate::checker::symbols::{SymbolFlags, SymbolId};
use crate::error::{Error, Result};
use crate::parser::ast::{
    ExprKind, FunctionLike, NodeId, SyntaxKind, SyntaxNode, TypeNode, TypeParameter,
};
use crate::parser::jsdoc::JsDoc;
use std::collections::HashSet;

/// Guards alias-to-alias chains in type references
const MAX_ALIAS_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPartKind {
    Text,
    LineBreak,
}

/// One piece of a documentation comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPart {
    pub text: String,
    pub kind: DisplayPartKind,
}

impl DisplayPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: DisplayPartKind::Text,
        }
    }

    pub fn line_break() -> Self {
        Self {
            text: "\n".to_string(),
            kind: DisplayPartKind::LineBreak,
        }
    }
}

pub fn display_parts_to_string(parts: &[DisplayPart]) -> String {
    parts.iter().map(|p| p.text.as_str()).collect()
}

/// A type as written (or inferred) at some location
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub node: TypeNode,
    /// Node whose scope names in `node` are resolved in
    pub location: NodeId,
    /// Declared symbol of the type: class, interface, enum or anonymous `__type`
    pub symbol: Option<SymbolId>,
    /// Type alias the type was referenced through
    pub alias_symbol: Option<SymbolId>,
}

/// Call signature of a function-like declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub declaration: NodeId,
    pub type_parameters: Vec<TypeParameter>,
    /// Parameter symbols in declaration order
    pub parameters: Vec<SymbolId>,
    pub return_type: Type,
}

fn keyword(name: &str) -> TypeNode {
    TypeNode::Keyword(name.to_string())
}

impl Program {
    /// Documentation of every declaration of `symbol`, separated by line breaks
    pub fn documentation_comment(&self, symbol: SymbolId) -> Vec<DisplayPart> {
        let mut parts = Vec::new();
        for &decl in &self.symbol(symbol).declarations {
            let Some(text) = self.declaration_doc(decl).filter(|t| !t.is_empty()) else {
                continue;
            };
            if !parts.is_empty() {
                parts.push(DisplayPart::line_break());
            }
            parts.push(DisplayPart::text(text));
        }
        parts
    }

    fn declaration_doc(&self, decl: NodeId) -> Option<String> {
        let node = self.node(decl);
        match node.kind {
            // Parameters are documented by `@param` tags on their function
            SyntaxKind::Parameter { .. } => {
                let name = node.name_text()?;
                let doc = self.function_jsdoc(node.parent?)?;
                doc.param(name).map(str::to_string)
            }
            _ => node.jsdoc.as_ref().map(|doc| doc.description.clone()),
        }
    }

    /// JSDoc of a function, or of the variable or property holding it
    fn function_jsdoc(&self, func: NodeId) -> Option<&JsDoc> {
        let node = self.node(func);
        if let Some(doc) = &node.jsdoc {
            return Some(doc);
        }
        let owner = self.initializer_owner(func)?;
        self.node(owner).jsdoc.as_ref()
    }

    /// Variable or property declaration whose initializer is `id`
    fn initializer_owner(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        match &self.node(parent).kind {
            SyntaxKind::VariableDeclaration {
                initializer: Some(init),
                ..
            }
            | SyntaxKind::PropertyDeclaration {
                initializer: Some(init),
                ..
            } if *init == id => Some(parent),
            _ => None,
        }
    }

    pub fn signature_from_declaration(&self, decl: NodeId) -> Result<Signature> {
        let node = self.node(decl);
        let func = node.kind.function_like().ok_or_else(|| {
            Error::unsupported(
                format!("{} without a call signature", node.kind.name()),
                self.location(decl),
            )
        })?;

        let parameters = func
            .parameters
            .iter()
            .filter_map(|p| self.symbol_at_location(*p))
            .collect();

        Ok(Signature {
            declaration: decl,
            type_parameters: func.type_parameters.clone(),
            parameters,
            return_type: self.resolve_type(self.return_type_node(node, func), decl),
        })
    }

    fn return_type_node(&self, node: &SyntaxNode, func: &FunctionLike) -> TypeNode {
        if let SyntaxKind::Constructor(_) = node.kind {
            return self.constructed_class_type(node);
        }

        let inferred = match &func.return_type {
            Some(annotated) => return annotated.clone(),
            None if matches!(node.kind, SyntaxKind::SetAccessor(_)) => keyword("void"),
            None if func.returns_value => keyword("any"),
            None if !func.has_body && !func.is_arrow => keyword("any"),
            None => keyword("void"),
        };

        if node.modifiers.is_async {
            TypeNode::Reference {
                name: "Promise".to_string(),
                args: vec![inferred],
            }
        } else {
            inferred
        }
    }

    /// `Foo<T>` for a constructor of `class Foo<T>`
    fn constructed_class_type(&self, constructor: &SyntaxNode) -> TypeNode {
        let Some(class) = constructor.parent.map(|p| self.node(p)) else {
            return keyword("any");
        };
        TypeNode::Reference {
            name: class.name_text().unwrap_or("default").to_string(),
            args: class
                .kind
                .type_parameters()
                .iter()
                .map(|p| TypeNode::Reference {
                    name: p.name.clone(),
                    args: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn signature_to_string(&self, signature: &Signature) -> String {
        self.signature_text(signature.declaration)
    }

    /// Type of `symbol` as seen at `node`, normally one of its declarations
    pub fn type_of_symbol_at_location(&self, symbol: SymbolId, node: NodeId) -> Type {
        let declarations = &self.symbol(symbol).declarations;
        let decl = if declarations.contains(&node) {
            node
        } else {
            declarations.first().copied().unwrap_or(node)
        };
        self.resolve_type(self.declared_type_node(decl), decl)
    }

    /// Annotated or inferred type of a declaration
    fn declared_type_node(&self, decl: NodeId) -> TypeNode {
        let node = self.node(decl);
        match &node.kind {
            SyntaxKind::Parameter {
                ty,
                initializer,
                rest,
                ..
            } => match (ty, initializer) {
                (Some(ty), _) => ty.clone(),
                (None, Some(init)) => self.infer_expression(*init),
                (None, None) if *rest => TypeNode::Array(Box::new(keyword("any"))),
                (None, None) => keyword("any"),
            },
            SyntaxKind::VariableDeclaration { ty, initializer, .. }
            | SyntaxKind::PropertyDeclaration { ty, initializer, .. } => match (ty, initializer) {
                (Some(ty), _) => ty.clone(),
                (None, Some(init)) => self.infer_expression(*init),
                (None, None) => keyword("any"),
            },
            SyntaxKind::PropertySignature { ty, .. } => ty.clone().unwrap_or_else(|| keyword("any")),
            SyntaxKind::GetAccessor(func) => self.return_type_node(node, func),
            SyntaxKind::SetAccessor(func) => func
                .parameters
                .first()
                .map(|p| self.declared_type_node(*p))
                .unwrap_or_else(|| keyword("any")),
            SyntaxKind::ClassDeclaration { .. } => {
                TypeNode::Query(node.name_text().unwrap_or("default").to_string())
            }
            SyntaxKind::InterfaceDeclaration { .. }
            | SyntaxKind::TypeAliasDeclaration { .. }
            | SyntaxKind::EnumDeclaration { .. } => TypeNode::Reference {
                name: node.name_text().unwrap_or("default").to_string(),
                args: Vec::new(),
            },
            kind if kind.function_like().is_some() => TypeNode::Function(decl),
            SyntaxKind::ObjectLiteralExpression { .. }
            | SyntaxKind::StringLiteral { .. }
            | SyntaxKind::Expression { .. } => self.infer_expression(decl),
            _ => keyword("any"),
        }
    }

    /// Type of an expression without annotations
    fn infer_expression(&self, expr: NodeId) -> TypeNode {
        let node = self.node(expr);
        match &node.kind {
            SyntaxKind::StringLiteral { .. } => keyword("string"),
            SyntaxKind::ObjectLiteralExpression { .. } => TypeNode::TypeLiteral(expr),
            SyntaxKind::Expression { kind, .. } => match kind {
                ExprKind::Number => keyword("number"),
                ExprKind::Boolean => keyword("boolean"),
                ExprKind::Template => keyword("string"),
                ExprKind::Null => keyword("null"),
                ExprKind::Undefined => keyword("undefined"),
                ExprKind::Array => TypeNode::Array(Box::new(keyword("any"))),
                ExprKind::New(name) if !name.is_empty() => TypeNode::Reference {
                    name: name.clone(),
                    args: Vec::new(),
                },
                _ => keyword("any"),
            },
            kind if kind.function_like().is_some() => TypeNode::Function(expr),
            _ => keyword("any"),
        }
    }

    /// Attach the symbols a type node refers to
    pub(crate) fn resolve_type(&self, node: TypeNode, location: NodeId) -> Type {
        let (symbol, alias_symbol) = self.type_symbols(&node, location, 0);
        Type {
            node,
            location,
            symbol,
            alias_symbol,
        }
    }

    fn type_symbols(&self, node: &TypeNode, location: NodeId, depth: usize) -> (Option<SymbolId>, Option<SymbolId>) {
        if depth > MAX_ALIAS_DEPTH {
            return (None, None);
        }

        match node {
            TypeNode::Reference { name, .. } => {
                if self.is_type_parameter(name, location) {
                    return (None, None);
                }
                let Some(target) = self.resolve_entity_name(name, location) else {
                    return (None, None);
                };
                let symbol = self.symbol(target);

                if symbol
                    .flags
                    .intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE | SymbolFlags::ENUM)
                {
                    (Some(target), None)
                } else if symbol.flags.contains(SymbolFlags::TYPE_ALIAS) {
                    let aliased = symbol
                        .declarations
                        .first()
                        .and_then(|decl| match &self.node(*decl).kind {
                            SyntaxKind::TypeAliasDeclaration { ty, .. } => {
                                self.type_symbols(ty, *decl, depth + 1).0
                            }
                            _ => None,
                        });
                    (aliased, Some(target))
                } else {
                    (None, None)
                }
            }
            TypeNode::TypeLiteral(id) | TypeNode::Function(id) => (self.symbol_at_location(*id), None),
            TypeNode::Parenthesized(inner) => self.type_symbols(inner, location, depth + 1),
            TypeNode::Query(name) => {
                let class = self
                    .resolve_entity_name(name, location)
                    .filter(|s| self.symbol(*s).flags.contains(SymbolFlags::CLASS));
                (class, None)
            }
            _ => (None, None),
        }
    }

    /// True if `name` is a type parameter of `location` or an enclosing declaration
    fn is_type_parameter(&self, name: &str, location: NodeId) -> bool {
        let mut current = Some(location);
        while let Some(id) = current {
            let node = self.node(id);
            if node.kind.type_parameters().iter().any(|p| p.name == name) {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Resolve `a` or `ns.a` in the module scope of `location`'s file
    fn resolve_entity_name(&self, name: &str, location: NodeId) -> Option<SymbolId> {
        let file = self.node(location).file;
        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut current = self.aliased_symbol(*self.scope(file).locals.get(first)?)?;

        for segment in segments {
            let module_file = self
                .source_files()
                .iter()
                .find(|f| self.scope(f.id).module == current)?
                .id;
            let exported = self.export_named(module_file, segment, &mut HashSet::new())?;
            current = self.aliased_symbol(exported)?;
        }

        Some(current)
    }

    pub fn type_to_string(&self, ty: &Type) -> String {
        self.render(&ty.node)
    }

    fn render(&self, node: &TypeNode) -> String {
        match node {
            TypeNode::Keyword(text) | TypeNode::Literal(text) | TypeNode::Other(text) => text.clone(),
            TypeNode::Reference { name, args } if args.is_empty() => name.clone(),
            TypeNode::Reference { name, args } => format!("{}<{}>", name, self.render_list(args, ", ")),
            TypeNode::Array(inner) => {
                let element = self.render(inner);
                if matches!(
                    unwrap_parens(inner),
                    TypeNode::Union(_) | TypeNode::Intersection(_) | TypeNode::Function(_)
                ) {
                    format!("({})[]", element)
                } else {
                    format!("{}[]", element)
                }
            }
            TypeNode::Tuple(elements) => format!("[{}]", self.render_list(elements, ", ")),
            TypeNode::Union(members) => members
                .iter()
                .map(|m| self.render_operand(m, false))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeNode::Intersection(members) => members
                .iter()
                .map(|m| self.render_operand(m, true))
                .collect::<Vec<_>>()
                .join(" & "),
            TypeNode::Parenthesized(inner) => self.render(inner),
            TypeNode::Function(id) => self.signature_text(*id),
            TypeNode::TypeLiteral(id) => self.render_type_literal(*id),
            TypeNode::Query(name) => format!("typeof {}", name),
        }
    }

    fn render_list(&self, nodes: &[TypeNode], separator: &str) -> String {
        nodes
            .iter()
            .map(|n| self.render(n))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Member of a union or intersection, parenthesized where precedence needs it
    fn render_operand(&self, node: &TypeNode, in_intersection: bool) -> String {
        let text = self.render(node);
        match unwrap_parens(node) {
            TypeNode::Function(_) => format!("({})", text),
            TypeNode::Union(_) if in_intersection => format!("({})", text),
            _ => text,
        }
    }

    /// `<T>(x: T) => T` for a function-like node
    fn signature_text(&self, decl: NodeId) -> String {
        let node = self.node(decl);
        let Some(func) = node.kind.function_like() else {
            return "any".to_string();
        };
        format!(
            "{}({}) => {}",
            self.render_type_parameters(&func.type_parameters),
            self.render_parameters(func),
            self.render(&self.return_type_node(node, func))
        )
    }

    fn render_parameters(&self, func: &FunctionLike) -> String {
        func.parameters
            .iter()
            .map(|p| self.parameter_text(*p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn parameter_text(&self, param: NodeId) -> String {
        let node = self.node(param);
        let name = node.name_text().unwrap_or("__0");
        match &node.kind {
            SyntaxKind::Parameter {
                initializer,
                optional,
                rest,
                ..
            } => format!(
                "{}{}{}: {}",
                if *rest { "..." } else { "" },
                name,
                if *optional || initializer.is_some() { "?" } else { "" },
                self.render(&self.declared_type_node(param))
            ),
            _ => name.to_string(),
        }
    }

    fn render_type_parameters(&self, params: &[TypeParameter]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = params
            .iter()
            .map(|p| {
                let mut text = p.name.clone();
                if let Some(constraint) = &p.constraint {
                    text.push_str(" extends ");
                    text.push_str(&self.render(constraint));
                }
                if let Some(default) = &p.default {
                    text.push_str(" = ");
                    text.push_str(&self.render(default));
                }
                text
            })
            .collect();
        format!("<{}>", rendered.join(", "))
    }

    /// `{ a: number; b?: string; }`
    fn render_type_literal(&self, id: NodeId) -> String {
        let members: Vec<String> = match &self.node(id).kind {
            SyntaxKind::TypeLiteral { members } => members.iter().map(|m| self.member_text(*m)).collect(),
            SyntaxKind::ObjectLiteralExpression { properties } => properties
                .iter()
                .map(|(name, value)| format!("{}: {}", name, self.render(&self.infer_expression(*value))))
                .collect(),
            _ => Vec::new(),
        };

        if members.is_empty() {
            "{}".to_string()
        } else {
            let body: Vec<String> = members.into_iter().map(|m| format!("{};", m)).collect();
            format!("{{ {} }}", body.join(" "))
        }
    }

    fn member_text(&self, member: NodeId) -> String {
        let node = self.node(member);
        let name = node.name.as_ref().map(|n| n.to_string()).unwrap_or_default();
        let readonly = if node.modifiers.readonly { "readonly " } else { "" };

        match &node.kind {
            SyntaxKind::PropertySignature { ty, optional } => format!(
                "{}{}{}: {}",
                readonly,
                name,
                if *optional { "?" } else { "" },
                ty.as_ref().map(|t| self.render(t)).unwrap_or_else(|| "any".to_string())
            ),
            SyntaxKind::MethodSignature(func) | SyntaxKind::CallSignature(func) => {
                let prefix = match &node.kind {
                    SyntaxKind::CallSignature(_) if name == "new" => "new ".to_string(),
                    SyntaxKind::CallSignature(_) => String::new(),
                    _ => name,
                };
                format!(
                    "{}{}({}): {}",
                    prefix,
                    self.render_type_parameters(&func.type_parameters),
                    self.render_parameters(func),
                    self.render(&self.return_type_node(node, func))
                )
            }
            SyntaxKind::IndexSignature { text } => text.trim_end_matches(|c| c == ';' || c == ',').to_string(),
            _ => name,
        }
    }
}

fn unwrap_parens(node: &TypeNode) -> &TypeNode {
    match node {
        TypeNode::Parenthesized(inner) => unwrap_parens(inner),
        other => other,
    }
}
