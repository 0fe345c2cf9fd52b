// Syntax tree for parsed TypeScript declarations
//
// Every file of a program is lowered into one shared arena. Nodes refer to
// each other by `NodeId`, so the checker and the documentation walker can pass
// plain ids around and look the node up when they need it.

use crate::parser::jsdoc::JsDoc;
use std::fmt;

/// Index of a node in the `SyntaxArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a source file in its program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Line range of a node, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

/// Modifier keywords and export state of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub export: bool,
    pub default: bool,
    pub declare: bool,
    pub private: bool,
    pub protected: bool,
    pub is_static: bool,
    pub readonly: bool,
    pub is_abstract: bool,
    pub is_async: bool,
}

/// Name of a declaration or class member
#[derive(Debug, Clone, PartialEq)]
pub enum MemberName {
    Identifier(String),
    /// ECMAScript private name, stored with its leading `#`
    PrivateIdentifier(String),
    StringLiteral(String),
    NumericLiteral(String),
    Computed(ComputedName),
}

/// Expression inside `[...]` of a computed member name
#[derive(Debug, Clone, PartialEq)]
pub enum ComputedName {
    /// `[Symbol.iterator]` and friends
    PropertyAccess { object: String, member: String },
    Other(String),
}

impl MemberName {
    /// Plain text of the name, if it has one that can be bound
    pub fn text(&self) -> Option<&str> {
        match self {
            MemberName::Identifier(s)
            | MemberName::PrivateIdentifier(s)
            | MemberName::StringLiteral(s)
            | MemberName::NumericLiteral(s) => Some(s),
            MemberName::Computed(ComputedName::PropertyAccess { .. })
            | MemberName::Computed(ComputedName::Other(_)) => None,
        }
    }

    pub fn is_private_identifier(&self) -> bool {
        matches!(self, MemberName::PrivateIdentifier(_))
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberName::Identifier(s)
            | MemberName::PrivateIdentifier(s)
            | MemberName::StringLiteral(s)
            | MemberName::NumericLiteral(s) => write!(f, "{}", s),
            MemberName::Computed(ComputedName::PropertyAccess { object, member }) => {
                write!(f, "[{}.{}]", object, member)
            }
            MemberName::Computed(ComputedName::Other(text)) => write!(f, "[{}]", text),
        }
    }
}

/// A generic type parameter such as `T extends Base = Default`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: String,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
}

/// Shared shape of everything that has a call signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionLike {
    pub type_parameters: Vec<TypeParameter>,
    /// `Parameter` nodes in declaration order
    pub parameters: Vec<NodeId>,
    pub return_type: Option<TypeNode>,
    pub has_body: bool,
    /// Body contains a `return <expr>` outside nested functions
    pub returns_value: bool,
    pub is_arrow: bool,
}

/// Literal-ish expressions the checker can infer a type for
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number,
    Boolean,
    Null,
    Undefined,
    Template,
    Array,
    /// `new Name(...)`, holding the constructor text
    New(String),
    Other,
}

/// Type annotation syntax
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// `number`, `string`, `void`, `this`, ...
    Keyword(String),
    Reference { name: String, args: Vec<TypeNode> },
    /// `"a"`, `42`, `true`, `null`
    Literal(String),
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Parenthesized(Box<TypeNode>),
    /// `FunctionType` node in the arena
    Function(NodeId),
    /// `TypeLiteral` node in the arena
    TypeLiteral(NodeId),
    /// `typeof x`
    Query(String),
    /// Anything without structure we care about, as normalized source text
    Other(String),
}

/// Syntactic category of a node plus its payload
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxKind {
    SourceFile {
        statements: Vec<NodeId>,
    },
    ClassDeclaration {
        type_parameters: Vec<TypeParameter>,
        heritage: Vec<String>,
        members: Vec<NodeId>,
    },
    InterfaceDeclaration {
        type_parameters: Vec<TypeParameter>,
        members: Vec<NodeId>,
    },
    TypeAliasDeclaration {
        type_parameters: Vec<TypeParameter>,
        ty: TypeNode,
    },
    FunctionDeclaration(FunctionLike),
    VariableDeclaration {
        ty: Option<TypeNode>,
        initializer: Option<NodeId>,
        is_const: bool,
    },
    EnumDeclaration {
        members: Vec<String>,
    },
    ModuleDeclaration,
    Parameter {
        ty: Option<TypeNode>,
        initializer: Option<NodeId>,
        optional: bool,
        rest: bool,
    },
    Constructor(FunctionLike),
    MethodDeclaration(FunctionLike),
    PropertyDeclaration {
        ty: Option<TypeNode>,
        initializer: Option<NodeId>,
        optional: bool,
    },
    GetAccessor(FunctionLike),
    SetAccessor(FunctionLike),
    IndexSignature {
        text: String,
    },
    StaticBlock,
    PropertySignature {
        ty: Option<TypeNode>,
        optional: bool,
    },
    MethodSignature(FunctionLike),
    CallSignature(FunctionLike),
    FunctionType(FunctionLike),
    TypeLiteral {
        members: Vec<NodeId>,
    },
    FunctionExpression(FunctionLike),
    ObjectLiteralExpression {
        properties: Vec<(String, NodeId)>,
    },
    StringLiteral {
        value: String,
    },
    Expression {
        text: String,
        kind: ExprKind,
    },
    /// `import { imported as local } from "module"`; `imported` is `default` or `*` for those forms
    ImportSpecifier {
        module: String,
        imported: String,
    },
    /// `export { local as name }`, optionally `from "module"`
    ExportSpecifier {
        module: Option<String>,
        local: String,
    },
    /// `export * from "module"`
    ExportStar {
        module: String,
    },
    /// Tree-sitter node kind the lowering has no rule for
    Unknown {
        kind: String,
    },
}

impl SyntaxKind {
    /// Stable category name used in logs and errors
    pub fn name(&self) -> &str {
        match self {
            SyntaxKind::SourceFile { .. } => "SourceFile",
            SyntaxKind::ClassDeclaration { .. } => "ClassDeclaration",
            SyntaxKind::InterfaceDeclaration { .. } => "InterfaceDeclaration",
            SyntaxKind::TypeAliasDeclaration { .. } => "TypeAliasDeclaration",
            SyntaxKind::FunctionDeclaration(_) => "FunctionDeclaration",
            SyntaxKind::VariableDeclaration { .. } => "VariableDeclaration",
            SyntaxKind::EnumDeclaration { .. } => "EnumDeclaration",
            SyntaxKind::ModuleDeclaration => "ModuleDeclaration",
            SyntaxKind::Parameter { .. } => "Parameter",
            SyntaxKind::Constructor(_) => "Constructor",
            SyntaxKind::MethodDeclaration(_) => "MethodDeclaration",
            SyntaxKind::PropertyDeclaration { .. } => "PropertyDeclaration",
            SyntaxKind::GetAccessor(_) => "GetAccessor",
            SyntaxKind::SetAccessor(_) => "SetAccessor",
            SyntaxKind::IndexSignature { .. } => "IndexSignature",
            SyntaxKind::StaticBlock => "StaticBlock",
            SyntaxKind::PropertySignature { .. } => "PropertySignature",
            SyntaxKind::MethodSignature(_) => "MethodSignature",
            SyntaxKind::CallSignature(_) => "CallSignature",
            SyntaxKind::FunctionType(_) => "FunctionType",
            SyntaxKind::TypeLiteral { .. } => "TypeLiteral",
            SyntaxKind::FunctionExpression(_) => "FunctionExpression",
            SyntaxKind::ObjectLiteralExpression { .. } => "ObjectLiteralExpression",
            SyntaxKind::StringLiteral { .. } => "StringLiteral",
            SyntaxKind::Expression { .. } => "Expression",
            SyntaxKind::ImportSpecifier { .. } => "ImportSpecifier",
            SyntaxKind::ExportSpecifier { .. } => "ExportSpecifier",
            SyntaxKind::ExportStar { .. } => "ExportStar",
            SyntaxKind::Unknown { kind } => kind,
        }
    }

    /// Call signature of the node, if it has one
    pub fn function_like(&self) -> Option<&FunctionLike> {
        match self {
            SyntaxKind::FunctionDeclaration(f)
            | SyntaxKind::Constructor(f)
            | SyntaxKind::MethodDeclaration(f)
            | SyntaxKind::GetAccessor(f)
            | SyntaxKind::SetAccessor(f)
            | SyntaxKind::MethodSignature(f)
            | SyntaxKind::CallSignature(f)
            | SyntaxKind::FunctionType(f)
            | SyntaxKind::FunctionExpression(f) => Some(f),
            _ => None,
        }
    }

    /// Type parameters introduced by this node
    pub fn type_parameters(&self) -> &[TypeParameter] {
        match self {
            SyntaxKind::ClassDeclaration { type_parameters, .. }
            | SyntaxKind::InterfaceDeclaration { type_parameters, .. }
            | SyntaxKind::TypeAliasDeclaration { type_parameters, .. } => type_parameters,
            other => other
                .function_like()
                .map(|f| f.type_parameters.as_slice())
                .unwrap_or(&[]),
        }
    }
}

/// One node of the syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub name: Option<MemberName>,
    pub file: FileId,
    pub parent: Option<NodeId>,
    pub span: Span,
    pub modifiers: Modifiers,
    /// JSDoc block directly preceding the declaration
    pub jsdoc: Option<JsDoc>,
}

impl SyntaxNode {
    /// Plain name text, if any
    pub fn name_text(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.text())
    }

    /// True for nodes whose value is a function (`isFunctionLike` on an initializer)
    pub fn is_function_like(&self) -> bool {
        self.kind.function_like().is_some()
    }
}

/// Storage for all nodes of a program
#[derive(Debug, Default)]
pub struct SyntaxArena {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}
