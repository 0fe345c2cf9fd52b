// Dispatch of queued declarations by syntax category

use super::Generator;
use crate::checker::TypeChecker;
use crate::error::{Error, Result};
use crate::parser::ast::{NodeId, SyntaxKind};
use tracing::debug;

impl<'c, C: TypeChecker + ?Sized> Generator<'c, C> {
    /// Visit one declaration taken off the worklist
    pub(super) fn visit(&mut self, id: NodeId) -> Result<()> {
        let checker = self.checker;
        let node = checker.node(id);

        match &node.kind {
            SyntaxKind::ClassDeclaration { .. } if node.name.is_some() => self.visit_class(id),
            SyntaxKind::TypeAliasDeclaration { .. } => Ok(()),
            SyntaxKind::StringLiteral { value } => {
                debug!(value = %value, "string literal");
                Ok(())
            }
            SyntaxKind::VariableDeclaration {
                initializer: Some(init),
                ..
            } if checker.node(*init).is_function_like() => {
                let name = self.declared_name(id);
                self.visit_method(*init, &name, None)
            }
            SyntaxKind::VariableDeclaration { .. } => {
                debug!(name = %self.declared_name(id), "variable without a function value");
                Ok(())
            }
            SyntaxKind::FunctionDeclaration(_) => {
                let name = self.declared_name(id);
                self.visit_method(id, &name, None)
            }
            SyntaxKind::FunctionType(_) => {
                debug!(location = %checker.location(id), "function type");
                Ok(())
            }
            SyntaxKind::FunctionExpression(_) => {
                debug!(name = node.name_text().unwrap_or("<unknown>"), "function expression");
                Ok(())
            }
            SyntaxKind::InterfaceDeclaration { .. } => {
                debug!(name = %self.declared_name(id), "interface");
                Ok(())
            }
            SyntaxKind::ObjectLiteralExpression { .. } => {
                debug!(location = %checker.location(id), "object literal");
                Ok(())
            }
            SyntaxKind::TypeLiteral { .. } => {
                debug!(location = %checker.location(id), "type literal");
                Ok(())
            }
            kind => Err(Error::unsupported(kind.name(), checker.location(id))),
        }
    }

    /// Name as written, else the name of the declared symbol (`default`)
    fn declared_name(&self, id: NodeId) -> String {
        let checker = self.checker;
        if let Some(name) = checker.node(id).name_text() {
            return name.to_string();
        }
        checker
            .symbol_at_location(id)
            .map(|s| checker.symbol(s).name.clone())
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}
