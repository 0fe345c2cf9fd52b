// Entry extraction for classes, methods and properties

use super::entry::{ArgEntry, DocEntry, EntryKind};
use super::Generator;
use crate::checker::{display_parts_to_string, SymbolId, TypeChecker};
use crate::error::{Error, Result};
use crate::parser::ast::{ComputedName, MemberName, NodeId, SyntaxKind, SyntaxNode};
use std::path::Path;
use tracing::debug;

impl<'c, C: TypeChecker + ?Sized> Generator<'c, C> {
    /// Emit a method entry for a function-like declaration.
    ///
    /// Parameter and return types are requested so the declarations behind
    /// them get documented too.
    pub(super) fn visit_method(&mut self, decl: NodeId, name: &str, class_name: Option<&str>) -> Result<()> {
        let checker = self.checker;
        let symbol = self.symbol_of(decl)?;
        let signature = checker.signature_from_declaration(decl)?;

        let mut args = Vec::with_capacity(signature.parameters.len());
        for &param in &signature.parameters {
            let param_symbol = checker.symbol(param);
            let param_decl = param_symbol
                .declarations
                .first()
                .copied()
                .ok_or_else(|| Error::missing_declaration(param_symbol.name.clone()))?;

            let ty = checker.type_of_symbol_at_location(param, param_decl);
            self.worklist.request_visit_type(checker, &ty)?;
            args.push(ArgEntry {
                name: param_symbol.name.clone(),
                typestr: Some(checker.type_to_string(&ty)),
                docstr: self.flat_docstr(param),
            });
        }

        self.worklist.request_visit_type(checker, &signature.return_type)?;

        let entry = DocEntry {
            typestr: Some(checker.signature_to_string(&signature)),
            docstr: self.flat_docstr(symbol),
            args: Some(args),
            ret_type: Some(checker.type_to_string(&signature.return_type)),
            source_url: self.source_url(decl),
            ..DocEntry::new(EntryKind::Method, qualified_name(name, class_name))
        };
        self.output.push(entry);
        Ok(())
    }

    /// Emit the class entry followed by entries for its public members
    pub(super) fn visit_class(&mut self, decl: NodeId) -> Result<()> {
        let checker = self.checker;
        let node = checker.node(decl);
        let SyntaxKind::ClassDeclaration { members, .. } = &node.kind else {
            return Err(Error::unsupported(node.kind.name(), checker.location(decl)));
        };
        let class_name = node.name_text().unwrap_or("default");
        let symbol = self.symbol_of(decl)?;

        self.output.push(DocEntry {
            docstr: self.flat_docstr(symbol),
            source_url: self.source_url(decl),
            ..DocEntry::new(EntryKind::Class, class_name)
        });

        for &member in members {
            let member_node = checker.node(member);
            if is_private(member_node) {
                debug!(class = class_name, member = %member_display_name(member_node), "skipping private member");
                continue;
            }
            let name = member_display_name(member_node);

            match &member_node.kind {
                SyntaxKind::Constructor(_) => self.visit_method(member, "constructor", Some(class_name))?,
                SyntaxKind::MethodDeclaration(_) => self.visit_method(member, &name, Some(class_name))?,
                SyntaxKind::PropertyDeclaration {
                    initializer: Some(init),
                    ..
                } if checker.node(*init).is_function_like() => {
                    self.visit_method(*init, &name, Some(class_name))?
                }
                SyntaxKind::PropertyDeclaration { .. } | SyntaxKind::GetAccessor(_) => {
                    self.visit_prop(member, &name, Some(class_name))?
                }
                kind => debug!(class = class_name, kind = kind.name(), "class member without an entry"),
            }
        }

        Ok(())
    }

    /// Emit a property entry typed at the member itself
    pub(super) fn visit_prop(&mut self, decl: NodeId, name: &str, class_name: Option<&str>) -> Result<()> {
        let checker = self.checker;
        let symbol = self.symbol_of(decl)?;
        let ty = checker.type_of_symbol_at_location(symbol, decl);

        let entry = DocEntry {
            typestr: Some(checker.type_to_string(&ty)),
            docstr: self.flat_docstr(symbol),
            source_url: self.source_url(decl),
            ..DocEntry::new(EntryKind::Property, qualified_name(name, class_name))
        };
        self.output.push(entry);
        Ok(())
    }

    fn symbol_of(&self, decl: NodeId) -> Result<SymbolId> {
        self.checker
            .symbol_at_location(decl)
            .ok_or_else(|| Error::missing_declaration(format!("symbol at {}", self.checker.location(decl))))
    }

    /// Documentation text, absent when there is none
    fn flat_docstr(&self, symbol: SymbolId) -> Option<String> {
        let parts = self.checker.documentation_comment(symbol);
        if parts.is_empty() {
            None
        } else {
            Some(display_parts_to_string(&parts))
        }
    }

    /// `path#Lstart-Lend` relative to the root file's directory
    fn source_url(&self, decl: NodeId) -> Option<String> {
        if !self.options.source_locators {
            return None;
        }
        let checker = self.checker;
        let node = checker.node(decl);
        let path = &checker.source_file(node.file).path;
        let base = checker.root_file().path.parent().unwrap_or(Path::new(""));
        let relative = path.strip_prefix(base).unwrap_or(path);

        let start = node
            .jsdoc
            .as_ref()
            .map(|doc| doc.start_line)
            .unwrap_or(node.span.start_line);
        Some(format!(
            "{}#L{}-L{}",
            relative.to_string_lossy().replace('\\', "/"),
            start,
            node.span.end_line
        ))
    }
}

fn is_private(node: &SyntaxNode) -> bool {
    node.modifiers.private
        || node
            .name
            .as_ref()
            .map(MemberName::is_private_identifier)
            .unwrap_or(false)
}

/// Display name of a class member
fn member_display_name(node: &SyntaxNode) -> String {
    match &node.name {
        Some(MemberName::Computed(ComputedName::Other(_))) | None => "<unknown>".to_string(),
        Some(name) => name.to_string(),
    }
}

/// `Class.member`, `Class[Symbol.iterator]`, or the bare name outside a class
fn qualified_name(name: &str, class_name: Option<&str>) -> String {
    match class_name {
        None => name.to_string(),
        Some(class) if name.starts_with('[') => format!("{}{}", class, name),
        Some(class) => format!("{}.{}", class, name),
    }
}
