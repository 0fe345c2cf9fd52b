// Symbol discovery worklist
//
// FIFO queue of declaration nodes still to visit plus the set of symbols
// already scheduled. The set is keyed by alias-resolved symbols, so a
// declaration reached through any number of re-exports is queued once.

use crate::checker::{SymbolId, Type, TypeChecker};
use crate::error::{Error, Result};
use crate::parser::ast::NodeId;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<NodeId>,
    history: HashSet<SymbolId>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the first declaration of `symbol` unless it was scheduled before
    pub fn request_visit<C: TypeChecker + ?Sized>(&mut self, checker: &C, symbol: SymbolId) -> Result<()> {
        let symbol = skip_alias(checker, symbol)?;
        if !self.history.insert(symbol) {
            return Ok(());
        }

        let target = checker.symbol(symbol);
        // Merged declarations: only the first one is documented
        let decl = target
            .declarations
            .first()
            .copied()
            .ok_or_else(|| Error::missing_declaration(target.name.clone()))?;

        debug!(symbol = %target.name, flags = ?target.flags, "queued for visit");
        self.queue.push_back(decl);
        Ok(())
    }

    /// Schedule the declaration behind a type, if it has one.
    ///
    /// Primitive, structural and external types have no symbol and are only
    /// ever rendered inline.
    pub fn request_visit_type<C: TypeChecker + ?Sized>(&mut self, checker: &C, ty: &Type) -> Result<()> {
        if let Some(symbol) = ty.symbol {
            self.request_visit(checker, symbol)
        } else if let Some(alias) = ty.alias_symbol {
            self.request_visit(checker, alias)
        } else {
            Ok(())
        }
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Every symbol scheduled so far, alias-resolved
    pub fn history(&self) -> &HashSet<SymbolId> {
        &self.history
    }
}

fn skip_alias<C: TypeChecker + ?Sized>(checker: &C, symbol: SymbolId) -> Result<SymbolId> {
    let resolved = checker.symbol(symbol);
    if !resolved.is_alias() {
        return Ok(symbol);
    }
    checker
        .aliased_symbol(symbol)
        .ok_or_else(|| Error::missing_declaration(format!("{} (unresolved alias)", resolved.name)))
}
