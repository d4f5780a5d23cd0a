//! Statement-list rewriting.
//!
//! A pass implements [`StmtTransformer::transform_stmt`] and, to replace the
//! statement it is looking at, pushes zero or more statements into its
//! [`ReplacementBuffer`]. The framework rebuilds every statement list it
//! walks (program, function and block bodies, loop bodies, both branches of
//! an `if`, and the unit's own items), splicing replacements in place of the
//! original statement. Nested lists are rewritten before the statement that
//! contains them.
//!
//! Rebuilt lists are fresh arena vectors; the old lists become garbage.

use smallvec::SmallVec;

use super::stmt::StmtKind;
use super::symbol::Symbol;
use super::unit::{TranslationUnit, UnitItem};
use super::AsrArena;
use crate::stack::ensure_sufficient_stack;
use crate::{ArenaVec, ScopeId, StmtId, SymbolId};

/// Replacements recorded for the statement currently being transformed.
#[derive(Debug, Default)]
pub struct ReplacementBuffer {
    pending: Option<SmallVec<[StmtId; 4]>>,
    changed: bool,
}

impl ReplacementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current statement with `stmt` (plus anything pushed
    /// afterwards).
    pub fn push(&mut self, stmt: StmtId) {
        self.pending.get_or_insert_with(SmallVec::new).push(stmt);
    }

    /// Replace the current statement with `stmts`.
    pub fn replace_with(&mut self, stmts: impl IntoIterator<Item = StmtId>) {
        self.pending.get_or_insert_with(SmallVec::new).extend(stmts);
    }

    /// Drop the current statement.
    pub fn remove(&mut self) {
        self.pending.get_or_insert_with(SmallVec::new);
    }

    /// Whether any statement list was rebuilt since the last reset.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn reset_changed(&mut self) {
        self.changed = false;
    }

    fn take(&mut self) -> Option<SmallVec<[StmtId; 4]>> {
        self.pending.take()
    }
}

pub trait StmtTransformer {
    fn replacements(&mut self) -> &mut ReplacementBuffer;

    /// Look at one statement of a list in `scope`. Leave the buffer alone to
    /// keep it.
    fn transform_stmt(&mut self, arena: &mut AsrArena, scope: ScopeId, stmt: StmtId);

    /// Called with the rewritten body of a program, function or block
    /// before it is stored back. May append or reorder statements.
    fn finish_body(
        &mut self,
        _arena: &mut AsrArena,
        _scope: ScopeId,
        _owner: SymbolId,
        _body: &mut Vec<StmtId>,
    ) {
    }
}

/// Rewrite every statement list reachable from `unit`.
pub fn transform_unit<T: StmtTransformer + ?Sized>(
    t: &mut T,
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
) {
    transform_scope(t, arena, unit.global_scope);

    let items = arena.list(unit.items);
    let mut out = Vec::with_capacity(items.len());
    let mut spliced = false;
    for item in items {
        let UnitItem::Stmt(stmt) = item else {
            out.push(item);
            continue;
        };
        match transform_one(t, arena, unit.global_scope, stmt) {
            Some(repl) => {
                out.extend(repl.into_iter().map(UnitItem::Stmt));
                spliced = true;
            }
            None => out.push(item),
        }
    }
    if spliced {
        unit.items = arena.new_list(&out);
    }
}

pub fn transform_scope<T: StmtTransformer + ?Sized>(t: &mut T, arena: &mut AsrArena, scope: ScopeId) {
    for sym in arena.scope(scope).symbols() {
        transform_symbol(t, arena, sym);
    }
}

pub fn transform_symbol<T: StmtTransformer + ?Sized>(
    t: &mut T,
    arena: &mut AsrArena,
    sym: SymbolId,
) {
    ensure_sufficient_stack(|| {
        let (symtab, body) = match *arena.symbol(sym) {
            Symbol::Program(x) => (x.symtab, x.body),
            Symbol::Function(x) => (x.symtab, x.body),
            Symbol::Block(x) => (x.symtab, x.body),
            Symbol::Module(x) => {
                transform_scope(t, arena, x.symtab);
                return;
            }
            Symbol::Variable(_) | Symbol::ExternalSymbol(_) => return,
        };
        transform_scope(t, arena, symtab);

        let new_body = transform_stmts(t, arena, symtab, body);
        let before = arena.list(new_body);
        let mut stmts = before.clone();
        t.finish_body(arena, symtab, sym, &mut stmts);
        let new_body = if new_body == body && stmts == before {
            body
        } else if stmts == before {
            t.replacements().changed = true;
            new_body
        } else {
            t.replacements().changed = true;
            arena.new_list(&stmts)
        };
        match arena.symbol_mut(sym) {
            Symbol::Program(x) => x.body = new_body,
            Symbol::Function(x) => x.body = new_body,
            Symbol::Block(x) => x.body = new_body,
            _ => {}
        }
    });
}

/// Rewrite one statement list, returning the (possibly new) list.
pub fn transform_stmts<T: StmtTransformer + ?Sized>(
    t: &mut T,
    arena: &mut AsrArena,
    scope: ScopeId,
    body: ArenaVec<StmtId>,
) -> ArenaVec<StmtId> {
    let stmts = arena.list(body);
    let mut out = Vec::with_capacity(stmts.len());
    let mut spliced = false;
    for stmt in stmts {
        match transform_one(t, arena, scope, stmt) {
            Some(repl) => {
                out.extend(repl);
                spliced = true;
            }
            None => out.push(stmt),
        }
    }
    if spliced {
        arena.new_list(&out)
    } else {
        body
    }
}

fn transform_one<T: StmtTransformer + ?Sized>(
    t: &mut T,
    arena: &mut AsrArena,
    scope: ScopeId,
    stmt: StmtId,
) -> Option<SmallVec<[StmtId; 4]>> {
    transform_nested(t, arena, scope, stmt);
    t.replacements().pending = None;
    t.transform_stmt(arena, scope, stmt);
    let repl = t.replacements().take();
    if repl.is_some() {
        t.replacements().changed = true;
    }
    repl
}

/// Rewrite the statement lists directly contained in `stmt`.
fn transform_nested<T: StmtTransformer + ?Sized>(
    t: &mut T,
    arena: &mut AsrArena,
    scope: ScopeId,
    stmt: StmtId,
) {
    ensure_sufficient_stack(|| {
        let new_kind = match *arena.stmt(stmt) {
            StmtKind::If { test, body, orelse } => StmtKind::If {
                test,
                body: transform_stmts(t, arena, scope, body),
                orelse: transform_stmts(t, arena, scope, orelse),
            },
            StmtKind::WhileLoop { test, body } => StmtKind::WhileLoop {
                test,
                body: transform_stmts(t, arena, scope, body),
            },
            StmtKind::DoLoop { head, body } => StmtKind::DoLoop {
                head,
                body: transform_stmts(t, arena, scope, body),
            },
            StmtKind::DoConcurrentLoop { head, body } => StmtKind::DoConcurrentLoop {
                head,
                body: transform_stmts(t, arena, scope, body),
            },
            _ => return,
        };
        if new_kind != *arena.stmt(stmt) {
            arena.set_stmt(stmt, new_kind);
        }
    });
}
