//! ASR verifier.
//!
//! Walks a translation unit and checks the structural invariants every pass
//! relies on:
//!
//! - the global scope has no parent and is owned by the unit
//! - scope counters are unique
//! - every member scope's parent is the enclosing scope and its owner is the
//!   symbol holding it
//! - programs and modules live in the global scope
//! - every symbol is held by its own parent scope under its own name
//! - `Var`, `FunctionCall`, `SubroutineCall` and `BlockCall` references
//!   point at a symbol held by a scope visible from the reference
//! - dependencies are identifiers
//! - unit items are statements or expressions
//! - loop variables are integers
//! - external symbols are linked to a symbol of the named module
//!   (when `check_external` is set)
//!
//! Every failed check adds a diagnostic; the walk goes on so one run
//! reports everything it finds.

use rustc_hash::FxHashMap;

use lasr_ir::asr::visitor::{walk_expr, walk_stmt, walk_symbol, walk_unit, Visitor};
use lasr_ir::asr::{
    AsrArena, DoLoopHead, ExprKind, ExternalSymbol, StmtKind, Symbol, TranslationUnit, Ttype,
    UnitItem,
};
use lasr_ir::symtab::ScopeOwner;
use lasr_ir::{ArenaStr, ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId};

use crate::diagnostic::{Diagnostic, ErrorCode};
use crate::error::VerifyError;

/// Check `unit`, appending a diagnostic per violation.
///
/// Returns `true` when nothing was reported.
pub fn verify(
    arena: &AsrArena,
    unit: &TranslationUnit,
    check_external: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let before = diagnostics.len();
    let mut v = Verifier {
        check_external,
        diagnostics,
        counters: FxHashMap::default(),
        current: unit.global_scope,
    };
    v.visit_unit(arena, unit);
    let found = v.diagnostics.len() - before;
    if found > 0 {
        tracing::debug!(found, "verification failed");
    }
    found == 0
}

/// [`verify`] as a `Result`.
pub fn verify_unit(
    arena: &AsrArena,
    unit: &TranslationUnit,
    check_external: bool,
) -> Result<(), VerifyError> {
    let mut diagnostics = Vec::new();
    if verify(arena, unit, check_external, &mut diagnostics) {
        Ok(())
    } else {
        Err(VerifyError { diagnostics })
    }
}

struct Verifier<'d> {
    check_external: bool,
    diagnostics: &'d mut Vec<Diagnostic>,
    /// Counter to the first scope seen with it.
    counters: FxHashMap<u32, ScopeId>,
    /// Scope the node being visited belongs to.
    current: ScopeId,
}

impl Verifier<'_> {
    fn error(&mut self, code: ErrorCode, loc: Location, message: String) {
        self.diagnostics
            .push(Diagnostic::error(code).with_message(message).with_label(loc, "here"));
    }

    fn record_counter(&mut self, arena: &AsrArena, scope: ScopeId, loc: Location) {
        let counter = arena.scope(scope).counter;
        if let Some(&first) = self.counters.get(&counter) {
            if first != scope {
                self.error(
                    ErrorCode::E9002,
                    loc,
                    format!("scope counter {counter} is used by more than one scope"),
                );
            }
        } else {
            self.counters.insert(counter, scope);
        }
    }

    /// Entry `name` of `holder`.
    fn check_entry(&mut self, arena: &AsrArena, holder: ScopeId, name: &str, sym: SymbolId) {
        let node = arena.symbol(sym);
        let loc = arena.symbol_loc(sym);
        let own_name = arena.str(node.name());
        if own_name != name {
            self.error(
                ErrorCode::E9006,
                loc,
                format!("symbol '{own_name}' is held under the name '{name}'"),
            );
        }

        match node {
            Symbol::Program(_) | Symbol::Module(_) if arena.scope(holder).parent.is_some() => {
                self.error(
                    ErrorCode::E9005,
                    loc,
                    format!(
                        "{} '{name}' must be declared in the global scope",
                        node.kind().name()
                    ),
                );
            }
            Symbol::Variable(x) if x.parent_symtab != holder => {
                self.error(
                    ErrorCode::E9006,
                    loc,
                    format!("variable '{name}' has a parent scope that does not hold it"),
                );
            }
            Symbol::ExternalSymbol(x) => {
                if x.parent_symtab != holder {
                    self.error(
                        ErrorCode::E9006,
                        loc,
                        format!("external symbol '{name}' has a parent scope that does not hold it"),
                    );
                }
                if self.check_external {
                    self.check_external_link(arena, sym, x);
                }
            }
            _ => {}
        }

        if let Some(deps) = node.dependencies() {
            self.check_dependencies(arena, name, deps, loc);
        }
    }

    fn check_member_scope(&mut self, arena: &AsrArena, holder: ScopeId, sym: SymbolId, scope: ScopeId) {
        let loc = arena.symbol_loc(sym);
        let name = arena.symbol_name(sym);
        self.record_counter(arena, scope, loc);
        let table = arena.scope(scope);
        if table.parent != Some(holder) {
            self.error(
                ErrorCode::E9003,
                loc,
                format!("the scope of '{name}' does not have the enclosing scope as its parent"),
            );
        }
        if table.owner != ScopeOwner::Symbol(sym) {
            self.error(
                ErrorCode::E9004,
                loc,
                format!("the scope of '{name}' is not owned by '{name}'"),
            );
        }
    }

    fn check_dependencies(
        &mut self,
        arena: &AsrArena,
        name: &str,
        deps: ArenaVec<ArenaStr>,
        loc: Location,
    ) {
        for dep in deps.iter(arena.al()) {
            let dep = arena.str(dep);
            if !is_identifier(dep) {
                self.error(
                    ErrorCode::E9008,
                    loc,
                    format!("dependency '{dep}' of '{name}' is not a valid identifier"),
                );
            }
        }
    }

    fn check_external_link(&mut self, arena: &AsrArena, sym: SymbolId, ext: &ExternalSymbol) {
        let loc = arena.symbol_loc(sym);
        let name = arena.str(ext.name);
        let Some(target) = ext.external else {
            self.error(
                ErrorCode::E9011,
                loc,
                format!("external symbol '{name}' is not linked to its target"),
            );
            return;
        };
        if matches!(arena.symbol(target), Symbol::ExternalSymbol(_)) {
            self.error(
                ErrorCode::E9011,
                loc,
                format!("external symbol '{name}' points at another external symbol"),
            );
            return;
        }
        let original = arena.str(ext.original_name);
        let target_name = arena.symbol_name(target);
        if target_name != original {
            self.error(
                ErrorCode::E9011,
                loc,
                format!("external symbol '{name}' should point at '{original}', not '{target_name}'"),
            );
        }
        let module_name = arena.str(ext.module_name);
        let found = enclosing_module(arena, target).map(|m| arena.symbol_name(m));
        if found != Some(module_name) {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E9011)
                    .with_message(format!(
                        "external symbol '{name}' should come from module '{module_name}'"
                    ))
                    .with_label(loc, "here")
                    .with_note(match found {
                        Some(m) => format!("its target lives in module '{m}'"),
                        None => "its target is not inside a module".to_owned(),
                    }),
            );
        }
    }

    /// A symbol reference made from `self.current`.
    fn check_ref(&mut self, arena: &AsrArena, sym: SymbolId, loc: Location) {
        let name = arena.symbol_name(sym);
        let Some(holder) = arena.symbol_parent_scope(sym) else {
            self.error(
                ErrorCode::E9007,
                loc,
                format!("reference to '{name}', which no scope holds"),
            );
            return;
        };
        if !arena.is_scope_visible(self.current, holder) {
            self.error(
                ErrorCode::E9007,
                loc,
                format!("reference to '{name}', whose scope is not visible from here"),
            );
        } else if arena.scope(holder).get_symbol(name) != Some(sym) {
            self.error(
                ErrorCode::E9007,
                loc,
                format!("reference to '{name}', which its scope does not hold"),
            );
        }
    }

    fn check_loop_head(&mut self, arena: &AsrArena, head: &DoLoopHead, loc: Location) {
        let Some(v) = head.v else {
            return;
        };
        let is_integer = arena
            .expr_type(v)
            .map(|ty| arena.type_get_past_allocatable(ty))
            .is_some_and(|ty| matches!(arena.ttype(ty), Ttype::Integer { .. }));
        if !is_integer {
            self.error(
                ErrorCode::E9010,
                loc,
                "loop variable must be an integer".to_owned(),
            );
        }
    }
}

impl<'a> Visitor<'a> for Verifier<'_> {
    fn visit_unit(&mut self, arena: &'a AsrArena, unit: &TranslationUnit) {
        let global = unit.global_scope;
        let table = arena.scope(global);
        if table.parent.is_some() || table.owner != ScopeOwner::Unit {
            self.error(
                ErrorCode::E9001,
                unit.loc,
                "the global scope must have no parent and belong to the unit".to_owned(),
            );
        }
        self.record_counter(arena, global, unit.loc);
        for item in unit.items.iter(arena.al()) {
            if let UnitItem::Symbol(sym) = item {
                let name = arena.symbol_name(sym);
                self.error(
                    ErrorCode::E9009,
                    arena.symbol_loc(sym),
                    format!("symbol '{name}' cannot be a unit item"),
                );
            }
        }
        self.current = global;
        walk_unit(self, arena, unit);
    }

    fn visit_scope(&mut self, arena: &'a AsrArena, scope: ScopeId) {
        for (name, sym) in arena.scope(scope).iter() {
            self.check_entry(arena, scope, name, sym);
            self.visit_symbol(arena, sym);
        }
    }

    fn visit_symbol(&mut self, arena: &'a AsrArena, sym: SymbolId) {
        match arena.symbol(sym).symtab() {
            Some(symtab) => {
                self.check_member_scope(arena, self.current, sym, symtab);
                let outer = std::mem::replace(&mut self.current, symtab);
                walk_symbol(self, arena, sym);
                self.current = outer;
            }
            None => walk_symbol(self, arena, sym),
        }
    }

    fn visit_stmt(&mut self, arena: &'a AsrArena, stmt: StmtId) {
        let loc = arena.stmt_loc(stmt);
        match *arena.stmt(stmt) {
            StmtKind::SubroutineCall {
                name,
                original_name,
                ..
            } => {
                self.check_ref(arena, name, loc);
                if let Some(orig) = original_name {
                    self.check_ref(arena, orig, loc);
                }
            }
            StmtKind::BlockCall { m, .. } => self.check_ref(arena, m, loc),
            StmtKind::DoLoop { ref head, .. }
            | StmtKind::DoConcurrentLoop { ref head, .. }
            | StmtKind::ForAllSingle { ref head, .. } => self.check_loop_head(arena, head, loc),
            _ => {}
        }
        walk_stmt(self, arena, stmt);
    }

    fn visit_expr(&mut self, arena: &'a AsrArena, expr: ExprId) {
        let loc = arena.expr_loc(expr);
        match *arena.expr(expr) {
            ExprKind::Var { v } => self.check_ref(arena, v, loc),
            ExprKind::FunctionCall {
                name,
                original_name,
                ..
            } => {
                self.check_ref(arena, name, loc);
                if let Some(orig) = original_name {
                    self.check_ref(arena, orig, loc);
                }
            }
            _ => {}
        }
        walk_expr(self, arena, expr);
    }
}

/// Module whose scope (directly or through nested scopes) holds `sym`.
fn enclosing_module(arena: &AsrArena, sym: SymbolId) -> Option<SymbolId> {
    let mut scope = arena.symbol_parent_scope(sym)?;
    loop {
        let ScopeOwner::Symbol(owner) = arena.scope(scope).owner else {
            return None;
        };
        if matches!(arena.symbol(owner), Symbol::Module(_)) {
            return Some(owner);
        }
        scope = arena.symbol_parent_scope(owner)?;
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests;
