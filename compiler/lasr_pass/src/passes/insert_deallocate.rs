//! Free allocatable locals on every exit of a program or function.
//!
//! An `ImplicitDeallocate` of all allocatable local variables is inserted
//! before every `return` and appended to the body when it does not already
//! end in one.

use lasr_ir::asr::transform::{transform_unit, ReplacementBuffer, StmtTransformer};
use lasr_ir::asr::{AsrArena, Intent, StmtKind, Symbol, TranslationUnit, Ttype};
use lasr_ir::symtab::ScopeOwner;
use lasr_ir::{ExprId, Location, ScopeId, StmtId, SymbolId};

use crate::error::PassError;
use crate::options::PassOptions;

pub fn insert_deallocate(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    _options: &PassOptions,
) -> Result<(), PassError> {
    let mut t = DeallocateInserter::default();
    transform_unit(&mut t, arena, unit);
    tracing::debug!(inserted = t.count, "inserted implicit deallocations");
    Ok(())
}

#[derive(Default)]
struct DeallocateInserter {
    buf: ReplacementBuffer,
    count: usize,
}

impl DeallocateInserter {
    fn deallocate(&mut self, arena: &mut AsrArena, loc: Location, locals: &[SymbolId]) -> StmtId {
        let vars: Vec<ExprId> = locals.iter().map(|&v| arena.make_var(loc, v)).collect();
        let vars = arena.new_list(&vars);
        self.count += 1;
        arena.make_implicit_deallocate(loc, vars)
    }
}

impl StmtTransformer for DeallocateInserter {
    fn replacements(&mut self) -> &mut ReplacementBuffer {
        &mut self.buf
    }

    fn transform_stmt(&mut self, arena: &mut AsrArena, scope: ScopeId, stmt: StmtId) {
        if !matches!(arena.stmt(stmt), StmtKind::Return) {
            return;
        }
        let locals = allocatable_locals(arena, scope);
        if locals.is_empty() {
            return;
        }
        let loc = arena.stmt_loc(stmt);
        let dealloc = self.deallocate(arena, loc, &locals);
        self.buf.replace_with([dealloc, stmt]);
    }

    fn finish_body(
        &mut self,
        arena: &mut AsrArena,
        scope: ScopeId,
        owner: SymbolId,
        body: &mut Vec<StmtId>,
    ) {
        if body
            .last()
            .is_some_and(|&s| matches!(arena.stmt(s), StmtKind::Return))
        {
            return;
        }
        let locals = allocatable_locals(arena, scope);
        if locals.is_empty() {
            return;
        }
        let loc = arena.symbol_loc(owner);
        let dealloc = self.deallocate(arena, loc, &locals);
        body.push(dealloc);
    }
}

/// Allocatable local variables of a program or function scope, in name
/// order. Empty for any other scope.
fn allocatable_locals(arena: &AsrArena, scope: ScopeId) -> Vec<SymbolId> {
    let table = arena.scope(scope);
    let ScopeOwner::Symbol(owner) = table.owner else {
        return Vec::new();
    };
    if !matches!(
        arena.symbol(owner),
        Symbol::Program(_) | Symbol::Function(_)
    ) {
        return Vec::new();
    }
    table
        .iter()
        .filter_map(|(_, sym)| match arena.symbol(sym) {
            Symbol::Variable(v)
                if v.intent == Intent::Local
                    && matches!(arena.ttype(v.ty), Ttype::Allocatable { .. }) =>
            {
                Some(sym)
            }
            _ => None,
        })
        .collect()
}
