//! Expression substitution.
//!
//! [`ExprReplacer::replace_expr`] is offered every expression of the tree,
//! bottom-up: by the time it sees a node, that node's children have already
//! been replaced. Returning `Some(new)` makes the parent hold `new` instead.
//! Expression fields of statements, variable initializers and unit items are
//! all covered. Function argument lists and result variables are left
//! alone; they must stay `Var` references.

use super::expr::ExprKind;
use super::stmt::{DoLoopHead, StmtKind};
use super::symbol::Symbol;
use super::types::Dimension;
use super::unit::{TranslationUnit, UnitItem};
use super::AsrArena;
use crate::stack::ensure_sufficient_stack;
use crate::{ArenaVec, ExprId, ScopeId, StmtId, SymbolId};

pub trait ExprReplacer {
    /// Substitute for `expr`, or `None` to keep it.
    fn replace_expr(&mut self, arena: &mut AsrArena, expr: ExprId) -> Option<ExprId>;
}

pub fn replace_in_unit<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
) {
    replace_in_scope(r, arena, unit.global_scope);
    let items = arena.list(unit.items);
    let mut changed = false;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(match item {
            UnitItem::Expr(e) => {
                let new = replace_expr(r, arena, e);
                changed |= new != e;
                UnitItem::Expr(new)
            }
            UnitItem::Stmt(s) => {
                replace_in_stmt(r, arena, s);
                item
            }
            UnitItem::Symbol(_) => item,
        });
    }
    if changed {
        unit.items = arena.new_list(&out);
    }
}

pub fn replace_in_scope<R: ExprReplacer + ?Sized>(r: &mut R, arena: &mut AsrArena, scope: ScopeId) {
    for sym in arena.scope(scope).symbols() {
        replace_in_symbol(r, arena, sym);
    }
}

pub fn replace_in_symbol<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    sym: SymbolId,
) {
    ensure_sufficient_stack(|| match *arena.symbol(sym) {
        Symbol::Program(x) => {
            replace_in_scope(r, arena, x.symtab);
            replace_in_body(r, arena, x.body);
        }
        Symbol::Function(x) => {
            replace_in_scope(r, arena, x.symtab);
            replace_in_body(r, arena, x.body);
        }
        Symbol::Block(x) => {
            replace_in_scope(r, arena, x.symtab);
            replace_in_body(r, arena, x.body);
        }
        Symbol::Module(x) => replace_in_scope(r, arena, x.symtab),
        Symbol::Variable(x) => {
            let symbolic_value = replace_opt(r, arena, x.symbolic_value);
            let value = replace_opt(r, arena, x.value);
            if let Symbol::Variable(v) = arena.symbol_mut(sym) {
                v.symbolic_value = symbolic_value;
                v.value = value;
            }
        }
        Symbol::ExternalSymbol(_) => {}
    });
}

pub fn replace_in_body<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    body: ArenaVec<StmtId>,
) {
    for stmt in arena.list(body) {
        replace_in_stmt(r, arena, stmt);
    }
}

/// Replace the expressions held by one statement and, recursively, by the
/// statements nested in it.
pub fn replace_in_stmt<R: ExprReplacer + ?Sized>(r: &mut R, arena: &mut AsrArena, stmt: StmtId) {
    ensure_sufficient_stack(|| {
        let old = *arena.stmt(stmt);
        let new = match old {
            StmtKind::Assignment { target, value } => StmtKind::Assignment {
                target: replace_expr(r, arena, target),
                value: replace_expr(r, arena, value),
            },
            StmtKind::Print { values } => StmtKind::Print {
                values: replace_list(r, arena, values),
            },
            StmtKind::If { test, body, orelse } => {
                let test = replace_expr(r, arena, test);
                replace_in_body(r, arena, body);
                replace_in_body(r, arena, orelse);
                StmtKind::If { test, body, orelse }
            }
            StmtKind::WhileLoop { test, body } => {
                let test = replace_expr(r, arena, test);
                replace_in_body(r, arena, body);
                StmtKind::WhileLoop { test, body }
            }
            StmtKind::DoLoop { head, body } => {
                let head = replace_head(r, arena, head);
                replace_in_body(r, arena, body);
                StmtKind::DoLoop { head, body }
            }
            StmtKind::DoConcurrentLoop { head, body } => {
                let head = replace_head(r, arena, head);
                replace_in_body(r, arena, body);
                StmtKind::DoConcurrentLoop { head, body }
            }
            StmtKind::ForAllSingle { head, assign_stmt } => {
                let head = replace_head(r, arena, head);
                replace_in_stmt(r, arena, assign_stmt);
                StmtKind::ForAllSingle { head, assign_stmt }
            }
            StmtKind::SubroutineCall {
                name,
                original_name,
                args,
            } => StmtKind::SubroutineCall {
                name,
                original_name,
                args: replace_list(r, arena, args),
            },
            StmtKind::Stop { code } => StmtKind::Stop {
                code: replace_opt(r, arena, code),
            },
            StmtKind::Allocate { args } => {
                let mut changed = false;
                let mut out = Vec::with_capacity(args.len());
                for mut arg in arena.list(args) {
                    let a = replace_expr(r, arena, arg.a);
                    let dims = replace_dims(r, arena, arg.dims);
                    changed |= a != arg.a || dims != arg.dims;
                    arg.a = a;
                    arg.dims = dims;
                    out.push(arg);
                }
                let args = if changed { arena.new_list(&out) } else { args };
                StmtKind::Allocate { args }
            }
            StmtKind::ExplicitDeallocate { vars } => StmtKind::ExplicitDeallocate {
                vars: replace_list(r, arena, vars),
            },
            StmtKind::ImplicitDeallocate { vars } => StmtKind::ImplicitDeallocate {
                vars: replace_list(r, arena, vars),
            },
            StmtKind::Return | StmtKind::Exit | StmtKind::Cycle | StmtKind::BlockCall { .. } => {
                return;
            }
        };
        if new != old {
            arena.set_stmt(stmt, new);
        }
    });
}

/// Replace inside `expr` bottom-up and return the handle its parent should
/// hold.
pub fn replace_expr<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    expr: ExprId,
) -> ExprId {
    ensure_sufficient_stack(|| {
        let old = *arena.expr(expr);
        let new = match old {
            ExprKind::IntegerBinOp {
                left,
                op,
                right,
                ty,
                value,
            } => ExprKind::IntegerBinOp {
                left: replace_expr(r, arena, left),
                op,
                right: replace_expr(r, arena, right),
                ty,
                value,
            },
            ExprKind::RealBinOp {
                left,
                op,
                right,
                ty,
                value,
            } => ExprKind::RealBinOp {
                left: replace_expr(r, arena, left),
                op,
                right: replace_expr(r, arena, right),
                ty,
                value,
            },
            ExprKind::IntegerCompare {
                left,
                op,
                right,
                ty,
                value,
            } => ExprKind::IntegerCompare {
                left: replace_expr(r, arena, left),
                op,
                right: replace_expr(r, arena, right),
                ty,
                value,
            },
            ExprKind::RealCompare {
                left,
                op,
                right,
                ty,
                value,
            } => ExprKind::RealCompare {
                left: replace_expr(r, arena, left),
                op,
                right: replace_expr(r, arena, right),
                ty,
                value,
            },
            ExprKind::LogicalBinOp {
                left,
                op,
                right,
                ty,
                value,
            } => ExprKind::LogicalBinOp {
                left: replace_expr(r, arena, left),
                op,
                right: replace_expr(r, arena, right),
                ty,
                value,
            },
            ExprKind::IntegerUnaryMinus { arg, ty, value } => ExprKind::IntegerUnaryMinus {
                arg: replace_expr(r, arena, arg),
                ty,
                value,
            },
            ExprKind::RealUnaryMinus { arg, ty, value } => ExprKind::RealUnaryMinus {
                arg: replace_expr(r, arena, arg),
                ty,
                value,
            },
            ExprKind::LogicalNot { arg, ty, value } => ExprKind::LogicalNot {
                arg: replace_expr(r, arena, arg),
                ty,
                value,
            },
            ExprKind::Cast {
                arg,
                kind,
                ty,
                value,
            } => ExprKind::Cast {
                arg: replace_expr(r, arena, arg),
                kind,
                ty,
                value,
            },
            ExprKind::FunctionCall {
                name,
                original_name,
                args,
                ty,
                value,
            } => ExprKind::FunctionCall {
                name,
                original_name,
                args: replace_list(r, arena, args),
                ty,
                value,
            },
            ExprKind::ArrayItem { v, args, ty } => ExprKind::ArrayItem {
                v: replace_expr(r, arena, v),
                args: replace_list(r, arena, args),
                ty,
            },
            ExprKind::ArrayConstant { args, ty } => ExprKind::ArrayConstant {
                args: replace_list(r, arena, args),
                ty,
            },
            ExprKind::IntegerConstant { .. }
            | ExprKind::RealConstant { .. }
            | ExprKind::LogicalConstant { .. }
            | ExprKind::StringConstant { .. }
            | ExprKind::Var { .. } => old,
        };
        if new != old {
            arena.set_expr(expr, new);
        }
        r.replace_expr(arena, expr).unwrap_or(expr)
    })
}

fn replace_opt<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    expr: Option<ExprId>,
) -> Option<ExprId> {
    expr.map(|e| replace_expr(r, arena, e))
}

fn replace_list<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    exprs: ArenaVec<ExprId>,
) -> ArenaVec<ExprId> {
    let old = arena.list(exprs);
    let new: Vec<ExprId> = old.iter().map(|&e| replace_expr(r, arena, e)).collect();
    if new == old {
        exprs
    } else {
        arena.new_list(&new)
    }
}

fn replace_dims<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    dims: ArenaVec<Dimension>,
) -> ArenaVec<Dimension> {
    let old = arena.list(dims);
    let new: Vec<Dimension> = old
        .iter()
        .map(|d| Dimension {
            start: replace_opt(r, arena, d.start),
            length: replace_opt(r, arena, d.length),
        })
        .collect();
    if new == old {
        dims
    } else {
        arena.new_list(&new)
    }
}

fn replace_head<R: ExprReplacer + ?Sized>(
    r: &mut R,
    arena: &mut AsrArena,
    head: DoLoopHead,
) -> DoLoopHead {
    DoLoopHead {
        v: replace_opt(r, arena, head.v),
        start: replace_expr(r, arena, head.start),
        end: replace_expr(r, arena, head.end),
        increment: replace_opt(r, arena, head.increment),
    }
}
