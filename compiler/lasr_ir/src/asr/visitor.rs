//! Read-only ASR traversal.
//!
//! Default `visit_*` methods call the matching `walk_*` function, which
//! recurses into children depth-first and left to right. Override a
//! `visit_*` method to observe a node, and call the `walk_*` function from
//! the override to keep descending.
//!
//! # Example
//!
//! ```text
//! struct CountCalls(usize);
//!
//! impl<'a> Visitor<'a> for CountCalls {
//!     fn visit_expr(&mut self, arena: &'a AsrArena, expr: ExprId) {
//!         if matches!(arena.expr(expr), ExprKind::FunctionCall { .. }) {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, arena, expr);
//!     }
//! }
//! ```

use super::expr::ExprKind;
use super::stmt::{DoLoopHead, StmtKind};
use super::symbol::Symbol;
use super::types::{Dimension, Ttype};
use super::unit::{TranslationUnit, UnitItem};
use super::AsrArena;
use crate::stack::ensure_sufficient_stack;
use crate::{ArenaVec, ExprId, ScopeId, StmtId, SymbolId, TtypeId};

pub trait Visitor<'a> {
    fn visit_unit(&mut self, arena: &'a AsrArena, unit: &TranslationUnit) {
        walk_unit(self, arena, unit);
    }

    /// Visit every symbol of a table, in name order.
    fn visit_scope(&mut self, arena: &'a AsrArena, scope: ScopeId) {
        walk_scope(self, arena, scope);
    }

    fn visit_symbol(&mut self, arena: &'a AsrArena, sym: SymbolId) {
        walk_symbol(self, arena, sym);
    }

    fn visit_stmt(&mut self, arena: &'a AsrArena, stmt: StmtId) {
        walk_stmt(self, arena, stmt);
    }

    fn visit_expr(&mut self, arena: &'a AsrArena, expr: ExprId) {
        walk_expr(self, arena, expr);
    }

    fn visit_ttype(&mut self, arena: &'a AsrArena, ty: TtypeId) {
        walk_ttype(self, arena, ty);
    }

    /// Statements of a body, in order.
    fn visit_body(&mut self, arena: &'a AsrArena, body: ArenaVec<StmtId>) {
        for stmt in body.iter(arena.al()) {
            self.visit_stmt(arena, stmt);
        }
    }
}

pub fn walk_unit<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AsrArena,
    unit: &TranslationUnit,
) {
    visitor.visit_scope(arena, unit.global_scope);
    for item in unit.items.iter(arena.al()) {
        match item {
            UnitItem::Expr(e) => visitor.visit_expr(arena, e),
            UnitItem::Stmt(s) => visitor.visit_stmt(arena, s),
            UnitItem::Symbol(_) => {}
        }
    }
}

pub fn walk_scope<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AsrArena, scope: ScopeId) {
    for sym in arena.scope(scope).symbols() {
        visitor.visit_symbol(arena, sym);
    }
}

pub fn walk_symbol<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AsrArena,
    sym: SymbolId,
) {
    ensure_sufficient_stack(|| match *arena.symbol(sym) {
        Symbol::Program(ref x) => {
            visitor.visit_scope(arena, x.symtab);
            visitor.visit_body(arena, x.body);
        }
        Symbol::Module(ref x) => visitor.visit_scope(arena, x.symtab),
        Symbol::Function(ref x) => {
            visitor.visit_scope(arena, x.symtab);
            visitor.visit_ttype(arena, x.function_signature);
            visit_exprs(visitor, arena, x.args);
            visitor.visit_body(arena, x.body);
            visit_opt_expr(visitor, arena, x.return_var);
        }
        Symbol::Variable(ref x) => {
            visit_opt_expr(visitor, arena, x.symbolic_value);
            visit_opt_expr(visitor, arena, x.value);
            visitor.visit_ttype(arena, x.ty);
        }
        Symbol::ExternalSymbol(_) => {}
        Symbol::Block(ref x) => {
            visitor.visit_scope(arena, x.symtab);
            visitor.visit_body(arena, x.body);
        }
    });
}

pub fn walk_stmt<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AsrArena, stmt: StmtId) {
    ensure_sufficient_stack(|| match *arena.stmt(stmt) {
        StmtKind::Assignment { target, value } => {
            visitor.visit_expr(arena, target);
            visitor.visit_expr(arena, value);
        }
        StmtKind::Print { values } => visit_exprs(visitor, arena, values),
        StmtKind::If { test, body, orelse } => {
            visitor.visit_expr(arena, test);
            visitor.visit_body(arena, body);
            visitor.visit_body(arena, orelse);
        }
        StmtKind::WhileLoop { test, body } => {
            visitor.visit_expr(arena, test);
            visitor.visit_body(arena, body);
        }
        StmtKind::DoLoop { head, body } | StmtKind::DoConcurrentLoop { head, body } => {
            walk_do_loop_head(visitor, arena, &head);
            visitor.visit_body(arena, body);
        }
        StmtKind::ForAllSingle { head, assign_stmt } => {
            walk_do_loop_head(visitor, arena, &head);
            visitor.visit_stmt(arena, assign_stmt);
        }
        StmtKind::SubroutineCall { args, .. } => visit_exprs(visitor, arena, args),
        StmtKind::Stop { code } => visit_opt_expr(visitor, arena, code),
        StmtKind::Allocate { args } => {
            for arg in args.iter(arena.al()) {
                visitor.visit_expr(arena, arg.a);
                visit_dims(visitor, arena, arg.dims);
            }
        }
        StmtKind::ExplicitDeallocate { vars } | StmtKind::ImplicitDeallocate { vars } => {
            visit_exprs(visitor, arena, vars);
        }
        StmtKind::Return | StmtKind::Exit | StmtKind::Cycle | StmtKind::BlockCall { .. } => {}
    });
}

pub fn walk_do_loop_head<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AsrArena,
    head: &DoLoopHead,
) {
    visit_opt_expr(visitor, arena, head.v);
    visitor.visit_expr(arena, head.start);
    visitor.visit_expr(arena, head.end);
    visit_opt_expr(visitor, arena, head.increment);
}

pub fn walk_expr<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AsrArena, expr: ExprId) {
    ensure_sufficient_stack(|| {
        let kind = *arena.expr(expr);
        match kind {
            ExprKind::IntegerBinOp { left, right, .. }
            | ExprKind::RealBinOp { left, right, .. }
            | ExprKind::IntegerCompare { left, right, .. }
            | ExprKind::RealCompare { left, right, .. }
            | ExprKind::LogicalBinOp { left, right, .. } => {
                visitor.visit_expr(arena, left);
                visitor.visit_expr(arena, right);
            }
            ExprKind::IntegerUnaryMinus { arg, .. }
            | ExprKind::RealUnaryMinus { arg, .. }
            | ExprKind::LogicalNot { arg, .. }
            | ExprKind::Cast { arg, .. } => visitor.visit_expr(arena, arg),
            ExprKind::FunctionCall { args, .. } | ExprKind::ArrayConstant { args, .. } => {
                visit_exprs(visitor, arena, args);
            }
            ExprKind::ArrayItem { v, args, .. } => {
                visitor.visit_expr(arena, v);
                visit_exprs(visitor, arena, args);
            }
            ExprKind::IntegerConstant { .. }
            | ExprKind::RealConstant { .. }
            | ExprKind::LogicalConstant { .. }
            | ExprKind::StringConstant { .. }
            | ExprKind::Var { .. } => {}
        }
        visit_opt_expr(visitor, arena, kind.value());
        if let Some(ty) = kind.declared_type() {
            visitor.visit_ttype(arena, ty);
        }
    });
}

pub fn walk_ttype<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AsrArena, ty: TtypeId) {
    match *arena.ttype(ty) {
        Ttype::Array { elem, dims } => {
            visitor.visit_ttype(arena, elem);
            visit_dims(visitor, arena, dims);
        }
        Ttype::Allocatable { inner } => visitor.visit_ttype(arena, inner),
        Ttype::FunctionType {
            arg_types,
            return_type,
        } => {
            for arg in arg_types.iter(arena.al()) {
                visitor.visit_ttype(arena, arg);
            }
            if let Some(ret) = return_type {
                visitor.visit_ttype(arena, ret);
            }
        }
        Ttype::Integer { .. }
        | Ttype::Real { .. }
        | Ttype::Complex { .. }
        | Ttype::Logical { .. }
        | Ttype::Character { .. } => {}
    }
}

fn visit_exprs<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AsrArena,
    exprs: ArenaVec<ExprId>,
) {
    for e in exprs.iter(arena.al()) {
        visitor.visit_expr(arena, e);
    }
}

fn visit_opt_expr<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AsrArena,
    expr: Option<ExprId>,
) {
    if let Some(e) = expr {
        visitor.visit_expr(arena, e);
    }
}

fn visit_dims<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AsrArena,
    dims: ArenaVec<Dimension>,
) {
    for dim in dims.iter(arena.al()) {
        visit_opt_expr(visitor, arena, dim.start);
        visit_opt_expr(visitor, arena, dim.length);
    }
}
