//! Read-only AST traversal, in the same shape as the ASR visitor.

use super::nodes::{AstItem, AstTranslationUnit, ExprKind, StmtKind, UnitKind};
use super::{AstArena, ExprId, StmtId, UnitId};
use crate::stack::ensure_sufficient_stack;

pub trait Visitor<'a> {
    fn visit_translation_unit(&mut self, arena: &'a AstArena, unit: &AstTranslationUnit) {
        walk_translation_unit(self, arena, unit);
    }

    fn visit_unit(&mut self, arena: &'a AstArena, unit: UnitId) {
        walk_unit(self, arena, unit);
    }

    fn visit_stmt(&mut self, arena: &'a AstArena, stmt: StmtId) {
        walk_stmt(self, arena, stmt);
    }

    fn visit_expr(&mut self, arena: &'a AstArena, expr: ExprId) {
        walk_expr(self, arena, expr);
    }
}

pub fn walk_translation_unit<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    arena: &'a AstArena,
    unit: &AstTranslationUnit,
) {
    for item in unit.items.iter(arena.al()) {
        match item {
            AstItem::Unit(u) => visitor.visit_unit(arena, u),
            AstItem::Stmt(s) => visitor.visit_stmt(arena, s),
            AstItem::Expr(e) => visitor.visit_expr(arena, e),
        }
    }
}

pub fn walk_unit<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AstArena, unit: UnitId) {
    let kind = *arena.unit(unit);
    for stmt in kind.body().iter(arena.al()) {
        visitor.visit_stmt(arena, stmt);
    }
    if let UnitKind::Program { contains, .. } | UnitKind::Module { contains, .. } = kind {
        for inner in contains.iter(arena.al()) {
            visitor.visit_unit(arena, inner);
        }
    }
}

pub fn walk_stmt<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AstArena, stmt: StmtId) {
    ensure_sufficient_stack(|| match *arena.stmt(stmt) {
        StmtKind::Assignment { target, value } => {
            visitor.visit_expr(arena, target);
            visitor.visit_expr(arena, value);
        }
        StmtKind::Print { values } | StmtKind::SubroutineCall { args: values, .. } => {
            for e in values.iter(arena.al()) {
                visitor.visit_expr(arena, e);
            }
        }
        StmtKind::If { test, body, orelse } => {
            visitor.visit_expr(arena, test);
            for s in body.iter(arena.al()).chain(orelse.iter(arena.al())) {
                visitor.visit_stmt(arena, s);
            }
        }
        StmtKind::WhileLoop { test, body } => {
            visitor.visit_expr(arena, test);
            for s in body.iter(arena.al()) {
                visitor.visit_stmt(arena, s);
            }
        }
        StmtKind::DoLoop {
            start,
            end,
            increment,
            body,
            ..
        } => {
            for e in [start, end, increment].into_iter().flatten() {
                visitor.visit_expr(arena, e);
            }
            for s in body.iter(arena.al()) {
                visitor.visit_stmt(arena, s);
            }
        }
        StmtKind::ForAllSingle {
            start,
            end,
            increment,
            assign,
            ..
        } => {
            visitor.visit_expr(arena, start);
            visitor.visit_expr(arena, end);
            if let Some(inc) = increment {
                visitor.visit_expr(arena, inc);
            }
            visitor.visit_stmt(arena, assign);
        }
        StmtKind::Stop { code } => {
            if let Some(code) = code {
                visitor.visit_expr(arena, code);
            }
        }
        StmtKind::Declaration { .. } | StmtKind::Return | StmtKind::Exit | StmtKind::Cycle => {}
    });
}

pub fn walk_expr<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, arena: &'a AstArena, expr: ExprId) {
    ensure_sufficient_stack(|| match *arena.expr(expr) {
        ExprKind::BinOp { left, right, .. }
        | ExprKind::Compare { left, right, .. }
        | ExprKind::BoolOp { left, right, .. } => {
            visitor.visit_expr(arena, left);
            visitor.visit_expr(arena, right);
        }
        ExprKind::UnaryOp { operand, .. } => visitor.visit_expr(arena, operand),
        ExprKind::FuncCallOrArray { args, .. } => {
            for a in args.iter(arena.al()) {
                visitor.visit_expr(arena, a);
            }
        }
        ExprKind::Name { .. }
        | ExprKind::Num { .. }
        | ExprKind::Real { .. }
        | ExprKind::Str { .. }
        | ExprKind::Logical { .. } => {}
    });
}
