//! S-expression dump of an AST.
//!
//! Operators print by name (`(BinOp (Num 1) Add (Name x))`), names and
//! literals print bare, lists print as `[...]` and absent parts as `()`.

use std::fmt::{Display, Write};

use super::nodes::{AstItem, AstTranslationUnit, ExprKind, StmtKind, UnitKind};
use super::{AstArena, ExprId, StmtId, UnitId};
use crate::stack::ensure_sufficient_stack;
use crate::{ArenaStr, ArenaValue, ArenaVec};

pub fn pickle(arena: &AstArena, unit: &AstTranslationUnit) -> String {
    let mut p = Pickler::new(arena);
    p.open("TranslationUnit");
    p.list(unit.items, |p, item| match item {
        AstItem::Unit(u) => p.unit(u),
        AstItem::Stmt(s) => p.stmt(s),
        AstItem::Expr(e) => p.expr(e),
    });
    p.close();
    p.out
}

pub fn pickle_expr(arena: &AstArena, expr: ExprId) -> String {
    let mut p = Pickler::new(arena);
    p.expr(expr);
    p.out
}

pub fn pickle_stmt(arena: &AstArena, stmt: StmtId) -> String {
    let mut p = Pickler::new(arena);
    p.stmt(stmt);
    p.out
}

struct Pickler<'a> {
    arena: &'a AstArena,
    out: String,
    need_space: bool,
}

impl<'a> Pickler<'a> {
    fn new(arena: &'a AstArena) -> Self {
        Pickler {
            arena,
            out: String::new(),
            need_space: false,
        }
    }

    fn atom(&mut self, value: impl Display) {
        if self.need_space {
            self.out.push(' ');
        }
        let _ = write!(self.out, "{value}");
        self.need_space = true;
    }

    fn open(&mut self, name: &str) {
        if self.need_space {
            self.out.push(' ');
        }
        self.out.push('(');
        self.out.push_str(name);
        self.need_space = true;
    }

    fn close(&mut self) {
        self.out.push(')');
        self.need_space = true;
    }

    fn list<T: ArenaValue>(&mut self, v: ArenaVec<T>, mut f: impl FnMut(&mut Self, T)) {
        if self.need_space {
            self.out.push(' ');
        }
        self.out.push('[');
        self.need_space = false;
        for item in v.iter(self.arena.al()) {
            f(self, item);
        }
        self.out.push(']');
        self.need_space = true;
    }

    fn name(&mut self, s: ArenaStr) {
        let arena = self.arena;
        self.atom(arena.str(s));
    }

    fn opt_expr(&mut self, e: Option<ExprId>) {
        match e {
            Some(e) => self.expr(e),
            None => self.atom("()"),
        }
    }

    fn body(&mut self, v: ArenaVec<StmtId>) {
        self.list(v, |p, s| p.stmt(s));
    }

    fn unit(&mut self, unit: UnitId) {
        match *self.arena.unit(unit) {
            UnitKind::Program {
                name,
                body,
                contains,
            } => {
                self.open("Program");
                self.name(name);
                self.body(body);
                self.list(contains, |p, u| p.unit(u));
            }
            UnitKind::Module {
                name,
                body,
                contains,
            } => {
                self.open("Module");
                self.name(name);
                self.body(body);
                self.list(contains, |p, u| p.unit(u));
            }
            UnitKind::Subroutine { name, args, body } => {
                self.open("Subroutine");
                self.name(name);
                self.list(args, |p, a| p.name(a));
                self.body(body);
            }
            UnitKind::Function {
                name,
                args,
                return_var,
                body,
            } => {
                self.open("Function");
                self.name(name);
                self.list(args, |p, a| p.name(a));
                match return_var {
                    Some(r) => self.name(r),
                    None => self.atom("()"),
                }
                self.body(body);
            }
        }
        self.close();
    }

    fn stmt(&mut self, stmt: StmtId) {
        ensure_sufficient_stack(|| {
            let kind = *self.arena.stmt(stmt);
            self.open(kind.tag().name());
            match kind {
                StmtKind::Declaration { type_name, names } => {
                    self.name(type_name);
                    self.list(names, |p, n| p.name(n));
                }
                StmtKind::Assignment { target, value } => {
                    self.expr(target);
                    self.expr(value);
                }
                StmtKind::Print { values } => self.list(values, |p, e| p.expr(e)),
                StmtKind::If { test, body, orelse } => {
                    self.expr(test);
                    self.body(body);
                    self.body(orelse);
                }
                StmtKind::WhileLoop { test, body } => {
                    self.expr(test);
                    self.body(body);
                }
                StmtKind::DoLoop {
                    var,
                    start,
                    end,
                    increment,
                    body,
                } => {
                    match var {
                        Some(v) => self.name(v),
                        None => self.atom("()"),
                    }
                    self.opt_expr(start);
                    self.opt_expr(end);
                    self.opt_expr(increment);
                    self.body(body);
                }
                StmtKind::ForAllSingle {
                    var,
                    start,
                    end,
                    increment,
                    assign,
                } => {
                    self.name(var);
                    self.expr(start);
                    self.expr(end);
                    self.opt_expr(increment);
                    self.stmt(assign);
                }
                StmtKind::SubroutineCall { name, args } => {
                    self.name(name);
                    self.list(args, |p, e| p.expr(e));
                }
                StmtKind::Stop { code } => self.opt_expr(code),
                StmtKind::Return | StmtKind::Exit | StmtKind::Cycle => {}
            }
            self.close();
        });
    }

    fn expr(&mut self, expr: ExprId) {
        ensure_sufficient_stack(|| {
            let kind = *self.arena.expr(expr);
            self.open(kind.tag().name());
            match kind {
                ExprKind::BinOp { left, op, right } => {
                    self.expr(left);
                    self.atom(op.name());
                    self.expr(right);
                }
                ExprKind::Compare { left, op, right } => {
                    self.expr(left);
                    self.atom(op.name());
                    self.expr(right);
                }
                ExprKind::BoolOp { left, op, right } => {
                    self.expr(left);
                    self.atom(op.name());
                    self.expr(right);
                }
                ExprKind::UnaryOp { op, operand } => {
                    self.atom(op.name());
                    self.expr(operand);
                }
                ExprKind::Name { id } => self.name(id),
                ExprKind::Num { n } => self.atom(n),
                ExprKind::Real { value } => self.name(value),
                ExprKind::Str { s } => {
                    let arena = self.arena;
                    self.atom(format_args!("{:?}", arena.str(s)));
                }
                ExprKind::Logical { value } => {
                    self.atom(if value { ".true." } else { ".false." });
                }
                ExprKind::FuncCallOrArray { func, args } => {
                    self.name(func);
                    self.list(args, |p, e| p.expr(e));
                }
            }
            self.close();
        });
    }
}
