//! S-expression dump of an ASR tree.
//!
//! Every node prints as `(Name field field ...)`. Symbol tables print as
//! `(SymbolTable <counter> {name: symbol, ...})` in name order, symbol
//! references as `<scope counter> <name>`, absent optionals as `()` and lists
//! as `[...]`. Two trees pickle identically exactly when they carry the same
//! discriminants, field values and symbol references.

use std::fmt::{Display, Write};

use super::expr::ExprKind;
use super::stmt::{DoLoopHead, StmtKind};
use super::symbol::Symbol;
use super::types::{Dimension, Ttype};
use super::unit::{TranslationUnit, UnitItem};
use super::AsrArena;
use crate::stack::ensure_sufficient_stack;
use crate::{ArenaStr, ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId, TtypeId};

#[derive(Copy, Clone, Debug, Default)]
pub struct PickleOptions {
    /// Append `@first-last` to every node name.
    pub show_locations: bool,
}

pub fn pickle(arena: &AsrArena, unit: &TranslationUnit) -> String {
    pickle_with(arena, unit, PickleOptions::default())
}

pub fn pickle_with(arena: &AsrArena, unit: &TranslationUnit, options: PickleOptions) -> String {
    let mut p = Pickler::new(arena, options);
    p.open("TranslationUnit", unit.loc);
    p.scope(unit.global_scope);
    p.list(unit.items, |p, item| match item {
        UnitItem::Expr(e) => p.expr(e),
        UnitItem::Stmt(s) => p.stmt(s),
        UnitItem::Symbol(s) => p.sym_ref(s),
    });
    p.close();
    p.out
}

/// Pickle a single expression.
pub fn pickle_expr(arena: &AsrArena, expr: ExprId) -> String {
    let mut p = Pickler::new(arena, PickleOptions::default());
    p.expr(expr);
    p.out
}

/// Pickle a single statement.
pub fn pickle_stmt(arena: &AsrArena, stmt: StmtId) -> String {
    let mut p = Pickler::new(arena, PickleOptions::default());
    p.stmt(stmt);
    p.out
}

struct Pickler<'a> {
    arena: &'a AsrArena,
    out: String,
    need_space: bool,
    options: PickleOptions,
}

impl<'a> Pickler<'a> {
    fn new(arena: &'a AsrArena, options: PickleOptions) -> Self {
        Pickler {
            arena,
            out: String::new(),
            need_space: false,
            options,
        }
    }

    fn sep(&mut self) {
        if self.need_space {
            self.out.push(' ');
        }
        self.need_space = true;
    }

    fn atom(&mut self, value: impl Display) {
        self.sep();
        let _ = write!(self.out, "{value}");
    }

    fn open(&mut self, name: &str, loc: Location) {
        self.sep();
        self.out.push('(');
        self.out.push_str(name);
        if self.options.show_locations {
            let _ = write!(self.out, "@{loc}");
        }
    }

    fn close(&mut self) {
        self.out.push(')');
        self.need_space = true;
    }

    fn none(&mut self) {
        self.atom("()");
    }

    fn list<T: crate::ArenaValue>(&mut self, v: ArenaVec<T>, mut f: impl FnMut(&mut Self, T)) {
        self.sep();
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

    fn names(&mut self, v: ArenaVec<ArenaStr>) {
        self.list(v, |p, s| p.name(s));
    }

    fn opt_expr(&mut self, e: Option<ExprId>) {
        match e {
            Some(e) => self.expr(e),
            None => self.none(),
        }
    }

    fn exprs(&mut self, v: ArenaVec<ExprId>) {
        self.list(v, |p, e| p.expr(e));
    }

    fn body(&mut self, v: ArenaVec<StmtId>) {
        self.list(v, |p, s| p.stmt(s));
    }

    fn scope(&mut self, scope: ScopeId) {
        let arena = self.arena;
        let table = arena.scope(scope);
        self.sep();
        let _ = write!(self.out, "(SymbolTable {} {{", table.counter);
        self.need_space = false;
        for (i, (name, sym)) in table.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.atom(format_args!("{name}:"));
            self.symbol(sym);
        }
        self.out.push_str("})");
        self.need_space = true;
    }

    /// `<counter of the holding scope> <name>`
    fn sym_ref(&mut self, sym: SymbolId) {
        let arena = self.arena;
        let counter = arena
            .symbol_parent_scope(sym)
            .map_or(0, |s| arena.scope(s).counter);
        self.atom(counter);
        self.atom(arena.symbol_name(sym));
    }

    fn opt_sym_ref(&mut self, sym: Option<SymbolId>) {
        match sym {
            Some(s) => self.sym_ref(s),
            None => self.none(),
        }
    }

    fn symbol(&mut self, sym: SymbolId) {
        let loc = self.arena.symbol_loc(sym);
        ensure_sufficient_stack(|| match *self.arena.symbol(sym) {
            Symbol::Program(x) => {
                self.open("Program", loc);
                self.scope(x.symtab);
                self.name(x.name);
                self.names(x.dependencies);
                self.body(x.body);
                self.close();
            }
            Symbol::Module(x) => {
                self.open("Module", loc);
                self.scope(x.symtab);
                self.name(x.name);
                self.names(x.dependencies);
                self.atom(bool_atom(x.loaded_from_mod));
                self.atom(bool_atom(x.intrinsic));
                self.close();
            }
            Symbol::Function(x) => {
                self.open("Function", loc);
                self.scope(x.symtab);
                self.name(x.name);
                self.ttype(x.function_signature);
                self.names(x.dependencies);
                self.exprs(x.args);
                self.body(x.body);
                self.opt_expr(x.return_var);
                self.atom(x.abi.name());
                self.atom(x.access.name());
                self.atom(x.deftype.name());
                self.close();
            }
            Symbol::Variable(x) => {
                self.open("Variable", loc);
                self.atom(self.arena.scope(x.parent_symtab).counter);
                self.name(x.name);
                self.names(x.dependencies);
                self.atom(x.intent.name());
                self.opt_expr(x.symbolic_value);
                self.opt_expr(x.value);
                self.atom(x.storage.name());
                self.ttype(x.ty);
                self.atom(x.abi.name());
                self.atom(x.access.name());
                self.close();
            }
            Symbol::ExternalSymbol(x) => {
                self.open("ExternalSymbol", loc);
                self.atom(self.arena.scope(x.parent_symtab).counter);
                self.name(x.name);
                self.name(x.module_name);
                self.names(x.scope_names);
                self.name(x.original_name);
                self.atom(x.access.name());
                self.close();
            }
            Symbol::Block(x) => {
                self.open("Block", loc);
                self.scope(x.symtab);
                self.name(x.name);
                self.body(x.body);
                self.close();
            }
        });
    }

    fn head(&mut self, head: &DoLoopHead) {
        self.sep();
        self.out.push('(');
        self.need_space = false;
        self.opt_expr(head.v);
        self.expr(head.start);
        self.expr(head.end);
        self.opt_expr(head.increment);
        self.close();
    }

    fn dims(&mut self, dims: ArenaVec<Dimension>) {
        self.list(dims, |p, d| {
            p.sep();
            p.out.push('(');
            p.need_space = false;
            p.opt_expr(d.start);
            p.opt_expr(d.length);
            p.close();
        });
    }

    fn stmt(&mut self, stmt: StmtId) {
        let loc = self.arena.stmt_loc(stmt);
        let kind = *self.arena.stmt(stmt);
        ensure_sufficient_stack(|| {
            self.open(kind.tag().name(), loc);
            match kind {
                StmtKind::Assignment { target, value } => {
                    self.expr(target);
                    self.expr(value);
                }
                StmtKind::Print { values } => self.exprs(values),
                StmtKind::If { test, body, orelse } => {
                    self.expr(test);
                    self.body(body);
                    self.body(orelse);
                }
                StmtKind::WhileLoop { test, body } => {
                    self.expr(test);
                    self.body(body);
                }
                StmtKind::DoLoop { head, body } | StmtKind::DoConcurrentLoop { head, body } => {
                    self.head(&head);
                    self.body(body);
                }
                StmtKind::ForAllSingle { head, assign_stmt } => {
                    self.head(&head);
                    self.stmt(assign_stmt);
                }
                StmtKind::SubroutineCall {
                    name,
                    original_name,
                    args,
                } => {
                    self.sym_ref(name);
                    self.opt_sym_ref(original_name);
                    self.exprs(args);
                }
                StmtKind::Stop { code } => self.opt_expr(code),
                StmtKind::Allocate { args } => self.list(args, |p, arg| {
                    p.sep();
                    p.out.push('(');
                    p.need_space = false;
                    p.expr(arg.a);
                    p.dims(arg.dims);
                    p.close();
                }),
                StmtKind::ExplicitDeallocate { vars } | StmtKind::ImplicitDeallocate { vars } => {
                    self.exprs(vars);
                }
                StmtKind::BlockCall { label, m } => {
                    self.atom(label);
                    self.sym_ref(m);
                }
                StmtKind::Return | StmtKind::Exit | StmtKind::Cycle => {}
            }
            self.close();
        });
    }

    fn expr(&mut self, expr: ExprId) {
        let loc = self.arena.expr_loc(expr);
        let kind = *self.arena.expr(expr);
        ensure_sufficient_stack(|| {
            self.open(kind.tag().name(), loc);
            match kind {
                ExprKind::IntegerConstant { n, .. } => self.atom(n),
                ExprKind::RealConstant { r, .. } => self.atom(format_args!("{r:?}")),
                ExprKind::LogicalConstant { value, .. } => self.atom(bool_atom(value)),
                ExprKind::StringConstant { s, .. } => {
                    let arena = self.arena;
                    self.atom(format_args!("{:?}", arena.str(s)));
                }
                ExprKind::IntegerBinOp {
                    left, op, right, ..
                }
                | ExprKind::RealBinOp {
                    left, op, right, ..
                } => {
                    self.expr(left);
                    self.atom(op.name());
                    self.expr(right);
                }
                ExprKind::IntegerCompare {
                    left, op, right, ..
                }
                | ExprKind::RealCompare {
                    left, op, right, ..
                } => {
                    self.expr(left);
                    self.atom(op.name());
                    self.expr(right);
                }
                ExprKind::LogicalBinOp {
                    left, op, right, ..
                } => {
                    self.expr(left);
                    self.atom(op.name());
                    self.expr(right);
                }
                ExprKind::IntegerUnaryMinus { arg, .. }
                | ExprKind::RealUnaryMinus { arg, .. }
                | ExprKind::LogicalNot { arg, .. } => self.expr(arg),
                ExprKind::Var { v } => self.sym_ref(v),
                ExprKind::FunctionCall {
                    name,
                    original_name,
                    args,
                    ..
                } => {
                    self.sym_ref(name);
                    self.opt_sym_ref(original_name);
                    self.exprs(args);
                }
                ExprKind::ArrayItem { v, args, .. } => {
                    self.expr(v);
                    self.exprs(args);
                }
                ExprKind::ArrayConstant { args, .. } => self.exprs(args),
                ExprKind::Cast { arg, kind, .. } => {
                    self.expr(arg);
                    self.atom(kind.name());
                }
            }
            if let Some(ty) = kind.declared_type() {
                self.ttype(ty);
            }
            if kind.declared_type().is_some() && !kind.is_constant() {
                self.opt_expr(kind.value());
            }
            self.close();
        });
    }

    fn ttype(&mut self, ty: TtypeId) {
        let loc = self.arena.ttype_loc(ty);
        let t = *self.arena.ttype(ty);
        self.open(t.kind().name(), loc);
        match t {
            Ttype::Integer { kind }
            | Ttype::Real { kind }
            | Ttype::Complex { kind }
            | Ttype::Logical { kind } => self.atom(kind),
            Ttype::Character { kind, len } => {
                self.atom(kind);
                self.atom(len);
            }
            Ttype::Array { elem, dims } => {
                self.ttype(elem);
                self.dims(dims);
            }
            Ttype::Allocatable { inner } => self.ttype(inner),
            Ttype::FunctionType {
                arg_types,
                return_type,
            } => {
                self.list(arg_types, |p, t| p.ttype(t));
                match return_type {
                    Some(ret) => self.ttype(ret),
                    None => self.none(),
                }
            }
        }
        self.close();
    }
}

fn bool_atom(b: bool) -> &'static str {
    if b {
        ".true."
    } else {
        ".false."
    }
}
