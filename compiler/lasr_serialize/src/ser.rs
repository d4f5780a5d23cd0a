//! Tree to stream.
//!
//! Pre-order: every node writes its tag, its location, then its fields in
//! declaration order. Owned children are written inline; symbols that are
//! merely referenced are written as `(scope counter, symbol tag, name)` so
//! the reader can resolve them once every scope has been seen.

use lasr_ir::asr::{
    AsrArena, Dimension, DoLoopHead, ExprKind, StmtKind, Symbol, TranslationUnit, Ttype, UnitItem,
};
use lasr_ir::stack::ensure_sufficient_stack;
use lasr_ir::{
    ArenaStr, ArenaValue, ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId, TtypeId,
};

use crate::error::SerializeError;
use crate::stream::{DefaultWriter, Writer};

/// Tag written ahead of the translation unit root.
pub(crate) const UNIT_TAG: u8 = 0;

/// Discriminant of a unit item in the stream.
pub(crate) const ITEM_EXPR: u8 = 0;
pub(crate) const ITEM_STMT: u8 = 1;
pub(crate) const ITEM_SYMBOL: u8 = 2;

/// Serialize `unit` with the module-file stream encoding.
pub fn serialize(arena: &AsrArena, unit: &TranslationUnit) -> Result<Vec<u8>, SerializeError> {
    serialize_with(arena, unit, DefaultWriter::new())
}

/// Serialize `unit` into the given writer and return its bytes.
pub fn serialize_with<W: Writer>(
    arena: &AsrArena,
    unit: &TranslationUnit,
    writer: W,
) -> Result<Vec<u8>, SerializeError> {
    let mut enc = Encoder { arena, w: writer };
    enc.w.write_u8(UNIT_TAG);
    enc.loc(unit.loc);
    enc.scope(unit.global_scope)?;
    let items = unit.items;
    enc.list(items, |enc, item| match item {
        UnitItem::Expr(e) => {
            enc.w.write_u8(ITEM_EXPR);
            enc.expr(e)
        }
        UnitItem::Stmt(s) => {
            enc.w.write_u8(ITEM_STMT);
            enc.stmt(s)
        }
        UnitItem::Symbol(s) => {
            enc.w.write_u8(ITEM_SYMBOL);
            enc.sym_ref(s)
        }
    })?;
    tracing::trace!(
        scopes = arena.scope_count(),
        symbols = arena.symbol_count(),
        "serialized translation unit"
    );
    Ok(enc.w.into_bytes())
}

type Result<T = (), E = SerializeError> = std::result::Result<T, E>;

struct Encoder<'a, W> {
    arena: &'a AsrArena,
    w: W,
}

impl<W: Writer> Encoder<'_, W> {
    fn loc(&mut self, loc: Location) {
        self.w.write_u32(loc.first);
        self.w.write_u32(loc.last);
    }

    fn str(&mut self, s: ArenaStr) {
        let arena = self.arena;
        self.w.write_str(arena.str(s));
    }

    fn list<T: ArenaValue>(
        &mut self,
        v: ArenaVec<T>,
        mut f: impl FnMut(&mut Self, T) -> Result,
    ) -> Result {
        self.w.write_len(v.len());
        let arena = self.arena;
        for item in v.iter(arena.al()) {
            f(self, item)?;
        }
        Ok(())
    }

    fn strs(&mut self, v: ArenaVec<ArenaStr>) {
        self.w.write_len(v.len());
        let arena = self.arena;
        for s in v.iter(arena.al()) {
            self.w.write_str(arena.str(s));
        }
    }

    fn exprs(&mut self, v: ArenaVec<ExprId>) -> Result {
        self.list(v, Self::expr)
    }

    fn body(&mut self, v: ArenaVec<StmtId>) -> Result {
        self.list(v, Self::stmt)
    }

    fn opt_expr(&mut self, e: Option<ExprId>) -> Result {
        self.w.write_bool(e.is_some());
        match e {
            Some(e) => self.expr(e),
            None => Ok(()),
        }
    }

    fn opt_ttype(&mut self, ty: Option<TtypeId>) -> Result {
        self.w.write_bool(ty.is_some());
        match ty {
            Some(ty) => self.ttype(ty),
            None => Ok(()),
        }
    }

    fn opt_sym_ref(&mut self, sym: Option<SymbolId>) -> Result {
        self.w.write_bool(sym.is_some());
        match sym {
            Some(s) => self.sym_ref(s),
            None => Ok(()),
        }
    }

    /// `(counter, entries, (name, symbol)...)` in name order.
    fn scope(&mut self, scope: ScopeId) -> Result {
        let arena = self.arena;
        let table = arena.scope(scope);
        self.w.write_u64(u64::from(table.counter));
        self.w.write_len(table.len());
        for (name, sym) in table.iter() {
            self.w.write_str(name);
            self.symbol(sym)?;
        }
        Ok(())
    }

    fn scope_counter(&mut self, scope: ScopeId) {
        self.w.write_u64(u64::from(self.arena.scope(scope).counter));
    }

    fn sym_ref(&mut self, sym: SymbolId) -> Result {
        let arena = self.arena;
        let parent = arena
            .symbol_parent_scope(sym)
            .ok_or_else(|| SerializeError::DetachedSymbol {
                name: arena.symbol_name(sym).to_owned(),
            })?;
        self.scope_counter(parent);
        self.w.write_u8(arena.symbol(sym).tag());
        self.w.write_str(arena.symbol_name(sym));
        Ok(())
    }

    fn symbol(&mut self, sym: SymbolId) -> Result {
        let node = *self.arena.symbol(sym);
        self.w.write_u8(node.tag());
        self.loc(self.arena.symbol_loc(sym));
        ensure_sufficient_stack(|| match node {
            Symbol::Program(x) => {
                self.scope(x.symtab)?;
                self.str(x.name);
                self.strs(x.dependencies);
                self.body(x.body)
            }
            Symbol::Module(x) => {
                self.scope(x.symtab)?;
                self.str(x.name);
                self.strs(x.dependencies);
                self.w.write_bool(x.loaded_from_mod);
                self.w.write_bool(x.intrinsic);
                Ok(())
            }
            Symbol::Function(x) => {
                self.scope(x.symtab)?;
                self.str(x.name);
                self.ttype(x.function_signature)?;
                self.strs(x.dependencies);
                self.exprs(x.args)?;
                self.body(x.body)?;
                self.opt_expr(x.return_var)?;
                self.w.write_u8(x.abi.tag());
                self.w.write_u8(x.access.tag());
                self.w.write_u8(x.deftype.tag());
                Ok(())
            }
            Symbol::Variable(x) => {
                self.scope_counter(x.parent_symtab);
                self.str(x.name);
                self.strs(x.dependencies);
                self.w.write_u8(x.intent.tag());
                self.opt_expr(x.symbolic_value)?;
                self.opt_expr(x.value)?;
                self.w.write_u8(x.storage.tag());
                self.ttype(x.ty)?;
                self.w.write_u8(x.abi.tag());
                self.w.write_u8(x.access.tag());
                Ok(())
            }
            // `external` is a cache; the reader rebuilds it by name.
            Symbol::ExternalSymbol(x) => {
                self.scope_counter(x.parent_symtab);
                self.str(x.name);
                self.str(x.module_name);
                self.strs(x.scope_names);
                self.str(x.original_name);
                self.w.write_u8(x.access.tag());
                Ok(())
            }
            Symbol::Block(x) => {
                self.scope(x.symtab)?;
                self.str(x.name);
                self.body(x.body)
            }
        })
    }

    fn ttype(&mut self, ty: TtypeId) -> Result {
        let t = *self.arena.ttype(ty);
        self.w.write_u8(t.tag());
        self.loc(self.arena.ttype_loc(ty));
        match t {
            Ttype::Integer { kind }
            | Ttype::Real { kind }
            | Ttype::Complex { kind }
            | Ttype::Logical { kind } => {
                self.w.write_i64(i64::from(kind));
                Ok(())
            }
            Ttype::Character { kind, len } => {
                self.w.write_i64(i64::from(kind));
                self.w.write_i64(len);
                Ok(())
            }
            Ttype::Array { elem, dims } => {
                self.ttype(elem)?;
                self.dims(dims)
            }
            Ttype::Allocatable { inner } => self.ttype(inner),
            Ttype::FunctionType {
                arg_types,
                return_type,
            } => {
                self.list(arg_types, Self::ttype)?;
                self.opt_ttype(return_type)
            }
        }
    }

    fn dims(&mut self, dims: ArenaVec<Dimension>) -> Result {
        self.list(dims, |enc, d| {
            enc.opt_expr(d.start)?;
            enc.opt_expr(d.length)
        })
    }

    fn head(&mut self, head: &DoLoopHead) -> Result {
        self.opt_expr(head.v)?;
        self.expr(head.start)?;
        self.expr(head.end)?;
        self.opt_expr(head.increment)
    }

    fn stmt(&mut self, stmt: StmtId) -> Result {
        let kind = *self.arena.stmt(stmt);
        self.w.write_u8(kind.tag().tag());
        self.loc(self.arena.stmt_loc(stmt));
        ensure_sufficient_stack(|| match kind {
            StmtKind::Assignment { target, value } => {
                self.expr(target)?;
                self.expr(value)
            }
            StmtKind::Print { values } => self.exprs(values),
            StmtKind::If { test, body, orelse } => {
                self.expr(test)?;
                self.body(body)?;
                self.body(orelse)
            }
            StmtKind::WhileLoop { test, body } => {
                self.expr(test)?;
                self.body(body)
            }
            StmtKind::DoLoop { head, body } | StmtKind::DoConcurrentLoop { head, body } => {
                self.head(&head)?;
                self.body(body)
            }
            StmtKind::ForAllSingle { head, assign_stmt } => {
                self.head(&head)?;
                self.stmt(assign_stmt)
            }
            StmtKind::SubroutineCall {
                name,
                original_name,
                args,
            } => {
                self.sym_ref(name)?;
                self.opt_sym_ref(original_name)?;
                self.exprs(args)
            }
            StmtKind::Stop { code } => self.opt_expr(code),
            StmtKind::Allocate { args } => self.list(args, |enc, arg| {
                enc.expr(arg.a)?;
                enc.dims(arg.dims)
            }),
            StmtKind::ExplicitDeallocate { vars } | StmtKind::ImplicitDeallocate { vars } => {
                self.exprs(vars)
            }
            StmtKind::BlockCall { label, m } => {
                self.w.write_i64(label);
                self.sym_ref(m)
            }
            StmtKind::Return | StmtKind::Exit | StmtKind::Cycle => Ok(()),
        })
    }

    fn expr(&mut self, expr: ExprId) -> Result {
        let kind = *self.arena.expr(expr);
        self.w.write_u8(kind.tag().tag());
        self.loc(self.arena.expr_loc(expr));
        ensure_sufficient_stack(|| match kind {
            ExprKind::IntegerConstant { n, ty } => {
                self.w.write_i64(n);
                self.ttype(ty)
            }
            ExprKind::RealConstant { r, ty } => {
                self.w.write_f64(r);
                self.ttype(ty)
            }
            ExprKind::LogicalConstant { value, ty } => {
                self.w.write_bool(value);
                self.ttype(ty)
            }
            ExprKind::StringConstant { s, ty } => {
                self.str(s);
                self.ttype(ty)
            }
            ExprKind::IntegerBinOp {
                left,
                op,
                right,
                ty,
                value,
            }
            | ExprKind::RealBinOp {
                left,
                op,
                right,
                ty,
                value,
            } => {
                self.expr(left)?;
                self.w.write_u8(op.tag());
                self.expr(right)?;
                self.ttype(ty)?;
                self.opt_expr(value)
            }
            ExprKind::IntegerCompare {
                left,
                op,
                right,
                ty,
                value,
            }
            | ExprKind::RealCompare {
                left,
                op,
                right,
                ty,
                value,
            } => {
                self.expr(left)?;
                self.w.write_u8(op.tag());
                self.expr(right)?;
                self.ttype(ty)?;
                self.opt_expr(value)
            }
            ExprKind::LogicalBinOp {
                left,
                op,
                right,
                ty,
                value,
            } => {
                self.expr(left)?;
                self.w.write_u8(op.tag());
                self.expr(right)?;
                self.ttype(ty)?;
                self.opt_expr(value)
            }
            ExprKind::IntegerUnaryMinus { arg, ty, value }
            | ExprKind::RealUnaryMinus { arg, ty, value }
            | ExprKind::LogicalNot { arg, ty, value } => {
                self.expr(arg)?;
                self.ttype(ty)?;
                self.opt_expr(value)
            }
            ExprKind::Var { v } => self.sym_ref(v),
            ExprKind::FunctionCall {
                name,
                original_name,
                args,
                ty,
                value,
            } => {
                self.sym_ref(name)?;
                self.opt_sym_ref(original_name)?;
                self.exprs(args)?;
                self.ttype(ty)?;
                self.opt_expr(value)
            }
            ExprKind::ArrayItem { v, args, ty } => {
                self.expr(v)?;
                self.exprs(args)?;
                self.ttype(ty)
            }
            ExprKind::ArrayConstant { args, ty } => {
                self.exprs(args)?;
                self.ttype(ty)
            }
            ExprKind::Cast {
                arg,
                kind,
                ty,
                value,
            } => {
                self.expr(arg)?;
                self.w.write_u8(kind.tag());
                self.ttype(ty)?;
                self.opt_expr(value)
            }
        })
    }
}
