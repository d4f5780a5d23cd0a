//! Storage for one ASR translation unit.
//!
//! [`AsrArena`] owns the byte [`Allocator`] (lists and strings) and one
//! typed pool per node category. Pools use struct-of-arrays layout: the
//! node payload and its [`Location`] live in parallel vectors indexed by
//! the node's handle. Every node pushed into a pool is charged against the
//! allocator budget, so exhaustion is reported the same way for nodes and
//! payloads.
//!
//! Nodes are never removed. Replacing a node means building a new one and
//! overwriting the handle stored in its parent; the old node stays in its
//! pool until the arena is dropped.

use super::expr::ExprKind;
use super::stmt::{AllocArg, DoLoopHead, StmtKind};
use super::symbol::{
    Block, DowncastError, ExternalSymbol, Function, Module, Program, Symbol, SymbolVariant,
    Variable,
};
use super::types::{BinOp, CastKind, CmpOp, Dimension, LogicalOp, Ttype};
use super::unit::{TranslationUnit, UnitItem};
use crate::symtab::{ScopeOwner, SymbolTable};
use crate::{
    Allocator, ArenaStr, ArenaValue, ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId,
    TtypeId,
};

/// Convert a pool length to a `u32` handle index.
///
/// # Panics
/// Panics if the pool holds more than `u32::MAX - 1` nodes.
#[inline]
#[track_caller]
fn to_u32(len: usize, what: &str) -> u32 {
    match u32::try_from(len) {
        Ok(n) if n != u32::MAX => n,
        _ => panic!("too many {what} in one arena ({len})"),
    }
}

/// Node pools and byte storage of one translation unit.
#[derive(Clone, Debug, Default)]
pub struct AsrArena {
    al: Allocator,
    exprs: Vec<ExprKind>,
    expr_locs: Vec<Location>,
    stmts: Vec<StmtKind>,
    stmt_locs: Vec<Location>,
    symbols: Vec<Symbol>,
    symbol_locs: Vec<Location>,
    ttypes: Vec<Ttype>,
    ttype_locs: Vec<Location>,
    scopes: Vec<SymbolTable>,
}

impl AsrArena {
    /// Arena with the default allocator budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena whose allocator has a budget of `size` bytes.
    pub fn with_allocator_size(size: usize) -> Self {
        AsrArena {
            al: Allocator::new(size),
            ..Self::default()
        }
    }

    #[inline]
    pub fn al(&self) -> &Allocator {
        &self.al
    }

    #[inline]
    pub fn al_mut(&mut self) -> &mut Allocator {
        &mut self.al
    }

    // Lists and strings

    pub fn new_list<T: ArenaValue>(&mut self, items: &[T]) -> ArenaVec<T> {
        ArenaVec::from_slice(&mut self.al, items)
    }

    pub fn list<T: ArenaValue>(&self, v: ArenaVec<T>) -> Vec<T> {
        v.to_vec(&self.al)
    }

    pub fn new_str(&mut self, s: &str) -> ArenaStr {
        ArenaStr::from_str(&mut self.al, s)
    }

    #[inline]
    pub fn str(&self, s: ArenaStr) -> &str {
        s.as_str(&self.al)
    }

    /// Owned copies of a list of arena strings.
    pub fn strings(&self, v: ArenaVec<ArenaStr>) -> Vec<String> {
        v.iter(&self.al).map(|s| self.str(s).to_owned()).collect()
    }

    // Pools

    pub fn add_expr(&mut self, loc: Location, kind: ExprKind) -> ExprId {
        self.al.charge::<ExprKind>();
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(kind);
        self.expr_locs.push(loc);
        id
    }

    pub fn add_stmt(&mut self, loc: Location, kind: StmtKind) -> StmtId {
        self.al.charge::<StmtKind>();
        let id = StmtId::new(to_u32(self.stmts.len(), "statements"));
        self.stmts.push(kind);
        self.stmt_locs.push(loc);
        id
    }

    pub fn add_ttype(&mut self, loc: Location, ty: Ttype) -> TtypeId {
        self.al.charge::<Ttype>();
        let id = TtypeId::new(to_u32(self.ttypes.len(), "types"));
        self.ttypes.push(ty);
        self.ttype_locs.push(loc);
        id
    }

    /// Push a symbol node. A member scope gets its owner link set to the
    /// new symbol.
    pub fn add_symbol_node(&mut self, loc: Location, sym: Symbol) -> SymbolId {
        self.al.charge::<Symbol>();
        let id = SymbolId::new(to_u32(self.symbols.len(), "symbols"));
        if let Some(scope) = sym.symtab() {
            self.scopes[scope.index()].owner = ScopeOwner::Symbol(id);
        }
        self.symbols.push(sym);
        self.symbol_locs.push(loc);
        id
    }

    /// Create an empty scope with a fresh counter.
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.push_scope(SymbolTable::new(parent))
    }

    /// Create an empty scope that keeps a known counter.
    pub fn new_scope_with_counter(&mut self, parent: Option<ScopeId>, counter: u32) -> ScopeId {
        self.push_scope(SymbolTable::with_counter(parent, counter))
    }

    fn push_scope(&mut self, table: SymbolTable) -> ScopeId {
        self.al.charge::<SymbolTable>();
        let id = ScopeId::new(to_u32(self.scopes.len(), "scopes"));
        self.scopes.push(table);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_loc(&self, id: ExprId) -> Location {
        self.expr_locs[id.index()]
    }

    /// Rewrite an expression in place. Every parent holding `id` sees the
    /// new node.
    #[inline]
    pub fn set_expr(&mut self, id: ExprId, kind: ExprKind) {
        self.exprs[id.index()] = kind;
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &StmtKind {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn stmt_loc(&self, id: StmtId) -> Location {
        self.stmt_locs[id.index()]
    }

    #[inline]
    pub fn set_stmt(&mut self, id: StmtId, kind: StmtKind) {
        self.stmts[id.index()] = kind;
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[inline]
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    #[inline]
    pub fn symbol_loc(&self, id: SymbolId) -> Location {
        self.symbol_locs[id.index()]
    }

    #[inline]
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.str(self.symbol(id).name())
    }

    #[inline]
    pub fn ttype(&self, id: TtypeId) -> &Ttype {
        &self.ttypes[id.index()]
    }

    #[inline]
    pub fn ttype_loc(&self, id: TtypeId) -> Location {
        self.ttype_locs[id.index()]
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &SymbolTable {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut SymbolTable {
        &mut self.scopes[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn ttype_count(&self) -> usize {
        self.ttypes.len()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Drop every node, scope and symbol created after the pools had the
    /// given sizes. Bytes handed out by the allocator are not reclaimed.
    ///
    /// Used to discard a half-built tree after a decode error.
    pub fn truncate_pools(&mut self, mark: PoolMark) {
        self.exprs.truncate(mark.exprs);
        self.expr_locs.truncate(mark.exprs);
        self.stmts.truncate(mark.stmts);
        self.stmt_locs.truncate(mark.stmts);
        self.symbols.truncate(mark.symbols);
        self.symbol_locs.truncate(mark.symbols);
        self.ttypes.truncate(mark.ttypes);
        self.ttype_locs.truncate(mark.ttypes);
        self.scopes.truncate(mark.scopes);
    }

    /// Current pool sizes, for [`AsrArena::truncate_pools`].
    pub fn pool_mark(&self) -> PoolMark {
        PoolMark {
            exprs: self.exprs.len(),
            stmts: self.stmts.len(),
            symbols: self.symbols.len(),
            ttypes: self.ttypes.len(),
            scopes: self.scopes.len(),
        }
    }

    // Checked downcasts

    pub fn is_a<T: SymbolVariant>(&self, sym: SymbolId) -> bool {
        self.symbol(sym).kind() == T::KIND
    }

    pub fn try_down_cast<T: SymbolVariant>(&self, sym: SymbolId) -> Result<&T, DowncastError> {
        let node = self.symbol(sym);
        T::from_symbol(node).ok_or(DowncastError {
            symbol: sym,
            expected: T::KIND,
            found: node.kind(),
        })
    }

    /// Downcast a symbol whose kind the caller already knows.
    ///
    /// # Panics
    /// Panics on a kind mismatch; that is a bug in the caller.
    #[track_caller]
    pub fn down_cast<T: SymbolVariant>(&self, sym: SymbolId) -> &T {
        match self.try_down_cast::<T>(sym) {
            Ok(x) => x,
            Err(err) => panic!("{err}"),
        }
    }

    #[track_caller]
    pub fn down_cast_mut<T: SymbolVariant>(&mut self, sym: SymbolId) -> &mut T {
        let found = self.symbol(sym).kind();
        match T::from_symbol_mut(self.symbol_mut(sym)) {
            Some(x) => x,
            None => panic!(
                "{}",
                DowncastError {
                    symbol: sym,
                    expected: T::KIND,
                    found,
                }
            ),
        }
    }

    // Queries

    /// Follow `ExternalSymbol` links to the symbol they stand for.
    ///
    /// Unresolved external symbols are returned as is.
    pub fn symbol_get_past_external(&self, mut sym: SymbolId) -> SymbolId {
        while let Symbol::ExternalSymbol(ext) = self.symbol(sym) {
            match ext.external {
                Some(target) if target != sym => sym = target,
                _ => break,
            }
        }
        sym
    }

    /// Table that holds `sym` according to its own back-references.
    pub fn symbol_parent_scope(&self, sym: SymbolId) -> Option<ScopeId> {
        match self.symbol(sym) {
            Symbol::Variable(v) => Some(v.parent_symtab),
            Symbol::ExternalSymbol(e) => Some(e.parent_symtab),
            other => other.symtab().and_then(|s| self.scope(s).parent),
        }
    }

    /// Result type of an expression, looking through `Var` to its symbol.
    pub fn expr_type(&self, id: ExprId) -> Option<TtypeId> {
        match *self.expr(id) {
            ExprKind::Var { v } => match self.symbol(self.symbol_get_past_external(v)) {
                Symbol::Variable(var) => Some(var.ty),
                Symbol::Function(f) => Some(f.function_signature),
                _ => None,
            },
            ref kind => kind.declared_type(),
        }
    }

    /// Strip `Allocatable` wrappers.
    pub fn type_get_past_allocatable(&self, mut ty: TtypeId) -> TtypeId {
        while let Ttype::Allocatable { inner } = *self.ttype(ty) {
            ty = inner;
        }
        ty
    }

    pub fn is_array_type(&self, ty: TtypeId) -> bool {
        matches!(
            self.ttype(self.type_get_past_allocatable(ty)),
            Ttype::Array { .. }
        )
    }

    /// Statement lists directly contained in `stmt`.
    pub fn stmt_bodies(&self, stmt: StmtId) -> Vec<ArenaVec<StmtId>> {
        match *self.stmt(stmt) {
            StmtKind::If { body, orelse, .. } => vec![body, orelse],
            StmtKind::WhileLoop { body, .. }
            | StmtKind::DoLoop { body, .. }
            | StmtKind::DoConcurrentLoop { body, .. } => vec![body],
            _ => Vec::new(),
        }
    }

    // Type constructors

    pub fn make_integer(&mut self, loc: Location, kind: i32) -> TtypeId {
        self.add_ttype(loc, Ttype::Integer { kind })
    }

    pub fn make_real(&mut self, loc: Location, kind: i32) -> TtypeId {
        self.add_ttype(loc, Ttype::Real { kind })
    }

    pub fn make_complex(&mut self, loc: Location, kind: i32) -> TtypeId {
        self.add_ttype(loc, Ttype::Complex { kind })
    }

    pub fn make_logical(&mut self, loc: Location, kind: i32) -> TtypeId {
        self.add_ttype(loc, Ttype::Logical { kind })
    }

    pub fn make_character(&mut self, loc: Location, kind: i32, len: i64) -> TtypeId {
        self.add_ttype(loc, Ttype::Character { kind, len })
    }

    pub fn make_array(
        &mut self,
        loc: Location,
        elem: TtypeId,
        dims: ArenaVec<Dimension>,
    ) -> TtypeId {
        self.add_ttype(loc, Ttype::Array { elem, dims })
    }

    pub fn make_allocatable(&mut self, loc: Location, inner: TtypeId) -> TtypeId {
        self.add_ttype(loc, Ttype::Allocatable { inner })
    }

    pub fn make_function_type(
        &mut self,
        loc: Location,
        arg_types: ArenaVec<TtypeId>,
        return_type: Option<TtypeId>,
    ) -> TtypeId {
        self.add_ttype(
            loc,
            Ttype::FunctionType {
                arg_types,
                return_type,
            },
        )
    }

    // Expression constructors

    pub fn make_integer_constant(&mut self, loc: Location, n: i64, ty: TtypeId) -> ExprId {
        self.add_expr(loc, ExprKind::IntegerConstant { n, ty })
    }

    pub fn make_real_constant(&mut self, loc: Location, r: f64, ty: TtypeId) -> ExprId {
        self.add_expr(loc, ExprKind::RealConstant { r, ty })
    }

    pub fn make_logical_constant(&mut self, loc: Location, value: bool, ty: TtypeId) -> ExprId {
        self.add_expr(loc, ExprKind::LogicalConstant { value, ty })
    }

    pub fn make_string_constant(&mut self, loc: Location, s: &str, ty: TtypeId) -> ExprId {
        let s = self.new_str(s);
        self.add_expr(loc, ExprKind::StringConstant { s, ty })
    }

    pub fn make_integer_bin_op(
        &mut self,
        loc: Location,
        left: ExprId,
        op: BinOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::IntegerBinOp {
                left,
                op,
                right,
                ty,
                value,
            },
        )
    }

    pub fn make_real_bin_op(
        &mut self,
        loc: Location,
        left: ExprId,
        op: BinOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::RealBinOp {
                left,
                op,
                right,
                ty,
                value,
            },
        )
    }

    pub fn make_integer_unary_minus(
        &mut self,
        loc: Location,
        arg: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(loc, ExprKind::IntegerUnaryMinus { arg, ty, value })
    }

    pub fn make_real_unary_minus(
        &mut self,
        loc: Location,
        arg: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(loc, ExprKind::RealUnaryMinus { arg, ty, value })
    }

    pub fn make_integer_compare(
        &mut self,
        loc: Location,
        left: ExprId,
        op: CmpOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::IntegerCompare {
                left,
                op,
                right,
                ty,
                value,
            },
        )
    }

    pub fn make_real_compare(
        &mut self,
        loc: Location,
        left: ExprId,
        op: CmpOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::RealCompare {
                left,
                op,
                right,
                ty,
                value,
            },
        )
    }

    pub fn make_logical_bin_op(
        &mut self,
        loc: Location,
        left: ExprId,
        op: LogicalOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::LogicalBinOp {
                left,
                op,
                right,
                ty,
                value,
            },
        )
    }

    pub fn make_logical_not(
        &mut self,
        loc: Location,
        arg: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(loc, ExprKind::LogicalNot { arg, ty, value })
    }

    pub fn make_var(&mut self, loc: Location, v: SymbolId) -> ExprId {
        self.add_expr(loc, ExprKind::Var { v })
    }

    pub fn make_function_call(
        &mut self,
        loc: Location,
        name: SymbolId,
        original_name: Option<SymbolId>,
        args: ArenaVec<ExprId>,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::FunctionCall {
                name,
                original_name,
                args,
                ty,
                value,
            },
        )
    }

    pub fn make_array_item(
        &mut self,
        loc: Location,
        v: ExprId,
        args: ArenaVec<ExprId>,
        ty: TtypeId,
    ) -> ExprId {
        self.add_expr(loc, ExprKind::ArrayItem { v, args, ty })
    }

    pub fn make_array_constant(
        &mut self,
        loc: Location,
        args: ArenaVec<ExprId>,
        ty: TtypeId,
    ) -> ExprId {
        self.add_expr(loc, ExprKind::ArrayConstant { args, ty })
    }

    pub fn make_cast(
        &mut self,
        loc: Location,
        arg: ExprId,
        kind: CastKind,
        ty: TtypeId,
        value: Option<ExprId>,
    ) -> ExprId {
        self.add_expr(
            loc,
            ExprKind::Cast {
                arg,
                kind,
                ty,
                value,
            },
        )
    }

    // Statement constructors

    pub fn make_assignment(&mut self, loc: Location, target: ExprId, value: ExprId) -> StmtId {
        self.add_stmt(loc, StmtKind::Assignment { target, value })
    }

    pub fn make_print(&mut self, loc: Location, values: ArenaVec<ExprId>) -> StmtId {
        self.add_stmt(loc, StmtKind::Print { values })
    }

    pub fn make_if(
        &mut self,
        loc: Location,
        test: ExprId,
        body: ArenaVec<StmtId>,
        orelse: ArenaVec<StmtId>,
    ) -> StmtId {
        self.add_stmt(loc, StmtKind::If { test, body, orelse })
    }

    pub fn make_while_loop(
        &mut self,
        loc: Location,
        test: ExprId,
        body: ArenaVec<StmtId>,
    ) -> StmtId {
        self.add_stmt(loc, StmtKind::WhileLoop { test, body })
    }

    pub fn make_do_loop(
        &mut self,
        loc: Location,
        head: DoLoopHead,
        body: ArenaVec<StmtId>,
    ) -> StmtId {
        self.add_stmt(loc, StmtKind::DoLoop { head, body })
    }

    pub fn make_do_concurrent_loop(
        &mut self,
        loc: Location,
        head: DoLoopHead,
        body: ArenaVec<StmtId>,
    ) -> StmtId {
        self.add_stmt(loc, StmtKind::DoConcurrentLoop { head, body })
    }

    pub fn make_forall_single(
        &mut self,
        loc: Location,
        head: DoLoopHead,
        assign_stmt: StmtId,
    ) -> StmtId {
        self.add_stmt(loc, StmtKind::ForAllSingle { head, assign_stmt })
    }

    pub fn make_subroutine_call(
        &mut self,
        loc: Location,
        name: SymbolId,
        original_name: Option<SymbolId>,
        args: ArenaVec<ExprId>,
    ) -> StmtId {
        self.add_stmt(
            loc,
            StmtKind::SubroutineCall {
                name,
                original_name,
                args,
            },
        )
    }

    pub fn make_return(&mut self, loc: Location) -> StmtId {
        self.add_stmt(loc, StmtKind::Return)
    }

    pub fn make_exit(&mut self, loc: Location) -> StmtId {
        self.add_stmt(loc, StmtKind::Exit)
    }

    pub fn make_cycle(&mut self, loc: Location) -> StmtId {
        self.add_stmt(loc, StmtKind::Cycle)
    }

    pub fn make_stop(&mut self, loc: Location, code: Option<ExprId>) -> StmtId {
        self.add_stmt(loc, StmtKind::Stop { code })
    }

    pub fn make_allocate(&mut self, loc: Location, args: ArenaVec<AllocArg>) -> StmtId {
        self.add_stmt(loc, StmtKind::Allocate { args })
    }

    pub fn make_explicit_deallocate(&mut self, loc: Location, vars: ArenaVec<ExprId>) -> StmtId {
        self.add_stmt(loc, StmtKind::ExplicitDeallocate { vars })
    }

    pub fn make_implicit_deallocate(&mut self, loc: Location, vars: ArenaVec<ExprId>) -> StmtId {
        self.add_stmt(loc, StmtKind::ImplicitDeallocate { vars })
    }

    pub fn make_block_call(&mut self, loc: Location, label: i64, m: SymbolId) -> StmtId {
        self.add_stmt(loc, StmtKind::BlockCall { label, m })
    }

    // Symbol constructors. Symbols with a member scope claim it here.

    pub fn make_program(&mut self, loc: Location, x: Program) -> SymbolId {
        self.add_symbol_node(loc, Symbol::Program(x))
    }

    pub fn make_module(&mut self, loc: Location, x: Module) -> SymbolId {
        self.add_symbol_node(loc, Symbol::Module(x))
    }

    pub fn make_function(&mut self, loc: Location, x: Function) -> SymbolId {
        self.add_symbol_node(loc, Symbol::Function(x))
    }

    pub fn make_variable(&mut self, loc: Location, x: Variable) -> SymbolId {
        self.add_symbol_node(loc, Symbol::Variable(x))
    }

    pub fn make_external_symbol(&mut self, loc: Location, x: ExternalSymbol) -> SymbolId {
        self.add_symbol_node(loc, Symbol::ExternalSymbol(x))
    }

    pub fn make_block(&mut self, loc: Location, x: Block) -> SymbolId {
        self.add_symbol_node(loc, Symbol::Block(x))
    }

    /// Build the unit root and claim `global_scope` for it.
    pub fn make_translation_unit(
        &mut self,
        loc: Location,
        global_scope: ScopeId,
        items: ArenaVec<UnitItem>,
    ) -> TranslationUnit {
        self.scope_mut(global_scope).owner = ScopeOwner::Unit;
        TranslationUnit {
            loc,
            global_scope,
            items,
        }
    }
}

/// Pool sizes captured by [`AsrArena::pool_mark`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PoolMark {
    exprs: usize,
    stmts: usize,
    symbols: usize,
    ttypes: usize,
    scopes: usize,
}
