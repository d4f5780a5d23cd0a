//! Storage for one parsed source file.

use super::nodes::{
    AstItem, AstTranslationUnit, BoolOp, CmpOp, ExprKind, Operator, StmtKind, UnaryOp, UnitKind,
};
use super::{ExprId, StmtId, UnitId};
use crate::{Allocator, ArenaStr, ArenaValue, ArenaVec, Location};

#[inline]
#[track_caller]
fn to_u32(len: usize, what: &str) -> u32 {
    match u32::try_from(len) {
        Ok(n) if n != u32::MAX => n,
        _ => panic!("too many {what} in one arena ({len})"),
    }
}

/// Node pools and byte storage of one AST.
#[derive(Clone, Debug, Default)]
pub struct AstArena {
    al: Allocator,
    exprs: Vec<ExprKind>,
    expr_locs: Vec<Location>,
    stmts: Vec<StmtKind>,
    stmt_locs: Vec<Location>,
    units: Vec<UnitKind>,
    unit_locs: Vec<Location>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocator_size(size: usize) -> Self {
        AstArena {
            al: Allocator::new(size),
            ..Self::default()
        }
    }

    #[inline]
    pub fn al(&self) -> &Allocator {
        &self.al
    }

    pub fn new_list<T: ArenaValue>(&mut self, items: &[T]) -> ArenaVec<T> {
        ArenaVec::from_slice(&mut self.al, items)
    }

    pub fn new_str(&mut self, s: &str) -> ArenaStr {
        ArenaStr::from_str(&mut self.al, s)
    }

    #[inline]
    pub fn str(&self, s: ArenaStr) -> &str {
        s.as_str(&self.al)
    }

    /// Intern each name and collect the handles into an arena list.
    pub fn new_names(&mut self, names: &[&str]) -> ArenaVec<ArenaStr> {
        let handles: Vec<ArenaStr> = names.iter().map(|n| self.new_str(n)).collect();
        self.new_list(&handles)
    }

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

    pub fn add_unit(&mut self, loc: Location, kind: UnitKind) -> UnitId {
        self.al.charge::<UnitKind>();
        let id = UnitId::new(to_u32(self.units.len(), "program units"));
        self.units.push(kind);
        self.unit_locs.push(loc);
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

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &StmtKind {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn stmt_loc(&self, id: StmtId) -> Location {
        self.stmt_locs[id.index()]
    }

    #[inline]
    pub fn unit(&self, id: UnitId) -> &UnitKind {
        &self.units[id.index()]
    }

    #[inline]
    pub fn unit_loc(&self, id: UnitId) -> Location {
        self.unit_locs[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    // Expressions

    pub fn make_bin_op(
        &mut self,
        loc: Location,
        left: ExprId,
        op: Operator,
        right: ExprId,
    ) -> ExprId {
        self.add_expr(loc, ExprKind::BinOp { left, op, right })
    }

    pub fn make_unary_op(&mut self, loc: Location, op: UnaryOp, operand: ExprId) -> ExprId {
        self.add_expr(loc, ExprKind::UnaryOp { op, operand })
    }

    pub fn make_compare(&mut self, loc: Location, left: ExprId, op: CmpOp, right: ExprId) -> ExprId {
        self.add_expr(loc, ExprKind::Compare { left, op, right })
    }

    pub fn make_bool_op(&mut self, loc: Location, left: ExprId, op: BoolOp, right: ExprId) -> ExprId {
        self.add_expr(loc, ExprKind::BoolOp { left, op, right })
    }

    pub fn make_name(&mut self, loc: Location, id: &str) -> ExprId {
        let id = self.new_str(id);
        self.add_expr(loc, ExprKind::Name { id })
    }

    pub fn make_num(&mut self, loc: Location, n: i64) -> ExprId {
        self.add_expr(loc, ExprKind::Num { n })
    }

    pub fn make_real(&mut self, loc: Location, value: &str) -> ExprId {
        let value = self.new_str(value);
        self.add_expr(loc, ExprKind::Real { value })
    }

    pub fn make_str(&mut self, loc: Location, s: &str) -> ExprId {
        let s = self.new_str(s);
        self.add_expr(loc, ExprKind::Str { s })
    }

    pub fn make_logical(&mut self, loc: Location, value: bool) -> ExprId {
        self.add_expr(loc, ExprKind::Logical { value })
    }

    pub fn make_func_call_or_array(&mut self, loc: Location, func: &str, args: &[ExprId]) -> ExprId {
        let func = self.new_str(func);
        let args = self.new_list(args);
        self.add_expr(loc, ExprKind::FuncCallOrArray { func, args })
    }

    // Statements

    pub fn make_declaration(&mut self, loc: Location, type_name: &str, names: &[&str]) -> StmtId {
        let type_name = self.new_str(type_name);
        let names = self.new_names(names);
        self.add_stmt(loc, StmtKind::Declaration { type_name, names })
    }

    pub fn make_assignment(&mut self, loc: Location, target: ExprId, value: ExprId) -> StmtId {
        self.add_stmt(loc, StmtKind::Assignment { target, value })
    }

    pub fn make_print(&mut self, loc: Location, values: &[ExprId]) -> StmtId {
        let values = self.new_list(values);
        self.add_stmt(loc, StmtKind::Print { values })
    }

    pub fn make_if(
        &mut self,
        loc: Location,
        test: ExprId,
        body: &[StmtId],
        orelse: &[StmtId],
    ) -> StmtId {
        let body = self.new_list(body);
        let orelse = self.new_list(orelse);
        self.add_stmt(loc, StmtKind::If { test, body, orelse })
    }

    pub fn make_while_loop(&mut self, loc: Location, test: ExprId, body: &[StmtId]) -> StmtId {
        let body = self.new_list(body);
        self.add_stmt(loc, StmtKind::WhileLoop { test, body })
    }

    /// `do var = start, end[, increment]`. Pass `None` for `var` to build a
    /// bare `do` loop; the bounds are ignored then.
    pub fn make_do_loop(
        &mut self,
        loc: Location,
        var: Option<&str>,
        start: ExprId,
        end: ExprId,
        increment: Option<ExprId>,
        body: &[StmtId],
    ) -> StmtId {
        let body = self.new_list(body);
        let kind = match var {
            Some(v) => StmtKind::DoLoop {
                var: Some(self.new_str(v)),
                start: Some(start),
                end: Some(end),
                increment,
                body,
            },
            None => StmtKind::DoLoop {
                var: None,
                start: None,
                end: None,
                increment: None,
                body,
            },
        };
        self.add_stmt(loc, kind)
    }

    pub fn make_forall_single(
        &mut self,
        loc: Location,
        var: &str,
        start: ExprId,
        end: ExprId,
        increment: Option<ExprId>,
        assign: StmtId,
    ) -> StmtId {
        let var = self.new_str(var);
        self.add_stmt(
            loc,
            StmtKind::ForAllSingle {
                var,
                start,
                end,
                increment,
                assign,
            },
        )
    }

    pub fn make_subroutine_call(&mut self, loc: Location, name: &str, args: &[ExprId]) -> StmtId {
        let name = self.new_str(name);
        let args = self.new_list(args);
        self.add_stmt(loc, StmtKind::SubroutineCall { name, args })
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

    // Program units

    pub fn make_program(
        &mut self,
        loc: Location,
        name: &str,
        body: &[StmtId],
        contains: &[UnitId],
    ) -> UnitId {
        let name = self.new_str(name);
        let body = self.new_list(body);
        let contains = self.new_list(contains);
        self.add_unit(
            loc,
            UnitKind::Program {
                name,
                body,
                contains,
            },
        )
    }

    pub fn make_module(
        &mut self,
        loc: Location,
        name: &str,
        body: &[StmtId],
        contains: &[UnitId],
    ) -> UnitId {
        let name = self.new_str(name);
        let body = self.new_list(body);
        let contains = self.new_list(contains);
        self.add_unit(
            loc,
            UnitKind::Module {
                name,
                body,
                contains,
            },
        )
    }

    pub fn make_subroutine(
        &mut self,
        loc: Location,
        name: &str,
        args: &[&str],
        body: &[StmtId],
    ) -> UnitId {
        let name = self.new_str(name);
        let args = self.new_names(args);
        let body = self.new_list(body);
        self.add_unit(loc, UnitKind::Subroutine { name, args, body })
    }

    pub fn make_function(
        &mut self,
        loc: Location,
        name: &str,
        args: &[&str],
        return_var: Option<&str>,
        body: &[StmtId],
    ) -> UnitId {
        let name = self.new_str(name);
        let args = self.new_names(args);
        let return_var = return_var.map(|r| self.new_str(r));
        let body = self.new_list(body);
        self.add_unit(
            loc,
            UnitKind::Function {
                name,
                args,
                return_var,
                body,
            },
        )
    }

    pub fn make_translation_unit(&mut self, loc: Location, items: &[AstItem]) -> AstTranslationUnit {
        AstTranslationUnit {
            loc,
            items: self.new_list(items),
        }
    }
}
