//! Scalarize whole-array assignments.
//!
//! `x = y + 2*z` where `x`, `y` and `z` are arrays of the same constant
//! shape becomes
//!
//! ```text
//! do __i2 = 1, n2
//!     do __i1 = 1, n1
//!         x(__i1, __i2) = y(__i1, __i2) + 2*z(__i1, __i2)
//!     end do
//! end do
//! ```
//!
//! The first dimension is the innermost loop. Index variables are `integer(4)`
//! locals of the scope holding the assignment and are reused by every
//! rewrite in that scope. Assignments whose value is not elementwise are
//! left alone.

use lasr_ir::asr::transform::{transform_unit, ReplacementBuffer, StmtTransformer};
use lasr_ir::asr::{AsrArena, DoLoopHead, ExprKind, Intent, StmtKind, TranslationUnit, Ttype};
use lasr_ir::{ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId, TtypeId};
use rustc_hash::FxHashMap;

use crate::error::PassError;
use crate::options::PassOptions;

const PASS: &str = "array_op";

pub fn replace_array_op(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    _options: &PassOptions,
) -> Result<(), PassError> {
    let mut t = ArrayOpLowering::default();
    transform_unit(&mut t, arena, unit);
    if let Some(err) = t.error {
        return Err(err);
    }
    tracing::debug!(rewritten = t.count, "scalarized array assignments");
    Ok(())
}

/// Constant bounds of one array dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Bounds {
    lower: i64,
    upper: i64,
}

#[derive(Default)]
struct ArrayOpLowering {
    buf: ReplacementBuffer,
    index_vars: FxHashMap<(ScopeId, usize), SymbolId>,
    count: usize,
    error: Option<PassError>,
}

impl StmtTransformer for ArrayOpLowering {
    fn replacements(&mut self) -> &mut ReplacementBuffer {
        &mut self.buf
    }

    fn transform_stmt(&mut self, arena: &mut AsrArena, scope: ScopeId, stmt: StmtId) {
        if self.error.is_some() {
            return;
        }
        let StmtKind::Assignment { target, value } = *arena.stmt(stmt) else {
            return;
        };
        let (elem, bounds) = match whole_array(arena, target) {
            Ok(Some(found)) => found,
            Ok(None) => return,
            Err(err) => {
                self.error = Some(err);
                return;
            }
        };
        if !is_elementwise(arena, value, bounds.len()) {
            return;
        }
        let loc = arena.stmt_loc(stmt);
        match self.lower(arena, scope, loc, target, value, elem, &bounds) {
            Ok(lowered) => {
                self.buf.push(lowered);
                self.count += 1;
            }
            Err(err) => self.error = Some(err),
        }
    }
}

impl ArrayOpLowering {
    #[allow(clippy::too_many_arguments)]
    fn lower(
        &mut self,
        arena: &mut AsrArena,
        scope: ScopeId,
        loc: Location,
        target: ExprId,
        value: ExprId,
        elem: TtypeId,
        bounds: &[Bounds],
    ) -> Result<StmtId, PassError> {
        let mut idx = Vec::with_capacity(bounds.len());
        for dim in 0..bounds.len() {
            let var = self.index_var(arena, scope, loc, dim)?;
            idx.push(arena.make_var(loc, var));
        }
        let idx_list = arena.new_list(&idx);

        let lhs = arena.make_array_item(loc, target, idx_list, elem);
        let rhs = scalarize(arena, value, idx_list);
        let mut stmt = arena.make_assignment(loc, lhs, rhs);
        for (dim, b) in bounds.iter().enumerate() {
            let head = DoLoopHead {
                v: Some(idx[dim]),
                start: arena.integer_constant(loc, b.lower),
                end: arena.integer_constant(loc, b.upper),
                increment: None,
            };
            let body = arena.new_list(&[stmt]);
            stmt = arena.make_do_loop(loc, head, body);
        }
        Ok(stmt)
    }

    fn index_var(
        &mut self,
        arena: &mut AsrArena,
        scope: ScopeId,
        loc: Location,
        dim: usize,
    ) -> Result<SymbolId, PassError> {
        if let Some(&var) = self.index_vars.get(&(scope, dim)) {
            return Ok(var);
        }
        let name = arena.scope(scope).get_unique_name(&format!("__i{}", dim + 1));
        let ty = arena.make_integer(loc, 4);
        let var = arena
            .declare_variable(loc, scope, &name, ty, Intent::Local)
            .map_err(PassError::symtab(PASS))?;
        self.index_vars.insert((scope, dim), var);
        Ok(var)
    }
}

/// Element type and bounds when `target` names a whole array of constant
/// shape. Bounds that do not fit in an `i64` are unsupported.
fn whole_array(
    arena: &AsrArena,
    target: ExprId,
) -> Result<Option<(TtypeId, Vec<Bounds>)>, PassError> {
    if !matches!(arena.expr(target), ExprKind::Var { .. }) {
        return Ok(None);
    }
    let Some(ty) = arena.expr_type(target) else {
        return Ok(None);
    };
    let Ttype::Array { elem, dims } = *arena.ttype(ty) else {
        return Ok(None);
    };
    let mut bounds = Vec::with_capacity(dims.len());
    for d in dims.iter(arena.al()) {
        let lower = match d.start {
            Some(s) => match constant(arena, s) {
                Some(n) => n,
                None => return Ok(None),
            },
            None => 1,
        };
        let Some(length) = d.length.and_then(|l| constant(arena, l)) else {
            return Ok(None);
        };
        let upper = lower
            .checked_add(length)
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| {
                PassError::unsupported(
                    PASS,
                    format!("array bounds overflow: start {lower}, length {length}"),
                )
            })?;
        bounds.push(Bounds { lower, upper });
    }
    Ok((!bounds.is_empty()).then_some((elem, bounds)))
}

fn constant(arena: &AsrArena, e: ExprId) -> Option<i64> {
    let e = arena.expr(e).value().unwrap_or(e);
    match *arena.expr(e) {
        ExprKind::IntegerConstant { n, .. } => Some(n),
        _ => None,
    }
}

/// Rank of an array type, 0 for scalars.
fn rank(arena: &AsrArena, ty: TtypeId) -> usize {
    match *arena.ttype(ty) {
        Ttype::Array { dims, .. } => dims.len(),
        _ => 0,
    }
}

/// Whether `e` can be computed one element at a time: a tree of arithmetic
/// over scalar constants and variables of rank 0 or `rank`.
fn is_elementwise(arena: &AsrArena, e: ExprId, target_rank: usize) -> bool {
    match *arena.expr(e) {
        ExprKind::IntegerConstant { .. }
        | ExprKind::RealConstant { .. }
        | ExprKind::LogicalConstant { .. } => true,
        ExprKind::Var { .. } => arena
            .expr_type(e)
            .map(|ty| rank(arena, ty))
            .is_some_and(|r| r == 0 || r == target_rank),
        ExprKind::IntegerBinOp { left, right, .. } | ExprKind::RealBinOp { left, right, .. } => {
            is_elementwise(arena, left, target_rank) && is_elementwise(arena, right, target_rank)
        }
        ExprKind::IntegerUnaryMinus { arg, .. }
        | ExprKind::RealUnaryMinus { arg, .. }
        | ExprKind::Cast { arg, .. } => is_elementwise(arena, arg, target_rank),
        _ => false,
    }
}

/// Element type of `ty` when it is an array, `ty` itself otherwise.
fn element_type(arena: &AsrArena, ty: TtypeId) -> TtypeId {
    match *arena.ttype(ty) {
        Ttype::Array { elem, .. } => elem,
        _ => ty,
    }
}

/// Rebuild `e` for the element at `idx`. Array variables become items;
/// array-typed operators get the element type and lose any folded value.
fn scalarize(arena: &mut AsrArena, e: ExprId, idx: ArenaVec<ExprId>) -> ExprId {
    let loc = arena.expr_loc(e);
    match *arena.expr(e) {
        ExprKind::Var { .. } => match arena.expr_type(e) {
            Some(ty) if rank(arena, ty) > 0 => {
                let elem = element_type(arena, ty);
                arena.make_array_item(loc, e, idx, elem)
            }
            _ => e,
        },
        ExprKind::IntegerBinOp { left, op, right, ty, value } => {
            let (l, r) = (scalarize(arena, left, idx), scalarize(arena, right, idx));
            let (ty, value) = scalar_result(arena, ty, value);
            arena.make_integer_bin_op(loc, l, op, r, ty, value)
        }
        ExprKind::RealBinOp { left, op, right, ty, value } => {
            let (l, r) = (scalarize(arena, left, idx), scalarize(arena, right, idx));
            let (ty, value) = scalar_result(arena, ty, value);
            arena.make_real_bin_op(loc, l, op, r, ty, value)
        }
        ExprKind::IntegerUnaryMinus { arg, ty, value } => {
            let a = scalarize(arena, arg, idx);
            let (ty, value) = scalar_result(arena, ty, value);
            arena.make_integer_unary_minus(loc, a, ty, value)
        }
        ExprKind::RealUnaryMinus { arg, ty, value } => {
            let a = scalarize(arena, arg, idx);
            let (ty, value) = scalar_result(arena, ty, value);
            arena.make_real_unary_minus(loc, a, ty, value)
        }
        ExprKind::Cast { arg, kind, ty, value } => {
            let a = scalarize(arena, arg, idx);
            let (ty, value) = scalar_result(arena, ty, value);
            arena.make_cast(loc, a, kind, ty, value)
        }
        _ => e,
    }
}

fn scalar_result(
    arena: &AsrArena,
    ty: TtypeId,
    value: Option<ExprId>,
) -> (TtypeId, Option<ExprId>) {
    if rank(arena, ty) > 0 {
        (element_type(arena, ty), None)
    } else {
        (ty, value)
    }
}
