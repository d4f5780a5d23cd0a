//! Lower counted `do` loops to `do while`.
//!
//! ```text
//! do i = a, b, c          i = a - c
//!     body         =>     do while (i + c <= b)
//! end do                      i = i + c
//!                             body
//!                         end do
//! ```
//!
//! The comparison is `>=` when the step is negative. The step must be an
//! integer constant, possibly negated, or fold to one.

use lasr_ir::asr::transform::{transform_unit, ReplacementBuffer, StmtTransformer};
use lasr_ir::asr::{AsrArena, BinOp, CmpOp, DoLoopHead, ExprKind, StmtKind, TranslationUnit};
use lasr_ir::{ArenaVec, ExprId, Location, ScopeId, StmtId};

use crate::error::PassError;
use crate::options::PassOptions;

const PASS: &str = "do_loops";

pub fn replace_do_loops(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    _options: &PassOptions,
) -> Result<(), PassError> {
    let mut t = DoLoopLowering::default();
    transform_unit(&mut t, arena, unit);
    if let Some(err) = t.error {
        return Err(err);
    }
    tracing::debug!(rewritten = t.count, "lowered do loops");
    Ok(())
}

#[derive(Default)]
struct DoLoopLowering {
    buf: ReplacementBuffer,
    count: usize,
    error: Option<PassError>,
}

impl StmtTransformer for DoLoopLowering {
    fn replacements(&mut self) -> &mut ReplacementBuffer {
        &mut self.buf
    }

    fn transform_stmt(&mut self, arena: &mut AsrArena, _scope: ScopeId, stmt: StmtId) {
        if self.error.is_some() {
            return;
        }
        let StmtKind::DoLoop { head, body } = *arena.stmt(stmt) else {
            return;
        };
        let loc = arena.stmt_loc(stmt);
        match lower(arena, loc, &head, body) {
            Ok([init, while_loop]) => {
                self.buf.replace_with([init, while_loop]);
                self.count += 1;
            }
            Err(err) => self.error = Some(err),
        }
    }
}

fn lower(
    arena: &mut AsrArena,
    loc: Location,
    head: &DoLoopHead,
    body: ArenaVec<StmtId>,
) -> Result<[StmtId; 2], PassError> {
    let v = head
        .v
        .ok_or_else(|| PassError::unsupported(PASS, "do loop without a loop variable"))?;
    let int_ty = arena
        .expr_type(v)
        .ok_or_else(|| PassError::unsupported(PASS, "loop variable has no type"))?;
    let step = match head.increment {
        Some(c) => c,
        None => arena.make_integer_constant(loc, 1, int_ty),
    };
    let cmp = if constant_step(arena, step)? > 0 {
        CmpOp::LtE
    } else {
        CmpOp::GtE
    };

    let start = arena.make_integer_bin_op(loc, head.start, BinOp::Sub, step, int_ty, None);
    let init = arena.make_assignment(loc, v, start);

    let next = arena.make_integer_bin_op(loc, v, BinOp::Add, step, int_ty, None);
    let logical = arena.make_logical(loc, 4);
    let test = arena.make_integer_compare(loc, next, cmp, head.end, logical, None);

    let bump_value = arena.make_integer_bin_op(loc, v, BinOp::Add, step, int_ty, None);
    let bump = arena.make_assignment(loc, v, bump_value);
    let mut stmts = Vec::with_capacity(body.len() + 1);
    stmts.push(bump);
    stmts.extend(body.iter(arena.al()));
    let stmts = arena.new_list(&stmts);
    let while_loop = arena.make_while_loop(loc, test, stmts);
    Ok([init, while_loop])
}

fn constant_step(arena: &AsrArena, step: ExprId) -> Result<i64, PassError> {
    let folded = arena.expr(step).value().unwrap_or(step);
    match *arena.expr(folded) {
        ExprKind::IntegerConstant { n, .. } => Ok(n),
        ExprKind::IntegerUnaryMinus { arg, .. } => match *arena.expr(arg) {
            ExprKind::IntegerConstant { n, .. } => Ok(-n),
            _ => Err(PassError::unsupported(PASS, "do loop increment type not supported")),
        },
        _ => Err(PassError::unsupported(PASS, "do loop increment type not supported")),
    }
}
