//! Replace every expression that carries a folded compile-time value by
//! that value.

use lasr_ir::asr::replace::{replace_in_unit, ExprReplacer};
use lasr_ir::asr::{AsrArena, TranslationUnit};
use lasr_ir::ExprId;

use crate::error::PassError;
use crate::options::PassOptions;

pub fn replace_with_compile_time_values(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    _options: &PassOptions,
) -> Result<(), PassError> {
    let mut r = ValueReplacer { count: 0 };
    replace_in_unit(&mut r, arena, unit);
    tracing::debug!(replaced = r.count, "folded compile-time values");
    Ok(())
}

struct ValueReplacer {
    count: usize,
}

impl ExprReplacer for ValueReplacer {
    fn replace_expr(&mut self, arena: &mut AsrArena, expr: ExprId) -> Option<ExprId> {
        let value = arena.expr(expr).value()?;
        self.count += 1;
        Some(value)
    }
}
