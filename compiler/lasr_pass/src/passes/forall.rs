//! `forall (i = a:b) x(i) = e` becomes
//! `do concurrent (i = a:b); x(i) = e; end do`.

use lasr_ir::asr::transform::{transform_unit, ReplacementBuffer, StmtTransformer};
use lasr_ir::asr::{AsrArena, StmtKind, TranslationUnit};
use lasr_ir::{ScopeId, StmtId};

use crate::error::PassError;
use crate::options::PassOptions;

pub fn replace_forall(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    _options: &PassOptions,
) -> Result<(), PassError> {
    let mut t = ForAllReplacer::default();
    transform_unit(&mut t, arena, unit);
    tracing::debug!(rewritten = t.count, "replaced forall statements");
    Ok(())
}

#[derive(Default)]
struct ForAllReplacer {
    buf: ReplacementBuffer,
    count: usize,
}

impl StmtTransformer for ForAllReplacer {
    fn replacements(&mut self) -> &mut ReplacementBuffer {
        &mut self.buf
    }

    fn transform_stmt(&mut self, arena: &mut AsrArena, _scope: ScopeId, stmt: StmtId) {
        if let StmtKind::ForAllSingle { head, assign_stmt } = *arena.stmt(stmt) {
            let loc = arena.stmt_loc(stmt);
            let body = arena.new_list(&[assign_stmt]);
            let lowered = arena.make_do_concurrent_loop(loc, head, body);
            self.buf.push(lowered);
            self.count += 1;
        }
    }
}
