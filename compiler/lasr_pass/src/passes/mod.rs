//! ASR-to-ASR passes.
//!
//! Every pass has the [`PassFn`] signature and rewrites the unit in place,
//! allocating new nodes in the same arena.

mod array_op;
mod compile_time_values;
mod do_loops;
mod forall;
mod global_stmts;
mod insert_deallocate;

use lasr_ir::asr::{AsrArena, TranslationUnit};

use crate::error::PassError;
use crate::options::PassOptions;

pub use array_op::replace_array_op;
pub use compile_time_values::replace_with_compile_time_values;
pub use do_loops::replace_do_loops;
pub use forall::replace_forall;
pub use global_stmts::{global_stmts, global_stmts_program, wrap_global_stmts, MAIN_PROGRAM};
pub use insert_deallocate::insert_deallocate;

pub type PassFn = fn(&mut AsrArena, &mut TranslationUnit, &PassOptions) -> Result<(), PassError>;

#[cfg(test)]
mod tests;
