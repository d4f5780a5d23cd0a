//! Syntax tree produced by the parsers.
//!
//! The AST mirrors source text closely: names are plain strings, nothing
//! is resolved and nothing is typed. It shares the storage scheme of the
//! ASR (an arena of typed pools, handles between nodes) but its node kinds
//! are a separate closed set, and its handles are distinct types so the
//! two universes cannot be mixed up.

mod arena;
mod nodes;
pub mod pickle;
pub mod visitor;

pub use arena::AstArena;
pub use nodes::{
    AstItem, AstTranslationUnit, BoolOp, CmpOp, ExprKind, ExprTag, Operator, StmtKind, StmtTag,
    UnaryOp, UnitKind, UnitTag,
};

crate::ids::define_id!(
    /// Handle of an AST expression.
    ExprId,
    /// Handle of an AST statement.
    StmtId,
    /// Handle of an AST program unit (program, module, subroutine, function).
    UnitId,
);

#[cfg(test)]
mod tests;
