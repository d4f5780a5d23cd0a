//! The root of an ASR tree.

use crate::containers::{load_u32, ArenaValue};
use crate::{ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId};

/// A top-level item of a translation unit.
///
/// Interactive and script-style sources put loose statements and
/// expressions here; the `global_stmts` pass folds them into a function.
/// Only statements and expressions are valid items; `Symbol` exists so a
/// malformed tree can be represented and rejected by the verifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnitItem {
    Expr(ExprId),
    Stmt(StmtId),
    Symbol(SymbolId),
}

impl ArenaValue for UnitItem {
    const SIZE: usize = 5;
    fn store(self, out: &mut [u8]) {
        let (tag, raw) = match self {
            UnitItem::Expr(id) => (0, id.raw()),
            UnitItem::Stmt(id) => (1, id.raw()),
            UnitItem::Symbol(id) => (2, id.raw()),
        };
        out[0] = tag;
        raw.store(&mut out[1..5]);
    }
    fn load(bytes: &[u8]) -> Self {
        let raw = load_u32(&bytes[1..5]);
        match bytes[0] {
            0 => UnitItem::Expr(ExprId::new(raw)),
            1 => UnitItem::Stmt(StmtId::new(raw)),
            _ => UnitItem::Symbol(SymbolId::new(raw)),
        }
    }
}

/// Global scope plus loose top-level items.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TranslationUnit {
    pub loc: Location,
    pub global_scope: ScopeId,
    pub items: ArenaVec<UnitItem>,
}
