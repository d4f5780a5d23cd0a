//! ASR expressions.
//!
//! Operator nodes carry an optional compile-time `value`: when semantic
//! analysis could fold the expression, `value` points at the constant
//! result and the pass `compile_time_values` may substitute it.

use super::types::{BinOp, CastKind, CmpOp, LogicalOp};
use crate::tags::define_tagged_enum;
use crate::{ArenaStr, ArenaVec, ExprId, SymbolId, TtypeId};

define_tagged_enum!(
    /// Discriminant of [`ExprKind`].
    ExprTag {
        IntegerConstant = 0,
        RealConstant = 1,
        LogicalConstant = 2,
        StringConstant = 3,
        IntegerBinOp = 4,
        RealBinOp = 5,
        IntegerUnaryMinus = 6,
        RealUnaryMinus = 7,
        IntegerCompare = 8,
        RealCompare = 9,
        LogicalBinOp = 10,
        LogicalNot = 11,
        Var = 12,
        FunctionCall = 13,
        ArrayItem = 14,
        ArrayConstant = 15,
        Cast = 16,
    }
);

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExprKind {
    IntegerConstant {
        n: i64,
        ty: TtypeId,
    },
    RealConstant {
        r: f64,
        ty: TtypeId,
    },
    LogicalConstant {
        value: bool,
        ty: TtypeId,
    },
    StringConstant {
        s: ArenaStr,
        ty: TtypeId,
    },
    IntegerBinOp {
        left: ExprId,
        op: BinOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    RealBinOp {
        left: ExprId,
        op: BinOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    IntegerUnaryMinus {
        arg: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    RealUnaryMinus {
        arg: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    IntegerCompare {
        left: ExprId,
        op: CmpOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    RealCompare {
        left: ExprId,
        op: CmpOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    LogicalBinOp {
        left: ExprId,
        op: LogicalOp,
        right: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    LogicalNot {
        arg: ExprId,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    /// Reference to a variable (or an external symbol standing for one).
    Var { v: SymbolId },
    FunctionCall {
        name: SymbolId,
        original_name: Option<SymbolId>,
        args: ArenaVec<ExprId>,
        ty: TtypeId,
        value: Option<ExprId>,
    },
    /// `v(args...)`: one index expression per dimension.
    ArrayItem {
        v: ExprId,
        args: ArenaVec<ExprId>,
        ty: TtypeId,
    },
    ArrayConstant {
        args: ArenaVec<ExprId>,
        ty: TtypeId,
    },
    Cast {
        arg: ExprId,
        kind: CastKind,
        ty: TtypeId,
        value: Option<ExprId>,
    },
}

impl ExprKind {
    pub const fn tag(&self) -> ExprTag {
        match self {
            ExprKind::IntegerConstant { .. } => ExprTag::IntegerConstant,
            ExprKind::RealConstant { .. } => ExprTag::RealConstant,
            ExprKind::LogicalConstant { .. } => ExprTag::LogicalConstant,
            ExprKind::StringConstant { .. } => ExprTag::StringConstant,
            ExprKind::IntegerBinOp { .. } => ExprTag::IntegerBinOp,
            ExprKind::RealBinOp { .. } => ExprTag::RealBinOp,
            ExprKind::IntegerUnaryMinus { .. } => ExprTag::IntegerUnaryMinus,
            ExprKind::RealUnaryMinus { .. } => ExprTag::RealUnaryMinus,
            ExprKind::IntegerCompare { .. } => ExprTag::IntegerCompare,
            ExprKind::RealCompare { .. } => ExprTag::RealCompare,
            ExprKind::LogicalBinOp { .. } => ExprTag::LogicalBinOp,
            ExprKind::LogicalNot { .. } => ExprTag::LogicalNot,
            ExprKind::Var { .. } => ExprTag::Var,
            ExprKind::FunctionCall { .. } => ExprTag::FunctionCall,
            ExprKind::ArrayItem { .. } => ExprTag::ArrayItem,
            ExprKind::ArrayConstant { .. } => ExprTag::ArrayConstant,
            ExprKind::Cast { .. } => ExprTag::Cast,
        }
    }

    /// Declared result type. `None` for `Var`, whose type lives on the
    /// referenced symbol (see [`AsrArena::expr_type`](super::AsrArena::expr_type)).
    pub const fn declared_type(&self) -> Option<TtypeId> {
        match *self {
            ExprKind::IntegerConstant { ty, .. }
            | ExprKind::RealConstant { ty, .. }
            | ExprKind::LogicalConstant { ty, .. }
            | ExprKind::StringConstant { ty, .. }
            | ExprKind::IntegerBinOp { ty, .. }
            | ExprKind::RealBinOp { ty, .. }
            | ExprKind::IntegerUnaryMinus { ty, .. }
            | ExprKind::RealUnaryMinus { ty, .. }
            | ExprKind::IntegerCompare { ty, .. }
            | ExprKind::RealCompare { ty, .. }
            | ExprKind::LogicalBinOp { ty, .. }
            | ExprKind::LogicalNot { ty, .. }
            | ExprKind::FunctionCall { ty, .. }
            | ExprKind::ArrayItem { ty, .. }
            | ExprKind::ArrayConstant { ty, .. }
            | ExprKind::Cast { ty, .. } => Some(ty),
            ExprKind::Var { .. } => None,
        }
    }

    /// Folded compile-time value, if semantic analysis recorded one.
    pub const fn value(&self) -> Option<ExprId> {
        match *self {
            ExprKind::IntegerBinOp { value, .. }
            | ExprKind::RealBinOp { value, .. }
            | ExprKind::IntegerUnaryMinus { value, .. }
            | ExprKind::RealUnaryMinus { value, .. }
            | ExprKind::IntegerCompare { value, .. }
            | ExprKind::RealCompare { value, .. }
            | ExprKind::LogicalBinOp { value, .. }
            | ExprKind::LogicalNot { value, .. }
            | ExprKind::FunctionCall { value, .. }
            | ExprKind::Cast { value, .. } => value,
            ExprKind::IntegerConstant { .. }
            | ExprKind::RealConstant { .. }
            | ExprKind::LogicalConstant { .. }
            | ExprKind::StringConstant { .. }
            | ExprKind::Var { .. }
            | ExprKind::ArrayItem { .. }
            | ExprKind::ArrayConstant { .. } => None,
        }
    }

    pub const fn is_constant(&self) -> bool {
        matches!(
            self,
            ExprKind::IntegerConstant { .. }
                | ExprKind::RealConstant { .. }
                | ExprKind::LogicalConstant { .. }
                | ExprKind::StringConstant { .. }
        )
    }
}
