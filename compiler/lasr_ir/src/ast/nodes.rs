//! AST node kinds.

use super::{ExprId, StmtId, UnitId};
use crate::containers::{load_u32, ArenaValue};
use crate::tags::define_tagged_enum;
use crate::{ArenaStr, ArenaVec, Location};

define_tagged_enum!(
    Operator { Add = 0, Sub = 1, Mul = 2, Div = 3, Pow = 4 }
);

define_tagged_enum!(
    UnaryOp { Minus = 0, Not = 1 }
);

define_tagged_enum!(
    CmpOp { Eq = 0, NotEq = 1, Lt = 2, LtE = 3, Gt = 4, GtE = 5 }
);

define_tagged_enum!(
    BoolOp { And = 0, Or = 1 }
);

define_tagged_enum!(
    ExprTag {
        BinOp = 0,
        UnaryOp = 1,
        Compare = 2,
        BoolOp = 3,
        Name = 4,
        Num = 5,
        Real = 6,
        Str = 7,
        Logical = 8,
        FuncCallOrArray = 9,
    }
);

define_tagged_enum!(
    StmtTag {
        Declaration = 0,
        Assignment = 1,
        Print = 2,
        If = 3,
        WhileLoop = 4,
        DoLoop = 5,
        ForAllSingle = 6,
        SubroutineCall = 7,
        Return = 8,
        Exit = 9,
        Cycle = 10,
        Stop = 11,
    }
);

define_tagged_enum!(
    UnitTag { Program = 0, Module = 1, Subroutine = 2, Function = 3 }
);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExprKind {
    BinOp {
        left: ExprId,
        op: Operator,
        right: ExprId,
    },
    UnaryOp {
        op: UnaryOp,
        operand: ExprId,
    },
    Compare {
        left: ExprId,
        op: CmpOp,
        right: ExprId,
    },
    BoolOp {
        left: ExprId,
        op: BoolOp,
        right: ExprId,
    },
    Name {
        id: ArenaStr,
    },
    Num {
        n: i64,
    },
    /// Real literal kept as written (`1.5d0`).
    Real {
        value: ArenaStr,
    },
    Str {
        s: ArenaStr,
    },
    Logical {
        value: bool,
    },
    /// `f(args)`: a call or an array reference; the parser cannot tell.
    FuncCallOrArray {
        func: ArenaStr,
        args: ArenaVec<ExprId>,
    },
}

impl ExprKind {
    pub const fn tag(&self) -> ExprTag {
        match self {
            ExprKind::BinOp { .. } => ExprTag::BinOp,
            ExprKind::UnaryOp { .. } => ExprTag::UnaryOp,
            ExprKind::Compare { .. } => ExprTag::Compare,
            ExprKind::BoolOp { .. } => ExprTag::BoolOp,
            ExprKind::Name { .. } => ExprTag::Name,
            ExprKind::Num { .. } => ExprTag::Num,
            ExprKind::Real { .. } => ExprTag::Real,
            ExprKind::Str { .. } => ExprTag::Str,
            ExprKind::Logical { .. } => ExprTag::Logical,
            ExprKind::FuncCallOrArray { .. } => ExprTag::FuncCallOrArray,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StmtKind {
    /// `type_name :: names`
    Declaration {
        type_name: ArenaStr,
        names: ArenaVec<ArenaStr>,
    },
    Assignment {
        target: ExprId,
        value: ExprId,
    },
    Print {
        values: ArenaVec<ExprId>,
    },
    If {
        test: ExprId,
        body: ArenaVec<StmtId>,
        orelse: ArenaVec<StmtId>,
    },
    WhileLoop {
        test: ExprId,
        body: ArenaVec<StmtId>,
    },
    /// `do var = start, end, increment`; all parts absent for `do`.
    DoLoop {
        var: Option<ArenaStr>,
        start: Option<ExprId>,
        end: Option<ExprId>,
        increment: Option<ExprId>,
        body: ArenaVec<StmtId>,
    },
    ForAllSingle {
        var: ArenaStr,
        start: ExprId,
        end: ExprId,
        increment: Option<ExprId>,
        assign: StmtId,
    },
    SubroutineCall {
        name: ArenaStr,
        args: ArenaVec<ExprId>,
    },
    Return,
    Exit,
    Cycle,
    Stop {
        code: Option<ExprId>,
    },
}

impl StmtKind {
    pub const fn tag(&self) -> StmtTag {
        match self {
            StmtKind::Declaration { .. } => StmtTag::Declaration,
            StmtKind::Assignment { .. } => StmtTag::Assignment,
            StmtKind::Print { .. } => StmtTag::Print,
            StmtKind::If { .. } => StmtTag::If,
            StmtKind::WhileLoop { .. } => StmtTag::WhileLoop,
            StmtKind::DoLoop { .. } => StmtTag::DoLoop,
            StmtKind::ForAllSingle { .. } => StmtTag::ForAllSingle,
            StmtKind::SubroutineCall { .. } => StmtTag::SubroutineCall,
            StmtKind::Return => StmtTag::Return,
            StmtKind::Exit => StmtTag::Exit,
            StmtKind::Cycle => StmtTag::Cycle,
            StmtKind::Stop { .. } => StmtTag::Stop,
        }
    }
}

/// Program units. Declarations are statements of `body`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnitKind {
    Program {
        name: ArenaStr,
        body: ArenaVec<StmtId>,
        contains: ArenaVec<UnitId>,
    },
    Module {
        name: ArenaStr,
        body: ArenaVec<StmtId>,
        contains: ArenaVec<UnitId>,
    },
    Subroutine {
        name: ArenaStr,
        args: ArenaVec<ArenaStr>,
        body: ArenaVec<StmtId>,
    },
    Function {
        name: ArenaStr,
        args: ArenaVec<ArenaStr>,
        return_var: Option<ArenaStr>,
        body: ArenaVec<StmtId>,
    },
}

impl UnitKind {
    pub const fn tag(&self) -> UnitTag {
        match self {
            UnitKind::Program { .. } => UnitTag::Program,
            UnitKind::Module { .. } => UnitTag::Module,
            UnitKind::Subroutine { .. } => UnitTag::Subroutine,
            UnitKind::Function { .. } => UnitTag::Function,
        }
    }

    pub const fn name(&self) -> ArenaStr {
        match self {
            UnitKind::Program { name, .. }
            | UnitKind::Module { name, .. }
            | UnitKind::Subroutine { name, .. }
            | UnitKind::Function { name, .. } => *name,
        }
    }

    pub const fn body(&self) -> ArenaVec<StmtId> {
        match self {
            UnitKind::Program { body, .. }
            | UnitKind::Module { body, .. }
            | UnitKind::Subroutine { body, .. }
            | UnitKind::Function { body, .. } => *body,
        }
    }
}

/// Top-level item of a source file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AstItem {
    Unit(UnitId),
    Stmt(StmtId),
    Expr(ExprId),
}

impl ArenaValue for AstItem {
    const SIZE: usize = 5;
    fn store(self, out: &mut [u8]) {
        let (tag, raw) = match self {
            AstItem::Unit(id) => (0, id.raw()),
            AstItem::Stmt(id) => (1, id.raw()),
            AstItem::Expr(id) => (2, id.raw()),
        };
        out[0] = tag;
        raw.store(&mut out[1..5]);
    }
    fn load(bytes: &[u8]) -> Self {
        let raw = load_u32(&bytes[1..5]);
        match bytes[0] {
            0 => AstItem::Unit(UnitId::new(raw)),
            1 => AstItem::Stmt(StmtId::new(raw)),
            _ => AstItem::Expr(ExprId::new(raw)),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AstTranslationUnit {
    pub loc: Location,
    pub items: ArenaVec<AstItem>,
}
