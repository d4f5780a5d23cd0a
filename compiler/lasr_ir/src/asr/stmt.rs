//! ASR statements.

use super::types::Dimension;
use crate::containers::{load_u32, ArenaValue};
use crate::tags::define_tagged_enum;
use crate::{ArenaVec, ExprId, StmtId, SymbolId};

define_tagged_enum!(
    /// Discriminant of [`StmtKind`].
    StmtTag {
        Assignment = 0,
        Print = 1,
        If = 2,
        WhileLoop = 3,
        DoLoop = 4,
        DoConcurrentLoop = 5,
        ForAllSingle = 6,
        SubroutineCall = 7,
        Return = 8,
        Exit = 9,
        Cycle = 10,
        Stop = 11,
        Allocate = 12,
        ExplicitDeallocate = 13,
        ImplicitDeallocate = 14,
        BlockCall = 15,
    }
);

/// Loop control `v = start, end, increment`.
///
/// `v` is absent for an infinite `do` loop; `increment` defaults to 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DoLoopHead {
    pub v: Option<ExprId>,
    pub start: ExprId,
    pub end: ExprId,
    pub increment: Option<ExprId>,
}

/// One operand of `allocate`: the array and its new shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AllocArg {
    pub a: ExprId,
    pub dims: ArenaVec<Dimension>,
}

impl ArenaValue for AllocArg {
    const SIZE: usize = 4 + <ArenaVec<Dimension> as ArenaValue>::SIZE;
    fn store(self, out: &mut [u8]) {
        self.a.store(&mut out[0..4]);
        self.dims.store(&mut out[4..Self::SIZE]);
    }
    fn load(bytes: &[u8]) -> Self {
        AllocArg {
            a: ExprId::new(load_u32(&bytes[0..4])),
            dims: ArenaVec::load(&bytes[4..Self::SIZE]),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StmtKind {
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
    DoLoop {
        head: DoLoopHead,
        body: ArenaVec<StmtId>,
    },
    DoConcurrentLoop {
        head: DoLoopHead,
        body: ArenaVec<StmtId>,
    },
    /// `forall (head) assign_stmt`
    ForAllSingle {
        head: DoLoopHead,
        assign_stmt: StmtId,
    },
    SubroutineCall {
        name: SymbolId,
        original_name: Option<SymbolId>,
        args: ArenaVec<ExprId>,
    },
    Return,
    Exit,
    Cycle,
    Stop {
        code: Option<ExprId>,
    },
    Allocate {
        args: ArenaVec<AllocArg>,
    },
    ExplicitDeallocate {
        vars: ArenaVec<ExprId>,
    },
    /// Deallocation inserted by the compiler at scope exit.
    ImplicitDeallocate {
        vars: ArenaVec<ExprId>,
    },
    /// Execute the body of a `Block` symbol.
    BlockCall {
        label: i64,
        m: SymbolId,
    },
}

impl StmtKind {
    pub const fn tag(&self) -> StmtTag {
        match self {
            StmtKind::Assignment { .. } => StmtTag::Assignment,
            StmtKind::Print { .. } => StmtTag::Print,
            StmtKind::If { .. } => StmtTag::If,
            StmtKind::WhileLoop { .. } => StmtTag::WhileLoop,
            StmtKind::DoLoop { .. } => StmtTag::DoLoop,
            StmtKind::DoConcurrentLoop { .. } => StmtTag::DoConcurrentLoop,
            StmtKind::ForAllSingle { .. } => StmtTag::ForAllSingle,
            StmtKind::SubroutineCall { .. } => StmtTag::SubroutineCall,
            StmtKind::Return => StmtTag::Return,
            StmtKind::Exit => StmtTag::Exit,
            StmtKind::Cycle => StmtTag::Cycle,
            StmtKind::Stop { .. } => StmtTag::Stop,
            StmtKind::Allocate { .. } => StmtTag::Allocate,
            StmtKind::ExplicitDeallocate { .. } => StmtTag::ExplicitDeallocate,
            StmtKind::ImplicitDeallocate { .. } => StmtTag::ImplicitDeallocate,
            StmtKind::BlockCall { .. } => StmtTag::BlockCall,
        }
    }
}
