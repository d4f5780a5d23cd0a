//! ASR types and the small enums carried by nodes.

use crate::containers::{load_u32, ArenaValue};
use crate::tags::define_tagged_enum;
use crate::{ArenaVec, ExprId, TtypeId};

define_tagged_enum!(
    /// Arithmetic operator of `IntegerBinOp`/`RealBinOp`.
    BinOp { Add = 0, Sub = 1, Mul = 2, Div = 3, Pow = 4 }
);

define_tagged_enum!(
    /// Comparison operator of `IntegerCompare`/`RealCompare`.
    CmpOp { Eq = 0, NotEq = 1, Lt = 2, LtE = 3, Gt = 4, GtE = 5 }
);

define_tagged_enum!(
    LogicalOp { And = 0, Or = 1, Eqv = 2, NEqv = 3 }
);

define_tagged_enum!(
    CastKind {
        IntegerToReal = 0,
        RealToInteger = 1,
        IntegerToInteger = 2,
        RealToReal = 3,
        IntegerToLogical = 4,
    }
);

define_tagged_enum!(
    /// Calling convention / provenance of a symbol.
    Abi {
        Source = 0,
        LFortranModule = 1,
        GFortranModule = 2,
        BindC = 3,
        Interactive = 4,
        Intrinsic = 5,
    }
);

define_tagged_enum!(
    Access { Public = 0, Private = 1 }
);

define_tagged_enum!(
    Intent { Local = 0, In = 1, Out = 2, InOut = 3, ReturnVar = 4, Unspecified = 5 }
);

define_tagged_enum!(
    StorageType { Default = 0, Save = 1, Parameter = 2 }
);

define_tagged_enum!(
    /// Whether a function carries a body or only an interface.
    Deftype { Implementation = 0, Interface = 1 }
);

define_tagged_enum!(
    /// Discriminant of [`Ttype`].
    TtypeKind {
        Integer = 0,
        Real = 1,
        Complex = 2,
        Logical = 3,
        Character = 4,
        Array = 5,
        Allocatable = 6,
        FunctionType = 7,
    }
);

/// One array dimension: optional lower bound and optional extent.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Dimension {
    pub start: Option<ExprId>,
    pub length: Option<ExprId>,
}

impl ArenaValue for Dimension {
    const SIZE: usize = 8;
    fn store(self, out: &mut [u8]) {
        self.start.store(&mut out[0..4]);
        self.length.store(&mut out[4..8]);
    }
    fn load(bytes: &[u8]) -> Self {
        let start = ExprId::new(load_u32(&bytes[0..4]));
        let length = ExprId::new(load_u32(&bytes[4..8]));
        Dimension {
            start: Some(start).filter(|id| id.is_valid()),
            length: Some(length).filter(|id| id.is_valid()),
        }
    }
}

/// An ASR type node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ttype {
    Integer { kind: i32 },
    Real { kind: i32 },
    Complex { kind: i32 },
    Logical { kind: i32 },
    Character { kind: i32, len: i64 },
    Array { elem: TtypeId, dims: ArenaVec<Dimension> },
    Allocatable { inner: TtypeId },
    FunctionType {
        arg_types: ArenaVec<TtypeId>,
        return_type: Option<TtypeId>,
    },
}

impl Ttype {
    pub const fn kind(&self) -> TtypeKind {
        match self {
            Ttype::Integer { .. } => TtypeKind::Integer,
            Ttype::Real { .. } => TtypeKind::Real,
            Ttype::Complex { .. } => TtypeKind::Complex,
            Ttype::Logical { .. } => TtypeKind::Logical,
            Ttype::Character { .. } => TtypeKind::Character,
            Ttype::Array { .. } => TtypeKind::Array,
            Ttype::Allocatable { .. } => TtypeKind::Allocatable,
            Ttype::FunctionType { .. } => TtypeKind::FunctionType,
        }
    }

    #[inline]
    pub const fn tag(&self) -> u8 {
        self.kind().tag()
    }
}
