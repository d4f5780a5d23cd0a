//! ASR symbols.
//!
//! A symbol is stored as one [`Symbol`] enum value per [`SymbolId`]. Each
//! variant wraps a plain struct so passes can downcast once and work with
//! named fields:
//!
//! ```text
//! let func = arena.down_cast::<Function>(sym);
//! for stmt in arena.list(func.body) { ... }
//! ```
//!
//! [`AsrArena::down_cast`](super::AsrArena::down_cast) panics on a kind
//! mismatch; use [`AsrArena::is_a`](super::AsrArena::is_a) or
//! [`AsrArena::try_down_cast`](super::AsrArena::try_down_cast) when the kind
//! is not already known.

use thiserror::Error;

use super::types::{Abi, Access, Deftype, Intent, StorageType};
use crate::tags::define_tagged_enum;
use crate::{ArenaStr, ArenaVec, ExprId, ScopeId, StmtId, SymbolId, TtypeId};

define_tagged_enum!(
    /// Discriminant of [`Symbol`].
    SymbolKind {
        Program = 0,
        Module = 1,
        Function = 2,
        Variable = 3,
        ExternalSymbol = 4,
        Block = 5,
    }
);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Program {
    pub name: ArenaStr,
    pub symtab: ScopeId,
    pub dependencies: ArenaVec<ArenaStr>,
    pub body: ArenaVec<StmtId>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Module {
    pub name: ArenaStr,
    pub symtab: ScopeId,
    pub dependencies: ArenaVec<ArenaStr>,
    pub loaded_from_mod: bool,
    pub intrinsic: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Function {
    pub name: ArenaStr,
    pub symtab: ScopeId,
    /// A `FunctionType`.
    pub function_signature: TtypeId,
    pub dependencies: ArenaVec<ArenaStr>,
    /// `Var` expressions for the dummy arguments, in order.
    pub args: ArenaVec<ExprId>,
    pub body: ArenaVec<StmtId>,
    /// `Var` of the result variable; `None` for subroutines.
    pub return_var: Option<ExprId>,
    pub abi: Abi,
    pub access: Access,
    pub deftype: Deftype,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Variable {
    /// Table that holds this variable.
    pub parent_symtab: ScopeId,
    pub name: ArenaStr,
    pub dependencies: ArenaVec<ArenaStr>,
    pub intent: Intent,
    pub symbolic_value: Option<ExprId>,
    pub value: Option<ExprId>,
    pub storage: StorageType,
    pub ty: TtypeId,
    pub abi: Abi,
    pub access: Access,
}

/// Local alias of a symbol defined in another module.
///
/// `external` is a cache of the resolved target. It is not serialized and
/// is re-established after loading by `fix_external_symbols`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExternalSymbol {
    pub parent_symtab: ScopeId,
    pub name: ArenaStr,
    pub external: Option<SymbolId>,
    pub module_name: ArenaStr,
    /// Path of nested scopes inside the module leading to the target.
    pub scope_names: ArenaVec<ArenaStr>,
    pub original_name: ArenaStr,
    pub access: Access,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub name: ArenaStr,
    pub symtab: ScopeId,
    pub body: ArenaVec<StmtId>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Symbol {
    Program(Program),
    Module(Module),
    Function(Function),
    Variable(Variable),
    ExternalSymbol(ExternalSymbol),
    Block(Block),
}

impl Symbol {
    pub const fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Program(_) => SymbolKind::Program,
            Symbol::Module(_) => SymbolKind::Module,
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Variable(_) => SymbolKind::Variable,
            Symbol::ExternalSymbol(_) => SymbolKind::ExternalSymbol,
            Symbol::Block(_) => SymbolKind::Block,
        }
    }

    #[inline]
    pub const fn tag(&self) -> u8 {
        self.kind().tag()
    }

    pub const fn name(&self) -> ArenaStr {
        match self {
            Symbol::Program(x) => x.name,
            Symbol::Module(x) => x.name,
            Symbol::Function(x) => x.name,
            Symbol::Variable(x) => x.name,
            Symbol::ExternalSymbol(x) => x.name,
            Symbol::Block(x) => x.name,
        }
    }

    /// Member scope owned by this symbol, if it has one.
    pub const fn symtab(&self) -> Option<ScopeId> {
        match self {
            Symbol::Program(x) => Some(x.symtab),
            Symbol::Module(x) => Some(x.symtab),
            Symbol::Function(x) => Some(x.symtab),
            Symbol::Block(x) => Some(x.symtab),
            Symbol::Variable(_) | Symbol::ExternalSymbol(_) => None,
        }
    }

    pub const fn dependencies(&self) -> Option<ArenaVec<ArenaStr>> {
        match self {
            Symbol::Program(x) => Some(x.dependencies),
            Symbol::Module(x) => Some(x.dependencies),
            Symbol::Function(x) => Some(x.dependencies),
            Symbol::Variable(x) => Some(x.dependencies),
            Symbol::ExternalSymbol(_) | Symbol::Block(_) => None,
        }
    }
}

/// A symbol struct that can be extracted from a [`Symbol`].
pub trait SymbolVariant: Sized {
    const KIND: SymbolKind;

    fn from_symbol(sym: &Symbol) -> Option<&Self>;

    fn from_symbol_mut(sym: &mut Symbol) -> Option<&mut Self>;
}

macro_rules! impl_symbol_variant {
    ($($ty:ident),* $(,)?) => { $(
        impl SymbolVariant for $ty {
            const KIND: SymbolKind = SymbolKind::$ty;

            #[inline]
            fn from_symbol(sym: &Symbol) -> Option<&Self> {
                match sym {
                    Symbol::$ty(x) => Some(x),
                    _ => None,
                }
            }

            #[inline]
            fn from_symbol_mut(sym: &mut Symbol) -> Option<&mut Self> {
                match sym {
                    Symbol::$ty(x) => Some(x),
                    _ => None,
                }
            }
        }
    )* };
}

impl_symbol_variant!(Program, Module, Function, Variable, ExternalSymbol, Block);

/// A checked downcast found a different symbol kind than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot downcast {symbol:?} to {}: it is a {}", .expected.name(), .found.name())]
pub struct DowncastError {
    pub symbol: SymbolId,
    pub expected: SymbolKind,
    pub found: SymbolKind,
}
