//! Abstract Semantic Representation.
//!
//! The ASR is the fully typed tree produced by semantic analysis and
//! consumed by every pass and backend. It is a closed set of node kinds in
//! four categories (types, expressions, statements, symbols) plus the
//! [`TranslationUnit`] root. All nodes of one unit live in one [`AsrArena`]
//! and refer to each other by handle.
//!
//! # Traversal
//!
//! - [`visitor`]: read-only walk (analyses, verification)
//! - [`transform`]: statement-list rewriting (most passes)
//! - [`replace`]: expression substitution
//!
//! [`pickle`] renders a tree as an S-expression for tests and debugging.

mod arena;
mod builder;
mod expr;
pub mod pickle;
pub mod replace;
mod scopes;
mod stmt;
mod symbol;
pub mod transform;
mod types;
mod unit;
pub mod visitor;

pub use arena::{AsrArena, PoolMark};
pub use expr::{ExprKind, ExprTag};
pub use scopes::MovedSymbols;
pub use stmt::{AllocArg, DoLoopHead, StmtKind, StmtTag};
pub use symbol::{
    Block, DowncastError, ExternalSymbol, Function, Module, Program, Symbol, SymbolKind,
    SymbolVariant, Variable,
};
pub use types::{
    Abi, Access, BinOp, CastKind, CmpOp, Deftype, Dimension, Intent, LogicalOp, StorageType,
    Ttype, TtypeKind,
};
pub use unit::{TranslationUnit, UnitItem};
