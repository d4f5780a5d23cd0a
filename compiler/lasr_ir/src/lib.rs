//! LASR IR - Intermediate Representation for the LASR compiler core
//!
//! This crate contains the data structures every other stage works on:
//! - A bump [`Allocator`] with arena-backed [`ArenaVec`] and [`ArenaStr`]
//! - Source [`Location`]s
//! - [`SymbolTable`](symtab::SymbolTable) scopes with process-unique counters
//! - The ASR ([`asr`]): typed, resolved tree consumed by passes and backends
//! - The AST ([`ast`]): untyped syntax tree produced by parsers
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: nodes refer to each other through `u32`
//!   handles into typed pools, never through boxes
//! - **Arena Lifetime**: nothing is freed individually; a whole translation
//!   unit is dropped at once
//! - **Closed Node Sets**: every node kind is an enum variant, so walks and
//!   rewrites are exhaustive `match`es

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod asr;
pub mod ast;
mod containers;
mod ids;
mod location;
pub mod stack;
pub mod symtab;
mod tags;

pub use arena::{AllocError, Allocator, ArenaPtr};
pub use containers::{ArenaStr, ArenaValue, ArenaVec};
pub use ids::{ExprId, ScopeId, StmtId, SymbolId, TtypeId};
pub use location::Location;

static_assert_size!(Location, 8);
static_assert_size!(ExprId, 4);
static_assert_size!(ArenaStr, 8);
