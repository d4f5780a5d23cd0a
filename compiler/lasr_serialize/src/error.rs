//! Serialization errors.

use thiserror::Error;

/// A serialized stream could not be turned back into a tree.
///
/// Decoding never leaves a partial tree behind: on error every node created
/// by the failed call is discarded from the arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {what} at byte {pos}")]
    Truncated { what: &'static str, pos: usize },

    #[error("invalid {category} tag {tag}")]
    InvalidTag { category: &'static str, tag: u8 },

    #[error("malformed number while reading {what} at byte {pos}")]
    InvalidNumber { what: &'static str, pos: usize },

    #[error("string at byte {pos} is not valid UTF-8")]
    InvalidUtf8 { pos: usize },

    #[error("{what} count {count} does not fit in memory")]
    LengthOverflow { what: &'static str, count: u64 },

    #[error("symbol '{name}' in scope {counter} is referenced but never defined")]
    UnresolvedSymbol { counter: u64, name: String },

    #[error("symbol '{name}' in scope {counter} is referenced as a {expected} but defined as a {found}")]
    SymbolKindMismatch {
        counter: u64,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("scope {0} is referenced but never defined")]
    UnresolvedScope(u64),

    #[error("scope {0} is defined twice")]
    DuplicateScope(u64),

    #[error("symbol '{name}' is defined twice in scope {counter}")]
    DuplicateSymbol { counter: u64, name: String },

    #[error("{0} trailing bytes after the translation unit")]
    TrailingBytes(usize),
}

/// A tree could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// A reference points at a symbol that no scope holds, so it has no
    /// `(scope counter, name)` address.
    #[error("symbol '{name}' is referenced but not held by any scope")]
    DetachedSymbol { name: String },
}

/// Module file load/save failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModfileError {
    #[error("LFortran Modfile format not recognized")]
    FormatNotRecognized,

    #[error(
        "Incompatible format: LFortran Modfile was generated using version '{found}', \
         but current LFortran version is '{expected}'"
    )]
    IncompatibleVersion { found: String, expected: String },

    #[error("a module file must contain exactly one module in its global scope, found {found}")]
    NotASingleModule { found: String },

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// `ExternalSymbol` targets that could not be found after loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalSymbolError {
    #[error(
        "ExternalSymbol cannot be resolved, the symbol '{symbol}' was not found in the \
         module '{module}' (but the module was found)"
    )]
    SymbolNotFound { symbol: String, module: String },

    #[error(
        "ExternalSymbol cannot be resolved, the module '{module}' was not found, so the \
         symbol '{symbol}' could not be resolved"
    )]
    ModuleNotFound { symbol: String, module: String },
}
