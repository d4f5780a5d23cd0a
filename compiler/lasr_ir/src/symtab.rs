//! Symbol tables (lexical scopes).
//!
//! A [`SymbolTable`] maps names to [`SymbolId`]s. It does not own the
//! symbols; they live in the arena's symbol pool. Tables form a tree through
//! `parent`, and each table records who owns it through `owner`: either the
//! translation unit (the global scope) or the symbol whose member scope it
//! is. Operations that walk the tree (`resolve_symbol`, hashing, moving
//! symbols between scopes) live on [`AsrArena`](crate::asr::AsrArena),
//! which can see every table.
//!
//! # Scope counters
//!
//! Every table receives a process-wide unique `counter`. Counters identify
//! scopes in the serialized format and in generated names. They come from an
//! atomic, so independent translation units can be built on separate threads
//! without ever sharing a counter.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

use crate::{ScopeId, SymbolId};

static SCOPE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Draw the next unique scope counter.
pub fn next_scope_counter() -> u32 {
    SCOPE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Make sure future counters are greater than `counter`.
///
/// Used when loading a scope that keeps its serialized counter.
pub fn reserve_scope_counter(counter: u32) {
    SCOPE_COUNTER.fetch_max(counter, Ordering::Relaxed);
}

/// Contract violation on a symbol table operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymtabError {
    #[error("symbol '{name}' is already defined in scope {counter}")]
    AlreadyDefined { name: String, counter: u32 },
    #[error("symbol '{name}' is not defined in scope {counter}")]
    NotFound { name: String, counter: u32 },
    #[error("symbol '{name}' ({kind}) cannot be moved out of the global scope")]
    Unmovable { name: String, kind: &'static str },
}

/// Who holds a symbol table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ScopeOwner {
    /// The global scope of a translation unit.
    Unit,
    /// The member scope of a program, module, function or block.
    Symbol(SymbolId),
    /// Not attached yet.
    #[default]
    Detached,
}

#[derive(Clone, Debug)]
pub struct SymbolTable {
    scope: BTreeMap<String, SymbolId>,
    pub parent: Option<ScopeId>,
    pub owner: ScopeOwner,
    pub counter: u32,
}

impl SymbolTable {
    /// Empty table with a fresh counter.
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self::with_counter(parent, next_scope_counter())
    }

    /// Empty table that keeps an existing counter.
    pub fn with_counter(parent: Option<ScopeId>, counter: u32) -> Self {
        reserve_scope_counter(counter);
        SymbolTable {
            scope: BTreeMap::new(),
            parent,
            owner: ScopeOwner::Detached,
            counter,
        }
    }

    /// Look `name` up in this table only.
    pub fn get_symbol(&self, name: &str) -> Option<SymbolId> {
        self.scope.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scope.contains_key(name)
    }

    /// Add a new symbol. Fails if `name` is already present.
    pub fn add_symbol(&mut self, name: &str, sym: SymbolId) -> Result<(), SymtabError> {
        if self.scope.contains_key(name) {
            return Err(SymtabError::AlreadyDefined {
                name: name.to_owned(),
                counter: self.counter,
            });
        }
        self.scope.insert(name.to_owned(), sym);
        Ok(())
    }

    /// Replace an existing symbol. Fails if `name` is absent.
    pub fn overwrite_symbol(&mut self, name: &str, sym: SymbolId) -> Result<(), SymtabError> {
        match self.scope.get_mut(name) {
            Some(slot) => {
                *slot = sym;
                Ok(())
            }
            None => Err(self.not_found(name)),
        }
    }

    pub fn add_or_overwrite_symbol(&mut self, name: &str, sym: SymbolId) {
        self.scope.insert(name.to_owned(), sym);
    }

    /// Remove a symbol. Fails if `name` is absent.
    pub fn erase_symbol(&mut self, name: &str) -> Result<SymbolId, SymtabError> {
        self.scope.remove(name).ok_or_else(|| self.not_found(name))
    }

    /// `name` if unused here, otherwise `name1`, `name2`, ...
    pub fn get_unique_name(&self, name: &str) -> String {
        if !self.contains(name) {
            return name.to_owned();
        }
        (1u32..)
            .map(|i| format!("{name}{i}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| name.to_owned())
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.scope.iter().map(|(name, &sym)| (name.as_str(), sym))
    }

    /// Symbol ids in name order, detached from the table borrow.
    pub fn symbols(&self) -> Vec<SymbolId> {
        self.scope.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }

    fn not_found(&self, name: &str) -> SymtabError {
        SymtabError::NotFound {
            name: name.to_owned(),
            counter: self.counter,
        }
    }
}

#[cfg(test)]
mod tests;
