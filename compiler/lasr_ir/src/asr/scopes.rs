//! Operations over the scope tree of an arena.

use std::hash::Hasher;

use rustc_hash::FxHasher;

use super::symbol::{Function, Symbol, SymbolKind};
use super::types::Abi;
use super::AsrArena;
use crate::symtab::SymtabError;
use crate::{ArenaVec, ScopeId, SymbolId};

/// Result of [`AsrArena::move_symbols_from_global_scope`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovedSymbols {
    /// Names moved into the module scope, in name order.
    pub names: Vec<String>,
    /// Modules the moved symbols depend on, in discovery order.
    pub mod_dependencies: Vec<String>,
}

impl AsrArena {
    /// Look `name` up in `scope`, then in each ancestor.
    pub fn resolve_symbol(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let table = self.scope(id);
            if let Some(sym) = table.get_symbol(name) {
                return Some(sym);
            }
            current = table.parent;
        }
        None
    }

    /// Number of ancestors of `scope`.
    pub fn scope_depth(&self, scope: ScopeId) -> usize {
        std::iter::successors(self.scope(scope).parent, |&s| self.scope(s).parent).count()
    }

    /// Whether `target` is `scope` or one of its ancestors.
    pub fn is_scope_visible(&self, scope: ScopeId, target: ScopeId) -> bool {
        std::iter::successors(Some(scope), |&s| self.scope(s).parent).any(|s| s == target)
    }

    /// Stable hash of a scope's contents: entry names and symbol kinds.
    ///
    /// Counters and node handles do not participate, so two separately
    /// compiled scopes with the same interface hash equal.
    pub fn get_hash_uint32(&self, scope: ScopeId) -> u32 {
        let mut hasher = FxHasher::default();
        for (name, sym) in self.scope(scope).iter() {
            hasher.write(name.as_bytes());
            hasher.write_u8(0xFF);
            hasher.write_u8(self.symbol(sym).tag());
        }
        let h = hasher.finish();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "folding 64 bits into 32 is the point"
        )]
        let folded = (h ^ (h >> 32)) as u32;
        folded
    }

    /// Descend through `scope_names` (each naming a symbol with a member
    /// scope), then look `name` up in the innermost scope only.
    pub fn find_scoped_symbol(
        &self,
        scope: ScopeId,
        name: &str,
        scope_names: &[&str],
    ) -> Option<SymbolId> {
        let mut current = scope;
        for scope_name in scope_names {
            let sym = self.scope(current).get_symbol(scope_name)?;
            current = self.symbol(sym).symtab()?;
        }
        self.scope(current).get_symbol(name)
    }

    /// Mark every variable and function of `scope` as provided by an
    /// earlier interactive cell: ABI becomes `Interactive` and function
    /// bodies are dropped.
    pub fn mark_all_variables_external(&mut self, scope: ScopeId) {
        for sym in self.scope(scope).symbols() {
            match self.symbol_mut(sym) {
                Symbol::Variable(v) => v.abi = Abi::Interactive,
                Symbol::Function(f) => {
                    f.abi = Abi::Interactive;
                    f.body = ArenaVec::EMPTY;
                }
                _ => {}
            }
        }
    }

    /// Move every non-module symbol of `global` into `module_scope`.
    ///
    /// Member scopes are re-parented, variable and external-symbol parent
    /// links are updated, and the names are erased from `global`. Module
    /// dependencies are collected from moved external symbols and from
    /// function dependencies that resolve to external symbols.
    pub fn move_symbols_from_global_scope(
        &mut self,
        global: ScopeId,
        module_scope: ScopeId,
    ) -> Result<MovedSymbols, SymtabError> {
        let mut moved = MovedSymbols::default();
        let entries: Vec<(String, SymbolId)> = self
            .scope(global)
            .iter()
            .map(|(name, sym)| (name.to_owned(), sym))
            .collect();

        for (name, sym) in entries {
            match self.symbol(sym).kind() {
                SymbolKind::Module => continue,
                SymbolKind::Function => {
                    for module in self.function_module_dependencies(sym) {
                        push_unique(&mut moved.mod_dependencies, module);
                    }
                    let symtab = self.down_cast::<Function>(sym).symtab;
                    self.scope_mut(symtab).parent = Some(module_scope);
                }
                SymbolKind::Block => {
                    if let Some(symtab) = self.symbol(sym).symtab() {
                        self.scope_mut(symtab).parent = Some(module_scope);
                    }
                }
                SymbolKind::ExternalSymbol => {
                    if let Symbol::ExternalSymbol(ext) = self.symbol_mut(sym) {
                        ext.parent_symtab = module_scope;
                        let module = ext.module_name;
                        push_unique(&mut moved.mod_dependencies, self.str(module).to_owned());
                    }
                }
                SymbolKind::Variable => {
                    if let Symbol::Variable(v) = self.symbol_mut(sym) {
                        v.parent_symtab = module_scope;
                    }
                }
                SymbolKind::Program => {
                    return Err(SymtabError::Unmovable {
                        name,
                        kind: SymbolKind::Program.name(),
                    });
                }
            }
            self.scope_mut(module_scope).add_symbol(&name, sym)?;
            self.scope_mut(global).erase_symbol(&name)?;
            moved.names.push(name);
        }
        Ok(moved)
    }

    /// Modules named by external symbols that a function's dependency list
    /// refers to. Dependencies are looked up in the function scope, then in
    /// its nested blocks, then in the enclosing scope.
    fn function_module_dependencies(&self, func: SymbolId) -> Vec<String> {
        let f = self.down_cast::<Function>(func);
        let mut modules = Vec::new();
        for dep in f.dependencies.iter(self.al()) {
            let dep = self.str(dep);
            let found = self
                .scope(f.symtab)
                .get_symbol(dep)
                .or_else(|| self.find_in_blocks(f.symtab, dep))
                .or_else(|| {
                    self.scope(f.symtab)
                        .parent
                        .and_then(|p| self.scope(p).get_symbol(dep))
                });
            if let Some(Symbol::ExternalSymbol(ext)) = found.map(|s| self.symbol(s)) {
                push_unique(&mut modules, self.str(ext.module_name).to_owned());
            }
        }
        modules
    }

    fn find_in_blocks(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).iter().find_map(|(_, sym)| match self.symbol(sym) {
            Symbol::Block(b) => self
                .scope(b.symtab)
                .get_symbol(name)
                .or_else(|| self.find_in_blocks(b.symtab, name)),
            _ => None,
        })
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
