//! Re-link `ExternalSymbol`s after loading.
//!
//! The stream does not carry `ExternalSymbol::external`: the target lives in
//! another module and may come from another file. After a unit is decoded,
//! every external symbol is looked up again by module name, scope path and
//! original name.

use lasr_ir::asr::visitor::{walk_symbol, Visitor};
use lasr_ir::asr::{AsrArena, Symbol, TranslationUnit};
use lasr_ir::{ScopeId, SymbolId};

use crate::error::ExternalSymbolError;

/// Fill in `external` for every external symbol reachable from `unit`.
///
/// The module is searched for in the unit's global scope first, then in
/// `external_scope` (typically the scope holding previously loaded module
/// files).
pub fn fix_external_symbols(
    arena: &mut AsrArena,
    unit: &TranslationUnit,
    external_scope: Option<ScopeId>,
) -> Result<(), ExternalSymbolError> {
    let mut collect = CollectExternals(Vec::new());
    collect.visit_unit(arena, unit);
    let externals = collect.0;

    for &sym in &externals {
        let Symbol::ExternalSymbol(ext) = *arena.symbol(sym) else {
            continue;
        };
        let module_name = arena.str(ext.module_name).to_owned();
        let original_name = arena.str(ext.original_name).to_owned();

        let module = find_module(arena, unit.global_scope, &module_name)
            .or_else(|| external_scope.and_then(|s| find_module(arena, s, &module_name)))
            .ok_or_else(|| ExternalSymbolError::ModuleNotFound {
                symbol: original_name.clone(),
                module: module_name.clone(),
            })?;

        let scope_names = arena.strings(ext.scope_names);
        let path: Vec<&str> = scope_names.iter().map(String::as_str).collect();
        let target = arena
            .find_scoped_symbol(module, &original_name, &path)
            .ok_or(ExternalSymbolError::SymbolNotFound {
                symbol: original_name,
                module: module_name,
            })?;

        if let Symbol::ExternalSymbol(ext) = arena.symbol_mut(sym) {
            ext.external = Some(target);
        }
    }
    tracing::debug!(count = externals.len(), "resolved external symbols");
    Ok(())
}

/// Member scope of the module called `name` in `scope`.
fn find_module(arena: &AsrArena, scope: ScopeId, name: &str) -> Option<ScopeId> {
    match arena.symbol(arena.scope(scope).get_symbol(name)?) {
        Symbol::Module(m) => Some(m.symtab),
        _ => None,
    }
}

struct CollectExternals(Vec<SymbolId>);

impl<'a> Visitor<'a> for CollectExternals {
    fn visit_symbol(&mut self, arena: &'a AsrArena, sym: SymbolId) {
        if matches!(arena.symbol(sym), Symbol::ExternalSymbol(_)) {
            self.0.push(sym);
        }
        walk_symbol(self, arena, sym);
    }
}
