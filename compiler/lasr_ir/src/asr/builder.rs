//! Shorthands for building common ASR shapes.
//!
//! Each `declare_*` method creates the symbol node and registers it in the
//! given scope under its own name, so the scope tree stays consistent.

use super::symbol::{Block, ExternalSymbol, Function, Module, Program, Variable};
use super::types::{Abi, Access, Deftype, Intent, StorageType};
use super::AsrArena;
use crate::symtab::SymtabError;
use crate::{ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId, TtypeId};

impl AsrArena {
    /// `integer(4)` constant.
    pub fn integer_constant(&mut self, loc: Location, n: i64) -> ExprId {
        let ty = self.make_integer(loc, 4);
        self.make_integer_constant(loc, n, ty)
    }

    /// Local variable with default storage, no initializer.
    pub fn declare_variable(
        &mut self,
        loc: Location,
        scope: ScopeId,
        name: &str,
        ty: TtypeId,
        intent: Intent,
    ) -> Result<SymbolId, SymtabError> {
        let var = Variable {
            parent_symtab: scope,
            name: self.new_str(name),
            dependencies: ArenaVec::EMPTY,
            intent,
            symbolic_value: None,
            value: None,
            storage: StorageType::Default,
            ty,
            abi: Abi::Source,
            access: Access::Public,
        };
        self.register(scope, name, |arena| arena.make_variable(loc, var))
    }

    /// Function whose member scope `symtab` is already populated.
    ///
    /// The signature is derived from the argument and result variables.
    #[allow(clippy::too_many_arguments)]
    pub fn declare_function(
        &mut self,
        loc: Location,
        parent: ScopeId,
        symtab: ScopeId,
        name: &str,
        args: &[ExprId],
        body: &[StmtId],
        return_var: Option<ExprId>,
    ) -> Result<SymbolId, SymtabError> {
        let arg_types: Vec<TtypeId> = args.iter().filter_map(|&a| self.expr_type(a)).collect();
        let arg_types = self.new_list(&arg_types);
        let return_type = return_var.and_then(|r| self.expr_type(r));
        let function_signature = self.make_function_type(loc, arg_types, return_type);
        let func = Function {
            name: self.new_str(name),
            symtab,
            function_signature,
            dependencies: ArenaVec::EMPTY,
            args: self.new_list(args),
            body: self.new_list(body),
            return_var,
            abi: Abi::Source,
            access: Access::Public,
            deftype: Deftype::Implementation,
        };
        self.register(parent, name, |arena| arena.make_function(loc, func))
    }

    pub fn declare_program(
        &mut self,
        loc: Location,
        parent: ScopeId,
        symtab: ScopeId,
        name: &str,
        body: &[StmtId],
    ) -> Result<SymbolId, SymtabError> {
        let program = Program {
            name: self.new_str(name),
            symtab,
            dependencies: ArenaVec::EMPTY,
            body: self.new_list(body),
        };
        self.register(parent, name, |arena| arena.make_program(loc, program))
    }

    pub fn declare_module(
        &mut self,
        loc: Location,
        parent: ScopeId,
        symtab: ScopeId,
        name: &str,
    ) -> Result<SymbolId, SymtabError> {
        let module = Module {
            name: self.new_str(name),
            symtab,
            dependencies: ArenaVec::EMPTY,
            loaded_from_mod: false,
            intrinsic: false,
        };
        self.register(parent, name, |arena| arena.make_module(loc, module))
    }

    pub fn declare_block(
        &mut self,
        loc: Location,
        parent: ScopeId,
        symtab: ScopeId,
        name: &str,
        body: &[StmtId],
    ) -> Result<SymbolId, SymtabError> {
        let block = Block {
            name: self.new_str(name),
            symtab,
            body: self.new_list(body),
        };
        self.register(parent, name, |arena| arena.make_block(loc, block))
    }

    /// Alias `name` in `scope` for `original_name` of module `module_name`.
    #[allow(clippy::too_many_arguments)]
    pub fn declare_external_symbol(
        &mut self,
        loc: Location,
        scope: ScopeId,
        name: &str,
        external: Option<SymbolId>,
        module_name: &str,
        scope_names: &[&str],
        original_name: &str,
    ) -> Result<SymbolId, SymtabError> {
        let scope_names: Vec<_> = scope_names.iter().map(|s| self.new_str(s)).collect();
        let ext = ExternalSymbol {
            parent_symtab: scope,
            name: self.new_str(name),
            external,
            module_name: self.new_str(module_name),
            scope_names: self.new_list(&scope_names),
            original_name: self.new_str(original_name),
            access: Access::Public,
        };
        self.register(scope, name, |arena| arena.make_external_symbol(loc, ext))
    }

    /// Check that `name` is free, build the node, then add it.
    fn register(
        &mut self,
        scope: ScopeId,
        name: &str,
        build: impl FnOnce(&mut Self) -> SymbolId,
    ) -> Result<SymbolId, SymtabError> {
        if self.scope(scope).contains(name) {
            return Err(SymtabError::AlreadyDefined {
                name: name.to_owned(),
                counter: self.scope(scope).counter,
            });
        }
        let sym = build(self);
        self.scope_mut(scope).add_symbol(name, sym)?;
        Ok(sym)
    }
}
