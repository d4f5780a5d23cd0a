//! Wrap loose top-level items into a function, and optionally a program
//! that calls it.
//!
//! Interactive sources leave statements and expressions directly on the
//! [`TranslationUnit`]. [`wrap_global_stmts`] moves them, in order, into a
//! function named after [`PassOptions::run_fun`]:
//!
//! - an expression item `e` becomes `<run_fun><idx> = e` with a fresh local
//!   of the expression's type (`idx` counts from 1);
//! - a statement item is moved as is;
//! - when the last item is an expression, its local becomes the result
//!   variable and the function uses the C ABI. Otherwise the function is a
//!   subroutine.

use lasr_ir::asr::{
    Abi, AsrArena, Function, Intent, Symbol, TranslationUnit, Ttype, UnitItem, Variable,
};
use lasr_ir::symtab::SymtabError;
use lasr_ir::{ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId, TtypeId};

use crate::error::PassError;
use crate::options::PassOptions;

const PASS: &str = "global_stmts";
const PROGRAM_PASS: &str = "global_stmts_program";

/// Name of the program synthesized by [`global_stmts_program`].
pub const MAIN_PROGRAM: &str = "main_program";

pub fn global_stmts(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    options: &PassOptions,
) -> Result<(), PassError> {
    wrap_global_stmts(arena, unit, options).map(|_| ())
}

/// Run [`wrap_global_stmts`], then unless `disable_main` is set add
/// [`MAIN_PROGRAM`] calling the wrapped function.
pub fn global_stmts_program(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    options: &PassOptions,
) -> Result<(), PassError> {
    let func = wrap_global_stmts(arena, unit, options)?;
    if options.disable_main {
        return Ok(());
    }
    let global = unit.global_scope;
    if arena.scope(global).contains(MAIN_PROGRAM) {
        return Err(already_defined(arena, PROGRAM_PASS, MAIN_PROGRAM, global));
    }

    let loc = unit.loc;
    let symtab = arena.new_scope(Some(global));
    let body = match func {
        Some(func) => vec![call_wrapped(arena, loc, symtab, func, options)?],
        None => Vec::new(),
    };
    let program = arena
        .declare_program(loc, global, symtab, MAIN_PROGRAM, &body)
        .map_err(PassError::symtab(PROGRAM_PASS))?;
    if func.is_some() {
        let dep = arena.new_str(&options.run_fun);
        let deps = arena.new_list(&[dep]);
        if let Symbol::Program(p) = arena.symbol_mut(program) {
            p.dependencies = deps;
        }
    }
    tracing::debug!(with_call = func.is_some(), "synthesized {MAIN_PROGRAM}");
    Ok(())
}

/// Move the unit's items into a new function. Returns `None` when there
/// were no items.
pub fn wrap_global_stmts(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    options: &PassOptions,
) -> Result<Option<SymbolId>, PassError> {
    if unit.items.is_empty() {
        return Ok(None);
    }
    let global = unit.global_scope;
    let name = options.run_fun.as_str();
    if arena.scope(global).contains(name) {
        return Err(already_defined(arena, PASS, name, global));
    }

    let loc = unit.loc;
    let fn_scope = arena.new_scope(Some(global));
    let mut body: Vec<StmtId> = Vec::with_capacity(unit.items.len());
    let mut result: Option<(SymbolId, ExprId)> = None;
    let mut idx = 1;
    for item in arena.list(unit.items) {
        match item {
            UnitItem::Expr(value) => {
                let ty = result_type(arena, loc, value)?;
                let var_name = format!("{name}{idx}");
                let var = arena
                    .declare_variable(loc, fn_scope, &var_name, ty, Intent::Local)
                    .map_err(PassError::symtab(PASS))?;
                if let Symbol::Variable(v) = arena.symbol_mut(var) {
                    v.abi = Abi::BindC;
                }
                let target = arena.make_var(loc, var);
                body.push(arena.make_assignment(loc, target, value));
                result = Some((var, target));
                idx += 1;
            }
            UnitItem::Stmt(stmt) => {
                body.push(stmt);
                result = None;
            }
            UnitItem::Symbol(_) => {
                return Err(PassError::unsupported(
                    PASS,
                    "Unsupported type of global scope node",
                ));
            }
        }
    }

    if let Some((var, _)) = result {
        arena.down_cast_mut::<Variable>(var).intent = Intent::ReturnVar;
    }
    let return_var = result.map(|(_, target)| target);
    let func = arena
        .declare_function(loc, global, fn_scope, name, &[], &body, return_var)
        .map_err(PassError::symtab(PASS))?;
    if return_var.is_some() {
        arena.down_cast_mut::<Function>(func).abi = Abi::BindC;
    }
    unit.items = ArenaVec::EMPTY;
    tracing::debug!(
        statements = body.len(),
        returns_value = return_var.is_some(),
        "wrapped global statements into '{name}'"
    );
    Ok(Some(func))
}

/// Type of the local that receives an expression item.
fn result_type(arena: &mut AsrArena, loc: Location, value: ExprId) -> Result<TtypeId, PassError> {
    let unsupported =
        || PassError::unsupported(PASS, "Return type not supported in interactive mode");
    let ty = arena.expr_type(value).ok_or_else(unsupported)?;
    match *arena.ttype(ty) {
        Ttype::Integer { kind } => Ok(arena.make_integer(loc, kind)),
        Ttype::Real { .. } | Ttype::Complex { .. } => Ok(ty),
        _ => Err(unsupported()),
    }
}

/// The one statement of the synthesized program: a call of `func`, storing
/// its result into a local when it has one.
fn call_wrapped(
    arena: &mut AsrArena,
    loc: Location,
    symtab: ScopeId,
    func: SymbolId,
    options: &PassOptions,
) -> Result<StmtId, PassError> {
    let f = *arena.down_cast::<Function>(func);
    let Some(ret_ty) = f.return_var.and_then(|r| arena.expr_type(r)) else {
        return Ok(arena.make_subroutine_call(loc, func, None, ArenaVec::EMPTY));
    };
    let local = format!("{}_result", options.run_fun);
    let var = arena
        .declare_variable(loc, symtab, &local, ret_ty, Intent::Local)
        .map_err(PassError::symtab(PROGRAM_PASS))?;
    let target = arena.make_var(loc, var);
    let call = arena.make_function_call(loc, func, None, ArenaVec::EMPTY, ret_ty, None);
    Ok(arena.make_assignment(loc, target, call))
}

fn already_defined(
    arena: &AsrArena,
    pass: &'static str,
    name: &str,
    scope: ScopeId,
) -> PassError {
    PassError::Symtab {
        pass,
        source: SymtabError::AlreadyDefined {
            name: name.to_owned(),
            counter: arena.scope(scope).counter,
        },
    }
}
