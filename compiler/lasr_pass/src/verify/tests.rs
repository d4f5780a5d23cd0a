#![allow(clippy::unwrap_used, clippy::expect_used)]

use lasr_ir::asr::{AsrArena, BinOp, Intent, Symbol, TranslationUnit, UnitItem};
use lasr_ir::symtab::ScopeOwner;
use lasr_ir::{ArenaVec, Location, ScopeId, SymbolId};
use pretty_assertions::assert_eq;

use super::{verify, verify_unit};
use crate::diagnostic::{Diagnostic, ErrorCode};

const L: Location = Location::DUMMY;

/// `program main; integer :: a; a = 1 + 2; end program`
fn program(arena: &mut AsrArena) -> (TranslationUnit, ScopeId, SymbolId) {
    let global = arena.new_scope(None);
    let pscope = arena.new_scope(Some(global));
    let int4 = arena.make_integer(L, 4);
    let a = arena
        .declare_variable(L, pscope, "a", int4, Intent::Local)
        .unwrap();
    let one = arena.integer_constant(L, 1);
    let two = arena.integer_constant(L, 2);
    let sum = arena.make_integer_bin_op(L, one, BinOp::Add, two, int4, None);
    let target = arena.make_var(L, a);
    let assign = arena.make_assignment(Location::new(5, 9), target, sum);
    let main = arena
        .declare_program(L, global, pscope, "main", &[assign])
        .unwrap();
    let unit = arena.make_translation_unit(L, global, ArenaVec::EMPTY);
    (unit, pscope, main)
}

fn codes(arena: &AsrArena, unit: &TranslationUnit, check_external: bool) -> Vec<ErrorCode> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let ok = verify(arena, unit, check_external, &mut diagnostics);
    assert_eq!(ok, diagnostics.is_empty());
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_well_formed_program_passes() {
    let mut arena = AsrArena::new();
    let (unit, _, _) = program(&mut arena);
    assert_eq!(codes(&arena, &unit, true), vec![]);
    assert!(verify_unit(&arena, &unit, true).is_ok());
}

#[test]
fn test_broken_owner_link() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    arena.scope_mut(pscope).owner = ScopeOwner::Detached;

    let err = verify_unit(&arena, &unit, false).unwrap_err();
    assert_eq!(err.diagnostics.len(), 1);
    assert_eq!(err.diagnostics[0].code, ErrorCode::E9004);
    let text = err.to_string();
    assert!(text.starts_with("ASR verification failed:\nerror [E9004]: "), "{text}");
    assert!(text.contains("the scope of 'main' is not owned by 'main'"), "{text}");
}

#[test]
fn test_global_scope_must_belong_to_unit() {
    let mut arena = AsrArena::new();
    let (unit, _, _) = program(&mut arena);
    arena.scope_mut(unit.global_scope).owner = ScopeOwner::Detached;
    assert_eq!(codes(&arena, &unit, false), vec![ErrorCode::E9001]);
}

#[test]
fn test_duplicate_scope_counter() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    let counter = arena.scope(pscope).counter;
    let clash = arena.new_scope_with_counter(Some(unit.global_scope), counter);
    arena
        .declare_function(L, unit.global_scope, clash, "f", &[], &[], None)
        .unwrap();
    assert_eq!(codes(&arena, &unit, false), vec![ErrorCode::E9002]);
}

#[test]
fn test_scope_parent_must_be_enclosing_scope() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    let stray = arena.new_scope(None);
    arena.scope_mut(pscope).parent = Some(stray);
    assert!(codes(&arena, &unit, false).contains(&ErrorCode::E9003));
}

#[test]
fn test_reference_to_invisible_scope() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    let a = arena.scope(pscope).get_symbol("a").unwrap();

    // A sibling function reads `a` out of the program's scope.
    let fscope = arena.new_scope(Some(unit.global_scope));
    let int4 = arena.make_integer(L, 4);
    let b = arena
        .declare_variable(L, fscope, "b", int4, Intent::Local)
        .unwrap();
    let target = arena.make_var(L, b);
    let value = arena.make_var(Location::new(30, 31), a);
    let assign = arena.make_assignment(L, target, value);
    arena
        .declare_function(L, unit.global_scope, fscope, "f", &[], &[assign], None)
        .unwrap();

    let err = verify_unit(&arena, &unit, false).unwrap_err();
    assert_eq!(err.diagnostics.len(), 1);
    let d = &err.diagnostics[0];
    assert_eq!(d.code, ErrorCode::E9007);
    assert_eq!(d.labels[0].loc, Location::new(30, 31));
    assert!(d.message.contains("'a'"));
}

#[test]
fn test_reference_to_erased_symbol() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    arena.scope_mut(pscope).erase_symbol("a").unwrap();
    assert_eq!(codes(&arena, &unit, false), vec![ErrorCode::E9007]);
}

#[test]
fn test_symbol_held_under_wrong_name() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    let a = arena.scope_mut(pscope).erase_symbol("a").unwrap();
    arena.scope_mut(pscope).add_symbol("b", a).unwrap();
    assert!(codes(&arena, &unit, false).contains(&ErrorCode::E9006));
}

#[test]
fn test_program_outside_global_scope() {
    let mut arena = AsrArena::new();
    let (unit, pscope, _) = program(&mut arena);
    let inner = arena.new_scope(Some(pscope));
    arena
        .declare_program(L, pscope, inner, "nested", &[])
        .unwrap();
    assert_eq!(codes(&arena, &unit, false), vec![ErrorCode::E9005]);
}

#[test]
fn test_dependency_must_be_identifier() {
    let mut arena = AsrArena::new();
    let (unit, _, main) = program(&mut arena);
    let good = arena.new_str("helper_1");
    let bad = arena.new_str("1st helper");
    let deps = arena.new_list(&[good, bad]);
    if let Symbol::Program(p) = arena.symbol_mut(main) {
        p.dependencies = deps;
    }
    let err = verify_unit(&arena, &unit, false).unwrap_err();
    assert_eq!(err.diagnostics.len(), 1);
    assert_eq!(err.diagnostics[0].code, ErrorCode::E9008);
    assert!(err.diagnostics[0].message.contains("'1st helper'"));
}

#[test]
fn test_symbol_unit_item() {
    let mut arena = AsrArena::new();
    let (mut unit, _, main) = program(&mut arena);
    unit.items = arena.new_list(&[UnitItem::Symbol(main)]);
    assert_eq!(codes(&arena, &unit, false), vec![ErrorCode::E9009]);
}

#[test]
fn test_real_loop_variable() {
    let mut arena = AsrArena::new();
    let global = arena.new_scope(None);
    let pscope = arena.new_scope(Some(global));
    let real4 = arena.make_real(L, 4);
    let x = arena
        .declare_variable(L, pscope, "x", real4, Intent::Local)
        .unwrap();
    let v = arena.make_var(L, x);
    let head = lasr_ir::asr::DoLoopHead {
        v: Some(v),
        start: arena.integer_constant(L, 1),
        end: arena.integer_constant(L, 10),
        increment: None,
    };
    let do_loop = arena.make_do_loop(L, head, ArenaVec::EMPTY);
    arena
        .declare_program(L, global, pscope, "main", &[do_loop])
        .unwrap();
    let unit = arena.make_translation_unit(L, global, ArenaVec::EMPTY);
    assert_eq!(codes(&arena, &unit, false), vec![ErrorCode::E9010]);
}

#[test]
fn test_external_links_checked_on_request() {
    let mut arena = AsrArena::new();
    let global = arena.new_scope(None);
    let mscope = arena.new_scope(Some(global));
    let int4 = arena.make_integer(L, 4);
    let n = arena
        .declare_variable(L, mscope, "n", int4, Intent::Local)
        .unwrap();
    arena.declare_module(L, global, mscope, "consts").unwrap();
    let pscope = arena.new_scope(Some(global));
    let ext = arena
        .declare_external_symbol(L, pscope, "n", None, "consts", &[], "n")
        .unwrap();
    arena.declare_program(L, global, pscope, "main", &[]).unwrap();
    let unit = arena.make_translation_unit(L, global, ArenaVec::EMPTY);

    assert_eq!(codes(&arena, &unit, false), vec![]);
    assert_eq!(codes(&arena, &unit, true), vec![ErrorCode::E9011]);

    if let Symbol::ExternalSymbol(e) = arena.symbol_mut(ext) {
        e.external = Some(n);
    }
    assert_eq!(codes(&arena, &unit, true), vec![]);

    // Right name, wrong module.
    let other = arena.new_str("other");
    if let Symbol::ExternalSymbol(e) = arena.symbol_mut(ext) {
        e.module_name = other;
    }
    let err = verify_unit(&arena, &unit, true).unwrap_err();
    assert_eq!(err.diagnostics[0].code, ErrorCode::E9011);
    assert_eq!(
        err.diagnostics[0].notes,
        vec!["its target lives in module 'consts'".to_owned()]
    );
}

#[test]
fn test_every_problem_is_reported() {
    let mut arena = AsrArena::new();
    let (mut unit, pscope, main) = program(&mut arena);
    arena.scope_mut(pscope).owner = ScopeOwner::Detached;
    unit.items = arena.new_list(&[UnitItem::Symbol(main)]);
    assert_eq!(
        codes(&arena, &unit, false),
        vec![ErrorCode::E9009, ErrorCode::E9004]
    );
}
