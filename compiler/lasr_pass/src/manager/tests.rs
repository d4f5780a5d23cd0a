#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use lasr_ir::asr::pickle::pickle;
use lasr_ir::asr::{AsrArena, DoLoopHead, Intent, TranslationUnit};
use lasr_ir::symtab::ScopeOwner;
use lasr_ir::{ArenaVec, Location};
use pretty_assertions::assert_eq;

use super::{PassManager, PassTiming, DEFAULT_PASSES};
use crate::error::PassError;
use crate::options::PassOptions;

const L: Location = Location::DUMMY;

/// `program main; integer :: i; forall (i = 1:3) i = i; end program`
fn forall_program(arena: &mut AsrArena) -> TranslationUnit {
    let global = arena.new_scope(None);
    let pscope = arena.new_scope(Some(global));
    let int4 = arena.make_integer(L, 4);
    let i = arena
        .declare_variable(L, pscope, "i", int4, Intent::Local)
        .unwrap();
    let iv = arena.make_var(L, i);
    let assign = arena.make_assignment(L, iv, iv);
    let head = DoLoopHead {
        v: Some(iv),
        start: arena.integer_constant(L, 1),
        end: arena.integer_constant(L, 3),
        increment: None,
    };
    let forall = arena.make_forall_single(L, head, assign);
    arena
        .declare_program(L, global, pscope, "main", &[forall])
        .unwrap();
    arena.make_translation_unit(L, global, ArenaVec::EMPTY)
}

fn options() -> PassOptions {
    PassOptions::default().with_verify_after_each_pass(true)
}

#[test]
fn test_builtin_passes_registered() {
    let pm = PassManager::new();
    for name in DEFAULT_PASSES {
        assert!(pm.is_registered(name), "{name}");
    }
    assert!(pm.is_registered("global_stmts"));
    assert_eq!(pm.default_passes(), DEFAULT_PASSES);
}

#[test]
fn test_unknown_pass_runs_nothing() {
    let pm = PassManager::new();
    let mut arena = AsrArena::new();
    let mut unit = forall_program(&mut arena);
    let before = pickle(&arena, &unit);

    let err = pm
        .apply_named(&mut arena, &mut unit, &["forall", "nope"], &options())
        .unwrap_err();
    assert_eq!(err, PassError::UnknownPass("nope".to_owned()));
    assert_eq!(err.to_string(), "unknown pass 'nope'");
    assert_eq!(pickle(&arena, &unit), before);
}

#[test]
fn test_skipped_pass_does_not_run() {
    let pm = PassManager::new();
    let mut arena = AsrArena::new();
    let mut unit = forall_program(&mut arena);
    let before = pickle(&arena, &unit);

    let opts = options().with_skip_pass("forall");
    pm.apply_named(&mut arena, &mut unit, &["forall"], &opts)
        .unwrap();
    assert_eq!(pickle(&arena, &unit), before);

    pm.apply_named(&mut arena, &mut unit, &["forall"], &options())
        .unwrap();
    let after = pickle(&arena, &unit);
    assert!(after.contains("(DoConcurrentLoop"), "{after}");
}

#[test]
fn test_time_report_lists_every_pass_run() {
    let pm = PassManager::new();
    let mut arena = AsrArena::new();
    let mut unit = forall_program(&mut arena);

    let opts = options().with_time_report(true).with_skip_pass("array_op");
    let timings = pm.apply_passes(&mut arena, &mut unit, &opts).unwrap();
    let names: Vec<_> = timings.iter().map(|t| t.pass.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "global_stmts_program",
            "compile_time_values",
            "forall",
            "insert_deallocate",
            "do_loops",
        ]
    );

    let timings = pm.apply_named(&mut arena, &mut unit, &["forall"], &options()).unwrap();
    assert!(timings.is_empty());
}

#[test]
fn test_cumulative_runs_prefix_of_defaults() {
    let pm = PassManager::new();
    let mut arena = AsrArena::new();
    let mut unit = forall_program(&mut arena);

    let opts = options().with_pass_cumulative(true).with_time_report(true);
    let timings = pm
        .apply_named(&mut arena, &mut unit, &["array_op", "compile_time_values"], &opts)
        .unwrap();
    let names: Vec<_> = timings.iter().map(|t| t.pass.as_str()).collect();
    assert_eq!(
        names,
        vec!["global_stmts_program", "compile_time_values", "array_op"]
    );

    // A registered pass outside the default list adds nothing.
    let timings = pm
        .apply_named(&mut arena, &mut unit, &["global_stmts"], &opts)
        .unwrap();
    assert!(timings.is_empty());
}

fn detach_global(
    arena: &mut AsrArena,
    unit: &mut TranslationUnit,
    _: &PassOptions,
) -> Result<(), PassError> {
    arena.scope_mut(unit.global_scope).owner = ScopeOwner::Detached;
    Ok(())
}

#[test]
fn test_broken_pass_is_named() {
    let mut pm = PassManager::new();
    pm.register("detach_global", detach_global);
    let mut arena = AsrArena::new();
    let mut unit = forall_program(&mut arena);

    let err = pm
        .apply_named(&mut arena, &mut unit, &["forall", "detach_global"], &options())
        .unwrap_err();
    let PassError::VerifyFailed { pass, diagnostics } = &err else {
        panic!("expected a verification failure, got {err:?}");
    };
    assert_eq!(pass, "detach_global");
    assert!(diagnostics.starts_with("error [E9001]"), "{diagnostics}");
    assert!(err
        .to_string()
        .starts_with("ASR verification failed after pass 'detach_global':\n"));

    // Without verification the same pipeline goes through.
    let mut arena = AsrArena::new();
    let mut unit = forall_program(&mut arena);
    let opts = options().with_verify_after_each_pass(false);
    pm.apply_named(&mut arena, &mut unit, &["detach_global"], &opts)
        .unwrap();
}

#[test]
fn test_parse_pass_list() {
    let pm = PassManager::new();
    assert_eq!(
        pm.parse_pass_list("forall, DO_LOOPS,,array_op").unwrap(),
        vec!["forall", "do_loops", "array_op"]
    );
    assert_eq!(pm.parse_pass_list("").unwrap(), Vec::<String>::new());
    assert_eq!(
        pm.parse_pass_list("forall,inline").unwrap_err(),
        PassError::UnknownPass("inline".to_owned())
    );
}

#[test]
fn test_timing_display() {
    let t = PassTiming {
        pass: "forall".to_owned(),
        elapsed: Duration::from_micros(12_345),
    };
    assert_eq!(t.to_string(), "[PASS]forall: 12.345 ms");
}
