#![allow(clippy::unwrap_used, clippy::expect_used)]

use lasr_ir::asr::pickle::pickle;
use lasr_ir::asr::{
    AsrArena, BinOp, DoLoopHead, Function, Intent, Program, StmtKind, TranslationUnit, UnitItem,
};
use lasr_ir::{ArenaVec, Location};
use lasr_pass::passes::{global_stmts_program, MAIN_PROGRAM};
use lasr_pass::{verify_unit, PassManager, PassOptions};
use lasr_serialize::{deserialize, serialize, DeserializeOptions};
use pretty_assertions::assert_eq;

const L: Location = Location::DUMMY;

fn empty_unit(arena: &mut AsrArena) -> TranslationUnit {
    let global = arena.new_scope(None);
    arena.make_translation_unit(L, global, ArenaVec::EMPTY)
}

#[test]
fn test_no_items_with_disable_main_adds_nothing() {
    lasr_pass::init_tracing();
    let mut arena = AsrArena::new();
    let mut unit = empty_unit(&mut arena);
    let opts = PassOptions::default().with_disable_main(true);

    global_stmts_program(&mut arena, &mut unit, &opts).unwrap();
    assert!(arena.scope(unit.global_scope).is_empty());
}

#[test]
fn test_no_items_gives_empty_main_program() {
    let mut arena = AsrArena::new();
    let mut unit = empty_unit(&mut arena);

    global_stmts_program(&mut arena, &mut unit, &PassOptions::default()).unwrap();

    let global = arena.scope(unit.global_scope);
    assert_eq!(global.len(), 1);
    let program = global.get_symbol(MAIN_PROGRAM).unwrap();
    assert!(arena.down_cast::<Program>(program).body.is_empty());
    assert!(verify_unit(&arena, &unit, true).is_ok());
}

#[test]
fn test_statements_are_called_from_main_program() {
    let mut arena = AsrArena::new();
    let one = arena.integer_constant(L, 1);
    let values = arena.new_list(&[one]);
    let print = arena.make_print(L, values);
    let global = arena.new_scope(None);
    let items = arena.new_list(&[UnitItem::Stmt(print)]);
    let mut unit = arena.make_translation_unit(L, global, items);

    global_stmts_program(&mut arena, &mut unit, &PassOptions::default()).unwrap();

    assert!(unit.items.is_empty());
    let table = arena.scope(global);
    let func = table.get_symbol("_lfortran_main_program").unwrap();
    let program = table.get_symbol(MAIN_PROGRAM).unwrap();
    assert_eq!(
        arena.list(arena.down_cast::<Function>(func).body),
        vec![print]
    );
    let body = arena.list(arena.down_cast::<Program>(program).body);
    assert_eq!(body.len(), 1);
    assert!(matches!(
        *arena.stmt(body[0]),
        StmtKind::SubroutineCall { name, args, .. } if name == func && args.is_empty()
    ));
    assert!(verify_unit(&arena, &unit, true).is_ok());
}

#[test]
fn test_disable_main_still_wraps_items() {
    let mut arena = AsrArena::new();
    let one = arena.integer_constant(L, 1);
    let global = arena.new_scope(None);
    let items = arena.new_list(&[UnitItem::Expr(one)]);
    let mut unit = arena.make_translation_unit(L, global, items);
    let opts = PassOptions::default()
        .with_disable_main(true)
        .with_run_fun("repl_1");

    global_stmts_program(&mut arena, &mut unit, &opts).unwrap();

    let table = arena.scope(global);
    assert!(table.contains("repl_1"));
    assert!(!table.contains(MAIN_PROGRAM));
}

/// `program main; integer :: i, s; do i = 1, 10; s = s + i; end do; forall ...`
fn loops_program(arena: &mut AsrArena) -> TranslationUnit {
    let global = arena.new_scope(None);
    let pscope = arena.new_scope(Some(global));
    let int4 = arena.make_integer(L, 4);
    let i = arena
        .declare_variable(L, pscope, "i", int4, Intent::Local)
        .unwrap();
    let s = arena
        .declare_variable(L, pscope, "s", int4, Intent::Local)
        .unwrap();
    let iv = arena.make_var(L, i);
    let sv = arena.make_var(L, s);
    let sum = arena.make_integer_bin_op(L, sv, BinOp::Add, iv, int4, None);
    let acc = arena.make_assignment(L, sv, sum);
    let head = DoLoopHead {
        v: Some(iv),
        start: arena.integer_constant(L, 1),
        end: arena.integer_constant(L, 10),
        increment: None,
    };
    let body = arena.new_list(&[acc]);
    let do_loop = arena.make_do_loop(L, head, body);
    let reset = arena.make_assignment(L, sv, iv);
    let forall = arena.make_forall_single(L, head, reset);
    arena
        .declare_program(L, global, pscope, "main", &[do_loop, forall])
        .unwrap();
    arena.make_translation_unit(L, global, ArenaVec::EMPTY)
}

#[test]
fn test_default_pipeline_then_serialize() {
    let pm = PassManager::new();
    let mut arena = AsrArena::new();
    let mut unit = loops_program(&mut arena);
    let opts = PassOptions::default()
        .with_verify_after_each_pass(true)
        .with_disable_main(true);

    pm.apply_passes(&mut arena, &mut unit, &opts).unwrap();
    let text = pickle(&arena, &unit);
    assert!(!text.contains("(DoLoop"), "{text}");
    assert!(!text.contains("(ForAllSingle"), "{text}");
    assert!(text.contains("(WhileLoop"), "{text}");
    assert!(text.contains("(DoConcurrentLoop"), "{text}");

    let bytes = serialize(&arena, &unit).unwrap();
    let mut loaded = AsrArena::new();
    let back = deserialize(
        &mut loaded,
        &bytes,
        DeserializeOptions {
            load_symtab_id: true,
        },
    )
    .unwrap();
    assert_eq!(pickle(&loaded, &back), text);
    assert!(verify_unit(&loaded, &back, true).is_ok());
}
