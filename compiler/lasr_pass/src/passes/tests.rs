#![allow(clippy::unwrap_used, clippy::expect_used)]

use lasr_ir::asr::pickle::{pickle, pickle_expr, pickle_stmt};
use lasr_ir::asr::{
    Abi, AsrArena, BinOp, CmpOp, Dimension, DoLoopHead, ExprKind, Function, Intent, Program,
    StmtKind, TranslationUnit, UnitItem, Variable,
};
use lasr_ir::symtab::SymtabError;
use lasr_ir::{ArenaVec, ExprId, Location, ScopeId, StmtId, SymbolId};
use pretty_assertions::assert_eq;

use super::*;
use crate::error::PassError;
use crate::options::PassOptions;
use crate::verify::verify_unit;

const L: Location = Location::DUMMY;

/// Global scope plus an empty program scope, with integer locals declared
/// in the program scope.
struct Fixture {
    arena: AsrArena,
    global: ScopeId,
    pscope: ScopeId,
}

impl Fixture {
    fn new() -> Self {
        let mut arena = AsrArena::new();
        let global = arena.new_scope(None);
        let pscope = arena.new_scope(Some(global));
        Fixture {
            arena,
            global,
            pscope,
        }
    }

    fn int_var(&mut self, name: &str) -> (SymbolId, ExprId) {
        let int4 = self.arena.make_integer(L, 4);
        let v = self
            .arena
            .declare_variable(L, self.pscope, name, int4, Intent::Local)
            .unwrap();
        (v, self.arena.make_var(L, v))
    }

    /// Declare `main` with `body` and build the unit.
    fn finish(&mut self, body: &[StmtId]) -> (TranslationUnit, SymbolId) {
        let main = self
            .arena
            .declare_program(L, self.global, self.pscope, "main", body)
            .unwrap();
        let unit = self
            .arena
            .make_translation_unit(L, self.global, ArenaVec::EMPTY);
        (unit, main)
    }

    fn body(&self, main: SymbolId) -> Vec<StmtId> {
        let body = self.arena.down_cast::<Program>(main).body;
        self.arena.list(body)
    }

    fn counter(&self) -> u32 {
        self.arena.scope(self.pscope).counter
    }
}

fn opts() -> PassOptions {
    PassOptions::default()
}

// forall

#[test]
fn test_forall_becomes_do_concurrent() {
    let mut fx = Fixture::new();
    let (_, i) = fx.int_var("i");
    let (_, s) = fx.int_var("s");
    let assign = fx.arena.make_assignment(L, s, i);
    let head = DoLoopHead {
        v: Some(i),
        start: fx.arena.integer_constant(L, 1),
        end: fx.arena.integer_constant(L, 4),
        increment: None,
    };
    let forall = fx.arena.make_forall_single(L, head, assign);
    let (mut unit, main) = fx.finish(&[forall]);

    replace_forall(&mut fx.arena, &mut unit, &opts()).unwrap();

    let body = fx.body(main);
    assert_eq!(body.len(), 1);
    let StmtKind::DoConcurrentLoop { head: new_head, body: inner } = *fx.arena.stmt(body[0]) else {
        panic!("expected a do concurrent loop");
    };
    assert_eq!(new_head, head);
    assert_eq!(fx.arena.list(inner), vec![assign]);
    assert!(verify_unit(&fx.arena, &unit, true).is_ok());
}

#[test]
fn test_forall_is_idempotent() {
    let mut fx = Fixture::new();
    let (_, i) = fx.int_var("i");
    let assign = fx.arena.make_assignment(L, i, i);
    let head = DoLoopHead {
        v: Some(i),
        start: fx.arena.integer_constant(L, 1),
        end: fx.arena.integer_constant(L, 2),
        increment: None,
    };
    let forall = fx.arena.make_forall_single(L, head, assign);
    let (mut unit, _) = fx.finish(&[forall]);

    replace_forall(&mut fx.arena, &mut unit, &opts()).unwrap();
    let once = pickle(&fx.arena, &unit);
    let exprs = fx.arena.expr_count();
    let stmts = fx.arena.stmt_count();

    replace_forall(&mut fx.arena, &mut unit, &opts()).unwrap();
    assert_eq!(pickle(&fx.arena, &unit), once);
    assert_eq!(fx.arena.expr_count(), exprs);
    assert_eq!(fx.arena.stmt_count(), stmts);
}

// do_loops

fn counted_loop(fx: &mut Fixture, increment: Option<ExprId>) -> (TranslationUnit, SymbolId) {
    let (_, i) = fx.int_var("i");
    let (_, s) = fx.int_var("s");
    let int4 = fx.arena.make_integer(L, 4);
    let sum = fx.arena.make_integer_bin_op(L, s, BinOp::Add, i, int4, None);
    let acc = fx.arena.make_assignment(L, s, sum);
    let head = DoLoopHead {
        v: Some(i),
        start: fx.arena.integer_constant(L, 1),
        end: fx.arena.integer_constant(L, 10),
        increment,
    };
    let body = fx.arena.new_list(&[acc]);
    let do_loop = fx.arena.make_do_loop(L, head, body);
    fx.finish(&[do_loop])
}

#[test]
fn test_do_loop_lowered_to_while() {
    let mut fx = Fixture::new();
    let (mut unit, main) = counted_loop(&mut fx, None);
    replace_do_loops(&mut fx.arena, &mut unit, &opts()).unwrap();

    let c = fx.counter();
    let body = fx.body(main);
    assert_eq!(body.len(), 2);
    assert_eq!(
        pickle_stmt(&fx.arena, body[0]),
        format!(
            "(Assignment (Var {c} i) (IntegerBinOp (IntegerConstant 1 (Integer 4)) Sub \
             (IntegerConstant 1 (Integer 4)) (Integer 4) ()))"
        )
    );
    let StmtKind::WhileLoop { test, body: inner } = *fx.arena.stmt(body[1]) else {
        panic!("expected a while loop");
    };
    assert_eq!(
        pickle_expr(&fx.arena, test),
        format!(
            "(IntegerCompare (IntegerBinOp (Var {c} i) Add (IntegerConstant 1 (Integer 4)) \
             (Integer 4) ()) LtE (IntegerConstant 10 (Integer 4)) (Logical 4) ())"
        )
    );
    let inner = fx.arena.list(inner);
    assert_eq!(inner.len(), 2);
    assert_eq!(
        pickle_stmt(&fx.arena, inner[0]),
        format!(
            "(Assignment (Var {c} i) (IntegerBinOp (Var {c} i) Add \
             (IntegerConstant 1 (Integer 4)) (Integer 4) ()))"
        )
    );
    assert!(verify_unit(&fx.arena, &unit, true).is_ok());
}

#[test]
fn test_negative_step_compares_downwards() {
    let mut fx = Fixture::new();
    let one = fx.arena.integer_constant(L, 1);
    let int4 = fx.arena.make_integer(L, 4);
    let minus_one = fx.arena.make_integer_unary_minus(L, one, int4, None);
    let (mut unit, main) = counted_loop(&mut fx, Some(minus_one));
    replace_do_loops(&mut fx.arena, &mut unit, &opts()).unwrap();

    let body = fx.body(main);
    let StmtKind::WhileLoop { test, .. } = *fx.arena.stmt(body[1]) else {
        panic!("expected a while loop");
    };
    assert!(matches!(
        *fx.arena.expr(test),
        ExprKind::IntegerCompare { op: CmpOp::GtE, .. }
    ));
}

#[test]
fn test_folded_step_is_accepted() {
    let mut fx = Fixture::new();
    let int4 = fx.arena.make_integer(L, 4);
    let two = fx.arena.integer_constant(L, 2);
    let three = fx.arena.integer_constant(L, 3);
    let minus = fx.arena.make_integer_constant(L, -1, int4);
    let step = fx
        .arena
        .make_integer_bin_op(L, two, BinOp::Sub, three, int4, Some(minus));
    let (mut unit, main) = counted_loop(&mut fx, Some(step));
    replace_do_loops(&mut fx.arena, &mut unit, &opts()).unwrap();

    let body = fx.body(main);
    let StmtKind::WhileLoop { test, .. } = *fx.arena.stmt(body[1]) else {
        panic!("expected a while loop");
    };
    assert!(matches!(
        *fx.arena.expr(test),
        ExprKind::IntegerCompare { op: CmpOp::GtE, .. }
    ));
}

#[test]
fn test_variable_step_is_unsupported() {
    let mut fx = Fixture::new();
    let (_, k) = fx.int_var("k");
    let (mut unit, _) = counted_loop(&mut fx, Some(k));
    let err = replace_do_loops(&mut fx.arena, &mut unit, &opts()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "do_loops: do loop increment type not supported"
    );
}

#[test]
fn test_nested_do_loops_are_all_lowered() {
    let mut fx = Fixture::new();
    let (_, i) = fx.int_var("i");
    let (_, j) = fx.int_var("j");
    let assign = fx.arena.make_assignment(L, i, j);
    let inner_head = DoLoopHead {
        v: Some(j),
        start: fx.arena.integer_constant(L, 1),
        end: fx.arena.integer_constant(L, 3),
        increment: None,
    };
    let inner_body = fx.arena.new_list(&[assign]);
    let inner = fx.arena.make_do_loop(L, inner_head, inner_body);
    let outer_head = DoLoopHead {
        v: Some(i),
        start: fx.arena.integer_constant(L, 1),
        end: fx.arena.integer_constant(L, 3),
        increment: None,
    };
    let outer_body = fx.arena.new_list(&[inner]);
    let outer = fx.arena.make_do_loop(L, outer_head, outer_body);
    let (mut unit, main) = fx.finish(&[outer]);

    replace_do_loops(&mut fx.arena, &mut unit, &opts()).unwrap();
    let text = pickle(&fx.arena, &unit);
    assert!(!text.contains("(DoLoop"), "{text}");
    assert_eq!(text.matches("(WhileLoop").count(), 2);
    assert_eq!(fx.body(main).len(), 2);
}

// compile_time_values

#[test]
fn test_folded_values_replace_operators() {
    let mut fx = Fixture::new();
    let (_, a) = fx.int_var("a");
    let int4 = fx.arena.make_integer(L, 4);
    let one = fx.arena.integer_constant(L, 1);
    let two = fx.arena.integer_constant(L, 2);
    let three = fx.arena.integer_constant(L, 3);
    let six = fx.arena.integer_constant(L, 6);
    let seven = fx.arena.integer_constant(L, 7);
    let mul = fx
        .arena
        .make_integer_bin_op(L, two, BinOp::Mul, three, int4, Some(six));
    let add = fx
        .arena
        .make_integer_bin_op(L, one, BinOp::Add, mul, int4, Some(seven));
    let assign = fx.arena.make_assignment(L, a, add);
    let (mut unit, main) = fx.finish(&[assign]);

    replace_with_compile_time_values(&mut fx.arena, &mut unit, &opts()).unwrap();

    let body = fx.body(main);
    let StmtKind::Assignment { value, .. } = *fx.arena.stmt(body[0]) else {
        panic!("expected an assignment");
    };
    assert_eq!(pickle_expr(&fx.arena, value), "(IntegerConstant 7 (Integer 4))");
}

#[test]
fn test_unfolded_expressions_are_kept() {
    let mut fx = Fixture::new();
    let (_, a) = fx.int_var("a");
    let (_, b) = fx.int_var("b");
    let int4 = fx.arena.make_integer(L, 4);
    let one = fx.arena.integer_constant(L, 1);
    let add = fx.arena.make_integer_bin_op(L, b, BinOp::Add, one, int4, None);
    let assign = fx.arena.make_assignment(L, a, add);
    let (mut unit, _) = fx.finish(&[assign]);
    let before = pickle(&fx.arena, &unit);

    replace_with_compile_time_values(&mut fx.arena, &mut unit, &opts()).unwrap();
    assert_eq!(pickle(&fx.arena, &unit), before);
}

// insert_deallocate

#[test]
fn test_deallocate_before_return_and_at_end() {
    let mut arena = AsrArena::new();
    let global = arena.new_scope(None);
    let fscope = arena.new_scope(Some(global));
    let real8 = arena.make_real(L, 8);
    let one = arena.integer_constant(L, 1);
    let dims = arena.new_list(&[Dimension {
        start: None,
        length: None,
    }]);
    let arr = arena.make_array(L, real8, dims);
    let alloc = arena.make_allocatable(L, arr);
    arena
        .declare_variable(L, fscope, "buf", alloc, Intent::Local)
        .unwrap();
    let logical = arena.make_logical(L, 4);
    let flag = arena.make_logical_constant(L, true, logical);
    let ret = arena.make_return(L);
    let early = arena.new_list(&[ret]);
    let branch = arena.make_if(L, flag, early, ArenaVec::EMPTY);
    let values = arena.new_list(&[one]);
    let print = arena.make_print(L, values);
    let f = arena
        .declare_function(L, global, fscope, "f", &[], &[branch, print], None)
        .unwrap();
    let mut unit = arena.make_translation_unit(L, global, ArenaVec::EMPTY);

    insert_deallocate(&mut arena, &mut unit, &opts()).unwrap();

    let body = arena.list(arena.down_cast::<Function>(f).body);
    assert_eq!(body.len(), 3);
    assert_eq!(body[1], print);
    let c = arena.scope(fscope).counter;
    assert_eq!(
        pickle_stmt(&arena, body[2]),
        format!("(ImplicitDeallocate [(Var {c} buf)])")
    );
    let StmtKind::If { body: then, .. } = *arena.stmt(body[0]) else {
        panic!("expected an if");
    };
    let then = arena.list(then);
    assert_eq!(then.len(), 2);
    assert!(matches!(
        arena.stmt(then[0]),
        StmtKind::ImplicitDeallocate { .. }
    ));
    assert_eq!(then[1], ret);
    assert!(verify_unit(&arena, &unit, true).is_ok());
}

#[test]
fn test_body_ending_in_return_gets_no_extra_deallocate() {
    let mut fx = Fixture::new();
    let real8 = fx.arena.make_real(L, 8);
    let alloc = fx.arena.make_allocatable(L, real8);
    fx.arena
        .declare_variable(L, fx.pscope, "p", alloc, Intent::Local)
        .unwrap();
    let ret = fx.arena.make_return(L);
    let (mut unit, main) = fx.finish(&[ret]);

    insert_deallocate(&mut fx.arena, &mut unit, &opts()).unwrap();

    let body = fx.body(main);
    assert_eq!(body.len(), 2);
    assert!(matches!(
        fx.arena.stmt(body[0]),
        StmtKind::ImplicitDeallocate { .. }
    ));
    assert_eq!(body[1], ret);
}

#[test]
fn test_no_allocatables_no_change() {
    let mut fx = Fixture::new();
    let (_, a) = fx.int_var("a");
    let one = fx.arena.integer_constant(L, 1);
    let assign = fx.arena.make_assignment(L, a, one);
    let ret = fx.arena.make_return(L);
    let (mut unit, _) = fx.finish(&[assign, ret]);
    let before = pickle(&fx.arena, &unit);

    insert_deallocate(&mut fx.arena, &mut unit, &opts()).unwrap();
    assert_eq!(pickle(&fx.arena, &unit), before);
}

// array_op

fn real_array(arena: &mut AsrArena, extents: &[i64]) -> lasr_ir::TtypeId {
    let real4 = arena.make_real(L, 4);
    let dims: Vec<Dimension> = extents
        .iter()
        .map(|&n| Dimension {
            start: None,
            length: Some(arena.integer_constant(L, n)),
        })
        .collect();
    let dims = arena.new_list(&dims);
    arena.make_array(L, real4, dims)
}

#[test]
fn test_array_assignment_scalarized() {
    let mut fx = Fixture::new();
    let arr = real_array(&mut fx.arena, &[3]);
    let x = fx
        .arena
        .declare_variable(L, fx.pscope, "x", arr, Intent::Local)
        .unwrap();
    let y = fx
        .arena
        .declare_variable(L, fx.pscope, "y", arr, Intent::Local)
        .unwrap();
    let xv = fx.arena.make_var(L, x);
    let yv = fx.arena.make_var(L, y);
    let real4 = fx.arena.make_real(L, 4);
    let two = fx.arena.make_real_constant(L, 2.0, real4);
    let mul = fx.arena.make_real_bin_op(L, yv, BinOp::Mul, two, arr, None);
    let assign = fx.arena.make_assignment(L, xv, mul);
    let (mut unit, main) = fx.finish(&[assign]);

    replace_array_op(&mut fx.arena, &mut unit, &opts()).unwrap();

    let c = fx.counter();
    let body = fx.body(main);
    assert_eq!(body.len(), 1);
    assert!(fx.arena.scope(fx.pscope).contains("__i1"));
    assert_eq!(
        pickle_stmt(&fx.arena, body[0]),
        format!(
            "(DoLoop ((Var {c} __i1) (IntegerConstant 1 (Integer 4)) \
             (IntegerConstant 3 (Integer 4)) ()) \
             [(Assignment (ArrayItem (Var {c} x) [(Var {c} __i1)] (Real 4) ()) \
             (RealBinOp (ArrayItem (Var {c} y) [(Var {c} __i1)] (Real 4) ()) Mul \
             (RealConstant 2.0 (Real 4)) (Real 4) ()))])"
        )
    );
    assert!(verify_unit(&fx.arena, &unit, true).is_ok());
}

#[test]
fn test_array_bounds_overflow_is_unsupported() {
    let mut fx = Fixture::new();
    let real4 = fx.arena.make_real(L, 4);
    let dims = [Dimension {
        start: Some(fx.arena.integer_constant(L, i64::MAX)),
        length: Some(fx.arena.integer_constant(L, 2)),
    }];
    let dims = fx.arena.new_list(&dims);
    let arr = fx.arena.make_array(L, real4, dims);
    let x = fx
        .arena
        .declare_variable(L, fx.pscope, "x", arr, Intent::Local)
        .unwrap();
    let y = fx
        .arena
        .declare_variable(L, fx.pscope, "y", arr, Intent::Local)
        .unwrap();
    let xv = fx.arena.make_var(L, x);
    let yv = fx.arena.make_var(L, y);
    let assign = fx.arena.make_assignment(L, xv, yv);
    let (mut unit, main) = fx.finish(&[assign]);

    let err = replace_array_op(&mut fx.arena, &mut unit, &opts()).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "array_op: array bounds overflow: start {}, length 2",
            i64::MAX
        )
    );
    assert_eq!(fx.body(main), vec![assign]);
}

#[test]
fn test_last_dimension_is_outermost() {
    let mut fx = Fixture::new();
    let arr = real_array(&mut fx.arena, &[2, 5]);
    let x = fx
        .arena
        .declare_variable(L, fx.pscope, "x", arr, Intent::Local)
        .unwrap();
    let xv = fx.arena.make_var(L, x);
    let real4 = fx.arena.make_real(L, 4);
    let zero = fx.arena.make_real_constant(L, 0.0, real4);
    let assign = fx.arena.make_assignment(L, xv, zero);
    let (mut unit, main) = fx.finish(&[assign]);

    replace_array_op(&mut fx.arena, &mut unit, &opts()).unwrap();

    let body = fx.body(main);
    let StmtKind::DoLoop { head, body: inner } = *fx.arena.stmt(body[0]) else {
        panic!("expected a do loop");
    };
    let outer_var = head.v.unwrap();
    let ExprKind::Var { v } = *fx.arena.expr(outer_var) else {
        panic!("expected a loop variable");
    };
    assert_eq!(fx.arena.symbol_name(v), "__i2");
    assert!(matches!(
        *fx.arena.expr(head.end),
        ExprKind::IntegerConstant { n: 5, .. }
    ));
    let inner = fx.arena.list(inner);
    assert!(matches!(fx.arena.stmt(inner[0]), StmtKind::DoLoop { .. }));
}

#[test]
fn test_index_variables_are_reused_and_unique() {
    let mut fx = Fixture::new();
    // A user variable already named `__i1`.
    fx.int_var("__i1");
    let arr = real_array(&mut fx.arena, &[4]);
    let x = fx
        .arena
        .declare_variable(L, fx.pscope, "x", arr, Intent::Local)
        .unwrap();
    let real4 = fx.arena.make_real(L, 4);
    let mut stmts = Vec::new();
    for value in [1.0, 2.0] {
        let xv = fx.arena.make_var(L, x);
        let c = fx.arena.make_real_constant(L, value, real4);
        stmts.push(fx.arena.make_assignment(L, xv, c));
    }
    let (mut unit, _) = fx.finish(&stmts);
    let symbols = fx.arena.scope(fx.pscope).len();

    replace_array_op(&mut fx.arena, &mut unit, &opts()).unwrap();

    let table = fx.arena.scope(fx.pscope);
    assert_eq!(table.len(), symbols + 1);
    assert!(table.contains("__i11"));
}

#[test]
fn test_non_elementwise_value_left_alone() {
    let mut fx = Fixture::new();
    let arr = real_array(&mut fx.arena, &[3]);
    let x = fx
        .arena
        .declare_variable(L, fx.pscope, "x", arr, Intent::Local)
        .unwrap();
    let other = real_array(&mut fx.arena, &[3, 3]);
    let m = fx
        .arena
        .declare_variable(L, fx.pscope, "m", other, Intent::Local)
        .unwrap();
    let xv = fx.arena.make_var(L, x);
    let mv = fx.arena.make_var(L, m);
    let assign = fx.arena.make_assignment(L, xv, mv);
    let (mut unit, _) = fx.finish(&[assign]);
    let before = pickle(&fx.arena, &unit);

    replace_array_op(&mut fx.arena, &mut unit, &opts()).unwrap();
    assert_eq!(pickle(&fx.arena, &unit), before);
}

// global_stmts

fn interactive_unit(arena: &mut AsrArena, items: &[UnitItem]) -> TranslationUnit {
    let global = arena.new_scope(None);
    let items = arena.new_list(items);
    arena.make_translation_unit(L, global, items)
}

#[test]
fn test_trailing_expression_becomes_result() {
    let mut arena = AsrArena::new();
    let global = arena.new_scope(None);
    let int4 = arena.make_integer(L, 4);
    let x = arena
        .declare_variable(L, global, "x", int4, Intent::Local)
        .unwrap();
    let xv = arena.make_var(L, x);
    let one = arena.integer_constant(L, 1);
    let set = arena.make_assignment(L, xv, one);
    let xv2 = arena.make_var(L, x);
    let items = arena.new_list(&[UnitItem::Stmt(set), UnitItem::Expr(xv2)]);
    let mut unit = arena.make_translation_unit(L, global, items);

    let func = wrap_global_stmts(&mut arena, &mut unit, &opts())
        .unwrap()
        .unwrap();
    assert!(unit.items.is_empty());
    let f = *arena.down_cast::<Function>(func);
    assert_eq!(arena.str(f.name), "_lfortran_main_program");
    assert_eq!(f.abi, Abi::BindC);
    let ret = f.return_var.unwrap();
    let ExprKind::Var { v } = *arena.expr(ret) else {
        panic!("expected a result variable");
    };
    assert_eq!(arena.symbol_name(v), "_lfortran_main_program1");
    let var = arena.down_cast::<Variable>(v);
    assert_eq!(var.intent, Intent::ReturnVar);
    assert_eq!(var.abi, Abi::BindC);
    assert_eq!(arena.list(f.body).len(), 2);
    assert!(verify_unit(&arena, &unit, true).is_ok());
}

#[test]
fn test_trailing_statement_makes_subroutine() {
    let mut arena = AsrArena::new();
    let one = arena.integer_constant(L, 1);
    let values = arena.new_list(&[one]);
    let print = arena.make_print(L, values);
    let two = arena.integer_constant(L, 2);
    let mut unit = interactive_unit(&mut arena, &[UnitItem::Expr(two), UnitItem::Stmt(print)]);

    let func = wrap_global_stmts(&mut arena, &mut unit, &opts())
        .unwrap()
        .unwrap();
    let f = *arena.down_cast::<Function>(func);
    assert_eq!(f.return_var, None);
    assert_eq!(f.abi, Abi::Source);
    // The expression still lands in a local.
    let local = arena.scope(f.symtab).get_symbol("_lfortran_main_program1").unwrap();
    assert_eq!(arena.down_cast::<Variable>(local).intent, Intent::Local);
}

#[test]
fn test_unsupported_item_type() {
    let mut arena = AsrArena::new();
    let logical = arena.make_logical(L, 4);
    let t = arena.make_logical_constant(L, true, logical);
    let mut unit = interactive_unit(&mut arena, &[UnitItem::Expr(t)]);
    let err = wrap_global_stmts(&mut arena, &mut unit, &opts()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "global_stmts: Return type not supported in interactive mode"
    );
}

#[test]
fn test_existing_function_name_is_an_error() {
    let mut arena = AsrArena::new();
    let one = arena.integer_constant(L, 1);
    let mut unit = interactive_unit(&mut arena, &[UnitItem::Expr(one)]);
    let fscope = arena.new_scope(Some(unit.global_scope));
    arena
        .declare_function(L, unit.global_scope, fscope, "run", &[], &[], None)
        .unwrap();

    let options = opts().with_run_fun("run");
    let err = global_stmts(&mut arena, &mut unit, &options).unwrap_err();
    assert!(matches!(
        err,
        PassError::Symtab {
            pass: "global_stmts",
            source: SymtabError::AlreadyDefined { ref name, .. },
        } if name == "run"
    ));
}

#[test]
fn test_program_stores_function_result() {
    let mut arena = AsrArena::new();
    let one = arena.integer_constant(L, 1);
    let mut unit = interactive_unit(&mut arena, &[UnitItem::Expr(one)]);

    global_stmts_program(&mut arena, &mut unit, &opts()).unwrap();

    let global = arena.scope(unit.global_scope);
    let func = global.get_symbol("_lfortran_main_program").unwrap();
    let program = global.get_symbol(MAIN_PROGRAM).unwrap();
    let p = *arena.down_cast::<Program>(program);
    assert!(arena
        .scope(p.symtab)
        .contains("_lfortran_main_program_result"));
    let body = arena.list(p.body);
    assert_eq!(body.len(), 1);
    let StmtKind::Assignment { value, .. } = *arena.stmt(body[0]) else {
        panic!("expected an assignment");
    };
    assert!(matches!(
        *arena.expr(value),
        ExprKind::FunctionCall { name, .. } if name == func
    ));
    assert_eq!(arena.strings(p.dependencies), vec!["_lfortran_main_program"]);
    assert!(verify_unit(&arena, &unit, true).is_ok());
}

#[test]
fn test_unsupported_symbol_item() {
    let mut arena = AsrArena::new();
    let mut unit = interactive_unit(&mut arena, &[]);
    let fscope = arena.new_scope(Some(unit.global_scope));
    let f = arena
        .declare_function(L, unit.global_scope, fscope, "f", &[], &[], None)
        .unwrap();
    unit.items = arena.new_list(&[UnitItem::Symbol(f)]);
    let err = wrap_global_stmts(&mut arena, &mut unit, &opts()).unwrap_err();
    assert_eq!(
        err,
        PassError::Unsupported {
            pass: "global_stmts",
            message: "Unsupported type of global scope node".to_owned(),
        }
    );
}
