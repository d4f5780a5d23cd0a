use super::pickle::{pickle, pickle_expr, pickle_stmt};
use super::visitor::{walk_expr, Visitor};
use super::*;
use crate::Location;
use pretty_assertions::assert_eq;

const L: Location = Location::DUMMY;

/// `a = 1 + 2*3`
fn build_assignment(arena: &mut AstArena) -> StmtId {
    let a = arena.make_name(L, "a");
    let one = arena.make_num(L, 1);
    let two = arena.make_num(L, 2);
    let three = arena.make_num(L, 3);
    let mul = arena.make_bin_op(L, two, Operator::Mul, three);
    let add = arena.make_bin_op(L, one, Operator::Add, mul);
    arena.make_assignment(L, a, add)
}

#[test]
fn test_pickle_assignment() {
    let mut arena = AstArena::new();
    let stmt = build_assignment(&mut arena);
    assert_eq!(
        pickle_stmt(&arena, stmt),
        "(Assignment (Name a) (BinOp (Num 1) Add (BinOp (Num 2) Mul (Num 3))))"
    );
}

#[test]
fn test_pickle_literals() {
    let mut arena = AstArena::new();
    let s = arena.make_str(L, "hi");
    let t = arena.make_logical(L, true);
    let r = arena.make_real(L, "1.5d0");
    let neg = arena.make_unary_op(L, UnaryOp::Minus, r);
    assert_eq!(pickle_expr(&arena, s), "(Str \"hi\")");
    assert_eq!(pickle_expr(&arena, t), "(Logical .true.)");
    assert_eq!(pickle_expr(&arena, neg), "(UnaryOp Minus (Real 1.5d0))");
}

#[test]
fn test_pickle_program_unit() {
    let mut arena = AstArena::new();
    let decl = arena.make_declaration(L, "integer", &["i", "n"]);
    let i = arena.make_name(L, "i");
    let print = arena.make_print(L, &[i]);
    let one = arena.make_num(L, 1);
    let ten = arena.make_num(L, 10);
    let lp = arena.make_do_loop(L, Some("i"), one, ten, None, &[print]);
    let prog = arena.make_program(L, "main", &[decl, lp], &[]);
    let unit = arena.make_translation_unit(L, &[AstItem::Unit(prog)]);
    assert_eq!(
        pickle(&arena, &unit),
        "(TranslationUnit [(Program main [(Declaration integer [i n]) \
         (DoLoop i (Num 1) (Num 10) () [(Print [(Name i)])])] [])])"
    );
}

#[test]
fn test_bare_do_loop_has_no_header() {
    let mut arena = AstArena::new();
    let exit = arena.make_exit(L);
    let zero = arena.make_num(L, 0);
    let lp = arena.make_do_loop(L, None, zero, zero, None, &[exit]);
    assert_eq!(pickle_stmt(&arena, lp), "(DoLoop () () () () [(Exit)])");
}

struct NameCounter {
    names: Vec<String>,
}

impl<'a> Visitor<'a> for NameCounter {
    fn visit_expr(&mut self, arena: &'a AstArena, expr: ExprId) {
        if let ExprKind::Name { id } = arena.expr(expr) {
            self.names.push(arena.str(*id).to_owned());
        }
        walk_expr(self, arena, expr);
    }
}

#[test]
fn test_visitor_reaches_nested_names() {
    let mut arena = AstArena::new();
    let x = arena.make_name(L, "x");
    let y = arena.make_name(L, "y");
    let z = arena.make_name(L, "z");
    let test = arena.make_compare(L, x, CmpOp::Lt, y);
    let call = arena.make_subroutine_call(L, "f", &[z]);
    let stmt = arena.make_if(L, test, &[call], &[]);
    let sub = arena.make_subroutine(L, "s", &["x"], &[stmt]);
    let module = arena.make_module(L, "m", &[], &[sub]);
    let unit = arena.make_translation_unit(L, &[AstItem::Unit(module)]);

    let mut counter = NameCounter { names: Vec::new() };
    counter.visit_translation_unit(&arena, &unit);
    assert_eq!(counter.names, vec!["x", "y", "z"]);
}

#[test]
fn test_unit_accessors() {
    let mut arena = AstArena::new();
    let ret = arena.make_return(L);
    let f = arena.make_function(L, "sq", &["v"], Some("r"), &[ret]);
    let kind = *arena.unit(f);
    assert_eq!(kind.tag(), UnitTag::Function);
    assert_eq!(arena.str(kind.name()), "sq");
    assert_eq!(kind.body().len(), 1);
}

#[test]
fn test_tags_are_dense() {
    for (i, tag) in ExprTag::ALL.iter().enumerate() {
        assert_eq!(usize::from(tag.tag()), i);
        assert_eq!(ExprTag::from_tag(tag.tag()), Some(*tag));
    }
    assert_eq!(StmtTag::from_tag(200), None);
}
