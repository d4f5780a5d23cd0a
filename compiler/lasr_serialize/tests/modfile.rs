#![allow(clippy::unwrap_used, clippy::expect_used)]

use lasr_ir::asr::{AsrArena, Intent, Symbol, TranslationUnit};
use lasr_ir::{ArenaVec, Location, SymbolId};
use lasr_serialize::modfile::{MAGIC, VERSION};
use lasr_serialize::stream::{DefaultWriter, Writer};
use lasr_serialize::{
    deserialize, fix_external_symbols, load_modfile, load_pycfile, save_modfile, save_pycfile,
    serialize, DecodeError, DeserializeOptions, ExternalSymbolError, ModfileError,
};
use pretty_assertions::assert_eq;

const L: Location = Location::DUMMY;

/// `module m; integer :: v; end module`
fn module_unit(arena: &mut AsrArena) -> TranslationUnit {
    let global = arena.new_scope(None);
    let mscope = arena.new_scope(Some(global));
    let int4 = arena.make_integer(L, 4);
    arena
        .declare_variable(L, mscope, "v", int4, Intent::Local)
        .unwrap();
    arena.declare_module(L, global, mscope, "m").unwrap();
    arena.make_translation_unit(L, global, ArenaVec::EMPTY)
}

/// `program main; use <module>, only: v => <original>; end program`
fn program_using(arena: &mut AsrArena, module: &str, original: &str) -> (TranslationUnit, SymbolId) {
    let global = arena.new_scope(None);
    let pscope = arena.new_scope(Some(global));
    let ext = arena
        .declare_external_symbol(L, pscope, "v", None, module, &[], original)
        .unwrap();
    arena
        .declare_program(L, global, pscope, "main", &[])
        .unwrap();
    (arena.make_translation_unit(L, global, ArenaVec::EMPTY), ext)
}

fn external(arena: &AsrArena, sym: SymbolId) -> Option<SymbolId> {
    match arena.symbol(sym) {
        Symbol::ExternalSymbol(e) => e.external,
        _ => None,
    }
}

#[test]
fn test_modfile_round_trip_marks_module() {
    let mut arena = AsrArena::new();
    let unit = module_unit(&mut arena);
    let bytes = save_modfile(&arena, &unit).unwrap();

    let mut loaded = AsrArena::new();
    let back = load_modfile(&mut loaded, &bytes, DeserializeOptions::default()).unwrap();
    let m = loaded.scope(back.global_scope).get_symbol("m").unwrap();
    let Symbol::Module(module) = *loaded.symbol(m) else {
        panic!("m is not a module");
    };
    assert!(module.loaded_from_mod);
    assert!(loaded.scope(module.symtab).contains("v"));
}

#[test]
fn test_pycfile_keeps_flags() {
    let mut arena = AsrArena::new();
    let unit = module_unit(&mut arena);
    let bytes = save_pycfile(&arena, &unit).unwrap();

    let mut loaded = AsrArena::new();
    let back = load_pycfile(&mut loaded, &bytes, DeserializeOptions::default()).unwrap();
    let m = loaded.scope(back.global_scope).get_symbol("m").unwrap();
    assert!(matches!(loaded.symbol(m), Symbol::Module(x) if !x.loaded_from_mod));
}

#[test]
fn test_modfile_needs_single_module() {
    let mut arena = AsrArena::new();
    let (unit, _) = program_using(&mut arena, "m", "v");
    let err = save_modfile(&arena, &unit).unwrap_err();
    assert_eq!(
        err,
        ModfileError::NotASingleModule {
            found: "[main]".to_owned()
        }
    );
    // Any unit fits in a pyc file.
    assert!(save_pycfile(&arena, &unit).is_ok());
}

#[test]
fn test_unrecognized_format() {
    let mut arena = AsrArena::new();
    let err = load_modfile(&mut arena, b"not a module file", DeserializeOptions::default())
        .unwrap_err();
    assert_eq!(err, ModfileError::FormatNotRecognized);
    assert_eq!(err.to_string(), "LFortran Modfile format not recognized");
}

#[test]
fn test_version_mismatch() {
    let mut arena = AsrArena::new();
    let unit = module_unit(&mut arena);
    let payload = serialize(&arena, &unit).unwrap();
    let mut w = DefaultWriter::new();
    w.write_str(MAGIC);
    w.write_str("0.0.0-other");
    w.write_bytes(&payload);
    let bytes = w.into_bytes();

    let mut loaded = AsrArena::new();
    let err = load_modfile(&mut loaded, &bytes, DeserializeOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Incompatible format: LFortran Modfile was generated using version '0.0.0-other', \
             but current LFortran version is '{VERSION}'"
        )
    );
}

#[test]
fn test_truncated_modfile() {
    let mut arena = AsrArena::new();
    let unit = module_unit(&mut arena);
    let bytes = save_modfile(&arena, &unit).unwrap();

    let mut loaded = AsrArena::new();
    let before = loaded.pool_mark();
    let err = load_modfile(
        &mut loaded,
        &bytes[..bytes.len() - 3],
        DeserializeOptions::default(),
    )
    .unwrap_err();
    assert!(
        matches!(err, ModfileError::Decode(DecodeError::Truncated { .. })),
        "{err}"
    );
    assert_eq!(loaded.pool_mark(), before);
}

#[test]
fn test_modfile_cut_after_magic() {
    let mut arena = AsrArena::new();
    let unit = module_unit(&mut arena);
    let bytes = save_modfile(&arena, &unit).unwrap();
    let mut header = DefaultWriter::new();
    header.write_str(MAGIC);
    let cut = header.into_bytes().len();

    let mut loaded = AsrArena::new();
    let err = load_modfile(&mut loaded, &bytes[..cut], DeserializeOptions::default()).unwrap_err();
    assert!(
        matches!(err, ModfileError::Decode(DecodeError::Truncated { .. })),
        "{err}"
    );
}

#[test]
fn test_external_symbol_in_same_unit() {
    let mut arena = AsrArena::new();
    let global = arena.new_scope(None);
    let mscope = arena.new_scope(Some(global));
    let int4 = arena.make_integer(L, 4);
    let v = arena
        .declare_variable(L, mscope, "v", int4, Intent::Local)
        .unwrap();
    arena.declare_module(L, global, mscope, "m").unwrap();
    let pscope = arena.new_scope(Some(global));
    arena
        .declare_external_symbol(L, pscope, "w", Some(v), "m", &[], "v")
        .unwrap();
    arena
        .declare_program(L, global, pscope, "main", &[])
        .unwrap();
    let unit = arena.make_translation_unit(L, global, ArenaVec::EMPTY);
    let bytes = serialize(&arena, &unit).unwrap();

    let mut loaded = AsrArena::new();
    let back = deserialize(&mut loaded, &bytes, DeserializeOptions::default()).unwrap();
    let main = loaded.scope(back.global_scope).get_symbol("main").unwrap();
    let pscope = loaded.symbol(main).symtab().unwrap();
    let w = loaded.scope(pscope).get_symbol("w").unwrap();
    assert_eq!(external(&loaded, w), None);

    fix_external_symbols(&mut loaded, &back, None).unwrap();
    let target = loaded.symbol_get_past_external(w);
    assert_eq!(loaded.symbol_name(target), "v");
    assert!(matches!(loaded.symbol(target), Symbol::Variable(_)));
}

#[test]
fn test_external_symbol_from_loaded_modfile() {
    let mut arena = AsrArena::new();
    let module = module_unit(&mut arena);
    let modfile = save_modfile(&arena, &module).unwrap();
    let (program, _) = program_using(&mut arena, "m", "v");
    let bytes = serialize(&arena, &program).unwrap();

    let mut loaded = AsrArena::new();
    let modules = load_modfile(&mut loaded, &modfile, DeserializeOptions::default()).unwrap();
    let back = deserialize(&mut loaded, &bytes, DeserializeOptions::default()).unwrap();
    fix_external_symbols(&mut loaded, &back, Some(modules.global_scope)).unwrap();

    let main = loaded.scope(back.global_scope).get_symbol("main").unwrap();
    let pscope = loaded.symbol(main).symtab().unwrap();
    let ext = loaded.scope(pscope).get_symbol("v").unwrap();
    let target = external(&loaded, ext).unwrap();
    let m = loaded.scope(modules.global_scope).get_symbol("m").unwrap();
    let mscope = loaded.symbol(m).symtab().unwrap();
    assert_eq!(loaded.scope(mscope).get_symbol("v"), Some(target));
}

#[test]
fn test_missing_module() {
    let mut arena = AsrArena::new();
    let (unit, _) = program_using(&mut arena, "nowhere", "v");
    let err = fix_external_symbols(&mut arena, &unit, None).unwrap_err();
    assert_eq!(
        err,
        ExternalSymbolError::ModuleNotFound {
            symbol: "v".to_owned(),
            module: "nowhere".to_owned()
        }
    );
}

#[test]
fn test_missing_symbol_in_module() {
    let mut arena = AsrArena::new();
    let module = module_unit(&mut arena);
    let (program, _) = program_using(&mut arena, "m", "missing");
    let err = fix_external_symbols(&mut arena, &program, Some(module.global_scope)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ExternalSymbol cannot be resolved, the symbol 'missing' was not found in the \
         module 'm' (but the module was found)"
    );
}
