use super::*;
use pretty_assertions::assert_eq;

fn sym(n: u32) -> SymbolId {
    SymbolId::new(n)
}

#[test]
fn test_counters_are_unique() {
    let a = SymbolTable::new(None);
    let b = SymbolTable::new(None);
    assert_ne!(a.counter, b.counter);
}

#[test]
fn test_with_counter_reserves() {
    let kept = SymbolTable::with_counter(None, 1_000_000);
    let fresh = SymbolTable::new(None);
    assert_eq!(kept.counter, 1_000_000);
    assert!(fresh.counter > 1_000_000);
}

#[test]
fn test_add_then_get() {
    let mut t = SymbolTable::new(None);
    t.add_symbol("x", sym(1)).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(t.get_symbol("x"), Some(sym(1)));
    assert_eq!(t.get_symbol("y"), None);
}

#[test]
fn test_add_existing_fails() {
    let mut t = SymbolTable::new(None);
    assert!(t.add_symbol("x", sym(1)).is_ok());
    let err = t.add_symbol("x", sym(2));
    assert_eq!(
        err,
        Err(SymtabError::AlreadyDefined {
            name: "x".into(),
            counter: t.counter
        })
    );
    assert_eq!(t.get_symbol("x"), Some(sym(1)));
}

#[test]
fn test_overwrite_requires_presence() {
    let mut t = SymbolTable::new(None);
    assert!(matches!(
        t.overwrite_symbol("x", sym(1)),
        Err(SymtabError::NotFound { .. })
    ));
    assert!(t.add_symbol("x", sym(1)).is_ok());
    assert!(t.overwrite_symbol("x", sym(2)).is_ok());
    assert_eq!(t.get_symbol("x"), Some(sym(2)));
}

#[test]
fn test_add_or_overwrite_never_fails() {
    let mut t = SymbolTable::new(None);
    t.add_or_overwrite_symbol("x", sym(1));
    t.add_or_overwrite_symbol("x", sym(2));
    assert_eq!(t.get_symbol("x"), Some(sym(2)));
    assert_eq!(t.len(), 1);
}

#[test]
fn test_erase() {
    let mut t = SymbolTable::new(None);
    assert!(t.erase_symbol("x").is_err());
    assert!(t.add_symbol("x", sym(1)).is_ok());
    assert_eq!(t.erase_symbol("x"), Ok(sym(1)));
    assert_eq!(t.get_symbol("x"), None);
    assert!(t.is_empty());
}

#[test]
fn test_unique_name() {
    let mut t = SymbolTable::new(None);
    assert_eq!(t.get_unique_name("i"), "i");
    t.add_or_overwrite_symbol("i", sym(1));
    t.add_or_overwrite_symbol("i1", sym(2));
    assert_eq!(t.get_unique_name("i"), "i2");
}

#[test]
fn test_iteration_is_name_ordered() {
    let mut t = SymbolTable::new(None);
    for (i, name) in ["c", "a", "b"].into_iter().enumerate() {
        t.add_or_overwrite_symbol(name, sym(i as u32));
    }
    let names: Vec<&str> = t.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(t.symbols(), vec![sym(1), sym(2), sym(0)]);
}

#[test]
fn test_error_messages() {
    let e = SymtabError::NotFound {
        name: "f".into(),
        counter: 4,
    };
    assert_eq!(e.to_string(), "symbol 'f' is not defined in scope 4");
}
