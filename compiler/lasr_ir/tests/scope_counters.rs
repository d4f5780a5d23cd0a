//! Scope counters must stay unique when translation units are built on
//! many threads at once.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::collections::HashSet;

use lasr_ir::asr::{AsrArena, Intent};
use lasr_ir::symtab::SymbolTable;
use lasr_ir::Location;
use rayon::prelude::*;

#[test]
fn counters_are_unique_across_threads() {
    let counters: Vec<u32> = (0..64)
        .into_par_iter()
        .flat_map_iter(|_| (0..100).map(|_| SymbolTable::new(None).counter))
        .collect();
    let distinct: HashSet<u32> = counters.iter().copied().collect();
    assert_eq!(distinct.len(), counters.len());
}

#[test]
fn parallel_units_do_not_share_counters() {
    let per_unit: Vec<Vec<u32>> = (0..16)
        .into_par_iter()
        .map(|i| {
            let mut arena = AsrArena::new();
            let global = arena.new_scope(None);
            let int4 = arena.make_integer(Location::DUMMY, 4);
            for j in 0..8 {
                let fscope = arena.new_scope(Some(global));
                let name = format!("v{i}_{j}");
                arena
                    .declare_variable(Location::DUMMY, fscope, &name, int4, Intent::Local)
                    .unwrap();
            }
            (0..arena.scope_count())
                .map(|s| arena.scope(lasr_ir::ScopeId::new(s as u32)).counter)
                .collect()
        })
        .collect();

    let mut seen = HashSet::new();
    for counters in per_unit {
        for c in counters {
            assert!(seen.insert(c), "counter {c} handed out twice");
        }
    }
}
