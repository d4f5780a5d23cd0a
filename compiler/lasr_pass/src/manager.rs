//! Named pass registry and pipeline driver.

use std::fmt;
use std::time::{Duration, Instant};

use lasr_ir::asr::{AsrArena, TranslationUnit};
use rustc_hash::FxHashMap;

use crate::diagnostic::render;
use crate::error::PassError;
use crate::options::PassOptions;
use crate::passes::{self, PassFn};
use crate::verify::verify_unit;

/// Passes run by [`PassManager::apply_passes`], in order.
pub const DEFAULT_PASSES: &[&str] = &[
    "global_stmts_program",
    "compile_time_values",
    "array_op",
    "forall",
    "insert_deallocate",
    "do_loops",
];

/// Wall time of one pass run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassTiming {
    pub pass: String,
    pub elapsed: Duration,
}

impl fmt::Display for PassTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.elapsed.as_micros();
        write!(f, "[PASS]{}: {}.{:03} ms", self.pass, micros / 1000, micros % 1000)
    }
}

pub struct PassManager {
    registry: FxHashMap<&'static str, PassFn>,
    defaults: Vec<&'static str>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    /// Manager with every built-in pass registered.
    pub fn new() -> Self {
        let mut pm = PassManager {
            registry: FxHashMap::default(),
            defaults: DEFAULT_PASSES.to_vec(),
        };
        pm.register("global_stmts", passes::global_stmts);
        pm.register("global_stmts_program", passes::global_stmts_program);
        pm.register("compile_time_values", passes::replace_with_compile_time_values);
        pm.register("array_op", passes::replace_array_op);
        pm.register("forall", passes::replace_forall);
        pm.register("insert_deallocate", passes::insert_deallocate);
        pm.register("do_loops", passes::replace_do_loops);
        pm
    }

    /// Add or replace a pass. It runs only when requested by name.
    pub fn register(&mut self, name: &'static str, pass: PassFn) {
        self.registry.insert(name, pass);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    pub fn default_passes(&self) -> &[&'static str] {
        &self.defaults
    }

    /// Split a comma separated pass list, as given on a command line.
    /// Names are lowercased and must be registered.
    pub fn parse_pass_list(&self, arg: &str) -> Result<Vec<String>, PassError> {
        arg.split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .map(|name| {
                if self.is_registered(&name) {
                    Ok(name)
                } else {
                    Err(PassError::UnknownPass(name))
                }
            })
            .collect()
    }

    /// Run the default pipeline.
    pub fn apply_passes(
        &self,
        arena: &mut AsrArena,
        unit: &mut TranslationUnit,
        options: &PassOptions,
    ) -> Result<Vec<PassTiming>, PassError> {
        let defaults = self.defaults.clone();
        self.run(arena, unit, &defaults, options)
    }

    /// Run the named passes in the given order. With `pass_cumulative`,
    /// every default pass up to the furthest requested one runs instead.
    ///
    /// All names are checked before anything runs.
    pub fn apply_named<S: AsRef<str>>(
        &self,
        arena: &mut AsrArena,
        unit: &mut TranslationUnit,
        names: &[S],
        options: &PassOptions,
    ) -> Result<Vec<PassTiming>, PassError> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match self.registry.get_key_value(name) {
                Some((&key, _)) => resolved.push(key),
                None => return Err(PassError::UnknownPass(name.to_owned())),
            }
        }
        if options.pass_cumulative {
            resolved = self.cumulative(&resolved);
        }
        self.run(arena, unit, &resolved, options)
    }

    /// Default passes up to the furthest one named in `requested`.
    fn cumulative(&self, requested: &[&'static str]) -> Vec<&'static str> {
        let last = requested
            .iter()
            .filter_map(|name| self.defaults.iter().position(|d| d == name))
            .max();
        match last {
            Some(idx) => self.defaults[..=idx].to_vec(),
            None => Vec::new(),
        }
    }

    fn run(
        &self,
        arena: &mut AsrArena,
        unit: &mut TranslationUnit,
        names: &[&'static str],
        options: &PassOptions,
    ) -> Result<Vec<PassTiming>, PassError> {
        let mut timings = Vec::new();
        for &name in names {
            if options.is_skipped(name) {
                tracing::debug!(pass = name, "skipping pass");
                continue;
            }
            let pass = self
                .registry
                .get(name)
                .ok_or_else(|| PassError::UnknownPass(name.to_owned()))?;

            if options.verbose {
                tracing::info!(pass = name, "ASR pass starts");
            } else {
                tracing::debug!(pass = name, "ASR pass starts");
            }
            let start = Instant::now();
            pass(arena, unit, options)?;
            let elapsed = start.elapsed();
            if options.verbose {
                tracing::info!(pass = name, ?elapsed, "ASR pass ends");
            } else {
                tracing::debug!(pass = name, ?elapsed, "ASR pass ends");
            }

            if options.verify_after_each_pass {
                verify_unit(arena, unit, true).map_err(|err| PassError::VerifyFailed {
                    pass: name.to_owned(),
                    diagnostics: render(&err.diagnostics),
                })?;
            }
            if options.time_report {
                timings.push(PassTiming {
                    pass: name.to_owned(),
                    elapsed,
                });
            }
        }
        Ok(timings)
    }
}

#[cfg(test)]
mod tests;
