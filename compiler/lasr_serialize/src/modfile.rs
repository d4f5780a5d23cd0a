//! Module files.
//!
//! A module file wraps one serialized translation unit in a small header:
//!
//! ```text
//! str  "LFortran Modfile"
//! str  <compiler version>
//! str  <serialized unit>
//! ```
//!
//! all written with the default stream encoding. The payload must hold a
//! unit whose global scope is exactly one module. Units with arbitrary
//! contents are stored the same way with [`save_pycfile`].

use lasr_ir::asr::{AsrArena, Symbol, TranslationUnit};

use crate::de::{deserialize, DeserializeOptions};
use crate::error::{DecodeError, ModfileError};
use crate::ser::serialize;
use crate::stream::{DefaultReader, DefaultWriter, Reader, Writer};

/// Header magic.
pub const MAGIC: &str = "LFortran Modfile";

/// Version stamped into every file. Files from other versions are
/// rejected.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serialize a single-module unit into module file bytes.
pub fn save_modfile(arena: &AsrArena, unit: &TranslationUnit) -> Result<Vec<u8>, ModfileError> {
    let table = arena.scope(unit.global_scope);
    let is_single_module = table.len() == 1
        && table
            .iter()
            .all(|(_, sym)| matches!(arena.symbol(sym), Symbol::Module(_)));
    if !is_single_module {
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        return Err(ModfileError::NotASingleModule {
            found: if names.is_empty() {
                "an empty scope".to_owned()
            } else {
                format!("[{}]", names.join(", "))
            },
        });
    }
    save_pycfile(arena, unit)
}

/// Serialize any unit with the module file header.
pub fn save_pycfile(arena: &AsrArena, unit: &TranslationUnit) -> Result<Vec<u8>, ModfileError> {
    let payload = serialize(arena, unit)?;
    let mut w = DefaultWriter::new();
    w.write_str(MAGIC);
    w.write_str(VERSION);
    w.write_bytes(&payload);
    tracing::debug!(bytes = payload.len(), "saved module file");
    Ok(w.into_bytes())
}

/// Load a module file and mark its module as coming from a file.
///
/// The loaded tree is not verified; run the verifier before handing it to
/// passes that rely on its invariants.
pub fn load_modfile(
    arena: &mut AsrArena,
    bytes: &[u8],
    options: DeserializeOptions,
) -> Result<TranslationUnit, ModfileError> {
    let unit = load_pycfile(arena, bytes, options)?;
    for sym in arena.scope(unit.global_scope).symbols() {
        if let Symbol::Module(m) = arena.symbol_mut(sym) {
            m.loaded_from_mod = true;
        }
    }
    Ok(unit)
}

/// Load a file written by [`save_pycfile`] or [`save_modfile`].
pub fn load_pycfile(
    arena: &mut AsrArena,
    bytes: &[u8],
    options: DeserializeOptions,
) -> Result<TranslationUnit, ModfileError> {
    let mut r = DefaultReader::new(bytes);
    match r.read_str("magic") {
        Ok(magic) if magic == MAGIC => {}
        _ => return Err(ModfileError::FormatNotRecognized),
    }
    let version = r.read_str("version")?;
    if version != VERSION {
        return Err(ModfileError::IncompatibleVersion {
            found: version.to_owned(),
            expected: VERSION.to_owned(),
        });
    }
    let payload = r.read_bytes("module payload")?;
    if r.remaining() != 0 {
        return Err(DecodeError::TrailingBytes(r.remaining()).into());
    }
    Ok(deserialize(arena, payload, options)?)
}
