//! LASR serialization - ASR trees to bytes and back
//!
//! - [`serialize`] / [`deserialize`]: one translation unit to a byte stream
//!   and back into an [`AsrArena`](lasr_ir::asr::AsrArena)
//! - [`stream`]: the binary and text encodings both directions go through
//! - [`fix_external_symbols`]: re-link external symbols after a load
//! - [`modfile`]: versioned module file container
//!
//! # Round trip
//!
//! Deserializing the output of [`serialize`] yields a tree whose pickle is
//! identical to the original. Scope counters are fresh unless
//! [`DeserializeOptions::load_symtab_id`] is set, and
//! `ExternalSymbol::external` stays empty until [`fix_external_symbols`]
//! runs.

mod de;
mod error;
mod external;
pub mod modfile;
mod ser;
pub mod stream;

pub use de::{deserialize, deserialize_with, DeserializeOptions};
pub use error::{DecodeError, ExternalSymbolError, ModfileError, SerializeError};
pub use external::fix_external_symbols;
pub use modfile::{load_modfile, load_pycfile, save_modfile, save_pycfile};
pub use ser::{serialize, serialize_with};
