//! Typed index handles into the node pools of an IR arena.
//!
//! Every handle is a `u32` newtype with an `INVALID` sentinel. Handles of
//! different categories cannot be mixed up, and all of them can be stored
//! in an [`ArenaVec`](crate::ArenaVec).

/// Define `u32` index newtypes.
///
/// Each generated type has:
/// - `INVALID` sentinel (`u32::MAX`), also used as `Default`
/// - `new()`, `index()`, `raw()`, `is_valid()`
/// - `Debug` showing `TypeName(n)` or `TypeName::INVALID`
/// - [`ArenaValue`](crate::ArenaValue) for the handle and for `Option<handle>`
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const INVALID: Self = Self(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}::INVALID", stringify!($name))
                }
            }
        }

        impl $crate::ArenaValue for $name {
            const SIZE: usize = 4;
            fn store(self, out: &mut [u8]) {
                out[..4].copy_from_slice(&self.0.to_le_bytes());
            }
            fn load(bytes: &[u8]) -> Self {
                Self($crate::containers::load_u32(bytes))
            }
        }

        impl $crate::ArenaValue for Option<$name> {
            const SIZE: usize = 4;
            fn store(self, out: &mut [u8]) {
                self.unwrap_or($name::INVALID).store(out);
            }
            fn load(bytes: &[u8]) -> Self {
                Some($name::load(bytes)).filter(|id| id.is_valid())
            }
        }
    )* };
}

pub(crate) use define_id;

define_id!(
    /// Handle of an ASR expression.
    ExprId,
    /// Handle of an ASR statement.
    StmtId,
    /// Handle of an ASR symbol (program, module, function, variable, ...).
    SymbolId,
    /// Handle of an ASR type.
    TtypeId,
    /// Handle of a symbol table in an arena's scope pool.
    ScopeId,
);
