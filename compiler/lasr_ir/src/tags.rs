//! Fieldless enums with stable numeric tags.

/// Define a fieldless enum with a stable `u8` tag per variant.
///
/// Generates `tag()`, `from_tag()`, `name()` and an `ALL` table. Tags are
/// part of the serialized format and must never be renumbered.
macro_rules! define_tagged_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $tag:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            #[inline]
            pub const fn tag(self) -> u8 {
                match self {
                    $($name::$variant => $tag),*
                }
            }

            pub const fn from_tag(tag: u8) -> Option<Self> {
                match tag {
                    $($tag => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

pub(crate) use define_tagged_enum;
