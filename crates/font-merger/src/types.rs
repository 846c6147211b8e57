//! Id newtypes that keep source glyph ids and merged glyph ids apart.

use std::fmt;

macro_rules! u16_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl $name {
            pub const fn new(id: u16) -> Self {
                Self(id)
            }

            pub const fn to_u16(self) -> u16 {
                self.0
            }

            pub const fn to_u32(self) -> u32 {
                self.0 as u32
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $label, self.0)
            }
        }
    };
}

u16_id!(
    /// A glyph id in one of the source fonts
    GlyphId,
    "GID"
);

u16_id!(
    /// A glyph id in the merged glyph order
    MegaGlyphId,
    "MGID"
);

/// Position of a font in the merge input; `0` is the base font.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontIndex(pub usize);

impl FontIndex {
    pub const fn is_base(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FontIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Font[{}]", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_their_kind() {
        assert_eq!(GlyphId::new(42).to_string(), "GID42");
        assert_eq!(MegaGlyphId::new(100).to_string(), "MGID100");
        assert_eq!(FontIndex(1).to_string(), "Font[1]");
        assert!(FontIndex(0).is_base());
    }
}
