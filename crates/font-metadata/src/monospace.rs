use anyhow::Result;
use read_fonts::TableProvider;
use warpnine_font_ops::rewrite_font;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{os2::Os2, post::Post},
};

/// Monospace metadata settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceSettings {
    /// Average character width.
    pub width: i16,
    /// PANOSE proportion value (9 = monospace).
    pub panose_proportion: u8,
}

impl Default for MonospaceSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl MonospaceSettings {
    pub const DEFAULT: Self = Self { width: 600, panose_proportion: 9 };

    /// Set `post.isFixedPitch`, the PANOSE proportion and `OS/2.xAvgCharWidth`.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        rewrite_font(data, |font, builder| {
            if let Ok(post) = font.post() {
                let mut post: Post = post.to_owned_table();
                post.is_fixed_pitch = 1;
                builder.add_table(&post)?;
            }
            if let Ok(os2) = font.os2() {
                let mut os2: Os2 = os2.to_owned_table();
                os2.panose_10[3] = self.panose_proportion;
                os2.x_avg_char_width = self.width;
                builder.add_table(&os2)?;
            }
            Ok(())
        })
    }
}

/// Apply [`MonospaceSettings::DEFAULT`].
pub fn set_monospace(data: &[u8]) -> Result<Vec<u8>> {
    MonospaceSettings::DEFAULT.apply(data)
}
