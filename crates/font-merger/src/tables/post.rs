//! post table merging

use read_fonts::TableProvider;
use write_fonts::tables::post::Post;

use crate::{Result, context::MergeContext};

/// A version 2.0 post table carrying the merged glyph names, so later
/// stages (feature freezing, ligature edits) can find glyphs by name.
pub fn merge_post(ctx: &MergeContext) -> Result<Post> {
    let base = ctx.base().post()?;
    let mut post = Post::new_v2(ctx.glyph_order().mega().iter().map(|n| n.as_str()));
    post.italic_angle = base.italic_angle();
    post.underline_position = base.underline_position();
    post.underline_thickness = base.underline_thickness();
    post.is_fixed_pitch = base.is_fixed_pitch();
    post.min_mem_type42 = base.min_mem_type42();
    post.max_mem_type42 = base.max_mem_type42();
    post.min_mem_type1 = base.min_mem_type1();
    post.max_mem_type1 = base.max_mem_type1();
    Ok(post)
}
