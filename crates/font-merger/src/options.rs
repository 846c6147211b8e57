//! Options for font merging

use read_fonts::types::Tag;

/// What to do when a later font has a glyph whose name is taken by a
/// glyph with a different outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Rename the later glyph to `name.N`, using the first free `N`.
    #[default]
    Rename,
    /// Fail with [`MergeError::GlyphNameCollision`](crate::MergeError::GlyphNameCollision).
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Tables left out of the merged font.
    pub drop_tables: Vec<Tag>,
    pub collisions: CollisionPolicy,
    /// Skip registering `calt`/`rclt` in every script after merging.
    pub skip_calt_fix: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables to drop, given as tag strings. Tags longer than four bytes are ignored.
    pub fn drop_tables(mut self, tables: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.drop_tables = tables.into_iter().filter_map(|s| parse_tag(s.as_ref())).collect();
        self
    }

    pub fn collisions(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    pub fn skip_calt_fix(mut self, skip: bool) -> Self {
        self.skip_calt_fix = skip;
        self
    }

    pub fn should_drop(&self, tag: Tag) -> bool {
        self.drop_tables.contains(&tag)
    }
}

/// Parse a table tag, padding short strings with spaces.
fn parse_tag(s: &str) -> Option<Tag> {
    let bytes = s.as_bytes();
    (bytes.len() <= 4).then(|| {
        let mut arr = [b' '; 4];
        arr[..bytes.len()].copy_from_slice(bytes);
        Tag::new(&arr)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_pads_tags() {
        let options = Options::new().drop_tables(["DSIG", "cvt", "toolong"]);
        assert_eq!(options.drop_tables, vec![Tag::new(b"DSIG"), Tag::new(b"cvt ")]);
        assert!(options.should_drop(Tag::new(b"cvt ")));
        assert!(!options.should_drop(Tag::new(b"GSUB")));
    }

    #[test]
    fn renames_by_default() {
        assert_eq!(Options::default().collisions, CollisionPolicy::Rename);
    }
}
