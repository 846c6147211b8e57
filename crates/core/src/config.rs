//! Configuration constants for Warpnine font builds.

pub use warpnine_font_condense::DEFAULT_SCALE as CONDENSED_SCALE;
pub use warpnine_font_metadata::{COPYRIGHT_TEMPLATE, VENDOR_ID};

/// Recursive VF source font filename.
pub const RECURSIVE_VF_FILENAME: &str = "Recursive_VF_1.085.ttf";

/// Noto Sans Mono CJK JP VF source font filename.
pub const NOTO_CJK_VF_FILENAME: &str = "NotoSansMonoCJKjp-VF.ttf";

/// Recursive font version.
pub const RECURSIVE_VERSION: &str = "1.085";

/// Recursive VF download URL (ZIP archive).
pub const RECURSIVE_ZIP_URL: &str =
    "https://github.com/arrowtype/recursive/releases/download/v1.085/ArrowType-Recursive-1.085.zip";

/// Path to the VF font inside the Recursive ZIP archive.
pub const RECURSIVE_ZIP_PATH: &str =
    "ArrowType-Recursive-1.085/Recursive_Desktop/Recursive_VF_1.085.ttf";

/// Noto CJK commit hash for reproducible builds.
pub const NOTO_CJK_COMMIT: &str = "f8d157532fbfaeda587e826d4cd5b21a49186f7c";

/// Noto Sans Mono CJK JP VF download URL.
pub const NOTO_CJK_VF_URL: &str = "https://raw.githubusercontent.com/notofonts/noto-cjk/f8d157532fbfaeda587e826d4cd5b21a49186f7c/Sans/Variable/TTF/Mono/NotoSansMonoCJKjp-VF.ttf";

/// Noto CJK license download URL.
pub const NOTO_CJK_LICENSE_URL: &str = "https://raw.githubusercontent.com/notofonts/noto-cjk/f8d157532fbfaeda587e826d4cd5b21a49186f7c/Sans/LICENSE";

/// Recursive license download URL.
pub const RECURSIVE_LICENSE_URL: &str =
    "https://raw.githubusercontent.com/arrowtype/recursive/refs/tags/v1.085/OFL.txt";

/// Assembled WarpnineMono variable font filename.
pub const VF_FILENAME: &str = "WarpnineMono-VF.ttf";

/// Family names and the sentence each family appends to the copyright notice.
pub const MONO_FAMILY: Family = Family {
    name: "Warpnine Mono",
    postscript: "WarpnineMono",
    copyright_extra: "Warpnine Mono is based on Recursive Mono Duotone and Noto Sans Mono CJK JP.",
};

pub const SANS_FAMILY: Family = Family {
    name: "Warpnine Sans",
    postscript: "WarpnineSans",
    copyright_extra: "Warpnine Sans is based on Recursive.",
};

pub const CONDENSED_FAMILY: Family = Family {
    name: "Warpnine Sans Condensed",
    postscript: "WarpnineSansCondensed",
    copyright_extra: "Warpnine Sans Condensed is based on Recursive.",
};

/// Naming of one output family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    pub name: &'static str,
    pub postscript: &'static str,
    pub copyright_extra: &'static str,
}

impl Family {
    /// File name prefix of the family's static fonts, e.g. `WarpnineSans-`.
    pub fn file_prefix(&self) -> String {
        format!("{}-", self.postscript)
    }
}
