//! Font metadata manipulation: monospace settings, version stamps and naming.

mod monospace;
mod naming;
mod version;

pub use monospace::{MonospaceSettings, set_monospace};
pub use naming::{COPYRIGHT_TEMPLATE, FontNaming, VENDOR_ID, VariableNaming};
pub use version::{FontVersion, set_version};

/// Name table IDs.
pub(crate) mod name_id {
    pub const COPYRIGHT: u16 = 0;
    pub const FAMILY: u16 = 1;
    pub const SUBFAMILY: u16 = 2;
    pub const UNIQUE_ID: u16 = 3;
    pub const FULL_NAME: u16 = 4;
    pub const VERSION: u16 = 5;
    pub const POSTSCRIPT_NAME: u16 = 6;
    pub const TYPOGRAPHIC_FAMILY: u16 = 16;
    pub const TYPOGRAPHIC_SUBFAMILY: u16 = 17;
}
