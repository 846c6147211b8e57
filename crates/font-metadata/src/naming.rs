//! Family and style naming for static and variable fonts.

use anyhow::Result;
use warpnine_font_ops::{map_name_records, rewrite_font};

use crate::name_id;

/// Copyright notice shared by every Warpnine font; a font-specific sentence
/// may follow it.
pub const COPYRIGHT_TEMPLATE: &str = "Copyright 2020 The Recursive Project Authors (https://github.com/arrowtype/recursive). \
Copyright 2014-2021 Adobe (http://www.adobe.com/), with Reserved Font Name 'Source'. ";

/// Vendor segment of name ID 3.
pub const VENDOR_ID: &str = "WARPNINE";

fn copyright(extra: Option<&str>) -> String {
    format!("{COPYRIGHT_TEMPLATE}{}", extra.unwrap_or_default())
}

/// Names for one static style of a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontNaming {
    pub family: String,
    pub style: String,
    /// PostScript family; defaults to the family without spaces.
    pub postscript_family: Option<String>,
    pub copyright_extra: Option<String>,
}

impl FontNaming {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
            postscript_family: None,
            copyright_extra: None,
        }
    }

    pub fn postscript_family(mut self, family: impl Into<String>) -> Self {
        self.postscript_family = Some(family.into());
        self
    }

    pub fn copyright_extra(mut self, extra: impl Into<String>) -> Self {
        self.copyright_extra = Some(extra.into());
        self
    }

    /// Subfamily name when the style is one of the four RIBBI styles.
    fn ribbi(&self) -> Option<&'static str> {
        match self.style.replace(' ', "").as_str() {
            "Regular" => Some("Regular"),
            "Italic" => Some("Italic"),
            "Bold" => Some("Bold"),
            "BoldItalic" => Some("Bold Italic"),
            _ => None,
        }
    }

    /// Name ID 1. Non-RIBBI styles get their own legacy family.
    pub fn legacy_family(&self) -> String {
        match self.ribbi() {
            Some(_) => self.family.clone(),
            None => format!("{} {}", self.family, self.style),
        }
    }

    /// Name ID 2.
    pub fn legacy_subfamily(&self) -> &str {
        match self.ribbi() {
            Some(style) => style,
            None if self.style.contains("Italic") => "Italic",
            None => "Regular",
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.family, self.style)
    }

    pub fn postscript_name(&self) -> String {
        let base = self
            .postscript_family
            .clone()
            .unwrap_or_else(|| self.family.replace(' ', ""));
        format!("{base}-{}", self.style.replace(' ', ""))
    }

    pub fn unique_id(&self) -> String {
        format!("1.0;{VENDOR_ID};{}", self.postscript_name().replace('-', ""))
    }

    pub fn copyright(&self) -> String {
        copyright(self.copyright_extra.as_deref())
    }

    /// Rewrite the name records on every platform.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        rewrite_font(data, |font, builder| {
            let name = map_name_records(font, |id, _| {
                Some(match id {
                    name_id::COPYRIGHT => self.copyright(),
                    name_id::FAMILY => self.legacy_family(),
                    name_id::SUBFAMILY => self.legacy_subfamily().to_string(),
                    name_id::UNIQUE_ID => self.unique_id(),
                    name_id::FULL_NAME => self.full_name(),
                    name_id::POSTSCRIPT_NAME => self.postscript_name(),
                    name_id::TYPOGRAPHIC_FAMILY => self.family.clone(),
                    name_id::TYPOGRAPHIC_SUBFAMILY => self.style.clone(),
                    _ => return None,
                })
            })?;
            builder.add_table(&name)?;
            Ok(())
        })
    }
}

/// Names for a variable font, which carry no style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNaming {
    pub family: String,
    pub postscript_name: String,
    pub copyright_extra: Option<String>,
}

impl VariableNaming {
    pub fn new(family: impl Into<String>, postscript_name: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            postscript_name: postscript_name.into(),
            copyright_extra: None,
        }
    }

    pub fn copyright_extra(mut self, extra: impl Into<String>) -> Self {
        self.copyright_extra = Some(extra.into());
        self
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        rewrite_font(data, |font, builder| {
            let name = map_name_records(font, |id, _| {
                Some(match id {
                    name_id::COPYRIGHT => copyright(self.copyright_extra.as_deref()),
                    name_id::FAMILY | name_id::FULL_NAME | name_id::TYPOGRAPHIC_FAMILY => {
                        self.family.clone()
                    }
                    name_id::SUBFAMILY | name_id::TYPOGRAPHIC_SUBFAMILY => "Regular".to_string(),
                    name_id::UNIQUE_ID => format!("1.0;{VENDOR_ID};{}", self.postscript_name),
                    name_id::POSTSCRIPT_NAME => self.postscript_name.clone(),
                    _ => return None,
                })
            })?;
            builder.add_table(&name)?;
            Ok(())
        })
    }
}
