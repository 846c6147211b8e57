use anyhow::{Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use read_fonts::TableProvider;
use warpnine_font_ops::{map_name_records, rewrite_font};
use write_fonts::{from_obj::ToOwnedTable, tables::head::Head, types::Fixed};

use crate::name_id;

/// Font version information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontVersion {
    pub date: NaiveDate,
    /// Version tag: `2024-01-15`, or `2024-01-15.1` when a build number was given.
    pub tag: String,
}

impl FontVersion {
    pub fn new(date: NaiveDate, tag: impl Into<String>) -> Self {
        Self { date, tag: tag.into() }
    }

    /// The canonical version for `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date, date.format("%Y-%m-%d").to_string())
    }

    /// Today's local date.
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Parse `YYYY-MM-DD` or `YYYY-MM-DD.N`; `None` means today.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let Some(v) = value else {
            return Ok(Self::today());
        };
        if let Some((date_part, build_num)) = v.rsplit_once('.')
            && build_num.parse::<u32>().is_ok()
            && let Ok(parsed) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        {
            return Ok(Self::new(parsed, v));
        }
        match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
            Ok(parsed) => Ok(Self::new(parsed, v)),
            Err(_) => bail!("Invalid version '{v}'. Expected YYYY-MM-DD or YYYY-MM-DD.N."),
        }
    }

    /// Name ID 5 value, e.g. `Version 2024-01-15`.
    pub fn version_string(&self) -> String {
        format!("Version {}", self.tag)
    }

    /// `head.fontRevision` as YYYY.MMDD.
    pub fn revision(&self) -> Fixed {
        let month_day = self.date.month() * 100 + self.date.day();
        Fixed::from_f64(f64::from(self.date.year()) + f64::from(month_day) / 10000.0)
    }

    /// Update `head.fontRevision`, name ID 5 and the last segment of name ID 3.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let version_string = self.version_string();
        rewrite_font(data, |font, builder| {
            if let Ok(head) = font.head() {
                let mut head: Head = head.to_owned_table();
                head.font_revision = self.revision();
                builder.add_table(&head)?;
            }

            let mut updated = 0;
            let name = map_name_records(font, |id, current| {
                let value = match id {
                    name_id::VERSION => version_string.clone(),
                    name_id::UNIQUE_ID => self.unique_id(current),
                    _ => return None,
                };
                updated += 1;
                Some(value)
            })?;
            builder.add_table(&name)?;
            debug!("{version_string}: updated {updated} name records");
            Ok(())
        })
    }

    /// Replace the trailing `;`-separated segment of a unique id with the tag.
    fn unique_id(&self, current: &str) -> String {
        let mut parts: Vec<&str> =
            current.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();
        parts.pop();
        parts.push(&self.tag);
        parts.join("; ")
    }
}

/// Apply the version `tag` dated `date`.
pub fn set_version(data: &[u8], date: NaiveDate, tag: &str) -> Result<Vec<u8>> {
    FontVersion::new(date, tag).apply(data)
}

#[cfg(test)]
mod tests {
    use read_fonts::FontRef;
    use warpnine_font_ops::{name_string, testing::TestFont};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates() {
        let version = FontVersion::parse(Some("2024-12-01")).unwrap();
        assert_eq!(version, FontVersion::new(date(2024, 12, 1), "2024-12-01"));
    }

    #[test]
    fn keeps_build_suffix_verbatim() {
        let version = FontVersion::parse(Some("2024-12-01.1")).unwrap();
        assert_eq!(version.date, date(2024, 12, 1));
        assert_eq!(version.tag, "2024-12-01.1");
        assert_eq!(version.version_string(), "Version 2024-12-01.1");
    }

    #[test]
    fn defaults_to_today() {
        let version = FontVersion::parse(None).unwrap();
        assert_eq!(version.date, Local::now().date_naive());
        assert_eq!(version.tag, version.date.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(FontVersion::parse(Some("invalid")).is_err());
        assert!(FontVersion::parse(Some("2024-13-01")).is_err());
        assert!(FontVersion::parse(Some("2024-12-01.x")).is_err());
    }

    #[test]
    fn revision_is_year_dot_month_day() {
        let rev = FontVersion::from_date(date(2024, 1, 15)).revision();
        assert!((rev.to_f64() - 2024.0115).abs() < 0.0001);
        let rev = FontVersion::from_date(date(2025, 12, 31)).revision();
        assert!((rev.to_f64() - 2025.1231).abs() < 0.0001);
    }

    #[test]
    fn stamps_head_and_names() {
        let data = TestFont::new().names("Warpnine Mono", "Regular").build();
        let out = FontVersion::from_date(date(2024, 1, 15)).apply(&data).unwrap();
        let font = FontRef::new(&out).unwrap();

        assert_eq!(name_string(&font, 5).as_deref(), Some("Version 2024-01-15"));
        assert_eq!(
            name_string(&font, 3).as_deref(),
            Some("1.000; TEST; 2024-01-15"),
        );
        let rev = font.head().unwrap().font_revision().to_f64();
        assert!((rev - 2024.0115).abs() < 0.0001);
    }
}
