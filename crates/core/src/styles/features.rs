//! Features frozen into each family.

use font_feature_freezer::FreezeOptions;

/// WarpnineMono, static and variable.
pub const MONO_FEATURES: &[&str] = &[
    "dlig", // code ligatures
    "ss01", "ss02", "ss03", "ss04", "ss05", "ss06", "ss07", "ss08", "ss10",
    "ss11", // simplified 1
    "ss12", "pnum", "liga",
];

/// WarpnineSans and WarpnineSansCondensed.
///
/// Proportional families skip `dlig` and `ss11` and take case-sensitive forms.
pub const SANS_FEATURES: &[&str] = &[
    "ss01", "ss02", "ss03", "ss04", "ss05", "ss06", "ss07", "ss08", "ss10", "ss12",
    "case", "pnum", "liga",
];

/// Options used by every freeze step: `rvrn` always runs first.
pub fn freeze_options(features: &[&str]) -> FreezeOptions {
    FreezeOptions::new(features.iter().copied()).with_auto_rvrn(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rvrn_leads_the_resolution_order() {
        let order = freeze_options(SANS_FEATURES).resolution_order();
        assert_eq!(order.first().map(ToString::to_string).as_deref(), Some("rvrn"));
        assert_eq!(order.len(), SANS_FEATURES.len() + 1);
    }

    #[test]
    fn sans_drops_mono_only_features() {
        for tag in ["dlig", "ss11"] {
            assert!(MONO_FEATURES.contains(&tag));
            assert!(!SANS_FEATURES.contains(&tag));
        }
        assert!(SANS_FEATURES.contains(&"case"));
    }
}
