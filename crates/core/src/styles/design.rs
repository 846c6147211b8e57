//! Style and design type definitions.

use font_instancer::AxisLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slant {
    Upright,
    Italic,
}

impl Slant {
    pub const fn slnt(self) -> f32 {
        match self {
            Slant::Upright => 0.0,
            Slant::Italic => -15.0,
        }
    }

    pub const fn crsv(self) -> f32 {
        match self {
            Slant::Upright => 0.5,
            Slant::Italic => 1.0,
        }
    }

    /// Position on the `ital` axis of the assembled WarpnineMono VF.
    pub const fn ital(self) -> f32 {
        match self {
            Slant::Upright => 0.0,
            Slant::Italic => 1.0,
        }
    }

    pub const fn is_italic(self) -> bool {
        matches!(self, Slant::Italic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight(pub f32);

impl Weight {
    pub const fn value(self) -> f32 {
        self.0
    }

    /// `OS/2.usWeightClass` for this weight.
    pub fn class(self) -> u16 {
        self.0.round() as u16
    }

    /// Noto CJK weight merged under this weight: Bold from SemiBold up.
    pub fn cjk_weight(self) -> u16 {
        if self.0 >= 600.0 { 700 } else { 400 }
    }
}

/// How a style pins Recursive's casual axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Casual {
    Fixed(f32),
    /// Linear (0) below weight 500, casual (1) from 500 up, as in Recursive Mono Duotone.
    Duotone,
}

impl Casual {
    pub fn at(self, weight: Weight) -> f32 {
        match self {
            Casual::Fixed(v) => v,
            Casual::Duotone => duotone_casl(weight.value()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub name: &'static str,
    pub weight: Weight,
    pub slant: Slant,
}

impl Style {
    pub const fn new(name: &'static str, weight: Weight, slant: Slant) -> Self {
        Self { name, weight, slant }
    }

    /// `"SemiBoldItalic"` becomes `"SemiBold Italic"`; `"Italic"` stays.
    pub fn display_name(&self) -> String {
        match self.name.strip_suffix("Italic") {
            Some(base) if !base.is_empty() => format!("{base} Italic"),
            _ => self.name.to_string(),
        }
    }

    /// Pins for every Recursive axis.
    pub fn axis_locations(&self, mono: f32, casual: Casual) -> [AxisLocation; 5] {
        [
            AxisLocation::new("MONO", mono),
            AxisLocation::new("CASL", casual.at(self.weight)),
            AxisLocation::new("wght", self.weight.value()),
            AxisLocation::new("slnt", self.slant.slnt()),
            AxisLocation::new("CRSV", self.slant.crsv()),
        ]
    }

    /// Location of this style in the WarpnineMono designspace.
    pub fn mono_location(&self) -> Vec<(&'static str, f32)> {
        vec![("wght", self.weight.value()), ("ital", self.slant.ital())]
    }
}

pub const MONO_STYLES: &[Style] = &[
    Style::new("Light", Weight(300.0), Slant::Upright),
    Style::new("LightItalic", Weight(300.0), Slant::Italic),
    Style::new("Regular", Weight(400.0), Slant::Upright),
    Style::new("Italic", Weight(400.0), Slant::Italic),
    Style::new("Medium", Weight(500.0), Slant::Upright),
    Style::new("MediumItalic", Weight(500.0), Slant::Italic),
    Style::new("SemiBold", Weight(600.0), Slant::Upright),
    Style::new("SemiBoldItalic", Weight(600.0), Slant::Italic),
    Style::new("Bold", Weight(700.0), Slant::Upright),
    Style::new("BoldItalic", Weight(700.0), Slant::Italic),
    Style::new("ExtraBold", Weight(800.0), Slant::Upright),
    Style::new("ExtraBoldItalic", Weight(800.0), Slant::Italic),
    Style::new("Black", Weight(900.0), Slant::Upright),
    Style::new("BlackItalic", Weight(900.0), Slant::Italic),
    Style::new("ExtraBlack", Weight(1000.0), Slant::Upright),
    Style::new("ExtraBlackItalic", Weight(1000.0), Slant::Italic),
];

pub const SANS_STYLES: &[Style] = &[
    Style::new("Light", Weight(300.0), Slant::Upright),
    Style::new("LightItalic", Weight(300.0), Slant::Italic),
    Style::new("Regular", Weight(400.0), Slant::Upright),
    Style::new("Italic", Weight(400.0), Slant::Italic),
    Style::new("Medium", Weight(500.0), Slant::Upright),
    Style::new("MediumItalic", Weight(500.0), Slant::Italic),
    Style::new("SemiBold", Weight(600.0), Slant::Upright),
    Style::new("SemiBoldItalic", Weight(600.0), Slant::Italic),
    Style::new("Bold", Weight(700.0), Slant::Upright),
    Style::new("BoldItalic", Weight(700.0), Slant::Italic),
    Style::new("ExtraBold", Weight(800.0), Slant::Upright),
    Style::new("ExtraBoldItalic", Weight(800.0), Slant::Italic),
    Style::new("Black", Weight(900.0), Slant::Upright),
    Style::new("BlackItalic", Weight(900.0), Slant::Italic),
];

pub fn duotone_casl(wght: f32) -> f32 {
    if wght < 500.0 { 0.0 } else { 1.0 }
}
