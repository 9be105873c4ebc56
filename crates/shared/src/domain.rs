use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigPathError, ParseEnumError};

pub const MISSING_FILE_ERROR: &str = "Please select a font file";
pub const INVALID_FILE_ERROR: &str = "Please select a valid font file (.ttf or .otf)";
pub const EMPTY_GLYPHS_ERROR: &str = "Please enter at least one glyph";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlyphsOption {
    #[default]
    AllGlyphs,
    BasicGlyphs,
    SelectedGlyphs,
}

impl GlyphsOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllGlyphs => "allGlyphs",
            Self::BasicGlyphs => "basicGlyphs",
            Self::SelectedGlyphs => "selectedGlyphs",
        }
    }
}

impl fmt::Display for GlyphsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlyphsOption {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allGlyphs" | "all" => Ok(Self::AllGlyphs),
            "basicGlyphs" | "basic" => Ok(Self::BasicGlyphs),
            "selectedGlyphs" | "selected" => Ok(Self::SelectedGlyphs),
            other => Err(ParseEnumError::new("glyphs option", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PxAlign {
    Off,
    On,
    Horizontal,
    Vertical,
}

impl PxAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl FromStr for PxAlign {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(ParseEnumError::new("pixel alignment", other)),
        }
    }
}

/// Asymmetric distance field range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePair {
    pub outermost: String,
    pub innermost: String,
}

impl RangePair {
    /// Canonical JSON text, keys in declaration order.
    pub fn to_json(&self) -> String {
        // Only string fields, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    fn leaf(&self, leaf: &str) -> Option<&String> {
        match leaf {
            "outermost" => Some(&self.outermost),
            "innermost" => Some(&self.innermost),
            _ => None,
        }
    }

    fn leaf_mut(&mut self, leaf: &str) -> Option<&mut String> {
        match leaf {
            "outermost" => Some(&mut self.outermost),
            "innermost" => Some(&mut self.innermost),
            _ => None,
        }
    }
}

/// Asymmetric padding, one value per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingQuad {
    pub left: String,
    pub bottom: String,
    pub right: String,
    pub top: String,
}

impl PaddingQuad {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn leaf(&self, leaf: &str) -> Option<&String> {
        match leaf {
            "left" => Some(&self.left),
            "bottom" => Some(&self.bottom),
            "right" => Some(&self.right),
            "top" => Some(&self.top),
            _ => None,
        }
    }

    fn leaf_mut(&mut self, leaf: &str) -> Option<&mut String> {
        match leaf {
            "left" => Some(&mut self.left),
            "bottom" => Some(&mut self.bottom),
            "right" => Some(&mut self.right),
            "top" => Some(&mut self.top),
            _ => None,
        }
    }
}

/// Atlas generation parameters sent alongside the font.
///
/// Every text leaf is either empty (let the service pick its default) or the
/// textual form of a number. Ranges are not checked locally; the service
/// rejects values it cannot use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub size: String,
    pub min_size: String,
    pub em_range: String,
    pub px_range: String,
    pub aem_range: RangePair,
    pub apx_range: RangePair,
    pub px_align: Option<PxAlign>,
    pub em_padding: String,
    pub px_padding: String,
    pub outer_em_padding: String,
    pub outer_px_padding: String,
    pub aem_padding: PaddingQuad,
    pub apx_padding: PaddingQuad,
    pub aouter_em_padding: PaddingQuad,
    pub aouter_px_padding: PaddingQuad,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size: String::new(),
            min_size: String::new(),
            em_range: String::new(),
            px_range: "2".into(),
            aem_range: RangePair::default(),
            apx_range: RangePair::default(),
            px_align: Some(PxAlign::Vertical),
            em_padding: String::new(),
            px_padding: String::new(),
            outer_em_padding: String::new(),
            outer_px_padding: String::new(),
            aem_padding: PaddingQuad::default(),
            apx_padding: PaddingQuad::default(),
            aouter_em_padding: PaddingQuad::default(),
            aouter_px_padding: PaddingQuad::default(),
        }
    }
}

const LEAF_PATHS: &[&str] = &[
    "size",
    "minSize",
    "emRange",
    "pxRange",
    "aemRange.outermost",
    "aemRange.innermost",
    "apxRange.outermost",
    "apxRange.innermost",
    "pxAlign",
    "emPadding",
    "pxPadding",
    "outerEmPadding",
    "outerPxPadding",
    "aemPadding.left",
    "aemPadding.bottom",
    "aemPadding.right",
    "aemPadding.top",
    "apxPadding.left",
    "apxPadding.bottom",
    "apxPadding.right",
    "apxPadding.top",
    "aouterEmPadding.left",
    "aouterEmPadding.bottom",
    "aouterEmPadding.right",
    "aouterEmPadding.top",
    "aouterPxPadding.left",
    "aouterPxPadding.bottom",
    "aouterPxPadding.right",
    "aouterPxPadding.top",
];

impl GenerationConfig {
    /// Every dotted path accepted by [`GenerationConfig::with_field`].
    pub fn leaf_paths() -> &'static [&'static str] {
        LEAF_PATHS
    }

    /// Returns a copy of the config with the leaf at `path` set to `value`.
    ///
    /// `path` uses the wire field names, e.g. `"pxRange"` or `"aemPadding.left"`.
    /// `pxAlign` accepts an empty value (omit) or one of its enum names.
    pub fn with_field(&self, path: &str, value: impl Into<String>) -> Result<Self, ConfigPathError> {
        let value = value.into();
        let mut next = self.clone();

        if path == "pxAlign" {
            next.px_align = if value.is_empty() {
                None
            } else {
                Some(value.parse::<PxAlign>().map_err(|_| ConfigPathError::InvalidValue {
                    path: path.to_string(),
                    value: value.clone(),
                })?)
            };
            return Ok(next);
        }

        let leaf = next
            .text_leaf_mut(path)
            .ok_or_else(|| ConfigPathError::UnknownPath(path.to_string()))?;
        *leaf = value;
        Ok(next)
    }

    pub fn get(&self, path: &str) -> Option<String> {
        if path == "pxAlign" {
            return Some(
                self.px_align
                    .map(|align| align.as_str().to_string())
                    .unwrap_or_default(),
            );
        }
        self.text_leaf(path).cloned()
    }

    /// Text fields for the multipart body, in wire order.
    ///
    /// Range and padding groups are always sent as JSON, even when every side
    /// is empty. Scalars are only sent when set.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(15);
        push_scalar(&mut fields, "size", &self.size);
        push_scalar(&mut fields, "minSize", &self.min_size);
        push_scalar(&mut fields, "emRange", &self.em_range);
        push_scalar(&mut fields, "pxRange", &self.px_range);
        fields.push(("aemRange", self.aem_range.to_json()));
        fields.push(("apxRange", self.apx_range.to_json()));
        if let Some(align) = self.px_align {
            fields.push(("pxAlign", align.as_str().to_string()));
        }
        push_scalar(&mut fields, "emPadding", &self.em_padding);
        push_scalar(&mut fields, "pxPadding", &self.px_padding);
        push_scalar(&mut fields, "outerEmPadding", &self.outer_em_padding);
        push_scalar(&mut fields, "outerPxPadding", &self.outer_px_padding);
        fields.push(("aemPadding", self.aem_padding.to_json()));
        fields.push(("apxPadding", self.apx_padding.to_json()));
        fields.push(("aouterEmPadding", self.aouter_em_padding.to_json()));
        fields.push(("aouterPxPadding", self.aouter_px_padding.to_json()));
        fields
    }

    fn text_leaf(&self, path: &str) -> Option<&String> {
        match split_path(path) {
            ("size", None) => Some(&self.size),
            ("minSize", None) => Some(&self.min_size),
            ("emRange", None) => Some(&self.em_range),
            ("pxRange", None) => Some(&self.px_range),
            ("emPadding", None) => Some(&self.em_padding),
            ("pxPadding", None) => Some(&self.px_padding),
            ("outerEmPadding", None) => Some(&self.outer_em_padding),
            ("outerPxPadding", None) => Some(&self.outer_px_padding),
            ("aemRange", Some(leaf)) => self.aem_range.leaf(leaf),
            ("apxRange", Some(leaf)) => self.apx_range.leaf(leaf),
            ("aemPadding", Some(leaf)) => self.aem_padding.leaf(leaf),
            ("apxPadding", Some(leaf)) => self.apx_padding.leaf(leaf),
            ("aouterEmPadding", Some(leaf)) => self.aouter_em_padding.leaf(leaf),
            ("aouterPxPadding", Some(leaf)) => self.aouter_px_padding.leaf(leaf),
            _ => None,
        }
    }

    fn text_leaf_mut(&mut self, path: &str) -> Option<&mut String> {
        match split_path(path) {
            ("size", None) => Some(&mut self.size),
            ("minSize", None) => Some(&mut self.min_size),
            ("emRange", None) => Some(&mut self.em_range),
            ("pxRange", None) => Some(&mut self.px_range),
            ("emPadding", None) => Some(&mut self.em_padding),
            ("pxPadding", None) => Some(&mut self.px_padding),
            ("outerEmPadding", None) => Some(&mut self.outer_em_padding),
            ("outerPxPadding", None) => Some(&mut self.outer_px_padding),
            ("aemRange", Some(leaf)) => self.aem_range.leaf_mut(leaf),
            ("apxRange", Some(leaf)) => self.apx_range.leaf_mut(leaf),
            ("aemPadding", Some(leaf)) => self.aem_padding.leaf_mut(leaf),
            ("apxPadding", Some(leaf)) => self.apx_padding.leaf_mut(leaf),
            ("aouterEmPadding", Some(leaf)) => self.aouter_em_padding.leaf_mut(leaf),
            ("aouterPxPadding", Some(leaf)) => self.aouter_px_padding.leaf_mut(leaf),
            _ => None,
        }
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((group, leaf)) => (group, Some(leaf)),
        None => (path, None),
    }
}

fn push_scalar(fields: &mut Vec<(&'static str, String)>, name: &'static str, value: &str) {
    if !value.is_empty() {
        fields.push((name, value.to_string()));
    }
}

/// Field-scoped validation messages shown next to the offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub file: Option<String>,
    pub glyphs: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.glyphs.is_none()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [self.file.as_deref(), self.glyphs.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

/// Case-insensitive `.ttf` / `.otf` suffix check.
pub fn is_font_file_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".ttf") || lower.ends_with(".otf")
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
