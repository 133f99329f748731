use crate::constants::{
    MIN_CROP_SIZE, MIN_REDACTION_SIZE, PAGE_NUMBER_FONT_SIZE, PAGE_NUMBER_MARGIN,
    WATERMARK_FONT_SIZE,
};
use crate::geometry::{Anchor, NormalizedRect};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Load and save options as JSON files
#[cfg(feature = "serde")]
#[allow(async_fn_in_trait)]
pub trait OptionsFile: Serialize + DeserializeOwned {
    /// Load options from JSON file
    async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Which pages a tool applies to (0-based indices)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PageSelection {
    #[default]
    All,
    Pages(Vec<usize>),
}

impl PageSelection {
    pub fn includes(&self, page_index: usize) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Pages(pages) => pages.contains(&page_index),
        }
    }

    /// Fail if a selected page does not exist
    pub fn check_bounds(&self, page_count: usize) -> Result<()> {
        if let PageSelection::Pages(pages) = self {
            if let Some(&index) = pages.iter().find(|&&p| p >= page_count) {
                return Err(PlanningError::PageOutOfRange { index, page_count }.into());
            }
        }
        Ok(())
    }
}

/// How a document is cut into output documents
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SplitRule {
    /// A new document every `n` pages
    Every(usize),
    /// A new document starts at each listed page (0-based)
    At(Vec<usize>),
    /// A new document starts at each page with no visible content
    AtBlankPages,
}

/// Arrangement of watermark stamps on a page
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WatermarkLayout {
    Single { anchor: Anchor, margin_pt: f64 },
    Tiled { gap_pt: f64 },
}

impl Default for WatermarkLayout {
    fn default() -> Self {
        WatermarkLayout::Single {
            anchor: Anchor::Center,
            margin_pt: 0.0,
        }
    }
}

/// Text watermark configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WatermarkOptions {
    pub text: String,
    pub font_size: f64,
    pub color: Rgb,
    /// Fill and stroke alpha in `[0, 1]`
    pub opacity: f64,
    /// Counter-clockwise rotation of each stamp
    pub rotation_deg: f64,
    pub layout: WatermarkLayout,
    pub pages: PageSelection,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: "CONFIDENTIAL".to_string(),
            font_size: WATERMARK_FONT_SIZE,
            color: Rgb::GRAY,
            opacity: 0.3,
            rotation_deg: 45.0,
            layout: WatermarkLayout::default(),
            pages: PageSelection::All,
        }
    }
}

impl WatermarkOptions {
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(LayoutError::Config("Watermark text is empty".to_string()));
        }
        validate_font_size(self.font_size)?;
        validate_color(&self.color)?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(LayoutError::Config(format!(
                "Opacity must be between 0 and 1 (got {})",
                self.opacity
            )));
        }
        if !self.rotation_deg.is_finite() {
            return Err(LayoutError::Config("Rotation must be finite".to_string()));
        }
        match self.layout {
            WatermarkLayout::Single { margin_pt, .. } => validate_non_negative("Margin", margin_pt),
            WatermarkLayout::Tiled { gap_pt } => validate_non_negative("Tile gap", gap_pt),
        }
    }
}

/// Page number text format
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumberFormat {
    /// `3`
    #[default]
    Plain,
    /// `3 / 10`
    OfTotal,
    /// `Page 3 of 10`
    Labeled,
}

impl NumberFormat {
    pub fn render(self, number: usize, total: usize) -> String {
        match self {
            NumberFormat::Plain => number.to_string(),
            NumberFormat::OfTotal => format!("{} / {}", number, total),
            NumberFormat::Labeled => format!("Page {} of {}", number, total),
        }
    }
}

/// Page numbering configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageNumberOptions {
    pub anchor: Anchor,
    pub margin_pt: f64,
    pub font_size: f64,
    pub color: Rgb,
    pub start_number: usize,
    pub format: NumberFormat,
    /// Leave the first page (usually a cover) unnumbered
    pub skip_first: bool,
}

impl Default for PageNumberOptions {
    fn default() -> Self {
        Self {
            anchor: Anchor::BottomCenter,
            margin_pt: PAGE_NUMBER_MARGIN,
            font_size: PAGE_NUMBER_FONT_SIZE,
            color: Rgb::BLACK,
            start_number: 1,
            format: NumberFormat::Plain,
            skip_first: false,
        }
    }
}

impl PageNumberOptions {
    pub fn validate(&self) -> Result<()> {
        validate_font_size(self.font_size)?;
        validate_color(&self.color)?;
        validate_non_negative("Margin", self.margin_pt)
    }
}

/// Resize-to-standard-size configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResizeOptions {
    pub paper: PaperSize,
    pub orientation: Orientation,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
        }
    }
}

impl ResizeOptions {
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.paper.dimensions_mm();
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(LayoutError::Config(format!(
                "Paper size must be positive (got {}x{} mm)",
                w, h
            )));
        }
        Ok(())
    }
}

/// Crop configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CropOptions {
    pub rect: NormalizedRect,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pages: PageSelection,
}

impl CropOptions {
    pub fn validate(&self) -> Result<()> {
        self.rect.validate(MIN_CROP_SIZE)
    }
}

/// One redaction box drawn on a page
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RedactionRegion {
    pub page_index: usize,
    pub rect: NormalizedRect,
}

/// Redaction configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RedactOptions {
    pub regions: Vec<RedactionRegion>,
    pub color: Rgb,
    /// Repeat every region on all pages
    pub spread_to_all_pages: bool,
}

impl RedactOptions {
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(LayoutError::Config("No redaction regions specified".to_string()));
        }
        validate_color(&self.color)?;
        for region in &self.regions {
            region.rect.validate(MIN_REDACTION_SIZE)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl OptionsFile for WatermarkOptions {}
#[cfg(feature = "serde")]
impl OptionsFile for PageNumberOptions {}
#[cfg(feature = "serde")]
impl OptionsFile for ResizeOptions {}
#[cfg(feature = "serde")]
impl OptionsFile for CropOptions {}
#[cfg(feature = "serde")]
impl OptionsFile for RedactOptions {}

fn validate_font_size(size: f64) -> Result<()> {
    if !(size.is_finite() && size > 0.0) {
        return Err(LayoutError::Config(format!(
            "Font size must be positive (got {})",
            size
        )));
    }
    Ok(())
}

fn validate_color(color: &Rgb) -> Result<()> {
    if !color.is_valid() {
        return Err(LayoutError::Config(format!(
            "Colour components must be between 0 and 1 (got {:?})",
            color
        )));
    }
    Ok(())
}

fn validate_non_negative(what: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(LayoutError::Config(format!(
            "{} must be non-negative (got {})",
            what, value
        )));
    }
    Ok(())
}
