//! Parsers for compound command-line values

use clap::ValueEnum;
use pdf_layout::Rgb;
use pdf_layout::geometry::Anchor;
use pdf_layout::plan::MergePlanEntry;

/// `x,y,w,h` in normalized page space
pub fn parse_rect(s: &str) -> Result<[f64; 4], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,w,h but got '{}'", s));
    }
    let mut values = [0.0; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }
    Ok(values)
}

/// A redaction region on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RegionArg {
    /// 0-based
    pub page_index: usize,
    pub rect: [f64; 4],
}

/// `page:x,y,w,h` with a 1-based page number
pub fn parse_region(s: &str) -> Result<RegionArg, String> {
    let (page, rect) = s
        .split_once(':')
        .ok_or_else(|| format!("expected page:x,y,w,h but got '{}'", s))?;
    Ok(RegionArg {
        page_index: parse_page_number(page)?,
        rect: parse_rect(rect)?,
    })
}

/// `doc:page[@deg]`, both 1-based, e.g. `2:5@90`
pub fn parse_order_token(s: &str) -> Result<MergePlanEntry, String> {
    let (position, rotation) = match s.split_once('@') {
        Some((position, deg)) => {
            let deg: i32 = deg
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a rotation in degrees", deg))?;
            (position, deg)
        }
        None => (s, 0),
    };
    let (doc, page) = position
        .split_once(':')
        .ok_or_else(|| format!("expected doc:page[@deg] but got '{}'", s))?;

    Ok(MergePlanEntry::new(parse_page_number(doc)?, parse_page_number(page)?).rotated(rotation))
}

/// 1-based number on the command line to a 0-based index
pub fn parse_page_number(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("page and document numbers start at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(_) => Err(format!("'{}' is not a page number", s)),
    }
}

pub fn parse_color(s: &str) -> Result<Rgb, String> {
    Rgb::from_hex(s).ok_or_else(|| format!("'{}' is not a #rrggbb colour", s))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AnchorArg {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl From<AnchorArg> for Anchor {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::TopLeft => Self::TopLeft,
            AnchorArg::TopCenter => Self::TopCenter,
            AnchorArg::TopRight => Self::TopRight,
            AnchorArg::MiddleLeft => Self::MiddleLeft,
            AnchorArg::Center => Self::Center,
            AnchorArg::MiddleRight => Self::MiddleRight,
            AnchorArg::BottomLeft => Self::BottomLeft,
            AnchorArg::BottomCenter => Self::BottomCenter,
            AnchorArg::BottomRight => Self::BottomRight,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<PaperArg> for pdf_layout::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for pdf_layout::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NumberFormatArg {
    Plain,
    OfTotal,
    Labeled,
}

impl From<NumberFormatArg> for pdf_layout::NumberFormat {
    fn from(arg: NumberFormatArg) -> Self {
        match arg {
            NumberFormatArg::Plain => Self::Plain,
            NumberFormatArg::OfTotal => Self::OfTotal,
            NumberFormatArg::Labeled => Self::Labeled,
        }
    }
}
