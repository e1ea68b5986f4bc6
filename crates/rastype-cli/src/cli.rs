//! CLI argument definitions using Clap v4

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rastype::{Color, Direction, Hinting, Style, WrapAlign};

/// rastype - rasterize text with real fonts from the command line
#[derive(Parser, Debug)]
#[command(name = "rastype")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect a font file: faces, names, design metrics
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Measure the pixel footprint of text without rendering it
    #[command(alias = "m")]
    Measure(MeasureArgs),

    /// Render text to an image file
    #[command(alias = "r")]
    Render(Box<RenderArgs>),
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Font file path (.ttf, .otf, .ttc)
    pub font: PathBuf,

    /// Face index for TTC/OTC collections
    #[arg(short = 'y', long = "face-index", default_value = "0")]
    pub face_index: u32,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the measure command
#[derive(Parser, Debug)]
pub struct MeasureArgs {
    /// Font file path
    pub font: PathBuf,

    /// Text to measure
    pub text: String,

    /// Font size in points
    #[arg(short = 's', long = "size", default_value = "16")]
    pub size: f32,

    /// Face index for TTC/OTC collections
    #[arg(short = 'y', long = "face-index", default_value = "0")]
    pub face_index: u32,

    /// Also report how many characters fit in this pixel width
    #[arg(short = 'w', long = "width")]
    pub width: Option<i32>,

    /// Disable pair kerning
    #[arg(long = "no-kerning")]
    pub no_kerning: bool,
}

/// Arguments for the render command
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Font file path
    pub font: PathBuf,

    /// Text to render
    pub text: String,

    /// Output file; the extension picks the format (.png, .ppm, .pgm, .pbm)
    #[arg(short = 'o', long = "output", default_value = "out.png")]
    pub output: PathBuf,

    /// Font size in points
    #[arg(short = 's', long = "size", default_value = "16")]
    pub size: f32,

    /// Target resolution in dots per inch, both axes
    #[arg(long = "dpi", default_value = "72")]
    pub dpi: u32,

    /// Face index for TTC/OTC collections
    #[arg(short = 'y', long = "face-index", default_value = "0")]
    pub face_index: u32,

    /// Render quality tier
    #[arg(short = 'M', long = "mode", default_value = "blended")]
    pub mode: RenderTier,

    /// Text color (RRGGBB or RRGGBBAA)
    #[arg(long = "fg", default_value = "000000", value_parser = parse_color)]
    pub fg: Color,

    /// Background color for the shaded and lcd tiers (RRGGBB or RRGGBBAA)
    #[arg(long = "bg", default_value = "FFFFFF", value_parser = parse_color)]
    pub bg: Color,

    /// Wrap text to this pixel width (0 wraps on newlines only)
    #[arg(short = 'w', long = "wrap")]
    pub wrap: Option<u32>,

    /// Line placement inside wrapped output
    #[arg(long = "align", default_value = "left")]
    pub align: AlignOpt,

    /// Style flags, comma separated: bold,italic,underline,strikethrough
    #[arg(long = "style", default_value = "normal", value_parser = parse_style_flags)]
    pub style: Style,

    /// Outline ring radius in pixels (0 for plain fills)
    #[arg(long = "outline", default_value = "0")]
    pub outline: u32,

    /// Glyph hinting mode
    #[arg(long = "hinting", default_value = "normal")]
    pub hinting: HintingOpt,

    /// Render the blended tier as a signed distance field
    #[arg(long = "sdf")]
    pub sdf: bool,

    /// Text flow direction
    #[arg(short = 'd', long = "direction", default_value = "ltr")]
    pub direction: DirectionOpt,

    /// Script tag (ISO 15924), e.g. Latn, Arab
    #[arg(short = 'S', long = "script")]
    pub script: Option<String>,

    /// Disable pair kerning
    #[arg(long = "no-kerning")]
    pub no_kerning: bool,

    /// Silent mode (no progress info)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

/// The four pixel tiers a render can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum RenderTier {
    /// Binary coverage on a keyed palette
    Solid,
    /// Antialiased on a background-to-foreground ramp
    Shaded,
    /// Antialiased with a real alpha channel
    Blended,
    /// Subpixel antialiased, opaque
    Lcd,
}

impl RenderTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Shaded => "shaded",
            Self::Blended => "blended",
            Self::Lcd => "lcd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum AlignOpt {
    Left,
    Center,
    Right,
}

impl From<AlignOpt> for WrapAlign {
    fn from(value: AlignOpt) -> Self {
        match value {
            AlignOpt::Left => WrapAlign::Left,
            AlignOpt::Center => WrapAlign::Center,
            AlignOpt::Right => WrapAlign::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum HintingOpt {
    Normal,
    Light,
    Mono,
    None,
    LightSubpixel,
}

impl From<HintingOpt> for Hinting {
    fn from(value: HintingOpt) -> Self {
        match value {
            HintingOpt::Normal => Hinting::Normal,
            HintingOpt::Light => Hinting::Light,
            HintingOpt::Mono => Hinting::Mono,
            HintingOpt::None => Hinting::None,
            HintingOpt::LightSubpixel => Hinting::LightSubpixel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum DirectionOpt {
    Ltr,
    Rtl,
    Ttb,
    Btt,
}

impl From<DirectionOpt> for Direction {
    fn from(value: DirectionOpt) -> Self {
        match value {
            DirectionOpt::Ltr => Direction::LeftToRight,
            DirectionOpt::Rtl => Direction::RightToLeft,
            DirectionOpt::Ttb => Direction::TopToBottom,
            DirectionOpt::Btt => Direction::BottomToTop,
        }
    }
}

/// Parse an RRGGBB or RRGGBBAA hex color, with an optional leading '#'
fn parse_color(value: &str) -> Result<Color, String> {
    let hex = value.trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("color must be RRGGBB or RRGGBBAA hex, got {value:?}"));
    }
    let channel = |i: usize| -> Result<u8, String> {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string())
    };
    Ok(match hex.len() {
        6 => Color::rgb(channel(0)?, channel(2)?, channel(4)?),
        _ => Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?),
    })
}

/// Parse a comma-separated style list into flags
fn parse_style_flags(value: &str) -> Result<Style, String> {
    let mut style = Style::NORMAL;
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        style |= match part.to_ascii_lowercase().as_str() {
            "normal" | "none" => Style::NORMAL,
            "bold" => Style::BOLD,
            "italic" => Style::ITALIC,
            "underline" => Style::UNDERLINE,
            "strikethrough" | "strike" => Style::STRIKETHROUGH,
            other => return Err(format!("unknown style flag {other:?}")),
        };
    }
    Ok(style)
}
