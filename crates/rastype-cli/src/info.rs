//! The info command: report what a font file contains

use rastype::error::{ExportError, Result};
use rastype::{Face, FaceRef};
use serde::Serialize;

use crate::cli::InfoArgs;

/// Machine-readable face summary for --json output
#[derive(Serialize)]
struct FaceReport<'a> {
    file: String,
    face_index: u32,
    face_count: u32,
    family: Option<&'a str>,
    style: Option<&'a str>,
    units_per_em: u16,
    glyph_count: Option<u32>,
    fixed_pitch: bool,
    bold: bool,
    italic: bool,
    has_kerning: bool,
    metrics: MetricsReport,
}

#[derive(Serialize)]
struct MetricsReport {
    ascender: i16,
    descender: i16,
    line_gap: i16,
    underline_position: i16,
    underline_thickness: i16,
    strikeout_position: i16,
    strikeout_size: i16,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let face = Face::from_file_index(&args.font, args.face_index)?;
    let metrics = face.metrics();

    if args.json {
        let report = FaceReport {
            file: args.font.display().to_string(),
            face_index: args.face_index,
            face_count: face.face_count(),
            family: face.family_name(),
            style: face.style_name(),
            units_per_em: face.units_per_em(),
            glyph_count: face.glyph_count(),
            fixed_pitch: face.is_fixed_pitch(),
            bold: face.is_bold(),
            italic: face.is_italic(),
            has_kerning: face.has_kerning(),
            metrics: MetricsReport {
                ascender: metrics.ascender,
                descender: metrics.descender,
                line_gap: metrics.line_gap,
                underline_position: metrics.underline_position,
                underline_thickness: metrics.underline_thickness,
                strikeout_position: metrics.strikeout_position,
                strikeout_size: metrics.strikeout_size,
            },
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| ExportError::Encoding(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    println!("Font: {}", args.font.display());
    if face.face_count() > 1 {
        println!("Face: {} of {}", args.face_index, face.face_count());
    }
    println!("Family: {}", face.family_name().unwrap_or("(unnamed)"));
    println!("Style: {}", face.style_name().unwrap_or("(unnamed)"));
    if let Some(count) = face.glyph_count() {
        println!("Glyphs: {count}");
    }
    println!("Units per em: {}", face.units_per_em());
    println!("Fixed width: {}", yes_no(face.is_fixed_pitch()));
    println!("Kerning table: {}", yes_no(face.has_kerning()));
    println!("Ascender: {}", metrics.ascender);
    println!("Descender: {}", metrics.descender);
    println!("Line gap: {}", metrics.line_gap);
    println!(
        "Underline: position {}, thickness {}",
        metrics.underline_position, metrics.underline_thickness
    );
    println!(
        "Strikeout: position {}, size {}",
        metrics.strikeout_position, metrics.strikeout_size
    );

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
