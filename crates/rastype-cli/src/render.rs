//! The render command: rasterize text and write an image file

use std::fs;
use std::path::Path;

use rastype::error::{ExportError, Result};
use rastype::{Font, Surface};
use rastype_export::{Exporter, PngExporter, PnmExporter};

use crate::cli::{RenderArgs, RenderTier};

pub fn run(args: &RenderArgs) -> Result<()> {
    if !args.quiet {
        eprintln!("Loading font: {}", args.font.display());
    }

    let mut font = Font::open_index(&args.font, args.face_index, args.size)?;
    font.set_size_dpi(args.size, args.dpi, args.dpi);
    font.set_style(args.style);
    font.set_outline(args.outline);
    font.set_hinting(args.hinting.into());
    font.set_sdf(args.sdf);
    font.set_direction(args.direction.into());
    font.set_wrap_align(args.align.into());
    font.set_kerning(!args.no_kerning);
    if let Some(ref tag) = args.script {
        font.set_script(tag)?;
    }

    if !args.quiet {
        eprintln!(
            "Rendering {:?} at {}pt, {} dpi, {} tier",
            args.text,
            args.size,
            args.dpi,
            args.mode.as_str()
        );
    }

    let surface = render_surface(&font, args)?;

    let exporter = exporter_for(&args.output)?;
    let bytes = exporter.export(&surface)?;
    fs::write(&args.output, &bytes)?;

    if !args.quiet {
        eprintln!(
            "Wrote {} ({}x{} px, {} bytes)",
            args.output.display(),
            surface.width(),
            surface.height(),
            bytes.len()
        );
    }

    Ok(())
}

/// Dispatch to the right Font entry point for the tier and wrap setting
fn render_surface(font: &Font, args: &RenderArgs) -> Result<Surface> {
    let text = args.text.as_str();
    match (args.mode, args.wrap) {
        (RenderTier::Solid, None) => font.render_solid(text, args.fg),
        (RenderTier::Solid, Some(w)) => font.render_solid_wrapped(text, args.fg, w),
        (RenderTier::Shaded, None) => font.render_shaded(text, args.fg, args.bg),
        (RenderTier::Shaded, Some(w)) => font.render_shaded_wrapped(text, args.fg, args.bg, w),
        (RenderTier::Blended, None) => font.render_blended(text, args.fg),
        (RenderTier::Blended, Some(w)) => font.render_blended_wrapped(text, args.fg, w),
        (RenderTier::Lcd, None) => font.render_lcd(text, args.fg, args.bg),
        (RenderTier::Lcd, Some(w)) => font.render_lcd_wrapped(text, args.fg, args.bg, w),
    }
}

/// Pick an exporter from the output file extension
fn exporter_for(path: &Path) -> Result<Box<dyn Exporter>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let exporter: Box<dyn Exporter> = match ext.as_str() {
        "png" => Box::new(PngExporter::new()),
        "ppm" | "pnm" => Box::new(PnmExporter::ppm()),
        "pgm" => Box::new(PnmExporter::pgm()),
        "pbm" => Box::new(PnmExporter::pbm()),
        _ => return Err(ExportError::UnknownFormat(ext).into()),
    };
    Ok(exporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype::Error;

    #[test]
    fn output_extension_selects_the_exporter() {
        assert_eq!(exporter_for(Path::new("out.png")).unwrap().name(), "png");
        assert_eq!(exporter_for(Path::new("out.PPM")).unwrap().name(), "ppm");
        assert_eq!(exporter_for(Path::new("out.pnm")).unwrap().name(), "ppm");
        assert_eq!(exporter_for(Path::new("out.pgm")).unwrap().name(), "pgm");
        assert_eq!(exporter_for(Path::new("out.pbm")).unwrap().name(), "pbm");
    }

    #[test]
    fn unknown_extensions_are_refused() {
        let err = exporter_for(Path::new("out.svg")).err().unwrap();
        assert!(matches!(
            err,
            Error::Export(ExportError::UnknownFormat(ref ext)) if ext == "svg"
        ));
    }
}
