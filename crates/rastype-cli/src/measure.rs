//! The measure command: text extents without touching pixels

use rastype::error::Result;
use rastype::Font;

use crate::cli::MeasureArgs;

pub fn run(args: &MeasureArgs) -> Result<()> {
    let mut font = Font::open_index(&args.font, args.face_index, args.size)?;
    font.set_kerning(!args.no_kerning);

    let (width, height) = font.size(&args.text)?;
    println!("Size: {width}x{height} px at {}pt", args.size);

    if let Some(measure_width) = args.width {
        let fit = font.measure(&args.text, measure_width)?;
        println!(
            "Fit: {} of {} characters in {measure_width} px ({} px used)",
            fit.count,
            args.text.chars().count(),
            fit.extent
        );
    }

    Ok(())
}
