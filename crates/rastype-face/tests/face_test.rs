//! Integration tests for face loading against real font files
//!
//! These exercise the full open path on fixture fonts under `test-fonts/`
//! at the workspace root. Each test skips quietly when the fixture is
//! absent so the suite stays green on checkouts without fonts.

use std::path::PathBuf;

use rastype_core::FaceRef;
use rastype_face::Face;

/// Get path to test font fixtures
fn test_font_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-fonts")
        .join(name)
}

#[test]
fn open_face_and_read_basic_properties() {
    let font_path = test_font_path("DejaVuSans.ttf");
    if !font_path.exists() {
        eprintln!("Skipping test: font not found at {:?}", font_path);
        return;
    }

    let face = Face::from_file(&font_path).unwrap();
    assert_eq!(face.face_index(), 0);
    assert_eq!(face.face_count(), 1);
    assert!(face.units_per_em() > 0);
    assert!(face.glyph_count().unwrap_or(0) > 0);
    assert!(face.family_name().is_some());

    let metrics = face.metrics();
    assert!(metrics.ascender > 0);
    assert!(metrics.descender < 0);
    assert!(metrics.underline_thickness >= 1);
}

#[test]
fn ascii_glyphs_resolve_and_advance() {
    let font_path = test_font_path("DejaVuSans.ttf");
    if !font_path.exists() {
        eprintln!("Skipping test: font not found at {:?}", font_path);
        return;
    }

    let face = Face::from_file(&font_path).unwrap();
    let gid_a = face.glyph_index('A').expect("font should map 'A'");
    assert_ne!(gid_a, 0);
    assert!(face.advance_width(gid_a) > 0.0);

    // Different letters, different glyphs
    let gid_b = face.glyph_index('B').expect("font should map 'B'");
    assert_ne!(gid_a, gid_b);
}

#[test]
fn out_of_range_face_index_names_the_count() {
    let font_path = test_font_path("DejaVuSans.ttf");
    if !font_path.exists() {
        eprintln!("Skipping test: font not found at {:?}", font_path);
        return;
    }

    let data = std::fs::read(&font_path).unwrap();
    let err = Face::from_data_index(data, 7).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("index 7"), "got: {message}");
}

#[test]
fn kerning_pairs_are_directional_when_present() {
    let font_path = test_font_path("DejaVuSans.ttf");
    if !font_path.exists() {
        eprintln!("Skipping test: font not found at {:?}", font_path);
        return;
    }

    let face = Face::from_file(&font_path).unwrap();
    if !face.has_kerning() {
        eprintln!("Skipping test: fixture font has no kern table");
        return;
    }

    // "AV" is the classic kern pair; it should pull the glyphs together
    let a = face.glyph_index('A').unwrap();
    let v = face.glyph_index('V').unwrap();
    if let Some(adjust) = face.kerning(a, v) {
        assert!(adjust < 0.0, "AV should kern negative, got {adjust}");
    }
}

#[test]
fn monospace_fixture_reports_fixed_pitch() {
    let font_path = test_font_path("DejaVuSansMono.ttf");
    if !font_path.exists() {
        eprintln!("Skipping test: font not found at {:?}", font_path);
        return;
    }

    let face = Face::from_file(&font_path).unwrap();
    assert!(face.is_fixed_pitch());

    let i = face.glyph_index('i').unwrap();
    let m = face.glyph_index('m').unwrap();
    assert_eq!(face.advance_width(i), face.advance_width(m));
}
