use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use egui::{Color32, Pos2, Vec2};
use image::Rgba;

use super::Canvas;
use crate::error::FontError;
use crate::shape::FontSpec;

/// Horizontal shear of synthesized italics
const ITALIC_SHEAR: f32 = 0.2;

/// Font faces available to the text tool, by family name.
///
/// Unknown families resolve to the built-in face.
pub struct FontBook {
    default: Option<FontArc>,
    families: HashMap<String, FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        let default = FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
            .map_err(|err| log::error!("Built-in font failed to parse: {err}"))
            .ok();
        Self {
            default,
            families: HashMap::new(),
        }
    }

    /// Build a font book from `family -> file` pairs. Unreadable files are logged and skipped.
    pub fn from_files<'a>(
        files: impl IntoIterator<Item = (&'a String, &'a std::path::PathBuf)>,
    ) -> Self {
        let mut book = Self::new();
        for (family, path) in files {
            if let Err(err) = book.load_family(family, path) {
                log::warn!("Font family {family:?} unavailable: {err}");
            }
        }
        book
    }

    pub fn load_family(&mut self, family: &str, path: &Path) -> Result<(), FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_owned(),
            source,
        })?;
        let font = FontArc::try_from_vec(bytes).map_err(|source| FontError::Parse {
            path: path.to_owned(),
            source,
        })?;
        log::info!("Loaded font family {family:?} from {}", path.display());
        self.families.insert(family.to_owned(), font);
        Ok(())
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn get(&self, family: &str) -> Option<&FontArc> {
        self.families.get(family).or(self.default.as_ref())
    }
}

/// Text broken into lines that fit a box width
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub line_height: f32,
    /// Extent of the laid-out text; the width is at least the wrap width
    pub size: Vec2,
}

impl TextLayout {
    /// Greedy word wrap of `content` into lines no wider than `max_width`.
    ///
    /// Explicit newlines always break. A single word wider than the box gets its own line.
    pub fn new(fonts: &FontBook, spec: &FontSpec, content: &str, max_width: f32) -> Self {
        let font = fonts.get(&spec.family);
        let line_height = match font {
            Some(font) => {
                let scaled = font.as_scaled(PxScale::from(spec.size));
                scaled.height() + scaled.line_gap()
            }
            None => spec.size * 1.2,
        };

        let mut lines = Vec::new();
        for paragraph in content.split('\n') {
            let mut line = String::new();
            let mut width = 0.0;
            for (gap, word) in words_with_gaps(paragraph) {
                let gap_width = line_width(font, spec.size, gap);
                let word_width = line_width(font, spec.size, word);
                let overflows = width + gap_width + word_width > max_width;
                if overflows && !line.is_empty() && !word.is_empty() {
                    // The spaces at a wrap point are swallowed by the break
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                } else {
                    line.push_str(gap);
                    width += gap_width;
                }
                line.push_str(word);
                width += word_width;
            }
            lines.push(line);
        }

        let widest = lines
            .iter()
            .map(|l| line_width(font, spec.size, l))
            .fold(0.0_f32, f32::max);
        let size = Vec2::new(widest.max(max_width), line_height * lines.len() as f32);

        Self {
            lines,
            line_height,
            size,
        }
    }
}

/// Split a line into `(spaces before, word)` pairs. Trailing spaces come last, with an
/// empty word.
fn words_with_gaps(text: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let gap_end = rest.find(|c| c != ' ').unwrap_or(rest.len());
        let (gap, tail) = rest.split_at(gap_end);
        let word_end = tail.find(' ').unwrap_or(tail.len());
        let (word, next) = tail.split_at(word_end);
        pairs.push((gap, word));
        rest = next;
    }
    pairs
}

/// Advance width of `text` at `size`, including kerning. Without a font every character
/// is assumed to be half an em wide.
pub fn line_width(font: Option<&FontArc>, size: f32, text: &str) -> f32 {
    let Some(font) = font else {
        return text.chars().count() as f32 * size * 0.5;
    };
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let gid = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, gid);
        }
        width += scaled.h_advance(gid);
        prev = Some(gid);
    }
    width
}

/// Rasterize a laid-out text block with its top-left corner at `anchor`.
pub fn draw_text(
    canvas: &mut Canvas,
    fonts: &FontBook,
    spec: &FontSpec,
    layout: &TextLayout,
    anchor: Pos2,
) {
    let Some(font) = fonts.get(&spec.family) else {
        log::warn!("No font available, text {:?} not drawn", layout.lines);
        return;
    };
    let scaled = font.as_scaled(PxScale::from(spec.size));
    // Overdraw one pixel to the right for synthesized bold
    let passes: &[f32] = if spec.bold { &[0.0, 1.0] } else { &[0.0] };

    for (index, line) in layout.lines.iter().enumerate() {
        let baseline = anchor.y + scaled.ascent() + layout.line_height * index as f32;
        for offset in passes {
            let mut x = anchor.x + offset;
            let mut prev: Option<GlyphId> = None;
            for ch in line.chars() {
                let gid = font.glyph_id(ch);
                if let Some(prev) = prev {
                    x += scaled.kern(prev, gid);
                }
                let glyph = gid.with_scale_and_position(spec.size, point(x, baseline));
                if let Some(outlined) = font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|px, py, coverage| {
                        let y = bounds.min.y + py as f32;
                        let shear = if spec.italic { (baseline - y) * ITALIC_SHEAR } else { 0.0 };
                        let x = bounds.min.x + px as f32 + shear;
                        blend_pixel(canvas, x, y, spec.color, coverage);
                    });
                }
                x += scaled.h_advance(gid);
                prev = Some(gid);
            }
        }
    }
}

/// Source-over blend of `color` scaled by `coverage` into one pixel
fn blend_pixel(canvas: &mut Canvas, x: f32, y: f32, color: Color32, coverage: f32) {
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x.round() as u32, y.round() as u32);
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }

    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let src_a = (a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel(x, y).0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let mix = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    canvas.put_pixel(
        x,
        y,
        Rgba([
            mix(r, dst[0]),
            mix(g, dst[1]),
            mix(b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn spec() -> FontSpec {
        FontSpec {
            color: Color32::BLACK,
            ..FontSpec::default()
        }
    }

    #[test]
    fn test_unknown_family_falls_back() {
        let book = FontBook::new();
        assert!(book.get("Nope").is_some());
        assert!(line_width(book.get("Nope"), 24.0, "abc") > 0.0);
        assert_eq!(book.families().count(), 0);
    }

    #[test]
    fn test_wraps_on_width() {
        let book = FontBook::new();
        let layout = TextLayout::new(&book, &spec(), "one two three four five six", 60.0);
        assert!(layout.lines.len() > 1);
        for line in &layout.lines {
            if line.contains(' ') {
                assert!(line_width(book.get("Default"), 24.0, line) <= 60.0);
            }
        }
    }

    #[test]
    fn test_space_runs_are_kept() {
        let book = FontBook::new();
        let layout = TextLayout::new(&book, &spec(), "  a   b ", 400.0);
        assert_eq!(layout.lines, vec!["  a   b ".to_owned()]);
    }

    #[test]
    fn test_wrap_drops_only_the_breaking_gap() {
        let pairs = words_with_gaps("ab  cd");
        assert_eq!(pairs, vec![("", "ab"), ("  ", "cd")]);

        let book = FontBook::new();
        let font = book.get("Default");
        let narrow = line_width(font, 24.0, "ab  c");
        let layout = TextLayout::new(&book, &spec(), "ab  cd  ef", narrow);
        assert_eq!(layout.lines[0], "ab");
        assert!(layout.lines.iter().all(|l| !l.starts_with(' ')));
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let mut book = FontBook::new();
        let err = book
            .load_family("Ghost", Path::new("/nonexistent/ghost.ttf"))
            .unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
        assert_eq!(book.families().count(), 0);
    }

    #[test]
    fn test_explicit_newline_breaks() {
        let book = FontBook::new();
        let layout = TextLayout::new(&book, &spec(), "a\nb", 300.0);
        assert_eq!(layout.lines, vec!["a".to_owned(), "b".to_owned()]);
        assert!((layout.size.y - 2.0 * layout.line_height).abs() < 1e-3);
    }

    #[test]
    fn test_draw_text_marks_canvas() {
        let book = FontBook::new();
        let mut canvas = RgbaImage::from_pixel(200, 60, Rgba([255, 255, 255, 255]));
        let layout = TextLayout::new(&book, &spec(), "Hello", 200.0);
        draw_text(&mut canvas, &book, &spec(), &layout, Pos2::new(5.0, 5.0));
        assert!(canvas.pixels().any(|p| p.0[0] < 128));
    }
}
