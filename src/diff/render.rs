// ─── Visual Diff Rendering ───
// Pixel-exact comparison and highlight rendering for changed assets.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::ToolsResult;

/// Highlight colors for rendered diffs.
#[derive(Debug, Clone, Copy)]
pub struct DiffColors {
    /// Pixels identical between the two inputs.
    pub same: Rgba<u8>,
    /// Pixels that differ; alpha is scaled by difference magnitude.
    pub diff: Rgba<u8>,
}

impl Default for DiffColors {
    fn default() -> Self {
        Self {
            same: Rgba([0, 0, 255, 255]),
            diff: Rgba([255, 0, 255, 255]),
        }
    }
}

/// `#RRGGBB` of a color, alpha dropped. Used for the export legend.
pub fn hex_no_alpha(color: Rgba<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

/// A rendered highlight image plus the warning attached to it, if any.
#[derive(Debug, Clone)]
pub struct RenderedDiff {
    pub png: Vec<u8>,
    pub warning: Option<String>,
}

/// Whether two encoded images decode to the same pixels. Differently
/// encoded but pixel-identical inputs compare equal; anything that fails
/// to decode does not.
pub fn images_identical(a: &[u8], b: &[u8]) -> bool {
    let (Ok(a), Ok(b)) = (image::load_from_memory(a), image::load_from_memory(b)) else {
        return false;
    };
    let (a, b) = (a.to_rgba8(), b.to_rgba8());
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// Render a highlight image for a changed asset.
///
/// The canvas spans the maximum of both dimensions. Overlapping equal
/// pixels render in the `same` color; differing pixels in the `diff` color
/// with alpha proportional to the mean RGB delta, so near-identical pixels
/// are almost transparent. Coordinates covered by only one input render as
/// `same`. A dimension mismatch produces a warning but still renders.
pub fn render_diff(
    from_bytes: &[u8],
    to_bytes: &[u8],
    asset: &str,
    colors: &DiffColors,
) -> ToolsResult<RenderedDiff> {
    let from = image::load_from_memory(from_bytes)?.to_rgba8();
    let to = image::load_from_memory(to_bytes)?.to_rgba8();

    let (fw, fh) = from.dimensions();
    let (tw, th) = to.dimensions();

    let warning = (from.dimensions() != to.dimensions()).then(|| {
        format!("Image sizes are different for {asset}! {fw}x{fh} vs {tw}x{th}")
    });

    let width = fw.max(tw);
    let height = fh.max(th);
    let mut canvas = RgbaImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let overlap = x < fw && y < fh && x < tw && y < th;
            let pixel = if overlap {
                let p1 = from.get_pixel(x, y);
                let p2 = to.get_pixel(x, y);
                if p1 == p2 {
                    colors.same
                } else {
                    let delta = (p1[0].abs_diff(p2[0]) as u16
                        + p1[1].abs_diff(p2[1]) as u16
                        + p1[2].abs_diff(p2[2]) as u16)
                        / 3;
                    Rgba([colors.diff[0], colors.diff[1], colors.diff[2], delta as u8])
                }
            } else {
                colors.same
            };
            canvas.put_pixel(x, y, pixel);
        }
    }

    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(RenderedDiff { png, warning })
}
