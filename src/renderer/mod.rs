pub mod animated;
pub mod still;

use anyhow::Context as _;
use image::{
    ExtendedColorType, ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};

use crate::{error::RenderResult, surface::Surface};

/// Opaque backdrop painted behind the asset when `background` is on.
pub const BACKDROP_RGBA: [u8; 4] = [34, 34, 34, 255];

/// Still-image output encoding for [`Renderer::finalize`].
///
/// `Png` favors fidelity (default compression); `PngFast` favors throughput
/// and is what the video pipeline uses per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    Png,
    PngFast,
}

/// Time-based drawing over an exclusively owned [`Surface`].
///
/// A renderer owns its surface for its whole life, so the single-writer
/// constraint is enforced by the borrow checker: `draw` takes `&mut self`
/// and callers cannot overlap draws or finalize a stale frame.
pub trait Renderer {
    /// Total animation duration in seconds; 0 for static assets.
    fn time_length(&self) -> f64;

    /// Whether to paint the opaque backdrop before the asset. Applies to
    /// every subsequent `draw`.
    fn set_background(&mut self, background: bool);

    /// Renders the asset's pose at `time` (seconds). Times outside
    /// `[0, time_length]` clamp, never extrapolate.
    fn draw(&mut self, time: f64) -> RenderResult<()>;

    /// Encodes the surface's current pixels, exactly as left by the most
    /// recent `draw`.
    fn finalize(&self, format: FrameFormat) -> RenderResult<Vec<u8>>;

    /// The bound surface, for pixel inspection.
    fn surface(&self) -> &Surface;
}

/// Reads back the surface and encodes it as PNG bytes.
pub(crate) fn encode_surface(surface: &Surface, format: FrameFormat) -> RenderResult<Vec<u8>> {
    // PNG carries straight alpha; unpremultiply on the way out.
    let mut rgba = surface.data().to_vec();
    unpremultiply_rgba8_in_place(&mut rgba);

    let (compression, filter) = match format {
        FrameFormat::Png => (CompressionType::Default, FilterType::Adaptive),
        FrameFormat::PngFast => (CompressionType::Fast, FilterType::NoFilter),
    };

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, filter);
    encoder
        .write_image(&rgba, surface.size(), surface.size(), ExtendedColorType::Rgba8)
        .context("encode surface to PNG")?;
    Ok(out)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
    }
}
