use kurbo::Affine;

use crate::{
    error::{RenderError, RenderResult},
    formats::{
        bbin::CelRegion,
        extlist::Entry,
        tex::{Tex, TexCel},
    },
    renderer::{BACKDROP_RGBA, FrameFormat, Renderer, encode_surface},
    surface::Surface,
};

/// Renders one static TEX cel, centered on the surface. Time-invariant:
/// every `draw` repaints the identical frame.
pub struct StillRenderer {
    surface: Surface,
    entry: Entry,
    cel: TexCel,
    background: bool,
}

impl StillRenderer {
    pub fn new(surface: Surface, entry: Entry, buf: &[u8]) -> RenderResult<Self> {
        let mut cels = Tex::decode(buf)?;
        if cels.is_empty() {
            return Err(RenderError::decode("tex: container holds no cels"));
        }
        let cel = cels.swap_remove(0);
        tracing::debug!(
            entry = entry.id,
            width = cel.width,
            height = cel.height,
            "decoded static asset"
        );
        Ok(Self {
            surface,
            entry,
            cel,
            background: true,
        })
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

impl Renderer for StillRenderer {
    fn time_length(&self) -> f64 {
        0.0
    }

    fn set_background(&mut self, background: bool) {
        self.background = background;
    }

    fn draw(&mut self, _time: f64) -> RenderResult<()> {
        self.surface.clear(if self.background {
            BACKDROP_RGBA
        } else {
            [0, 0, 0, 0]
        });

        let size = f64::from(self.surface.size());
        let offset = (
            (size - f64::from(self.cel.width)) / 2.0,
            (size - f64::from(self.cel.height)) / 2.0,
        );
        let region = CelRegion {
            x: 0,
            y: 0,
            width: self.cel.width as u16,
            height: self.cel.height as u16,
        };
        self.surface
            .composite(&self.cel, region, Affine::translate(offset), 1.0, None);
        Ok(())
    }

    fn finalize(&self, format: FrameFormat) -> RenderResult<Vec<u8>> {
        encode_surface(&self.surface, format)
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}
