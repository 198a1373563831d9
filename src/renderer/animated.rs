use kurbo::Affine;

use crate::{
    error::RenderResult,
    formats::bbin::{AnimationDocument, Bbin},
    renderer::{BACKDROP_RGBA, FrameFormat, Renderer, encode_surface},
    surface::Surface,
};

/// Renders a time-sampled pose of a keyframed BBIN composition.
///
/// Document coordinates have their origin at the surface center; each part's
/// transform pivots around the center of its cel region.
#[derive(Debug)]
pub struct AnimatedRenderer {
    surface: Surface,
    doc: AnimationDocument,
    time_length: f64,
    background: bool,
}

impl AnimatedRenderer {
    pub fn new(surface: Surface, buf: &[u8]) -> RenderResult<Self> {
        let doc = Bbin::decode(buf)?;
        let time_length = doc.duration();
        tracing::debug!(
            parts = doc.parts.len(),
            cels = doc.atlas.len(),
            time_length,
            "decoded animation document"
        );
        Ok(Self {
            surface,
            doc,
            time_length,
            background: true,
        })
    }

    pub fn document(&self) -> &AnimationDocument {
        &self.doc
    }
}

impl Renderer for AnimatedRenderer {
    fn time_length(&self) -> f64 {
        self.time_length
    }

    fn set_background(&mut self, background: bool) {
        self.background = background;
    }

    fn draw(&mut self, time: f64) -> RenderResult<()> {
        let t = time.clamp(0.0, self.time_length);

        self.surface.clear(if self.background {
            BACKDROP_RGBA
        } else {
            [0, 0, 0, 0]
        });

        let center = f64::from(self.surface.size()) / 2.0;
        for part in &self.doc.parts {
            let ch = &part.channels;
            let opacity = ch.opacity.sample(t);
            if opacity <= 0.0 {
                // Invisible this frame; skip the draw call but keep the part
                // in the document for later samples.
                continue;
            }

            let pos = ch.position.sample(t);
            let rot = ch.rotation.sample(t);
            let scale = ch.scale.sample(t);
            let tint = ch.tint.as_ref().map(|c| c.sample(t));

            let transform = Affine::translate((center + pos.x, center + pos.y))
                * Affine::rotate(rot.0)
                * Affine::scale_non_uniform(scale.x, scale.y)
                * Affine::translate((
                    -f64::from(part.region.width) / 2.0,
                    -f64::from(part.region.height) / 2.0,
                ));

            self.surface.composite(
                &self.doc.atlas[part.cel],
                part.region,
                transform,
                opacity,
                tint,
            );
        }
        Ok(())
    }

    fn finalize(&self, format: FrameFormat) -> RenderResult<Vec<u8>> {
        encode_surface(&self.surface, format)
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}
