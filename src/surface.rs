use kurbo::{Affine, Point, Rect};

use crate::{
    error::{RenderError, RenderResult},
    formats::{bbin::CelRegion, tex::TexCel},
};

/// Largest surface edge we will allocate. A square RGBA8 buffer at this size
/// is 1 GiB; anything beyond it is a caller mistake, not a render target.
const MAX_SIZE: u32 = 16_384;

#[derive(Clone, Copy, Debug)]
pub struct SurfaceConfig {
    /// Edge length in pixels; the surface is always square.
    pub size: u32,
    /// Bilinear sampling on transformed blits. Off means nearest-neighbor.
    pub antialias: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            size: 640,
            antialias: true,
        }
    }
}

/// Offscreen framebuffer every renderer draws into.
///
/// Pixels are premultiplied RGBA8. The buffer is single-writer by
/// construction: a renderer takes the `Surface` by value, so no second
/// renderer can bind to it while the first one is alive.
#[derive(Debug)]
pub struct Surface {
    size: u32,
    antialias: bool,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(config: SurfaceConfig) -> RenderResult<Self> {
        if config.size == 0 {
            return Err(RenderError::surface("surface size must be non-zero"));
        }
        if config.size > MAX_SIZE {
            return Err(RenderError::surface(format!(
                "surface size {} exceeds the {MAX_SIZE} px limit",
                config.size
            )));
        }
        let len = (config.size as usize) * (config.size as usize) * 4;
        Ok(Self {
            size: config.size,
            antialias: config.antialias,
            data: vec![0u8; len],
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.size + x) * 4) as usize;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Fills the whole buffer with one premultiplied color.
    pub fn clear(&mut self, rgba_premul: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba_premul);
        }
    }

    /// Composites a cel region onto the surface under an affine transform.
    ///
    /// `transform` maps region-local coordinates (origin at the region's
    /// top-left, units in pixels) to surface coordinates. Destination pixels
    /// are inverse-mapped and sampled from the source, then blended with
    /// source-over premultiplied alpha.
    pub fn composite(
        &mut self,
        cel: &TexCel,
        region: CelRegion,
        transform: Affine,
        opacity: f32,
        tint: Option<[u8; 4]>,
    ) {
        if opacity <= 0.0 || region.width == 0 || region.height == 0 {
            return;
        }
        if transform.determinant().abs() < 1e-12 {
            // Collapsed to a line or point; nothing visible.
            return;
        }

        let rw = f64::from(region.width);
        let rh = f64::from(region.height);
        let corners = [
            transform * Point::new(0.0, 0.0),
            transform * Point::new(rw, 0.0),
            transform * Point::new(0.0, rh),
            transform * Point::new(rw, rh),
        ];
        let bbox = corners
            .iter()
            .fold(Rect::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y), |r, p| {
                r.union_pt(*p)
            });

        let x0 = bbox.x0.floor().max(0.0) as u32;
        let y0 = bbox.y0.floor().max(0.0) as u32;
        let x1 = (bbox.x1.ceil() as i64).clamp(0, i64::from(self.size)) as u32;
        let y1 = (bbox.y1.ceil() as i64).clamp(0, i64::from(self.size)) as u32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let inv = transform.inverse();
        for y in y0..y1 {
            for x in x0..x1 {
                let src_pt = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if src_pt.x < 0.0 || src_pt.y < 0.0 || src_pt.x > rw || src_pt.y > rh {
                    continue;
                }
                let mut src = if self.antialias {
                    sample_bilinear(cel, region, src_pt.x, src_pt.y)
                } else {
                    sample_nearest(cel, region, src_pt.x, src_pt.y)
                };
                if let Some(tint) = tint {
                    for (c, t) in src.iter_mut().zip(tint) {
                        *c = mul_div255(u16::from(*c), u16::from(t));
                    }
                }
                let i = ((y * self.size + x) * 4) as usize;
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over(dst, src, opacity));
            }
        }
    }
}

/// Source-over blend of premultiplied RGBA8 pixels with an extra opacity
/// factor applied to the source.
pub fn over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn texel(cel: &TexCel, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * cel.width + x) * 4) as usize;
    [
        cel.rgba8_premul[i],
        cel.rgba8_premul[i + 1],
        cel.rgba8_premul[i + 2],
        cel.rgba8_premul[i + 3],
    ]
}

fn sample_nearest(cel: &TexCel, region: CelRegion, sx: f64, sy: f64) -> [u8; 4] {
    let x = (sx.floor() as i64).clamp(0, i64::from(region.width) - 1) as u32;
    let y = (sy.floor() as i64).clamp(0, i64::from(region.height) - 1) as u32;
    texel(cel, u32::from(region.x) + x, u32::from(region.y) + y)
}

fn sample_bilinear(cel: &TexCel, region: CelRegion, sx: f64, sy: f64) -> [u8; 4] {
    // Texel centers sit at half-integer coordinates.
    let fx = sx - 0.5;
    let fy = sy - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let clamp_x = |v: f64| (v as i64).clamp(0, i64::from(region.width) - 1) as u32;
    let clamp_y = |v: f64| (v as i64).clamp(0, i64::from(region.height) - 1) as u32;
    let (x0c, x1c) = (clamp_x(x0), clamp_x(x0 + 1.0));
    let (y0c, y1c) = (clamp_y(y0), clamp_y(y0 + 1.0));

    let p00 = texel(cel, u32::from(region.x) + x0c, u32::from(region.y) + y0c);
    let p10 = texel(cel, u32::from(region.x) + x1c, u32::from(region.y) + y0c);
    let p01 = texel(cel, u32::from(region.x) + x0c, u32::from(region.y) + y1c);
    let p11 = texel(cel, u32::from(region.x) + x1c, u32::from(region.y) + y1c);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(p00[i]) + (f64::from(p10[i]) - f64::from(p00[i])) * tx;
        let bot = f64::from(p01[i]) + (f64::from(p11[i]) - f64::from(p01[i])) * tx;
        out[i] = (top + (bot - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
