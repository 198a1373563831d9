use kurbo::Vec2;

use crate::{
    channel::{Channel, Keyframe, Radians},
    error::{RenderError, RenderResult},
    formats::{
        reader::ByteReader,
        tex::{Tex, TexCel},
    },
};

const MAGIC: &[u8; 4] = b"BBIN";

/// Pixel rectangle inside an atlas cel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CelRegion {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Transform channels for one part. Absent channels hold their identity
/// value for the whole timeline.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PartChannels {
    pub position: Channel<Vec2>,
    pub rotation: Channel<Radians>,
    pub scale: Channel<Vec2>,
    pub opacity: Channel<f32>,
    pub tint: Option<Channel<[u8; 4]>>,
}

impl Default for PartChannels {
    fn default() -> Self {
        Self {
            position: Channel::constant(Vec2::ZERO),
            rotation: Channel::constant(Radians(0.0)),
            scale: Channel::constant(Vec2::new(1.0, 1.0)),
            opacity: Channel::constant(1.0),
            tint: None,
        }
    }
}

impl PartChannels {
    pub fn duration(&self) -> f64 {
        let mut d = self
            .position
            .duration()
            .max(self.rotation.duration())
            .max(self.scale.duration())
            .max(self.opacity.duration());
        if let Some(tint) = &self.tint {
            d = d.max(tint.duration());
        }
        d
    }
}

/// One named layer of the composition. Parts composite in document order,
/// later parts on top.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Part {
    pub name: String,
    /// Index into the document's atlas cels.
    pub cel: usize,
    pub region: CelRegion,
    pub channels: PartChannels,
}

/// Decoded keyframed composition: a texture atlas plus parts animated over a
/// shared timeline.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationDocument {
    pub version: u16,
    #[serde(skip)]
    pub atlas: Vec<TexCel>,
    pub parts: Vec<Part>,
}

impl AnimationDocument {
    /// Total timeline length in seconds: the latest keyframe of any channel
    /// of any part. Empty documents have duration 0.
    pub fn duration(&self) -> f64 {
        self.parts
            .iter()
            .map(|p| p.channels.duration())
            .fold(0.0, f64::max)
    }
}

/// Animation container decoder.
pub struct Bbin;

impl Bbin {
    pub fn matches(buf: &[u8]) -> bool {
        buf.len() >= 8 && &buf[..4] == MAGIC
    }

    pub fn decode(buf: &[u8]) -> RenderResult<AnimationDocument> {
        let mut r = ByteReader::new(buf);
        if r.bytes(4)? != MAGIC {
            return Err(RenderError::decode("bbin: bad magic"));
        }
        let version = r.u16()?;
        let part_count = r.u16()? as usize;
        let atlas_len = r.u32()? as usize;
        let atlas = Tex::decode(r.bytes(atlas_len)?)?;

        let mut parts = Vec::with_capacity(part_count);
        for _ in 0..part_count {
            parts.push(decode_part(&mut r, &atlas)?);
        }

        Ok(AnimationDocument {
            version,
            atlas,
            parts,
        })
    }
}

fn decode_part(r: &mut ByteReader<'_>, atlas: &[TexCel]) -> RenderResult<Part> {
    let name = r.short_str()?;
    let cel = r.u16()? as usize;
    if cel >= atlas.len() {
        return Err(RenderError::decode(format!(
            "bbin: part '{name}' references atlas cel {cel}, atlas has {}",
            atlas.len()
        )));
    }
    let region = CelRegion {
        x: r.u16()?,
        y: r.u16()?,
        width: r.u16()?,
        height: r.u16()?,
    };
    let cel_ref = &atlas[cel];
    if u32::from(region.x) + u32::from(region.width) > cel_ref.width
        || u32::from(region.y) + u32::from(region.height) > cel_ref.height
    {
        return Err(RenderError::decode(format!(
            "bbin: part '{name}' region exceeds its atlas cel bounds"
        )));
    }

    let mut channels = PartChannels::default();
    let mut seen = [false; 5];
    let channel_count = r.u8()? as usize;
    for _ in 0..channel_count {
        let kind = r.u8()?;
        let tag = kind as usize;
        if tag >= seen.len() {
            return Err(RenderError::decode(format!(
                "bbin: part '{name}' has unknown channel kind {kind}"
            )));
        }
        if seen[tag] {
            return Err(RenderError::decode(format!(
                "bbin: part '{name}' has a duplicate channel of kind {kind}"
            )));
        }
        seen[tag] = true;

        let key_count = r.u16()? as usize;
        match kind {
            0 => channels.position = decode_channel(r, key_count, Vec2::ZERO, decode_vec2)?,
            1 => channels.rotation = decode_channel(r, key_count, Radians(0.0), decode_radians)?,
            2 => channels.scale = decode_channel(r, key_count, Vec2::new(1.0, 1.0), decode_vec2)?,
            3 => channels.opacity = decode_channel(r, key_count, 1.0, decode_f32)?,
            4 => {
                channels.tint =
                    Some(decode_channel(r, key_count, [255; 4], decode_tint)?);
            }
            _ => unreachable!(),
        }
    }

    Ok(Part {
        name,
        cel,
        region,
        channels,
    })
}

fn decode_channel<T, F>(
    r: &mut ByteReader<'_>,
    key_count: usize,
    default: T,
    mut value: F,
) -> RenderResult<Channel<T>>
where
    T: crate::channel::Lerp + Clone,
    F: FnMut(&mut ByteReader<'_>) -> RenderResult<T>,
{
    let mut keys = Vec::with_capacity(key_count.min(4096));
    for _ in 0..key_count {
        let time = f64::from(r.f32()?);
        keys.push(Keyframe {
            time,
            value: value(r)?,
        });
    }
    let chan = Channel { keys, default };
    chan.validate()?;
    Ok(chan)
}

fn decode_vec2(r: &mut ByteReader<'_>) -> RenderResult<Vec2> {
    Ok(Vec2::new(f64::from(r.f32()?), f64::from(r.f32()?)))
}

fn decode_radians(r: &mut ByteReader<'_>) -> RenderResult<Radians> {
    Ok(Radians(f64::from(r.f32()?)))
}

fn decode_f32(r: &mut ByteReader<'_>) -> RenderResult<f32> {
    Ok(r.f32()?)
}

fn decode_tint(r: &mut ByteReader<'_>) -> RenderResult<[u8; 4]> {
    let b = r.bytes(4)?;
    Ok([b[0], b[1], b[2], b[3]])
}
