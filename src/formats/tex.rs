use anyhow::Context as _;

use crate::{
    error::{RenderError, RenderResult},
    formats::reader::ByteReader,
};

const MAGIC: &[u8; 4] = b"TEX1";

/// One decoded texture cel, stored as premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct TexCel {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Per-cel pixel encoding inside a TEX container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CelEncoding {
    Rgba8888,
    Rgba4444,
    Rgb565,
    Png,
}

impl CelEncoding {
    fn from_tag(tag: u16) -> RenderResult<Self> {
        match tag {
            0 => Ok(Self::Rgba8888),
            1 => Ok(Self::Rgba4444),
            2 => Ok(Self::Rgb565),
            3 => Ok(Self::Png),
            other => Err(RenderError::decode(format!(
                "tex: unknown cel encoding tag {other}"
            ))),
        }
    }
}

/// Static-texture container. Holds one or more cels; the first cel is the
/// one a still render draws.
pub struct Tex;

impl Tex {
    pub fn matches(buf: &[u8]) -> bool {
        buf.len() >= 8 && &buf[..4] == MAGIC
    }

    pub fn decode(buf: &[u8]) -> RenderResult<Vec<TexCel>> {
        let mut r = ByteReader::new(buf);
        if r.bytes(4)? != MAGIC {
            return Err(RenderError::decode("tex: bad magic"));
        }
        let count = r.u16()? as usize;
        let _reserved = r.u16()?;

        // Cel directory first, payloads follow (offsets are absolute).
        let mut dir = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = r.u32()? as usize;
            let len = r.u32()? as usize;
            let width = u32::from(r.u16()?);
            let height = u32::from(r.u16()?);
            let encoding = CelEncoding::from_tag(r.u16()?)?;
            let _reserved = r.u16()?;
            dir.push((offset, len, width, height, encoding));
        }

        let mut cels = Vec::with_capacity(count);
        for (offset, len, width, height, encoding) in dir {
            let end = offset.checked_add(len).filter(|&e| e <= buf.len());
            let Some(end) = end else {
                return Err(RenderError::decode(format!(
                    "tex: cel payload [{offset}, +{len}) runs past end of buffer"
                )));
            };
            cels.push(decode_cel(&buf[offset..end], width, height, encoding)?);
        }
        Ok(cels)
    }
}

fn decode_cel(
    payload: &[u8],
    width: u32,
    height: u32,
    encoding: CelEncoding,
) -> RenderResult<TexCel> {
    let px = (width as usize) * (height as usize);
    let mut rgba = match encoding {
        CelEncoding::Rgba8888 => {
            expect_payload_len(payload, px * 4, "RGBA8888")?;
            payload.to_vec()
        }
        CelEncoding::Rgba4444 => {
            expect_payload_len(payload, px * 2, "RGBA4444")?;
            let mut out = Vec::with_capacity(px * 4);
            for ch in payload.chunks_exact(2) {
                let v = u16::from_le_bytes([ch[0], ch[1]]);
                out.push((((v >> 12) & 0xF) as u8) * 17);
                out.push((((v >> 8) & 0xF) as u8) * 17);
                out.push((((v >> 4) & 0xF) as u8) * 17);
                out.push(((v & 0xF) as u8) * 17);
            }
            out
        }
        CelEncoding::Rgb565 => {
            expect_payload_len(payload, px * 2, "RGB565")?;
            let mut out = Vec::with_capacity(px * 4);
            for ch in payload.chunks_exact(2) {
                let v = u16::from_le_bytes([ch[0], ch[1]]);
                out.push(expand5(((v >> 11) & 0x1F) as u8));
                out.push(expand6(((v >> 5) & 0x3F) as u8));
                out.push(expand5((v & 0x1F) as u8));
                out.push(255);
            }
            out
        }
        CelEncoding::Png => {
            let img = image::load_from_memory(payload)
                .context("tex: decode embedded PNG cel")?
                .to_rgba8();
            if img.dimensions() != (width, height) {
                return Err(RenderError::decode(format!(
                    "tex: embedded PNG is {}x{}, directory says {width}x{height}",
                    img.width(),
                    img.height()
                )));
            }
            img.into_raw()
        }
    };

    premultiply_rgba8_in_place(&mut rgba);
    Ok(TexCel {
        width,
        height,
        rgba8_premul: rgba,
    })
}

fn expect_payload_len(payload: &[u8], want: usize, what: &str) -> RenderResult<()> {
    if payload.len() != want {
        return Err(RenderError::decode(format!(
            "tex: {what} payload is {} bytes, expected {want}",
            payload.len()
        )));
    }
    Ok(())
}

fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn encode_rgba8888(cels: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
        let mut header = Vec::new();
        header.extend_from_slice(MAGIC);
        header.extend_from_slice(&(cels.len() as u16).to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());

        let dir_len = 16 * cels.len();
        let mut payloads = Vec::new();
        let mut dir = Vec::new();
        let mut offset = header.len() + dir_len;
        for (w, h, data) in cels {
            dir.extend_from_slice(&(offset as u32).to_le_bytes());
            dir.extend_from_slice(&(data.len() as u32).to_le_bytes());
            dir.extend_from_slice(&(*w as u16).to_le_bytes());
            dir.extend_from_slice(&(*h as u16).to_le_bytes());
            dir.extend_from_slice(&0u16.to_le_bytes());
            dir.extend_from_slice(&0u16.to_le_bytes());
            payloads.extend_from_slice(data);
            offset += data.len();
        }

        let mut buf = header;
        buf.extend_from_slice(&dir);
        buf.extend_from_slice(&payloads);
        buf
    }

    #[test]
    fn matches_requires_magic() {
        assert!(Tex::matches(&encode_rgba8888(&[])));
        assert!(!Tex::matches(b"BBIN\0\0\0\0"));
        assert!(!Tex::matches(b"TEX"));
    }

    #[test]
    fn decode_rgba8888_premultiplies() {
        let buf = encode_rgba8888(&[(1, 1, vec![100, 50, 200, 128])]);
        let cels = Tex::decode(&buf).unwrap();
        assert_eq!(cels.len(), 1);
        assert_eq!(cels[0].width, 1);
        assert_eq!(
            cels[0].rgba8_premul,
            vec![
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128
            ]
        );
    }

    #[test]
    fn decode_rgba4444_expands_nibbles() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        let offset = (buf.len() + 16) as u32;
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // RGBA4444
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0xF00Fu16.to_le_bytes()); // r=15 a=15

        let cels = Tex::decode(&buf).unwrap();
        assert_eq!(cels[0].rgba8_premul, vec![255, 0, 0, 255]);
    }

    #[test]
    fn payload_past_end_is_a_decode_error() {
        let mut buf = encode_rgba8888(&[(1, 1, vec![0, 0, 0, 255])]);
        buf.truncate(buf.len() - 1);
        let err = Tex::decode(&buf).unwrap_err();
        assert!(err.to_string().contains("runs past end"));
    }
}
