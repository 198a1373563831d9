//! Synthetic container fixtures for integration tests.

/// Encodes an extlist catalog buffer.
pub fn extlist_buf(entries: &[(u32, bool, u16, u16)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"EXTL");
    buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for &(id, is_cards, w, h) in entries {
        buf.extend_from_slice(&id.to_le_bytes());
        buf.push(if is_cards { 1 } else { 0 });
        buf.push(0);
        buf.extend_from_slice(&w.to_le_bytes());
        buf.extend_from_slice(&h.to_le_bytes());
    }
    buf
}

/// Encodes a TEX container whose cels are raw straight-alpha RGBA8888.
pub fn tex_buf(cels: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"TEX1");
    buf.extend_from_slice(&(cels.len() as u16).to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());

    let mut offset = buf.len() + 16 * cels.len();
    let mut payloads = Vec::new();
    for (w, h, data) in cels {
        buf.extend_from_slice(&(offset as u32).to_le_bytes());
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(*w as u16).to_le_bytes());
        buf.extend_from_slice(&(*h as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // RGBA8888
        buf.extend_from_slice(&0u16.to_le_bytes());
        payloads.extend_from_slice(data);
        offset += data.len();
    }
    buf.extend_from_slice(&payloads);
    buf
}

/// Solid-color straight-alpha cel payload.
pub fn solid(w: u32, h: u32, rgba: [u8; 4]) -> (u32, u32, Vec<u8>) {
    (w, h, rgba.repeat((w * h) as usize))
}

/// One part record for [`bbin_buf`]. Channel payloads are the serialized
/// keyframes for that channel kind.
pub struct BbinPart {
    pub name: &'static str,
    pub cel: u16,
    pub region: [u16; 4],
    pub channels: Vec<(u8, Vec<Vec<u8>>)>,
}

pub const CH_POSITION: u8 = 0;
pub const CH_ROTATION: u8 = 1;
pub const CH_SCALE: u8 = 2;
pub const CH_OPACITY: u8 = 3;
pub const CH_TINT: u8 = 4;

pub fn key_f32(time: f32, value: f32) -> Vec<u8> {
    let mut k = time.to_le_bytes().to_vec();
    k.extend_from_slice(&value.to_le_bytes());
    k
}

pub fn key_vec2(time: f32, x: f32, y: f32) -> Vec<u8> {
    let mut k = time.to_le_bytes().to_vec();
    k.extend_from_slice(&x.to_le_bytes());
    k.extend_from_slice(&y.to_le_bytes());
    k
}

pub fn key_tint(time: f32, rgba: [u8; 4]) -> Vec<u8> {
    let mut k = time.to_le_bytes().to_vec();
    k.extend_from_slice(&rgba);
    k
}

/// Encodes a BBIN container around an embedded TEX atlas.
pub fn bbin_buf(atlas: &[u8], parts: &[BbinPart]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"BBIN");
    buf.extend_from_slice(&1u16.to_le_bytes()); // version
    buf.extend_from_slice(&(parts.len() as u16).to_le_bytes());
    buf.extend_from_slice(&(atlas.len() as u32).to_le_bytes());
    buf.extend_from_slice(atlas);

    for part in parts {
        buf.push(part.name.len() as u8);
        buf.extend_from_slice(part.name.as_bytes());
        buf.extend_from_slice(&part.cel.to_le_bytes());
        for v in part.region {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.push(part.channels.len() as u8);
        for (kind, keys) in &part.channels {
            buf.push(*kind);
            buf.extend_from_slice(&(keys.len() as u16).to_le_bytes());
            for k in keys {
                buf.extend_from_slice(k);
            }
        }
    }
    buf
}
