use crate::{
    error::{RenderError, RenderResult},
    formats::reader::ByteReader,
};

const MAGIC: &[u8; 4] = b"EXTL";

/// One renderable entry in the asset catalog.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub id: u32,
    /// Card-art entries live in a separate texture namespace and are never
    /// rendered by this tool.
    pub is_cards: bool,
    pub width: u16,
    pub height: u16,
}

/// Decoded asset catalog, looked up by numeric id.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Extlist {
    pub entries: Vec<Entry>,
}

impl Extlist {
    pub fn decode(buf: &[u8]) -> RenderResult<Self> {
        let mut r = ByteReader::new(buf);
        if r.bytes(4)? != MAGIC {
            return Err(RenderError::decode("extlist: bad magic"));
        }
        let count = r.u32()? as usize;
        let mut entries = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let id = r.u32()?;
            let flags = r.u8()?;
            let _reserved = r.u8()?;
            let width = r.u16()?;
            let height = r.u16()?;
            entries.push(Entry {
                id,
                is_cards: flags & 0x01 != 0,
                width,
                height,
            });
        }
        Ok(Self { entries })
    }

    /// Non-card entry with the given id, if present.
    pub fn entry(&self, id: u32) -> Option<&Entry> {
        self.entries.iter().find(|e| !e.is_cards && e.id == id)
    }
}
