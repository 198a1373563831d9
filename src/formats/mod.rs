pub mod bbin;
pub mod extlist;
pub mod reader;
pub mod tex;

use crate::error::{RenderError, RenderResult};

/// Outcome of container format detection on an asset buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetBinary {
    Tex,
    Bbin,
}

impl AssetBinary {
    /// Detects which container a buffer holds. Detection is mutually
    /// exclusive: exactly one decoder matches, or the input is unsupported.
    pub fn detect(buf: &[u8]) -> RenderResult<Self> {
        match (tex::Tex::matches(buf), bbin::Bbin::matches(buf)) {
            (true, false) => Ok(Self::Tex),
            (false, true) => Ok(Self::Bbin),
            (false, false) => Err(RenderError::UnsupportedFormat),
            (true, true) => unreachable!("TEX and BBIN magics are distinct"),
        }
    }
}
