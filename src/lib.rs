#![forbid(unsafe_code)]

pub mod channel;
pub mod error;
pub mod formats;
pub mod pipeline;
pub mod renderer;
pub mod sink;
pub mod surface;

pub use channel::{Channel, Keyframe, Lerp, Radians};
pub use error::{RenderError, RenderResult};
pub use formats::{
    AssetBinary,
    bbin::{AnimationDocument, Bbin, CelRegion, Part, PartChannels},
    extlist::{Entry, Extlist},
    tex::{Tex, TexCel},
};
pub use pipeline::{VideoConfig, render_still, render_video, sample_count};
pub use renderer::{
    BACKDROP_RGBA, FrameFormat, Renderer, animated::AnimatedRenderer, still::StillRenderer,
};
pub use sink::{FfmpegSink, is_ffmpeg_on_path};
pub use surface::{Surface, SurfaceConfig};
