use crate::{
    error::{RenderError, RenderResult},
    renderer::{FrameFormat, Renderer},
    sink::FfmpegSink,
};

/// Fixed encoding profile for video output: 30 logical samples per second,
/// re-timed by the sink to a constant 100 fps WebM stream.
#[derive(Clone, Debug)]
pub struct VideoConfig {
    /// Logical sampling rate the renderer is driven at.
    pub sample_fps: u32,
    /// Constant output frame rate after CFR re-timing.
    pub output_fps: u32,
    /// Encoder threads.
    pub threads: u32,
    /// libvpx speed/quality trade-off.
    pub speed: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            sample_fps: 30,
            output_fps: 100,
            threads: 8,
            speed: 8,
        }
    }
}

impl VideoConfig {
    pub fn validate(&self) -> RenderResult<()> {
        if self.sample_fps == 0 || self.output_fps == 0 {
            return Err(RenderError::validation(
                "video sample/output fps must be non-zero",
            ));
        }
        if self.threads == 0 {
            return Err(RenderError::validation("video threads must be non-zero"));
        }
        Ok(())
    }
}

/// Number of frames a video render samples: `ceil(duration * fps)`.
pub fn sample_count(time_length: f64, sample_fps: u32) -> u64 {
    (time_length.max(0.0) * f64::from(sample_fps)).ceil() as u64
}

/// Still-image mode: one draw at the requested time, encoded with the
/// fidelity-favoring format.
#[tracing::instrument(skip(renderer))]
pub fn render_still(renderer: &mut dyn Renderer, time: f64) -> RenderResult<Vec<u8>> {
    renderer.draw(time)?;
    renderer.finalize(FrameFormat::Png)
}

/// Video mode: samples the renderer at the configured rate from 0 to its
/// time length and streams each frame into the ffmpeg sink.
///
/// The loop is strictly serialized: frame `i + 1` is not drawn until the
/// sink has accepted frame `i`. Both the surface and the sink's input
/// stream are single-writer resources, and the blocking write doubles as
/// backpressure against an unbounded encoder input buffer.
#[tracing::instrument(skip(renderer, config))]
pub fn render_video(renderer: &mut dyn Renderer, config: &VideoConfig) -> RenderResult<Vec<u8>> {
    config.validate()?;

    let time_length = renderer.time_length();
    let frames = sample_count(time_length, config.sample_fps);
    if frames == 0 {
        // Degenerate zero-duration document. Spawning the sink with no
        // input would make it fail with an unrelated message, so refuse
        // up front instead of writing an empty file.
        return Err(RenderError::validation(
            "asset has zero animation duration; nothing to encode as video",
        ));
    }

    let mut sink = FfmpegSink::spawn(config, time_length)?;
    for i in 0..frames {
        let t = (i as f64 / f64::from(config.sample_fps)).min(time_length);
        renderer.draw(t)?;
        let frame = renderer.finalize(FrameFormat::PngFast)?;
        sink.write_frame(&frame)?;
    }

    tracing::info!(frames, "all samples written, waiting for sink to close");
    sink.finish()
}
