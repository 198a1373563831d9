use std::{
    io::{Read as _, Write as _},
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use crate::{
    error::{RenderError, RenderResult},
    pipeline::VideoConfig,
};

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// External video-encoding process.
///
/// Accepts PNG frames one at a time on stdin and muxes a VP9 WebM stream on
/// stdout. `write_frame` blocks until the process has accepted the frame,
/// which is the pipeline's backpressure point. stdout and stderr are drained
/// on background threads so neither pipe can fill up and deadlock the
/// strictly serialized frame loop.
pub struct FfmpegSink {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    stderr_drain: Option<JoinHandle<String>>,
    frames_written: u64,
}

impl FfmpegSink {
    /// Spawns ffmpeg with the fixed lossless WebM profile: `sample_fps`
    /// logical input re-timed to a constant `output_fps` output rate.
    pub fn spawn(config: &VideoConfig, duration: f64) -> RenderResult<Self> {
        if !is_ffmpeg_on_path() {
            return Err(RenderError::sink(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "image2pipe",
            "-framerate",
            &config.sample_fps.to_string(),
            "-i",
            "pipe:0",
            "-c:v",
            "libvpx-vp9",
            "-tile-columns",
            "6",
            "-frame-parallel",
            "1",
            "-lossless",
            "1",
            "-speed",
            &config.speed.to_string(),
            "-threads",
            &config.threads.to_string(),
            "-f",
            "webm",
            "-r",
            &config.output_fps.to_string(),
            "-vsync",
            "cfr",
            "-t",
            &format!("{duration:.2}"),
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            RenderError::sink(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::sink("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RenderError::sink("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RenderError::sink("failed to open ffmpeg stderr (unexpected)"))?;

        let stdout_drain = std::thread::spawn(move || {
            let mut out = Vec::new();
            stdout.read_to_end(&mut out).map(|_| out)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut out = String::new();
            let _ = stderr.read_to_string(&mut out);
            out
        });

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stdout_drain: Some(stdout_drain),
            stderr_drain: Some(stderr_drain),
            frames_written: 0,
        })
    }

    /// Writes one finalized frame and waits for the sink to accept it. A
    /// sink that died mid-stream surfaces here as a broken pipe.
    pub fn write_frame(&mut self, frame: &[u8]) -> RenderResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RenderError::sink("ffmpeg sink is already finished"));
        };
        stdin.write_all(frame).map_err(|e| {
            RenderError::sink(format!(
                "ffmpeg stopped accepting input at frame {}: {e}",
                self.frames_written
            ))
        })?;
        self.frames_written += 1;
        Ok(())
    }

    /// Closes the input stream, waits for the process to exit, and returns
    /// the concatenated muxed output. A non-success exit status is a
    /// [`RenderError::Sink`], never silently-returned partial output.
    pub fn finish(mut self) -> RenderResult<Vec<u8>> {
        drop(self.stdin.take());

        let mut child = self
            .child
            .take()
            .ok_or_else(|| RenderError::sink("ffmpeg sink is already finished"))?;
        let status = child
            .wait()
            .map_err(|e| RenderError::sink(format!("failed to wait for ffmpeg: {e}")))?;

        let stderr = self
            .stderr_drain
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let stdout = self
            .stdout_drain
            .take()
            .and_then(|h| h.join().ok())
            .transpose()
            .map_err(|e| RenderError::sink(format!("failed to read ffmpeg output: {e}")))?
            .unwrap_or_default();

        if !status.success() {
            return Err(RenderError::sink(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        tracing::debug!(
            frames = self.frames_written,
            bytes = stdout.len(),
            "ffmpeg sink finished"
        );
        Ok(stdout)
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Abort path: finish() takes the child, so anything left here is a
        // render that failed mid-stream.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
    }
}
