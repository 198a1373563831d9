use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use pad_render::{
    AnimatedRenderer, AssetBinary, Extlist, RenderError, Renderer, StillRenderer, Surface,
    SurfaceConfig, VideoConfig, render_still, render_video,
};

#[derive(Parser, Debug)]
#[command(name = "pad-render", version)]
/// Render one catalog entry from a PAD asset bundle to a PNG still or a
/// WebM clip.
struct Cli {
    /// Extlist catalog file.
    #[arg(long)]
    extlist: PathBuf,

    /// Numeric catalog entry id.
    #[arg(long)]
    id: u32,

    /// Asset binary (TEX or BBIN container).
    #[arg(long = "bin")]
    bin_path: PathBuf,

    /// Output path; receives PNG bytes (default) or WebM bytes (--video).
    #[arg(long)]
    out: PathBuf,

    /// Sample time in seconds for still output.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Encode the whole animation as a WebM clip instead of one still.
    #[arg(long)]
    video: bool,

    /// Leave the backdrop transparent instead of painting it opaque.
    #[arg(long)]
    nobg: bool,

    /// Surface edge length in pixels (the surface is square).
    #[arg(long, default_value_t = 640)]
    size: u32,

    /// Print the decoded animation document as JSON to stderr.
    #[arg(long)]
    dump_doc: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let extlist_buf = std::fs::read(&cli.extlist)
        .with_context(|| format!("read extlist '{}'", cli.extlist.display()))?;
    let extlist = Extlist::decode(&extlist_buf)?;
    let entry = extlist
        .entry(cli.id)
        .ok_or(RenderError::EntryNotFound(cli.id))?
        .clone();

    let buf = std::fs::read(&cli.bin_path)
        .with_context(|| format!("read asset binary '{}'", cli.bin_path.display()))?;

    let surface = Surface::new(SurfaceConfig {
        size: cli.size,
        antialias: true,
    })?;

    let mut renderer: Box<dyn Renderer> = match AssetBinary::detect(&buf)? {
        AssetBinary::Tex => {
            if cli.dump_doc {
                eprintln!("static texture asset; no animation document");
            }
            Box::new(StillRenderer::new(surface, entry, &buf)?)
        }
        AssetBinary::Bbin => {
            let renderer = AnimatedRenderer::new(surface, &buf)?;
            if cli.dump_doc {
                let json = serde_json::to_string_pretty(renderer.document())
                    .context("serialize animation document")?;
                eprintln!("{json}");
            }
            Box::new(renderer)
        }
    };

    renderer.set_background(!cli.nobg);

    let out_buf = if cli.video {
        render_video(renderer.as_mut(), &VideoConfig::default())?
    } else {
        render_still(renderer.as_mut(), cli.time)?
    };

    std::fs::write(&cli.out, &out_buf)
        .with_context(|| format!("write output '{}'", cli.out.display()))?;
    eprintln!("wrote {}", cli.out.display());
    Ok(())
}
