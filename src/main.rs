//! ---------------------------------------------------------------------------------------
//! Clio Enhance CLI
//! ---------------------------------------------------------------------------------------
//! Decodes one photo (standard web formats or camera RAW), runs it through the
//! enhancement pipeline and writes a JPEG export plus an optional preview.
//!
//! Progress is reported as JSON lines on stdout so a parent GUI process can
//! drive status labels; diagnostics go to stderr through `env_logger`.
//! ---------------------------------------------------------------------------------------

use anyhow::Context;
use clap::Parser;
use clio_enhance::export::{preview, save_jpeg, DEFAULT_PREVIEW_SIZE, EXPORT_QUALITY};
use clio_enhance::{enhance, ParameterSet, SourceImage};
use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line argument schema.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serialized JSON `ParameterSet`, or a path to a `.json` file holding one.
    /// Omitted fields use the defaults.
    #[arg(short, long)]
    options: Option<String>,

    /// Source photo.
    #[arg(short, long)]
    input: PathBuf,

    /// Destination for the JPEG export.
    #[arg(short = 'O', long)]
    output: PathBuf,

    /// Optional destination for a downscaled preview.
    #[arg(short, long)]
    preview: Option<PathBuf>,

    /// Longest edge of the preview in pixels.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_SIZE)]
    preview_size: u32,

    /// Export quality on a 0-1 scale.
    #[arg(short, long, default_value_t = EXPORT_QUALITY)]
    quality: f32,

    /// Worker threads for the pixel passes (defaults to the CPU count).
    #[arg(short, long)]
    threads: Option<usize>,
}

/// Structured progress update for IPC.
#[derive(Serialize)]
struct Progress<'a> {
    /// Completion percentage (0.0 - 100.0).
    progress: f32,
    /// File currently being processed.
    current_file: &'a str,
    /// State description (e.g., "decoding", "error: ...", "complete").
    status: String,
}

fn report(progress: f32, current_file: &str, status: impl Into<String>) -> anyhow::Result<()> {
    let line = serde_json::to_string(&Progress {
        progress,
        current_file,
        status: status.into(),
    })?;
    println!("{}", line);
    Ok(())
}

/// Resolves `--options` into a parameter set.
///
/// Accepts inline JSON or a path to a JSON file; `None` yields the defaults.
fn load_params(options: Option<&str>) -> anyhow::Result<ParameterSet> {
    let Some(raw) = options else {
        return Ok(ParameterSet::default());
    };
    let json = if raw.ends_with(".json") {
        anyhow::ensure!(Path::new(raw).is_file(), "options file {} not found", raw);
        fs::read_to_string(raw).with_context(|| format!("reading options file {}", raw))?
    } else {
        raw.to_string()
    };
    let params: ParameterSet = serde_json::from_str(&json).context("parsing options")?;
    Ok(params)
}

fn is_raw(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    matches!(ext.as_str(), "arw" | "cr2" | "nef" | "dng")
}

/// Decodes a camera RAW file at half resolution.
///
/// Each 2×2 Bayer cell (RGGB) becomes one RGBA pixel, which skips full
/// demosaicing; fine for single-photo enhancement where the pipeline may
/// upscale again anyway. Integer samples are mapped from the sensor's
/// black..white range onto 0..1.
fn decode_raw(path: &Path) -> anyhow::Result<RgbaImage> {
    let raw = rawloader::decode_file(path).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    anyhow::ensure!(
        raw.cpp == 1,
        "unsupported RAW layout: {} components per pixel (only Bayer mosaics are decoded)",
        raw.cpp
    );
    let (out_w, out_h) = (raw.width / 2, raw.height / 2);
    anyhow::ensure!(out_w > 0 && out_h > 0, "RAW frame too small: {}x{}", raw.width, raw.height);

    let pixels = match raw.data {
        rawloader::RawImageData::Integer(ref data) => {
            let normalize = sensor_range(raw.blacklevels[0], raw.whitelevels[0]);
            half_size_rgba(raw.width, out_w, out_h, |i| normalize(data[i]))
        }
        rawloader::RawImageData::Float(ref data) => half_size_rgba(raw.width, out_w, out_h, |i| data[i]),
    };

    RgbaImage::from_raw(out_w as u32, out_h as u32, pixels)
        .ok_or_else(|| anyhow::anyhow!("Failed to create image buffer"))
}

/// Maps an integer sensor sample onto 0..1 between the black and white levels.
fn sensor_range(black: u16, white: u16) -> impl Fn(u16) -> f32 + Sync {
    let black = black as f32;
    let span = (white as f32 - black).max(1.0);
    move |v| ((v as f32 - black) / span).max(0.0)
}

/// Sub-samples R, (G1+G2)/2, B from the Bayer grid in parallel rows.
fn half_size_rgba<F>(width: usize, out_w: usize, out_h: usize, sample: F) -> Vec<u8>
where
    F: Fn(usize) -> f32 + Sync,
{
    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    let mut pixels = vec![0u8; out_w * out_h * 4];

    pixels.par_chunks_exact_mut(out_w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..out_w {
            let idx = (y * 2) * width + (x * 2);
            let o = x * 4;
            row[o] = to_u8(sample(idx));
            row[o + 1] = to_u8((sample(idx + 1) + sample(idx + width)) * 0.5);
            row[o + 2] = to_u8(sample(idx + width + 1));
            row[o + 3] = 255;
        }
    });
    pixels
}

fn decode(path: &Path) -> anyhow::Result<SourceImage> {
    let source = if is_raw(path) {
        SourceImage::from(decode_raw(path)?)
    } else {
        SourceImage::from(image::open(path).with_context(|| format!("decoding {}", path.display()))?)
    };
    Ok(source)
}

fn run(args: &Args, name: &str) -> anyhow::Result<()> {
    let params = load_params(args.options.as_deref())?;

    report(0.0, name, "decoding")?;
    let source = decode(&args.input)?;

    report(25.0, name, "enhancing")?;
    let enhanced = enhance(&source, &params)?;
    // The decoded bitmap is no longer needed once the run has its own buffer.
    drop(source);

    report(75.0, name, "encoding")?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    save_jpeg(&enhanced, &args.output, args.quality)?;

    if let Some(preview_path) = &args.preview {
        let small = preview(&enhanced, args.preview_size);
        save_jpeg(&small, preview_path, args.quality)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("configuring worker pool")?;
    log::debug!("using {} worker threads", threads);

    let name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if let Err(e) = run(&args, &name) {
        report(100.0, &name, format!("error: {:#}", e))?;
        return Err(e);
    }

    report(100.0, &name, "complete")?;
    Ok(())
}
