use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::{ColorType, DynamicImage};
use log::{info, warn};
use nr_core::{FilterMode, Image, Resampler, to_u8_saturating, to_unit_f32};
use nr_detect::{
    Aggregator, BatchReport, BatchResult, DetectConfig, DetectError, SampleSource,
};
use nr_resample::KernelResampler;
use rayon::prelude::*;
use serde::Serialize;
use siphasher::sip::SipHasher;

const CROP_WIDTH: usize = 1280;
const CROP_HEIGHT: usize = 720;

#[derive(Parser, Debug)]
#[command(name = "native_res")]
#[command(about = "Detect the native resolution and upscaling kernel of a frame batch, then descale it")]
struct Cli {
    /// Input frames, in batch order.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
    /// Input frames (same as the positional list).
    #[arg(short = 'i', long = "input", value_name = "FILE", num_args = 1..)]
    inputs: Vec<PathBuf>,
    /// Directory for descaled frames; defaults to the working directory.
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,
    /// Only print the detected resolution and mode.
    #[arg(short = 'd', long)]
    detect_mode: bool,
    /// Center-crop outputs taller than 720 lines to 1280x720.
    #[arg(short = 'c', long)]
    crop: bool,
    /// Decode and write grayscale only.
    #[arg(short = 'g', long)]
    gray: bool,
    /// JSON detection config; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    lo: Option<usize>,
    #[arg(long)]
    hi: Option<usize>,
    /// Comma-separated filter modes, e.g. `CATMULL_ROM,BILINEAR`.
    #[arg(long, value_delimiter = ',')]
    modes: Vec<FilterMode>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    threads: Option<usize>,
    /// Write the full detection report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn all_inputs(&self) -> Vec<PathBuf> {
        self.inputs.iter().chain(&self.files).cloned().collect()
    }

    fn detect_config(&self) -> Result<DetectConfig> {
        let mut config = match &self.config {
            Some(path) => DetectConfig::from_json_file(path)?,
            None => DetectConfig::default(),
        };
        if let Some(lo) = self.lo {
            config.lo = lo;
        }
        if let Some(hi) = self.hi {
            config.hi = hi;
        }
        if !self.modes.is_empty() {
            config.modes = self.modes.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Frames on disk, decoded to luma only when sampled.
struct PathSource<'a> {
    paths: &'a [PathBuf],
}

impl SampleSource for PathSource<'_> {
    fn total(&self) -> usize {
        self.paths.len()
    }

    fn describe(&self, index: usize) -> String {
        self.paths
            .get(index)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("#{index}"))
    }

    fn load(&self, index: usize) -> Result<Image<f32>, DetectError> {
        let path = self.paths.get(index).ok_or_else(|| DetectError::Load {
            index,
            reason: "index out of range".into(),
        })?;
        let luma = load_luma_u8(path).map_err(|e| DetectError::Load {
            index,
            reason: format!("{e:#}"),
        })?;
        Ok(to_unit_f32(&luma.as_view()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Gray,
    Yuv,
    Yuva,
}

impl Layout {
    fn color_type(self) -> ColorType {
        match self {
            Layout::Gray => ColorType::L8,
            Layout::Yuv => ColorType::Rgb8,
            Layout::Yuva => ColorType::Rgba8,
        }
    }
}

/// A decoded frame as float planes: luma alone, or Y/U/V with optional alpha.
struct Planes {
    layout: Layout,
    planes: Vec<Image<f32>>,
}

#[derive(Serialize)]
struct DetectSummary<'a> {
    inputs: usize,
    elapsed_ms: f64,
    result: &'a BatchResult,
}

/// Where and how the descaled batch is written.
#[derive(Debug, Clone, Default)]
struct OutputOptions {
    /// `None` skips the output stage (detect-only).
    dir: Option<PathBuf>,
    gray: bool,
    crop: bool,
    report: Option<PathBuf>,
}

struct Detection {
    report: BatchReport,
    elapsed_ms: f64,
    written: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let inputs = cli.all_inputs();
    if inputs.is_empty() {
        bail!("no input frames given");
    }
    for path in &inputs {
        ensure_file_exists(path, "input")?;
    }

    let config = cli.detect_config()?;
    let output = OutputOptions {
        dir: match (&cli.output_dir, cli.detect_mode) {
            (_, true) => None,
            (Some(dir), false) => Some(dir.clone()),
            (None, false) => Some(std::env::current_dir().context("resolving working directory")?),
        },
        gray: cli.gray,
        crop: cli.crop,
        report: cli.report.clone(),
    };

    let Some(detection) = detect_and_write(&inputs, &config, &output)? else {
        return Ok(());
    };

    if cli.detect_mode {
        let summary = DetectSummary {
            inputs: inputs.len(),
            elapsed_ms: detection.elapsed_ms,
            result: &detection.report.result,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("wrote {} of {} frames", detection.written, inputs.len());
    }
    Ok(())
}

/// Detects the batch resolution, then descales every input into
/// `output.dir`.
///
/// A sampled frame that fails to load ends the run with `Ok(None)` before
/// anything is written.
fn detect_and_write(
    inputs: &[PathBuf],
    config: &DetectConfig,
    output: &OutputOptions,
) -> Result<Option<Detection>> {
    let resampler = KernelResampler::default();
    let aggregator = Aggregator::new(&resampler, config)?;

    let start = Instant::now();
    let report = match aggregator.run(&PathSource { paths: inputs }) {
        Ok(report) => report,
        Err(err @ DetectError::Load { .. }) => {
            println!("failed to load image for testing: {err}");
            return Ok(None);
        }
        Err(err) => return Err(err).context("detecting native resolution"),
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let result = report.result;
    println!(
        "best guess for all: {} x {}, mode: {}",
        result.width, result.height, result.mode
    );

    if let Some(path) = &output.report {
        write_json(path, &report)?;
        info!("report written to {}", path.display());
    }

    let written = match &output.dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            info!("output to: {}", dir.display());
            aggregator.install(|| write_outputs(&resampler, inputs, dir, &result, output))
        }
        None => 0,
    };

    Ok(Some(Detection {
        report,
        elapsed_ms,
        written,
    }))
}

/// Descales every input in parallel; frames that fail are skipped with a
/// warning. Returns the number of files written.
fn write_outputs(
    resampler: &impl Resampler,
    inputs: &[PathBuf],
    dir: &Path,
    target: &BatchResult,
    output: &OutputOptions,
) -> usize {
    let id = batch_id(&inputs[0]);
    inputs
        .par_iter()
        .enumerate()
        .map(|(i, input)| {
            let name = format!("frame_{}p_descaled_{id}_{:04}.png", target.height, i + 1);
            let path = dir.join(name);
            match descale_file(resampler, input, &path, target, output.gray, output.crop) {
                Ok(()) => 1,
                Err(err) => {
                    warn!("skipping {}: {err:#}", input.display());
                    0
                }
            }
        })
        .sum()
}

fn descale_file(
    resampler: &impl Resampler,
    input: &Path,
    output: &Path,
    target: &BatchResult,
    gray: bool,
    crop: bool,
) -> Result<()> {
    let decoded = decode_planes(input, gray)?;
    let planes = decoded
        .planes
        .iter()
        .map(|plane| {
            resampler
                .downscale(&plane.as_view(), target.width, target.height, target.mode)
                .with_context(|| format!("descaling {}", input.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut channels = merge_planes(decoded.layout, &planes);
    if crop && target.height > CROP_HEIGHT {
        channels = center_crop(&channels, CROP_WIDTH, CROP_HEIGHT)?;
    }
    save_channels(output, decoded.layout, &channels)
}

fn load_luma_u8(path: &Path) -> Result<Image<u8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    luma_image(dyn_img, path)
}

fn luma_image(dyn_img: DynamicImage, path: &Path) -> Result<Image<u8>> {
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    Image::from_vec(w as usize, h as usize, luma.into_raw())
        .with_context(|| format!("constructing image from {}", path.display()))
}

fn decode_planes(path: &Path, gray: bool) -> Result<Planes> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let channels = dyn_img.color().channel_count();

    if gray || channels <= 2 {
        let luma = luma_image(dyn_img, path)?;
        return Ok(Planes {
            layout: Layout::Gray,
            planes: vec![to_unit_f32(&luma.as_view())],
        });
    }

    let (layout, stride) = if dyn_img.color().has_alpha() {
        (Layout::Yuva, 4)
    } else {
        (Layout::Yuv, 3)
    };
    let (w, h) = (dyn_img.width() as usize, dyn_img.height() as usize);
    let data = match layout {
        Layout::Yuva => dyn_img.to_rgba8().into_raw(),
        _ => dyn_img.to_rgb8().into_raw(),
    };
    Ok(Planes {
        layout,
        planes: split_yuv(&data, w, h, stride),
    })
}

/// Splits interleaved 8-bit RGB(A) into BT.601 full-range Y, U, V (and A)
/// planes on the `[0, 1]` scale, chroma centered at 0.5.
fn split_yuv(data: &[u8], width: usize, height: usize, channels: usize) -> Vec<Image<f32>> {
    let px = |x: usize, y: usize, c: usize| data[(y * width + x) * channels + c] as f32 / 255.0;
    let yuv = |x: usize, y: usize| rgb_to_yuv(px(x, y, 0), px(x, y, 1), px(x, y, 2));

    let mut planes = vec![
        Image::from_fn(width, height, |x, y| yuv(x, y)[0]),
        Image::from_fn(width, height, |x, y| yuv(x, y)[1]),
        Image::from_fn(width, height, |x, y| yuv(x, y)[2]),
    ];
    if channels == 4 {
        planes.push(Image::from_fn(width, height, |x, y| px(x, y, 3)));
    }
    planes
}

fn rgb_to_yuv(r: f32, g: f32, b: f32) -> [f32; 3] {
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        -0.168_736 * r - 0.331_264 * g + 0.5 * b + 0.5,
        0.5 * r - 0.418_688 * g - 0.081_312 * b + 0.5,
    ]
}

fn yuv_to_rgb(y: f32, u: f32, v: f32) -> [f32; 3] {
    let (u, v) = (u - 0.5, v - 0.5);
    [
        y + 1.402 * v,
        y - 0.344_136 * u - 0.714_136 * v,
        y + 1.772 * u,
    ]
}

/// Converts descaled planes back to 8-bit output channels (R, G, B[, A] or
/// a single luma channel).
fn merge_planes(layout: Layout, planes: &[Image<f32>]) -> Vec<Image<u8>> {
    if layout == Layout::Gray {
        return planes.iter().map(|p| to_u8_saturating(&p.as_view())).collect();
    }

    let (w, h) = planes[0].dims();
    let (yp, up, vp) = (planes[0].as_view(), planes[1].as_view(), planes[2].as_view());
    let rgb = |x: usize, y: usize| {
        let at = |v: &nr_core::ImageView<'_, f32>| v.get(x, y).copied().unwrap_or(0.0);
        yuv_to_rgb(at(&yp), at(&up), at(&vp))
    };

    let mut channels: Vec<Image<u8>> = (0..3)
        .map(|c| to_u8_saturating(&Image::from_fn(w, h, |x, y| rgb(x, y)[c]).as_view()))
        .collect();
    if let Some(alpha) = planes.get(3) {
        channels.push(to_u8_saturating(&alpha.as_view()));
    }
    channels
}

fn center_crop(channels: &[Image<u8>], width: usize, height: usize) -> Result<Vec<Image<u8>>> {
    channels
        .iter()
        .map(|c| {
            let (w, h) = c.dims();
            let (cw, ch) = (width.min(w), height.min(h));
            let view = c
                .as_view()
                .subview((w - cw) / 2, (h - ch) / 2, cw, ch)
                .context("cropping output")?;
            Ok(view.to_image())
        })
        .collect()
}

fn save_channels(path: &Path, layout: Layout, channels: &[Image<u8>]) -> Result<()> {
    let (w, h) = channels[0].dims();
    let mut buf = Vec::with_capacity(w * h * channels.len());
    for i in 0..w * h {
        buf.extend(channels.iter().map(|c| c.data()[i]));
    }
    image::save_buffer(path, &buf, w as u32, h as u32, layout.color_type())
        .with_context(|| format!("saving image {}", path.display()))
}

/// Eight hex digits derived from the first input's parent directory name.
///
/// Relative paths are made absolute first, so a bare `frame.png` names the
/// working directory whether or not the file exists.
fn batch_id(first_input: &Path) -> String {
    let resolved = std::path::absolute(first_input).unwrap_or_else(|_| first_input.to_path_buf());
    let dir_name = resolved
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut hasher = SipHasher::new();
    hasher.write(dir_name.as_bytes());
    format!("{:08x}", hasher.finish() >> 32)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
