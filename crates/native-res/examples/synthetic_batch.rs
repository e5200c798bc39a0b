//! Example: detect the native resolution of a synthetic upscaled batch.
//!
//! Renders a batch of noise frames at a chosen native size, upscales every
//! frame with one kernel, then runs the batch detector and reports how close
//! the verdict is. Per-sample guesses and timing are written as JSON.
//!
//! Run from the workspace root:
//!   cargo run --release -p native-res --example synthetic_batch -- --help
//!   cargo run --release -p native-res --example synthetic_batch -- --mode LANCZOS3

use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use native_res::{
    Aggregator, BorderMode, DetectConfig, FilterMode, Image, KernelResampler, resize_f32,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Detect native resolution and kernel on a synthetic upscaled batch")]
struct Args {
    /// Native frame height before upscaling
    #[arg(long, default_value_t = 240)]
    native_height: usize,

    /// Delivered frame height after upscaling
    #[arg(long, default_value_t = 360)]
    height: usize,

    /// Frame aspect ratio (width / height)
    #[arg(long, default_value_t = 16.0 / 9.0)]
    aspect: f64,

    /// Kernel used for the upscale
    #[arg(long, default_value = "CATMULL_ROM")]
    mode: FilterMode,

    /// Number of frames in the batch
    #[arg(long, default_value_t = 16)]
    frames: usize,

    /// Seed for both frame content and sample selection
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Output JSON path
    #[arg(long, default_value = "synthetic_batch.json")]
    out: String,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Summary {
    truth_width: usize,
    truth_height: usize,
    truth_mode: FilterMode,
    /// Wall-clock time of the whole detection run, in milliseconds.
    elapsed_ms: f64,
    correct_height: bool,
    correct_mode: bool,
    report: native_res::BatchReport,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn frame(width: usize, height: usize, rng: &mut StdRng) -> Image<f32> {
    Image::from_fn(width, height, |_, _| rng.random::<f32>())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    ensure!(
        args.native_height < args.height,
        "native height {} must be below delivered height {}",
        args.native_height,
        args.height
    );
    let native_width = (args.native_height as f64 * args.aspect).round() as usize;
    let width = (args.height as f64 * args.aspect).round() as usize;

    println!(
        "rendering {} frames: {native_width}x{} -> {width}x{} with {}",
        args.frames, args.native_height, args.height, args.mode
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let batch = (0..args.frames)
        .map(|_| {
            let native = frame(native_width, args.native_height, &mut rng);
            resize_f32(
                &native.as_view(),
                width,
                args.height,
                args.mode.kind(),
                BorderMode::Repeat,
            )
            .context("upscaling synthetic frame")
        })
        .collect::<Result<Vec<_>>>()?;

    let config = DetectConfig {
        lo: args.native_height * 3 / 4,
        hi: args.height,
        seed: Some(args.seed),
        ..DetectConfig::default()
    };
    let resampler = KernelResampler::default();
    let aggregator = Aggregator::new(&resampler, &config)?;

    let t0 = Instant::now();
    let report = aggregator.run(batch.as_slice())?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    for sample in &report.samples {
        let r = &sample.report.result;
        println!(
            "  frame {:>3}: {}x{} {}",
            sample.index, r.width, r.height, r.mode
        );
    }
    let verdict = report.result;
    println!(
        "verdict: {}x{} {}  ({elapsed_ms:.1} ms)",
        verdict.width, verdict.height, verdict.mode
    );

    let summary = Summary {
        truth_width: native_width,
        truth_height: args.native_height,
        truth_mode: args.mode,
        elapsed_ms,
        correct_height: verdict.height == args.native_height,
        correct_mode: verdict.mode == args.mode,
        report,
    };
    let out_file =
        std::fs::File::create(&args.out).with_context(|| format!("creating {}", args.out))?;
    serde_json::to_writer_pretty(out_file, &summary)
        .with_context(|| format!("writing JSON to {}", args.out))?;

    println!("results written to {}", args.out);
    Ok(())
}
