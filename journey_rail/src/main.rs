// main.rs - Headless driver for the journey rail: simulates render ticks and prints scene state

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use journey_rail::animation::{FrameOutput, SceneOrchestrator, StepDirection, StepOutcome};
use journey_rail::renderer_adapter::{SceneSink, UniformWriter};
use journey_rail::scene_loader;
use journey_rail::types::SceneConfig;

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Scene JSON; the built-in rail is used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the scene configuration as JSON to this path and exit
    #[arg(long)]
    pub export_config: Option<PathBuf>,

    /// Render ticks to simulate
    #[arg(short, long, default_value = "600", value_parser = clap::value_parser!(u64).range(1..))]
    pub ticks: u64,

    /// Simulated frame rate
    #[arg(long, default_value = "60")]
    pub fps: f64,

    /// Pace ticks in real time instead of running as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Initial target progress, as if scrolled there
    #[arg(long)]
    pub target: Option<f64>,

    /// Checkpoint steps (forward|backward); each is issued once the previous transition ends
    #[arg(short, long)]
    pub step: Vec<StepDirection>,

    /// Print every Nth frame as a JSON line
    #[arg(long)]
    pub print_every: Option<u64>,

    /// Write the final frame here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let config = match &args.config {
        Some(path) => scene_loader::load_config(path)
            .with_context(|| format!("Failed to load scene from {}", path.display()))?,
        None => SceneConfig::builtin().context("Built-in scene is invalid")?,
    };

    if let Some(path) = &args.export_config {
        scene_loader::write_config(&config, path)
            .with_context(|| format!("Failed to export scene to {}", path.display()))?;
        return Ok(());
    }

    let dt = frame_interval(args.fps)?;

    let mut scene =
        SceneOrchestrator::from_config(&config).context("Scene configuration rejected")?;
    scene.on_progress(|progress, section| debug!("progress {progress:.4} in '{section}'"));
    // Headless: no assets to wait for
    scene.set_nothing_to_load();
    if let Some(target) = args.target {
        scene.set_target_progress(target);
    }

    let frame = simulate(&mut scene, &args, dt).await?;
    scene.teardown();

    let json = serde_json::to_string_pretty(&frame)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Tick length for `fps`; rejects rates whose interval is zero or not representable.
fn frame_interval(fps: f64) -> Result<Duration> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be a positive number, got {fps}");
    }
    let dt = match Duration::try_from_secs_f64(1.0 / fps) {
        Ok(dt) => dt,
        Err(err) => bail!("--fps {fps} is too low to simulate: {err}"),
    };
    if dt.is_zero() {
        bail!("--fps {fps} is too high to simulate");
    }
    Ok(dt)
}

async fn simulate(
    scene: &mut SceneOrchestrator,
    args: &Args,
    dt: Duration,
) -> Result<FrameOutput> {
    let mut pending: VecDeque<StepDirection> = args.step.iter().copied().collect();
    let mut interval = args.realtime.then(|| tokio::time::interval(dt));
    let mut writer = UniformWriter::new();
    let mut last = None;

    for _ in 0..args.ticks {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }

        if !scene.is_animating() {
            if let Some(direction) = pending.pop_front() {
                match scene.step(direction) {
                    StepOutcome::Started { from, to, index } => {
                        info!("Step {direction}: checkpoint {index} ({from:.3} -> {to:.3})")
                    }
                    outcome => warn!("Step {direction} not taken: {outcome:?}"),
                }
            }
        }

        let frame = scene.tick(dt);
        if let Some(transition) = &frame.progress.transition {
            info!(
                "Frame {}: '{}' -> '{}' at progress {:.3}",
                frame.frame, transition.from, transition.to, frame.progress.smoothed_progress
            );
        }
        if frame.progress.released_now {
            info!("Frame {}: deferred content released", frame.frame);
        }
        if let Some(every) = args.print_every.filter(|n| *n > 0) {
            if frame.frame % every == 0 {
                println!("{}", serde_json::to_string(&frame)?);
            }
        }

        writer.apply(&frame);
        last = Some(frame);
    }

    if !pending.is_empty() {
        warn!("{} step(s) never issued; increase --ticks", pending.len());
    }
    info!(
        "Simulated {} ticks of '{}'; uniform block {} bytes",
        writer.writes(),
        scene.name(),
        writer.bytes().len()
    );

    last.context("No ticks simulated")
}
