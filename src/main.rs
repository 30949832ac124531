//! Orbit capture CLI - render scenes and export looping GIFs.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use orbit_capture::{
    CancelToken, CapturePipeline, ExportConfig, SceneKind, Stage, StatusReporter,
    animation::AnimationPlayer,
    capture::{CaptureTarget, FileDownload},
    compute::SoftwareRasterizer,
    schema::AnimatorConfig,
};

#[derive(Parser)]
#[command(name = "orbit-capture")]
#[command(author, version, about = "Orbiting sprite scenes with seamless GIF export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture one full cycle of a scene and save it as a looping GIF
    Export {
        /// Scene to mount
        #[arg(short, long, value_enum, default_value_t = SceneKind::FingerScene)]
        scene: SceneKind,
        /// Directory the GIF is saved into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Export configuration (JSON); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Let the scene animate freely for this long before exporting
        #[arg(long, default_value_t = 0)]
        preview_ms: u64,
        /// Refresh rate of the continuous animator
        #[arg(long, default_value_t = 60.0)]
        refresh_hz: f64,
        /// On-screen container size (WIDTHxHEIGHT); captures ignore it
        #[arg(long, default_value = "800x600", value_parser = parse_viewport)]
        viewport: (u32, u32),
    },
    /// Render a single frame of a scene to PNG
    Snapshot {
        #[arg(short, long, value_enum, default_value_t = SceneKind::FingerScene)]
        scene: SceneKind,
        /// Timeline position in degrees
        #[arg(short, long, default_value_t = 0.0)]
        position: f64,
        /// Output PNG path
        #[arg(short, long, default_value = "snapshot.png")]
        out: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print frame, timing, and loop information of a GIF
    Inspect {
        /// GIF to inspect
        path: PathBuf,
    },
    /// Print the default export configuration as JSON
    ExampleConfig,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Export {
            scene,
            out_dir,
            config,
            preview_ms,
            refresh_hz,
            viewport,
        } => export(
            scene,
            &out_dir,
            config.as_deref(),
            preview_ms,
            refresh_hz,
            viewport,
        ),
        Commands::Snapshot {
            scene,
            position,
            out,
            config,
        } => snapshot(scene, position, &out, config.as_deref()),
        Commands::Inspect { path } => inspect(&path),
        Commands::ExampleConfig => print_example_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn parse_viewport(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("{v:?}: {e}"));
    Ok((parse(width)?, parse(height)?))
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("reading config {}: {e}", path.display()))?;
    let config: ExportConfig =
        serde_json::from_str(&text).map_err(|e| format!("parsing config: {e}"))?;
    Ok(config)
}

fn export(
    scene: SceneKind,
    out_dir: &Path,
    config_path: Option<&Path>,
    preview_ms: u64,
    refresh_hz: f64,
    viewport: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let config = load_config(config_path)?;
    let animator = AnimatorConfig { refresh_hz };
    animator.validate()?;

    let spec = scene.spec();
    println!("Orbit Capture Export");
    println!("====================");
    println!("Scene: {} ({} sprites)", spec.name, spec.sprite_count());
    let (out_width, out_height) = config.output_size();
    println!("Viewport: {}x{}", viewport.0, viewport.1);
    println!("Output: {out_width}x{out_height}, {} frames", config.frame_count());
    println!(
        "Frame delay: {:.2}ms (capture wait {:.2}ms)",
        config.frame_delay_ms, config.step_wait_ms
    );
    println!();

    let stage = Stage::mount(spec, viewport, &animator)?;
    if preview_ms > 0 {
        thread::sleep(Duration::from_millis(preview_ms));
        println!(
            "Previewed for {preview_ms}ms, timeline at {:.0} deg",
            stage.timeline().position()
        );
    }

    let status = StatusReporter::new();
    let pipeline = CapturePipeline::new(&stage, config, status.clone())?;
    let result = pipeline.run_export(
        &mut SoftwareRasterizer::new(),
        &mut FileDownload::new(out_dir),
        &CancelToken::new(),
    );

    for line in status.snapshot().panel_lines() {
        println!("  {line}");
    }
    println!();

    match result? {
        Some(report) => {
            println!("Saved: {}", report.path.display());
            println!(
                "Frames: {}, size: {:.2} KB",
                report.gif.frame_count,
                report.gif.size_kb()
            );
            println!("Time: {:.2}s", report.elapsed.as_secs_f32());
        }
        None => println!("Export skipped"),
    }
    Ok(())
}

fn snapshot(
    scene: SceneKind,
    position: f64,
    out: &Path,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let config = load_config(config_path)?;
    config.validate()?;

    let spec = scene.spec();
    let mut rasterizer = SoftwareRasterizer::new();
    let image = rasterizer.render(&spec, position, &config.snapshot_options())?;
    image.save(out)?;

    println!(
        "Rendered {} at {position:.1} deg to {} ({}x{})",
        spec.name,
        out.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<(), Box<dyn Error>> {
    let player = AnimationPlayer::open(path)?;
    let (width, height) = player.dimensions();
    let delays = player.delays_ms();

    println!("{}", path.display());
    println!("  Size: {width}x{height}");
    println!("  Frames: {}", player.frame_count());
    println!("  Loop: {:?}", player.loop_count());
    if let (Some(min), Some(max)) = (delays.iter().min(), delays.iter().max()) {
        println!("  Frame delay: {min}-{max}ms");
    }
    println!("  Cycle: {:.3}s", player.cycle_duration().as_secs_f32());

    if player.frame_count() > 1 {
        let first = player.read_frame(0)?;
        let last = player.read_frame(player.frame_count() - 1)?;
        let seamless = first.image == last.image;
        println!("  First frame matches last: {seamless}");
    }
    Ok(())
}

fn print_example_config() -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&ExportConfig::default())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("800x600"), Ok((800, 600)));
        assert_eq!(parse_viewport("1024X768"), Ok((1024, 768)));
        assert!(parse_viewport("800").is_err());
        assert!(parse_viewport("axb").is_err());
    }

    #[test]
    fn test_export_viewport_defaults_to_container_size() {
        let cli = Cli::try_parse_from(["orbit-capture", "export"]).unwrap();
        let Commands::Export { viewport, .. } = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(viewport, (800, 600));

        let cli =
            Cli::try_parse_from(["orbit-capture", "export", "--viewport", "320x240"]).unwrap();
        let Commands::Export { viewport, .. } = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(viewport, (320, 240));
    }
}
