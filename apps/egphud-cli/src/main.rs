//! Command-line host for EGP HUD projects.
//!
//! Examples:
//!   egphud new hud --resolution 2560x1440
//!   egphud resolutions
//!   egphud info hud.e2hud.json
//!   egphud rescale hud.e2hud.json --resolution 1280x720 -o small.e2hud.json
//!   egphud export hud.e2hud.json -o hud.txt

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use egphud_core::{is_preset_resolution, Project, DEFAULT_RESOLUTION, RESOLUTION_PRESETS};
use egphud_io::{
    export_to_file, export_to_string, load_project, save_project, with_project_extension,
};

#[derive(Parser, Debug)]
#[command(
    name = "egphud",
    version,
    about = "Inspect, rescale and export EGP HUD designer projects"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the Expression 2 chip for a project
    Export {
        project: PathBuf,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create an empty project; `.e2hud.json` is appended unless the name ends in `.json`
    New {
        project: PathBuf,
        /// Defaults to 1920x1080
        #[arg(long, value_parser = parse_resolution)]
        resolution: Option<(u32, u32)>,
    },
    /// List the common HUD resolutions
    Resolutions,
    /// Print resolution, layers and inputs
    Info { project: PathBuf },
    /// Change the resolution, scaling every shape to match
    Rescale {
        project: PathBuf,
        #[arg(long, value_parser = parse_resolution)]
        resolution: (u32, u32),
        /// Output file; rewrites the project when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse `WIDTHxHEIGHT`, e.g. `1920x1080`.
fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid dimension '{}'", v))
    };
    Ok((parse(w)?, parse(h)?))
}

fn open(path: &Path) -> Result<Project> {
    load_project(path).with_context(|| format!("failed to load {}", path.display()))
}

fn run_export(project: &Path, output: Option<&Path>) -> Result<()> {
    let loaded = open(project)?;
    match output {
        Some(out) => {
            export_to_file(&loaded, out)
                .with_context(|| format!("failed to export to {}", out.display()))?;
        }
        None => print!("{}", export_to_string(&loaded)?),
    }
    Ok(())
}

/// Write an empty project and return the path actually used.
fn run_new(path: &Path, resolution: Option<(u32, u32)>) -> Result<PathBuf> {
    let resolution = resolution.unwrap_or(DEFAULT_RESOLUTION);
    if !is_preset_resolution(resolution) {
        log::warn!(
            "{}x{} is not a common HUD resolution",
            resolution.0,
            resolution.1
        );
    }
    let path = with_project_extension(path);
    let project = Project::new(resolution);
    save_project(&project, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn list_resolutions() -> String {
    RESOLUTION_PRESETS
        .iter()
        .map(|&(w, h)| {
            let marker = if (w, h) == DEFAULT_RESOLUTION { " (default)" } else { "" };
            format!("{}x{}{}\n", w, h, marker)
        })
        .collect()
}

fn describe(project: &Project) -> String {
    let custom = if is_preset_resolution(project.resolution) { "" } else { " (custom)" };
    let mut out = format!(
        "Resolution: {}x{}{}\nLayers: {}\n",
        project.resolution.0,
        project.resolution.1,
        custom,
        project.layers.len()
    );
    for layer in &project.layers {
        let mut flags = Vec::new();
        if layer.id == project.active_layer_id {
            flags.push("active");
        }
        if !layer.visible {
            flags.push("hidden");
        }
        if layer.locked {
            flags.push("locked");
        }
        out.push_str(&format!("  {} ({} shapes)", layer.name, layer.shape_count()));
        if !flags.is_empty() {
            out.push_str(&format!(" [{}]", flags.join(", ")));
        }
        out.push('\n');
    }
    out.push_str(&format!("Inputs: {}\n", project.inputs.len()));
    for input in &project.inputs {
        out.push_str(&format!("  {}:{}\n", input.name, input.input_type.keyword()));
    }
    out
}

fn run_rescale(path: &Path, resolution: (u32, u32), output: Option<&Path>) -> Result<()> {
    let mut project = open(path)?;
    let from = project.resolution;
    project
        .set_resolution(resolution.0, resolution.1)
        .context("failed to rescale project")?;
    log::info!(
        "Rescaled {}x{} -> {}x{}",
        from.0,
        from.1,
        resolution.0,
        resolution.1
    );
    let target = output.unwrap_or(path);
    save_project(&project, target)
        .with_context(|| format!("failed to write {}", target.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Export { project, output } => run_export(&project, output.as_deref()),
        Command::New {
            project,
            resolution,
        } => {
            run_new(&project, resolution)?;
            Ok(())
        }
        Command::Resolutions => {
            print!("{}", list_resolutions());
            Ok(())
        }
        Command::Info { project } => {
            print!("{}", describe(&open(&project)?));
            Ok(())
        }
        Command::Rescale {
            project,
            resolution,
            output,
        } => run_rescale(&project, resolution, output.as_deref()),
    }
}
