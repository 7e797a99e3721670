use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use splash_core::config::Viewer;
use splash_model::{Fuel, MeshType};
use splash_observe::{init_local_offset, init_logger};
use tracing::error;

mod commands;
mod config;
mod sink;

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "splash")]
#[command(about = "Front-end for meshing and running combustion CFD cases", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log filter, e.g. `info` or `splash_exec=debug,info`
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Log format: text, json or journald
    #[arg(long, global = true)]
    log_format: Option<String>,
    /// Case directory
    #[arg(long, global = true, default_value = ".")]
    case: PathBuf,
    /// Meshing directory holding the geometry and mesh script [default: <case>/Meshing]
    #[arg(long, global = true)]
    meshing: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Copy a geometry file into the meshing directory next to it
    Import {
        /// STL, OBJ or any other geometry file
        file: PathBuf,
    },
    /// Open the imported geometry in a viewer
    View {
        /// freecad, gmsh or paraview
        viewer: Viewer,
    },
    /// Run the mesh script, optionally updating its parameters first
    Mesh {
        #[arg(long = "type", default_value = "cartesian")]
        mesh_type: MeshType,
        /// Parameter to set before meshing, e.g. `--set nLayers=3`
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Show the mesh script parameters
    MeshParams,
    /// Run the simulation; Ctrl-C once to stop gracefully, twice to kill
    Run,
    /// Ask a running simulation to write and stop
    Stop,
    /// Run a shell command in the case directory
    Exec {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        line: Vec<String>,
    },
    /// Show or edit a physicalProperties file
    #[command(subcommand)]
    Props(PropsCommands),
    /// Switch the case to another fuel
    Fuel {
        /// methanol, ammonia or dodecane
        fuel: Fuel,
        /// Properties file [default: found under <case>/constant]
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the simulation log
    Log,
    /// Print the mesh quality report
    MeshCheck,
    /// Start the plotting tool
    Plot,
}

#[derive(Debug, Subcommand)]
enum PropsCommands {
    /// Print the recognized thermoType and mixture values
    Show {
        /// Properties file [default: found under <case>/constant]
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Rewrite values in place, e.g. `rho=800 mu=1e-3`
    Set {
        #[arg(value_parser = parse_assignment, required = true)]
        values: Vec<(String, String)>,
        /// Properties file [default: found under <case>/constant]
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Parse `key=value`.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in {s:?}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Must run before any thread exists.
    init_local_offset();

    let mut cfg = match AppConfig::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => return fail(&e),
    };
    if let Err(e) = cfg.apply_overrides(cli.log_level.as_deref(), cli.log_format.as_deref()) {
        return fail(&e);
    }
    if let Err(e) = init_logger(&cfg.logger) {
        return fail(&e.into());
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => return fail(&e.into()),
    };
    match runtime.block_on(commands::dispatch(cli, cfg.session)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            fail(&e)
        }
    }
}

fn fail(e: &anyhow::Error) -> ExitCode {
    eprintln!("error: {e:#}");
    ExitCode::FAILURE
}
