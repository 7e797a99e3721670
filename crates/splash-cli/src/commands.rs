use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use splash_core::prelude::*;
use splash_exec::ExitStatus;
use splash_model::{MESH_PARAMS, mesh_param_help};
use tracing::{info, warn};

use crate::{Cli, Commands, PropsCommands, sink::StdoutSink};

pub async fn dispatch(cli: Cli, config: SessionConfig) -> anyhow::Result<()> {
    let mut session = CaseSession::new(config)?;

    match cli.command {
        Commands::Import { file } => {
            let dest = session.import_geometry(&file)?;
            println!("geometry imported: {}", dest.display());
        }
        Commands::View { viewer } => {
            select_meshing(&mut session, &cli.case, cli.meshing.as_deref())?;
            let pid = session.open_viewer(viewer)?;
            println!("{viewer} started (pid {pid})");
        }
        Commands::Mesh { mesh_type, set } => {
            select_meshing(&mut session, &cli.case, cli.meshing.as_deref())?;
            let params: BTreeMap<String, String> = set.into_iter().collect();
            let job = session.start_mesh(mesh_type, &params)?;
            let status = follow(job, &session).await?;
            println!("mesh finished: {status}");
        }
        Commands::MeshParams => {
            select_meshing(&mut session, &cli.case, cli.meshing.as_deref())?;
            let current = session.mesh_params()?;
            for param in MESH_PARAMS {
                let value = current.get(*param).map(String::as_str).unwrap_or("-");
                println!("{param:<24} {value:<12} {}", mesh_param_help(param));
            }
        }
        Commands::Run => {
            session.select_case(&cli.case)?;
            let job = session.start_simulation()?;
            let status = follow(job, &session).await?;
            println!("simulation finished: {status}");
        }
        Commands::Stop => {
            session.select_case(&cli.case)?;
            if session.stop_simulation()? {
                println!("stop requested");
            } else {
                println!("no endTime entry in the control dictionary; nothing to stop");
            }
        }
        Commands::Exec { line } => {
            // A missing case is fine: the command runs in the current directory.
            if let Err(e) = session.select_case(&cli.case) {
                warn!(error = %e, "running command outside a case");
            }
            let job = session.execute_command(&line.join(" "))?;
            follow(job, &session).await?;
        }
        Commands::Props(PropsCommands::Show { file, json }) => {
            session.select_case(&cli.case)?;
            let view = select_properties(&mut session, file.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_properties(&view);
            }
        }
        Commands::Props(PropsCommands::Set { values, file }) => {
            session.select_case(&cli.case)?;
            select_properties(&mut session, file.as_deref())?;
            let updates: BTreeMap<String, String> = values.into_iter().collect();
            let report = session.update_properties(&updates)?;
            println!("{} line(s) rewritten", report.lines_rewritten);
            for key in &report.unmatched {
                println!("skipped {key}: no entry in the file");
            }
            for key in &report.unrecognized {
                println!("skipped {key}: not a thermoType or mixture key");
            }
        }
        Commands::Fuel { fuel, file } => {
            session.select_case(&cli.case)?;
            let view = select_properties(&mut session, file.as_deref())?;
            let report = session.swap_fuel(fuel)?;
            println!(
                "fuel {} -> {fuel}: {} replacement(s) in {} file(s)",
                view.variant,
                report.replacements,
                report.files_rewritten.len()
            );
            if let Some((from, to)) = &report.renamed {
                println!("renamed {} -> {}", from.display(), to.display());
            }
            if let Some(missing) = &report.missing {
                println!("{} not found; nothing renamed", missing.display());
            }
        }
        Commands::Log => {
            session.select_case(&cli.case)?;
            print!("{}", session.read_log()?);
        }
        Commands::MeshCheck => {
            select_meshing(&mut session, &cli.case, cli.meshing.as_deref())?;
            print!("{}", session.read_mesh_check()?);
        }
        Commands::Plot => {
            if let Err(e) = session.select_case(&cli.case) {
                warn!(error = %e, "plotting outside a case");
            }
            let pid = session.plot_results().await?;
            println!("{} started (pid {pid})", session.config().tools.plot);
        }
    }
    Ok(())
}

/// `--meshing`, or `<case>/<meshing_dir>`.
fn select_meshing(
    session: &mut CaseSession,
    case: &Path,
    meshing: Option<&Path>,
) -> anyhow::Result<()> {
    let dir = match meshing {
        Some(dir) => dir.to_path_buf(),
        None => case.join(&session.config().meshing_dir),
    };
    session
        .select_meshing_dir(&dir)
        .with_context(|| format!("meshing directory {}", dir.display()))?;
    Ok(())
}

fn select_properties(
    session: &mut CaseSession,
    file: Option<&Path>,
) -> anyhow::Result<PropertiesView> {
    let file: PathBuf = match file {
        Some(file) => file.to_path_buf(),
        None => session.locate_properties()?,
    };
    Ok(session.select_properties(&file)?)
}

fn print_properties(view: &PropertiesView) {
    println!("file:    {}", view.file.display());
    match view.fuel {
        Some(fuel) => println!("fuel:    {fuel}"),
        None => println!("variant: {}", view.variant),
    }
    for (block, values) in [("thermoType", &view.thermo), ("mixture", &view.mixture)] {
        println!("{block}");
        for (key, value) in values {
            println!("    {key:<16} {value}");
        }
    }
}

/// Stream a job to stdout until it ends.
///
/// Ctrl-C stops a simulation through its control dictionary first; a second
/// Ctrl-C, or the first one for any other job, kills the process group.
async fn follow(job: Job, session: &CaseSession) -> anyhow::Result<ExitStatus> {
    let kind = job.kind();
    let id = job.id();
    let canceller = job.canceller();
    let mut sink = StdoutSink::default();
    let drive = job.drive(&mut sink);
    tokio::pin!(drive);

    let mut stop_requested = false;
    loop {
        tokio::select! {
            res = &mut drive => return Ok(res?),
            sig = tokio::signal::ctrl_c() => {
                sig.context("cannot listen for Ctrl-C")?;
                if kind == JobKind::Simulation && !stop_requested {
                    stop_requested = true;
                    match session.stop_simulation() {
                        Ok(true) => {
                            info!(run = %id, "graceful stop requested");
                            eprintln!("stopping after the next write; Ctrl-C again to kill");
                            continue;
                        }
                        Ok(false) => warn!(run = %id, "no endTime to replace; killing instead"),
                        Err(e) => warn!(run = %id, error = %e, "stop request failed; killing instead"),
                    }
                }
                info!(run = %id, kind = %kind, "cancelling");
                canceller.cancel();
            }
        }
    }
}
