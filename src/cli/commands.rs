//! Command dispatch: turns parsed arguments into service calls and output.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{Analysis, TreeService};
use crate::cli::args::{AnalysisArg, Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, TreeSettings};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `arborgraph --help`".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        clap_complete::generate(*shell, &mut Cli::command(), "arborgraph", &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { plain, unique, keys } => cmd_tree(&container, keys, *plain, *unique),
        Commands::Analyze {
            snapshot,
            analysis,
            from,
            to,
            output,
        } => cmd_analyze(
            &container,
            snapshot,
            *analysis,
            from.as_deref(),
            to.as_deref(),
            output.as_deref(),
        ),
        Commands::Config { command } => cmd_config(&container, cli.config.as_deref(), command),
        Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, keys: &[i64], plain: bool, unique: bool) -> CliResult<()> {
    let service = if unique {
        TreeService::new(TreeSettings { unique: true })
    } else {
        container.tree_service()
    };
    let report = service.build(keys, plain);

    output::header(if plain { "Binary search tree" } else { "AVL tree" });
    output::info(report.rendered.trim_end());
    output::field("in-order", &report.in_order.iter().join(" "));
    output::field("size", &report.len);
    output::field("height", &report.height);
    if report.balanced {
        output::success("height balanced");
    } else {
        output::failure("not height balanced");
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_analyze(
    container: &ServiceContainer,
    snapshot: &Path,
    kind: AnalysisArg,
    from: Option<&str>,
    to: Option<&str>,
    target: Option<&Path>,
) -> CliResult<()> {
    let analysis = to_analysis(kind, from, to)?;
    let service = container.analysis_service();
    let report = service.analyze(snapshot, &analysis)?;

    match target {
        Some(path) => {
            service.write_report(&report, path)?;
            output::success(&format!("report written to {}", path.display()));
        }
        None => output::info(&report.to_json_pretty()?),
    }
    Ok(())
}

/// Combine the analysis choice with the node options it needs.
pub(crate) fn to_analysis(
    kind: AnalysisArg,
    from: Option<&str>,
    to: Option<&str>,
) -> CliResult<Analysis> {
    let start = from.map(str::to_string);
    if to.is_some() && kind != AnalysisArg::ShortestPath {
        output::warning("--to is only used by shortest-path");
    }
    let analysis = match kind {
        AnalysisArg::Bfs => Analysis::Bfs { start },
        AnalysisArg::Dfs => Analysis::Dfs { start },
        AnalysisArg::Prim => Analysis::Prim { start },
        AnalysisArg::ShortestPath => match (from, to) {
            (Some(from), Some(to)) => Analysis::ShortestPath {
                from: from.to_string(),
                to: to.to_string(),
            },
            _ => {
                return Err(CliError::InvalidArgs(
                    "shortest-path requires --from and --to".to_string(),
                ))
            }
        },
        AnalysisArg::Connected => Analysis::Connected,
        AnalysisArg::Cycles => Analysis::Cycles,
        AnalysisArg::Bridges => Analysis::Bridges,
        AnalysisArg::DirectedBridges => Analysis::DirectedBridges,
        AnalysisArg::Topo => Analysis::Topo,
        AnalysisArg::Bipartite => Analysis::Bipartite,
        AnalysisArg::Hamiltonian => Analysis::Hamiltonian,
        AnalysisArg::Mst => Analysis::Mst,
        AnalysisArg::Pert => Analysis::Pert,
        AnalysisArg::Cpm => Analysis::Cpm,
    };
    debug!(analysis = analysis.name(), "analysis selected");
    Ok(analysis)
}

fn cmd_config(
    container: &ServiceContainer,
    explicit: Option<&Path>,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(container.settings.to_toml()?.trim_end()),
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
        ConfigCommands::Init { force } => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("cannot determine config directory".to_string()))?;
            let fs = RealFileSystem;
            if fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                )));
            }
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::field("global", &format!("{} ({state})", path.display()));
                }
                None => output::field("global", "unavailable"),
            }
            if let Some(path) = explicit {
                output::field("explicit", &path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AnalysisArg::Bfs, Some("A"), Analysis::Bfs { start: Some("A".into()) })]
    #[case(AnalysisArg::Prim, None, Analysis::Prim { start: None })]
    #[case(AnalysisArg::Cpm, Some("A"), Analysis::Cpm)]
    fn given_kind_and_start_when_converted_then_start_is_carried(
        #[case] kind: AnalysisArg,
        #[case] from: Option<&str>,
        #[case] expected: Analysis,
    ) {
        assert_eq!(to_analysis(kind, from, None).unwrap(), expected);
    }

    #[test]
    fn given_shortest_path_without_target_when_converted_then_invalid_args() {
        let err = to_analysis(AnalysisArg::ShortestPath, Some("A"), None).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgs(_)));
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }

    #[test]
    fn given_no_command_when_executed_then_usage_error() {
        let cli = Cli {
            debug: 0,
            config: None,
            command: None,
        };
        assert!(matches!(execute_command(&cli), Err(CliError::Usage(_))));
    }
}
