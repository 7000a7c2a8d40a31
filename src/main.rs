use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hegemon::{
    engine::{EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "hegemon simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, global = true, default_value = "scenarios/archipelago.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long, global = true)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long, global = true)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the scenario headless and print the result
    Run,
    /// Run the scenario behind a local observer web server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let mut game = scenario.build_game();
            let settings = EngineSettings {
                scenario_name: scenario.name.clone(),
                snapshot_interval_ticks: snapshot_interval,
                snapshot_dir,
            };
            let mut engine = EngineBuilder::new(settings)
                .with_standard_executions(&game)
                .build();
            engine.run(&mut game, ticks)?;

            let survivors = game.players().filter(|p| p.alive && p.spawned).count();
            println!(
                "Scenario '{}' completed after {} ticks. {} nations standing, state hash {:016x}.",
                scenario.name,
                ticks,
                survivors,
                hegemon::snapshot::state_hash(&game)
            );
            Ok(())
        }
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::run(WebServerConfig {
                scenario,
                ticks,
                snapshot_interval,
                snapshot_dir,
                host,
                port,
            }))
        }
    }
}
