use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use hf_core::Real;
use hf_network::{
    CallbackObserver, Level, Network, Notification, RecordingObserver, SimulationOptions,
};
use hf_project::{ProjectResult, convert::element_kind};

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "HydroFlow CLI - Hydraulic network flow simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List networks in a project
    Networks {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Simulate one network of a project
    Simulate {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Network ID to simulate
        network_id: String,
        /// Report elements whose input exceeds their maximum flow
        #[arg(long)]
        check_max_flow: bool,
        /// Delete the named element before simulating (repeatable)
        #[arg(long = "delete", value_name = "NAME")]
        delete: Vec<String>,
        /// Print notifications as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate the built-in demo network
    Demo {
        /// Report elements whose input exceeds their maximum flow
        #[arg(long)]
        check_max_flow: bool,
    },
}

fn main() -> ProjectResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Networks { project_path } => cmd_networks(&project_path),
        Commands::Simulate {
            project_path,
            network_id,
            check_max_flow,
            delete,
            json,
        } => cmd_simulate(
            &project_path,
            &network_id,
            SimulationOptions { check_max_flow },
            &delete,
            json,
        ),
        Commands::Demo { check_max_flow } => {
            cmd_demo(SimulationOptions { check_max_flow });
            Ok(())
        }
    }
}

fn cmd_validate(project_path: &Path) -> ProjectResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = hf_project::load_yaml(project_path)?;
    for def in &project.networks {
        hf_project::build_network(def)?;
    }
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_networks(project_path: &Path) -> ProjectResult<()> {
    let project = hf_project::load_yaml(project_path)?;

    if project.networks.is_empty() {
        println!("No networks found in project");
        return Ok(());
    }

    println!("Networks in project:");
    for def in &project.networks {
        let sources = def
            .elements
            .iter()
            .filter(|e| element_kind(&e.kind) == hf_network::ElementKind::Source)
            .count();
        println!(
            "  {} - {} ({} elements, {} links, {} sources)",
            def.id,
            def.name,
            def.elements.len(),
            def.links.len(),
            sources
        );
    }
    Ok(())
}

fn cmd_simulate(
    project_path: &Path,
    network_id: &str,
    options: SimulationOptions,
    delete: &[String],
    json: bool,
) -> ProjectResult<()> {
    let project = hf_project::load_yaml(project_path)?;
    let mut network = hf_project::load_network(&project, network_id)?;

    for name in delete {
        let removed = network.delete_element(name)?;
        tracing::info!(element = name.as_str(), kind = %removed.kind(), "deleted");
    }

    if json {
        let mut observer = RecordingObserver::new();
        network.simulate_with(&mut observer, options);
        let out = serde_json::to_string_pretty(observer.notifications())
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        println!("{out}");
    } else {
        println!("Simulating network: {network_id}\n");
        run_printed(&network, options);
    }
    Ok(())
}

fn cmd_demo(options: SimulationOptions) {
    println!("=== Hydraulic System Simulation ===\n");

    let network = Network::builder()
        .add_source("Source1")
        .with_flow(20.0)
        .link_to_tap("Tap1")
        .open()
        .link_to_split("Split1")
        .with_outputs()
        .link_to_sink("SinkA")
        .then()
        .link_to_sink("SinkB")
        .done()
        .complete();

    println!("Running simulation with flow = 20.0\n");
    run_printed(&network, options);

    println!("=== Simulation Complete ===");
    println!("Total elements in system: {}", network.len());
}

fn run_printed(network: &Network, options: SimulationOptions) {
    let mut observer = CallbackObserver(|n: Notification| print_notification(&n));
    network.simulate_with(&mut observer, options);
}

fn print_notification(n: &Notification) {
    match n.level {
        Level::Error => println!(
            "! {} [{}]: input flow {} exceeds maximum {}\n",
            n.kind,
            n.name,
            fmt_flow(n.input),
            fmt_flow(n.threshold)
        ),
        Level::Info => {
            println!("{} [{}]:", n.kind, n.name);
            if let Some(input) = n.input {
                println!("  Input flow:  {input}");
            }
            if let Some(outputs) = &n.outputs {
                let joined: Vec<String> = outputs.iter().map(|f| f.to_string()).collect();
                println!("  Output flow: {}", joined.join(" "));
            }
            println!();
        }
    }
}

fn fmt_flow(flow: Option<Real>) -> String {
    flow.map_or_else(|| "-".to_string(), |f| f.to_string())
}
