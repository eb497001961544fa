use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use fabric_netgen::config_loader::load_config;
use fabric_netgen::pipeline::{NetworkContext, Pipeline};
use fabric_netgen::render::TemplateSet;
use fabric_netgen::tools::{EnvOverrideResolver, PlatformResolver, ProcessToolRunner};

/// Generate crypto material, channel artifacts and compose files for a test network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the network description YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Directory under which the network directory is created
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Directory of template overrides
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Root of the per-platform tool binaries
    #[arg(long, default_value = "tools")]
    tools_dir: PathBuf,

    /// Platform id such as linux-amd64, detected from the host when omitted
    #[arg(long)]
    platform: Option<String>,

    /// Also write the synthesized topology as JSON
    #[arg(long)]
    dump_topology: bool,

    /// Validate the configuration and synthesize the topology, then stop
    #[arg(long)]
    validate_only: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Configuration file: {:?}", args.config);
    info!("Output directory: {:?}", args.output);

    let spec = load_config(&args.config)
        .wrap_err_with(|| format!("Failed to load configuration '{}'", args.config.display()))?;
    let context = NetworkContext::new(spec, &args.output)?;

    let topology = context.topology();
    info!(
        "Synthesized {} orderers and {} peers across {} organizations",
        topology.orderers.len(),
        topology.peers.len(),
        topology.peer_organizations.len()
    );

    if args.validate_only {
        if args.dump_topology {
            context.write_topology()?;
        }
        info!("Configuration is valid, skipping generation");
        return Ok(());
    }

    let templates = TemplateSet::load(args.templates.as_deref())?;

    let resolver = match args.platform {
        Some(platform) => PlatformResolver::with_platform(&args.tools_dir, platform),
        None => PlatformResolver::new(&args.tools_dir),
    };
    let runner = ProcessToolRunner::new(EnvOverrideResolver::new(resolver));

    let report = Pipeline::new(&context, &templates, &runner)
        .run()
        .wrap_err("Network generation failed")?;

    // Staging preparation clears any earlier dump, so write it afterwards
    if args.dump_topology {
        context.write_topology()?;
    }

    info!("Network generated in {:?}", report.network_dir);
    info!(
        "Pull images with {:?}, then start with docker-compose -f {:?} up",
        report.network_dir.join("pull-docker-images.sh"),
        report.network_dir.join("docker-compose.yaml")
    );
    Ok(())
}
