// ===== pixelforge/src/main.rs =====
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use pixelforge::config::Config;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with detection and evolution parameters.
    #[arg(global = true, short, long)]
    params: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Denoise(cmd::denoise::DenoiseArgs),
    Inject(cmd::inject::InjectArgs),
    Inspect(cmd::inspect::InspectArgs),
}

fn main() {
    // 1. Parse Raw Matches (to distinguish user input from defaults)
    let matches = Cli::command().get_matches();

    // 2. Construct CLI struct (populated with defaults)
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // 3. Install the tracing subscriber; RUST_LOG still wins over --debug
    let default_filter = if cli.debug {
        "pixelforge=debug"
    } else {
        "pixelforge=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🚀 Initializing PixelForge...");

    // 4. Resolve Parameter Strategy: JSON file as the base, CLI flags on top.
    // Flags like --z-threshold live inside the subcommand's matches, not the root.
    let mut config = if let Some(path) = &cli.params {
        println!("⚖️  Loading parameters from: {}", path);
        Config::load_from_file(path)
    } else {
        Config::default()
    };

    match &cli.command {
        Commands::Denoise(args) => {
            let sub = matches.subcommand_matches("denoise").unwrap();
            config.merge_from_cli(&args.config, sub);
        }
        Commands::Inspect(args) => {
            let sub = matches.subcommand_matches("inspect").unwrap();
            config.detection.merge_from_cli(&args.detection, sub);
        }
        Commands::Inject(_) => {}
    }

    // 5. Reject impossible parameter sets before touching any image
    if let Err(e) = config.validate() {
        eprintln!("\n❌ INVALID PARAMETERS:");
        eprintln!("   {}", e);
        process::exit(1);
    }

    // 6. Execute
    let result = match cli.command {
        Commands::Denoise(args) => cmd::denoise::run(args, config),
        Commands::Inject(args) => cmd::inject::run(args),
        Commands::Inspect(args) => cmd::inspect::run(args, config),
    };

    if let Err(e) = result {
        eprintln!("\n❌ FATAL: {}", e);
        process::exit(1);
    }
}
