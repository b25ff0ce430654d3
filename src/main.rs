// =============================================================================
// Scripted Street Fighter fighter: runner
// =============================================================================
// Build & Run:
//   cargo build --release
//   cargo run --release -- config --out fighter.json
//   cargo run --release -- play --rom sf2.nes --ram-map ram.json --render

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use sf_fighter_rl::{CHANNELS, FighterConfig, FighterEnv, InputFrame, NesBackend, RamMap};

// =============================================================================
// Play
// =============================================================================

fn play(args: &PlayArgs) -> Result<()> {
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("  PLAYING: scripted combo fighter");
    eprintln!("═══════════════════════════════════════════════════════════");

    let mut config = match &args.config {
        Some(path) => FighterConfig::load(path)?,
        None => FighterConfig::default(),
    };
    if args.render {
        config.env.rendering = true;
    }
    if args.no_reset_round {
        config.env.reset_round = false;
    }
    let rendering = config.env.rendering;

    let ram_map = RamMap::load(&args.ram_map)?;
    let mut backend = NesBackend::new(args.rom.clone(), ram_map, config.nes)?;
    if rendering {
        backend.open_window("Street Fighter: Scripted Fighter")?;
    }
    let mut env = FighterEnv::new(backend, config.policy, config.env, config.reward)?;

    let space = env.observation_space();
    eprintln!(
        "Observation: {}x{}x{} ({}..={})",
        space.shape.0, space.shape.1, space.shape.2, space.low, space.high
    );

    // Stand-in for a training loop's action; the fighter ignores it.
    let mut rng = SmallRng::from_os_rng();

    'episodes: for ep in 0..args.episodes {
        env.reset()?;
        loop {
            if rendering && !env.backend().is_window_open() {
                eprintln!("\nRender window closed. Exiting.");
                break 'episodes;
            }
            let raw: [u8; CHANNELS] = std::array::from_fn(|_| rng.random_range(0..=1));
            let action = InputFrame::from_channels(&raw)?;
            let result = env.step(action)?;
            if result.done || env.episode().steps >= args.max_steps {
                break;
            }
        }

        let episode = env.episode();
        eprintln!(
            "Episode {}: reward={:.3}, steps={}, ticks={}",
            ep + 1,
            episode.total_reward,
            episode.steps,
            episode.ticks,
        );
        if env.reward_debug_enabled() {
            eprintln!("  breakdown: {:?}", env.reward_breakdown());
            env.clear_reward_breakdown();
        }
    }

    Ok(())
}

// =============================================================================
// Config
// =============================================================================

fn config(args: &ConfigArgs) -> Result<()> {
    let config = FighterConfig::default();
    match &args.out {
        Some(path) => {
            config.save(path)?;
            eprintln!("Default configuration written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser)]
#[command(name = "sf-fighter", about = "Scripted combo fighter for fighting-game RL")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted fighter against a ROM
    Play(PlayArgs),
    /// Print or write the default configuration
    Config(ConfigArgs),
}

#[derive(Parser)]
struct PlayArgs {
    #[arg(long)]
    rom: PathBuf,
    /// JSON map of status fields to RAM addresses
    #[arg(long)]
    ram_map: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "5")]
    episodes: usize,
    #[arg(long, default_value = "10000")]
    max_steps: u64,
    #[arg(long, default_value_t = false)]
    render: bool,
    #[arg(long, default_value_t = false)]
    no_reset_round: bool,
}

#[derive(Parser)]
struct ConfigArgs {
    #[arg(long)]
    out: Option<PathBuf>,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Play(args) => play(args),
        Commands::Config(args) => config(args),
    }
}
