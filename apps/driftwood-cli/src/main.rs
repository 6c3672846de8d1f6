use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use driftwood_assets::PrimitiveLoader;
use driftwood_input::{Axis, InputSnapshot};
use driftwood_kernel::{Band, GameConfig, GameEvent, GameState, REFERENCE_FRAME, scatter};
use driftwood_render::{DebugTextRenderer, RenderView, Renderer};

#[derive(Parser)]
#[command(name = "driftwood-cli", about = "Headless driftwood runs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Throttle {
    Ahead,
    Stop,
    Astern,
}

#[derive(Clone, Copy, ValueEnum)]
enum Rudder {
    Left,
    Straight,
    Right,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the default configuration
    Info,
    /// Sail the boat for a number of frames with placeholder models
    Simulate {
        /// Number of reference frames to run
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Trash placement seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Number of trash pieces
        #[arg(long)]
        trash_count: Option<usize>,
        /// Throttle held for the whole run
        #[arg(long, value_enum, default_value = "ahead")]
        throttle: Throttle,
        /// Rudder held for the whole run
        #[arg(long, value_enum, default_value = "straight")]
        rudder: Rudder,
        /// YAML game configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Sample trash placements and report how they split between bands
    Scatter {
        /// Number of placements to draw
        #[arg(short = 'n', long, default_value = "10000")]
        samples: usize,
        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => {
            GameConfig::load(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(GameConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("driftwood-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", driftwood_assets::crate_info());
            println!("input: {}", driftwood_input::crate_info());
            println!("render: {}", driftwood_render::crate_info());
            println!("reference frame: {:.4}s", REFERENCE_FRAME);
            println!("--- default config ---");
            print!("{}", GameConfig::default().to_yaml()?);
        }
        Commands::Simulate {
            frames,
            seed,
            trash_count,
            throttle,
            rudder,
            config,
        } => {
            let mut config = load_config(config.as_ref())?;
            config.seed = Some(seed);
            if let Some(count) = trash_count {
                config.trash_count = count;
            }

            let input = InputSnapshot {
                forward: match throttle {
                    Throttle::Ahead => Axis::Positive,
                    Throttle::Stop => Axis::Neutral,
                    Throttle::Astern => Axis::Negative,
                },
                turn: match rudder {
                    Rudder::Left => Axis::Positive,
                    Rudder::Straight => Axis::Neutral,
                    Rudder::Right => Axis::Negative,
                },
            };

            let mut game = GameState::new(config, &PrimitiveLoader::default())?;
            for _ in 0..frames {
                game.frame(REFERENCE_FRAME, &input);
            }
            tracing::info!(
                ticks = game.tick(),
                collected = game.collected(),
                "simulation finished"
            );

            for event in game.drain_events() {
                match event {
                    GameEvent::TrashSpawned { .. } => {}
                    GameEvent::TrashCollected { node, tick } => {
                        println!("tick {tick:>5}: collected [{}]", node.short());
                    }
                    other => println!("{other:?}"),
                }
            }

            let view = RenderView {
                target: game.boat().position,
                ..RenderView::default()
            };
            print!("{}", DebugTextRenderer::new().render(game.scene(), &view));

            let boat = game.boat();
            println!(
                "Boat: ({:.2}, {:.2}, {:.2}) heading {:.3}",
                boat.position.x, boat.position.y, boat.position.z, boat.heading
            );
            println!(
                "Ticks: {}  Collected: {}/{}  Hash: {:016x}",
                game.tick(),
                game.collected(),
                game.trash().len(),
                game.state_hash()
            );
        }
        Commands::Scatter { samples, seed } => {
            let config = GameConfig::default().trash;
            let mut rng = StdRng::seed_from_u64(seed);
            let mut near = 0usize;
            let mut inner = 0usize;
            for _ in 0..samples {
                let (p, band) = scatter(&mut rng, &config);
                if band == Band::Near {
                    near += 1;
                }
                if p.x.abs() <= config.near_extent && p.z.abs() <= config.near_extent {
                    inner += 1;
                }
            }
            let total = samples.max(1) as f64;
            println!("Samples: {samples}  Seed: {seed}");
            println!(
                "Near band: {near} ({:.1}%)  expected {:.1}%",
                near as f64 / total * 100.0,
                config.near_probability * 100.0
            );
            println!(
                "Within +/-{:.0}: {inner} ({:.1}%)",
                config.near_extent,
                inner as f64 / total * 100.0
            );
        }
    }

    Ok(())
}
