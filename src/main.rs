//! Formation Shooter headless demo
//!
//! Plays the simulation with the autopilot at a fixed 60 Hz step and logs the
//! outcome. Run with `RUST_LOG=info` to follow waves and the game-over sequence.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use formation_shooter::sim::autopilot;
use formation_shooter::sim::{GameEvent, PcgRng};
use formation_shooter::{Engine, EngineContext, GamePhase, JsonFileStore, Tuning};

const FRAME_DT: f32 = 1.0 / 60.0;

/// Run the formation shooter simulation headless
#[derive(Parser, Debug)]
#[command(name = "formation-shooter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tuning file (JSON); missing fields keep the reference values
    #[arg(short, long)]
    tuning: Option<PathBuf>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many simulated seconds
    #[arg(long, default_value = "300")]
    seconds: u32,

    /// Persist the tutorial flag here instead of in memory
    #[arg(long)]
    store: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Formation Shooter (headless) starting, seed {}", seed);

    let mut ctx = EngineContext::new(tuning).with_rng(PcgRng::seeded(seed));
    if let Some(path) = &args.store {
        ctx = ctx.with_store(JsonFileStore::open(path));
    }
    let mut engine = Engine::new(ctx);

    let frames = u64::from(args.seconds) * 60;
    for _ in 0..frames {
        let input = autopilot::drive(&engine);
        engine.update(FRAME_DT, &input);

        for event in engine.drain_events() {
            if let GameEvent::WaveStarted { wave } = event {
                log::debug!("Wave {} on the field at {:.1}s", wave, engine.clock());
            }
        }

        if engine.phase() == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Finished after {:.1}s: score {} on wave {} ({:?})",
        engine.clock(),
        engine.score(),
        engine.wave().index,
        engine.phase()
    );
    ExitCode::SUCCESS
}
