//! Party Arcade entry point
//!
//! The browser build is driven through `ArcadeHandle`. Natively this is a
//! headless simulator: it runs the engine at the fixed timestep without a
//! surface and prints a JSON summary.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use serde::Serialize;

    use party_arcade::audio::NullAudioSink;
    use party_arcade::consts::SIM_DT;
    use party_arcade::sim::state::{Difficulty, GameMode, GamePhase};
    use party_arcade::sim::tick::Action;
    use party_arcade::{EngineConfig, GameEngine, HostCallbacks, QualityPreset, Settings};

    #[derive(Parser, Debug)]
    #[command(name = "party-arcade", about = "Headless party arcade simulator")]
    struct Args {
        /// Game mode (runner or flappy)
        #[arg(long, default_value = "runner")]
        mode: GameMode,

        /// Difficulty tier (easy, normal, hard)
        #[arg(long, default_value = "normal")]
        difficulty: Difficulty,

        /// Session seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Frames to simulate, one tick each
        #[arg(long, default_value_t = 3600)]
        frames: u64,

        /// Let the autopilot play
        #[arg(long)]
        autopilot: bool,

        /// Restart after game over up to this many times
        #[arg(long, default_value_t = 0)]
        restarts: u32,

        /// Quality preset (low, medium, high); overrides --options settings
        #[arg(long)]
        quality: Option<QualityPreset>,

        /// Options JSON (same shape the browser constructor takes)
        #[arg(long)]
        options: Option<String>,
    }

    #[derive(Debug, Default)]
    struct Counters {
        sessions: u32,
        crashes: u32,
        score_updates: u32,
    }

    /// Counts host notifications
    struct CountingHost(Rc<RefCell<Counters>>);

    impl HostCallbacks for CountingHost {
        fn on_score_change(&mut self, _score: u64) {
            self.0.borrow_mut().score_updates += 1;
        }

        fn on_state_change(&mut self, phase: GamePhase) {
            let mut counters = self.0.borrow_mut();
            match phase {
                GamePhase::Playing => counters.sessions += 1,
                GamePhase::GameOver => counters.crashes += 1,
                GamePhase::Start => {}
            }
        }
    }

    #[derive(Debug, Serialize)]
    struct RunSummary {
        mode: GameMode,
        difficulty: Difficulty,
        seed: u64,
        frames: u64,
        score: u64,
        best: u64,
        phase: GamePhase,
        pickups: u32,
        crashes: u32,
        sessions: u32,
        score_updates: u32,
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        if args.frames == 0 {
            bail!("--frames must be at least 1");
        }

        let mut config = match &args.options {
            Some(json) => EngineConfig::from_json(json).context("parsing --options")?,
            None => EngineConfig::default(),
        };
        config.mode = args.mode;
        config.difficulty = args.difficulty;
        if args.seed.is_some() {
            config.seed = args.seed;
        }
        if let Some(quality) = args.quality {
            config.settings = Settings::from_preset(quality);
        }

        let counters = Rc::new(RefCell::new(Counters::default()));
        let mut engine = GameEngine::new(
            config,
            Box::new(NullAudioSink),
            Box::new(CountingHost(counters.clone())),
        );
        engine.set_autopilot(args.autopilot);
        let seed = engine.state().seed;
        log::info!(
            "Simulating {} frames of {} ({}) with seed {}",
            args.frames,
            args.mode.as_str(),
            args.difficulty.as_str(),
            seed
        );

        let mut restarts_left = args.restarts;
        let mut pickups = 0;
        for _ in 0..args.frames {
            engine.update(SIM_DT);
            if engine.state().phase == GamePhase::GameOver && restarts_left > 0 {
                pickups += engine.state().stats.pickups;
                restarts_left -= 1;
                engine.apply(Action::Restart);
            }
        }
        pickups += engine.state().stats.pickups;

        let counters = counters.borrow();
        let summary = RunSummary {
            mode: args.mode,
            difficulty: args.difficulty,
            seed,
            frames: args.frames,
            score: engine.state().score,
            best: engine.scores().best(),
            phase: engine.state().phase,
            pickups,
            crashes: counters.crashes,
            sessions: counters.sessions,
            score_updates: counters.score_updates,
        };
        let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
        println!("{json}");

        engine.close();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser build is driven through `ArcadeHandle`
}
