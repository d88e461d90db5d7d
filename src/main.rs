//! Plinko headless runner
//!
//! Plays an autoplay session against the simulated drop and prints the
//! ledger. The browser build uses `plinko_core::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;

    use plinko_core::engine::TickOutcome;
    use plinko_core::events::{GameEvent, StopReason};
    use plinko_core::physics::SimulatedDrop;
    use plinko_core::{Command, Credits, Game, GameConfig, PlinkoError, platform};

    /// Simulation step (ms)
    const STEP_MS: u64 = 50;
    /// Simulated fall time for one ball (ms)
    const FLIGHT_MS: u64 = 2_500;
    /// Field width the simulated board is laid out on
    const FIELD_WIDTH: f32 = 800.0;

    #[derive(Debug, Parser)]
    #[command(name = "plinko", about = "Run a headless Plinko autoplay session")]
    pub struct Args {
        /// Balls to drop (0 = until the balance runs out)
        #[arg(short = 'n', long, default_value_t = 50)]
        pub rounds: u32,

        /// Pyramid rows (10-16)
        #[arg(short, long)]
        pub rows: Option<u8>,

        /// Bet per ball, in whole units
        #[arg(short, long)]
        pub bet: Option<u64>,

        /// RNG seed (defaults to the clock)
        #[arg(short, long)]
        pub seed: Option<u64>,

        /// JSON config file
        #[arg(short, long)]
        pub config: Option<PathBuf>,
    }

    pub fn load_config(args: &Args) -> Result<GameConfig, PlinkoError> {
        let mut config = match &args.config {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    PlinkoError::InvalidConfig(format!("{}: {}", path.display(), e))
                })?;
                GameConfig::from_json(&json)?
            }
            None => GameConfig::default(),
        };
        if let Some(bet) = args.bet {
            config.default_bet = bet_from_units(bet)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn bet_from_units(units: u64) -> Result<Credits, PlinkoError> {
        Credits::checked_from_units(units)
            .ok_or_else(|| PlinkoError::InvalidConfig(format!("bet {} is too large", units)))
    }

    pub fn run(args: Args) -> Result<(), PlinkoError> {
        let config = load_config(&args)?;
        let seed = args.seed.unwrap_or_else(platform::now_ms);
        log::info!("Plinko (native) starting with seed {}", seed);

        let physics = SimulatedDrop::new(seed, FIELD_WIDTH, FLIGHT_MS);
        let mut game = Game::new(&config, physics, Vec::new(), seed)?;
        if let Some(rows) = args.rows {
            game.handle(Command::SetRowCount { rows }, 0)?;
        }
        game.handle(Command::StartAutoplay { count: args.rounds }, 0)?;

        let mut now = 0;
        let mut skipped = 0u32;
        while game.autoplay().is_running() || game.engine().in_flight_count() > 0 {
            now += STEP_MS;
            for (ball, exit_x) in game.physics_mut().advance(now) {
                game.ball_exited(ball, exit_x)?;
            }
            if game.update(now)? == TickOutcome::Skipped {
                skipped += 1;
            }
        }

        report(&game, now, skipped);
        Ok(())
    }

    fn report(game: &Game<SimulatedDrop, Vec<GameEvent>>, elapsed_ms: u64, skipped: u32) {
        let wager = game.engine().wager();
        let mut slots = vec![0u32; wager.rows().slot_count()];
        let (mut wagered, mut paid, mut balls) = (0u64, 0u64, 0u32);
        let mut stop = None;

        for event in game.events() {
            match event {
                GameEvent::RoundResult(result) => {
                    if let Some(count) = slots.get_mut(result.slot) {
                        *count += 1;
                    }
                    wagered += result.wager.cents();
                    paid += result.payout.cents();
                    balls += 1;
                }
                GameEvent::AutoplayStateChanged {
                    stop_reason: Some(reason),
                    ..
                } => stop = Some(*reason),
                _ => {}
            }
        }

        println!("rows:      {}", wager.rows());
        println!("balls:     {} ({} cooldown skips)", balls, skipped);
        println!("wagered:   {}", Credits::from_cents(wagered));
        println!("paid out:  {}", Credits::from_cents(paid));
        println!("balance:   {}", wager.balance());
        println!("elapsed:   {:.1}s", elapsed_ms as f64 / 1000.0);
        if stop == Some(StopReason::InsufficientFunds) {
            println!("stopped:   out of funds");
        }
        for (slot, (count, multiplier)) in
            slots.iter().zip(wager.rows().multipliers()).enumerate()
        {
            println!("  slot {:>2} {:>7} {}", slot, multiplier.to_string(), count);
        }
    }
}


#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let args = native::Args::parse();
    if let Err(err) = native::run(args) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is plinko_core::web::start, this is just to satisfy the compiler
}
