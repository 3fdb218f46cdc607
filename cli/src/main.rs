use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use minegrid_core::{CellCount, Coord, Difficulty, Engine, GameConfig, Snapshot};

use command::{Command, DifficultyArg, HELP};

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Play Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset for the first game
    #[arg(short, long, value_enum, default_value_t = DifficultyArg::Easy)]
    difficulty: DifficultyArg,

    /// Custom board rows, overrides the preset
    #[arg(long, requires_all = ["cols", "mines"])]
    rows: Option<Coord>,

    /// Custom board columns
    #[arg(long, requires_all = ["rows", "mines"])]
    cols: Option<Coord>,

    /// Custom mine count
    #[arg(long, requires_all = ["rows", "cols"])]
    mines: Option<CellCount>,

    /// Force a seed instead of random, every new game advances it by one
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print snapshots as JSON instead of a grid
    #[arg(long)]
    json: bool,
}

impl Args {
    fn game_config(&self) -> anyhow::Result<GameConfig> {
        match (self.rows, self.cols, self.mines) {
            (Some(rows), Some(cols), Some(mines)) => GameConfig::new(rows, cols, mines)
                .context("Invalid custom board"),
            _ => Ok(Difficulty::from(self.difficulty).config()),
        }
    }
}

/// The collaborator side: owns the current engine and swaps it out on "new game".
struct Session {
    engine: Engine,
    config: GameConfig,
    seed: Option<u64>,
    json: bool,
}

impl Session {
    fn new(config: GameConfig, seed: Option<u64>, json: bool) -> Self {
        Self {
            engine: Self::make_engine(config, seed),
            config,
            seed,
            json,
        }
    }

    fn make_engine(config: GameConfig, seed: Option<u64>) -> Engine {
        match seed {
            Some(seed) => Engine::with_seed(config, seed),
            None => Engine::new(config),
        }
    }

    fn new_game(&mut self, difficulty: Option<Difficulty>) {
        if let Some(difficulty) = difficulty {
            self.config = difficulty.config();
        }
        self.seed = self.seed.map(|seed| seed.wrapping_add(1));
        self.engine = Self::make_engine(self.config, self.seed);
        log::info!(
            "New {}x{} game with {} mines",
            self.config.rows(),
            self.config.cols(),
            self.config.mines()
        );
    }

    fn print(&self, out: &mut impl Write, snapshot: &Snapshot) -> anyhow::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, snapshot).context("Could not encode snapshot")?;
            writeln!(out)?;
        } else {
            write!(out, "{}", render::render_snapshot(snapshot))?;
            if !snapshot.is_game_over {
                writeln!(out, "mines left: {}", self.engine.mines_left())?;
            }
        }
        Ok(())
    }

    /// Handles one input line, returns `false` once the player quits.
    fn handle(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        match Command::parse(line)? {
            Command::Act { action, row, col } => {
                let snapshot = self.engine.act(row, col, action)?;
                self.print(out, &snapshot)?;
            }
            Command::NewGame(difficulty) => {
                self.new_game(difficulty);
                self.print(out, &self.engine.snapshot())?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .init();
    log::debug!("args: {:?}", args);

    let mut session = Session::new(args.game_config()?, args.seed, args.json);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    session.print(&mut stdout, &session.engine.snapshot())?;
    writeln!(stdout, "{HELP}")?;

    for line in stdin.lock().lines() {
        let line = line.context("Could not read input")?;
        if line.trim().is_empty() {
            continue;
        }
        match session.handle(&line, &mut stdout) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => writeln!(stdout, "error: {err:#}")?,
        }
        stdout.flush()?;
    }

    Ok(())
}
