//! # Tile Merge CLI
//!
//! Command-line frontend for the tile merge engine: play interactively in
//! the terminal, or run headless simulations with simple policies.

mod stats;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tile_merge_core::{Direction, Game, GameConfig, Status};

use stats::{MemoryStatistics, StatisticsStore, StatsRecorder};

#[derive(Parser, Debug)]
#[command(name = "tile-merge")]
#[command(author, version, about = "Play 2048 in the terminal or run simulations")]
struct Args {
    /// TOML file with engine settings; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Grid side length
    #[arg(long)]
    size: Option<usize>,

    /// Tile value that wins the game
    #[arg(long)]
    target: Option<u32>,

    /// Number of moves that can be undone
    #[arg(long)]
    undo_depth: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of episodes to run in headless mode (interactive if omitted)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show the grid after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random legal moves
    Random,
    /// Cycle through moves: Left, Down, Right, Up
    Cycle,
}

const DEFAULT_SEED: u64 = 42;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = build_config(&args)?;
    info!("using {config:?}");

    match args.episodes {
        Some(episodes) => run_headless(&args, config, episodes),
        None => run_interactive(config),
    }
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_toml(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(target) = args.target {
        config.target = target;
    }
    if let Some(depth) = args.undo_depth {
        config.undo_depth = depth;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("invalid game settings")?;
    Ok(config)
}

// =============================================================================
// Interactive mode
// =============================================================================

const BANNER: &str = "Controls: WASD or Arrow Keys | U to undo | R to restart | Q to quit\n";

fn run_interactive(config: GameConfig) -> Result<()> {
    let store = Rc::new(RefCell::new(MemoryStatistics::default()));
    let mut game = Game::new(config)?;
    game.subscribe(Box::new(StatsRecorder::new(store.clone())));
    store.borrow_mut().increment_games_played();

    let _raw = RawMode::enable();
    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    let mut message = String::new();

    redraw(&game, &message)?;

    loop {
        let bytes_read = stdin.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        message.clear();
        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(direction) => {
                let was_won = game.is_won();
                let result = game.step(direction);
                if result.reward > 0 {
                    message = format!("  +{} points!", result.reward);
                }
                if game.is_won() && !was_won {
                    message.push_str("\n  *** You reached the target! Keep going or press R ***");
                }
                if result.status == Status::Lost {
                    message.push_str(&format!(
                        "\n  *** GAME OVER ***\n  Final Score: {}\n  Max Tile: {}\n\n  \
                         Press U to undo, R to restart or Q to quit",
                        game.score(),
                        game.max_tile()
                    ));
                }
            }
            InputAction::Undo => {
                if !game.undo() {
                    message = "  Nothing to undo".to_string();
                }
            }
            InputAction::Restart => {
                game.reset();
                store.borrow_mut().increment_games_played();
            }
            InputAction::Quit => break,
            InputAction::None => continue,
        }
        redraw(&game, &message)?;
    }

    let stats = store.borrow().statistics();
    println!("\nGoodbye!");
    println!(
        "Games: {}  Won: {}  Best score: {}  Best tile: {}",
        stats.games_played, stats.games_won, stats.best_score, stats.best_tile
    );
    Ok(())
}

fn redraw(game: &Game, message: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?;
    writeln!(out, "=== 2048 ===")?;
    writeln!(out, "{BANNER}")?;
    write!(out, "{game}")?;
    if game.can_undo() {
        writeln!(out, "  (undo available: {})", game.undo_available())?;
    }
    if !message.is_empty() {
        writeln!(out, "{message}")?;
    }
    out.flush()
}

enum InputAction {
    Move(Direction),
    Undo,
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        [b'u'] | [b'U'] => InputAction::Undo,
        [b'r'] | [b'R'] => InputAction::Restart,
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc

        _ => InputAction::None,
    }
}

// =============================================================================
// Headless mode
// =============================================================================

struct Episode {
    score: u64,
    max_tile: u32,
    steps: u32,
}

fn run_headless(args: &Args, config: GameConfig, episodes: u32) -> Result<()> {
    let base_seed = config.seed.unwrap_or(DEFAULT_SEED);
    let store = Rc::new(RefCell::new(MemoryStatistics::default()));
    // Separate RNG for move selection
    let mut policy_rng = SmallRng::seed_from_u64(base_seed.wrapping_add(1000));
    let mut results = Vec::with_capacity(episodes as usize);

    for episode in 0..episodes {
        let mut game = Game::new(GameConfig {
            seed: Some(base_seed.wrapping_add(u64::from(episode))),
            ..config.clone()
        })?;
        game.subscribe(Box::new(StatsRecorder::new(store.clone())));
        store.borrow_mut().increment_games_played();

        let mut steps = 0;
        let mut cycle = 0;
        while !game.is_lost() && (args.max_steps == 0 || steps < args.max_steps) {
            let direction = match args.policy {
                Policy::Random => select_random(&game, &mut policy_rng),
                Policy::Cycle => select_cycle(&game, &mut cycle),
            };
            let Some(direction) = direction else {
                break;
            };

            game.step(direction);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {:?}", episode + 1, steps, direction);
                print!("{game}");
            }
        }

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                game.score(),
                game.max_tile(),
                steps
            );
        }
        results.push(Episode {
            score: game.score(),
            max_tile: game.max_tile(),
            steps,
        });
    }

    print_summary(args, &config, &results, store.borrow().statistics().games_won);
    Ok(())
}

fn print_summary(args: &Args, config: &GameConfig, results: &[Episode], wins: u32) {
    let episodes = results.len();
    if episodes == 0 {
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return;
    }

    let mut scores: Vec<u64> = results.iter().map(|e| e.score).collect();
    scores.sort_unstable();
    let avg_score = scores.iter().sum::<u64>() as f64 / episodes as f64;
    let median_score = if episodes % 2 == 0 {
        (scores[episodes / 2 - 1] + scores[episodes / 2]) as f64 / 2.0
    } else {
        scores[episodes / 2] as f64
    };
    let avg_steps =
        results.iter().map(|e| u64::from(e.steps)).sum::<u64>() as f64 / episodes as f64;

    let mut tile_counts: BTreeMap<u32, u32> = BTreeMap::new();
    for episode in results {
        *tile_counts.entry(episode.max_tile).or_insert(0) += 1;
    }
    let max_tile_overall = tile_counts.keys().next_back().copied().unwrap_or(0);

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={episodes}");
    println!("policy={:?}", args.policy);
    println!("seed={}", config.seed.unwrap_or(DEFAULT_SEED));
    println!("size={}", config.size);
    println!("target={}", config.target);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={avg_score:.2}");
    println!("median_score={median_score:.2}");
    println!("min_score={}", scores[0]);
    println!("max_score={}", scores[episodes - 1]);
    println!("avg_steps={avg_steps:.2}");
    println!("wins={wins}");
    println!("max_tile_overall={max_tile_overall}");
    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{tile}:{count}"))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
}

/// Select a random legal move.
fn select_random(game: &Game, rng: &mut SmallRng) -> Option<Direction> {
    let legal = game.legal_moves();
    let candidates: Vec<Direction> = Direction::ALL
        .into_iter()
        .zip(legal)
        .filter(|(_, ok)| *ok)
        .map(|(d, _)| d)
        .collect();
    candidates.choose(rng).copied()
}

/// Select moves in a cycle: Left, Down, Right, Up, skipping illegal ones.
fn select_cycle(game: &Game, cycle: &mut usize) -> Option<Direction> {
    const ORDER: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = game.legal_moves();

    for _ in 0..ORDER.len() {
        let direction = ORDER[*cycle % ORDER.len()];
        *cycle += 1;
        if legal[direction as usize] {
            return Some(direction);
        }
    }
    None
}

// =============================================================================
// Terminal raw mode
// =============================================================================

/// Puts the terminal into non-canonical, no-echo mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> Self {
        set_raw(true);
        RawMode
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        set_raw(false);
    }
}

#[cfg(unix)]
fn set_raw(enable: bool) {
    use std::os::unix::io::AsRawFd;
    let fd = io::stdin().as_raw_fd();
    // SAFETY: termios is plain data, and tcgetattr fills it before use.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return;
        }
        if enable {
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
        } else {
            termios.c_lflag |= libc::ICANON | libc::ECHO;
        }
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn set_raw(_enable: bool) {
    // Without raw mode each key needs Enter.
}
