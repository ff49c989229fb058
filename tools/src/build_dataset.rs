use crate::dataset_writer::write_dataset;
use bitboard::{
    DatasetAccumulator, Game, GameSample, GameSampler, GameVisitor, SampleError, SamplerConfig,
    ShortagePolicy, SkipReason,
};
use clap::{Args, ValueEnum};
use crossbeam::channel::{bounded, Receiver, Sender};
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use pgn_reader::BufferedReader;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info, warn};

static SHOULD_STOP: AtomicBool = AtomicBool::new(false);

/// Games between two progress lines in the log
const REPORT_EVERY: u64 = 10_000;

#[derive(Args)]
pub struct BuildDatasetCommand {
    /// Path or URL of a .pgn or .pgn.zst file to read games
    #[arg(long, value_name = "input")]
    input: String,

    /// Directory where win_data.npy.zst and loss_data.npy.zst are written.
    /// Each is a zstd compressed .npy array (n, 773) of u8 0/1, not an .npz archive
    #[arg(long, value_name = "output", default_value = ".")]
    output: PathBuf,

    /// ZSTD level used for the output arrays
    #[arg(long, default_value = "3")]
    compress_level: i32,

    /// Seed for the sampling decisions. A random one is picked (and logged) if missing
    #[arg(long)]
    seed: Option<u64>,

    /// Number of sampling threads
    #[arg(long, default_value = "4")]
    threads: usize,

    /// Stop after reading this many games
    #[arg(long)]
    max_games: Option<u64>,

    /// Sampler configuration
    #[clap(flatten)]
    sampler: SamplerArgs,
}

#[derive(Args)]
pub struct SamplerArgs {
    /// Plies at the start of each game that are never sampled
    #[arg(long, default_value = "5")]
    opening_plies: usize,

    /// Positions drawn from each included game
    #[arg(long, default_value = "10")]
    samples_per_game: usize,

    /// Probability of including a decisive game
    #[arg(long, default_value = "0.5")]
    inclusion_probability: f64,

    /// What to do with games that have too few non-capture positions
    #[arg(long, value_enum, default_value = "strict")]
    shortage: Shortage,
}

#[derive(ValueEnum, Clone, Copy)]
pub enum Shortage {
    /// Skip the game
    Strict,
    /// Keep the positions there are
    Clamp,
}

impl SamplerArgs {
    fn config(&self) -> SamplerConfig {
        SamplerConfig {
            opening_plies: self.opening_plies,
            samples_per_game: self.samples_per_game,
            inclusion_probability: self.inclusion_probability,
            shortage: match self.shortage {
                Shortage::Strict => ShortagePolicy::Strict,
                Shortage::Clamp => ShortagePolicy::Clamp,
            },
        }
    }
}

/// Per-run counters, shared between the reader and the workers
#[derive(Default)]
struct Counters {
    read: AtomicU64,
    malformed: AtomicU64,
    draws: AtomicU64,
    not_selected: AtomicU64,
    insufficient: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

pub fn build_dataset(cmd: BuildDatasetCommand) -> Result<(), Box<dyn Error>> {
    let config = cmd.sampler.config();
    config.validate()?;

    let seed = cmd.seed.unwrap_or_else(rand::random);
    let threads = cmd.threads.max(1);

    // raw data stream (may be compressed)
    let raw_reader: Box<dyn io::Read + Send> = if cmd.input.starts_with("http") {
        Box::new(reqwest::blocking::get(cmd.input.clone())?)
    } else {
        Box::new(File::open(&cmd.input)?)
    };

    // decompress if necessary
    let reader: Box<dyn io::Read + Send> = if cmd.input.ends_with(".zst") {
        Box::new(zstd::Decoder::new(raw_reader)?)
    } else {
        raw_reader
    };

    fs::create_dir_all(&cmd.output)?;

    info!(input = %cmd.input, output = %cmd.output.display(), "building dataset");
    info!(
        seed,
        threads,
        opening_plies = config.opening_plies,
        samples_per_game = config.samples_per_game,
        inclusion_probability = config.inclusion_probability,
        shortage = ?config.shortage,
        "sampler configured"
    );

    ctrlc::set_handler(|| {
        if SHOULD_STOP.swap(true, Ordering::Relaxed) {
            // second Ctrl-C, don't wait for the flush
            std::process::exit(1);
        }
    })?;

    let bar = ProgressBar::new_spinner().with_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [Elapsed {elapsed_precise}] [Games {human_pos} @ {per_sec}] {msg}")?,
    );

    let pipeline = Pipeline {
        config,
        seed,
        threads,
        max_games: cmd.max_games,
    };
    let counters = Counters::default();
    let (accumulator, read_result) = pipeline.run(
        BufferedReader::new(reader),
        &SHOULD_STOP,
        &counters,
        &bar,
    );
    bar.finish();

    if SHOULD_STOP.load(Ordering::Relaxed) {
        warn!("stopped early, writing what has been accumulated so far");
    }
    if let Err(ref err) = read_result {
        warn!(%err, "input failed, writing what has been accumulated so far");
    }

    let games = accumulator.games_recorded();
    let dataset = accumulator.finalize();

    for path in write_dataset(&cmd.output, &dataset, cmd.compress_level)? {
        info!(path = %path.display(), "written");
    }

    info!(
        read = Counters::get(&counters.read),
        malformed = Counters::get(&counters.malformed),
        draws = Counters::get(&counters.draws),
        not_selected = Counters::get(&counters.not_selected),
        insufficient = Counters::get(&counters.insufficient),
        included = games,
        "games"
    );
    info!(
        win = dataset.win.len(),
        loss = dataset.loss.len(),
        "Done. Accumulated vectors: {}",
        HumanCount(dataset.len() as u64)
    );

    // the partial dataset is on disk, still report the broken input
    read_result?;

    Ok(())
}

/// Everything a run needs besides its input
struct Pipeline {
    config: SamplerConfig,
    seed: u64,
    threads: usize,
    max_games: Option<u64>,
}

impl Pipeline {
    /// Reads and samples games until the input ends, fails, hits `max_games` or `stop` is set.
    /// The accumulator is returned in every case, along with the outcome of reading
    fn run<R: io::Read>(
        &self,
        game_reader: BufferedReader<R>,
        stop: &AtomicBool,
        counters: &Counters,
        bar: &ProgressBar,
    ) -> (DatasetAccumulator, io::Result<()>) {
        let accumulator = Mutex::new(DatasetAccumulator::new());
        let (game_sender, game_receiver) = bounded(8192); // keep up to X games in memory

        let read_result = thread::scope(|scope| {
            for _ in 0..self.threads.max(1) {
                let receiver = game_receiver.clone();
                let accumulator = &accumulator;
                scope.spawn(move || {
                    sample_games(receiver, self.config, self.seed, accumulator, counters)
                });
            }
            drop(game_receiver);

            read_games(
                game_reader,
                game_sender,
                self.max_games,
                stop,
                &accumulator,
                counters,
                bar,
            )
        });

        let accumulator = accumulator
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (accumulator, read_result)
    }
}

/// Reads games and hands them to the workers until the input ends or a stop is requested.
/// Dropping the sender on return lets the workers drain the queue and exit
fn read_games<R: io::Read>(
    mut game_reader: BufferedReader<R>,
    game_sender: Sender<(u64, Game)>,
    max_games: Option<u64>,
    stop: &AtomicBool,
    accumulator: &Mutex<DatasetAccumulator>,
    counters: &Counters,
    bar: &ProgressBar,
) -> io::Result<()> {
    let mut visitor = GameVisitor::new();

    while !stop.load(Ordering::Relaxed) {
        if max_games.is_some_and(|max| Counters::get(&counters.read) >= max) {
            break;
        }
        let Some(game) = game_reader.read_game(&mut visitor)? else {
            break; // end of input
        };
        let index = Counters::bump(&counters.read);
        bar.inc(1);

        match game {
            Ok(game) => {
                if game_sender.send((index, game)).is_err() {
                    // every worker is gone
                    break;
                }
            }
            Err(err) => {
                Counters::bump(&counters.malformed);
                debug!(game = index, %err, "skipping malformed game");
            }
        }

        if index % REPORT_EVERY == 0 {
            let (win, loss) = {
                let accumulator = accumulator.lock().unwrap_or_else(|p| p.into_inner());
                (accumulator.win_len(), accumulator.loss_len())
            };
            bar.set_message(format!(
                "[Win {}] [Loss {}]",
                HumanCount(win as u64),
                HumanCount(loss as u64)
            ));
            bar.suspend(|| info!("Processed {} games!", index));
        }
    }

    Ok(())
}

/// Worker loop: samples every received game and merges the result once per game
fn sample_games(
    receiver: Receiver<(u64, Game)>,
    config: SamplerConfig,
    seed: u64,
    accumulator: &Mutex<DatasetAccumulator>,
    counters: &Counters,
) {
    let mut sampler = match GameSampler::new(config, StdRng::seed_from_u64(seed)) {
        Ok(sampler) => sampler,
        Err(err) => {
            warn!(%err, "worker not started");
            return;
        }
    };

    for (index, game) in receiver {
        // each game gets its own stream, so results don't depend on scheduling
        sampler.reseed(game_seed(seed, index));

        match sampler.sample_game(&game) {
            Ok(GameSample::Sampled { outcome, vectors }) => {
                accumulator
                    .lock()
                    .unwrap_or_else(|p| p.into_inner())
                    .record(outcome, vectors);
            }
            Ok(GameSample::Skipped(SkipReason::Draw)) => {
                Counters::bump(&counters.draws);
            }
            Ok(GameSample::Skipped(SkipReason::NotSelected)) => {
                Counters::bump(&counters.not_selected);
            }
            Err(err @ SampleError::InsufficientEligiblePositions { .. }) => {
                Counters::bump(&counters.insufficient);
                debug!(game = index, %err, "skipping game");
            }
        }
    }
}

/// Seed of the random stream used for the game at `index`
fn game_seed(seed: u64, index: u64) -> u64 {
    seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
