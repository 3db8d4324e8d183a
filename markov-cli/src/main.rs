use std::fmt::Debug;
use std::hash::Hash;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use markov_core::{io, TransitionModel, DEFAULT_CORPUS};

/// Upper bound of `--count`, every walk is kept in memory until printed.
const MAX_COUNT: u64 = 10_000;

/// How the corpus is split into symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Tokens {
    /// One symbol per character, walks are printed concatenated
    Chars,
    /// One symbol per whitespace-separated word, walks are printed space-joined
    Words,
}

#[derive(Parser, Debug)]
#[command(name = "markov", about = "Generate random walks from a first-order Markov chain")]
struct Args {
    /// Corpus text
    #[arg(short = 't', long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the corpus from a file
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Symbol granularity
    #[arg(long, value_enum, default_value_t = Tokens::Chars)]
    tokens: Tokens,

    /// Start symbol (defaults to the first symbol of the corpus)
    #[arg(short = 's', long)]
    start: Option<String>,

    /// Maximum number of symbols per walk
    #[arg(short = 'n', long, env = "MARKOV_MAX_LENGTH", default_value_t = 50)]
    max_length: usize,

    /// Random seed, makes the output reproducible
    #[arg(long, env = "MARKOV_SEED")]
    seed: Option<u64>,

    /// Number of walks to generate
    #[arg(
        short = 'c',
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_COUNT)
    )]
    count: usize,

    /// Print every symbol with its observed successors
    #[arg(long)]
    show_model: bool,

    /// Only print the generated walks
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Args {
    /// Returns the corpus text from `--file`, `--text` or the default sentence.
    fn corpus(&self) -> Result<String> {
        if let Some(path) = &self.file {
            return io::read_corpus(path)
                .with_context(|| format!("Failed to read corpus '{}'", path.display()));
        }
        Ok(self.text.clone().unwrap_or_else(|| DEFAULT_CORPUS.to_owned()))
    }

    fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Initializes logging to stderr, `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Resolves the start symbol of a character-level walk.
///
/// An explicit start must be exactly one character.
fn char_start(start: Option<&str>, model: &TransitionModel<char>) -> Result<char> {
    match start {
        None => first_symbol(model),
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => bail!("Start must be a single character, got {s:?}"),
            }
        }
    }
}

/// Resolves the start symbol of a word-level walk.
fn word_start(start: Option<&str>, model: &TransitionModel<String>) -> Result<String> {
    match start {
        None => first_symbol(model),
        Some(s) if s.trim().is_empty() => bail!("Start word cannot be empty"),
        Some(s) => Ok(s.trim().to_owned()),
    }
}

fn first_symbol<S: Clone + Eq + Hash>(model: &TransitionModel<S>) -> Result<S> {
    match model.symbols().next() {
        Some(symbol) => Ok(symbol.clone()),
        None => bail!("Corpus is empty, nothing to walk"),
    }
}

fn render_chars(symbols: &[char]) -> String {
    symbols.iter().collect()
}

fn render_words(symbols: &[String]) -> String {
    symbols.join(" ")
}

/// One line per symbol: `'a' -> 'b':2 'c':1`.
fn describe_model<S: Clone + Eq + Hash + Debug>(model: &TransitionModel<S>) -> Vec<String> {
    model
        .states()
        .map(|(symbol, state)| {
            if state.is_dead_end() {
                format!("{symbol:?} -> (dead end)")
            } else {
                let successors: Vec<String> = state
                    .transitions()
                    .map(|(next, count)| format!("{next:?}:{count}"))
                    .collect();
                format!("{symbol:?} -> {}", successors.join(" "))
            }
        })
        .collect()
}

/// Generates `args.count` walks and returns them rendered.
fn generate<S, F>(model: &TransitionModel<S>, start: &S, args: &Args, render: F) -> Result<Vec<String>>
where
    S: Clone + Eq + Hash + Debug,
    F: Fn(&[S]) -> String,
{
    let mut rng = args.make_rng();
    let walker = model.walker();

    let mut walks = Vec::new();
    for i in 0..args.count {
        let walk = walker.trace(start, args.max_length, &mut rng)?;
        debug!(walk = i + 1, length = walk.symbols.len(), end = ?walk.end, "walk generated");
        walks.push(render(&walk.symbols));
    }
    Ok(walks)
}

/// Builds every output line: header, optional model listing, then the walks.
///
/// Walks are generated first so an invalid request prints nothing.
fn report<S, F>(model: &TransitionModel<S>, start: S, args: &Args, render: F) -> Result<Vec<String>>
where
    S: Clone + Eq + Hash + Debug,
    F: Fn(&[S]) -> String,
{
    info!(symbols = model.len(), "model ready");
    let walks = generate(model, &start, args, &render)?;

    let mut lines = Vec::new();
    if !args.quiet {
        lines.push(format!(
            "Generating Markov Chain.\nMax Length: {}\nStart at: {}\n",
            args.max_length,
            render(std::slice::from_ref(&start))
        ));
    }
    if args.show_model {
        lines.extend(describe_model(model));
        lines.push(String::new());
    }
    lines.extend(walks);
    Ok(lines)
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let corpus = args.corpus()?;

    let lines = match args.tokens {
        Tokens::Chars => {
            let model = TransitionModel::from_text(&corpus);
            let start = char_start(args.start.as_deref(), &model)?;
            report(&model, start, &args, render_chars)?
        }
        Tokens::Words => {
            let model = TransitionModel::build(io::words(&corpus));
            let start = word_start(args.start.as_deref(), &model)?;
            report(&model, start, &args, render_words)?
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
