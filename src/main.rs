use intcode::{
    find_max_signal, find_noun_verb, run_with_noun_verb, Process, Program, Result, Wiring,
};
use itertools::Itertools;
use std::fs::File;
use std::io::stdin;
use std::path::PathBuf;
use std::process::exit;
use structopt::StructOpt;
use tracing::{error, Level};

#[derive(Debug, StructOpt)]
#[structopt(name = "intcode", about = "Run Intcode programs and amplifier networks")]
struct Opts {
    /// Program file, read from stdin if not given
    #[structopt(short, long, parse(from_os_str))]
    program: Option<PathBuf>,

    /// Log more (-v, -vv, -vvv)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Find the phase ordering giving the strongest thruster signal
    Amplify {
        /// Loop the last amplifier's output back into the first
        #[structopt(short, long)]
        feedback: bool,

        /// Phase settings, defaults to 0-4 (serial) or 5-9 (feedback)
        #[structopt(long, use_delimiter = true, allow_hyphen_values = true)]
        phases: Vec<i64>,

        /// Only run the phase settings in the order given
        #[structopt(long)]
        exact: bool,
    },
    /// Run with the given inputs and print every output
    Diagnostic {
        #[structopt(short, long, allow_hyphen_values = true)]
        input: Vec<i64>,
    },
    /// Run with a noun and verb, or search for the pair giving a target
    Restore {
        #[structopt(long, default_value = "12")]
        noun: i64,

        #[structopt(long, default_value = "2")]
        verb: i64,

        #[structopt(long)]
        target: Option<i64>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: Option<&PathBuf>) -> Result<Program> {
    match path {
        Some(path) => Program::parse(File::open(path)?),
        None => Program::parse(stdin()),
    }
}

fn run(opts: Opts) -> Result<()> {
    let program = load(opts.program.as_ref())?;

    match opts.command {
        Command::Amplify {
            feedback,
            phases,
            exact,
        } => {
            let wiring = if feedback {
                Wiring::Feedback
            } else {
                Wiring::Serial
            };
            let phases = if !phases.is_empty() {
                phases
            } else if feedback {
                (5..10).collect()
            } else {
                (0..5).collect()
            };

            if exact {
                println!("{}", wiring.signal(&program, &phases)?);
            } else {
                let best = find_max_signal(&program, &phases, wiring)?;
                println!("{} ({})", best.signal, best.phase_settings.iter().join(","));
            }
        }
        Command::Diagnostic { input } => {
            let mut process = Process::with_inputs("Diagnostic", &program, input);
            for value in process.run()? {
                println!("{}", value);
            }
        }
        Command::Restore { noun, verb, target } => match target {
            Some(target) => match find_noun_verb(&program, target)? {
                Some((noun, verb)) => println!("{}", 100 * noun + verb),
                None => println!("Not possible"),
            },
            None => println!("{}", run_with_noun_verb(&program, noun, verb)?),
        },
    }

    Ok(())
}

fn main() {
    let opts = Opts::from_args();
    init_logging(opts.verbose);

    if let Err(err) = run(opts) {
        error!("{}", err);
        exit(1);
    }
}
