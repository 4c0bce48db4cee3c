use clap::Parser;
use env_logger::Env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "midi2hydrogen")]
#[command(version = "0.1.0")]
#[command(about = "Convert MIDI files to Hydrogen songs with a Lua script", long_about = None)]
struct Args {
    /// MIDI files to convert (songs are written to stdout in order)
    midi_files: Vec<PathBuf>,

    /// Lua script defining midi_to_hydrogen(path)
    #[arg(short, long, env = "MIDI2HYDROGEN_SCRIPT", default_value = midi2hydrogen::DEFAULT_SCRIPT)]
    script: PathBuf,

    /// Exit with status 1 if any file fails to convert
    #[arg(long)]
    strict: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let converter = midi2hydrogen::Converter::new(&args.script);
    let stdout = io::stdout();
    let stderr = io::stderr();

    let summary = match midi2hydrogen::batch::run(
        &converter,
        &args.midi_files,
        &mut stdout.lock(),
        &mut stderr.lock(),
    ) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("midi2hydrogen: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Failures are reported on stderr only, unless --strict asks for the exit code too
    if args.strict && !summary.all_succeeded() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
