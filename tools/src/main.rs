use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use follow_camera::{CameraTuning, FlythroughPlayer};
use sim_core::logging::{self, LogLevel};

mod scenario;

use scenario::Scenario;

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 2;
const EXIT_READ: i32 = 10;
const EXIT_SCENARIO: i32 = 11;
const EXIT_TUNING: i32 = 12;
const EXIT_FLYTHROUGH: i32 = 13;

#[derive(Parser)]
#[command(name = "tools", version, about = "Follow camera tools CLI")]
struct Cli {
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevelArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevelArg> for LogLevel {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted camera scenario headless and print a per-frame trace.
    CameraTrace(TraceArgs),
    /// Parse and validate a camera tuning file.
    TuningCheck {
        #[arg(long, value_name = "PATH")]
        tuning: PathBuf,
    },
    /// Play a recorded flythrough and print the camera positions.
    Flythrough {
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
        #[arg(long, default_value_t = 1.0 / 30.0)]
        dt: f32,
    },
}

#[derive(Parser)]
struct TraceArgs {
    #[arg(long, value_name = "PATH")]
    scenario: PathBuf,

    /// Print every Nth frame; the last frame is always printed.
    #[arg(long, default_value_t = 1)]
    every: u32,
}

fn main() {
    let cli = Cli::parse();
    if let Some(level) = cli.log_level {
        logging::set_max_level(level.into());
    }
    let exit_code = match cli.command {
        Commands::CameraTrace(args) => camera_trace(&args),
        Commands::TuningCheck { tuning } => tuning_check(&tuning),
        Commands::Flythrough { file, dt } => flythrough(&file, dt),
    };
    std::process::exit(exit_code);
}

fn read_text(path: &Path) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|err| {
        eprintln!("read {} failed: {}", path.display(), err);
        EXIT_READ
    })
}

fn camera_trace(args: &TraceArgs) -> i32 {
    if args.every == 0 {
        eprintln!("--every must be at least 1");
        return EXIT_USAGE;
    }
    let text = match read_text(&args.scenario) {
        Ok(text) => text,
        Err(code) => return code,
    };
    let scenario = match Scenario::parse_toml(&text) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("scenario parse failed: {}", err);
            return EXIT_SCENARIO;
        }
    };
    logging::info(
        "tools",
        format!(
            "camera-trace {} ({} frames at {:.4}s)",
            args.scenario.display(),
            scenario.frames,
            scenario.frame_dt
        ),
    );

    let rows = scenario.run();
    let last = rows.len().saturating_sub(1);
    for (index, row) in rows.iter().enumerate() {
        if index % args.every as usize == 0 || index == last {
            println!("{}", row.format());
        }
    }
    EXIT_SUCCESS
}

fn tuning_check(path: &Path) -> i32 {
    let text = match read_text(path) {
        Ok(text) => text,
        Err(code) => return code,
    };
    let tuning = match CameraTuning::parse_toml(&text) {
        Ok(tuning) => tuning,
        Err(err) => {
            eprintln!("tuning parse failed: {}", err);
            return EXIT_TUNING;
        }
    };
    let validation = tuning.validate();
    for warning in &validation.warnings {
        println!("warning: {}", warning);
    }
    for error in &validation.errors {
        println!("error: {}", error);
    }
    if validation.is_ok() {
        println!("tuning ok: {}", path.display());
        EXIT_SUCCESS
    } else {
        EXIT_TUNING
    }
}

fn flythrough(path: &Path, dt: f32) -> i32 {
    if !(dt.is_finite() && dt > 0.0) {
        eprintln!("--dt must be positive");
        return EXIT_USAGE;
    }
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("read {} failed: {}", path.display(), err);
            return EXIT_READ;
        }
    };
    let mut player = match FlythroughPlayer::from_bytes(&bytes) {
        Ok(player) => player,
        Err(err) => {
            eprintln!("flythrough decode failed: {}", err);
            return EXIT_FLYTHROUGH;
        }
    };
    let mut frame = 0u32;
    while let Some(pose) = player.update(dt) {
        let position = pose.translation.vector;
        println!(
            "{:>5} t={:>7.3} pos=({:>8.3}, {:>8.3}, {:>8.3})",
            frame,
            player.time(),
            position.x,
            position.y,
            position.z
        );
        frame += 1;
    }
    EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_flag_accepts_known_levels_only() {
        let cli = Cli::try_parse_from(["tools", "--log-level", "debug", "tuning-check", "--tuning", "t.toml"])
            .expect("parse");
        assert_eq!(cli.log_level.map(LogLevel::from), Some(LogLevel::Debug));
        assert!(Cli::try_parse_from(["tools", "--log-level", "loud", "tuning-check", "--tuning", "t.toml"]).is_err());
    }
}
