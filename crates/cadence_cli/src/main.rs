//! Cadence CLI: evaluate scene files frame by frame
//!
//! ## Usage
//!
//! ```bash
//! cadence render demos/chat_interface.toml            # All frames as JSON lines
//! cadence render scene.toml --from 30 --to 60 --pretty
//! cadence inspect demos/final_render.toml             # Phases, segments, springs
//! cadence check scene.toml                            # Validate only
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Frame-by-frame animation evaluator")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the visual state of every frame in a range as JSON lines
    Render(RenderArgs),
    /// Describe phases, segments and springs of a scene file
    Inspect(FileArgs),
    /// Validate a scene file without evaluating it
    Check(FileArgs),
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Scene file (TOML)
    file: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Scene file (TOML)
    file: PathBuf,

    /// First frame to evaluate
    #[arg(long, default_value_t = 0)]
    from: u32,

    /// Frame to stop before; defaults to the scene's duration
    #[arg(long)]
    to: Option<u32>,

    /// Override the file's frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Pretty-print each frame
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render(args) => commands::render(
            &args.file,
            commands::RenderOptions {
                from: args.from,
                to: args.to,
                fps: args.fps,
                pretty: args.pretty,
            },
        ),
        Command::Inspect(args) => commands::inspect(&args.file),
        Command::Check(args) => commands::check(&args.file),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "cadence", "-vv", "render", "scene.toml", "--from", "30", "--to", "60", "--fps", "24",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.file, PathBuf::from("scene.toml"));
        assert_eq!((args.from, args.to, args.fps), (30, Some(60), Some(24)));
        assert!(args.pretty);
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["cadence", "render", "scene.toml"]).unwrap();
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!((args.from, args.to, args.fps), (0, None, None));
        assert!(!args.pretty);

        assert!(Cli::try_parse_from(["cadence", "check"]).is_err());
        assert!(matches!(
            Cli::try_parse_from(["cadence", "inspect", "a.toml"]).unwrap().command,
            Command::Inspect(_)
        ));
    }
}
