use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use ffmpeg_next::util::log::Level;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use vidframes::{LoadOptions, VideoFrame, load_video};

const CLI_AFTER_HELP: &str = "Examples:\n  vidframes inspect input.mp4\n  vidframes inspect input.mp4 --limit 10 --json\n  vidframes inspect input.mkv --progress --verbose\n  vidframes completions zsh > _vidframes";

#[derive(Debug, Parser)]
#[command(
    name = "vidframes",
    version,
    about = "Iterate video frames paired with the audio decoded between them",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk every frame of a video and report the audio attached to it.
    #[command(
        about = "Iterate frames and report attached audio",
        after_help = "Examples:\n  vidframes inspect input.mp4 --limit 25\n  vidframes inspect input.mp4 --json > frames.json"
    )]
    Inspect {
        /// Input video path.
        input: PathBuf,
        /// Stop after this many frames.
        #[arg(long)]
        limit: Option<u64>,
        /// Output a machine-readable JSON report.
        #[arg(long)]
        json: bool,
        /// Show a progress bar instead of per-frame lines.
        #[arg(long)]
        progress: bool,
        /// Frame-decoding threads (0 lets FFmpeg decide).
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<Level> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(Level::Quiet),
        "panic" => Some(Level::Panic),
        "fatal" => Some(Level::Fatal),
        "error" => Some(Level::Error),
        "warning" | "warn" => Some(Level::Warning),
        "info" => Some(Level::Info),
        "verbose" => Some(Level::Verbose),
        "debug" => Some(Level::Debug),
        "trace" => Some(Level::Trace),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let level = match &global.log_level {
        Some(level) => parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?,
        None if global.verbose => Level::Info,
        None => Level::Error,
    };
    ffmpeg_next::util::log::set_level(level);

    Ok(())
}

fn audio_sample_count(frame: &VideoFrame) -> usize {
    frame.audio.frames.iter().map(|audio| audio.samples()).sum()
}

fn frame_report(frame: &VideoFrame) -> Value {
    json!({
        "index": frame.index,
        "width": frame.image.width(),
        "height": frame.image.height(),
        "audio_frames": frame.audio.frames.len(),
        "audio_samples": audio_sample_count(frame),
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            input,
            limit,
            json,
            progress,
            threads,
        } => {
            apply_global_options(&cli.global)?;

            let mut options = LoadOptions::new().with_decode_threads(threads);
            if let Some(limit) = limit {
                options = options.with_limit(limit);
            }

            let mut video = load_video(&input, &options)?;

            let progress_bar = if progress {
                let pb = ProgressBar::new(video.frame_count);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                Some(pb)
            } else {
                None
            };

            let mut reports = Vec::new();
            let mut audio_codec = None;
            let mut attached_audio_frames = 0_usize;

            for record in video.frames.by_ref() {
                let frame = record?;
                attached_audio_frames += frame.audio.frames.len();
                if audio_codec.is_none() {
                    audio_codec = frame.audio.codec.as_deref().map(str::to_string);
                }

                if json {
                    reports.push(frame_report(&frame));
                } else if let Some(pb) = &progress_bar {
                    pb.inc(1);
                } else {
                    println!(
                        "{} {:>6}  {}x{}  audio: {} frame(s), {} sample(s)",
                        "frame".cyan().bold(),
                        frame.index,
                        frame.image.width(),
                        frame.image.height(),
                        frame.audio.frames.len(),
                        audio_sample_count(&frame),
                    );
                }
            }

            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }

            let trailing_audio = video.frames.take_trailing_audio();
            let emitted = video.frames.frames_emitted();

            if json {
                let payload = json!({
                    "directory": video.directory.display().to_string(),
                    "name": video.name,
                    "fps": video.frames_per_second,
                    "frame_count": video.frame_count,
                    "frames_emitted": emitted,
                    "packets_skipped": video.frames.packets_skipped(),
                    "audio_codec": audio_codec,
                    "attached_audio_frames": attached_audio_frames,
                    "trailing_audio_frames": trailing_audio.len(),
                    "frames": reports,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "{emitted} of {} advertised frame(s) at {:.2} fps from {}",
                        video.frame_count,
                        video.frames_per_second,
                        input.display(),
                    )
                    .green()
                );
                println!(
                    "audio: {} attached frame(s), {} trailing, codec {}",
                    attached_audio_frames,
                    trailing_audio.len(),
                    audio_codec.as_deref().unwrap_or("none"),
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidframes", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, parse_log_level};
    use clap::Parser;
    use ffmpeg_next::util::log::Level;

    #[test]
    fn parse_log_level_aliases() {
        assert_eq!(parse_log_level("quiet"), Some(Level::Quiet));
        assert_eq!(parse_log_level("WARN"), Some(Level::Warning));
        assert_eq!(parse_log_level("trace"), Some(Level::Trace));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn inspect_parses_limit_and_flags() {
        let cli = Cli::parse_from(["vidframes", "--verbose", "inspect", "a.mp4", "--limit", "5", "--json"]);
        assert!(cli.global.verbose);
        match cli.command {
            Commands::Inspect { input, limit, json, progress, threads } => {
                assert_eq!(input.to_str(), Some("a.mp4"));
                assert_eq!(limit, Some(5));
                assert!(json);
                assert!(!progress);
                assert_eq!(threads, 0);
            }
            Commands::Completions { .. } => panic!("expected inspect"),
        }
    }
}
