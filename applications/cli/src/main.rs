/// Kirtan Radio - site rendering and player simulation
mod simulate;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kirtan_playback::{MarkupLinks, PlayerConfig, Playlist};
use kirtan_site::{DirScheduleSource, HttpScheduleSource, ScheduleSource, SiteConfig, SiteRenderer};
use simulate::{describe, parse_script, Session};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "kirtan")]
#[command(about = "Kirtan Radio site tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill placeholders, video embeds and schedule tables into a page
    Render {
        /// Page template
        #[arg(short, long)]
        input: PathBuf,
        /// Site configuration file (defaults to ./kirtan.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory holding `<day>.txt` schedules (defaults to `config/` next to the page)
        #[arg(long, conflicts_with = "schedule_url")]
        schedule_dir: Option<PathBuf>,
        /// Site base url; schedules are fetched from `<url>/config/<day>.txt`
        #[arg(long)]
        schedule_url: Option<String>,
        /// Use a sample schedule when one cannot be loaded
        #[arg(long, env = "KIRTAN_DEBUG")]
        debug: bool,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the playlist found in a page as JSON
    Playlist {
        /// Page to scan for audio links
        #[arg(short, long)]
        input: PathBuf,
        /// Resolve relative links against this url
        #[arg(long)]
        base_url: Option<Url>,
    },
    /// Run a scripted player session and print the view after each step
    ///
    /// Commands: play, pause, toggle, next, prev, shuffle, repeat, mute,
    /// speed, rewind, forward, playlist, volume=N, seek=F, select=N,
    /// duration=S, time=S, end, fail
    Simulate {
        /// Page to scan for audio links
        #[arg(short, long)]
        input: PathBuf,
        /// Resolve relative links against this url
        #[arg(long)]
        base_url: Option<Url>,
        /// Fixed shuffle seed
        #[arg(long)]
        seed: Option<u64>,
        /// Initial volume (0-100)
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: u8,
        /// Print each view as JSON instead of a summary line
        #[arg(long)]
        json: bool,
        /// Script to run
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr keeps stdout clean for page and JSON output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kirtan_cli=info,kirtan_playback=info,kirtan_site=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            config,
            schedule_dir,
            schedule_url,
            debug,
            output,
        } => {
            let mut site = SiteConfig::load(config.as_deref())?;
            site.debug |= debug;

            let source: Box<dyn ScheduleSource> = match (schedule_url, schedule_dir) {
                (Some(url), _) => Box::new(HttpScheduleSource::new(&url)?),
                (None, Some(dir)) => Box::new(DirScheduleSource::new(dir)),
                (None, None) => Box::new(DirScheduleSource::new(default_schedule_dir(&input))),
            };

            let html = read_page(&input)?;
            let page = SiteRenderer::new(site, source).render(&html).await;

            match output {
                Some(path) => {
                    std::fs::write(&path, page)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Page written");
                }
                None => print!("{page}"),
            }
        }
        Commands::Playlist { input, base_url } => {
            let playlist = load_playlist(&input, base_url.as_ref())?;
            println!("{}", serde_json::to_string_pretty(playlist.tracks())?);
        }
        Commands::Simulate {
            input,
            base_url,
            seed,
            volume,
            json,
            commands,
        } => {
            let steps = parse_script(&commands)?;
            let playlist = load_playlist(&input, base_url.as_ref())?;
            let config = PlayerConfig {
                volume,
                shuffle_seed: seed,
                ..Default::default()
            };

            let mut session = Session::new(playlist, config);
            print_view(&session, "start", json)?;
            for (command, step) in commands.iter().zip(steps) {
                session.apply(step);
                print_view(&session, command, json)?;
            }
        }
    }

    Ok(())
}

fn read_page(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_playlist(input: &Path, base_url: Option<&Url>) -> anyhow::Result<Playlist> {
    let html = read_page(input)?;
    let playlist = Playlist::build(&MarkupLinks::new(&html), base_url);
    info!(tracks = playlist.len(), page = %input.display(), "Playlist loaded");
    Ok(playlist)
}

/// `config/` beside the page, matching where the site serves schedules from
fn default_schedule_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("config")
}

fn print_view(session: &Session, command: &str, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(session.view())?);
    } else {
        println!(
            "{command:>12}  {}",
            describe(session.view(), session.status())
        );
    }
    Ok(())
}
