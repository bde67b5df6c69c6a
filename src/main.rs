use clap::Parser;
use humansize::{DECIMAL, format_size};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use toku_reo::{
    HttpTransport, ProgressEvent, SiteClient, TransferProgress, archive_series, catalog_listing,
    site,
};
use tracing_subscriber::EnvFilter;

/// Download every episode of Tōku Reo with NFO metadata for media libraries
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Destination directory (receives tvshow.nfo and one folder per season)
    #[arg(required_unless_present = "list")]
    destination: Option<PathBuf>,

    /// Origin of the series website
    #[arg(long, default_value = site::BASE_URL)]
    base_url: String,

    /// Print the episode catalog as JSON instead of downloading
    #[arg(long)]
    list: bool,
}

/// Prints progress events to stdout
///
/// Transfer progress is printed in 10% steps per video.
#[derive(Default)]
struct ProgressPrinter {
    last_percent: u64,
}

impl ProgressPrinter {
    fn handle(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { destination } => {
                println!("Archiving {} into {}", site::SERIES_NAME, destination.display());
            }
            ProgressEvent::ShowMetadataWritten { path } => {
                println!("Wrote {}", path.display());
            }
            ProgressEvent::SeasonsFound { count } => {
                println!("Found {} season(s)", count);
            }
            ProgressEvent::EpisodesFound { count } => {
                println!("Found {} episode(s)\n", count);
            }
            ProgressEvent::DownloadingEpisode {
                index,
                total,
                season_number,
                episode_number,
                title,
            } => {
                self.last_percent = 0;
                println!(
                    "[{}/{}] S{:02}E{:02} - {}",
                    index + 1,
                    total,
                    season_number,
                    episode_number,
                    title
                );
                print!("  Progress: ");
                io::stdout().flush().ok();
            }
            ProgressEvent::TransferProgress(progress) => self.transfer(progress),
            ProgressEvent::EpisodeSkipped { .. } => {
                println!("already downloaded");
            }
            ProgressEvent::EpisodeDownloaded { bytes, .. } => {
                println!("done ({})", format_size(bytes, DECIMAL));
            }
            ProgressEvent::Complete {
                downloaded,
                skipped,
            } => {
                println!(
                    "\nFinished: {} downloaded, {} already present.",
                    downloaded, skipped
                );
            }
        }
    }

    fn transfer(&mut self, progress: TransferProgress) {
        let Some(total) = progress.total.filter(|t| *t > 0) else {
            return;
        };
        let percent = progress.written * 100 / total;
        if percent >= self.last_percent + 10 {
            print!("{}% ", percent);
            io::stdout().flush().ok();
            self.last_percent = percent;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let client = match SiteClient::new(Box::new(HttpTransport::new()), &cli.base_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.list {
        match catalog_listing(&client).map(|entries| serde_json::to_string_pretty(&entries)) {
            Ok(Ok(json)) => println!("{}", json),
            Ok(Err(e)) => {
                eprintln!("Error: failed to serialize catalog: {}", e);
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    // clap enforces the destination whenever --list is absent
    let Some(destination) = cli.destination else {
        eprintln!("Error: a destination directory is required");
        process::exit(1);
    };

    if destination.exists() && !destination.is_dir() {
        eprintln!("Error: Path is not a directory: {}", destination.display());
        process::exit(1);
    }

    let mut printer = ProgressPrinter::default();
    if let Err(e) = archive_series(&client, &destination, |event| printer.handle(event)) {
        eprintln!("\nError while archiving: {}", e);
        process::exit(1);
    }
}
