// TuneDeck - terminal media player
// Scans the media directories once, then hands the terminal to the event loop

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tunedeck::{config::Config, ui::App, MediaScanner};

#[derive(Parser)]
#[command(name = "tunedeck")]
#[command(about = "A terminal media player for local music and video")]
struct Args {
    /// Directory to scan instead of the configured media directories
    dir: Option<PathBuf>,

    /// Keep stderr attached so decoder and driver output stays visible
    #[arg(long)]
    dev: bool,

    /// Use this config file instead of the per-user one
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "tunedeck.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tunedeck=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tunedeck: could not load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so buffered lines reach the file
    let _log_guard = match init_logging(&config.log_directory) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("tunedeck: could not set up logging in {}: {:#}", config.log_directory.display(), e);
            return ExitCode::FAILURE;
        }
    };

    info!("TuneDeck starting up");

    if let Some(dir) = args.dir {
        config.media_directories = vec![dir];
    }
    let roots = config.media_directories.clone();
    let scanner = MediaScanner::with_extensions(&config.scan.extensions);

    let catalog = match scanner.build_catalog(&roots) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Startup scan failed: {}", e);
            eprintln!("tunedeck: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Catalog ready: {} items from {} roots", catalog.len(), roots.len());

    let stderr_redirect = if args.dev {
        debug!("Dev mode: keeping stderr");
        None
    } else {
        match StderrRedirect::to_null() {
            Ok(redirect) => Some(redirect),
            Err(e) => {
                debug!("Leaving stderr attached: {}", e);
                None
            }
        }
    };

    let result = match App::new(&config, catalog, roots, scanner) {
        Ok(mut app) => app.run().await,
        Err(e) => Err(e.context("could not initialise the terminal")),
    };

    drop(stderr_redirect);

    match result {
        Ok(()) => {
            info!("TuneDeck shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal: {:#}", e);
            eprintln!("tunedeck: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Points fd 2 at /dev/null so ALSA and decoder chatter cannot draw over the UI.
/// The original stderr comes back on drop.
struct StderrRedirect {
    #[cfg(unix)]
    saved: libc::c_int,
}

impl StderrRedirect {
    #[cfg(unix)]
    fn to_null() -> Result<Self> {
        unsafe {
            let null_fd = libc::open(b"/dev/null\0".as_ptr() as *const libc::c_char, libc::O_WRONLY);
            if null_fd == -1 {
                return Err(anyhow::anyhow!("Failed to open /dev/null"));
            }

            let saved = libc::dup(libc::STDERR_FILENO);
            if saved == -1 {
                libc::close(null_fd);
                return Err(anyhow::anyhow!("Failed to back up stderr"));
            }

            if libc::dup2(null_fd, libc::STDERR_FILENO) == -1 {
                libc::close(null_fd);
                libc::close(saved);
                return Err(anyhow::anyhow!("Failed to redirect stderr"));
            }

            libc::close(null_fd);
            Ok(Self { saved })
        }
    }

    #[cfg(not(unix))]
    fn to_null() -> Result<Self> {
        Err(anyhow::anyhow!("stderr redirection is only available on unix"))
    }
}

#[cfg(unix)]
impl Drop for StderrRedirect {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved, libc::STDERR_FILENO);
            libc::close(self.saved);
        }
    }
}
