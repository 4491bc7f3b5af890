use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rootshare::{ServiceConfig, Settings, size};

#[derive(Parser, Debug)]
#[command(name = "rootshare")]
#[command(about = "Serve directories for browsing, download and upload")]
#[command(version)]
struct Cli {
    /// Roots to serve, as `[name:]path`
    #[arg(env = "ROOTSHARE_ROOTS")]
    roots: Vec<String>,

    /// Address to bind to
    #[arg(long, env = "ROOTSHARE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ROOTSHARE_PORT")]
    port: Option<u16>,

    /// Maximum upload size (e.g. 512M, 1G)
    #[arg(short, long, env = "ROOTSHARE_MAX_UPLOAD")]
    max_upload: Option<String>,

    /// Disable uploads
    #[arg(long, env = "ROOTSHARE_NO_UPLOADS")]
    no_uploads: bool,

    /// Disable downloads and listings
    #[arg(long, env = "ROOTSHARE_NO_DOWNLOADS")]
    no_downloads: bool,

    /// Show hidden files
    #[arg(long, env = "ROOTSHARE_SHOW_HIDDEN")]
    show_hidden: bool,

    /// Name unnamed roots after their directory
    #[arg(short, long, env = "ROOTSHARE_NAME_FROM_PARENT")]
    name_from_parent: bool,

    /// Serve each subdirectory of the given roots as its own root
    #[arg(short, long, env = "ROOTSHARE_SUBDIRS")]
    subdirs: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "ROOTSHARE_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "ROOTSHARE_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command line values win over the config file.
    fn apply(self, settings: &mut Settings) {
        if !self.roots.is_empty() {
            settings.roots = self.roots;
        }
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(max_upload) = self.max_upload {
            settings.max_upload = max_upload;
        }
        settings.uploads &= !self.no_uploads;
        settings.downloads &= !self.no_downloads;
        settings.show_hidden |= self.show_hidden;
        settings.name_from_parent |= self.name_from_parent;
        settings.subdirectories |= self.subdirs;
    }
}

/// `RUST_LOG` wins over the verbosity switch.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rootshare={level},tower_http={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(verbose))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config from file if provided, otherwise use defaults
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    cli.apply(&mut settings);

    let config = ServiceConfig::from_settings(&settings)?;

    for root in &config.roots {
        info!(
            "Serving {} from {} (files under {}, listing at {})",
            root.view_prefix(),
            root.path.display(),
            root.files_prefix(),
            root.api_prefix()
        );
    }
    info!("Downloads enabled: {}", config.downloads_enabled);
    info!("Uploads enabled: {}", config.uploads_enabled);
    if config.uploads_enabled {
        info!("Upload max size: {}", size::to_human(config.max_upload_bytes));
    }
    info!("Show hidden files: {}", config.show_hidden);

    rootshare::serve(config).await?;

    Ok(())
}
