use std::path::PathBuf;

use clap::Parser;

/// Where the original service listens when run locally.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5001";

/// Describe an image with the image2text service.
#[derive(Debug, Parser)]
#[command(name = "image2text", version)]
pub struct Config {
    /// Image to preview and submit. Omit to submit an empty form.
    pub image: Option<PathBuf>,

    /// Base URL of the service exposing `POST /process`.
    #[arg(long, env = "IMAGE2TEXT_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Config {
    /// Load `.env` if present, then parse the command line.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }
}
