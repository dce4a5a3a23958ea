use image2text::config::Config;
use image2text::terminal::TerminalView;
use image2text::{HttpTransport, Outcome, SelectedFile, UploadController};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    let transport = HttpTransport::new(&config.server)?;
    tracing::info!(endpoint = %transport.endpoint(), "image2text client ready");

    let controller = UploadController::bind(TerminalView::stdout(), transport)?;

    if let Some(path) = config.image {
        controller
            .handle_file_selected(Some(SelectedFile::from_path(path)))
            .await;
    }

    match controller.handle_submit().await {
        Outcome::Described(_) => Ok(()),
        Outcome::Blocked | Outcome::Failed(_) => std::process::exit(1),
    }
}
