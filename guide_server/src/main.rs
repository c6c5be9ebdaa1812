use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use frame_sampler::FrameSampler;
use guide_server::config::Settings;
use guide_server::{api, AppState, VideoGuide};
use model_client::OllamaClient;
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
pub struct Args {
    /// TOML configuration file. Defaults are used when it does not exist.
    #[arg(long, short, env = "GUIDE_CONFIG", default_value = "guide.toml")]
    config: PathBuf,
    /// Port to listen on, overriding `server.port`.
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "warn,guide_server=info,model_client=info,frame_sampler=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(&args.config)?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    let model = OllamaClient::new(
        settings.model.base_url.as_str(),
        settings.model.model.as_str(),
        settings.model.request_timeout(),
    )?;
    info!(
        "Prepared model client for {} at {}",
        settings.model.model,
        model.base_url()
    );

    let mut sampler = FrameSampler::new(settings.sampling.max_frames)
        .with_jpeg_quality(settings.sampling.jpeg_quality);
    if let Some(dir) = &settings.sampling.temp_dir {
        sampler = sampler.with_temp_dir(dir);
    }
    info!(
        "Sampling up to {} frame(s) per upload",
        settings.sampling.max_frames
    );

    let guide = VideoGuide::new(Arc::new(model), Arc::new(sampler), settings.prompts.clone());
    api::serve(AppState::new(guide), &settings.server).await
}
