use app_state::load_app_settings;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use lambda_runtime::{run, service_fn};
use thumbnailer::context::AppContext;
use thumbnailer::handler::function_handler;
use thumbnailer::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_app_settings()?;
    init_tracing(&settings.logging)?;
    color_eyre::install()?;

    info!(
        rasterizer = %settings.rasterizer.executable.display(),
        "Starting thumbnailer."
    );
    let context = AppContext::new(&settings).await;

    run(service_fn(|event| function_handler(event, &context)))
        .await
        .map_err(|e| eyre!("Lambda runtime stopped: {e}"))
}
