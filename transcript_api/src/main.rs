/**
 * This is the main entrypoint for the `transcript_api` service.
 *
 * The service takes a video id, checks it against the caption metadata
 * endpoint, downloads and extracts the public transcript, and asks an
 * `OpenAI` compatible chat completion endpoint for a concise summary.
 */
use structs::{AppContext, Config};

mod handlers;
#[cfg(test)]
mod mocks;
mod pipeline;
mod routes;
mod structs;
mod summarizer;
mod timedtext;
mod transcript;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let context =
        qv_app::create_app_context::<AppContext, Config>().await?;

    let addr = context.config.listen_addr();
    let app = routes::router(context.state);

    qv_axum::run_app(app, addr).await?;

    Ok(())
}
