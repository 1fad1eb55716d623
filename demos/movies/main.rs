//! Movie graph server
//!
//! ```text
//! cargo run --example movies
//! cargo run --example movies -- path/to/config.yaml
//! ```
//!
//! Then open http://127.0.0.1:4000/graphql/playground. Mutations need an
//! `Authorization` header with any non-empty value.

use marquee::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "demos/movies/config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,marquee=debug")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = match EngineConfig::from_yaml_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Could not load config, using defaults");
            EngineConfig::default()
        }
    };

    tracing::info!(
        "🎬 Playground: http://{}/graphql/playground",
        config.server.bind_addr()
    );

    ServerBuilder::from_config(&config)
        .await?
        .serve(&config.server.bind_addr())
        .await
}
