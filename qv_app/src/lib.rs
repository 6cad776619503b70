use figment::{Figment, providers::Env};

pub trait ContextProvider<Config>: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn new(config: Config) -> impl Future<Output = Result<Self, Self::Error>>;
}

#[derive(Debug, thiserror::Error)]
pub enum AppContextError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("failed to build application context: {0}")]
    Context(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global JSON tracing subscriber.
///
/// The log level can be overridden with the `RUST_LOG` env var.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // keep the request span fields (method, path, remote address) on
        // every event, but not the whole span stack.
        .with_current_span(true)
        .with_span_list(false)
        .with_ansi(false)
        .with_target(false)
        .init();
}

/// Extracts the configuration from the raw process environment.
///
/// Variable names are lowercased, so `OPENAI_API_KEY` fills the
/// `openai_api_key` field.
///
/// # Errors
/// If a required variable is missing or a value cannot be parsed into the
/// field's type.
pub fn load_config<'a, Config: serde::Deserialize<'a>>()
-> Result<Config, figment::Error> {
    Figment::new().merge(Env::raw()).extract()
}

/// Initialize the application context with configuration from environment
/// variables. The configuration is extracted using figment.
///
/// # Returns
/// The application context built from the loaded configuration.
///
/// # Errors
/// If the configuration cannot be extracted from the environment variables
/// or if the context itself fails to build.
pub async fn create_app_context<'a, A, Config: serde::Deserialize<'a>>()
-> Result<A, AppContextError>
where
    A: ContextProvider<Config>,
{
    init_tracing();

    let config: Config = load_config()?;

    let context = A::new(config)
        .await
        .map_err(|e| AppContextError::Context(Box::new(e)))?;

    tracing::info!("application context initialized");

    Ok(context)
}
