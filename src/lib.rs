pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;

mod state;

pub use state::AppState;

pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
