mod api;
mod config;
mod grid;
mod guard;
mod gui;
mod model;
mod remote;
mod session;
mod support;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("timetrax=info".parse().unwrap()),
        )
        .init();

    let config = config::AppConfig::from_env();
    tracing::info!("starting against {}", config.api_base_url);

    match gui::Gui::new(config) {
        Ok(gui) => gui.run(),
        Err(e) => {
            tracing::error!("failed to start: {}", e);
            std::process::exit(1);
        }
    }
}
