//! Main application entry point.
//!
//! Usage: `corkboard [config.json]`

use corkboard_app::{App, AppConfig};

fn main() {
    env_logger::init();
    log::info!("Starting Corkboard");

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path),
        None => Ok(AppConfig::default()),
    };

    let result = config.and_then(|config| App::new(config).run());
    match result {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
