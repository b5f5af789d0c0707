//! Application entry point and thread bootstrapper.

mod error;
mod input;
mod logic;
mod models;
mod render;
mod shared;
mod state;
mod system;
mod tracking;

use crate::models::settings::GameSettings;
use crate::render::ConsolePresenter;
use crate::system::bus::SystemBus;
use crate::tracking::TrackerHandle;
use std::path::PathBuf;
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("MAIN: Booting handsaber...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.toml"));
    let settings = GameSettings::load(&settings_path);

    let bus = SystemBus::new();
    let tracker = Arc::new(TrackerHandle::new(bus.tracker_evt_tx.clone()));

    tracking::start_thread(
        tracker.clone(),
        tracking::source_from_settings(&settings.tracking),
        settings.tracking.clone(),
        bus.shutdown.clone(),
    );
    input::start_thread(bus.clone());
    logic::start_thread(bus.clone(), settings, settings_path, tracker);

    ConsolePresenter::run(bus);
    log::info!("MAIN: Bye");
}
