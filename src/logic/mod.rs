//! Logic thread module for game state management and updates.
//!
//! This module contains the main game loop that runs at a fixed tick rate
//! and coordinates between input, tracking, audio, and rendering subsystems.

pub mod audio;
pub mod audio_thread;
pub mod clock;
pub mod haptics;

use crate::input::events::GameAction;
use crate::logic::audio::{AudioManager, AudioTransport, ClockTransport};
use crate::logic::haptics::NoHaptics;
use crate::models::settings::GameSettings;
use crate::state::{SessionController, Snapshot};
use crate::system::bus::{SystemBus, SystemEvent};
use crate::tracking::TrackerHandle;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Target ticks per second for the logic thread.
const TPS: u64 = 200;

/// Picks the audio transport: the audio thread when a track is configured,
/// a silent clock otherwise.
fn open_transport(bus: &SystemBus, settings: &GameSettings) -> Box<dyn AudioTransport> {
    match &settings.audio_path {
        Some(path) => {
            audio_thread::start_audio_thread(bus.clone());
            let mut manager = AudioManager::new(bus);
            manager.set_volume(settings.master_volume);
            manager.load_music(path);
            Box::new(manager)
        }
        None => {
            log::info!(
                "LOGIC: No audio_path set, using a silent {:.0}s clock",
                settings.track_length_secs
            );
            Box::new(ClockTransport::new(settings.track_length_secs))
        }
    }
}

fn handle_action(session: &mut SessionController, action: GameAction, bus: &SystemBus) {
    let result = match action {
        GameAction::Start => session.start_game(),
        GameAction::TogglePause => session.toggle_pause(),
        GameAction::Quit => {
            session.quit_game();
            Ok(())
        }
        GameAction::Reboot => {
            session.reboot();
            Ok(())
        }
        GameAction::SelectDifficulty(difficulty) => session.select_difficulty(difficulty),
        GameAction::SelectTheme(theme) => session.select_theme(theme),
        GameAction::Exit => {
            let _ = bus.sys_tx.send(SystemEvent::Quit);
            Ok(())
        }
    };
    if let Err(e) = result {
        log::warn!("LOGIC: {:?} rejected: {}", action, e);
    }
}

/// Offers a snapshot to the presenter. The frame only ends once it was
/// accepted, so judge events of a dropped snapshot ride along with the next.
fn publish_frame(session: &mut SessionController, bus: &SystemBus) -> bool {
    let delivered = bus.render_tx.try_send(session.create_snapshot()).is_ok();
    if delivered {
        session.frame_end();
    }
    delivered
}

/// Spawns the main logic thread that handles game state updates.
///
/// This thread runs a fixed-timestep game loop that:
/// 1. Processes player actions from the input thread
/// 2. Handles system events (quit)
/// 3. Updates the session at a fixed rate
/// 4. Sends render snapshots to the render thread
pub fn start_thread(
    bus: SystemBus,
    settings: GameSettings,
    settings_path: PathBuf,
    tracker: Arc<TrackerHandle>,
) {
    let spawned = thread::Builder::new()
        .name("Logic Thread".to_string())
        .spawn(move || {
            log::info!("LOGIC: Thread started");

            let transport = open_transport(&bus, &settings);
            let mut session = SessionController::new(
                settings,
                Some(settings_path),
                transport,
                tracker,
                bus.tracker_evt_rx.clone(),
                Box::new(NoHaptics),
            );

            let mut accumulator = Duration::new(0, 0);
            let mut last_time = Instant::now();
            let target_dt = Duration::from_secs_f64(1.0 / TPS as f64);

            loop {
                // 1. Process player actions
                while let Ok(action) = bus.action_rx.try_recv() {
                    handle_action(&mut session, action, &bus);
                }

                // 2. Handle system events
                while let Ok(sys_evt) = bus.sys_rx.try_recv() {
                    match sys_evt {
                        SystemEvent::Quit => {
                            log::info!("LOGIC: Quit received...");
                            bus.request_shutdown();
                            session.shutdown();
                            log::info!("LOGIC: Thread stopped");
                            return;
                        }
                    }
                }

                // 3. Fixed-timestep update loop
                let current_time = Instant::now();
                let delta = current_time - last_time;
                last_time = current_time;
                accumulator += delta;

                let mut updated = false;
                let mut loops = 0;
                while accumulator >= target_dt && loops < 10 {
                    session.update(target_dt.as_secs_f64());
                    accumulator -= target_dt;
                    loops += 1;
                    updated = true;
                }

                // 4. Send a render snapshot only if we updated
                if updated {
                    publish_frame(&mut session, &bus);
                }

                if loops == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        });
    if let Err(e) = spawned {
        log::error!("LOGIC: Failed to spawn logic thread: {}", e);
    }
}
