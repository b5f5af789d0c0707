//! Input thread: reads player commands from the console.

pub mod events;

use crate::input::events::GameAction;
use crate::system::bus::{SystemBus, SystemEvent};
use std::io::{self, BufRead};
use std::thread;

pub const HELP: &str = "commands: start | pause | quit | reboot | difficulty <easy|medium|hard> | theme <neon|vapor|matrix> | exit";

/// Forwards parsed commands to the logic thread. End of input exits the game.
pub fn start_thread(bus: SystemBus) {
    let spawned = thread::Builder::new()
        .name("Input Thread".to_string())
        .spawn(move || {
            log::info!("INPUT: Thread started");
            log::info!("INPUT: {}", HELP);

            // Blocking loop: one line at a time.
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::error!("INPUT: Cannot read console: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match GameAction::parse(&line) {
                    Some(action) => {
                        if let Err(e) = bus.action_tx.send(action) {
                            log::error!("INPUT: Failed to send action (Logic thread died?): {}", e);
                            return;
                        }
                        if action == GameAction::Exit {
                            break;
                        }
                    }
                    None => log::warn!("INPUT: Unknown command {:?}; {}", line.trim(), HELP),
                }
            }

            let _ = bus.sys_tx.send(SystemEvent::Quit);
            log::info!("INPUT: Thread stopped");
        });
    if let Err(e) = spawned {
        log::error!("INPUT: Failed to spawn input thread: {}", e);
    }
}
