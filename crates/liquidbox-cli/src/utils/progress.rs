use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use liquidbox::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.reset();
                    pb_guard.set_length(total);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                }
                Progress::TaskIncrement => {
                    pb_guard.inc(1);
                }
                Progress::TaskFinish => {
                    let length = pb_guard.length().unwrap_or(0);
                    if pb_guard.position() < length {
                        pb_guard.set_position(length);
                    }
                    pb_guard.finish();
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            })
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidbox::core::statepoint::Statepoint;
    use liquidbox::engine::config::BuildConfigBuilder;
    use liquidbox::engine::progress::ProgressReporter;
    use liquidbox::workflows::system::construct_system;
    use std::thread;

    fn snapshot(handler: &CliProgressHandler) -> (String, Option<u64>, u64, bool) {
        let pb = handler.pb.lock().unwrap();
        (pb.message(), pb.length(), pb.position(), pb.is_finished())
    }

    fn pack_phase(callback: &ProgressCallback<'static>, name: &'static str, molecules: u64) {
        callback(Progress::PhaseStart { name });
        callback(Progress::TaskStart { total: molecules });
        for _ in 0..molecules {
            callback(Progress::TaskIncrement);
        }
        callback(Progress::TaskFinish);
    }

    #[test]
    fn handler_starts_hidden_and_finished() {
        let handler = CliProgressHandler::new();
        let (message, length, _, finished) = snapshot(&handler);
        assert_eq!(message, "Initializing...");
        assert_eq!(length, Some(0));
        assert!(finished);
    }

    #[test]
    fn build_phases_drive_bar_in_order() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Liquid box" });
        assert_eq!(snapshot(&handler), ("Liquid box".to_string(), Some(0), 0, false));
        callback(Progress::TaskStart { total: 30 });
        for _ in 0..12 {
            callback(Progress::TaskIncrement);
        }
        assert_eq!(snapshot(&handler), ("Liquid box".to_string(), Some(30), 12, false));
        callback(Progress::TaskFinish);
        assert_eq!(snapshot(&handler).2, 30);
        callback(Progress::PhaseFinish);
        assert_eq!(snapshot(&handler).0, "✓ Done");

        pack_phase(&callback, "Vapor box", 4);
        let (message, length, position, finished) = snapshot(&handler);
        assert_eq!(message, "Vapor box");
        assert_eq!((length, position), (Some(4), 4));
        assert!(finished);
        callback(Progress::PhaseFinish);

        callback(Progress::PhaseStart { name: "Bond constraints" });
        callback(Progress::TaskStart { total: 2 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        let (message, length, position, finished) = snapshot(&handler);
        assert_eq!(message, "✓ Done");
        assert_eq!((length, position), (Some(2), 2));
        assert!(finished);
    }

    #[test]
    fn message_after_finished_phase_replaces_label() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();
        pack_phase(&callback, "Liquid box", 3);
        callback(Progress::PhaseFinish);
        callback(Progress::Message("Vapor box skipped".to_string()));
        assert_eq!(snapshot(&handler).0, "Vapor box skipped");
    }

    #[test]
    fn callback_can_run_on_a_worker_thread() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            pack_phase(&callback, "Vapor box", 10);
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let (message, length, position, finished) = snapshot(&handler);
        assert_eq!(message, "✓ Done");
        assert_eq!((length, position), (Some(10), 10));
        assert!(finished);
    }

    #[test]
    fn system_build_leaves_bar_completed() {
        let handler = CliProgressHandler::new();
        let reporter = ProgressReporter::with_callback(handler.get_callback());
        let sp = Statepoint {
            molecule: Some("spce".to_string()),
            forcefield_name: Some("spce".to_string()),
            n_liquid: Some(20),
            n_vap: Some(3),
            box_l_liq_x: Some(2.0),
            box_l_liq_y: Some(2.0),
            box_l_liq_z: Some(2.0),
            box_l_vap: Some(4.0),
            ..Default::default()
        };
        let config = BuildConfigBuilder::new().constrain(true).build().unwrap();

        let system = construct_system(&sp, &config, &reporter).unwrap();

        assert!(system.constrained);
        let (message, length, position, finished) = snapshot(&handler);
        assert_eq!(message, "✓ Done");
        assert_eq!(length, Some(position));
        assert!(finished);
    }
}
