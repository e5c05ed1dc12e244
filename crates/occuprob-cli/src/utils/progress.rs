use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use occuprob::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// A single stderr spinner whose message follows the workflow stages.
///
/// `ProgressBar` is internally reference counted, so the callback holds its
/// own handle and no lock is needed.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(None, target).with_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .expect("Failed to create spinner style template"),
        );
        Self { pb }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::StageStart { name } => {
                pb.set_message(name);
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::StageFinish | Progress::ContributionsFinish => {
                pb.disable_steady_tick();
            }
            Progress::ContributionsStart { total } => {
                pb.set_message(format!("Building {} contribution(s)", total));
            }
            Progress::ContributionBuilt { name } => {
                pb.set_message(format!("Built {} contribution", name));
            }
            Progress::Message(msg) => pb.println(format!("  {}", msg)),
        })
    }

    /// Removes the spinner once the workflow has returned.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
