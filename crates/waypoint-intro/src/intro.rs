//! Intro controller: grid lines, title, done.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use waypoint_core::animation::{AnimationCue, RevealAnimation};
use waypoint_core::error::NavigationError;
use waypoint_core::viewport::MotionPreference;
use waypoint_timing::{
    CompletionSignal, TimedSequencer, TimerScope, arm_fail_open, arm_reduced_motion,
};

/// Where the intro animation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroStage {
    /// Nothing revealed yet.
    Hidden,
    /// Grid lines drawn.
    GridRevealed,
    /// Title revealed.
    TitleRevealed,
    /// Finished, by any path.
    Complete,
}

/// Intro timing. Step delays add up to the nominal intro length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IntroTimings {
    /// Delay before the grid lines are drawn.
    #[serde(with = "waypoint_timing::millis")]
    pub grid_delay: Duration,
    /// Delay between grid lines and title.
    #[serde(with = "waypoint_timing::millis")]
    pub title_delay: Duration,
    /// Delay between title and completion.
    #[serde(with = "waypoint_timing::millis")]
    pub settle_delay: Duration,
    /// Completion delay when reduced motion is requested.
    #[serde(with = "waypoint_timing::millis")]
    pub reduced_motion_delay: Duration,
    /// Completion is forced after this long, whatever else happened.
    #[serde(with = "waypoint_timing::millis")]
    pub safety_timeout: Duration,
}

impl Default for IntroTimings {
    fn default() -> Self {
        Self {
            grid_delay: Duration::from_millis(200),
            title_delay: Duration::from_millis(600),
            settle_delay: Duration::from_millis(700),
            reduced_motion_delay: Duration::from_millis(50),
            safety_timeout: Duration::from_secs(5),
        }
    }
}

impl IntroTimings {
    /// Nominal length of the animated intro.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.grid_delay + self.title_delay + self.settle_delay
    }
}

type FinishCallback = Arc<dyn Fn() + Send + Sync>;

/// Runs the entrance animation once and reports completion.
///
/// Every timer lives in the controller's scope; dropping the controller (or
/// calling [`teardown`](Self::teardown)) cancels whichever are still
/// pending.
pub struct IntroController {
    scope: Arc<TimerScope>,
    stage: Arc<Mutex<IntroStage>>,
    done: CompletionSignal,
}

impl IntroController {
    /// Starts the intro. `on_finished` runs exactly once, from whichever
    /// path completes first.
    pub fn start<F>(
        animation: Arc<dyn RevealAnimation>,
        motion: &dyn MotionPreference,
        timings: IntroTimings,
        on_finished: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let controller = Self {
            scope: Arc::new(TimerScope::new()),
            stage: Arc::new(Mutex::new(IntroStage::Hidden)),
            done: CompletionSignal::new(),
        };
        let finish = controller.finisher(Arc::new(on_finished));

        let safety = Arc::clone(&finish);
        if let Err(error) = arm_fail_open(
            &controller.scope,
            &controller.done,
            timings.safety_timeout,
            "intro",
            move || safety(),
        ) {
            warn!(%error, "intro safety timer unavailable; completing now");
            finish();
            return controller;
        }

        if motion.prefers_reduced_motion() {
            info!("reduced motion requested; skipping intro animation");
            let reduced = Arc::clone(&finish);
            if let Err(error) = controller
                .scope
                .schedule(timings.reduced_motion_delay, move || reduced())
            {
                warn!(%error, "cannot schedule intro completion; completing now");
                finish();
            }
            return controller;
        }

        let on_reduced = Arc::clone(&finish);
        if let Err(error) =
            arm_reduced_motion(&controller.scope, motion.subscribe(), "intro", move || {
                on_reduced();
            })
        {
            debug!(%error, "intro cannot follow motion preference changes");
        }

        let sequence = controller.sequence(&animation, timings, &finish);
        let on_failure = Arc::clone(&finish);
        if let Err(error) = sequence.start(&controller.scope, move |error| {
            warn!(%error, "intro animation failed; completing");
            on_failure();
        }) {
            warn!(%error, "cannot schedule intro sequence; completing now");
            finish();
        }
        controller
    }

    /// Current stage, for the intro view.
    #[must_use]
    pub fn stage(&self) -> IntroStage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the intro has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done.is_complete()
    }

    /// Resolves once the intro has completed.
    pub async fn finished(&self) {
        self.done.wait().await;
    }

    /// Cancels every outstanding timer. Completion is not reported.
    pub fn teardown(&self) {
        self.scope.close();
    }

    /// Wraps `on_finished` so it runs once and stands down the other paths.
    fn finisher(&self, on_finished: FinishCallback) -> FinishCallback {
        let done = self.done.clone();
        let stage = Arc::clone(&self.stage);
        let scope: Weak<TimerScope> = Arc::downgrade(&self.scope);
        Arc::new(move || {
            if done.complete() {
                *stage.lock().unwrap_or_else(PoisonError::into_inner) = IntroStage::Complete;
                debug!("intro finished");
                if let Some(scope) = scope.upgrade() {
                    scope.cancel_all();
                }
                on_finished();
            }
        })
    }

    fn sequence(
        &self,
        animation: &Arc<dyn RevealAnimation>,
        timings: IntroTimings,
        finish: &FinishCallback,
    ) -> TimedSequencer {
        let reveal = |cue: AnimationCue, next: IntroStage| {
            let animation = Arc::clone(animation);
            let stage = Arc::clone(&self.stage);
            move || -> Result<(), NavigationError> {
                animation.play(cue)?;
                let mut stage = stage.lock().unwrap_or_else(PoisonError::into_inner);
                if *stage != IntroStage::Complete {
                    *stage = next;
                }
                Ok(())
            }
        };
        let complete = Arc::clone(finish);
        TimedSequencer::new("intro")
            .then(
                timings.grid_delay,
                "grid_lines",
                reveal(AnimationCue::GridLines, IntroStage::GridRevealed),
            )
            .then(
                timings.title_delay,
                "title",
                reveal(AnimationCue::Title, IntroStage::TitleRevealed),
            )
            .then(timings.settle_delay, "complete", move || {
                complete();
                Ok(())
            })
    }
}

impl std::fmt::Debug for IntroController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntroController")
            .field("stage", &self.stage())
            .field("complete", &self.is_complete())
            .finish_non_exhaustive()
    }
}
