//! Boot-text controller for the table-of-contents overlay.
//!
//! The overlay types a few boot lines before its menu accepts input; the
//! menu stays disabled until the sequence is ready.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};
use waypoint_core::animation::{AnimationCue, RevealAnimation};
use waypoint_core::viewport::MotionPreference;
use waypoint_timing::{
    CompletionSignal, TimedSequencer, TimerScope, arm_fail_open, arm_reduced_motion,
};

/// Boot-text timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootTimings {
    /// Delay before the first line.
    #[serde(with = "waypoint_timing::millis")]
    pub start_delay: Duration,
    /// Delay between lines, and after the last line.
    #[serde(with = "waypoint_timing::millis")]
    pub line_interval: Duration,
    /// The menu is enabled after this long, whatever else happened.
    #[serde(with = "waypoint_timing::millis")]
    pub safety_timeout: Duration,
}

impl Default for BootTimings {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(150),
            line_interval: Duration::from_millis(180),
            safety_timeout: Duration::from_secs(4),
        }
    }
}

/// A running (or finished) boot-text sequence.
pub struct BootSequence {
    scope: Arc<TimerScope>,
    lines: Arc<Vec<String>>,
    revealed: Arc<AtomicUsize>,
    ready: CompletionSignal,
}

impl BootSequence {
    /// Starts typing `lines`.
    pub fn start(
        lines: Vec<String>,
        animation: Arc<dyn RevealAnimation>,
        motion: &dyn MotionPreference,
        timings: BootTimings,
    ) -> Self {
        let sequence = Self {
            scope: Arc::new(TimerScope::new()),
            lines: Arc::new(lines),
            revealed: Arc::new(AtomicUsize::new(0)),
            ready: CompletionSignal::new(),
        };
        let finish = sequence.finisher();

        if sequence.lines.is_empty() || motion.prefers_reduced_motion() {
            finish();
            return sequence;
        }

        let safety = Arc::clone(&finish);
        if let Err(error) = arm_fail_open(
            &sequence.scope,
            &sequence.ready,
            timings.safety_timeout,
            "boot_text",
            move || safety(),
        ) {
            warn!(%error, "boot safety timer unavailable; enabling menu now");
            finish();
            return sequence;
        }

        let on_reduced = Arc::clone(&finish);
        if let Err(error) =
            arm_reduced_motion(&sequence.scope, motion.subscribe(), "boot_text", move || {
                on_reduced();
            })
        {
            debug!(%error, "boot text cannot follow motion preference changes");
        }

        let mut chain = TimedSequencer::new("boot_text");
        for index in 0..sequence.lines.len() {
            let delay = if index == 0 {
                timings.start_delay
            } else {
                timings.line_interval
            };
            let animation = Arc::clone(&animation);
            let revealed = Arc::clone(&sequence.revealed);
            chain = chain.then(delay, "line", move || {
                animation.play(AnimationCue::BootLine(index))?;
                revealed.fetch_max(index + 1, Ordering::SeqCst);
                Ok(())
            });
        }
        let complete = Arc::clone(&finish);
        chain = chain.then(timings.line_interval, "ready", move || {
            complete();
            Ok(())
        });

        let on_failure = Arc::clone(&finish);
        if let Err(error) = chain.start(&sequence.scope, move |_| on_failure()) {
            warn!(%error, "cannot schedule boot text; enabling menu now");
            finish();
        }
        sequence
    }

    /// Lines typed so far.
    #[must_use]
    pub fn visible_lines(&self) -> Vec<String> {
        let count = self.revealed.load(Ordering::SeqCst).min(self.lines.len());
        self.lines[..count].to_vec()
    }

    /// Whether the sequence has finished and the menu accepts input.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ready.is_complete()
    }

    /// Whether the menu should ignore input.
    #[must_use]
    pub fn disabled(&self) -> bool {
        !self.is_complete()
    }

    /// A handle that completes when the menu becomes usable.
    #[must_use]
    pub fn ready_signal(&self) -> CompletionSignal {
        self.ready.clone()
    }

    /// Cancels every outstanding timer.
    pub fn teardown(&self) {
        self.scope.close();
    }

    fn finisher(&self) -> Arc<dyn Fn() + Send + Sync> {
        let ready = self.ready.clone();
        let revealed = Arc::clone(&self.revealed);
        let total = self.lines.len();
        let scope: Weak<TimerScope> = Arc::downgrade(&self.scope);
        Arc::new(move || {
            revealed.store(total, Ordering::SeqCst);
            if ready.complete() {
                debug!(lines = total, "boot text ready");
                if let Some(scope) = scope.upgrade() {
                    scope.cancel_all();
                }
            }
        })
    }
}

impl std::fmt::Debug for BootSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootSequence")
            .field("lines", &self.lines.len())
            .field("revealed", &self.revealed.load(Ordering::SeqCst))
            .field("complete", &self.is_complete())
            .finish_non_exhaustive()
    }
}
