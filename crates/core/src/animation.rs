//! View-rect animation: an explicit Idle/Animating state machine whose
//! progress is advanced by the host's frame clock.

use std::time::Duration;

use icicle_protocol::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Slow start, fast middle, slow finish.
    #[default]
    InOutCubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    start: Rect,
    elapsed: Duration,
    duration: Duration,
}

impl Tween {
    /// Raw (un-eased) progress in `[0, 1]`.
    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Animating(Tween),
}

/// Animates the data-space rect the view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewAnimator {
    current: Rect,
    end: Rect,
    easing: Easing,
    state: State,
}

impl ViewAnimator {
    pub fn new(rect: Rect) -> Self {
        Self {
            current: rect,
            end: rect,
            easing: Easing::default(),
            state: State::Idle,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Jump to `rect` with no transition.
    pub fn set_instant(&mut self, rect: Rect) {
        self.current = rect;
        self.end = rect;
        self.state = State::Idle;
    }

    /// Start moving toward `target`. A transition already under way is
    /// replaced, starting again from wherever the view is now.
    pub fn transition_to(&mut self, target: Rect, duration: Duration) {
        self.end = target;
        self.state = State::Animating(Tween {
            start: self.current,
            elapsed: Duration::ZERO,
            duration,
        });
    }

    /// Move the destination after the underlying data changed. A running
    /// transition keeps its timing and bends toward the new end; an idle
    /// view snaps.
    pub fn retarget(&mut self, target: Rect) {
        match &self.state {
            State::Idle => self.set_instant(target),
            State::Animating(tween) => {
                self.end = target;
                self.current = tween.start.lerp(&self.end, self.easing.apply(tween.progress()));
            }
        }
    }

    /// Advance the clock by `dt`. Returns `true` if the rect moved and the
    /// view needs repainting.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let State::Animating(mut tween) = self.state else {
            return false;
        };

        tween.elapsed = tween.elapsed.saturating_add(dt);
        let t = tween.progress();
        if t >= 1.0 {
            self.current = self.end;
            self.state = State::Idle;
        } else {
            self.current = tween.start.lerp(&self.end, self.easing.apply(t));
            self.state = State::Animating(tween);
        }
        true
    }

    pub fn current(&self) -> Rect {
        self.current
    }

    pub fn end(&self) -> Rect {
        self.end
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, State::Animating(_))
    }

    /// Un-eased progress of the running transition; `1.0` when idle.
    pub fn progress(&self) -> f64 {
        match &self.state {
            State::Idle => 1.0,
            State::Animating(tween) => tween.progress(),
        }
    }
}
