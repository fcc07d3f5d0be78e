//! # Debounce
//!
//! Per-pin edge detection with a fixed debounce window.
//!
//! A raw level that differs from the last stable level starts a pending
//! transition. If every sample taken for the full window still shows the new
//! level, the transition is committed and reported as an edge. A sample that
//! shows the stable level again cancels the pending transition without an
//! event.
//!
//! Because only two levels exist and each commit flips the stable level, the
//! edges for a pin always alternate: pressed, released, pressed, ...

use std::time::{Duration, Instant};

use crate::gpio::PullDirection;

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

/// Direction of a committed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Moved away from the rest level
    Pressed,
    /// Moved back to the rest level
    Released,
}

/// Debounce state for one pin
#[derive(Debug, Clone)]
pub struct PinState {
    /// Most recent raw level
    current_level: bool,
    /// Last committed level
    last_stable_level: bool,
    /// When the raw level first moved away from `last_stable_level`
    last_transition: Option<Instant>,
    rest_level: bool,
    debounce: Duration,
}

impl PinState {
    /// Start at the rest level for `pull`.
    ///
    /// A button held down at startup is therefore reported as a press once
    /// the window elapses, and no release is ever reported without one.
    pub fn new(pull: PullDirection, debounce: Duration) -> Self {
        let rest_level = pull.rest_level();
        Self {
            current_level: rest_level,
            last_stable_level: rest_level,
            last_transition: None,
            rest_level,
            debounce,
        }
    }

    /// Feed one raw sample taken at `now`.
    ///
    /// Returns the committed edge, if this sample completes one.
    pub fn observe(&mut self, level: bool, now: Instant) -> Option<EdgeDirection> {
        self.current_level = level;

        if level == self.last_stable_level {
            self.last_transition = None;
            return None;
        }

        let since = *self.last_transition.get_or_insert(now);
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }

        self.last_stable_level = level;
        self.last_transition = None;

        Some(if level == self.rest_level {
            EdgeDirection::Released
        } else {
            EdgeDirection::Pressed
        })
    }

    /// Whether the committed state is "pressed"
    pub fn is_pressed(&self) -> bool {
        self.last_stable_level != self.rest_level
    }

    /// True while a level change is waiting out the window
    pub fn is_pending(&self) -> bool {
        self.last_transition.is_some()
    }

    pub fn current_level(&self) -> bool {
        self.current_level
    }

    pub fn last_stable_level(&self) -> bool {
        self.last_stable_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);

    /// Feeds `(level, hold_ms)` segments sampled every millisecond and
    /// collects the committed edges.
    fn run_segments(state: &mut PinState, start: Instant, segments: &[(bool, u64)]) -> Vec<EdgeDirection> {
        let mut edges = Vec::new();
        let mut t = 0u64;
        for &(level, hold_ms) in segments {
            for _ in 0..hold_ms {
                if let Some(edge) = state.observe(level, start + Duration::from_millis(t)) {
                    edges.push(edge);
                }
                t += 1;
            }
        }
        edges
    }

    #[test]
    fn test_starts_at_rest_level() {
        let down = PinState::new(PullDirection::Down, WINDOW);
        assert!(!down.last_stable_level());
        assert!(!down.is_pressed());

        let up = PinState::new(PullDirection::Up, WINDOW);
        assert!(up.last_stable_level());
        assert!(!up.is_pressed());
    }

    #[test]
    fn test_press_then_release() {
        // Pin 26 goes low → high → low, each level held 50ms
        let mut state = PinState::new(PullDirection::Down, WINDOW);
        let edges = run_segments(&mut state, Instant::now(), &[(false, 50), (true, 50), (false, 50)]);

        assert_eq!(edges, vec![EdgeDirection::Pressed, EdgeDirection::Released]);
        assert!(!state.is_pressed());
    }

    #[test]
    fn test_bounce_then_settle_gives_single_press() {
        // Pin 16 bounces within 5ms, then settles high for 50ms
        let mut state = PinState::new(PullDirection::Down, WINDOW);
        let edges = run_segments(
            &mut state,
            Instant::now(),
            &[(true, 1), (false, 2), (true, 2), (true, 50)],
        );

        assert_eq!(edges, vec![EdgeDirection::Pressed]);
        assert!(state.is_pressed());
    }

    #[test]
    fn test_short_glitch_discarded() {
        let mut state = PinState::new(PullDirection::Down, WINDOW);
        let edges = run_segments(&mut state, Instant::now(), &[(false, 10), (true, 19), (false, 30)]);

        assert!(edges.is_empty(), "Glitch shorter than window must not emit");
        assert!(!state.is_pending());
    }

    #[test]
    fn test_commit_exactly_at_window() {
        let start = Instant::now();
        let mut state = PinState::new(PullDirection::Down, WINDOW);

        assert_eq!(state.observe(true, start), None);
        assert!(state.is_pending());
        assert_eq!(state.observe(true, start + Duration::from_millis(19)), None);
        assert_eq!(
            state.observe(true, start + Duration::from_millis(20)),
            Some(EdgeDirection::Pressed)
        );
        assert!(!state.is_pending());
    }

    #[test]
    fn test_bounce_restarts_window() {
        let start = Instant::now();
        let mut state = PinState::new(PullDirection::Down, WINDOW);

        state.observe(true, start);
        state.observe(false, start + Duration::from_millis(15));
        // Window restarts at 16ms, so 30ms is still too early
        state.observe(true, start + Duration::from_millis(16));
        assert_eq!(state.observe(true, start + Duration::from_millis(30)), None);
        assert_eq!(
            state.observe(true, start + Duration::from_millis(36)),
            Some(EdgeDirection::Pressed)
        );
    }

    #[test]
    fn test_pull_up_polarity() {
        // Pull-up wiring: rest high, pressed low
        let mut state = PinState::new(PullDirection::Up, WINDOW);
        let edges = run_segments(&mut state, Instant::now(), &[(true, 30), (false, 30), (true, 30)]);

        assert_eq!(edges, vec![EdgeDirection::Pressed, EdgeDirection::Released]);
    }

    #[test]
    fn test_edges_alternate() {
        let mut state = PinState::new(PullDirection::Down, WINDOW);
        let mut segments = Vec::new();
        for i in 0..40u64 {
            // Mix of held and bouncing segments
            segments.push((i % 2 == 0, 3 + (i * 7) % 40));
        }
        let edges = run_segments(&mut state, Instant::now(), &segments);

        assert!(!edges.is_empty());
        assert_eq!(edges[0], EdgeDirection::Pressed, "First edge must be a press");
        for pair in edges.windows(2) {
            assert_ne!(pair[0], pair[1], "Consecutive edges must differ");
        }
    }

    #[test]
    fn test_held_level_emits_once() {
        let mut state = PinState::new(PullDirection::Down, WINDOW);
        let edges = run_segments(&mut state, Instant::now(), &[(true, 500)]);
        assert_eq!(edges, vec![EdgeDirection::Pressed]);
    }

    #[test]
    fn test_zero_window_commits_immediately() {
        let mut state = PinState::new(PullDirection::Down, Duration::ZERO);
        let now = Instant::now();
        assert_eq!(state.observe(true, now), Some(EdgeDirection::Pressed));
        assert_eq!(state.observe(false, now), Some(EdgeDirection::Released));
    }

    #[test]
    fn test_current_level_tracks_raw_samples() {
        let mut state = PinState::new(PullDirection::Down, WINDOW);
        state.observe(true, Instant::now());
        assert!(state.current_level());
        assert!(!state.last_stable_level());
    }
}
