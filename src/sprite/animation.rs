//! Fixed-interval animation playback.

use std::time::Duration;

/// Default time each frame stays on screen.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Play state and frame clock of a sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    playing: bool,
    interval: Duration,
    elapsed: Duration,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl Animation {
    pub fn new(interval: Duration) -> Self {
        Self {
            playing: false,
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.elapsed = Duration::ZERO;
    }

    /// Stop playback; the current frame stays where it is.
    pub fn stop(&mut self) {
        self.playing = false;
        self.elapsed = Duration::ZERO;
    }

    /// Advance the clock by `dt`, returning how many frames to step.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        if !self.playing {
            return 0;
        }
        self.elapsed += dt;
        let mut steps = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            steps += 1;
        }
        steps
    }
}

/// Which sprite edits are currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub remove_frame: bool,
    pub next_frame: bool,
    pub previous_frame: bool,
    pub edit_parameters: bool,
}

impl Affordances {
    pub fn for_state(playing: bool, frame_count: usize) -> Self {
        let stepping = !playing && frame_count > 1;
        Self {
            remove_frame: stepping,
            next_frame: stepping,
            previous_frame: stepping,
            edit_parameters: !playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_only_while_playing() {
        let mut anim = Animation::default();
        assert_eq!(anim.tick(Duration::from_millis(500)), 0);

        anim.play();
        assert_eq!(anim.tick(Duration::from_millis(50)), 0);
        assert_eq!(anim.tick(Duration::from_millis(60)), 1);
        assert_eq!(anim.tick(Duration::from_millis(290)), 3);

        anim.stop();
        assert!(!anim.is_playing());
        assert_eq!(anim.tick(Duration::from_millis(100)), 0);
    }

    #[test]
    fn test_affordances() {
        let idle = Affordances::for_state(false, 3);
        assert!(idle.remove_frame && idle.next_frame && idle.edit_parameters);

        let single = Affordances::for_state(false, 1);
        assert!(!single.remove_frame);
        assert!(single.edit_parameters);

        let playing = Affordances::for_state(true, 3);
        assert_eq!(
            playing,
            Affordances {
                remove_frame: false,
                next_frame: false,
                previous_frame: false,
                edit_parameters: false,
            }
        );
    }
}
