// Fixed-step scheduler: turns variable frame times into whole physics steps

use std::collections::VecDeque;
use std::time::Duration;

/// Step length used when none (or an unusable one) is given
pub const DEFAULT_TIMESTEP: Duration = Duration::from_micros(16_667);

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_PHYSICS_STEPS: u32 = 5;

/// Frames averaged by [`GameLoop::fps`]
const FPS_WINDOW_SIZE: usize = 60;

/// Accumulates frame time and hands out fixed physics steps.
///
/// The host measures its own frames and passes each duration to
/// [`GameLoop::begin_frame`]; the loop never reads a clock itself.
#[derive(Debug, Clone)]
pub struct GameLoop {
    timestep: Duration,
    accumulator: Duration,
    elapsed: Duration,
    frame_count: u64,
    step_count: u64,
    recent_frames: VecDeque<Duration>,
}

impl GameLoop {
    /// Create a loop stepping `timestep_secs` at a time. Zero, negative or
    /// non-finite values fall back to [`DEFAULT_TIMESTEP`].
    pub fn new(timestep_secs: f32) -> Self {
        let timestep = Duration::try_from_secs_f32(timestep_secs)
            .ok()
            .filter(|step| !step.is_zero())
            .unwrap_or_else(|| {
                log::warn!("Unusable timestep {timestep_secs}, using {DEFAULT_TIMESTEP:?}");
                DEFAULT_TIMESTEP
            });
        Self::with_timestep(timestep)
    }

    fn with_timestep(timestep: Duration) -> Self {
        Self {
            timestep,
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            step_count: 0,
            recent_frames: VecDeque::with_capacity(FPS_WINDOW_SIZE),
        }
    }

    /// Record a frame that took `frame_time` and return how many physics
    /// steps to run for it. Time beyond [`MAX_PHYSICS_STEPS`] is dropped.
    pub fn begin_frame(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;
        self.elapsed += frame_time;

        if self.recent_frames.len() == FPS_WINDOW_SIZE {
            self.recent_frames.pop_front();
        }
        self.recent_frames.push_back(frame_time);

        self.accumulator += frame_time;
        let mut steps = 0;
        while self.accumulator >= self.timestep && steps < MAX_PHYSICS_STEPS {
            self.accumulator -= self.timestep;
            steps += 1;
        }

        if self.accumulator >= self.timestep {
            log::debug!("Dropping {:?} of simulation backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        self.step_count += u64::from(steps);
        steps
    }

    /// Step length in seconds, to pass to `PhysicsWorld::update`
    pub fn timestep_secs(&self) -> f32 {
        self.timestep.as_secs_f32()
    }

    /// How far the leftover time reaches into the next step, in [0, 1)
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep.as_secs_f32()
    }

    /// Average frame rate over the last 60 frames
    pub fn fps(&self) -> f32 {
        let total: Duration = self.recent_frames.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.recent_frames.len() as f32 / total.as_secs_f32()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Physics steps handed out so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::with_timestep(DEFAULT_TIMESTEP)
    }
}
