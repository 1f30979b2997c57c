use std::time::Duration;

/// One segment of the load ramp.
///
/// While a stage is active the runner interpolates the concurrent virtual user count linearly
/// from the level reached by the previous stage towards `target`, over `duration`. A stage whose
/// target equals the current level holds that level for its duration, and a zero-duration stage
/// is a step change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadStage {
    pub duration: Duration,
    pub target: usize,
}

impl LoadStage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// An ordered sequence of load stages, owned by the resolved scenario definition for the
/// lifetime of the run.
///
/// Stage order is significant, stages execute sequentially. The profile is read-only once the
/// definition has been built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadProfile {
    stages: Vec<LoadStage>,
}

impl LoadProfile {
    pub fn new(stages: Vec<LoadStage>) -> Self {
        Self { stages }
    }

    /// A profile that runs `users` virtual users for `duration`, starting immediately.
    ///
    /// This is what the `--vus`/`--duration` run-level overrides resolve to.
    pub fn constant(users: usize, duration: Duration) -> Self {
        Self {
            stages: vec![
                LoadStage::new(Duration::ZERO, users),
                LoadStage::new(duration, users),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[LoadStage] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|stage| stage.duration).sum()
    }

    /// The highest stage target in the profile.
    pub fn peak(&self) -> usize {
        self.stages
            .iter()
            .map(|stage| stage.target)
            .max()
            .unwrap_or(0)
    }

    /// The virtual user count the run should have at `elapsed` time since the run started.
    ///
    /// Interpolation is linear within each stage, chaining stages in order from an initial level
    /// of zero. Past the end of the final stage the final target is held, which is what a soak
    /// run observes.
    pub fn users_at(&self, elapsed: Duration) -> usize {
        let mut level = 0usize;
        let mut offset = Duration::ZERO;

        for stage in &self.stages {
            let end = offset + stage.duration;
            if elapsed < end {
                return interpolate(level, stage.target, elapsed - offset, stage.duration);
            }
            level = stage.target;
            offset = end;
        }

        level
    }
}

fn interpolate(from: usize, to: usize, into: Duration, duration: Duration) -> usize {
    let fraction = into.as_secs_f64() / duration.as_secs_f64();

    if to >= from {
        from + ((to - from) as f64 * fraction).round() as usize
    } else {
        from - ((from - to) as f64 * fraction).round() as usize
    }
}
