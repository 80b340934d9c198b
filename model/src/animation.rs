use std::time::Duration;

use flight::GeoPoint;
use serde::Serialize;

use crate::clock::{PendingTick, TickClock, TickToken};

/// How long one waypoint lasts at 1x speed
pub const BASE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Playback {
    /// Nothing loaded
    Empty,
    /// At the first waypoint, not playing
    Ready,
    Playing,
    Paused,
    /// Played through to the last waypoint
    Ended,
}

/// Steps a drone through its waypoints, one per tick. All state lives here and only changes
/// through the methods below; every change cancels the pending tick and schedules a fresh one if
/// still playing, so at most one tick is ever pending.
pub struct AnimationEngine {
    waypoints: Vec<GeoPoint>,
    index: usize,
    status: Playback,
    speed: f64,
    base_interval: Duration,
    clock: TickClock,
}

/// What the map draws
#[derive(Clone, Debug, PartialEq)]
pub struct Frame<'a> {
    pub position: GeoPoint,
    /// Every waypoint up to and including the current one
    pub traveled: &'a [GeoPoint],
    pub index: usize,
    pub len: usize,
    pub playing: bool,
    pub progress_percent: f64,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::with_base_interval(BASE_INTERVAL)
    }

    pub fn with_base_interval(base_interval: Duration) -> Self {
        Self {
            waypoints: Vec::new(),
            index: 0,
            status: Playback::Empty,
            speed: 1.0,
            base_interval,
            clock: TickClock::default(),
        }
    }

    /// Replaces the waypoints. Speed is kept.
    pub fn load(&mut self, waypoints: Vec<GeoPoint>) {
        self.clock.cancel();
        self.waypoints = waypoints;
        self.index = 0;
        self.status = if self.waypoints.is_empty() {
            Playback::Empty
        } else {
            Playback::Ready
        };
        debug!("Loaded {} waypoints", self.waypoints.len());
    }

    pub fn clear(&mut self) {
        self.load(Vec::new());
    }

    /// Replaying from the last waypoint starts over.
    pub fn play(&mut self) {
        match self.status {
            Playback::Empty | Playback::Playing => return,
            Playback::Ready | Playback::Paused | Playback::Ended => {}
        }
        if self.index == self.last_index() {
            self.index = 0;
        }
        self.status = Playback::Playing;
        self.schedule_tick();
    }

    pub fn pause(&mut self) {
        if self.status == Playback::Playing {
            self.clock.cancel();
            self.status = Playback::Paused;
        }
    }

    pub fn step_forward(&mut self) {
        if self.status == Playback::Empty || self.index == self.last_index() {
            return;
        }
        self.jump_to(self.index + 1);
    }

    pub fn step_backward(&mut self) {
        if self.status == Playback::Empty || self.index == 0 {
            return;
        }
        self.jump_to(self.index - 1);
    }

    /// Jumps to the waypoint nearest `percent` of the way through. Out-of-range input is clamped.
    pub fn seek(&mut self, percent: f64) {
        if self.status == Playback::Empty {
            return;
        }
        if percent.is_nan() {
            warn!("Ignoring seek to NaN");
            return;
        }
        let percent = percent.clamp(0.0, 100.0);
        let last = self.last_index();
        let target = ((percent / 100.0) * last as f64).round() as usize;
        self.jump_to(target.min(last));
    }

    pub fn reset(&mut self) {
        if self.status == Playback::Empty {
            return;
        }
        self.clock.cancel();
        self.index = 0;
        self.status = Playback::Ready;
    }

    /// Returns false and changes nothing unless the multiplier is positive and finite.
    pub fn set_speed(&mut self, multiplier: f64) -> bool {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            warn!("Ignoring invalid speed multiplier {multiplier}");
            return false;
        }
        self.speed = multiplier;
        if self.status == Playback::Playing {
            self.schedule_tick();
        }
        true
    }

    /// Moves time forward, firing every tick that comes due along the way.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.clock.now().saturating_add(dt);
        while let Some(tick) = self.clock.pop_due(until) {
            self.on_tick(tick);
        }
        self.clock.set_now(until);
    }

    /// For hosts driving the engine from a real timer. A stale token is ignored and returns false.
    pub fn fire(&mut self, token: TickToken) -> bool {
        match self.clock.take(token) {
            Some(tick) => {
                self.on_tick(tick);
                true
            }
            None => {
                debug!("Ignoring stale tick {:?}", token);
                false
            }
        }
    }

    pub fn pending_tick(&self) -> Option<TickToken> {
        self.clock.pending().map(|tick| tick.token)
    }

    pub fn time_until_tick(&self) -> Option<Duration> {
        self.clock.time_until_tick()
    }

    /// How long each waypoint lasts at the current speed
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_interval.as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
    }

    pub fn status(&self) -> Playback {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == Playback::Playing
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn waypoints(&self) -> &[GeoPoint] {
        &self.waypoints
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.waypoints.get(self.index).copied()
    }

    pub fn traveled(&self) -> &[GeoPoint] {
        if self.waypoints.is_empty() {
            return &[];
        }
        &self.waypoints[..=self.index]
    }

    /// 0 when there's at most one waypoint
    pub fn progress_percent(&self) -> f64 {
        if self.waypoints.len() <= 1 {
            return 0.0;
        }
        self.index as f64 / self.last_index() as f64 * 100.0
    }

    pub fn frame(&self) -> Option<Frame> {
        Some(Frame {
            position: self.position()?,
            traveled: self.traveled(),
            index: self.index,
            len: self.waypoints.len(),
            playing: self.is_playing(),
            progress_percent: self.progress_percent(),
        })
    }

    fn last_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    fn schedule_tick(&mut self) {
        let token = self.clock.schedule(self.tick_interval());
        trace!("Scheduled {:?} in {:?}", token, self.tick_interval());
    }

    fn jump_to(&mut self, index: usize) {
        // While playing, even a jump to the current waypoint restarts the tick interval
        if self.status == Playback::Playing {
            self.index = index;
            self.schedule_tick();
            return;
        }
        if index == self.index {
            return;
        }
        self.index = index;
        self.status = match self.status {
            Playback::Ready if index == 0 => Playback::Ready,
            Playback::Ended if index == self.last_index() => Playback::Ended,
            _ => Playback::Paused,
        };
    }

    fn on_tick(&mut self, tick: PendingTick) {
        // Only a playing engine has a pending tick
        if self.status != Playback::Playing {
            warn!("Tick {:?} fired while {:?}", tick.token, self.status);
            return;
        }
        if self.index < self.last_index() {
            self.index += 1;
        }
        if self.index == self.last_index() {
            self.status = Playback::Ended;
            debug!("Reached the last of {} waypoints", self.waypoints.len());
            return;
        }
        self.schedule_tick();
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}
