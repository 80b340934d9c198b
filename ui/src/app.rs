use std::time::Duration;

use abstutil::prettyprint_usize;
use anyhow::Result;

use flight::wire::RouteComparisonResponse;
use flight::{ComparisonOutcome, RouteChoice, RouteError};
use model::{AnimationEngine, RouteSelector};

/// Everything a replay session owns: the animation and which route is feeding it.
pub struct App {
    pub engine: AnimationEngine,
    pub selector: RouteSelector,
}

impl App {
    pub fn new(base_interval: Duration) -> Self {
        Self {
            engine: AnimationEngine::with_base_interval(base_interval),
            selector: RouteSelector::new(),
        }
    }

    /// Malformed JSON is an error. A comparison without any route isn't; that's reported in the
    /// inner result.
    pub fn load_comparison(&mut self, raw: &str) -> Result<Result<RouteChoice, RouteError>> {
        let resp = RouteComparisonResponse::from_json_str(raw)?;
        let outcome = ComparisonOutcome::from_response(resp);
        if !outcome.reason.is_empty() {
            info!("Routing service says: {}", outcome.reason);
        }
        Ok(self.selector.on_comparison(outcome, &mut self.engine))
    }

    pub fn select(&mut self, choice: RouteChoice) {
        if let Err(err) = self.selector.select(choice, &mut self.engine) {
            warn!("{err}; staying on the current route");
        }
    }

    /// Returns false when there's nothing loaded.
    pub fn log_frame(&self) -> bool {
        let frame = match self.engine.frame() {
            Some(frame) => frame,
            None => {
                info!("No flight path to show");
                return false;
            }
        };
        info!(
            "[{}/{}] {} {:.1}%{}",
            frame.index + 1,
            frame.len,
            frame.position,
            frame.progress_percent,
            if frame.playing { " (playing)" } else { "" }
        );
        true
    }

    /// Lets time pass, logging every waypoint the drone reaches.
    pub fn wait(&mut self, mut remaining: Duration) {
        while let Some(next) = self.engine.time_until_tick() {
            if next > remaining {
                break;
            }
            self.engine.advance(next);
            remaining -= next;
            self.log_frame();
        }
        self.engine.advance(remaining);
    }

    /// Plays out whatever is left of the flight.
    pub fn finish(&mut self) {
        while let Some(next) = self.engine.time_until_tick() {
            self.engine.advance(next);
            self.log_frame();
        }
    }

    pub fn describe_route(&self) {
        let summary = match self.selector.summary() {
            Some(summary) => summary,
            None => return,
        };
        info!(
            "The {} route{}: cost {:.2}, {} moves, {} drones, {} deliveries",
            summary.choice,
            if summary.recommended {
                " (recommended)"
            } else {
                ""
            },
            summary.stats.total_cost,
            prettyprint_usize(summary.stats.total_moves),
            summary.stats.drone_count,
            summary.entities.deliveries.len()
        );

        if let Some(outcome) = self.selector.outcome() {
            if outcome.is_meaningful() {
                if let Some(pct) = outcome.cost_difference_percent() {
                    info!("Cost difference: {:+.1}%", pct);
                }
                if let Some(pct) = outcome.move_difference_percent() {
                    info!("Move difference: {:+.1}%", pct);
                }
            }
            if let Some(note) = outcome.recommendation_note() {
                debug!("Recommendation note:{note}");
            }
        }
    }
}
