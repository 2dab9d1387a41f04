use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{Engine, EngineError, Estimate, MateBounds};

/// Time-boxed access to an [`Engine`].
///
/// The search runs on tokio's blocking pool so a long think never stalls the
/// tasks serving other channels.
pub struct EngineAdapter<E> {
    engine: Arc<E>,
    time_budget: Duration,
}

impl<E> Clone for EngineAdapter<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            time_budget: self.time_budget,
        }
    }
}

impl<E: Engine> EngineAdapter<E> {
    pub fn new(engine: Arc<E>, time_budget: Duration) -> Self {
        Self {
            engine,
            time_budget,
        }
    }

    pub fn mate_bounds(&self) -> MateBounds {
        self.engine.mate_bounds()
    }

    pub fn initial_position(&self) -> E::Position {
        self.engine.initial_position()
    }

    /// Best move for `position` found within the time budget.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(budget_ms = self.time_budget.as_millis() as u64)
    )]
    pub async fn best_move(
        &self,
        position: &E::Position,
        history: &[E::Position],
    ) -> Result<Estimate, EngineError> {
        let engine = Arc::clone(&self.engine);
        let position = position.clone();
        let history = history.to_vec();
        let budget = self.time_budget;

        let started = Instant::now();
        let estimate = tokio::task::spawn_blocking(move || {
            think(engine.search(&position, &history), budget)
        })
        .await
        .map_err(|e| EngineError::Join(e.to_string()))??;

        tracing::debug!(
            depth = estimate.depth,
            score = estimate.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Engine picked {}",
            estimate.mv
        );
        Ok(estimate)
    }
}

/// Pull estimates until `budget` has elapsed and return the last one.
///
/// The clock is only read between estimates, so the result is always a
/// completed iteration: the one during which the budget ran out, or the final
/// one if the sequence ends first.
pub fn think<I>(estimates: I, budget: Duration) -> Result<Estimate, EngineError>
where
    I: IntoIterator<Item = Estimate>,
{
    let start = Instant::now();
    let mut last = None;
    for estimate in estimates {
        last = Some(estimate);
        if start.elapsed() > budget {
            break;
        }
    }
    last.ok_or(EngineError::NoEstimate)
}
