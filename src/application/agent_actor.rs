use crate::domains::agent::{AgentBrain, AgentEvent, AgentHandle, StepContext, StepOutcome};
use crate::domains::grid::WalkabilityMap;
use crate::domains::location::LocationRegistry;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

/// One running agent: its brain, ticked on a fixed interval until it
/// despawns or the simulation shuts down.
pub struct AgentActor {
    brain: AgentBrain,
    handle: Arc<AgentHandle>,
    grid: Arc<dyn WalkabilityMap>,
    locations: Arc<LocationRegistry>,
    event_sender: mpsc::Sender<AgentEvent>,
    shutdown: watch::Receiver<bool>,
    tick: Duration,
    rng: StdRng,
}

impl AgentActor {
    pub fn new(
        brain: AgentBrain,
        handle: Arc<AgentHandle>,
        grid: Arc<dyn WalkabilityMap>,
        locations: Arc<LocationRegistry>,
        event_sender: mpsc::Sender<AgentEvent>,
        shutdown: watch::Receiver<bool>,
        tick: Duration,
    ) -> Self {
        Self {
            brain,
            handle,
            grid,
            locations,
            event_sender,
            shutdown,
            tick,
            rng: StdRng::from_entropy(),
        }
    }

    pub async fn run(mut self) {
        let agent_id = self.brain.id();
        let tile = self.handle.tile(self.brain.tile_size());
        self.publish(AgentEvent::Spawned {
            agent_id,
            kind: self.brain.kind(),
            tile,
            timestamp: Utc::now(),
        })
        .await;

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();
        let mut batch = Vec::new();

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        tracing::debug!(%agent_id, "agent stopped by shutdown");
                        break;
                    }
                    continue;
                }
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            let outcome = {
                let ctx = StepContext {
                    grid: self.grid.as_ref(),
                    locations: &self.locations,
                };
                self.brain
                    .step(&ctx, &self.handle, dt, &mut self.rng, &mut batch)
            };

            for event in batch.drain(..) {
                self.publish(event).await;
            }

            if outcome == StepOutcome::Despawn {
                tracing::debug!(%agent_id, "agent despawned");
                break;
            }
        }
        // dropping the brain gives back any reservation still held
    }

    async fn publish(&self, event: AgentEvent) {
        if let Err(e) = self.event_sender.send(event).await {
            tracing::warn!(agent_id = %self.brain.id(), "event channel closed: {}", e);
        }
    }
}
