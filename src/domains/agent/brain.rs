//! Per-agent decision loop.
//!
//! An agent that is following a path only moves. Once idle, a periodic
//! decision timer picks the next goal in fixed priority order:
//!
//! 1. exit, once every habitat has been seen or the stay limit is reached;
//!    if the exit cannot be reached the agent wanders instead
//! 2. a shop, when hunger is above the threshold
//! 3. an unvisited habitat
//! 4. any shop
//! 5. a random walkable tile
//!
//! Locations are claimed with a reservation *before* path finding; a failed
//! search drops the reservation in the same call.

use super::events::AgentEvent;
use super::handle::AgentHandle;
use super::types::{AgentId, AgentKind, BehaviorState};
use crate::config::Config;
use crate::domains::admission::Reservation;
use crate::domains::grid::{GridSnapshot, TilePos, WalkabilityMap};
use crate::domains::location::{Location, LocationId, LocationRegistry};
use crate::domains::movement::MovementController;
use crate::domains::path_planning::{Path, PathFinder};
use chrono::Utc;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Tunables for one agent, derived from [`Config`].
#[derive(Debug, Clone)]
pub struct BrainSettings {
    pub tile_size: f32,
    pub speed: f32,
    pub decision_interval: f32,
    pub visit_dwell: f32,
    pub hunger_threshold: f32,
    pub hunger_rate: f32,
    pub random_walk_attempts: usize,
    pub max_stay: f32,
    pub exit: TilePos,
}

impl BrainSettings {
    pub fn from_config(config: &Config, kind: AgentKind) -> Self {
        let sim = &config.simulation;
        Self {
            tile_size: config.grid.tile_size,
            speed: match kind {
                AgentKind::Visitor => config.agents.visitor_speed,
                AgentKind::Zookeeper => config.agents.zookeeper_speed,
            },
            decision_interval: sim.decision_interval_secs,
            visit_dwell: sim.visit_dwell_secs,
            hunger_threshold: sim.hunger_threshold,
            hunger_rate: match kind {
                AgentKind::Visitor => sim.hunger_rate_per_sec,
                AgentKind::Zookeeper => 0.0,
            },
            random_walk_attempts: sim.random_walk_attempts,
            max_stay: sim.max_visitor_stay_secs,
            exit: sim.exit,
        }
    }
}

/// What the agent is currently committed to.
#[derive(Debug)]
enum Intent {
    Idle,
    Wander,
    Visit {
        location: LocationId,
        reservation: Reservation,
        hunger_relief: f32,
    },
    Dwell {
        location: LocationId,
        reservation: Reservation,
        remaining: f32,
        hunger_relief: f32,
    },
    Exit,
}

impl Intent {
    fn state(&self) -> BehaviorState {
        match self {
            Intent::Idle => BehaviorState::Idle,
            Intent::Wander => BehaviorState::RandomWalk,
            Intent::Visit { .. } => BehaviorState::EnRoute,
            Intent::Dwell { .. } => BehaviorState::Visiting,
            Intent::Exit => BehaviorState::Exiting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Despawn,
}

/// Shared world state an agent reads while stepping.
pub struct StepContext<'a> {
    pub grid: &'a dyn WalkabilityMap,
    pub locations: &'a LocationRegistry,
}

/// Private state of one agent's loop. Owned by exactly one task.
pub struct AgentBrain {
    id: AgentId,
    kind: AgentKind,
    settings: BrainSettings,
    finder: PathFinder,
    movement: MovementController,
    path: Option<Path>,
    waypoint_index: usize,
    decision_timer: f32,
    intent: Intent,
    hunger: f32,
    time_alive: f32,
    visited: HashSet<LocationId>,
    last_tended: HashMap<LocationId, f32>,
}

impl AgentBrain {
    pub fn new(id: AgentId, kind: AgentKind, settings: BrainSettings) -> Self {
        let movement = MovementController::new(settings.tile_size);
        Self {
            id,
            kind,
            // first decision fires on the first tick
            decision_timer: settings.decision_interval,
            settings,
            finder: PathFinder::new(),
            movement,
            path: None,
            waypoint_index: 0,
            intent: Intent::Idle,
            hunger: 0.0,
            time_alive: 0.0,
            visited: HashSet::new(),
            last_tended: HashMap::new(),
        }
    }

    pub fn with_hunger(mut self, hunger: f32) -> Self {
        self.hunger = hunger.max(0.0);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn tile_size(&self) -> f32 {
        self.settings.tile_size
    }

    pub fn hunger(&self) -> f32 {
        self.hunger
    }

    pub fn state(&self) -> BehaviorState {
        self.intent.state()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    pub fn has_visited(&self, location: LocationId) -> bool {
        self.visited.contains(&location)
    }

    /// Location currently reserved, whether en route or dwelling.
    pub fn reserved_location(&self) -> Option<LocationId> {
        match &self.intent {
            Intent::Visit { location, .. } | Intent::Dwell { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// Advance this agent by `dt` seconds.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        ctx: &StepContext<'_>,
        handle: &AgentHandle,
        dt: f32,
        rng: &mut R,
        events: &mut Vec<AgentEvent>,
    ) -> StepOutcome {
        let dt = dt.max(0.0);
        self.time_alive += dt;
        self.hunger += self.settings.hunger_rate * dt;

        if let Some(path) = &self.path {
            let step = self.movement.advance(
                path,
                self.waypoint_index,
                handle.position(),
                self.settings.speed,
                dt,
            );
            handle.set_position(step.position);
            self.waypoint_index = step.waypoint_index;
            if !step.arrived {
                return StepOutcome::Continue;
            }
            self.path = None;
            self.waypoint_index = 0;
            handle.set_path(None);
            return self.on_path_complete(handle, events);
        }

        if let Intent::Dwell { remaining, .. } = &mut self.intent {
            *remaining -= dt;
            if *remaining > 0.0 {
                return StepOutcome::Continue;
            }
            self.finish_visit(handle, events);
        }

        self.decision_timer += dt;
        if self.decision_timer >= self.settings.decision_interval {
            self.decision_timer = 0.0;
            self.decide(ctx, handle, rng, events);
        }
        StepOutcome::Continue
    }

    fn on_path_complete(&mut self, handle: &AgentHandle, events: &mut Vec<AgentEvent>) -> StepOutcome {
        match std::mem::replace(&mut self.intent, Intent::Idle) {
            Intent::Visit {
                location,
                reservation,
                hunger_relief,
            } => {
                events.push(AgentEvent::VisitStarted {
                    agent_id: self.id,
                    location_id: location,
                    timestamp: Utc::now(),
                });
                self.intent = Intent::Dwell {
                    location,
                    reservation,
                    remaining: self.settings.visit_dwell,
                    hunger_relief,
                };
            }
            Intent::Exit => {
                self.intent = Intent::Exit;
                handle.set_state(BehaviorState::Despawned);
                events.push(AgentEvent::Despawned {
                    agent_id: self.id,
                    timestamp: Utc::now(),
                });
                return StepOutcome::Despawn;
            }
            _ => self.intent = Intent::Idle,
        }
        handle.set_state(self.intent.state());
        StepOutcome::Continue
    }

    fn finish_visit(&mut self, handle: &AgentHandle, events: &mut Vec<AgentEvent>) {
        if let Intent::Dwell {
            location,
            reservation,
            hunger_relief,
            ..
        } = std::mem::replace(&mut self.intent, Intent::Idle)
        {
            self.visited.insert(location);
            self.last_tended.insert(location, self.time_alive);
            self.hunger = (self.hunger - hunger_relief).max(0.0);
            reservation.release();
            events.push(AgentEvent::ReservationReleased {
                agent_id: self.id,
                location_id: location,
                timestamp: Utc::now(),
            });
            events.push(AgentEvent::VisitEnded {
                agent_id: self.id,
                location_id: location,
                timestamp: Utc::now(),
            });
            // decide again right away
            self.decision_timer = self.settings.decision_interval;
        }
        handle.set_state(self.intent.state());
    }

    fn decide<R: Rng + ?Sized>(
        &mut self,
        ctx: &StepContext<'_>,
        handle: &AgentHandle,
        rng: &mut R,
        events: &mut Vec<AgentEvent>,
    ) {
        let snapshot = ctx.grid.snapshot();
        let here = handle.tile(self.settings.tile_size);

        let chosen = match self.kind {
            AgentKind::Visitor => self.decide_visitor(ctx, &snapshot, here, events),
            AgentKind::Zookeeper => self.decide_zookeeper(ctx, &snapshot, here, events),
        };
        if !chosen {
            self.random_walk(&snapshot, here, rng, events);
        }
        handle.set_path(self.path.clone());
        handle.set_state(self.intent.state());
    }

    fn decide_visitor(
        &mut self,
        ctx: &StepContext<'_>,
        snapshot: &GridSnapshot,
        here: TilePos,
        events: &mut Vec<AgentEvent>,
    ) -> bool {
        let habitats = ctx.locations.habitats();

        if self.wants_to_leave(&habitats) {
            // an unreachable exit falls back to wandering, retried next tick
            return self.try_exit(snapshot, here, events);
        }

        let mut shops = ctx.locations.shops();
        shops.sort_by_key(|s| here.manhattan(&s.entrance));
        let mut tried = HashSet::new();

        if self.hunger > self.settings.hunger_threshold {
            let food: Vec<Arc<Location>> = shops
                .iter()
                .filter(|s| s.kind.params().hunger_relief > 0.0)
                .cloned()
                .collect();
            if self.try_any(&food, snapshot, here, events, &mut tried) {
                return true;
            }
        }

        let mut unvisited: Vec<Arc<Location>> = habitats
            .into_iter()
            .filter(|h| !self.visited.contains(&h.id))
            .collect();
        unvisited.sort_by_key(|h| here.manhattan(&h.entrance));
        if self.try_any(&unvisited, snapshot, here, events, &mut tried) {
            return true;
        }

        self.try_any(&shops, snapshot, here, events, &mut tried)
    }

    fn decide_zookeeper(
        &mut self,
        ctx: &StepContext<'_>,
        snapshot: &GridSnapshot,
        here: TilePos,
        events: &mut Vec<AgentEvent>,
    ) -> bool {
        let mut habitats = ctx.locations.habitats();
        // never-tended first, then the longest since last tended
        habitats.sort_by(|a, b| {
            let ta = self.last_tended.get(&a.id).copied().unwrap_or(f32::NEG_INFINITY);
            let tb = self.last_tended.get(&b.id).copied().unwrap_or(f32::NEG_INFINITY);
            ta.total_cmp(&tb)
        });
        self.try_any(&habitats, snapshot, here, events, &mut HashSet::new())
    }

    fn wants_to_leave(&self, habitats: &[Arc<Location>]) -> bool {
        let seen_everything = !habitats.is_empty() && habitats.iter().all(|h| self.visited.contains(&h.id));
        seen_everything || self.time_alive >= self.settings.max_stay
    }

    /// Locations already in `tried` failed earlier in this decision and are skipped.
    fn try_any(
        &mut self,
        candidates: &[Arc<Location>],
        snapshot: &GridSnapshot,
        here: TilePos,
        events: &mut Vec<AgentEvent>,
        tried: &mut HashSet<LocationId>,
    ) -> bool {
        candidates
            .iter()
            .filter(|location| tried.insert(location.id))
            .any(|location| self.try_visit(location, snapshot, here, events))
    }

    /// Reserve, then path. A missing path gives the slot straight back.
    fn try_visit(
        &mut self,
        location: &Location,
        snapshot: &GridSnapshot,
        here: TilePos,
        events: &mut Vec<AgentEvent>,
    ) -> bool {
        let Some(reservation) = location.admission.try_reserve(self.id) else {
            return false;
        };
        events.push(AgentEvent::ReservationAcquired {
            agent_id: self.id,
            location_id: location.id,
            timestamp: Utc::now(),
        });

        match self.finder.find_path(snapshot, here, location.entrance) {
            Some(path) => {
                self.assign_path(path, location.entrance, events);
                self.intent = Intent::Visit {
                    location: location.id,
                    reservation,
                    hunger_relief: location.kind.params().hunger_relief,
                };
                true
            }
            None => {
                reservation.release();
                events.push(AgentEvent::PathNotFound {
                    agent_id: self.id,
                    goal: location.entrance,
                    timestamp: Utc::now(),
                });
                events.push(AgentEvent::ReservationReleased {
                    agent_id: self.id,
                    location_id: location.id,
                    timestamp: Utc::now(),
                });
                false
            }
        }
    }

    fn try_exit(&mut self, snapshot: &GridSnapshot, here: TilePos, events: &mut Vec<AgentEvent>) -> bool {
        let exit = self.settings.exit;
        match self.finder.find_path(snapshot, here, exit) {
            Some(path) => {
                self.assign_path(path, exit, events);
                self.intent = Intent::Exit;
                events.push(AgentEvent::ExitCommitted {
                    agent_id: self.id,
                    exit,
                    timestamp: Utc::now(),
                });
                true
            }
            None => {
                events.push(AgentEvent::PathNotFound {
                    agent_id: self.id,
                    goal: exit,
                    timestamp: Utc::now(),
                });
                false
            }
        }
    }

    fn random_walk<R: Rng + ?Sized>(
        &mut self,
        snapshot: &GridSnapshot,
        here: TilePos,
        rng: &mut R,
        events: &mut Vec<AgentEvent>,
    ) {
        self.intent = Intent::Idle;
        let Some(target) = snapshot.random_walkable_tile(rng, self.settings.random_walk_attempts) else {
            return;
        };
        match self.finder.find_path(snapshot, here, target) {
            Some(path) => {
                self.assign_path(path, target, events);
                self.intent = Intent::Wander;
            }
            None => events.push(AgentEvent::PathNotFound {
                agent_id: self.id,
                goal: target,
                timestamp: Utc::now(),
            }),
        }
    }

    fn assign_path(&mut self, path: Path, goal: TilePos, events: &mut Vec<AgentEvent>) {
        events.push(AgentEvent::PathAssigned {
            agent_id: self.id,
            goal,
            waypoints: path.len(),
            timestamp: Utc::now(),
        });
        self.path = Some(path);
        self.waypoint_index = 0;
    }
}
