//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the game context, processes queued input and
//! network intents, runs all systems, and produces a `FrameSnapshot` per
//! tick. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};

use openstrat_core::commands::{InputEvent, NetIntent};
use openstrat_core::components::Player;
use openstrat_core::constants::{DEFAULT_PLAYER_NAME, DEFAULT_PLAYER_SUPPLIES};
use openstrat_core::enums::{RejectReason, Team};
use openstrat_core::error::{ConfigError, SpawnError};
use openstrat_core::events::GameEvent;
use openstrat_core::state::{FrameSnapshot, TargetingPreview};
use openstrat_core::templates::{MapLayout, Templates};
use openstrat_core::types::{CellIdx, Rect, SimTime};
use openstrat_grid::GameMap;

use crate::context::{entity_from_id, entity_id, GameContext};
use crate::systems;
use crate::systems::selection::CycleDirection;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Team whose view the snapshots show.
    pub local_team: Team,
    pub player_name: String,
    pub player_supplies: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            local_team: Team::Blue,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            player_supplies: DEFAULT_PLAYER_SUPPLIES,
        }
    }
}

/// The simulation engine. Owns the game context and the input queues.
pub struct SimulationEngine {
    ctx: GameContext,
    input_queue: VecDeque<InputEvent>,
    inbound_intents: VecDeque<NetIntent>,
    hovered: Option<CellIdx>,
    viewport: Option<Rect>,
}

impl SimulationEngine {
    /// Build the map from `layout` and start a session. Any configuration
    /// error aborts before a world is handed out.
    pub fn new(
        config: SimConfig,
        templates: Templates,
        layout: &MapLayout,
    ) -> Result<Self, ConfigError> {
        let mut world = World::new();
        let map = world_setup::build_map(&mut world, &templates, layout)?;
        let player = Player {
            name: config.player_name,
            team: config.local_team,
            supplies: config.player_supplies,
        };
        Ok(Self {
            ctx: GameContext::new(world, map, templates, config.seed, player),
            input_queue: VecDeque::new(),
            inbound_intents: VecDeque::new(),
            hovered: None,
            viewport: None,
        })
    }

    /// Spawn a unit from its template. Vision is recomputed right away.
    pub fn spawn_unit(
        &mut self,
        kind: &str,
        team: Team,
        cell: CellIdx,
    ) -> Result<Entity, SpawnError> {
        let ctx = &mut self.ctx;
        let entity =
            world_setup::spawn_unit(&mut ctx.world, &mut ctx.map, &ctx.templates, kind, team, cell)?;
        systems::vision::compute_team_vision(ctx);
        Ok(entity)
    }

    /// Queue an input event for processing at the next tick boundary.
    pub fn queue_input(&mut self, event: InputEvent) {
        self.input_queue.push_back(event);
    }

    /// Queue multiple input events.
    pub fn queue_inputs(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.input_queue.extend(events);
    }

    /// Queue an intent received from the peer. It is resolved during the
    /// next tick, after local input.
    pub fn queue_intent(&mut self, intent: NetIntent) {
        self.inbound_intents.push_back(intent);
    }

    /// Take the intents produced by local commits since the last call.
    pub fn drain_outbound(&mut self) -> Vec<NetIntent> {
        std::mem::take(&mut self.ctx.outbound)
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> FrameSnapshot {
        self.process_inputs();
        self.process_intents();
        let targeting = self.targeting_preview();

        systems::movement::run(&mut self.ctx);
        systems::cleanup::run(&mut self.ctx);
        systems::cleanup::age_combat_texts(&mut self.ctx);
        self.ctx.time.advance();

        let events = std::mem::take(&mut self.ctx.events);
        systems::snapshot::build_snapshot(
            &self.ctx,
            self.viewport,
            self.hovered,
            targeting,
            events,
        )
    }

    /// Current turn number.
    pub fn turn(&self) -> i32 {
        self.ctx.turn
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.ctx.time
    }

    pub fn selected_unit(&self) -> Option<Entity> {
        self.ctx.selected_unit
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.ctx.world
    }

    pub fn map(&self) -> &GameMap {
        &self.ctx.map
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    #[cfg(test)]
    pub(crate) fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    /// Process all queued input events.
    fn process_inputs(&mut self) {
        while let Some(event) = self.input_queue.pop_front() {
            self.handle_input(event);
        }
    }

    /// Handle a single input event.
    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PrimaryAction { cell } => {
                systems::selection::primary_action(&mut self.ctx, cell);
            }
            InputEvent::SecondaryAction { cell } => {
                let result = systems::abilities::use_selected(&mut self.ctx, cell);
                if let Err(reason) = result {
                    let unit = self.ctx.selected_unit.map(entity_id);
                    self.reject(unit, reason);
                }
            }
            InputEvent::HoverCell { cell } => {
                self.hovered = Some(cell);
            }
            InputEvent::ClearHover => {
                self.hovered = None;
            }
            InputEvent::SelectNextAbility => {
                systems::selection::cycle_ability(&mut self.ctx, CycleDirection::Next);
            }
            InputEvent::SelectPreviousAbility => {
                systems::selection::cycle_ability(&mut self.ctx, CycleDirection::Previous);
            }
            InputEvent::Deselect => {
                systems::selection::deselect(&mut self.ctx);
            }
            InputEvent::SetViewport { rect } => {
                self.viewport = Some(rect);
            }
            InputEvent::EndTurn => {
                self.ctx.turn += 1;
                tracing::info!(turn = self.ctx.turn, "turn advanced");
                self.ctx.emit(GameEvent::TurnAdvanced {
                    turn: self.ctx.turn,
                });
            }
        }
    }

    /// Resolve all queued peer intents through the same validation as local
    /// commits.
    fn process_intents(&mut self) {
        while let Some(intent) = self.inbound_intents.pop_front() {
            if let Err(reason) = systems::abilities::apply_intent(&mut self.ctx, &intent) {
                if reason == RejectReason::UnknownUnit {
                    tracing::warn!(unit = intent.unit, "intent for unknown unit");
                }
                // Units the local team cannot see stay anonymous.
                let unit = entity_from_id(intent.unit)
                    .filter(|e| self.ctx.knows(*e))
                    .map(|_| intent.unit);
                self.reject(unit, reason);
            }
        }
    }

    fn reject(&mut self, unit: Option<u64>, reason: RejectReason) {
        tracing::debug!(?unit, %reason, "ability rejected");
        self.ctx.emit(GameEvent::AbilityRejected { unit, reason });
    }

    fn targeting_preview(&self) -> Option<TargetingPreview> {
        systems::abilities::preview(&self.ctx, self.hovered)
    }
}
