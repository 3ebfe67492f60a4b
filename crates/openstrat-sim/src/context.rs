//! Session state shared by every system.
//!
//! One `GameContext` per game session. Selection, the local team and the
//! random generator are explicit fields here rather than globals, and every
//! system receives the context it works on.

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use openstrat_core::commands::NetIntent;
use openstrat_core::components::{IsVisible, Player, Unit};
use openstrat_core::enums::Team;
use openstrat_core::events::{CombatText, GameEvent};
use openstrat_core::templates::Templates;
use openstrat_core::types::SimTime;
use openstrat_grid::GameMap;

pub struct GameContext {
    pub world: World,
    pub map: GameMap,
    pub templates: Templates,
    /// The only random source. Accuracy, scatter and damage rolls all draw
    /// from it, so a seed fully determines a session.
    pub rng: ChaCha8Rng,
    pub time: SimTime,
    pub turn: i32,
    pub local_team: Team,
    pub player: Player,
    pub selected_unit: Option<Entity>,
    /// Events raised since the last snapshot.
    pub events: Vec<GameEvent>,
    pub combat_texts: Vec<CombatText>,
    /// Intents produced by local commits, waiting for the network collaborator.
    pub outbound: Vec<NetIntent>,
    pub despawn_buffer: Vec<Entity>,
}

impl GameContext {
    pub fn new(
        world: World,
        map: GameMap,
        templates: Templates,
        seed: u64,
        player: Player,
    ) -> Self {
        Self {
            world,
            map,
            templates,
            rng: ChaCha8Rng::seed_from_u64(seed),
            time: SimTime::default(),
            turn: 0,
            local_team: player.team,
            player,
            selected_unit: None,
            events: Vec::new(),
            combat_texts: Vec::new(),
            outbound: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Whether the local team may know about `entity`: a friendly unit, or an
    /// enemy currently tagged visible. Despawned entities are unknown.
    pub fn knows(&self, entity: Entity) -> bool {
        match self.world.get::<&Unit>(entity) {
            Ok(unit) if unit.team == self.local_team => true,
            Ok(_) => self.world.get::<&IsVisible>(entity).is_ok(),
            Err(_) => false,
        }
    }

    /// Emit an event about `entity` only if the local team knows about it.
    pub fn emit_about(&mut self, entity: Entity, event: GameEvent) {
        if self.knows(entity) {
            self.emit(event);
        }
    }
}

/// Stable external reference for an entity (used in events, snapshots and
/// network intents).
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Resolve an external reference. A stale reference (despawned entity)
/// resolves to an entity the world no longer contains.
pub fn entity_from_id(id: u64) -> Option<Entity> {
    Entity::from_bits(id)
}
