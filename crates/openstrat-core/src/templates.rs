//! Template records for obstacles, units and abilities, plus the map layout.
//!
//! Records are deserialized with serde. Every key is required: a missing key
//! is a fatal [`ConfigError`], never a silent default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Ability, DamageRange};
use crate::constants::GROUND_OBSTACLE;
use crate::enums::{AbilityKind, TargetingMode, Trajectory};
use crate::error::ConfigError;
use crate::types::{CellDims, CellIdx};

/// Sprite sheet coordinates. Obstacle templates are looked up by these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasCoords {
    pub x: i32,
    pub y: i32,
}

impl AtlasCoords {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellConfig {
    pub cell_width: i32,
    pub cell_height: i32,
    pub default_cell_atlas_id: i32,
    pub default_cell_atlas_coords: AtlasCoords,
    /// Height of one terrain step.
    pub cliff_intrinsic_height: i32,
}

/// Game-wide setup record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSetup {
    pub cell_config: CellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    #[serde(rename = "type")]
    pub kind: String,
    pub display_name: String,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
    pub intrinsic_height: i32,
    pub unit_stands_on_top: bool,
    pub stops_projectile: bool,
    pub is_destructible: bool,
    pub max_health: i32,
    pub move_cost: i32,
    pub increment_terrain_height: bool,
    pub decrement_terrain_height: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityTemplate {
    #[serde(rename = "type")]
    pub kind: AbilityKind,
    pub description: String,
    pub requires_cell: bool,
    pub supply_cost: i32,
    pub max_uses_per_turn: i32,
    pub max_cooldown: i32,
    pub does_bresenham_targeting: bool,
    pub does_straight_line_targeting: bool,
    pub range: i32,
    pub aoe_size: i32,
    pub flesh_damage_min: i32,
    pub flesh_damage_max: i32,
    pub armor_damage_min: i32,
    pub armor_damage_max: i32,
    pub terrain_damage_min: i32,
    pub terrain_damage_max: i32,
    pub fires_projectile: bool,
    pub is_aerial_projectile: bool,
    pub accuracy_falloff: f32,
    pub inaccuracy_radius: i32,
}

impl AbilityTemplate {
    /// Build a fresh, never-used ability.
    pub fn instantiate(&self, name: &str) -> Ability {
        let trajectory = if self.does_bresenham_targeting {
            Trajectory::Bresenham
        } else if self.does_straight_line_targeting {
            Trajectory::StraightLine
        } else {
            Trajectory::None
        };

        Ability {
            name: name.to_string(),
            kind: self.kind,
            description: self.description.clone(),
            targeting: if self.requires_cell {
                TargetingMode::Cell
            } else {
                TargetingMode::None
            },
            trajectory,
            supply_cost: self.supply_cost,
            max_uses_per_turn: self.max_uses_per_turn,
            uses_this_turn: 0,
            max_cooldown: self.max_cooldown,
            last_turn_used: None,
            range: self.range,
            aoe_size: self.aoe_size,
            flesh_damage: DamageRange::new(self.flesh_damage_min, self.flesh_damage_max),
            armor_damage: DamageRange::new(self.armor_damage_min, self.armor_damage_max),
            terrain_damage: DamageRange::new(self.terrain_damage_min, self.terrain_damage_max),
            fires_projectile: self.fires_projectile,
            is_aerial_projectile: self.is_aerial_projectile,
            accuracy_falloff: self.accuracy_falloff,
            inaccuracy_radius: self.inaccuracy_radius,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub description: String,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
    pub is_person: bool,
    pub is_vehicle: bool,
    pub is_structure: bool,
    pub intrinsic_height: i32,
    pub crouch_height: i32,
    pub prone_height: i32,
    pub max_supplies: i32,
    pub max_health: i32,
    pub stops_projectile: bool,
    pub max_occupancy: i32,
    pub use_vision: bool,
    pub vision_base_width: i32,
    pub vision_top_width: i32,
    pub vision_length: i32,
    /// Ordered by key; this order is the unit's ability list order.
    pub abilities: BTreeMap<String, AbilityTemplate>,
}

/// All template records the simulation consumes.
#[derive(Debug, Clone)]
pub struct Templates {
    pub setup: GameSetup,
    obstacles: BTreeMap<String, ObstacleTemplate>,
    units: BTreeMap<String, UnitTemplate>,
}

impl Templates {
    /// Assemble a template set. Fails if the cell size is not positive or the
    /// `ground` obstacle (used to replace destroyed obstacles) is missing.
    pub fn new(
        setup: GameSetup,
        obstacles: BTreeMap<String, ObstacleTemplate>,
        units: BTreeMap<String, UnitTemplate>,
    ) -> Result<Self, ConfigError> {
        let cell = &setup.cell_config;
        if cell.cell_width <= 0 || cell.cell_height <= 0 {
            return Err(ConfigError::InvalidCellSize {
                width: cell.cell_width,
                height: cell.cell_height,
            });
        }
        if !obstacles.contains_key(GROUND_OBSTACLE) {
            return Err(ConfigError::MissingObstacleTemplate(
                GROUND_OBSTACLE.to_string(),
            ));
        }
        Ok(Self {
            setup,
            obstacles,
            units,
        })
    }

    /// Parse the three template documents.
    pub fn from_json(
        setup_json: &str,
        obstacles_json: &str,
        units_json: &str,
    ) -> Result<Self, ConfigError> {
        let setup: GameSetup = serde_json::from_str(setup_json)?;
        let obstacles = serde_json::from_str(obstacles_json)?;
        let units = serde_json::from_str(units_json)?;
        Self::new(setup, obstacles, units)
    }

    pub fn obstacle(&self, kind: &str) -> Result<&ObstacleTemplate, ConfigError> {
        self.obstacles
            .get(kind)
            .ok_or_else(|| ConfigError::MissingObstacleTemplate(kind.to_string()))
    }

    pub fn unit(&self, kind: &str) -> Result<&UnitTemplate, ConfigError> {
        self.units
            .get(kind)
            .ok_or_else(|| ConfigError::MissingUnitTemplate(kind.to_string()))
    }

    /// Find the obstacle template drawn from the given sprite sheet cell.
    pub fn obstacle_by_atlas(
        &self,
        atlas_id: i32,
        coords: AtlasCoords,
    ) -> Result<(&str, &ObstacleTemplate), ConfigError> {
        self.obstacles
            .iter()
            .find(|(_, t)| t.atlas_id == atlas_id && t.atlas_coords == coords)
            .map(|(key, t)| (key.as_str(), t))
            .ok_or(ConfigError::UnknownAtlasCoords { atlas_id, coords })
    }

    pub fn cell_dims(&self) -> CellDims {
        CellDims::new(
            self.setup.cell_config.cell_width,
            self.setup.cell_config.cell_height,
        )
    }

    pub fn cliff_height(&self) -> i32 {
        self.setup.cell_config.cliff_intrinsic_height
    }
}

/// One painted map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCell {
    pub cell: CellIdx,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
}

/// Map dimensions and per-cell sprite references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayout {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub cells: Vec<MapCell>,
}

#[derive(Deserialize)]
struct RawMap {
    meta: RawMeta,
    cell_data: BTreeMap<String, RawCell>,
}

#[derive(Deserialize)]
struct RawMeta {
    map_dimensions: RawDimensions,
}

#[derive(Deserialize)]
struct RawDimensions {
    map_width: i32,
    map_height: i32,
}

#[derive(Deserialize)]
struct RawCell {
    cell_atlas_coords: String,
    cell_source_id: i32,
}

impl MapLayout {
    /// A map painted entirely with one sprite.
    pub fn uniform(
        name: &str,
        width: i32,
        height: i32,
        atlas_id: i32,
        atlas_coords: AtlasCoords,
    ) -> Self {
        let mut cells = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(MapCell {
                    cell: CellIdx::new(x, y),
                    atlas_id,
                    atlas_coords,
                });
            }
        }
        Self {
            name: name.to_string(),
            width,
            height,
            cells,
        }
    }

    /// Repaint a cell, adding it if it was not painted yet.
    pub fn paint(&mut self, cell: CellIdx, atlas_id: i32, atlas_coords: AtlasCoords) {
        match self.cells.iter_mut().find(|c| c.cell == cell) {
            Some(existing) => {
                existing.atlas_id = atlas_id;
                existing.atlas_coords = atlas_coords;
            }
            None => self.cells.push(MapCell {
                cell,
                atlas_id,
                atlas_coords,
            }),
        }
    }

    /// Parse a map document: `meta.map_dimensions` plus `cell_data` keyed by
    /// `"(x, y)"` strings.
    pub fn from_json(name: &str, json: &str) -> Result<Self, ConfigError> {
        let raw: RawMap = serde_json::from_str(json)?;
        let width = raw.meta.map_dimensions.map_width;
        let height = raw.meta.map_dimensions.map_height;
        if width <= 0 || height <= 0 {
            return Err(ConfigError::InvalidMapSize { width, height });
        }

        let cells = raw
            .cell_data
            .iter()
            .map(|(key, value)| {
                let (x, y) = parse_vector_key(key)?;
                let (ax, ay) = parse_vector_key(&value.cell_atlas_coords)?;
                Ok(MapCell {
                    cell: CellIdx::new(x, y),
                    atlas_id: value.cell_source_id,
                    atlas_coords: AtlasCoords::new(ax, ay),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            name: name.to_string(),
            width,
            height,
            cells,
        })
    }
}

/// Parse `"(x, y)"` (spaces and parentheses optional) into floored integers.
pub fn parse_vector_key(key: &str) -> Result<(i32, i32), ConfigError> {
    let cleaned: String = key
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();
    let malformed = || ConfigError::MalformedCellKey(key.to_string());
    let (xs, ys) = cleaned.split_once(',').ok_or_else(malformed)?;
    let x: f32 = xs.parse().map_err(|_| malformed())?;
    let y: f32 = ys.parse().map_err(|_| malformed())?;
    Ok((x.floor() as i32, y.floor() as i32))
}
