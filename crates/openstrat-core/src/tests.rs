#[cfg(test)]
mod tests {
    use crate::commands::{InputEvent, IntentKind, NetIntent};
    use crate::components::DamageRange;
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::events::GameEvent;
    use crate::templates::{parse_vector_key, AtlasCoords, MapLayout, Templates};
    use crate::types::{CellIdx, Rect};

    const SETUP: &str = r#"{
        "cell_config": {
            "cell_width": 32,
            "cell_height": 32,
            "default_cell_atlas_id": 0,
            "default_cell_atlas_coords": { "x": 0, "y": 0 },
            "cliff_intrinsic_height": 10
        }
    }"#;

    const OBSTACLES: &str = r#"{
        "ground": {
            "type": "ground", "display_name": "ground",
            "atlas_id": 0, "atlas_coords": { "x": 0, "y": 0 },
            "intrinsic_height": 0, "unit_stands_on_top": true,
            "stops_projectile": false, "is_destructible": false,
            "max_health": 0, "move_cost": 1,
            "increment_terrain_height": false, "decrement_terrain_height": false
        },
        "cliff_up": {
            "type": "cliff_up", "display_name": "cliff",
            "atlas_id": 0, "atlas_coords": { "x": 1, "y": 0 },
            "intrinsic_height": 3, "unit_stands_on_top": false,
            "stops_projectile": true, "is_destructible": false,
            "max_health": 0, "move_cost": 5,
            "increment_terrain_height": true, "decrement_terrain_height": false
        }
    }"#;

    const UNITS: &str = r#"{
        "rifleman": {
            "description": "Infantry",
            "atlas_id": 0, "atlas_coords": { "x": 0, "y": 0 },
            "is_person": true, "is_vehicle": false, "is_structure": false,
            "intrinsic_height": 6, "crouch_height": 4, "prone_height": 1,
            "max_supplies": 40, "max_health": 10,
            "stops_projectile": true, "max_occupancy": 0,
            "use_vision": true,
            "vision_base_width": 1, "vision_top_width": 5, "vision_length": 6,
            "abilities": {
                "move": {
                    "type": "move", "description": "Move",
                    "requires_cell": true, "supply_cost": 0,
                    "max_uses_per_turn": -1, "max_cooldown": -1,
                    "does_bresenham_targeting": true,
                    "does_straight_line_targeting": false,
                    "range": 10, "aoe_size": 0,
                    "flesh_damage_min": 0, "flesh_damage_max": 0,
                    "armor_damage_min": 0, "armor_damage_max": 0,
                    "terrain_damage_min": 0, "terrain_damage_max": 0,
                    "fires_projectile": false, "is_aerial_projectile": false,
                    "accuracy_falloff": 0.0, "inaccuracy_radius": 0
                },
                "shoot": {
                    "type": "shoot", "description": "Rifle shot",
                    "requires_cell": true, "supply_cost": 2,
                    "max_uses_per_turn": 2, "max_cooldown": 0,
                    "does_bresenham_targeting": false,
                    "does_straight_line_targeting": true,
                    "range": 8, "aoe_size": 0,
                    "flesh_damage_min": 2, "flesh_damage_max": 4,
                    "armor_damage_min": 0, "armor_damage_max": 1,
                    "terrain_damage_min": 1, "terrain_damage_max": 1,
                    "fires_projectile": true, "is_aerial_projectile": false,
                    "accuracy_falloff": 0.05, "inaccuracy_radius": 1
                }
            }
        }
    }"#;

    #[test]
    fn test_templates_parse() {
        let templates = Templates::from_json(SETUP, OBSTACLES, UNITS).unwrap();
        assert_eq!(templates.cell_dims().width, 32);
        assert_eq!(templates.cliff_height(), 10);

        let cliff = templates.obstacle("cliff_up").unwrap();
        assert!(cliff.increment_terrain_height);
        assert_eq!(
            ObstacleClass::from_display_name(&cliff.display_name),
            ObstacleClass::Cliff
        );

        let rifleman = templates.unit("rifleman").unwrap();
        let names: Vec<&str> = rifleman.abilities.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["move", "shoot"], "abilities are ordered by key");
    }

    #[test]
    fn test_ability_instantiate() {
        let templates = Templates::from_json(SETUP, OBSTACLES, UNITS).unwrap();
        let rifleman = templates.unit("rifleman").unwrap();

        let mv = rifleman.abilities["move"].instantiate("move");
        assert_eq!(mv.kind, AbilityKind::Move);
        assert_eq!(mv.trajectory, Trajectory::Bresenham);
        assert_eq!(mv.targeting, TargetingMode::Cell);
        assert_eq!(mv.last_turn_used, None);

        let shoot = rifleman.abilities["shoot"].instantiate("shoot");
        assert_eq!(shoot.kind, AbilityKind::Action, "unknown type falls back to Action");
        assert_eq!(shoot.trajectory, Trajectory::StraightLine);
        assert_eq!(shoot.flesh_damage, DamageRange::new(2, 4));
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let broken = OBSTACLES.replace("\"move_cost\": 5,", "");
        let result = Templates::from_json(SETUP, &broken, UNITS);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_ground_template_is_fatal() {
        let only_cliff = r#"{
            "cliff_up": {
                "type": "cliff_up", "display_name": "cliff",
                "atlas_id": 0, "atlas_coords": { "x": 1, "y": 0 },
                "intrinsic_height": 3, "unit_stands_on_top": false,
                "stops_projectile": true, "is_destructible": false,
                "max_health": 0, "move_cost": 5,
                "increment_terrain_height": true, "decrement_terrain_height": false
            }
        }"#;
        let result = Templates::from_json(SETUP, only_cliff, UNITS);
        assert!(matches!(result, Err(ConfigError::MissingObstacleTemplate(ref k)) if k == "ground"));
    }

    #[test]
    fn test_unknown_template_lookups() {
        let templates = Templates::from_json(SETUP, OBSTACLES, UNITS).unwrap();
        assert!(matches!(
            templates.unit("tank"),
            Err(ConfigError::MissingUnitTemplate(_))
        ));
        assert!(matches!(
            templates.obstacle_by_atlas(3, AtlasCoords::new(9, 9)),
            Err(ConfigError::UnknownAtlasCoords { atlas_id: 3, .. })
        ));
        let (key, _) = templates
            .obstacle_by_atlas(0, AtlasCoords::new(1, 0))
            .unwrap();
        assert_eq!(key, "cliff_up");
    }

    #[test]
    fn test_parse_vector_key() {
        assert_eq!(parse_vector_key("(3, 4)").unwrap(), (3, 4));
        assert_eq!(parse_vector_key("12,0").unwrap(), (12, 0));
        assert_eq!(parse_vector_key("(2.7, -0.5)").unwrap(), (2, -1));
        assert!(matches!(
            parse_vector_key("(3; 4)"),
            Err(ConfigError::MalformedCellKey(_))
        ));
    }

    #[test]
    fn test_map_layout_from_json() {
        let json = r#"{
            "meta": { "map_dimensions": { "map_width": 2, "map_height": 1 } },
            "cell_data": {
                "(0, 0)": { "cell_atlas_coords": "(0, 0)", "cell_source_id": 0 },
                "(1, 0)": { "cell_atlas_coords": "(1, 0)", "cell_source_id": 0 }
            }
        }"#;
        let layout = MapLayout::from_json("tiny", json).unwrap();
        assert_eq!((layout.width, layout.height), (2, 1));
        assert_eq!(layout.cells.len(), 2);
        let second = layout
            .cells
            .iter()
            .find(|c| c.cell == CellIdx::new(1, 0))
            .unwrap();
        assert_eq!(second.atlas_coords, AtlasCoords::new(1, 0));
    }

    #[test]
    fn test_map_layout_rejects_empty_dimensions() {
        let json = r#"{
            "meta": { "map_dimensions": { "map_width": 0, "map_height": 4 } },
            "cell_data": {}
        }"#;
        assert!(matches!(
            MapLayout::from_json("empty", json),
            Err(ConfigError::InvalidMapSize { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_map_layout_paint() {
        let mut layout = MapLayout::uniform("flat", 3, 2, 0, AtlasCoords::new(0, 0));
        assert_eq!(layout.cells.len(), 6);
        layout.paint(CellIdx::new(1, 1), 0, AtlasCoords::new(1, 0));
        assert_eq!(layout.cells.len(), 6);
        assert!(layout
            .cells
            .iter()
            .any(|c| c.cell == CellIdx::new(1, 1) && c.atlas_coords == AtlasCoords::new(1, 0)));
    }

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::Blue.opponent(), Team::Red);
        assert_eq!(Team::Red.opponent(), Team::Blue);
    }

    #[test]
    fn test_damage_range_bounds_swapped() {
        assert_eq!(DamageRange::new(5, 2).bounds(), (2, 5));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        assert!(rect.contains(glam::Vec2::new(0.0, 0.0)));
        assert!(rect.contains(glam::Vec2::new(31.9, 31.9)));
        assert!(!rect.contains(glam::Vec2::new(32.0, 16.0)));
    }

    /// Verify InputEvent round-trips through serde (tagged union).
    #[test]
    fn test_input_event_serde() {
        let events = vec![
            InputEvent::PrimaryAction {
                cell: CellIdx::new(2, 3),
            },
            InputEvent::SecondaryAction {
                cell: CellIdx::new(4, 4),
            },
            InputEvent::HoverCell {
                cell: CellIdx::new(0, 1),
            },
            InputEvent::SelectNextAbility,
            InputEvent::SelectPreviousAbility,
            InputEvent::SetViewport {
                rect: Rect::new(0.0, 0.0, 640.0, 480.0),
            },
            InputEvent::EndTurn,
        ];
        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: InputEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(json, serde_json::to_string(&back).unwrap());
        }
    }

    #[test]
    fn test_net_intent_serde() {
        let intent = NetIntent {
            kind: IntentKind::UseAbility { ability_index: 1 },
            team: Team::Red,
            unit: 42,
            destination: CellIdx::new(5, 2),
        };
        let json = serde_json::to_string(&intent).unwrap();
        let back: NetIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, back);
    }

    #[test]
    fn test_game_event_serde() {
        let event = GameEvent::AbilityRejected {
            unit: Some(7),
            reason: RejectReason::OnCooldown,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"AbilityRejected\""));
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
