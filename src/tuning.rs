//! Data-driven game balance and session parameters
//!
//! Every gameplay constant lives in [`Tuning`]. The defaults are the
//! reference balance; JSON overrides may replace any subset of fields.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Playable classes (selects base health, speed and body color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlayerClass {
    #[default]
    Assault,
    Support,
    Recon,
    Engineer,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 4] = [
        PlayerClass::Assault,
        PlayerClass::Support,
        PlayerClass::Recon,
        PlayerClass::Engineer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerClass::Assault => "Assault",
            PlayerClass::Support => "Support",
            PlayerClass::Recon => "Recon",
            PlayerClass::Engineer => "Engineer",
        }
    }

    /// Starting and maximum health
    pub fn base_health(&self) -> f32 {
        match self {
            PlayerClass::Assault => 120.0,
            PlayerClass::Support => 150.0,
            PlayerClass::Recon => 80.0,
            PlayerClass::Engineer => 100.0,
        }
    }

    /// Movement speed in units per tick
    pub fn base_speed(&self) -> f32 {
        match self {
            PlayerClass::Assault => 4.5,
            PlayerClass::Support => 3.5,
            PlayerClass::Recon => 5.5,
            PlayerClass::Engineer => 4.0,
        }
    }

    /// Body color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            PlayerClass::Assault => 0x3b82f6,
            PlayerClass::Support => 0x22c55e,
            PlayerClass::Recon => 0xeab308,
            PlayerClass::Engineer => 0xf97316,
        }
    }
}

impl FromStr for PlayerClass {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| SessionError::UnknownClass(s.to_string()))
    }
}

/// Difficulty presets (scale the initial enemy count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    pub fn multiplier(&self) -> f32 {
        match self {
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
            Difficulty::Insane => 2.0,
        }
    }

    /// Map a raw multiplier (as the menu hands it over) back to a preset
    pub fn from_multiplier(multiplier: f32) -> Result<Self, SessionError> {
        [Difficulty::Normal, Difficulty::Hard, Difficulty::Insane]
            .into_iter()
            .find(|d| (d.multiplier() - multiplier).abs() < 1e-3)
            .ok_or_else(|| SessionError::UnknownDifficulty(multiplier.to_string()))
    }
}

impl FromStr for Difficulty {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "1" => Ok(Difficulty::Normal),
            "hard" | "1.5" => Ok(Difficulty::Hard),
            "insane" | "2" => Ok(Difficulty::Insane),
            _ => Err(SessionError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Session start parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionParams {
    pub class: PlayerClass,
    pub difficulty: Difficulty,
    /// Seed for map generation and all in-session randomness
    pub seed: u64,
}

impl SessionParams {
    /// Build params from the raw strings a menu or command line provides
    pub fn parse(class: &str, difficulty: &str, seed: u64) -> Result<Self, SessionError> {
        Ok(Self {
            class: class.parse()?,
            difficulty: difficulty.parse()?,
            seed,
        })
    }
}

/// Gameplay balance values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Map ===
    pub map_width: f32,
    pub map_height: f32,
    /// Thickness of the boundary walls (placed just outside the map)
    pub wall_thickness: f32,
    /// Interior obstacle candidates (some are rejected near the center)
    pub obstacle_candidates: u32,
    pub obstacle_min_size: f32,
    pub obstacle_max_size: f32,
    /// Gap kept between interior obstacles and the map edge
    pub obstacle_margin: f32,
    /// Obstacle corners must be farther than this from the map center
    pub center_exclusion_radius: f32,

    // === Spawning ===
    pub common_loot: u32,
    pub rare_loot: u32,
    pub medkits: u32,
    pub ammo_crates: u32,
    /// Tier-1 enemies per unit of difficulty multiplier
    pub enemies_per_difficulty: u32,
    pub extraction_points: u32,
    /// Distance of extraction points from their map edge
    pub extraction_edge_inset: f32,
    pub extraction_radius: f32,
    /// Player spawn stays this far from the map edge
    pub spawn_margin: f32,
    pub spawn_attempts: u32,
    pub reinforcement_count: u32,
    /// Reinforcements appear on a ring this far from the player
    pub reinforcement_distance: f32,

    // === Player ===
    pub start_ammo: u32,
    pub max_ammo: u32,
    pub weight_budget: u32,
    pub inventory_slots: usize,
    /// Speed multiplier while over the weight budget
    pub encumbered_speed_factor: f32,
    pub interact_radius: f32,
    pub ammo_pickup: u32,
    pub medkit_heal: f32,
    pub fire_cooldown_ticks: u64,
    pub bullet_speed: f32,
    /// Max random recoil offset (radians, either side)
    pub recoil: f32,
    pub aim_deadzone: f32,
    /// Dropped items scatter up to this far on each axis
    pub drop_scatter: f32,

    // === Decode ===
    pub decode_ticks: u32,

    // === Enemies ===
    pub tier1_health: f32,
    pub tier2_health: f32,
    pub detection_radius: f32,
    pub standoff_distance: f32,
    pub enemy_speed: f32,
    pub enemy_fire_range: f32,
    pub enemy_fire_cooldown_ticks: u64,
    pub enemy_bullet_speed: f32,

    // === Combat ===
    pub player_bullet_damage: f32,
    pub enemy_bullet_damage: f32,
    pub enemy_hit_radius: f32,
    pub player_hit_radius: f32,
    /// Bullets farther than this from the player are discarded
    pub bullet_range: f32,
    pub loot_drop_chance: f64,

    // === Particles ===
    pub particle_life: f32,
    pub particle_decay: f32,

    // === Extraction ===
    pub extraction_time_ms: f32,
    /// Drain rate relative to fill rate while out of range
    pub extraction_decay_factor: f32,

    // === Messages ===
    pub message_ticks: u32,

    // === Scoring ===
    pub health_score_multiplier: u64,
    pub decode_bonus: u64,
    pub death_score_factor: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            map_width: 3000.0,
            map_height: 3000.0,
            wall_thickness: 50.0,
            obstacle_candidates: 60,
            obstacle_min_size: 100.0,
            obstacle_max_size: 300.0,
            obstacle_margin: 100.0,
            center_exclusion_radius: 500.0,

            common_loot: 40,
            rare_loot: 15,
            medkits: 20,
            ammo_crates: 40,
            enemies_per_difficulty: 10,
            extraction_points: 2,
            extraction_edge_inset: 100.0,
            extraction_radius: 150.0,
            spawn_margin: 200.0,
            spawn_attempts: 100,
            reinforcement_count: 5,
            reinforcement_distance: 800.0,

            start_ammo: 60,
            max_ammo: 120,
            weight_budget: 50,
            inventory_slots: 10,
            encumbered_speed_factor: 0.5,
            interact_radius: 50.0,
            ammo_pickup: 30,
            medkit_heal: 50.0,
            fire_cooldown_ticks: 10,
            bullet_speed: 15.0,
            recoil: 0.05,
            aim_deadzone: 0.1,
            drop_scatter: 40.0,

            decode_ticks: 180,

            tier1_health: 60.0,
            tier2_health: 200.0,
            detection_radius: 400.0,
            standoff_distance: 150.0,
            enemy_speed: 2.0,
            enemy_fire_range: 300.0,
            enemy_fire_cooldown_ticks: 60,
            enemy_bullet_speed: 8.0,

            player_bullet_damage: 20.0,
            enemy_bullet_damage: 10.0,
            enemy_hit_radius: 20.0,
            player_hit_radius: 15.0,
            bullet_range: 1000.0,
            loot_drop_chance: 0.5,

            particle_life: 255.0,
            particle_decay: 10.0,

            extraction_time_ms: 3000.0,
            extraction_decay_factor: 2.0,

            message_ticks: 120,

            health_score_multiplier: 10,
            decode_bonus: 10_000,
            death_score_factor: 0.5,
        }
    }
}

impl Tuning {
    /// Load tuning overrides from JSON (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values that would break the simulation's invariants
    pub fn validate(&self) -> Result<(), SessionError> {
        let invalid = |field, reason| Err(SessionError::InvalidTuning { field, reason });

        if self.map_width <= 0.0 || self.map_height <= 0.0 {
            return invalid("map_width/map_height", "must be positive");
        }
        if self.obstacle_min_size > self.obstacle_max_size {
            return invalid("obstacle_min_size", "exceeds obstacle_max_size");
        }
        if self.obstacle_max_size + 2.0 * self.obstacle_margin >= self.map_width.min(self.map_height)
        {
            return invalid("obstacle_max_size", "obstacles do not fit inside the map");
        }
        if self.spawn_margin * 2.0 >= self.map_width.min(self.map_height) {
            return invalid("spawn_margin", "leaves no room to spawn");
        }
        if self.inventory_slots == 0 {
            return invalid("inventory_slots", "must be at least 1");
        }
        if self.start_ammo > self.max_ammo {
            return invalid("start_ammo", "exceeds max_ammo");
        }
        if self.decode_ticks < 2 {
            return invalid("decode_ticks", "must be at least 2");
        }
        if self.extraction_time_ms <= 0.0 {
            return invalid("extraction_time_ms", "must be positive");
        }
        if !(0.0..=1.0).contains(&self.loot_drop_chance) {
            return invalid("loot_drop_chance", "must be within 0..=1");
        }
        if self.particle_decay <= 0.0 {
            return invalid("particle_decay", "must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_parsing() {
        assert_eq!("recon".parse::<PlayerClass>().unwrap(), PlayerClass::Recon);
        assert_eq!(" Assault ".parse::<PlayerClass>().unwrap(), PlayerClass::Assault);
        assert!(matches!(
            "medic".parse::<PlayerClass>(),
            Err(SessionError::UnknownClass(_))
        ));
        for class in PlayerClass::ALL {
            assert_eq!(class.as_str().to_uppercase().parse::<PlayerClass>().unwrap(), class);
        }
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::from_multiplier(2.0).unwrap(), Difficulty::Insane);
        assert!(Difficulty::from_multiplier(3.0).is_err());
        assert!("nightmare".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_session_params_fail_fast() {
        let params = SessionParams::parse("support", "insane", 7).unwrap();
        assert_eq!(params.class, PlayerClass::Support);
        assert_eq!(params.difficulty, Difficulty::Insane);
        assert!(SessionParams::parse("support", "easy", 7).is_err());
    }

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_tuning_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "decode_ticks": 90, "bullet_range": 500.0 }"#).unwrap();
        assert_eq!(tuning.decode_ticks, 90);
        assert_eq!(tuning.bullet_range, 500.0);
        // Untouched fields keep defaults
        assert_eq!(tuning.inventory_slots, 10);
    }

    #[test]
    fn test_tuning_rejects_bad_values() {
        assert!(matches!(
            Tuning::from_json(r#"{ "inventory_slots": 0 }"#),
            Err(SessionError::InvalidTuning { .. })
        ));
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(SessionError::TuningJson(_))
        ));
    }
}
