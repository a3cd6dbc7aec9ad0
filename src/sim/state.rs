//! Session state and core simulation types
//!
//! [`Session`] is the aggregate root: it owns the map, every live entity
//! collection, the session counters and the buffered input. Reset throws
//! all of it away and rebuilds from the seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input::TickInput;
use super::map::MapLayout;
use super::snapshot::{PlayerStats, Snapshot};
use crate::error::SessionError;
use crate::tuning::{SessionParams, Tuning};

/// Item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Ammo,
    Medkit,
    Common,
    Rare,
    Gold,
    /// The unique high-value item that must be decoded instead of picked up
    SpecialBrick,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Ammo => "Ammo",
            ItemKind::Medkit => "Medkit",
            ItemKind::Common => "Scrap",
            ItemKind::Rare => "Weapon Parts",
            ItemKind::Gold => "Gold Bar",
            ItemKind::SpecialBrick => "Mandel Brick",
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            ItemKind::Ammo => 0,
            ItemKind::Medkit => 50,
            ItemKind::Common => 500,
            ItemKind::Rare => 1500,
            ItemKind::Gold => 5000,
            ItemKind::SpecialBrick => 50_000,
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            ItemKind::Ammo => 1,
            ItemKind::Medkit => 2,
            ItemKind::Common => 3,
            ItemKind::Rare => 4,
            ItemKind::Gold => 8,
            ItemKind::SpecialBrick => 15,
        }
    }

    /// Display color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            ItemKind::Ammo => 0x94a3b8,
            ItemKind::Medkit => 0xef4444,
            ItemKind::Common => 0xa8a29e,
            ItemKind::Rare => 0x8b5cf6,
            ItemKind::Gold => 0xfbbf24,
            ItemKind::SpecialBrick => 0xdc2626,
        }
    }

    /// Consumed on pickup, never occupies an inventory slot
    pub fn is_consumable(&self) -> bool {
        matches!(self, ItemKind::Ammo | ItemKind::Medkit)
    }
}

/// A loot item, on the ground (`pos` is set) or held (`pos` is `None`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub value: u32,
    pub weight: u32,
    pub color: u32,
    /// Phase offset for the ground bob animation
    pub bob_phase: f32,
    pub pos: Option<Vec2>,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2, bob_phase: f32) -> Self {
        Self {
            id,
            kind,
            value: kind.value(),
            weight: kind.weight(),
            color: kind.color(),
            bob_phase,
            pos: Some(pos),
        }
    }
}

/// Enemy strength class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyTier {
    Standard,
    Boss,
}

/// Enemy AI state (Idle -> Chase is one-way)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Idle,
    Chase,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub tier: EnemyTier,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub state: EnemyState,
    pub last_shot_tick: u64,
    /// Facing angle (radians)
    pub facing: f32,
}

impl Enemy {
    pub fn new(id: u32, tier: EnemyTier, pos: Vec2, tuning: &Tuning, now: u64) -> Self {
        let health = match tier {
            EnemyTier::Standard => tuning.tier1_health,
            EnemyTier::Boss => tuning.tier2_health,
        };
        Self {
            id,
            tier,
            pos,
            vel: Vec2::ZERO,
            health,
            max_health: health,
            state: EnemyState::Idle,
            last_shot_tick: now,
            facing: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionPoint {
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: BulletOwner,
}

/// A particle for visual effects (never affects gameplay)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub size: f32,
    pub color: u32,
}

/// The player character
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Displacement applied during the last movement update
    pub vel: Vec2,
    pub base_speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub inventory: Vec<Item>,
    pub weight: u32,
    pub weight_budget: u32,
    pub score: u64,
    pub last_fire_tick: Option<u64>,
    /// Last resolved aim angle (radians)
    pub aim: f32,
    pub color: u32,
}

impl Player {
    pub fn is_encumbered(&self) -> bool {
        self.weight > self.weight_budget
    }

    /// Speed after the encumbrance penalty
    pub fn effective_speed(&self, tuning: &Tuning) -> f32 {
        if self.is_encumbered() {
            self.base_speed * tuning.encumbered_speed_factor
        } else {
            self.base_speed
        }
    }

    pub fn add_ammo(&mut self, amount: u32) {
        self.ammo = self.ammo.saturating_add(amount).min(self.max_ammo);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Apply damage (health floors at zero). Returns true if this killed the player.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.health > 0.0;
        self.health = (self.health - amount).max(0.0);
        was_alive && self.health <= 0.0
    }

    /// Put an item into the inventory, counting its weight and value
    pub fn stash(&mut self, mut item: Item) {
        item.pos = None;
        self.weight += item.weight;
        self.score += u64::from(item.value);
        self.inventory.push(item);
    }
}

/// Session alert level (raised once, never lowered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertLevel {
    #[default]
    Stealth,
    Alerted,
}

/// Terminal state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Running,
    Extracted,
    Dead,
}

/// Special item decode progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    Inactive,
    /// Interaction triggered; advances to decoding on the following tick
    Armed,
    /// Stationary decode in progress (`ticks` starts at 2)
    Decoding { ticks: u32 },
}

impl DecodeState {
    /// Numeric timer view: 0 inactive, 1 armed, n > 1 decoding
    pub fn timer(&self) -> u32 {
        match self {
            DecodeState::Inactive => 0,
            DecodeState::Armed => 1,
            DecodeState::Decoding { ticks } => *ticks,
        }
    }
}

/// Why a status message is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    AmmoPickup,
    MedkitPickup,
    InventoryFull,
    DecodeInterrupted,
    DecodeComplete,
}

impl MessageKind {
    pub fn text(&self) -> &'static str {
        match self {
            MessageKind::AmmoPickup => "+AMMO",
            MessageKind::MedkitPickup => "+HEALTH",
            MessageKind::InventoryFull => "INVENTORY FULL",
            MessageKind::DecodeInterrupted => "DECODE INTERRUPTED",
            MessageKind::DecodeComplete => "MANDEL BRICK SECURED! RUN!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub ticks_left: u32,
}

/// Sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player fired
    PlayerShot,
    /// Enemy fired
    EnemyShot,
    /// Player bullet hit an enemy
    Hit,
    /// Item picked up
    Pickup,
    /// Decode complete, reinforcements inbound
    Alarm,
}

/// Outbound events produced by a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Periodic state bundle for the presentation layer
    Snapshot(Box<Snapshot>),
    /// Sound cue
    Sound(SoundEffect),
    /// Session is over; no further ticks run
    SessionEnded { stats: PlayerStats, extracted: bool },
}

const FX_STREAM_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// One play session (aggregate root)
#[derive(Debug, Clone)]
pub struct Session {
    pub params: SessionParams,
    pub tuning: Tuning,
    pub seed: u64,
    pub rng: Pcg32,
    /// Separate stream for cosmetic randomness so effects never shift gameplay rolls
    pub fx_rng: Pcg32,
    pub map: MapLayout,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub alert: AlertLevel,
    pub message: Option<StatusMessage>,
    pub decode: DecodeState,
    /// Accumulated extraction time (ms)
    pub extraction_ms: f32,
    /// Player was inside an extraction zone on the last tick
    pub extracting: bool,
    pub outcome: Outcome,
    /// Special item decoded at least once this session
    pub brick_decoded: bool,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Items lying on the ground
    pub loot: Vec<Item>,
    pub bullets: Vec<Bullet>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub extraction_points: Vec<ExtractionPoint>,
    /// Buffered input, written by the input collaborator between ticks
    pub input: TickInput,
    /// Events waiting to be handed out by the current tick
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// Build a fresh session, failing fast on invalid tuning
    pub fn new(params: SessionParams, tuning: Tuning) -> Result<Self, SessionError> {
        tuning.validate()?;
        Ok(Self::start(params, tuning))
    }

    /// Build a session with the reference balance
    pub fn with_defaults(params: SessionParams) -> Self {
        Self::start(params, Tuning::default())
    }

    fn start(params: SessionParams, tuning: Tuning) -> Self {
        let session = Self::build(params, tuning, params.seed);
        log::info!(
            "Session started: class={} difficulty={} seed={} enemies={} loot={}",
            params.class.as_str(),
            params.difficulty.as_str(),
            session.seed,
            session.enemies.len(),
            session.loot.len()
        );
        session
    }

    /// Discard everything and rebuild from the current seed
    pub fn reset(&mut self) {
        let (params, tuning, seed) = (self.params, self.tuning.clone(), self.seed);
        *self = Self::build(params, tuning, seed);
        log::info!("Session reset (seed={})", seed);
    }

    /// Discard everything and rebuild from a new seed
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.params.seed = seed;
        self.reset();
    }

    fn build(params: SessionParams, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let map = MapLayout::generate(&tuning, &mut rng);

        let class = params.class;
        let player = Player {
            pos: map.center(),
            vel: Vec2::ZERO,
            base_speed: class.base_speed(),
            health: class.base_health(),
            max_health: class.base_health(),
            ammo: tuning.start_ammo,
            max_ammo: tuning.max_ammo,
            inventory: Vec::with_capacity(tuning.inventory_slots),
            weight: 0,
            weight_budget: tuning.weight_budget,
            score: 0,
            last_fire_tick: None,
            aim: 0.0,
            color: class.color(),
        };

        let mut session = Self {
            params,
            tuning,
            seed,
            rng,
            fx_rng: Pcg32::seed_from_u64(seed ^ FX_STREAM_SALT),
            map,
            time_ticks: 0,
            alert: AlertLevel::Stealth,
            message: None,
            decode: DecodeState::Inactive,
            extraction_ms: 0.0,
            extracting: false,
            outcome: Outcome::Running,
            brick_decoded: false,
            player,
            enemies: Vec::new(),
            loot: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            extraction_points: Vec::new(),
            input: TickInput::default(),
            events: Vec::new(),
            next_id: 1,
        };

        session.player.pos = session.pick_player_spawn();
        session.spawn_loot();
        let count =
            (session.tuning.enemies_per_difficulty as f32 * params.difficulty.multiplier()).round();
        session.spawn_enemies(count as u32, EnemyTier::Standard);
        session.spawn_extractions();
        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::Running
    }

    /// Show a status message for the configured duration
    pub fn show_message(&mut self, kind: MessageKind) {
        self.message = Some(StatusMessage {
            kind,
            ticks_left: self.tuning.message_ticks,
        });
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// The special item, if it is lying on the ground
    pub fn brick_on_ground(&self) -> Option<&Item> {
        self.loot.iter().find(|i| i.kind == ItemKind::SpecialBrick)
    }

    /// Create a ground item with a random bob phase
    pub fn create_item(&mut self, kind: ItemKind, pos: Vec2) -> Item {
        let id = self.next_entity_id();
        let bob_phase = self.rng.random_range(0.0..100.0);
        Item::new(id, kind, pos, bob_phase)
    }

    /// Draw candidates until one is not blocked; fall back to the map center
    fn free_spot(&mut self, mut candidate: impl FnMut(&mut Pcg32, Vec2) -> Vec2) -> Vec2 {
        let size = self.map.size;
        for _ in 0..self.tuning.spawn_attempts {
            let p = candidate(&mut self.rng, size);
            if !self.map.is_blocked(p) {
                return p;
            }
        }
        log::warn!("No free spawn spot found, falling back to map center");
        self.map.center()
    }

    fn pick_player_spawn(&mut self) -> Vec2 {
        let margin = self.tuning.spawn_margin;
        self.free_spot(|rng, size| {
            Vec2::new(
                rng.random_range(margin..size.x - margin),
                rng.random_range(margin..size.y - margin),
            )
        })
    }

    fn random_free_spot(&mut self) -> Vec2 {
        self.free_spot(|rng, size| {
            Vec2::new(rng.random_range(0.0..size.x), rng.random_range(0.0..size.y))
        })
    }

    fn spawn_loot(&mut self) {
        let batches = [
            (ItemKind::Common, self.tuning.common_loot),
            (ItemKind::Rare, self.tuning.rare_loot),
            (ItemKind::Medkit, self.tuning.medkits),
            (ItemKind::Ammo, self.tuning.ammo_crates),
        ];
        for (kind, count) in batches {
            for _ in 0..count {
                let pos = self.random_free_spot();
                let item = self.create_item(kind, pos);
                self.loot.push(item);
            }
        }

        let center = self.map.center();
        let brick = self.create_item(ItemKind::SpecialBrick, center);
        self.loot.push(brick);
    }

    /// Spawn enemies: standard tier anywhere, boss tier on a ring around the player
    pub fn spawn_enemies(&mut self, count: u32, tier: EnemyTier) {
        let player_pos = self.player.pos;
        let ring = self.tuning.reinforcement_distance;
        for _ in 0..count {
            let pos = match tier {
                EnemyTier::Standard => self.random_free_spot(),
                EnemyTier::Boss => self.free_spot(|rng, _| {
                    let angle = rng.random_range(0.0..std::f32::consts::TAU);
                    player_pos + crate::from_heading(angle) * ring
                }),
            };
            let id = self.next_entity_id();
            let enemy = Enemy::new(id, tier, pos, &self.tuning, self.time_ticks);
            self.enemies.push(enemy);
        }
    }

    fn spawn_extractions(&mut self) {
        let inset = self.tuning.extraction_edge_inset;
        let size = self.map.size;
        for _ in 0..self.tuning.extraction_points {
            let pos = match self.rng.random_range(0..4u8) {
                0 => Vec2::new(self.rng.random_range(0.0..size.x), inset),
                1 => Vec2::new(size.x - inset, self.rng.random_range(0.0..size.y)),
                2 => Vec2::new(self.rng.random_range(0.0..size.x), size.y - inset),
                _ => Vec2::new(inset, self.rng.random_range(0.0..size.y)),
            };
            self.extraction_points.push(ExtractionPoint {
                pos,
                radius: self.tuning.extraction_radius,
                active: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Difficulty, PlayerClass};

    fn params(seed: u64) -> SessionParams {
        SessionParams {
            class: PlayerClass::Assault,
            difficulty: Difficulty::Normal,
            seed,
        }
    }

    #[test]
    fn test_new_session_population() {
        let session = Session::with_defaults(params(5));
        let t = &session.tuning;
        let expected_loot = t.common_loot + t.rare_loot + t.medkits + t.ammo_crates + 1;
        assert_eq!(session.loot.len(), expected_loot as usize);
        assert_eq!(session.enemies.len(), 10);
        assert_eq!(session.extraction_points.len(), 2);
        assert!(!session.map.is_blocked(session.player.pos));
        assert_eq!(session.player.health, 120.0);
        assert_eq!(session.player.ammo, 60);
        assert_eq!(session.outcome, Outcome::Running);
    }

    #[test]
    fn test_single_brick_at_center() {
        let session = Session::with_defaults(params(9));
        let bricks: Vec<_> = session
            .loot
            .iter()
            .filter(|i| i.kind == ItemKind::SpecialBrick)
            .collect();
        assert_eq!(bricks.len(), 1);
        assert_eq!(bricks[0].pos, Some(session.map.center()));
    }

    #[test]
    fn test_difficulty_scales_enemy_count() {
        let hard = Session::with_defaults(SessionParams {
            difficulty: Difficulty::Hard,
            ..params(1)
        });
        let insane = Session::with_defaults(SessionParams {
            difficulty: Difficulty::Insane,
            ..params(1)
        });
        assert_eq!(hard.enemies.len(), 15);
        assert_eq!(insane.enemies.len(), 20);
    }

    #[test]
    fn test_extraction_points_on_edges() {
        for seed in 0..10 {
            let session = Session::with_defaults(params(seed));
            for ep in &session.extraction_points {
                let on_edge = ep.pos.x == 100.0
                    || ep.pos.y == 100.0
                    || ep.pos.x == 2900.0
                    || ep.pos.y == 2900.0;
                assert!(on_edge, "extraction point {:?} not on an edge", ep.pos);
                assert!(ep.active);
            }
        }
    }

    #[test]
    fn test_constructors_share_start_path() {
        let checked = Session::new(params(11), Tuning::default()).unwrap();
        let quick = Session::with_defaults(params(11));
        assert_eq!(checked.map.obstacles, quick.map.obstacles);
        assert_eq!(checked.player.pos, quick.player.pos);
        assert_eq!(checked.loot, quick.loot);
        assert_eq!(checked.next_id, quick.next_id);
    }

    #[test]
    fn test_invalid_tuning_fails_fast() {
        let tuning = Tuning {
            inventory_slots: 0,
            ..Tuning::default()
        };
        assert!(Session::new(params(1), tuning).is_err());
    }

    #[test]
    fn test_player_damage_and_heal_clamp() {
        let mut session = Session::with_defaults(params(3));
        let p = &mut session.player;
        p.heal(500.0);
        assert_eq!(p.health, p.max_health);
        assert!(!p.take_damage(10.0));
        assert!(p.take_damage(1000.0));
        assert_eq!(p.health, 0.0);
        // Already dead: no second death
        assert!(!p.take_damage(10.0));
        p.add_ammo(1000);
        assert_eq!(p.ammo, p.max_ammo);
    }
}
