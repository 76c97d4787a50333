//! Match state management
//!
//! Contains the match phase machine, session configuration, camera, and the
//! per-frame HUD snapshot handed to the UI layer.

use tracing::debug;

use crate::ai::AiTuning;
use crate::fighter::{Fighter, Team};
use crate::stage::{TimeOfDay, World, BASE_WIDTH};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Round length in seconds.
pub const ROUND_TIME: f32 = 90.0;

/// Camera follow interpolation rate (per second).
pub const CAMERA_FOLLOW_RATE: f32 = 4.0;

/// Horizontal camera travel limit, either side of center.
pub const CAMERA_CLAMP: f32 = 100.0;

/// Shake amplitude cap.
pub const SHAKE_CAP: f32 = 18.0;

/// Per-update shake decay.
pub const SHAKE_DECAY: f32 = 0.9;

/// Shake phase advance rate (per second).
pub const SHAKE_PHASE_RATE: f32 = 50.0;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// Coarse match state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    Select,  // roster/settings screen
    Playing, // active round
    Over,    // round decided, waiting for replay/reselect
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    OneVsOne,
    TwoVsTwo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// Global damage scale applied to every hit roll.
    pub fn damage_multiplier(self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }

    /// AI tuning selected wholesale from the difficulty.
    pub fn ai_tuning(self) -> AiTuning {
        match self {
            Difficulty::Easy => AiTuning {
                aggression: 0.25,
                defense: 0.3,
                jumpiness: 0.3,
            },
            Difficulty::Hard => AiTuning {
                aggression: 0.8,
                defense: 1.1,
                jumpiness: 0.9,
            },
            Difficulty::Normal => AiTuning {
                aggression: 0.5,
                defense: 0.7,
                jumpiness: 0.6,
            },
        }
    }
}

/// Session-scoped settings written by the UI layer. String setters validate
/// against an allow-list and silently coerce bad values to the default.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub dummy_enemy: bool,
    pub p2_human: bool,
    pub world: World,
    pub tod: TimeOfDay,
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            mode: Mode::TwoVsTwo,
            difficulty: Difficulty::Normal,
            dummy_enemy: false,
            p2_human: false,
            world: World::Village,
            tod: TimeOfDay::Day,
        }
    }

    pub fn set_mode(&mut self, value: &str) {
        self.mode = match value {
            "1v1" => Mode::OneVsOne,
            "2v2" => Mode::TwoVsTwo,
            other => {
                debug!(value = other, "unknown mode, using 2v2");
                Mode::TwoVsTwo
            }
        };
    }

    pub fn set_difficulty(&mut self, value: &str) {
        self.difficulty = match value {
            "easy" => Difficulty::Easy,
            "normal" => Difficulty::Normal,
            "hard" => Difficulty::Hard,
            other => {
                debug!(value = other, "unknown difficulty, using normal");
                Difficulty::Normal
            }
        };
    }

    pub fn set_world(&mut self, value: &str) {
        self.world = World::parse(value).unwrap_or_else(|| {
            debug!(value, "unknown world, using village");
            World::Village
        });
    }

    pub fn set_tod(&mut self, value: &str) {
        self.tod = match value {
            "night" => TimeOfDay::Night,
            _ => TimeOfDay::Day,
        };
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CAMERA
// =============================================================================

/// Side-scroll camera with additive shake.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub x: f32,
    pub shake: f32,
    pub shake_phase: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            shake: 0.0,
            shake_phase: 0.0,
        }
    }

    /// Adds shake from a hit, capped so stacked hits don't go wild.
    pub fn add_shake(&mut self, amount: f32) {
        self.shake = (self.shake + amount).min(SHAKE_CAP);
    }

    /// Sets shake outright (heavy special impacts).
    pub fn set_shake(&mut self, amount: f32) {
        self.shake = amount.min(SHAKE_CAP);
    }

    /// Render-space offset produced by the current shake.
    pub fn offset(&self) -> (f32, f32) {
        if self.shake > 0.0 {
            (
                self.shake_phase.sin() * self.shake,
                (self.shake_phase * 1.3).cos() * self.shake * 0.5,
            )
        } else {
            (0.0, 0.0)
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Follows the midpoint of the alive fighters' horizontal extent.
pub fn update_camera(camera: &mut Camera, fighters: &[Fighter], dt: f32) {
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    for f in fighters.iter().filter(|f| f.alive()) {
        min_x = min_x.min(f.x);
        max_x = max_x.max(f.x);
    }
    if min_x.is_finite() {
        let center = (min_x + max_x) / 2.0;
        camera.x = lerp(camera.x, center - BASE_WIDTH / 2.0, CAMERA_FOLLOW_RATE * dt);
        camera.x = camera.x.clamp(-CAMERA_CLAMP, CAMERA_CLAMP);
    }
    if camera.shake > 0.0 {
        camera.shake_phase += dt * SHAKE_PHASE_RATE;
        camera.shake *= SHAKE_DECAY;
    }
}

// =============================================================================
// HUD SNAPSHOT
// =============================================================================

/// Read-only per-frame snapshot for the HUD.
#[derive(Clone, Debug)]
pub struct HudSnapshot {
    pub fighters: Vec<HudFighter>,
    /// Remaining round time, ceiled to whole seconds.
    pub timer: u32,
    pub announcer: String,
    pub phase: MatchPhase,
}

#[derive(Clone, Copy, Debug)]
pub struct HudFighter {
    pub name: &'static str,
    pub team: Team,
    pub hp_frac: f32,
}

// =============================================================================
// TESTS
// =============================================================================
