//! AI decision layer
//!
//! One decision pass per CPU fighter per frame: re-acquire a target, face
//! it, then approach, attack, or block. All probabilities are independent
//! per-frame Bernoulli trials scaled by the difficulty tuning, so behaviors
//! can coincide and get burstier at high frame rates.

use rand::Rng;

use crate::combat::{sign, FrameFx};
use crate::fighter::{self, nearest_living_enemy, Fighter, Team};
use crate::game_state::GameConfig;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Past this horizontal distance the AI closes in instead of engaging.
pub const APPROACH_DISTANCE: f32 = 140.0;

/// Velocity added per frame while approaching, scaled by aggression.
pub const APPROACH_FORCE: f32 = 900.0;

/// Per-frame trial chances, scaled by the tuning scalars.
pub const ATTACK_CHANCE: f32 = 0.015;
pub const BLOCK_CHANCE: f32 = 0.015;
pub const JUMP_CHANCE: f32 = 0.003;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// Behavior scalars, selected wholesale from the difficulty each frame.
#[derive(Clone, Copy, Debug)]
pub struct AiTuning {
    pub aggression: f32,
    pub defense: f32,
    pub jumpiness: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            aggression: 1.0,
            defense: 1.0,
            jumpiness: 1.0,
        }
    }
}

// =============================================================================
// AI LOGIC
// =============================================================================

/// Runs one decision pass for fighter `i`. Skipped for human fighters and
/// the dead; a designated dummy enemy stands still for testing.
pub fn think<R: Rng>(
    fighters: &mut [Fighter],
    i: usize,
    cfg: &GameConfig,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    if fighters[i].is_human() || !fighters[i].alive() {
        return;
    }
    if cfg.dummy_enemy && fighters[i].team == Team::Right {
        let f = &mut fighters[i];
        f.vx = 0.0;
        f.blocking = false;
        return;
    }

    fighters[i].tuning = cfg.difficulty.ai_tuning();

    // The target is a weak index: re-validate liveness, then re-acquire the
    // nearest living enemy.
    let me_team = fighters[i].team;
    let target_ok = fighters[i]
        .target
        .and_then(|t| fighters.get(t))
        .map_or(false, |t| t.alive() && t.team != me_team);
    if !target_ok {
        fighters[i].target = nearest_living_enemy(fighters, i);
    }
    let Some(tj) = fighters[i].target else {
        return;
    };
    let dist = fighters[tj].x - fighters[i].x;

    fighters[i].dir = if dist > 0.0 { 1.0 } else { -1.0 };
    let tuning = fighters[i].tuning;
    if dist.abs() > APPROACH_DISTANCE {
        fighters[i].vx += APPROACH_FORCE * tuning.aggression * sign(dist);
    } else if fighters[i].atk_cooldown <= 0.0 && rng.gen::<f32>() < ATTACK_CHANCE * tuning.aggression
    {
        let mult = cfg.difficulty.damage_multiplier();
        fighter::attack(fighters, i, mult, fx, rng);
    } else {
        fighters[i].blocking = rng.gen::<f32>() < BLOCK_CHANCE * tuning.defense;
    }
    if rng.gen::<f32>() < JUMP_CHANCE * tuning.jumpiness && fighters[i].grounded {
        fighters[i].jump();
    }
}

// =============================================================================
// TESTS
// =============================================================================
