//! Combat resolution
//!
//! Contains the box overlap test, melee hit scanning, and damage/knockback
//! application shared by normal attacks, slide attacks, and projectiles.

use rand::Rng;

use crate::animation::SheetCache;
use crate::effects::{spawn_spark_burst, Spark};
use crate::fighter::{Action, Fighter, Team};
use crate::game_state::Camera;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Melee damage roll: `DAMAGE_BASE + rand * DAMAGE_SPREAD`, then the global
/// difficulty multiplier.
pub const DAMAGE_BASE: f32 = 12.0;
pub const DAMAGE_SPREAD: f32 = 6.0;

/// Knockback roll: `KNOCKBACK_BASE + rand * KNOCKBACK_SPREAD`.
pub const KNOCKBACK_BASE: f32 = 420.0;
pub const KNOCKBACK_SPREAD: f32 = 120.0;

/// Successful block scales.
pub const BLOCK_DAMAGE_SCALE: f32 = 0.25;
pub const BLOCK_KB_SCALE: f32 = 0.3;

/// Upward pop added to every connecting hit.
pub const KNOCKBACK_POP: f32 = 120.0;

/// Damage immunity window after a hit; stops one swing landing twice.
pub const INVUL_TIME: f32 = 0.18;

/// Camera shake added per hit.
pub const SHAKE_PER_HIT: f32 = 10.0;

/// Chance a landed melee hit updates the announcer line.
pub const ANNOUNCE_CHANCE: f32 = 0.4;

/// Spark colors per team.
pub const LEFT_SPARK: &str = "#6cf0ff";
pub const RIGHT_SPARK: &str = "#ff6c9b";

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// Axis-aligned box: center x, bottom-anchored y, full width/height.
#[derive(Clone, Copy, Debug)]
pub struct HitBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Mutable frame context threaded through hit resolution: camera shake,
/// spark spawning, announcer text, and the sheet cache (death poses request
/// their sheet the moment a fighter drops).
pub struct FrameFx<'a> {
    pub camera: &'a mut Camera,
    pub effects: &'a mut Vec<Spark>,
    pub announcer: &'a mut String,
    pub sheets: &'a mut SheetCache,
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// AABB overlap on (center-x, bottom-anchored-y, w, h) boxes. Vertical
/// overlap compares box centers derived from the top edge.
pub fn overlaps(a: &HitBox, b: &HitBox) -> bool {
    (a.x - b.x).abs() < (a.w / 2.0 + b.w / 2.0)
        && ((a.y - a.h / 2.0) - (b.y - b.h / 2.0)).abs() < (a.h / 2.0 + b.h / 2.0)
}

pub fn team_spark_color(team: Team) -> &'static str {
    match team {
        Team::Left => LEFT_SPARK,
        Team::Right => RIGHT_SPARK,
    }
}

// =============================================================================
// HIT RESOLUTION
// =============================================================================

/// Scans every living enemy against the attack box and applies a rolled
/// hit to each one that overlaps.
pub fn resolve_melee_hit<R: Rng>(
    fighters: &mut [Fighter],
    attacker: usize,
    hitbox: HitBox,
    difficulty_mult: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    let (attacker_x, attacker_team) = (fighters[attacker].x, fighters[attacker].team);
    // Probe box centered on the swing, offset down half its height.
    let probe = HitBox {
        x: hitbox.x,
        y: hitbox.y + hitbox.h / 2.0,
        w: hitbox.w,
        h: hitbox.h,
    };
    for j in 0..fighters.len() {
        if j == attacker || fighters[j].team == attacker_team || !fighters[j].alive() {
            continue;
        }
        if overlaps(&probe, &fighters[j].hurtbox()) {
            let dmg = (DAMAGE_BASE + rng.gen::<f32>() * DAMAGE_SPREAD) * difficulty_mult;
            let kb = KNOCKBACK_BASE + rng.gen::<f32>() * KNOCKBACK_SPREAD;
            take_damage(&mut fighters[j], attacker_x, dmg, kb, fx, rng);
            if rng.gen::<f32>() < ANNOUNCE_CHANCE {
                *fx.announcer = "Hit!".to_string();
            }
        }
    }
}

/// Applies a hit to `target`. No-op on the dead and the invulnerable; a
/// block facing the attacker cuts damage to 0.25x and knockback to 0.3x.
/// The knockback impulse uses the target's facing, which always tracks the
/// nearest living enemy, so it points away from the attacker.
pub fn take_damage<R: Rng>(
    target: &mut Fighter,
    from_x: f32,
    mut dmg: f32,
    mut kb: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    if !target.alive() {
        return;
    }
    if target.blocking && sign(from_x - target.x) == target.dir {
        dmg *= BLOCK_DAMAGE_SCALE;
        kb *= BLOCK_KB_SCALE;
    }
    if target.invul > 0.0 {
        return;
    }
    target.hp = (target.hp - dmg).max(0.0);
    target.vx += -target.dir * kb;
    target.vy -= KNOCKBACK_POP;
    target.invul = INVUL_TIME;
    fx.camera.add_shake(SHAKE_PER_HIT);
    spawn_spark_burst(
        fx.effects,
        target.x,
        target.y - target.h + 40.0,
        team_spark_color(target.team),
        rng,
    );
    if target.hp <= 0.0 {
        // Death pose while the body is still falling.
        target.force_action(Action::Death, fx.sheets);
    }
}

// =============================================================================
// TESTS
// =============================================================================
