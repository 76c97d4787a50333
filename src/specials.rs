//! Special attacks and projectiles
//!
//! Each character resolves to a fixed special behavior at construction; a
//! cast either spawns projectiles or lands an instant melee arc. Projectiles
//! fly ballistically under mild gravity and share the melee damage path.

use rand::Rng;

use crate::combat::{overlaps, resolve_melee_hit, take_damage, FrameFx, HitBox};
use crate::effects::spawn_spark_burst;
use crate::fighter::{Fighter, Team};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Base projectile launch speed along facing.
pub const PROJECTILE_SPEED: f32 = 700.0;

/// Mild downward pull on projectiles.
pub const PROJECTILE_GRAVITY: f32 = 400.0;

/// Instant melee arc dimensions and camera kick.
pub const ARC_RANGE: f32 = 140.0;
pub const ARC_HEIGHT: f32 = 120.0;
pub const ARC_SHAKE: f32 = 18.0;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// Special behavior, resolved once per fighter at construction instead of
/// re-matched per cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialKind {
    /// Three projectiles fanned vertically.
    TripleFan,
    /// One long-range orb that passes through its first target.
    PiercingOrb,
    /// Instant short-range melee arc with a heavy camera kick.
    CrimsonArc,
    /// One fast, high-damage, short-lived bolt.
    LightningBolt,
    /// One slower, arcing nail.
    RisingNail,
    /// Fallback for characters without a bespoke special.
    Generic,
}

impl SpecialKind {
    pub fn cooldown(self) -> f32 {
        match self {
            SpecialKind::TripleFan => 3.0,
            SpecialKind::PiercingOrb => 3.2,
            SpecialKind::CrimsonArc => 2.6,
            SpecialKind::LightningBolt => 3.0,
            SpecialKind::RisingNail => 2.8,
            SpecialKind::Generic => 2.5,
        }
    }
}

/// Ephemeral projectile owned by the global active list.
#[derive(Clone, Copy, Debug)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub team: Team,
    pub dmg: f32,
    pub kb: f32,
    pub color: &'static str,
    pub life: f32,
    pub pierce: bool,
    pub remove: bool,
}

impl Projectile {
    /// Baseline projectile; specials override fields with struct update.
    pub fn base(x: f32, y: f32, vx: f32, vy: f32, team: Team, color: &'static str) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            w: 22.0,
            h: 22.0,
            team,
            dmg: 12.0,
            kb: 300.0,
            color,
            life: 1.8,
            pierce: false,
            remove: false,
        }
    }
}

// =============================================================================
// SPECIAL DISPATCH
// =============================================================================

/// Casts fighter `i`'s special and arms its cooldown. Call sites gate on
/// `sp_cooldown`.
pub fn cast<R: Rng>(
    fighters: &mut [Fighter],
    i: usize,
    projectiles: &mut Vec<Projectile>,
    difficulty_mult: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    let (kind, x, y, w, h, dir, team, aura) = {
        let f = &fighters[i];
        (f.special, f.x, f.y, f.w, f.h, f.dir, f.team, f.aura)
    };
    fighters[i].sp_cooldown = kind.cooldown();

    let bx = x + dir * (w / 2.0 + 10.0);
    let by = y - h + 60.0;
    let speed = PROJECTILE_SPEED * dir;

    match kind {
        SpecialKind::TripleFan => {
            for k in -1..=1i32 {
                projectiles.push(Projectile {
                    y: by + k as f32 * 6.0,
                    vy: -50.0 + k as f32 * 40.0,
                    dmg: 10.0,
                    kb: 260.0,
                    ..Projectile::base(bx, by, speed, 0.0, team, aura)
                });
            }
        }
        SpecialKind::PiercingOrb => {
            projectiles.push(Projectile {
                w: 26.0,
                h: 26.0,
                dmg: 16.0,
                kb: 340.0,
                life: 2.2,
                pierce: true,
                ..Projectile::base(bx, by, speed * 0.8, 0.0, team, aura)
            });
        }
        SpecialKind::CrimsonArc => {
            let hitbox = HitBox {
                x: x + dir * (w / 2.0 + ARC_RANGE / 2.0),
                y: y - h / 2.0,
                w: ARC_RANGE,
                h: ARC_HEIGHT,
            };
            resolve_melee_hit(fighters, i, hitbox, difficulty_mult, fx, rng);
            spawn_spark_burst(fx.effects, hitbox.x, hitbox.y, aura, rng);
            fx.camera.set_shake(ARC_SHAKE);
        }
        SpecialKind::LightningBolt => {
            projectiles.push(Projectile {
                dmg: 20.0,
                kb: 420.0,
                life: 1.1,
                ..Projectile::base(bx, by - 20.0, speed * 1.2, 0.0, team, aura)
            });
        }
        SpecialKind::RisingNail => {
            projectiles.push(Projectile {
                dmg: 14.0,
                kb: 320.0,
                ..Projectile::base(bx, by, speed * 0.7, -60.0, team, aura)
            });
        }
        SpecialKind::Generic => {
            projectiles.push(Projectile::base(bx, by, speed, 0.0, team, aura));
        }
    }
}

// =============================================================================
// PROJECTILE SIMULATION
// =============================================================================

/// Integrates every projectile, applies hits against living enemies of the
/// opposing team, and filters out removed entries at end of frame.
pub fn update_projectiles<R: Rng>(
    projectiles: &mut Vec<Projectile>,
    fighters: &mut [Fighter],
    dt: f32,
    difficulty_mult: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    for p in projectiles.iter_mut() {
        p.life -= dt;
        if p.life <= 0.0 {
            p.remove = true;
        }
        p.x += p.vx * dt;
        p.y += p.vy * dt;
        p.vy += PROJECTILE_GRAVITY * dt;

        for f in fighters.iter_mut() {
            if !f.alive() || f.team == p.team {
                continue;
            }
            let body = HitBox {
                x: p.x,
                y: p.y,
                w: p.w,
                h: p.h,
            };
            if overlaps(&body, &f.hurtbox()) {
                take_damage(f, p.x, p.dmg * difficulty_mult, p.kb, fx, rng);
                spawn_spark_burst(fx.effects, p.x, p.y, p.color, rng);
                if !p.pierce {
                    p.remove = true;
                    break;
                }
            }
        }
    }
    projectiles.retain(|p| !p.remove);
}

// =============================================================================
// TESTS
// =============================================================================
