//! Cosmetic spark particles
//!
//! Sparks have no gameplay effect; they exist so the renderer has impact
//! feedback to draw. Expired sparks are filtered out at end of update.

use rand::Rng;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Sparks spawned per impact burst.
pub const BURST_COUNT: usize = 12;

/// Per-update velocity decay.
pub const SPARK_DRAG: f32 = 0.96;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

#[derive(Clone, Copy, Debug)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: &'static str,
    pub t: f32,
    pub life: f32,
}

// =============================================================================
// SPARK LOGIC
// =============================================================================

/// Spawns a radial burst of sparks at an impact point.
pub fn spawn_spark_burst<R: Rng>(
    effects: &mut Vec<Spark>,
    x: f32,
    y: f32,
    color: &'static str,
    rng: &mut R,
) {
    for _ in 0..BURST_COUNT {
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let speed = 100.0 + rng.gen::<f32>() * 220.0;
        effects.push(Spark {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            color,
            t: 0.0,
            life: 0.25 + rng.gen::<f32>() * 0.2,
        });
    }
}

pub fn update_effects(effects: &mut Vec<Spark>, dt: f32) {
    for e in effects.iter_mut() {
        e.t += dt;
        e.x += e.vx * dt;
        e.y += e.vy * dt;
        e.vx *= SPARK_DRAG;
        e.vy *= SPARK_DRAG;
    }
    effects.retain(|e| e.t < e.life);
}

// =============================================================================
// TESTS
// =============================================================================
