//! Fighter state and physics
//!
//! Contains the Fighter struct, the per-frame physics update, action-state
//! derivation, and the crouch/slide mechanics. Hit application lives in
//! `combat`; decisions (human input, AI) feed velocity and triggers in from
//! `ai` and the input block below.

use rand::Rng;

use crate::ai::AiTuning;
use crate::animation::{DrawCommand, SheetCache, SpriteAnimator};
use crate::combat::{
    overlaps, resolve_melee_hit, take_damage, FrameFx, HitBox, DAMAGE_BASE, DAMAGE_SPREAD,
    KNOCKBACK_BASE, KNOCKBACK_SPREAD,
};
use crate::game_state::GameConfig;
use crate::input::{Binding, InputState};
use crate::roster::{CharacterDef, CharacterId};
use crate::specials::{self, Projectile, SpecialKind};
use crate::stage::{BASE_WIDTH, GROUND_Y, WALL_MARGIN};

// =============================================================================
// CONSTANTS
// =============================================================================

// Physics (per-second rates; positions integrate by dt)
pub const GRAVITY: f32 = 2000.0;
pub const FRICTION: f32 = 6.0;
pub const JUMP_VELOCITY: f32 = -750.0;

/// Velocity added per frame while a movement key is held. A force, not a
/// velocity set: it compounds against the friction decay.
pub const MOVE_FORCE: f32 = 1500.0;

// Dead bodies keep falling but stop fighting.
pub const DEAD_DRAG: f32 = 0.95;
pub const DEAD_GRAVITY: f32 = 1500.0;

// Fighter dimensions
pub const FIGHTER_W: f32 = 68.0;
pub const FIGHTER_H: f32 = 120.0;
pub const CROUCH_SCALE: f32 = 0.7;

// Combat
pub const MAX_HP: f32 = 100.0;
pub const ATTACK_COOLDOWN: f32 = 0.45;
pub const ATTACK_RANGE: f32 = 90.0;
pub const ATTACK_HEIGHT: f32 = 80.0;

/// The attack pose holds while the cooldown is above this remainder.
pub const ATTACK_RECENT: f32 = 0.1;

// Action speed thresholds
pub const WALK_SPEED: f32 = 40.0;
pub const RUN_SPEED: f32 = 160.0;
pub const SLIDE_SPEED: f32 = 250.0;

// Afterimage trail
pub const TRAIL_CAP: usize = 8;
pub const TRAIL_SPEED: f32 = 50.0;
pub const TRAIL_RECOVERY: f32 = 0.3;

/// Slide tuning block.
pub struct SlideTuning {
    pub impulse: f32,
    pub duration: f32,
    pub range: f32,
    pub height: f32,
    pub hit_cooldown: f32,
    pub friction: f32,
    pub damage_scale: f32,
    pub kb_scale: f32,
}

pub const SLIDE: SlideTuning = SlideTuning {
    impulse: 1600.0,
    duration: 0.32,
    range: 80.0,
    height: 60.0,
    hit_cooldown: 0.15,
    friction: 0.992,
    damage_scale: 0.5,
    kb_scale: 0.8,
};

// =============================================================================
// DATA STRUCTURES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    Left,
    Right,
}

/// Who drives this fighter.
#[derive(Clone, Copy, Debug)]
pub enum Control {
    Human(Binding),
    Cpu,
}

/// The active action state. Exactly one is active at any time; derivation
/// order in `derive_action` decides which.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    IdleLeft,
    IdleRight,
    Walk,
    Run,
    Jump,
    Crouch,
    Slide,
    Attack,
    Hit,
    Death,
    Victory,
}

impl Action {
    /// Sheet name in the atlas store.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Action::IdleLeft => "idle_left",
            Action::IdleRight => "idle_right",
            Action::Walk => "walk",
            Action::Run => "run",
            Action::Jump => "jump",
            Action::Crouch => "crouch",
            Action::Slide => "slide",
            Action::Attack => "attack1",
            Action::Hit => "hit",
            Action::Death => "death",
            Action::Victory => "victory",
        }
    }

    /// Per-action playback rate.
    pub fn fps(self) -> f32 {
        match self {
            Action::Walk => 12.0,
            Action::Run => 16.0,
            Action::Attack => 16.0,
            Action::Slide => 12.0,
            Action::Crouch => 6.0,
            _ => 8.0,
        }
    }
}

/// A recorded past position for afterimage rendering. `t` is the sample's
/// age; the renderer fades on it.
#[derive(Clone, Copy, Debug)]
pub struct TrailSample {
    pub x: f32,
    pub y: f32,
    pub dir: f32,
    pub t: f32,
}

/// One combatant. Position is bottom-center anchored; `dir` is +1 facing
/// right, -1 facing left.
pub struct Fighter {
    // Identity
    pub id: CharacterId,
    pub name: &'static str,
    pub team: Team,
    pub control: Control,
    pub color: &'static str,
    pub aura: &'static str,

    // Kinematics
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub dir: f32,
    pub w: f32,
    pub h: f32,
    pub base_h: f32,
    pub grounded: bool,

    // Combat state
    pub max_hp: f32,
    pub hp: f32,
    pub atk_cooldown: f32,
    pub sp_cooldown: f32,
    pub invul: f32,
    pub blocking: bool,
    pub want_down: bool,
    pub crouching: bool,
    pub slide_timer: f32,
    pub slide_hit_cooldown: f32,
    pub special: SpecialKind,

    // Animation
    pub current_action: Action,
    pub anim: SpriteAnimator,
    pub trail: Vec<TrailSample>,

    // AI
    pub tuning: AiTuning,
    /// Weak reference into the roster; re-validated every frame.
    pub target: Option<usize>,
}

impl Fighter {
    pub fn new(
        def: &'static CharacterDef,
        x: f32,
        team: Team,
        control: Control,
        sheets: &mut SheetCache,
    ) -> Self {
        Self {
            id: def.id,
            name: def.name,
            team,
            control,
            color: def.color,
            aura: def.aura,
            x,
            y: GROUND_Y,
            vx: 0.0,
            vy: 0.0,
            dir: 1.0,
            w: FIGHTER_W,
            h: FIGHTER_H,
            base_h: FIGHTER_H,
            grounded: false,
            max_hp: MAX_HP,
            hp: MAX_HP,
            atk_cooldown: 0.0,
            sp_cooldown: 0.0,
            invul: 0.0,
            blocking: false,
            want_down: false,
            crouching: false,
            slide_timer: 0.0,
            slide_hit_cooldown: 0.0,
            special: def.special,
            current_action: Action::IdleRight,
            anim: SpriteAnimator::new(def.id, sheets),
            trail: Vec::new(),
            tuning: AiTuning::default(),
            target: None,
        }
    }

    pub fn alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn is_human(&self) -> bool {
        matches!(self.control, Control::Human(_))
    }

    /// Damageable body area.
    pub fn hurtbox(&self) -> HitBox {
        HitBox {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    pub fn jump(&mut self) {
        self.vy = JUMP_VELOCITY;
        self.grounded = false;
    }

    /// Forces a pose outside normal derivation (death, victory).
    pub fn force_action(&mut self, action: Action, sheets: &mut SheetCache) {
        self.current_action = action;
        self.anim.set_action(action.sheet_name(), action.fps(), sheets);
    }

    /// Resolves the current drawable frame, if any sheet is available.
    pub fn draw(&self, cache: &SheetCache) -> Option<DrawCommand> {
        let dx = self.x - self.w / 2.0;
        let dy = self.y - self.h;
        self.anim.frame(cache, dx, dy, self.w, self.h, self.dir)
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Living enemy with the smallest horizontal distance.
pub fn nearest_living_enemy(fighters: &[Fighter], i: usize) -> Option<usize> {
    let me_x = fighters[i].x;
    let me_team = fighters[i].team;
    let mut best: Option<(usize, f32)> = None;
    for (j, f) in fighters.iter().enumerate() {
        if f.team == me_team || !f.alive() {
            continue;
        }
        let d = (f.x - me_x).abs();
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((j, d));
        }
    }
    best.map(|(j, _)| j)
}

// =============================================================================
// FIGHTER LOGIC
// =============================================================================

/// Starts a melee swing: arms the cooldown and immediately resolves one hit
/// test in front of the fighter along its facing.
pub fn attack<R: Rng>(
    fighters: &mut [Fighter],
    i: usize,
    difficulty_mult: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    let (x, y, w, h, dir) = {
        let f = &fighters[i];
        (f.x, f.y, f.w, f.h, f.dir)
    };
    fighters[i].atk_cooldown = ATTACK_COOLDOWN;
    let hitbox = HitBox {
        x: x + dir * (w / 2.0 + ATTACK_RANGE / 2.0),
        y: y - h / 2.0,
        w: ATTACK_RANGE,
        h: ATTACK_HEIGHT,
    };
    resolve_melee_hit(fighters, i, hitbox, difficulty_mult, fx, rng);
}

/// Ordered action derivation; first match wins, so slide pre-empts run only
/// while crouching, and the attack pose holds through the recent-cooldown
/// window.
fn derive_action(f: &Fighter) -> Action {
    let speed = f.vx.abs();
    if !f.grounded {
        Action::Jump
    } else if f.atk_cooldown > ATTACK_RECENT {
        Action::Attack
    } else if f.crouching && f.grounded && speed > SLIDE_SPEED {
        Action::Slide
    } else if f.crouching && f.grounded {
        Action::Crouch
    } else if speed > RUN_SPEED {
        Action::Run
    } else if speed > WALK_SPEED {
        Action::Walk
    } else if f.dir < 0.0 {
        Action::IdleLeft
    } else {
        Action::IdleRight
    }
}

/// Per-frame fighter update. Fixed order: timers, input, damping + gravity,
/// integration, ground/bounds clamp, crouch, facing, trail, action
/// derivation, animation, slide hits.
#[allow(clippy::too_many_arguments)]
pub fn update<R: Rng>(
    fighters: &mut [Fighter],
    i: usize,
    dt: f32,
    input: &InputState,
    cfg: &GameConfig,
    projectiles: &mut Vec<Projectile>,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    if !fighters[i].alive() {
        // Combat logic is frozen; the body decays and keeps falling.
        let f = &mut fighters[i];
        f.vx *= DEAD_DRAG;
        f.vy += DEAD_GRAVITY * dt;
        f.y += f.vy * dt;
        return;
    }

    {
        let f = &mut fighters[i];
        f.atk_cooldown -= dt;
        f.invul -= dt;
        f.sp_cooldown -= dt;
        f.slide_timer -= dt;
        f.slide_hit_cooldown -= dt;
    }

    let mult = cfg.difficulty.damage_multiplier();

    if let Control::Human(binding) = fighters[i].control {
        apply_human_input(fighters, i, binding, input, projectiles, mult, fx, rng);
    }

    {
        let f = &mut fighters[i];
        f.vx += -f.vx * FRICTION * dt;
        f.vy += GRAVITY * dt;
        f.x += f.vx * dt;
        f.y += f.vy * dt;
        if f.y >= GROUND_Y {
            f.y = GROUND_Y;
            f.vy = 0.0;
            f.grounded = true;
        } else {
            f.grounded = false;
        }
        f.crouching = f.want_down && f.grounded;
        f.h = if f.crouching {
            (f.base_h * CROUCH_SCALE).round()
        } else {
            f.base_h
        };
        f.x = f.x.clamp(WALL_MARGIN, BASE_WIDTH - WALL_MARGIN);
    }

    // Always square up to the nearest living threat, human or not.
    if let Some(j) = nearest_living_enemy(fighters, i) {
        fighters[i].dir = if fighters[j].x - fighters[i].x >= 0.0 {
            1.0
        } else {
            -1.0
        };
    }

    {
        let f = &mut fighters[i];
        for s in &mut f.trail {
            s.t += dt;
        }
        if f.vx.abs() > TRAIL_SPEED || f.atk_cooldown > TRAIL_RECOVERY {
            f.trail.push(TrailSample {
                x: f.x,
                y: f.y,
                dir: f.dir,
                t: 0.0,
            });
            if f.trail.len() > TRAIL_CAP {
                f.trail.remove(0);
            }
        }
    }

    let action = derive_action(&fighters[i]);
    if fighters[i].anim.action != action.sheet_name() {
        let f = &mut fighters[i];
        f.current_action = action;
        f.anim.set_action(action.sheet_name(), action.fps(), fx.sheets);
        if action == Action::Slide {
            // One-shot impulse on entering the slide.
            f.vx += f.dir * SLIDE.impulse;
            f.slide_timer = f.slide_timer.max(SLIDE.duration);
            f.slide_hit_cooldown = 0.0;
        }
    }
    fighters[i].anim.update(dt, fx.sheets);

    if fighters[i].slide_timer > 0.0 {
        update_slide_hits(fighters, i, mult, fx, rng);
        fighters[i].vx *= SLIDE.friction;
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_human_input<R: Rng>(
    fighters: &mut [Fighter],
    i: usize,
    binding: Binding,
    input: &InputState,
    projectiles: &mut Vec<Projectile>,
    difficulty_mult: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    let left = input.is_held(binding.left);
    let right = input.is_held(binding.right);
    let up = input.is_held(binding.up);
    let down = input.is_held(binding.down);
    let atk = input.is_active(binding.attack);
    let sp = input.is_active(binding.special);
    let block = input.is_held(binding.block);

    {
        let f = &mut fighters[i];
        if left {
            f.vx -= MOVE_FORCE;
        }
        if right {
            f.vx += MOVE_FORCE;
        }
        f.blocking = block;
        f.want_down = down;
    }
    if up && fighters[i].grounded {
        fighters[i].jump();
    }
    if atk && fighters[i].atk_cooldown <= 0.0 {
        attack(fighters, i, difficulty_mult, fx, rng);
    }
    if sp && fighters[i].sp_cooldown <= 0.0 {
        specials::cast(fighters, i, projectiles, difficulty_mult, fx, rng);
    }
}

/// While the slide timer runs, a forward hitbox lands reduced hits at a
/// fixed sub-interval, independent of the main attack cooldown.
fn update_slide_hits<R: Rng>(
    fighters: &mut [Fighter],
    i: usize,
    difficulty_mult: f32,
    fx: &mut FrameFx<'_>,
    rng: &mut R,
) {
    if fighters[i].slide_hit_cooldown > 0.0 {
        return;
    }
    let (ax, ay, aw, ah, adir, ateam) = {
        let f = &fighters[i];
        (f.x, f.y, f.w, f.h, f.dir, f.team)
    };
    let hitbox = HitBox {
        x: ax + adir * (aw / 2.0 + SLIDE.range / 2.0),
        y: ay - ah / 2.0 + 20.0,
        w: SLIDE.range,
        h: SLIDE.height,
    };
    for j in 0..fighters.len() {
        if j == i || fighters[j].team == ateam || !fighters[j].alive() {
            continue;
        }
        if overlaps(&hitbox, &fighters[j].hurtbox()) {
            let dmg =
                (DAMAGE_BASE + rng.gen::<f32>() * DAMAGE_SPREAD) * difficulty_mult * SLIDE.damage_scale;
            let kb = (KNOCKBACK_BASE + rng.gen::<f32>() * KNOCKBACK_SPREAD) * SLIDE.kb_scale;
            take_damage(&mut fighters[j], ax, dmg, kb, fx, rng);
            *fx.announcer = "Slide!".to_string();
            break;
        }
    }
    fighters[i].slide_hit_cooldown = SLIDE.hit_cooldown;
}

// =============================================================================
// TEST SUPPORT
// =============================================================================


// =============================================================================
// TESTS
// =============================================================================
