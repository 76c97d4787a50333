//! AURA CLASH - sprite-based arena fighter core
//!
//! Real-time 1v1/2v2 fighter simulation: per-frame physics, melee and
//! special-attack combat, difficulty-tuned AI, projectiles, and sprite-atlas
//! animation with an idle fallback chain. Rendering and UI live outside the
//! crate; they feed inputs in through `InputState` and read `DrawCommand`s
//! and the `HudSnapshot` back out each frame.

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

pub mod ai;
pub mod animation;
pub mod combat;
pub mod effects;
pub mod fighter;
pub mod game_state;
pub mod input;
pub mod roster;
pub mod specials;
pub mod stage;

pub use animation::{DrawCommand, FrameRect, Sheet, SheetCache, SheetError, SpriteAnimator};
pub use combat::{FrameFx, HitBox};
pub use effects::Spark;
pub use fighter::{Action, Control, Fighter, Team};
pub use game_state::{
    Camera, Difficulty, GameConfig, HudFighter, HudSnapshot, MatchPhase, Mode,
};
pub use input::{Binding, InputState, P1_BINDING, P2_BINDING};
pub use roster::{CharacterDef, CharacterId, Selection, ROSTER};
pub use specials::{Projectile, SpecialKind};
pub use stage::{BackgroundCache, TimeOfDay, World};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Upper bound on the physics step: slow frames and tab refocus advance at
/// most this much per tick.
pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

// =============================================================================
// GAME
// =============================================================================

/// The whole simulation: roster, projectiles, effects, caches, match flow.
/// Everything mutates inside `frame`, single-threaded; the asset loader
/// threads only ever talk to the caches through their channels.
pub struct Game {
    pub config: GameConfig,
    pub selection: Selection,
    pub phase: MatchPhase,
    pub round_time: f32,
    pub round_active: bool,
    pub announcer: String,
    pub camera: Camera,
    pub fighters: Vec<Fighter>,
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<Spark>,
    pub input: InputState,
    pub sheets: SheetCache,
    pub backgrounds: BackgroundCache,
    rng: StdRng,
}

impl Game {
    /// `asset_root` holds `sheet_out/` and `assets/` as produced by the
    /// offline sprite pipeline.
    pub fn new(asset_root: impl AsRef<Path>) -> Self {
        Self::with_rng(asset_root, StdRng::from_entropy())
    }

    /// Seeded variant for deterministic runs.
    pub fn with_seed(asset_root: impl AsRef<Path>, seed: u64) -> Self {
        Self::with_rng(asset_root, StdRng::seed_from_u64(seed))
    }

    fn with_rng(asset_root: impl AsRef<Path>, rng: StdRng) -> Self {
        let root = asset_root.as_ref();
        let sheets = SheetCache::new(
            root.join("sheet_out"),
            &root.join("assets").join("anim-config.json"),
        );
        let backgrounds = BackgroundCache::new(root.join("assets").join("worlds"));
        let mut game = Self {
            config: GameConfig::new(),
            selection: Selection::default(),
            phase: MatchPhase::Select,
            round_time: game_state::ROUND_TIME,
            round_active: false,
            announcer: "Select".to_string(),
            camera: Camera::new(),
            fighters: Vec::new(),
            projectiles: Vec::new(),
            effects: Vec::new(),
            input: InputState::new(),
            sheets,
            backgrounds,
            rng,
        };
        game.reset_round();
        game
    }

    // -------------------------------------------------------------------------
    // Match flow
    // -------------------------------------------------------------------------

    /// Rebuilds the round from scratch: fresh roster, cleared projectiles,
    /// effects, camera, and caches.
    pub fn reset_round(&mut self) {
        self.round_time = game_state::ROUND_TIME;
        self.round_active = false;
        self.announcer = "Select".to_string();
        self.projectiles.clear();
        self.effects.clear();
        self.camera = Camera::new();
        self.sheets.clear();
        self.backgrounds.clear();
        self.fighters = roster::build_roster(&self.config, self.selection, &mut self.sheets);
    }

    /// Leaves the select screen and starts a round.
    pub fn start_match(&mut self) {
        self.reset_round();
        self.phase = MatchPhase::Playing;
        self.round_active = true;
        self.announcer = "Ready".to_string();
        info!(mode = ?self.config.mode, difficulty = ?self.config.difficulty, "match started");
    }

    /// Replays with the same selection after a round ends.
    pub fn replay(&mut self) {
        self.reset_round();
        self.phase = MatchPhase::Playing;
        self.round_active = true;
    }

    /// Back to the select screen.
    pub fn to_select(&mut self) {
        self.phase = MatchPhase::Select;
    }

    fn team_hp(&self, team: Team) -> f32 {
        self.fighters
            .iter()
            .filter(|f| f.team == team)
            .map(|f| f.hp)
            .sum()
    }

    fn team_alive(&self, team: Team) -> usize {
        self.fighters
            .iter()
            .filter(|f| f.team == team && f.alive())
            .count()
    }

    fn finish_round(&mut self, winner: Team) {
        self.round_active = false;
        self.phase = MatchPhase::Over;
        self.announcer = match winner {
            Team::Left => "Left Team Wins!",
            Team::Right => "Right Team Wins!",
        }
        .to_string();
        info!(?winner, "round over");
        for f in &mut self.fighters {
            let pose = if f.team == winner {
                Action::Victory
            } else {
                Action::Death
            };
            f.force_action(pose, &mut self.sheets);
        }
    }

    // -------------------------------------------------------------------------
    // Frame tick
    // -------------------------------------------------------------------------

    /// Advances the simulation one display frame. All gameplay mutation
    /// happens here, before rendering; asset loads are only polled.
    pub fn frame(&mut self, dt: f32) {
        let dt = dt.min(MAX_FRAME_DT);
        self.sheets.poll();
        self.backgrounds.poll();
        self.backgrounds.request((self.config.world, self.config.tod));

        // Round timer; timeout is decided by summed remaining health.
        if self.phase == MatchPhase::Playing && self.round_active {
            self.round_time -= dt;
            if self.round_time <= 0.0 {
                let winner = if self.team_hp(Team::Left) >= self.team_hp(Team::Right) {
                    Team::Left
                } else {
                    Team::Right
                };
                self.finish_round(winner);
            }
        }

        if self.phase == MatchPhase::Playing {
            let mult = self.config.difficulty.damage_multiplier();
            let mut fx = FrameFx {
                camera: &mut self.camera,
                effects: &mut self.effects,
                announcer: &mut self.announcer,
                sheets: &mut self.sheets,
            };
            for i in 0..self.fighters.len() {
                ai::think(&mut self.fighters, i, &self.config, &mut fx, &mut self.rng);
                fighter::update(
                    &mut self.fighters,
                    i,
                    dt,
                    &self.input,
                    &self.config,
                    &mut self.projectiles,
                    &mut fx,
                    &mut self.rng,
                );
            }
            effects::update_effects(fx.effects, dt);
            specials::update_projectiles(
                &mut self.projectiles,
                &mut self.fighters,
                dt,
                mult,
                &mut fx,
                &mut self.rng,
            );
            game_state::update_camera(fx.camera, &self.fighters, dt);
        }

        // Mid-round knockout is decided by living members, not health.
        if self.phase == MatchPhase::Playing && self.round_active {
            let left_alive = self.team_alive(Team::Left);
            let right_alive = self.team_alive(Team::Right);
            if left_alive == 0 || right_alive == 0 {
                let winner = if left_alive > 0 { Team::Left } else { Team::Right };
                self.finish_round(winner);
            }
        }

        self.input.end_frame();
    }

    // -------------------------------------------------------------------------
    // UI surface
    // -------------------------------------------------------------------------

    /// Read-only per-frame snapshot for the HUD.
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            fighters: self
                .fighters
                .iter()
                .map(|f| HudFighter {
                    name: f.name,
                    team: f.team,
                    hp_frac: (f.hp / f.max_hp).clamp(0.0, 1.0),
                })
                .collect(),
            timer: self.round_time.max(0.0).ceil() as u32,
            announcer: self.announcer.clone(),
            phase: self.phase,
        }
    }

    /// The active world background, once loaded.
    pub fn background(&self) -> Option<&Arc<RgbaImage>> {
        self.backgrounds.get((self.config.world, self.config.tod))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_game() -> Game {
        Game::with_seed("missing-assets", 7)
    }

    #[test]
    fn new_game_sits_on_select_with_a_roster() {
        let game = test_game();
        assert_eq!(game.phase, MatchPhase::Select);
        assert!(!game.round_active);
        assert_eq!(game.fighters.len(), 4);
    }

    #[test]
    fn hud_reports_health_fractions_and_timer() {
        let mut game = test_game();
        game.start_match();
        game.fighters[0].hp = 50.0;
        game.round_time = 12.3;
        let hud = game.hud();
        assert_eq!(hud.fighters.len(), 4);
        assert_eq!(hud.fighters[0].hp_frac, 0.5);
        assert_eq!(hud.timer, 13);
        assert_eq!(hud.phase, MatchPhase::Playing);
    }

    #[test]
    fn replay_rebuilds_the_roster() {
        let mut game = test_game();
        game.start_match();
        game.fighters[0].hp = 1.0;
        game.projectiles.push(Projectile::base(
            0.0,
            0.0,
            0.0,
            0.0,
            Team::Left,
            "#fff",
        ));
        game.replay();
        assert_eq!(game.phase, MatchPhase::Playing);
        assert!(game.round_active);
        assert_eq!(game.fighters[0].hp, game.fighters[0].max_hp);
        assert!(game.projectiles.is_empty());
    }

    #[test]
    fn frame_clamps_dt_and_ticks_the_timer() {
        let mut game = test_game();
        game.start_match();
        let before = game.round_time;
        // A 2-second hitch still only advances one clamped step.
        game.frame(2.0);
        assert!((before - game.round_time - MAX_FRAME_DT).abs() < 1e-4);
    }
}
