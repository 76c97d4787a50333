//! Character roster and scene composition
//!
//! Character definitions carry the display data and the special behavior
//! each fighter resolves at construction. `build_roster` rebuilds the full
//! fighter list for a round; fighters are never pooled across rounds.

use crate::animation::SheetCache;
use crate::fighter::{Control, Fighter, Team};
use crate::game_state::{GameConfig, Mode};
use crate::input::{P1_BINDING, P2_BINDING};
use crate::specials::SpecialKind;

// =============================================================================
// CONSTANTS
// =============================================================================

// Spawn slots: player, enemy, and the two 2v2 allies.
pub const P1_SPAWN_X: f32 = 300.0;
pub const P2_SPAWN_X: f32 = 1060.0;
pub const ALLY_LEFT_X: f32 = 220.0;
pub const ALLY_RIGHT_X: f32 = 980.0;

/// Default 2v2 allies.
pub const ALLY_LEFT: CharacterId = CharacterId::Mirei;
pub const ALLY_RIGHT: CharacterId = CharacterId::Hana;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharacterId {
    Kiba,
    Mirei,
    Goro,
    Rai,
    Hana,
}

impl CharacterId {
    /// Id string used by the asset store paths and the anim config.
    pub fn as_str(self) -> &'static str {
        match self {
            CharacterId::Kiba => "kiba",
            CharacterId::Mirei => "mirei",
            CharacterId::Goro => "goro",
            CharacterId::Rai => "rai",
            CharacterId::Hana => "hana",
        }
    }

    pub fn def(self) -> &'static CharacterDef {
        &ROSTER[self as usize]
    }
}

/// Static character definition consumed at fighter construction.
#[derive(Debug)]
pub struct CharacterDef {
    pub id: CharacterId,
    pub name: &'static str,
    pub color: &'static str,
    pub aura: &'static str,
    pub special: SpecialKind,
}

pub static ROSTER: [CharacterDef; 5] = [
    CharacterDef {
        id: CharacterId::Kiba,
        name: "Kiba",
        color: "#ffb703",
        aura: "#ffd166",
        special: SpecialKind::TripleFan,
    },
    CharacterDef {
        id: CharacterId::Mirei,
        name: "Mirei",
        color: "#5e7bff",
        aura: "#9bb0ff",
        special: SpecialKind::PiercingOrb,
    },
    CharacterDef {
        id: CharacterId::Goro,
        name: "Goro",
        color: "#ff3b6e",
        aura: "#ff6c9b",
        special: SpecialKind::CrimsonArc,
    },
    CharacterDef {
        id: CharacterId::Rai,
        name: "Rai",
        color: "#3f62ff",
        aura: "#7aa2ff",
        special: SpecialKind::LightningBolt,
    },
    CharacterDef {
        id: CharacterId::Hana,
        name: "Hana",
        color: "#ff6a33",
        aura: "#ff8f66",
        special: SpecialKind::RisingNail,
    },
];

/// Characters picked on the select screen.
#[derive(Clone, Copy, Debug)]
pub struct Selection {
    pub p1: CharacterId,
    pub p2: CharacterId,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            p1: CharacterId::Kiba,
            p2: CharacterId::Rai,
        }
    }
}

// =============================================================================
// SCENE COMPOSITION
// =============================================================================

/// Builds the round's fighter list from the selection and match mode.
/// Order is L1, R2 in 1v1 and L1, L2, R1, R2 in 2v2.
pub fn build_roster(
    cfg: &GameConfig,
    selection: Selection,
    sheets: &mut SheetCache,
) -> Vec<Fighter> {
    let p2_control = if cfg.mode == Mode::OneVsOne && cfg.p2_human {
        Control::Human(P2_BINDING)
    } else {
        Control::Cpu
    };
    let mut fighters = vec![
        Fighter::new(
            selection.p1.def(),
            P1_SPAWN_X,
            Team::Left,
            Control::Human(P1_BINDING),
            sheets,
        ),
        Fighter::new(selection.p2.def(), P2_SPAWN_X, Team::Right, p2_control, sheets),
    ];
    if cfg.mode == Mode::TwoVsTwo {
        fighters.insert(
            1,
            Fighter::new(ALLY_LEFT.def(), ALLY_LEFT_X, Team::Left, Control::Cpu, sheets),
        );
        fighters.insert(
            2,
            Fighter::new(ALLY_RIGHT.def(), ALLY_RIGHT_X, Team::Right, Control::Cpu, sheets),
        );
    }
    fighters
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::test_support::test_cache;

    #[test]
    fn two_v_two_builds_four_in_slot_order() {
        let mut sheets = test_cache();
        let cfg = GameConfig::new();
        let fighters = build_roster(&cfg, Selection::default(), &mut sheets);
        assert_eq!(fighters.len(), 4);
        assert_eq!(fighters[0].team, Team::Left);
        assert_eq!(fighters[1].team, Team::Left);
        assert_eq!(fighters[2].team, Team::Right);
        assert_eq!(fighters[3].team, Team::Right);
        assert!(fighters[0].is_human());
        assert!(!fighters[3].is_human());
    }

    #[test]
    fn one_v_one_builds_two() {
        let mut sheets = test_cache();
        let mut cfg = GameConfig::new();
        cfg.set_mode("1v1");
        let fighters = build_roster(&cfg, Selection::default(), &mut sheets);
        assert_eq!(fighters.len(), 2);
        assert!(!fighters[1].is_human());
    }

    #[test]
    fn second_player_can_be_human_in_one_v_one() {
        let mut sheets = test_cache();
        let mut cfg = GameConfig::new();
        cfg.set_mode("1v1");
        cfg.p2_human = true;
        let fighters = build_roster(&cfg, Selection::default(), &mut sheets);
        assert!(fighters[1].is_human());

        // 2v2 ignores the toggle.
        cfg.set_mode("2v2");
        let fighters = build_roster(&cfg, Selection::default(), &mut sheets);
        assert!(!fighters[3].is_human());
    }

    #[test]
    fn defs_line_up_with_ids() {
        for id in [
            CharacterId::Kiba,
            CharacterId::Mirei,
            CharacterId::Goro,
            CharacterId::Rai,
            CharacterId::Hana,
        ] {
            assert_eq!(id.def().id, id);
        }
    }
}
