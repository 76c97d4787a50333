//! Sprite animation and atlas loading
//!
//! Sheets are (character, action) keyed atlases produced by the offline
//! sprite pipeline: a JSON frame list plus a same-named PNG. Loads run on
//! detached worker threads and land in a cache the frame tick polls; a
//! failed or missing sheet is cached as unavailable so the resolver falls
//! back to an oriented idle pose instead of retrying every frame.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::roster::CharacterId;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Playback rate before the first action is assigned.
pub const DEFAULT_FPS: f32 = 10.0;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// Cache key: character plus action sheet name.
pub type SheetKey = (CharacterId, &'static str);

/// A sub-rectangle of the sheet image, one per animation frame.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Deserialize)]
struct AtlasFrame {
    frame: FrameRect,
}

#[derive(Deserialize)]
struct AtlasDoc {
    frames: Vec<AtlasFrame>,
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("atlas read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("atlas is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("sheet image failed to decode: {0}")]
    Image(#[from] image::ImageError),
    #[error("atlas has no frames")]
    Empty,
}

/// A decoded sheet: backing image plus ordered frame rectangles. The loader
/// rejects empty atlases; a directly inserted sheet with no frames is
/// treated as missing by the resolver.
#[derive(Debug)]
pub struct Sheet {
    pub image: Arc<RgbaImage>,
    pub frames: Vec<FrameRect>,
}

enum SheetEntry {
    Loading,
    Unavailable,
    Loaded(Arc<Sheet>),
}

/// Everything the renderer needs to blit one frame. A negative `dw` means
/// the destination rectangle is mirrored (drawn right-to-left from `dx`).
pub struct DrawCommand {
    pub sheet: Arc<Sheet>,
    pub src: FrameRect,
    pub dx: f32,
    pub dy: f32,
    pub dw: f32,
    pub dh: f32,
}

// =============================================================================
// SHEET CACHE
// =============================================================================

/// Process-lifetime cache of loaded sheets, plus the per-character
/// single-frame-action configuration.
pub struct SheetCache {
    root: PathBuf,
    entries: HashMap<SheetKey, SheetEntry>,
    tx: Sender<(SheetKey, Option<Sheet>)>,
    rx: Receiver<(SheetKey, Option<Sheet>)>,
    single_frame: HashMap<String, HashSet<String>>,
}

impl SheetCache {
    /// `root` is the sheet output directory (`<root>/<char>/<action>.json`);
    /// `config_path` points at the single-frame-action config JSON.
    pub fn new(root: impl Into<PathBuf>, config_path: &Path) -> Self {
        let (tx, rx) = unbounded();
        Self {
            root: root.into(),
            entries: HashMap::new(),
            tx,
            rx,
            single_frame: load_anim_config(config_path),
        }
    }

    /// Starts a load for the key unless one already ran or is in flight.
    pub fn request(&mut self, key: SheetKey) {
        if self.entries.contains_key(&key) {
            return;
        }
        self.entries.insert(key, SheetEntry::Loading);
        let root = self.root.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = match load_sheet(&root, key) {
                Ok(sheet) => Some(sheet),
                Err(err) => {
                    warn!(character = key.0.as_str(), action = key.1, %err, "sheet unavailable");
                    None
                }
            };
            let _ = tx.send((key, result));
        });
    }

    /// Drains finished loads into the cache. Never blocks; called once per
    /// frame tick before any fighter updates.
    pub fn poll(&mut self) {
        for (key, result) in self.rx.try_iter() {
            let entry = match result {
                Some(sheet) => {
                    debug!(character = key.0.as_str(), action = key.1, "sheet loaded");
                    SheetEntry::Loaded(Arc::new(sheet))
                }
                None => SheetEntry::Unavailable,
            };
            self.entries.insert(key, entry);
        }
    }

    pub fn get(&self, key: SheetKey) -> Option<&Arc<Sheet>> {
        match self.entries.get(&key) {
            Some(SheetEntry::Loaded(sheet)) => Some(sheet),
            _ => None,
        }
    }

    /// Inserts a decoded sheet directly (asset tools and tests).
    pub fn insert(&mut self, key: SheetKey, sheet: Sheet) {
        self.entries.insert(key, SheetEntry::Loaded(Arc::new(sheet)));
    }

    /// Dropped on round reset so regenerated assets are picked up.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether this (character, action) pair must hold frame 0.
    pub fn is_single_frame(&self, char_id: CharacterId, action: &str) -> bool {
        self.single_frame
            .get(char_id.as_str())
            .is_some_and(|actions| actions.contains(action))
    }
}

/// Loads the single-frame-action config, falling back to the built-in
/// default when the file is absent or malformed.
fn load_anim_config(path: &Path) -> HashMap<String, HashSet<String>> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice::<HashMap<String, HashSet<String>>>(&bytes) {
            Ok(config) => config,
            Err(err) => {
                warn!(?path, %err, "bad anim config, using default");
                default_anim_config()
            }
        },
        Err(_) => {
            debug!(?path, "no anim config, using default");
            default_anim_config()
        }
    }
}

fn default_anim_config() -> HashMap<String, HashSet<String>> {
    let mut config = HashMap::new();
    config.insert(
        "kiba".to_string(),
        ["idle", "attack1", "jump"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    );
    config
}

/// Synchronous load used by the worker threads: atlas JSON, then image.
fn load_sheet(root: &Path, (char_id, action): SheetKey) -> Result<Sheet, SheetError> {
    let json_path = root.join(char_id.as_str()).join(format!("{action}.json"));
    let doc: AtlasDoc = serde_json::from_slice(&fs::read(json_path)?)?;
    if doc.frames.is_empty() {
        return Err(SheetError::Empty);
    }
    let image_path = root.join(char_id.as_str()).join(format!("{action}.png"));
    let image = image::open(image_path)?.to_rgba8();
    Ok(Sheet {
        image: Arc::new(image),
        frames: doc.frames.into_iter().map(|f| f.frame).collect(),
    })
}

// =============================================================================
// SPRITE ANIMATOR
// =============================================================================

/// Drives frame timing for one fighter and resolves a drawable frame with
/// the idle fallback chain.
#[derive(Clone, Debug)]
pub struct SpriteAnimator {
    pub char_id: CharacterId,
    pub action: &'static str,
    pub frame_index: usize,
    pub acc: f32,
    pub fps: f32,
}

impl SpriteAnimator {
    pub fn new(char_id: CharacterId, cache: &mut SheetCache) -> Self {
        // Preload only idle; other actions load on demand.
        cache.request((char_id, "idle"));
        Self {
            char_id,
            action: "idle",
            frame_index: 0,
            acc: 0.0,
            fps: DEFAULT_FPS,
        }
    }

    /// Switches action, resetting playback and requesting the sheet.
    pub fn set_action(&mut self, action: &'static str, fps: f32, cache: &mut SheetCache) {
        if self.action == action {
            return;
        }
        self.action = action;
        self.fps = fps;
        self.frame_index = 0;
        self.acc = 0.0;
        cache.request((self.char_id, action));
    }

    /// Advances frame timing. Frame-rate independent: a slow frame steps the
    /// index several times to catch up. Single-frame actions pin frame 0.
    pub fn update(&mut self, dt: f32, cache: &SheetCache) {
        let Some(sheet) = cache.get((self.char_id, self.action)) else {
            return;
        };
        if sheet.frames.is_empty() {
            return;
        }
        if cache.is_single_frame(self.char_id, self.action) {
            self.frame_index = 0;
            return;
        }
        self.acc += dt;
        let spf = 1.0 / self.fps;
        while self.acc >= spf {
            self.acc -= spf;
            self.frame_index = (self.frame_index + 1) % sheet.frames.len();
        }
    }

    /// Resolves a drawable frame for the destination box, or `None` when no
    /// sheet (not even idle) is available yet.
    ///
    /// Fallback order: exact sheet; a missing directional idle falls back to
    /// neutral idle with facing forced to the requested side; any other
    /// missing action falls back to the idle sheet matching `dir`, then
    /// neutral idle. Dedicated directional idle sheets are drawn as-is;
    /// every other case mirrors the destination rect when facing left.
    pub fn frame(
        &self,
        cache: &SheetCache,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
        dir: f32,
    ) -> Option<DrawCommand> {
        // A sheet with no frames counts as missing for fallback purposes.
        let usable = |key| cache.get(key).filter(|s| !s.frames.is_empty());
        let directional_idle = self.action == "idle_left" || self.action == "idle_right";
        let mut sheet = usable((self.char_id, self.action));
        let mut used_fallback = false;
        let mut forced_facing = None;

        if sheet.is_none() && directional_idle {
            sheet = usable((self.char_id, "idle"));
            used_fallback = true;
            forced_facing = Some(if self.action == "idle_left" { -1.0 } else { 1.0 });
        }
        if sheet.is_none() && !directional_idle {
            let prefer = if dir < 0.0 { "idle_left" } else { "idle_right" };
            sheet = usable((self.char_id, prefer)).or_else(|| usable((self.char_id, "idle")));
            used_fallback = true;
            forced_facing = Some(dir);
        }
        let sheet = sheet?;

        let src = sheet.frames[self.frame_index.min(sheet.frames.len() - 1)];
        let effective_dir = forced_facing.unwrap_or(dir);
        let dedicated_idle = directional_idle && !used_fallback;
        if dedicated_idle || effective_dir >= 0.0 {
            Some(DrawCommand {
                sheet: Arc::clone(sheet),
                src,
                dx,
                dy,
                dw,
                dh,
            })
        } else {
            // Mirror the destination rect, not the source.
            Some(DrawCommand {
                sheet: Arc::clone(sheet),
                src,
                dx: dx + dw,
                dy,
                dw: -dw,
                dh,
            })
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::CharacterId;

    fn empty_cache() -> SheetCache {
        SheetCache::new(PathBuf::from("missing"), Path::new("missing.json"))
    }

    fn sheet(frames: usize) -> Sheet {
        Sheet {
            image: Arc::new(RgbaImage::new(4, 4)),
            frames: (0..frames)
                .map(|i| FrameRect {
                    x: i as u32 * 4,
                    y: 0,
                    w: 4,
                    h: 4,
                })
                .collect(),
        }
    }

    #[test]
    fn frame_advance_catches_up_on_slow_frames() {
        let mut cache = empty_cache();
        cache.insert((CharacterId::Rai, "run"), sheet(4));
        let mut anim = SpriteAnimator::new(CharacterId::Rai, &mut cache);
        anim.set_action("run", 10.0, &mut cache);

        // 0.35s at 10 fps advances 3 frames in one update.
        anim.update(0.35, &cache);
        assert_eq!(anim.frame_index, 3);
        // Wraps modulo frame count.
        anim.update(0.1, &cache);
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn single_frame_action_pins_frame_zero() {
        let mut cache = empty_cache();
        // "kiba" has idle configured single-frame by the built-in default.
        cache.insert((CharacterId::Kiba, "idle"), sheet(6));
        let mut anim = SpriteAnimator::new(CharacterId::Kiba, &mut cache);
        anim.update(10.0, &cache);
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn missing_directional_idle_falls_back_to_neutral() {
        let mut cache = empty_cache();
        cache.insert((CharacterId::Goro, "idle"), sheet(1));
        let mut anim = SpriteAnimator::new(CharacterId::Goro, &mut cache);
        anim.set_action("idle_left", 8.0, &mut cache);

        // Fallback to neutral idle forces the requested facing: mirrored.
        let cmd = anim.frame(&cache, 0.0, 0.0, 68.0, 120.0, 1.0).expect("frame");
        assert_eq!(cmd.dw, -68.0);
        assert_eq!(cmd.dx, 68.0);
    }

    #[test]
    fn missing_action_falls_back_to_oriented_idle() {
        let mut cache = empty_cache();
        cache.insert((CharacterId::Goro, "idle_left"), sheet(2));
        let mut anim = SpriteAnimator::new(CharacterId::Goro, &mut cache);
        anim.set_action("hit", 8.0, &mut cache);

        // Facing left, idle_left exists: reached via fallback, so it is
        // mirrored like any non-dedicated case.
        let cmd = anim.frame(&cache, 10.0, 0.0, 68.0, 120.0, -1.0).expect("frame");
        assert_eq!(cmd.dw, -68.0);
        assert_eq!(cmd.dx, 78.0);
    }

    #[test]
    fn empty_sheet_counts_as_missing() {
        let mut cache = empty_cache();
        cache.insert((CharacterId::Goro, "run"), sheet(0));
        cache.insert((CharacterId::Goro, "idle"), sheet(1));
        let mut anim = SpriteAnimator::new(CharacterId::Goro, &mut cache);
        anim.set_action("run", 16.0, &mut cache);

        anim.update(1.0, &cache);
        assert_eq!(anim.frame_index, 0);
        // Resolves through the fallback chain instead of the empty sheet.
        let cmd = anim.frame(&cache, 0.0, 0.0, 68.0, 120.0, 1.0).expect("frame");
        assert_eq!(cmd.src, FrameRect { x: 0, y: 0, w: 4, h: 4 });
    }

    #[test]
    fn no_sheets_at_all_fails_cleanly() {
        let cache = empty_cache();
        let mut scratch = empty_cache();
        let anim = SpriteAnimator::new(CharacterId::Hana, &mut scratch);
        assert!(anim.frame(&cache, 0.0, 0.0, 68.0, 120.0, 1.0).is_none());
    }

    #[test]
    fn dedicated_directional_idle_never_flips() {
        let mut cache = empty_cache();
        cache.insert((CharacterId::Goro, "idle_left"), sheet(1));
        let mut anim = SpriteAnimator::new(CharacterId::Goro, &mut cache);
        anim.set_action("idle_left", 8.0, &mut cache);

        let cmd = anim.frame(&cache, 10.0, 0.0, 68.0, 120.0, -1.0).expect("frame");
        assert_eq!(cmd.dw, 68.0);
        assert_eq!(cmd.dx, 10.0);
    }

    #[test]
    fn load_sheet_reads_atlas_and_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let char_dir = dir.path().join("rai");
        fs::create_dir_all(&char_dir).expect("mkdir");
        fs::write(
            char_dir.join("walk.json"),
            r#"{"frames":[{"frame":{"x":0,"y":0,"w":8,"h":8}},{"frame":{"x":8,"y":0,"w":8,"h":8}}]}"#,
        )
        .expect("write atlas");
        RgbaImage::new(16, 8)
            .save(char_dir.join("walk.png"))
            .expect("write image");

        let sheet = load_sheet(dir.path(), (CharacterId::Rai, "walk")).expect("load");
        assert_eq!(sheet.frames.len(), 2);
        assert_eq!(sheet.frames[1], FrameRect { x: 8, y: 0, w: 8, h: 8 });
    }

    #[test]
    fn malformed_atlas_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let char_dir = dir.path().join("rai");
        fs::create_dir_all(&char_dir).expect("mkdir");
        // An HTML error page instead of JSON.
        fs::write(char_dir.join("walk.json"), "<html>not found</html>").expect("write");

        let err = load_sheet(dir.path(), (CharacterId::Rai, "walk")).unwrap_err();
        assert!(matches!(err, SheetError::Malformed(_)));
    }

    #[test]
    fn failed_load_is_cached_as_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = SheetCache::new(dir.path(), Path::new("missing.json"));
        let key = (CharacterId::Mirei, "slide");
        cache.request(key);
        for _ in 0..100 {
            cache.poll();
            if !matches!(cache.entries.get(&key), Some(SheetEntry::Loading)) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(cache.get(key).is_none());
        assert!(matches!(cache.entries.get(&key), Some(SheetEntry::Unavailable)));
        // A second request must not restart the load.
        cache.request(key);
        assert!(matches!(cache.entries.get(&key), Some(SheetEntry::Unavailable)));
    }
}
