//! Stage management
//!
//! Contains the arena dimensions, world/time-of-day selection, and the
//! background image cache. Backgrounds load on worker threads and are only
//! ever polled by the frame tick; a missing image just means the renderer
//! draws the flat backdrop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Logical render resolution.
pub const BASE_WIDTH: f32 = 1280.0;
pub const BASE_HEIGHT: f32 = 720.0;

/// Floor height fighters stand on.
pub const GROUND_Y: f32 = 600.0;

/// Horizontal stage margin; fighters are clamped to
/// `[WALL_MARGIN, BASE_WIDTH - WALL_MARGIN]`.
pub const WALL_MARGIN: f32 = 80.0;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum World {
    Village,
    Forest,
    Desert,
    City,
}

impl World {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "village" => Some(World::Village),
            "forest" => Some(World::Forest),
            "desert" => Some(World::Desert),
            "city" => Some(World::City),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            World::Village => "village",
            World::Forest => "forest",
            World::Desert => "desert",
            World::City => "city",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Day,
    Night,
}

// =============================================================================
// BACKGROUND CACHE
// =============================================================================

pub type BackgroundKey = (World, TimeOfDay);

enum BgEntry {
    Loading,
    Unavailable,
    Loaded(Arc<RgbaImage>),
}

/// Cache of world background images, keyed by (world, time-of-day).
/// Loads run on detached worker threads; results arrive over a channel
/// drained by `poll`.
pub struct BackgroundCache {
    root: PathBuf,
    entries: HashMap<BackgroundKey, BgEntry>,
    tx: Sender<(BackgroundKey, Option<RgbaImage>)>,
    rx: Receiver<(BackgroundKey, Option<RgbaImage>)>,
}

impl BackgroundCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            root: root.into(),
            entries: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Kicks off a load for the key unless one already happened. Idempotent,
    /// called every frame for the active world.
    pub fn request(&mut self, key: BackgroundKey) {
        if self.entries.contains_key(&key) {
            return;
        }
        self.entries.insert(key, BgEntry::Loading);
        let root = self.root.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = load_background(&root, key);
            let _ = tx.send((key, result));
        });
    }

    /// Drains finished loads into the cache. Never blocks.
    pub fn poll(&mut self) {
        for (key, result) in self.rx.try_iter() {
            let entry = match result {
                Some(img) => BgEntry::Loaded(Arc::new(img)),
                None => BgEntry::Unavailable,
            };
            self.entries.insert(key, entry);
        }
    }

    pub fn get(&self, key: BackgroundKey) -> Option<&Arc<RgbaImage>> {
        match self.entries.get(&key) {
            Some(BgEntry::Loaded(img)) => Some(img),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Tries the hand-made variant first, then the generated default.
fn load_background(root: &Path, (world, tod): BackgroundKey) -> Option<RgbaImage> {
    let suffix = match tod {
        TimeOfDay::Night => "_night",
        TimeOfDay::Day => "",
    };
    let candidates = [
        format!("{}_custom{}.png", world.as_str(), suffix),
        format!("{}_custom.png", world.as_str()),
        format!("{}{}.png", world.as_str(), suffix),
    ];
    for name in &candidates {
        match image::open(root.join(name)) {
            Ok(img) => {
                debug!(world = world.as_str(), file = %name, "background loaded");
                return Some(img.to_rgba8());
            }
            Err(_) => continue,
        }
    }
    warn!(world = world.as_str(), ?tod, "no background image found");
    None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_parse_round_trips() {
        for world in [World::Village, World::Forest, World::Desert, World::City] {
            assert_eq!(World::parse(world.as_str()), Some(world));
        }
        assert_eq!(World::parse("moon"), None);
    }

    #[test]
    fn missing_background_resolves_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = BackgroundCache::new(dir.path());
        let key = (World::Forest, TimeOfDay::Night);
        cache.request(key);
        // Wait for the worker to report back, then drain.
        for _ in 0..100 {
            cache.poll();
            if !matches!(cache.entries.get(&key), Some(BgEntry::Loading)) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(cache.get(key).is_none());
        assert!(matches!(cache.entries.get(&key), Some(BgEntry::Unavailable)));
    }

    #[test]
    fn custom_background_wins_over_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let custom = RgbaImage::from_pixel(2, 1, image::Rgba([1, 2, 3, 255]));
        custom
            .save(dir.path().join("desert_custom.png"))
            .expect("save custom");
        let fallback = RgbaImage::from_pixel(1, 1, image::Rgba([9, 9, 9, 255]));
        fallback
            .save(dir.path().join("desert.png"))
            .expect("save default");

        let img = load_background(dir.path(), (World::Desert, TimeOfDay::Day)).expect("loaded");
        assert_eq!(img.width(), 2);
    }
}
