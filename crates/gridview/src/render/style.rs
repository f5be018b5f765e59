use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::visual_key::{candidate_keys, validate_visual_key, VisualKey, VisualKeyError};

pub const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];
const STYLE_FILE_NAME: &str = "styles.json";

/// Built-in appearance table; a `styles.json` under the asset root merges
/// over these, and sprite files under `sprites/<key>.png` win over solids
/// at equal specificity.
const DEFAULT_SOLID_STYLES: &[(&str, [u8; 4])] = &[
    ("tile/floor", [44, 48, 58, 255]),
    ("tile/floor__thermal", [66, 38, 34, 255]),
    ("tile/floor__power", [34, 48, 66, 255]),
    ("tile/floor__highlight", [96, 104, 122, 255]),
    ("tile/wall", [24, 26, 33, 255]),
    ("tile/water", [38, 64, 92, 255]),
    ("tile/water__thermal", [52, 48, 80, 255]),
    ("unit/worker", [214, 178, 92, 255]),
    ("unit/worker__selected", [255, 226, 140, 255]),
    ("unit/scout", [120, 200, 140, 255]),
    ("unit/guard", [90, 140, 220, 255]),
    ("structure/generator", [200, 120, 60, 255]),
    ("structure/generator__unpowered", [120, 90, 70, 255]),
    ("structure/depot", [150, 150, 160, 255]),
    ("structure/turret", [180, 90, 90, 255]),
    ("hazard/fire", [240, 120, 40, 255]),
    ("hazard/breach", [140, 70, 160, 255]),
    ("hazard/radiation", [130, 220, 60, 255]),
];

#[derive(Debug)]
pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

#[derive(Debug)]
pub(crate) enum ResolvedStyle<'a> {
    Solid([u8; 4]),
    Sprite(&'a LoadedSprite),
    Placeholder,
}

/// Index into the candidate-key list recorded by the lookup pass.
enum StyleHit {
    Sprite(usize),
    Solid(usize),
}

#[derive(Debug, Error)]
pub enum StyleTableError {
    #[error("failed to read style table at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse style table at {path} ({location}): {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("style table at {path} has invalid visual key '{key}': {source}")]
    InvalidKey {
        path: PathBuf,
        key: String,
        #[source]
        source: VisualKeyError,
    },
}

#[derive(Debug, Default, Deserialize)]
struct StyleFile {
    #[serde(default)]
    solids: HashMap<String, [u8; 4]>,
}

#[derive(Debug)]
pub struct StyleTable {
    asset_root: Option<PathBuf>,
    solids: HashMap<String, [u8; 4]>,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_unresolved_keys: HashSet<String>,
}

impl StyleTable {
    pub fn with_defaults() -> Self {
        let solids = DEFAULT_SOLID_STYLES
            .iter()
            .map(|(key, color)| (key.to_string(), *color))
            .collect();
        Self {
            asset_root: None,
            solids,
            sprite_cache: HashMap::new(),
            warned_unresolved_keys: HashSet::new(),
        }
    }

    /// Defaults plus whatever `styles.json` under `asset_root` overrides.
    /// A missing file is not an error; a malformed one is.
    pub fn load(asset_root: &Path) -> Result<Self, StyleTableError> {
        let mut table = Self::with_defaults();
        table.asset_root = Some(asset_root.to_path_buf());

        let path = asset_root.join(STYLE_FILE_NAME);
        if !path.is_file() {
            debug!(path = %path.display(), "style_file_missing_using_defaults");
            return Ok(table);
        }
        let text = fs::read_to_string(&path).map_err(|source| StyleTableError::Read {
            path: path.clone(),
            source,
        })?;
        let mut deserializer = serde_json::Deserializer::from_str(&text);
        let file: StyleFile =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                StyleTableError::Parse {
                    path: path.clone(),
                    location: error.path().to_string(),
                    source: error.into_inner(),
                }
            })?;
        for (key, color) in file.solids {
            validate_visual_key(&key).map_err(|source| StyleTableError::InvalidKey {
                path: path.clone(),
                key: key.clone(),
                source,
            })?;
            table.solids.insert(key, color);
        }
        Ok(table)
    }

    /// Most specific candidate wins; for one candidate a sprite on disk wins
    /// over a solid. Unresolvable keys degrade to a placeholder per item and
    /// warn once per key. Caching happens in a first pass so the returned
    /// borrow never straddles a cache mutation.
    pub(crate) fn resolve(&mut self, key: &VisualKey) -> ResolvedStyle<'_> {
        let candidates = candidate_keys(key);
        let mut hit = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if self.ensure_sprite_cached(candidate) {
                hit = Some(StyleHit::Sprite(index));
                break;
            }
            if self.solids.contains_key(candidate.as_str()) {
                hit = Some(StyleHit::Solid(index));
                break;
            }
        }
        match hit {
            Some(StyleHit::Sprite(index)) => {
                match self
                    .sprite_cache
                    .get(candidates[index].as_str())
                    .and_then(Option::as_ref)
                {
                    Some(sprite) => ResolvedStyle::Sprite(sprite),
                    None => ResolvedStyle::Placeholder,
                }
            }
            Some(StyleHit::Solid(index)) => match self.solids.get(candidates[index].as_str()) {
                Some(color) => ResolvedStyle::Solid(*color),
                None => ResolvedStyle::Placeholder,
            },
            None => {
                self.warn_unresolved_once(key);
                ResolvedStyle::Placeholder
            }
        }
    }

    fn ensure_sprite_cached(&mut self, key: &str) -> bool {
        let Some(asset_root) = self.asset_root.as_deref() else {
            return false;
        };
        if let Some(entry) = self.sprite_cache.get(key) {
            return entry.is_some();
        }
        let path = asset_root.join("sprites").join(format!("{key}.png"));
        let sprite = match load_sprite_rgba(&path) {
            Ok(sprite) => Some(sprite),
            Err(reason) => {
                debug!(visual_key = key, path = %path.display(), reason, "sprite_unavailable");
                None
            }
        };
        let loaded = sprite.is_some();
        self.sprite_cache.insert(key.to_string(), sprite);
        loaded
    }

    fn warn_unresolved_once(&mut self, key: &VisualKey) {
        if !self.warned_unresolved_keys.insert(key.as_str().to_string()) {
            return;
        }
        warn!(visual_key = %key, "style_unresolved_using_placeholder");
    }

    #[cfg(test)]
    pub(crate) fn empty_for_tests() -> Self {
        Self {
            asset_root: None,
            solids: HashMap::new(),
            sprite_cache: HashMap::new(),
            warned_unresolved_keys: HashSet::new(),
        }
    }
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn key(text: &str) -> VisualKey {
        VisualKey::new(text).expect("key")
    }

    #[test]
    fn defaults_resolve_base_keys_as_solids() {
        let mut table = StyleTable::with_defaults();
        match table.resolve(&key("tile/floor")) {
            ResolvedStyle::Solid(color) => assert_eq!(color, [44, 48, 58, 255]),
            other => panic!("expected solid, got {other:?}"),
        }
    }

    #[test]
    fn variant_keys_fall_back_to_their_base() {
        let mut table = StyleTable::with_defaults();
        match table.resolve(&key("unit/guard__moving__selected")) {
            ResolvedStyle::Solid(color) => assert_eq!(color, [90, 140, 220, 255]),
            other => panic!("expected solid, got {other:?}"),
        }
    }

    #[test]
    fn more_specific_variant_entry_wins_over_the_base() {
        let mut table = StyleTable::with_defaults();
        match table.resolve(&key("unit/worker__selected")) {
            ResolvedStyle::Solid(color) => assert_eq!(color, [255, 226, 140, 255]),
            other => panic!("expected solid, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_degrades_to_placeholder() {
        let mut table = StyleTable::with_defaults();
        assert!(matches!(
            table.resolve(&key("unknown/thing")),
            ResolvedStyle::Placeholder
        ));
    }

    #[test]
    fn missing_style_file_loads_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let table = StyleTable::load(dir.path()).expect("table");
        assert!(table.solids.contains_key("tile/floor"));
    }

    #[test]
    fn style_file_overrides_merge_over_defaults() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("styles.json"),
            r#"{ "solids": { "tile/floor": [1, 2, 3, 255], "custom/marker": [9, 9, 9, 255] } }"#,
        )
        .expect("write");

        let mut table = StyleTable::load(dir.path()).expect("table");
        match table.resolve(&key("tile/floor")) {
            ResolvedStyle::Solid(color) => assert_eq!(color, [1, 2, 3, 255]),
            other => panic!("expected solid, got {other:?}"),
        }
        match table.resolve(&key("custom/marker")) {
            ResolvedStyle::Solid(color) => assert_eq!(color, [9, 9, 9, 255]),
            other => panic!("expected solid, got {other:?}"),
        }
        assert!(table.solids.contains_key("tile/wall"));
    }

    #[test]
    fn malformed_style_file_reports_the_failing_path() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("styles.json"),
            r#"{ "solids": { "tile/floor": [1, 2] } }"#,
        )
        .expect("write");

        let err = StyleTable::load(dir.path()).expect_err("err");
        match err {
            StyleTableError::Parse { location, .. } => {
                assert!(location.contains("tile/floor"), "location={location}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_visual_key_in_style_file_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("styles.json"),
            r#"{ "solids": { "Bad Key": [1, 2, 3, 255] } }"#,
        )
        .expect("write");

        let err = StyleTable::load(dir.path()).expect_err("err");
        assert!(matches!(err, StyleTableError::InvalidKey { .. }));
    }

    #[test]
    fn sprite_on_disk_wins_over_a_solid_for_the_same_key() {
        let dir = TempDir::new().expect("tempdir");
        let sprites = dir.path().join("sprites").join("tile");
        fs::create_dir_all(&sprites).expect("mkdir");
        let sprite = image::RgbaImage::from_pixel(2, 2, image::Rgba([7, 8, 9, 255]));
        sprite
            .save(sprites.join("floor.png"))
            .expect("save sprite");

        let mut table = StyleTable::load(dir.path()).expect("table");
        match table.resolve(&key("tile/floor")) {
            ResolvedStyle::Sprite(loaded) => {
                assert_eq!((loaded.width, loaded.height), (2, 2));
                assert_eq!(&loaded.rgba[0..4], &[7, 8, 9, 255]);
            }
            other => panic!("expected sprite, got {other:?}"),
        }
    }
}
