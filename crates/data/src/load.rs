use anyhow::{bail, Context};
use dealrun_core::{
    EconomyRule, EncounterRule, GameConfig, HandRule, JokerDef, LevelRule, MapRule,
    RandomRoomRule, RankRule, RunRule, ShopRule,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const HANDS_FILE: &str = "hands.json";
const RANKS_FILE: &str = "ranks.json";
const ENCOUNTERS_FILE: &str = "encounters.json";
const LEVELS_FILE: &str = "levels.json";
const ECONOMY_FILE: &str = "economy.json";
const SHOP_FILE: &str = "shop.json";
const JOKERS_FILE: &str = "jokers.json";
const RUN_FILE: &str = "run.json";
const MAP_FILE: &str = "map.json";
const RANDOM_ROOM_FILE: &str = "random_room.json";

/// `assets/` at the workspace root.
pub fn default_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

/// Loads a config split across one file per section. Scoring, encounter,
/// economy, shop and joker tables are required; run, map and random-room
/// tuning fall back to the built-in values when their file is missing.
pub fn load_game_config(dir: &Path) -> anyhow::Result<GameConfig> {
    if !dir.is_dir() {
        bail!("config directory {} does not exist", dir.display());
    }
    let hands: Vec<HandRule> = load_json(dir.join(HANDS_FILE))?;
    let encounters: Vec<EncounterRule> = load_json(dir.join(ENCOUNTERS_FILE))?;
    let levels: Vec<LevelRule> = load_json(dir.join(LEVELS_FILE))?;
    let economy: EconomyRule = load_json(dir.join(ECONOMY_FILE))?;
    let shop: ShopRule = load_json(dir.join(SHOP_FILE))?;
    let jokers: Vec<JokerDef> = load_json(dir.join(JOKERS_FILE))?;
    let defaults = GameConfig::default();
    let ranks: Vec<RankRule> = load_optional(dir.join(RANKS_FILE))?.unwrap_or(defaults.ranks);
    let run: RunRule = load_optional(dir.join(RUN_FILE))?.unwrap_or(defaults.run);
    let map: MapRule = load_optional(dir.join(MAP_FILE))?.unwrap_or(defaults.map);
    let random_room: RandomRoomRule =
        load_optional(dir.join(RANDOM_ROOM_FILE))?.unwrap_or(defaults.random_room);

    let config = GameConfig {
        run,
        hands,
        ranks,
        encounters,
        levels,
        economy,
        map,
        random_room,
        shop,
        jokers,
    };
    config
        .validate()
        .with_context(|| format!("validate config in {}", dir.display()))?;
    Ok(config)
}

/// Loads a whole `GameConfig` from one JSON document. Sections left out keep
/// their built-in values.
pub fn load_game_config_file(path: &Path) -> anyhow::Result<GameConfig> {
    let config: GameConfig = load_json(path)?;
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

/// Picks the loader by path kind: directories hold split files, anything
/// else is a single document.
pub fn load_config_path(path: &Path) -> anyhow::Result<GameConfig> {
    if path.is_dir() {
        load_game_config(path)
    } else {
        load_game_config_file(path)
    }
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn load_optional<T: DeserializeOwned>(path: PathBuf) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    load_json(path).map(Some)
}
