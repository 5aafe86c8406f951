/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub combat: CombatConfig,
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct CombatConfig {
    pub player_max_health: u32,
    pub enemy_health: u32,
    /// Damage per connecting melee swing.
    pub attack_damage: u32,
    /// Damage per frame of enemy contact.
    pub contact_damage: u32,
    /// Minimum seconds between melee swings.
    pub attack_cooldown: f32,
    /// Melee reach, sprite-grid units.
    pub attack_range: f32,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    /// World units per second.
    pub player_speed: f32,
    pub skeleton_speed: f32,
    pub monster_speed: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub attack: Vec<String>,
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    combat: TomlCombat,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlCombat {
    #[serde(default = "default_player_max_health")]
    player_max_health: u32,
    #[serde(default = "default_enemy_health")]
    enemy_health: u32,
    #[serde(default = "default_attack_damage")]
    attack_damage: u32,
    #[serde(default = "default_contact_damage")]
    contact_damage: u32,
    #[serde(default = "default_attack_cooldown")]
    attack_cooldown: f32,
    #[serde(default = "default_attack_range")]
    attack_range: f32,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_skeleton_speed")]
    skeleton_speed: f32,
    #[serde(default = "default_monster_speed")]
    monster_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_attack_btn")]
    attack: Vec<String>,
    #[serde(default = "default_jump_btn")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_player_max_health() -> u32 { 10 }
fn default_enemy_health() -> u32 { 3 }
fn default_attack_damage() -> u32 { 1 }
fn default_contact_damage() -> u32 { 1 }
fn default_attack_cooldown() -> f32 { 0.2 }
fn default_attack_range() -> f32 { 2.0 }

fn default_player_speed() -> f32 { 90.0 }
fn default_skeleton_speed() -> f32 { 55.0 }
fn default_monster_speed() -> f32 { 70.0 }

fn default_attack_btn() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_jump_btn() -> Vec<String> { vec!["A".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlCombat {
    fn default() -> Self {
        TomlCombat {
            player_max_health: default_player_max_health(),
            enemy_health: default_enemy_health(),
            attack_damage: default_attack_damage(),
            contact_damage: default_contact_damage(),
            attack_cooldown: default_attack_cooldown(),
            attack_range: default_attack_range(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            player_speed: default_player_speed(),
            skeleton_speed: default_skeleton_speed(),
            monster_speed: default_monster_speed(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            attack: default_attack_btn(),
            jump: default_jump_btn(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig::from_toml(toml_cfg)
    }

    fn from_toml(t: TomlConfig) -> Self {
        GameConfig {
            combat: CombatConfig {
                player_max_health: t.combat.player_max_health.max(1),
                enemy_health: t.combat.enemy_health.max(1),
                attack_damage: t.combat.attack_damage,
                contact_damage: t.combat.contact_damage,
                attack_cooldown: t.combat.attack_cooldown.max(0.0),
                attack_range: t.combat.attack_range.max(0.0),
            },
            speed: SpeedConfig {
                player_speed: t.speed.player_speed.max(0.0),
                skeleton_speed: t.speed.skeleton_speed.max(0.0),
                monster_speed: t.speed.monster_speed.max(0.0),
            },
            gamepad: GamepadConfig {
                attack: t.gamepad.attack,
                jump: t.gamepad.jump,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                restart: t.gamepad.restart,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        let cfg = GameConfig::from_toml(cfg);
        assert_eq!(cfg.combat.player_max_health, 10);
        assert!((cfg.combat.attack_cooldown - 0.2).abs() < 1e-6);
        assert!((cfg.combat.attack_range - 2.0).abs() < 1e-6);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: TomlConfig = toml::from_str(
            "[combat]\nplayer_max_health = 3\n[speed]\nplayer_speed = 120.0\n",
        )
        .unwrap();
        let cfg = GameConfig::from_toml(cfg);
        assert_eq!(cfg.combat.player_max_health, 3);
        assert_eq!(cfg.combat.enemy_health, 3);
        assert!((cfg.speed.player_speed - 120.0).abs() < 1e-6);
        assert!((cfg.speed.monster_speed - 70.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let cfg: TomlConfig = toml::from_str(
            "[combat]\nplayer_max_health = 0\nattack_cooldown = -1.0\n",
        )
        .unwrap();
        let cfg = GameConfig::from_toml(cfg);
        assert_eq!(cfg.combat.player_max_health, 1);
        assert_eq!(cfg.combat.attack_cooldown, 0.0);
    }
}
