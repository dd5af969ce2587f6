use serde::{Deserialize, Serialize};

/// Tunables for squad movement and combat. Every field has a default so a
/// partial override object (or none at all) is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquadSettings {
    /// Tiles from every room edge the leader must be inside before formation
    /// logic resumes after entering a room.
    pub interior_margin: u8,
    /// Range from the chosen exit tile at which the squad switches to single
    /// file to cross.
    pub exit_approach_range: u32,
    /// Range the leader paths to around a combat target.
    pub combat_goal_range: u32,
    /// Range members converge to around the room center while crossing or entering.
    pub center_range: u32,
    /// Range followers keep from the leader while chasing it in single file.
    pub chase_range: u32,
    /// Whether squad state is written back to memory at the end of each tick.
    pub persist: bool,
    /// Whether members show their status summary in game.
    pub say_status: bool,
}

impl Default for SquadSettings {
    fn default() -> Self {
        SquadSettings {
            interior_margin: 3,
            exit_approach_range: 2,
            combat_goal_range: 1,
            center_range: 2,
            chase_range: 1,
            persist: true,
            say_status: true,
        }
    }
}

impl SquadSettings {
    /// Parse settings from a JSON object, falling back to defaults for any
    /// missing keys.
    pub fn from_json(data: &str) -> Result<SquadSettings, String> {
        serde_json::from_str(data).map_err(|e| e.to_string())
    }
}

#[cfg(feature = "screeps")]
pub mod memory {
    use super::SquadSettings;
    use crate::memory_helper::path_get;
    use crate::world::AllyList;

    /// Read settings from `Memory._features.squads`, using defaults for
    /// anything missing or malformed.
    pub fn load() -> SquadSettings {
        let value = path_get("_features.squads");

        if value.is_undefined() || value.is_null() {
            return SquadSettings::default();
        }

        serde_wasm_bindgen::from_value(value).unwrap_or_else(|err| {
            log::warn!("Invalid squad feature settings, using defaults: {}", err);
            SquadSettings::default()
        })
    }

    /// Owner names listed in `Memory._features.allies`.
    pub fn allies() -> AllyList {
        let value = path_get("_features.allies");

        if value.is_undefined() || value.is_null() {
            return AllyList::default();
        }

        match serde_wasm_bindgen::from_value::<Vec<String>>(value) {
            Ok(allies) => AllyList { allies },
            Err(err) => {
                log::warn!("Invalid ally list, treating everyone as hostile: {}", err);
                AllyList::default()
            }
        }
    }
}
