use egui::Pos2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::PitwallError;

use super::HISTORY_SECONDS;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "pitwall";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WindowPosition {
    pub x: f32,
    pub y: f32,
}

impl From<WindowPosition> for Pos2 {
    fn from(value: WindowPosition) -> Self {
        Pos2::new(value.x, value.y)
    }
}

impl From<Pos2> for WindowPosition {
    fn from(value: Pos2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds of telemetry history kept for the trace plots
    pub history_window_s: usize,
    pub show_chat: bool,
    pub window_position: WindowPosition,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_window_s: HISTORY_SECONDS,
            show_chat: true,
            window_position: WindowPosition::default(),
        }
    }
}

impl AppConfig {
    pub fn from_local_file() -> Option<Self> {
        let config_path = dirs::config_dir()?.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return None;
        }
        let file = match std::fs::File::open(&config_path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Could not open config file: {}", e);
                return None;
            }
        };
        match serde_json::from_reader(file) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Could not parse config file, using defaults: {}", e);
                None
            }
        }
    }

    pub fn save(&self) -> Result<(), PitwallError> {
        let config_path = dirs::config_dir()
            .ok_or(PitwallError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            std::fs::create_dir_all(config_path.parent().expect("config path has a parent"))
                .map_err(|e| PitwallError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::to_writer(file, self)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }
}
