//! Configuración de la demo: semilla, nivel, ventana y audio.
//! Las constantes de juego viven junto al código que las usa; aquí solo lo que
//! cambia entre ejecuciones.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::level::LevelDesc;

pub const DEFAULT_CONFIG_PATH: &str = "doomcast.yaml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    /// Nivel YAML; sin él se juega E1M1.
    pub level: Option<PathBuf>,
    /// Escala de la ventana: 1, 2 o 4.
    pub window_scale: u8,
    /// 0.0..=1.0
    pub audio_volume: f32,
    /// Unidades de ángulo por píxel de ratón; 0 desactiva el ratón.
    pub mouse_sensitivity: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { seed: 0x5EED, level: None, window_scale: 2, audio_volume: 0.5, mouse_sensitivity: 2 }
    }
}

impl EngineConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let mut config: EngineConfig = serde_yaml::from_str(text)?;
        if !matches!(config.window_scale, 1 | 2 | 4) {
            warn!("escala {} no soportada, se usa 2", config.window_scale);
            config.window_scale = 2;
        }
        config.audio_volume = config.audio_volume.clamp(0.0, 1.0);
        Ok(config)
    }

    /// Lee la configuración; si el fichero no existe se usan los valores por defecto.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_yaml(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("{} no existe, configuración por defecto", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn load_level(&self) -> Result<LevelDesc, ConfigError> {
        let level = match &self.level {
            Some(path) => LevelDesc::load(path)?,
            None => LevelDesc::e1m1()?,
        };
        Ok(level)
    }
}
