//! Engine configuration and the locale-keyed registry used for themes and translations.

use crate::foundation::core::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::render::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings an [`Engine`](crate::engine::Engine) is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub renderer: BackendKind,
    /// Surface width in CSS pixels.
    pub width: u32,
    /// Surface height in CSS pixels.
    pub height: u32,
    /// Device pixels per CSS pixel.
    pub dpr: f64,
    /// Color painted under the scene on export.
    pub background: Option<Color>,
    /// TTF/OTF file used to shape text on the raster backend.
    pub font: Option<PathBuf>,
    pub hover: bool,
    pub drag: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            renderer: BackendKind::Raster,
            width: 800,
            height: 600,
            dpr: 1.0,
            background: None,
            font: None,
            hover: true,
            drag: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> SceneResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SceneError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::validation("config width/height must be > 0"));
        }
        if !self.dpr.is_finite() || self.dpr <= 0.0 {
            return Err(SceneError::validation("config dpr must be finite and > 0"));
        }
        Ok(())
    }
}

/// Values keyed by locale with exact, language-family and default fallback.
///
/// Keys compare case-insensitively and treat `_` like `-`, so `zh_CN`, `zh-cn` and
/// `ZH-CN` are the same locale.
#[derive(Clone, Debug)]
pub struct LocaleRegistry<T> {
    entries: HashMap<String, T>,
    default_key: String,
}

impl<T> LocaleRegistry<T> {
    /// An empty registry whose fallback entry is `default_key`.
    pub fn new(default_key: &str) -> Self {
        Self {
            entries: HashMap::new(),
            default_key: normalize(default_key),
        }
    }

    /// Register `value` under `key`, returning the value it replaces.
    pub fn register(&mut self, key: &str, value: T) -> Option<T> {
        self.entries.insert(normalize(key), value)
    }

    /// Resolve `key`: the exact locale, else its language (`zh-CN` → `zh`), else the default.
    pub fn lookup(&self, key: &str) -> Option<&T> {
        let key = normalize(key);
        if let Some(v) = self.entries.get(&key) {
            return Some(v);
        }
        if let Some((lang, _)) = key.split_once('-') {
            if let Some(v) = self.entries.get(lang) {
                return Some(v);
            }
        }
        self.entries.get(&self.default_key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(key: &str) -> String {
    key.trim().replace('_', "-").to_ascii_lowercase()
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
