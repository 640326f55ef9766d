// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const SETTINGS_FILE_NAME: &str = "torolife_settings.json";

const MAX_GRID_DIM: u32 = 8192;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub max_fps: u8,             // 0 = advance every frame
    pub primary_color: u32,      // ARGB8888, alive cells
    pub background_color: u32,   // ARGB8888, dead cells
    pub filling_percentage: u8,  // reseed density, 0..=100
    pub fullscreen: bool,
    pub pixel_scale: u32,        // window size multiplier when not fullscreen
    pub vsync: bool,
    pub seed: Option<u64>,       // fixed reseed RNG seed, entropy when None
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            max_fps: 30,
            primary_color: 0xFFFF_FFFF,
            background_color: 0xFF00_0000,
            filling_percentage: 20,
            fullscreen: false,
            pixel_scale: 4,
            vsync: true,
            seed: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(SETTINGS_FILE_NAME)
    }

    pub fn load_from_disk(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to_disk(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn sanitize(&mut self) {
        self.width = self.width.clamp(1, MAX_GRID_DIM);
        self.height = self.height.clamp(1, MAX_GRID_DIM);
        self.filling_percentage = self.filling_percentage.min(100);
        self.pixel_scale = self.pixel_scale.clamp(1, 16);
    }

    /// Loads `path`, falling back to defaults. The file is written back only
    /// when it was missing or parsed but needed sanitizing; a file that exists
    /// and fails to load is left untouched.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("no settings at {:?}, using defaults", path);
            let settings = Self::default();
            if let Err(err) = settings.save_to_disk(path) {
                log::warn!("failed to write settings to {:?}: {err:#}", path);
            }
            return settings;
        }

        let mut settings = match Self::load_from_disk(path) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("failed to load settings from {:?}, using defaults: {err:#}", path);
                return Self::default();
            }
        };

        let original = settings.clone();
        settings.sanitize();
        if settings != original {
            log::warn!("settings in {:?} were out of range and have been clamped", path);
            if let Err(err) = settings.save_to_disk(path) {
                log::warn!("failed to write settings to {:?}: {err:#}", path);
            }
        }
        settings
    }
}
