//! Finished asset handles and loading progress.
//!
//! The core never waits on I/O. Assets are loaded up front (by the host or
//! by [`AssetSet::load_dir`]) and handed over as optional handles. A missing
//! asset only disables the feature that needs it:
//!
//! | asset     | feature without it                                 |
//! |-----------|----------------------------------------------------|
//! | metal     | portal falls back to generated noise               |
//! | noise     | portal and core fall back to generated noise       |
//! | smoke     | smoke layers fall back to a soft generated puff    |
//! | character | no character, no local distortion                  |
//! | audio     | sound toggle does nothing                          |
//!
//! # Supported Formats
//!
//! - PNG (recommended)
//! - JPEG

use std::path::Path;

use crate::audio::AudioSink;
use crate::error::AssetError;

/// How texture coordinates outside `[0, 1]` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Clamp to edge color (default).
    #[default]
    ClampToEdge,
    /// Tile the texture.
    Repeat,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub address_mode: AddressMode,
}

impl TextureData {
    /// Wrap raw RGBA data. Returns `None` if the length does not match the size.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 || width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            address_mode: AddressMode::ClampToEdge,
        })
    }

    /// Decode an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_memory(&bytes)
    }

    /// Decode an in-memory image.
    pub fn from_memory(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
            address_mode: AddressMode::ClampToEdge,
        })
    }

    /// Set the address mode.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    /// Tileable value noise, grey in every channel.
    pub fn noise(size: u32, seed: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let v = hash_noise(x, y, seed);
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            address_mode: AddressMode::Repeat,
        }
    }

    /// Radial white puff fading to transparent at the edge.
    pub fn soft_puff(size: u32) -> Self {
        let size = size.max(2);
        let half = (size - 1) as f32 * 0.5;
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - half) / half;
                let dy = (y as f32 - half) / half;
                let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                let a = (falloff * falloff * 255.0).round() as u8;
                data.extend_from_slice(&[255, 255, 255, a]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            address_mode: AddressMode::ClampToEdge,
        }
    }
}

/// Simple hash-based noise.
fn hash_noise(x: u32, y: u32, seed: u32) -> u8 {
    let mut n = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1013904223));
    n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    n = n ^ (n >> 16);
    (n & 255) as u8
}

/// A loaded character model, reduced to what the frame loop drives.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterAsset {
    pub name: String,
    /// Length of the first animation clip, if the model has one.
    pub clip_duration: Option<f32>,
}

impl CharacterAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clip_duration: None,
        }
    }

    /// Attach an animation clip of the given length.
    pub fn with_clip(mut self, seconds: f32) -> Self {
        self.clip_duration = (seconds > 0.0).then_some(seconds);
        self
    }
}

/// Items loaded out of items requested.
///
/// Failed items count as finished so that loading always completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingProgress {
    loaded: u32,
    failed: u32,
    total: u32,
}

impl LoadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// An item was requested.
    pub fn item_start(&mut self) {
        self.total += 1;
    }

    /// An item finished loading.
    pub fn item_end(&mut self) {
        self.loaded = (self.loaded + 1).min(self.total);
    }

    /// An item failed to load.
    pub fn item_failed(&mut self) {
        self.failed += 1;
        self.item_end();
    }

    pub fn loaded(&self) -> u32 {
        self.loaded
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Fraction in `[0, 1]` for a loading bar. Nothing requested reads as 1.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.loaded as f32 / self.total as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.loaded == self.total
    }
}

/// Everything the experience can use, each piece optional.
#[derive(Default)]
pub struct AssetSet {
    pub metal: Option<TextureData>,
    pub noise: Option<TextureData>,
    pub smoke: Option<TextureData>,
    pub character: Option<CharacterAsset>,
    pub audio: Option<Box<dyn AudioSink>>,
}

impl AssetSet {
    /// No assets at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `metal.png`, `noise.png` and `smoke.png` from a directory.
    ///
    /// Files that are missing or fail to decode are logged and left out.
    pub fn load_dir<P: AsRef<Path>>(dir: P, progress: &mut LoadingProgress) -> Self {
        let dir = dir.as_ref();
        let mut load = |name: &str, mode: AddressMode| {
            progress.item_start();
            let path = dir.join(name);
            match TextureData::from_file(&path) {
                Ok(tex) => {
                    progress.item_end();
                    log::info!("assets: loaded {} ({}x{})", path.display(), tex.width, tex.height);
                    Some(tex.with_address_mode(mode))
                }
                Err(e) => {
                    progress.item_failed();
                    log::warn!("assets: {}: {}", path.display(), e);
                    None
                }
            }
        };

        Self {
            metal: load("metal.png", AddressMode::Repeat),
            noise: load("noise.png", AddressMode::Repeat),
            smoke: load("smoke.png", AddressMode::ClampToEdge),
            character: None,
            audio: None,
        }
    }

    /// Add a character model.
    pub fn with_character(mut self, character: CharacterAsset) -> Self {
        self.character = Some(character);
        self
    }

    /// Add the ambient audio track.
    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    /// Metal texture, or generated noise if it failed to load.
    pub fn metal_or_fallback(&self) -> TextureData {
        self.metal.clone().unwrap_or_else(|| TextureData::noise(128, 7))
    }

    /// Noise texture, or generated noise if it failed to load.
    pub fn noise_or_fallback(&self) -> TextureData {
        self.noise.clone().unwrap_or_else(|| TextureData::noise(256, 42))
    }

    /// Smoke texture, or a generated puff if it failed to load.
    pub fn smoke_or_fallback(&self) -> TextureData {
        self.smoke.clone().unwrap_or_else(|| TextureData::soft_puff(128))
    }
}

impl std::fmt::Debug for AssetSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSet")
            .field("metal", &self.metal.is_some())
            .field("noise", &self.noise.is_some())
            .field("smoke", &self.smoke.is_some())
            .field("character", &self.character)
            .field("audio", &self.audio.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_size() {
        assert!(TextureData::from_rgba(vec![0; 16], 2, 2).is_some());
        assert!(TextureData::from_rgba(vec![0; 15], 2, 2).is_none());
        assert!(TextureData::from_rgba(Vec::new(), 0, 0).is_none());
    }

    #[test]
    fn test_generated_textures() {
        let noise = TextureData::noise(16, 1);
        assert_eq!(noise.data.len(), 16 * 16 * 4);
        assert_eq!(noise.address_mode, AddressMode::Repeat);

        let puff = TextureData::soft_puff(33);
        let centre = ((16 * 33 + 16) * 4 + 3) as usize;
        assert_eq!(puff.data[centre], 255);
        assert_eq!(puff.data[3], 0);
    }

    #[test]
    fn test_loading_progress() {
        let mut progress = LoadingProgress::new();
        assert_eq!(progress.fraction(), 1.0);
        progress.item_start();
        progress.item_start();
        assert_eq!(progress.fraction(), 0.0);
        progress.item_end();
        assert_eq!(progress.fraction(), 0.5);
        assert!(!progress.is_complete());
        progress.item_failed();
        assert!(progress.is_complete());
        assert_eq!(progress.failed(), 1);
    }

    #[test]
    fn test_missing_dir_degrades() {
        let mut progress = LoadingProgress::new();
        let assets = AssetSet::load_dir("/definitely/not/here", &mut progress);
        assert!(assets.metal.is_none());
        assert!(assets.smoke.is_none());
        assert_eq!(progress.total(), 3);
        assert!(progress.is_complete());
        assert_eq!(assets.noise_or_fallback().width, 256);
    }

    #[test]
    fn test_decode_error_is_reported() {
        assert!(matches!(
            TextureData::from_memory(b"not an image"),
            Err(AssetError::ImageLoad(_))
        ));
    }
}
