use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use crate::asset_keys::{validate_asset_key, AssetKeyError};

use super::font::FontHandle;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("rgba buffer of {actual} bytes does not match {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Bitmap {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::SizeMismatch {
                width,
                height,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.rgba[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Nearest-neighbour resample. Zero target sizes are clamped to one pixel.
    pub fn scaled(&self, width: u32, height: u32) -> Bitmap {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.width == 0 || self.height == 0 {
            return Bitmap::solid(width, height, [0, 0, 0, 0]);
        }

        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for out_y in 0..height {
            let src_y = (out_y as u64 * self.height as u64 / height as u64) as u32;
            for out_x in 0..width {
                let src_x = (out_x as u64 * self.width as u64 / width as u64) as u32;
                let px = self.pixel(src_x, src_y).unwrap_or([0, 0, 0, 0]);
                rgba.extend_from_slice(&px);
            }
        }
        Bitmap {
            width,
            height,
            rgba,
        }
    }
}

/// Keyed image and font registry. Images live under `<assets>/images/<key>.png`.
#[derive(Debug)]
pub struct AssetStore {
    image_root: PathBuf,
    images: HashMap<String, Arc<Bitmap>>,
    fonts: HashMap<String, FontHandle>,
    warned_missing_keys: RefCell<HashSet<String>>,
}

impl AssetStore {
    pub fn new(assets_dir: &Path) -> Self {
        Self {
            image_root: assets_dir.join("images"),
            images: HashMap::new(),
            fonts: HashMap::new(),
            warned_missing_keys: RefCell::new(HashSet::new()),
        }
    }

    /// Store with no backing directory; only `insert_image` populates it.
    pub fn in_memory() -> Self {
        Self::new(Path::new(""))
    }

    pub fn load_image(&mut self, key: &str) -> Result<Arc<Bitmap>, AssetError> {
        if let Some(existing) = self.images.get(key) {
            return Ok(Arc::clone(existing));
        }
        let path = resolve_image_path(&self.image_root, key)?;
        let bitmap = Arc::new(decode_png_rgba(&path)?);
        debug!(
            key,
            width = bitmap.width(),
            height = bitmap.height(),
            "image_loaded"
        );
        self.images.insert(key.to_string(), Arc::clone(&bitmap));
        Ok(bitmap)
    }

    pub fn insert_image(&mut self, key: &str, bitmap: Bitmap) -> Result<(), AssetError> {
        validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        self.images.insert(key.to_string(), Arc::new(bitmap));
        Ok(())
    }

    pub fn image(&self, key: &str) -> Option<Arc<Bitmap>> {
        let found = self.images.get(key).cloned();
        if found.is_none() {
            self.warn_missing_once("image", key);
        }
        found
    }

    pub fn register_font(&mut self, key: &str, scale: i32) {
        self.fonts.insert(key.to_string(), FontHandle::new(scale));
    }

    pub fn font(&self, key: &str) -> Option<FontHandle> {
        let found = self.fonts.get(key).copied();
        if found.is_none() {
            self.warn_missing_once("font", key);
        }
        found
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    fn warn_missing_once(&self, kind: &'static str, key: &str) {
        if !self.warned_missing_keys.borrow_mut().insert(format!("{kind}:{key}")) {
            return;
        }
        warn!(kind, key, "asset_missing");
    }
}

fn resolve_image_path(image_root: &Path, key: &str) -> Result<PathBuf, AssetError> {
    validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    Ok(image_root.join(format!("{key}.png")))
}

fn decode_png_rgba(path: &Path) -> Result<Bitmap, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Bitmap::from_rgba(image.width(), image.height(), image.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn image_path_resolution_rejects_bad_keys() {
        let temp = TempDir::new().expect("temp");
        let root = temp.path().join("images");

        assert!(matches!(
            resolve_image_path(&root, r"bad\key"),
            Err(AssetError::InvalidKey { .. })
        ));
        let path = resolve_image_path(&root, "levels/harbor").expect("path");
        assert_eq!(path, root.join("levels").join("harbor.png"));
    }

    #[test]
    fn loading_missing_file_reports_open_error() {
        let temp = TempDir::new().expect("temp");
        let mut store = AssetStore::new(temp.path());

        let result = store.load_image("player");
        assert!(matches!(result, Err(AssetError::Open { .. })));
        assert!(store.image("player").is_none());
    }

    #[test]
    fn loads_png_written_by_image_crate() {
        let temp = TempDir::new().expect("temp");
        let images = temp.path().join("images");
        std::fs::create_dir_all(&images).expect("images dir");
        let buffer = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        buffer.save(images.join("boat.png")).expect("save png");

        let mut store = AssetStore::new(temp.path());
        let bitmap = store.load_image("boat").expect("load");
        assert_eq!((bitmap.width(), bitmap.height()), (2, 3));
        assert_eq!(bitmap.pixel(1, 2), Some([10, 20, 30, 255]));
        assert_eq!(store.image_count(), 1);
        assert!(Arc::ptr_eq(&bitmap, &store.image("boat").expect("cached")));
    }

    #[test]
    fn from_rgba_checks_length() {
        assert!(matches!(
            Bitmap::from_rgba(2, 2, vec![0; 15]),
            Err(AssetError::SizeMismatch { actual: 15, .. })
        ));
    }

    #[test]
    fn scaled_uses_nearest_neighbour() {
        let mut rgba = Vec::new();
        rgba.extend_from_slice(&[255, 0, 0, 255]);
        rgba.extend_from_slice(&[0, 0, 255, 255]);
        let bitmap = Bitmap::from_rgba(2, 1, rgba).expect("bitmap");

        let scaled = bitmap.scaled(4, 2);
        assert_eq!((scaled.width(), scaled.height()), (4, 2));
        assert_eq!(scaled.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(scaled.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(scaled.pixel(2, 0), Some([0, 0, 255, 255]));
        assert_eq!(scaled.pixel(3, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn fonts_are_registered_by_key() {
        let mut store = AssetStore::in_memory();
        store.register_font("ui", 3);
        assert_eq!(store.font("ui").map(|font| font.scale()), Some(3));
        assert!(store.font("title").is_none());
    }
}
