use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

use crate::raster::Canvas;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Convert a canvas into an egui image
pub fn canvas_to_color_image(canvas: &Canvas) -> Result<ColorImage, TextureGenerationError> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureGenerationError::InvalidDimensions { width, height });
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        canvas.as_raw(),
    ))
}

/// Caches canvas textures by (image id, canvas version)
pub struct TextureManager {
    texture_cache: HashMap<(usize, u64), TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<(usize, u64), u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or creates the texture of one canvas version.
    ///
    /// Older versions of the same image are dropped as soon as a newer one is uploaded;
    /// strokes bump the version on every pointer move.
    pub fn get_or_create_texture<F>(
        &mut self,
        image_id: usize,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        let cache_key = (image_id, version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        self.invalidate_image(image_id);
        self.prune_cache_if_needed();

        let name = format!("canvas_{}_v{}", image_id, version);
        let handle = ctx.load_texture(&name, image, TextureOptions::LINEAR);

        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);

        Ok(handle.id())
    }

    /// Invalidates all textures of an image
    pub fn invalidate_image(&mut self, image_id: usize) {
        self.texture_cache.retain(|(id, _), _| *id != image_id);
        self.last_used.retain(|(id, _), _| *id != image_id);
    }

    /// Evicts least recently used textures until there is room for one more
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<((usize, u64), u64)> =
            self.last_used.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = self.texture_cache.len() + 1 - self.max_cache_size;
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    pub fn get_texture(&self, image_id: usize, version: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(image_id, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn mock_texture_generator() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        let first = manager
            .get_or_create_texture(1, 1, mock_texture_generator, &ctx)
            .unwrap();
        let second = manager
            .get_or_create_texture(1, 1, mock_texture_generator, &ctx)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn test_new_version_replaces_old() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        manager.get_or_create_texture(1, 1, mock_texture_generator, &ctx).unwrap();
        manager.get_or_create_texture(1, 2, mock_texture_generator, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 1);
        assert!(manager.get_texture(1, 1).is_none());
        assert!(manager.get_texture(1, 2).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);

        manager.get_or_create_texture(1, 1, mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(2, 1, mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(3, 1, mock_texture_generator, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(manager.get_texture(1, 1).is_none());
        assert!(manager.get_texture(2, 1).is_some());
        assert!(manager.get_texture(3, 1).is_some());
    }

    #[test]
    fn test_canvas_conversion() {
        let canvas = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let image = canvas_to_color_image(&canvas).unwrap();
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgb(1, 2, 3));

        let empty = RgbaImage::new(0, 4);
        assert!(canvas_to_color_image(&empty).is_err());
    }
}
