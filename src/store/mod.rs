//! Per-image state: one `ImageEntry` record per loaded file, keyed by its path.

mod entry;

pub use entry::{estimate_file_size, Dimensions, ImageEntry, SourceFormat};

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{BoxedError, DecodeError, StoreError};
use crate::id_generator::generate_image_id;
use crate::raster::Canvas;

/// Extensions recognized as image files
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif",
];

const HEIF_EXTENSIONS: &[&str] = &["heic", "heif"];
const HEIF_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"mif1", b"msf1"];

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Lower-cased extension of `path`
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

/// Whether `bytes` (read from `path`) look like a HEIF container
pub fn is_heif(path: &Path, bytes: &[u8]) -> bool {
    if extension_of(path).is_some_and(|ext| HEIF_EXTENSIONS.contains(&ext.as_str())) {
        return true;
    }
    bytes.len() >= 12
        && &bytes[4..8] == b"ftyp"
        && HEIF_BRANDS.iter().any(|brand| &bytes[8..12] == brand.as_slice())
}

/// Decoder for HEIF/HEIC files. The `image` crate has no HEIF support, so the
/// embedding application provides one.
pub trait HeifDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BoxedError>;
}

/// What the canvas should display for an image
#[derive(Debug, Clone, Copy)]
pub struct CanvasSnapshot<'a> {
    pub pixels: &'a Canvas,
    pub dimensions: Dimensions,
    pub file_size: u64,
}

/// All loaded images, in load order
pub struct ImageStore {
    entries: Vec<ImageEntry>,
    heif_decoder: Option<Box<dyn HeifDecoder>>,
    max_history: usize,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("paths", &self.paths().collect::<Vec<_>>())
            .field("heif_decoder", &self.heif_decoder.is_some())
            .finish()
    }
}

impl ImageStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: Vec::new(),
            heif_decoder: None,
            max_history,
        }
    }

    pub fn set_heif_decoder(&mut self, decoder: Box<dyn HeifDecoder>) {
        self.heif_decoder = Some(decoder);
    }

    /// Read, decode and register the file at `path`. Loading a path twice replaces the
    /// earlier entry.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&ImageEntry, DecodeError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_owned(),
            source,
        })?;
        self.load_bytes(path, &bytes)
    }

    /// Decode file contents that were read elsewhere (e.g. dropped onto the window) and
    /// register them under `path`.
    pub fn load_bytes(
        &mut self,
        path: impl AsRef<Path>,
        bytes: &[u8],
    ) -> Result<&ImageEntry, DecodeError> {
        let path = path.as_ref();
        let file_size = bytes.len() as u64;

        let (image, format) = if is_heif(path, bytes) {
            let decoder = self
                .heif_decoder
                .as_ref()
                .ok_or_else(|| DecodeError::HeifUnavailable(path.to_owned()))?;
            let image = decoder.decode(bytes).map_err(|source| DecodeError::Heif {
                path: path.to_owned(),
                source,
            })?;
            (image, SourceFormat::Heif)
        } else {
            let format = image::guess_format(bytes).map_err(|source| DecodeError::Format {
                path: path.to_owned(),
                source,
            })?;
            let image = image::load_from_memory_with_format(bytes, format).map_err(|source| {
                DecodeError::Format {
                    path: path.to_owned(),
                    source,
                }
            })?;
            (image, SourceFormat::Raster(format))
        };

        log::info!(
            "Loaded {} ({}x{}, {} bytes, {:?})",
            path.display(),
            image.width(),
            image.height(),
            file_size,
            format
        );
        Ok(self.insert(path, image, file_size, format))
    }

    /// Load every path; failures are returned and don't stop the rest.
    pub fn load_many<P: AsRef<Path>>(
        &mut self,
        paths: impl IntoIterator<Item = P>,
    ) -> Vec<(PathBuf, DecodeError)> {
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if let Err(err) = self.load(path) {
                log::warn!("Skipping {}: {}", path.display(), err);
                failures.push((path.to_owned(), err));
            }
        }
        failures
    }

    /// Register an already decoded image.
    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        image: DynamicImage,
        file_size: u64,
        format: SourceFormat,
    ) -> &ImageEntry {
        let path = path.into();
        let entry = ImageEntry::new(
            generate_image_id(),
            path.clone(),
            image.to_rgba8(),
            file_size,
            format,
            self.max_history,
        );
        let index = match self.position(&path) {
            Some(index) => {
                log::debug!("Replacing already loaded {}", path.display());
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    pub fn select(&self, path: &Path) -> Result<CanvasSnapshot<'_>, StoreError> {
        let entry = self.get(path)?;
        Ok(CanvasSnapshot {
            pixels: entry.canvas(),
            dimensions: entry.current_dimensions(),
            file_size: entry.reported_file_size(),
        })
    }

    /// Re-key `old` under `new_name` in the same directory. The old extension is kept
    /// when `new_name` has no image extension of its own.
    pub fn rename(&mut self, old: &Path, new_name: &str) -> Result<PathBuf, StoreError> {
        let index = self.index_of(old)?;
        let new_path = renamed_path(old, new_name)?;
        if new_path == old {
            return Ok(new_path);
        }
        if self.position(&new_path).is_some() {
            return Err(StoreError::AlreadyExists(new_path));
        }

        self.entries[index].rekey(new_path.clone());
        log::info!("Renamed {} to {}", old.display(), new_path.display());
        Ok(new_path)
    }

    pub fn delete(&mut self, path: &Path) -> Result<ImageEntry, StoreError> {
        let index = self.index_of(path)?;
        log::info!("Removed {}", path.display());
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, path: &Path) -> Result<&ImageEntry, StoreError> {
        self.index_of(path).map(|i| &self.entries[i])
    }

    pub fn get_mut(&mut self, path: &Path) -> Result<&mut ImageEntry, StoreError> {
        let index = self.index_of(path)?;
        Ok(&mut self.entries[index])
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    /// Paths in load order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(ImageEntry::source_path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ImageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.source_path() == path)
    }

    fn index_of(&self, path: &Path) -> Result<usize, StoreError> {
        self.position(path)
            .ok_or_else(|| StoreError::UnknownImage(path.to_owned()))
    }
}

fn renamed_path(old: &Path, new_name: &str) -> Result<PathBuf, StoreError> {
    let name = new_name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidName(new_name.to_owned()));
    }

    let has_image_ext = extension_of(Path::new(name)).is_some_and(|ext| is_image_extension(&ext));
    let file_name = match (has_image_ext, old.extension().and_then(OsStr::to_str)) {
        (false, Some(old_ext)) => format!("{name}.{old_ext}"),
        _ => name.to_owned(),
    };

    Ok(match old.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn store_with(paths: &[&str]) -> ImageStore {
        let mut store = ImageStore::new(10);
        for p in paths {
            store.insert(
                *p,
                DynamicImage::ImageRgba8(RgbaImage::new(8, 6)),
                100,
                SourceFormat::Raster(ImageFormat::Png),
            );
        }
        store
    }

    #[test]
    fn test_rename_keeps_old_extension() {
        let mut store = store_with(&["/photos/a.jpg"]);
        let new = store.rename(Path::new("/photos/a.jpg"), "holiday").unwrap();
        assert_eq!(new, PathBuf::from("/photos/holiday.jpg"));
        assert!(store.get(Path::new("/photos/a.jpg")).is_err());
        assert_eq!(store.get(&new).unwrap().display_name(), "holiday.jpg");
    }

    #[test]
    fn test_rename_accepts_new_image_extension() {
        let mut store = store_with(&["/photos/a.jpg"]);
        let new = store.rename(Path::new("/photos/a.jpg"), "b.PNG").unwrap();
        assert_eq!(new, PathBuf::from("/photos/b.PNG"));
    }

    #[test]
    fn test_rename_onto_existing_fails() {
        let mut store = store_with(&["/p/a.png", "/p/b.png"]);
        let err = store.rename(Path::new("/p/a.png"), "b").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert!(store.contains(Path::new("/p/a.png")));
    }

    #[test]
    fn test_rename_rejects_separators() {
        let mut store = store_with(&["/p/a.png"]);
        assert!(matches!(
            store.rename(Path::new("/p/a.png"), "../x"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_paths_in_load_order() {
        let mut store = store_with(&["c.png", "a.png", "b.png"]);
        store.delete(Path::new("a.png")).unwrap();
        let paths: Vec<_> = store.paths().collect();
        assert_eq!(paths, vec![Path::new("c.png"), Path::new("b.png")]);
    }

    #[test]
    fn test_heif_detection() {
        assert!(is_heif(Path::new("x.HEIC"), &[]));
        let mut bytes = vec![0, 0, 0, 24];
        bytes.extend_from_slice(b"ftypmif1");
        assert!(is_heif(Path::new("x.bin"), &bytes));
        assert!(!is_heif(Path::new("x.png"), b"\x89PNG\r\n\x1a\n...."));
    }

    #[test]
    fn test_load_heif_without_decoder() {
        let dir = std::env::temp_dir().join(format!("annotate_store_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pic.heic");
        fs::write(&path, b"not really heif").unwrap();
        let mut store = ImageStore::new(10);
        assert!(matches!(store.load(&path), Err(DecodeError::HeifUnavailable(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    struct RejectingDecoder;

    impl HeifDecoder for RejectingDecoder {
        fn decode(&self, _bytes: &[u8]) -> Result<DynamicImage, BoxedError> {
            Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad box").into())
        }
    }

    #[test]
    fn test_heif_decoder_failure_keeps_source() {
        use std::error::Error as _;

        let mut store = ImageStore::new(10);
        store.set_heif_decoder(Box::new(RejectingDecoder));
        let err = store.load_bytes("pic.heic", b"whatever").unwrap_err();
        assert!(matches!(err, DecodeError::Heif { .. }));
        let source = err.source().expect("decoder error is chained");
        assert_eq!(source.to_string(), "bad box");
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_format_error() {
        let dir = std::env::temp_dir().join(format!("annotate_corrupt_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.png");
        fs::write(&path, b"definitely not an image").unwrap();
        let mut store = ImageStore::new(10);
        let failures = store.load_many([&path]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].1, DecodeError::Format { .. }));
        assert!(store.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
