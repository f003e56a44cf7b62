//! Fire-and-forget texture loading.
//!
//! Scene assembly records what it wants in a [`TextureLibrary`] and gets a
//! [`TextureId`] back immediately. [`TextureLoader::spawn`] decodes every entry
//! on worker threads; the render loop calls [`TextureLoader::poll`] once per
//! frame and uploads whatever has finished. Until then the renderer samples a
//! 1x1 placeholder.

use std::path::{Path, PathBuf};

use futures::channel::oneshot;
use log::{debug, info, warn};

use crate::error::{Result, SceneLabError};

/// Handle into a [`TextureLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color data, decoded as sRGB by the sampler
    Srgb,
    /// Non-color data: normals, heights, roughness and friends
    Linear,
}

/// What to show until the real pixels arrive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    White,
    Black,
    FlatNormal,
}

impl Placeholder {
    pub fn rgba(&self) -> [u8; 4] {
        match self {
            Placeholder::White => [255, 255, 255, 255],
            Placeholder::Black => [0, 0, 0, 255],
            Placeholder::FlatNormal => [128, 128, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    Image(PathBuf),
    /// Six faces in +x, -x, +y, -y, +z, -z order
    Cube([PathBuf; 6]),
}

impl TextureSource {
    pub fn is_cube(&self) -> bool {
        matches!(self, TextureSource::Cube(_))
    }

    pub fn layers(&self) -> u32 {
        if self.is_cube() {
            6
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub source: TextureSource,
    pub filter: Filter,
    pub color_space: ColorSpace,
    pub placeholder: Placeholder,
}

impl TextureDesc {
    pub fn color(path: impl Into<PathBuf>) -> Self {
        Self {
            source: TextureSource::Image(path.into()),
            filter: Filter::Linear,
            color_space: ColorSpace::Srgb,
            placeholder: Placeholder::White,
        }
    }

    pub fn data(path: impl Into<PathBuf>, placeholder: Placeholder) -> Self {
        Self {
            source: TextureSource::Image(path.into()),
            filter: Filter::Linear,
            color_space: ColorSpace::Linear,
            placeholder,
        }
    }

    pub fn cube(faces: [PathBuf; 6]) -> Self {
        Self {
            source: TextureSource::Cube(faces),
            filter: Filter::Linear,
            color_space: ColorSpace::Srgb,
            placeholder: Placeholder::Black,
        }
    }

    /// Nearest filtering, for pixel art and toon gradients
    pub fn nearest(mut self) -> Self {
        self.filter = Filter::Nearest;
        self
    }
}

/// Declarative list of textures a scene references
#[derive(Debug, Clone, Default)]
pub struct TextureLibrary {
    descs: Vec<TextureDesc>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, desc: TextureDesc) -> TextureId {
        self.descs.push(desc);
        TextureId(self.descs.len() - 1)
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureDesc> {
        self.descs.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &TextureDesc)> {
        self.descs.iter().enumerate().map(|(i, d)| (TextureId(i), d))
    }
}

/// Decoded RGBA8 pixels, `layers` images stacked back to back
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub layers: u32,
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    pub fn solid(rgba: [u8; 4], layers: u32) -> Self {
        Self {
            width: 1,
            height: 1,
            layers,
            pixels: rgba.repeat(layers as usize),
        }
    }

    /// Check the image can become a GPU texture whose sides are at most
    /// `max_dimension` texels
    pub fn check_uploadable(&self, max_dimension: u32) -> std::result::Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("image is empty".to_string());
        }
        if self.width > max_dimension || self.height > max_dimension {
            return Err(format!(
                "{}x{} exceeds the device limit of {}",
                self.width, self.height, max_dimension
            ));
        }
        if self.layers == 6 && self.width != self.height {
            return Err(format!("cube map is {}x{}, faces must be square", self.width, self.height));
        }
        let expected = self.width as usize * self.height as usize * 4 * self.layers as usize;
        if self.pixels.len() != expected {
            return Err(format!("{} bytes of pixels, expected {}", self.pixels.len(), expected));
        }
        Ok(())
    }
}

pub fn decode_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)
        .map_err(|e| SceneLabError::texture(path, e))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(LoadedImage {
        width,
        height,
        layers: 1,
        pixels: image.into_raw(),
    })
}

pub fn decode_cube(faces: &[PathBuf; 6]) -> Result<LoadedImage> {
    let mut pixels = Vec::new();
    let mut size = None;

    for face in faces {
        let image = decode_image(face)?;
        if image.width != image.height {
            return Err(SceneLabError::texture(
                face,
                format!("cube face is {}x{}, faces must be square", image.width, image.height),
            ));
        }
        match size {
            None => size = Some((image.width, image.height)),
            Some(expected) if expected != (image.width, image.height) => {
                return Err(SceneLabError::texture(
                    face,
                    format!(
                        "cube face is {}x{}, expected {}x{}",
                        image.width, image.height, expected.0, expected.1
                    ),
                ));
            }
            Some(_) => {}
        }
        pixels.extend_from_slice(&image.pixels);
    }

    let (width, height) = size.unwrap_or((1, 1));
    Ok(LoadedImage {
        width,
        height,
        layers: 6,
        pixels,
    })
}


fn resolve(root: &Path, source: &TextureSource) -> TextureSource {
    match source {
        TextureSource::Image(path) => TextureSource::Image(root.join(path)),
        TextureSource::Cube(faces) => TextureSource::Cube(faces.clone().map(|f| root.join(f))),
    }
}

fn decode(source: &TextureSource) -> Result<LoadedImage> {
    match source {
        TextureSource::Image(path) => decode_image(path),
        TextureSource::Cube(faces) => decode_cube(faces),
    }
}

/// Start decoding on a worker thread; the receiver resolves exactly once
pub fn spawn_decode(source: TextureSource) -> oneshot::Receiver<Result<LoadedImage>> {
    let (sender, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        // receiver may be gone if the window already closed
        sender.send(decode(&source)).ok();
    });
    receiver
}

#[derive(Debug)]
enum Slot {
    Pending(oneshot::Receiver<Result<LoadedImage>>),
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureState {
    Pending,
    Ready,
    Failed,
}

/// Tracks in-flight decodes for every texture of a library
#[derive(Debug)]
pub struct TextureLoader {
    slots: Vec<Slot>,
}

impl TextureLoader {
    /// Kick off every load in `library`, resolving paths against `root`
    pub fn spawn(library: &TextureLibrary, root: &Path) -> Self {
        info!("Loading {} textures from {}", library.len(), root.display());
        let slots = library
            .iter()
            .map(|(_, desc)| Slot::Pending(spawn_decode(resolve(root, &desc.source))))
            .collect();
        Self { slots }
    }

    pub fn state(&self, id: TextureId) -> Option<TextureState> {
        self.slots.get(id.0).map(|slot| match slot {
            Slot::Pending(_) => TextureState::Pending,
            Slot::Ready => TextureState::Ready,
            Slot::Failed => TextureState::Failed,
        })
    }

    pub fn pending(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Pending(_)))
            .count()
    }

    /// Collect finished decodes without blocking.
    /// Failures are logged and leave the placeholder in place.
    pub fn poll(&mut self) -> Vec<(TextureId, LoadedImage)> {
        let mut finished = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Slot::Pending(receiver) = slot else {
                continue;
            };

            match receiver.try_recv() {
                Ok(None) => {}
                Ok(Some(Ok(image))) => {
                    debug!("Texture {} ready: {}x{}", index, image.width, image.height);
                    finished.push((TextureId(index), image));
                    *slot = Slot::Ready;
                }
                Ok(Some(Err(e))) => {
                    warn!("{}", e);
                    *slot = Slot::Failed;
                }
                Err(_) => {
                    warn!("Texture {} loader thread went away", index);
                    *slot = Slot::Failed;
                }
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until_settled(loader: &mut TextureLoader) -> Vec<(TextureId, LoadedImage)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut finished = Vec::new();
        while loader.pending() > 0 && Instant::now() < deadline {
            finished.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        finished
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scene-lab-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_library_hands_out_sequential_ids() {
        let mut library = TextureLibrary::new();
        let a = library.load(TextureDesc::color("a.png"));
        let b = library.load(TextureDesc::data("b.png", Placeholder::Black).nearest());
        assert_eq!(a, TextureId(0));
        assert_eq!(b, TextureId(1));
        assert_eq!(library.get(b).unwrap().filter, Filter::Nearest);
        assert_eq!(library.get(b).unwrap().color_space, ColorSpace::Linear);
        assert!(library.get(TextureId(2)).is_none());
    }

    #[test]
    fn test_placeholder_solid() {
        let image = LoadedImage::solid(Placeholder::FlatNormal.rgba(), 6);
        assert_eq!(image.pixels.len(), 24);
        assert_eq!(&image.pixels[20..24], &[128, 128, 255, 255]);
    }

    #[test]
    fn test_missing_file_fails_softly() {
        let mut library = TextureLibrary::new();
        let id = library.load(TextureDesc::color("does/not/exist.png"));
        let mut loader = TextureLoader::spawn(&library, Path::new("/nonexistent-root"));

        let finished = poll_until_settled(&mut loader);
        assert!(finished.is_empty());
        assert_eq!(loader.state(id), Some(TextureState::Failed));
    }

    #[test]
    fn test_loads_png_in_background() {
        let dir = temp_dir("png");
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        image.save(dir.join("tile.png")).unwrap();

        let mut library = TextureLibrary::new();
        let id = library.load(TextureDesc::color("tile.png"));
        let mut loader = TextureLoader::spawn(&library, &dir);

        let finished = poll_until_settled(&mut loader);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].0, id);
        assert_eq!((finished[0].1.width, finished[0].1.height), (4, 2));
        assert_eq!(&finished[0].1.pixels[0..4], &[10, 20, 30, 255]);
        assert_eq!(loader.state(id), Some(TextureState::Ready));

        // nothing more to report once ready
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn test_oversized_or_malformed_images_are_not_uploadable() {
        let image = LoadedImage {
            width: 4096,
            height: 16,
            layers: 1,
            pixels: vec![0; 4096 * 16 * 4],
        };
        assert!(image.check_uploadable(8192).is_ok());
        assert!(image.check_uploadable(2048).is_err());

        let cube = LoadedImage {
            width: 4,
            height: 2,
            layers: 6,
            pixels: vec![0; 4 * 2 * 4 * 6],
        };
        assert!(cube.check_uploadable(8192).is_err());

        let short = LoadedImage {
            width: 2,
            height: 2,
            layers: 1,
            pixels: vec![0; 3],
        };
        assert!(short.check_uploadable(8192).is_err());

        assert!(LoadedImage::solid([255; 4], 6).check_uploadable(1).is_ok());
    }

    #[test]
    fn test_cube_faces_must_match() {
        let dir = temp_dir("cube");
        let names = ["px", "nx", "py", "ny", "pz", "nz"];
        for (i, name) in names.iter().enumerate() {
            let size = if i == 5 { 4 } else { 2 };
            image::RgbaImage::from_pixel(size, size, image::Rgba([0, 0, 0, 255]))
                .save(dir.join(format!("{}.png", name)))
                .unwrap();
        }
        let faces = names.map(|n| dir.join(format!("{}.png", n)));
        assert!(decode_cube(&faces).is_err());

        image::RgbaImage::from_pixel(2, 3, image::Rgba([0, 0, 0, 255]))
            .save(dir.join("nz.png"))
            .unwrap();
        let err = decode_cube(&faces).unwrap_err().to_string();
        assert!(err.contains("square"), "{}", err);

        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]))
            .save(dir.join("nz.png"))
            .unwrap();
        let cube = decode_cube(&faces).unwrap();
        assert_eq!(cube.layers, 6);
        assert_eq!(cube.pixels.len(), 2 * 2 * 4 * 6);
    }
}
