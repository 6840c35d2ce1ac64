// ============================================================================
// CANVAS — raster storage, screen↔image mapping and pixel picking
// ============================================================================

use image::{Rgba, RgbaImage};

use crate::components::selection::SelectionState;
use crate::error::RemapError;

/// Smallest zoom factor a viewport may reach.
pub const MIN_SCALE: f64 = 0.1;

// ============================================================================
// RASTER BUFFER
// ============================================================================

/// Integer pixel position inside a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageCoordinate {
    pub x: u32,
    pub y: u32,
}

impl ImageCoordinate {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Flat, row-major RGBA8 pixel store.
///
/// Dimensions are fixed for the lifetime of the buffer; the only mutation is
/// replacing one quad in place. A new image load replaces the whole buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn new_filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&color.0);
        }
        Self { width, height, pixels }
    }

    /// Wrap an existing flat RGBA vector. Returns `None` when the length does
    /// not match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Validate a signed image-space position against the extents.
    pub fn coordinate(&self, x: i64, y: i64) -> Option<ImageCoordinate> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(ImageCoordinate::new(x as u32, y as u32))
    }

    pub fn contains(&self, coord: ImageCoordinate) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn get_pixel(&self, coord: ImageCoordinate) -> Option<Rgba<u8>> {
        if !self.contains(coord) {
            return None;
        }
        let i = self.index(coord.x, coord.y);
        Some(Rgba([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]))
    }

    pub fn put_pixel(&mut self, coord: ImageCoordinate, pixel: Rgba<u8>) -> Result<(), RemapError> {
        if !self.contains(coord) {
            return Err(RemapError::OutOfBounds {
                x: coord.x as i64,
                y: coord.y as i64,
            });
        }
        let i = self.index(coord.x, coord.y);
        self.pixels[i..i + 4].copy_from_slice(&pixel.0);
        Ok(())
    }
}

// ============================================================================
// VIEWPORT TRANSFORM
// ============================================================================

/// Affine screen mapping of one viewer: `screen = image * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewportTransform {
    /// Translate by a screen-space delta. Unbounded.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Change the scale by `delta_scale` while keeping the image point under
    /// `(screen_x, screen_y)` fixed on screen.
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, delta_scale: f64) {
        let (world_x, world_y) = self.to_image_point(screen_x, screen_y);
        let new_scale = (self.scale + delta_scale).max(MIN_SCALE);

        self.scale = new_scale;
        self.offset_x = screen_x - world_x * new_scale;
        self.offset_y = screen_y - world_y * new_scale;
    }

    pub fn to_screen(&self, image_x: f64, image_y: f64) -> (f64, f64) {
        (
            image_x * self.scale + self.offset_x,
            image_y * self.scale + self.offset_y,
        )
    }

    /// Exact inverse of [`to_screen`](Self::to_screen).
    pub fn to_image_point(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (
            (screen_x - self.offset_x) / self.scale,
            (screen_y - self.offset_y) / self.scale,
        )
    }

    /// Pixel under a screen point. May lie outside any raster.
    pub fn to_image_space(&self, screen_x: f64, screen_y: f64) -> (i64, i64) {
        let (ix, iy) = self.to_image_point(screen_x, screen_y);
        (ix.floor() as i64, iy.floor() as i64)
    }
}

// ============================================================================
// PIXEL PICKER
// ============================================================================

/// One sampled pixel. Recomputed on every pointer move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSample {
    pub coord: ImageCoordinate,
    pub color: Rgba<u8>,
    pub selected: bool,
}

/// Read the quad at `(ix, iy)`, or `None` outside `[0,w)×[0,h)`.
pub fn sample(buffer: &RasterBuffer, ix: i64, iy: i64) -> Option<PixelSample> {
    let coord = buffer.coordinate(ix, iy)?;
    let color = buffer.get_pixel(coord)?;
    Some(PixelSample {
        coord,
        color,
        selected: false,
    })
}

/// Per-viewer hover tracking plus the viewer's selection state.
#[derive(Clone, Debug, Default)]
pub struct PixelPicker {
    hover: Option<PixelSample>,
    state: SelectionState,
}

impl PixelPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&self) -> Option<PixelSample> {
        self.hover
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == SelectionState::Armed
    }

    /// Live hover update. Frozen while armed: the offered sample stays put.
    pub fn hover_at(&mut self, buffer: Option<&RasterBuffer>, ix: i64, iy: i64) -> Option<PixelSample> {
        if self.is_armed() {
            return self.hover;
        }
        self.hover = buffer.and_then(|b| sample(b, ix, iy));
        self.hover
    }

    /// Re-read the hovered quad after the underlying buffer changed.
    pub fn refresh(&mut self, buffer: &RasterBuffer) {
        if let Some(ref mut hover) = self.hover {
            match buffer.get_pixel(hover.coord) {
                Some(color) => hover.color = color,
                None => self.hover = None,
            }
        }
    }

    /// Freeze the current hover sample as the offered selection.
    pub fn arm(&mut self) -> Option<PixelSample> {
        let hover = self.hover.as_mut()?;
        hover.selected = true;
        self.state = SelectionState::Armed;
        Some(*hover)
    }

    pub fn disarm(&mut self) {
        if let Some(ref mut hover) = self.hover {
            hover.selected = false;
        }
        self.state = SelectionState::Idle;
    }

    /// Forget everything, e.g. when the viewed buffer is replaced.
    pub fn reset(&mut self) {
        self.hover = None;
        self.state = SelectionState::Idle;
    }
}
