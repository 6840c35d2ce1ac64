use eframe::egui;
use egui::{Align2, Color32, ColorImage, FontId, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};

use crate::canvas::{ImageCoordinate, PixelSample, RasterBuffer, ViewportTransform};
use crate::ops::remap::EncodedUv;

// ============================================================================
// CANVAS VIEWER — one pan/zoom surface showing a single raster
// ============================================================================

/// How much the selection square extends past its pixel, in image pixels.
const CURSOR_MARGIN: f64 = 0.2;
/// Stroke width of cursor and marker squares, in screen points.
const CURSOR_STROKE: f32 = 4.0;

const ORANGE: Color32 = Color32::from_rgb(255, 165, 0);
const GREEN: Color32 = Color32::from_rgb(0, 128, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerKind {
    Map,
    Texture,
    /// Non-picking result view.
    Output,
}

impl ViewerKind {
    fn texture_name(self) -> &'static str {
        match self {
            ViewerKind::Map => "map_canvas",
            ViewerKind::Texture => "texture_canvas",
            ViewerKind::Output => "output_canvas",
        }
    }

    /// Picking viewers pan with the middle button only, so primary clicks stay
    /// free for the handshake.
    fn pans_with_any_button(self) -> bool {
        self == ViewerKind::Output
    }
}

/// Squares drawn over the image this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewerOverlay {
    /// Hovered pixel and its stroke colour.
    pub cursor: Option<(ImageCoordinate, Color32)>,
    /// Blue marker: the UV a map pixel points at, or the map pixel itself.
    pub marker: Option<ImageCoordinate>,
}

/// Pointer state gathered by [`CanvasViewer::show`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewerResponse {
    /// Image-space pixel under the pointer (possibly outside the raster).
    pub pointer: Option<(i64, i64)>,
    pub primary_clicked: bool,
}

/// Stroke colour of a picking viewer's hover square.
///
/// `companion_armed`: the other viewer offers a selection.
/// `own_armed`: this viewer's hover is frozen.
pub fn cursor_color(companion_armed: bool, own_armed: bool) -> Color32 {
    match (companion_armed, own_armed) {
        (true, false) => ORANGE,
        (true, true) => Color32::RED,
        (false, false) => Color32::YELLOW,
        (false, true) => GREEN,
    }
}

/// Texture pixel the hovered map pixel encodes (unclamped, as drawn).
pub fn uv_marker(map_hover: &PixelSample) -> ImageCoordinate {
    let uv = EncodedUv::decode(map_hover.color);
    ImageCoordinate::new(uv.u, uv.v)
}

/// Screen rect of a pixel grown by `margin` in total, half on each side.
pub fn pixel_screen_rect(viewport: &ViewportTransform, origin: Pos2, coord: ImageCoordinate, margin: f64) -> Rect {
    let (x0, y0) = viewport.to_screen(coord.x as f64 - margin / 2.0, coord.y as f64 - margin / 2.0);
    let (x1, y1) = viewport.to_screen(
        coord.x as f64 + 1.0 + margin / 2.0,
        coord.y as f64 + 1.0 + margin / 2.0,
    );
    Rect::from_min_max(
        origin + Vec2::new(x0 as f32, y0 as f32),
        origin + Vec2::new(x1 as f32, y1 as f32),
    )
}

pub struct CanvasViewer {
    pub kind: ViewerKind,
    pub viewport: ViewportTransform,
    texture: Option<TextureHandle>,
    /// Generation of the buffer last uploaded to `texture`.
    uploaded_generation: Option<u64>,
}

impl CanvasViewer {
    pub fn new(kind: ViewerKind) -> Self {
        Self {
            kind,
            viewport: ViewportTransform::default(),
            texture: None,
            uploaded_generation: None,
        }
    }

    /// Re-upload only when the session reports new pixels.
    fn sync_texture(&mut self, ctx: &egui::Context, buffer: Option<&RasterBuffer>, generation: u64) {
        let Some(buffer) = buffer else {
            self.texture = None;
            self.uploaded_generation = None;
            return;
        };
        if self.uploaded_generation == Some(generation) && self.texture.is_some() {
            return;
        }
        let image = ColorImage::from_rgba_unmultiplied(
            [buffer.width() as usize, buffer.height() as usize],
            buffer.as_raw(),
        );
        match self.texture.as_mut() {
            Some(handle) => handle.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(self.kind.texture_name(), image, TextureOptions::NEAREST));
            }
        }
        self.uploaded_generation = Some(generation);
    }

    /// Draw the viewer into all remaining space and collect pointer input.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        buffer: Option<&RasterBuffer>,
        generation: u64,
        overlay: &ViewerOverlay,
        zoom_intensity: f64,
        empty_hint: &str,
    ) -> ViewerResponse {
        self.sync_texture(ui.ctx(), buffer, generation);

        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min;

        // Pan
        let panning = if self.kind.pans_with_any_button() {
            response.dragged()
        } else {
            response.dragged_by(egui::PointerButton::Middle)
        };
        if panning {
            let delta = response.drag_delta();
            self.viewport.pan(delta.x as f64, delta.y as f64);
        }

        // Wheel zoom anchored at the cursor; egui's positive y is "scroll up"
        let hover_pos = response.hover_pos();
        if let Some(pos) = hover_pos {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll != 0.0 {
                let local = pos - origin;
                self.viewport
                    .zoom_at(local.x as f64, local.y as f64, scroll as f64 * zoom_intensity);
            }
        }

        painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

        match (&self.texture, buffer) {
            (Some(texture), Some(buffer)) => {
                let (x0, y0) = self.viewport.to_screen(0.0, 0.0);
                let (x1, y1) = self
                    .viewport
                    .to_screen(buffer.width() as f64, buffer.height() as f64);
                let image_rect = Rect::from_min_max(
                    origin + Vec2::new(x0 as f32, y0 as f32),
                    origin + Vec2::new(x1 as f32, y1 as f32),
                );
                painter.image(
                    texture.id(),
                    image_rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            _ => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    empty_hint,
                    FontId::proportional(14.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }

        if let Some((coord, color)) = overlay.cursor {
            let r = pixel_screen_rect(&self.viewport, origin, coord, CURSOR_MARGIN);
            painter.rect_stroke(r, 0.0, Stroke::new(CURSOR_STROKE, color));
        }
        if let Some(coord) = overlay.marker {
            let r = pixel_screen_rect(&self.viewport, origin, coord, CURSOR_MARGIN);
            painter.rect_stroke(r, 0.0, Stroke::new(CURSOR_STROKE, Color32::BLUE));
        }

        let pointer = hover_pos.map(|pos| {
            let local = pos - origin;
            self.viewport.to_image_space(local.x as f64, local.y as f64)
        });

        ViewerResponse {
            pointer,
            primary_clicked: response.clicked(),
        }
    }
}
