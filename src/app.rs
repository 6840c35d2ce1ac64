use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::canvas::{PixelSample, RasterBuffer};
use crate::components::selection::ClickOutcome;
use crate::components::viewer::{CanvasViewer, ViewerKind, ViewerOverlay, ViewerResponse, cursor_color, uv_marker};
use crate::error::{ImageSlot, RemapError};
use crate::io::{self, FileHandler};
use crate::session::{LoadOutcome, LoadTicket, Session};
use crate::settings::AppSettings;

// ============================================================================
// ASYNC IO PIPELINE — background decode / export with channel completion
// ============================================================================

/// Result delivered from a background IO job.
pub enum IoResult {
    /// Decode finished (or failed) for the load identified by `ticket`.
    ImageLoaded {
        ticket: LoadTicket,
        result: Result<RasterBuffer, RemapError>,
    },
    ExportComplete { path: PathBuf },
    ExportFailed(String),
}

pub struct MapEditApp {
    session: Session,

    map_viewer: CanvasViewer,
    texture_viewer: CanvasViewer,
    output_viewer: CanvasViewer,

    file_handler: FileHandler,
    settings: AppSettings,

    io_sender: mpsc::Sender<IoResult>,
    io_receiver: mpsc::Receiver<IoResult>,
    pending_io_ops: usize,

    /// Last user-visible message (rejections, failures, export results).
    notice: Option<String>,
}

impl MapEditApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let language = if settings.language.is_empty() {
            crate::i18n::detect_system_language()
        } else {
            settings.language.clone()
        };
        crate::i18n::set_language(&language);
        crate::log_info!("Language: {}", crate::i18n::current_language());

        let (io_sender, io_receiver) = mpsc::channel();
        Self {
            session: Session::new(),
            map_viewer: CanvasViewer::new(ViewerKind::Map),
            texture_viewer: CanvasViewer::new(ViewerKind::Texture),
            output_viewer: CanvasViewer::new(ViewerKind::Output),
            file_handler: FileHandler::new(),
            settings,
            io_sender,
            io_receiver,
            pending_io_ops: 0,
            notice: None,
        }
    }

    fn slot_name(slot: ImageSlot) -> String {
        match slot {
            ImageSlot::Map => t!("slot.map"),
            ImageSlot::Texture => t!("slot.texture"),
        }
    }

    /// Pick a file and decode it off the UI thread. Rejected types never
    /// reach the session.
    fn request_upload(&mut self, slot: ImageSlot) {
        let title = match slot {
            ImageSlot::Map => t!("dialog.pick_map"),
            ImageSlot::Texture => t!("dialog.pick_texture"),
        };
        let Some(path) = self.file_handler.pick_png(&title) else { return };

        if let Err(e) = io::check_file_type(&path) {
            crate::log_warn!("{}", e);
            self.notice = Some(t!("notice.png_only"));
            return;
        }

        let ticket = self.session.begin_load(slot);
        crate::log_info!("Decoding {} from {} (token {})", slot.label(), path.display(), ticket.token);
        self.notice = Some(t!("notice.loading", slot = Self::slot_name(slot)));

        let sender = self.io_sender.clone();
        self.pending_io_ops += 1;
        rayon::spawn(move || {
            let result = io::load_png_file(&path);
            let _ = sender.send(IoResult::ImageLoaded { ticket, result });
        });
    }

    fn request_export(&mut self) {
        let Some(baked) = self.session.export() else {
            self.notice = Some(t!("notice.no_map"));
            return;
        };
        let Some(path) = self.file_handler.pick_export_path(&self.settings.export_file_name) else {
            return;
        };

        let sender = self.io_sender.clone();
        self.pending_io_ops += 1;
        rayon::spawn(move || match io::write_png_file(&baked, &path) {
            Ok(()) => {
                let _ = sender.send(IoResult::ExportComplete { path });
            }
            Err(e) => {
                let _ = sender.send(IoResult::ExportFailed(e.to_string()));
            }
        });
    }

    fn poll_io(&mut self) {
        while let Ok(msg) = self.io_receiver.try_recv() {
            self.pending_io_ops = self.pending_io_ops.saturating_sub(1);
            match msg {
                IoResult::ImageLoaded { ticket, result } => {
                    let slot = Self::slot_name(ticket.slot);
                    match self.session.finish_load(ticket, result) {
                        Ok(LoadOutcome::Applied) => self.notice = None,
                        Ok(LoadOutcome::Superseded) => {}
                        Err(RemapError::Io(e)) => {
                            self.notice = Some(t!("notice.read_failed", slot = slot, error = e));
                        }
                        Err(e) => {
                            self.notice = Some(t!("notice.decode_failed", slot = slot, error = e));
                        }
                    }
                }
                IoResult::ExportComplete { path } => {
                    crate::log_info!("Exported baked map to {}", path.display());
                    self.notice = Some(t!("notice.exported", path = path.display()));
                }
                IoResult::ExportFailed(error) => {
                    crate::log_err!("Export failed: {}", error);
                    self.notice = Some(t!("notice.export_failed", error = error));
                }
            }
        }
    }

    fn hover_line(label: &str, sample: Option<PixelSample>) -> Option<String> {
        let s = sample?;
        let [r, g, b, a] = s.color.0;
        Some(format!(
            "{}: ({}, {}) RGBA({}, {}, {}, {}) {}",
            label, s.coord.x, s.coord.y, r, g, b, a, s.selected
        ))
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(t!("button.upload_map")).clicked() {
                    self.request_upload(ImageSlot::Map);
                }
                if ui.button(t!("button.upload_texture")).clicked() {
                    self.request_upload(ImageSlot::Texture);
                }
                if ui.button(t!("button.download_map")).clicked() {
                    self.request_export();
                }

                ui.separator();

                let mut changed = ui
                    .checkbox(&mut self.settings.show_hover_info, "RGBA")
                    .changed();
                let current = crate::i18n::current_language();
                let current_name = crate::i18n::LANGUAGES
                    .iter()
                    .find(|(code, _)| *code == current)
                    .map(|(_, name)| *name)
                    .unwrap_or("English");
                egui::ComboBox::from_id_source("language")
                    .selected_text(current_name)
                    .show_ui(ui, |ui| {
                        for (code, name) in crate::i18n::LANGUAGES {
                            if ui
                                .selectable_value(&mut self.settings.language, code.to_string(), *name)
                                .changed()
                            {
                                crate::i18n::set_language(code);
                                changed = true;
                            }
                        }
                    });
                if changed {
                    self.settings.save();
                }

                if self.pending_io_ops > 0 {
                    ui.spinner();
                }
            });

            if self.settings.show_hover_info {
                let lines = [
                    Self::hover_line(&t!("hover.map"), self.session.map_picker.hover()),
                    Self::hover_line(&t!("hover.texture"), self.session.texture_picker.hover()),
                ];
                for line in lines.into_iter().flatten() {
                    ui.monospace(line);
                }
            }

            ui.horizontal(|ui| {
                ui.label(t!("status.edits", count = self.session.ledger().len()));
                if self.session.texture_picker.is_armed()
                    && let Some(s) = self.session.texture_picker.hover()
                {
                    ui.separator();
                    ui.label(t!("status.armed", x = s.coord.x, y = s.coord.y));
                }
                if let Some(notice) = &self.notice {
                    ui.separator();
                    ui.colored_label(ui.visuals().warn_fg_color, notice);
                }
            });
        });
    }

    fn overlays(&self) -> [ViewerOverlay; 3] {
        let map_picker = self.session.picker(ImageSlot::Map);
        let texture_picker = self.session.picker(ImageSlot::Texture);
        let (map_hover, map_armed) = (map_picker.hover(), map_picker.is_armed());
        let (texture_hover, texture_armed) = (texture_picker.hover(), texture_picker.is_armed());

        let map = ViewerOverlay {
            cursor: map_hover.map(|h| (h.coord, cursor_color(texture_armed, map_armed))),
            marker: None,
        };
        let texture = ViewerOverlay {
            cursor: texture_hover.map(|h| (h.coord, cursor_color(map_armed, texture_armed))),
            marker: map_hover.as_ref().map(uv_marker),
        };
        let output = ViewerOverlay {
            cursor: None,
            marker: map_hover.map(|h| h.coord),
        };
        [map, texture, output]
    }

    fn show_viewers(&mut self, ctx: &egui::Context) -> (ViewerResponse, ViewerResponse) {
        let [map_overlay, texture_overlay, output_overlay] = self.overlays();
        let zoom = self.settings.zoom_intensity;
        let session = &self.session;
        let map_viewer = &mut self.map_viewer;
        let texture_viewer = &mut self.texture_viewer;
        let output_viewer = &mut self.output_viewer;

        let mut map_resp = ViewerResponse::default();
        let mut texture_resp = ViewerResponse::default();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(3, |cols| {
                map_resp = map_viewer.show(
                    &mut cols[0],
                    session.buffer(ImageSlot::Map),
                    session.generation(ImageSlot::Map),
                    &map_overlay,
                    zoom,
                    &t!("viewer.empty_map"),
                );
                texture_resp = texture_viewer.show(
                    &mut cols[1],
                    session.buffer(ImageSlot::Texture),
                    session.generation(ImageSlot::Texture),
                    &texture_overlay,
                    zoom,
                    &t!("viewer.empty_texture"),
                );
                output_viewer.show(
                    &mut cols[2],
                    session.output(),
                    session.output_generation(),
                    &output_overlay,
                    zoom,
                    &t!("viewer.empty_output"),
                );
            });
        });

        (map_resp, texture_resp)
    }

    /// Hover first, then click, so a click commits the pixel under it.
    fn apply_pointer(&mut self, map: ViewerResponse, texture: ViewerResponse) {
        if let Some((ix, iy)) = texture.pointer {
            self.session.hover(ImageSlot::Texture, ix, iy);
        }
        if let Some((ix, iy)) = map.pointer {
            self.session.hover(ImageSlot::Map, ix, iy);
        }
        if texture.primary_clicked {
            self.session.click_texture();
        }
        if map.primary_clicked && let ClickOutcome::Commit(_) = self.session.click_map() {
            self.notice = None;
        }
    }
}

impl eframe::App for MapEditApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_io();

        // Missing inputs just leave the previous output on screen.
        if self.session.needs_composite() {
            let _ = self.session.recomposite();
        }

        self.show_top_panel(ctx);
        let (map, texture) = self.show_viewers(ctx);
        self.apply_pointer(map, texture);

        if self.pending_io_ops > 0 {
            ctx.request_repaint();
        }
    }
}
