use std::time::Instant;

use crate::canvas::{ImageCoordinate, PixelPicker, PixelSample, RasterBuffer, sample};
use crate::components::edits::EditLedger;
use crate::components::selection::{self, ClickOutcome, PendingEdit};
use crate::error::{ImageSlot, RemapError};
use crate::ops::{export, remap};

/// Handed out when a decode is requested; the result must come back with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub slot: ImageSlot,
    pub token: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request for the same slot exists; the result was dropped.
    Superseded,
}

/// Everything one editing session owns.
///
/// The two decoded rasters live here and nowhere else; viewers only borrow
/// them. The texture picker is the handshake source, the map picker the
/// target. All cross-component effects go through [`commit_edit`](Self::commit_edit)
/// or through replacing a buffer wholesale.
pub struct Session {
    map: Option<RasterBuffer>,
    texture: Option<RasterBuffer>,
    output: Option<RasterBuffer>,
    ledger: EditLedger,

    pub map_picker: PixelPicker,
    pub texture_picker: PixelPicker,

    /// Latest requested load per slot (last-requested-wins).
    load_tokens: [u64; 2],
    /// Bumped whenever the slot's pixels change, so viewers know to re-upload.
    generations: [u64; 2],
    output_generation: u64,
    output_stale: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            map: None,
            texture: None,
            output: None,
            ledger: EditLedger::new(),
            map_picker: PixelPicker::new(),
            texture_picker: PixelPicker::new(),
            load_tokens: [0; 2],
            generations: [0; 2],
            output_generation: 0,
            output_stale: false,
        }
    }

    pub fn buffer(&self, slot: ImageSlot) -> Option<&RasterBuffer> {
        match slot {
            ImageSlot::Map => self.map.as_ref(),
            ImageSlot::Texture => self.texture.as_ref(),
        }
    }

    pub fn map(&self) -> Option<&RasterBuffer> {
        self.map.as_ref()
    }

    pub fn texture(&self) -> Option<&RasterBuffer> {
        self.texture.as_ref()
    }

    pub fn output(&self) -> Option<&RasterBuffer> {
        self.output.as_ref()
    }

    pub fn ledger(&self) -> &EditLedger {
        &self.ledger
    }

    pub fn picker(&self, slot: ImageSlot) -> &PixelPicker {
        match slot {
            ImageSlot::Map => &self.map_picker,
            ImageSlot::Texture => &self.texture_picker,
        }
    }

    pub fn generation(&self, slot: ImageSlot) -> u64 {
        self.generations[slot.index()]
    }

    pub fn output_generation(&self) -> u64 {
        self.output_generation
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Register a new load for `slot`, superseding any still in flight.
    pub fn begin_load(&mut self, slot: ImageSlot) -> LoadTicket {
        let i = slot.index();
        self.load_tokens[i] = self.load_tokens[i].wrapping_add(1);
        LoadTicket {
            slot,
            token: self.load_tokens[i],
        }
    }

    /// Deliver a decode result. Stale tickets are discarded; failures leave
    /// the slot at its previous value.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<RasterBuffer, RemapError>,
    ) -> Result<LoadOutcome, RemapError> {
        if self.load_tokens[ticket.slot.index()] != ticket.token {
            crate::log_warn!(
                "Discarding superseded {} decode (token {}, current {})",
                ticket.slot.label(),
                ticket.token,
                self.load_tokens[ticket.slot.index()]
            );
            return Ok(LoadOutcome::Superseded);
        }

        let buffer = match result {
            Ok(buffer) => buffer,
            Err(e) => {
                crate::log_err!("Loading {} image failed: {}", ticket.slot.label(), e);
                return Err(e);
            }
        };

        crate::log_info!(
            "Loaded {} image {}x{}",
            ticket.slot.label(),
            buffer.width(),
            buffer.height()
        );
        match ticket.slot {
            ImageSlot::Map => {
                self.map = Some(buffer);
                self.map_picker.reset();
            }
            ImageSlot::Texture => {
                self.texture = Some(buffer);
                self.texture_picker.reset();
            }
        }
        self.generations[ticket.slot.index()] += 1;
        self.output_stale = true;
        Ok(LoadOutcome::Applied)
    }

    /// Synchronous load used by the CLI and tests.
    pub fn install(&mut self, slot: ImageSlot, buffer: RasterBuffer) {
        let ticket = self.begin_load(slot);
        let _ = self.finish_load(ticket, Ok(buffer));
    }

    // ========================================================================
    // PICKING & HANDSHAKE
    // ========================================================================

    /// Pointer moved over the viewer of `slot` to image pixel `(ix, iy)`.
    pub fn hover(&mut self, slot: ImageSlot, ix: i64, iy: i64) -> Option<PixelSample> {
        match slot {
            ImageSlot::Map => self.map_picker.hover_at(self.map.as_ref(), ix, iy),
            ImageSlot::Texture => self.texture_picker.hover_at(self.texture.as_ref(), ix, iy),
        }
    }

    /// Primary click on the texture viewer.
    pub fn click_texture(&mut self) -> ClickOutcome {
        let outcome = selection::click_source(&mut self.texture_picker);
        match outcome {
            ClickOutcome::Armed(s) => {
                crate::log_info!("Armed texture pixel ({}, {})", s.coord.x, s.coord.y);
            }
            ClickOutcome::Disarmed => {
                crate::log_info!("Texture selection released");
            }
            _ => {}
        }
        outcome
    }

    /// Primary click on the map viewer. Commits when the texture is armed.
    pub fn click_map(&mut self) -> ClickOutcome {
        let outcome = selection::click_target(&self.texture_picker, &self.map_picker);
        if let ClickOutcome::Commit(edit) = outcome
            && let Err(e) = self.apply_edit(edit)
        {
            crate::log_warn!("Edit ignored: {}", e);
            return ClickOutcome::Ignored;
        }
        outcome
    }

    /// Hover `coord` on the texture and arm it, as a click there would.
    /// On error the current selection and hover are left untouched.
    pub fn arm_selection(&mut self, coord: ImageCoordinate) -> Result<PixelSample, RemapError> {
        let texture = self
            .texture
            .as_ref()
            .ok_or(RemapError::CompositorInputMissing(ImageSlot::Texture))?;
        let (x, y) = (coord.x as i64, coord.y as i64);
        if sample(texture, x, y).is_none() {
            return Err(RemapError::OutOfBounds { x, y });
        }

        self.texture_picker.disarm();
        self.hover(ImageSlot::Texture, x, y);
        match self.click_texture() {
            ClickOutcome::Armed(sample) => Ok(sample),
            _ => Err(RemapError::OutOfBounds { x, y }),
        }
    }

    /// Hover `coord` on the map and click it, committing the armed selection.
    pub fn commit_selection(&mut self, coord: ImageCoordinate) -> ClickOutcome {
        self.hover(ImageSlot::Map, coord.x as i64, coord.y as i64);
        self.click_map()
    }

    /// Point map pixel `target` at texture pixel `source`.
    pub fn commit_edit(&mut self, target: ImageCoordinate, source: ImageCoordinate) -> Result<(), RemapError> {
        self.apply_edit(PendingEdit {
            target,
            source,
            quad: remap::encode_uv(source),
        })
    }

    /// Ledger and map buffer are updated together so the map viewer shows
    /// its own new encoding.
    fn apply_edit(&mut self, edit: PendingEdit) -> Result<(), RemapError> {
        let map = self
            .map
            .as_mut()
            .ok_or(RemapError::CompositorInputMissing(ImageSlot::Map))?;
        map.put_pixel(edit.target, edit.quad)?;
        self.ledger.put(edit.target, edit.quad);

        if remap::exceeds_encoding(edit.source) {
            crate::log_warn!(
                "Texture coordinate ({}, {}) exceeds 8-bit encoding; saturated to ({}, {})",
                edit.source.x,
                edit.source.y,
                edit.quad[0],
                edit.quad[1]
            );
        }
        crate::log_info!(
            "Edit ({}, {}) -> texture ({}, {}); {} edit(s) total",
            edit.target.x,
            edit.target.y,
            edit.source.x,
            edit.source.y,
            self.ledger.len()
        );

        self.map_picker.refresh(map);
        self.generations[ImageSlot::Map.index()] += 1;
        self.output_stale = true;
        Ok(())
    }

    // ========================================================================
    // COMPOSITING & EXPORT
    // ========================================================================

    pub fn needs_composite(&self) -> bool {
        self.output_stale
    }

    /// Full compositor pass, replacing the previous output. When an input is
    /// missing the previous output (if any) is left in place.
    pub fn recomposite(&mut self) -> Result<&RasterBuffer, RemapError> {
        let map = self
            .map
            .as_ref()
            .ok_or(RemapError::CompositorInputMissing(ImageSlot::Map))?;
        let texture = self
            .texture
            .as_ref()
            .ok_or(RemapError::CompositorInputMissing(ImageSlot::Texture))?;

        let start = Instant::now();
        let output = remap::composite(map, &self.ledger, texture);
        crate::log_info!(
            "Composited {}x{} in {:.1}ms",
            output.width(),
            output.height(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        self.output_stale = false;
        self.output_generation += 1;
        Ok(&*self.output.insert(output))
    }

    /// Baked map ready for encoding, or `None` before a map is loaded.
    pub fn export(&self) -> Option<RasterBuffer> {
        let map = self.map.as_ref()?;
        Some(export::bake(map, &self.ledger))
    }
}
