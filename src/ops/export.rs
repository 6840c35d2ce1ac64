// ============================================================================
// EXPORT — bake ledger overrides into the map's own encoding channels
// ============================================================================

use crate::canvas::RasterBuffer;
use crate::components::edits::EditLedger;

/// Name offered for the downloaded map.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "edited-map.png";

/// Copy of `map` with every ledger quad written verbatim into its pixel.
///
/// Entries outside the map (left over from a larger, since replaced map) are
/// skipped. The result is an encoding, not a picture of the textured output.
pub fn bake(map: &RasterBuffer, ledger: &EditLedger) -> RasterBuffer {
    let mut baked = map.clone();
    for (coord, quad) in ledger.iter() {
        if baked.put_pixel(coord, quad).is_err() {
            crate::log_warn!("bake: skipping edit at ({}, {}) outside {}x{} map", coord.x, coord.y, map.width(), map.height());
        }
    }
    baked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ImageCoordinate;
    use image::Rgba;

    #[test]
    fn bake_writes_quads_verbatim() {
        let map = RasterBuffer::new_filled(3, 3, Rgba([1, 2, 3, 4]));
        let mut ledger = EditLedger::new();
        ledger.put(ImageCoordinate::new(2, 1), Rgba([9, 8, 0, 255]));

        let baked = bake(&map, &ledger);
        assert_eq!(baked.get_pixel(ImageCoordinate::new(2, 1)), Some(Rgba([9, 8, 0, 255])));
        assert_eq!(baked.get_pixel(ImageCoordinate::new(0, 0)), Some(Rgba([1, 2, 3, 4])));
    }

    #[test]
    fn bake_leaves_source_untouched() {
        let map = RasterBuffer::new_filled(2, 2, Rgba([5, 5, 5, 5]));
        let mut ledger = EditLedger::new();
        ledger.put(ImageCoordinate::new(0, 0), Rgba([0, 0, 0, 255]));
        let _ = bake(&map, &ledger);
        assert_eq!(map.get_pixel(ImageCoordinate::new(0, 0)), Some(Rgba([5, 5, 5, 5])));
    }

    #[test]
    fn bake_skips_entries_outside_map() {
        let map = RasterBuffer::new_filled(2, 2, Rgba([5, 5, 5, 5]));
        let mut ledger = EditLedger::new();
        ledger.put(ImageCoordinate::new(7, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(bake(&map, &ledger), map);
    }
}
