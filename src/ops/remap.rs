// ============================================================================
// REMAP — coordinate encoding and the map/ledger/texture compositor
// ============================================================================

use image::Rgba;
use rayon::prelude::*;

use crate::canvas::{ImageCoordinate, RasterBuffer};
use crate::components::edits::EditLedger;

/// Texture coordinate carried by a map pixel.
///
/// Decoding is `u = r`, `v = max(g, b)`; alpha is ignored. Lossy on purpose:
/// exported maps must round-trip bit-identically with existing ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedUv {
    pub u: u32,
    pub v: u32,
}

impl EncodedUv {
    #[inline]
    pub fn decode(quad: Rgba<u8>) -> Self {
        let [r, g, b, _] = quad.0;
        Self {
            u: r as u32,
            v: g.max(b) as u32,
        }
    }

    /// Texture-space pixel this UV resolves to, clamped to the texture.
    #[inline]
    pub fn clamp_to(self, texture_width: u32, texture_height: u32) -> ImageCoordinate {
        ImageCoordinate::new(
            self.u.min(texture_width.saturating_sub(1)),
            self.v.min(texture_height.saturating_sub(1)),
        )
    }
}

/// Override quad pointing at a texture pixel: `r = x, g = y, b = 0, a = 255`.
///
/// Channels are bytes, so coordinates past 255 saturate.
pub fn encode_uv(texture_coord: ImageCoordinate) -> Rgba<u8> {
    Rgba([
        texture_coord.x.min(u8::MAX as u32) as u8,
        texture_coord.y.min(u8::MAX as u32) as u8,
        0,
        255,
    ])
}

/// True when `encode_uv` would lose information for this coordinate.
pub fn exceeds_encoding(texture_coord: ImageCoordinate) -> bool {
    texture_coord.x > u8::MAX as u32 || texture_coord.y > u8::MAX as u32
}

/// Resolve every map pixel (or its ledger override) to a texture colour.
///
/// Output has the map's dimensions and is always a fresh full pass. Rows are
/// resolved in parallel but the call itself returns only when all are done.
pub fn composite(map: &RasterBuffer, ledger: &EditLedger, texture: &RasterBuffer) -> RasterBuffer {
    let width = map.width();
    let height = map.height();
    let mut output = RasterBuffer::new(width, height);
    if map.is_empty() || texture.is_empty() {
        return output;
    }

    let row_bytes = width as usize * 4;
    let map_raw = map.as_raw();
    let tex_raw = texture.as_raw();
    let tex_w = texture.width();
    let tex_h = texture.height();

    output
        .as_raw_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, out_row)| {
            let map_row = &map_raw[y * row_bytes..(y + 1) * row_bytes];
            for x in 0..width as usize {
                let i = x * 4;
                let quad = ledger
                    .get(ImageCoordinate::new(x as u32, y as u32))
                    .unwrap_or(Rgba([map_row[i], map_row[i + 1], map_row[i + 2], map_row[i + 3]]));

                let tc = EncodedUv::decode(quad).clamp_to(tex_w, tex_h);
                let t = (tc.y as usize * tex_w as usize + tc.x as usize) * 4;
                out_row[i..i + 4].copy_from_slice(&tex_raw[t..t + 4]);
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_texture(w: u32, h: u32) -> RasterBuffer {
        let mut tex = RasterBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                tex.put_pixel(ImageCoordinate::new(x, y), Rgba([x as u8, y as u8, 100, 200]))
                    .unwrap();
            }
        }
        tex
    }

    #[test]
    fn decode_uses_max_of_green_and_blue() {
        assert_eq!(EncodedUv::decode(Rgba([3, 9, 4, 0])), EncodedUv { u: 3, v: 9 });
        assert_eq!(EncodedUv::decode(Rgba([3, 2, 40, 17])), EncodedUv { u: 3, v: 40 });
    }

    #[test]
    fn encode_saturates_large_coordinates() {
        let c = ImageCoordinate::new(300, 12);
        assert!(exceeds_encoding(c));
        assert_eq!(encode_uv(c), Rgba([255, 12, 0, 255]));
        assert!(!exceeds_encoding(ImageCoordinate::new(255, 255)));
    }

    #[test]
    fn composite_clamps_to_texture_edges() {
        let mut map = RasterBuffer::new(1, 1);
        map.put_pixel(ImageCoordinate::new(0, 0), Rgba([250, 0, 250, 255])).unwrap();
        let out = composite(&map, &EditLedger::new(), &gradient_texture(4, 3));
        assert_eq!(out.get_pixel(ImageCoordinate::new(0, 0)), Some(Rgba([3, 2, 100, 200])));
    }

    #[test]
    fn composite_copies_alpha_and_keeps_map_size() {
        let map = RasterBuffer::new(5, 2);
        let tex = RasterBuffer::new_filled(2, 2, Rgba([10, 20, 30, 40]));
        let out = composite(&map, &EditLedger::new(), &tex);
        assert_eq!((out.width(), out.height()), (5, 2));
        assert!(out.as_raw().chunks(4).all(|q| q == [10, 20, 30, 40]));
    }

    #[test]
    fn ledger_overrides_map_encoding() {
        let mut map = RasterBuffer::new(2, 1);
        map.put_pixel(ImageCoordinate::new(0, 0), Rgba([1, 1, 0, 255])).unwrap();
        map.put_pixel(ImageCoordinate::new(1, 0), Rgba([1, 1, 0, 255])).unwrap();
        let mut ledger = EditLedger::new();
        ledger.put(ImageCoordinate::new(1, 0), Rgba([2, 0, 1, 255]));

        let out = composite(&map, &ledger, &gradient_texture(3, 3));
        assert_eq!(out.get_pixel(ImageCoordinate::new(0, 0)), Some(Rgba([1, 1, 100, 200])));
        assert_eq!(out.get_pixel(ImageCoordinate::new(1, 0)), Some(Rgba([2, 1, 100, 200])));
    }

    #[test]
    fn composite_is_deterministic() {
        let mut map = RasterBuffer::new(16, 9);
        for y in 0..9 {
            for x in 0..16 {
                map.put_pixel(ImageCoordinate::new(x, y), Rgba([(x * 31) as u8, (y * 17) as u8, x as u8, 255]))
                    .unwrap();
            }
        }
        let mut ledger = EditLedger::new();
        ledger.put(ImageCoordinate::new(3, 3), Rgba([0, 0, 0, 255]));
        let tex = gradient_texture(7, 5);
        assert_eq!(composite(&map, &ledger, &tex), composite(&map, &ledger, &tex));
    }

    #[test]
    fn empty_texture_yields_transparent_output() {
        let map = RasterBuffer::new_filled(2, 2, Rgba([1, 1, 1, 255]));
        let out = composite(&map, &EditLedger::new(), &RasterBuffer::new(0, 0));
        assert_eq!((out.width(), out.height()), (2, 2));
        assert!(out.as_raw().iter().all(|&b| b == 0));
    }
}
