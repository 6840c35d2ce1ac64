use image::Rgba;
use std::collections::HashMap;

use crate::canvas::ImageCoordinate;

// ============================================================================
// EDIT LEDGER — sparse per-pixel overrides layered over the map image
// ============================================================================

/// Map-pixel → override quad. The quad's encoded UV replaces whatever the map
/// pixel itself encodes. Entries are only ever added or overwritten.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditLedger {
    entries: HashMap<ImageCoordinate, Rgba<u8>>,
}

impl EditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Re-editing a coordinate keeps only the latest quad.
    pub fn put(&mut self, coord: ImageCoordinate, quad: Rgba<u8>) {
        self.entries.insert(coord, quad);
    }

    pub fn get(&self, coord: ImageCoordinate) -> Option<Rgba<u8>> {
        self.entries.get(&coord).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageCoordinate, Rgba<u8>)> + '_ {
        self.entries.iter().map(|(c, q)| (*c, *q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites_same_coordinate() {
        let mut ledger = EditLedger::new();
        let c = ImageCoordinate::new(4, 2);
        ledger.put(c, Rgba([1, 1, 0, 255]));
        ledger.put(c, Rgba([3, 5, 0, 255]));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(c), Some(Rgba([3, 5, 0, 255])));
    }

    #[test]
    fn put_is_idempotent() {
        let mut a = EditLedger::new();
        a.put(ImageCoordinate::new(0, 0), Rgba([7, 7, 0, 255]));
        let b = a.clone();
        a.put(ImageCoordinate::new(0, 0), Rgba([7, 7, 0, 255]));
        assert_eq!(a, b);
    }

    #[test]
    fn missing_coordinate_is_none() {
        let ledger = EditLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.get(ImageCoordinate::new(0, 0)), None);
    }

    #[test]
    fn iter_visits_every_entry() {
        let mut ledger = EditLedger::new();
        for i in 0..5 {
            ledger.put(ImageCoordinate::new(i, i), Rgba([i as u8, 0, 0, 255]));
        }
        let mut seen: Vec<_> = ledger.iter().map(|(c, _)| c.x).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
