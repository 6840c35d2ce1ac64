use image::Rgba;

use crate::canvas::{ImageCoordinate, PixelPicker, PixelSample};
use crate::ops::remap::encode_uv;

// ============================================================================
// SELECTION HANDSHAKE — source (texture) arm / target (map) commit
// ============================================================================

/// Viewer-local selection state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    /// The viewer's hover sample is frozen and offered to its companion.
    Armed,
}

/// Edit produced by a target click against an armed source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    /// Map pixel being overridden.
    pub target: ImageCoordinate,
    /// Texture pixel it should now resolve to.
    pub source: ImageCoordinate,
    /// Quad to store, `encode_uv(source)`.
    pub quad: Rgba<u8>,
}

/// What a primary click did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Armed(PixelSample),
    Disarmed,
    Commit(PendingEdit),
    Ignored,
}

/// Primary click on the source viewer: toggles `Idle <-> Armed`.
///
/// Arming needs a valid hover sample; disarming always succeeds.
pub fn click_source(source: &mut PixelPicker) -> ClickOutcome {
    if source.is_armed() {
        source.disarm();
        return ClickOutcome::Disarmed;
    }
    match source.arm() {
        Some(sample) => ClickOutcome::Armed(sample),
        None => ClickOutcome::Ignored,
    }
}

/// Primary click on the target viewer.
///
/// Commits only while the source is armed and both sides hold a sample. The
/// target's own selection state is irrelevant. Does not mutate anything; the
/// session owns applying the edit.
pub fn click_target(source: &PixelPicker, target: &PixelPicker) -> ClickOutcome {
    if !source.is_armed() {
        return ClickOutcome::Ignored;
    }
    let (Some(offered), Some(hovered)) = (source.hover(), target.hover()) else {
        return ClickOutcome::Ignored;
    };
    ClickOutcome::Commit(PendingEdit {
        target: hovered.coord,
        source: offered.coord,
        quad: encode_uv(offered.coord),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RasterBuffer;

    fn buffer() -> RasterBuffer {
        RasterBuffer::new_filled(4, 4, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn source_click_toggles() {
        let buf = buffer();
        let mut source = PixelPicker::new();
        source.hover_at(Some(&buf), 2, 3);

        match click_source(&mut source) {
            ClickOutcome::Armed(s) => {
                assert_eq!(s.coord, ImageCoordinate::new(2, 3));
                assert!(s.selected);
            }
            other => panic!("expected Armed, got {:?}", other),
        }
        assert_eq!(click_source(&mut source), ClickOutcome::Disarmed);
        assert_eq!(source.state(), SelectionState::Idle);
    }

    #[test]
    fn source_click_without_hover_is_ignored() {
        let mut source = PixelPicker::new();
        assert_eq!(click_source(&mut source), ClickOutcome::Ignored);
        assert_eq!(source.state(), SelectionState::Idle);
    }

    #[test]
    fn target_click_needs_armed_source() {
        let buf = buffer();
        let mut source = PixelPicker::new();
        let mut target = PixelPicker::new();
        source.hover_at(Some(&buf), 1, 1);
        target.hover_at(Some(&buf), 0, 0);
        assert_eq!(click_target(&source, &target), ClickOutcome::Ignored);
    }

    #[test]
    fn target_click_needs_target_hover() {
        let buf = buffer();
        let mut source = PixelPicker::new();
        let target = PixelPicker::new();
        source.hover_at(Some(&buf), 1, 1);
        click_source(&mut source);
        assert_eq!(click_target(&source, &target), ClickOutcome::Ignored);
    }

    #[test]
    fn target_click_commits_source_coordinate() {
        let buf = buffer();
        let mut source = PixelPicker::new();
        let mut target = PixelPicker::new();
        source.hover_at(Some(&buf), 3, 2);
        click_source(&mut source);
        target.hover_at(Some(&buf), 0, 1);

        let expected = PendingEdit {
            target: ImageCoordinate::new(0, 1),
            source: ImageCoordinate::new(3, 2),
            quad: Rgba([3, 2, 0, 255]),
        };
        assert_eq!(click_target(&source, &target), ClickOutcome::Commit(expected));
        assert!(source.is_armed());
    }
}
