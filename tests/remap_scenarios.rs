use image::Rgba;

use uvmapedit::canvas::{ImageCoordinate, RasterBuffer};
use uvmapedit::components::edits::EditLedger;
use uvmapedit::components::selection::{ClickOutcome, SelectionState};
use uvmapedit::error::{ImageSlot, RemapError};
use uvmapedit::io::{decode_png, encode_png};
use uvmapedit::ops::export::bake;
use uvmapedit::ops::remap::composite;
use uvmapedit::session::{LoadOutcome, Session};

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn at(x: u32, y: u32) -> ImageCoordinate {
    ImageCoordinate::new(x, y)
}

/// 2x2 map: (0,0) encodes uv (1,1), everything else uv (0,0).
fn scenario_map() -> RasterBuffer {
    let mut map = RasterBuffer::new_filled(2, 2, Rgba([0, 0, 0, 255]));
    map.put_pixel(at(0, 0), Rgba([1, 1, 0, 255])).unwrap();
    map
}

/// 2x2 texture with a distinct colour per pixel.
fn scenario_texture() -> RasterBuffer {
    let mut tex = RasterBuffer::new(2, 2);
    tex.put_pixel(at(0, 0), Rgba([1, 1, 1, 255])).unwrap();
    tex.put_pixel(at(1, 0), Rgba([5, 5, 5, 255])).unwrap();
    tex.put_pixel(at(0, 1), Rgba([7, 7, 7, 255])).unwrap();
    tex.put_pixel(at(1, 1), Rgba([9, 9, 9, 255])).unwrap();
    tex
}

fn loaded_session() -> Session {
    let mut session = Session::new();
    session.install(ImageSlot::Map, scenario_map());
    session.install(ImageSlot::Texture, scenario_texture());
    session
}

#[test]
fn map_encoding_samples_texture() {
    let out = composite(&scenario_map(), &EditLedger::new(), &scenario_texture());
    assert_eq!(out.get_pixel(at(0, 0)), Some(Rgba([9, 9, 9, 255])));
    assert_eq!(out.get_pixel(at(1, 1)), Some(Rgba([1, 1, 1, 255])));
}

#[test]
fn ledger_entry_overrides_map_encoding() {
    let mut ledger = EditLedger::new();
    ledger.put(at(0, 0), Rgba([0, 0, 0, 255]));
    let out = composite(&scenario_map(), &ledger, &scenario_texture());
    assert_eq!(out.get_pixel(at(0, 0)), Some(Rgba([1, 1, 1, 255])));
}

#[test]
fn click_handshake_commits_one_edit() {
    let mut session = loaded_session();

    session.hover(ImageSlot::Texture, 1, 1);
    assert!(matches!(session.click_texture(), ClickOutcome::Armed(_)));

    session.hover(ImageSlot::Map, 0, 0);
    assert!(matches!(session.click_map(), ClickOutcome::Commit(_)));

    assert_eq!(session.ledger().len(), 1);
    assert_eq!(session.ledger().get(at(0, 0)), Some(Rgba([1, 1, 0, 255])));

    assert_eq!(session.click_texture(), ClickOutcome::Disarmed);
    assert_eq!(session.texture_picker.state(), SelectionState::Idle);
}

#[test]
fn map_click_without_armed_texture_is_ignored() {
    let mut session = loaded_session();
    session.hover(ImageSlot::Map, 0, 0);
    assert_eq!(session.click_map(), ClickOutcome::Ignored);
    assert!(session.ledger().is_empty());
}

#[test]
fn session_api_handshake_recomposites() {
    let mut session = loaded_session();
    session.arm_selection(at(1, 0)).unwrap();
    assert!(matches!(session.commit_selection(at(1, 1)), ClickOutcome::Commit(_)));

    assert!(session.needs_composite());
    let out = session.recomposite().unwrap();
    assert_eq!(out.get_pixel(at(1, 1)), Some(Rgba([5, 5, 5, 255])));
    assert!(!session.needs_composite());
}

#[test]
fn later_edit_of_same_pixel_wins() {
    let mut session = loaded_session();
    session.commit_edit(at(0, 0), at(1, 0)).unwrap();
    session.commit_edit(at(0, 0), at(0, 1)).unwrap();

    assert_eq!(session.ledger().len(), 1);
    let out = session.recomposite().unwrap();
    assert_eq!(out.get_pixel(at(0, 0)), Some(Rgba([7, 7, 7, 255])));
}

#[test]
fn out_of_range_uv_clamps_to_last_pixel() {
    let mut map = RasterBuffer::new_filled(1, 1, Rgba([200, 0, 250, 255]));
    let out = composite(&map, &EditLedger::new(), &scenario_texture());
    assert_eq!(out.get_pixel(at(0, 0)), Some(Rgba([9, 9, 9, 255])));

    map.put_pixel(at(0, 0), Rgba([255, 255, 255, 0])).unwrap();
    let out = composite(&map, &EditLedger::new(), &scenario_texture());
    assert_eq!(out.get_pixel(at(0, 0)), Some(Rgba([9, 9, 9, 255])));
}

#[test]
fn output_matches_map_dimensions() {
    let map = RasterBuffer::new_filled(5, 3, Rgba([0, 0, 0, 255]));
    let out = composite(&map, &EditLedger::new(), &scenario_texture());
    assert_eq!((out.width(), out.height()), (5, 3));
}

#[test]
fn export_round_trip_preserves_composite() {
    let mut session = loaded_session();
    session.commit_edit(at(1, 0), at(1, 1)).unwrap();
    let edited = session.recomposite().unwrap().clone();

    let baked = session.export().unwrap();
    let bytes = encode_png(&baked).unwrap();
    let reloaded = decode_png(&bytes).unwrap();
    assert_eq!(reloaded, baked);

    let replayed = composite(&reloaded, &EditLedger::new(), &scenario_texture());
    assert_eq!(replayed, edited);
}

#[test]
fn bake_leaves_unedited_pixels_alone() {
    let map = scenario_map();
    let mut ledger = EditLedger::new();
    ledger.put(at(1, 1), Rgba([1, 0, 0, 255]));
    let baked = bake(&map, &ledger);
    assert_eq!(baked.get_pixel(at(0, 0)), map.get_pixel(at(0, 0)));
    assert_eq!(baked.get_pixel(at(1, 1)), Some(Rgba([1, 0, 0, 255])));
}

#[test]
fn superseded_decode_is_discarded() {
    let mut session = Session::new();
    let first = session.begin_load(ImageSlot::Texture);
    let second = session.begin_load(ImageSlot::Texture);

    let newer = RasterBuffer::new_filled(3, 3, CLEAR);
    let older = RasterBuffer::new_filled(8, 8, CLEAR);

    assert_eq!(session.finish_load(second, Ok(newer)).unwrap(), LoadOutcome::Applied);
    assert_eq!(session.finish_load(first, Ok(older)).unwrap(), LoadOutcome::Superseded);
    assert_eq!(session.texture().map(|t| t.width()), Some(3));
}

#[test]
fn composite_requires_both_inputs() {
    let mut session = Session::new();
    assert!(matches!(
        session.recomposite(),
        Err(RemapError::CompositorInputMissing(ImageSlot::Map))
    ));
    session.install(ImageSlot::Map, scenario_map());
    assert!(matches!(
        session.recomposite(),
        Err(RemapError::CompositorInputMissing(ImageSlot::Texture))
    ));
}

#[test]
fn decode_rejects_garbage() {
    assert!(matches!(decode_png(b"not a png"), Err(RemapError::DecodeFailed(_))));
}
