mod common;

use common::*;
use pad_render::{
    AnimatedRenderer, BACKDROP_RGBA, Entry, FrameFormat, Renderer, StillRenderer, Surface,
    SurfaceConfig,
};

fn surface(size: u32) -> Surface {
    Surface::new(SurfaceConfig {
        size,
        antialias: true,
    })
    .unwrap()
}

fn entry(id: u32) -> Entry {
    Entry {
        id,
        is_cards: false,
        width: 4,
        height: 4,
    }
}

fn frame_data(r: &mut dyn Renderer, t: f64) -> Vec<u8> {
    r.draw(t).unwrap();
    r.surface().data().to_vec()
}

#[test]
fn still_renderer_is_time_invariant() {
    let buf = tex_buf(&[solid(4, 4, [255, 0, 0, 255])]);
    let mut r = StillRenderer::new(surface(16), entry(7), &buf).unwrap();

    r.draw(0.0).unwrap();
    let first = r.finalize(FrameFormat::Png).unwrap();
    r.draw(123.0).unwrap();
    let second = r.finalize(FrameFormat::Png).unwrap();
    assert_eq!(first, second);
}

#[test]
fn background_flag_controls_backdrop_only() {
    let buf = tex_buf(&[solid(4, 4, [255, 0, 0, 255])]);

    let mut with_bg = StillRenderer::new(surface(16), entry(7), &buf).unwrap();
    with_bg.set_background(true);
    with_bg.draw(0.0).unwrap();

    let mut without_bg = StillRenderer::new(surface(16), entry(7), &buf).unwrap();
    without_bg.set_background(false);
    without_bg.draw(0.0).unwrap();

    // Backdrop area: opaque vs. fully transparent.
    assert_eq!(with_bg.surface().pixel(0, 0), BACKDROP_RGBA);
    assert_eq!(without_bg.surface().pixel(0, 0), [0, 0, 0, 0]);

    // Foreground (the opaque cel, centered) is identical in both runs.
    assert_eq!(with_bg.surface().pixel(8, 8), [255, 0, 0, 255]);
    assert_eq!(without_bg.surface().pixel(8, 8), [255, 0, 0, 255]);
}

#[test]
fn animated_draw_clamps_time() {
    let atlas = tex_buf(&[solid(4, 4, [0, 255, 0, 255])]);
    let buf = bbin_buf(
        &atlas,
        &[BbinPart {
            name: "body",
            cel: 0,
            region: [0, 0, 4, 4],
            channels: vec![(
                CH_POSITION,
                vec![key_vec2(0.0, -3.0, 0.0), key_vec2(1.0, 3.0, 0.0)],
            )],
        }],
    );

    let mut r = AnimatedRenderer::new(surface(16), &buf).unwrap();
    assert_eq!(r.time_length(), 1.0);

    let at_start = frame_data(&mut r, 0.0);
    assert_eq!(frame_data(&mut r, -5.0), at_start);

    let at_end = frame_data(&mut r, 1.0);
    assert_eq!(frame_data(&mut r, 99.0), at_end);
    assert_ne!(at_start, at_end);
}

#[test]
fn single_keyframe_channels_are_constant() {
    let atlas = tex_buf(&[solid(4, 4, [0, 255, 0, 255])]);
    let buf = bbin_buf(
        &atlas,
        &[BbinPart {
            name: "body",
            cel: 0,
            region: [0, 0, 4, 4],
            channels: vec![(CH_POSITION, vec![key_vec2(2.0, 3.0, 1.0)])],
        }],
    );

    let mut r = AnimatedRenderer::new(surface(16), &buf).unwrap();
    assert_eq!(r.time_length(), 2.0);

    let a = frame_data(&mut r, 0.0);
    let b = frame_data(&mut r, 1.0);
    let c = frame_data(&mut r, 2.0);
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn later_parts_composite_on_top() {
    let atlas = tex_buf(&[
        solid(4, 4, [255, 0, 0, 255]),
        solid(4, 4, [0, 0, 255, 255]),
    ]);
    let part = |cel: u16| BbinPart {
        name: "layer",
        cel,
        region: [0, 0, 4, 4],
        channels: vec![],
    };
    let buf = bbin_buf(&atlas, &[part(0), part(1)]);

    let mut r = AnimatedRenderer::new(surface(16), &buf).unwrap();
    r.draw(0.0).unwrap();
    assert_eq!(r.surface().pixel(8, 8), [0, 0, 255, 255]);
}

#[test]
fn zero_opacity_part_is_skipped_but_returns_later() {
    let atlas = tex_buf(&[solid(4, 4, [0, 0, 255, 255])]);
    let buf = bbin_buf(
        &atlas,
        &[BbinPart {
            name: "body",
            cel: 0,
            region: [0, 0, 4, 4],
            channels: vec![(
                CH_OPACITY,
                vec![key_f32(0.0, 0.0), key_f32(1.0, 1.0)],
            )],
        }],
    );

    let mut r = AnimatedRenderer::new(surface(16), &buf).unwrap();
    r.set_background(false);

    r.draw(0.0).unwrap();
    assert_eq!(r.surface().pixel(8, 8), [0, 0, 0, 0]);

    r.draw(1.0).unwrap();
    assert_eq!(r.surface().pixel(8, 8), [0, 0, 255, 255]);
}

#[test]
fn tint_channel_multiplies_part_color() {
    let atlas = tex_buf(&[solid(4, 4, [255, 255, 255, 255])]);
    let buf = bbin_buf(
        &atlas,
        &[BbinPart {
            name: "body",
            cel: 0,
            region: [0, 0, 4, 4],
            channels: vec![(CH_TINT, vec![key_tint(0.0, [255, 0, 0, 255])])],
        }],
    );

    let mut r = AnimatedRenderer::new(surface(16), &buf).unwrap();
    r.draw(0.0).unwrap();
    assert_eq!(r.surface().pixel(8, 8), [255, 0, 0, 255]);
}

#[test]
fn empty_document_renders_blank_frames() {
    let atlas = tex_buf(&[]);
    let buf = bbin_buf(&atlas, &[]);

    let mut r = AnimatedRenderer::new(surface(8), &buf).unwrap();
    assert_eq!(r.time_length(), 0.0);

    r.set_background(false);
    r.draw(0.0).unwrap();
    assert!(r.surface().data().iter().all(|&b| b == 0));

    r.set_background(true);
    r.draw(0.0).unwrap();
    assert_eq!(r.surface().pixel(4, 4), BACKDROP_RGBA);
}
