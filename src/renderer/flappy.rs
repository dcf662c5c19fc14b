//! Side-scrolling flappy scene

use glam::Vec2;

use super::layout::Layout;
use super::surface::{Color, Surface, TextAlign};
use super::RenderOptions;
use crate::consts::*;
use crate::sim::collision::FLAPPY_STAR_RADIUS;
use crate::sim::entity::EntityKind;
use crate::sim::state::{Avatar, FlappyAvatar, GamePhase, GameState, ParticleKind};

const SKY_TOP: Color = Color::hex(0x4ec0ca);
const SKY_BOTTOM: Color = Color::hex(0xa8e6e0);
const CLOUD: Color = Color::hex(0xffffff);
const GROUND: Color = Color::hex(0xded895);
const GROUND_STRIPE: Color = Color::hex(0xc8b26a);
const GRASS: Color = Color::hex(0x73bf2e);
const PIPE: Color = Color::hex(0x5ec83a);
const PIPE_SHADE: Color = Color::hex(0x3f8f28);
const PIPE_CAP: Color = Color::hex(0x70d848);
const BIRD_BODY: Color = Color::hex(0xf8d030);
const BIRD_WING: Color = Color::hex(0xf0a020);
const BIRD_BEAK: Color = Color::hex(0xf06020);
const STAR: Color = Color::hex(0xffd84a);
const LETTERBOX: Color = Color::hex(0x1f3a3d);

const CAP_HEIGHT: f32 = 22.0;
const CAP_OVERHANG: f32 = 5.0;

pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    layout: &Layout,
    options: &RenderOptions,
) {
    let (w, h) = layout.size();
    surface.fill_rect(0.0, 0.0, w, h, LETTERBOX);

    surface.save();
    surface.translate(options.shake.x, options.shake.y);

    draw_sky(surface, state, layout, options);

    for entity in state.entities.iter().filter(|e| e.active) {
        match entity.kind {
            EntityKind::PipeSegment {
                gap_center,
                gap_size,
                ..
            } => draw_pipe(surface, layout, entity.pos.x, gap_center, gap_size),
            EntityKind::Star => draw_star(surface, layout, entity.pos, state.time_ticks),
            _ => {}
        }
    }

    draw_ground(surface, state, layout);
    draw_particles(surface, state, layout);
    if let Avatar::Flappy(bird) = &state.avatar {
        draw_bird(surface, layout, bird);
    }

    surface.restore();
    // Over the world so offscreen pipes and clouds never show in the bars
    draw_letterbox(surface, layout);
    draw_overlay(surface, state, layout);
}

fn draw_letterbox<S: Surface + ?Sized>(surface: &mut S, layout: &Layout) {
    let (w, h) = layout.size();
    let origin = layout.world_origin;
    let right = origin.x + layout.px(FLAPPY_WORLD_WIDTH);
    let bottom = origin.y + layout.px(FLAPPY_WORLD_HEIGHT);
    if origin.x > 0.0 {
        surface.fill_rect(0.0, 0.0, origin.x, h, LETTERBOX);
        surface.fill_rect(right, 0.0, w - right, h, LETTERBOX);
    }
    if origin.y > 0.0 {
        surface.fill_rect(0.0, 0.0, w, origin.y, LETTERBOX);
        surface.fill_rect(0.0, bottom, w, h - bottom, LETTERBOX);
    }
}

fn draw_sky<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    layout: &Layout,
    options: &RenderOptions,
) {
    // Banded gradient
    const BANDS: u32 = 6;
    let band_h = FLAPPY_GROUND_Y / BANDS as f32;
    for i in 0..BANDS {
        let color = SKY_TOP.lerp(SKY_BOTTOM, i as f32 / (BANDS - 1) as f32);
        let top = layout.world_to_px(0.0, i as f32 * band_h);
        surface.fill_rect(
            top.x,
            top.y,
            layout.px(FLAPPY_WORLD_WIDTH),
            layout.px(band_h) + 1.0,
            color,
        );
    }

    if !options.scenery {
        return;
    }
    // Parallax clouds
    let drift = state.world_offset * 0.2 + state.time_ticks as f32 * 0.05;
    let span = FLAPPY_WORLD_WIDTH + 160.0;
    for i in 0..4 {
        let base = i as f32 * 140.0;
        let x = (base - drift).rem_euclid(span) - 80.0;
        let y = 70.0 + (i % 3) as f32 * 55.0;
        for (dx, dy, r) in [(0.0, 0.0, 22.0), (24.0, 6.0, 18.0), (-22.0, 8.0, 16.0)] {
            let c = layout.world_to_px(x + dx, y + dy);
            surface.fill_circle(c.x, c.y, layout.px(r), CLOUD.with_alpha(0.85));
        }
    }
}

fn draw_pipe<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &Layout,
    x: f32,
    gap_center: f32,
    gap_size: f32,
) {
    let top_end = gap_center - gap_size / 2.0;
    let bottom_start = gap_center + gap_size / 2.0;

    for (y0, y1, cap_y) in [
        (0.0, top_end, top_end - CAP_HEIGHT),
        (bottom_start, FLAPPY_GROUND_Y, bottom_start),
    ] {
        if y1 <= y0 {
            continue;
        }
        let p = layout.world_to_px(x, y0);
        surface.fill_rect(p.x, p.y, layout.px(PIPE_WIDTH), layout.px(y1 - y0), PIPE);
        // Shaded right edge
        let shade = layout.world_to_px(x + PIPE_WIDTH * 0.75, y0);
        surface.fill_rect(
            shade.x,
            shade.y,
            layout.px(PIPE_WIDTH * 0.25),
            layout.px(y1 - y0),
            PIPE_SHADE,
        );

        let cap = layout.world_to_px(x - CAP_OVERHANG, cap_y);
        let cap_w = layout.px(PIPE_WIDTH + CAP_OVERHANG * 2.0);
        surface.fill_rect(cap.x, cap.y, cap_w, layout.px(CAP_HEIGHT), PIPE_CAP);
        surface.stroke_line(
            cap,
            cap + Vec2::new(cap_w, 0.0),
            layout.px(2.0),
            PIPE_SHADE,
        );
    }
}

fn star_points(center: Vec2, outer: f32, inner: f32, spin: f32) -> Vec<Vec2> {
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = spin + i as f32 * std::f32::consts::PI / 5.0 - std::f32::consts::FRAC_PI_2;
            center + Vec2::new(a.cos(), a.sin()) * r
        })
        .collect()
}

fn draw_star<S: Surface + ?Sized>(surface: &mut S, layout: &Layout, pos: Vec2, time: u64) {
    let c = layout.world_to_px(pos.x, pos.y);
    let pulse = 1.0 + (time as f32 * 0.15).sin() * 0.1;
    let r = layout.px(FLAPPY_STAR_RADIUS) * pulse;
    surface.fill_circle(c.x, c.y, r * 1.4, STAR.with_alpha(0.25));
    surface.fill_polygon(&star_points(c, r, r * 0.45, time as f32 * 0.03), STAR);
}

fn draw_ground<S: Surface + ?Sized>(surface: &mut S, state: &GameState, layout: &Layout) {
    let top = layout.world_to_px(0.0, FLAPPY_GROUND_Y);
    let depth = FLAPPY_WORLD_HEIGHT - FLAPPY_GROUND_Y;
    surface.fill_rect(
        top.x,
        top.y,
        layout.px(FLAPPY_WORLD_WIDTH),
        layout.px(depth),
        GROUND,
    );
    surface.fill_rect(top.x, top.y, layout.px(FLAPPY_WORLD_WIDTH), layout.px(8.0), GRASS);

    // Scrolling stripes; the ground moves on the start screen too
    let scroll = if state.phase == GamePhase::Start {
        state.time_ticks as f32 * state.tuning.base_speed
    } else {
        state.world_offset
    };
    let spacing = 24.0;
    let shift = scroll.rem_euclid(spacing);
    let mut x = -shift;
    while x < FLAPPY_WORLD_WIDTH {
        let a = layout.world_to_px(x.max(0.0), FLAPPY_GROUND_Y + 10.0);
        let b = layout.world_to_px((x + 12.0).min(FLAPPY_WORLD_WIDTH), FLAPPY_GROUND_Y + 16.0);
        if b.x > a.x {
            surface.fill_rect(a.x, a.y, b.x - a.x, b.y - a.y, GROUND_STRIPE);
        }
        x += spacing;
    }
}

fn draw_particles<S: Surface + ?Sized>(surface: &mut S, state: &GameState, layout: &Layout) {
    for p in &state.particles {
        let c = layout.world_to_px(p.pos.x, p.pos.y);
        let color = Color::hex(p.color).with_alpha(p.life);
        match p.kind {
            ParticleKind::Shockwave => {
                surface.stroke_circle(c.x, c.y, layout.px(p.size), layout.px(2.0), color)
            }
            _ => surface.fill_circle(c.x, c.y, layout.px(p.size * p.life.max(0.3)), color),
        }
    }
}

fn draw_bird<S: Surface + ?Sized>(surface: &mut S, layout: &Layout, bird: &FlappyAvatar) {
    let c = layout.world_to_px(BIRD_X, bird.y);
    let r = layout.px(BIRD_RADIUS);

    surface.save();
    surface.translate(c.x, c.y);
    surface.rotate(bird.tilt);

    surface.fill_ellipse(0.0, 0.0, r * 1.1, r, 0.0, BIRD_BODY);
    // Belly
    surface.fill_ellipse(r * 0.1, r * 0.35, r * 0.7, r * 0.45, 0.0, Color::hex(0xfff0a0));
    // Wing flaps with the phase
    let flap = bird.wing_phase.sin() * 0.6;
    surface.fill_ellipse(-r * 0.3, r * 0.1, r * 0.6, r * 0.35, flap, BIRD_WING);
    // Eye
    surface.fill_circle(r * 0.45, -r * 0.35, r * 0.32, Color::WHITE);
    surface.fill_circle(r * 0.55, -r * 0.35, r * 0.14, Color::BLACK);
    // Beak
    surface.fill_polygon(
        &[
            Vec2::new(r * 0.8, -r * 0.05),
            Vec2::new(r * 1.5, r * 0.15),
            Vec2::new(r * 0.8, r * 0.4),
        ],
        BIRD_BEAK,
    );

    surface.restore();
}

fn draw_overlay<S: Surface + ?Sized>(surface: &mut S, state: &GameState, layout: &Layout) {
    let top = layout.world_to_px(FLAPPY_WORLD_WIDTH / 2.0, 60.0);
    let shadow = Color::BLACK.with_alpha(0.4);
    let score = state.score.to_string();
    let size = layout.px(44.0);
    surface.text(&score, top.x + 2.0, top.y + 2.0, size, TextAlign::Center, shadow);
    surface.text(&score, top.x, top.y, size, TextAlign::Center, Color::WHITE);

    let mid_y = FLAPPY_WORLD_HEIGHT * 0.32;
    match state.phase {
        GamePhase::Start => label(surface, layout, "Tap to fly", mid_y, 28.0),
        GamePhase::GameOver => {
            let panel = layout.world_to_px(60.0, FLAPPY_WORLD_HEIGHT * 0.25);
            surface.fill_rect(
                panel.x,
                panel.y,
                layout.px(FLAPPY_WORLD_WIDTH - 120.0),
                layout.px(130.0),
                Color::BLACK.with_alpha(0.45),
            );
            label(surface, layout, "Game Over", mid_y, 32.0);
            let pipes = format!("Pipes {}", state.stats.pipes_passed);
            label(surface, layout, &pipes, mid_y + 40.0, 20.0);
            label(surface, layout, "Enter to retry", mid_y + 75.0, 16.0);
        }
        GamePhase::Playing => {}
    }
}

/// White text centred on the world's vertical axis
fn label<S: Surface + ?Sized>(surface: &mut S, layout: &Layout, text: &str, y: f32, size: f32) {
    let at = layout.world_to_px(FLAPPY_WORLD_WIDTH / 2.0, y);
    surface.text(text, at.x, at.y, layout.px(size), TextAlign::Center, Color::WHITE);
}
