//! Pseudo-3D lane runner scene
//!
//! Everything in the world goes through [`Projection`]. Props are gathered
//! into one list and painted farthest first, so nearer things cover farther
//! ones without a depth buffer.

use glam::Vec2;

use super::RenderOptions;
use super::layout::Layout;
use super::projection::Projection;
use super::surface::{Color, Surface, TextAlign};
use crate::consts::*;
use crate::sim::entity::{
    BARRIER_HEIGHT, CACTUS_HEIGHT, Entity, EntityKind, PICKUP_FLOAT_HEIGHT, ROCK_HEIGHT,
};
use crate::sim::state::{
    Avatar, Character, GamePhase, GameState, Particle, ParticleKind, RunnerAvatar, TimeOfDay,
    Weather,
};

/// Nearest depth the road is drawn from (behind the avatar)
const ROAD_NEAR_Z: f32 = -110.0;
const ROAD_HALF_WIDTH: f32 = LANE_SPACING * LANE_COUNT as f32 / 2.0 + 12.0;
const DASH_PERIOD: f32 = 100.0;
const DASH_LENGTH: f32 = 45.0;
const SCENERY_PERIOD: f32 = 160.0;
const SCENERY_X: f32 = 270.0;

/// Colors for one time of day
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub sky_top: Color,
    pub sky_bottom: Color,
    pub ground: Color,
    pub road: Color,
    pub stripe: Color,
    pub mountains: Color,
    /// 1.0 = full daylight; props are darkened toward black below that
    pub light: f32,
}

pub fn palette(time: TimeOfDay) -> Palette {
    match time {
        TimeOfDay::Day => Palette {
            sky_top: Color::hex(0x3a8ee6),
            sky_bottom: Color::hex(0xbfe3ff),
            ground: Color::hex(0x6cbf48),
            road: Color::hex(0x5a5f6a),
            stripe: Color::hex(0xf2f2f2),
            mountains: Color::hex(0x7a9cc6),
            light: 1.0,
        },
        TimeOfDay::Dusk => Palette {
            sky_top: Color::hex(0x5a3a8a),
            sky_bottom: Color::hex(0xff9a5a),
            ground: Color::hex(0x5a8f3a),
            road: Color::hex(0x4c4a58),
            stripe: Color::hex(0xffe0b0),
            mountains: Color::hex(0x6a4a7a),
            light: 0.8,
        },
        TimeOfDay::Night => Palette {
            sky_top: Color::hex(0x080c24),
            sky_bottom: Color::hex(0x1c2a54),
            ground: Color::hex(0x1e3a24),
            road: Color::hex(0x2a2c36),
            stripe: Color::hex(0xb0b8d0),
            mountains: Color::hex(0x141c3a),
            light: 0.55,
        },
        TimeOfDay::Dawn => Palette {
            sky_top: Color::hex(0x5a8ad0),
            sky_bottom: Color::hex(0xffc8a0),
            ground: Color::hex(0x64aa44),
            road: Color::hex(0x54586a),
            stripe: Color::hex(0xf8f0e0),
            mountains: Color::hex(0x8a8ab8),
            light: 0.85,
        },
    }
}

/// Runner body colors (primary, secondary, accent)
pub fn character_colors(character: Character) -> (Color, Color, Color) {
    match character {
        Character::Fox => (Color::hex(0xf07a2a), Color::hex(0xfff2e0), Color::hex(0x3a2a20)),
        Character::Panda => (Color::hex(0xf4f4f4), Color::hex(0x202020), Color::hex(0x3ac060)),
        Character::Robot => (Color::hex(0x9aa4b4), Color::hex(0x4a5468), Color::hex(0x3ae0ff)),
    }
}

#[inline]
fn shade(color: Color, light: f32) -> Color {
    color.lerp(Color::BLACK.with_alpha(color.a), 1.0 - light)
}

#[inline]
fn hash01(i: u32, salt: u32) -> f32 {
    let h = i.wrapping_mul(2654435761) ^ salt.wrapping_mul(40503);
    let h = h ^ (h >> 13);
    (h.wrapping_mul(1274126177) >> 8) as f32 / (1u32 << 24) as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SceneryKind {
    Tree,
    Lamp,
}

enum Prop<'a> {
    Entity(&'a Entity),
    Particle(&'a Particle),
    Scenery { x: f32, kind: SceneryKind },
    Avatar,
}

struct Item<'a> {
    z: f32,
    prop: Prop<'a>,
}

pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    layout: &Layout,
    options: &RenderOptions,
) {
    let proj = Projection::from_layout(layout);
    let pal = palette(state.time_of_day());

    draw_backdrop(surface, state, layout, &pal);

    surface.save();
    surface.translate(options.shake.x, options.shake.y);

    draw_road(surface, state, &proj, &pal);

    let mut items = build_draw_list(state, options);
    sort_back_to_front(&mut items);
    for item in &items {
        match item.prop {
            Prop::Entity(entity) => draw_entity(surface, state, &proj, &pal, entity),
            Prop::Particle(p) => draw_particle(surface, &proj, p),
            Prop::Scenery { x, kind } => draw_scenery(surface, &proj, &pal, x, item.z, kind),
            Prop::Avatar => {
                if let Avatar::Runner(runner) = &state.avatar {
                    draw_avatar(surface, state, &proj, &pal, runner);
                }
            }
        }
    }

    surface.restore();

    if options.weather {
        draw_weather(surface, state, layout);
    }
    draw_hud(surface, state, layout, options);
}

fn build_draw_list<'a>(state: &'a GameState, options: &RenderOptions) -> Vec<Item<'a>> {
    let mut items: Vec<Item<'a>> = state
        .entities
        .iter()
        .filter(|e| e.active)
        .map(|e| Item {
            z: e.z(),
            prop: Prop::Entity(e),
        })
        .collect();

    items.extend(state.particles.iter().map(|p| Item {
        z: p.pos.y,
        prop: Prop::Particle(p),
    }));
    if options.scenery {
        let offset = state.world_offset.rem_euclid(SCENERY_PERIOD);
        let first = (state.world_offset / SCENERY_PERIOD).floor() as i64;
        let mut k = 0i64;
        loop {
            let z = k as f32 * SCENERY_PERIOD - offset;
            if z > FAR_PLANE {
                break;
            }
            let index = (first + k) as u32;
            for side in [-1.0f32, 1.0] {
                let kind = if hash01(index, side as u32) < 0.7 {
                    SceneryKind::Tree
                } else {
                    SceneryKind::Lamp
                };
                items.push(Item {
                    z,
                    prop: Prop::Scenery {
                        x: side * (SCENERY_X + hash01(index, 7) * 60.0),
                        kind,
                    },
                });
            }
            k += 1;
        }
    }
    // Last so it wins depth ties
    items.push(Item {
        z: 0.0,
        prop: Prop::Avatar,
    });
    items
}

/// Farthest first; equal depths keep insertion order
fn sort_back_to_front(items: &mut [Item<'_>]) {
    items.sort_by(|a, b| b.z.total_cmp(&a.z));
}

fn draw_backdrop<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    layout: &Layout,
    pal: &Palette,
) {
    let (w, h) = layout.size();
    const BANDS: u32 = 8;
    let band_h = layout.horizon_y / BANDS as f32;
    for i in 0..BANDS {
        let color = pal.sky_top.lerp(pal.sky_bottom, i as f32 / (BANDS - 1) as f32);
        surface.fill_rect(0.0, i as f32 * band_h, w, band_h + 1.0, color);
    }
    surface.fill_rect(0.0, layout.horizon_y, w, h - layout.horizon_y, pal.ground);

    let time = state.time_of_day();
    if time == TimeOfDay::Night {
        for i in 0..40u32 {
            let x = hash01(i, 1) * w;
            let y = hash01(i, 2) * layout.horizon_y * 0.9;
            let twinkle = 0.5 + 0.5 * (state.time_ticks as f32 * 0.05 + i as f32).sin();
            surface.fill_circle(x, y, 1.2, Color::WHITE.with_alpha(twinkle));
        }
        surface.fill_circle(w * 0.78, layout.horizon_y * 0.3, 18.0, Color::hex(0xf0f0d8));
    } else {
        let sun_y = match time {
            TimeOfDay::Day => 0.25,
            _ => 0.75,
        } * layout.horizon_y;
        surface.fill_circle(w * 0.2, sun_y, 34.0, Color::hex(0xfff0a0).with_alpha(0.35));
        surface.fill_circle(w * 0.2, sun_y, 22.0, Color::hex(0xfff6c8));
    }

    // Mountain silhouette with slow parallax
    let shift = (state.world_offset * 0.02).rem_euclid(w.max(1.0));
    let mut points = vec![Vec2::new(0.0, layout.horizon_y)];
    let peaks = 9;
    for i in 0..=peaks * 2 {
        let t = i as f32 / (peaks * 2) as f32;
        let x = (t * w * 2.0 - shift).max(-w);
        let height = if i % 2 == 0 {
            0.05
        } else {
            0.12 + hash01(i as u32, 3) * 0.14
        };
        points.push(Vec2::new(x.min(w), layout.horizon_y - height * layout.horizon_y * 1.6));
    }
    points.push(Vec2::new(w, layout.horizon_y));
    surface.fill_polygon(&points, pal.mountains);
}

fn draw_road<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    proj: &Projection,
    pal: &Palette,
) {
    let corners = [
        proj.project(-ROAD_HALF_WIDTH, 0.0, ROAD_NEAR_Z),
        proj.project(ROAD_HALF_WIDTH, 0.0, ROAD_NEAR_Z),
        proj.project(ROAD_HALF_WIDTH, 0.0, FAR_PLANE),
        proj.project(-ROAD_HALF_WIDTH, 0.0, FAR_PLANE),
    ];
    if let [Some(a), Some(b), Some(c), Some(d)] = corners {
        surface.fill_polygon(&[a.pos, b.pos, c.pos, d.pos], pal.road);
    }

    // Shoulders
    for side in [-1.0f32, 1.0] {
        let x = side * ROAD_HALF_WIDTH;
        if let (Some(a), Some(b)) = (
            proj.project(x, 0.0, ROAD_NEAR_Z),
            proj.project(x, 0.0, FAR_PLANE),
        ) {
            surface.stroke_line(a.pos, b.pos, 4.0 * a.scale, pal.stripe);
        }
    }

    // Dashed lane dividers scroll with the world
    let scroll = state.world_offset.rem_euclid(DASH_PERIOD);
    for divider in 1..LANE_COUNT {
        let x = crate::lane_x(divider) - LANE_SPACING / 2.0;
        let mut z = ROAD_NEAR_Z - scroll;
        while z < FAR_PLANE {
            let z0 = z.max(ROAD_NEAR_Z);
            let z1 = (z + DASH_LENGTH).min(FAR_PLANE);
            if z1 > z0 {
                if let (Some(a), Some(b)) = (proj.project(x, 0.0, z0), proj.project(x, 0.0, z1)) {
                    surface.stroke_line(a.pos, b.pos, 3.0 * a.scale.max(0.2), pal.stripe);
                }
            }
            z += DASH_PERIOD;
        }
    }
}

fn draw_scenery<S: Surface + ?Sized>(
    surface: &mut S,
    proj: &Projection,
    pal: &Palette,
    x: f32,
    z: f32,
    kind: SceneryKind,
) {
    let Some(base) = proj.project(x, 0.0, z) else {
        return;
    };
    let unit = proj.unit * base.scale;
    match kind {
        SceneryKind::Tree => {
            let trunk = shade(Color::hex(0x7a5230), pal.light);
            let leaves = shade(Color::hex(0x2f8a3a), pal.light);
            surface.fill_rect(
                base.pos.x - 5.0 * unit,
                base.pos.y - 40.0 * unit,
                10.0 * unit,
                40.0 * unit,
                trunk,
            );
            surface.fill_polygon(
                &[
                    Vec2::new(base.pos.x - 32.0 * unit, base.pos.y - 35.0 * unit),
                    Vec2::new(base.pos.x + 32.0 * unit, base.pos.y - 35.0 * unit),
                    Vec2::new(base.pos.x, base.pos.y - 120.0 * unit),
                ],
                leaves,
            );
        }
        SceneryKind::Lamp => {
            let pole = shade(Color::hex(0x3a3a44), pal.light);
            surface.fill_rect(
                base.pos.x - 2.5 * unit,
                base.pos.y - 110.0 * unit,
                5.0 * unit,
                110.0 * unit,
                pole,
            );
            let glow = if pal.light < 0.9 { 0.9 } else { 0.4 };
            surface.fill_circle(
                base.pos.x,
                base.pos.y - 112.0 * unit,
                8.0 * unit,
                Color::hex(0xfff0b0).with_alpha(glow),
            );
        }
    }
}

fn draw_entity<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    proj: &Projection,
    pal: &Palette,
    entity: &Entity,
) {
    let (x, z) = (entity.pos.x, entity.z());
    let Some(base) = proj.project(x, 0.0, z) else {
        return;
    };
    let unit = proj.unit * base.scale;
    let p = base.pos;
    // Fade in near the far plane
    let fade = ((FAR_PLANE - z) / 200.0).clamp(0.0, 1.0);

    match entity.kind {
        EntityKind::Rock { .. } => {
            let color = shade(Color::hex(0x8a8a90), pal.light).with_alpha(fade);
            surface.fill_polygon(
                &[
                    Vec2::new(p.x - 30.0 * unit, p.y),
                    Vec2::new(p.x - 24.0 * unit, p.y - ROCK_HEIGHT * 0.7 * unit),
                    Vec2::new(p.x - 6.0 * unit, p.y - ROCK_HEIGHT * unit),
                    Vec2::new(p.x + 18.0 * unit, p.y - ROCK_HEIGHT * 0.85 * unit),
                    Vec2::new(p.x + 30.0 * unit, p.y),
                ],
                color,
            );
        }
        EntityKind::Cactus { .. } => {
            let color = shade(Color::hex(0x3aa04a), pal.light).with_alpha(fade);
            let h = CACTUS_HEIGHT * unit;
            surface.fill_rect(p.x - 7.0 * unit, p.y - h, 14.0 * unit, h, color);
            surface.fill_rect(p.x - 20.0 * unit, p.y - h * 0.65, 6.0 * unit, h * 0.35, color);
            surface.fill_rect(p.x - 20.0 * unit, p.y - h * 0.35, 14.0 * unit, 5.0 * unit, color);
            surface.fill_rect(p.x + 14.0 * unit, p.y - h * 0.8, 6.0 * unit, h * 0.35, color);
            surface.fill_rect(p.x + 7.0 * unit, p.y - h * 0.5, 13.0 * unit, 5.0 * unit, color);
        }
        EntityKind::Barrier => {
            let h = BARRIER_HEIGHT * unit;
            let half = LANE_SPACING * 0.42 * unit;
            let red = shade(Color::hex(0xd83a3a), pal.light).with_alpha(fade);
            let white = shade(Color::WHITE, pal.light).with_alpha(fade);
            surface.fill_rect(p.x - half, p.y - h, half * 2.0, h, red);
            let stripes = 5;
            for i in 0..stripes {
                if i % 2 == 1 {
                    let y = p.y - h + h * i as f32 / stripes as f32;
                    surface.fill_rect(p.x - half, y, half * 2.0, h / stripes as f32, white);
                }
            }
        }
        EntityKind::Star => {
            let bob = (state.time_ticks as f32 * 0.1 + x * 0.01).sin() * 5.0;
            if let Some(c) = proj.project_above(x, PICKUP_FLOAT_HEIGHT + bob, z) {
                let r = 14.0 * proj.unit * c.scale;
                let color = Color::hex(0xffd84a).with_alpha(fade);
                surface.fill_circle(c.pos.x, c.pos.y, r * 1.4, color.with_alpha(0.25 * fade));
                surface.fill_polygon(
                    &star_points(c.pos, r, r * 0.45, state.time_ticks as f32 * 0.04),
                    color,
                );
            }
        }
        EntityKind::ShieldPickup | EntityKind::MagnetPickup | EntityKind::BoostPickup => {
            let (color, label) = match entity.kind {
                EntityKind::ShieldPickup => (Color::hex(0x5ac8ff), "S"),
                EntityKind::MagnetPickup => (Color::hex(0xff5a7a), "M"),
                _ => (Color::hex(0xffa030), "B"),
            };
            let bob = (state.time_ticks as f32 * 0.08).sin() * 6.0;
            if let Some(c) = proj.project_above(x, PICKUP_FLOAT_HEIGHT + 10.0 + bob, z) {
                let r = 18.0 * proj.unit * c.scale;
                surface.fill_circle(c.pos.x, c.pos.y, r * 1.5, color.with_alpha(0.3 * fade));
                surface.fill_circle(c.pos.x, c.pos.y, r, color.with_alpha(fade));
                surface.text(
                    label,
                    c.pos.x,
                    c.pos.y + r * 0.4,
                    r * 1.2,
                    TextAlign::Center,
                    Color::WHITE,
                );
            }
        }
        EntityKind::PipeSegment { .. } => {}
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

fn draw_particle<S: Surface + ?Sized>(surface: &mut S, proj: &Projection, p: &Particle) {
    let Some(c) = proj.project_above(p.pos.x, p.height, p.pos.y) else {
        return;
    };
    let size = p.size * proj.unit * c.scale;
    let color = Color::hex(p.color).with_alpha(p.life);
    match p.kind {
        ParticleKind::Shockwave => {
            surface.stroke_circle(c.pos.x, c.pos.y, size * 4.0, 3.0 * c.scale, color)
        }
        ParticleKind::Glow => {
            surface.fill_circle(c.pos.x, c.pos.y, size * 2.0, color.with_alpha(p.life * 0.5))
        }
        _ => surface.fill_circle(c.pos.x, c.pos.y, size, color),
    }
}

fn draw_avatar<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    proj: &Projection,
    pal: &Palette,
    runner: &RunnerAvatar,
) {
    let (primary, secondary, accent) = character_colors(state.options.character);
    let (primary, secondary) = (shade(primary, pal.light), shade(secondary, pal.light));

    // Shadow stays on the road and shrinks with height
    if let Some(ground) = proj.project(runner.x, 0.0, 0.0) {
        let shrink = (1.0 - runner.height / 200.0).clamp(0.3, 1.0);
        surface.fill_ellipse(
            ground.pos.x,
            ground.pos.y,
            26.0 * proj.unit * shrink,
            8.0 * proj.unit * shrink,
            0.0,
            Color::BLACK.with_alpha(0.3),
        );
    }

    let Some(feet) = proj.project_above(runner.x, runner.height, 0.0) else {
        return;
    };
    let u = proj.unit;

    surface.save();
    surface.translate(feet.pos.x, feet.pos.y);
    surface.rotate(runner.tilt);

    // Legs swing with the run cycle; tucked while airborne
    let swing = if runner.jumping { 0.0 } else { runner.run_phase.sin() * 8.0 * u };
    surface.fill_rect(
        -10.0 * u,
        -22.0 * u + swing.max(0.0),
        7.0 * u,
        22.0 * u - swing.max(0.0),
        secondary,
    );
    surface.fill_rect(
        3.0 * u,
        -22.0 * u - swing.min(0.0),
        7.0 * u,
        22.0 * u + swing.min(0.0),
        secondary,
    );

    // Body and head
    surface.fill_ellipse(0.0, -40.0 * u, 16.0 * u, 20.0 * u, 0.0, primary);
    surface.fill_circle(0.0, -68.0 * u, 14.0 * u, primary);

    match state.options.character {
        Character::Fox => {
            for side in [-1.0f32, 1.0] {
                surface.fill_polygon(
                    &[
                        Vec2::new(side * 4.0 * u, -78.0 * u),
                        Vec2::new(side * 14.0 * u, -78.0 * u),
                        Vec2::new(side * 11.0 * u, -94.0 * u),
                    ],
                    primary,
                );
            }
            surface.fill_ellipse(0.0, -36.0 * u, 8.0 * u, 12.0 * u, 0.0, secondary);
        }
        Character::Panda => {
            for side in [-1.0f32, 1.0] {
                surface.fill_circle(side * 11.0 * u, -80.0 * u, 5.0 * u, secondary);
            }
        }
        Character::Robot => {
            surface.stroke_line(
                Vec2::new(0.0, -82.0 * u),
                Vec2::new(0.0, -94.0 * u),
                2.0 * u,
                secondary,
            );
            surface.fill_circle(0.0, -96.0 * u, 3.5 * u, accent);
        }
    }
    // Seen from behind: just a hint of the face colour at the sides
    surface.fill_circle(-9.0 * u, -66.0 * u, 3.0 * u, accent.with_alpha(0.6));
    surface.fill_circle(9.0 * u, -66.0 * u, 3.0 * u, accent.with_alpha(0.6));

    if state.effects.shield {
        let pulse = 1.0 + (state.time_ticks as f32 * 0.2).sin() * 0.05;
        surface.fill_circle(
            0.0,
            -48.0 * u,
            44.0 * u * pulse,
            Color::hex(0x5ac8ff).with_alpha(0.18),
        );
        surface.stroke_circle(
            0.0,
            -48.0 * u,
            44.0 * u * pulse,
            2.0 * u,
            Color::hex(0x5ac8ff).with_alpha(0.7),
        );
    }
    if state.effects.boost_active() {
        let flicker = 0.6 + 0.4 * (state.time_ticks as f32 * 0.7).sin().abs();
        surface.fill_polygon(
            &[
                Vec2::new(-10.0 * u, -30.0 * u),
                Vec2::new(10.0 * u, -30.0 * u),
                Vec2::new(0.0, 10.0 * u * flicker),
            ],
            Color::hex(0xffa030).with_alpha(0.8),
        );
    }
    if state.effects.magnet_active() {
        surface.stroke_circle(
            0.0,
            -48.0 * u,
            60.0 * u,
            1.5 * u,
            Color::hex(0xff5a7a).with_alpha(0.4),
        );
    }

    surface.restore();
}

fn draw_weather<S: Surface + ?Sized>(surface: &mut S, state: &GameState, layout: &Layout) {
    let (w, h) = layout.size();
    let t = state.time_ticks as f32;
    match state.weather() {
        Weather::Clear => {}
        Weather::Rain => {
            let color = Color::hex(0xaec8f0).with_alpha(0.5);
            for i in 0..70u32 {
                let x = (hash01(i, 11) * w + t * 2.0).rem_euclid(w);
                let y = (hash01(i, 12) * h + t * 14.0 * (0.8 + hash01(i, 13) * 0.4)).rem_euclid(h);
                surface.stroke_line(Vec2::new(x, y), Vec2::new(x - 3.0, y + 14.0), 1.2, color);
            }
        }
        Weather::Snow => {
            let color = Color::WHITE.with_alpha(0.8);
            for i in 0..60u32 {
                let sway = (t * 0.03 + i as f32).sin() * 12.0;
                let x = (hash01(i, 21) * w + sway).rem_euclid(w);
                let y = (hash01(i, 22) * h + t * 1.5 * (0.6 + hash01(i, 23))).rem_euclid(h);
                surface.fill_circle(x, y, 1.5 + hash01(i, 24) * 2.0, color);
            }
        }
    }
}

fn draw_hud<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    layout: &Layout,
    options: &RenderOptions,
) {
    let (w, h) = layout.size();
    let size = (h * 0.05).clamp(16.0, 40.0);
    let pad = size * 0.6;

    surface.text(&state.score.to_string(), pad, pad + size, size, TextAlign::Left, Color::WHITE);
    surface.text(
        &format!("Best {}", options.best.max(state.score)),
        w - pad,
        pad + size * 0.8,
        size * 0.6,
        TextAlign::Right,
        Color::WHITE.with_alpha(0.85),
    );
    if state.combo > 1 {
        surface.text(
            &format!("x{:.2}", state.combo_multiplier()),
            pad,
            pad + size * 2.0,
            size * 0.7,
            TextAlign::Left,
            Color::hex(0xffd84a),
        );
    }

    // Effect timers as shrinking bars
    let timers = [
        (state.effects.shield, state.effects.shield_ticks, state.tuning.shield_ticks, 0x5ac8ff),
        (
            state.effects.magnet_active(),
            state.effects.magnet_ticks,
            state.tuning.magnet_ticks,
            0xff5a7a,
        ),
        (
            state.effects.boost_active(),
            state.effects.boost_ticks,
            state.tuning.boost_ticks,
            0xffa030,
        ),
    ];
    let bar_w = size * 3.0;
    let mut y = pad + size * 2.6;
    for (active, left, total, color) in timers {
        if !active || total == 0 {
            continue;
        }
        let frac = left as f32 / total as f32;
        surface.fill_rect(pad, y, bar_w, size * 0.25, Color::BLACK.with_alpha(0.35));
        surface.fill_rect(pad, y, bar_w * frac, size * 0.25, Color::hex(color));
        y += size * 0.45;
    }

    match state.phase {
        GamePhase::Start => {
            surface.fill_rect(0.0, h * 0.42, w, size * 2.6, Color::BLACK.with_alpha(0.35));
            surface.text(
                "Tap or press Space to run",
                w / 2.0,
                h * 0.42 + size * 1.1,
                size * 0.8,
                TextAlign::Center,
                Color::WHITE,
            );
            surface.text(
                "Swipe or arrows to change lanes",
                w / 2.0,
                h * 0.42 + size * 2.0,
                size * 0.55,
                TextAlign::Center,
                Color::WHITE,
            );
        }
        GamePhase::GameOver => {
            surface.fill_rect(
                w * 0.15,
                h * 0.3,
                w * 0.7,
                size * 5.0,
                Color::BLACK.with_alpha(0.55),
            );
            surface.text(
                "Game Over",
                w / 2.0,
                h * 0.3 + size * 1.3,
                size,
                TextAlign::Center,
                Color::WHITE,
            );
            surface.text(
                &format!("Score {}", state.score),
                w / 2.0,
                h * 0.3 + size * 2.5,
                size * 0.7,
                TextAlign::Center,
                Color::WHITE,
            );
            surface.text(
                &format!("Stars {}  Best combo {}", state.stats.pickups, state.stats.best_combo),
                w / 2.0,
                h * 0.3 + size * 3.4,
                size * 0.5,
                TextAlign::Center,
                Color::WHITE,
            );
            surface.text(
                "Enter to retry",
                w / 2.0,
                h * 0.3 + size * 4.4,
                size * 0.5,
                TextAlign::Center,
                Color::hex(0xffd84a),
            );
        }
        GamePhase::Playing => {}
    }
}
