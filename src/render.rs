//! Blit de un `Frame` al framebuffer: cielo, suelo, columnas de pared de 8 píxeles
//! con textura procedural y dos niveles de sombra, hojas de puerta y sprites recortados.

use crate::archetype::Archetype;
use crate::depth::COLUMN_WIDTH;
use crate::enemy::EnemyPose;
use crate::fixed::{HORIZON, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::map;
use crate::particle::ParticleKind;
use crate::pickup::PickupKind;
use crate::player::{PlayerStats, MAX_HEALTH};
use crate::projectile::{ProjectileKind, ProjectileState};
use crate::raycaster::{ColumnTrace, Shade};
use crate::sprite::{SpriteClass, SpriteDraw, SpriteKind};
use crate::world::Frame;

pub const WIDTH: usize = SCREEN_WIDTH as usize;
pub const HEIGHT: usize = SCREEN_HEIGHT as usize;

const SKY: u32 = 0x202838;
const FLOOR: u32 = 0x383028;
const MORTAR: u32 = 0x101010;

// Color base por tipo de tile
fn wall_color(id: u8) -> u32 {
    match id {
        map::WALL_BRICK => 0x8C3B2A,
        map::WALL_STONE => 0x7A7A70,
        map::WALL_TECH => 0x4A6A78,
        map::DOOR => 0x9A8050,
        map::SWITCH => 0x3C8C3C,
        map::SECRET_FIRST..=map::SECRET_LAST => 0x7A7A70,
        map::KEY_DOOR_RED => 0xB02020,
        map::KEY_DOOR_YELLOW => 0xC0B020,
        map::KEY_DOOR_BLUE => 0x2040C0,
        _ => 0xFFFFFF,
    }
}

fn shade(color: u32, factor: f32) -> u32 {
    let r = ((color >> 16) & 0xFF) as f32 * factor;
    let g = ((color >> 8) & 0xFF) as f32 * factor;
    let b = (color & 0xFF) as f32 * factor;
    ((r.clamp(0.0, 255.0) as u32) << 16) | ((g.clamp(0.0, 255.0) as u32) << 8) | (b.clamp(0.0, 255.0) as u32)
}

#[inline]
fn put_pixel(buffer: &mut [u32], x: i32, y: i32, color: u32) {
    if x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT {
        buffer[y as usize * WIDTH + x as usize] = color;
    }
}

fn fill_rect(buffer: &mut [u32], x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(buffer, xx, yy, color);
        }
    }
}

/// Texel de pared: ladrillo con juntas; `u` y `v` en 0..64.
fn wall_texel(id: u8, u: u8, v: u8) -> u32 {
    let row = v / 16;
    let offset = if row % 2 == 1 { 16 } else { 0 };
    let joint = v % 16 == 0 || (u.wrapping_add(offset)) % 32 == 0;
    if joint && id != map::DOOR { MORTAR } else { wall_color(id) }
}

/// Dibuja una tira vertical de `COLUMN_WIDTH` píxeles entre `top` y `bottom` (excluido).
fn draw_strip(buffer: &mut [u32], column: usize, top: i32, bottom: i32, slice_top: i32, half: i32, id: u8, tex_x: u8, light: Shade) {
    let factor = if light == Shade::Light { 1.0 } else { 0.7 };
    let x0 = (column * COLUMN_WIDTH) as i32;
    let u = tex_x >> 2;
    let span = (2 * half).max(1);
    for y in top.max(0)..bottom.min(SCREEN_HEIGHT) {
        let v = (((y - slice_top) * 64) / span).clamp(0, 63) as u8;
        let color = shade(wall_texel(id, u, v), factor);
        for x in x0..x0 + COLUMN_WIDTH as i32 {
            put_pixel(buffer, x, y, color);
        }
    }
}

fn draw_column(buffer: &mut [u32], col: &ColumnTrace) {
    let wall = &col.wall;
    let h = wall.height.half_height as i32;
    let top = HORIZON - h;
    draw_strip(buffer, col.column, top, HORIZON + h, top, h, wall.hit.wall_type, wall.hit.texture_x, wall.hit.side.shade());

    if let Some(door) = &col.door {
        let dh = door.height.half_height as i32;
        let dtop = HORIZON - dh;
        // la hoja sube: se ve de arriba hasta el hueco
        let gap = door.gap_y as i32;
        draw_strip(buffer, col.column, dtop, gap, gap - 2 * dh, dh, door.hit.wall_type, door.hit.texture_x, door.hit.side.shade());
    }
}

fn sprite_color(kind: &SpriteKind) -> u32 {
    match kind {
        SpriteKind::Enemy { archetype, pose, .. } => {
            let base = match archetype {
                Archetype::Zombieman => 0x6A8A4A,
                Archetype::Sergeant => 0x4A4A4A,
                Archetype::Imp => 0x8A5A3A,
                Archetype::Demon => 0xC07080,
                Archetype::Commando => 0xA03030,
            };
            match pose {
                EnemyPose::Pain => 0xFFFFFF,
                EnemyPose::Attack(_) => shade(base, 1.3),
                EnemyPose::Death(f) => shade(base, 0.6 - *f as f32 * 0.05),
                EnemyPose::Walk(_) => base,
            }
        }
        SpriteKind::Pickup(p) => match p {
            PickupKind::HealthSmall | PickupKind::HealthLarge => 0xE0E0E0,
            PickupKind::KeyRed => 0xFF2020,
            PickupKind::KeyYellow => 0xFFE020,
            PickupKind::KeyBlue => 0x2060FF,
            PickupKind::Armor | PickupKind::Helmet => 0x30C030,
            _ => 0xA08040,
        },
        SpriteKind::Projectile { kind, state, .. } => match (kind, state) {
            (_, ProjectileState::Exploding) => 0xFFB020,
            (ProjectileKind::Fireball, _) => 0xFF6010,
            (ProjectileKind::Rocket, _) => 0xD0D0D0,
        },
        SpriteKind::Particle { kind, .. } => match kind {
            ParticleKind::Puff => 0xB0B0B0,
            ParticleKind::Group { .. } => 0x909090,
        },
        SpriteKind::SecondPlayer { .. } => 0x40A040,
        // se apaga según avanza la animación
        SpriteKind::TeleportFog { frame } => shade(0x60FF60, 1.0 - *frame as f32 / 12.0),
    }
}

fn class_of(kind: &SpriteKind) -> SpriteClass {
    match kind {
        SpriteKind::Enemy { .. } => SpriteClass::Enemy,
        SpriteKind::Pickup(_) => SpriteClass::Pickup,
        SpriteKind::Projectile { .. } => SpriteClass::Projectile,
        SpriteKind::Particle { .. } => SpriteClass::Particle,
        SpriteKind::SecondPlayer { .. } => SpriteClass::SecondPlayer,
        SpriteKind::TeleportFog { .. } => SpriteClass::TeleportFog,
    }
}

/// Sprite como elipse rellena, muestreada en coordenadas nativas para respetar
/// el recorte izquierdo y el espejo.
fn draw_sprite(buffer: &mut [u32], s: &SpriteDraw) {
    let (w0, h0, _) = class_of(&s.kind).geometry();
    let color = sprite_color(&s.kind);
    let height = s.rect.height.max(1);
    for x in s.clip_left..=s.clip_right {
        let mut u = (s.src_x_offset + (x - s.clip_left) * s.src_x_step) >> 8;
        if s.mirrored {
            u = w0 - 1 - u;
        }
        if !(0..w0).contains(&u) { continue; }
        // sombreado lateral: la mitad izquierda del dibujo algo más oscura
        let c = if u < w0 / 2 { shade(color, 0.85) } else { color };
        for y in s.clip_top..=s.clip_bottom {
            let v = (y - s.rect.y) * h0 / height;
            let (du, dv) = (2 * u - w0 + 1, 2 * v - h0 + 1);
            if du * du * h0 * h0 + dv * dv * w0 * w0 <= w0 * w0 * h0 * h0 {
                put_pixel(buffer, x, y, c);
            }
        }
    }
}

/// Pinta el frame entero en un búfer de `WIDTH * HEIGHT`.
pub fn draw_frame(buffer: &mut [u32], frame: &Frame) {
    if buffer.len() != WIDTH * HEIGHT { return; }
    let horizon = HORIZON as usize;
    buffer[..horizon * WIDTH].fill(SKY);
    buffer[horizon * WIDTH..].fill(FLOOR);

    for col in &frame.columns {
        draw_column(buffer, col);
    }
    // ya vienen de lejos a cerca
    for s in &frame.sprites {
        draw_sprite(buffer, s);
    }
}

/// Barras de salud, armadura y munición del arma actual en la esquina superior.
pub fn draw_hud(buffer: &mut [u32], stats: &PlayerStats) {
    if buffer.len() != WIDTH * HEIGHT { return; }
    fill_rect(buffer, 4, 4, 102, 12, 0x000000);
    let health = stats.health as i32 * 100 / MAX_HEALTH as i32;
    fill_rect(buffer, 5, 5, health, 4, 0xD02020);
    fill_rect(buffer, 5, 10, (stats.armor as i32).min(200) / 2, 2, 0x20B020);
    let ammo = stats.weapon.ammo_kind().map(|k| stats.ammo(k) as i32).unwrap_or(0);
    fill_rect(buffer, 5, 13, ammo.min(100), 2, 0xD0C040);
}
