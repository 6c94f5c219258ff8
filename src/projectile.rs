//! Proyectiles: bolas de fuego de los imps y cohetes del jugador.
//! La actualización no toca enemigos ni jugador: devuelve los impactos y el mundo
//! los aplica.

use log::trace;

use crate::fixed;
use crate::map::TileGrid;
use crate::rng::GameRng;

pub const MAX_PROJECTILES: usize = 3;

pub const FIREBALL_SPEED: i32 = 40;
pub const FIREBALL_DAMAGE_MIN: i32 = 3;
pub const FIREBALL_DAMAGE_MAX: i32 = 24;
/// Cada cuántos ticks la bola corrige el rumbo hacia el jugador.
pub const HOMING_INTERVAL: u8 = 8;
/// Giro máximo por corrección.
pub const HOMING_TURN: i32 = 24;

pub const ROCKET_SPEED: i32 = 80;
pub const ROCKET_SPLASH_RADIUS: i32 = 384;

/// Semiancho de la caja de impacto contra jugador y enemigos.
pub const HIT_HALF: i32 = 64;

pub const EXPLODE_FRAMES: u8 = 5;
pub const EXPLODE_RATE: u8 = 4;
const FLIGHT_RATE: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    Fireball,
    Rocket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileState {
    Flying,
    Exploding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    pub x: u16,
    pub y: u16,
    pub dx: i32,
    pub dy: i32,
    pub angle: u16,
    pub kind: ProjectileKind,
    pub state: ProjectileState,
    /// 0..1 en vuelo, 0..4 explotando.
    pub anim_frame: u8,
    anim_timer: u8,
    age: u8,
    /// Enemigo que la lanzó; `None` para el jugador.
    pub source: Option<usize>,
}

/// Daño que el mundo debe aplicar tras un tick de proyectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Impact {
    Player { damage: u8 },
    Enemy { index: usize, damage: u8 },
}

#[derive(Clone, Debug, Default)]
pub struct Projectiles {
    slots: [Option<Projectile>; MAX_PROJECTILES],
}

/// Velocidad a partir de una de 32 direcciones (11.25 grados cada una).
fn direction32(angle: u16, speed: i32) -> (i32, i32) {
    let dir = ((angle as i32 + 16) >> 5) & 31;
    let a = dir * 32;
    ((fixed::sin(a) * speed) >> 8, (fixed::cos(a) * speed) >> 8)
}

/// Normaliza (dx, dy) a `speed` con la distancia octogonal.
fn aim(dx: i32, dy: i32, speed: i32) -> (i32, i32) {
    let d = fixed::approx_dist(dx, dy);
    if d == 0 { return (speed, 0); }
    (fixed::div_by(dx * speed, d), fixed::div_by(dy * speed, d))
}

impl Projectiles {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_PROJECTILES];
    }

    fn free_slot(&mut self) -> Option<&mut Option<Projectile>> {
        self.slots.iter_mut().find(|s| s.is_none())
    }

    /// Bola de fuego desde (sx, sy) hacia (tx, ty). Sin hueco libre no se lanza.
    pub fn spawn_fireball(&mut self, sx: u16, sy: u16, tx: u16, ty: u16, source: usize) -> bool {
        let Some(slot) = self.free_slot() else { return false; };
        let (dx, dy) = (tx as i32 - sx as i32, ty as i32 - sy as i32);
        let (vx, vy) = aim(dx, dy, FIREBALL_SPEED);
        *slot = Some(Projectile {
            x: sx,
            y: sy,
            dx: vx,
            dy: vy,
            angle: fixed::bearing(dx, dy),
            kind: ProjectileKind::Fireball,
            state: ProjectileState::Flying,
            anim_frame: 0,
            anim_timer: 0,
            age: 0,
            source: Some(source),
        });
        true
    }

    pub fn spawn_rocket(&mut self, x: u16, y: u16, angle: u16) -> bool {
        let Some(slot) = self.free_slot() else { return false; };
        let (dx, dy) = direction32(angle, ROCKET_SPEED);
        *slot = Some(Projectile {
            x,
            y,
            dx,
            dy,
            angle,
            kind: ProjectileKind::Rocket,
            state: ProjectileState::Flying,
            anim_frame: 0,
            anim_timer: 0,
            age: 0,
            source: None,
        });
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().flatten()
    }

    /// Un tick: movimiento, colisiones y animación.
    /// `enemies` son (índice, x, y) de los enemigos vivos.
    pub fn update(&mut self, grid: &TileGrid, player: (u16, u16), enemies: &[(usize, i32, i32)], rng: &mut GameRng) -> Vec<Impact> {
        let mut impacts = Vec::new();
        let (px, py) = (player.0 as i32, player.1 as i32);

        for slot in self.slots.iter_mut() {
            let Some(p) = slot else { continue; };
            if p.state == ProjectileState::Exploding {
                p.anim_timer += 1;
                if p.anim_timer >= EXPLODE_RATE {
                    p.anim_timer = 0;
                    p.anim_frame += 1;
                    if p.anim_frame >= EXPLODE_FRAMES {
                        *slot = None;
                    }
                }
                continue;
            }

            p.age = p.age.wrapping_add(1);
            if p.kind == ProjectileKind::Fireball && p.age % HOMING_INTERVAL == 0 {
                let want = fixed::bearing(px - p.x as i32, py - p.y as i32) as i32;
                let turn = fixed::angle_diff(want, p.angle as i32).clamp(-HOMING_TURN, HOMING_TURN);
                p.angle = fixed::wrap_angle(p.angle as i32 + turn);
                p.dx = (fixed::sin(p.angle as i32) * FIREBALL_SPEED) >> 8;
                p.dy = (fixed::cos(p.angle as i32) * FIREBALL_SPEED) >> 8;
            }

            let (nx, ny) = (p.x as i32 + p.dx, p.y as i32 + p.dy);
            let mut exploded = grid.is_wall(nx >> 8, ny >> 8) || nx < 0 || ny < 0;
            let mut struck = None;
            if !exploded {
                p.x = nx as u16;
                p.y = ny as u16;
            }

            let (x, y) = (p.x as i32, p.y as i32);
            let touches = |ox: i32, oy: i32| (x - ox).abs() < HIT_HALF && (y - oy).abs() < HIT_HALF;

            match p.kind {
                ProjectileKind::Rocket => {
                    if !exploded {
                        struck = enemies.iter().find(|&&(_, ex, ey)| touches(ex, ey)).map(|&(index, _, _)| index);
                        exploded = struck.is_some();
                    }
                }
                ProjectileKind::Fireball => {
                    if !exploded && touches(px, py) {
                        let damage = rng.range(FIREBALL_DAMAGE_MIN, FIREBALL_DAMAGE_MAX) as u8;
                        impacts.push(Impact::Player { damage });
                        exploded = true;
                    }
                }
            }

            if exploded {
                p.state = ProjectileState::Exploding;
                p.anim_frame = 0;
                p.anim_timer = 0;
                if p.kind == ProjectileKind::Rocket {
                    rocket_splash(x, y, struck, (px, py), enemies, rng, &mut impacts);
                }
                trace!("proyectil {:?} explota en ({x}, {y})", p.kind);
                continue;
            }

            p.anim_timer += 1;
            if p.anim_timer >= FLIGHT_RATE {
                p.anim_timer = 0;
                p.anim_frame ^= 1;
            }
        }
        impacts
    }
}

/// Daño de área del cohete. El enemigo alcanzado de lleno (`struck`) recibe el daño
/// directo completo; el resto decae con la distancia. El jugador también recibe su parte.
fn rocket_splash(
    x: i32,
    y: i32,
    struck: Option<usize>,
    player: (i32, i32),
    enemies: &[(usize, i32, i32)],
    rng: &mut GameRng,
    impacts: &mut Vec<Impact>,
) {
    let direct = 20 * ((rng.byte() & 7) as i32 + 1);
    for &(index, ex, ey) in enemies {
        let dist = fixed::approx_dist(x - ex, y - ey);
        if dist >= ROCKET_SPLASH_RADIUS { continue; }
        let damage = if struck == Some(index) { direct } else { ((ROCKET_SPLASH_RADIUS - dist) >> 2).min(direct) };
        if damage > 0 {
            impacts.push(Impact::Enemy { index, damage: damage as u8 });
        }
    }
    let pdist = fixed::approx_dist(x - player.0, y - player.1);
    if pdist < ROCKET_SPLASH_RADIUS {
        let damage = (ROCKET_SPLASH_RADIUS - pdist) >> 2;
        if damage > 0 {
            impacts.push(Impact::Player { damage: damage as u8 });
        }
    }
}
