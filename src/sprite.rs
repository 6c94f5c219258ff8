//! Proyección de sprites en perspectiva y recorte contra el búfer de profundidad.
//!
//! Todo en punto fijo: profundidad y desplazamiento lateral en el espacio de la
//! vista, escala con la tabla de recíprocos. Un sprite se dibuja solo en las
//! columnas donde la pared queda detrás; si solo asoma por el hueco de una puerta,
//! su borde superior baja hasta el hueco.

use log::trace;

use crate::archetype::Archetype;
use crate::depth::{DepthOcclusionBuffer, COLUMN_WIDTH};
use crate::enemy::{enemy_frame, facing_direction, EnemyPose, Enemies};
use crate::fixed::{self, HORIZON, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::particle::{ParticleKind, Particles};
use crate::pickup::{PickupKind, Pickups};
use crate::player::PlayerPose;
use crate::projectile::{ProjectileKind, ProjectileState, Projectiles};
use crate::teleport::TeleportFogs;

/// Profundidad mínima; más cerca no se dibuja.
pub const NEAR_CLIP: i32 = 10;
/// Alturas proyectadas por encima de 4 pantallas se descartan.
pub const MAX_SCALED_HEIGHT: i32 = 4 * SCREEN_HEIGHT;
pub const ENEMY_SLOTS: usize = 5;
pub const PICKUP_SLOTS: usize = 2;
const HALF_WIDTH: i32 = SCREEN_WIDTH / 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteClass {
    Enemy,
    Pickup,
    Projectile,
    Particle,
    SecondPlayer,
    TeleportFog,
}

impl SpriteClass {
    /// (ancho, alto, k): tamaño nativo en píxeles y profundidad a la que se ve a escala 1.
    pub fn geometry(self) -> (i32, i32, i32) {
        match self {
            SpriteClass::Enemy | SpriteClass::SecondPlayer => (64, 64, 800),
            SpriteClass::Pickup => (32, 24, 400),
            SpriteClass::Projectile => (32, 32, 600),
            SpriteClass::Particle => (16, 16, 400),
            SpriteClass::TeleportFog => (48, 64, 800),
        }
    }

    /// Los que andan por el suelo apoyan los pies en la línea de suelo.
    fn on_ground(self) -> bool {
        matches!(self, SpriteClass::Enemy | SpriteClass::SecondPlayer | SpriteClass::Pickup | SpriteClass::TeleportFog)
    }
}

/// Rectángulo proyectado antes de recortar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projection {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Profundidad en el eje de la vista.
    pub depth: i32,
}

/// Qué hay que dibujar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    Enemy { index: usize, archetype: Archetype, pose: EnemyPose, direction: u8 },
    Pickup(PickupKind),
    Projectile { kind: ProjectileKind, state: ProjectileState, frame: u8 },
    Particle { kind: ParticleKind, frame: u8 },
    SecondPlayer { direction: u8 },
    TeleportFog { frame: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteDraw {
    pub kind: SpriteKind,
    pub rect: Projection,
    /// Área visible en pantalla, límites incluidos.
    pub clip_left: i32,
    pub clip_right: i32,
    pub clip_top: i32,
    pub clip_bottom: i32,
    /// Columna de textura (8.8) del primer píxel visible.
    pub src_x_offset: i32,
    /// Avance de textura por píxel de pantalla (8.8).
    pub src_x_step: i32,
    pub mirrored: bool,
}

impl SpriteDraw {
    pub fn depth(&self) -> i32 { self.rect.depth }
}

/// Proyecta un punto del mundo. `None` detrás de la cámara o demasiado cerca.
pub fn project(pose: &PlayerPose, x: u16, y: u16, class: SpriteClass) -> Option<Projection> {
    let (dx, dy) = (x as i32 - pose.x as i32, y as i32 - pose.y as i32);
    let (s, c) = (fixed::sin(pose.angle as i32), fixed::cos(pose.angle as i32));
    let depth = (dy * c + dx * s) >> 8;
    if depth <= NEAR_CLIP { return None; }
    let view_x = (dx * c - dy * s) >> 8;

    let (w0, h0, k) = class.geometry();
    let height = fixed::div_by(h0 * k, depth);
    if height > MAX_SCALED_HEIGHT || height <= 0 { return None; }
    let width = fixed::div_by(w0 * k, depth).max(1);
    let sx = HALF_WIDTH + fixed::div_by(view_x * HALF_WIDTH, depth) - width / 2;
    let sy = if class.on_ground() {
        HORIZON + fixed::depth_height(depth) as i32 - height
    } else {
        HORIZON - height / 2
    };
    Some(Projection { x: sx, y: sy, width, height, depth })
}

/// Proyecta y recorta contra el búfer. `None` si no queda nada visible.
pub fn place(
    pose: &PlayerPose,
    depth: &DepthOcclusionBuffer,
    x: u16,
    y: u16,
    class: SpriteClass,
    kind: SpriteKind,
    mirrored: bool,
) -> Option<SpriteDraw> {
    let rect = project(pose, x, y, class)?;
    let right = rect.x + rect.width - 1;
    if right < 0 || rect.x >= SCREEN_WIDTH { return None; }

    let vis = depth.visibility(rect.x, right, fixed::depth_height(rect.depth))?;
    let clip_left = rect.x.max((vis.first_column * COLUMN_WIDTH) as i32).max(0);
    let clip_right = right.min(((vis.last_column + 1) * COLUMN_WIDTH) as i32 - 1).min(SCREEN_WIDTH - 1);
    let mut clip_top = rect.y.max(0);
    if let Some(gap) = vis.clip_top {
        clip_top = clip_top.max(gap as i32);
    }
    let clip_bottom = (rect.y + rect.height - 1).min(SCREEN_HEIGHT - 1);
    if clip_left > clip_right || clip_top > clip_bottom { return None; }

    let (_, _, k) = class.geometry();
    let src_x_step = fixed::div_by(rect.depth << 8, k);
    Some(SpriteDraw {
        kind,
        rect,
        clip_left,
        clip_right,
        clip_top,
        clip_bottom,
        src_x_offset: (clip_left - rect.x) * src_x_step,
        src_x_step,
        mirrored,
    })
}

/// Lo que el proyector necesita ver del mundo.
pub struct Scene<'a> {
    pub pose: &'a PlayerPose,
    pub depth: &'a DepthOcclusionBuffer,
    pub enemies: &'a Enemies,
    pub pickups: &'a Pickups,
    pub projectiles: &'a Projectiles,
    pub particles: &'a Particles,
    pub teleport_fogs: &'a TeleportFogs,
    pub second_player: Option<PlayerPose>,
}

/// Todos los sprites del frame, de lejos a cerca.
/// Enemigos: 5 plazas, vivos antes que muertos y cercanos antes que lejanos.
/// Objetos: los 2 más cercanos.
pub fn project_scene(scene: &Scene<'_>) -> Vec<SpriteDraw> {
    let pose = scene.pose;
    let mut enemies: Vec<(bool, SpriteDraw)> = scene
        .enemies
        .iter()
        .enumerate()
        .filter_map(|(index, e)| {
            let f = enemy_frame(e, pose.x, pose.y);
            let kind = SpriteKind::Enemy { index, archetype: e.archetype, pose: f.pose, direction: f.direction };
            place(pose, scene.depth, e.x, e.y, SpriteClass::Enemy, kind, f.mirrored).map(|d| (e.is_dead(), d))
        })
        .collect();
    enemies.sort_by_key(|(dead, d)| (*dead, d.depth()));

    let mut pickups: Vec<SpriteDraw> = scene
        .pickups
        .iter()
        .filter_map(|p| place(pose, scene.depth, p.x, p.y, SpriteClass::Pickup, SpriteKind::Pickup(p.kind), false))
        .collect();
    pickups.sort_by_key(SpriteDraw::depth);

    let mut out: Vec<SpriteDraw> = enemies.into_iter().take(ENEMY_SLOTS).map(|(_, d)| d).collect();
    out.extend(pickups.into_iter().take(PICKUP_SLOTS));
    out.extend(scene.projectiles.iter().filter_map(|p| {
        let kind = SpriteKind::Projectile { kind: p.kind, state: p.state, frame: p.anim_frame };
        place(pose, scene.depth, p.x, p.y, SpriteClass::Projectile, kind, false)
    }));
    out.extend(scene.particles.iter().filter_map(|p| {
        let (x, y) = (p.x.clamp(0, u16::MAX as i32) as u16, p.y.clamp(0, u16::MAX as i32) as u16);
        place(pose, scene.depth, x, y, SpriteClass::Particle, SpriteKind::Particle { kind: p.kind, frame: p.frame }, false)
    }));
    out.extend(scene.teleport_fogs.iter().filter_map(|f| {
        place(pose, scene.depth, f.x, f.y, SpriteClass::TeleportFog, SpriteKind::TeleportFog { frame: f.frame }, false)
    }));
    if let Some(other) = scene.second_player {
        let dir = facing_direction(other.angle, other.x, other.y, pose.x, pose.y);
        let (direction, mirrored) = if dir > 4 { (8 - dir, true) } else { (dir, false) };
        if let Some(d) = place(pose, scene.depth, other.x, other.y, SpriteClass::SecondPlayer, SpriteKind::SecondPlayer { direction }, mirrored) {
            out.push(d);
        }
    }

    out.sort_by_key(|d| std::cmp::Reverse(d.depth()));
    trace!("{} sprites en pantalla", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::{ColumnDepth, COLUMNS};

    fn center(t: i32) -> u16 { (t * 256 + 128) as u16 }

    fn walls(h: u8) -> DepthOcclusionBuffer {
        let mut b = DepthOcclusionBuffer::new();
        for c in 0..COLUMNS {
            b.write(c, ColumnDepth { wall_height: h, door: None });
        }
        b
    }

    fn near(a: i32, b: i32) -> bool { (a - b).abs() <= 1 }

    #[test]
    fn straight_ahead_is_centred() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let p = project(&pose, center(10), center(10) + 800, SpriteClass::Enemy).expect("visible");
        assert_eq!(p.depth, 800);
        assert!(near(p.width, 64) && near(p.height, 64), "{p:?}");
        assert!(near(p.x + p.width / 2, HALF_WIDTH));
        // pies en la línea de suelo
        assert_eq!(p.y + p.height, HORIZON + fixed::depth_height(800) as i32);
    }

    #[test]
    fn right_of_view_lands_right_of_centre() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let p = project(&pose, center(10) + 300, center(10) + 800, SpriteClass::Enemy).expect("visible");
        assert!(p.x > HALF_WIDTH);
        // mirando a +X la derecha es -Y
        let turned = PlayerPose::new(center(10), center(10), 256);
        let q = project(&turned, center(10) + 800, center(10) - 300, SpriteClass::Enemy).expect("visible");
        assert!(q.x > HALF_WIDTH);
    }

    #[test]
    fn behind_or_too_close_is_skipped() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        assert!(project(&pose, center(10), center(10) - 500, SpriteClass::Enemy).is_none());
        assert!(project(&pose, center(10), center(10) + 10, SpriteClass::Enemy).is_none());
        // k 800 a profundidad 12: más de 4 pantallas de alto
        assert!(project(&pose, center(10), center(10) + 12, SpriteClass::Enemy).is_none());
    }

    #[test]
    fn projectile_is_centred_on_horizon() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let p = project(&pose, center(10), center(10) + 600, SpriteClass::Projectile).expect("visible");
        assert!(near(p.y + p.height / 2, HORIZON));
    }

    #[test]
    fn wall_in_front_hides_sprite() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let kind = SpriteKind::Pickup(PickupKind::Shells);
        let open = DepthOcclusionBuffer::new();
        assert!(place(&pose, &open, center(10), center(10) + 800, SpriteClass::Pickup, kind, false).is_some());
        let blocked = walls(200);
        assert!(place(&pose, &blocked, center(10), center(10) + 800, SpriteClass::Pickup, kind, false).is_none());
    }

    #[test]
    fn texture_step_follows_depth() {
        let depth = DepthOcclusionBuffer::new();
        for (class, dist) in [(SpriteClass::Enemy, 600), (SpriteClass::Enemy, 3000), (SpriteClass::Pickup, 1200), (SpriteClass::Particle, 500)] {
            let pose = PlayerPose::new(center(10), center(2), 0);
            let kind = SpriteKind::Pickup(PickupKind::Shells);
            let d = place(&pose, &depth, center(10), center(2) + dist, class, kind, false).expect("visible");
            let (_, _, k) = class.geometry();
            let exact = (d.rect.depth << 8) / k;
            assert!((d.src_x_step - exact).abs() <= (exact / 50).max(1), "{class:?} a {dist}: {} vs {exact}", d.src_x_step);
        }
    }

    #[test]
    fn partial_occlusion_clips_left_edge() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let mut depth = DepthOcclusionBuffer::new();
        // columnas 0..=22 tapadas por una pared cercana
        for c in 0..23 {
            depth.write(c, ColumnDepth { wall_height: 200, door: None });
        }
        let kind = SpriteKind::Pickup(PickupKind::Shells);
        let d = place(&pose, &depth, center(10), center(10) + 400, SpriteClass::Pickup, kind, false).expect("visible");
        assert_eq!(d.clip_left, 23 * COLUMN_WIDTH as i32);
        assert_eq!(d.src_x_offset, (d.clip_left - d.rect.x) * d.src_x_step);
        assert!(d.src_x_offset > 0);
        assert_eq!(d.clip_right, d.rect.x + d.rect.width - 1);
    }

    #[test]
    fn door_gap_clips_top() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let mut depth = DepthOcclusionBuffer::new();
        for c in 0..COLUMNS {
            depth.write(c, ColumnDepth { wall_height: 5, door: Some((90, 134)) });
        }
        let kind = SpriteKind::Pickup(PickupKind::Shells);
        let d = place(&pose, &depth, center(10), center(10) + 800, SpriteClass::Pickup, kind, false).expect("visible");
        assert_eq!(d.clip_top, 134);
        assert!(d.clip_top > d.rect.y);

        // hueco por debajo del sprite: nada que dibujar
        for c in 0..COLUMNS {
            depth.write(c, ColumnDepth { wall_height: 5, door: Some((90, 200)) });
        }
        assert!(place(&pose, &depth, center(10), center(10) + 800, SpriteClass::Pickup, kind, false).is_none());
    }

    #[test]
    fn enemy_budget_prefers_alive_and_near() {
        let pose = PlayerPose::new(center(10), center(2), 0);
        let mut enemies = Enemies::new();
        for i in 0..8 {
            enemies.spawn(Archetype::Zombieman, center(10), center(5 + i), 512);
        }
        let mut rng = crate::rng::GameRng::seeded(1);
        let mut pickups = Pickups::new();
        let mut ev = Vec::new();
        // el más cercano muere
        enemies.damage(0, 200, (pose.x, pose.y), &mut rng, &mut pickups, &mut ev);
        let depth = DepthOcclusionBuffer::new();
        let (projectiles, particles) = (Projectiles::new(), Particles::new());
        let scene = Scene {
            pose: &pose,
            depth: &depth,
            enemies: &enemies,
            pickups: &pickups,
            projectiles: &projectiles,
            particles: &particles,
            teleport_fogs: &TeleportFogs::new(),
            second_player: None,
        };
        let drawn = project_scene(&scene);
        let indices: Vec<usize> = drawn
            .iter()
            .filter_map(|d| match d.kind {
                SpriteKind::Enemy { index, .. } => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(indices.len(), ENEMY_SLOTS);
        assert!(!indices.contains(&0));
        for i in 1..=5 {
            assert!(indices.contains(&i), "{indices:?}");
        }
        // de lejos a cerca
        assert!(drawn.windows(2).all(|w| w[0].depth() >= w[1].depth()));
    }

    #[test]
    fn only_two_nearest_pickups() {
        let pose = PlayerPose::new(center(10), center(2), 0);
        let mut pickups = Pickups::new();
        for i in 0..4 {
            pickups.spawn(PickupKind::Shells, center(10), center(8 - i));
        }
        let depth = DepthOcclusionBuffer::new();
        let (enemies, projectiles, particles) = (Enemies::new(), Projectiles::new(), Particles::new());
        let scene = Scene {
            pose: &pose,
            depth: &depth,
            enemies: &enemies,
            pickups: &pickups,
            projectiles: &projectiles,
            particles: &particles,
            teleport_fogs: &TeleportFogs::new(),
            second_player: None,
        };
        let drawn = project_scene(&scene);
        assert_eq!(drawn.len(), PICKUP_SLOTS);
        let nearest = (center(5) - center(2)) as i32;
        assert_eq!(drawn.last().map(|d| d.depth()), Some(nearest));
    }

    #[test]
    fn side_view_is_mirrored() {
        let pose = PlayerPose::new(center(10), center(2), 0);
        let mut enemies = Enemies::new();
        // mira a +X: el jugador lo ve de lado
        enemies.spawn(Archetype::Imp, center(10), center(6), 256);
        let depth = DepthOcclusionBuffer::new();
        let (pickups, projectiles, particles) = (Pickups::new(), Projectiles::new(), Particles::new());
        let scene = Scene {
            pose: &pose,
            depth: &depth,
            enemies: &enemies,
            pickups: &pickups,
            projectiles: &projectiles,
            particles: &particles,
            teleport_fogs: &TeleportFogs::new(),
            second_player: Some(PlayerPose::new(center(10), center(8), 512)),
        };
        let drawn = project_scene(&scene);
        assert_eq!(drawn.len(), 2);
        let imp = drawn.iter().find(|d| matches!(d.kind, SpriteKind::Enemy { .. })).expect("imp");
        assert!(imp.mirrored);
        assert!(matches!(imp.kind, SpriteKind::Enemy { direction: 2, .. }));
        let other = drawn.iter().find(|d| matches!(d.kind, SpriteKind::SecondPlayer { .. })).expect("jugador 2");
        assert_eq!(other.kind, SpriteKind::SecondPlayer { direction: 0 });
    }

    #[test]
    fn teleport_fog_stands_on_the_floor() {
        let pose = PlayerPose::new(center(10), center(2), 0);
        let mut fogs = TeleportFogs::new();
        fogs.spawn(center(10), center(6));
        fogs.update();
        fogs.update();
        let depth = DepthOcclusionBuffer::new();
        let (enemies, pickups, projectiles, particles) = (Enemies::new(), Pickups::new(), Projectiles::new(), Particles::new());
        let scene = Scene {
            pose: &pose,
            depth: &depth,
            enemies: &enemies,
            pickups: &pickups,
            projectiles: &projectiles,
            particles: &particles,
            teleport_fogs: &fogs,
            second_player: None,
        };
        let drawn = project_scene(&scene);
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].kind, SpriteKind::TeleportFog { frame: 1 });
        let r = drawn[0].rect;
        assert_eq!(r.y + r.height, HORIZON + fixed::depth_height(r.depth) as i32);
    }
}
