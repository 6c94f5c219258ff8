//! IA de enemigos: máquina de estados, persecución al estilo Doom y ataques.
//!
//! Idle -> Walk al ver al jugador (cerca, o dentro del cono frontal y a menos de
//! `SIGHT_CONE_RANGE`, siempre con línea de visión) o por alerta de disparo.
//! Walk -> Attack si pasa la prueba de alcance.
//! Cualquier daño puede provocar Pain. Dead es terminal y conserva el fotograma.

use log::debug;

use crate::archetype::{Archetype, AttackKind};
use crate::event::{GameEvent, SoundCue, SoundVolume};
use crate::fixed;
use crate::map::{TileGrid, HEIGHT, WIDTH};
use crate::pickup::Pickups;
use crate::player::{PlayerPose, PLAYER_RADIUS};
use crate::projectile::Projectiles;
use crate::raycaster::has_line_of_sight;
use crate::rng::GameRng;

pub const MAX_ENEMIES: usize = 21;
/// Semiancho de la caja de colisión.
pub const ENEMY_RADIUS: i32 = 48;
/// Distancia a la que un enemigo nota al jugador aunque le dé la espalda.
pub const SIGHT_RANGE: i32 = 512;
/// Alcance máximo de la vista dentro del cono frontal.
pub const SIGHT_CONE_RANGE: i32 = 2048;
/// Radio al que llega el ruido de un disparo.
pub const ALERT_RADIUS: i32 = 1536;
pub const MELEE_RANGE: i32 = 160;
/// Duración total de cualquier animación de ataque.
pub const SHOOT_RATE_TOTAL: u8 = 24;
pub const PAIN_TICKS: u8 = 10;
pub const WALK_ANIM_RATE: u8 = 6;
pub const DEATH_ANIM_RATE: u8 = 4;
/// Más allá de esta distancia, los enemigos andando se actualizan 1 de cada 4 ticks.
pub const THROTTLE_DIST: i32 = 2048;
/// Umbral de eje muerto para elegir dirección.
const CHASE_DEADZONE: i32 = 40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnemyState {
    #[default]
    Idle,
    Walk,
    Attack,
    Pain,
    Dead,
}

/// Ocho direcciones de marcha (Norte = +Y) y NoDir.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDir {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
    NoDir,
}

const MOVE_X: [i32; 8] = [256, 181, 0, -181, -256, -181, 0, 181];
const MOVE_Y: [i32; 8] = [0, 181, 256, 181, 0, -181, -256, -181];
const DIRS: [MoveDir; 8] = [
    MoveDir::East,
    MoveDir::NorthEast,
    MoveDir::North,
    MoveDir::NorthWest,
    MoveDir::West,
    MoveDir::SouthWest,
    MoveDir::South,
    MoveDir::SouthEast,
];
const DIAGS: [MoveDir; 4] = [MoveDir::NorthWest, MoveDir::NorthEast, MoveDir::SouthWest, MoveDir::SouthEast];

impl MoveDir {
    pub fn opposite(self) -> MoveDir {
        match self {
            MoveDir::NoDir => MoveDir::NoDir,
            d => DIRS[(d as usize + 4) % 8],
        }
    }

    /// Vector unitario en 8.8.
    pub fn vector(self) -> (i32, i32) {
        match self {
            MoveDir::NoDir => (0, 0),
            d => (MOVE_X[d as usize], MOVE_Y[d as usize]),
        }
    }

    /// Rumbo equivalente (0 = +Y, 256 = +X).
    pub fn angle(self) -> Option<u16> {
        match self {
            MoveDir::NoDir => None,
            d => Some(fixed::wrap_angle(256 - d as i32 * 128)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub x: u16,
    pub y: u16,
    pub angle: u16,
    pub archetype: Archetype,
    pub state: EnemyState,
    /// 0 = muerto; nunca sube.
    pub health: u8,
    pub anim_frame: u8,
    anim_timer: u8,
    state_timer: u8,
    pub move_dir: MoveDir,
    move_count: u8,
    cooldown: u8,
}

impl Enemy {
    pub fn new(archetype: Archetype, x: u16, y: u16, angle: u16) -> Self {
        Self {
            x,
            y,
            angle: fixed::wrap_angle(angle as i32),
            archetype,
            state: EnemyState::Idle,
            health: archetype.stats().health,
            anim_frame: 0,
            anim_timer: 0,
            state_timer: 0,
            move_dir: MoveDir::NoDir,
            move_count: 0,
            cooldown: 0,
        }
    }

    pub fn is_dead(&self) -> bool { self.state == EnemyState::Dead }

    fn set_state(&mut self, state: EnemyState) {
        self.state = state;
        self.state_timer = 0;
        self.anim_frame = 0;
        self.anim_timer = 0;
    }
}

/// Pose de animación que el proyector de sprites traduce a un fotograma.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyPose {
    Walk(u8),
    Attack(u8),
    Pain,
    Death(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyFrame {
    pub pose: EnemyPose,
    /// 0 de frente .. 4 de espaldas; 5..7 se dibujan espejando 3..1.
    pub direction: u8,
    pub mirrored: bool,
}

/// Dirección 0..7 en que se ve desde (px, py) a algo en (x, y) que mira a `angle`
/// (0 = de frente, 4 = de espaldas).
pub fn facing_direction(angle: u16, x: u16, y: u16, px: u16, py: u16) -> u8 {
    let to_it = fixed::bearing(x as i32 - px as i32, y as i32 - py as i32) as i32;
    let rel = (angle as i32 - to_it + fixed::HALF_TURN) & fixed::ANGLE_MASK;
    (((rel + 64) >> 7) & 7) as u8
}

pub fn enemy_direction(e: &Enemy, px: u16, py: u16) -> u8 {
    facing_direction(e.angle, e.x, e.y, px, py)
}

pub fn enemy_frame(e: &Enemy, px: u16, py: u16) -> EnemyFrame {
    let pose = match e.state {
        EnemyState::Idle => EnemyPose::Walk(0),
        EnemyState::Walk => EnemyPose::Walk(e.anim_frame & 1),
        EnemyState::Attack => EnemyPose::Attack(e.anim_frame),
        EnemyState::Pain => EnemyPose::Pain,
        EnemyState::Dead => return EnemyFrame { pose: EnemyPose::Death(e.anim_frame), direction: 0, mirrored: false },
    };
    let dir = enemy_direction(e, px, py);
    if dir > 4 {
        EnemyFrame { pose, direction: 8 - dir, mirrored: true }
    } else {
        EnemyFrame { pose, direction: dir, mirrored: false }
    }
}

/// Resultado de aplicar daño.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Ignored,
    Hurt,
    Killed,
}

/// Lo que la IA necesita del resto del mundo durante un tick.
pub struct EnemyContext<'a> {
    pub grid: &'a TileGrid,
    pub player: PlayerPose,
    pub rng: &'a mut GameRng,
    pub projectiles: &'a mut Projectiles,
    pub events: &'a mut Vec<GameEvent>,
    pub frame: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Enemies {
    slots: Vec<Enemy>,
    kills: u16,
}

impl Enemies {
    pub fn new() -> Self {
        Self { slots: Vec::with_capacity(MAX_ENEMIES), kills: 0 }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.kills = 0;
    }

    /// Fuera de capacidad no hace nada.
    pub fn spawn(&mut self, archetype: Archetype, x: u16, y: u16, angle: u16) -> Option<usize> {
        if self.slots.len() >= MAX_ENEMIES {
            log::warn!("{archetype:?} en ({x}, {y}) ignorado: ya hay {MAX_ENEMIES} enemigos");
            return None;
        }
        self.slots.push(Enemy::new(archetype, x, y, angle));
        Some(self.slots.len() - 1)
    }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }
    pub fn get(&self, i: usize) -> Option<&Enemy> { self.slots.get(i) }
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> { self.slots.iter() }
    pub fn kills(&self) -> u16 { self.kills }

    /// (índice, x, y) de los vivos.
    pub fn live_positions(&self) -> Vec<(usize, i32, i32)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_dead())
            .map(|(i, e)| (i, e.x as i32, e.y as i32))
            .collect()
    }

    /// ¿Una caja de semiancho `half` en (x, y) choca con algún enemigo vivo?
    pub fn blocks(&self, x: i32, y: i32, half: i32) -> bool {
        let reach = half + ENEMY_RADIUS;
        self.slots
            .iter()
            .any(|e| !e.is_dead() && (e.x as i32 - x).abs() < reach && (e.y as i32 - y).abs() < reach)
    }

    /// El ruido de un disparo despierta a los enemigos quietos cercanos.
    pub fn alert(&mut self, x: u16, y: u16, radius: i32) -> usize {
        let mut woken = 0;
        for e in self.slots.iter_mut().filter(|e| e.state == EnemyState::Idle) {
            if fixed::approx_dist(e.x as i32 - x as i32, e.y as i32 - y as i32) < radius {
                e.set_state(EnemyState::Walk);
                woken += 1;
            }
        }
        woken
    }

    /// Aplica daño. Un enemigo muerto ignora cualquier daño posterior.
    pub fn damage(
        &mut self,
        index: usize,
        amount: u8,
        player: (u16, u16),
        rng: &mut GameRng,
        pickups: &mut Pickups,
        events: &mut Vec<GameEvent>,
    ) -> DamageOutcome {
        let Some(e) = self.slots.get_mut(index) else { return DamageOutcome::Ignored; };
        if e.is_dead() || amount == 0 { return DamageOutcome::Ignored; }
        let dist = fixed::approx_dist(e.x as i32 - player.0 as i32, e.y as i32 - player.1 as i32);

        if e.health <= amount {
            e.health = 0;
            e.set_state(EnemyState::Dead);
            let stats = e.archetype.stats();
            if let Some(kind) = stats.drop {
                pickups.spawn(kind, e.x, e.y);
            }
            let archetype = e.archetype;
            self.kills += 1;
            let volume = SoundVolume::from_distance(dist);
            events.push(GameEvent::EnemyKilled { index, archetype, volume });
            events.push(GameEvent::Sound { cue: SoundCue::EnemyDeath, volume });
            debug!("enemigo {index} ({archetype:?}) muerto; bajas {}", self.kills);
            return DamageOutcome::Killed;
        }

        e.health -= amount;
        if e.state == EnemyState::Idle {
            e.set_state(EnemyState::Walk);
        }
        if rng.byte() < e.archetype.stats().pain_chance {
            e.set_state(EnemyState::Pain);
            events.push(GameEvent::Sound { cue: SoundCue::EnemyPain, volume: SoundVolume::from_distance(dist) });
        }
        DamageOutcome::Hurt
    }

    /// Un tick de IA. Devuelve el daño infligido al jugador.
    pub fn update(&mut self, ctx: &mut EnemyContext<'_>) -> u16 {
        let mut player_damage = 0u16;
        for i in 0..self.slots.len() {
            player_damage += self.update_one(i, ctx) as u16;
        }
        player_damage
    }

    fn update_one(&mut self, i: usize, ctx: &mut EnemyContext<'_>) -> u8 {
        let (px, py) = (ctx.player.x as i32, ctx.player.y as i32);
        let e = &mut self.slots[i];

        if e.state == EnemyState::Dead {
            let last = e.archetype.stats().death_frames - 1;
            if e.anim_frame < last {
                e.anim_timer += 1;
                if e.anim_timer >= DEATH_ANIM_RATE {
                    e.anim_timer = 0;
                    e.anim_frame += 1;
                }
            }
            return 0;
        }

        let (dx, dy) = (px - e.x as i32, py - e.y as i32);
        let dist = fixed::approx_dist(dx, dy);
        let far = dist > THROTTLE_DIST;
        if e.state == EnemyState::Walk && far && (ctx.frame as usize + i) % 4 != 0 {
            return 0;
        }
        let step_mul = if far { 4 } else { 1 };

        let state = e.state;
        match state {
            EnemyState::Idle => {
                let to_player = fixed::bearing(dx, dy) as i32;
                let facing = fixed::angle_diff(to_player, e.angle as i32).abs() < fixed::QUARTER_TURN;
                if (dist < SIGHT_RANGE || (facing && dist < SIGHT_CONE_RANGE)) && has_line_of_sight(ctx.grid, (e.x, e.y), (ctx.player.x, ctx.player.y)) {
                    e.set_state(EnemyState::Walk);
                    ctx.events.push(GameEvent::Sound { cue: SoundCue::EnemySight, volume: SoundVolume::from_distance(dist) });
                    debug!("enemigo {i} ve al jugador a {dist}");
                }
                0
            }
            EnemyState::Pain => {
                e.state_timer += 1;
                if e.state_timer >= PAIN_TICKS {
                    e.set_state(EnemyState::Walk);
                }
                0
            }
            EnemyState::Attack => self.attack_tick(i, dist, ctx),
            EnemyState::Walk => {
                e.cooldown = e.cooldown.saturating_sub(step_mul as u8);
                if e.cooldown == 0 && self.should_attack(i, dist, ctx) {
                    let e = &mut self.slots[i];
                    e.set_state(EnemyState::Attack);
                    e.angle = fixed::bearing(dx, dy);
                    return 0;
                }
                self.chase(i, dx, dy, step_mul, ctx);
                let e = &mut self.slots[i];
                e.anim_timer += step_mul as u8;
                if e.anim_timer >= WALK_ANIM_RATE {
                    e.anim_timer = 0;
                    e.anim_frame ^= 1;
                }
                0
            }
            EnemyState::Dead => 0,
        }
    }

    /// Prueba de alcance de Doom: cuanto más lejos, menos probable atacar.
    fn should_attack(&self, i: usize, dist: i32, ctx: &mut EnemyContext<'_>) -> bool {
        let e = &self.slots[i];
        if !has_line_of_sight(ctx.grid, (e.x, e.y), (ctx.player.x, ctx.player.y)) {
            return false;
        }
        if e.archetype.has_melee() && dist < MELEE_RANGE {
            return true;
        }
        if !e.archetype.has_ranged_attack() {
            return false;
        }
        let mut d = dist / 4 - 64;
        if !e.archetype.has_melee() {
            d -= 128;
        }
        let d = d.min(200);
        (ctx.rng.byte() as i32) >= d
    }

    fn attack_tick(&mut self, i: usize, dist: i32, ctx: &mut EnemyContext<'_>) -> u8 {
        let e = &mut self.slots[i];
        let stats = e.archetype.stats();
        e.angle = fixed::bearing(ctx.player.x as i32 - e.x as i32, ctx.player.y as i32 - e.y as i32);
        e.state_timer += 1;
        if e.state_timer < SHOOT_RATE_TOTAL / stats.attack_frames {
            return 0;
        }
        e.state_timer = 0;
        e.anim_frame += 1;

        let fires = match stats.attack {
            AttackKind::Burst => e.anim_frame < stats.attack_frames,
            _ => e.anim_frame == stats.attack_frames - 1,
        };
        let done = e.anim_frame >= stats.attack_frames;
        let (ex, ey, archetype) = (e.x, e.y, e.archetype);
        if done {
            e.set_state(EnemyState::Walk);
            e.cooldown = stats.attack_cooldown;
        }
        if !fires {
            return 0;
        }

        let volume = SoundVolume::from_distance(dist);
        let sees = has_line_of_sight(ctx.grid, (ex, ey), (ctx.player.x, ctx.player.y));
        match stats.attack {
            AttackKind::Hitscan { pellets } => {
                if !sees { return 0; }
                ctx.events.push(GameEvent::Sound { cue: SoundCue::EnemyAttack, volume });
                (0..pellets).map(|_| hitscan_pellet(dist, ctx.rng)).sum()
            }
            AttackKind::Burst => {
                if !sees { return 0; }
                ctx.events.push(GameEvent::Sound { cue: SoundCue::EnemyAttack, volume });
                hitscan_pellet(dist, ctx.rng)
            }
            AttackKind::ClawOrFireball => {
                if dist < MELEE_RANGE {
                    ctx.events.push(GameEvent::Sound { cue: SoundCue::Claw, volume });
                    ((ctx.rng.byte() % 8) + 1) * 3
                } else {
                    if sees && ctx.projectiles.spawn_fireball(ex, ey, ctx.player.x, ctx.player.y, i) {
                        ctx.events.push(GameEvent::Sound { cue: SoundCue::EnemyAttack, volume });
                        debug!("{archetype:?} {i} lanza bola de fuego");
                    }
                    0
                }
            }
            AttackKind::Bite => {
                if dist >= MELEE_RANGE { return 0; }
                ctx.events.push(GameEvent::Sound { cue: SoundCue::Claw, volume });
                ((ctx.rng.byte() % 10) + 1) * 4
            }
        }
    }

    /// Avanza en la dirección actual o busca una nueva.
    fn chase(&mut self, i: usize, dx: i32, dy: i32, step_mul: i32, ctx: &mut EnemyContext<'_>) {
        let e = &mut self.slots[i];
        e.move_count = e.move_count.saturating_sub(1);
        let dir = e.move_dir;
        if e.move_count > 0 && dir != MoveDir::NoDir && self.try_walk(i, dir, step_mul, ctx) {
            return;
        }
        self.new_chase_dir(i, dx, dy, step_mul, ctx);
    }

    fn position_blocked(&self, i: usize, nx: i32, ny: i32, ctx: &EnemyContext<'_>) -> bool {
        if ctx.grid.box_hits_wall(nx, ny, ENEMY_RADIUS) { return true; }
        let reach = ENEMY_RADIUS + PLAYER_RADIUS;
        if (nx - ctx.player.x as i32).abs() < reach && (ny - ctx.player.y as i32).abs() < reach {
            return true;
        }
        self.slots.iter().enumerate().any(|(j, o)| {
            j != i && !o.is_dead() && (o.x as i32 - nx).abs() < 2 * ENEMY_RADIUS && (o.y as i32 - ny).abs() < 2 * ENEMY_RADIUS
        })
    }

    fn try_walk(&mut self, i: usize, dir: MoveDir, step_mul: i32, ctx: &mut EnemyContext<'_>) -> bool {
        if dir == MoveDir::NoDir { return false; }
        let e = &self.slots[i];
        let speed = e.archetype.stats().speed * step_mul;
        let (vx, vy) = dir.vector();
        let nx = (e.x as i32 + ((vx * speed) >> 8)).clamp(0, WIDTH as i32 * 256 - 1);
        let ny = (e.y as i32 + ((vy * speed) >> 8)).clamp(0, HEIGHT as i32 * 256 - 1);
        if self.position_blocked(i, nx, ny, ctx) {
            return false;
        }
        let e = &mut self.slots[i];
        e.x = nx as u16;
        e.y = ny as u16;
        e.move_dir = dir;
        if let Some(a) = dir.angle() {
            e.angle = a;
        }
        true
    }

    /// Paso en una dirección recién elegida; sortea cuántos ticks la mantiene.
    fn walk_fresh(&mut self, i: usize, dir: MoveDir, step_mul: i32, ctx: &mut EnemyContext<'_>) -> bool {
        if !self.try_walk(i, dir, step_mul, ctx) { return false; }
        self.slots[i].move_count = ctx.rng.byte() & 15;
        true
    }

    /// Búsqueda de dirección de Doom: diagonal que reduce ambos ejes, eje dominante,
    /// dirección anterior, barrido completo, media vuelta y si nada vale, NoDir.
    fn new_chase_dir(&mut self, i: usize, dx: i32, dy: i32, step_mul: i32, ctx: &mut EnemyContext<'_>) {
        let old = self.slots[i].move_dir;
        let turnaround = old.opposite();

        let mut d1 = if dx > CHASE_DEADZONE { MoveDir::East } else if dx < -CHASE_DEADZONE { MoveDir::West } else { MoveDir::NoDir };
        let mut d2 = if dy < -CHASE_DEADZONE { MoveDir::South } else if dy > CHASE_DEADZONE { MoveDir::North } else { MoveDir::NoDir };

        if d1 != MoveDir::NoDir && d2 != MoveDir::NoDir {
            let diag = DIAGS[(((dy < 0) as usize) << 1) + (dx > 0) as usize];
            if diag != turnaround && self.walk_fresh(i, diag, step_mul, ctx) { return; }
        }

        if ctx.rng.byte() > 200 || dy.abs() > dx.abs() {
            std::mem::swap(&mut d1, &mut d2);
        }
        if d1 == turnaround { d1 = MoveDir::NoDir; }
        if d2 == turnaround { d2 = MoveDir::NoDir; }

        if d1 != MoveDir::NoDir && self.walk_fresh(i, d1, step_mul, ctx) { return; }
        if d2 != MoveDir::NoDir && self.walk_fresh(i, d2, step_mul, ctx) { return; }
        if old != MoveDir::NoDir && self.walk_fresh(i, old, step_mul, ctx) { return; }

        let scan: Vec<MoveDir> = if ctx.rng.byte() & 1 == 1 { DIRS.to_vec() } else { DIRS.iter().rev().copied().collect() };
        for dir in scan {
            if dir != turnaround && self.walk_fresh(i, dir, step_mul, ctx) { return; }
        }

        if turnaround != MoveDir::NoDir && self.walk_fresh(i, turnaround, step_mul, ctx) { return; }
        self.slots[i].move_dir = MoveDir::NoDir;
    }
}

/// Perdigón enemigo: falla más cuanto menor es el ángulo que ocupa el jugador.
fn hitscan_pellet(dist: i32, rng: &mut GameRng) -> u8 {
    let spread = rng.spread() >> 2;
    let subtended = fixed::div_by(64 * 163, dist);
    if spread.abs() > subtended {
        return 0;
    }
    ((rng.byte() % 5) + 1) * 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map;

    fn center(t: i32) -> u16 { (t * 256 + 128) as u16 }

    struct Harness {
        grid: TileGrid,
        rng: GameRng,
        projectiles: Projectiles,
        events: Vec<GameEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self { grid: TileGrid::new(), rng: GameRng::seeded(42), projectiles: Projectiles::new(), events: Vec::new() }
        }

        fn tick(&mut self, enemies: &mut Enemies, player: PlayerPose, frame: u32) -> u16 {
            let mut ctx = EnemyContext {
                grid: &self.grid,
                player,
                rng: &mut self.rng,
                projectiles: &mut self.projectiles,
                events: &mut self.events,
                frame,
            };
            enemies.update(&mut ctx)
        }
    }

    #[test]
    fn move_dir_tables() {
        assert_eq!(MoveDir::East.opposite(), MoveDir::West);
        assert_eq!(MoveDir::NorthEast.opposite(), MoveDir::SouthWest);
        assert_eq!(MoveDir::NoDir.opposite(), MoveDir::NoDir);
        assert_eq!(MoveDir::North.vector(), (0, 256));
        assert_eq!(MoveDir::North.angle(), Some(0));
        assert_eq!(MoveDir::East.angle(), Some(256));
        assert_eq!(MoveDir::South.angle(), Some(512));
        assert_eq!(MoveDir::NorthWest.angle(), Some(896));
    }

    #[test]
    fn capacity_is_bounded() {
        let mut e = Enemies::new();
        for i in 0..MAX_ENEMIES + 2 {
            e.spawn(Archetype::Imp, center(i as i32 % 60), center(3), 0);
        }
        assert_eq!(e.len(), MAX_ENEMIES);
    }

    #[test]
    fn wakes_when_player_close_and_visible() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        // de espaldas al jugador
        e.spawn(Archetype::Zombieman, center(10), center(10), 512);
        let player = PlayerPose::new(center(10), center(11), 0);
        h.tick(&mut e, player, 0);
        assert_eq!(e.get(0).map(|z| z.state), Some(EnemyState::Walk));
    }

    #[test]
    fn ignores_player_behind_its_back_far_away() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        e.spawn(Archetype::Zombieman, center(10), center(10), 512);
        let player = PlayerPose::new(center(10), center(20), 0);
        for f in 0..20 {
            h.tick(&mut e, player, f);
        }
        assert_eq!(e.get(0).map(|z| z.state), Some(EnemyState::Idle));
    }

    #[test]
    fn alert_wakes_idle_nearby() {
        let mut e = Enemies::new();
        e.spawn(Archetype::Imp, center(10), center(10), 0);
        e.spawn(Archetype::Imp, center(40), center(40), 0);
        assert_eq!(e.alert(center(12), center(10), ALERT_RADIUS), 1);
        assert_eq!(e.get(0).map(|z| z.state), Some(EnemyState::Walk));
        assert_eq!(e.get(1).map(|z| z.state), Some(EnemyState::Idle));
    }

    #[test]
    fn walker_closes_distance() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        e.spawn(Archetype::Demon, center(10), center(10), 0);
        let player = PlayerPose::new(center(16), center(16), 0);
        e.alert(player.x, player.y, ALERT_RADIUS * 4);
        let d0 = fixed::approx_dist(player.x as i32 - center(10) as i32, player.y as i32 - center(10) as i32);
        for f in 0..40 {
            h.tick(&mut e, player, f);
        }
        let z = e.get(0).cloned().expect("demonio");
        let d1 = fixed::approx_dist(player.x as i32 - z.x as i32, player.y as i32 - z.y as i32);
        assert!(d1 < d0, "{d1} >= {d0}");
    }

    #[test]
    fn damage_kills_once_and_drops() {
        let mut e = Enemies::new();
        let mut rng = GameRng::seeded(5);
        let mut pickups = Pickups::new();
        let mut ev = Vec::new();
        e.spawn(Archetype::Zombieman, center(10), center(10), 0);
        let p = (center(12), center(10));
        assert_eq!(e.damage(0, 5, p, &mut rng, &mut pickups, &mut ev), DamageOutcome::Hurt);
        assert_eq!(e.get(0).map(|z| z.health), Some(15));
        assert_eq!(e.damage(0, 15, p, &mut rng, &mut pickups, &mut ev), DamageOutcome::Killed);
        assert_eq!(e.kills(), 1);
        assert_eq!(pickups.iter().count(), 1);
        assert!(ev.iter().any(|x| matches!(x, GameEvent::EnemyKilled { index: 0, volume: SoundVolume::Loud, .. })));
        for _ in 0..5 {
            assert_eq!(e.damage(0, 50, p, &mut rng, &mut pickups, &mut ev), DamageOutcome::Ignored);
        }
        let z = e.get(0).expect("zombi");
        assert_eq!((z.health, z.state), (0, EnemyState::Dead));
        assert_eq!(e.kills(), 1);
        assert_eq!(pickups.iter().count(), 1);
    }

    #[test]
    fn death_animation_holds_last_frame() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        let mut pickups = Pickups::new();
        e.spawn(Archetype::Imp, center(10), center(10), 0);
        e.damage(0, 255, (center(30), center(30)), &mut h.rng, &mut pickups, &mut h.events);
        let player = PlayerPose::new(center(30), center(30), 0);
        for f in 0..200 {
            h.tick(&mut e, player, f);
        }
        let z = e.get(0).expect("imp");
        assert_eq!(z.anim_frame, Archetype::Imp.stats().death_frames - 1);
        assert_eq!(enemy_frame(z, player.x, player.y).pose, EnemyPose::Death(4));
    }

    #[test]
    fn pain_returns_to_walk() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        e.spawn(Archetype::Demon, center(10), center(10), 0);
        e.slots[0].set_state(EnemyState::Pain);
        let player = PlayerPose::new(center(30), center(30), 0);
        for f in 0..PAIN_TICKS as u32 {
            h.tick(&mut e, player, f);
        }
        assert_eq!(e.get(0).map(|z| z.state), Some(EnemyState::Walk));
    }

    #[test]
    fn demon_bites_adjacent_player() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        e.spawn(Archetype::Demon, center(10), center(10), 0);
        let player = PlayerPose::new(center(10), center(10) + 120, 512);
        let mut dealt = 0;
        for f in 0..60 {
            dealt += h.tick(&mut e, player, f);
        }
        assert!(dealt >= 4, "dealt {dealt}");
    }

    #[test]
    fn imp_throws_fireball_at_range() {
        let mut h = Harness::new();
        let mut e = Enemies::new();
        e.spawn(Archetype::Imp, center(10), center(10), 0);
        let player = PlayerPose::new(center(10), center(13), 512);
        for f in 0..200 {
            h.tick(&mut e, player, f);
            if h.projectiles.iter().count() > 0 { break; }
        }
        assert!(h.projectiles.iter().any(|p| p.source == Some(0)));
    }

    #[test]
    fn walls_stop_walkers() {
        let mut h = Harness::new();
        for y in 0..64 {
            h.grid.set(12, y, map::WALL_BRICK);
        }
        let mut e = Enemies::new();
        e.spawn(Archetype::Zombieman, center(10), center(10), 0);
        e.slots[0].set_state(EnemyState::Walk);
        let player = PlayerPose::new(center(20), center(10), 0);
        for f in 0..300 {
            h.tick(&mut e, player, f);
            let z = e.get(0).expect("zombi");
            assert!((z.x as i32 + ENEMY_RADIUS) <= 12 * 256, "x = {}", z.x);
        }
    }

    #[test]
    fn frame_direction_and_mirror() {
        // enemigo al norte del jugador mirándole: de frente
        let z = Enemy::new(Archetype::Zombieman, center(10), center(14), 512);
        assert_eq!(enemy_direction(&z, center(10), center(10)), 0);
        let back = Enemy::new(Archetype::Zombieman, center(10), center(14), 0);
        assert_eq!(enemy_direction(&back, center(10), center(10)), 4);
        let side = Enemy::new(Archetype::Zombieman, center(10), center(14), 256);
        let f = enemy_frame(&side, center(10), center(10));
        assert_eq!((f.direction, f.mirrored), (2, true));
    }
}
