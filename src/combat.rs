//! Disparo del jugador: puño, balas, perdigones de escopeta y cohetes.
//!
//! Cada perdigón se desvía al azar y acierta al enemigo vivo más cercano cuyo cono
//! angular lo contenga y que esté a la vista. El daño se acumula por objetivo y se
//! aplica una sola vez al final del disparo.

use log::debug;

use crate::enemy::{DamageOutcome, Enemies, ALERT_RADIUS, ENEMY_RADIUS};
use crate::event::{GameEvent, SoundCue};
use crate::fixed;
use crate::map::TileGrid;
use crate::particle::Particles;
use crate::pickup::Pickups;
use crate::player::{AmmoKind, PlayerPose, PlayerStats, Weapon};
use crate::projectile::Projectiles;
use crate::raycaster::{cast_ray_hit_pos, has_line_of_sight};
use crate::rng::GameRng;

pub const FIST_RANGE: i32 = 128;
/// El puño solo levanta polvo si la pared está así de cerca.
pub const FIST_PUFF_RANGE: i32 = 80;
pub const SHOTGUN_PELLETS: u8 = 7;
/// Medio cono mínimo de acierto para blancos muy lejanos.
pub const MIN_HIT_CONE: i32 = 6;
/// 1024 / 2π: radianes a unidades de ángulo.
const RAD_TO_ANGLE: i32 = 163;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShotReport {
    /// `None` si no llegó a dispararse (sin munición, muerto o sin hueco para el cohete).
    pub weapon: Option<Weapon>,
    pub pellets: u8,
    /// (enemigo, daño acumulado) en orden de primer impacto.
    pub hits: Vec<(usize, u16)>,
    pub total_damage: u16,
    pub kills: u8,
}

impl ShotReport {
    pub fn fired(&self) -> bool { self.weapon.is_some() }
}

pub struct ShotContext<'a> {
    pub grid: &'a TileGrid,
    pub pose: PlayerPose,
    pub stats: &'a mut PlayerStats,
    pub enemies: &'a mut Enemies,
    pub rng: &'a mut GameRng,
    pub projectiles: &'a mut Projectiles,
    pub particles: &'a mut Particles,
    pub pickups: &'a mut Pickups,
    pub events: &'a mut Vec<GameEvent>,
}

/// Medio ángulo que ocupa un objeto de semiancho `radius` visto a `dist`.
pub fn subtended_angle(radius: i32, dist: i32) -> i32 {
    fixed::div_by(radius * RAD_TO_ANGLE, dist)
}

/// Enemigo vivo más cercano en la dirección `angle`, a menos de `max_dist` y a la vista.
pub fn aim_target(grid: &TileGrid, pose: &PlayerPose, enemies: &Enemies, angle: u16, max_dist: i32) -> Option<(usize, i32)> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_dead())
        .filter_map(|(i, e)| {
            let (dx, dy) = (e.x as i32 - pose.x as i32, e.y as i32 - pose.y as i32);
            let dist = fixed::approx_dist(dx, dy);
            if dist >= max_dist { return None; }
            let cone = subtended_angle(ENEMY_RADIUS, dist).max(MIN_HIT_CONE);
            let off = fixed::angle_diff(fixed::bearing(dx, dy) as i32, angle as i32).abs();
            if off > cone { return None; }
            if !has_line_of_sight(grid, (pose.x, pose.y), (e.x, e.y)) { return None; }
            Some((i, dist))
        })
        .min_by_key(|&(_, dist)| dist)
}

fn add_hit(hits: &mut Vec<(usize, u16)>, index: usize, damage: u16) {
    match hits.iter_mut().find(|(i, _)| *i == index) {
        Some((_, total)) => *total += damage,
        None => hits.push((index, damage)),
    }
}

/// Dispara el arma actual. Sin munición cambia a la mejor arma cargada y no dispara.
pub fn player_shoot(ctx: &mut ShotContext<'_>) -> ShotReport {
    if ctx.stats.is_dead() { return ShotReport::default(); }
    let weapon = ctx.stats.weapon;
    if !ctx.stats.consume_ammo() {
        let best = ctx.stats.best_loaded_weapon();
        debug!("{weapon:?} sin munición, cambio a {best:?}");
        ctx.stats.weapon = best;
        return ShotReport::default();
    }

    let pose = ctx.pose;
    let mut report = ShotReport { weapon: Some(weapon), ..ShotReport::default() };
    let mut missed = false;

    match weapon {
        Weapon::RocketLauncher => {
            if !ctx.projectiles.spawn_rocket(pose.x, pose.y, pose.angle) {
                ctx.stats.add_ammo(AmmoKind::Rockets, 1);
                return ShotReport::default();
            }
            ctx.events.push(GameEvent::sound(SoundCue::RocketLaunch));
        }
        Weapon::Fist => {
            ctx.events.push(GameEvent::sound(SoundCue::Punch));
            report.pellets = 1;
            let damage = ((ctx.rng.byte() % 10) as u16 + 1) * 2;
            match aim_target(ctx.grid, &pose, ctx.enemies, pose.angle, FIST_RANGE) {
                Some((index, _)) => add_hit(&mut report.hits, index, damage),
                None => {
                    let (hx, hy) = cast_ray_hit_pos(ctx.grid, pose.x, pose.y, pose.angle);
                    if fixed::approx_dist(hx - pose.x as i32, hy - pose.y as i32) < FIST_PUFF_RANGE {
                        ctx.particles.spawn_puff(hx, hy);
                    }
                }
            }
        }
        Weapon::Pistol | Weapon::Chaingun | Weapon::Shotgun => {
            let shotgun = weapon == Weapon::Shotgun;
            report.pellets = if shotgun { SHOTGUN_PELLETS } else { 1 };
            ctx.events.push(GameEvent::sound(if shotgun { SoundCue::Shotgun } else { SoundCue::Pistol }));
            for _ in 0..report.pellets {
                let angle = fixed::wrap_angle(pose.angle as i32 + (ctx.rng.spread() >> 4));
                let damage = ((ctx.rng.byte() % 3) as u16 + 1) * 5;
                match aim_target(ctx.grid, &pose, ctx.enemies, angle, i32::MAX) {
                    Some((index, _)) => add_hit(&mut report.hits, index, damage),
                    None => missed = true,
                }
            }
            if missed {
                let (hx, hy) = cast_ray_hit_pos(ctx.grid, pose.x, pose.y, pose.angle);
                if shotgun { ctx.particles.spawn_group(hx, hy) } else { ctx.particles.spawn_puff(hx, hy) }
            }
        }
    }

    // el ruido despierta a los que estén cerca
    ctx.enemies.alert(pose.x, pose.y, ALERT_RADIUS);

    for &(index, damage) in &report.hits {
        let amount = damage.min(u8::MAX as u16) as u8;
        let outcome = ctx.enemies.damage(index, amount, (pose.x, pose.y), ctx.rng, ctx.pickups, ctx.events);
        if outcome == DamageOutcome::Killed {
            report.kills += 1;
        }
        report.total_damage += damage;
    }
    debug!("{weapon:?}: {} perdigones, {} dañados, {} de daño", report.pellets, report.hits.len(), report.total_damage);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;
    use crate::map;

    fn center(t: i32) -> u16 { (t * 256 + 128) as u16 }

    struct Bench {
        grid: TileGrid,
        stats: PlayerStats,
        enemies: Enemies,
        rng: GameRng,
        projectiles: Projectiles,
        particles: Particles,
        pickups: Pickups,
        events: Vec<GameEvent>,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                grid: TileGrid::new(),
                stats: PlayerStats::default(),
                enemies: Enemies::new(),
                rng: GameRng::seeded(3),
                projectiles: Projectiles::new(),
                particles: Particles::new(),
                pickups: Pickups::new(),
                events: Vec::new(),
            }
        }

        fn shoot(&mut self, pose: PlayerPose) -> ShotReport {
            let mut ctx = ShotContext {
                grid: &self.grid,
                pose,
                stats: &mut self.stats,
                enemies: &mut self.enemies,
                rng: &mut self.rng,
                projectiles: &mut self.projectiles,
                particles: &mut self.particles,
                pickups: &mut self.pickups,
                events: &mut self.events,
            };
            player_shoot(&mut ctx)
        }
    }

    #[test]
    fn subtended_shrinks_with_distance() {
        assert!(subtended_angle(ENEMY_RADIUS, 256) > subtended_angle(ENEMY_RADIUS, 1024));
        assert!(subtended_angle(ENEMY_RADIUS, 256) >= 16);
    }

    #[test]
    fn pistol_hits_target_ahead() {
        let mut b = Bench::new();
        b.enemies.spawn(Archetype::Demon, center(10), center(11), 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert_eq!(r.weapon, Some(Weapon::Pistol));
        assert_eq!(r.hits.len(), 1);
        assert!([5, 10, 15].contains(&r.total_damage));
        assert_eq!(b.stats.bullets, 49);
    }

    #[test]
    fn shotgun_accumulates_per_target() {
        let mut b = Bench::new();
        b.stats.give_weapon(Weapon::Shotgun);
        b.stats.add_ammo(AmmoKind::Shells, 1);
        b.stats.select(Weapon::Shotgun);
        b.enemies.spawn(Archetype::Demon, center(10), center(11), 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert_eq!(r.pellets, SHOTGUN_PELLETS);
        assert_eq!(r.hits.len(), 1);
        assert!((35..=105).contains(&r.total_damage), "{}", r.total_damage);
        let demon = b.enemies.get(0).expect("demonio");
        assert_eq!(demon.health as u16, 150 - r.total_damage);
    }

    #[test]
    fn wall_shields_target() {
        let mut b = Bench::new();
        for x in 0..64 {
            b.grid.set(x, 11, map::WALL_STONE);
        }
        b.enemies.spawn(Archetype::Zombieman, center(10), center(13), 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert!(r.fired());
        assert!(r.hits.is_empty());
        assert_eq!(b.particles.active_count(), 1);
    }

    #[test]
    fn nearest_target_takes_the_bullet() {
        let mut b = Bench::new();
        b.enemies.spawn(Archetype::Demon, center(10), center(13), 0);
        b.enemies.spawn(Archetype::Demon, center(10), center(11), 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert_eq!(r.hits.first().map(|h| h.0), Some(1));
    }

    #[test]
    fn empty_weapon_switches_instead_of_firing() {
        let mut b = Bench::new();
        b.stats.bullets = 0;
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert!(!r.fired());
        assert_eq!(b.stats.weapon, Weapon::Fist);
    }

    #[test]
    fn fist_reaches_only_adjacent() {
        let mut b = Bench::new();
        b.stats.select(Weapon::Fist);
        b.enemies.spawn(Archetype::Demon, center(10), center(10) + 300, 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert!(r.hits.is_empty());
        // pared lejos: sin polvo
        assert_eq!(b.particles.active_count(), 0);

        let mut b = Bench::new();
        b.stats.select(Weapon::Fist);
        b.enemies.spawn(Archetype::Demon, center(10), center(10) + 100, 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert_eq!(r.hits.len(), 1);
        assert!((2..=20).contains(&r.total_damage));
        assert_eq!(b.stats.bullets, 50);
    }

    #[test]
    fn rocket_launches_projectile_without_hitscan() {
        let mut b = Bench::new();
        b.stats.give_weapon(Weapon::RocketLauncher);
        b.stats.add_ammo(AmmoKind::Rockets, 2);
        b.stats.select(Weapon::RocketLauncher);
        b.enemies.spawn(Archetype::Demon, center(10), center(12), 0);
        let r = b.shoot(PlayerPose::new(center(10), center(10), 0));
        assert!(r.fired());
        assert!(r.hits.is_empty());
        assert_eq!(b.projectiles.iter().count(), 1);
        assert_eq!(b.stats.rockets, 1);
    }

    #[test]
    fn gunfire_wakes_idle_enemies() {
        let mut b = Bench::new();
        b.enemies.spawn(Archetype::Imp, center(20), center(10), 512);
        b.shoot(PlayerPose::new(center(15), center(10), 768));
        assert_eq!(b.enemies.get(0).map(|e| e.state), Some(crate::enemy::EnemyState::Walk));
    }
}
