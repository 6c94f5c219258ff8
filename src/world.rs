//! El mundo: dueño único de la rejilla y de todas las entidades.
//!
//! Orden de un tick: entrada del jugador (con teletransportes y sectores secretos),
//! puertas, enemigos, proyectiles, efectos y recogida de objetos. `trace_frame` escribe el búfer de profundidad entero antes
//! de proyectar un solo sprite.

use log::{debug, info};

use crate::combat::{player_shoot, ShotContext, ShotReport};
use crate::depth::DepthOcclusionBuffer;
use crate::door::{ActivateResult, DoorSystem};
use crate::enemy::{Enemies, EnemyContext};
use crate::error::LevelError;
use crate::event::{GameEvent, SoundCue};
use crate::level::{tile_center, LevelDesc, TeleportDesc, TilePos};
use crate::map::TileGrid;
use crate::particle::Particles;
use crate::pickup::Pickups;
use crate::player::{PlayerPose, PlayerStats, Weapon, MOVE_SPEED, PLAYER_RADIUS};
use crate::projectile::{Impact, ProjectileState, Projectiles};
use crate::raycaster::{trace_view, ColumnTrace};
use crate::rng::GameRng;
use crate::sprite::{project_scene, Scene, SpriteDraw};
use crate::teleport::TeleportFogs;

/// Entrada de un tick. `forward` y `strafe` en -1..=1, `turn` en unidades de ángulo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    pub forward: i32,
    pub strafe: i32,
    pub turn: i32,
    pub fire: bool,
    pub activate: bool,
    pub select: Option<Weapon>,
}

/// Todo lo que el vídeo necesita para pintar un frame.
#[derive(Clone, Debug)]
pub struct Frame {
    pub columns: Vec<ColumnTrace>,
    pub depth: DepthOcclusionBuffer,
    pub sprites: Vec<SpriteDraw>,
}

#[derive(Clone, Debug)]
pub struct World {
    level_name: String,
    grid: TileGrid,
    doors: DoorSystem,
    enemies: Enemies,
    projectiles: Projectiles,
    particles: Particles,
    teleport_fogs: TeleportFogs,
    pickups: Pickups,
    teleports: Vec<TeleportDesc>,
    /// Sectores secretos y si ya se pisaron.
    secrets: Vec<(TilePos, bool)>,
    pose: PlayerPose,
    stats: PlayerStats,
    rng: GameRng,
    events: Vec<GameEvent>,
    frame: u32,
    refire: u8,
    total_enemies: usize,
    second_player: Option<PlayerPose>,
}

impl World {
    pub fn from_level(level: &LevelDesc, seed: u64) -> Result<Self, LevelError> {
        let grid = level.grid()?;
        let mut doors = DoorSystem::new();
        for d in &level.doors {
            doors.register_door(&grid, d.x, d.y);
        }
        for s in &level.switches {
            doors.register_switch(s.x, s.y, s.kind, s.door);
        }
        let mut enemies = Enemies::new();
        for e in &level.enemies {
            enemies.spawn(e.archetype, tile_center(e.x), tile_center(e.y), e.angle);
        }
        let mut pickups = Pickups::new();
        for p in &level.pickups {
            pickups.spawn(p.kind, tile_center(p.x), tile_center(p.y));
        }
        let pose = PlayerPose::new(tile_center(level.spawn.x), tile_center(level.spawn.y), level.spawn.angle);
        info!("{}: {} enemigos, jugador en ({}, {})", level.name, enemies.len(), level.spawn.x, level.spawn.y);

        Ok(Self {
            level_name: level.name.clone(),
            grid,
            doors,
            total_enemies: enemies.len(),
            enemies,
            projectiles: Projectiles::new(),
            particles: Particles::new(),
            teleport_fogs: TeleportFogs::new(),
            pickups,
            teleports: level.teleports.clone(),
            secrets: level.secrets.iter().map(|&t| (t, false)).collect(),
            pose,
            stats: PlayerStats::default(),
            rng: GameRng::seeded(seed),
            events: Vec::new(),
            frame: 0,
            refire: 0,
            second_player: None,
        })
    }

    pub fn level_name(&self) -> &str { &self.level_name }
    pub fn grid(&self) -> &TileGrid { &self.grid }
    pub fn doors(&self) -> &DoorSystem { &self.doors }
    pub fn enemies(&self) -> &Enemies { &self.enemies }
    pub fn projectiles(&self) -> &Projectiles { &self.projectiles }
    pub fn particles(&self) -> &Particles { &self.particles }
    pub fn teleport_fogs(&self) -> &TeleportFogs { &self.teleport_fogs }
    pub fn pickups(&self) -> &Pickups { &self.pickups }
    pub fn pose(&self) -> &PlayerPose { &self.pose }
    pub fn stats(&self) -> &PlayerStats { &self.stats }
    pub fn stats_mut(&mut self) -> &mut PlayerStats { &mut self.stats }
    pub fn frame(&self) -> u32 { self.frame }
    pub fn kills(&self) -> u16 { self.enemies.kills() }
    pub fn total_enemies(&self) -> usize { self.total_enemies }
    pub fn level_complete(&self) -> bool { self.doors.level_complete() }

    /// Sectores pisados más puertas secretas abiertas.
    pub fn secrets_found(&self) -> usize {
        self.secrets.iter().filter(|(_, found)| *found).count() + self.doors.secrets_found() as usize
    }

    pub fn secrets_total(&self) -> usize {
        self.secrets.len() + self.doors.secret_doors()
    }

    /// Coloca al jugador sin comprobar colisiones.
    pub fn set_pose(&mut self, pose: PlayerPose) {
        self.pose = pose;
    }

    /// Posición del segundo jugador, dibujado como un sprite más.
    pub fn set_second_player(&mut self, pose: Option<PlayerPose>) {
        self.second_player = pose;
    }

    /// Eventos acumulados desde la última llamada.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn player_shoot(&mut self) -> ShotReport {
        let mut ctx = ShotContext {
            grid: &self.grid,
            pose: self.pose,
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

    pub fn player_activate(&mut self) -> ActivateResult {
        if self.stats.is_dead() { return ActivateResult::Nothing; }
        self.doors.player_activate(&mut self.grid, &self.pose, self.stats.keys, &mut self.events)
    }

    pub fn update_doors(&mut self) {
        let player_tile = Some(self.pose.tile());
        self.doors.update(&mut self.grid, player_tile, &mut self.events);
    }

    pub fn update_enemies(&mut self) {
        let mut ctx = EnemyContext {
            grid: &self.grid,
            player: self.pose,
            rng: &mut self.rng,
            projectiles: &mut self.projectiles,
            events: &mut self.events,
            frame: self.frame,
        };
        let damage = self.enemies.update(&mut ctx);
        self.hurt_player(damage);
    }

    pub fn update_projectiles(&mut self) {
        let exploding = |p: &Projectiles| p.iter().filter(|q| q.state == ProjectileState::Exploding).count();
        let before = exploding(&self.projectiles);
        let live = self.enemies.live_positions();
        let impacts = self.projectiles.update(&self.grid, (self.pose.x, self.pose.y), &live, &mut self.rng);
        if exploding(&self.projectiles) > before {
            self.events.push(GameEvent::sound(SoundCue::Explosion));
        }
        for impact in impacts {
            match impact {
                Impact::Player { damage } => self.hurt_player(damage as u16),
                Impact::Enemy { index, damage } => {
                    self.enemies.damage(index, damage, (self.pose.x, self.pose.y), &mut self.rng, &mut self.pickups, &mut self.events);
                }
            }
        }
    }

    pub fn update_particles(&mut self) {
        self.particles.update();
        self.teleport_fogs.update();
    }

    pub fn collect_pickups(&mut self) -> usize {
        if self.stats.is_dead() { return 0; }
        self.pickups.collect(self.pose.x, self.pose.y, &mut self.stats, &mut self.events)
    }

    fn hurt_player(&mut self, amount: u16) {
        if amount == 0 || self.stats.is_dead() { return; }
        let lost = self.stats.take_damage(amount.min(u8::MAX as u16) as u8);
        self.events.push(GameEvent::PlayerDamaged { amount: lost, health: self.stats.health });
        self.events.push(GameEvent::sound(SoundCue::PlayerPain));
        if self.stats.is_dead() {
            info!("jugador muerto en el tick {}", self.frame);
        }
    }

    fn move_player(&mut self, input: &TickInput) {
        let enemies = &self.enemies;
        let blocked = |x: i32, y: i32| enemies.blocks(x, y, PLAYER_RADIUS);
        if input.turn != 0 {
            self.pose.turn(input.turn);
        }
        if input.forward != 0 {
            self.pose.move_forward(&self.grid, input.forward.signum() * MOVE_SPEED, blocked);
        }
        if input.strafe != 0 {
            self.pose.strafe(&self.grid, input.strafe.signum() * MOVE_SPEED, blocked);
        }
    }

    /// Al entrar en una casilla de teletransporte el jugador salta a su destino,
    /// salvo que un enemigo lo ocupe. Deja niebla en los dos extremos.
    fn check_teleport(&mut self, from: (i32, i32)) {
        let here = self.pose.tile();
        if here == from { return; }
        let Some(t) = self.teleports.iter().find(|t| (t.x, t.y) == here).copied() else { return; };
        let (x, y) = (tile_center(t.to.x), tile_center(t.to.y));
        if self.enemies.blocks(x as i32, y as i32, PLAYER_RADIUS) {
            debug!("teletransporte a ({}, {}) ocupado", t.to.x, t.to.y);
            return;
        }
        self.teleport_fogs.spawn(self.pose.x, self.pose.y);
        self.pose = PlayerPose::new(x, y, t.to.angle);
        self.teleport_fogs.spawn(x, y);
        self.events.push(GameEvent::sound(SoundCue::Teleport));
        debug!("teletransporte de {here:?} a ({}, {})", t.to.x, t.to.y);
    }

    fn check_secrets(&mut self) {
        let here = self.pose.tile();
        for (tile, found) in self.secrets.iter_mut() {
            if !*found && (tile.x, tile.y) == here {
                *found = true;
                self.events.push(GameEvent::SecretFound);
                info!("secreto en ({}, {})", tile.x, tile.y);
            }
        }
    }

    /// Un paso completo de simulación. Devuelve los eventos del tick.
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        self.frame = self.frame.wrapping_add(1);
        self.refire = self.refire.saturating_sub(1);

        if !self.stats.is_dead() {
            if let Some(w) = input.select {
                if self.stats.select(w) {
                    debug!("arma {w:?}");
                }
            }
            let from = self.pose.tile();
            self.move_player(input);
            self.check_teleport(from);
            self.check_secrets();
            if input.activate {
                self.player_activate();
            }
            if input.fire && self.refire == 0 {
                let weapon = self.stats.weapon;
                if self.player_shoot().fired() {
                    self.refire = weapon.refire_ticks();
                }
            }
        }

        self.update_doors();
        self.update_enemies();
        self.update_projectiles();
        self.update_particles();
        self.collect_pickups();
        self.drain_events()
    }

    /// Raycast de las 48 columnas y proyección de sprites sobre el búfer resultante.
    pub fn trace_frame(&self) -> Frame {
        let mut depth = DepthOcclusionBuffer::new();
        let columns = trace_view(&self.grid, &self.doors, &self.pose, &mut depth);
        let sprites = project_scene(&Scene {
            pose: &self.pose,
            depth: &depth,
            enemies: &self.enemies,
            pickups: &self.pickups,
            projectiles: &self.projectiles,
            particles: &self.particles,
            teleport_fogs: &self.teleport_fogs,
            second_player: self.second_player,
        });
        Frame { columns, depth, sprites }
    }
}
