//! Puertas e interruptores.
//! Único escritor de la rejilla durante la partida: una puerta abierta del todo deja
//! su tile a 0 y lo restaura en cuanto empieza a cerrarse.

use bitflags::bitflags;
use log::{debug, warn};
use serde::Deserialize;

use crate::event::{GameEvent, SoundCue};
use crate::fixed;
use crate::map::{self, TileGrid};
use crate::player::PlayerPose;

pub const MAX_DOORS: usize = 24;
pub const MAX_SWITCHES: usize = 4;
/// Incremento de apertura por tick.
pub const OPEN_SPEED: u8 = 4;
/// Abierta del todo (altura de textura completa).
pub const OPEN_MAX: u8 = 64;
/// Ticks abierta antes de cerrarse sola (5 s a 20 fps).
pub const STAY_TIME: u8 = 100;

bitflags! {
    /// Llaves recogidas por el jugador.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyFlags: u8 {
        const RED    = 0b001;
        const YELLOW = 0b010;
        const BLUE   = 0b100;
    }
}

impl KeyFlags {
    /// Llave que exige un tile de puerta; `None` si se abre sin llave.
    pub fn required_by(tile: u8) -> Option<KeyFlags> {
        match tile {
            map::KEY_DOOR_RED => Some(KeyFlags::RED),
            map::KEY_DOOR_YELLOW => Some(KeyFlags::YELLOW),
            map::KEY_DOOR_BLUE => Some(KeyFlags::BLUE),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    pub tile_x: i32,
    pub tile_y: i32,
    pub state: DoorState,
    /// 0 cerrada, OPEN_MAX abierta.
    pub open_amount: u8,
    /// Cuenta atrás del cierre automático.
    pub timer: u8,
    /// Valor del tile cuando está cerrada (puerta, secreta o de llave).
    pub original_tile: u8,
    /// Secreta ya descubierta: solo cuenta la primera apertura.
    pub discovered: bool,
}

impl Door {
    pub fn is_secret(&self) -> bool {
        (map::SECRET_FIRST..=map::SECRET_LAST).contains(&self.original_tile)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    /// Acciona una puerta enlazada.
    Door,
    /// Termina el nivel.
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switch {
    pub tile_x: i32,
    pub tile_y: i32,
    pub kind: SwitchKind,
    pub linked_door: usize,
    pub activated: bool,
}

/// Resultado de pulsar "usar".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivateResult {
    Nothing,
    Activated,
    /// Pared normal o puerta de llave sin llave.
    Blocked,
}

#[derive(Clone, Debug, Default)]
pub struct DoorSystem {
    doors: Vec<Door>,
    switches: Vec<Switch>,
    level_complete: bool,
    secrets_found: u8,
}

impl DoorSystem {
    pub fn new() -> Self {
        Self {
            doors: Vec::with_capacity(MAX_DOORS),
            switches: Vec::with_capacity(MAX_SWITCHES),
            level_complete: false,
            secrets_found: 0,
        }
    }

    pub fn reset(&mut self) {
        self.doors.clear();
        self.switches.clear();
        self.level_complete = false;
        self.secrets_found = 0;
    }

    /// Registra la puerta en (tx, ty). Fuera de capacidad no hace nada.
    pub fn register_door(&mut self, grid: &TileGrid, tx: i32, ty: i32) -> Option<usize> {
        if self.doors.len() >= MAX_DOORS {
            warn!("puerta en ({tx}, {ty}) ignorada: ya hay {MAX_DOORS}");
            return None;
        }
        let original_tile = match grid.cell_id(tx, ty) {
            Some(id) if map::is_door_tile(id) => id,
            other => {
                warn!("puerta en ({tx}, {ty}) sobre tile {other:?}; se usa tile de puerta");
                map::DOOR
            }
        };
        self.doors.push(Door {
            tile_x: tx,
            tile_y: ty,
            state: DoorState::Closed,
            open_amount: 0,
            timer: 0,
            original_tile,
            discovered: false,
        });
        Some(self.doors.len() - 1)
    }

    pub fn register_switch(&mut self, tx: i32, ty: i32, kind: SwitchKind, linked_door: usize) -> Option<usize> {
        if self.switches.len() >= MAX_SWITCHES {
            warn!("interruptor en ({tx}, {ty}) ignorado: ya hay {MAX_SWITCHES}");
            return None;
        }
        self.switches.push(Switch { tile_x: tx, tile_y: ty, kind, linked_door, activated: false });
        Some(self.switches.len() - 1)
    }

    pub fn doors(&self) -> &[Door] { &self.doors }
    pub fn switches(&self) -> &[Switch] { &self.switches }
    pub fn level_complete(&self) -> bool { self.level_complete }
    pub fn secret_doors(&self) -> usize { self.doors.iter().filter(|d| d.is_secret()).count() }
    /// Puertas secretas abiertas al menos una vez.
    pub fn secrets_found(&self) -> u8 { self.secrets_found }

    pub fn find_door_at(&self, tx: i32, ty: i32) -> Option<usize> {
        self.doors.iter().position(|d| d.tile_x == tx && d.tile_y == ty)
    }

    pub fn find_switch_at(&self, tx: i32, ty: i32) -> Option<usize> {
        self.switches.iter().position(|s| s.tile_x == tx && s.tile_y == ty)
    }

    /// Apertura de la puerta en ese tile (0 si no hay puerta).
    pub fn open_amount(&self, tx: i32, ty: i32) -> u8 {
        self.find_door_at(tx, ty).map(|i| self.doors[i].open_amount).unwrap_or(0)
    }

    /// Un tick de animación de todas las puertas.
    pub fn update(&mut self, grid: &mut TileGrid, player_tile: Option<(i32, i32)>, events: &mut Vec<GameEvent>) {
        for (i, d) in self.doors.iter_mut().enumerate() {
            match d.state {
                DoorState::Closed => {}
                DoorState::Opening => {
                    d.open_amount = d.open_amount.saturating_add(OPEN_SPEED).min(OPEN_MAX);
                    if d.open_amount == OPEN_MAX {
                        d.state = DoorState::Open;
                        d.timer = STAY_TIME;
                        grid.set(d.tile_x, d.tile_y, map::EMPTY);
                        debug!("puerta {i} abierta");
                    }
                }
                DoorState::Open => {
                    if d.timer > 0 {
                        d.timer -= 1;
                    } else if player_tile == Some((d.tile_x, d.tile_y)) {
                        // no se cierra encima del jugador
                        d.timer = STAY_TIME;
                    } else {
                        d.state = DoorState::Closing;
                        grid.set(d.tile_x, d.tile_y, d.original_tile);
                        events.push(GameEvent::sound(SoundCue::DoorClose));
                        debug!("puerta {i} cerrándose");
                    }
                }
                DoorState::Closing => {
                    d.open_amount = d.open_amount.saturating_sub(OPEN_SPEED);
                    if d.open_amount == 0 {
                        d.state = DoorState::Closed;
                    }
                }
            }
        }
    }

    /// Abre si está cerrada o cerrándose; cierra si está abriéndose o abierta.
    /// Devuelve false si no existe o si el jugador ocupa el hueco de una puerta abierta.
    pub fn toggle(&mut self, index: usize, grid: &mut TileGrid, player_tile: Option<(i32, i32)>, events: &mut Vec<GameEvent>) -> bool {
        let Some(d) = self.doors.get_mut(index) else { return false; };
        match d.state {
            DoorState::Closed | DoorState::Closing => {
                d.state = DoorState::Opening;
                events.push(GameEvent::sound(SoundCue::DoorOpen));
                if d.is_secret() && !d.discovered {
                    d.discovered = true;
                    self.secrets_found += 1;
                    events.push(GameEvent::SecretFound);
                    debug!("puerta secreta {index} descubierta");
                }
            }
            DoorState::Opening => {
                d.state = DoorState::Closing;
                events.push(GameEvent::sound(SoundCue::DoorClose));
            }
            DoorState::Open => {
                if player_tile == Some((d.tile_x, d.tile_y)) { return false; }
                d.state = DoorState::Closing;
                grid.set(d.tile_x, d.tile_y, d.original_tile);
                events.push(GameEvent::sound(SoundCue::DoorClose));
            }
        }
        debug!("puerta {index} -> {:?}", d.state);
        true
    }

    /// Interruptor de un solo uso. Devuelve true solo la primera vez.
    pub fn activate_switch(&mut self, index: usize, grid: &mut TileGrid, player_tile: Option<(i32, i32)>, events: &mut Vec<GameEvent>) -> bool {
        let Some(s) = self.switches.get_mut(index) else { return false; };
        if s.activated { return false; }
        s.activated = true;
        let (kind, linked) = (s.kind, s.linked_door);
        events.push(GameEvent::sound(SoundCue::SwitchOn));
        match kind {
            SwitchKind::Door => {
                if linked < self.doors.len() {
                    self.toggle(linked, grid, player_tile, events);
                }
            }
            SwitchKind::Exit => {
                self.level_complete = true;
                events.push(GameEvent::LevelComplete);
                debug!("interruptor de salida: nivel completado");
            }
        }
        true
    }

    /// Resuelve "usar" buscando puertas e interruptores en orden de prioridad alrededor del jugador.
    pub fn player_activate(&mut self, grid: &mut TileGrid, pose: &PlayerPose, keys: KeyFlags, events: &mut Vec<GameEvent>) -> ActivateResult {
        let own = pose.tile();
        for (tx, ty) in activation_candidates(pose) {
            if let Some(i) = self.find_door_at(tx, ty) {
                if let Some(key) = KeyFlags::required_by(self.doors[i].original_tile) {
                    if !keys.contains(key) {
                        events.push(GameEvent::MissingKey(key));
                        events.push(GameEvent::sound(SoundCue::Umf));
                        return ActivateResult::Blocked;
                    }
                }
                return if self.toggle(i, grid, Some(own), events) { ActivateResult::Activated } else { ActivateResult::Blocked };
            }
            if let Some(i) = self.find_switch_at(tx, ty) {
                self.activate_switch(i, grid, Some(own), events);
                return ActivateResult::Activated;
            }
        }

        let (ax, ay) = ahead_tile(pose, 1);
        if grid.is_wall(ax, ay) {
            events.push(GameEvent::sound(SoundCue::Umf));
            return ActivateResult::Blocked;
        }
        ActivateResult::Nothing
    }
}

fn ahead_tile(pose: &PlayerPose, tiles: i32) -> (i32, i32) {
    offset_tile(pose, pose.angle as i32, tiles)
}

fn offset_tile(pose: &PlayerPose, angle: i32, tiles: i32) -> (i32, i32) {
    (
        (pose.x as i32 + fixed::sin(angle) * tiles) >> 8,
        (pose.y as i32 + fixed::cos(angle) * tiles) >> 8,
    )
}

/// Orden de búsqueda: delante, dos delante, izquierda/derecha, 4 vecinos, 8 vecinos, el propio tile.
pub fn activation_candidates(pose: &PlayerPose) -> Vec<(i32, i32)> {
    let (px, py) = pose.tile();
    let a = pose.angle as i32;
    let mut out = vec![
        ahead_tile(pose, 1),
        ahead_tile(pose, 2),
        offset_tile(pose, a - fixed::QUARTER_TURN, 1),
        offset_tile(pose, a + fixed::QUARTER_TURN, 1),
        (px + 1, py),
        (px - 1, py),
        (px, py + 1),
        (px, py - 1),
        (px + 1, py + 1),
        (px - 1, py + 1),
        (px + 1, py - 1),
        (px - 1, py - 1),
        (px, py),
    ];
    let mut seen = Vec::with_capacity(out.len());
    out.retain(|t| {
        if seen.contains(t) { return false; }
        seen.push(*t);
        true
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(t: i32) -> u16 { (t * 256 + 128) as u16 }

    fn corridor_with_door() -> (TileGrid, DoorSystem) {
        let mut g = TileGrid::new();
        g.set(10, 12, map::DOOR);
        let mut d = DoorSystem::new();
        d.register_door(&g, 10, 12);
        (g, d)
    }

    #[test]
    fn opening_advances_by_speed_and_clears_tile() {
        let (mut g, mut d) = corridor_with_door();
        let mut ev = Vec::new();
        assert!(d.toggle(0, &mut g, None, &mut ev));
        for n in 1..=16u8 {
            d.update(&mut g, None, &mut ev);
            assert_eq!(d.doors()[0].open_amount, (n * OPEN_SPEED).min(OPEN_MAX));
            assert_eq!(g.cell_id(10, 12) == Some(map::EMPTY), d.doors()[0].state == DoorState::Open);
        }
        assert_eq!(d.doors()[0].state, DoorState::Open);
        assert_eq!(d.doors()[0].timer, STAY_TIME);
    }

    #[test]
    fn closes_only_when_doorway_is_free() {
        let (mut g, mut d) = corridor_with_door();
        let mut ev = Vec::new();
        d.toggle(0, &mut g, None, &mut ev);
        for _ in 0..16 + STAY_TIME as usize {
            d.update(&mut g, None, &mut ev);
        }
        assert_eq!(d.doors()[0].timer, 0);
        d.update(&mut g, Some((10, 12)), &mut ev);
        assert_eq!(d.doors()[0].state, DoorState::Open);
        assert_eq!(d.doors()[0].timer, STAY_TIME);
        for _ in 0..STAY_TIME {
            d.update(&mut g, None, &mut ev);
        }
        d.update(&mut g, None, &mut ev);
        assert_eq!(d.doors()[0].state, DoorState::Closing);
        assert_eq!(g.cell_id(10, 12), Some(map::DOOR));
    }

    #[test]
    fn toggle_reverses_motion() {
        let (mut g, mut d) = corridor_with_door();
        let mut ev = Vec::new();
        d.toggle(0, &mut g, None, &mut ev);
        d.update(&mut g, None, &mut ev);
        d.update(&mut g, None, &mut ev);
        d.toggle(0, &mut g, None, &mut ev);
        assert_eq!(d.doors()[0].state, DoorState::Closing);
        d.update(&mut g, None, &mut ev);
        assert_eq!(d.doors()[0].open_amount, 4);
        d.toggle(0, &mut g, None, &mut ev);
        assert_eq!(d.doors()[0].state, DoorState::Opening);
        assert_eq!(g.cell_id(10, 12), Some(map::DOOR));
    }

    #[test]
    fn closing_an_open_door_restores_tile_at_once() {
        let (mut g, mut d) = corridor_with_door();
        let mut ev = Vec::new();
        d.toggle(0, &mut g, None, &mut ev);
        for _ in 0..16 {
            d.update(&mut g, None, &mut ev);
        }
        assert_eq!(g.cell_id(10, 12), Some(map::EMPTY));
        assert!(!d.toggle(0, &mut g, Some((10, 12)), &mut ev));
        assert!(d.toggle(0, &mut g, Some((10, 11)), &mut ev));
        assert_eq!(d.doors()[0].state, DoorState::Closing);
        assert_eq!(g.cell_id(10, 12), Some(map::DOOR));
        assert_eq!(d.open_amount(10, 12), OPEN_MAX);
    }

    #[test]
    fn registration_beyond_capacity_is_ignored() {
        let mut g = TileGrid::new();
        let mut d = DoorSystem::new();
        for i in 0..MAX_DOORS as i32 + 3 {
            g.set(i, 1, map::DOOR);
            d.register_door(&g, i, 1);
        }
        assert_eq!(d.doors().len(), MAX_DOORS);
        for i in 0..6 {
            d.register_switch(i, 3, SwitchKind::Exit, 0);
        }
        assert_eq!(d.switches().len(), MAX_SWITCHES);
    }

    #[test]
    fn secret_door_keeps_its_tile() {
        let mut g = TileGrid::new();
        g.set(3, 3, 7);
        let mut d = DoorSystem::new();
        d.register_door(&g, 3, 3);
        assert_eq!(d.doors()[0].original_tile, 7);
    }

    #[test]
    fn secret_door_counts_on_first_opening_only() {
        let mut g = TileGrid::new();
        g.set(3, 3, map::SECRET_FIRST);
        g.set(5, 3, map::DOOR);
        let mut d = DoorSystem::new();
        d.register_door(&g, 3, 3);
        d.register_door(&g, 5, 3);
        assert_eq!(d.secret_doors(), 1);
        let mut ev = Vec::new();

        d.toggle(1, &mut g, None, &mut ev);
        assert_eq!(d.secrets_found(), 0);
        assert!(!ev.contains(&GameEvent::SecretFound));

        d.toggle(0, &mut g, None, &mut ev);
        assert_eq!(d.secrets_found(), 1);
        assert_eq!(ev.iter().filter(|e| **e == GameEvent::SecretFound).count(), 1);
        // cerrar y volver a abrir no suma
        d.toggle(0, &mut g, None, &mut ev);
        d.toggle(0, &mut g, None, &mut ev);
        assert_eq!(d.doors()[0].state, DoorState::Opening);
        assert_eq!(d.secrets_found(), 1);
        assert_eq!(ev.iter().filter(|e| **e == GameEvent::SecretFound).count(), 1);
    }

    #[test]
    fn switches_fire_once() {
        let (mut g, mut d) = corridor_with_door();
        d.register_switch(5, 5, SwitchKind::Door, 0);
        d.register_switch(6, 6, SwitchKind::Exit, 0);
        let mut ev = Vec::new();
        assert!(d.activate_switch(0, &mut g, None, &mut ev));
        assert_eq!(d.doors()[0].state, DoorState::Opening);
        assert!(!d.activate_switch(0, &mut g, None, &mut ev));
        assert_eq!(d.doors()[0].state, DoorState::Opening);
        assert!(!d.level_complete());
        assert!(d.activate_switch(1, &mut g, None, &mut ev));
        assert!(d.level_complete());
        assert!(ev.contains(&GameEvent::LevelComplete));
    }

    #[test]
    fn activate_prefers_tile_ahead() {
        let (mut g, mut d) = corridor_with_door();
        g.set(11, 11, map::SWITCH);
        d.register_switch(11, 11, SwitchKind::Exit, 0);
        // mirando a +Y desde (10, 11): la puerta está delante y el interruptor al lado
        let pose = PlayerPose::new(center(10), center(11), 0);
        let mut ev = Vec::new();
        assert_eq!(d.player_activate(&mut g, &pose, KeyFlags::empty(), &mut ev), ActivateResult::Activated);
        assert_eq!(d.doors()[0].state, DoorState::Opening);
        assert!(!d.level_complete());
    }

    #[test]
    fn key_door_needs_key() {
        let mut g = TileGrid::new();
        g.set(10, 12, map::KEY_DOOR_BLUE);
        let mut d = DoorSystem::new();
        d.register_door(&g, 10, 12);
        let pose = PlayerPose::new(center(10), center(11), 0);
        let mut ev = Vec::new();
        assert_eq!(d.player_activate(&mut g, &pose, KeyFlags::RED, &mut ev), ActivateResult::Blocked);
        assert!(ev.contains(&GameEvent::MissingKey(KeyFlags::BLUE)));
        assert_eq!(d.doors()[0].state, DoorState::Closed);
        assert_eq!(d.player_activate(&mut g, &pose, KeyFlags::RED | KeyFlags::BLUE, &mut ev), ActivateResult::Activated);
    }

    #[test]
    fn plain_wall_blocks_open_floor_does_nothing() {
        let mut g = TileGrid::new();
        let mut d = DoorSystem::new();
        let mut ev = Vec::new();
        let pose = PlayerPose::new(center(20), center(20), 256);
        assert_eq!(d.player_activate(&mut g, &pose, KeyFlags::empty(), &mut ev), ActivateResult::Nothing);
        g.set(21, 20, map::WALL_STONE);
        assert_eq!(d.player_activate(&mut g, &pose, KeyFlags::empty(), &mut ev), ActivateResult::Blocked);
        assert_eq!(ev.last(), Some(&GameEvent::sound(SoundCue::Umf)));
    }

    #[test]
    fn candidate_order() {
        let pose = PlayerPose::new(center(10), center(10), 0);
        let c = activation_candidates(&pose);
        assert_eq!(&c[..4], &[(10, 11), (10, 12), (9, 10), (11, 10)]);
        assert_eq!(c.last(), Some(&(10, 10)));
        assert_eq!(c.len(), 10);
    }
}
