//! Estado y movimiento del jugador.
//! Posición en 8.8 (byte alto = tile), ángulo en 1/1024 de vuelta (0 mira a +Y).
//! El movimiento prueba el tile destino y los dos adyacentes por eje, y desliza
//! por X o por Y cuando la diagonal está bloqueada.

use crate::door::KeyFlags;
use crate::fixed;
use crate::map::{TileGrid, HEIGHT, WIDTH};

/// Semiancho de la caja de colisión del jugador.
pub const PLAYER_RADIUS: i32 = 48;
/// Avance por tick al andar; al correr se dobla.
pub const MOVE_SPEED: i32 = 40;
pub const TURN_SPEED: i32 = 24;

pub const MAX_HEALTH: u8 = 100;
pub const MAX_ARMOR: u16 = 200;
pub const MAX_BULLETS: u16 = 200;
pub const MAX_SHELLS: u16 = 50;
pub const MAX_ROCKETS: u16 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerPose {
    pub x: u16,
    pub y: u16,
    pub angle: u16,
}

impl PlayerPose {
    pub fn new(x: u16, y: u16, angle: u16) -> Self {
        Self { x, y, angle: fixed::wrap_angle(angle as i32) }
    }

    pub fn tile(&self) -> (i32, i32) {
        ((self.x >> 8) as i32, (self.y >> 8) as i32)
    }

    pub fn turn(&mut self, delta: i32) {
        self.angle = fixed::wrap_angle(self.angle as i32 + delta);
    }

    /// Avanza `speed` unidades (negativo = retrocede). `blocked(x, y)` rechaza
    /// posiciones ocupadas por entidades. Devuelve true si se movió en algún eje.
    pub fn move_forward(&mut self, grid: &TileGrid, speed: i32, blocked: impl Fn(i32, i32) -> bool) -> bool {
        self.move_along(grid, self.angle as i32, speed, blocked)
    }

    /// Desplazamiento lateral: positivo a la derecha.
    pub fn strafe(&mut self, grid: &TileGrid, speed: i32, blocked: impl Fn(i32, i32) -> bool) -> bool {
        self.move_along(grid, self.angle as i32 + fixed::QUARTER_TURN, speed, blocked)
    }

    fn move_along(&mut self, grid: &TileGrid, angle: i32, speed: i32, blocked: impl Fn(i32, i32) -> bool) -> bool {
        let (x, y) = (self.x as i32, self.y as i32);
        let limit_x = (WIDTH as i32) * 256 - 1;
        let limit_y = (HEIGHT as i32) * 256 - 1;
        let nx = (x + ((fixed::sin(angle) * speed) >> 8)).clamp(0, limit_x);
        let ny = (y + ((fixed::cos(angle) * speed) >> 8)).clamp(0, limit_y);

        let (prev_tx, prev_ty) = (x >> 8, y >> 8);
        let (tx, ty) = (nx >> 8, ny >> 8);

        let wall = grid.is_wall(tx, ty) || grid.is_wall(prev_tx, ty) || grid.is_wall(tx, prev_ty);
        if !wall && !blocked(nx, ny) {
            self.x = nx as u16;
            self.y = ny as u16;
            return true;
        }
        // deslizar
        if !grid.is_wall(tx, prev_ty) && !blocked(nx, y) {
            self.x = nx as u16;
            return nx != x;
        }
        if !grid.is_wall(prev_tx, ty) && !blocked(x, ny) {
            self.y = ny as u16;
            return ny != y;
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Weapon {
    Fist,
    Pistol,
    Shotgun,
    Chaingun,
    RocketLauncher,
}

impl Weapon {
    pub const ALL: [Weapon; 5] = [Weapon::Fist, Weapon::Pistol, Weapon::Shotgun, Weapon::Chaingun, Weapon::RocketLauncher];

    fn slot(self) -> usize {
        self as usize
    }

    /// Ticks entre disparos con el gatillo pulsado.
    pub fn refire_ticks(self) -> u8 {
        match self {
            Weapon::Chaingun => 2,
            Weapon::Fist | Weapon::Pistol => 4,
            Weapon::Shotgun => 8,
            Weapon::RocketLauncher => 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmmoKind {
    Bullets,
    Shells,
    Rockets,
}

impl Weapon {
    /// Pistola y ametralladora comparten balas; el puño no gasta.
    pub fn ammo_kind(self) -> Option<AmmoKind> {
        match self {
            Weapon::Fist => None,
            Weapon::Pistol | Weapon::Chaingun => Some(AmmoKind::Bullets),
            Weapon::Shotgun => Some(AmmoKind::Shells),
            Weapon::RocketLauncher => Some(AmmoKind::Rockets),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerStats {
    pub health: u8,
    /// La armadura absorbe un tercio del daño mientras quede.
    pub armor: u16,
    pub bullets: u16,
    pub shells: u16,
    pub rockets: u16,
    pub weapon: Weapon,
    pub keys: KeyFlags,
    owned: [bool; 5],
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            armor: 0,
            bullets: 50,
            shells: 0,
            rockets: 0,
            weapon: Weapon::Pistol,
            keys: KeyFlags::empty(),
            owned: [true, true, false, false, false],
        }
    }
}

impl PlayerStats {
    pub fn is_dead(&self) -> bool { self.health == 0 }

    pub fn has_weapon(&self, w: Weapon) -> bool { self.owned[w.slot()] }

    /// Devuelve true si el arma es nueva.
    pub fn give_weapon(&mut self, w: Weapon) -> bool {
        let new = !self.owned[w.slot()];
        self.owned[w.slot()] = true;
        new
    }

    pub fn select(&mut self, w: Weapon) -> bool {
        if !self.has_weapon(w) { return false; }
        self.weapon = w;
        true
    }

    pub fn ammo(&self, kind: AmmoKind) -> u16 {
        match kind {
            AmmoKind::Bullets => self.bullets,
            AmmoKind::Shells => self.shells,
            AmmoKind::Rockets => self.rockets,
        }
    }

    /// Suma munición con su tope. Devuelve lo que realmente entró.
    pub fn add_ammo(&mut self, kind: AmmoKind, amount: u16) -> u16 {
        let (slot, cap) = match kind {
            AmmoKind::Bullets => (&mut self.bullets, MAX_BULLETS),
            AmmoKind::Shells => (&mut self.shells, MAX_SHELLS),
            AmmoKind::Rockets => (&mut self.rockets, MAX_ROCKETS),
        };
        let before = *slot;
        *slot = slot.saturating_add(amount).min(cap);
        *slot - before
    }

    /// Gasta una unidad del arma actual. `false` si está vacía.
    pub fn consume_ammo(&mut self) -> bool {
        let Some(kind) = self.weapon.ammo_kind() else { return true; };
        let slot = match kind {
            AmmoKind::Bullets => &mut self.bullets,
            AmmoKind::Shells => &mut self.shells,
            AmmoKind::Rockets => &mut self.rockets,
        };
        if *slot == 0 { return false; }
        *slot -= 1;
        true
    }

    /// Mejor arma con munición, de más a menos potente.
    pub fn best_loaded_weapon(&self) -> Weapon {
        [Weapon::Chaingun, Weapon::Shotgun, Weapon::Pistol]
            .into_iter()
            .find(|&w| self.has_weapon(w) && w.ammo_kind().map(|k| self.ammo(k) > 0).unwrap_or(true))
            .unwrap_or(Weapon::Fist)
    }

    /// Aplica daño con absorción de armadura. Devuelve la vida perdida.
    pub fn take_damage(&mut self, amount: u8) -> u8 {
        let mut dmg = amount as u16;
        if self.armor > 0 {
            let absorbed = (dmg / 3).min(self.armor);
            self.armor -= absorbed;
            dmg -= absorbed;
        }
        let lost = dmg.min(self.health as u16) as u8;
        self.health -= lost;
        lost
    }
}
