//! Objetos recogibles: munición, salud, armadura, armas y llaves.

use log::{debug, warn};
use serde::Deserialize;

use crate::door::KeyFlags;
use crate::event::{GameEvent, SoundCue};
use crate::player::{AmmoKind, PlayerStats, Weapon, MAX_ARMOR, MAX_HEALTH};

pub const MAX_PICKUPS: usize = 16;
/// Semiancho de la caja de recogida.
pub const PICKUP_RADIUS: i32 = 80;

pub const AMMO_CLIP_AMOUNT: u16 = 10;
pub const HEALTH_SMALL_AMOUNT: u8 = 10;
pub const HEALTH_LARGE_AMOUNT: u8 = 25;
pub const SHELLS_BOX_AMOUNT: u16 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    AmmoClip,
    HealthSmall,
    HealthLarge,
    Shotgun,
    /// +1 de armadura
    Helmet,
    /// Armadura a 100
    Armor,
    Shells,
    RocketLauncher,
    KeyRed,
    KeyYellow,
    KeyBlue,
    Chaingun,
}

impl PickupKind {
    pub fn is_weapon(self) -> bool {
        matches!(self, PickupKind::Shotgun | PickupKind::RocketLauncher | PickupKind::Chaingun)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pickup {
    pub x: u16,
    pub y: u16,
    pub kind: PickupKind,
}

#[derive(Clone, Debug, Default)]
pub struct Pickups {
    slots: [Option<Pickup>; MAX_PICKUPS],
    collected: u16,
}

impl Pickups {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// `false` si no queda hueco.
    pub fn spawn(&mut self, kind: PickupKind, x: u16, y: u16) -> bool {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(Pickup { x, y, kind });
                true
            }
            None => {
                warn!("sin hueco para {kind:?} en ({x}, {y})");
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pickup> {
        self.slots.iter().flatten()
    }

    pub fn collected(&self) -> u16 { self.collected }

    /// Recoge lo que toque el jugador. Los botiquines se quedan si la salud está llena.
    pub fn collect(&mut self, x: u16, y: u16, stats: &mut PlayerStats, events: &mut Vec<GameEvent>) -> usize {
        let mut taken = 0;
        for slot in self.slots.iter_mut() {
            let Some(p) = *slot else { continue; };
            let (dx, dy) = ((x as i32 - p.x as i32).abs(), (y as i32 - p.y as i32).abs());
            if dx >= PICKUP_RADIUS || dy >= PICKUP_RADIUS { continue; }
            if !apply(p.kind, stats) { continue; }
            *slot = None;
            taken += 1;
            self.collected += 1;
            debug!("recogido {:?}", p.kind);
            events.push(GameEvent::PickupCollected(p.kind));
            let cue = if p.kind.is_weapon() { SoundCue::WeaponPickup } else { SoundCue::ItemPickup };
            events.push(GameEvent::sound(cue));
        }
        taken
    }
}

/// Aplica el efecto. `false` si el objeto no se consume.
fn apply(kind: PickupKind, stats: &mut PlayerStats) -> bool {
    match kind {
        PickupKind::AmmoClip => {
            stats.add_ammo(AmmoKind::Bullets, AMMO_CLIP_AMOUNT);
        }
        PickupKind::HealthSmall | PickupKind::HealthLarge => {
            if stats.health >= MAX_HEALTH { return false; }
            let amount = if kind == PickupKind::HealthSmall { HEALTH_SMALL_AMOUNT } else { HEALTH_LARGE_AMOUNT };
            stats.health = stats.health.saturating_add(amount).min(MAX_HEALTH);
        }
        PickupKind::Shotgun => {
            stats.give_weapon(Weapon::Shotgun);
            stats.add_ammo(AmmoKind::Shells, 8);
        }
        PickupKind::Chaingun => {
            stats.give_weapon(Weapon::Chaingun);
            stats.add_ammo(AmmoKind::Bullets, 20);
        }
        PickupKind::RocketLauncher => {
            stats.give_weapon(Weapon::RocketLauncher);
            stats.add_ammo(AmmoKind::Rockets, 2);
        }
        PickupKind::Helmet => stats.armor = (stats.armor + 1).min(MAX_ARMOR),
        PickupKind::Armor => stats.armor = stats.armor.max(100),
        PickupKind::Shells => {
            stats.add_ammo(AmmoKind::Shells, SHELLS_BOX_AMOUNT);
        }
        PickupKind::KeyRed => stats.keys |= KeyFlags::RED,
        PickupKind::KeyYellow => stats.keys |= KeyFlags::YELLOW,
        PickupKind::KeyBlue => stats.keys |= KeyFlags::BLUE,
    }
    true
}
