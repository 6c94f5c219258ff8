//! Eventos que el núcleo deja para los colaboradores externos (sonido, HUD).
//! La simulación no reproduce nada: solo encola y el bucle principal drena.

use crate::archetype::Archetype;
use crate::door::KeyFlags;
use crate::pickup::PickupKind;

/// Volumen según la distancia al jugador.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundVolume {
    Loud,
    Medium,
    Quiet,
}

impl SoundVolume {
    /// Cerca de 4 tiles suena fuerte, hasta 10 medio, más allá flojo.
    pub fn from_distance(dist: i32) -> Self {
        match dist {
            d if d < 4 * 256 => SoundVolume::Loud,
            d if d < 10 * 256 => SoundVolume::Medium,
            _ => SoundVolume::Quiet,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    DoorOpen,
    DoorClose,
    SwitchOn,
    /// Pared sin nada que activar.
    Umf,
    Punch,
    Pistol,
    Shotgun,
    RocketLaunch,
    Explosion,
    ItemPickup,
    WeaponPickup,
    EnemySight,
    EnemyAttack,
    EnemyPain,
    EnemyDeath,
    Claw,
    PlayerPain,
    Teleport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Sound { cue: SoundCue, volume: SoundVolume },
    EnemyKilled { index: usize, archetype: Archetype, volume: SoundVolume },
    PlayerDamaged { amount: u8, health: u8 },
    PickupCollected(PickupKind),
    /// Puerta de llave sin la llave.
    MissingKey(KeyFlags),
    /// Sector o puerta secreta descubierta por primera vez.
    SecretFound,
    LevelComplete,
}

impl GameEvent {
    pub fn sound(cue: SoundCue) -> Self {
        GameEvent::Sound { cue, volume: SoundVolume::Loud }
    }
}
