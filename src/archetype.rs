//! Tipos de enemigo y sus estadísticas fijas.

use serde::Deserialize;

use crate::pickup::PickupKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Zombieman,
    Sergeant,
    Imp,
    Demon,
    Commando,
}

/// Cómo ataca cada tipo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackKind {
    /// Disparo instantáneo de `pellets` perdigones.
    Hitscan { pellets: u8 },
    /// Zarpazo cuerpo a cuerpo o bola de fuego a distancia.
    ClawOrFireball,
    /// Solo mordisco: tiene que acercarse.
    Bite,
    /// Ráfaga: un disparo por cada fotograma de ataque.
    Burst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchetypeStats {
    pub health: u8,
    /// Probabilidad de dolor sobre 256.
    pub pain_chance: u8,
    /// Avance por tick andando.
    pub speed: i32,
    pub attack: AttackKind,
    pub attack_frames: u8,
    pub death_frames: u8,
    /// Ticks de espera tras una ráfaga antes de poder volver a atacar.
    pub attack_cooldown: u8,
    pub drop: Option<PickupKind>,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [Archetype::Zombieman, Archetype::Sergeant, Archetype::Imp, Archetype::Demon, Archetype::Commando];

    pub fn stats(self) -> ArchetypeStats {
        match self {
            Archetype::Zombieman => ArchetypeStats {
                health: 20,
                pain_chance: 200,
                speed: 8,
                attack: AttackKind::Hitscan { pellets: 1 },
                attack_frames: 2,
                death_frames: 5,
                attack_cooldown: 20,
                drop: Some(PickupKind::AmmoClip),
            },
            Archetype::Sergeant => ArchetypeStats {
                health: 30,
                pain_chance: 170,
                speed: 8,
                attack: AttackKind::Hitscan { pellets: 3 },
                attack_frames: 2,
                death_frames: 5,
                attack_cooldown: 24,
                drop: Some(PickupKind::Shotgun),
            },
            Archetype::Imp => ArchetypeStats {
                health: 60,
                pain_chance: 200,
                speed: 8,
                attack: AttackKind::ClawOrFireball,
                attack_frames: 3,
                death_frames: 5,
                attack_cooldown: 24,
                drop: None,
            },
            Archetype::Demon => ArchetypeStats {
                health: 150,
                pain_chance: 180,
                speed: 16,
                attack: AttackKind::Bite,
                attack_frames: 3,
                death_frames: 6,
                attack_cooldown: 12,
                drop: None,
            },
            Archetype::Commando => ArchetypeStats {
                health: 70,
                pain_chance: 170,
                speed: 8,
                attack: AttackKind::Burst,
                attack_frames: 4,
                death_frames: 7,
                attack_cooldown: 16,
                drop: Some(PickupKind::Chaingun),
            },
        }
    }

    /// Tiene ataque a distancia.
    pub fn has_ranged_attack(self) -> bool {
        !matches!(self.stats().attack, AttackKind::Bite)
    }

    /// Tiene ataque cuerpo a cuerpo.
    pub fn has_melee(self) -> bool {
        matches!(self.stats().attack, AttackKind::Bite | AttackKind::ClawOrFireball)
    }
}
