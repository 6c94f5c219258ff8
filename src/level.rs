//! Descripción de niveles en YAML: rejilla en filas hexadecimales, punto de salida,
//! puertas, interruptores y colocación de enemigos y objetos.
//! Las coordenadas del fichero son de tile; al construir se pasan al centro del tile.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::archetype::Archetype;
use crate::door::SwitchKind;
use crate::error::LevelError;
use crate::map::{TileGrid, HEIGHT, WIDTH};
use crate::pickup::PickupKind;

const E1M1: &str = include_str!("../levels/e1m1.yaml");
/// Sectores secretos por nivel.
pub const MAX_SECRETS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct SpawnDesc {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub angle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct SwitchDesc {
    pub x: i32,
    pub y: i32,
    pub kind: SwitchKind,
    /// Índice en `doors` de la puerta que acciona.
    #[serde(default)]
    pub door: usize,
}

/// Casilla de teletransporte: entrar en (x, y) lleva a `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct TeleportDesc {
    pub x: i32,
    pub y: i32,
    pub to: SpawnDesc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct EnemyDesc {
    pub archetype: Archetype,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub angle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct PickupDesc {
    pub kind: PickupKind,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LevelDesc {
    pub name: String,
    pub rows: Vec<String>,
    pub spawn: SpawnDesc,
    #[serde(default)]
    pub doors: Vec<TilePos>,
    #[serde(default)]
    pub switches: Vec<SwitchDesc>,
    #[serde(default)]
    pub enemies: Vec<EnemyDesc>,
    #[serde(default)]
    pub pickups: Vec<PickupDesc>,
    /// Tiles que cuentan como secreto la primera vez que el jugador los pisa.
    #[serde(default)]
    pub secrets: Vec<TilePos>,
    #[serde(default)]
    pub teleports: Vec<TeleportDesc>,
}

/// Centro del tile en 8.8.
pub fn tile_center(t: i32) -> u16 { (t * 256 + 128) as u16 }

impl LevelDesc {
    /// Primer nivel, incluido en el binario.
    pub fn e1m1() -> Result<Self, LevelError> {
        Self::from_yaml(E1M1)
    }

    pub fn from_yaml(text: &str) -> Result<Self, LevelError> {
        let level: LevelDesc = serde_yaml::from_str(text)?;
        level.validate()?;
        debug!(
            "nivel {}: {} filas, {} puertas, {} enemigos, {} objetos",
            level.name,
            level.rows.len(),
            level.doors.len(),
            level.enemies.len(),
            level.pickups.len()
        );
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Rejilla de tiles; lo que no aparece en las filas queda vacío.
    pub fn grid(&self) -> Result<TileGrid, LevelError> {
        let mut cells: Vec<Vec<u8>> = Vec::with_capacity(self.rows.len());
        for (row, line) in self.rows.iter().enumerate() {
            let ids = line
                .chars()
                .enumerate()
                .map(|(column, c)| c.to_digit(16).map(|d| d as u8).ok_or(LevelError::BadRow { row, column, found: c }))
                .collect::<Result<Vec<u8>, _>>()?;
            cells.push(ids);
        }
        Ok(TileGrid::from_rows(&cells))
    }

    fn validate(&self) -> Result<(), LevelError> {
        let columns = self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if self.rows.len() > HEIGHT || columns > WIDTH {
            return Err(LevelError::TooLarge { rows: self.rows.len(), columns });
        }
        let grid = self.grid()?;

        let inside = |what: &'static str, x: i32, y: i32| {
            if grid.in_bounds(x, y) { Ok(()) } else { Err(LevelError::OutOfBounds { what, x, y }) }
        };
        inside("spawn", self.spawn.x, self.spawn.y)?;
        if grid.is_wall(self.spawn.x, self.spawn.y) {
            return Err(LevelError::SpawnInWall { x: self.spawn.x, y: self.spawn.y });
        }
        for d in &self.doors {
            inside("door", d.x, d.y)?;
        }
        for (i, s) in self.switches.iter().enumerate() {
            inside("switch", s.x, s.y)?;
            if s.kind == SwitchKind::Door && s.door >= self.doors.len() {
                return Err(LevelError::BadSwitchLink { switch: i, door: s.door });
            }
        }
        for e in &self.enemies {
            inside("enemy", e.x, e.y)?;
        }
        for p in &self.pickups {
            inside("pickup", p.x, p.y)?;
        }
        if self.secrets.len() > MAX_SECRETS {
            return Err(LevelError::TooManySecrets { count: self.secrets.len() });
        }
        for s in &self.secrets {
            inside("secret", s.x, s.y)?;
        }
        for t in &self.teleports {
            inside("teleport", t.x, t.y)?;
            inside("teleport destination", t.to.x, t.to.y)?;
            if grid.is_wall(t.to.x, t.to.y) {
                return Err(LevelError::TeleportIntoWall { x: t.to.x, y: t.to.y });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map;

    #[test]
    fn e1m1_loads() {
        let level = LevelDesc::e1m1().expect("e1m1");
        assert_eq!(level.name, "E1M1");
        assert_eq!(level.rows.len(), 32);
        assert_eq!((level.spawn.x, level.spawn.y, level.spawn.angle), (15, 28, 512));
        assert_eq!(level.doors.len(), 2);
        assert_eq!(level.switches[0].kind, SwitchKind::Exit);
        assert_eq!(level.switches[1].door, 1);
        assert_eq!(level.secrets, vec![TilePos { x: 4, y: 9 }]);
        assert_eq!(level.teleports.len(), 1);

        let grid = level.grid().expect("rejilla");
        assert_eq!(grid.cell_id(15, 19), Some(map::DOOR));
        assert_eq!(grid.cell_id(5, 11), Some(map::DOOR));
        assert_eq!(grid.cell_id(27, 3), Some(map::SWITCH));
        assert_eq!(grid.cell_id(18, 10), Some(map::SWITCH));
        // fuera de las 32x32 autorizadas queda vacío
        assert_eq!(grid.cell_id(40, 40), Some(map::EMPTY));
        for e in &level.enemies {
            assert!(!grid.is_wall(e.x, e.y), "{e:?}");
        }
        for p in &level.pickups {
            assert!(!grid.is_wall(p.x, p.y), "{p:?}");
        }
        for t in &level.teleports {
            assert!(!grid.is_wall(t.x, t.y), "{t:?}");
        }
    }

    #[test]
    fn bad_hex_digit_is_reported() {
        let text = "name: x\nrows: [\"111\", \"1z1\", \"111\"]\nspawn: { x: 1, y: 1 }\n";
        match LevelDesc::from_yaml(text) {
            Err(LevelError::BadRow { row: 1, column: 1, found: 'z' }) => {}
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn spawn_inside_wall_is_rejected() {
        let text = "name: x\nrows: [\"111\", \"101\", \"111\"]\nspawn: { x: 0, y: 0 }\n";
        assert!(matches!(LevelDesc::from_yaml(text), Err(LevelError::SpawnInWall { x: 0, y: 0 })));
    }

    #[test]
    fn switch_must_link_existing_door() {
        let text = "name: x\nrows: [\"111\", \"101\", \"111\"]\nspawn: { x: 1, y: 1 }\nswitches: [{ x: 0, y: 1, kind: door, door: 3 }]\n";
        assert!(matches!(LevelDesc::from_yaml(text), Err(LevelError::BadSwitchLink { switch: 0, door: 3 })));
    }

    #[test]
    fn placements_outside_map_are_rejected() {
        let text = "name: x\nrows: [\"111\", \"101\", \"111\"]\nspawn: { x: 1, y: 1 }\nenemies: [{ archetype: imp, x: 70, y: 1 }]\n";
        assert!(matches!(LevelDesc::from_yaml(text), Err(LevelError::OutOfBounds { what: "enemy", x: 70, y: 1 })));
    }

    #[test]
    fn teleport_into_a_wall_is_rejected() {
        let text = "name: x\nrows: [\"1111\", \"1001\", \"1111\"]\nspawn: { x: 1, y: 1 }\nteleports: [{ x: 2, y: 1, to: { x: 0, y: 1 } }]\n";
        assert!(matches!(LevelDesc::from_yaml(text), Err(LevelError::TeleportIntoWall { x: 0, y: 1 })));
    }

    #[test]
    fn at_most_four_secrets() {
        let secrets = "[{ x: 1, y: 1 }, { x: 2, y: 1 }, { x: 1, y: 1 }, { x: 2, y: 1 }, { x: 1, y: 1 }]";
        let text = format!("name: x\nrows: [\"1111\", \"1001\", \"1111\"]\nspawn: {{ x: 1, y: 1 }}\nsecrets: {secrets}\n");
        assert!(matches!(LevelDesc::from_yaml(&text), Err(LevelError::TooManySecrets { count: 5 })));
    }

    #[test]
    fn broken_yaml_is_an_error() {
        assert!(matches!(LevelDesc::from_yaml("rows: ["), Err(LevelError::Yaml(_))));
    }
}
