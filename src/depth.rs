//! Búfer de oclusión por columna.
//! Lo escribe el bucle de columnas del raycaster y lo lee el proyector de sprites
//! dentro del mismo frame.

use crate::fixed::{HORIZON, SCREEN_WIDTH};

pub const COLUMN_WIDTH: usize = 8;
pub const COLUMNS: usize = SCREEN_WIDTH as usize / COLUMN_WIDTH;
/// Semialtura tope: todo lo que está más cerca que `MIN_DIST` la comparte.
pub const SATURATED_HEIGHT: u8 = HORIZON as u8;

/// Columna de búfer para una x de pantalla. Raycaster y proyector usan la misma.
#[inline]
pub fn column_of(screen_x: i32) -> i32 { screen_x >> 3 }

/// Lo que el raycaster deja en una columna.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnDepth {
    /// Semialtura de la pared de fondo.
    pub wall_height: u8,
    /// (semialtura de la puerta, y de pantalla donde empieza su hueco)
    pub door: Option<(u8, u8)>,
}

/// Rango visible de un sprite tras consultar el búfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub first_column: usize,
    pub last_column: usize,
    /// Solo se ve por huecos de puerta: el borde superior se recorta a esta y.
    pub clip_top: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthOcclusionBuffer {
    wall_height: [u8; COLUMNS],
    door_height: [u8; COLUMNS], // 0 = sin puerta
    door_gap_y: [u8; COLUMNS],
}

impl Default for DepthOcclusionBuffer {
    fn default() -> Self { Self::new() }
}

impl DepthOcclusionBuffer {
    pub fn new() -> Self {
        Self { wall_height: [0; COLUMNS], door_height: [0; COLUMNS], door_gap_y: [0; COLUMNS] }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn write(&mut self, column: usize, depth: ColumnDepth) {
        if column >= COLUMNS { return; }
        self.wall_height[column] = depth.wall_height;
        let (h, gap) = depth.door.unwrap_or((0, 0));
        self.door_height[column] = h;
        self.door_gap_y[column] = gap;
    }

    pub fn wall_height(&self, column: usize) -> u8 { self.wall_height[column.min(COLUMNS - 1)] }
    pub fn door_height(&self, column: usize) -> u8 { self.door_height[column.min(COLUMNS - 1)] }
    pub fn door_gap_y(&self, column: usize) -> u8 { self.door_gap_y[column.min(COLUMNS - 1)] }

    /// Un objeto con esta semialtura equivalente está delante de la pared de la columna.
    /// Con la semialtura tope el objeto está pegado a la cámara y siempre se ve.
    pub fn is_column_visible(&self, column: usize, sprite_height: u8) -> bool {
        column < COLUMNS && (self.wall_height[column] < sprite_height || sprite_height >= SATURATED_HEIGHT)
    }

    /// ¿La hoja de una puerta tapa el objeto en esta columna?
    fn behind_door(&self, column: usize, sprite_height: u8) -> bool {
        sprite_height < SATURATED_HEIGHT && self.door_height[column] != 0 && self.door_height[column] >= sprite_height
    }

    /// Columnas visibles de un sprite que ocupa `screen_left..=screen_right`.
    /// `None` si la pared lo tapa entero.
    pub fn visibility(&self, screen_left: i32, screen_right: i32, sprite_height: u8) -> Option<Visibility> {
        let first = column_of(screen_left).max(0);
        let last = column_of(screen_right).min(COLUMNS as i32 - 1);
        if first > last { return None; }

        let visible: Vec<usize> = (first as usize..=last as usize)
            .filter(|&c| self.is_column_visible(c, sprite_height))
            .collect();
        let (&first_column, &last_column) = (visible.first()?, visible.last()?);

        let clip_top = if visible.iter().all(|&c| self.behind_door(c, sprite_height)) {
            visible.iter().map(|&c| self.door_gap_y[c]).max()
        } else {
            None
        };
        Some(Visibility { first_column, last_column, clip_top })
    }
}
