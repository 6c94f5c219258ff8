//! Rejilla de tiles 64x64 del nivel.
//! Coordenadas de mundo en 8.8: el byte alto es el tile, el bajo la posición dentro del tile.

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 64;
/// Unidades de mundo por tile.
pub const TILE_UNITS: i32 = 256;

pub const EMPTY: u8 = 0;
pub const WALL_BRICK: u8 = 1;
pub const WALL_STONE: u8 = 2;
pub const WALL_TECH: u8 = 3;
pub const DOOR: u8 = 4;
pub const SWITCH: u8 = 5;
pub const SECRET_FIRST: u8 = 6;
pub const SECRET_LAST: u8 = 8;
pub const KEY_DOOR_RED: u8 = 9;
pub const KEY_DOOR_YELLOW: u8 = 10;
pub const KEY_DOOR_BLUE: u8 = 11;
pub const MAX_TILE: u8 = KEY_DOOR_BLUE;

/// ¿El valor de tile se abre como puerta (normal, secreta o de llave)?
pub fn is_door_tile(id: u8) -> bool {
    id == DOOR || (SECRET_FIRST..=KEY_DOOR_BLUE).contains(&id)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    cells: Vec<u8>, // fila mayor, 0 = libre
}

impl Default for TileGrid {
    fn default() -> Self { Self::new() }
}

impl TileGrid {
    /// Rejilla vacía.
    pub fn new() -> Self {
        Self { cells: vec![EMPTY; WIDTH * HEIGHT] }
    }

    /// Copia filas (posiblemente más pequeñas que 64x64) en la esquina NO; el resto queda libre.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let mut grid = Self::new();
        for (y, row) in rows.iter().take(HEIGHT).enumerate() {
            for (x, &id) in row.as_ref().iter().take(WIDTH).enumerate() {
                grid.cells[y * WIDTH + x] = id;
            }
        }
        grid
    }

    pub fn width(&self) -> usize { WIDTH }
    pub fn height(&self) -> usize { HEIGHT }

    pub fn in_bounds(&self, tx: i32, ty: i32) -> bool {
        tx >= 0 && ty >= 0 && (tx as usize) < WIDTH && (ty as usize) < HEIGHT
    }

    pub fn cell_id(&self, tx: i32, ty: i32) -> Option<u8> {
        if !self.in_bounds(tx, ty) { return None; }
        Some(self.cells[ty as usize * WIDTH + tx as usize])
    }

    /// Tipo de pared; fuera de la rejilla cuenta como ladrillo.
    pub fn wall_type(&self, tx: i32, ty: i32) -> u8 {
        self.cell_id(tx, ty).unwrap_or(WALL_BRICK)
    }

    /// Fuera de la rejilla siempre es pared.
    pub fn is_wall(&self, tx: i32, ty: i32) -> bool {
        self.cell_id(tx, ty).map(|id| id != EMPTY).unwrap_or(true)
    }

    pub fn is_free(&self, tx: i32, ty: i32) -> bool {
        matches!(self.cell_id(tx, ty), Some(EMPTY))
    }

    /// Solo el sistema de puertas y la carga de nivel escriben en la rejilla.
    pub(crate) fn set(&mut self, tx: i32, ty: i32, id: u8) {
        if self.in_bounds(tx, ty) {
            self.cells[ty as usize * WIDTH + tx as usize] = id;
        }
    }

    pub fn world_to_cell(&self, x: i32, y: i32) -> (i32, i32) {
        (x >> 8, y >> 8)
    }

    pub fn cell_center_world(&self, tx: i32, ty: i32) -> Option<(u16, u16)> {
        if !self.in_bounds(tx, ty) { return None; }
        Some(((tx * TILE_UNITS + TILE_UNITS / 2) as u16, (ty * TILE_UNITS + TILE_UNITS / 2) as u16))
    }

    /// ¿La caja de semiancho `half` centrada en (x, y) toca algún tile sólido?
    pub fn box_hits_wall(&self, x: i32, y: i32, half: i32) -> bool {
        let (x0, y0) = ((x - half) >> 8, (y - half) >> 8);
        let (x1, y1) = ((x + half - 1) >> 8, (y + half - 1) >> 8);
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                if self.is_wall(tx, ty) { return true; }
            }
        }
        false
    }
}
