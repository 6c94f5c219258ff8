//! Ray casting en punto fijo sobre la rejilla de tiles.
//! Recorre fronteras de tile sin divisiones: una rama para rayos alineados a eje
//! y otra para diagonales con tablas de tangente/cotangente.

use crate::depth::{ColumnDepth, DepthOcclusionBuffer, COLUMNS, COLUMN_WIDTH};
use crate::door::DoorSystem;
use crate::fixed::{self, ColumnHeight, HORIZON};
use crate::map::{self, TileGrid};
use crate::player::PlayerPose;

/// Borde de tile que cruzó el rayo al chocar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HitSide {
    /// Frontera horizontal (el rayo avanzó en Y).
    #[default]
    Horizontal,
    /// Frontera vertical (el rayo avanzó en X).
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RayHit {
    /// Distancia proyectada sobre el ángulo de referencia (el del propio rayo o el de la vista).
    pub distance: i32,
    pub delta_x: i32,
    pub delta_y: i32,
    /// Columna de textura 0..255 dentro del tile.
    pub texture_x: u8,
    pub wall_type: u8,
    pub tile_x: i32,
    pub tile_y: i32,
    pub side: HitSide,
    /// Punto exacto de impacto en coordenadas de mundo.
    pub hit_x: i32,
    pub hit_y: i32,
}

/// Sombreado de la columna: dos niveles, según la cara impactada.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Light,
    Dark,
}

impl HitSide {
    pub fn shade(self) -> Shade {
        match self {
            HitSide::Vertical => Shade::Light,
            HitSide::Horizontal => Shade::Dark,
        }
    }
}

/// Geometría de pared lista para el blit de una columna.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallSlice {
    pub hit: RayHit,
    pub height: ColumnHeight,
}

/// Puerta parcialmente abierta dibujada sobre la pared de fondo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorSlice {
    pub hit: RayHit,
    pub height: ColumnHeight,
    pub open_amount: u8,
    /// Y de pantalla donde empieza el hueco bajo la hoja de la puerta.
    pub gap_y: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnTrace {
    pub column: usize,
    /// Pared de fondo (o la puerta cerrada si no hay hueco).
    pub wall: WallSlice,
    pub door: Option<DoorSlice>,
}

/// Lanza un rayo desde (x, y) en 8.8 hasta el primer tile sólido.
/// `distance` queda proyectada sobre el propio ángulo del rayo.
pub fn cast_column(grid: &TileGrid, x: u16, y: u16, angle: u16) -> RayHit {
    let mut hit = walk(grid, x as i32, y as i32, angle, |tx, ty| grid.is_wall(tx, ty));
    hit.distance = perpendicular_distance(angle as i32, hit.delta_x, hit.delta_y);
    hit
}

/// Punto de impacto exacto (para impactos de bala sobre la pared).
pub fn cast_ray_hit_pos(grid: &TileGrid, x: u16, y: u16, angle: u16) -> (i32, i32) {
    let hit = walk(grid, x as i32, y as i32, angle & fixed::ANGLE_MASK as u16, |tx, ty| grid.is_wall(tx, ty));
    (hit.hit_x, hit.hit_y)
}

/// distance = dy * cos(A) + dx * sin(A)
pub fn perpendicular_distance(view_angle: i32, dx: i32, dy: i32) -> i32 {
    (dy * fixed::cos(view_angle) + dx * fixed::sin(view_angle)) >> 8
}

/// Neutraliza artefactos junto a los ejes: sub-ángulos 1, 2, 254 y 255 se apartan.
pub fn nudge_ray_angle(angle: i32) -> u16 {
    let a = match angle & 0xFF {
        1 | 254 => angle - 1,
        2 | 255 => angle + 1,
        _ => angle,
    };
    fixed::wrap_angle(a)
}

/// Recorrido de fronteras de tile. `solid` decide qué tiles detienen el rayo.
pub(crate) fn walk(grid: &TileGrid, ray_x: i32, ray_y: i32, ray_a: u16, solid: impl Fn(i32, i32) -> bool) -> RayHit {
    let quarter = fixed::quadrant(ray_a);
    let angle = fixed::sub_angle(ray_a);
    let offset_x = (ray_x & 0xFF) as u8;
    let offset_y = (ray_y & 0xFF) as u8;

    let mut tile_x = ray_x >> 8;
    let mut tile_y = ray_y >> 8;
    let mut intercept_x = ray_x;
    let mut intercept_y = ray_y;
    let tile_step_x: i32;
    let tile_step_y: i32;
    let side;

    if angle == 0 {
        if quarter & 1 == 0 {
            tile_step_x = 0;
            tile_step_y = if quarter == 0 { 1 } else { -1 };
            if tile_step_y == 1 { intercept_y -= 256; }
            loop {
                tile_y += tile_step_y;
                if solid(tile_x, tile_y) { break; }
            }
            side = HitSide::Horizontal;
        } else {
            tile_step_y = 0;
            tile_step_x = if quarter == 1 { 1 } else { -1 };
            if tile_step_x == 1 { intercept_x -= 256; }
            loop {
                tile_x += tile_step_x;
                if solid(tile_x, tile_y) { break; }
            }
            side = HitSide::Vertical;
        }
    } else {
        let tan = fixed::tan_table();
        let cotan = fixed::cotan_table();
        let step_x;
        let step_y;

        if quarter <= 1 {
            tile_step_x = 1;
            intercept_y += fixed::mul_tan(offset_x, true, quarter, angle, cotan);
            intercept_x -= 256;
            step_x = fixed::abs_tan(quarter, angle, tan);
        } else {
            tile_step_x = -1;
            intercept_y -= fixed::mul_tan(offset_x, false, quarter, angle, cotan);
            step_x = -fixed::abs_tan(quarter, angle, tan);
        }

        if quarter == 0 || quarter == 3 {
            tile_step_y = 1;
            intercept_x += fixed::mul_tan(offset_y, true, quarter, angle, tan);
            intercept_y -= 256;
            step_y = fixed::abs_tan(quarter, angle, cotan);
        } else {
            tile_step_y = -1;
            intercept_x -= fixed::mul_tan(offset_y, false, quarter, angle, tan);
            step_y = -fixed::abs_tan(quarter, angle, cotan);
        }

        side = 'walk: loop {
            let mut advanced = false;
            while (tile_step_y == 1 && (intercept_y >> 8) < tile_y) || (tile_step_y == -1 && (intercept_y >> 8) >= tile_y) {
                advanced = true;
                tile_x += tile_step_x;
                if solid(tile_x, tile_y) { break 'walk HitSide::Vertical; }
                intercept_y += step_y;
            }
            while (tile_step_x == 1 && (intercept_x >> 8) < tile_x) || (tile_step_x == -1 && (intercept_x >> 8) >= tile_x) {
                advanced = true;
                tile_y += tile_step_y;
                if solid(tile_x, tile_y) { break 'walk HitSide::Horizontal; }
                intercept_x += step_x;
            }
            // el rayo pasa justo por una esquina: se cruza primero la frontera vertical
            if !advanced {
                tile_x += tile_step_x;
                if solid(tile_x, tile_y) { break 'walk HitSide::Vertical; }
                intercept_y += step_y;
            }
        };
    }

    let (hit_x, hit_y, texture_x) = match side {
        HitSide::Horizontal => (
            intercept_x + if tile_step_x == 1 { 256 } else { 0 },
            (tile_y << 8) + if tile_step_y == -1 { 256 } else { 0 },
            (intercept_x & 0xFF) as u8,
        ),
        HitSide::Vertical => (
            (tile_x << 8) + if tile_step_x == -1 { 256 } else { 0 },
            intercept_y + if tile_step_y == 1 { 256 } else { 0 },
            (intercept_y & 0xFF) as u8,
        ),
    };

    RayHit {
        distance: 0,
        delta_x: hit_x - ray_x,
        delta_y: hit_y - ray_y,
        texture_x,
        wall_type: grid.wall_type(tile_x, tile_y),
        tile_x,
        tile_y,
        side,
        hit_x,
        hit_y,
    }
}

/// Línea de visión por Bresenham entre dos posiciones 8.8.
/// Solo se prueban los tiles intermedios: ni el origen ni el destino.
pub fn has_line_of_sight(grid: &TileGrid, from: (u16, u16), to: (u16, u16)) -> bool {
    let (mut x0, mut y0) = ((from.0 >> 8) as i32, (from.1 >> 8) as i32);
    let (x1, y1) = ((to.0 >> 8) as i32, (to.1 >> 8) as i32);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x1 > x0 { 1 } else { -1 };
    let sy = if y1 > y0 { 1 } else { -1 };
    let mut err = dx - dy;
    while x0 != x1 || y0 != y1 {
        let e2 = err * 2;
        if e2 > -dy { err -= dy; x0 += sx; }
        if e2 < dx { err += dx; y0 += sy; }
        if x0 == x1 && y0 == y1 { break; }
        if grid.is_wall(x0, y0) { return false; }
    }
    true
}

/// Traza una columna de pantalla: primera pasada hasta el primer sólido y, si es una
/// puerta con hueco, segunda pasada ignorando ese tile para obtener el fondo.
pub fn trace_column(grid: &TileGrid, doors: &DoorSystem, pose: &PlayerPose, column: usize) -> ColumnTrace {
    let screen_x = column * COLUMN_WIDTH;
    let view = pose.angle as i32;
    let ray_a = nudge_ray_angle(view + fixed::delta_angle(screen_x));
    let (px, py) = (pose.x as i32, pose.y as i32);

    let mut first = walk(grid, px, py, ray_a, |tx, ty| grid.is_wall(tx, ty));
    first.distance = perpendicular_distance(view, first.delta_x, first.delta_y);

    let open_amount = if map::is_door_tile(first.wall_type) { doors.open_amount(first.tile_x, first.tile_y) } else { 0 };
    if open_amount == 0 {
        return ColumnTrace { column, wall: slice_for(first), door: None };
    }

    let door_tile = (first.tile_x, first.tile_y);
    let mut back = walk(grid, px, py, ray_a, |tx, ty| (tx, ty) != door_tile && grid.is_wall(tx, ty));
    back.distance = perpendicular_distance(view, back.delta_x, back.delta_y);

    let door = slice_for(first);
    let h = door.height.half_height as i32;
    let gap_y = HORIZON - h + ((2 * h * (64 - open_amount as i32)) >> 6);
    ColumnTrace {
        column,
        wall: slice_for(back),
        door: Some(DoorSlice { hit: first, height: door.height, open_amount, gap_y: gap_y.clamp(0, 255) as u8 }),
    }
}

fn slice_for(hit: RayHit) -> WallSlice {
    WallSlice { hit, height: fixed::column_height(hit.distance) }
}

/// Bucle de columnas del frame: traza las 48 columnas y escribe el búfer de profundidad
/// antes de devolver, de modo que ningún sprite lee una columna sin escribir.
pub fn trace_view(grid: &TileGrid, doors: &DoorSystem, pose: &PlayerPose, depth: &mut DepthOcclusionBuffer) -> Vec<ColumnTrace> {
    depth.clear();
    let mut columns = Vec::with_capacity(COLUMNS);
    for column in 0..COLUMNS {
        let trace = trace_column(grid, doors, pose, column);
        depth.write(
            column,
            ColumnDepth {
                wall_height: trace.wall.height.half_height,
                door: trace.door.map(|d| (d.height.half_height, d.gap_y)),
            },
        );
        columns.push(trace);
    }
    columns
}
