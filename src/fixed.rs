//! Matemática de punto fijo del motor.
//! Ángulos en 1/1024 de vuelta (0 mira a +Y, 256 a +X), posiciones en 8.8.
//! Las tablas se generan en `build.rs`; aquí no hay trigonometría en coma flotante.

include!(concat!(env!("OUT_DIR"), "/tables.rs"));

pub const FULL_TURN: i32 = 1024;
pub const ANGLE_MASK: i32 = FULL_TURN - 1;
pub const QUARTER_TURN: i32 = 256;
pub const HALF_TURN: i32 = 512;

pub const SCREEN_WIDTH: i32 = 384;
pub const SCREEN_HEIGHT: i32 = 208;
pub const HORIZON: i32 = SCREEN_HEIGHT / 2;
/// Distancia mínima para la que la pared cabe en pantalla.
pub const MIN_DIST: i32 = 276;
/// Semialtura de pared * distancia.
pub const HEIGHT_FACTOR: i32 = 28_800;

const RECIP_LEN: u32 = RECIP.len() as u32;

#[inline]
pub fn wrap_angle(a: i32) -> u16 { (a & ANGLE_MASK) as u16 }

#[inline]
pub fn quadrant(a: u16) -> u8 { ((a >> 8) & 3) as u8 }

#[inline]
pub fn sub_angle(a: u16) -> u8 { (a & 0xFF) as u8 }

/// Seno en 8.8 (-256..=256). Exacto en los cuatro ejes.
pub fn sin(a: i32) -> i32 {
    let a = a & ANGLE_MASK;
    let s = (a & 0xFF) as usize;
    let v = match a >> 8 {
        0 => SIN_QUARTER[s],
        1 => SIN_QUARTER[256 - s],
        2 => -SIN_QUARTER[s],
        _ => -SIN_QUARTER[256 - s],
    };
    v as i32
}

/// Coseno en 8.8.
pub fn cos(a: i32) -> i32 { sin(a + QUARTER_TURN) }

/// (v * f) >> 8
#[inline]
pub fn mul_u8_u16(v: u8, f: u16) -> u16 {
    ((v as u32 * f as u32) >> 8) as u16
}

/// (v * f) >> 8 conservando el signo de `f`.
#[inline]
pub fn mul_s8_s16(v: u8, f: i16) -> i16 {
    let m = mul_u8_u16(v, f.unsigned_abs()) as i16;
    if f < 0 { -m } else { m }
}

/// Producto de dos valores 8.8.
#[inline]
pub fn mul_fix(a: i32, b: i32) -> i32 { (a * b) >> 8 }

/// Raíz cuadrada entera (bit a bit).
pub fn isqrt(v: u32) -> u32 {
    let mut b: u32 = 1 << 30;
    let mut q: u32 = 0;
    let mut r = v;
    while b > r { b >>= 2; }
    while b > 0 {
        let t = q + b;
        q >>= 1;
        if r >= t {
            r -= t;
            q += b;
        }
        b >>= 2;
    }
    q
}

/// `(1 << 16) / i` para i en 1..1024.
#[inline]
pub fn recip(i: u16) -> u32 { RECIP[(i as usize).min(RECIP.len() - 1)] }

/// Divide `num / den` con la tabla de recíprocos. Divisores grandes se normalizan
/// desplazando ambos operandos; `den <= 0` se trata como 1.
pub fn div_by(num: i32, den: i32) -> i32 {
    let mut den = den.max(1) as u32;
    let mut num = num as i64;
    while den >= RECIP_LEN {
        den >>= 1;
        num >>= 1;
    }
    ((num * RECIP[den as usize] as i64) >> 16) as i32
}

/// Tangente escalada por la parte fraccional de la posición (paso inicial del rayo).
pub fn mul_tan(value: u8, inverse: bool, quarter: u8, angle: u8, table: &[u16; 256]) -> i32 {
    let mut signed_value = value;
    if inverse {
        if value == 0 {
            let t = abs_tan(quarter, angle, table);
            return if quarter & 1 == 1 { -t } else { t };
        }
        signed_value = value.wrapping_neg();
    }
    if signed_value == 0 {
        return 0;
    }
    if quarter & 1 == 1 {
        -(mul_u8_u16(signed_value, table[angle.wrapping_neg() as usize]) as i32)
    } else {
        mul_u8_u16(signed_value, table[angle as usize]) as i32
    }
}

/// Tangente del sub-ángulo; en cuadrantes impares se usa el complementario.
pub fn abs_tan(quarter: u8, angle: u8, table: &[u16; 256]) -> i32 {
    if quarter & 1 == 1 {
        table[angle.wrapping_neg() as usize] as i32
    } else {
        table[angle as usize] as i32
    }
}

pub(crate) fn tan_table() -> &'static [u16; 256] { &TAN }
pub(crate) fn cotan_table() -> &'static [u16; 256] { &COTAN }

/// Desvío angular de una columna de pantalla respecto al centro.
pub fn delta_angle(screen_x: usize) -> i32 {
    DELTA_ANGLE[screen_x.min(DELTA_ANGLE.len() - 1)] as i32
}

/// Rumbo de un vector en unidades de 1/1024 (0 = +Y, 256 = +X).
/// Aproximación lineal por octantes.
pub fn bearing(dx: i32, dy: i32) -> u16 {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax == 0 && ay == 0 { return 0; }
    let a = if ay >= ax { ax * 128 / ay } else { 256 - ay * 128 / ax };
    let a = match (dx >= 0, dy >= 0) {
        (true, true) => a,
        (true, false) => HALF_TURN - a,
        (false, false) => HALF_TURN + a,
        (false, true) => FULL_TURN - a,
    };
    wrap_angle(a)
}

/// Distancia octogonal: max + min/2.
#[inline]
pub fn approx_dist(dx: i32, dy: i32) -> i32 {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax > ay { ax + (ay >> 1) } else { ay + (ax >> 1) }
}

/// Diferencia firmada `a - b` en -512..512.
#[inline]
pub fn angle_diff(a: i32, b: i32) -> i32 {
    ((a - b + HALF_TURN) & ANGLE_MASK) - HALF_TURN
}

/// Semialtura y paso de textura a partir del índice `(d - MIN_DIST) >> 2`.
/// Tabla directa para cerca, comprimida x8 para lejos.
pub fn lookup_height(index: i32) -> (u8, u16) {
    let index = index.max(0) as usize;
    if index >= 256 {
        let ds = index >> 3;
        if ds >= 256 {
            (FAR_HEIGHT[255] - 1, FAR_STEP[255])
        } else {
            (FAR_HEIGHT[ds], FAR_STEP[ds])
        }
    } else {
        (NEAR_HEIGHT[index], NEAR_STEP[index])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ColumnHeight {
    /// Semialtura en píxeles (<= HORIZON).
    pub half_height: u8,
    /// Desplazamiento vertical inicial de la textura (8.8).
    pub tex_offset: u16,
    /// Paso vertical de textura por píxel (8.8).
    pub tex_step: u16,
}

/// Convierte una distancia perpendicular en altura de columna.
pub fn column_height(distance: i32) -> ColumnHeight {
    if distance >= MIN_DIST {
        let (half_height, tex_step) = lookup_height((distance - MIN_DIST) >> 2);
        ColumnHeight { half_height, tex_offset: 0, tex_step }
    } else {
        let d = distance.clamp(0, MIN_DIST - 1) as usize;
        ColumnHeight { half_height: HORIZON as u8, tex_offset: OVERFLOW_OFFSET[d], tex_step: OVERFLOW_STEP[d] }
    }
}

/// Semialtura equivalente de un objeto a esa profundidad.
#[inline]
pub fn depth_height(distance: i32) -> u8 { column_height(distance).half_height }
