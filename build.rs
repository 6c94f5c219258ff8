//! Genera las tablas de punto fijo en tiempo de compilación.
//! Toda la trigonometría en coma flotante ocurre aquí; el motor solo ve enteros.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SCREEN_WIDTH: usize = 384;
const HALF_WIDTH: f64 = 192.0;
/// 150 * 384 / 208, truncado.
const MIN_DIST: usize = 276;
/// Semialtura * distancia (384 * 75).
const HEIGHT_FACTOR: f64 = 28_800.0;
const HORIZON: f64 = 104.0;
const TEXTURE_SIZE: f64 = 64.0;
const RECIP_LEN: usize = 1024;

fn angle_rad(i: usize) -> f64 {
    i as f64 * std::f64::consts::PI / 512.0
}

fn height_for(d: f64) -> u8 {
    (HEIGHT_FACTOR / d).round().min(HORIZON) as u8
}

fn step_for(d: f64) -> u16 {
    // 64 filas de textura repartidas en 2*h píxeles, en 8.8
    (TEXTURE_SIZE * 128.0 * d / HEIGHT_FACTOR).round().min(u16::MAX as f64) as u16
}

fn emit<T: std::fmt::Display>(out: &mut String, name: &str, ty: &str, values: &[T]) {
    let _ = writeln!(out, "pub(crate) const {name}: [{ty}; {}] = [", values.len());
    for chunk in values.chunks(16) {
        out.push_str("    ");
        for v in chunk {
            let _ = write!(out, "{v}, ");
        }
        out.push('\n');
    }
    out.push_str("];\n\n");
}

fn main() {
    let mut out = String::new();

    let sin_quarter: Vec<i16> = (0..=256).map(|i| (angle_rad(i).sin() * 256.0).round() as i16).collect();
    emit(&mut out, "SIN_QUARTER", "i16", &sin_quarter);

    // Índice 0 sin uso (los rayos de eje van por otra rama); tan(255) * 256 = 41721 cabe en u16
    let tan: Vec<u16> = (0..256)
        .map(|i| if i == 0 { 0 } else { (angle_rad(i).tan() * 256.0).round() as u16 })
        .collect();
    let cotan: Vec<u16> = (0..256)
        .map(|i| if i == 0 { 0 } else { (256.0 / angle_rad(i).tan()).round() as u16 })
        .collect();
    emit(&mut out, "TAN", "u16", &tan);
    emit(&mut out, "COTAN", "u16", &cotan);

    // FOV de 90 grados: el borde de pantalla queda a 128 unidades del centro
    let delta: Vec<i16> = (0..SCREEN_WIDTH)
        .map(|x| {
            let t = (x as f64 - HALF_WIDTH) / HALF_WIDTH;
            (t.atan() * 1024.0 / (2.0 * std::f64::consts::PI)).round() as i16
        })
        .collect();
    emit(&mut out, "DELTA_ANGLE", "i16", &delta);

    let near_d = |i: usize| (MIN_DIST + 4 * i) as f64;
    let far_d = |i: usize| (MIN_DIST + 32 * i) as f64;
    let near_h: Vec<u8> = (0..256).map(|i| height_for(near_d(i))).collect();
    let near_s: Vec<u16> = (0..256).map(|i| step_for(near_d(i))).collect();
    let far_h: Vec<u8> = (0..256).map(|i| height_for(far_d(i))).collect();
    let far_s: Vec<u16> = (0..256).map(|i| step_for(far_d(i))).collect();
    emit(&mut out, "NEAR_HEIGHT", "u8", &near_h);
    emit(&mut out, "NEAR_STEP", "u16", &near_s);
    emit(&mut out, "FAR_HEIGHT", "u8", &far_h);
    emit(&mut out, "FAR_STEP", "u16", &far_s);

    // Más cerca que MIN_DIST la pared desborda la pantalla: se recorta la textura
    let overflow_offset: Vec<u16> = (0..MIN_DIST)
        .map(|d| {
            let d = d.max(1) as f64;
            let visible = HORIZON * d / HEIGHT_FACTOR;
            ((TEXTURE_SIZE / 2.0) * (1.0 - visible) * 256.0).round().max(0.0) as u16
        })
        .collect();
    let overflow_step: Vec<u16> = (0..MIN_DIST).map(|d| step_for(d.max(1) as f64)).collect();
    emit(&mut out, "OVERFLOW_OFFSET", "u16", &overflow_offset);
    emit(&mut out, "OVERFLOW_STEP", "u16", &overflow_step);

    let recip: Vec<u32> = (0..RECIP_LEN).map(|i| if i == 0 { 0 } else { (1u32 << 16) / i as u32 }).collect();
    emit(&mut out, "RECIP", "u32", &recip);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR lo define cargo");
    fs::write(Path::new(&out_dir).join("tables.rs"), out).expect("no se pudo escribir tables.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
