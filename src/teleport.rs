//! Niebla de teletransporte: se dibuja en el origen y en el destino de un salto.

pub const MAX_TELEPORT_FX: usize = 2;
/// Ticks por fotograma.
pub const ANIM_RATE: u8 = 2;
pub const FRAME_COUNT: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeleportFog {
    pub x: u16,
    pub y: u16,
    /// 0..FRAME_COUNT
    pub frame: u8,
    timer: u8,
}

#[derive(Clone, Debug, Default)]
pub struct TeleportFogs {
    slots: [Option<TeleportFog>; MAX_TELEPORT_FX],
}

impl TeleportFogs {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_TELEPORT_FX];
    }

    /// Sin hueco libre no aparece; a diferencia de las partículas no se expulsa a nadie.
    pub fn spawn(&mut self, x: u16, y: u16) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) else { return false; };
        *slot = Some(TeleportFog { x, y, frame: 0, timer: 0 });
        true
    }

    pub fn update(&mut self) {
        for slot in self.slots.iter_mut() {
            let Some(fx) = slot else { continue; };
            fx.timer += 1;
            if fx.timer < ANIM_RATE { continue; }
            fx.timer = 0;
            fx.frame += 1;
            if fx.frame >= FRAME_COUNT {
                *slot = None;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeleportFog> {
        self.slots.iter().flatten()
    }

    pub fn active_count(&self) -> usize { self.iter().count() }
}
