//! Impactos de bala sobre la pared: una nube suelta o el grupo de la escopeta.

pub const MAX_PARTICLES: usize = 4;
pub const FRAME_TICKS: u8 = 3;
pub const FRAMES: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Puff,
    /// Grupo de escopeta; la variante rota entre 4 dibujos.
    Group { variant: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Particle {
    pub x: i32,
    pub y: i32,
    pub frame: u8,
    timer: u8,
    pub kind: ParticleKind,
}

#[derive(Clone, Debug, Default)]
pub struct Particles {
    slots: [Option<Particle>; MAX_PARTICLES],
    group_counter: u8,
}

impl Particles {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_PARTICLES];
    }

    pub fn spawn_puff(&mut self, x: i32, y: i32) {
        self.spawn(x, y, ParticleKind::Puff);
    }

    pub fn spawn_group(&mut self, x: i32, y: i32) {
        let variant = self.group_counter & 3;
        self.group_counter = self.group_counter.wrapping_add(1);
        self.spawn(x, y, ParticleKind::Group { variant });
    }

    /// Hueco libre o, si no hay, la partícula más avanzada en su animación.
    fn spawn(&mut self, x: i32, y: i32, kind: ParticleKind) {
        let slot = self.slots.iter().position(Option::is_none).unwrap_or_else(|| {
            let mut best = 0;
            let mut best_frame = 0;
            for (i, p) in self.slots.iter().enumerate() {
                if let Some(p) = p {
                    if p.frame > best_frame {
                        best_frame = p.frame;
                        best = i;
                    }
                }
            }
            best
        });
        self.slots[slot] = Some(Particle { x, y, frame: 0, timer: FRAME_TICKS, kind });
    }

    pub fn update(&mut self) {
        for slot in self.slots.iter_mut() {
            let Some(p) = slot else { continue; };
            if p.timer > 0 {
                p.timer -= 1;
                continue;
            }
            p.frame += 1;
            if p.frame >= FRAMES {
                *slot = None;
            } else {
                p.timer = FRAME_TICKS;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().flatten()
    }

    pub fn active_count(&self) -> usize { self.iter().count() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puff_lives_four_frames() {
        let mut p = Particles::new();
        p.spawn_puff(100, 200);
        let mut ticks = 0;
        while p.active_count() > 0 {
            p.update();
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks, (FRAME_TICKS as usize + 1) * FRAMES as usize);
    }

    #[test]
    fn full_pool_evicts_most_advanced() {
        let mut p = Particles::new();
        p.spawn_puff(0, 0);
        for _ in 0..=FRAME_TICKS {
            p.update();
        }
        for i in 1..4 {
            p.spawn_puff(i, 0);
        }
        assert_eq!(p.active_count(), 4);
        p.spawn_puff(99, 0);
        assert_eq!(p.active_count(), 4);
        assert!(p.iter().all(|q| q.x != 0));
        assert!(p.iter().any(|q| q.x == 99));
    }

    #[test]
    fn group_variants_rotate() {
        let mut p = Particles::new();
        for _ in 0..4 {
            p.spawn_group(0, 0);
        }
        let mut v: Vec<u8> = p
            .iter()
            .map(|q| match q.kind {
                ParticleKind::Group { variant } => variant,
                ParticleKind::Puff => 255,
            })
            .collect();
        v.sort();
        assert_eq!(v, vec![0, 1, 2, 3]);
    }
}
