use std::error::Error;
use std::time::{Duration, Instant};

use doomcast::config::DEFAULT_CONFIG_PATH;
use doomcast::event::{GameEvent, SoundCue, SoundVolume};
use doomcast::player::{Weapon, TURN_SPEED};
use doomcast::render::{self, HEIGHT, WIDTH};
use doomcast::{EngineConfig, TickInput, World};
use log::{info, warn};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Scale, Window, WindowOptions};
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};

const TICKS_PER_SECOND: u64 = 20;

#[derive(Copy, Clone, PartialEq, Eq)]
enum GameState {
    Playing,
    Dead,
    Victory,
}

/// Tonos sintetizados para cada señal de sonido; sin dispositivo se queda mudo.
struct Audio {
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
    volume: f32,
}

impl Audio {
    fn open(volume: f32) -> Self {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Self { _stream: Some(stream), handle: Some(handle), volume },
            Err(err) => {
                warn!("sin audio: {err}");
                Self { _stream: None, handle: None, volume }
            }
        }
    }

    fn play(&self, cue: SoundCue, volume: SoundVolume) {
        let Some(handle) = self.handle.as_ref() else { return; };
        let (freq, ms) = match cue {
            SoundCue::DoorOpen | SoundCue::DoorClose => (110.0, 300),
            SoundCue::SwitchOn => (660.0, 80),
            SoundCue::Umf => (90.0, 120),
            SoundCue::Punch => (150.0, 60),
            SoundCue::Pistol => (440.0, 60),
            SoundCue::Shotgun => (220.0, 150),
            SoundCue::RocketLaunch => (180.0, 250),
            SoundCue::Explosion => (60.0, 400),
            SoundCue::ItemPickup => (880.0, 60),
            SoundCue::WeaponPickup => (990.0, 150),
            SoundCue::EnemySight => (330.0, 200),
            SoundCue::EnemyAttack => (400.0, 80),
            SoundCue::EnemyPain => (260.0, 120),
            SoundCue::EnemyDeath => (140.0, 350),
            SoundCue::Claw => (300.0, 90),
            SoundCue::PlayerPain => (200.0, 150),
            SoundCue::Teleport => (520.0, 300),
        };
        let level = match volume {
            SoundVolume::Loud => 1.0,
            SoundVolume::Medium => 0.5,
            SoundVolume::Quiet => 0.2,
        };
        if let Ok(sink) = Sink::try_new(handle) {
            sink.set_volume(self.volume * level);
            sink.append(SineWave::new(freq).take_duration(Duration::from_millis(ms)).amplify(0.3));
            sink.detach();
        }
    }
}

fn read_input(window: &Window, prev_mouse_x: &mut Option<f32>, sensitivity: i32) -> TickInput {
    let down = |keys: &[Key]| keys.iter().any(|&k| window.is_key_down(k));
    let axis = |neg: &[Key], pos: &[Key]| down(pos) as i32 - down(neg) as i32;

    let mut turn = axis(&[Key::Left], &[Key::Right]) * TURN_SPEED;
    // giro con el ratón arrastrando con el botón izquierdo
    if sensitivity != 0 && window.get_mouse_down(MouseButton::Left) {
        if let Some((mx, _)) = window.get_mouse_pos(MouseMode::Pass) {
            if let Some(prev) = *prev_mouse_x {
                turn += (mx - prev) as i32 * sensitivity;
            }
            *prev_mouse_x = Some(mx);
        }
    } else {
        *prev_mouse_x = None;
    }

    let select = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5]
        .iter()
        .position(|&k| window.is_key_pressed(k, KeyRepeat::No))
        .map(|i| Weapon::ALL[i]);

    TickInput {
        forward: axis(&[Key::S, Key::Down], &[Key::W, Key::Up]),
        strafe: axis(&[Key::A], &[Key::D]),
        turn,
        fire: down(&[Key::Space, Key::LeftCtrl, Key::RightCtrl]),
        activate: window.is_key_pressed(Key::E, KeyRepeat::No),
        select,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = EngineConfig::load(&config_path)?;
    let level = config.load_level()?;
    let mut world = World::from_level(&level, config.seed)?;

    let mut buffer = vec![0u32; WIDTH * HEIGHT];
    let scale = match config.window_scale {
        1 => Scale::X1,
        4 => Scale::X4,
        _ => Scale::X2,
    };
    let mut window = Window::new(
        &format!("doomcast - {}", level.name),
        WIDTH,
        HEIGHT,
        WindowOptions { resize: false, scale, ..WindowOptions::default() },
    )?;
    window.limit_update_rate(Some(Duration::from_micros(1_000_000 / TICKS_PER_SECOND)));

    let audio = Audio::open(config.audio_volume);
    let mut state = GameState::Playing;
    let mut prev_mouse_x: Option<f32> = None;
    let mut last_title = Instant::now();
    let mut frames: u32 = 0;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        match state {
            GameState::Playing => {
                let input = read_input(&window, &mut prev_mouse_x, config.mouse_sensitivity);
                for event in world.tick(&input) {
                    match event {
                        GameEvent::Sound { cue, volume } => audio.play(cue, volume),
                        GameEvent::LevelComplete => state = GameState::Victory,
                        GameEvent::MissingKey(key) => info!("falta la llave {key:?}"),
                        GameEvent::SecretFound => info!("¡secreto encontrado!"),
                        _ => {}
                    }
                }
                if world.stats().is_dead() {
                    state = GameState::Dead;
                }
            }
            GameState::Dead | GameState::Victory => {
                if window.is_key_pressed(Key::Enter, KeyRepeat::No) {
                    world = World::from_level(&level, config.seed)?;
                    state = GameState::Playing;
                }
            }
        }

        let frame = world.trace_frame();
        render::draw_frame(&mut buffer, &frame);
        render::draw_hud(&mut buffer, world.stats());
        window.update_with_buffer(&buffer, WIDTH, HEIGHT)?;

        frames += 1;
        if last_title.elapsed() >= Duration::from_millis(500) {
            let fps = frames as f32 / last_title.elapsed().as_secs_f32();
            let status = match state {
                GameState::Playing => format!("{:?}", world.stats().weapon),
                GameState::Dead => "muerto, ENTER para reiniciar".to_string(),
                GameState::Victory => "nivel completado, ENTER para repetir".to_string(),
            };
            window.set_title(&format!(
                "{} | bajas {}/{} | secretos {}/{} | {} | {:.0} fps",
                world.level_name(),
                world.kills(),
                world.total_enemies(),
                world.secrets_found(),
                world.secrets_total(),
                status,
                fps
            ));
            frames = 0;
            last_title = Instant::now();
        }
    }
    Ok(())
}
