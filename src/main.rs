/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FoodKind;
use sim::event::GameEvent;
use sim::level::{LevelError, LevelSource};
use sim::step;
use sim::world::{Phase, World};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_CONFIRM, KEYS_PAUSE, KEYS_QUIT};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "pacmaze.log";

/// Message durations, in ticks.
const MSG_SHORT: u32 = 60;
const MSG_LONG: u32 = 150;

fn main() {
    init_logging();

    let config = GameConfig::load();
    let source = LevelSource::from_config(&config);
    let sound = if config.sound.enabled { SoundEngine::new() } else { None };
    let mut world = World::new(config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &source, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Pac Maze!");
    println!("Final Score: {}", world.player.score);
}

/// The terminal belongs to the renderer, so log lines go to a file.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_logging() {
    let Ok(file) = File::create(LOG_FILE) else { return };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

// ── Game clock ──

/// Milliseconds since startup, frozen while paused so that timed states
/// (immunity, death grace) do not run out behind the pause screen.
struct GameClock {
    start: Instant,
    paused_total: Duration,
    paused_at: Option<Instant>,
}

impl GameClock {
    fn new() -> Self {
        GameClock { start: Instant::now(), paused_total: Duration::ZERO, paused_at: None }
    }

    fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += at.elapsed();
        }
    }

    fn now_ms(&self) -> u64 {
        let until = self.paused_at.unwrap_or_else(Instant::now);
        let running = until.duration_since(self.start).saturating_sub(self.paused_total);
        running.as_millis() as u64
    }
}

// ── Loop ──

fn game_loop(
    world: &mut World,
    source: &LevelSource,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&world.config.gamepad);
    let mut clock = GameClock::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(world.config.tick_rate_ms);

    let mut pending_dir = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, source, sound, &kb, &gp, &mut clock) {
            break;
        }

        if world.phase == Phase::Playing {
            if let Some(dir) = kb.direction().or(gp.direction()) {
                pending_dir = Some(dir);
            }
        } else {
            pending_dir = None;
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Playing {
                tick_message(world);
                let now = clock.now_ms();
                let events = step::step(world, pending_dir.take(), now);
                process_events(world, source, sound, &events);

                let grace = world.config.player.death_grace_ms;
                if world.player.dead && world.player.time_since_death(now) >= grace {
                    log::info!("game over at level {}, score {}", world.current_level, world.player.score);
                    world.phase = Phase::GameOver;
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Count the on-screen message down by one tick; it disappears at zero.
fn tick_message(world: &mut World) {
    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }
}

fn process_events(world: &mut World, source: &LevelSource, sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        log::debug!("{event:?}");
        if let Some(sfx) = sound {
            match event {
                GameEvent::LevelLoaded { .. } => sfx.play_start(),
                GameEvent::FoodEaten { kind: FoodKind::Common, .. } => sfx.play_eat(),
                GameEvent::FoodEaten { .. } => sfx.play_bonus(),
                GameEvent::PlayerHit { .. } => sfx.play_hit(),
                GameEvent::PlayerKilled => sfx.play_die(),
                GameEvent::LevelCleared { .. } => sfx.play_clear(),
                GameEvent::PlayerHealed { .. } | GameEvent::ImmunityGranted => {}
            }
        }

        match *event {
            GameEvent::LevelLoaded { level } => world.set_message(&format!("Level {level}"), MSG_SHORT),
            GameEvent::FoodEaten { kind: FoodKind::Common, .. } => {}
            GameEvent::FoodEaten { points, .. } => world.set_message(&format!("Bonus +{points}"), MSG_SHORT),
            GameEvent::PlayerHit { health } => world.set_message(&format!("Ouch! {health} health left"), MSG_SHORT),
            GameEvent::PlayerHealed { health } => world.set_message(&format!("Healed to {health}"), MSG_SHORT),
            GameEvent::ImmunityGranted => world.set_message("Shield up!", MSG_SHORT),
            GameEvent::PlayerKilled => world.set_message("Caught!", MSG_LONG),
            GameEvent::LevelCleared { level } => go_to_level(world, source, sound, level + 1),
        }
    }
}

// ── Level transitions ──

/// Load `level`. Running out of levels finishes the game; an unreadable
/// level sends the player back to the title screen.
fn go_to_level(world: &mut World, source: &LevelSource, sound: Option<&SoundEngine>, level: u32) {
    match world.load(level, source) {
        Ok(()) => {
            world.phase = Phase::Playing;
            process_events(world, source, sound, &[GameEvent::LevelLoaded { level }]);
        }
        Err(LevelError::NotFound { .. }) => {
            log::info!("no level {level}; game complete with score {}", world.player.score);
            world.phase = Phase::GameComplete;
        }
        Err(e) => {
            world.phase = Phase::Title;
            world.set_message(&e.to_string(), MSG_LONG);
        }
    }
}

fn start_new_game(world: &mut World, source: &LevelSource, sound: Option<&SoundEngine>, clock: &mut GameClock) {
    clock.resume();
    world.restart();
    go_to_level(world, source, sound, 1);
}

/// Debug level hop. A missing level is reported and otherwise ignored.
fn jump_to_level(world: &mut World, source: &LevelSource, sound: Option<&SoundEngine>, level: u32) {
    match world.load(level, source) {
        Ok(()) => process_events(world, source, sound, &[GameEvent::LevelLoaded { level }]),
        Err(e) => world.set_message(&e.to_string(), MSG_SHORT),
    }
}

// ── Meta input (phases, pause, debug keys) ──

/// Returns true when the player asked to quit.
fn handle_meta(
    world: &mut World,
    source: &LevelSource,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    gp: &GamepadState,
    clock: &mut GameClock,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let pause = kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed();
    let quit = kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed();

    if quit {
        return true;
    }

    match world.phase {
        Phase::Title | Phase::GameOver | Phase::GameComplete => {
            if confirm {
                start_new_game(world, source, sound, clock);
            }
        }

        Phase::Playing => {
            if pause {
                clock.pause();
                world.phase = Phase::Paused;
                return false;
            }
            if world.config.debug {
                if kb.was_pressed(KeyCode::F(1)) {
                    start_new_game(world, source, sound, clock);
                } else if kb.was_pressed(KeyCode::F(2)) {
                    jump_to_level(world, source, sound, world.current_level + 1);
                } else if kb.was_pressed(KeyCode::F(3)) && world.current_level > 1 {
                    jump_to_level(world, source, sound, world.current_level - 1);
                }
            }
        }

        Phase::Paused => {
            if pause || confirm {
                clock.resume();
                world.phase = Phase::Playing;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_frozen_while_paused() {
        let mut clock = GameClock::new();
        clock.pause();
        let a = clock.now_ms();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(clock.now_ms(), a);
        clock.resume();
        clock.resume();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.now_ms() >= a);
    }

    #[test]
    fn messages_expire_after_their_duration() {
        let mut w = World::new(GameConfig::default());
        w.set_message("Shield up!", 2);
        tick_message(&mut w);
        assert_eq!(w.message, "Shield up!");
        tick_message(&mut w);
        assert!(w.message.is_empty());
        tick_message(&mut w);
        assert_eq!(w.message_timer, 0);
    }

    #[test]
    fn clearing_a_level_advances_with_health_and_score() {
        let src = LevelSource::Memory(vec![
            vec!["=P*G".to_string()],
            vec!["==*".to_string(), "P *".to_string()],
        ]);
        let mut w = World::new(GameConfig::default());
        let mut clock = GameClock::new();
        start_new_game(&mut w, &src, None, &mut clock);
        w.player.score = 12;
        assert!(w.player.take_damage(0));

        process_events(&mut w, &src, None, &[GameEvent::LevelCleared { level: 1 }]);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.current_level, 2);
        assert_eq!(w.message, "Level 2");
        assert_eq!(w.player.score, 12);
        assert_eq!(w.player.health, w.player.max_health - 1);
        assert_eq!(w.foods.len(), 2);
    }

    #[test]
    fn running_out_of_levels_completes_the_game() {
        let src = LevelSource::Memory(vec![vec!["=P*".to_string()]]);
        let mut w = World::new(GameConfig::default());
        let mut clock = GameClock::new();
        start_new_game(&mut w, &src, None, &mut clock);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.message, "Level 1");

        process_events(&mut w, &src, None, &[GameEvent::LevelCleared { level: 1 }]);
        assert_eq!(w.phase, Phase::GameComplete);
        // The last level stays on screen behind the banner.
        assert_eq!(w.current_level, 1);
    }
}
