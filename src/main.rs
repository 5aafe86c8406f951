/// Entry point and game loop.
///
/// The loop is the host adapter around a `Session`: it samples keyboard
/// and gamepad input, measures elapsed frame time, drives the session
/// through the `Lifecycle` trait, and hands the resulting events to the
/// sound engine.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use crossterm::terminal;

use config::GameConfig;
use domain::entity::AnimState;
use sim::event::GameEvent;
use sim::session::{Lifecycle, Session};
use sim::world::Phase;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Longest simulated frame. A stall (terminal suspended, laptop asleep)
/// becomes one clamped step instead of a catapult.
const MAX_DT: f32 = 0.1;

fn main() {
    let config = GameConfig::load();

    let mut session = Session::new(&config);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    session.initialize();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    session.teardown();
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Glade Fray!");
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(session, sound, &kb, &gp) {
            break;
        }

        // Terminal size drives the resize lifecycle hook
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if (tw, th) != session.view_size() {
            session.resize(tw, th);
            renderer.invalidate();
        }

        let dt = last_frame.elapsed().as_secs_f32().min(MAX_DT);
        last_frame = Instant::now();

        if session.world.phase == Phase::Playing {
            let mut input = kb.frame_input();
            input.left |= gp.left_held();
            input.right |= gp.right_held();
            input.up |= gp.up_held();
            input.down |= gp.down_held();
            input.jump |= gp.jump_held();
            input.attack |= gp.attack_pressed();
            session.queue_input(input);
        }

        let events = session.step(dt);
        process_sound_events(sound, &events);

        if let Some(sfx) = sound {
            let running = session.world.player.is_alive()
                && session.world.player.anim.state() == AnimState::Running;
            sfx.walk(running);
        }

        renderer.render(&session.world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::SwordSwing => sfx.play_swish(),
            GameEvent::EnemyHurt { variant, .. } => sfx.play_enemy_grunt(*variant),
            GameEvent::PlayerHurt => sfx.play_player_grunt(),
            GameEvent::PlayerDied => sfx.play_die(),
            GameEvent::Victory => sfx.play_victory(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_MUSIC: &[KeyCode] = &[KeyCode::Char('m'), KeyCode::Char('M')];
const KEYS_GRID: &[KeyCode] = &[KeyCode::Char('g'), KeyCode::Char('G')];
const KEYS_COORDS: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Handle meta keys (phase transitions, toggles). Returns true to quit.
fn handle_meta(
    session: &mut Session,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    gp: &GamepadState,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    // Global toggles
    if kb.any_pressed(KEYS_MUSIC) {
        if let Some(sfx) = sound {
            let on = sfx.toggle_music();
            let msg = if on { "Music on" } else { "Music off" };
            session.world.set_message(msg, 2.0);
        }
    }
    if kb.any_pressed(KEYS_GRID) {
        session.world.show_grid = !session.world.show_grid;
    }
    if kb.any_pressed(KEYS_COORDS) {
        session.world.show_coords = !session.world.show_coords;
    }

    match session.world.phase {
        Phase::Title => {
            if confirm {
                session.begin();
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }
        Phase::Playing => {
            if esc {
                return true;
            }
            if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                session.restart();
            }
        }
        Phase::GameOver | Phase::Victory => {
            if esc {
                return true;
            }
            if confirm || kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                session.restart();
            }
        }
    }

    false
}
