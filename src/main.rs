/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::step;
use sim::world::World;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    env_logger::init();

    let config = GameConfig::load();
    let mut world = World::new(&config);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Jojo!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let mut rng = rand::thread_rng();
    let tick_rate = Duration::from_secs_f64(1.0 / config.timing.frame_rate.max(1) as f64);
    let mut last_tick = Instant::now();

    // Presses seen between ticks, so a tap shorter than a frame still counts.
    let mut pending = FrameInput::default();

    renderer.render(world)?;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        latch(&mut pending, kb.frame_input(&gp));

        if last_tick.elapsed() >= tick_rate {
            let input = std::mem::take(&mut pending);
            let outcome = step::step(world, &input, &mut rng);
            process_sound_events(sound, &outcome.events);
            if outcome.quit {
                break;
            }

            renderer.render(world)?;
            last_tick += tick_rate;
            // Don't try to catch up after a stall.
            if last_tick.elapsed() > tick_rate * 4 {
                last_tick = Instant::now();
            }
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Fold one poll into the input for the next tick: held state is the
/// latest seen, edges stay set until the tick consumes them.
fn latch(pending: &mut FrameInput, now: FrameInput) {
    pending.player = now.player;
    pending.shoot = now.shoot || pending.shoot;
    pending.jump |= now.jump;
    pending.dash |= now.dash;
    pending.pause |= now.pause;
    pending.menu_up |= now.menu_up;
    pending.menu_down |= now.menu_down;
    pending.confirm |= now.confirm;
    pending.menu_pick = pending.menu_pick.or(now.menu_pick);
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for cue in events.iter().filter_map(GameEvent::cue) {
        sfx.play(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::entity::PlayerInput;

    #[test]
    fn latch_keeps_edges_until_consumed() {
        let mut pending = FrameInput::default();
        latch(&mut pending, FrameInput { jump: true, ..Default::default() });
        latch(&mut pending, FrameInput {
            player: PlayerInput { left: true, ..Default::default() },
            ..Default::default()
        });
        assert!(pending.jump);
        assert!(pending.player.left);

        let taken = std::mem::take(&mut pending);
        assert!(taken.jump);
        assert_eq!(pending, FrameInput::default());
    }

    #[test]
    fn held_state_follows_latest_poll() {
        let mut pending = FrameInput::default();
        latch(&mut pending, FrameInput {
            player: PlayerInput { right: true, ..Default::default() },
            ..Default::default()
        });
        latch(&mut pending, FrameInput::default());
        assert!(!pending.player.right);
    }
}
