//! Headless симуляция Skyhop
//!
//! Грузит демо-уровень (или JSON из первого аргумента) и гоняет
//! актора по скриптованному input без рендера.

use skyhop_simulation::{create_headless_app, load_level, log_error, log_info, ActorState, Controls, LevelConfig};

fn scripted_controls(tick: u32) -> Controls {
    match tick {
        // Падаем на пол и стоим
        0..=59 => Controls::IDLE,
        // Разбег вправо
        60..=99 => Controls {
            right: true,
            ..Controls::IDLE
        },
        // Прыжок + двойной прыжок на вершине дуги
        100 | 125 => Controls {
            right: true,
            jump_requested: true,
            ..Controls::IDLE
        },
        101..=180 => Controls {
            right: true,
            ..Controls::IDLE
        },
        _ => Controls::IDLE,
    }
}

fn main() {
    let level = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| LevelConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(level) => level,
            Err(e) => {
                log_error(&format!("Failed to load level {}: {}", path, e));
                std::process::exit(1);
            }
        },
        None => LevelConfig::demo(),
    };

    let mut app = create_headless_app(skyhop_simulation::DEFAULT_TICK_HZ);
    println!("Starting Skyhop headless simulation ({} platforms)", level.platforms.len());

    let actors = match load_level(app.world_mut(), &level) {
        Ok(actors) => actors,
        Err(e) => {
            log_error(&format!("Invalid level: {}", e));
            std::process::exit(1);
        }
    };

    // Запускаем 600 тиков симуляции (10 секунд при 60Hz)
    for tick in 0..600u32 {
        let controls = scripted_controls(tick);
        for &entity in &actors {
            if let Some(mut c) = app.world_mut().get_mut::<Controls>(entity) {
                *c = controls;
            }
        }

        app.update();

        if tick % 60 == 0 {
            for &entity in &actors {
                if let Some(actor) = app.world().get::<ActorState>(entity) {
                    log_info(&format!(
                        "Tick {}: {:?} pos={:?} vel={:?} jumps={} support={:?}",
                        tick, entity, actor.position, actor.velocity, actor.jumps_remaining, actor.support
                    ));
                }
            }
        }
    }

    println!("Simulation complete!");
}
