// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

mod addressing;
mod automaton;
mod config;
mod display;
mod input;
mod pacing;
mod session;

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use std::{collections::VecDeque, path::PathBuf, sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::Fullscreen,
};

use crate::automaton::{Automaton, Life};
use crate::config::Settings;
use crate::display::Display;
use crate::input::{Command, InputEvent, InputTranslator, Viewport};
use crate::pacing::{FrameStats, Rates};
use crate::session::{Playback, Session};

fn window_title(settings: &Settings, generation: u64, playback: Playback, rates: Option<Rates>) -> String {
    let mut title = format!(
        "torolife - {}x{} | gen {}",
        settings.width, settings.height, generation
    );
    if let Some(rates) = rates {
        title.push_str(&format!(
            " | {:.0} FPS | {:.0} gen/s",
            rates.fps, rates.generations_per_second
        ));
    }
    if playback == Playback::Paused {
        title.push_str(" | paused");
    }
    title
}

/// Tracks what the title bar shows; yields a new title when the rates window
/// rolls over or playback changes.
struct TitleBar {
    playback: Playback,
    rates: Option<Rates>,
}

impl TitleBar {
    fn new(playback: Playback) -> Self {
        Self {
            playback,
            rates: None,
        }
    }

    fn refresh(
        &mut self,
        settings: &Settings,
        generation: u64,
        playback: Playback,
        rates: Option<Rates>,
    ) -> Option<String> {
        let rates_changed = rates.is_some();
        if rates_changed {
            self.rates = rates;
        }
        if !rates_changed && playback == self.playback {
            return None;
        }
        self.playback = playback;
        Some(window_title(settings, generation, playback, self.rates))
    }
}

fn main() -> anyhow::Result<()> {
    use env_logger::Env;
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let settings_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_path);
    let settings = Settings::load_or_default(&settings_path);
    log::info!("settings from {:?}: {:?}", settings_path, settings);

    let life = Life::new(settings.width as usize, settings.height as usize)?;

    let event_loop = EventLoop::new().context("creating event loop")?;
    let mut attributes = winit::window::WindowAttributes::default()
        .with_title(window_title(&settings, 0, Playback::Active, None))
        .with_inner_size(PhysicalSize::new(
            settings.width * settings.pixel_scale,
            settings.height * settings.pixel_scale,
        ));
    if settings.fullscreen {
        attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = Arc::new(
        event_loop
            .create_window(attributes)
            .context("creating window")?,
    );

    let mut display = pollster::block_on(Display::new(
        window.clone(),
        settings.width,
        settings.height,
        settings.vsync,
    ))?;

    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let start = Instant::now();
    let mut session = Session::new(life, rng, &settings, start);
    session.handle_event(InputEvent::Command(Command::Reseed));

    let mut translator = InputTranslator::new(Viewport::new(
        settings.width,
        settings.height,
        window.inner_size(),
    ));
    let mut pending: VecDeque<InputEvent> = VecDeque::new();
    let mut stats = FrameStats::new(start);
    let mut title = TitleBar::new(session.playback());
    let mut failure: Option<anyhow::Error> = None;

    event_loop
        .run(|event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, window_id } if window_id == window.id() => {
                    match event {
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            match session.frame(pending.drain(..), &mut display, now) {
                                Ok(advanced) => stats.record(advanced),
                                Err(err) => {
                                    log::error!("presenting frame failed: {err:#}");
                                    failure = Some(err);
                                }
                            }

                            if session.is_stopped() {
                                target.exit();
                                return;
                            }

                            if let Some(text) = title.refresh(
                                &settings,
                                session.generation(),
                                session.playback(),
                                stats.poll(now),
                            ) {
                                window.set_title(&text);
                            }
                        }
                        event => {
                            if let WindowEvent::Resized(size) = event {
                                display.resize(size);
                            }
                            if let Some(input) = translator.translate(&event) {
                                pending.push_back(input);
                            }
                        }
                    }
                }
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .context("running event loop")?;

    if let Some(err) = failure {
        return Err(err);
    }
    let live = session.automaton().cells().iter().filter(|&&c| c).count();
    log::info!(
        "stopped after {} generations with {} live cells, camera at {}",
        session.generation(),
        live,
        session.camera_position()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_shows_rates_and_pause() {
        let settings = Settings {
            width: 64,
            height: 32,
            ..Settings::default()
        };
        assert_eq!(
            window_title(&settings, 12, Playback::Active, None),
            "torolife - 64x32 | gen 12"
        );

        let rates = Rates {
            fps: 59.7,
            generations_per_second: 30.2,
        };
        assert_eq!(
            window_title(&settings, 12, Playback::Paused, Some(rates)),
            "torolife - 64x32 | gen 12 | 60 FPS | 30 gen/s | paused"
        );
    }

    #[test]
    fn title_follows_pause_without_waiting_for_rates() {
        let settings = Settings {
            width: 8,
            height: 4,
            ..Settings::default()
        };
        let mut title = TitleBar::new(Playback::Active);
        assert_eq!(title.refresh(&settings, 1, Playback::Active, None), None);

        assert_eq!(
            title.refresh(&settings, 2, Playback::Paused, None).as_deref(),
            Some("torolife - 8x4 | gen 2 | paused")
        );
        assert_eq!(title.refresh(&settings, 2, Playback::Paused, None), None);

        let rates = Rates {
            fps: 60.0,
            generations_per_second: 0.0,
        };
        assert_eq!(
            title.refresh(&settings, 2, Playback::Paused, Some(rates)).as_deref(),
            Some("torolife - 8x4 | gen 2 | 60 FPS | 0 gen/s | paused")
        );
        // Last rates stay in the title on a playback change.
        assert_eq!(
            title.refresh(&settings, 2, Playback::Active, None).as_deref(),
            Some("torolife - 8x4 | gen 2 | 60 FPS | 0 gen/s")
        );
    }
}
