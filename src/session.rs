// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

//! The interactive session: camera, pointer drags, playback and the per-frame
//! poll -> render -> advance pipeline.

use rand::Rng;
use std::time::Instant;

use crate::addressing::{
    advance_camera, camera_delta_for, cell_index_for, pixel_to_cell_index, pointer_pixel,
};
use crate::automaton::Automaton;
use crate::config::Settings;
use crate::display::Presenter;
use crate::input::{Command, InputEvent, PointerButton};
use crate::pacing::FramePacer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Active,
    Paused,
    /// Terminal. Every later event and frame is ignored.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: u32,
    pub background: u32,
}

/// Held state of each pointer button, kept until the matching release.
#[derive(Debug, Default, Clone, Copy)]
struct Buttons {
    primary: bool,
    secondary: bool,
    middle: bool,
}

pub struct Session<A, R> {
    automaton: A,
    rng: R,
    palette: Palette,
    filling_percentage: u8,
    playback: Playback,
    camera_position: usize,
    buttons: Buttons,
    pan_anchor: (i32, i32),
    pixels: Vec<u32>,
    pacer: FramePacer,
    generation: u64,
}

impl<A: Automaton, R: Rng> Session<A, R> {
    pub fn new(automaton: A, rng: R, settings: &Settings, now: Instant) -> Self {
        let count = automaton.count();
        Self {
            automaton,
            rng,
            palette: Palette {
                primary: settings.primary_color,
                background: settings.background_color,
            },
            filling_percentage: settings.filling_percentage.min(100),
            playback: Playback::Active,
            camera_position: 0,
            buttons: Buttons::default(),
            pan_anchor: (0, 0),
            pixels: vec![settings.background_color; count],
            pacer: FramePacer::new(settings.max_fps, now),
            generation: 0,
        }
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_stopped(&self) -> bool {
        self.playback == Playback::Stopped
    }

    pub fn camera_position(&self) -> usize {
        self.camera_position
    }

    /// Number of generations advanced so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn automaton(&self) -> &A {
        &self.automaton
    }

    /// Runs one frame: applies `events` in order, redraws and presents, then
    /// advances the automaton if the pacer says a generation is due.
    ///
    /// Returns whether a generation was advanced. A presenter error stops the
    /// session and is returned to the caller.
    pub fn frame<P, I>(&mut self, events: I, presenter: &mut P, now: Instant) -> anyhow::Result<bool>
    where
        P: Presenter + ?Sized,
        I: IntoIterator<Item = InputEvent>,
    {
        if self.is_stopped() {
            return Ok(false);
        }

        for event in events {
            self.handle_event(event);
            if self.is_stopped() {
                log::info!("quit requested at generation {}", self.generation);
                return Ok(false);
            }
        }

        self.render();
        if let Err(err) = presenter.present(&self.pixels) {
            self.playback = Playback::Stopped;
            return Err(err);
        }

        let due = self.pacer.tick(now);
        if due && self.playback == Playback::Active {
            self.automaton.advance();
            self.generation += 1;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        if self.is_stopped() {
            return;
        }
        match event {
            InputEvent::Command(command) => self.apply(command),
            InputEvent::ButtonDown { button, x, y } => self.press(button, x, y),
            InputEvent::ButtonUp { button, x, y } => {
                log::trace!("{button:?} released at ({x}, {y})");
                self.release(button);
            }
            InputEvent::Motion { x, y } => self.motion(x, y),
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Quit => self.playback = Playback::Stopped,
            Command::TogglePause => {
                self.playback = match self.playback {
                    Playback::Active => Playback::Paused,
                    Playback::Paused => Playback::Active,
                    Playback::Stopped => Playback::Stopped,
                };
                log::debug!("playback {:?}", self.playback);
            }
            Command::Reseed => self.reseed(),
            Command::Clear => self.clear(),
        }
    }

    fn press(&mut self, button: PointerButton, x: i32, y: i32) {
        match button {
            PointerButton::Primary => {
                self.paint(x, y, true);
                self.buttons.primary = true;
            }
            PointerButton::Secondary => {
                self.paint(x, y, false);
                self.buttons.secondary = true;
            }
            PointerButton::Middle => {
                if self.buttons.middle {
                    self.pan_to(x, y);
                } else {
                    self.pan_anchor = (x, y);
                }
                self.buttons.middle = true;
            }
        }
    }

    fn release(&mut self, button: PointerButton) {
        match button {
            PointerButton::Primary => self.buttons.primary = false,
            PointerButton::Secondary => self.buttons.secondary = false,
            PointerButton::Middle => self.buttons.middle = false,
        }
    }

    fn motion(&mut self, x: i32, y: i32) {
        if self.buttons.primary {
            self.paint(x, y, true);
        } else if self.buttons.secondary {
            self.paint(x, y, false);
        } else if self.buttons.middle {
            self.pan_to(x, y);
        }
    }

    /// Sets the cell under grid pixel `(x, y)`. Off-grid pointers are ignored.
    fn paint(&mut self, x: i32, y: i32, alive: bool) {
        let (width, height) = (self.automaton.width(), self.automaton.height());
        let Some((px, py)) = pointer_pixel(x, y, width, height) else {
            log::trace!("ignoring pointer outside grid at ({x}, {y})");
            return;
        };
        let pixel_index = pixel_to_cell_index(px, py, width);
        let cell = cell_index_for(pixel_index, self.camera_position, self.automaton.count());
        self.automaton.cells_mut()[cell] = alive;
    }

    /// Moves the camera by anchor minus pointer, so the grid follows the
    /// pointer, then re-anchors at the pointer.
    fn pan_to(&mut self, x: i32, y: i32) {
        let dx = self.pan_anchor.0 as i64 - x as i64;
        let dy = self.pan_anchor.1 as i64 - y as i64;
        let count = self.automaton.count();
        let delta = camera_delta_for(dx, dy, self.automaton.width(), count);
        self.camera_position = advance_camera(self.camera_position, delta, count);
        self.pan_anchor = (x, y);
    }

    fn reseed(&mut self) {
        let threshold = self.filling_percentage;
        let rng = &mut self.rng;
        for cell in self.automaton.cells_mut() {
            *cell = rng.gen_range(0..100u8) < threshold;
        }
        log::debug!("reseeded at {}%", threshold);
    }

    fn clear(&mut self) {
        self.automaton.cells_mut().fill(false);
    }

    /// Rebuilds every pixel from the cell it currently shows.
    pub fn render(&mut self) -> &[u32] {
        let count = self.automaton.count();
        let cells = self.automaton.cells();
        let camera = self.camera_position;
        let Palette { primary, background } = self.palette;
        for (pixel_index, pixel) in self.pixels.iter_mut().enumerate() {
            *pixel = if cells[cell_index_for(pixel_index, camera, count)] {
                primary
            } else {
                background
            };
        }
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;

    const ALIVE: u32 = 0xFFFF_FFFF;
    const DEAD: u32 = 0xFF00_0000;

    /// 8x8 grid whose rule does nothing but count calls.
    struct Grid {
        cells: Vec<bool>,
        advances: u32,
    }

    impl Grid {
        fn new() -> Self {
            Self {
                cells: vec![false; 64],
                advances: 0,
            }
        }
    }

    impl Automaton for Grid {
        fn width(&self) -> usize {
            8
        }
        fn height(&self) -> usize {
            8
        }
        fn cells(&self) -> &[bool] {
            &self.cells
        }
        fn cells_mut(&mut self) -> &mut [bool] {
            &mut self.cells
        }
        fn advance(&mut self) {
            self.advances += 1;
        }
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<u32>>,
        fail: bool,
    }

    impl Presenter for Recorder {
        fn present(&mut self, pixels: &[u32]) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("device lost");
            }
            self.frames.push(pixels.to_vec());
            Ok(())
        }
    }

    fn settings(max_fps: u8, filling_percentage: u8) -> Settings {
        Settings {
            width: 8,
            height: 8,
            max_fps,
            primary_color: ALIVE,
            background_color: DEAD,
            filling_percentage,
            ..Settings::default()
        }
    }

    fn session(max_fps: u8, filling_percentage: u8) -> (Session<Grid, StdRng>, Instant) {
        let now = Instant::now();
        let session = Session::new(
            Grid::new(),
            StdRng::seed_from_u64(7),
            &settings(max_fps, filling_percentage),
            now,
        );
        (session, now)
    }

    fn alive_cells(session: &Session<Grid, StdRng>) -> Vec<usize> {
        let cells = session.automaton().cells();
        (0..cells.len()).filter(|&i| cells[i]).collect()
    }

    fn down(button: PointerButton, x: i32, y: i32) -> InputEvent {
        InputEvent::ButtonDown { button, x, y }
    }

    fn up(button: PointerButton, x: i32, y: i32) -> InputEvent {
        InputEvent::ButtonUp { button, x, y }
    }

    fn motion(x: i32, y: i32) -> InputEvent {
        InputEvent::Motion { x, y }
    }

    fn command(command: Command) -> InputEvent {
        InputEvent::Command(command)
    }

    #[test]
    fn full_reseed_then_clear() {
        let (mut session, _) = session(0, 100);

        session.handle_event(command(Command::Reseed));
        assert_eq!(alive_cells(&session).len(), 64);

        session.handle_event(command(Command::Clear));
        assert!(alive_cells(&session).is_empty());
    }

    #[test]
    fn empty_reseed_kills_everything() {
        let (mut session, _) = session(0, 0);
        session.handle_event(down(PointerButton::Primary, 1, 1));
        session.handle_event(command(Command::Reseed));
        assert!(alive_cells(&session).is_empty());
    }

    #[test]
    fn partial_reseed_is_deterministic_for_a_seed() {
        let (mut a, _) = session(0, 50);
        let (mut b, _) = session(0, 50);
        a.handle_event(command(Command::Reseed));
        b.handle_event(command(Command::Reseed));

        let alive = alive_cells(&a);
        assert_eq!(alive, alive_cells(&b));
        assert!(!alive.is_empty() && alive.len() < 64);
    }

    #[test]
    fn click_paints_one_cell() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Primary, 3, 2));
        assert_eq!(alive_cells(&session), vec![3 + 2 * 8]);
    }

    #[test]
    fn secondary_click_erases() {
        let (mut session, _) = session(0, 100);
        session.handle_event(command(Command::Reseed));
        session.handle_event(down(PointerButton::Secondary, 3, 2));

        let alive = alive_cells(&session);
        assert_eq!(alive.len(), 63);
        assert!(!alive.contains(&19));
    }

    #[test]
    fn off_grid_pointer_is_ignored() {
        let (mut session, _) = session(0, 20);
        for (x, y) in [(-1, 3), (3, -1), (8, 0), (0, 8), (i32::MAX, i32::MIN)] {
            session.handle_event(down(PointerButton::Primary, x, y));
            session.handle_event(motion(x, y));
        }
        assert!(alive_cells(&session).is_empty());
    }

    #[test]
    fn drag_paints_until_release() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Primary, 0, 0));
        session.handle_event(motion(1, 0));
        session.handle_event(motion(2, 0));
        session.handle_event(up(PointerButton::Primary, 2, 0));
        session.handle_event(motion(3, 0));

        assert_eq!(alive_cells(&session), vec![0, 1, 2]);
    }

    #[test]
    fn paint_takes_priority_over_pan() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 4, 4));
        session.handle_event(down(PointerButton::Primary, 4, 4));
        session.handle_event(motion(5, 4));

        assert_eq!(session.camera_position(), 0);
        assert_eq!(alive_cells(&session), vec![36, 37]);
    }

    #[test]
    fn middle_press_only_anchors() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 6, 6));
        assert_eq!(session.camera_position(), 0);
    }

    #[test]
    fn pan_is_incremental() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 4, 4));
        session.handle_event(motion(3, 4));
        assert_eq!(session.camera_position(), 1);
        session.handle_event(motion(2, 4));
        assert_eq!(session.camera_position(), 2);
        session.handle_event(motion(2, 3));
        assert_eq!(session.camera_position(), 10);
    }

    #[test]
    fn pan_wraps_around_the_ring() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 0, 0));
        session.handle_event(motion(1, 0));
        assert_eq!(session.camera_position(), 63);
        session.handle_event(motion(1, 1));
        assert_eq!(session.camera_position(), 55);
    }

    #[test]
    fn pan_and_back_restores_camera() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 2, 2));
        session.handle_event(motion(7, 5));
        assert_ne!(session.camera_position(), 0);
        session.handle_event(motion(2, 2));
        assert_eq!(session.camera_position(), 0);
    }

    #[test]
    fn repeated_middle_press_pans() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 5, 0));
        session.handle_event(down(PointerButton::Middle, 0, 0));
        assert_eq!(session.camera_position(), 5);
    }

    #[test]
    fn release_ends_pan() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 5, 0));
        session.handle_event(up(PointerButton::Middle, 5, 0));
        session.handle_event(motion(0, 0));
        assert_eq!(session.camera_position(), 0);
    }

    #[test]
    fn pan_from_off_window_pointer_still_moves() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Middle, 0, 0));
        session.handle_event(motion(-2, 0));
        assert_eq!(session.camera_position(), 2);
    }

    #[test]
    fn camera_offsets_render_and_paint() {
        let (mut session, _) = session(0, 20);
        // Drag left by five pixels: camera 5.
        session.handle_event(down(PointerButton::Middle, 5, 0));
        session.handle_event(motion(0, 0));
        session.handle_event(up(PointerButton::Middle, 0, 0));
        assert_eq!(session.camera_position(), 5);

        session.handle_event(down(PointerButton::Primary, 0, 0));
        assert_eq!(alive_cells(&session), vec![5]);

        let pixels = session.render();
        assert_eq!(pixels[0], ALIVE);
        assert_eq!(pixels.iter().filter(|&&p| p == ALIVE).count(), 1);
    }

    #[test]
    fn render_wraps_last_pixels() {
        let (mut session, _) = session(0, 20);
        session.handle_event(down(PointerButton::Primary, 0, 0));
        session.handle_event(up(PointerButton::Primary, 0, 0));
        session.handle_event(down(PointerButton::Middle, 1, 0));
        session.handle_event(motion(0, 0));

        // Camera 1: cell 0 now shows at the last pixel.
        let pixels = session.render();
        assert_eq!(pixels[63], ALIVE);
        assert_eq!(pixels[0], DEAD);
    }

    #[test]
    fn frame_presents_then_advances() {
        let (mut session, now) = session(0, 20);
        let mut recorder = Recorder::default();

        let advanced = session
            .frame([down(PointerButton::Primary, 3, 2)], &mut recorder, now)
            .unwrap();

        assert!(advanced);
        assert_eq!(session.generation(), 1);
        assert_eq!(session.automaton().advances, 1);
        // The presented frame already shows the paint from this batch.
        assert_eq!(recorder.frames.len(), 1);
        assert_eq!(recorder.frames[0][19], ALIVE);
    }

    #[test]
    fn pause_twice_resumes_without_stepping() {
        let (mut session, now) = session(0, 20);
        let mut recorder = Recorder::default();

        session
            .frame([command(Command::TogglePause)], &mut recorder, now)
            .unwrap();
        assert_eq!(session.playback(), Playback::Paused);
        for i in 1..5 {
            let advanced = session
                .frame(std::iter::empty(), &mut recorder, now + Duration::from_millis(i))
                .unwrap();
            assert!(!advanced);
        }
        assert_eq!(session.automaton().advances, 0);
        assert!(alive_cells(&session).is_empty());
        // Paused sessions still redraw.
        assert_eq!(recorder.frames.len(), 5);

        session.handle_event(command(Command::TogglePause));
        assert_eq!(session.playback(), Playback::Active);
        assert!(alive_cells(&session).is_empty());
        assert_eq!(session.automaton().advances, 0);
    }

    #[test]
    fn quit_works_while_paused() {
        let (mut session, now) = session(0, 20);
        let mut recorder = Recorder::default();
        session.handle_event(command(Command::TogglePause));

        session
            .frame([command(Command::Quit)], &mut recorder, now)
            .unwrap();
        assert_eq!(session.playback(), Playback::Stopped);
        assert!(recorder.frames.is_empty());
    }

    #[test]
    fn stopped_is_terminal() {
        let (mut session, now) = session(0, 20);
        let mut recorder = Recorder::default();

        session
            .frame(
                [command(Command::Quit), down(PointerButton::Primary, 1, 1)],
                &mut recorder,
                now,
            )
            .unwrap();
        session.handle_event(command(Command::TogglePause));
        session.handle_event(down(PointerButton::Primary, 2, 2));
        let advanced = session.frame(std::iter::empty(), &mut recorder, now).unwrap();

        assert!(!advanced);
        assert_eq!(session.playback(), Playback::Stopped);
        assert!(alive_cells(&session).is_empty());
        assert!(recorder.frames.is_empty());
        assert_eq!(session.automaton().advances, 0);
    }

    #[test]
    fn presenter_failure_stops_session() {
        let (mut session, now) = session(0, 20);
        let mut recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };

        assert!(session.frame(std::iter::empty(), &mut recorder, now).is_err());
        assert_eq!(session.playback(), Playback::Stopped);
        assert_eq!(session.automaton().advances, 0);
    }

    #[test]
    fn advance_is_throttled_but_redraw_is_not() {
        let (mut session, start) = session(10, 20);
        let mut recorder = Recorder::default();

        let mut advanced = Vec::new();
        for ms in [0, 50, 99, 100, 150, 200] {
            let now = start + Duration::from_millis(ms);
            advanced.push(session.frame(std::iter::empty(), &mut recorder, now).unwrap());
        }

        assert_eq!(advanced, vec![false, false, false, true, false, true]);
        assert_eq!(session.generation(), 2);
        assert_eq!(recorder.frames.len(), 6);
    }
}
