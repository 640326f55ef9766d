// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Discrete keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    Reseed,
    Clear,
}

/// Pointer buttons: paint alive, paint dead, pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input in grid-pixel coordinates. Coordinates may fall outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Command(Command),
    ButtonDown { button: PointerButton, x: i32, y: i32 },
    ButtonUp { button: PointerButton, x: i32, y: i32 },
    Motion { x: i32, y: i32 },
}

pub fn command_for_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Escape => Some(Command::Quit),
        KeyCode::Space => Some(Command::TogglePause),
        KeyCode::KeyR => Some(Command::Reseed),
        KeyCode::KeyC => Some(Command::Clear),
        _ => None,
    }
}

pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Maps window pixels to grid pixels when the grid texture is stretched over
/// a surface of a different size.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    grid: (u32, u32),
    surface: PhysicalSize<u32>,
}

impl Viewport {
    pub fn new(grid_width: u32, grid_height: u32, surface: PhysicalSize<u32>) -> Self {
        Self {
            grid: (grid_width, grid_height),
            surface,
        }
    }

    pub fn resize(&mut self, surface: PhysicalSize<u32>) {
        // Minimized windows report 0x0; keep the last usable size.
        if surface.width > 0 && surface.height > 0 {
            self.surface = surface;
        }
    }

    pub fn to_grid(&self, position: PhysicalPosition<f64>) -> (i32, i32) {
        let sx = self.grid.0 as f64 / self.surface.width.max(1) as f64;
        let sy = self.grid.1 as f64 / self.surface.height.max(1) as f64;
        (
            (position.x * sx).floor() as i32,
            (position.y * sy).floor() as i32,
        )
    }
}

/// Turns winit window events into [`InputEvent`]s.
///
/// winit reports button presses without a position, so the last cursor
/// position is remembered and attached to them.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    viewport: Viewport,
    cursor: (i32, i32),
}

impl InputTranslator {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            cursor: (0, 0),
        }
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::Command(Command::Quit)),
            WindowEvent::Resized(size) => {
                self.viewport.resize(*size);
                None
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => command_for_key(*code).map(InputEvent::Command),
            WindowEvent::CursorMoved { position, .. } => Some(self.cursor_moved(*position)),
            WindowEvent::MouseInput { state, button, .. } => self.button(*button, *state),
            _ => None,
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> InputEvent {
        self.cursor = self.viewport.to_grid(position);
        let (x, y) = self.cursor;
        InputEvent::Motion { x, y }
    }

    fn button(&mut self, button: MouseButton, state: ElementState) -> Option<InputEvent> {
        let button = pointer_button(button)?;
        let (x, y) = self.cursor;
        Some(match state {
            ElementState::Pressed => InputEvent::ButtonDown { button, x, y },
            ElementState::Released => InputEvent::ButtonUp { button, x, y },
        })
    }
}
