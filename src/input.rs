use nalgebra::Vector2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

// 한 프레임 동안 모인 입력. 카메라 업데이트 직전에 한 번만 가져감
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub mouse_delta: Vector2<f32>,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            forward: false,
            back: false,
            left: false,
            right: false,
            mouse_delta: Vector2::zeros(),
        }
    }
}

#[derive(Debug)]
pub struct Input {
    // W A S D
    keys: [bool; 4],
    last_mouse: Option<PhysicalPosition<f64>>,
    mouse_delta: Vector2<f64>,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            keys: [false; 4],
            last_mouse: None,
            mouse_delta: Vector2::zeros(),
        }
    }

    // egui가 가져간 이벤트라도 커서 위치는 계속 따라가야 다음 delta가 튀지 않음
    pub fn handle_event(&mut self, event: &WindowEvent, consumed_by_ui: bool) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(*position, !consumed_by_ui);
                !consumed_by_ui
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_mouse = None;
                false
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => {
                // 떼는 건 UI에 포커스가 있어도 반영해야 키가 안 눌린 채로 남지 않음
                let is_press = matches!(state, ElementState::Pressed);
                if is_press && consumed_by_ui {
                    return false;
                }
                self.set_key(*key, is_press)
            }
            WindowEvent::Focused(false) => {
                self.keys = [false; 4];
                false
            }
            _ => false,
        }
    }

    pub fn set_key(&mut self, key: VirtualKeyCode, is_press: bool) -> bool {
        let slot = match key {
            VirtualKeyCode::W => 0,
            VirtualKeyCode::A => 1,
            VirtualKeyCode::S => 2,
            VirtualKeyCode::D => 3,
            _ => return false,
        };
        self.keys[slot] = is_press;
        true
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>, track_delta: bool) {
        if let Some(last) = self.last_mouse {
            if track_delta {
                self.mouse_delta += Vector2::new(position.x - last.x, position.y - last.y);
            }
        }
        self.last_mouse = Some(position);
    }

    pub fn take_frame(&mut self) -> FrameInput {
        let delta = std::mem::replace(&mut self.mouse_delta, Vector2::zeros());

        FrameInput {
            forward: self.keys[0],
            left: self.keys[1],
            back: self.keys[2],
            right: self.keys[3],
            mouse_delta: delta.cast::<f32>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_map_to_movement_flags() {
        let mut input = Input::new();
        assert!(input.set_key(VirtualKeyCode::W, true));
        assert!(input.set_key(VirtualKeyCode::D, true));
        assert!(!input.set_key(VirtualKeyCode::Q, true));

        let frame = input.take_frame();
        assert!(frame.forward && frame.right);
        assert!(!frame.back && !frame.left);

        input.set_key(VirtualKeyCode::W, false);
        assert!(!input.take_frame().forward);
    }

    #[test]
    fn key_state_persists_between_frames() {
        let mut input = Input::new();
        input.set_key(VirtualKeyCode::S, true);

        assert!(input.take_frame().back);
        assert!(input.take_frame().back);
    }

    #[test]
    fn mouse_delta_accumulates_and_resets_each_frame() {
        let mut input = Input::new();
        input.cursor_moved(PhysicalPosition::new(100.0, 100.0), true);
        input.cursor_moved(PhysicalPosition::new(103.0, 98.0), true);
        input.cursor_moved(PhysicalPosition::new(110.0, 90.0), true);

        assert_eq!(input.take_frame().mouse_delta, Vector2::new(10.0, -10.0));
        assert_eq!(input.take_frame().mouse_delta, Vector2::zeros());
    }

    #[test]
    fn cursor_over_ui_does_not_turn_the_camera() {
        let mut input = Input::new();
        input.cursor_moved(PhysicalPosition::new(0.0, 0.0), true);
        input.cursor_moved(PhysicalPosition::new(50.0, 0.0), false);
        input.cursor_moved(PhysicalPosition::new(52.0, 1.0), true);

        assert_eq!(input.take_frame().mouse_delta, Vector2::new(2.0, 1.0));
    }
}
