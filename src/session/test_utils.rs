//! Скриптуемая сессия для модульных тестов: позволяет задавать фокус,
//! имена процессов и геометрию, внедрять отказы захвата и создания
//! барьеров и проверять учёт вызовов.

use crate::error::{BarrierError, CaptureError};
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{BarrierHandle, BarrierSegment, DisplaySession, Rect, WindowHandle};

#[derive(Debug, Default)]
struct FakeState {
    focused: Option<WindowHandle>,
    process_names: HashMap<WindowHandle, String>,
    rects: HashMap<WindowHandle, Rect>,
    deny_grab: bool,
    fail_creation_at: Option<usize>,
    creation_attempts: usize,
    next_barrier: u32,
    live_barriers: Vec<BarrierHandle>,
    created_segments: Vec<BarrierSegment>,
    pointer_grabbed: bool,
    capture_calls: usize,
    release_calls: usize,
    destroy_calls: usize,
}

#[derive(Debug, Default)]
pub struct FakeSession {
    state: Mutex<FakeState>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focused(&self, window: Option<WindowHandle>) {
        self.state.lock().focused = window;
    }

    pub fn set_process_name(&self, window: WindowHandle, name: &str) {
        self.state
            .lock()
            .process_names
            .insert(window, name.to_string());
    }

    pub fn clear_process_name(&self, window: WindowHandle) {
        self.state.lock().process_names.remove(&window);
    }

    pub fn set_rect(&self, window: WindowHandle, rect: Rect) {
        self.state.lock().rects.insert(window, rect);
    }

    pub fn deny_grab(&self, deny: bool) {
        self.state.lock().deny_grab = deny;
    }

    /// Отказ на N-й (с единицы) попытке создания барьера.
    pub fn fail_creation_at(&self, attempt: usize) {
        self.state.lock().fail_creation_at = Some(attempt);
    }

    pub fn pointer_grabbed(&self) -> bool {
        self.state.lock().pointer_grabbed
    }

    pub fn live_barrier_count(&self) -> usize {
        self.state.lock().live_barriers.len()
    }

    pub fn created_segments(&self) -> Vec<BarrierSegment> {
        self.state.lock().created_segments.clone()
    }

    pub fn capture_calls(&self) -> usize {
        self.state.lock().capture_calls
    }

    pub fn release_calls(&self) -> usize {
        self.state.lock().release_calls
    }

    pub fn destroy_calls(&self) -> usize {
        self.state.lock().destroy_calls
    }
}

impl DisplaySession for FakeSession {
    fn focused_window(&self) -> Option<WindowHandle> {
        self.state.lock().focused
    }

    fn process_name(&self, window: WindowHandle) -> Option<String> {
        self.state.lock().process_names.get(&window).cloned()
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        self.state.lock().rects.get(&window).copied()
    }

    fn capture_pointer(&self, _window: WindowHandle) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        state.capture_calls += 1;
        if state.deny_grab {
            return Err(CaptureError::GrabDenied);
        }
        state.pointer_grabbed = true;
        Ok(())
    }

    fn release_pointer(&self) {
        let mut state = self.state.lock();
        state.release_calls += 1;
        state.pointer_grabbed = false;
    }

    fn create_barrier(&self, segment: &BarrierSegment) -> Result<BarrierHandle, BarrierError> {
        let mut state = self.state.lock();
        state.creation_attempts += 1;
        if state.fail_creation_at == Some(state.creation_attempts) {
            return Err(BarrierError::Creation("инъекция отказа".to_string()));
        }

        state.next_barrier += 1;
        let handle = BarrierHandle::new(state.next_barrier);
        state.live_barriers.push(handle);
        state.created_segments.push(*segment);
        Ok(handle)
    }

    fn destroy_barrier(&self, barrier: BarrierHandle) {
        let mut state = self.state.lock();
        state.destroy_calls += 1;
        state.live_barriers.retain(|handle| *handle != barrier);
    }
}
