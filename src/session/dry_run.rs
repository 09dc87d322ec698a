use crate::error::{BarrierError, CaptureError};
use parking_lot::Mutex;
use tracing::info;

use super::{BarrierHandle, BarrierSegment, DisplaySession, Rect, WindowHandle};

/// Фиктивное окно, которое "в фокусе" в режиме эмуляции.
const DRY_WINDOW: u32 = 0x2a;

#[derive(Debug, Default)]
struct DryState {
    pointer_grabbed: bool,
    live_barriers: Vec<BarrierHandle>,
    next_barrier: u32,
}

/// Сессия-эмуляция для dry-run: ничего не трогает, только ведёт учёт
/// и рассказывает в логе, что сделала бы настоящая сессия.
pub struct DrySession {
    state: Mutex<DryState>,
}

impl DrySession {
    pub fn new() -> Self {
        info!("Dry-run режим - сессия дисплея работает в режиме эмуляции");
        Self {
            state: Mutex::new(DryState::default()),
        }
    }
}

impl DisplaySession for DrySession {
    fn focused_window(&self) -> Option<WindowHandle> {
        Some(WindowHandle::new(DRY_WINDOW))
    }

    fn process_name(&self, _window: WindowHandle) -> Option<String> {
        Some("dry-run".to_string())
    }

    fn window_rect(&self, _window: WindowHandle) -> Option<Rect> {
        Some(Rect {
            x: 100,
            y: 50,
            width: 800,
            height: 600,
        })
    }

    fn capture_pointer(&self, window: WindowHandle) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        state.pointer_grabbed = true;
        info!("Dry-run: эмулируем захват указателя в окне {}", window);
        Ok(())
    }

    fn release_pointer(&self) {
        let mut state = self.state.lock();
        state.pointer_grabbed = false;
        info!("Dry-run: эмулируем освобождение указателя");
    }

    fn create_barrier(&self, segment: &BarrierSegment) -> Result<BarrierHandle, BarrierError> {
        let mut state = self.state.lock();
        state.next_barrier += 1;
        let handle = BarrierHandle::new(state.next_barrier);
        state.live_barriers.push(handle);
        info!(
            "Dry-run: эмулируем барьер #{} ({},{})-({},{}) {:?}",
            handle.value(),
            segment.x1,
            segment.y1,
            segment.x2,
            segment.y2,
            segment.allow
        );
        Ok(handle)
    }

    fn destroy_barrier(&self, barrier: BarrierHandle) {
        let mut state = self.state.lock();
        state.live_barriers.retain(|handle| *handle != barrier);
        info!("Dry-run: эмулируем удаление барьера #{}", barrier.value());
    }
}
