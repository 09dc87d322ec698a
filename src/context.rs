use std::sync::atomic::{AtomicBool, Ordering};

/// Общий контекст процесса: два флага с одним писателем на каждый.
///
/// `running` пишет только путь обработки сигналов завершения, `requested` -
/// только слушатель горячей клавиши. Машина состояний оба флага лишь читает,
/// поэтому достаточно Relaxed: запаздывание на один тик согласования
/// допустимо.
#[derive(Debug)]
pub struct RuntimeContext {
    running: AtomicBool,
    requested: AtomicBool,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            requested: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Сигнал завершения: оба сервиса обязаны заметить его в пределах
    /// одного интервала опроса.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Переключить запрос блокировки. Возвращает новое значение флага.
    pub fn toggle_requested(&self) -> bool {
        !self.requested.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn lock_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let ctx = RuntimeContext::new();
        assert!(ctx.is_running());
        assert!(!ctx.lock_requested());
    }

    #[test]
    fn test_toggle_flips_and_reports_new_value() {
        let ctx = RuntimeContext::new();

        assert!(ctx.toggle_requested());
        assert!(ctx.lock_requested());

        assert!(!ctx.toggle_requested());
        assert!(!ctx.lock_requested());
    }

    #[test]
    fn test_double_toggle_before_tick_is_noop() {
        // Два нажатия между тиками согласования складываются в исходное
        // значение - машина состояний не увидит разницы.
        let ctx = RuntimeContext::new();
        ctx.toggle_requested();
        ctx.toggle_requested();
        assert!(!ctx.lock_requested());
    }

    #[test]
    fn test_shutdown_visible_to_readers() {
        let ctx = RuntimeContext::new();
        ctx.shutdown();
        assert!(!ctx.is_running());
    }
}
