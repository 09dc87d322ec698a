use crate::config::Config;
use crate::context::RuntimeContext;
use crate::error::Result;
use crate::session::{DisplaySession, WindowHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::barrier_fence::{BarrierFence, BarrierSet};
use super::classifier::{classify, WindowClass};
use super::pointer_capture::PointerCapture;

/// Механизм, выбранный для одного эпизода блокировки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    PointerCapture,
    BarrierFence,
}

/// Активный эпизод: окно запомнено в момент входа и не переразрешается,
/// стратегия неизменна до разблокировки - даже если классификация окна
/// к тому времени изменилась бы.
#[derive(Debug)]
enum ActiveLock {
    Capture { window: WindowHandle },
    Fence { window: WindowHandle, barriers: BarrierSet },
}

impl ActiveLock {
    fn kind(&self) -> StrategyKind {
        match self {
            ActiveLock::Capture { .. } => StrategyKind::PointerCapture,
            ActiveLock::Fence { .. } => StrategyKind::BarrierFence,
        }
    }
}

/// Машина состояний блокировки: единственный владелец состояния
/// `locked`/`active_strategy`/`active_window` и единственный источник
/// блокирующих вызовов в сессию дисплея.
pub struct WindowLocker {
    config: Arc<Config>,
    context: Arc<RuntimeContext>,
    session: Box<dyn DisplaySession>,
    tick_interval: Duration,
    active: Option<ActiveLock>,
}

impl WindowLocker {
    pub fn new(
        config: Arc<Config>,
        context: Arc<RuntimeContext>,
        session: Box<dyn DisplaySession>,
        tick_interval: Duration,
    ) -> Self {
        info!(
            "Инициализация WindowLocker ({} специальных процессов)",
            config.special_process_count()
        );

        Self {
            config,
            context,
            session,
            tick_interval,
            active: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!(
            "WindowLocker запущен, период согласования {} мс",
            self.tick_interval.as_millis()
        );

        let mut ticker = interval(self.tick_interval);
        while self.context.is_running() {
            ticker.tick().await;
            self.reconcile();
        }

        // Единственная обязательная гарантия очистки: активная блокировка
        // снимается на любом пути выхода.
        self.release_active();
        info!("WindowLocker завершил работу");
        Ok(())
    }

    /// Один тик согласования: сравнить `requested` с фактическим
    /// состоянием и выполнить не более одного перехода.
    fn reconcile(&mut self) {
        let requested = self.context.lock_requested();
        match (self.active.is_some(), requested) {
            (false, true) => self.try_lock(),
            (true, false) => self.unlock(),
            _ => {}
        }
    }

    fn try_lock(&mut self) {
        let Some(window) = self.session.focused_window() else {
            // Запрос остаётся в силе - попробуем на следующем тике
            debug!("Нет окна в фокусе, блокировка отложена");
            return;
        };

        match classify(self.session.as_ref(), window, &self.config) {
            WindowClass::Ordinary => {
                match PointerCapture::enter(self.session.as_ref(), window) {
                    Ok(()) => self.active = Some(ActiveLock::Capture { window }),
                    Err(err) => {
                        warn!("Захват не удался: {}. Повтор на следующем тике", err);
                    }
                }
            }
            WindowClass::Special => {
                match BarrierFence::enter(self.session.as_ref(), window) {
                    Ok(barriers) => self.active = Some(ActiveLock::Fence { window, barriers }),
                    Err(err) => {
                        warn!("Ограждение не удалось: {}. Повтор на следующем тике", err);
                    }
                }
            }
        }
    }

    fn unlock(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Снимаем блокировку стратегией {:?}", active.kind());
            match active {
                ActiveLock::Capture { window } => {
                    PointerCapture::exit(self.session.as_ref(), window);
                    info!("Окно {} разблокировано", window);
                }
                ActiveLock::Fence { window, barriers } => {
                    BarrierFence::exit(self.session.as_ref(), barriers);
                    info!("Окно {} разблокировано", window);
                }
            }
        }
    }

    fn release_active(&mut self) {
        if self.active.is_some() {
            info!("Завершение с активной блокировкой - освобождаем ресурсы");
            self.unlock();
        }
    }

    #[cfg(test)]
    fn active_strategy(&self) -> Option<StrategyKind> {
        self.active.as_ref().map(ActiveLock::kind)
    }

    #[cfg(test)]
    fn is_locked(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for WindowLocker {
    fn drop(&mut self) {
        // Страховка на случай отмены задачи между тиками
        self.release_active();
    }
}
