use crate::error::CaptureError;
use crate::session::{DisplaySession, WindowHandle};
use tracing::{debug, info};

/// Стратегия прямого захвата: эксклюзивная доставка событий указателя
/// окну с ограничением движения его прямоугольником.
pub struct PointerCapture;

impl PointerCapture {
    /// Отказ не меняет состояние блокировки: машина состояний повторит
    /// попытку на следующем тике, пока запрос в силе.
    pub fn enter(
        session: &dyn DisplaySession,
        window: WindowHandle,
    ) -> Result<(), CaptureError> {
        session.capture_pointer(window)?;
        info!("Указатель захвачен и ограничен окном {}", window);
        Ok(())
    }

    /// Безусловное освобождение. Окно могло уже исчезнуть - это не
    /// мешает переходу в разблокированное состояние.
    pub fn exit(session: &dyn DisplaySession, window: WindowHandle) {
        session.release_pointer();
        debug!("Захват указателя снят (окно {})", window);
    }
}
