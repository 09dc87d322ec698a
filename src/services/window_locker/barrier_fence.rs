use crate::error::BarrierError;
use crate::session::{
    BarrierDirection, BarrierHandle, BarrierSegment, DisplaySession, Rect, WindowHandle,
};
use tracing::{debug, info, warn};

/// Четыре барьера одного эпизода ограждения. Создаются все вместе и
/// уничтожаются все вместе; частично построенного ограждения не бывает.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierSet {
    top: BarrierHandle,
    bottom: BarrierHandle,
    left: BarrierHandle,
    right: BarrierHandle,
}

impl BarrierSet {
    fn handles(&self) -> [BarrierHandle; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// Барьерные отрезки вдоль рёбер прямоугольника окна.
///
/// Каждый барьер пропускает движение только внутрь окна: указатель
/// свободно перемещается вдоль ребра и внутри прямоугольника, но не
/// может пересечь ни одно ребро наружу.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceSegments {
    pub top: BarrierSegment,
    pub bottom: BarrierSegment,
    pub left: BarrierSegment,
    pub right: BarrierSegment,
}

impl FenceSegments {
    pub fn around(rect: &Rect) -> Self {
        let (x, y) = (rect.x, rect.y);
        let (right, bottom) = (rect.right(), rect.bottom());

        Self {
            // верх: пропускает вниз, внутрь окна
            top: BarrierSegment::new(x, y, right, y, BarrierDirection::PositiveY),
            // низ: пропускает вверх
            bottom: BarrierSegment::new(x, bottom, right, bottom, BarrierDirection::NegativeY),
            // лево: пропускает вправо
            left: BarrierSegment::new(x, y, x, bottom, BarrierDirection::PositiveX),
            // право: пропускает влево
            right: BarrierSegment::new(right, y, right, bottom, BarrierDirection::NegativeX),
        }
    }
}

/// Стратегия барьерного ограждения для окон специальных процессов.
pub struct BarrierFence;

impl BarrierFence {
    /// Создать ограждение вокруг текущего прямоугольника окна.
    ///
    /// Всё-или-ничего: при отказе любого из четырёх барьеров уже
    /// созданные сносятся до возврата ошибки.
    pub fn enter(
        session: &dyn DisplaySession,
        window: WindowHandle,
    ) -> Result<BarrierSet, BarrierError> {
        let rect = session
            .window_rect(window)
            .ok_or(BarrierError::GeometryUnavailable)?;
        let segments = FenceSegments::around(&rect);
        debug!("Строим ограждение вокруг {:?} для окна {}", rect, window);

        let top = session.create_barrier(&segments.top)?;
        let bottom = session.create_barrier(&segments.bottom).map_err(|err| {
            rollback(session, &[top]);
            err
        })?;
        let left = session.create_barrier(&segments.left).map_err(|err| {
            rollback(session, &[top, bottom]);
            err
        })?;
        let right = session.create_barrier(&segments.right).map_err(|err| {
            rollback(session, &[top, bottom, left]);
            err
        })?;

        info!("Окно {} ограждено четырьмя барьерами", window);

        Ok(BarrierSet {
            top,
            bottom,
            left,
            right,
        })
    }

    /// Снести все четыре барьера. Best-effort: с точки зрения машины
    /// состояний выход всегда успешен.
    pub fn exit(session: &dyn DisplaySession, barriers: BarrierSet) {
        for handle in barriers.handles() {
            session.destroy_barrier(handle);
        }
        debug!("Ограждение снято");
    }
}

fn rollback(session: &dyn DisplaySession, created: &[BarrierHandle]) {
    warn!(
        "Создание барьера не удалось, откатываем {} уже созданных",
        created.len()
    );
    for handle in created {
        session.destroy_barrier(*handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_utils::FakeSession;

    const WINDOW: WindowHandle = WindowHandle::new(5);
    const RECT: Rect = Rect {
        x: 100,
        y: 50,
        width: 800,
        height: 600,
    };

    #[test]
    fn test_segments_lie_on_rect_edges() {
        let segments = FenceSegments::around(&RECT);

        assert_eq!(
            segments.top,
            BarrierSegment::new(100, 50, 900, 50, BarrierDirection::PositiveY)
        );
        assert_eq!(
            segments.bottom,
            BarrierSegment::new(100, 650, 900, 650, BarrierDirection::NegativeY)
        );
        assert_eq!(
            segments.left,
            BarrierSegment::new(100, 50, 100, 650, BarrierDirection::PositiveX)
        );
        assert_eq!(
            segments.right,
            BarrierSegment::new(900, 50, 900, 650, BarrierDirection::NegativeX)
        );
    }

    #[test]
    fn test_enter_creates_all_four_barriers() {
        let session = FakeSession::new();
        session.set_rect(WINDOW, RECT);

        let barriers = BarrierFence::enter(&session, WINDOW).unwrap();
        assert_eq!(session.live_barrier_count(), 4);

        let segments = FenceSegments::around(&RECT);
        assert_eq!(
            session.created_segments(),
            vec![segments.top, segments.bottom, segments.left, segments.right]
        );

        BarrierFence::exit(&session, barriers);
        assert_eq!(session.live_barrier_count(), 0);
    }

    #[test]
    fn test_missing_geometry_is_reported() {
        let session = FakeSession::new();

        assert_eq!(
            BarrierFence::enter(&session, WINDOW),
            Err(BarrierError::GeometryUnavailable)
        );
        assert_eq!(session.live_barrier_count(), 0);
    }

    #[test]
    fn test_enter_is_all_or_nothing() {
        // Отказ на каждой из четырёх попыток: после ошибки не должно
        // оставаться ни одного зарегистрированного барьера.
        for failing_attempt in 1..=4 {
            let session = FakeSession::new();
            session.set_rect(WINDOW, RECT);
            session.fail_creation_at(failing_attempt);

            let result = BarrierFence::enter(&session, WINDOW);
            assert!(result.is_err());
            assert_eq!(session.live_barrier_count(), 0);
        }
    }

    #[test]
    fn test_exit_destroys_every_handle() {
        let session = FakeSession::new();
        session.set_rect(WINDOW, RECT);

        let barriers = BarrierFence::enter(&session, WINDOW).unwrap();
        BarrierFence::exit(&session, barriers);

        assert_eq!(session.destroy_calls(), 4);
    }
}
