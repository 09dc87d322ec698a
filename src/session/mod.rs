//! DisplaySession: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for talking to the
//! display server: focus queries, process-name resolution, geometry reads,
//! pointer grabs and XFixes barriers. It MUST NOT contain any business logic
//! related to lock-state transitions or strategy selection. All confinement
//! decisions are made exclusively by the WindowLocker service.

mod dry_run;
mod x11;

#[cfg(test)]
pub mod test_utils;

use crate::error::{BarrierError, CaptureError, Result};
use std::fmt;

/// Непрозрачный идентификатор окна. Ядро сравнивает его по значению и
/// никогда не разыменовывает.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(u32);

impl WindowHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Прямоугольник окна в абсолютных экранных координатах.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Направление, в котором движение указателя сквозь барьер РАЗРЕШЕНО
/// (семантика XFixes); во всех остальных направлениях барьер блокирует.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierDirection {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
}

/// Один односторонний барьерный отрезок в экранных координатах.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarrierSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub allow: BarrierDirection,
}

impl BarrierSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, allow: BarrierDirection) -> Self {
        Self { x1, y1, x2, y2, allow }
    }
}

/// Идентификатор зарегистрированного барьера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarrierHandle(u32);

impl BarrierHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Trait for display sessions that can run in different modes.
///
/// Все операции синхронные с ограниченной задержкой; вызывает их только
/// машина состояний, поэтому блокировка на время запроса допустима.
pub trait DisplaySession: Send + Sync {
    /// Окно, владеющее фокусом ввода, если такое есть.
    fn focused_window(&self) -> Option<WindowHandle>;

    /// Базовое имя исполняемого файла процесса-владельца окна.
    /// `None` при любой неудаче разрешения.
    fn process_name(&self, window: WindowHandle) -> Option<String>;

    /// Прямоугольник окна в экранных координатах.
    fn window_rect(&self, window: WindowHandle) -> Option<Rect>;

    /// Эксклюзивный захват указателя с ограничением движения окном
    /// и принудительным видимым курсором.
    fn capture_pointer(&self, window: WindowHandle) -> std::result::Result<(), CaptureError>;

    /// Снять захват указателя. Best-effort: ошибки глотаются.
    fn release_pointer(&self);

    /// Зарегистрировать один барьерный отрезок.
    fn create_barrier(&self, segment: &BarrierSegment)
        -> std::result::Result<BarrierHandle, BarrierError>;

    /// Удалить барьер. Best-effort: ошибки глотаются.
    fn destroy_barrier(&self, barrier: BarrierHandle);
}

/// Factory function to create an appropriate display session based on the dry_run flag
pub fn create_session(dry_run: bool) -> Result<Box<dyn DisplaySession>> {
    if dry_run {
        Ok(Box::new(dry_run::DrySession::new()))
    } else {
        Ok(Box::new(x11::X11Session::connect()?))
    }
}
