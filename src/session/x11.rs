use crate::error::{BarrierError, CaptureError, Result};
use std::fs;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xfixes::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ChangeWindowAttributesAux, ConnectionExt as _, Cursor, EventMask, GrabMode,
    GrabStatus, InputFocus, Window,
};
use x11rb::rust_connection::RustConnection;

use super::{BarrierDirection, BarrierHandle, BarrierSegment, DisplaySession, Rect, WindowHandle};

/// Глиф стрелки стандартного курсорного шрифта (XC_arrow).
const XC_ARROW: u16 = 2;

pub struct X11Session {
    conn: RustConnection,
    root: Window,
    net_wm_pid: Atom,
    arrow_cursor: Cursor,
}

impl X11Session {
    /// Подключиться к X-серверу и подготовить ресурсы сессии.
    ///
    /// Неудача здесь фатальна: ядро не создаёт никакого состояния, пока
    /// сессия не поднята.
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn.setup().roots[screen_num].root;

        // Барьеры появились в XFixes 5.0; версию согласовываем заранее.
        conn.xfixes_query_version(5, 0)?.reply()?;

        let net_wm_pid = conn.intern_atom(false, b"_NET_WM_PID")?.reply()?.atom;
        let arrow_cursor = Self::create_arrow_cursor(&conn)?;

        info!("Сессия X11 установлена (root 0x{:08x})", root);

        Ok(Self {
            conn,
            root,
            net_wm_pid,
            arrow_cursor,
        })
    }

    fn create_arrow_cursor(conn: &RustConnection) -> Result<Cursor> {
        let font = conn.generate_id()?;
        conn.open_font(font, b"cursor")?;

        let cursor = conn.generate_id()?;
        conn.create_glyph_cursor(
            cursor,
            font,
            font,
            XC_ARROW,
            XC_ARROW + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )?;
        conn.close_font(font)?;

        Ok(cursor)
    }

    fn resolve_pid(&self, window: WindowHandle) -> Option<u32> {
        let reply = self
            .conn
            .get_property(
                false,
                window.value(),
                self.net_wm_pid,
                AtomEnum::CARDINAL,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;

        let pid = reply.value32()?.next();
        pid
    }
}

impl DisplaySession for X11Session {
    fn focused_window(&self) -> Option<WindowHandle> {
        let reply = self.conn.get_input_focus().ok()?.reply().ok()?;
        let focus = reply.focus;

        // None и PointerRoot не являются блокируемыми окнами
        if focus == x11rb::NONE || focus == u32::from(InputFocus::POINTER_ROOT) {
            return None;
        }

        Some(WindowHandle::new(focus))
    }

    fn process_name(&self, window: WindowHandle) -> Option<String> {
        let pid = self.resolve_pid(window)?;

        // Первый аргумент командной строки без пути
        let cmdline = fs::read(format!("/proc/{}/cmdline", pid)).ok()?;
        let first = cmdline.split(|byte| *byte == 0).next()?;
        if first.is_empty() {
            return None;
        }

        let arg0 = String::from_utf8_lossy(first);
        let name = arg0.rsplit('/').next()?.to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        // Окно могло исчезнуть между классификацией и чтением геометрии -
        // любая ошибка ответа превращается в None.
        let geometry = self.conn.get_geometry(window.value()).ok()?.reply().ok()?;
        let coords = self
            .conn
            .translate_coordinates(window.value(), self.root, 0, 0)
            .ok()?
            .reply()
            .ok()?;

        Some(Rect {
            x: i32::from(coords.dst_x),
            y: i32::from(coords.dst_y),
            width: u32::from(geometry.width),
            height: u32::from(geometry.height),
        })
    }

    fn capture_pointer(&self, window: WindowHandle) -> std::result::Result<(), CaptureError> {
        let reply = self
            .conn
            .grab_pointer(
                true,
                window.value(),
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                window.value(), // confine_to: движение указателя ограничено окном
                x11rb::NONE,
                x11rb::CURRENT_TIME,
            )
            .map_err(|_| CaptureError::GrabDenied)?
            .reply()
            .map_err(|_| CaptureError::GrabDenied)?;

        if reply.status != GrabStatus::SUCCESS {
            debug!("GrabPointer отклонён со статусом {:?}", reply.status);
            return Err(CaptureError::GrabDenied);
        }

        // Принудительный курсор: защита от приложений, прячущих указатель
        let _ = self.conn.change_window_attributes(
            window.value(),
            &ChangeWindowAttributesAux::new().cursor(self.arrow_cursor),
        );
        let _ = self.conn.flush();

        Ok(())
    }

    fn release_pointer(&self) {
        if let Ok(cookie) = self.conn.ungrab_pointer(x11rb::CURRENT_TIME) {
            let _ = cookie.check();
        }
        let _ = self.conn.flush();
    }

    fn create_barrier(
        &self,
        segment: &BarrierSegment,
    ) -> std::result::Result<BarrierHandle, BarrierError> {
        let barrier = self
            .conn
            .generate_id()
            .map_err(|e| BarrierError::Creation(e.to_string()))?;

        let directions = match segment.allow {
            BarrierDirection::PositiveX => xfixes::BarrierDirections::POSITIVE_X,
            BarrierDirection::NegativeX => xfixes::BarrierDirections::NEGATIVE_X,
            BarrierDirection::PositiveY => xfixes::BarrierDirections::POSITIVE_Y,
            BarrierDirection::NegativeY => xfixes::BarrierDirections::NEGATIVE_Y,
        };

        self.conn
            .xfixes_create_pointer_barrier(
                barrier,
                self.root,
                clamp_coordinate(segment.x1),
                clamp_coordinate(segment.y1),
                clamp_coordinate(segment.x2),
                clamp_coordinate(segment.y2),
                directions,
                &[],
            )
            .map_err(|e| BarrierError::Creation(e.to_string()))?
            .check()
            .map_err(|e| BarrierError::Creation(e.to_string()))?;

        Ok(BarrierHandle::new(barrier))
    }

    fn destroy_barrier(&self, barrier: BarrierHandle) {
        if let Ok(cookie) = self.conn.xfixes_delete_pointer_barrier(barrier.value()) {
            let _ = cookie.check();
        }
        let _ = self.conn.flush();
    }
}

/// Координаты барьера в протоколе беззнаковые: окно, частично ушедшее за
/// левый/верхний край экрана, ограждается по краю экрана.
fn clamp_coordinate(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_coordinate() {
        assert_eq!(clamp_coordinate(-50), 0);
        assert_eq!(clamp_coordinate(0), 0);
        assert_eq!(clamp_coordinate(900), 900);
        assert_eq!(clamp_coordinate(i32::MAX), u16::MAX);
    }
}
