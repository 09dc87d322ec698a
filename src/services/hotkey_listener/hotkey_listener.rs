use crate::context::RuntimeContext;
use crate::error::{Result, WinlockError};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ConnectionExt as _, GrabMode, KeyButMask, Keycode, ModMask, Timestamp, Window,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use super::r#trait::HotkeyListenerTrait;

/// Keysym латинской l/L - горячая клавиша Ctrl+Alt+L.
const KEYSYMS_L: [u32; 2] = [0x006c, 0x004c];

/// Период опроса событий. Ограничен, чтобы сигнал завершения был замечен
/// в пределах одного интервала.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct RealHotkeyListener {
    context: Arc<RuntimeContext>,
    conn: RustConnection,
    root: Window,
    keycode: Keycode,
    hotkey_held: bool,
    pending_release: Option<Timestamp>,
}

impl RealHotkeyListener {
    pub fn new(context: Arc<RuntimeContext>) -> Result<Self> {
        info!("Инициализация RealHotkeyListener");

        // Слушатель владеет собственным соединением с X и не разделяет
        // его с машиной состояний.
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn.setup().roots[screen_num].root;

        let keycode = Self::find_keycode(&conn)?;
        Self::grab_hotkey(&conn, root, keycode)?;
        conn.flush()?;

        info!(
            "Горячая клавиша Ctrl+Alt+L зарегистрирована (keycode {})",
            keycode
        );

        Ok(Self {
            context,
            conn,
            root,
            keycode,
            hotkey_held: false,
            pending_release: None,
        })
    }

    fn find_keycode(conn: &RustConnection) -> Result<Keycode> {
        let setup = conn.setup();
        let min = setup.min_keycode;
        let max = setup.max_keycode;

        let mapping = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;
        let per_keycode = mapping.keysyms_per_keycode as usize;
        if per_keycode == 0 {
            return Err(WinlockError::HotkeyUnavailable(
                "пустая раскладка клавиатуры".to_string(),
            ));
        }

        for (index, keysyms) in mapping.keysyms.chunks(per_keycode).enumerate() {
            if keysyms.iter().any(|sym| KEYSYMS_L.contains(sym)) {
                return Ok(min + index as u8);
            }
        }

        Err(WinlockError::HotkeyUnavailable(
            "клавиша L не найдена в раскладке".to_string(),
        ))
    }

    fn grab_hotkey(conn: &RustConnection, root: Window, keycode: Keycode) -> Result<()> {
        let base = ModMask::CONTROL | ModMask::M1;

        // Захват для всех комбинаций NumLock (Mod2) и CapsLock
        let variants = [
            ModMask::from(0u16),
            ModMask::M2,
            ModMask::LOCK,
            ModMask::M2 | ModMask::LOCK,
        ];

        for extra in variants {
            conn.grab_key(
                true,
                root,
                base | extra,
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .check()
            .map_err(|e| {
                WinlockError::HotkeyUnavailable(format!(
                    "не удалось захватить комбинацию: {}",
                    e
                ))
            })?;
        }

        Ok(())
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("RealHotkeyListener запущен, начинаем чтение событий");

        while self.context.is_running() {
            loop {
                match self.conn.poll_for_event() {
                    Ok(Some(event)) => self.handle_event(event),
                    Ok(None) => break,
                    Err(e) => {
                        error!("Ошибка чтения событий X: {}", e);
                        break;
                    }
                }
            }

            // Очередь пуста: незакрытый KeyRelease был настоящим отпусканием
            if self.pending_release.take().is_some() {
                self.hotkey_held = false;
            }

            sleep(POLL_INTERVAL).await;
        }

        info!("RealHotkeyListener завершает работу");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::KeyPress(key) if key.detail == self.keycode => {
                // Автоповтор приходит парой Release/Press с одинаковым
                // временем - такой Press не является новым нажатием
                if let Some(release_time) = self.pending_release.take() {
                    if release_time == key.time {
                        return;
                    }
                    self.hotkey_held = false;
                }

                let ctrl_alt = KeyButMask::CONTROL | KeyButMask::MOD1;
                if (key.state & ctrl_alt) == ctrl_alt && !self.hotkey_held {
                    self.hotkey_held = true;
                    let requested = self.context.toggle_requested();
                    info!("Переключение по горячей клавише: requested = {}", requested);
                }
            }
            Event::KeyRelease(key) if key.detail == self.keycode => {
                self.pending_release = Some(key.time);
            }
            other => {
                debug!("Пропускаем событие X: {:?}", other);
            }
        }
    }
}

#[async_trait::async_trait]
impl HotkeyListenerTrait for RealHotkeyListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}

impl Drop for RealHotkeyListener {
    fn drop(&mut self) {
        info!("Освобождение горячей клавиши");
        if let Ok(cookie) = self.conn.ungrab_key(self.keycode, self.root, ModMask::ANY) {
            let _ = cookie.check();
        }
    }
}
