use crate::config::Config;
use crate::session::{DisplaySession, WindowHandle};
use tracing::debug;

/// Вердикт классификатора: каким способом ограничивать указатель.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// Обычное окно: прямой захват указателя.
    Ordinary,
    /// Окно специального процесса: барьерное ограждение.
    Special,
}

/// Классифицировать окно по имени процесса-владельца.
///
/// Неразрешимое имя консервативно считается специальным: ограждение
/// деградирует на чужом или исчезающем окне мягче, чем неудавшийся захват.
/// Иначе окно специально тогда и только тогда, когда имя точно
/// (с учётом регистра, целиком) совпадает с записью списка.
pub fn classify(session: &dyn DisplaySession, window: WindowHandle, config: &Config) -> WindowClass {
    match session.process_name(window) {
        None => {
            debug!("Имя процесса окна {} не разрешилось, считаем специальным", window);
            WindowClass::Special
        }
        Some(name) => {
            let class = if config.is_special(&name) {
                WindowClass::Special
            } else {
                WindowClass::Ordinary
            };
            debug!("Окно {} принадлежит процессу '{}': {:?}", window, name, class);
            class
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_utils::FakeSession;

    const WINDOW: WindowHandle = WindowHandle::new(7);

    #[test]
    fn test_unresolved_name_is_special() {
        let session = FakeSession::new();
        let config = Config::default();

        assert_eq!(classify(&session, WINDOW, &config), WindowClass::Special);
    }

    #[test]
    fn test_listed_name_is_special() {
        let session = FakeSession::new();
        session.set_process_name(WINDOW, "vlc");
        let config = Config::with_special_processes(["vlc"]);

        assert_eq!(classify(&session, WINDOW, &config), WindowClass::Special);
    }

    #[test]
    fn test_unlisted_name_is_ordinary() {
        let session = FakeSession::new();
        session.set_process_name(WINDOW, "firefox");
        let config = Config::with_special_processes(["vlc"]);

        assert_eq!(classify(&session, WINDOW, &config), WindowClass::Ordinary);
    }

    #[test]
    fn test_match_is_case_sensitive_and_full() {
        let session = FakeSession::new();
        let config = Config::with_special_processes(["vlc"]);

        session.set_process_name(WINDOW, "VLC");
        assert_eq!(classify(&session, WINDOW, &config), WindowClass::Ordinary);

        session.set_process_name(WINDOW, "vlc-wrapper");
        assert_eq!(classify(&session, WINDOW, &config), WindowClass::Ordinary);
    }

    #[test]
    fn test_classification_is_pure() {
        let session = FakeSession::new();
        session.set_process_name(WINDOW, "vlc");
        let config = Config::with_special_processes(["vlc"]);

        let first = classify(&session, WINDOW, &config);
        let second = classify(&session, WINDOW, &config);
        assert_eq!(first, second);
    }
}
