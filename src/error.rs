use thiserror::Error;

/// Ошибка стратегии прямого захвата указателя.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("X-сервер отклонил захват указателя")]
    GrabDenied,
}

/// Ошибка стратегии барьерного ограждения.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BarrierError {
    #[error("Не удалось прочитать геометрию окна")]
    GeometryUnavailable,

    #[error("Не удалось создать барьер: {0}")]
    Creation(String),
}

#[derive(Error, Debug)]
pub enum WinlockError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось подключиться к X-серверу: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("Ошибка соединения с X-сервером: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("Ошибка ответа X-сервера: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("Не удалось выделить идентификатор X-ресурса: {0}")]
    Id(#[from] x11rb::errors::ReplyOrIdError),

    #[error("Ошибка захвата указателя: {0}")]
    Capture(#[from] CaptureError),

    #[error("Ошибка барьерного ограждения: {0}")]
    Barrier(#[from] BarrierError),

    #[error("Горячая клавиша недоступна: {0}")]
    HotkeyUnavailable(String),
}

pub type Result<T> = std::result::Result<T, WinlockError>;
