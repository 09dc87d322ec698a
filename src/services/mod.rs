pub mod hotkey_listener;
pub mod window_locker;

pub use hotkey_listener::create_hotkey_listener;
pub use window_locker::WindowLocker;
