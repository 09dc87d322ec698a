use crate::context::RuntimeContext;
use crate::error::Result;
use std::sync::Arc;

/// Trait for hotkey listeners that can run in different modes
#[async_trait::async_trait]
pub trait HotkeyListenerTrait {
    /// Run the hotkey listener
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate hotkey listener based on the dry_run flag
pub fn create_hotkey_listener(
    context: Arc<RuntimeContext>,
    dry_run: bool,
) -> Result<Box<dyn HotkeyListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(
            super::dry_hotkey_listener::DryRunHotkeyListener::new(context),
        ))
    } else {
        Ok(Box::new(super::hotkey_listener::RealHotkeyListener::new(
            context,
        )?))
    }
}
