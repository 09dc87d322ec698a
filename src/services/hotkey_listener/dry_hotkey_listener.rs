use crate::context::RuntimeContext;
use crate::error::Result;
use std::sync::Arc;
use tokio::time::{interval, sleep, Duration};
use tracing::info;

use super::r#trait::HotkeyListenerTrait;

/// Период эмуляции нажатий горячей клавиши в dry-run.
const TOGGLE_PERIOD: Duration = Duration::from_secs(15);

pub struct DryRunHotkeyListener {
    context: Arc<RuntimeContext>,
}

impl DryRunHotkeyListener {
    pub fn new(context: Arc<RuntimeContext>) -> Self {
        info!("Инициализация DryRunHotkeyListener");
        Self { context }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - HotkeyListener работает в режиме эмуляции");

        let mut ticker = interval(TOGGLE_PERIOD);
        ticker.tick().await; // первый тик срабатывает мгновенно

        while self.context.is_running() {
            tokio::select! {
                _ = ticker.tick() => {
                    let requested = self.context.toggle_requested();
                    info!(
                        "Dry-run: эмулируем нажатие горячей клавиши, requested = {}",
                        requested
                    );
                }
                _ = sleep(Duration::from_millis(200)) => {}
            }
        }

        info!("DryRunHotkeyListener завершает работу");
        Ok(())
    }
}

#[async_trait::async_trait]
impl HotkeyListenerTrait for DryRunHotkeyListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
