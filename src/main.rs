use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

mod config;
mod context;
mod error;
mod services;
mod session;

use config::Config;
use context::RuntimeContext;
use services::{create_hotkey_listener, WindowLocker};
use session::create_session;

#[derive(Parser, Debug)]
#[command(name = "winlock-rust")]
#[command(about = "Утилита для блокировки указателя мыши в активном окне (Ctrl+Alt+L)")]
struct Args {
    /// Путь к файлу со списком специальных процессов
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Период согласования состояния блокировки, мс
    #[arg(long, default_value_t = 1000)]
    tick_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    info!("Запуск winlock-rust v{}", env!("CARGO_PKG_VERSION"));

    if args.tick_interval_ms < 100 {
        anyhow::bail!("tick_interval_ms должно быть минимум 100");
    }

    // Загрузка конфигурации
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let config = Arc::new(Config::load(&config_path)?);
    info!("Конфигурация загружена из: {}", config_path.display());

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Сессия дисплея обязана подняться до создания любого состояния ядра:
    // неудача здесь фатальна и завершает процесс с кодом 1
    let session =
        create_session(args.dry_run).context("Не удалось инициализировать сессию дисплея")?;

    let runtime_context = Arc::new(RuntimeContext::new());

    let hotkey_listener = create_hotkey_listener(runtime_context.clone(), args.dry_run)
        .context("Не удалось зарегистрировать горячую клавишу")?;
    let locker = WindowLocker::new(
        config.clone(),
        runtime_context.clone(),
        session,
        Duration::from_millis(args.tick_interval_ms),
    );

    info!("Все компоненты инициализированы");

    // Запуск сервисов параллельно
    let hotkey_handle = tokio::spawn(async move {
        if let Err(e) = hotkey_listener.run().await {
            error!("Ошибка в HotkeyListener: {}", e);
        }
    });
    let locker_handle = tokio::spawn(async move {
        if let Err(e) = locker.run().await {
            error!("Ошибка в WindowLocker: {}", e);
        }
    });

    info!("Все сервисы запущены, переключение по Ctrl+Alt+L");

    wait_for_shutdown_signal().await;

    info!("Завершение работы...");

    // Оба цикла наблюдают флаг и выходят в пределах интервала опроса;
    // WindowLocker перед выходом снимает активную блокировку
    runtime_context.shutdown();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = locker_handle.await;
        let _ = hotkey_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("winlock-rust завершил работу");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    // SIGINT и SIGTERM равнозначны
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Не удалось подписаться на SIGTERM: {}", e);
            if let Err(e) = signal::ctrl_c().await {
                error!("Ошибка при ожидании сигнала завершения: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(e) => error!("Ошибка при ожидании сигнала завершения: {}", e),
            }
        }
        _ = sigterm.recv() => {
            info!("Получен сигнал завершения (SIGTERM)");
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
