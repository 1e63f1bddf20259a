//! SlashcoSense — headless companion для SlashCo (VRChat)
//!
//! Основные возможности:
//! - Мониторинг логов VRChat (output_log_*.txt)
//! - Восстановление текущей сессии: карта / слэшер / предметы
//! - Состояние генераторов и их сброс
//! - Трансляция в avatar parameters по OSC

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use env_logger::Builder;
use log::{debug, info, warn, LevelFilter};

use slashco_sense::osc::OscSink;
use slashco_sense::settings;
use slashco_sense::types::{AppSettings, SenseEvent};
use slashco_sense::watcher::{find_log_dir, LogWatcher};

fn load_app_settings() -> AppSettings {
    match settings::load_settings() {
        Ok(Some(s)) => {
            debug!("Loaded settings from disk");
            s
        }
        Ok(None) => AppSettings::default(),
        Err(e) => {
            warn!("Failed to load settings, using defaults: {e}");
            AppSettings::default()
        }
    }
}

/// Каталог логов: пользовательский путь из настроек, иначе автоопределение
fn resolve_log_dir(app_settings: &AppSettings) -> Option<PathBuf> {
    if let Some(custom) = &app_settings.custom_log_dir {
        let dir = PathBuf::from(custom);
        if dir.is_dir() {
            info!("Using custom log directory from settings: {custom}");
            return Some(dir);
        }
        warn!("Custom log directory does not exist: {custom}, trying auto-detect");
    }
    find_log_dir()
}

#[tokio::main]
async fn main() {
    // .env — удобство локальной разработки; отсутствие файла не ошибка
    let _ = dotenvy::dotenv();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("slashco_sense", LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("SlashcoSense v{} starting...", env!("CARGO_PKG_VERSION"));

    let app_settings = load_app_settings();

    let Some(log_dir) = resolve_log_dir(&app_settings) else {
        warn!("VRChat log directory not found; set custom_log_dir in settings.json");
        return;
    };

    let osc_sink = if app_settings.osc_enabled {
        match OscSink::new(&app_settings.osc_host, app_settings.osc_port) {
            Ok(sink) => {
                info!(
                    "OSC enabled, sending to {}:{}",
                    app_settings.osc_host, app_settings.osc_port
                );
                Some(sink)
            }
            Err(e) => {
                warn!("Failed to create OSC socket: {e}, OSC disabled");
                None
            }
        }
    } else {
        None
    };

    let watcher = Arc::new(LogWatcher::new(
        log_dir,
        Duration::from_millis(app_settings.poll_interval_ms),
    ));
    let mut rx = watcher.start();

    // Ctrl+C — кооперативная остановка: текущий тик дорабатывает
    {
        let watcher = watcher.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                watcher.stop();
            }
        });
    }

    while let Some(event) = rx.recv().await {
        if let Some(sink) = &osc_sink {
            sink.handle_event(&event);
        }

        match &event {
            SenseEvent::LogMessage(msg) => info!("{msg}"),
            SenseEvent::SessionSummary(summary) => info!("{summary}"),
            SenseEvent::SessionUpdate(update) => {
                debug!(
                    "Session updated: map={}, slasher={} (id={})",
                    update.map_name, update.slasher_name, update.slasher_id
                );
            }
            SenseEvent::GeneratorUpdate(update) => {
                debug!("{} {}: {}", update.generator, update.field, update.value);
            }
            SenseEvent::GeneratorsReset => info!("Generators reset"),
        }
    }

    info!("Event channel closed, exiting");
}
