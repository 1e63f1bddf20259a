//! File Cursor и рабочий цикл мониторинга логов VRChat
//!
//! Каждый тик: выбрать свежайший output_log_*.txt в каталоге логов,
//! дочитать новые байты с текущей позиции, прогнать через извлечение,
//! кэш сверки и резолвер сессии, разослать события. Один фоновый поток,
//! состояние никем больше не мутируется — блокировки не нужны.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};

use log::{info, warn};
use tokio::sync::mpsc;

use crate::patterns::PatternTable;
use crate::reconcile::ReconcileCache;
use crate::session::SessionResolver;
use crate::types::SenseEvent;

const LOG_FILE_PREFIX: &str = "output_log_";
const LOG_FILE_SUFFIX: &str = ".txt";

/// Найти каталог логов VRChat
pub fn find_log_dir() -> Option<PathBuf> {
    // VRChat пишет в %USERPROFILE%\AppData\LocalLow\VRChat\VRChat
    let dir = dirs::home_dir()?
        .join("AppData")
        .join("LocalLow")
        .join("VRChat")
        .join("VRChat");

    if dir.is_dir() {
        info!("Found VRChat log directory: {}", dir.display());
        Some(dir)
    } else {
        warn!("VRChat log directory not found at {}", dir.display());
        None
    }
}

/// Результат одного опроса курсора
#[derive(Debug, Default)]
pub struct CursorTick {
    /// Имя файла, на который курсор переключился в этом тике
    pub switched_to: Option<String>,
    /// Новые байты, декодированные best-effort
    pub content: String,
}

/// Курсор чтения: текущий файл + позиция в байтах
pub struct LogCursor {
    log_dir: PathBuf,
    current_file: Option<PathBuf>,
    position: u64,
}

impl LogCursor {
    pub fn new(log_dir: PathBuf) -> Self {
        Self {
            log_dir,
            current_file: None,
            position: 0,
        }
    }

    /// Свежайший по mtime лог-файл в каталоге
    fn latest_log_file(&self) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.log_dir).ok()?;
        let mut latest: Option<(PathBuf, SystemTime)> = None;

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(LOG_FILE_PREFIX) || !name.ends_with(LOG_FILE_SUFFIX) {
                continue;
            }
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if latest.as_ref().map_or(true, |(_, t)| modified > *t) {
                latest = Some((path, modified));
            }
        }

        latest.map(|(path, _)| path)
    }

    /// Один опрос: выбрать файл, дочитать новые байты, сдвинуть позицию.
    ///
    /// Смена файла определяется по идентичности пути, не по содержимому;
    /// при смене позиция сбрасывается в ноль. Файл, исчезнувший между
    /// листингом и чтением, отдаётся как Err и считается преходящим сбоем.
    pub fn poll(&mut self) -> io::Result<CursorTick> {
        let Some(latest) = self.latest_log_file() else {
            // Каталога или файлов нет — ждём следующего тика
            return Ok(CursorTick::default());
        };

        let mut switched_to = None;
        if self.current_file.as_ref() != Some(&latest) {
            switched_to = latest
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            self.current_file = Some(latest.clone());
            self.position = 0;
        }

        // Файл стал короче позиции — пересоздан на месте, читаем с начала
        let metadata = fs::metadata(&latest)?;
        if metadata.len() < self.position {
            info!("Log file shrank, restarting from beginning");
            self.position = 0;
        }

        let mut file = File::open(&latest)?;
        file.seek(SeekFrom::Start(self.position))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        self.position += buf.len() as u64;

        Ok(CursorTick {
            switched_to,
            content: String::from_utf8_lossy(&buf).into_owned(),
        })
    }
}

/// Фоновый наблюдатель за логами
pub struct LogWatcher {
    log_dir: PathBuf,
    poll_interval: Duration,
    running: Arc<Mutex<bool>>,
}

impl LogWatcher {
    pub fn new(log_dir: PathBuf, poll_interval: Duration) -> Self {
        Self {
            log_dir,
            poll_interval,
            running: Arc::new(Mutex::new(false)),
        }
    }

    /// Запустить рабочий поток. Возвращает канал событий.
    pub fn start(&self) -> mpsc::Receiver<SenseEvent> {
        let (tx, rx) = mpsc::channel(1000);

        let log_dir = self.log_dir.clone();
        let poll_interval = self.poll_interval;
        let running = self.running.clone();

        *running.lock().unwrap() = true;

        thread::spawn(move || {
            info!("Starting log watcher for: {}", log_dir.display());

            let mut cursor = LogCursor::new(log_dir);
            let patterns = PatternTable::new();
            let mut cache = ReconcileCache::new();
            let mut resolver = SessionResolver::new();

            // Флаг остановки проверяется в начале каждой итерации;
            // начатый тик дорабатывает до конца.
            while *running.lock().unwrap() {
                match cursor.poll() {
                    Ok(tick) => {
                        if let Some(name) = tick.switched_to {
                            let msg = format!("Now monitoring: {name}");
                            info!("{msg}");
                            if tx.blocking_send(SenseEvent::LogMessage(msg)).is_err() {
                                warn!("Event receiver dropped, stopping watcher");
                                break;
                            }
                        }

                        if !tick.content.is_empty() {
                            for m in patterns.extract(&tick.content) {
                                cache.absorb(m);
                            }

                            let mut receiver_gone = false;
                            for event in resolver.resolve_tick(&mut cache) {
                                if tx.blocking_send(event).is_err() {
                                    warn!("Event receiver dropped, stopping watcher");
                                    receiver_gone = true;
                                    break;
                                }
                            }
                            if receiver_gone {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        // Преходящий сбой ввода-вывода: сообщаем и продолжаем
                        warn!("Log read error: {e}");
                        let _ = tx.blocking_send(SenseEvent::LogMessage(format!(
                            "Log read error: {e}"
                        )));
                    }
                }

                thread::sleep(poll_interval);
            }

            info!("Log watcher stopped");
        });

        rx
    }

    /// Кооперативная остановка
    pub fn stop(&self) {
        *self.running.lock().unwrap() = false;
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cursor_waits_when_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut cursor = LogCursor::new(dir.path().to_path_buf());

        let tick = cursor.poll().unwrap();
        assert!(tick.switched_to.is_none());
        assert!(tick.content.is_empty());
    }

    #[test]
    fn test_cursor_reads_incrementally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output_log_2024-01-01.txt");
        fs::write(&path, "first line\n").unwrap();

        let mut cursor = LogCursor::new(dir.path().to_path_buf());

        let tick = cursor.poll().unwrap();
        assert_eq!(tick.switched_to.as_deref(), Some("output_log_2024-01-01.txt"));
        assert_eq!(tick.content, "first line\n");

        // Без новых данных — пустой тик
        let tick = cursor.poll().unwrap();
        assert!(tick.switched_to.is_none());
        assert!(tick.content.is_empty());

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"second line\n").unwrap();
        drop(file);

        let tick = cursor.poll().unwrap();
        assert_eq!(tick.content, "second line\n");
    }

    #[test]
    fn test_cursor_switches_to_newer_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("output_log_old.txt"), "old\n").unwrap();

        let mut cursor = LogCursor::new(dir.path().to_path_buf());
        let tick = cursor.poll().unwrap();
        assert_eq!(tick.switched_to.as_deref(), Some("output_log_old.txt"));

        // Новый файл с более свежим mtime
        thread::sleep(Duration::from_millis(20));
        fs::write(dir.path().join("output_log_new.txt"), "new\n").unwrap();

        let tick = cursor.poll().unwrap();
        assert_eq!(tick.switched_to.as_deref(), Some("output_log_new.txt"));
        // Позиция сброшена — читаем новый файл с нуля
        assert_eq!(tick.content, "new\n");
    }

    #[test]
    fn test_cursor_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a log\n").unwrap();
        fs::write(dir.path().join("output_log_a.log"), "wrong suffix\n").unwrap();

        let mut cursor = LogCursor::new(dir.path().to_path_buf());
        let tick = cursor.poll().unwrap();
        assert!(tick.switched_to.is_none());
        assert!(tick.content.is_empty());
    }

    #[test]
    fn test_cursor_resets_on_shrunk_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output_log_x.txt");
        fs::write(&path, "a longer chunk of text\n").unwrap();

        let mut cursor = LogCursor::new(dir.path().to_path_buf());
        cursor.poll().unwrap();

        fs::write(&path, "tiny\n").unwrap();
        let tick = cursor.poll().unwrap();
        assert_eq!(tick.content, "tiny\n");
    }

    #[test]
    fn test_cursor_lossy_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output_log_bad.txt");
        fs::write(&path, b"ok \xff\xfe bytes\n").unwrap();

        let mut cursor = LogCursor::new(dir.path().to_path_buf());
        let tick = cursor.poll().unwrap();
        assert!(tick.content.starts_with("ok "));
        assert!(tick.content.ends_with(" bytes\n"));
    }

    #[tokio::test]
    async fn test_watcher_start_stop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("output_log_1.txt"),
            "2024.01.01 00:00:01 Played Map: 1, Slasher: 3, Selected Items: Cookie\n",
        )
        .unwrap();

        let watcher = LogWatcher::new(dir.path().to_path_buf(), Duration::from_millis(10));
        let mut rx = watcher.start();
        assert!(watcher.is_running());

        // Первое событие — переключение на файл
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, SenseEvent::LogMessage(msg) if msg.contains("output_log_1.txt")));

        // Дальше — публикация сессии
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, SenseEvent::SessionUpdate(_)));

        watcher.stop();
        assert!(!watcher.is_running());
    }
}
