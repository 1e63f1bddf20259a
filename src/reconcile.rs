//! Кэш сверки: последнее совпадение на семантический ключ
//!
//! Простейший last-writer-wins регистр поверх HashMap. Ключ — тег паттерна,
//! для генераторов — захваченное имя генератора. Блокировки не нужны:
//! кэшем владеет единственный рабочий поток.

use std::collections::HashMap;

use crate::types::LogMatch;

/// Кэш последних совпадений, упорядоченных меткой времени
#[derive(Debug, Default)]
pub struct ReconcileCache {
    entries: HashMap<String, LogMatch>,
}

impl ReconcileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Поглотить совпадение.
    ///
    /// Замена происходит при new.timestamp >= cached.timestamp: лог пишется
    /// по порядку, и при равенстве (разрешение в секунду) более поздняя
    /// строка полнее. Сравнение лексическое — фиксированный формат метки
    /// корректно сортируется как текст.
    pub fn absorb(&mut self, m: LogMatch) {
        let key = m.cache_key().to_string();
        match self.entries.get(&key) {
            Some(cached) if m.timestamp < cached.timestamp => {}
            _ => {
                self.entries.insert(key, m);
            }
        }
    }

    /// Извлечь (и удалить) запись по ключу
    pub fn pop(&mut self, key: &str) -> Option<LogMatch> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
