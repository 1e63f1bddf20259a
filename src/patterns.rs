//! Таблица паттернов и извлечение событий из текста лога
//!
//! Фиксированный упорядоченный набор регулярных выражений для логов SlashCo:
//! карта, слэшер, предметы, генераторы, сброс генераторов. Каждый паттерн
//! захватывает метку времени первой группой, остальные группы специфичны тегу.

use chrono::NaiveDateTime;
use log::trace;
use regex::Regex;

use crate::types::{EventTag, LogMatch};

/// Формат метки времени в логе (лексически сортируемый)
const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Скомпилированная таблица паттернов
pub struct PatternTable {
    patterns: Vec<(Regex, EventTag)>,
}

impl PatternTable {
    /// Скомпилировать таблицу. Паттерны статические — ошибки компиляции
    /// были бы багом, поэтому unwrap.
    pub fn new() -> Self {
        const TS: &str = r"(\d{4}\.\d{2}\.\d{2} \d{2}:\d{2}:\d{2})";

        let patterns = vec![
            // 2024.01.01 00:00:01 ... Played Map: 1, ...
            (
                Regex::new(&format!(r"{TS}.*?Played Map:\s*([^,]+)")).unwrap(),
                EventTag::Map,
            ),
            // ... Slasher: 3, ...
            (
                Regex::new(&format!(r"{TS}.*?Slasher:\s*(\d+)")).unwrap(),
                EventTag::Slasher,
            ),
            // ... Selected Items: Cookie, Red40 Vial
            // Захват тянется до следующего токена ", слово:" либо конца строки,
            // чтобы запятые внутри названий предметов не обрезали список.
            // (у regex нет lookahead, поэтому терминатор — поглощающая группа)
            (
                Regex::new(&format!(r"{TS}.*?Selected Items:\s*(.+?)(?:,\s*\w+:|$)")).unwrap(),
                EventTag::Items,
            ),
            // ... SC_generator1 Progress check. Last REMAINING value: 3, updated REMAINING value: 2
            (
                Regex::new(&format!(
                    r"{TS}.*?SC_(generator\d+) Progress check\. Last (\w+) value: (.*?), updated (\w+) value: (.*)"
                ))
                .unwrap(),
                EventTag::Generator,
            ),
            // "Generators reset." — старт раунда, просто маркер
            (
                Regex::new(&format!(r"{TS}.*?Generators reset\.")).unwrap(),
                EventTag::Init,
            ),
            // "Generators reset again." — сброс генераторов посреди раунда
            (
                Regex::new(&format!(r"{TS}.*?Generators reset again\.")).unwrap(),
                EventTag::Reset,
            ),
        ];

        Self { patterns }
    }

    /// Применить таблицу к блоку свежепрочитанного текста.
    ///
    /// Текст режется на физические строки; к каждой непустой строке
    /// применяются все паттерны по порядку (игра пишет карту, слэшера и
    /// предметы одной составной строкой, так что строка может дать
    /// несколько совпадений). Битая строка (обрезанная записью в момент
    /// чтения, нечисловой ID и т.п.) молча пропускается — пакет в целом
    /// не прерывается.
    pub fn extract(&self, content: &str) -> Vec<LogMatch> {
        let mut matches = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            for (pattern, tag) in &self.patterns {
                let Some(caps) = pattern.captures(line) else {
                    continue;
                };
                if let Some(m) = build_match(*tag, &caps) {
                    trace!("Matched {:?} at {}", m.tag, m.timestamp);
                    matches.push(m);
                }
            }
        }

        matches
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Собрать LogMatch из захвата; None при битых группах
fn build_match(tag: EventTag, caps: &regex::Captures<'_>) -> Option<LogMatch> {
    let timestamp = caps.get(1)?.as_str().to_string();
    // Метка времени обязана быть валидной датой, не просто цифрами
    NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).ok()?;

    let mut fields = Vec::with_capacity(caps.len().saturating_sub(2));
    for i in 2..caps.len() {
        fields.push(caps.get(i)?.as_str().to_string());
    }

    // ID слэшера должен помещаться в i32, иначе захват считается битым
    if tag == EventTag::Slasher {
        fields.first()?.parse::<i32>().ok()?;
    }

    Some(LogMatch {
        tag,
        timestamp,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_line_matches_all_three() {
        let table = PatternTable::new();
        let line = "2024.01.01 00:00:01 Log - Played Map: 1, Slasher: 3, Selected Items: Cookie, Red40 Vial";

        let matches = table.extract(line);
        let tags: Vec<EventTag> = matches.iter().map(|m| m.tag).collect();
        assert_eq!(tags, vec![EventTag::Map, EventTag::Slasher, EventTag::Items]);

        assert_eq!(matches[0].fields[0], "1");
        assert_eq!(matches[1].fields[0], "3");
        // Запятая внутри списка предметов не обрезает захват
        assert_eq!(matches[2].fields[0], "Cookie, Red40 Vial");
    }

    #[test]
    fn test_items_stop_before_next_key_value_token() {
        let table = PatternTable::new();
        let line =
            "2024.01.01 00:00:01 Selected Items: Cookie, Red40 Vial, Round: 2";

        let matches = table.extract(line);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].fields[0], "Cookie, Red40 Vial");
    }

    #[test]
    fn test_generator_line() {
        let table = PatternTable::new();
        let line = "2024.01.01 00:00:05 Debug - SC_generator1 Progress check. Last REMAINING value: 3, updated REMAINING value: 2";

        let matches = table.extract(line);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.tag, EventTag::Generator);
        assert_eq!(m.cache_key(), "generator1");
        assert_eq!(
            m.fields,
            vec!["generator1", "REMAINING", "3", "REMAINING", "2"]
        );
    }

    #[test]
    fn test_reset_vs_init_disambiguation() {
        let table = PatternTable::new();

        let init = table.extract("2024.01.01 00:00:02 Generators reset.");
        assert_eq!(init.len(), 1);
        assert_eq!(init[0].tag, EventTag::Init);

        // "reset again" не должен совпадать с паттерном init
        let reset = table.extract("2024.01.01 00:00:03 Generators reset again.");
        assert_eq!(reset.len(), 1);
        assert_eq!(reset[0].tag, EventTag::Reset);
    }

    #[test]
    fn test_invalid_timestamp_skipped() {
        let table = PatternTable::new();
        // 99 месяц — цифры паттерну подходят, но chrono такое не распарсит
        let matches = table.extract("2024.99.01 00:00:01 Played Map: 1");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_unmatched_and_empty_lines_skipped() {
        let table = PatternTable::new();
        let content = "\n2024.01.01 00:00:01 Some unrelated chatter\n   \n";
        assert!(table.extract(content).is_empty());
    }

    #[test]
    fn test_overflowing_slasher_id_dropped() {
        let table = PatternTable::new();
        let line = "2024.01.01 00:00:01 Slasher: 99999999999999999999";
        assert!(table.extract(line).is_empty());
    }
}
