//! Лексикон предметов SlashCo
//!
//! Сопоставляет свободный текст списка предметов каноническим названиям.
//! Ключи матчатся без учёта регистра, более длинный ключ всегда имеет
//! приоритет (иначе "Red40" затенял бы "Red40 Vial").

use regex::Regex;
use std::collections::HashMap;

/// (подстрока в логе, каноническое название)
const ITEM_ENTRIES: &[(&str, &str)] = &[
    ("Proxy-Locator", "Proxy-Locator"),
    ("Royal Burger", "Royal Burger"),
    ("Cookie", "Cookie"),
    ("Beer Keg", "Beer Keg"),
    ("Mayonnaise", "Mayonnaise"),
    ("Orange Jello", "Orange Jello"),
    ("Costco Frozen Pizza", "Costco Frozen Pizza"),
    ("Airport Jungle Juice", "Airport Jungle Juice"),
    ("Rhino Pill", "Rhino Pill"),
    ("The Rock", "The Rock"),
    // Два написания из разных версий игры
    ("LabMeat", "Lab-Grown Meat"),
    ("Lab-Grown Meat", "Lab-Grown Meat"),
    ("Pocket Sand", "Pocket Sand"),
    ("The Baby", "The Baby"),
    ("Newport Menthols", "Newport Menthols"),
    ("B-GONE Soda", "B-GONE Soda"),
    ("Red40", "Red40 Vial"),
    ("Red40 Vial", "Red40 Vial"),
    ("Milk Jug", "Milk Jug"),
    ("Pot of Greed", "Pot of Greed"),
    ("Deathward", "Deathward"),
    ("Evil Jonkler Cart", "Evil Jonkler Cart"),
    ("25 Gram Benadryl", "25 Gram Benadryl"),
    ("Balkan Boost", "Balkan Boost"),
];

/// Резолвер названий предметов
pub struct ItemLexicon {
    pattern: Regex,
    canonical: HashMap<String, &'static str>,
}

impl ItemLexicon {
    pub fn new() -> Self {
        // Длинные ключи первыми, чтобы альтернация выбирала самое длинное совпадение
        let mut keys: Vec<&str> = ITEM_ENTRIES.iter().map(|(k, _)| *k).collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i){alternation}")).unwrap();

        let canonical = ITEM_ENTRIES
            .iter()
            .map(|(k, v)| (k.to_lowercase(), *v))
            .collect();

        Self { pattern, canonical }
    }

    /// Разрешить сырую строку предметов в "A / B / C".
    ///
    /// Неопознанные участки между распознанными ключами сохраняются как есть
    /// (без окружающих пробелов и запятых-разделителей) и чередуются с
    /// каноническими названиями в порядке появления. Пустой вход даёт пустой
    /// выход; строка без единого совпадения возвращается без изменений.
    pub fn resolve(&self, items: &str) -> String {
        if items.is_empty() {
            return String::new();
        }

        let mut result: Vec<&str> = Vec::new();
        let mut last_end = 0;
        let mut matched = false;

        for m in self.pattern.find_iter(items) {
            matched = true;
            if m.start() > last_end {
                let unmatched = trim_span(&items[last_end..m.start()]);
                if !unmatched.is_empty() {
                    result.push(unmatched);
                }
            }
            // Ключ есть в таблице по построению паттерна
            if let Some(name) = self.canonical.get(&m.as_str().to_lowercase()).copied() {
                result.push(name);
            }
            last_end = m.end();
        }

        if !matched {
            return items.to_string();
        }

        if last_end < items.len() {
            let unmatched = trim_span(&items[last_end..]);
            if !unmatched.is_empty() {
                result.push(unmatched);
            }
        }

        result.join(" / ")
    }
}

/// Срезать с участка пробелы и запятые-разделители списка
fn trim_span(span: &str) -> &str {
    span.trim_matches(|c: char| c.is_whitespace() || c == ',')
}

impl Default for ItemLexicon {
    fn default() -> Self {
        Self::new()
    }
}
