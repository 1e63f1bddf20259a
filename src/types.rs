//! Типы данных для SlashcoSense
//!
//! Этот модуль содержит основные типы, используемые для извлечения
//! событий из логов и публикации состояния сессии.

use serde::{Deserialize, Serialize};

/// Семантический тег паттерна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTag {
    Map,
    Slasher,
    Items,
    Generator,
    Init,
    Reset,
}

impl EventTag {
    /// Статический ключ кэша для тегов без под-идентификатора
    pub fn as_key(&self) -> &'static str {
        match self {
            EventTag::Map => "map",
            EventTag::Slasher => "slasher",
            EventTag::Items => "items",
            EventTag::Generator => "generator",
            EventTag::Init => "init",
            EventTag::Reset => "reset",
        }
    }
}

/// Одно успешное применение паттерна к строке лога
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMatch {
    pub tag: EventTag,
    /// Лексическая метка времени "YYYY.MM.DD HH:MM:SS" (сортируется как текст)
    pub timestamp: String,
    /// Захваченные поля после метки времени, в порядке групп паттерна
    pub fields: Vec<String>,
}

impl LogMatch {
    /// Семантический ключ для кэша сверки.
    ///
    /// Генераторы ключуются по захваченному имени (generator1 / generator2),
    /// а не по статическому тегу — иначе два генератора затирали бы друг друга.
    pub fn cache_key(&self) -> &str {
        match self.tag {
            EventTag::Generator => self.fields.first().map(String::as_str).unwrap_or("generator"),
            _ => self.tag.as_key(),
        }
    }
}

/// Публикация новой сессии (карта + слэшер)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdateEvent {
    pub map_name: String,
    pub slasher_name: String,
    /// Ссылка на иконку слэшера (нет для неизвестных ID)
    pub slasher_icon: Option<String>,
    pub slasher_id: i32,
}

/// Обновление состояния генератора
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorUpdateEvent {
    /// generator1 / generator2
    pub generator: String,
    /// REMAINING / HAS_BATTERY (как захвачено из лога)
    pub field: String,
    /// Новое значение, сырой текст
    pub value: String,
}

/// Исходящее уведомление ядра
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SenseEvent {
    LogMessage(String),
    SessionUpdate(SessionUpdateEvent),
    /// Композитная строка "Map: X | Slasher: Y | Items: Z"
    SessionSummary(String),
    GeneratorUpdate(GeneratorUpdateEvent),
    GeneratorsReset,
}

/// Настройки приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Каталог логов VRChat (если пользователь указал вручную)
    pub custom_log_dir: Option<String>,
    /// Отправлять ли avatar parameters по OSC
    pub osc_enabled: bool,
    /// Адрес OSC клиента
    pub osc_host: String,
    /// Порт OSC клиента
    pub osc_port: u16,
    /// Интервал опроса лога в миллисекундах
    pub poll_interval_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            custom_log_dir: None,
            osc_enabled: false,
            osc_host: "127.0.0.1".to_string(),
            osc_port: 9000,
            poll_interval_ms: 500,
        }
    }
}
