//! Статические справочники SlashCo: карты и слэшеры
//!
//! Неизменяемые таблицы, которыми владеет Session Resolver. Никаких
//! глобальных мутабельных синглтонов — таблицы собираются один раз
//! в конструкторе.

use std::collections::HashMap;

/// База ресурсов проекта (иконки слэшеров)
const ASSETS: &str = "https://github.com/Canaan-HS/SlashcoSense-VRC/raw/refs/heads/main/IMG";

/// Справочная запись слэшера
#[derive(Debug, Clone)]
pub struct SlasherInfo {
    pub name: &'static str,
    pub icon: String,
}

/// Справочники карт и слэшеров
pub struct GameLookups {
    maps: HashMap<&'static str, &'static str>,
    slashers: HashMap<i32, SlasherInfo>,
}

impl GameLookups {
    pub fn new() -> Self {
        // Лог пишет карту то числом, то внутренним именем, поэтому оба ключа
        let map_entries: &[(&str, &str, &str)] = &[
            ("0", "SlashCoHQ", "SlashCo HQ"),
            ("1", "MalonesFarmyard", "Malone's Farmyard"),
            ("2", "PhilipsWestwoodHighSchool", "Philips Westwood High School"),
            ("3", "EastwoodGeneralHospital", "Eastwood General Hospital"),
            ("4", "ResearchFacilityDelta", "Research Facility Delta"),
        ];

        let mut maps = HashMap::new();
        for (id, alias, name) in map_entries {
            maps.insert(*id, *name);
            maps.insert(*alias, *name);
        }

        let slasher_entries: &[(i32, &str, &str)] = &[
            (0, "Bababooey", "BABABOOEY.webp"),
            (1, "Sid", "SID.webp"),
            (2, "Trollge", "TROLLGE.webp"),
            (3, "Borgmire", "BORGMIRE.webp"),
            (4, "Abomignat", "ABOMIGNAT.webp"),
            (5, "Thirsty", "THIRSTY.webp"),
            (6, "Father Elmer", "FATHER_ELMER.webp"),
            (7, "The Watcher", "THE_WATCHER.webp"),
            (8, "The Beast", "THE_BEAST.webp"),
            (9, "Dolphinman", "DOLPHINMAN.webp"),
            (10, "Igor", "IGOR.webp"),
            (11, "The Grouch", "THE_GROUCH.webp"),
            (12, "Princess", "PRINCESS.webp"),
            (13, "Speedrunner", "SPEEDRUNNER.webp"),
        ];

        let slashers = slasher_entries
            .iter()
            .map(|(id, name, icon)| {
                (
                    *id,
                    SlasherInfo {
                        name,
                        icon: format!("{ASSETS}/{icon}"),
                    },
                )
            })
            .collect();

        Self { maps, slashers }
    }

    /// Название карты; неизвестное значение возвращается как есть
    pub fn map_name(&self, raw: &str) -> String {
        self.maps.get(raw).map_or_else(|| raw.to_string(), |name| name.to_string())
    }

    /// Имя и иконка слэшера; для неизвестного ID — синтезированная подпись без иконки
    pub fn slasher(&self, id: i32) -> (String, Option<String>) {
        match self.slashers.get(&id) {
            Some(info) => (info.name.to_string(), Some(info.icon.clone())),
            None => (format!("Unknown({id})"), None),
        }
    }
}

impl Default for GameLookups {
    fn default() -> Self {
        Self::new()
    }
}
