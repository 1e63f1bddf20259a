//! Session Resolver: сведение кэша в публикуемое состояние
//!
//! За один тик решает, готова ли новая полная сессия (карта + слэшер +
//! предметы), и независимо разбирает обновления генераторов и сброс.
//! Watermark (метка времени последней опубликованной сессии) только растёт
//! и отсекает устаревшие данные.

use log::debug;

use crate::items::ItemLexicon;
use crate::mappings::GameLookups;
use crate::reconcile::ReconcileCache;
use crate::types::{GeneratorUpdateEvent, SenseEvent, SessionUpdateEvent};

const GENERATOR_KEYS: [&str; 2] = ["generator1", "generator2"];

/// Резолвер сессии. Единственный владелец watermark и флага сброса.
pub struct SessionResolver {
    lookups: GameLookups,
    lexicon: ItemLexicon,
    /// Метка времени последней опубликованной сессии (пустая до первой)
    watermark: String,
    /// Сброс генераторов: подавляет их обновления до следующей сессии
    reset_mark: bool,
}

impl SessionResolver {
    pub fn new() -> Self {
        Self {
            lookups: GameLookups::new(),
            lexicon: ItemLexicon::new(),
            watermark: String::new(),
            reset_mark: false,
        }
    }

    /// Один шаг сведения после того, как кэш поглотил совпадения тика.
    /// Возвращает события для публикации; отправкой занимается вызывающий.
    ///
    /// Записи карты/слэшера/предметов извлекаются из кэша независимо от
    /// результата: неполная тройка теряется, а не ставится в очередь —
    /// игра переписывает все три поля вместе при каждой смене состояния.
    pub fn resolve_tick(&mut self, cache: &mut ReconcileCache) -> Vec<SenseEvent> {
        let mut events = Vec::new();

        let map_data = cache.pop("map");
        let slasher_data = cache.pop("slasher");
        let items_data = cache.pop("items");

        if let (Some(map_data), Some(slasher_data), Some(items_data)) =
            (map_data, slasher_data, items_data)
        {
            let timestamp = map_data
                .timestamp
                .as_str()
                .max(slasher_data.timestamp.as_str())
                .max(items_data.timestamp.as_str())
                .to_string();

            if timestamp > self.watermark {
                self.reset_mark = false;
                self.watermark = timestamp;

                let map_raw = map_data.fields.first().map(|s| s.trim()).unwrap_or("");
                let map_name = self.lookups.map_name(map_raw);

                let slasher_id = slasher_data
                    .fields
                    .first()
                    .and_then(|s| s.parse::<i32>().ok())
                    .unwrap_or(-1);
                let (slasher_name, slasher_icon) = self.lookups.slasher(slasher_id);

                let items_raw = items_data.fields.first().map(|s| s.trim()).unwrap_or("");
                let items = self.lexicon.resolve(items_raw);

                events.push(SenseEvent::SessionUpdate(SessionUpdateEvent {
                    map_name: map_name.clone(),
                    slasher_name: slasher_name.clone(),
                    slasher_icon,
                    slasher_id,
                }));
                events.push(SenseEvent::SessionSummary(format!(
                    "Map: {map_name} | Slasher: {slasher_name} | Items: {items}"
                )));
            } else {
                debug!("Stale session triple at {} discarded", timestamp);
            }
        }

        for gen_key in GENERATOR_KEYS {
            let Some(gen_data) = cache.pop(gen_key) else {
                continue;
            };
            if self.reset_mark {
                continue;
            }
            if gen_data.timestamp > self.watermark {
                // Поля генератора: имя, поле, старое значение, поле, новое значение
                let generator = gen_data.fields.first().cloned().unwrap_or_default();
                let field = gen_data.fields.get(1).cloned().unwrap_or_default();
                let value = gen_data.fields.get(4).cloned().unwrap_or_default();

                events.push(SenseEvent::GeneratorUpdate(GeneratorUpdateEvent {
                    generator: generator.clone(),
                    field: field.clone(),
                    value: value.clone(),
                }));
                events.push(SenseEvent::LogMessage(format!(
                    "{generator} {field}: {value}"
                )));
            }
        }

        if let Some(reset_data) = cache.pop("reset") {
            // Сброс не двигает watermark: следующая сессия всё ещё может его перекрыть
            if reset_data.timestamp > self.watermark {
                self.reset_mark = true;
                events.push(SenseEvent::GeneratorsReset);
                events.push(SenseEvent::LogMessage("Generators reset".to_string()));
            }
        }

        // "Generators reset." — маркер старта раунда, действий не требует
        cache.pop("init");

        events
    }
}

impl Default for SessionResolver {
    fn default() -> Self {
        Self::new()
    }
}
