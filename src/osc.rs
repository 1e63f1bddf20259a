//! OSC адаптер: avatar parameters VRChat
//!
//! Тонкая прослойка между семантическими событиями ядра и датаграммами OSC.
//! Передаются только изменения слэшера и генераторов:
//! - SlasherID            — числовой ID слэшера
//! - GENERATORn_FUEL      — заполненные слоты топлива (4 - REMAINING)
//! - GENERATORn_BATTERY   — 1 / 0

use std::io;
use std::net::UdpSocket;

use log::{debug, warn};
use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::types::SenseEvent;

/// Всего слотов топлива у генератора
const FUEL_SLOTS: i32 = 4;

/// Семантика события -> список (параметр, значение).
///
/// Чистая функция, чтобы маппинг тестировался без сокета.
pub fn avatar_updates(event: &SenseEvent) -> Vec<(String, i32)> {
    match event {
        SenseEvent::SessionUpdate(update) => {
            vec![("SlasherID".to_string(), update.slasher_id)]
        }
        SenseEvent::GeneratorUpdate(update) => {
            let generator = update.generator.to_uppercase();
            match update.field.as_str() {
                "REMAINING" => match update.value.trim().parse::<i32>() {
                    Ok(remaining) => vec![(format!("{generator}_FUEL"), FUEL_SLOTS - remaining)],
                    Err(_) => Vec::new(),
                },
                "HAS_BATTERY" => {
                    let installed = update.value.trim().eq_ignore_ascii_case("true");
                    vec![(format!("{generator}_BATTERY"), i32::from(installed))]
                }
                // Неизвестное поле — на аватар не транслируем
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// UDP-отправитель OSC
pub struct OscSink {
    socket: UdpSocket,
    target: String,
}

impl OscSink {
    pub fn new(host: &str, port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target: format!("{host}:{port}"),
        })
    }

    /// Отправить событие, если оно транслируется в avatar parameters.
    /// Ошибки отправки логируются и не считаются фатальными.
    pub fn handle_event(&self, event: &SenseEvent) {
        for (param, value) in avatar_updates(event) {
            let packet = OscPacket::Message(OscMessage {
                addr: format!("/avatar/parameters/{param}"),
                args: vec![OscType::Int(value)],
            });

            match encoder::encode(&packet) {
                Ok(buf) => {
                    if let Err(e) = self.socket.send_to(&buf, &self.target) {
                        warn!("OSC send failed for {param}: {e}");
                    } else {
                        debug!("[OSC] {param}: {value}");
                    }
                }
                Err(e) => warn!("OSC encode failed for {param}: {e:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeneratorUpdateEvent, SessionUpdateEvent};

    #[test]
    fn test_session_update_sends_slasher_id() {
        let event = SenseEvent::SessionUpdate(SessionUpdateEvent {
            map_name: "Malone's Farmyard".to_string(),
            slasher_name: "Borgmire".to_string(),
            slasher_icon: None,
            slasher_id: 3,
        });
        assert_eq!(avatar_updates(&event), vec![("SlasherID".to_string(), 3)]);
    }

    #[test]
    fn test_remaining_converts_to_filled_fuel() {
        let event = SenseEvent::GeneratorUpdate(GeneratorUpdateEvent {
            generator: "generator1".to_string(),
            field: "REMAINING".to_string(),
            value: "2".to_string(),
        });
        assert_eq!(
            avatar_updates(&event),
            vec![("GENERATOR1_FUEL".to_string(), 2)]
        );
    }

    #[test]
    fn test_battery_maps_to_bit() {
        let event = SenseEvent::GeneratorUpdate(GeneratorUpdateEvent {
            generator: "generator2".to_string(),
            field: "HAS_BATTERY".to_string(),
            value: "True".to_string(),
        });
        assert_eq!(
            avatar_updates(&event),
            vec![("GENERATOR2_BATTERY".to_string(), 1)]
        );

        let event = SenseEvent::GeneratorUpdate(GeneratorUpdateEvent {
            generator: "generator2".to_string(),
            field: "HAS_BATTERY".to_string(),
            value: "False".to_string(),
        });
        assert_eq!(
            avatar_updates(&event),
            vec![("GENERATOR2_BATTERY".to_string(), 0)]
        );
    }

    #[test]
    fn test_non_numeric_remaining_ignored() {
        let event = SenseEvent::GeneratorUpdate(GeneratorUpdateEvent {
            generator: "generator1".to_string(),
            field: "REMAINING".to_string(),
            value: "garbage".to_string(),
        });
        assert!(avatar_updates(&event).is_empty());
    }

    #[test]
    fn test_display_only_events_send_nothing() {
        assert!(avatar_updates(&SenseEvent::GeneratorsReset).is_empty());
        assert!(avatar_updates(&SenseEvent::LogMessage("x".to_string())).is_empty());
        assert!(avatar_updates(&SenseEvent::SessionSummary("x".to_string())).is_empty());
    }
}
