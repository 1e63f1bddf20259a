//! SlashcoSense Library
//!
//! Библиотека мониторинга логов SlashCo (VRChat): инкрементальное чтение
//! лога, извлечение событий по паттернам, сверка по меткам времени и
//! публикация состояния сессии.

pub mod items;
pub mod mappings;
pub mod osc;
pub mod patterns;
pub mod reconcile;
pub mod session;
pub mod settings;
pub mod types;
pub mod watcher;

pub use items::ItemLexicon;
pub use mappings::GameLookups;
pub use osc::OscSink;
pub use patterns::PatternTable;
pub use reconcile::ReconcileCache;
pub use session::SessionResolver;
pub use types::*;
pub use watcher::{find_log_dir, LogCursor, LogWatcher};
