// LinkVault services
// Services provide the record codec, backup export/import, and settings.

pub mod export_import;
pub mod record_codec;
pub mod settings_engine;
