use crate::ThumbnailerSettings;
use color_eyre::eyre::Result;
use std::path::Path;

pub const SETTINGS_PATH: &str = "config/settings.yaml";

/// Loads settings from `.env`, `config/settings.yaml` and `APP__*` environment variables, in
/// increasing order of precedence. Both files are optional.
pub fn load_app_settings() -> Result<ThumbnailerSettings> {
    // Load .env first so its values are visible as environment overrides.
    dotenv::from_path(".env").ok();
    load_settings_from(Path::new(SETTINGS_PATH))
}

pub fn load_settings_from(config_path: &Path) -> Result<ThumbnailerSettings> {
    let builder = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let settings = builder.build()?.try_deserialize::<ThumbnailerSettings>()?;
    Ok(settings)
}
