use std::env;
use std::fs;

use crate::error::CatalogError;

/// Fixed roster of followed channels: source name -> YouTube channel id.
/// Read once at startup, never mutated at runtime.
pub const CHANNELS: &[(&str, &str)] = &[
    ("andrenavarroII", "UCv5OAW45h67CJEY6kJLyisg"),
    ("Musicforemptyrooms", "UCY8_y20lxQhhBe8GZl5A9rw"),
    ("herbietrees", "UCHPsRhxHbzQEwzdsJrx9bhg"),
    ("selvatican", "UCyvDDgWNL0gPlXCFQtofZLg"),
    ("VinyleArcheologie", "UCKydEBEvAU5zkN8o1snt62A"),
];

pub const CACHE_FILE: &str = "video_cache.json";

/// Discord rejects messages over 2000 characters; tracklist frames are cut
/// below that to leave room for the code-block fences around each frame.
pub const FRAME_LIMIT: usize = 1900;

/// Load KEY=VALUE pairs from botconfig.txt into the process environment,
/// trying the usual locations. Returns the path that was used. Running with
/// plain environment variables and no file works the same way; the caller
/// decides whether a missing file matters.
pub fn load_bot_config() -> Result<String, CatalogError> {
    let config_paths = [
        "botconfig.txt",
        "../botconfig.txt",
        "../../botconfig.txt",
        "src/botconfig.txt",
    ];

    for config_path in &config_paths {
        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(_) => continue,
        };

        // Remove BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(equals_pos) = line.find('=') {
                let key = line[..equals_pos].trim().to_string();
                let value = line[equals_pos + 1..].trim().to_string();
                env::set_var(&key, &value);
            }
        }

        return Ok(config_path.to_string());
    }

    Err(CatalogError::Config(
        "no botconfig.txt file found in any expected location (., .., ../.., src/)".to_string(),
    ))
}

fn require_env(key: &str) -> Result<String, CatalogError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() && !value.starts_with("YOUR_") => Ok(value),
        _ => Err(CatalogError::Config(format!(
            "required setting '{}' is missing or set to a placeholder",
            key
        ))),
    }
}

/// Check every required secret up front and hand back the gateway token.
/// Absence of any of the four is fatal: the process must not start serving
/// requests that would fail on their first provider call.
pub fn validate_required_secrets() -> Result<String, CatalogError> {
    let token = require_env("DISCORD_TOKEN")?;
    require_env("YOUTUBE_API_KEY")?;
    require_env("SPOTIFY_CLIENT_ID")?;
    require_env("SPOTIFY_CLIENT_SECRET")?;
    Ok(token)
}

/// Provider credentials, read per command invocation so a config edit plus
/// process restart is never needed mid-session for anything but the token.
pub struct CatalogConfig {
    pub youtube_api_key: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, CatalogError> {
        Ok(Self {
            youtube_api_key: require_env("YOUTUBE_API_KEY")?,
            spotify_client_id: require_env("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: require_env("SPOTIFY_CLIENT_SECRET")?,
        })
    }
}
