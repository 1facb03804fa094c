use crate::model::{ServerProfile, Settings};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "jamdeck";
const SETTINGS_FILE: &str = "settings.json";

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("JAMDECK_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

/// The file may carry a server password, so it is kept private to the
/// owner where the platform allows it.
pub fn save_settings(settings: &Settings) -> Result<()> {
    ensure_config_dir()?;
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    restrict_to_owner(&path)?;
    Ok(())
}

/// Settings as they should be written back when the user did not ask to
/// save: playback preferences follow the session, but the server profile
/// stays whatever was last stored.
pub fn settings_to_persist(settings: &Settings, stored_server: Option<&ServerProfile>) -> Settings {
    Settings {
        server: stored_server.cloned(),
        ..settings.clone()
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("tempdir");
        unsafe {
            env::set_var("JAMDECK_CONFIG_DIR", dir.path().to_string_lossy().as_ref());
        }

        assert_eq!(load_settings().expect("defaults"), Settings::default());

        let settings = Settings {
            loop_queue: true,
            auto_play: true,
            server: Some(ServerProfile {
                endpoint: String::from("https://music.example.org"),
                username: String::from("ann"),
                password: String::from("sesame"),
            }),
            ..Settings::default()
        };
        save_settings(&settings).expect("save");
        let loaded = load_settings().expect("load");
        assert_eq!(loaded, settings);

        let raw = fs::read_to_string(dir.path().join(SETTINGS_FILE)).expect("raw");
        assert!(raw.contains("\"LoopQueue\": true"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.path().join(SETTINGS_FILE))
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").expect("corrupt");
        let err = load_settings().expect_err("corrupt settings");
        assert!(format!("{err:#}").contains("failed to parse settings file"));
    }

    #[test]
    fn persisted_settings_keep_the_stored_server() {
        let stored = ServerProfile {
            endpoint: String::from("https://home.example.org"),
            username: String::from("ann"),
            password: String::from("sesame"),
        };
        let session = Settings {
            repeat: true,
            server: Some(ServerProfile {
                endpoint: String::from("https://borrowed.example.org"),
                username: String::from("guest"),
                password: String::from("hunter2"),
            }),
            ..Settings::default()
        };

        let kept = settings_to_persist(&session, Some(&stored));
        assert!(kept.repeat);
        assert_eq!(kept.server, Some(stored));

        assert_eq!(settings_to_persist(&session, None).server, None);
    }
}
