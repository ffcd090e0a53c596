use crate::error::StoreError;
use crate::settings::{ClickButton, ClickInputs, ClickKind, PositionMode, RepeatMode};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::{Path, PathBuf}};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// On-disk layout. Every group and every field falls back to its default
/// when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedSettings {
    // Plain values must precede the tables in TOML output.
    pub top_most: bool,
    pub click_interval: IntervalGroup,
    pub click_repeat: RepeatGroup,
    pub click_position: PositionGroup,
    pub click_options: OptionsGroup,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalGroup {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatGroup {
    pub mode: RepeatMode,
    pub times: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionGroup {
    pub mode: PositionMode,
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsGroup {
    pub mouse_button: ClickButton,
    pub click_type: ClickKind,
}

impl Default for IntervalGroup {
    fn default() -> Self {
        Self { hours: 0, minutes: 0, seconds: 0, milliseconds: 100 }
    }
}

impl Default for RepeatGroup {
    fn default() -> Self {
        Self { mode: RepeatMode::Infinite, times: 1 }
    }
}

impl SavedSettings {
    pub fn new(inputs: &ClickInputs, top_most: bool) -> Self {
        Self {
            top_most,
            click_interval: IntervalGroup {
                hours: inputs.hours,
                minutes: inputs.minutes,
                seconds: inputs.seconds,
                milliseconds: inputs.millis,
            },
            click_repeat: RepeatGroup { mode: inputs.repeat_mode, times: inputs.repeat_times },
            click_position: PositionGroup { mode: inputs.position_mode, x: inputs.x, y: inputs.y },
            click_options: OptionsGroup { mouse_button: inputs.button, click_type: inputs.click_kind },
        }
    }

    pub fn inputs(&self) -> ClickInputs {
        ClickInputs {
            hours: self.click_interval.hours,
            minutes: self.click_interval.minutes,
            seconds: self.click_interval.seconds,
            millis: self.click_interval.milliseconds,
            repeat_mode: self.click_repeat.mode,
            repeat_times: self.click_repeat.times,
            position_mode: self.click_position.mode,
            x: self.click_position.x,
            y: self.click_position.y,
            button: self.click_options.mouse_button,
            click_kind: self.click_options.click_type,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when there is no file yet.
    pub fn load(&self) -> Result<Option<SavedSettings>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };

        let saved = toml::from_str(&text)
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;
        tracing::info!(path = %self.path.display(), "settings loaded");
        Ok(Some(saved))
    }

    pub fn save(&self, settings: &SavedSettings) -> Result<(), StoreError> {
        let text = toml::to_string_pretty(settings)?;
        fs::write(&self.path, text)
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        tracing::info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join(DEFAULT_CONFIG_FILE))
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_keeps_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let inputs = ClickInputs {
            hours: 2,
            minutes: 59,
            seconds: 7,
            millis: 0,
            repeat_mode: RepeatMode::FixedCount,
            repeat_times: 42,
            position_mode: PositionMode::FixedPoint,
            x: 1919,
            y: 1079,
            button: ClickButton::Middle,
            click_kind: ClickKind::Double,
        };

        store.save(&SavedSettings::new(&inputs, true)).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.inputs(), inputs);
        assert!(loaded.top_most);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&SavedSettings::new(&ClickInputs { x: 5, ..ClickInputs::default() }, true)).unwrap();
        store.save(&SavedSettings::default()).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), SavedSettings::default());
    }

    #[test]
    fn file_uses_grouped_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&SavedSettings::default()).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("top_most = false"));
        assert!(text.contains("[click_interval]"));
        assert!(text.contains("milliseconds = 100"));
        assert!(text.contains("mode = 0"));
        assert!(text.contains("mouse_button = \"Left\""));
        assert!(text.contains("click_type = \"Single\""));
    }

    #[test]
    fn missing_keys_take_named_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "[click_interval]\nseconds = 3\n\n[click_options]\nclick_type = \"Double\"\n").unwrap();

        let inputs = store.load().unwrap().unwrap().inputs();
        assert_eq!(inputs.seconds, 3);
        assert_eq!(inputs.millis, 100);
        assert_eq!(inputs.repeat_times, 1);
        assert_eq!(inputs.button, ClickButton::Left);
        assert_eq!(inputs.click_kind, ClickKind::Double);
    }

    #[test]
    fn malformed_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for bad in [
            "this is = = not toml",
            "[click_repeat]\nmode = 5\n",
            "[click_position]\nx = -4\n",
            "[click_options]\nmouse_button = \"Thumb\"\n",
        ] {
            fs::write(store.path(), bad).unwrap();
            assert!(matches!(store.load(), Err(StoreError::Parse { .. })), "accepted {bad:?}");
        }
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("missing").join(DEFAULT_CONFIG_FILE));
        assert!(matches!(store.save(&SavedSettings::default()), Err(StoreError::Io { .. })));
    }
}
