use std::path::PathBuf;

use crate::ops::export::DEFAULT_EXPORT_FILE_NAME;

/// Wheel-delta → scale-delta factor.
pub const DEFAULT_ZOOM_INTENSITY: f64 = 0.001;

/// Application preferences. Edits are never stored here.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Scale change per point of wheel scroll (scroll up zooms in)
    pub zoom_intensity: f64,
    /// File name pre-filled in the export dialog
    pub export_file_name: String,
    /// Show the MAP / TEXTURE hover lines in the top panel
    pub show_hover_info: bool,
    /// Language code; empty = detect from the environment
    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            zoom_intensity: DEFAULT_ZOOM_INTENSITY,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            show_hover_info: true,
            language: String::new(),
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/uvmapedit/uvmapedit_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\UVMapEdit\uvmapedit_settings.cfg
    /// On macOS:   ~/Library/Application Support/UVMapEdit/uvmapedit_settings.cfg
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        let config_dir = PathBuf::from(std::env::var("APPDATA").ok()?).join("UVMapEdit");
        #[cfg(target_os = "macos")]
        let config_dir = PathBuf::from(std::env::var("HOME").ok()?)
            .join("Library")
            .join("Application Support")
            .join("UVMapEdit");
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()?
            .join("uvmapedit");

        let _ = std::fs::create_dir_all(&config_dir);
        Some(config_dir.join("uvmapedit_settings.cfg"))
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "zoom_intensity={}\n\
             export_file_name={}\n\
             show_hover_info={}\n\
             language={}\n",
            self.zoom_intensity, self.export_file_name, self.show_hover_info, self.language,
        )
    }

    /// Parse `key=value` lines over the defaults. Unknown keys and unparsable
    /// values are skipped; out-of-range values are clamped.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "zoom_intensity" => {
                    if let Ok(v) = val.parse::<f64>()
                        && v.is_finite()
                    {
                        s.zoom_intensity = v.clamp(0.0001, 0.1);
                    }
                }
                "export_file_name" => {
                    if !val.is_empty() {
                        s.export_file_name = val.to_string();
                    }
                }
                "show_hover_info" => {
                    if let Ok(v) = val.parse::<bool>() {
                        s.show_hover_info = v;
                    }
                }
                "language" => s.language = val.to_string(),
                _ => {}
            }
        }
        s
    }

    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            crate::log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (defaults if missing or unreadable).
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_config_str(&content),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_string_round_trips() {
        let s = AppSettings {
            zoom_intensity: 0.002,
            export_file_name: "level-3.png".into(),
            show_hover_info: false,
            language: "fr".into(),
        };
        assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let s = AppSettings::from_config_str("zoom_intensity=fast\nnonsense\nshow_hover_info=maybe\nexport_file_name=\n");
        assert_eq!(s, AppSettings::default());
    }

    #[test]
    fn zoom_intensity_is_clamped() {
        let s = AppSettings::from_config_str("zoom_intensity=5\n");
        assert_eq!(s.zoom_intensity, 0.1);
    }
}
