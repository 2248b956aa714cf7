//! Caption Presentation Settings
//!
//! Reactive configuration read by the playback engine and any presentation
//! layer that wants live updates. Five independent switches/values; every
//! setter synchronously notifies the setting's subscribers with the new
//! value, even when it equals the previous one.
//!
//! The store is an explicit handle the host constructs once and shares
//! (typically behind `Rc`), not a hidden process-wide global. It is
//! single-threaded by design, like the rest of the engine.
//!
//! Persistence is a separate concern: [`SettingsPersistence`] reads/writes
//! the values as JSON with atomic writes (temp file + rename) and an
//! advisory file lock, normalizing out-of-range values instead of failing.

use std::cell::RefCell;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::EngineResult;

/// Settings file name
pub const SETTINGS_FILE: &str = "caption-settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "caption-settings.json.lock";

/// Identifier of a registered change handler, used to unsubscribe
pub type SubscriptionId = u64;

// =============================================================================
// Settings Values
// =============================================================================

/// Caption presentation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSettings {
    /// Master switch for all caption output
    #[serde(default = "default_true")]
    pub show_subtitles: bool,

    /// Whether non-dialogue (speakerless) cues are shown
    #[serde(default)]
    pub show_closed_captions: bool,

    /// Whether speaker names are shown in front of dialogue cues
    #[serde(default = "default_true")]
    pub show_speaker_names: bool,

    /// Whether speaker names are tinted with the speaker's color
    #[serde(default = "default_true")]
    pub colorize_speaker_names: bool,

    /// Opacity of the background plate behind caption text (0.0 - 1.0)
    #[serde(default = "default_background_alpha")]
    pub background_alpha: f64,
}

fn default_true() -> bool {
    true
}

fn default_background_alpha() -> f64 {
    0.5
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            show_subtitles: true,
            show_closed_captions: false,
            show_speaker_names: true,
            colorize_speaker_names: true,
            background_alpha: default_background_alpha(),
        }
    }
}

impl CaptionSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Tolerant on purpose: corrects bad values instead of failing, so
    /// corrupted/old config files don't disable captions.
    pub fn normalize(&mut self) {
        if !self.background_alpha.is_finite() {
            warn!("backgroundAlpha is not finite, resetting to default");
            self.background_alpha = default_background_alpha();
        }
        self.background_alpha = self.background_alpha.clamp(0.0, 1.0);
    }
}

// =============================================================================
// Reactive Store
// =============================================================================

type BoolHandler = Rc<dyn Fn(bool)>;
type AlphaHandler = Rc<dyn Fn(f64)>;

#[derive(Default)]
struct StoreInner {
    values: CaptionSettings,
    next_subscription: SubscriptionId,
    show_subtitles: Vec<(SubscriptionId, BoolHandler)>,
    show_closed_captions: Vec<(SubscriptionId, BoolHandler)>,
    show_speaker_names: Vec<(SubscriptionId, BoolHandler)>,
    colorize_speaker_names: Vec<(SubscriptionId, BoolHandler)>,
    background_alpha: Vec<(SubscriptionId, AlphaHandler)>,
}

impl StoreInner {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        self.next_subscription
    }
}

/// Reactive settings store with synchronous change notification.
///
/// Handlers for one setting run in registration order. Dispatch is
/// re-entrant: a handler may read, set, subscribe, or unsubscribe on the
/// same store — each dispatch iterates a snapshot of the handlers taken
/// before the first call, so mutation during dispatch is safe. A handler
/// unsubscribed mid-dispatch still receives the notification that was
/// already in flight.
#[derive(Default)]
pub struct SettingsStore {
    inner: RefCell<StoreInner>,
}

impl SettingsStore {
    /// Creates a store with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given (normalized) values
    pub fn with_values(mut values: CaptionSettings) -> Self {
        values.normalize();
        Self {
            inner: RefCell::new(StoreInner {
                values,
                ..StoreInner::default()
            }),
        }
    }

    // --- showSubtitles ---

    pub fn show_subtitles(&self) -> bool {
        self.inner.borrow().values.show_subtitles
    }

    pub fn set_show_subtitles(&self, show: bool) {
        let handlers: Vec<BoolHandler> = {
            let mut inner = self.inner.borrow_mut();
            inner.values.show_subtitles = show;
            inner.show_subtitles.iter().map(|(_, h)| Rc::clone(h)).collect()
        };
        for handler in handlers {
            handler(show);
        }
    }

    pub fn on_show_subtitles_changed(&self, handler: impl Fn(bool) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.show_subtitles.push((id, Rc::new(handler)));
        id
    }

    // --- showClosedCaptions ---

    pub fn show_closed_captions(&self) -> bool {
        self.inner.borrow().values.show_closed_captions
    }

    pub fn set_show_closed_captions(&self, show: bool) {
        let handlers: Vec<BoolHandler> = {
            let mut inner = self.inner.borrow_mut();
            inner.values.show_closed_captions = show;
            inner
                .show_closed_captions
                .iter()
                .map(|(_, h)| Rc::clone(h))
                .collect()
        };
        for handler in handlers {
            handler(show);
        }
    }

    pub fn on_show_closed_captions_changed(
        &self,
        handler: impl Fn(bool) + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.show_closed_captions.push((id, Rc::new(handler)));
        id
    }

    // --- showSpeakerNames ---

    pub fn show_speaker_names(&self) -> bool {
        self.inner.borrow().values.show_speaker_names
    }

    pub fn set_show_speaker_names(&self, show: bool) {
        let handlers: Vec<BoolHandler> = {
            let mut inner = self.inner.borrow_mut();
            inner.values.show_speaker_names = show;
            inner
                .show_speaker_names
                .iter()
                .map(|(_, h)| Rc::clone(h))
                .collect()
        };
        for handler in handlers {
            handler(show);
        }
    }

    pub fn on_show_speaker_names_changed(
        &self,
        handler: impl Fn(bool) + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.show_speaker_names.push((id, Rc::new(handler)));
        id
    }

    // --- colorizeSpeakerNames ---

    pub fn colorize_speaker_names(&self) -> bool {
        self.inner.borrow().values.colorize_speaker_names
    }

    /// Notifies subscribers with the colorize value itself, never another
    /// setting's state.
    pub fn set_colorize_speaker_names(&self, colorize: bool) {
        let handlers: Vec<BoolHandler> = {
            let mut inner = self.inner.borrow_mut();
            inner.values.colorize_speaker_names = colorize;
            inner
                .colorize_speaker_names
                .iter()
                .map(|(_, h)| Rc::clone(h))
                .collect()
        };
        for handler in handlers {
            handler(colorize);
        }
    }

    pub fn on_colorize_speaker_names_changed(
        &self,
        handler: impl Fn(bool) + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.colorize_speaker_names.push((id, Rc::new(handler)));
        id
    }

    // --- backgroundAlpha ---

    pub fn background_alpha(&self) -> f64 {
        self.inner.borrow().values.background_alpha
    }

    pub fn set_background_alpha(&self, alpha: f64) {
        let alpha = {
            let mut inner = self.inner.borrow_mut();
            inner.values.background_alpha = alpha;
            inner.values.normalize();
            inner.values.background_alpha
        };
        let handlers: Vec<AlphaHandler> = self
            .inner
            .borrow()
            .background_alpha
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(alpha);
        }
    }

    pub fn on_background_alpha_changed(&self, handler: impl Fn(f64) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.background_alpha.push((id, Rc::new(handler)));
        id
    }

    // --- lifecycle / bulk access ---

    /// Removes the handler with the given id, whichever setting it watches
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.borrow_mut();
        inner.show_subtitles.retain(|(sid, _)| *sid != id);
        inner.show_closed_captions.retain(|(sid, _)| *sid != id);
        inner.show_speaker_names.retain(|(sid, _)| *sid != id);
        inner.colorize_speaker_names.retain(|(sid, _)| *sid != id);
        inner.background_alpha.retain(|(sid, _)| *sid != id);
    }

    /// Returns the number of registered handlers across all settings
    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.show_subtitles.len()
            + inner.show_closed_captions.len()
            + inner.show_speaker_names.len()
            + inner.colorize_speaker_names.len()
            + inner.background_alpha.len()
    }

    /// Returns a copy of the current values
    pub fn snapshot(&self) -> CaptionSettings {
        self.inner.borrow().values.clone()
    }

    /// Replaces all values, firing every setting's notification
    pub fn replace(&self, mut settings: CaptionSettings) {
        settings.normalize();
        self.set_show_subtitles(settings.show_subtitles);
        self.set_show_closed_captions(settings.show_closed_captions);
        self.set_show_speaker_names(settings.show_speaker_names);
        self.set_colorize_speaker_names(settings.colorize_speaker_names);
        self.set_background_alpha(settings.background_alpha);
    }
}

// =============================================================================
// Persistence
// =============================================================================

/// Loads, saves, and resets caption settings on disk
pub struct SettingsPersistence {
    settings_path: PathBuf,
}

impl SettingsPersistence {
    /// Creates a persistence handle rooted at the given config directory
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join(SETTINGS_FILE),
        }
    }

    /// Returns the settings file path
    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(
        &self,
        exclusive: bool,
        op: impl FnOnce() -> EngineResult<T>,
    ) -> EngineResult<T> {
        // The parent directory must exist before the lock file can be created.
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("failed to unlock caption settings lock file: {e}");
        }

        result
    }

    /// Loads settings from disk, returning defaults if the file is missing
    /// or unreadable
    pub fn load(&self) -> CaptionSettings {
        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("caption settings file not found, using defaults");
                return Ok(CaptionSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings: CaptionSettings = serde_json::from_str(&content)?;
            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("failed to load caption settings, using defaults: {e}");
                CaptionSettings::default()
            }
        }
    }

    /// Saves settings to disk with an atomic write (temp file + rename),
    /// returning the normalized values that were written
    pub fn save(&self, settings: &CaptionSettings) -> EngineResult<CaptionSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            let content = serde_json::to_string_pretty(&normalized)?;

            let temp_path = self.settings_path.with_extension("json.tmp");
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;

            // std::fs::rename does not overwrite on Windows.
            #[cfg(windows)]
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
            }
            fs::rename(&temp_path, &self.settings_path)?;

            info!("caption settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Deletes the settings file and returns defaults
    pub fn reset(&self) -> EngineResult<CaptionSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                info!("caption settings file deleted");
            }
            Ok(CaptionSettings::default())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
