//! First-run guided tour and the persisted flag that gates it.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

pub const STORAGE_KEY: &str = "research-desk-onboarding-completed";

/// Pause between mount and opening the tour.
pub const PRESENTATION_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStep {
    pub title: &'static str,
    pub description: &'static str,
}

pub const TOUR_STEPS: [TourStep; 6] = [
    TourStep {
        title: "Welcome to Research Desk!",
        description: "A tool that researches, validates and writes reliable reports for you. Shall we take a quick tour?",
    },
    TourStep {
        title: "1. Set up your API keys",
        description: "An Anthropic API key is required. Optionally add a Tavily key to run real web searches.",
    },
    TourStep {
        title: "2. Ask a specific question",
        description: "Type your question in the text box. The more specific it is, the better the results.",
    },
    TourStep {
        title: "3. Choose the iterations",
        description: "Pick how many search and validation cycles to run. One is quick, three is more thorough.",
    },
    TourStep {
        title: "4. Explore the results",
        description: "Read the full report, the sources consulted, the confidence metrics and the validation details in the tabs.",
    },
    TourStep {
        title: "Ready to start!",
        description: "You are all set. Use \"Show tour again\" in the sidebar whenever you want to see this again.",
    },
];

#[derive(Debug, thiserror::Error)]
pub enum FlagStoreError {
    #[error("flag store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("flag store is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("flag store lock poisoned")]
    Poisoned,
}

/// Small key/value store for persisted UI flags.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<bool>, FlagStoreError>;
    fn set(&self, key: &str, value: bool) -> Result<(), FlagStoreError>;
    fn remove(&self, key: &str) -> Result<(), FlagStoreError>;
}

/// Flags kept as a JSON object in one file.
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFlagStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, FlagStoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, flags: &Map<String, Value>) -> Result<(), FlagStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(flags)?)?;
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Result<Option<bool>, FlagStoreError> {
        Ok(self.read_all()?.get(key).and_then(Value::as_bool))
    }

    fn set(&self, key: &str, value: bool) -> Result<(), FlagStoreError> {
        // A corrupt file is replaced rather than blocking the write.
        let mut flags = self.read_all().unwrap_or_default();
        flags.insert(key.to_string(), Value::Bool(value));
        self.write_all(&flags)
    }

    fn remove(&self, key: &str) -> Result<(), FlagStoreError> {
        let mut flags = self.read_all().unwrap_or_default();
        if flags.remove(key).is_some() {
            self.write_all(&flags)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFlagStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemoryFlagStore {
    fn flags(&self) -> Result<MutexGuard<'_, HashMap<String, bool>>, FlagStoreError> {
        self.flags.lock().map_err(|_| FlagStoreError::Poisoned)
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<bool>, FlagStoreError> {
        Ok(self.flags()?.get(key).copied())
    }

    fn set(&self, key: &str, value: bool) -> Result<(), FlagStoreError> {
        self.flags()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FlagStoreError> {
        self.flags()?.remove(key);
        Ok(())
    }
}

/// Step cursor plus open/closed state for the guided tour.
///
/// Only the tour writes the flag: `complete`, `skip` and `close` set it,
/// `reset` clears it.
pub struct OnboardingTour {
    store: Arc<dyn FlagStore>,
    steps: &'static [TourStep],
    cursor: usize,
    open: bool,
    should_show: Option<bool>,
}

impl OnboardingTour {
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self::with_steps(store, &TOUR_STEPS)
    }

    pub fn with_steps(store: Arc<dyn FlagStore>, steps: &'static [TourStep]) -> Self {
        OnboardingTour {
            store,
            steps,
            cursor: 0,
            open: false,
            should_show: None,
        }
    }

    /// True iff the flag was absent the first time this was asked.
    pub fn should_show(&mut self) -> bool {
        if let Some(show) = self.should_show {
            return show;
        }

        let show = match self.store.get(STORAGE_KEY) {
            Ok(Some(true)) => false,
            Ok(_) => true,
            Err(e) => {
                warn!("Could not read onboarding flag: {}. Showing tour.", e);
                true
            }
        };
        debug!(show, "onboarding flag checked");
        self.should_show = Some(show);
        show
    }

    /// Opens the tour if this is a first run. Called once the presentation
    /// delay after mount has elapsed.
    pub fn present(&mut self) -> bool {
        if self.should_show() {
            self.cursor = 0;
            self.open = true;
        }
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current(&self) -> Option<&TourStep> {
        self.steps.get(self.cursor)
    }

    pub fn is_last_step(&self) -> bool {
        self.cursor + 1 >= self.steps.len()
    }

    /// Advances, or completes the tour when already on the last step.
    pub fn next(&mut self) {
        if self.is_last_step() {
            self.complete();
        } else {
            self.cursor += 1;
        }
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Jump from the step indicator. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) {
        if index < self.steps.len() {
            self.cursor = index;
        }
    }

    pub fn complete(&mut self) {
        self.finish();
    }

    pub fn skip(&mut self) {
        self.finish();
    }

    /// The dialog's own close control counts as skipping.
    pub fn close(&mut self) {
        self.skip();
    }

    /// Clears the flag. The caller reloads the UI afterwards so the flag is
    /// read again from a clean state.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(STORAGE_KEY) {
            warn!("Could not clear onboarding flag: {}", e);
        }
        self.cursor = 0;
        self.open = false;
        self.should_show = None;
    }

    fn finish(&mut self) {
        if let Err(e) = self.store.set(STORAGE_KEY, true) {
            warn!("Could not persist onboarding flag: {}", e);
        }
        self.should_show = Some(false);
        self.open = false;
        self.cursor = 0;
    }
}
