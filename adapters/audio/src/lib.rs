#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sound bank and playback for Boss Arena.
//!
//! Audio is never fatal: missing files, unsupported containers and an
//! unavailable output device are logged and turn the request into a no-op.

#[cfg(feature = "rodio")]
mod device;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use boss_arena_core::{ActionKind, Event};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "rodio")]
pub use device::RodioDevice;

/// Errors raised by the sound bank.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The sound file could not be read.
    #[error("failed to read sound {}", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Only RIFF/WAVE files are supported.
    #[error("sound {} is not a WAV file", path.display())]
    UnsupportedFormat {
        /// Rejected file.
        path: PathBuf,
    },
    /// No sound was registered under the key.
    #[error("no sound registered as `{key}`")]
    UnknownSound {
        /// Requested key.
        key: String,
    },
    /// No sound belongs to the category.
    #[error("no sound variants for `{category}`")]
    NoVariants {
        /// Requested category.
        category: String,
    },
    /// No output device is available.
    #[error("audio output device is unavailable")]
    DeviceUnavailable,
    /// The device failed to play a sound.
    #[error("playback of `{key}` failed: {reason}")]
    Playback {
        /// Sound that failed.
        key: String,
        /// Device-specific description.
        reason: String,
    },
}

/// Encoded sound kept in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundData {
    path: PathBuf,
    bytes: Arc<[u8]>,
}

impl SoundData {
    /// Reads a WAV file, rejecting any other container.
    pub fn load(path: &Path) -> Result<Self, AudioError> {
        let is_wav_name = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("wav"));
        if !is_wav_name {
            return Err(AudioError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(AudioError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            bytes: bytes.into(),
        })
    }

    /// File the sound was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoded WAV bytes.
    #[must_use]
    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }
}

/// Output device that plays decoded sounds.
pub trait PlaybackDevice {
    /// Starts playing `sound` without blocking.
    fn play(&mut self, key: &str, sound: &SoundData) -> Result<(), AudioError>;
}

/// Keyed collection of sounds with an optional output device.
pub struct AudioManager {
    sounds: BTreeMap<String, SoundData>,
    device: Option<Box<dyn PlaybackDevice>>,
    rng: ChaCha8Rng,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("sounds", &self.sounds.keys().collect::<Vec<_>>())
            .field("has_device", &self.device.is_some())
            .finish_non_exhaustive()
    }
}

impl AudioManager {
    /// Creates a manager playing through `device`, or silently when `None`.
    ///
    /// `seed` drives the choice among sound variants.
    #[must_use]
    pub fn new(device: Option<Box<dyn PlaybackDevice>>, seed: u64) -> Self {
        Self {
            sounds: BTreeMap::new(),
            device,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a manager bound to the default output device, if one is available.
    #[must_use]
    pub fn with_default_device(seed: u64) -> Self {
        Self::new(default_device(), seed)
    }

    /// Whether an output device is attached.
    #[must_use]
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// Loads the sound at `path` under `key`, logging and ignoring failures.
    pub fn load_sound(&mut self, path: &Path, key: &str) -> bool {
        match self.try_load_sound(path, key) {
            Ok(()) => true,
            Err(error) => {
                warn!(%key, %error, "sound not loaded");
                false
            }
        }
    }

    /// Loads the sound at `path` under `key`.
    pub fn try_load_sound(&mut self, path: &Path, key: &str) -> Result<(), AudioError> {
        let sound = SoundData::load(path)?;
        debug!(%key, path = %path.display(), "sound loaded");
        let _ = self.sounds.insert(key.to_owned(), sound);
        Ok(())
    }

    /// Whether a sound is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.sounds.contains_key(key)
    }

    /// Keys named `category` or `category_*`, in ascending order.
    pub fn variants<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sounds.keys().map(String::as_str).filter(move |key| {
            key.strip_prefix(category)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('_'))
        })
    }

    /// Plays the sound under `key`, logging and ignoring failures.
    pub fn play_sound(&mut self, key: &str) {
        if let Err(error) = self.try_play_sound(key) {
            warn!(%key, %error, "sound not played");
        }
    }

    /// Plays the sound under `key`.
    pub fn try_play_sound(&mut self, key: &str) -> Result<(), AudioError> {
        let sound = self
            .sounds
            .get(key)
            .ok_or_else(|| AudioError::UnknownSound {
                key: key.to_owned(),
            })?;
        let device = self.device.as_mut().ok_or(AudioError::DeviceUnavailable)?;
        device.play(key, sound)
    }

    /// Plays one randomly chosen variant of `category`, logging and ignoring failures.
    pub fn play_random_variant(&mut self, category: &str) {
        if let Err(error) = self.try_play_random_variant(category) {
            warn!(%category, %error, "sound variant not played");
        }
    }

    /// Plays one randomly chosen variant of `category` and returns its key.
    pub fn try_play_random_variant(&mut self, category: &str) -> Result<String, AudioError> {
        let candidates: Vec<String> = self.variants(category).map(str::to_owned).collect();
        let key = candidates
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| AudioError::NoVariants {
                category: category.to_owned(),
            })?;
        self.try_play_sound(&key)?;
        Ok(key)
    }
}

#[cfg(feature = "rodio")]
fn default_device() -> Option<Box<dyn PlaybackDevice>> {
    match RodioDevice::open_default() {
        Ok(device) => Some(Box::new(device)),
        Err(error) => {
            warn!(%error, "audio disabled");
            None
        }
    }
}

#[cfg(not(feature = "rodio"))]
fn default_device() -> Option<Box<dyn PlaybackDevice>> {
    debug!("built without an audio backend");
    None
}

/// Sound categories played in response to gameplay events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Light action triggered.
    Fart,
    /// Heavy action triggered.
    MegaFart,
    /// Damage landed on the boss.
    BossHurt,
    /// The boss died.
    BossDeath,
    /// A bomb went off.
    Explosion,
    /// The player's run ended.
    GameOver,
}

impl SoundCue {
    /// Cue for `event`, if the event makes a sound.
    #[must_use]
    pub fn for_event(event: &Event) -> Option<Self> {
        match event {
            Event::ActionTriggered {
                action: ActionKind::Light,
                ..
            } => Some(Self::Fart),
            Event::ActionTriggered {
                action: ActionKind::Heavy,
                ..
            } => Some(Self::MegaFart),
            Event::BossDamaged { .. } => Some(Self::BossHurt),
            Event::BossDied { .. } => Some(Self::BossDeath),
            Event::ObjectExpired { .. } => Some(Self::Explosion),
            Event::GameOver { first: true, .. } => Some(Self::GameOver),
            _ => None,
        }
    }

    /// Category whose variants are played for this cue.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Fart => "fart",
            Self::MegaFart => "mega_fart",
            Self::BossHurt => "boss_hurt",
            Self::BossDeath => "boss_death",
            Self::Explosion => "explosion",
            Self::GameOver => "game_over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boss_arena_core::{GameOverCause, Position, Timestamp};
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct Recorder {
        played: Rc<RefCell<Vec<String>>>,
    }

    impl PlaybackDevice for Recorder {
        fn play(&mut self, key: &str, _sound: &SoundData) -> Result<(), AudioError> {
            self.played.borrow_mut().push(key.to_owned());
            Ok(())
        }
    }

    fn sound(key: &str) -> SoundData {
        SoundData {
            path: PathBuf::from(format!("{key}.wav")),
            bytes: Arc::from(&b"RIFF\0\0\0\0WAVE"[..]),
        }
    }

    fn manager_with(keys: &[&str]) -> (AudioManager, Rc<RefCell<Vec<String>>>) {
        let recorder = Recorder::default();
        let played = Rc::clone(&recorder.played);
        let mut manager = AudioManager::new(Some(Box::new(recorder)), 7);
        for key in keys {
            let _ = manager.sounds.insert((*key).to_owned(), sound(key));
        }
        (manager, played)
    }

    #[test]
    fn variants_match_category_or_underscore_suffix() {
        let (manager, _) = manager_with(&["fart", "fart_1", "fart_2", "farther", "mega_fart"]);
        let variants: Vec<_> = manager.variants("fart").collect();
        assert_eq!(variants, vec!["fart", "fart_1", "fart_2"]);
    }

    #[test]
    fn random_variant_plays_one_of_the_category() {
        let (mut manager, played) = manager_with(&["boss_hurt_1", "boss_hurt_2", "explosion"]);
        for _ in 0..10 {
            let key = manager
                .try_play_random_variant("boss_hurt")
                .expect("variant played");
            assert!(key.starts_with("boss_hurt_"));
        }
        assert_eq!(played.borrow().len(), 10);
    }

    #[test]
    fn missing_sounds_are_ignored() {
        let (mut manager, played) = manager_with(&[]);
        manager.play_sound("nothing");
        manager.play_random_variant("nothing");
        assert!(played.borrow().is_empty());
        assert!(matches!(
            manager.try_play_sound("nothing"),
            Err(AudioError::UnknownSound { .. })
        ));
    }

    #[test]
    fn silent_manager_reports_missing_device() {
        let mut manager = AudioManager::new(None, 0);
        let _ = manager.sounds.insert("fart".to_owned(), sound("fart"));
        assert!(!manager.has_device());
        assert!(matches!(
            manager.try_play_sound("fart"),
            Err(AudioError::DeviceUnavailable)
        ));
        manager.play_sound("fart");
    }

    #[test]
    fn events_map_to_cues() {
        let light = Event::ActionTriggered {
            action: ActionKind::Light,
            source: Position::new(0, 0),
            due: Timestamp::ZERO,
        };
        assert_eq!(SoundCue::for_event(&light), Some(SoundCue::Fart));
        assert_eq!(
            SoundCue::for_event(&Event::GameOver {
                cause: GameOverCause::CorpseHazard,
                first: true,
            })
            .map(SoundCue::category),
            Some("game_over")
        );
        assert_eq!(
            SoundCue::for_event(&Event::GameOver {
                cause: GameOverCause::CorpseHazard,
                first: false,
            }),
            None
        );
        assert_eq!(
            SoundCue::for_event(&Event::PlayerMoved {
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            }),
            None
        );
    }
}
