use crate::{Result, RuntimeError};
use emote_core::{
    segment, BuildReport, CompiledMatcher, DictionaryBuilder, EmoteConfig, EmoteDictionary,
    EmoteError, MatchPolicy, RenderOptions, Segment,
};
use emote_source::DictionarySource;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;

/// A complete dictionary together with the generation it was published as
#[derive(Debug, Clone)]
pub struct DictionarySnapshot {
    pub dictionary: Arc<EmoteDictionary>,
    pub generation: u64,
}

/// What a successful load published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub emotes: usize,
    pub animated: usize,
    pub generation: u64,
    pub build: BuildReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Published(LoadReport),
    /// The store was torn down while the fetch was in flight
    Discarded,
}

/// Effects of [`EmoteStore::apply_config`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChange {
    pub matchers_invalidated: bool,
    /// Set id, endpoint or asset format changed; records only pick that up on the next load
    pub reload_required: bool,
}

struct StoreState {
    alive: bool,
    config: EmoteConfig,
    snapshot: DictionarySnapshot,
}

struct CachedMatcher {
    generation: u64,
    matcher: Arc<CompiledMatcher>,
}

/// Owns the live dictionary.
///
/// Loads build the next dictionary completely before swapping it in under a
/// write lock, so readers only ever see whole dictionaries. Overlapping loads are
/// not serialized: whichever publishes last wins. After [`teardown`](Self::teardown)
/// late load results are dropped.
pub struct EmoteStore {
    state: RwLock<StoreState>,
    matchers: Mutex<HashMap<MatchPolicy, CachedMatcher>>,
    next_generation: AtomicU64,
    compilations: AtomicU64,
}

impl EmoteStore {
    pub fn new(config: EmoteConfig) -> Self {
        Self {
            state: RwLock::new(StoreState {
                alive: true,
                config,
                snapshot: DictionarySnapshot {
                    dictionary: Arc::new(EmoteDictionary::empty()),
                    generation: 0,
                },
            }),
            matchers: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            compilations: AtomicU64::new(0),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.read_state().alive
    }

    pub fn config(&self) -> EmoteConfig {
        self.read_state().config.clone()
    }

    pub fn policy(&self) -> MatchPolicy {
        self.read_state().config.match_policy
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::from(&self.read_state().config)
    }

    pub fn snapshot(&self) -> DictionarySnapshot {
        self.read_state().snapshot.clone()
    }

    pub fn dictionary(&self) -> Arc<EmoteDictionary> {
        Arc::clone(&self.read_state().snapshot.dictionary)
    }

    pub fn generation(&self) -> u64 {
        self.read_state().snapshot.generation
    }

    /// Number of matcher compilations so far
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Fetch, build and publish the configured emote set.
    ///
    /// A failed fetch leaves the current dictionary in place.
    pub async fn load(&self, source: &dyn DictionarySource) -> Result<LoadOutcome> {
        let config = self.config();
        log::debug!(
            "Loading emote set {} from {}",
            config.emote_set_id,
            source.describe()
        );

        let entries = match source.fetch_raw_emotes(&config.emote_set_id).await {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Failed to load emotes from {}: {err}", source.describe());
                return Err(RuntimeError::Source(err));
            }
        };

        let (dictionary, build) = DictionaryBuilder::new(config.asset).build_with_report(entries);
        let emotes = dictionary.len();
        let animated = dictionary.animated_count();

        match self.publish(dictionary) {
            Some(generation) => {
                log::info!("Loaded {emotes} emotes (generation {generation})");
                Ok(LoadOutcome::Published(LoadReport {
                    emotes,
                    animated,
                    generation,
                    build,
                }))
            }
            None => {
                log::warn!("Discarding {emotes} loaded emotes: store was torn down");
                Ok(LoadOutcome::Discarded)
            }
        }
    }

    /// Run [`load`](Self::load) on the tokio runtime
    pub fn spawn_load(
        self: &Arc<Self>,
        source: Arc<dyn DictionarySource>,
    ) -> JoinHandle<Result<LoadOutcome>> {
        let store = Arc::clone(self);
        tokio::spawn(async move { store.load(source.as_ref()).await })
    }

    /// Swap in a fully built dictionary. Returns its generation, or `None` after teardown.
    pub fn publish(&self, dictionary: EmoteDictionary) -> Option<u64> {
        let dictionary = Arc::new(dictionary);
        let generation = {
            let mut state = self.write_state();
            if !state.alive {
                return None;
            }
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            state.snapshot = DictionarySnapshot {
                dictionary,
                generation,
            };
            generation
        };
        self.lock_matchers().clear();
        Some(generation)
    }

    /// Drop the dictionary and refuse later publishes
    pub fn teardown(&self) {
        {
            let mut state = self.write_state();
            state.alive = false;
            state.snapshot = DictionarySnapshot {
                dictionary: Arc::new(EmoteDictionary::empty()),
                generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            };
        }
        self.lock_matchers().clear();
        log::debug!("Emote store torn down");
    }

    pub fn apply_config(&self, next: EmoteConfig) -> Result<ConfigChange> {
        next.validate().map_err(EmoteError::InvalidConfig)?;

        let change = {
            let mut state = self.write_state();
            let current = &state.config;
            let change = ConfigChange {
                matchers_invalidated: current.invalidates_matchers(&next),
                reload_required: current.emote_set_id != next.emote_set_id
                    || current.api_base_url != next.api_base_url
                    || current.asset != next.asset,
            };
            state.config = next;
            change
        };

        if change.matchers_invalidated {
            log::debug!("Match policy changed, dropping cached matchers");
            self.lock_matchers().clear();
        }
        Ok(change)
    }

    /// Matcher for the active policy over the current dictionary
    pub fn matcher(&self) -> Arc<CompiledMatcher> {
        let snapshot = self.snapshot();
        self.matcher_for(&snapshot, self.policy())
    }

    /// Compiled once per (generation, policy). A pattern that fails to compile is
    /// replaced by one that never matches, so text still renders plainly.
    pub fn matcher_for(&self, snapshot: &DictionarySnapshot, policy: MatchPolicy) -> Arc<CompiledMatcher> {
        if let Some(cached) = self.lock_matchers().get(&policy) {
            if cached.generation == snapshot.generation {
                return Arc::clone(&cached.matcher);
            }
        }

        let matcher = match CompiledMatcher::for_dictionary(&snapshot.dictionary, policy) {
            Ok(matcher) => matcher,
            Err(err) => {
                log::warn!("Cannot compile {policy} matcher, falling back to plain text: {err}");
                CompiledMatcher::never(policy)
            }
        };
        self.compilations.fetch_add(1, Ordering::Relaxed);
        let matcher = Arc::new(matcher);

        // A publish may have happened while compiling; only cache for the live generation.
        if snapshot.generation == self.generation() {
            self.lock_matchers().insert(
                policy,
                CachedMatcher {
                    generation: snapshot.generation,
                    matcher: Arc::clone(&matcher),
                },
            );
        }
        matcher
    }

    /// Segment one message against a consistent dictionary/matcher pair
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let snapshot = self.snapshot();
        let matcher = self.matcher_for(&snapshot, self.policy());
        segment(text, &matcher, &snapshot.dictionary)
    }

    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<String> {
        self.dictionary().query(query, limit)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_matchers(&self) -> std::sync::MutexGuard<'_, HashMap<MatchPolicy, CachedMatcher>> {
        self.matchers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EmoteStore {
    fn default() -> Self {
        Self::new(EmoteConfig::default())
    }
}
