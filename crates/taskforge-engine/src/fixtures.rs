//! Flat, load-once fixture cache.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Named JSON blobs preloaded for the run.
///
/// Loaded after filtering and before the first phase, read-only during task
/// execution, dropped when the run ends regardless of outcome. There is no
/// invalidation within a run. A fixture that cannot be read is a warning,
/// not an error — the tasks referencing it simply run without that data.
#[derive(Debug, Default)]
pub struct FixtureStore {
    fixtures: BTreeMap<String, serde_json::Value>,
}

impl FixtureStore {
    /// Load `<name>.json` from `dir` for every requested name. Duplicate
    /// names are read once.
    #[must_use]
    pub fn load<'a>(dir: &Path, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut fixtures = BTreeMap::new();
        let unique: BTreeSet<&str> = names.into_iter().collect();

        for name in unique {
            let path = dir.join(format!("{name}.json"));
            match fs::read_to_string(&path) {
                Ok(raw) => match serde_json::from_str(&raw) {
                    Ok(value) => {
                        debug!(fixture = name, path = %path.display(), "fixture loaded");
                        fixtures.insert(name.to_string(), value);
                    }
                    Err(err) => {
                        warn!(fixture = name, path = %path.display(), %err, "fixture is not valid JSON; skipping");
                    }
                },
                Err(err) => {
                    warn!(fixture = name, path = %path.display(), %err, "fixture could not be read; skipping");
                }
            }
        }

        Self { fixtures }
    }

    /// Look up a loaded fixture by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.fixtures.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
