//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use souq_commerce::shipping::{QuoteCache, ShippingCalculator};
use souq_commerce::store::MemoryStore;
use souq_data::{Fixture, TimedStore};

use crate::config::SouqConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["souq.toml", ".souq.toml", "souq.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: SouqConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Directory holding the config file, if one was found.
    config_dir: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&Path>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let found = match config_path {
            Some(path) => Some(cwd.join(path)),
            None => Self::find_config(&cwd),
        };

        let (config, config_dir) = match found {
            Some(path) => (
                SouqConfig::load(&path)?,
                path.parent().map(Path::to_path_buf),
            ),
            None => (SouqConfig::default(), None),
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_dir,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Resolve a path given on the command line.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Load the store from `fixture`, or from the configured fixture.
    pub fn store(&self, fixture: Option<&Path>) -> Result<Arc<MemoryStore>> {
        let path = match fixture {
            Some(path) => Some(self.resolve_path(path)),
            None => self.config.data.fixture.as_ref().map(|path| {
                let base = self.config_dir.as_deref().unwrap_or(&self.cwd);
                base.join(path)
            }),
        };

        let Some(path) = path else {
            self.output
                .warn("No fixture configured; every vendor falls back to the flat rate.");
            return Ok(Arc::new(MemoryStore::new()));
        };

        self.output.debug(&format!("Loading fixture {}", path.display()));
        let store = Fixture::load(&path)
            .and_then(Fixture::into_store)
            .with_context(|| format!("Failed to load fixture: {}", path.display()))?;
        tracing::info!(
            fixture = %path.display(),
            vendors = store.vendors().len(),
            coupons = store.coupons().len(),
            "fixture loaded"
        );
        Ok(Arc::new(store))
    }

    /// Wrap a store with the configured lookup timeouts.
    pub fn timed(&self, store: Arc<MemoryStore>) -> Arc<TimedStore<Arc<MemoryStore>>> {
        Arc::new(TimedStore::with_timeouts(store, self.config.lookups))
    }

    /// Shipping calculator over `store` with the configured settings.
    pub fn calculator(&self, store: Arc<MemoryStore>) -> ShippingCalculator {
        ShippingCalculator::with_config(self.timed(store), &self.config.shipping)
    }

    /// Quote cache sized by `[cache] capacity`.
    pub fn quote_cache(&self) -> QuoteCache {
        QuoteCache::new(self.config.cache.capacity)
    }
}

#[cfg(test)]
mod tests {
    use souq_commerce::cart::CartLineItem;
    use souq_commerce::{Currency, Money, Zone};

    use super::*;

    fn context(capacity: usize) -> Context {
        let mut config = SouqConfig::default();
        config.cache.capacity = capacity;
        Context {
            config,
            output: Output::new(false, false),
            cwd: PathBuf::from("/"),
            config_dir: None,
        }
    }

    #[tokio::test]
    async fn test_quote_cache_reuses_quotes() {
        let ctx = context(4);
        let store = Arc::new(
            MemoryStore::new()
                .with_rate("V1", "cairo", Money::from_major(15, Currency::EGP))
                .unwrap(),
        );
        let calculator = ctx.calculator(store.clone());
        let cache = ctx.quote_cache();
        let items = vec![CartLineItem::new("p-1", 1, Money::from_major(100, Currency::EGP))
            .unwrap()
            .with_vendor("V1")];
        let cairo = Zone::new("cairo").unwrap();

        let first = cache.quote(&calculator, &items, &cairo).await.unwrap();
        let second = cache.quote(&calculator, &items, &cairo).await.unwrap();
        assert_eq!(first, second);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert_eq!(store.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_quote_cache_honours_capacity() {
        let ctx = context(1);
        let calculator = ctx.calculator(Arc::new(MemoryStore::new()));
        let cache = ctx.quote_cache();
        let items = vec![CartLineItem::new("p-1", 1, Money::from_major(10, Currency::EGP))
            .unwrap()];

        for zone in ["cairo", "giza"] {
            let zone = Zone::new(zone).unwrap();
            cache.quote(&calculator, &items, &zone).await.unwrap();
        }
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_resolve_path_relative_to_cwd() {
        let ctx = context(4);
        assert_eq!(ctx.resolve_path(Path::new("cart.json")), PathBuf::from("/cart.json"));
        assert_eq!(ctx.resolve_path(Path::new("/tmp/c.json")), PathBuf::from("/tmp/c.json"));
    }
}
