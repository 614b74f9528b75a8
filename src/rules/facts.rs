use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::RuleError;

/// Source of one named fact's value.
///
/// Sources may hit a store or a remote service; the provider guarantees at
/// most one resolution per fact name per evaluation run.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn resolve(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// Fact whose value is known before the run starts.
pub struct StaticFact(Value);

impl StaticFact {
    pub fn new(value: Value) -> Self {
        Self(value)
    }
}

#[async_trait]
impl FactSource for StaticFact {
    async fn resolve(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.clone())
    }
}

/// Registry of named facts for a single evaluation run, with memoized
/// resolution. Build one per run; the cache is never shared across runs.
#[derive(Default)]
pub struct FactProvider {
    sources: HashMap<String, Arc<dyn FactSource>>,
    cache: Mutex<HashMap<String, Arc<Value>>>,
}

impl FactProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, source: Arc<dyn FactSource>) {
        self.sources.insert(name.into(), source);
    }

    pub fn register_value(&mut self, name: impl Into<String>, value: Value) {
        self.register(name, Arc::new(StaticFact::new(value)));
    }

    /// Resolve a named fact, hitting its source at most once per provider.
    ///
    /// A fact no source was registered for is a configuration error, never
    /// an ineligible-by-default answer.
    pub async fn fact(&self, name: &str) -> Result<Arc<Value>, RuleError> {
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(name) {
                return Ok(cached.clone());
            }
        }

        let source = self
            .sources
            .get(name)
            .ok_or_else(|| RuleError::UnknownFact(name.to_string()))?;

        let value = source.resolve().await.map_err(|e| RuleError::FactResolution {
            fact: name.to_string(),
            detail: e.to_string(),
        })?;
        let value = Arc::new(value);

        {
            let mut cache = self.cache.lock().await;
            cache.insert(name.to_string(), value.clone());
        }

        debug!("Resolved fact: {}", name);
        Ok(value)
    }
}
