// src/pools.rs
// question pools, loaded from JSON once per class and kept in memory

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::info;

pub const CLASSES: [&str; 3] = ["technician", "general", "extra"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub topic: String,
    pub number: String,
    pub correct: String,
    #[serde(default)]
    pub citation: Option<String>,
    pub question: String,
    pub answers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionPool {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub subelements: BTreeMap<String, String>,
    #[serde(default)]
    pub topics: BTreeMap<String, String>,
    #[serde(default)]
    pub questions: BTreeMap<String, Question>,
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("invalid class specified: {0}")]
    InvalidClass(String),
    #[error("error loading pool source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing pool JSON {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn is_valid_class(class: &str) -> bool {
    CLASSES.contains(&class)
}

fn check_class(class: &str) -> Result<(), PoolError> {
    if is_valid_class(class) {
        Ok(())
    } else {
        Err(PoolError::InvalidClass(class.to_owned()))
    }
}

/// Memoizes pools by class. File reads happen outside the lock; the write
/// lock is only held to publish a loaded pool.
#[derive(Debug)]
pub struct PoolCache {
    base: PathBuf,
    pools: RwLock<HashMap<String, Arc<QuestionPool>>>,
}

impl PoolCache {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            pools: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, class: &str) -> Result<Arc<QuestionPool>, PoolError> {
        check_class(class)?;
        if let Some(pool) = self.pools.read().await.get(class) {
            return Ok(pool.clone());
        }

        let loaded = Arc::new(self.load(class).await?);
        // a concurrent load may have won; keep whichever landed first
        let mut pools = self.pools.write().await;
        Ok(pools.entry(class.to_owned()).or_insert(loaded).clone())
    }

    /// Read the file again and replace the cached copy. On failure the old
    /// entry is evicted.
    pub async fn reload(&self, class: &str) -> Result<Arc<QuestionPool>, PoolError> {
        check_class(class)?;
        match self.load(class).await {
            Ok(pool) => {
                let pool = Arc::new(pool);
                self.pools.write().await.insert(class.to_owned(), pool.clone());
                Ok(pool)
            }
            Err(e) => {
                self.pools.write().await.remove(class);
                Err(e)
            }
        }
    }

    pub async fn cached_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.pools.read().await.keys().cloned().collect();
        classes.sort();
        classes
    }

    async fn load(&self, class: &str) -> Result<QuestionPool, PoolError> {
        let path = self.base.join(format!("{class}.json"));
        let text = fs::read(&path).await.map_err(|source| PoolError::Io {
            path: path.clone(),
            source,
        })?;
        let pool: QuestionPool =
            serde_json::from_slice(&text).map_err(|source| PoolError::Parse {
                path: path.clone(),
                source,
            })?;
        info!(
            class,
            questions = pool.questions.len(),
            topics = pool.topics.len(),
            "loaded question pool from {}",
            path.display()
        );
        Ok(pool)
    }
}
