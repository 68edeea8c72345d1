use async_trait::async_trait;
use dashmap::DashMap;
use domains::{CategoryValidator, SequenceCounter};

/// Named counters; `next` is atomic per name and starts at 1.
#[derive(Default)]
pub struct MemorySequenceCounter {
    counters: DashMap<String, i64>,
}

impl MemorySequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `name` at `value`, so the next call returns `value + 1`.
    pub fn seed(&self, name: &str, value: i64) {
        self.counters.insert(name.to_owned(), value);
    }
}

#[async_trait]
impl SequenceCounter for MemorySequenceCounter {
    async fn next(&self, counter_name: &str) -> anyhow::Result<i64> {
        let mut current = self.counters.entry(counter_name.to_owned()).or_insert(0);
        *current += 1;
        Ok(*current)
    }
}

/// Fixed set of board category codes.
#[derive(Default)]
pub struct MemoryCategories {
    codes: DashMap<String, ()>,
}

impl MemoryCategories {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(|c| (c.into(), ())).collect(),
        }
    }

    pub fn add(&self, code: impl Into<String>) {
        self.codes.insert(code.into(), ());
    }
}

#[async_trait]
impl CategoryValidator for MemoryCategories {
    async fn exists(&self, code: &str) -> anyhow::Result<bool> {
        Ok(self.codes.contains_key(code))
    }
}
