//! Keyword schema resolution.

use std::collections::BTreeMap;

use super::{Category, Shape, ValueType};
use crate::config::KeywordConfig;
use crate::errors::KeywordError;

/// Small fixed set of categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategorySet {
    pub transient: bool,
    pub core: bool,
}

impl CategorySet {
    pub const BOTH: CategorySet = CategorySet {
        transient: true,
        core: true,
    };

    pub fn from_slice(cats: &[Category]) -> Self {
        let mut set = Self::default();
        for cat in cats {
            match cat {
                Category::Transient => set.transient = true,
                Category::Core => set.core = true,
            }
        }
        set
    }

    pub fn contains(&self, cat: Category) -> bool {
        match cat {
            Category::Transient => self.transient,
            Category::Core => self.core,
        }
    }
}

/// The outcome of resolving a raw key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub canonical: String,
    pub value_type: ValueType,
    pub shape: Shape,
    pub categories: CategorySet,
}

/// Keyword schema built from the `[keywords]` configuration tables.
#[derive(Debug, Clone, Default)]
pub struct KeywordSchema {
    keywords: BTreeMap<String, KeywordConfig>,
}

impl KeywordSchema {
    pub fn new(keywords: BTreeMap<String, KeywordConfig>) -> Self {
        Self { keywords }
    }

    /// Resolve `raw` through any aliases to its canonical definition.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedKey, KeywordError> {
        let mut key = raw;
        let mut hops = 0usize;
        loop {
            let Some(info) = self.keywords.get(key) else {
                tracing::warn!(key = raw, "bad key");
                return Err(KeywordError::BadKey {
                    key: raw.to_string(),
                });
            };
            match info.alias {
                Some(ref target) => {
                    hops += 1;
                    if hops > self.keywords.len() {
                        return Err(KeywordError::AliasCycle {
                            key: raw.to_string(),
                        });
                    }
                    key = target;
                }
                None => {
                    return Ok(ResolvedKey {
                        canonical: key.to_string(),
                        value_type: info.value_type.unwrap_or_default(),
                        shape: info.shape.unwrap_or_default(),
                        categories: info
                            .cat
                            .as_deref()
                            .map(CategorySet::from_slice)
                            .unwrap_or(CategorySet::BOTH),
                    })
                }
            }
        }
    }

    /// Help text of a keyword, if any.
    pub fn help(&self, raw: &str) -> Option<&str> {
        self.keywords.get(raw).and_then(|k| k.help.as_deref())
    }

    /// Canonical (non-alias) keyword names.
    pub fn canonical_keys(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter(|(_, k)| k.alias.is_none())
            .map(|(name, _)| name.as_str())
    }
}
