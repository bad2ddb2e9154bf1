//! Per-target classification results, built once and read-only afterwards

use crate::classify::Classification;
use agentsync_adapters::Category;
use serde::Serialize;
use std::collections::BTreeMap;

/// Names needing work in one category, plus the full inventory size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryChanges {
    pub missing: Vec<String>,
    pub outdated: Vec<String>,
    pub drifted: Vec<String>,
    /// Size of the source-side inventory, unchanged items included
    pub total: usize,
}

impl CategoryChanges {
    pub(crate) fn record(&mut self, name: String, classification: Classification) {
        match classification {
            Classification::Missing => self.missing.push(name),
            Classification::Outdated => self.outdated.push(name),
            Classification::Drifted => self.drifted.push(name),
            Classification::Unchanged => {}
        }
    }

    pub fn unchanged(&self) -> usize {
        self.total
            .saturating_sub(self.missing.len() + self.outdated.len() + self.drifted.len())
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.outdated.is_empty() && self.drifted.is_empty()
    }

    /// Classification of `name`, or `None` when the name is unchanged or unknown.
    pub fn classification_of(&self, name: &str) -> Option<Classification> {
        let has = |list: &[String]| list.iter().any(|n| n == name);
        if has(&self.missing) {
            Some(Classification::Missing)
        } else if has(&self.outdated) {
            Some(Classification::Outdated)
        } else if has(&self.drifted) {
            Some(Classification::Drifted)
        } else {
            None
        }
    }
}

/// Classification of every category requested for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    categories: BTreeMap<Category, CategoryChanges>,
}

impl ChangeSet {
    pub(crate) fn insert(&mut self, category: Category, changes: CategoryChanges) {
        self.categories.insert(category, changes);
    }

    pub fn get(&self, category: Category) -> Option<&CategoryChanges> {
        self.categories.get(&category)
    }

    /// Categories in apply order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryChanges)> {
        self.categories.iter().map(|(c, changes)| (*c, changes))
    }

    pub fn is_clean(&self) -> bool {
        self.categories.values().all(CategoryChanges::is_clean)
    }

    pub fn total(&self) -> usize {
        self.categories.values().map(|c| c.total).sum()
    }

    pub fn drifted_count(&self) -> usize {
        self.categories.values().map(|c| c.drifted.len()).sum()
    }
}
