//! Category hierarchy model: pure functions over a snapshot of the tree.
//!
//! [`HierarchyIndex`] is an arena view over a `&[Category]` slice: an id map
//! plus derived child lists. Every function takes the snapshot explicitly via
//! the index; nothing holds live references across mutations. Traversals are
//! bounded by the snapshot size, so a corrupt snapshot (a cycle that slipped
//! past [`HierarchyIndex::would_create_cycle`]) fails fast with
//! [`EngineError::HierarchyCycle`] instead of looping.

use std::collections::{BTreeSet, HashMap, HashSet};

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::Category;

/// Fallback confidence cutoff when neither a category nor any inheriting
/// ancestor carries its own.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Recomputed cached path/level for one category, for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathUpdate {
    pub id: Uuid,
    pub hierarchy_path: String,
    pub hierarchy_level: u32,
}

/// Read-only index over a category snapshot.
pub struct HierarchyIndex<'a> {
    by_id: HashMap<Uuid, &'a Category>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl<'a> HierarchyIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        let mut by_id = HashMap::with_capacity(categories.len());
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for category in categories {
            by_id.insert(category.id, category);
            if let Some(parent_id) = category.parent_id {
                children.entry(parent_id).or_default().push(category.id);
            }
        }
        Self { by_id, children }
    }

    pub fn get(&self, id: Uuid) -> Option<&'a Category> {
        self.by_id.get(&id).copied()
    }

    /// Ancestors of `category`, nearest first. Stops without error at the
    /// first missing parent (broken link).
    pub fn ancestors(&self, category: &Category) -> Result<Vec<&'a Category>, EngineError> {
        let mut chain = Vec::new();
        let mut next = category.parent_id;
        while let Some(parent_id) = next {
            if chain.len() > self.by_id.len() {
                return Err(EngineError::HierarchyCycle(category.id));
            }
            match self.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    next = parent.parent_id;
                }
                None => break,
            }
        }
        Ok(chain)
    }

    /// Slash-joined ancestor names, root to self. A root's path is its name.
    pub fn path(&self, category: &Category) -> Result<String, EngineError> {
        let mut names: Vec<&str> = self
            .ancestors(category)?
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        names.reverse();
        names.push(&category.name);
        Ok(names.join("/"))
    }

    /// Number of parent hops to a node with no parent. 0 = root.
    pub fn level(&self, category: &Category) -> Result<u32, EngineError> {
        Ok(self.ancestors(category)?.len() as u32)
    }

    /// All nodes whose ancestor chain includes `category`, parent before
    /// child. A visited set keeps this total even on corrupt input.
    pub fn descendants(&self, category: &Category) -> Vec<&'a Category> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = vec![category.id];
        visited.insert(category.id);
        while let Some(id) = queue.pop() {
            if let Some(child_ids) = self.children.get(&id) {
                for &child_id in child_ids {
                    if visited.insert(child_id) {
                        if let Some(child) = self.get(child_id) {
                            result.push(child);
                            queue.push(child_id);
                        }
                    }
                }
            }
        }
        result
    }

    pub fn is_ancestor_of(&self, a: &Category, b: &Category) -> Result<bool, EngineError> {
        Ok(self.ancestors(b)?.iter().any(|c| c.id == a.id))
    }

    /// True when reparenting `category_id` under `new_parent_id` would make a
    /// node its own ancestor. Must be checked before committing the mutation.
    pub fn would_create_cycle(&self, category_id: Uuid, new_parent_id: Uuid) -> bool {
        if category_id == new_parent_id {
            return true;
        }
        match self.get(category_id) {
            Some(category) => self
                .descendants(category)
                .iter()
                .any(|c| c.id == new_parent_id),
            None => false,
        }
    }

    /// A category with children cannot be deleted.
    pub fn can_delete(&self, category: &Category) -> bool {
        self.children
            .get(&category.id)
            .map(|c| c.is_empty())
            .unwrap_or(true)
    }

    /// Own keywords plus, while `inherit_from_parent` holds, keywords from
    /// each ancestor up the inheriting chain.
    pub fn effective_keywords(&self, category: &Category) -> Result<BTreeSet<String>, EngineError> {
        let mut keywords = category.keywords.clone();
        if !category.inherit_from_parent {
            return Ok(keywords);
        }
        let mut hops = 0;
        let mut current = category;
        while let Some(parent_id) = current.parent_id {
            hops += 1;
            if hops > self.by_id.len() {
                return Err(EngineError::HierarchyCycle(category.id));
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            keywords.extend(parent.keywords.iter().cloned());
            if !parent.inherit_from_parent {
                break;
            }
            current = parent;
        }
        Ok(keywords)
    }

    /// The category's own confidence cutoff, else the nearest one up the
    /// inheriting ancestor chain. `None` when no cutoff is defined anywhere.
    pub fn inherited_threshold(&self, category: &Category) -> Result<Option<f64>, EngineError> {
        if category.confidence_threshold.is_some() {
            return Ok(category.confidence_threshold);
        }
        let mut hops = 0;
        let mut current = category;
        while current.inherit_from_parent {
            hops += 1;
            if hops > self.by_id.len() {
                return Err(EngineError::HierarchyCycle(category.id));
            }
            let Some(parent) = current.parent_id.and_then(|id| self.get(id)) else {
                break;
            };
            if parent.confidence_threshold.is_some() {
                return Ok(parent.confidence_threshold);
            }
            current = parent;
        }
        Ok(None)
    }

    /// [`Self::inherited_threshold`] with the hard fallback applied.
    pub fn effective_threshold(&self, category: &Category) -> Result<f64, EngineError> {
        Ok(self
            .inherited_threshold(category)?
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD))
    }
}

/// Recompute cached `hierarchy_path`/`hierarchy_level` for `root_id` and every
/// descendant, after a rename or reparent. Returns the updates for the caller
/// to persist; [`apply_path_updates`] applies them to an in-memory snapshot.
pub fn recompute_paths(
    categories: &[Category],
    root_id: Uuid,
) -> Result<Vec<PathUpdate>, EngineError> {
    let index = HierarchyIndex::new(categories);
    let Some(root) = index.get(root_id) else {
        return Ok(Vec::new());
    };

    let mut updates = vec![PathUpdate {
        id: root.id,
        hierarchy_path: index.path(root)?,
        hierarchy_level: index.level(root)?,
    }];

    // Descendants are yielded parent-before-child, so the parent's recomputed
    // path is always available by the time a child needs it.
    let mut computed: HashMap<Uuid, (String, u32)> = HashMap::new();
    computed.insert(
        root.id,
        (
            updates[0].hierarchy_path.clone(),
            updates[0].hierarchy_level,
        ),
    );

    for descendant in index.descendants(root) {
        let parent_id = descendant
            .parent_id
            .ok_or(EngineError::HierarchyCycle(descendant.id))?;
        let (parent_path, parent_level) = match computed.get(&parent_id) {
            Some(entry) => entry.clone(),
            None => {
                let parent = index
                    .get(parent_id)
                    .ok_or(EngineError::HierarchyCycle(descendant.id))?;
                (index.path(parent)?, index.level(parent)?)
            }
        };
        let path = format!("{}/{}", parent_path, descendant.name);
        let level = parent_level + 1;
        computed.insert(descendant.id, (path.clone(), level));
        updates.push(PathUpdate {
            id: descendant.id,
            hierarchy_path: path,
            hierarchy_level: level,
        });
    }

    Ok(updates)
}

/// Apply [`PathUpdate`]s to a mutable snapshot.
pub fn apply_path_updates(categories: &mut [Category], updates: &[PathUpdate]) {
    let by_id: HashMap<Uuid, &PathUpdate> = updates.iter().map(|u| (u.id, u)).collect();
    for category in categories.iter_mut() {
        if let Some(update) = by_id.get(&category.id) {
            category.hierarchy_path = update.hierarchy_path.clone();
            category.hierarchy_level = update.hierarchy_level;
        }
    }
}
