//! Scope hierarchy storage
//!
//! Every scope is a node of a `StableDiGraph`; the single outgoing edge of a
//! node points at its parent. The root and detached scopes have no outgoing
//! edge. Because a parent must exist before a child can name it, the graph is
//! a forest and never contains cycles.

use bundlescope_api::models::{Asset, DEFAULT_SCOPE, DETACHED_SCOPE, ScopeInfo};
use bundlescope_api::{RegistryError, RegistryResult};
use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::sync::Arc;

/// A scope and the assets declared directly in it, in declaration order.
#[derive(Debug, Clone)]
pub struct ScopeNode {
    pub name: String,
    pub assets: IndexMap<String, Arc<Asset>>,
}

impl ScopeNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            assets: IndexMap::new(),
        }
    }
}

/// Edge from a child scope to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentEdge;

#[derive(Debug, Clone)]
pub struct ScopeGraph {
    topology: StableDiGraph<ScopeNode, ParentEdge>,
    /// Scope name -> node, in creation order
    index: IndexMap<String, NodeIndex>,
    root: NodeIndex,
}

impl ScopeGraph {
    /// Graph holding only the root and detached scopes
    pub fn new() -> Self {
        let mut topology = StableDiGraph::new();
        let mut index = IndexMap::new();

        let root = topology.add_node(ScopeNode::new(DEFAULT_SCOPE));
        index.insert(DEFAULT_SCOPE.to_string(), root);
        let detached = topology.add_node(ScopeNode::new(DETACHED_SCOPE));
        index.insert(DETACHED_SCOPE.to_string(), detached);

        Self {
            topology,
            index,
            root,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn find_scope(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn scope_count(&self) -> usize {
        self.index.len()
    }

    pub fn get_node(&self, idx: NodeIndex) -> Option<&ScopeNode> {
        self.topology.node_weight(idx)
    }

    pub fn parent_of(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.topology
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
    }

    fn name_of(&self, idx: NodeIndex) -> &str {
        self.topology
            .node_weight(idx)
            .map(|n| n.name.as_str())
            .unwrap_or_default()
    }

    /// Name of the recorded parent. Scopes without a parent count as their
    /// own parent, so `("default", "default")` is accepted.
    fn recorded_parent_name(&self, idx: NodeIndex) -> &str {
        match self.parent_of(idx) {
            Some(parent) => self.name_of(parent),
            None => self.name_of(idx),
        }
    }

    /// Validate `(scope, parent)` without mutating anything.
    ///
    /// Returns the existing node when `scope` is already known.
    pub fn check_scope(&self, scope: &str, parent: &str) -> RegistryResult<Option<NodeIndex>> {
        if let Some(idx) = self.find_scope(scope) {
            let existing = self.recorded_parent_name(idx);
            if existing != parent {
                return Err(RegistryError::ParentScopeIncompatibility {
                    scope: scope.to_string(),
                    existing: existing.to_string(),
                    requested: parent.to_string(),
                });
            }
            return Ok(Some(idx));
        }

        // An unknown scope naming itself as parent falls through here too.
        if !self.contains(parent) {
            return Err(RegistryError::UndefinedParentScope {
                scope: scope.to_string(),
                parent: parent.to_string(),
            });
        }

        Ok(None)
    }

    /// Make sure `scope` exists with `parent` as its parent.
    pub fn ensure_scope(&mut self, scope: &str, parent: &str) -> RegistryResult<NodeIndex> {
        if let Some(idx) = self.check_scope(scope, parent)? {
            return Ok(idx);
        }

        // check_scope guarantees the parent is known
        let parent_idx = self.index[parent];
        let idx = self.topology.add_node(ScopeNode::new(scope));
        self.topology.add_edge(idx, parent_idx, ParentEdge);
        self.index.insert(scope.to_string(), idx);
        Ok(idx)
    }

    /// Asset of the given identity declared directly in `idx`
    pub fn own_asset(&self, idx: NodeIndex, name: &str) -> Option<&Arc<Asset>> {
        self.topology.node_weight(idx)?.assets.get(name)
    }

    /// Append to the scope's own list. Returns `false` when the identity is
    /// already present in that scope.
    pub fn append_asset(&mut self, idx: NodeIndex, asset: Arc<Asset>) -> bool {
        let Some(node) = self.topology.node_weight_mut(idx) else {
            return false;
        };
        if node.assets.contains_key(asset.identity()) {
            return false;
        }
        node.assets.insert(asset.name.clone(), asset);
        true
    }

    /// Chain from the topmost ancestor down to `idx` (inclusive).
    pub fn ancestry(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = vec![idx];
        let mut current = idx;
        while let Some(parent) = self.parent_of(current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// `ancestor` is a strict ancestor of `idx`
    pub fn is_ancestor(&self, ancestor: NodeIndex, idx: NodeIndex) -> bool {
        let mut current = idx;
        while let Some(parent) = self.parent_of(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Assets declared directly in the root scope
    pub fn root_assets(&self) -> Vec<Arc<Asset>> {
        self.topology
            .node_weight(self.root)
            .map(|n| n.assets.values().cloned().collect())
            .unwrap_or_default()
    }

    /// What a single scope sees: its chain walked root first, where a
    /// declaration replaces one of the same identity from an ancestor and
    /// moves to the end. Entries carry the scope that declared them.
    fn scope_view(&self, idx: NodeIndex) -> IndexMap<String, (Arc<Asset>, NodeIndex)> {
        let mut view = IndexMap::new();
        for origin in self.ancestry(idx) {
            let Some(node) = self.topology.node_weight(origin) else {
                continue;
            };
            for asset in node.assets.values() {
                view.shift_remove(asset.identity());
                view.insert(asset.name.clone(), (asset.clone(), origin));
            }
        }
        view
    }

    /// Resolve every asset visible from `scopes`.
    ///
    /// Each scope is first resolved on its own, so an ancestor declaration
    /// hidden by an override never takes part in the merge. The views are
    /// then merged left to right: an entry from a descendant of the scope
    /// that contributed the current one replaces it and moves to the end, an
    /// entry from one of its ancestors is dropped. Between unrelated scopes,
    /// identical values collapse into the first one and differing values
    /// fail with the first conflict found.
    pub fn assets_transitively_visible_from(
        &self,
        scopes: &[&str],
    ) -> RegistryResult<Vec<Arc<Asset>>> {
        let mut resolved: IndexMap<String, (Arc<Asset>, NodeIndex)> = IndexMap::new();

        for &name in scopes {
            let idx = self
                .find_scope(name)
                .ok_or_else(|| RegistryError::UnknownScope(name.to_string()))?;

            for (identity, (asset, origin)) in self.scope_view(idx) {
                let Some((existing, existing_origin)) = resolved.get(&identity) else {
                    resolved.insert(identity, (asset, origin));
                    continue;
                };
                let existing_origin = *existing_origin;

                if existing_origin == origin || self.is_ancestor(origin, existing_origin) {
                    // already seen, or a more specific scope already overrides it
                    continue;
                }

                if self.is_ancestor(existing_origin, origin) {
                    resolved.shift_remove(&identity);
                    resolved.insert(identity, (asset, origin));
                    continue;
                }

                if existing.conflicts_with(&asset) {
                    return Err(RegistryError::AssetAlreadyExistsInScope {
                        scope: self.name_of(origin).to_string(),
                        original: Box::new((**existing).clone()),
                        conflicting: Box::new((*asset).clone()),
                    });
                }
            }
        }

        Ok(resolved.into_values().map(|(asset, _)| asset).collect())
    }

    /// All scopes in creation order
    pub fn scopes(&self) -> Vec<ScopeInfo> {
        self.index
            .iter()
            .filter_map(|(name, &idx)| {
                let node = self.topology.node_weight(idx)?;
                Some(ScopeInfo {
                    name: name.clone(),
                    parent: self.parent_of(idx).map(|p| self.name_of(p).to_string()),
                    asset_count: node.assets.len(),
                })
            })
            .collect()
    }
}

impl Default for ScopeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlescope_api::AssetType;

    fn script(name: &str, version: &str) -> Arc<Asset> {
        Arc::new(Asset::new(name, version, AssetType::Script).with_local(format!("{name}.js")))
    }

    fn names(assets: &[Arc<Asset>]) -> Vec<&str> {
        assets.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_new_graph_has_root_and_detached() {
        let graph = ScopeGraph::new();
        assert!(graph.contains(DEFAULT_SCOPE));
        assert!(graph.contains(DETACHED_SCOPE));
        assert_eq!(graph.scope_count(), 2);
        assert!(graph.parent_of(graph.root()).is_none());
    }

    #[test]
    fn test_ensure_scope_records_parent() {
        let mut graph = ScopeGraph::new();
        let child = graph.ensure_scope("admin", DEFAULT_SCOPE).unwrap();
        assert_eq!(graph.parent_of(child), Some(graph.root()));

        // same pair again is a no-op
        assert_eq!(graph.ensure_scope("admin", DEFAULT_SCOPE).unwrap(), child);
        assert_eq!(graph.scope_count(), 3);
    }

    #[test]
    fn test_ensure_scope_rejects_unknown_parent() {
        let mut graph = ScopeGraph::new();
        let err = graph.ensure_scope("admin", "nowhere").unwrap_err();
        assert!(matches!(err, RegistryError::UndefinedParentScope { .. }));
        assert!(!graph.contains("admin"));
    }

    #[test]
    fn test_ensure_scope_rejects_self_parent() {
        let mut graph = ScopeGraph::new();
        let err = graph.ensure_scope("loop", "loop").unwrap_err();
        assert!(matches!(err, RegistryError::UndefinedParentScope { .. }));
    }

    #[test]
    fn test_ensure_scope_rejects_reparenting() {
        let mut graph = ScopeGraph::new();
        graph.ensure_scope("a", DEFAULT_SCOPE).unwrap();
        graph.ensure_scope("b", DEFAULT_SCOPE).unwrap();
        graph.ensure_scope("c", "a").unwrap();

        let err = graph.ensure_scope("c", "b").unwrap_err();
        assert_eq!(
            err,
            RegistryError::ParentScopeIncompatibility {
                scope: "c".into(),
                existing: "a".into(),
                requested: "b".into(),
            }
        );
    }

    #[test]
    fn test_root_accepts_itself_as_parent() {
        let mut graph = ScopeGraph::new();
        assert_eq!(
            graph.ensure_scope(DEFAULT_SCOPE, DEFAULT_SCOPE).unwrap(),
            graph.root()
        );
        assert!(graph.ensure_scope(DEFAULT_SCOPE, DETACHED_SCOPE).is_err());
    }

    #[test]
    fn test_append_skips_same_scope_duplicates() {
        let mut graph = ScopeGraph::new();
        let root = graph.root();
        assert!(graph.append_asset(root, script("app", "1")));
        assert!(!graph.append_asset(root, script("app", "2")));
        assert_eq!(graph.own_asset(root, "app").unwrap().version, "1");
    }

    #[test]
    fn test_ancestry_is_root_first() {
        let mut graph = ScopeGraph::new();
        let a = graph.ensure_scope("a", DEFAULT_SCOPE).unwrap();
        let b = graph.ensure_scope("b", "a").unwrap();
        assert_eq!(graph.ancestry(b), vec![graph.root(), a, b]);
        assert!(graph.is_ancestor(graph.root(), b));
        assert!(!graph.is_ancestor(b, a));
        assert!(!graph.is_ancestor(b, b));
    }

    #[test]
    fn test_child_override_moves_to_end() {
        let mut graph = ScopeGraph::new();
        let root = graph.root();
        graph.append_asset(root, script("lib", "1"));
        graph.append_asset(root, script("util", "1"));
        let child = graph.ensure_scope("child", DEFAULT_SCOPE).unwrap();
        graph.append_asset(child, script("lib", "2"));

        let assets = graph.assets_transitively_visible_from(&["child"]).unwrap();
        assert_eq!(names(&assets), vec!["util", "lib"]);
        assert_eq!(assets[1].version, "2");
    }

    #[test]
    fn test_detached_scope_does_not_inherit_root() {
        let mut graph = ScopeGraph::new();
        graph.append_asset(graph.root(), script("lib", "1"));
        let island = graph.ensure_scope("island", DETACHED_SCOPE).unwrap();
        graph.append_asset(island, script("own", "1"));

        let assets = graph.assets_transitively_visible_from(&["island"]).unwrap();
        assert_eq!(names(&assets), vec!["own"]);
    }

    #[test]
    fn test_more_specific_declaration_survives_later_ancestor_walk() {
        let mut graph = ScopeGraph::new();
        graph.append_asset(graph.root(), script("lib", "1"));
        let child = graph.ensure_scope("child", DEFAULT_SCOPE).unwrap();
        graph.append_asset(child, script("lib", "2"));
        graph.ensure_scope("sibling", DEFAULT_SCOPE).unwrap();

        let assets = graph
            .assets_transitively_visible_from(&["child", "sibling"])
            .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].version, "2");
    }

    #[test]
    fn test_hidden_ancestor_declaration_does_not_conflict() {
        let mut graph = ScopeGraph::new();
        let a = graph.ensure_scope("a", DEFAULT_SCOPE).unwrap();
        let p = graph.ensure_scope("p", DEFAULT_SCOPE).unwrap();
        let b = graph.ensure_scope("b", "p").unwrap();
        graph.append_asset(a, script("lib", "2"));
        graph.append_asset(p, script("lib", "1"));
        graph.append_asset(b, script("lib", "2"));

        for order in [["a", "b"], ["b", "a"]] {
            let assets = graph.assets_transitively_visible_from(&order).unwrap();
            assert_eq!(assets.len(), 1);
            assert_eq!(assets[0].version, "2");
        }

        // the hidden declaration still conflicts when its own scope is asked for
        assert!(graph.assets_transitively_visible_from(&["a", "p"]).is_err());
    }

    #[test]
    fn test_identical_values_from_unrelated_scopes_collapse() {
        let mut graph = ScopeGraph::new();
        let a = graph.ensure_scope("a", DEFAULT_SCOPE).unwrap();
        let b = graph.ensure_scope("b", DEFAULT_SCOPE).unwrap();
        graph.append_asset(a, script("shared", "1"));
        graph.append_asset(b, script("shared", "1"));
        graph.append_asset(b, script("extra", "1"));

        let assets = graph.assets_transitively_visible_from(&["a", "b"]).unwrap();
        assert_eq!(names(&assets), vec!["shared", "extra"]);
    }

    #[test]
    fn test_first_conflict_wins_left_to_right() {
        let mut graph = ScopeGraph::new();
        for (scope, version) in [("a", "1"), ("b", "2"), ("c", "3")] {
            let idx = graph.ensure_scope(scope, DEFAULT_SCOPE).unwrap();
            graph.append_asset(idx, script("shared", version));
        }

        let err = graph
            .assets_transitively_visible_from(&["c", "a", "b"])
            .unwrap_err();
        match err {
            RegistryError::AssetAlreadyExistsInScope {
                scope,
                original,
                conflicting,
            } => {
                assert_eq!(scope, "a");
                assert_eq!(original.version, "3");
                assert_eq!(conflicting.version, "1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_scope_is_reported() {
        let graph = ScopeGraph::new();
        let err = graph.assets_transitively_visible_from(&["ghost"]).unwrap_err();
        assert_eq!(err, RegistryError::UnknownScope("ghost".into()));
    }

    #[test]
    fn test_scopes_listing_in_creation_order() {
        let mut graph = ScopeGraph::new();
        graph.ensure_scope("a", DEFAULT_SCOPE).unwrap();
        graph.ensure_scope("b", "a").unwrap();

        let scopes = graph.scopes();
        let listed: Vec<(&str, Option<&str>)> = scopes
            .iter()
            .map(|s| (s.name.as_str(), s.parent.as_deref()))
            .collect();
        assert_eq!(
            listed,
            vec![
                (DEFAULT_SCOPE, None),
                (DETACHED_SCOPE, None),
                ("a", Some(DEFAULT_SCOPE)),
                ("b", Some("a")),
            ]
        );
    }
}
