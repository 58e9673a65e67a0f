//! Category hierarchy reconstruction.
//!
//! Upstream returns a catalog's categories as a flat list. The tree handed to
//! clients holds only root categories, with mid-level categories and leaves
//! nested beneath them:
//!
//! - **root**: no parent
//! - **leaf**: has a parent and no children
//! - **mid**: everything else
//!
//! Leaves attach to a mid parent if one exists, otherwise to a root parent.
//! Mid categories attach to a root parent. Anything whose parent cannot be
//! found in the right bucket is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::ServiceError;
use crate::config::CatalogDefaults;
use crate::models::{Category, CategoryPage};
use crate::ordercloud::CatalogApi;

/// Rebuild a two-level category tree from a flat list.
///
/// Roots and siblings keep their input order. Runs in linear time.
#[must_use]
pub fn build_category_tree(categories: Vec<Category>) -> Vec<Category> {
    let mut arena: Vec<Option<Category>> = Vec::with_capacity(categories.len());
    let mut roots: HashMap<String, usize> = HashMap::new();
    let mut mids: HashMap<String, usize> = HashMap::new();
    let mut leaves: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<(Bucket, usize)> = Vec::with_capacity(categories.len());

    for (index, category) in categories.into_iter().enumerate() {
        let bucket = Bucket::of(&category);
        let map = match bucket {
            Bucket::Root => &mut roots,
            Bucket::Mid => &mut mids,
            Bucket::Leaf => &mut leaves,
        };
        // A repeated id replaces the earlier record.
        map.insert(category.id.clone(), index);
        order.push((bucket, index));
        arena.push(Some(category));
    }

    let is_current = |map: &HashMap<String, usize>, index: usize, arena: &[Option<Category>]| {
        arena
            .get(index)
            .and_then(Option::as_ref)
            .is_some_and(|c| map.get(&c.id) == Some(&index))
    };

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); arena.len()];
    let mut dropped = 0_usize;

    for &(_, index) in order.iter().filter(|(b, _)| *b == Bucket::Leaf) {
        if !is_current(&leaves, index, &arena) {
            continue;
        }
        let parent = parent_of(&arena, index);
        let target = mids.get(parent).or_else(|| roots.get(parent));
        attach(&mut children, target, index, &mut dropped);
    }

    for &(_, index) in order.iter().filter(|(b, _)| *b == Bucket::Mid) {
        if !is_current(&mids, index, &arena) {
            continue;
        }
        let parent = parent_of(&arena, index);
        attach(&mut children, roots.get(parent), index, &mut dropped);
    }

    if dropped > 0 {
        debug!(dropped, "Dropped categories without a reachable parent");
    }

    let root_indices: Vec<usize> = order
        .iter()
        .filter(|(b, index)| *b == Bucket::Root && is_current(&roots, *index, &arena))
        .map(|(_, index)| *index)
        .collect();

    root_indices
        .into_iter()
        .filter_map(|index| materialize(&mut arena, &mut children, index))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Root,
    Mid,
    Leaf,
}

impl Bucket {
    fn of(category: &Category) -> Self {
        if category.is_root() {
            Self::Root
        } else if category.child_count == 0 {
            Self::Leaf
        } else {
            Self::Mid
        }
    }
}

fn parent_of(arena: &[Option<Category>], index: usize) -> &str {
    arena
        .get(index)
        .and_then(Option::as_ref)
        .map_or("", Category::parent)
}

fn attach(
    children: &mut [Vec<usize>],
    parent: Option<&usize>,
    child: usize,
    dropped: &mut usize,
) {
    match parent.and_then(|&p| children.get_mut(p)) {
        Some(list) => list.push(child),
        None => *dropped += 1,
    }
}

/// Move a node and its attached descendants out of the arena.
fn materialize(
    arena: &mut [Option<Category>],
    children: &mut [Vec<usize>],
    index: usize,
) -> Option<Category> {
    let mut node = arena.get_mut(index)?.take()?;
    let child_indices = children.get_mut(index).map(std::mem::take).unwrap_or_default();
    node.children = child_indices
        .into_iter()
        .filter_map(|child| materialize(arena, children, child))
        .collect();
    Some(node)
}

/// Serves category trees for a catalog.
#[derive(Clone)]
pub struct CategoryService {
    catalog: Arc<dyn CatalogApi>,
    defaults: CatalogDefaults,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogApi>, defaults: CatalogDefaults) -> Self {
        Self { catalog, defaults }
    }

    /// Fetch a catalog's categories and return them as a tree.
    ///
    /// The page metadata is passed through from upstream.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Upstream` if the category request fails.
    #[instrument(skip(self))]
    pub async fn category_tree(
        &self,
        catalog_id: Option<&str>,
        depth: Option<&str>,
    ) -> Result<CategoryPage, ServiceError> {
        let catalog_id = catalog_id
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.defaults.catalog_id);
        let depth = depth
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.defaults.depth);

        let page = self.catalog.categories(catalog_id, depth).await?;
        let fetched = page.items.len();
        let items = build_category_tree(page.items);
        debug!(fetched, roots = items.len(), "Built category tree");

        Ok(CategoryPage {
            meta: page.meta,
            items,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::ListPage;
    use crate::services::testing::FakeCatalog;

    fn category(id: &str, parent: Option<&str>, child_count: u32) -> Category {
        Category {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            child_count,
            ..Category::default()
        }
    }

    /// Every `(node, ancestor chain)` pair in a tree.
    fn paths(tree: &[Category]) -> BTreeSet<String> {
        fn walk(nodes: &[Category], prefix: &str, out: &mut BTreeSet<String>) {
            for node in nodes {
                let path = format!("{prefix}/{}", node.id);
                out.insert(path.clone());
                walk(&node.children, &path, out);
            }
        }
        let mut out = BTreeSet::new();
        walk(tree, "", &mut out);
        out
    }

    fn sample() -> Vec<Category> {
        vec![
            category("food", None, 2),
            category("fruit", Some("food"), 2),
            category("apple", Some("fruit"), 0),
            category("mango", Some("fruit"), 0),
            category("bread", Some("food"), 0),
            category("home", Some(""), 1),
            category("kitchen", Some("home"), 0),
            // Parent missing entirely.
            category("stray-leaf", Some("gone"), 0),
            // Mid whose parent is another mid is not reachable.
            category("deep", Some("fruit"), 3),
            category("deeper", Some("deep"), 0),
        ]
    }

    #[test]
    fn test_builds_two_level_tree() {
        let tree = build_category_tree(sample());

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, "food");
        assert_eq!(tree[1].id, "home");

        let expected: BTreeSet<String> = [
            "/food",
            "/food/fruit",
            "/food/fruit/apple",
            "/food/fruit/mango",
            "/food/bread",
            "/home",
            "/home/kitchen",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        assert_eq!(paths(&tree), expected);
    }

    #[test]
    fn test_node_count_is_input_minus_orphans() {
        let input = sample();
        let orphans = 3; // stray-leaf, deep, deeper
        let tree = build_category_tree(input.clone());
        assert_eq!(paths(&tree).len(), input.len() - orphans);
    }

    #[test]
    fn test_permutations_yield_same_membership() {
        let expected = paths(&build_category_tree(sample()));

        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(paths(&build_category_tree(reversed)), expected);

        for shift in 1..sample().len() {
            let mut rotated = sample();
            rotated.rotate_left(shift);
            assert_eq!(paths(&build_category_tree(rotated)), expected);
        }
    }

    #[test]
    fn test_leaf_prefers_mid_parent_over_root() {
        // A root and a mid sharing an id: the leaf goes under the mid.
        let tree = build_category_tree(vec![
            category("top", None, 1),
            category("shared", None, 1),
            category("shared", Some("top"), 1),
            category("leaf", Some("shared"), 0),
        ]);

        let paths = paths(&tree);
        assert!(paths.contains("/top/shared/leaf"));
        assert!(!paths.contains("/shared/leaf"));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_category_tree(Vec::new()).is_empty());
    }

    #[test]
    fn test_only_orphans() {
        let tree = build_category_tree(vec![
            category("a", Some("x"), 0),
            category("b", Some("y"), 4),
        ]);
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_category_tree_uses_defaults() {
        let catalog = FakeCatalog::default().with_categories(ListPage::from_items(sample()));
        let service = CategoryService::new(Arc::new(catalog.clone()), CatalogDefaults::default());

        let page = service.category_tree(None, Some("")).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(
            catalog.category_requests(),
            vec![("zp-my".to_string(), "all".to_string())]
        );
    }

    #[tokio::test]
    async fn test_category_tree_upstream_failure() {
        let catalog = FakeCatalog::default().failing();
        let service = CategoryService::new(Arc::new(catalog), CatalogDefaults::default());

        let result = service.category_tree(Some("zp-sg"), None).await;
        assert!(matches!(result, Err(ServiceError::Upstream(_))));
    }
}
