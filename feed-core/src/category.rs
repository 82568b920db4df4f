//! Category path index
//!
//! Resolves every category to its full ancestor chain ("Shoes>Running")
//! once per feed run, then answers per-product lookups from the map.

use crate::error::{FeedError, FeedResult};
use shared::Category;
use std::collections::{HashMap, HashSet};
use tracing::debug;

struct Node<'a> {
    name: &'a str,
    parent: Option<i64>,
}

/// Immutable map of category id to full path
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    paths: HashMap<i64, String>,
}

impl CategoryIndex {
    /// Build the index for one language
    ///
    /// Categories with a blank name are left out. A parent that is missing
    /// (or left out) makes its child a root. Input order does not matter.
    pub fn build(categories: &[Category], tree_separator: &str) -> FeedResult<Self> {
        let nodes: HashMap<i64, Node<'_>> = categories
            .iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| {
                let node = Node {
                    name: c.name.trim(),
                    parent: c.parent(),
                };
                (c.id, node)
            })
            .collect();

        let mut index = Self {
            paths: HashMap::with_capacity(nodes.len()),
        };
        for category in categories {
            if nodes.contains_key(&category.id) {
                index.resolve(category.id, &nodes, tree_separator)?;
            }
        }

        debug!(categories = index.paths.len(), "Category index built");
        Ok(index)
    }

    /// Walk up to the first resolved ancestor (or a root), then fill the
    /// chain top-down. Revisiting a node on the current walk is a cycle.
    fn resolve(&mut self, id: i64, nodes: &HashMap<i64, Node<'_>>, separator: &str) -> FeedResult<()> {
        if self.paths.contains_key(&id) {
            return Ok(());
        }

        let mut chain = vec![id];
        let mut on_chain = HashSet::from([id]);
        let mut prefix: Option<String> = None;
        let mut current = id;

        while let Some(parent) = nodes[&current].parent.filter(|p| nodes.contains_key(p)) {
            if let Some(path) = self.paths.get(&parent) {
                prefix = Some(path.clone());
                break;
            }
            if !on_chain.insert(parent) {
                return Err(FeedError::CyclicCategoryGraph { id: parent });
            }
            chain.push(parent);
            current = parent;
        }

        for node_id in chain.into_iter().rev() {
            let name = nodes[&node_id].name;
            let path = match prefix {
                Some(parent_path) => format!("{}{}{}", parent_path, separator, name),
                None => name.to_string(),
            };
            self.paths.insert(node_id, path.clone());
            prefix = Some(path);
        }
        Ok(())
    }

    pub fn path(&self, id: i64) -> Option<&str> {
        self.paths.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Most specific paths for a product's categories
    ///
    /// Paths are sorted and any path that is a prefix of the next one is
    /// dropped, so "Shoes" disappears next to "Shoes>Running".
    pub fn product_paths(&self, category_ids: &[i64]) -> Vec<&str> {
        let mut paths: Vec<&str> = category_ids.iter().filter_map(|&id| self.path(id)).collect();
        paths.sort_unstable();

        let mut result = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            match paths.get(i + 1) {
                Some(next) if next.starts_with(path) => continue,
                _ => result.push(*path),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    fn tree() -> Vec<Category> {
        vec![
            Category::new(1, 0, "Shoes"),
            Category::new(2, 1, "Running"),
            Category::new(3, 2, "Trail"),
            Category::new(4, 0, "Socks"),
            Category::new(5, 1, "  Casual  "),
        ]
    }

    #[test]
    fn test_paths() {
        let index = CategoryIndex::build(&tree(), ">").unwrap();

        assert_eq!(index.path(1), Some("Shoes"));
        assert_eq!(index.path(2), Some("Shoes>Running"));
        assert_eq!(index.path(3), Some("Shoes>Running>Trail"));
        assert_eq!(index.path(5), Some("Shoes>Casual"));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_order_independent() {
        let expected = CategoryIndex::build(&tree(), ">").unwrap();
        let mut rng = rand::thread_rng();

        for _ in 0..20 {
            let mut shuffled = tree();
            shuffled.shuffle(&mut rng);
            let index = CategoryIndex::build(&shuffled, ">").unwrap();
            for id in 1..=5 {
                assert_eq!(index.path(id), expected.path(id));
            }
        }
    }

    #[test]
    fn test_path_extends_parent_path() {
        let categories = tree();
        let index = CategoryIndex::build(&categories, " / ").unwrap();

        for category in &categories {
            let own = category.name.trim();
            match category.parent() {
                Some(parent) => assert_eq!(
                    index.path(category.id).unwrap(),
                    format!("{} / {}", index.path(parent).unwrap(), own)
                ),
                None => assert_eq!(index.path(category.id).unwrap(), own),
            }
        }
    }

    #[test]
    fn test_blank_names_and_missing_parents() {
        let categories = vec![
            Category::new(1, 0, "   "),
            Category::new(2, 1, "Orphaned by blank parent"),
            Category::new(3, 99, "Orphaned by missing parent"),
        ];
        let index = CategoryIndex::build(&categories, ">").unwrap();

        assert_eq!(index.path(1), None);
        assert_eq!(index.path(2), Some("Orphaned by blank parent"));
        assert_eq!(index.path(3), Some("Orphaned by missing parent"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let categories = vec![
            Category::new(1, 3, "A"),
            Category::new(2, 1, "B"),
            Category::new(3, 2, "C"),
        ];
        let result = CategoryIndex::build(&categories, ">");
        assert!(matches!(result, Err(FeedError::CyclicCategoryGraph { .. })));

        let self_parent = vec![Category::new(7, 7, "Loop")];
        assert!(matches!(
            CategoryIndex::build(&self_parent, ">"),
            Err(FeedError::CyclicCategoryGraph { id: 7 })
        ));
    }

    #[test]
    fn test_deep_chain() {
        let categories: Vec<Category> = (1..=5000)
            .map(|id| Category::new(id, id - 1, format!("c{id}")))
            .rev()
            .collect();
        let index = CategoryIndex::build(&categories, ">").unwrap();

        assert!(index.path(5000).unwrap().starts_with("c1>c2>c3>"));
    }

    #[test]
    fn test_product_paths_keep_most_specific() {
        let index = CategoryIndex::build(&tree(), ">").unwrap();

        assert_eq!(index.product_paths(&[1, 2]), vec!["Shoes>Running"]);
        assert_eq!(
            index.product_paths(&[4, 3, 1, 2]),
            vec!["Shoes>Running>Trail", "Socks"]
        );
        assert_eq!(index.product_paths(&[2, 2]), vec!["Shoes>Running"]);
        assert_eq!(index.product_paths(&[4]), vec!["Socks"]);
        assert_eq!(index.product_paths(&[42]), Vec::<&str>::new());
        assert!(index.product_paths(&[]).is_empty());
    }

    #[test]
    fn test_product_paths_have_no_prefixes() {
        let index = CategoryIndex::build(&tree(), ">").unwrap();
        let paths = index.product_paths(&[1, 2, 3, 4, 5]);

        for (i, a) in paths.iter().enumerate() {
            for (j, b) in paths.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{a} is a prefix of {b}");
                }
            }
        }
    }
}
