//! Album hierarchy reconstruction.
//!
//! The catalog stores albums as an adjacency list (`parentId`). The tree is
//! built in two passes: index every album by id, then link each album into
//! its parent's child list. Traversal is a pre-order depth-first walk driven
//! by an explicit stack, so hierarchy depth is bounded only by memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::catalog::Album;
use crate::error::IntegrityError;

/// Which part of the hierarchy to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSelector {
    /// Every top-level album.
    All,
    /// The subtree under one album. Its ancestors are not part of any path.
    Album(String),
}

impl FromStr for RootSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(RootSelector::All)
        } else {
            Ok(RootSelector::Album(s.to_string()))
        }
    }
}

/// Albums from the selected root down to one node, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumPath<'a> {
    albums: Vec<&'a Album>,
}

impl<'a> AlbumPath<'a> {
    pub fn albums(&self) -> &[&'a Album] {
        &self.albums
    }

    /// The album this path ends at.
    pub fn leaf(&self) -> &'a Album {
        // Paths are never empty: each is created from at least one root.
        self.albums[self.albums.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.albums.len()
    }

    /// `base` joined with every album name along the path.
    pub fn folder(&self, base: &Path) -> PathBuf {
        let mut folder = base.to_path_buf();
        for album in &self.albums {
            folder.push(&album.name);
        }
        folder
    }
}

/// The album forest, linked in memory.
#[derive(Debug)]
pub struct AlbumTree {
    albums: Vec<Album>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl AlbumTree {
    /// Link a flat list of albums into a forest. Siblings are ordered by
    /// sort key, then album id.
    pub fn build(albums: Vec<Album>) -> Result<Self, IntegrityError> {
        let index: HashMap<String, usize> = albums
            .iter()
            .enumerate()
            .map(|(i, album)| (album.album_id.clone(), i))
            .collect();

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); albums.len()];

        for (i, album) in albums.iter().enumerate() {
            match &album.parent_id {
                None => roots.push(i),
                Some(parent_id) => {
                    let parent = *index.get(parent_id).ok_or_else(|| {
                        IntegrityError::UnknownParent {
                            album_id: album.album_id.clone(),
                            parent_id: parent_id.clone(),
                        }
                    })?;
                    children[parent].push(i);
                }
            }
        }

        let order = |a: &usize, b: &usize| {
            let (a, b) = (&albums[*a], &albums[*b]);
            a.sort_key
                .cmp(&b.sort_key)
                .then_with(|| a.album_id.cmp(&b.album_id))
        };
        roots.sort_by(order);
        for siblings in &mut children {
            siblings.sort_by(order);
        }

        Ok(Self {
            albums,
            index,
            roots,
            children,
        })
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Depth-first, pre-order walk of the selected subtree(s).
    pub fn paths(&self, root: &RootSelector) -> Result<AlbumPaths<'_>, IntegrityError> {
        let seeds = match root {
            RootSelector::All => self.roots.clone(),
            RootSelector::Album(album_id) => {
                let i = *self
                    .index
                    .get(album_id)
                    .ok_or_else(|| IntegrityError::UnknownRoot(album_id.clone()))?;
                vec![i]
            }
        };

        // Reversed so that popping yields ascending sibling order.
        let stack = seeds.into_iter().rev().map(|i| vec![i]).collect();

        Ok(AlbumPaths { tree: self, stack })
    }
}

/// Iterator returned by [`AlbumTree::paths`].
pub struct AlbumPaths<'a> {
    tree: &'a AlbumTree,
    stack: Vec<Vec<usize>>,
}

impl<'a> Iterator for AlbumPaths<'a> {
    type Item = AlbumPath<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.stack.pop()?;
        let last = path[path.len() - 1];

        for &child in self.tree.children[last].iter().rev() {
            let mut child_path = Vec::with_capacity(path.len() + 1);
            child_path.extend_from_slice(&path);
            child_path.push(child);
            self.stack.push(child_path);
        }

        Some(AlbumPath {
            albums: path.iter().map(|&i| &self.tree.albums[i]).collect(),
        })
    }
}
