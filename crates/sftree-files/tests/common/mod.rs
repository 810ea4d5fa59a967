//! Helpers shared by the integration suites.
#![allow(dead_code)]

use std::collections::BTreeMap;

use sftree_core::{Node, Observer, PageId};
use sftree_files::{FileView, TorrentFile};

/// File with `size` bytes, nothing downloaded.
pub fn file(path: &str, size: u64) -> TorrentFile {
    TorrentFile::new(0, path, size)
}

/// `dir/a.txt`, `dir/b.txt` and `root.txt`.
pub fn base_files() -> Vec<TorrentFile> {
    vec![
        file("dir/a.txt", 1),
        file("dir/b.txt", 2),
        file("root.txt", 3),
    ]
}

/// Visible children of `page`; directories carry a trailing `/`.
pub fn rows<O: Observer>(view: &FileView<O>, page: PageId) -> Vec<String> {
    (0..view.child_count(page))
        .filter_map(|row| view.child_at(page, row))
        .map(|node| match node {
            Node::Leaf(file) => file.name.to_string(),
            Node::Page(dir) => format!("{}/", dir.name),
        })
        .collect()
}

/// Every visible row of the view in depth-first order, as full paths.
pub fn shape<O: Observer>(view: &FileView<O>) -> Vec<String> {
    let mut lines = Vec::new();
    walk(view, view.root(), "", &mut lines);
    lines
}

fn walk<O: Observer>(view: &FileView<O>, page: PageId, prefix: &str, lines: &mut Vec<String>) {
    for row in 0..view.child_count(page) {
        match view.child_at(page, row) {
            Some(Node::Leaf(file)) => lines.push(file.leaf.path.clone()),
            Some(Node::Page(dir)) => {
                let path = format!("{prefix}{}/", dir.name);
                lines.push(path.clone());
                walk(view, dir.id, &path, lines);
            }
            None => {}
        }
    }
}

/// Visible rows of every visible page.
pub fn visible_rows<O: Observer>(view: &FileView<O>) -> BTreeMap<PageId, Vec<String>> {
    let mut pages = BTreeMap::new();
    let mut stack = vec![view.root()];
    while let Some(page) = stack.pop() {
        for row in 0..view.child_count(page) {
            if let Some(Node::Page(dir)) = view.child_at(page, row) {
                stack.push(dir.id);
            }
        }
        pages.insert(page, rows(view, page));
    }
    pages
}
