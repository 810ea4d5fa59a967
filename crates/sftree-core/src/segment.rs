//! Path segmentation.
//!
//! A record path such as `dir/sub/file.bin` is consumed one segment at a time
//! from the root. At each level the unconsumed remainder either still contains
//! a separator (the next segment names a page) or it does not (the remainder
//! names the leaf itself).

/// Outcome of analysing the unconsumed part of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// The remainder is the final component.
    Leaf(&'a str),
    /// The remainder continues below a page.
    Page {
        /// Name of the page at this level.
        name: &'a str,
        /// Byte offset just past the separator that closes `name`.
        prefix_end: usize,
    },
}

impl<'a> Segment<'a> {
    /// Segment name regardless of kind.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        match self {
            Self::Leaf(name) | Self::Page { name, .. } => name,
        }
    }

    /// Whether the segment is the final component of the path.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Splits record paths on a single separator character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegmenter {
    separator: char,
}

impl Default for PathSegmenter {
    fn default() -> Self {
        Self::new('/')
    }
}

impl PathSegmenter {
    /// Build a segmenter for the given separator.
    #[must_use]
    pub const fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Separator character used to split paths.
    #[must_use]
    pub const fn separator(self) -> char {
        self.separator
    }

    /// Analyse `path` after the first `prefix_len` bytes have been consumed.
    ///
    /// # Panics
    ///
    /// Panics on malformed input: a prefix that does not end on a character
    /// boundary, an empty segment (`a//b`, `/a`) or a trailing separator.
    #[must_use]
    pub fn analyze<'a>(self, prefix_len: usize, path: &'a str) -> Segment<'a> {
        let Some(rest) = path.get(prefix_len..) else {
            panic!("prefix length {prefix_len} is not a boundary of path {path:?}");
        };
        match rest.find(self.separator) {
            Some(end) => {
                let name = &rest[..end];
                assert!(!name.is_empty(), "empty segment in path {path:?}");
                Segment::Page {
                    name,
                    prefix_end: prefix_len + end + self.separator.len_utf8(),
                }
            }
            None => {
                assert!(!rest.is_empty(), "path {path:?} has no leaf component");
                Segment::Leaf(rest)
            }
        }
    }

    /// Whether `path` lies below the page whose full prefix is `prefix`.
    ///
    /// Page prefixes always carry their closing separator, so `dir/` never
    /// claims `directory/file`. The root prefix is empty and claims everything.
    #[must_use]
    pub fn is_subelement(prefix: &str, path: &str) -> bool {
        path.starts_with(prefix)
    }

    /// Prefix of the child page `name` below `prefix`.
    #[must_use]
    pub fn child_prefix(self, prefix: &str, name: &str) -> String {
        let mut child = String::with_capacity(prefix.len() + name.len() + 1);
        child.push_str(prefix);
        child.push_str(name);
        child.push(self.separator);
        child
    }

    /// Iterate every segment of `path` from the root.
    pub fn segments(self, path: &str) -> impl Iterator<Item = &str> {
        path.split(self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_walks_to_the_leaf() {
        let seg = PathSegmenter::default();
        let path = "dir/sub/file.bin";

        let first = seg.analyze(0, path);
        assert_eq!(
            first,
            Segment::Page {
                name: "dir",
                prefix_end: 4
            }
        );
        let second = seg.analyze(4, path);
        assert_eq!(
            second,
            Segment::Page {
                name: "sub",
                prefix_end: 8
            }
        );
        let third = seg.analyze(8, path);
        assert_eq!(third, Segment::Leaf("file.bin"));
        assert!(third.is_leaf());
        assert_eq!(third.name(), "file.bin");
    }

    #[test]
    fn analyze_handles_multibyte_separator() {
        let seg = PathSegmenter::new('→');
        let path = "a→b";
        let Segment::Page { name, prefix_end } = seg.analyze(0, path) else {
            panic!("expected page segment");
        };
        assert_eq!(name, "a");
        assert_eq!(seg.analyze(prefix_end, path), Segment::Leaf("b"));
    }

    #[test]
    #[should_panic(expected = "empty segment")]
    fn analyze_rejects_empty_segment() {
        let _ = PathSegmenter::default().analyze(0, "a//b");
    }

    #[test]
    #[should_panic(expected = "no leaf component")]
    fn analyze_rejects_trailing_separator() {
        let _ = PathSegmenter::default().analyze(2, "a/");
    }

    #[test]
    fn subelement_requires_full_segment_match() {
        let seg = PathSegmenter::default();
        let prefix = seg.child_prefix("", "dir");
        assert_eq!(prefix, "dir/");
        assert!(PathSegmenter::is_subelement(&prefix, "dir/a.txt"));
        assert!(!PathSegmenter::is_subelement(&prefix, "directory/a.txt"));
        assert!(PathSegmenter::is_subelement("", "anything"));
    }

    #[test]
    fn segments_split_every_level() {
        let seg = PathSegmenter::default();
        assert_eq!(seg.segments("a/b/c").collect::<Vec<_>>(), ["a", "b", "c"]);
    }
}
