//! Maps document paths to source locations, reconstructed from parser events.
//!
//! The parser reports nested open/close pairs depth-first. Scalars carry their
//! value on close without saying whether they are a mapping key, a mapping
//! value or a sequence element, so roles are recovered when the enclosing
//! container closes:
//!
//! * mappings alternate key/value, and the buffered children are walked
//!   backwards, so every odd entry (counting from one) is a value and dropped,
//!   unless it is a composite carrying children of its own;
//! * sequence elements are deduplicated by offset and renumbered from the end.
//!
//! Fragments directly under the document root are written to the map; deeper
//! ones stay buffered and are re-parented when their owner closes.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::events::PathMapReceiver;

/// A position in the source, all components 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

/// A position as shown to users: 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl From<Location> for SourceLocation {
    fn from(loc: Location) -> Self {
        Self {
            line: loc.line + 1,
            column: loc.column + 1,
            offset: loc.offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Scalar(&'a str),
    Mapping,
    Sequence,
}

#[derive(Debug, Clone)]
struct Fragment {
    path: Vec<String>,
    location: Location,
    children: Vec<Fragment>,
}

#[derive(Debug, Clone, Default)]
pub struct PathMap {
    map: IndexMap<Vec<String>, Location>,
    /// Speculative path; the first element stands for the document root.
    path: Vec<String>,
    opened: Vec<Location>,
    last_scalar: String,
    fragments: Vec<Fragment>,
    events: usize,
    line_starts: Vec<usize>,
}

impl PathMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map that can resolve offsets of `source` to lines.
    #[must_use]
    pub fn for_source(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            line_starts,
            ..Self::default()
        }
    }

    /// Parse the first document of `source` and map all of its paths.
    pub fn from_source(source: &str) -> crate::Result<Self> {
        let mut map = Self::for_source(source);
        let mut receiver = PathMapReceiver::new(&mut map, source);
        let mut parser = yaml_rust::parser::Parser::new(source.chars());
        parser.load(&mut receiver, false)?;
        tracing::trace!(entries = map.map.len(), "mapped document paths");
        Ok(map)
    }

    pub fn record_event(&mut self, phase: Phase, node: NodeKind<'_>, location: Location) {
        match phase {
            Phase::Open => self.open(location),
            Phase::Close => self.close(node, location),
        }
    }

    fn open(&mut self, location: Location) {
        if self.events == 0 {
            self.map.insert(Vec::new(), location);
        }
        self.path.push(self.last_scalar.clone());
        self.opened.push(location);
        self.events += 1;
    }

    fn close(&mut self, node: NodeKind<'_>, location: Location) {
        let opened_at = self.opened.pop().unwrap_or(location);
        match node {
            NodeKind::Scalar(value) => {
                self.path.pop();
                self.last_scalar = value.to_string();
                if self.path.is_empty() {
                    self.map.insert(vec![value.to_string()], location);
                } else {
                    let mut path = self.path.clone();
                    path.push(value.to_string());
                    self.fragments.push(Fragment {
                        path,
                        location,
                        children: Vec::new(),
                    });
                }
            }
            NodeKind::Mapping => self.close_mapping(opened_at),
            NodeKind::Sequence => self.close_sequence(opened_at),
        }
    }

    fn close_mapping(&mut self, opened_at: Location) {
        let parent = self.path.clone();
        let at_root = parent.len() == 1;
        let mut composite = Fragment {
            path: parent.clone(),
            location: opened_at,
            children: Vec::new(),
        };

        for (idx, fragment) in self.take_descendants(&parent).into_iter().enumerate() {
            // walking backwards, odd counts are values
            let is_value = (idx + 1) % 2 == 1;
            if fragment.children.is_empty() && is_value {
                continue;
            }
            if at_root {
                let path = fragment.path.clone();
                self.resolve(&fragment, path);
            } else {
                let relative = fragment.path[parent.len()..].to_vec();
                composite.children.push(Fragment {
                    path: relative,
                    ..fragment
                });
            }
        }

        self.path.pop();
        if !at_root {
            self.fragments.push(composite);
        }
    }

    fn close_sequence(&mut self, opened_at: Location) {
        let parent = self.path.clone();
        let at_root = parent.len() == 1;
        let mut composite = Fragment {
            path: parent.clone(),
            location: opened_at,
            children: Vec::new(),
        };

        let mut seen = HashSet::new();
        let items: Vec<Fragment> = self
            .take_descendants(&parent)
            .into_iter()
            .filter(|fragment| seen.insert(fragment.location.offset))
            .collect();

        // items arrive last-to-first
        let count = items.len();
        for (idx, fragment) in items.into_iter().enumerate() {
            let index = (count - 1 - idx).to_string();
            if at_root {
                let mut path = parent.clone();
                path.push(index);
                self.resolve(&fragment, path);
            } else {
                composite.children.push(Fragment {
                    path: vec![index],
                    ..fragment
                });
            }
        }

        self.path.pop();
        if !at_root {
            self.fragments.push(composite);
        }
    }

    /// Remove all buffered strict descendants of `parent`, most recent first.
    fn take_descendants(&mut self, parent: &[String]) -> Vec<Fragment> {
        let (mut taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.fragments)
            .into_iter()
            .partition(|fragment| {
                fragment.path.len() > parent.len() && fragment.path.starts_with(parent)
            });
        self.fragments = kept;
        taken.reverse();
        taken
    }

    /// Write `fragment` and its children, where `path` still starts with the root marker.
    fn resolve(&mut self, fragment: &Fragment, path: Vec<String>) {
        let key = path.get(1..).map(<[String]>::to_vec).unwrap_or_default();
        self.map
            .entry(key)
            .and_modify(|existing| {
                if fragment.location.offset < existing.offset {
                    *existing = fragment.location;
                }
            })
            .or_insert(fragment.location);

        for child in &fragment.children {
            let mut child_path = path.clone();
            child_path.extend(child.path.iter().cloned());
            self.resolve(child, child_path);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All recorded paths with their locations, in recording order.
    pub fn entries(&self) -> impl Iterator<Item = (&[String], &Location)> {
        self.map.iter().map(|(path, loc)| (path.as_slice(), loc))
    }

    #[must_use]
    pub fn location_for_path<S: AsRef<str>>(&self, path: &[S]) -> Option<SourceLocation> {
        let key: Vec<String> = path.iter().map(|seg| seg.as_ref().to_string()).collect();
        self.map.get(&key).copied().map(SourceLocation::from)
    }

    /// Look up a dotted path such as `.spec.containers[0].name`.
    #[must_use]
    pub fn lookup(&self, dotted: &str) -> Option<SourceLocation> {
        let normalized = dotted.replace('[', ".").replace(']', "");
        let segments: Vec<&str> = normalized
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        self.location_for_path(&segments)
    }

    /// The 0-based line holding the byte `offset`.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// The path of the nearest element starting on or before the given line.
    ///
    /// Among entries sharing the best line, the one recorded last wins.
    #[must_use]
    pub fn path_at_line(&self, line: usize) -> Option<Vec<String>> {
        self.map
            .iter()
            .enumerate()
            .filter(|(_, (_, loc))| loc.line <= line)
            .max_by_key(|(idx, (_, loc))| (loc.line, *idx))
            .map(|(_, (path, _))| path.clone())
    }

    /// Line-granular, approximate lookup: between fields the result may be a
    /// sibling or an ancestor of what the cursor visually sits in.
    #[must_use]
    pub fn path_at_offset(&self, offset: usize) -> Option<Vec<String>> {
        self.path_at_line(self.line_of(offset))
    }
}
