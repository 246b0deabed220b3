//! Builds project reference closures from build-system output.
//!
//! The build system hands restore a description of project-to-project
//! references in one of two encodings, detected from the first line:
//!
//! ```text
//! {                                  structured: one JSON document with
//!   "projects": ["<entry>", ...],    an entry-point array and a flat
//!   "edges": ["parent|child", ...]   edge array shared by every entry
//! }
//!
//! #:<entry>                          line markers: `#:` opens a block,
//! parent|child                       following edge lines belong to it
//! ```
//!
//! Each entry point's closure is every path mentioned in its block: the
//! entry point itself, every parent, every child. Membership is by
//! mention, not reachability, so an edge disconnected from the entry
//! point still contributes both of its nodes. Paths compare
//! case-insensitively throughout.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::reference::{PathKey, ProjectReference};
use crate::spec::{ProjectSpec, SpecReader};

/// How strictly graph input is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Malformed lines and duplicate entry points fail the parse.
    Strict,
    /// Problems are collected as diagnostics; malformed lines are
    /// dropped and a duplicate entry point merges into its first block.
    Lenient,
}

/// A problem met while parsing graph input leniently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphDiagnostic {
    /// An adjacency line that does not split into `parent|child`. For the
    /// structured encoding the line number is the edge's index, counted
    /// from one.
    MalformedEdge { line_number: usize, text: String },
    /// An entry point declared more than once.
    DuplicateEntryPoint { path: String },
}

/// Immutable project reference closures for a set of entry points.
///
/// A finished graph is freely shareable; all maps are written only while
/// building.
#[derive(Debug)]
pub struct ReferenceGraph {
    closures: HashMap<PathKey, Vec<ProjectReference>>,
    entry_order: Vec<String>,
    specs: HashMap<PathKey, Option<Arc<ProjectSpec>>>,
    diagnostics: Vec<GraphDiagnostic>,
}

impl ReferenceGraph {
    /// Build a graph from input lines.
    ///
    /// Empty input and an unrecognized first line are fatal in both parse
    /// modes. Project specifications are loaded through `reader` during
    /// the build, memoized by spec path, and spec parse failures are
    /// always errors.
    pub fn from_lines<S, R>(lines: &[S], mode: ParseMode, reader: &R) -> Result<Self>
    where
        S: AsRef<str>,
        R: SpecReader + ?Sized,
    {
        let first = lines.first().ok_or(GraphError::EmptyGraphFile)?.as_ref();

        let mut builder = GraphBuilder::new(mode);
        if first.starts_with('{') {
            builder.parse_structured(lines)?;
        } else if first.starts_with("#:") {
            builder.parse_markers(lines)?;
        } else {
            return Err(GraphError::UnrecognizedFormat {
                line: first.to_string(),
            });
        }
        builder.finish(reader)
    }

    /// Build a graph from a dependency-graph file.
    ///
    /// Failures are wrapped in [`GraphError::GraphFile`] so the message
    /// names the offending file.
    pub fn load<R>(path: &Path, mode: ParseMode, reader: &R) -> Result<Self>
    where
        R: SpecReader + ?Sized,
    {
        debug!(file = %path.display(), "loading dependency graph");
        std::fs::read_to_string(path)
            .map_err(GraphError::from)
            .and_then(|content| {
                let lines: Vec<&str> = content.lines().collect();
                ReferenceGraph::from_lines(&lines, mode, reader)
            })
            .map_err(|source| GraphError::GraphFile {
                path: path.to_path_buf(),
                source: Box::new(source),
            })
    }

    /// The full closure for an entry point, empty when unknown.
    ///
    /// Nodes come back sorted by path.
    pub fn references(&self, entry_point: &str) -> Vec<&ProjectReference> {
        self.closures
            .get(&PathKey::new(entry_point))
            .map(|nodes| nodes.iter().collect())
            .unwrap_or_default()
    }

    /// Each entry point's own node, in input order.
    pub fn entry_points(&self) -> Vec<&ProjectReference> {
        self.entry_order
            .iter()
            .filter_map(|entry| {
                let key = PathKey::new(entry);
                self.closures
                    .get(&key)?
                    .iter()
                    .find(|node| PathKey::new(&node.path) == key)
            })
            .collect()
    }

    /// Memoized specification lookup by spec file path.
    pub fn project_spec(&self, spec_path: &str) -> Option<Arc<ProjectSpec>> {
        self.specs.get(&PathKey::new(spec_path)).cloned().flatten()
    }

    /// Problems collected during a lenient parse.
    pub fn diagnostics(&self) -> &[GraphDiagnostic] {
        &self.diagnostics
    }
}

#[derive(serde::Deserialize)]
struct GraphDocument {
    #[serde(default)]
    projects: Vec<String>,
    #[serde(default)]
    edges: Vec<String>,
}

struct Block {
    entry_path: String,
    edges: Vec<(String, String)>,
}

struct GraphBuilder {
    mode: ParseMode,
    blocks: Vec<Block>,
    block_index: HashMap<PathKey, usize>,
    diagnostics: Vec<GraphDiagnostic>,
}

impl GraphBuilder {
    fn new(mode: ParseMode) -> Self {
        GraphBuilder {
            mode,
            blocks: Vec::new(),
            block_index: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    fn parse_markers<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        let mut current: Option<usize> = None;
        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.as_ref().trim_end();
            if let Some(path) = line.strip_prefix("#:") {
                if path.is_empty() {
                    self.malformed(idx + 1, line)?;
                    current = None;
                    continue;
                }
                current = Some(self.open_block(path)?);
                continue;
            }

            let Some(block) = current else {
                // Edge line with no open block.
                self.malformed(idx + 1, line)?;
                continue;
            };
            match split_edge(line) {
                Some((parent, child)) => {
                    self.blocks[block]
                        .edges
                        .push((parent.to_string(), child.to_string()));
                }
                None => self.malformed(idx + 1, line)?,
            }
        }
        Ok(())
    }

    fn parse_structured<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        let text = lines
            .iter()
            .map(|line| line.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        let document: GraphDocument = serde_json::from_str(&text)?;

        let mut shared_edges = Vec::new();
        for (idx, edge) in document.edges.iter().enumerate() {
            let edge = edge.trim_end();
            match split_edge(edge) {
                Some((parent, child)) => {
                    shared_edges.push((parent.to_string(), child.to_string()));
                }
                None => self.malformed(idx + 1, edge)?,
            }
        }

        // The flat edge list belongs to every declared entry point.
        for project in &document.projects {
            let block = self.open_block(project)?;
            self.blocks[block].edges.extend(shared_edges.iter().cloned());
        }
        Ok(())
    }

    fn open_block(&mut self, path: &str) -> Result<usize> {
        let key = PathKey::new(path);
        if let Some(&existing) = self.block_index.get(&key) {
            return match self.mode {
                ParseMode::Strict => Err(GraphError::DuplicateEntryPoint {
                    path: path.to_string(),
                }),
                ParseMode::Lenient => {
                    self.diagnostics.push(GraphDiagnostic::DuplicateEntryPoint {
                        path: path.to_string(),
                    });
                    Ok(existing)
                }
            };
        }
        self.blocks.push(Block {
            entry_path: path.to_string(),
            edges: Vec::new(),
        });
        let idx = self.blocks.len() - 1;
        self.block_index.insert(key, idx);
        Ok(idx)
    }

    fn malformed(&mut self, line_number: usize, text: &str) -> Result<()> {
        match self.mode {
            ParseMode::Strict => Err(GraphError::MalformedEdge {
                line_number,
                text: text.to_string(),
            }),
            ParseMode::Lenient => {
                self.diagnostics.push(GraphDiagnostic::MalformedEdge {
                    line_number,
                    text: text.to_string(),
                });
                Ok(())
            }
        }
    }

    fn finish<R: SpecReader + ?Sized>(self, reader: &R) -> Result<ReferenceGraph> {
        let mut specs: HashMap<PathKey, Option<Arc<ProjectSpec>>> = HashMap::new();
        let mut closures = HashMap::new();
        let mut entry_order = Vec::new();

        for block in &self.blocks {
            let mut casing: Vec<String> = Vec::new();
            let mut child_sets: Vec<BTreeSet<usize>> = Vec::new();
            let mut index = HashMap::new();

            intern(&block.entry_path, &mut casing, &mut child_sets, &mut index);
            for (parent, child) in &block.edges {
                let p = intern(parent, &mut casing, &mut child_sets, &mut index);
                let c = intern(child, &mut casing, &mut child_sets, &mut index);
                child_sets[p].insert(c);
            }

            let mut nodes = Vec::with_capacity(casing.len());
            for (i, path) in casing.iter().enumerate() {
                let spec = load_spec(reader, path, &mut specs)?;
                let mut children: Vec<String> =
                    child_sets[i].iter().map(|&c| casing[c].clone()).collect();
                children.sort();
                nodes.push(ProjectReference {
                    path: path.clone(),
                    spec,
                    children,
                });
            }
            nodes.sort_by(|a, b| a.path.cmp(&b.path));

            closures.insert(PathKey::new(&block.entry_path), nodes);
            entry_order.push(block.entry_path.clone());
        }

        Ok(ReferenceGraph {
            closures,
            entry_order,
            specs,
            diagnostics: self.diagnostics,
        })
    }
}

/// Split an adjacency line into `(parent, child)`; both must be non-empty
/// and exactly one separator is allowed.
fn split_edge(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split('|');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(parent), Some(child), None) if !parent.is_empty() && !child.is_empty() => {
            Some((parent, child))
        }
        _ => None,
    }
}

/// First-seen interning: returns the index of `path` in `casing`, adding
/// it (and an empty child set) on first sight.
fn intern(
    path: &str,
    casing: &mut Vec<String>,
    child_sets: &mut Vec<BTreeSet<usize>>,
    index: &mut HashMap<PathKey, usize>,
) -> usize {
    let key = PathKey::new(path);
    if let Some(&i) = index.get(&key) {
        return i;
    }
    casing.push(path.to_string());
    child_sets.push(BTreeSet::new());
    let i = casing.len() - 1;
    index.insert(key, i);
    i
}

fn load_spec<R: SpecReader + ?Sized>(
    reader: &R,
    project_path: &str,
    specs: &mut HashMap<PathKey, Option<Arc<ProjectSpec>>>,
) -> Result<Option<Arc<ProjectSpec>>> {
    let spec_path = reader.spec_path(Path::new(project_path));
    let key = PathKey::new(&spec_path.to_string_lossy());
    if let Some(cached) = specs.get(&key) {
        return Ok(cached.clone());
    }
    let loaded = reader.load(&spec_path)?.map(Arc::new);
    specs.insert(key, loaded.clone());
    Ok(loaded)
}
