//! JPlace phylogenetic placement files
//!
//! A JPlace document is JSON carrying a Newick tree (with `{n}` edge
//! annotations) and a list of read placements referencing those edges. The
//! parsed tree owns its own edge index; nothing here is process-global, so
//! two documents can be held side by side.

use crate::errors::{EnveomicsError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// One node of the reference tree, stored in an arena.
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    pub name: Option<String>,
    pub branch_length: Option<f64>,
    /// Edge number from the `{n}` annotation on the branch above this node.
    pub edge: Option<usize>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
}

/// A placement of one or more reads onto a tree edge.
#[derive(Debug, Clone)]
pub struct Placement {
    pub names: Vec<String>,
    pub edge: usize,
    pub like_weight_ratio: f64,
}

/// A parsed JPlace document: node arena, root, edge index, placements.
#[derive(Debug)]
pub struct JplaceTree {
    pub nodes: Vec<TreeNode>,
    pub root: usize,
    edge_to_node: HashMap<usize, usize>,
    pub placements: Vec<Placement>,
}

#[derive(Deserialize)]
struct JplaceDoc {
    tree: String,
    placements: Vec<JplacePlacement>,
    fields: Vec<String>,
    #[allow(dead_code)]
    version: Option<i32>,
}

#[derive(Deserialize)]
struct JplacePlacement {
    p: Vec<Vec<f64>>,
    #[serde(default)]
    n: Option<Vec<String>>,
    #[serde(default)]
    nm: Option<Vec<(String, f64)>>,
}

impl JplaceTree {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_str(&text)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let doc: JplaceDoc = serde_json::from_str(text)
            .map_err(|e| EnveomicsError::parse(0, format!("invalid jplace JSON: {e}")))?;
        let (nodes, root) = parse_newick(&doc.tree)?;
        let mut edge_to_node = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            if let Some(edge) = node.edge {
                if edge_to_node.insert(edge, idx).is_some() {
                    return Err(EnveomicsError::parse(
                        0,
                        format!("edge {edge} annotated on more than one branch"),
                    ));
                }
            }
        }
        let edge_idx = field_index(&doc.fields, "edge_num")?;
        let lwr_idx = field_index(&doc.fields, "like_weight_ratio").ok();
        let mut placements = Vec::new();
        for placement in &doc.placements {
            let names: Vec<String> = match (&placement.n, &placement.nm) {
                (Some(n), _) => n.clone(),
                (None, Some(nm)) => nm.iter().map(|(name, _)| name.clone()).collect(),
                (None, None) => Vec::new(),
            };
            // Best row by like_weight_ratio; first row if the field is absent
            let best = match lwr_idx {
                Some(i) => placement
                    .p
                    .iter()
                    .max_by(|a, b| a.get(i).unwrap_or(&0.0).total_cmp(b.get(i).unwrap_or(&0.0))),
                None => placement.p.first(),
            };
            let row = match best {
                Some(row) => row,
                None => continue,
            };
            let edge = *row.get(edge_idx).ok_or_else(|| {
                EnveomicsError::parse(0, "placement row shorter than fields list".to_string())
            })? as usize;
            if !edge_to_node.contains_key(&edge) {
                return Err(EnveomicsError::parse(
                    0,
                    format!("placement references edge {edge}, absent from the tree"),
                ));
            }
            let like_weight_ratio = lwr_idx.and_then(|i| row.get(i)).copied().unwrap_or(1.0);
            placements.push(Placement {
                names,
                edge,
                like_weight_ratio,
            });
        }
        Ok(Self {
            nodes,
            root,
            edge_to_node,
            placements,
        })
    }

    /// Arena index of the node under the given edge number.
    pub fn node_of_edge(&self, edge: usize) -> Option<usize> {
        self.edge_to_node.get(&edge).copied()
    }

    /// Placement read names grouped per edge, edges sorted ascending.
    pub fn reads_per_edge(&self) -> Vec<(usize, Vec<String>)> {
        let mut per_edge: HashMap<usize, Vec<String>> = HashMap::new();
        for placement in &self.placements {
            per_edge
                .entry(placement.edge)
                .or_default()
                .extend(placement.names.iter().cloned());
        }
        let mut out: Vec<_> = per_edge.into_iter().collect();
        out.sort_by_key(|(edge, _)| *edge);
        out
    }

    /// Leaf names under (and including) the node carrying `edge`.
    pub fn leaves_under_edge(&self, edge: usize) -> Result<Vec<String>> {
        let start = self.node_of_edge(edge).ok_or_else(|| {
            EnveomicsError::parse(0, format!("edge {edge} is not indexed in this tree"))
        })?;
        let mut leaves = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.children.is_empty() {
                if let Some(name) = &node.name {
                    leaves.push(name.clone());
                }
            } else {
                stack.extend(&node.children);
            }
        }
        leaves.sort();
        Ok(leaves)
    }
}

fn field_index(fields: &[String], name: &str) -> Result<usize> {
    fields.iter().position(|f| f == name).ok_or_else(|| {
        EnveomicsError::parse(0, format!("jplace fields list is missing '{name}'"))
    })
}

/// Parse a Newick string (with optional `{n}` edge annotations) into an
/// arena of nodes; returns the arena and the root index.
pub fn parse_newick(text: &str) -> Result<(Vec<TreeNode>, usize)> {
    let mut parser = NewickParser {
        bytes: text.trim().as_bytes(),
        pos: 0,
        nodes: Vec::new(),
    };
    let root = parser.subtree(None)?;
    parser.skip_ws();
    match parser.peek() {
        Some(b';') | None => Ok((parser.nodes, root)),
        Some(c) => Err(EnveomicsError::parse(
            0,
            format!("unexpected '{}' after newick tree", c as char),
        )),
    }
}

struct NewickParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    nodes: Vec<TreeNode>,
}

impl NewickParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn subtree(&mut self, parent: Option<usize>) -> Result<usize> {
        self.skip_ws();
        let idx = self.nodes.len();
        self.nodes.push(TreeNode {
            parent,
            ..TreeNode::default()
        });
        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                let child = self.subtree(Some(idx))?;
                self.nodes[idx].children.push(child);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                    }
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    other => {
                        return Err(EnveomicsError::parse(
                            0,
                            format!(
                                "expected ',' or ')' at byte {} of newick tree, found {:?}",
                                self.pos,
                                other.map(|c| c as char)
                            ),
                        ))
                    }
                }
            }
        }
        // name
        let name = self.token(|c| !matches!(c, b':' | b',' | b'(' | b')' | b'{' | b';'));
        if !name.is_empty() {
            self.nodes[idx].name = Some(name);
        }
        // :branch_length
        if self.peek() == Some(b':') {
            self.pos += 1;
            let num = self.token(|c| !matches!(c, b',' | b'(' | b')' | b'{' | b';'));
            let bl: f64 = num.trim().parse().map_err(|_| {
                EnveomicsError::parse(0, format!("bad branch length '{num}' in newick tree"))
            })?;
            self.nodes[idx].branch_length = Some(bl);
        }
        // {edge}
        if self.peek() == Some(b'{') {
            self.pos += 1;
            let num = self.token(|c| c != b'}');
            if self.peek() != Some(b'}') {
                return Err(EnveomicsError::parse(0, "unterminated '{' edge annotation"));
            }
            self.pos += 1;
            let edge: usize = num.trim().parse().map_err(|_| {
                EnveomicsError::parse(0, format!("bad edge number '{num}' in newick tree"))
            })?;
            self.nodes[idx].edge = Some(edge);
        }
        Ok(idx)
    }

    fn token(&mut self, accept: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if accept(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos])
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "version": 3,
        "tree": "((A:0.1{0},B:0.2{1}):0.05{2},C:0.3{3}){4};",
        "fields": ["edge_num", "likelihood", "like_weight_ratio"],
        "placements": [
            {"p": [[0, -100.0, 0.9], [2, -105.0, 0.1]], "n": ["read1"]},
            {"p": [[3, -90.0, 1.0]], "nm": [["read2", 2.0]]}
        ]
    }"#;

    #[test]
    fn parses_newick_with_edges() {
        let (nodes, root) = parse_newick("((A:0.1{0},B:0.2{1}):0.05{2},C:0.3{3}){4};").unwrap();
        assert_eq!(nodes[root].edge, Some(4));
        assert_eq!(nodes[root].children.len(), 2);
        let a = nodes
            .iter()
            .find(|n| n.name.as_deref() == Some("A"))
            .unwrap();
        assert_eq!(a.edge, Some(0));
        assert_eq!(a.branch_length, Some(0.1));
    }

    #[test]
    fn picks_best_placement_row() {
        let tree = JplaceTree::from_str(DOC).unwrap();
        assert_eq!(tree.placements.len(), 2);
        assert_eq!(tree.placements[0].edge, 0); // highest like_weight_ratio
        assert_eq!(tree.placements[0].names, vec!["read1"]);
        assert_eq!(tree.placements[1].names, vec!["read2"]);
    }

    #[test]
    fn reads_per_edge_groups_and_sorts() {
        let tree = JplaceTree::from_str(DOC).unwrap();
        let per_edge = tree.reads_per_edge();
        assert_eq!(per_edge[0].0, 0);
        assert_eq!(per_edge[1].0, 3);
    }

    #[test]
    fn leaves_under_edge() {
        let tree = JplaceTree::from_str(DOC).unwrap();
        assert_eq!(tree.leaves_under_edge(2).unwrap(), vec!["A", "B"]);
        assert_eq!(tree.leaves_under_edge(3).unwrap(), vec!["C"]);
        assert!(tree.leaves_under_edge(99).is_err());
    }

    #[test]
    fn unindexed_edge_is_a_parse_error() {
        let doc = r#"{
            "tree": "(A:0.1{0},B:0.2{1});",
            "fields": ["edge_num"],
            "placements": [{"p": [[7]], "n": ["r"]}]
        }"#;
        assert!(JplaceTree::from_str(doc).is_err());
    }

    #[test]
    fn malformed_newick_is_rejected() {
        assert!(parse_newick("((A,B);").is_err());
        assert!(parse_newick("(A:x,B);").is_err());
    }

    #[test]
    fn unterminated_edge_annotation_is_rejected() {
        assert!(parse_newick("(A:0.1{0,B:0.2);").is_err());
    }
}
