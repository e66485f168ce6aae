//! Orthology groups across genomes
//!
//! Genome names are interned by a `GenomeSet` owned by the caller, so two
//! collections can be processed in one process without sharing state. A
//! group holds genes per genome; collections merge any two groups that share
//! a gene.

use crate::errors::{EnveomicsError, Result};
use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;

/// Interning table for genome names; indexes are stable for its lifetime.
#[derive(Debug, Default, Clone)]
pub struct GenomeSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl GenomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A gene: genome index (into a `GenomeSet`) plus its local identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gene {
    pub genome: usize,
    pub id: String,
}

/// One orthology group: genes grouped per genome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrthologyGroup {
    genes: BTreeSet<Gene>,
}

impl OrthologyGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, gene: Gene) {
        self.genes.insert(gene);
    }

    pub fn contains(&self, gene: &Gene) -> bool {
        self.genes.contains(gene)
    }

    pub fn shares_gene_with(&self, other: &OrthologyGroup) -> bool {
        // Iterate the smaller set
        let (small, large) = if self.genes.len() <= other.genes.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.genes.iter().any(|g| large.genes.contains(g))
    }

    /// Union of the two groups' genes.
    pub fn merge(&mut self, other: OrthologyGroup) {
        self.genes.extend(other.genes);
    }

    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.iter()
    }

    pub fn genes_of(&self, genome: usize) -> Vec<&Gene> {
        self.genes.iter().filter(|g| g.genome == genome).collect()
    }

    pub fn genome_count(&self) -> usize {
        self.genes
            .iter()
            .map(|g| g.genome)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// A collection of orthology groups over one `GenomeSet`.
#[derive(Debug, Default)]
pub struct OgCollection {
    pub genomes: GenomeSet,
    pub groups: Vec<OrthologyGroup>,
}

impl OgCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a tab table: header row of genome names, then one row per group
    /// with comma-joined gene ids per genome (`-` or empty = absent).
    pub fn read_table<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut lines = reader.lines().enumerate();
        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    break line;
                }
                None => {
                    return Err(EnveomicsError::parse(0, "empty orthology table"));
                }
            }
        };
        let columns: Vec<usize> = header
            .split('\t')
            .map(|name| self.genomes.intern(name.trim()))
            .collect();
        let mut added = 0;
        for (idx, line) in lines {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            if cells.len() != columns.len() {
                return Err(EnveomicsError::parse(
                    idx + 1,
                    format!(
                        "row has {} cells but the header names {} genomes",
                        cells.len(),
                        columns.len()
                    ),
                ));
            }
            let mut group = OrthologyGroup::new();
            for (cell, &genome) in cells.iter().zip(&columns) {
                let cell = cell.trim();
                if cell.is_empty() || cell == "-" {
                    continue;
                }
                for id in cell.split(',') {
                    group.insert(Gene {
                        genome,
                        id: id.trim().to_string(),
                    });
                }
            }
            if !group.is_empty() {
                self.add_merging(group);
                added += 1;
            }
        }
        Ok(added)
    }

    /// Add a group, unioning it with every existing group sharing a gene.
    pub fn add_merging(&mut self, mut group: OrthologyGroup) {
        let mut kept = Vec::with_capacity(self.groups.len());
        for existing in self.groups.drain(..) {
            if existing.shares_gene_with(&group) {
                group.merge(existing);
            } else {
                kept.push(existing);
            }
        }
        kept.push(group);
        self.groups = kept;
    }

    /// Write the tab table (header of genome names, `-` for absence).
    pub fn write_table<W: std::io::Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", self.genomes.names().join("\t"))?;
        for group in &self.groups {
            let row: Vec<String> = (0..self.genomes.len())
                .map(|genome| {
                    let ids: Vec<&str> =
                        group.genes_of(genome).iter().map(|g| g.id.as_str()).collect();
                    if ids.is_empty() {
                        "-".to_string()
                    } else {
                        ids.join(",")
                    }
                })
                .collect();
            writeln!(writer, "{}", row.join("\t"))?;
        }
        Ok(())
    }

    /// Groups present in every genome (the core).
    pub fn core_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.genome_count() == self.genomes.len())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn interning_is_stable() {
        let mut set = GenomeSet::new();
        let a = set.intern("gA");
        let b = set.intern("gB");
        assert_ne!(a, b);
        assert_eq!(set.intern("gA"), a);
        assert_eq!(set.name(b), Some("gB"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn table_roundtrip() {
        let mut col = OgCollection::new();
        let n = col
            .read_table(Cursor::new("gA\tgB\tgC\ng1,g2\tx1\t-\n-\tx2\ty1\n"))
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(col.groups.len(), 2);
        let mut out = Vec::new();
        col.write_table(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("gA\tgB\tgC\n"));
        assert!(text.contains("g1,g2\tx1\t-"));
    }

    #[test]
    fn groups_sharing_a_gene_are_merged() {
        let mut col = OgCollection::new();
        col.read_table(Cursor::new("gA\tgB\ng1\tx1\n")).unwrap();
        // Second table: x1 in gB again, linking to a new gA gene
        col.read_table(Cursor::new("gA\tgB\ng9\tx1\n")).unwrap();
        assert_eq!(col.groups.len(), 1);
        assert_eq!(col.groups[0].len(), 3);
        assert_eq!(col.core_count(), 1);
    }

    #[test]
    fn empty_table_is_a_parse_error() {
        let mut collection = OgCollection::new();
        assert!(collection.read_table("".as_bytes()).is_err());
        assert!(collection.read_table("# only comments\n\n".as_bytes()).is_err());
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let mut col = OgCollection::new();
        let err = col
            .read_table(Cursor::new("gA\tgB\ng1\n"))
            .unwrap_err();
        assert!(matches!(err, EnveomicsError::Parse { line: 2, .. }));
    }

    #[test]
    fn two_collections_do_not_interfere() {
        let mut one = OgCollection::new();
        let mut two = OgCollection::new();
        one.read_table(Cursor::new("gA\ng1\n")).unwrap();
        two.read_table(Cursor::new("gZ\nz1\n")).unwrap();
        assert_eq!(one.genomes.names(), &["gA".to_string()]);
        assert_eq!(two.genomes.names(), &["gZ".to_string()]);
    }
}
