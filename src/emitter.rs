//src/emitter.rs

use std::io::Write;

use crate::errors::{MpaError, MpaResult};
use crate::hierarchy::{ChildrenMap, CountTable, ParentMap, COMMENT_MARKER, FIELD_DELIMITER};
use crate::types::MpaRow;

/// First column label of the header row.
pub const CLASSIFICATION_HEADER: &str = "Classification";

/// Written for a (classification, source) pair with no recorded count.
pub const ZERO_COUNT: &str = "0";

/// The finished hierarchy and count table, ready to be written once.
#[derive(Debug)]
pub struct MergedTable {
    samples: Vec<String>,
    roots: Vec<String>,
    children: ChildrenMap,
    parent_of: ParentMap,
    counts: CountTable,
}

impl MergedTable {
    pub(crate) fn new(
        samples: Vec<String>,
        roots: Vec<String>,
        children: ChildrenMap,
        parent_of: ParentMap,
        counts: CountTable,
    ) -> Self {
        Self {
            samples,
            roots,
            children,
            parent_of,
            counts,
        }
    }

    /// Display names, one per source in ingestion order.
    pub fn sample_names(&self) -> &[String] {
        &self.samples
    }

    /// Distinct classifications, i.e. the number of data rows.
    pub fn num_classifications(&self) -> usize {
        self.counts.len()
    }

    pub fn header_line(&self) -> String {
        let mut header = format!("{}{}", COMMENT_MARKER, CLASSIFICATION_HEADER);
        for name in &self.samples {
            header.push(FIELD_DELIMITER);
            header.push_str(name);
        }
        header
    }

    /// Rows in pre-order, produced lazily.
    pub fn rows(&self) -> Rows<'_> {
        // Reversed so the first root is popped first.
        let stack = self
            .roots
            .iter()
            .rev()
            .map(|root| (root.as_str(), None))
            .collect();
        Rows { table: self, stack }
    }

    /// Writes the header and every row, returning how many rows were written.
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> MpaResult<usize> {
        self.write_tsv_with(out, |_| {})
    }

    /// Like [`write_tsv`](Self::write_tsv), calling `on_row` with the running
    /// row count after each row.
    pub fn write_tsv_with<W, F>(&self, out: &mut W, mut on_row: F) -> MpaResult<usize>
    where
        W: Write,
        F: FnMut(usize),
    {
        writeln!(out, "{}", self.header_line())?;

        let mut written = 0usize;
        for row in self.rows() {
            row?.write_to(out)?;
            written += 1;
            on_row(written);
        }
        out.flush()?;
        Ok(written)
    }

    fn row_for<'a>(&'a self, classification: &'a str) -> MpaResult<MpaRow<'a>> {
        let per_source = self
            .counts
            .get(classification)
            .ok_or_else(|| MpaError::MissingClassification(classification.to_string()))?;

        let counts = (1..=self.samples.len())
            .map(|idx| per_source.get(&idx).map_or(ZERO_COUNT, String::as_str))
            .collect();

        Ok(MpaRow {
            classification,
            counts,
        })
    }
}

/// Depth-first pre-order walk over the merged hierarchy.
///
/// Uses an explicit stack so arbitrarily deep paths cannot overflow. A path
/// can sit in the root list and in several child lists (a root in one source
/// that later gained a parent, or linked under a shallow then a deeper
/// parent). It is yielded only under its latest parent, so it always follows
/// that parent and appears once.
pub struct Rows<'a> {
    table: &'a MergedTable,
    stack: Vec<(&'a str, Option<&'a str>)>,    // (path, parent it was reached from)
}

impl<'a> Iterator for Rows<'a> {
    type Item = MpaResult<MpaRow<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, via)) = self.stack.pop() {
            let placed_under = self.table.parent_of.get(current).map(String::as_str);
            if placed_under != via {
                continue;
            }
            if let Some(kids) = self.table.children.get(current) {
                self.stack
                    .extend(kids.iter().rev().map(|kid| (kid.as_str(), Some(current))));
            }
            return Some(self.table.row_for(current));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::hierarchy::{default_sample_name, HierarchyBuilder};
    use crate::taxpath::TaxPath;

    use super::*;

    fn merge(sources: &[&str]) -> MergedTable {
        let mut builder = HierarchyBuilder::new();
        for text in sources {
            let idx = builder.next_source_index();
            builder
                .ingest_str(idx, &default_sample_name(idx), text)
                .expect("ingest failed");
        }
        builder.finish().expect("finish failed")
    }

    fn render(table: &MergedTable) -> String {
        let mut out = Vec::new();
        table.write_tsv(&mut out).expect("write failed");
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn two_source_scenario() {
        let table = merge(&[
            "d__Bacteria\t100\nd__Bacteria|p__Firmicutes\t60",
            "d__Bacteria\t50",
        ]);
        assert_eq!(
            render(&table),
            "#Classification\tSample #1\tSample #2\n\
             d__Bacteria\t100\t50\n\
             d__Bacteria|p__Firmicutes\t60\t0\n"
        );
    }

    #[test]
    fn siblings_keep_first_seen_order() {
        let table = merge(&[
            "d__Bacteria\t9\n\
             d__Bacteria|p__B\t1\n\
             d__Bacteria|p__A\t2\n\
             d__Bacteria|p__B|c__X\t3\n\
             d__Archaea\t4\n\
             d__Bacteria|p__C\t5",
        ]);
        let order: Vec<&str> = table
            .rows()
            .map(|row| row.unwrap().classification)
            .collect();
        assert_eq!(
            order,
            vec![
                "d__Bacteria",
                "d__Bacteria|p__B",
                "d__Bacteria|p__B|c__X",
                "d__Bacteria|p__A",
                "d__Bacteria|p__C",
                "d__Archaea",
            ]
        );
    }

    #[test]
    fn parents_precede_children() {
        let table = merge(&[
            "d__Bacteria\t1\nd__Bacteria|p__F\t1\nd__Bacteria|p__F|c__B\t1",
            "d__Archaea\t1\nd__Archaea|p__E\t1\nd__Bacteria|p__P\t1",
        ]);
        let order: Vec<&str> = table
            .rows()
            .map(|row| row.unwrap().classification)
            .collect();
        for (pos, path) in order.iter().enumerate() {
            let path = TaxPath::new(path);
            for later in &order[pos + 1..] {
                assert!(
                    !TaxPath::new(later).is_ancestor_of(&path),
                    "{} emitted after its descendant {}",
                    later,
                    path.as_str()
                );
            }
        }
    }

    #[test]
    fn root_that_later_gains_a_parent_follows_it() {
        // p__F is a root from source 1, then a child of d__Bacteria in source 2.
        let table = merge(&[
            "d__Bacteria|p__F\t1",
            "d__Bacteria\t2\nd__Bacteria|p__F\t3",
        ]);
        assert_eq!(
            render(&table),
            "#Classification\tSample #1\tSample #2\n\
             d__Bacteria\t0\t2\n\
             d__Bacteria|p__F\t1\t3\n"
        );
    }

    #[test]
    fn path_with_two_parents_is_emitted_once() {
        let table = merge(&[
            "d__B\t1\nd__B|p__F|c__X\t1",
            "d__B|p__F\t1\nd__B|p__F|c__X\t1",
        ]);
        let rows: Vec<_> = table.rows().collect::<MpaResult<_>>().unwrap();
        assert_eq!(rows.len(), table.num_classifications());
        assert_eq!(rows[1].classification, "d__B|p__F");
        assert_eq!(rows[2].classification, "d__B|p__F|c__X");
    }

    #[test]
    fn identical_sources_give_identical_columns() {
        let text = "d__Bacteria\t10\nd__Bacteria|p__F\t4\nd__Archaea\t2";
        let table = merge(&[text, text]);
        for row in table.rows() {
            let row = row.unwrap();
            assert_eq!(row.counts.len(), 2);
            assert_eq!(row.counts[0], row.counts[1]);
        }
    }

    #[test]
    fn missing_count_entry_is_an_internal_error() {
        let table = MergedTable::new(
            vec!["Sample #1".to_string()],
            vec!["d__Ghost".to_string()],
            ChildrenMap::default(),
            ParentMap::default(),
            CountTable::default(),
        );
        let first = table.rows().next().expect("one row");
        assert!(matches!(first, Err(MpaError::MissingClassification(p)) if p == "d__Ghost"));
        let mut sink = Vec::new();
        assert!(table.write_tsv(&mut sink).is_err());
    }

    #[test]
    fn header_uses_sample_names() {
        let table = merge(&["#ID\tMyName\nd__Bacteria\t1", "d__Bacteria\t2"]);
        assert_eq!(table.header_line(), "#Classification\tMyName\tSample #2");
        assert_eq!(table.sample_names(), ["MyName", "Sample #2"]);
    }

    #[test]
    fn progress_callback_sees_every_row() {
        let table = merge(&["d__A\t1\nd__A|p__B\t1\nd__C\t1"]);
        let mut seen = Vec::new();
        let written = table
            .write_tsv_with(&mut Vec::new(), |n| seen.push(n))
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
