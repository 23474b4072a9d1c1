//src/hierarchy.rs

use ahash::AHashMap;
use std::io;

use crate::emitter::MergedTable;
use crate::errors::{MpaError, MpaResult};
use crate::taxpath::TaxPath;
use crate::types::CountValue;

/// Lines starting with this marker carry the sample name instead of a record.
pub const COMMENT_MARKER: char = '#';

/// Separator between the classification and the count of a record.
pub const FIELD_DELIMITER: char = '\t';

/// classification -> source index -> count
pub type CountTable = AHashMap<String, AHashMap<usize, CountValue>>;

/// parent classification -> children, in first-seen order
pub type ChildrenMap = AHashMap<String, Vec<String>>;

/// classification -> the parent it was most recently linked under
pub type ParentMap = AHashMap<String, String>;

/// Placeholder display name for a source without a header line.
pub fn default_sample_name(source_index: usize) -> String {
    format!("Sample #{}", source_index)
}

/// Accumulates counts and parent/child links across all sources of one merge.
///
/// A record's parent is the deepest strict prefix of its path that has
/// *already been seen as a record*, in this or an earlier source. Parents
/// introduced later do not re-link paths seen before them, so the tree shape
/// follows ingestion order. A path seen again after a deeper prefix became
/// known is linked under that deeper prefix too; `parent_of` keeps the latest
/// (deepest) link and the emitter places the path there.
///
/// A failed [`ingest`](Self::ingest) leaves that source half applied, so the
/// builder refuses further sources and [`finish`](Self::finish) fails.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    samples: Vec<String>,
    counts: CountTable,
    children: ChildrenMap,
    parent_of: ParentMap,
    roots: Vec<String>,
    aborted: Option<usize>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next call to [`ingest`](Self::ingest) must use (1-based).
    pub fn next_source_index(&self) -> usize {
        self.samples.len() + 1
    }

    pub fn num_sources(&self) -> usize {
        self.samples.len()
    }

    pub fn num_classifications(&self) -> usize {
        self.counts.len()
    }

    /// Processes one source's lines in file order.
    ///
    /// `display_name` is used unless the source has a header line, in which
    /// case the last header's final tab field wins. Any line that is neither a
    /// header nor exactly `classification\tcount` aborts with
    /// [`MpaError::MalformedRecord`].
    pub fn ingest<I, S>(
        &mut self,
        source_index: usize,
        display_name: &str,
        lines: I,
    ) -> MpaResult<()>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        if let Some(aborted) = self.aborted {
            return Err(MpaError::AbortedSource(aborted));
        }
        let expected = self.next_source_index();
        if source_index != expected {
            return Err(MpaError::SourceOutOfOrder {
                expected,
                got: source_index,
            });
        }

        let result = self.ingest_lines(source_index, display_name, lines);
        if result.is_err() {
            self.aborted = Some(source_index);
        }
        result
    }

    fn ingest_lines<I, S>(
        &mut self,
        source_index: usize,
        display_name: &str,
        lines: I,
    ) -> MpaResult<()>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        let mut sample_name = display_name.to_string();
        let mut records = 0usize;

        for (idx, line_result) in lines.into_iter().enumerate() {
            let line = line_result?;
            let line = line.as_ref();

            if line.starts_with(COMMENT_MARKER) {
                let trimmed = line.trim();
                sample_name = trimmed
                    .rsplit(FIELD_DELIMITER)
                    .next()
                    .unwrap_or(trimmed)
                    .trim()
                    .to_string();
                continue;
            }

            let (classification, value) =
                split_record(line.trim()).ok_or_else(|| MpaError::MalformedRecord {
                    source_index,
                    line_number: idx + 1,
                    line: line.to_string(),
                })?;
            self.record(source_index, classification, value);
            records += 1;
        }

        log::debug!(
            "Source #{} ({}): {} records, {} classifications known",
            source_index,
            sample_name,
            records,
            self.counts.len()
        );
        self.samples.push(sample_name);
        Ok(())
    }

    /// Convenience wrapper over [`ingest`](Self::ingest) for in-memory text.
    pub fn ingest_str(
        &mut self,
        source_index: usize,
        display_name: &str,
        text: &str,
    ) -> MpaResult<()> {
        self.ingest(source_index, display_name, text.lines().map(Ok::<_, io::Error>))
    }

    fn record(&mut self, source_index: usize, classification: &str, value: &str) {
        // The empty prefix is never a parent, even if an empty path was seen.
        let parent = TaxPath::new(classification)
            .ancestors()
            .filter(|candidate| !candidate.is_empty() && self.counts.contains_key(*candidate))
            .last();

        match parent {
            Some(parent) => {
                let kids = self.children.entry(parent.to_string()).or_default();
                if !kids.iter().any(|kid| kid == classification) {
                    kids.push(classification.to_string());
                }
                self.parent_of
                    .insert(classification.to_string(), parent.to_string());
            }
            None => {
                if !self.counts.contains_key(classification) {
                    self.roots.push(classification.to_string());
                }
            }
        }

        // Duplicate lines within a source overwrite.
        self.counts
            .entry(classification.to_string())
            .or_default()
            .insert(source_index, value.to_string());
    }

    /// Hands the finished structures over for emission.
    pub fn finish(self) -> MpaResult<MergedTable> {
        if let Some(aborted) = self.aborted {
            return Err(MpaError::AbortedSource(aborted));
        }
        Ok(MergedTable::new(
            self.samples,
            self.roots,
            self.children,
            self.parent_of,
            self.counts,
        ))
    }
}

fn split_record(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.split(FIELD_DELIMITER);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(classification), Some(value), None) => Some((classification, value)),
        _ => None,
    }
}
