//src/types.rs

use std::io::{self, Write};

/// Count value recorded for a (classification, source) pair, kept as the
/// original text so formatting and precision survive the merge.
pub type CountValue = String;

/// One row of the merged table.
///  classification  count(sample 1)  count(sample 2)  ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpaRow<'a> {
    pub classification: &'a str,
    pub counts: Vec<&'a str>,      // one per source, ascending source index
}

impl MpaRow<'_> {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.classification.as_bytes())?;
        for count in &self.counts {
            write!(out, "\t{}", count)?;
        }
        writeln!(out)
    }
}

/// What a full merge did, for the status side channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_parsed: usize,
    pub classifications_written: usize,
}
