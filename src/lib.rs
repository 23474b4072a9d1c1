// src/lib.rs
pub mod types;
pub mod errors;
pub mod taxpath;
pub mod hierarchy;
pub mod emitter;
pub mod mpa_reader;

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

pub use crate::emitter::MergedTable;
pub use crate::errors::{MpaError, MpaResult};
pub use crate::hierarchy::{default_sample_name, HierarchyBuilder};
pub use crate::types::{MergeSummary, MpaRow};

use crate::mpa_reader::open_mpa_report;

/// Output path that means "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Reads every report in order and builds the merged table.
///
/// Sources get 1-based indices in the order given; a failure in any file is
/// reported with that file's path.
pub fn build_merged_table<P: AsRef<Path>>(inputs: &[P]) -> MpaResult<MergedTable> {
    let mut builder = HierarchyBuilder::new();
    log::info!("Number of files to parse: {}", inputs.len());

    for input in inputs {
        let path = input.as_ref();
        let source_index = builder.next_source_index();
        let reader = open_mpa_report(path).map_err(|e| MpaError::from(e).in_file(path))?;

        builder
            .ingest(source_index, &default_sample_name(source_index), reader.lines())
            .map_err(|e| e.in_file(path))?;
        log::debug!("Parsed {}", path.display());
    }

    log::info!(
        "Number of classifications to write: {}",
        builder.num_classifications()
    );
    builder.finish()
}

/// Opens the output sink; [`STDOUT_PATH`] selects stdout.
pub fn open_output(path: &Path) -> io::Result<Box<dyn Write>> {
    if path.as_os_str() == STDOUT_PATH {
        Ok(Box::new(BufWriter::new(io::stdout().lock())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Writes `table` to `output`, calling `on_row` with the running row count.
/// The sink is closed when this returns, whether or not writing succeeded.
pub fn write_merged_table<F: FnMut(usize)>(
    table: &MergedTable,
    output: &Path,
    on_row: F,
) -> MpaResult<usize> {
    let mut sink = open_output(output).map_err(|e| MpaError::from(e).in_file(output))?;
    table
        .write_tsv_with(&mut sink, on_row)
        .map_err(|e| e.in_file(output))
}

/// Merges `inputs` into a single table at `output`.
///
/// Every input is ingested before the output is opened, so a malformed
/// record never leaves a partial output file behind.
pub fn merge_mpa_files<P: AsRef<Path>>(inputs: &[P], output: &Path) -> MpaResult<MergeSummary> {
    let table = build_merged_table(inputs)?;
    let written = write_merged_table(&table, output, |_| {})?;
    log::info!("{} classifications printed", written);

    Ok(MergeSummary {
        files_parsed: inputs.len(),
        classifications_written: written,
    })
}
