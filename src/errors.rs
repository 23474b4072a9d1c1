//src/errors.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MpaError {
    #[error("Malformed record in source #{source_index}, line {line_number}: expected 2 tab-separated fields, got {line:?}")]
    MalformedRecord {
        source_index: usize,
        line_number: usize,
        line: String,
    },

    /// A traversed classification has no entry in the count table.
    #[error("Internal error: classification {0:?} is in the hierarchy but has no counts")]
    MissingClassification(String),

    #[error("Sources must be ingested in order: expected source #{expected}, got #{got}")]
    SourceOutOfOrder { expected: usize, got: usize },

    /// Source #N failed partway, so the builder holds a partial source.
    #[error("Source #{0} failed partway through; the merge cannot continue")]
    AbortedSource(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<MpaError>,
    },
}

impl MpaError {
    /// Attach the file that produced this error.
    pub fn in_file<P: Into<PathBuf>>(self, path: P) -> Self {
        MpaError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type MpaResult<T> = Result<T, MpaError>;
