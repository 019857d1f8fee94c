use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on store file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on store file {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}
