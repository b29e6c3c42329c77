//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore dell'organizer e fin dove arriva ciascuno.
//!
//! ## Categorie:
//! - `Traversal`: una directory non è leggibile. Interrompe tutta l'esecuzione.
//! - `Stat`: metadati del file non leggibili. Fallimento del singolo file.
//! - `Transfer`: copia o scrittura nella cartella di output fallita. Singolo file.
//! - `Conversion`: un convertitore HEIC è partito ma ha fallito. Singolo file.
//! - `MissingDependency`: nessun convertitore HEIC installato. Singolo file.
//! - `Image`: errore di decodifica/codifica durante il resize. Singolo file.
//! - `Validation`: configurazione non valida. Fatale all'avvio.
//!
//! ## Esempio:
//! ```rust,ignore
//! if converters.is_empty() {
//!     return Err(OrganizeError::MissingDependency("heif-convert".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for media organization
#[derive(thiserror::Error, Debug)]
pub enum OrganizeError {
    #[error("Cannot read directory {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Cannot read metadata of {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot copy {from} to {to}: {source}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl OrganizeError {
    /// Whether the error must abort the whole batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Traversal { .. } | Self::Validation(_))
    }
}
