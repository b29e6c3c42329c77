//! # Organizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `media_organizer`: orchestratore del batch
//! - `path_resolver`: nomi di output univoci
//! - `transfer`: copia, conversione HEIC e resize dei singoli record
//! - `progress_tracker`: conteggi e fallimenti di fine esecuzione

pub mod media_organizer;
pub mod path_resolver;
pub mod progress_tracker;
pub mod transfer;

pub use media_organizer::MediaOrganizer;
pub use progress_tracker::{BatchSummary, FailedFile, FailureStage};
