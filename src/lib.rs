//! # Media Organizer Library
//!
//! Questo è il modulo principale della libreria che espone le API pubbliche.
//!
//! L'organizer appiattisce un albero di foto e video in una sola cartella:
//! ogni file prende il nome dalla data di creazione e dalle cartelle di
//! provenienza, le foto HEIC diventano JPEG e i JPEG possono essere
//! ridimensionati a una larghezza fissa.
//!
//! ## Architettura dei moduli:
//! - `walker`: scansione ricorsiva con liste di esclusione
//! - `naming`: formattazione di timestamp, gruppo ed estensione
//! - `record`: stato di ogni file durante il batch
//! - `organizer`: orchestratore, risoluzione nomi, trasferimento e statistiche
//! - `image_processor`: HEIC verso JPEG con tool esterni
//! - `resize`: ridimensionamento JPEG in-process
//! - `progress`, `json_output`: reporting
//! - `config`, `error`, `tool_resolver`: infrastruttura
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_organizer::{Config, MediaOrganizer, NoProgress};
//!
//! let config = Config {
//!     input_dir: PathBuf::from("/photos/wedding"),
//!     ..Default::default()
//! };
//! let summary = MediaOrganizer::new(config)?.run(&mut NoProgress).await?;
//! println!("{}", summary.format_summary());
//! ```

pub mod config;
pub mod error;
pub mod image_processor;
pub mod json_output;
pub mod naming;
pub mod organizer;
pub mod progress;
pub mod record;
pub mod resize;
pub mod tool_resolver;
pub mod walker;

pub use config::Config;
pub use error::OrganizeError;
pub use organizer::{BatchSummary, MediaOrganizer};
pub use progress::{NoProgress, ProgressManager, ProgressReporter};
