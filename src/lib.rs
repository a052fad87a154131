//! Reconciles a CRM company export against third-party ALF/SNF facility
//! feeds: matches companies to facilities by normalized name, enriches
//! matched rows with facility data, and generates import files for the
//! facilities and executive contacts the CRM is missing.

pub mod cli;
pub mod config;
pub mod derive;
pub mod enrich;
pub mod error;
pub mod export;
pub mod load;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod summary;
pub mod util;
