pub mod classifiers;
pub mod config;
pub mod generic_types;
pub mod logging;
pub mod options;
pub mod pipeline;
