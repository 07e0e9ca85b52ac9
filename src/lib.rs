pub mod charts;
pub mod cluster;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod nav;
pub mod present;
pub mod projection;
pub mod selection;
pub mod stats;
pub mod table;
pub mod views;
