//! GameVault - game catalog façade and entity-extraction playground.
//!
//! Two independent components behind one binary: a thin REST façade over
//! an external document store (the product catalog) and a web page that
//! extracts named entities from free text via an external NLP model.

pub mod cli;
pub mod config;
pub mod models;
pub mod nlp;
pub mod server;
pub mod store;
pub mod utils;
