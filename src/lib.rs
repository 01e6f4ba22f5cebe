//! Tourism Package Prediction
//!
//! Scores how likely a customer is to buy a tourism package. A form-driven
//! web interface collects customer attributes, assembles them into the
//! feature record the pre-trained classifier expects, and applies a fixed
//! decision threshold. Two companion binaries prepare the training split
//! (`prepare_dataset`) and publish the interface folder (`publish_space`).
//!
//! # Modules
//!
//! - `artifact_validator`: SHA-256 verification of downloaded artifacts.
//! - `classifier`: Classifier trait and the JSON model artifact.
//! - `config`: Configuration management.
//! - `dataset_prep`: Dataset cleanup and seeded train/test split.
//! - `errors`: Error handling types.
//! - `features`: Feature record assembly.
//! - `handlers`: HTTP request handlers.
//! - `hub_client`: Model/dataset/space hub client.
//! - `model_store`: Load-once classifier holder.
//! - `models`: Input, record and prediction types.
//! - `obs`: Observability and logging.
//! - `prediction`: Decision threshold and confidence.
//! - `publishing`: Deployment folder collection.
//! - `routes`: Router construction.
//! - `views`: HTML rendering.

pub mod artifact_validator;
pub mod classifier;
pub mod config;
pub mod dataset_prep;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod hub_client;
pub mod model_store;
pub mod models;
pub mod obs;
pub mod prediction;
pub mod publishing;
pub mod routes;
pub mod views;
