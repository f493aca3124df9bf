pub mod chat;
pub mod clients;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod predictor;
pub mod prompts;

pub use error::{PredictionError, Result};
pub use models::{CareerRecommendation, LearningResource, PredictionResult, Profile};
pub use predictor::{Credentials, RecommendationProxy};
