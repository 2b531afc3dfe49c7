//! Subscription plan gating: paid-model access, the free daily message
//! quota, and the counter shown to free users.

pub mod counter;
pub mod error;
pub mod gate;
pub mod models;

pub use {
    counter::{MessageCounter, message_counter},
    error::{Error, LIMIT_STATUS, LimitError, Result},
    gate::{GateContext, PlanGate, start_of_day, validate_model_and_message_count},
    models::{MODEL_LIST, ModelCatalog, ModelInfo, ModelProvider},
};
