//! Policy configuration: document schema and JSON loading.

pub mod loader;
pub mod schema;

pub use loader::{load_aliases, load_policy};
pub use schema::{
    AliasDocument, Constraint, ModelRecord, Policy, Position, RouteRule, Slot, Stage,
    StageAugmentation,
};
