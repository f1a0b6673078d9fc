pub(crate) mod plans_errors;
pub(crate) mod plans_model;
pub(crate) mod plans_repository;

pub use plans_errors::PlanError;
pub use plans_model::{NewPlan, Plan, PlanAccountLink, PlanAccounts, PlanDB};
pub use plans_repository::PlanRepository;
