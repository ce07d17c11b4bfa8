//! The physical operator tree definition. There is no binder, logical
//! planner, or optimizer here - plans are built directly in their final
//! physical form and handed to the execution runner.

pub mod physical_plan;

pub use physical_plan::*;
