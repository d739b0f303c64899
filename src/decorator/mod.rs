//! Decorator Module
//!
//! Turns declared types into decorator plans and wraps instances with them.

mod decorated;
mod plan;

pub use decorated::Decorated;
pub use plan::{synthesize, synthesize_all, CallMode, DecoratorPlan, MethodPlan, SynthesisReport};
