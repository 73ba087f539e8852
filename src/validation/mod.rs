//! Query validation related methods and data structures

mod context;
pub(crate) mod input_value;
mod multi_visitor;
pub mod rules;
mod traits;
mod visitor;

#[cfg(test)]
pub(crate) mod test_harness;

pub use self::context::{RuleError, ValidatorContext};
pub use self::input_value::is_valid_literal_value;
pub use self::multi_visitor::{MultiVisitorCons, MultiVisitorNil};
pub use self::rules::visit_all_rules;
pub use self::traits::Visitor;
pub use self::visitor::visit;
