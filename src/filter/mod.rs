pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;

pub use types::*;
pub use filter::{build_filter, build_query};
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
