pub mod condition;
pub mod translator;

pub use condition::{
    escape_like, FindOperator, FindOptions, Order, SortDirection, WhereCondition, LIKE_ESCAPE,
};
pub use translator::{translate, Filter, FilterElement, FilterRange, FilterValue};
