mod cross;
mod exchange;
mod local_search;
mod r#move;
mod relocate;
mod two_opt;

pub use local_search::{SearchContext, local_search};
pub use r#move::{LocalSearchMove, LocalSearchOperator};
