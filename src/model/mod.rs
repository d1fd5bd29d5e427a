//! The currency of the engine: [`Position`] and [`PositionList`] come from
//! the Index Access layer; [`MatchDetail`] and [`QueryResult`] are what every
//! executor produces and every composition stage consumes.

mod granularity;
mod match_detail;
mod position;
mod query_result;

pub use granularity::Granularity;
pub use match_detail::{ConditionTag, MatchDetail, MatchValue, VariableBinding};
pub use position::{Position, PositionList};
pub use query_result::QueryResult;
