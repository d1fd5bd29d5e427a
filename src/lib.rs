#[macro_use]
extern crate tracing;

pub mod ast;
pub mod cancellation;
pub mod config;
pub mod corpus;
pub mod dispatch;
pub mod err;
pub mod executors;
pub mod index;
pub mod join;
pub mod model;
pub mod projection;
pub mod query;

pub use ast::{Condition, JoinCondition, Query, SelectColumn, SubquerySpec};
pub use cancellation::CancellationToken;
pub use config::EngineConfig;
pub use corpus::{CorpusMetadata, NoCorpus, SnippetSource};
pub use err::Error;
pub use model::{Granularity, MatchDetail, MatchValue, Position, PositionList, QueryResult};
pub use projection::RowSet;
pub use query::run;
