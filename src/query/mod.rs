pub mod dispatch;
pub mod pattern;
pub mod server;

pub use dispatch::{
    DispatchRequest, DispatchResponse, HashAlgo, IndexServer, LocalCluster, ObjRefType, OpType,
};
pub use pattern::{classify, parse_range, split_kv, PatternKind, RangeExpr};
pub use server::QueryServer;
