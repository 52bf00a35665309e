pub mod load;
pub mod router;
pub mod space;

pub use load::{FixedLoads, ServerInfoProvider, ServerLoad};
pub use router::{DartOp, HashResult};
pub use space::{DartInfo, DartSpace, SpaceError};
