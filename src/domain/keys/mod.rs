pub mod model;
pub mod pool;

pub use model::ApiKeyRecord;
pub use pool::{KeyPool, KeyPoolManager, SharedKeyPool};
