//! Redis-backed counter storage

mod counter;
mod pool;

pub use counter::RedisCounterStore;
pub use pool::RedisPool;
