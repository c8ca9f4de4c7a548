/// Pool clients
///
/// One adapter per supported upstream API, all normalized into
/// [`PoolAddressData`] with hash rates in GH/s.
///
/// Use [`select`] to build the client for a configured source key.

pub mod ckpool;
pub mod client;
pub mod coin_miners;
pub mod f2pool;
pub mod merge;
pub mod mining_core;
pub mod mining_dutch;
pub mod public_pool;
pub mod solo_pool;
pub mod types;


// Re-export main components
pub use ckpool::CkPoolClient;
pub use client::{
    BestDifficultyStore, Clock, FixedClock, HttpClient, MemoryDifficultyStore, NoHistory,
    PoolClient, PoolContext, SystemClock,
};
pub use coin_miners::CoinMinersPoolClient;
pub use f2pool::F2PoolClient;
pub use merge::{combine_float, max_float, WorkerSet};
pub use mining_core::MiningCorePoolClient;
pub use mining_dutch::MiningDutchPoolClient;
pub use public_pool::PublicPoolClient;
pub use solo_pool::SoloPoolClient;
pub use types::{CryptoCoin, PoolAddressData, PoolAddressWorkerData, PoolConfig, PoolSource};

use crate::errors::PoolResult;

/// Build the client for a source key
///
/// Unknown keys fail with `UnsupportedSource` before anything is constructed.
pub fn select(source_key: &str, context: PoolContext) -> PoolResult<Box<dyn PoolClient>> {
    let source: PoolSource = source_key.parse()?;
    Ok(build(source, context))
}

/// Build the client for an already parsed source
pub fn build(source: PoolSource, context: PoolContext) -> Box<dyn PoolClient> {
    match source {
        PoolSource::PublicPool => Box::new(PublicPoolClient::new(context)),
        PoolSource::F2Pool => Box::new(F2PoolClient::new(context)),
        PoolSource::SoloPool => Box::new(SoloPoolClient::new(context)),
        PoolSource::CoinMiners => Box::new(CoinMinersPoolClient::new(context)),
        PoolSource::CkPool => Box::new(CkPoolClient::new(context)),
        PoolSource::MiningDutch => Box::new(MiningDutchPoolClient::new(context)),
        PoolSource::MiningCore => Box::new(MiningCorePoolClient::new(context)),
    }
}
