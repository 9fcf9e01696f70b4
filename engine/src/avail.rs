pub mod blob;
pub mod extrinsic;
pub mod metadata;
pub mod nonce;
pub mod rpc;
pub mod sender;
pub mod status;

use sp_runtime::{generic, traits::BlakeTwo256, OpaqueExtrinsic};

pub use sp_core::H256;
pub use sp_runtime::AccountId32;
pub use sp_version::RuntimeVersion;

pub type AvailHash = H256;
pub type AvailBlockNumber = u32;
pub type AvailHeader = generic::Header<AvailBlockNumber, BlakeTwo256>;
pub type AvailSignedBlock = generic::SignedBlock<generic::Block<AvailHeader, OpaqueExtrinsic>>;
pub type AvailIndex = u32;
pub type AvailBalance = u128;
pub type AvailAccountId = AccountId32;

/// Partitions the DA chain's storage space by submitting application.
pub type AppId = u32;

pub use blob::{Blob, BlobError, BlockPayload};
pub use sender::{AvailSender, BlackholeSender, DaSender, SendError};
pub use status::{ExtrinsicStatus, InclusionLevel};
