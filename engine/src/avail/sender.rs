use async_trait::async_trait;
use sp_core::sr25519;
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{ACCOUNT_STORAGE_ENTRY, SUBMIT_DATA_CALL, SYSTEM_PALLET};

use super::{
	blob::{encode_block, BlobError, BlockPayload},
	extrinsic::{
		signer::{ExtrinsicSigner, PairSigner, SignerError},
		AvailExtrinsicBuilder, AvailReplayProtection, AvailUncheckedExtrinsic, SubmitDataCall,
	},
	metadata::MetadataError,
	nonce::{NonceExhausted, NonceState},
	rpc::{AvailRpcApi, RpcError, StatusSubscription},
	status::{ExtrinsicStatus, InclusionLevel, UnsupportedStatus, WaitState},
	AppId, AvailAccountId,
};

#[derive(Error, Debug)]
pub enum SendError {
	#[error("Failed to encode block data: {0}")]
	Encoding(#[from] BlobError),
	#[error("Cannot build the data submission call: {0}")]
	Call(#[source] MetadataError),
	#[error(transparent)]
	Rpc(RpcError),
	#[error("Couldn't fetch latest account storage info for {0}")]
	AccountNotFound(AvailAccountId),
	#[error(transparent)]
	Signing(#[from] SignerError),
	#[error(transparent)]
	NonceExhausted(#[from] NonceExhausted),
	#[error("Failed to submit extrinsic: {0}")]
	Submission(#[source] RpcError),
	#[error("Failed while waiting for extrinsic status: {0}")]
	Subscription(#[source] RpcError),
	#[error("Unexpected extrinsic status from Avail: {0:?}")]
	UnexpectedStatus(ExtrinsicStatus),
	#[error(transparent)]
	UnsupportedStatus(#[from] UnsupportedStatus),
}

/// Publishes block data to the DA chain.
#[async_trait]
pub trait DaSender: Send + Sync {
	/// Submits the block without waiting for it to be included. `Ok` only means the DA node
	/// accepted the extrinsic.
	async fn send(&mut self, block: &dyn BlockPayload) -> Result<(), SendError>;

	/// Submits the block and waits until the extrinsic reaches `status` or a stronger status.
	/// Only `Ready`, `InBlock` and `Finalized` can be waited for.
	async fn send_and_wait_for_status(
		&self,
		block: &dyn BlockPayload,
		status: ExtrinsicStatus,
	) -> Result<(), SendError>;
}

/// Drops every block, for when publishing to the DA chain is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlackholeSender;

#[async_trait]
impl DaSender for BlackholeSender {
	async fn send(&mut self, _block: &dyn BlockPayload) -> Result<(), SendError> {
		Ok(())
	}

	async fn send_and_wait_for_status(
		&self,
		_block: &dyn BlockPayload,
		_status: ExtrinsicStatus,
	) -> Result<(), SendError> {
		Ok(())
	}
}

pub struct AvailSender<RpcClient, Signer = PairSigner<sr25519::Pair>> {
	app_id: AppId,
	rpc_client: RpcClient,
	signer: Signer,
	nonce_state: NonceState,
}

impl<RpcClient: AvailRpcApi, Signer: ExtrinsicSigner> AvailSender<RpcClient, Signer> {
	pub fn new(rpc_client: RpcClient, app_id: AppId, signer: Signer) -> Self {
		Self { app_id, rpc_client, signer, nonce_state: NonceState::default() }
	}

	pub fn nonce_state(&self) -> &NonceState {
		&self.nonce_state
	}

	/// Without a `nonce_state` the remote account nonce is used as is.
	async fn build_signed_extrinsic(
		&self,
		block: &dyn BlockPayload,
		nonce_state: Option<&NonceState>,
	) -> Result<AvailUncheckedExtrinsic, SendError> {
		let metadata = self.rpc_client.metadata().await.map_err(SendError::Rpc)?;

		let data = encode_block(block)?;
		let (pallet_index, call_index) =
			metadata.call_index(SUBMIT_DATA_CALL).map_err(SendError::Call)?;

		let runtime_version = self.rpc_client.runtime_version().await.map_err(SendError::Rpc)?;

		let account_id = self.signer.account_id();
		let storage_key = metadata
			.storage_map_key(
				SYSTEM_PALLET,
				ACCOUNT_STORAGE_ENTRY,
				AsRef::<[u8]>::as_ref(account_id),
			)
			.map_err(|error| SendError::Rpc(RpcError::Metadata(error)))?;
		let account_info = self
			.rpc_client
			.account_info(storage_key)
			.await
			.map_err(SendError::Rpc)?
			.ok_or_else(|| SendError::AccountNotFound(account_id.clone()))?;

		let nonce = match nonce_state {
			Some(nonce_state) => nonce_state.resolve(&account_info),
			None => account_info.nonce,
		};

		Ok(AvailExtrinsicBuilder::new(
			AvailReplayProtection { nonce, genesis_hash: self.rpc_client.genesis_hash() },
			SubmitDataCall { pallet_index, call_index, data },
			self.app_id,
		)
		.build_and_sign(&runtime_version, &self.signer)?)
	}
}

async fn wait_for_inclusion(
	subscription: &mut StatusSubscription,
	target: InclusionLevel,
) -> Result<ExtrinsicStatus, SendError> {
	loop {
		let state = tokio::select! {
			Some(status) = subscription.statuses.recv() => {
				debug!(?status, ?target, "Observed extrinsic status");
				target.on_status(status)
			},
			Some(error) = subscription.errors.recv() => WaitState::TransportError(error),
			else => WaitState::TransportError(RpcError::SubscriptionClosed),
		};

		match state {
			WaitState::Waiting => continue,
			WaitState::Satisfied(status) => return Ok(status),
			WaitState::Rejected(status) => return Err(SendError::UnexpectedStatus(status)),
			WaitState::TransportError(error) => return Err(SendError::Subscription(error)),
		}
	}
}

#[async_trait]
impl<RpcClient: AvailRpcApi, Signer: ExtrinsicSigner> DaSender for AvailSender<RpcClient, Signer> {
	async fn send(&mut self, block: &dyn BlockPayload) -> Result<(), SendError> {
		let extrinsic = self.build_signed_extrinsic(block, Some(&self.nonce_state)).await?;
		let nonce = extrinsic.extra.nonce();

		let mut nonce_state = self.nonce_state.clone();
		nonce_state.advance_past(nonce)?;

		let tx_hash =
			self.rpc_client.submit_extrinsic(extrinsic).await.map_err(SendError::Submission)?;

		// Only a nonce the DA node accepted is considered used.
		self.nonce_state = nonce_state;

		debug!(nonce, ?tx_hash, "Submitted block data to Avail");
		Ok(())
	}

	async fn send_and_wait_for_status(
		&self,
		block: &dyn BlockPayload,
		status: ExtrinsicStatus,
	) -> Result<(), SendError> {
		let target = InclusionLevel::try_from(status)?;

		let extrinsic = self.build_signed_extrinsic(block, None).await?;
		let nonce = extrinsic.extra.nonce();
		let tx_hash = extrinsic.hash();

		let mut subscription = self
			.rpc_client
			.submit_and_watch_extrinsic(extrinsic)
			.await
			.map_err(SendError::Submission)?;
		debug!(nonce, ?tx_hash, ?target, "Submitted block data to Avail, watching its status");

		let result = wait_for_inclusion(&mut subscription, target).await;
		subscription.unsubscribe();

		let status = result?;
		info!(nonce, ?tx_hash, ?status, "Block data reached the requested status on Avail");
		Ok(())
	}
}
