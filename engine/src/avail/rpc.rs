use async_trait::async_trait;
use codec::{Decode, Encode};
use futures::StreamExt;
use jsonrpsee::{
	core::{
		client::{ClientT, Subscription, SubscriptionClientT},
		ClientError,
	},
	ws_client::{WsClient, WsClientBuilder},
};
use sc_rpc_api::{author::AuthorApiClient, chain::ChainApiClient, state::StateApiClient};
use sc_transaction_pool_api::TransactionStatus;
use sp_core::{
	storage::{StorageData, StorageKey},
	Bytes,
};
use sp_rpc::{list::ListOrValue, number::NumberOrHex};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use super::{
	extrinsic::AvailUncheckedExtrinsic,
	metadata::{Metadata, MetadataError},
	nonce::AccountInfo,
	status::ExtrinsicStatus,
	AvailBlockNumber, AvailHash, AvailHeader, AvailSignedBlock, RuntimeVersion,
};

#[derive(Error, Debug)]
pub enum RpcError {
	#[error(transparent)]
	Client(#[from] ClientError),
	#[error("Failed to decode {what}: {error}")]
	Decode { what: &'static str, error: codec::Error },
	#[error(transparent)]
	Metadata(#[from] MetadataError),
	#[error("The DA chain did not return a genesis block hash")]
	MissingGenesisHash,
	#[error("Extrinsic status subscription was closed by the DA chain")]
	SubscriptionClosed,
}

pub trait RawRpcApi:
	ClientT
	+ SubscriptionClientT
	+ StateApiClient<AvailHash>
	+ AuthorApiClient<AvailHash, AvailHash>
	+ ChainApiClient<AvailBlockNumber, AvailHash, AvailHeader, AvailSignedBlock>
{
}

impl<
		T: ClientT
			+ SubscriptionClientT
			+ StateApiClient<AvailHash>
			+ AuthorApiClient<AvailHash, AvailHash>
			+ ChainApiClient<AvailBlockNumber, AvailHash, AvailHeader, AvailSignedBlock>,
	> RawRpcApi for T
{
}

/// Status updates of one watched extrinsic, delivered on two independent channels.
///
/// The subscription is released when [`StatusSubscription::unsubscribe`] is called or when the
/// value is dropped, whichever happens first.
#[derive(Debug)]
pub struct StatusSubscription {
	pub statuses: mpsc::UnboundedReceiver<ExtrinsicStatus>,
	pub errors: mpsc::UnboundedReceiver<RpcError>,
	unsubscribe: Option<oneshot::Sender<()>>,
}

impl StatusSubscription {
	pub fn new(
		statuses: mpsc::UnboundedReceiver<ExtrinsicStatus>,
		errors: mpsc::UnboundedReceiver<RpcError>,
		unsubscribe: oneshot::Sender<()>,
	) -> Self {
		Self { statuses, errors, unsubscribe: Some(unsubscribe) }
	}

	pub fn unsubscribe(&mut self) {
		if let Some(unsubscribe) = self.unsubscribe.take() {
			// The receiving side is gone if the subscription already ended.
			let _ = unsubscribe.send(());
		}
	}
}

impl Drop for StatusSubscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

/// The RPC surface of the DA chain that the sender relies on. Every error is returned as is,
/// nothing is retried or cached across calls apart from the genesis hash.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AvailRpcApi: Send + Sync {
	fn genesis_hash(&self) -> AvailHash;

	async fn metadata(&self) -> Result<Metadata, RpcError>;

	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError>;

	async fn account_info(&self, storage_key: StorageKey)
		-> Result<Option<AccountInfo>, RpcError>;

	async fn submit_extrinsic(
		&self,
		extrinsic: AvailUncheckedExtrinsic,
	) -> Result<AvailHash, RpcError>;

	async fn submit_and_watch_extrinsic(
		&self,
		extrinsic: AvailUncheckedExtrinsic,
	) -> Result<StatusSubscription, RpcError>;
}

pub struct AvailRpcClient<RawRpcClient = WsClient> {
	raw_rpc_client: RawRpcClient,
	genesis_hash: AvailHash,
}

impl AvailRpcClient<WsClient> {
	pub async fn connect(ws_endpoint: &str) -> Result<Self, RpcError> {
		debug!(ws_endpoint, "Connecting to the Avail node");
		Self::new(WsClientBuilder::default().build(ws_endpoint).await?).await
	}
}

impl<RawRpcClient: RawRpcApi + Send + Sync> AvailRpcClient<RawRpcClient> {
	pub async fn new(raw_rpc_client: RawRpcClient) -> Result<Self, RpcError> {
		let genesis_hash = match raw_rpc_client
			.block_hash(Some(ListOrValue::Value(NumberOrHex::Number(0))))
			.await?
		{
			ListOrValue::Value(Some(genesis_hash)) => genesis_hash,
			_ => return Err(RpcError::MissingGenesisHash),
		};

		debug!(?genesis_hash, "Connected to the Avail node");

		Ok(Self { raw_rpc_client, genesis_hash })
	}
}

async fn forward_statuses(
	mut subscription: Subscription<TransactionStatus<AvailHash, AvailHash>>,
	status_sender: mpsc::UnboundedSender<ExtrinsicStatus>,
	error_sender: mpsc::UnboundedSender<RpcError>,
	mut unsubscribe: oneshot::Receiver<()>,
) {
	loop {
		tokio::select! {
			_ = &mut unsubscribe => break,
			next = subscription.next() => match next {
				Some(Ok(status)) => {
					debug!(?status, "Extrinsic status update from Avail");
					if status_sender.send(ExtrinsicStatus::from(&status)).is_err() {
						break
					}
				},
				Some(Err(error)) => {
					let _ = error_sender.send(RpcError::Client(ClientError::ParseError(error)));
					break
				},
				None => break,
			},
		}
	}

	if let Err(error) = subscription.unsubscribe().await {
		warn!(%error, "Failed to unwatch extrinsic");
	}
}

#[async_trait]
impl<RawRpcClient: RawRpcApi + Send + Sync> AvailRpcApi for AvailRpcClient<RawRpcClient> {
	fn genesis_hash(&self) -> AvailHash {
		self.genesis_hash
	}

	async fn metadata(&self) -> Result<Metadata, RpcError> {
		let bytes = self.raw_rpc_client.metadata(None).await?;
		Ok(Metadata::decode(&bytes)?)
	}

	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError> {
		Ok(self.raw_rpc_client.runtime_version(None).await?)
	}

	async fn account_info(
		&self,
		storage_key: StorageKey,
	) -> Result<Option<AccountInfo>, RpcError> {
		self.raw_rpc_client
			.storage(storage_key, None)
			.await?
			.map(|StorageData(data)| {
				AccountInfo::decode(&mut &data[..])
					.map_err(|error| RpcError::Decode { what: "account info", error })
			})
			.transpose()
	}

	async fn submit_extrinsic(
		&self,
		extrinsic: AvailUncheckedExtrinsic,
	) -> Result<AvailHash, RpcError> {
		Ok(self.raw_rpc_client.submit_extrinsic(Bytes::from(extrinsic.encode())).await?)
	}

	async fn submit_and_watch_extrinsic(
		&self,
		extrinsic: AvailUncheckedExtrinsic,
	) -> Result<StatusSubscription, RpcError> {
		let subscription =
			self.raw_rpc_client.watch_extrinsic(Bytes::from(extrinsic.encode())).await?;

		let (status_sender, statuses) = mpsc::unbounded_channel();
		let (error_sender, errors) = mpsc::unbounded_channel();
		let (unsubscribe_sender, unsubscribe_receiver) = oneshot::channel();

		tokio::spawn(forward_statuses(
			subscription,
			status_sender,
			error_sender,
			unsubscribe_receiver,
		));

		Ok(StatusSubscription::new(statuses, errors, unsubscribe_sender))
	}
}
