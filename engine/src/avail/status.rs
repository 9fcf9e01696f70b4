use sc_transaction_pool_api::TransactionStatus;
use thiserror::Error;

use super::AvailHash;

/// Lifecycle of a submitted extrinsic as reported by the DA chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExtrinsicStatus {
	Future,
	Ready,
	Broadcast,
	InBlock,
	Retracted,
	FinalityTimeout,
	Finalized,
	Usurped,
	Dropped,
	Invalid,
}

impl ExtrinsicStatus {
	/// Statuses after which the DA chain will never include the extrinsic.
	pub fn is_rejection(&self) -> bool {
		matches!(self, ExtrinsicStatus::Dropped | ExtrinsicStatus::Invalid)
	}
}

impl<BlockHash> From<&TransactionStatus<AvailHash, BlockHash>> for ExtrinsicStatus {
	fn from(status: &TransactionStatus<AvailHash, BlockHash>) -> Self {
		match status {
			TransactionStatus::Future => ExtrinsicStatus::Future,
			TransactionStatus::Ready => ExtrinsicStatus::Ready,
			TransactionStatus::Broadcast(_) => ExtrinsicStatus::Broadcast,
			TransactionStatus::InBlock(_) => ExtrinsicStatus::InBlock,
			TransactionStatus::Retracted(_) => ExtrinsicStatus::Retracted,
			TransactionStatus::FinalityTimeout(_) => ExtrinsicStatus::FinalityTimeout,
			TransactionStatus::Finalized(_) => ExtrinsicStatus::Finalized,
			TransactionStatus::Usurped(_) => ExtrinsicStatus::Usurped,
			TransactionStatus::Dropped => ExtrinsicStatus::Dropped,
			TransactionStatus::Invalid => ExtrinsicStatus::Invalid,
		}
	}
}

/// The statuses a caller may wait for, ordered by strength: `Ready < InBlock < Finalized`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InclusionLevel {
	Ready,
	InBlock,
	Finalized,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("Unsupported extrinsic status expectation: {0:?}")]
pub struct UnsupportedStatus(pub ExtrinsicStatus);

impl TryFrom<ExtrinsicStatus> for InclusionLevel {
	type Error = UnsupportedStatus;

	fn try_from(status: ExtrinsicStatus) -> Result<Self, Self::Error> {
		match status {
			ExtrinsicStatus::Ready => Ok(InclusionLevel::Ready),
			ExtrinsicStatus::InBlock => Ok(InclusionLevel::InBlock),
			ExtrinsicStatus::Finalized => Ok(InclusionLevel::Finalized),
			other => Err(UnsupportedStatus(other)),
		}
	}
}

impl From<InclusionLevel> for ExtrinsicStatus {
	fn from(level: InclusionLevel) -> Self {
		match level {
			InclusionLevel::Ready => ExtrinsicStatus::Ready,
			InclusionLevel::InBlock => ExtrinsicStatus::InBlock,
			InclusionLevel::Finalized => ExtrinsicStatus::Finalized,
		}
	}
}

impl InclusionLevel {
	/// True if observing `status` means the extrinsic has reached at least this level.
	pub fn is_satisfied_by(self, status: ExtrinsicStatus) -> bool {
		InclusionLevel::try_from(status).is_ok_and(|reached| reached >= self)
	}

	/// Advances a wait for this level by one observed status.
	pub fn on_status<E>(self, status: ExtrinsicStatus) -> WaitState<E> {
		if self.is_satisfied_by(status) {
			WaitState::Satisfied(status)
		} else if status.is_rejection() {
			WaitState::Rejected(status)
		} else {
			WaitState::Waiting
		}
	}
}

/// State of a wait on a status subscription. Every state except `Waiting` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitState<E> {
	Waiting,
	Satisfied(ExtrinsicStatus),
	Rejected(ExtrinsicStatus),
	TransportError(E),
}
