use codec::{Decode, Encode};
use thiserror::Error;

use super::{AvailBalance, AvailIndex};

/// The value stored under `System.Account` on the DA chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct AccountInfo {
	pub nonce: AvailIndex,
	pub consumers: u32,
	pub providers: u32,
	pub sufficients: u32,
	pub data: AccountData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct AccountData {
	pub free: AvailBalance,
	pub reserved: AvailBalance,
	pub frozen: AvailBalance,
	pub flags: u128,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Nonce {0} is the last one the account can use")]
pub struct NonceExhausted(pub AvailIndex);

/// Locally cached nonce of the signing account.
///
/// The remote account info lags behind extrinsics that were submitted but are not yet included,
/// so the nonce used is the larger of the remote nonce and the next nonce we know we have not
/// used. Only one submission may be in flight against a given `NonceState` at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonceState {
	next_nonce: AvailIndex,
}

impl NonceState {
	pub fn new(next_nonce: AvailIndex) -> Self {
		Self { next_nonce }
	}

	pub fn next_nonce(&self) -> AvailIndex {
		self.next_nonce
	}

	pub fn resolve(&self, remote: &AccountInfo) -> AvailIndex {
		std::cmp::max(remote.nonce, self.next_nonce)
	}

	/// Record that `used` has been consumed. The cache never moves backwards, and fails without
	/// changing if `used` has no successor.
	pub fn advance_past(&mut self, used: AvailIndex) -> Result<(), NonceExhausted> {
		let after_used = used.checked_add(1).ok_or(NonceExhausted(used))?;
		self.next_nonce = std::cmp::max(self.next_nonce, after_used);
		Ok(())
	}
}
