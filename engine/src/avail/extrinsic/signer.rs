use sp_core::Pair;
use sp_runtime::{
	traits::{IdentifyAccount, Verify},
	MultiSignature,
};
use thiserror::Error;

use crate::avail::AvailAccountId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
	#[error("Invalid secret key: {0}")]
	InvalidSecret(String),
	#[error("Failed to sign extrinsic payload: {0}")]
	Signing(String),
}

/// Signs extrinsic payloads on behalf of a single account.
pub trait ExtrinsicSigner: Send + Sync {
	fn account_id(&self) -> &AvailAccountId;

	fn sign(&self, payload: &[u8]) -> Result<MultiSignature, SignerError>;
}

/// A wrapper around a substrate [`Pair`] that can be used for signing.
#[derive(Clone, Debug)]
pub struct PairSigner<P: Pair> {
	pub account_id: AvailAccountId,
	signer: P,
}

impl<P> PairSigner<P>
where
	MultiSignature: From<P::Signature>,
	<MultiSignature as Verify>::Signer: From<P::Public> + IdentifyAccount<AccountId = AvailAccountId>,
	P: Pair,
{
	/// Creates a new [`PairSigner`] from a [`Pair`].
	pub fn new(signer: P) -> Self {
		let account_id = <MultiSignature as Verify>::Signer::from(signer.public()).into_account();
		Self { account_id, signer }
	}

	/// Accepts anything [`Pair::from_string`] does: a mnemonic, a hex seed or a derivation path
	/// such as `//Alice`.
	pub fn from_secret_uri(secret_uri: &str) -> Result<Self, SignerError> {
		P::from_string(secret_uri, None)
			.map(Self::new)
			.map_err(|error| SignerError::InvalidSecret(format!("{error:?}")))
	}
}

impl<P> ExtrinsicSigner for PairSigner<P>
where
	MultiSignature: From<P::Signature>,
	<MultiSignature as Verify>::Signer: From<P::Public> + IdentifyAccount<AccountId = AvailAccountId>,
	P: Pair,
{
	fn account_id(&self) -> &AvailAccountId {
		&self.account_id
	}

	fn sign(&self, payload: &[u8]) -> Result<MultiSignature, SignerError> {
		Ok(self.signer.sign(payload).into())
	}
}
