pub mod signer;

use codec::{Decode, Encode};
use sp_core::blake2_256;
use sp_runtime::{generic::Era, MultiAddress, MultiSignature};

use crate::constants::{
	EXTRINSIC_FORMAT_VERSION, MAX_UNHASHED_SIGNATURE_PAYLOAD_LENGTH, SIGNED_EXTRINSIC_BIT, TIP,
};

use sp_version::RuntimeVersion;

use super::{AppId, AvailAccountId, AvailBalance, AvailHash, AvailIndex};
use signer::{ExtrinsicSigner, SignerError};

#[derive(Debug, Encode, Decode, Copy, Clone, Eq, PartialEq)]
pub struct AvailCheckMortality(pub Era);

#[derive(Debug, Encode, Decode, Copy, Clone, Eq, PartialEq)]
pub struct AvailCheckNonce(#[codec(compact)] pub AvailIndex);

#[derive(Debug, Encode, Decode, Copy, Clone, Eq, PartialEq)]
pub struct AvailChargeTransactionPayment(#[codec(compact)] pub AvailBalance);

#[derive(Debug, Encode, Decode, Copy, Clone, Eq, PartialEq)]
pub struct AvailCheckAppId(#[codec(compact)] pub AppId);

/// Signed extensions of the DA chain runtime, in runtime order: non-zero sender, spec version,
/// tx version, genesis, mortality, nonce, weight, payment and app id.
#[derive(Debug, Encode, Decode, Copy, Clone, Eq, PartialEq)]
pub struct AvailSignedExtra(
	pub  (
		(),
		(),
		(),
		(),
		AvailCheckMortality,
		AvailCheckNonce,
		(),
		AvailChargeTransactionPayment,
		AvailCheckAppId,
	),
);

impl AvailSignedExtra {
	pub fn nonce(&self) -> AvailIndex {
		self.0 .5 .0
	}

	pub fn app_id(&self) -> AppId {
		self.0 .8 .0
	}
}

/// `DataAvailability.submit_data`, with the indices taken from the runtime metadata.
#[derive(Debug, Encode, Decode, Clone, Eq, PartialEq)]
pub struct SubmitDataCall {
	pub pallet_index: u8,
	pub call_index: u8,
	pub data: Vec<u8>,
}

#[derive(Debug, Encode, Decode, Copy, Clone, Eq, PartialEq)]
pub struct AvailReplayProtection {
	pub nonce: AvailIndex,
	pub genesis_hash: AvailHash,
}

/// The builder for creating and signing Avail extrinsics, and creating the signature payload.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AvailExtrinsicBuilder {
	extrinsic_call: SubmitDataCall,
	replay_protection: AvailReplayProtection,
	app_id: AppId,
}

impl AvailExtrinsicBuilder {
	pub fn new(
		replay_protection: AvailReplayProtection,
		extrinsic_call: SubmitDataCall,
		app_id: AppId,
	) -> Self {
		Self { extrinsic_call, replay_protection, app_id }
	}

	fn extra(&self) -> AvailSignedExtra {
		AvailSignedExtra((
			(),
			(),
			(),
			(),
			AvailCheckMortality(Era::Immortal),
			AvailCheckNonce(self.replay_protection.nonce),
			(),
			AvailChargeTransactionPayment(TIP),
			AvailCheckAppId(self.app_id),
		))
	}

	/// The bytes the signer signs. Immortal extrinsics use the genesis hash as the era's
	/// checkpoint block.
	pub fn signature_payload(&self, runtime_version: &RuntimeVersion) -> Vec<u8> {
		let payload = (
			&self.extrinsic_call,
			self.extra(),
			(
				(),
				runtime_version.spec_version,
				runtime_version.transaction_version,
				self.replay_protection.genesis_hash,
				self.replay_protection.genesis_hash,
				(),
				(),
				(),
				(),
			),
		)
			.encode();

		if payload.len() > MAX_UNHASHED_SIGNATURE_PAYLOAD_LENGTH {
			blake2_256(&payload).to_vec()
		} else {
			payload
		}
	}

	pub fn build_and_sign(
		&self,
		runtime_version: &RuntimeVersion,
		signer: &dyn ExtrinsicSigner,
	) -> Result<AvailUncheckedExtrinsic, SignerError> {
		let signature = signer.sign(&self.signature_payload(runtime_version))?;

		Ok(AvailUncheckedExtrinsic {
			signer: signer.account_id().clone(),
			signature,
			extra: self.extra(),
			call: self.extrinsic_call.clone(),
		})
	}
}

/// A signed version 4 extrinsic carrying a `submit_data` call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AvailUncheckedExtrinsic {
	pub signer: AvailAccountId,
	pub signature: MultiSignature,
	pub extra: AvailSignedExtra,
	pub call: SubmitDataCall,
}

impl AvailUncheckedExtrinsic {
	pub fn hash(&self) -> AvailHash {
		AvailHash::from(blake2_256(&self.encode()))
	}
}

impl Encode for AvailUncheckedExtrinsic {
	fn encode(&self) -> Vec<u8> {
		let mut body = vec![EXTRINSIC_FORMAT_VERSION | SIGNED_EXTRINSIC_BIT];
		MultiAddress::<AvailAccountId, ()>::Id(self.signer.clone()).encode_to(&mut body);
		self.signature.encode_to(&mut body);
		self.extra.encode_to(&mut body);
		self.call.encode_to(&mut body);

		// Length prefixed, as an opaque byte vector.
		body.encode()
	}
}

impl Decode for AvailUncheckedExtrinsic {
	fn decode<I: codec::Input>(input: &mut I) -> Result<Self, codec::Error> {
		let body = Vec::<u8>::decode(input)?;
		let mut body = &body[..];

		if u8::decode(&mut body)? != EXTRINSIC_FORMAT_VERSION | SIGNED_EXTRINSIC_BIT {
			return Err("Not a signed version 4 extrinsic".into())
		}
		let MultiAddress::Id(signer) = MultiAddress::<AvailAccountId, ()>::decode(&mut body)?
		else {
			return Err("Extrinsic signer is not an account id".into())
		};
		let extrinsic = Self {
			signer,
			signature: MultiSignature::decode(&mut body)?,
			extra: AvailSignedExtra::decode(&mut body)?,
			call: SubmitDataCall::decode(&mut body)?,
		};

		if body.is_empty() {
			Ok(extrinsic)
		} else {
			Err("Trailing bytes after extrinsic".into())
		}
	}
}
