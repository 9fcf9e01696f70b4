use std::collections::BTreeMap;

use codec::Decode;
use frame_metadata::{
	v14::{StorageEntryType, StorageHasher},
	RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED,
};
use scale_info::{PortableRegistry, TypeDef};
use sp_core::{blake2_128, blake2_256, storage::StorageKey, twox_128, twox_256, twox_64};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
	#[error("Failed to decode runtime metadata: {0}")]
	Decode(#[source] codec::Error),
	#[error("Runtime metadata has an invalid magic number: {0:#x}")]
	InvalidMagic(u32),
	#[error("Runtime metadata version {0} is not supported, expected 14 or 15")]
	UnsupportedVersion(u32),
	#[error("Call name `{0}` is not of the form `Pallet.call`")]
	InvalidCallName(String),
	#[error("Pallet `{0}` is not in the runtime metadata")]
	UnknownPallet(String),
	#[error("Calls of pallet `{pallet}` are not described by an enum")]
	CallsNotAnEnum { pallet: String },
	#[error("Pallet `{pallet}` has no call `{call}`")]
	UnknownCall { pallet: String, call: String },
	#[error("Call `{call}` takes {arity} arguments, expected exactly one")]
	CallArity { call: String, arity: usize },
	#[error("Pallet `{pallet}` has no storage")]
	NoStorage { pallet: String },
	#[error("Pallet `{pallet}` has no storage entry `{entry}`")]
	UnknownStorageEntry { pallet: String, entry: String },
	#[error("Storage entry `{pallet}.{entry}` is not a map with a single key")]
	NotASingleKeyMap { pallet: String, entry: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
	pub index: u8,
	pub arity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
	pub prefix: String,
	/// Hashers of each storage entry. Plain values have none.
	pub entries: BTreeMap<String, Vec<StorageHasher>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalletInfo {
	pub index: u8,
	pub calls: BTreeMap<String, CallInfo>,
	pub storage: Option<StorageInfo>,
}

/// The subset of the DA chain's runtime metadata needed to build calls and storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
	pallets: BTreeMap<String, PalletInfo>,
}

fn call_variants(
	types: &PortableRegistry,
	pallet: &str,
	type_id: u32,
) -> Result<BTreeMap<String, CallInfo>, MetadataError> {
	match types.resolve(type_id).map(|ty| &ty.type_def) {
		Some(TypeDef::Variant(calls)) => Ok(calls
			.variants
			.iter()
			.map(|call| {
				(call.name.clone(), CallInfo { index: call.index, arity: call.fields.len() })
			})
			.collect()),
		_ => Err(MetadataError::CallsNotAnEnum { pallet: pallet.to_string() }),
	}
}

// V14 and V15 share their pallet layout but are distinct types.
macro_rules! pallets_from_metadata {
	($metadata:expr) => {{
		let metadata = $metadata;
		metadata
			.pallets
			.into_iter()
			.map(|pallet| -> Result<_, MetadataError> {
				let calls = match pallet.calls {
					Some(calls) => call_variants(&metadata.types, &pallet.name, calls.ty.id)?,
					None => BTreeMap::new(),
				};
				let storage = pallet.storage.map(|storage| StorageInfo {
					prefix: storage.prefix,
					entries: storage
						.entries
						.into_iter()
						.map(|entry| {
							(
								entry.name,
								match entry.ty {
									StorageEntryType::Plain(_) => vec![],
									StorageEntryType::Map { hashers, .. } => hashers,
								},
							)
						})
						.collect(),
				});
				Ok((pallet.name, PalletInfo { index: pallet.index, calls, storage }))
			})
			.collect::<Result<BTreeMap<_, _>, MetadataError>>()
	}};
}

impl Metadata {
	pub fn from_pallets(pallets: impl IntoIterator<Item = (String, PalletInfo)>) -> Self {
		Self { pallets: pallets.into_iter().collect() }
	}

	/// Decodes the SCALE encoded `RuntimeMetadataPrefixed` returned by `state_getMetadata`.
	pub fn decode(mut bytes: &[u8]) -> Result<Self, MetadataError> {
		let RuntimeMetadataPrefixed(magic, metadata) =
			RuntimeMetadataPrefixed::decode(&mut bytes).map_err(MetadataError::Decode)?;
		if magic != META_RESERVED {
			return Err(MetadataError::InvalidMagic(magic))
		}

		Ok(Self {
			pallets: match metadata {
				RuntimeMetadata::V14(metadata) => pallets_from_metadata!(metadata)?,
				RuntimeMetadata::V15(metadata) => pallets_from_metadata!(metadata)?,
				other => return Err(MetadataError::UnsupportedVersion(other.version())),
			},
		})
	}

	pub fn pallet(&self, name: &str) -> Result<&PalletInfo, MetadataError> {
		self.pallets.get(name).ok_or_else(|| MetadataError::UnknownPallet(name.to_string()))
	}

	/// Resolves a `Pallet.call` name to its pallet and call indices, checking that the call
	/// takes exactly one argument.
	pub fn call_index(&self, call_name: &str) -> Result<(u8, u8), MetadataError> {
		let (pallet_name, call) = call_name
			.split_once('.')
			.ok_or_else(|| MetadataError::InvalidCallName(call_name.to_string()))?;
		let pallet = self.pallet(pallet_name)?;
		let call_info = pallet.calls.get(call).ok_or_else(|| MetadataError::UnknownCall {
			pallet: pallet_name.to_string(),
			call: call.to_string(),
		})?;

		if call_info.arity != 1 {
			return Err(MetadataError::CallArity {
				call: call_name.to_string(),
				arity: call_info.arity,
			})
		}

		Ok((pallet.index, call_info.index))
	}

	/// The key of `key` in the single-key storage map `pallet.entry`.
	pub fn storage_map_key(
		&self,
		pallet_name: &str,
		entry: &str,
		key: &[u8],
	) -> Result<StorageKey, MetadataError> {
		let storage = self
			.pallet(pallet_name)?
			.storage
			.as_ref()
			.ok_or_else(|| MetadataError::NoStorage { pallet: pallet_name.to_string() })?;
		let hashers =
			storage.entries.get(entry).ok_or_else(|| MetadataError::UnknownStorageEntry {
				pallet: pallet_name.to_string(),
				entry: entry.to_string(),
			})?;

		match &hashers[..] {
			[hasher] => Ok(StorageKey(
				[
					&twox_128(storage.prefix.as_bytes())[..],
					&twox_128(entry.as_bytes())[..],
					&hash_storage_key(hasher, key)[..],
				]
				.concat(),
			)),
			_ => Err(MetadataError::NotASingleKeyMap {
				pallet: pallet_name.to_string(),
				entry: entry.to_string(),
			}),
		}
	}
}

pub fn hash_storage_key(hasher: &StorageHasher, key: &[u8]) -> Vec<u8> {
	match hasher {
		StorageHasher::Blake2_128 => blake2_128(key).to_vec(),
		StorageHasher::Blake2_256 => blake2_256(key).to_vec(),
		StorageHasher::Blake2_128Concat => [&blake2_128(key)[..], key].concat(),
		StorageHasher::Twox128 => twox_128(key).to_vec(),
		StorageHasher::Twox256 => twox_256(key).to_vec(),
		StorageHasher::Twox64Concat => [&twox_64(key)[..], key].concat(),
		StorageHasher::Identity => key.to_vec(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{
		avail_metadata, encoded_v14_metadata, DATA_AVAILABILITY_PALLET_INDEX,
		SUBMIT_DATA_CALL_INDEX,
	};

	#[test]
	fn decodes_v14_metadata() {
		let metadata = Metadata::decode(&encoded_v14_metadata()).unwrap();

		assert_eq!(
			metadata.call_index("DataAvailability.submit_data").unwrap(),
			(DATA_AVAILABILITY_PALLET_INDEX, SUBMIT_DATA_CALL_INDEX)
		);
		assert_eq!(metadata.call_index("System.remark").unwrap(), (0, 0));
		assert_eq!(
			metadata.pallet("System").unwrap().storage.as_ref().unwrap().entries["Number"],
			vec![]
		);
	}

	#[test]
	fn rejects_bad_magic() {
		let mut bytes = encoded_v14_metadata();
		bytes[0] ^= 0xff;

		assert!(matches!(Metadata::decode(&bytes), Err(MetadataError::InvalidMagic(_))));
		assert!(matches!(Metadata::decode(&[0x6d, 0x65]), Err(MetadataError::Decode(_))));
	}

	#[test]
	fn call_must_be_known_and_take_one_argument() {
		let metadata = Metadata::decode(&encoded_v14_metadata()).unwrap();

		assert!(matches!(
			metadata.call_index("DataAvailability.submit_block_length_proposal"),
			Err(MetadataError::CallArity { arity: 2, .. })
		));
		assert!(matches!(
			metadata.call_index("DataAvailability.submit_blob"),
			Err(MetadataError::UnknownCall { .. })
		));
		assert!(matches!(
			metadata.call_index("Balances.transfer"),
			Err(MetadataError::UnknownPallet(pallet)) if pallet == "Balances"
		));
		assert!(matches!(
			metadata.call_index("submit_data"),
			Err(MetadataError::InvalidCallName(_))
		));
	}

	#[test]
	fn account_storage_key() {
		let account = [7u8; 32];
		let key = avail_metadata().storage_map_key("System", "Account", &account).unwrap();

		// twox128("System") ++ twox128("Account")
		assert_eq!(
			&key.0[..32],
			&[
				0x26, 0xaa, 0x39, 0x4e, 0xea, 0x56, 0x30, 0xe0, 0x7c, 0x48, 0xae, 0x0c, 0x95, 0x58,
				0xce, 0xf7, 0xb9, 0x9d, 0x88, 0x0e, 0xc6, 0x81, 0x79, 0x9c, 0x0c, 0xf3, 0x0e, 0x88,
				0x86, 0x37, 0x1d, 0xa9,
			]
		);
		assert_eq!(&key.0[32..48], &blake2_128(&account));
		assert_eq!(&key.0[48..], &account);
	}

	#[test]
	fn storage_key_requires_single_key_map() {
		let metadata = Metadata::decode(&encoded_v14_metadata()).unwrap();

		assert!(matches!(
			metadata.storage_map_key("System", "Number", &[]),
			Err(MetadataError::NotASingleKeyMap { .. })
		));
		assert!(matches!(
			metadata.storage_map_key("System", "Events", &[]),
			Err(MetadataError::UnknownStorageEntry { .. })
		));
		assert!(matches!(
			metadata.storage_map_key("DataAvailability", "Account", &[]),
			Err(MetadataError::NoStorage { .. })
		));
	}

	#[test]
	fn concat_hashers_keep_the_key() {
		let key = b"key";

		assert_eq!(hash_storage_key(&StorageHasher::Identity, key), key.to_vec());
		assert_eq!(&hash_storage_key(&StorageHasher::Twox64Concat, key)[8..], key);
		assert_eq!(hash_storage_key(&StorageHasher::Twox256, key).len(), 32);
		assert_eq!(hash_storage_key(&StorageHasher::Blake2_256, key).len(), 32);
		assert_eq!(hash_storage_key(&StorageHasher::Blake2_128, key).len(), 16);
	}
}
