use std::{collections::BTreeMap, io::Write, path::Path};

use codec::Encode;
use frame_metadata::{
	v14::{
		ExtrinsicMetadata, PalletCallMetadata, PalletMetadata, PalletStorageMetadata,
		RuntimeMetadataV14, StorageEntryMetadata, StorageEntryModifier, StorageEntryType,
		StorageHasher,
	},
	RuntimeMetadataPrefixed,
};
use scale_info::{meta_type, TypeInfo};
use sp_version::RuntimeVersion;

use crate::avail::metadata::{CallInfo, Metadata, PalletInfo, StorageInfo};

pub const DATA_AVAILABILITY_PALLET_INDEX: u8 = 29;
pub const SUBMIT_DATA_CALL_INDEX: u8 = 1;

pub fn with_file<C: FnOnce(&Path)>(text: &[u8], closure: C) {
	let mut tempfile = tempfile::NamedTempFile::new().unwrap();
	tempfile.write_all(text).unwrap();
	closure(tempfile.path());
}

pub fn avail_runtime_version() -> RuntimeVersion {
	RuntimeVersion { spec_version: 36, transaction_version: 1, ..Default::default() }
}

/// The parts of the Avail runtime metadata the sender uses.
pub fn avail_metadata() -> Metadata {
	Metadata::from_pallets([
		(
			"System".to_string(),
			PalletInfo {
				index: 0,
				calls: BTreeMap::from([("remark".to_string(), CallInfo { index: 0, arity: 1 })]),
				storage: Some(StorageInfo {
					prefix: "System".to_string(),
					entries: BTreeMap::from([
						("Account".to_string(), vec![StorageHasher::Blake2_128Concat]),
						("Number".to_string(), vec![]),
					]),
				}),
			},
		),
		(
			"DataAvailability".to_string(),
			PalletInfo {
				index: DATA_AVAILABILITY_PALLET_INDEX,
				calls: BTreeMap::from([
					("create_application_key".to_string(), CallInfo { index: 0, arity: 1 }),
					(
						"submit_data".to_string(),
						CallInfo { index: SUBMIT_DATA_CALL_INDEX, arity: 1 },
					),
				]),
				storage: None,
			},
		),
	])
}

#[allow(non_camel_case_types, dead_code)]
#[derive(TypeInfo)]
enum DataAvailabilityCall {
	#[codec(index = 0)]
	create_application_key { key: Vec<u8> },
	#[codec(index = 1)]
	submit_data { data: Vec<u8> },
	#[codec(index = 3)]
	submit_block_length_proposal { rows: u32, cols: u32 },
}

#[allow(non_camel_case_types, dead_code)]
#[derive(TypeInfo)]
enum SystemCall {
	#[codec(index = 0)]
	remark { remark: Vec<u8> },
}

/// SCALE encoded V14 metadata equivalent to [`avail_metadata`], plus a call taking two
/// arguments, as returned by `state_getMetadata`.
pub fn encoded_v14_metadata() -> Vec<u8> {
	let pallets = vec![
		PalletMetadata {
			name: "System",
			storage: Some(PalletStorageMetadata {
				prefix: "System",
				entries: vec![
					StorageEntryMetadata {
						name: "Account",
						modifier: StorageEntryModifier::Default,
						ty: StorageEntryType::Map {
							hashers: vec![StorageHasher::Blake2_128Concat],
							key: meta_type::<[u8; 32]>(),
							value: meta_type::<u32>(),
						},
						default: vec![],
						docs: vec![],
					},
					StorageEntryMetadata {
						name: "Number",
						modifier: StorageEntryModifier::Default,
						ty: StorageEntryType::Plain(meta_type::<u32>()),
						default: vec![],
						docs: vec![],
					},
				],
			}),
			calls: Some(PalletCallMetadata { ty: meta_type::<SystemCall>() }),
			event: None,
			constants: vec![],
			error: None,
			index: 0,
		},
		PalletMetadata {
			name: "DataAvailability",
			storage: None,
			calls: Some(PalletCallMetadata { ty: meta_type::<DataAvailabilityCall>() }),
			event: None,
			constants: vec![],
			error: None,
			index: DATA_AVAILABILITY_PALLET_INDEX,
		},
	];

	RuntimeMetadataPrefixed::from(RuntimeMetadataV14::new(
		pallets,
		ExtrinsicMetadata { ty: meta_type::<()>(), version: 4, signed_extensions: vec![] },
		meta_type::<()>(),
	))
	.encode()
}
