use codec::{Decode, Encode};
use thiserror::Error;

use crate::constants::MAX_BLOB_DATA_LENGTH;

/// Tags every blob we publish so downstream readers of the DA chain can tell our blobs apart from
/// other applications' data.
pub const BLOB_MAGIC: [u8; 4] = *b"AVSL";

/// Anything that can hand the DA layer its canonical serialized form. The DA layer never looks
/// inside the returned bytes.
pub trait BlockPayload: Send + Sync {
	fn payload_bytes(&self) -> Vec<u8>;
}

impl BlockPayload for [u8] {
	fn payload_bytes(&self) -> Vec<u8> {
		self.to_vec()
	}
}

impl BlockPayload for Vec<u8> {
	fn payload_bytes(&self) -> Vec<u8> {
		self.clone()
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
	#[error("Encoded blob is {length} bytes, the DA chain accepts at most {max} bytes")]
	TooLarge { length: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Blob {
	pub magic: [u8; 4],
	pub data: Vec<u8>,
}

impl Blob {
	pub fn new(block: &(impl BlockPayload + ?Sized)) -> Self {
		Self { magic: BLOB_MAGIC, data: block.payload_bytes() }
	}

	/// The canonical encoding of the blob, ready to be used as the data argument of the submit
	/// call.
	pub fn encode_for_submission(&self) -> Result<Vec<u8>, BlobError> {
		let encoded = self.encode();
		if encoded.len() > MAX_BLOB_DATA_LENGTH {
			Err(BlobError::TooLarge { length: encoded.len(), max: MAX_BLOB_DATA_LENGTH })
		} else {
			Ok(encoded)
		}
	}

	/// Decodes a blob read back from the DA chain. Returns `None` if the bytes are not a blob or
	/// were not published by us.
	pub fn decode_tagged(mut bytes: &[u8]) -> Option<Self> {
		Self::decode(&mut bytes)
			.ok()
			.filter(|blob| bytes.is_empty() && blob.magic == BLOB_MAGIC)
	}
}

pub fn encode_block(block: &(impl BlockPayload + ?Sized)) -> Result<Vec<u8>, BlobError> {
	Blob::new(block).encode_for_submission()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encoding_is_deterministic_and_tagged() {
		let block = b"some block bytes".to_vec();

		let first = encode_block(&block).unwrap();
		let second = encode_block(&block).unwrap();

		assert_eq!(first, second);
		assert_eq!(&first[..4], &BLOB_MAGIC);
		// Compact length prefix of the data, followed by the data itself.
		assert_eq!(first[4], (block.len() as u8) << 2);
		assert_eq!(&first[5..], &block[..]);
	}

	#[test]
	fn magic_does_not_depend_on_content() {
		for block in [vec![], vec![0u8; 1000], b"AVSL".to_vec()] {
			assert_eq!(&encode_block(&block).unwrap()[..4], &BLOB_MAGIC);
		}
	}

	#[test]
	fn oversized_blob_is_rejected() {
		let block = vec![1u8; MAX_BLOB_DATA_LENGTH];

		assert!(matches!(
			encode_block(&block),
			Err(BlobError::TooLarge { max: MAX_BLOB_DATA_LENGTH, .. })
		));
	}

	#[test]
	fn decode_tagged_only_accepts_our_blobs() {
		let encoded = encode_block(&b"payload"[..]).unwrap();
		assert_eq!(
			Blob::decode_tagged(&encoded),
			Some(Blob { magic: BLOB_MAGIC, data: b"payload".to_vec() })
		);

		let foreign = Blob { magic: *b"ELSE", data: b"payload".to_vec() }.encode();
		assert_eq!(Blob::decode_tagged(&foreign), None);

		let mut trailing = encoded.clone();
		trailing.push(0);
		assert_eq!(Blob::decode_tagged(&trailing), None);

		assert_eq!(Blob::decode_tagged(&encoded[..3]), None);
	}
}
