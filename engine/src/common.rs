use std::path::Path;

use anyhow::Context;
use sp_core::sr25519;

use crate::avail::extrinsic::signer::PairSigner;

/// Reads a file holding a single secret, stripping surrounding whitespace and quotes before
/// handing it to `t`.
pub fn read_clean_secret_file<V, T: FnOnce(&str) -> Result<V, anyhow::Error>>(
	file: &Path,
	context: &str,
	t: T,
) -> Result<V, anyhow::Error> {
	std::fs::read_to_string(file)
		.map_err(anyhow::Error::new)
		.with_context(|| format!("Failed to read {} file at {}", context, file.display()))
		.and_then(|string| t(string.trim().trim_matches(['"', '\''].as_ref())))
		.with_context(|| format!("Failed to decode {} file at {}", context, file.display()))
}

/// Loads the sr25519 signer from a file holding a secret URI: a mnemonic, a hex seed or a
/// derivation path such as `//Alice`.
pub fn load_signer(signing_key_file: &Path) -> anyhow::Result<PairSigner<sr25519::Pair>> {
	read_clean_secret_file(signing_key_file, "Signing Key", |secret_uri| {
		Ok(PairSigner::<sr25519::Pair>::from_secret_uri(secret_uri)?)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::with_file;

	#[test]
	fn strips_whitespace_and_quotes() {
		with_file(b"   \"\'\'\"secret\"\'  \n", |file_path| {
			assert_eq!(
				read_clean_secret_file(file_path, "TEST", |str| Ok(str.to_string())).unwrap(),
				"secret".to_string()
			);
		});
	}

	#[test]
	fn inner_characters_are_kept() {
		with_file(b"   h\" \'ex  ", |file_path| {
			assert_eq!(
				read_clean_secret_file(file_path, "TEST", |str| Ok(str.to_string())).unwrap(),
				"h\" \'ex".to_string()
			);
		});
	}

	#[test]
	fn loads_signer_from_secret_uri() {
		with_file(b"\"//Alice\"\n", |file_path| {
			assert_eq!(
				load_signer(file_path).unwrap().account_id,
				PairSigner::<sr25519::Pair>::from_secret_uri("//Alice").unwrap().account_id
			);
		});
	}

	#[test]
	fn missing_or_invalid_key_file_fails() {
		assert!(load_signer(Path::new("/definitely/not/a/key/file")).is_err());

		with_file(b"not a valid secret", |file_path| {
			assert!(load_signer(file_path).is_err());
		});
	}
}
