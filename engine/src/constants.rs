// ======= Avail runtime =======

/// The chain call used to publish a blob, in `Pallet.call` form.
pub const SUBMIT_DATA_CALL: &str = "DataAvailability.submit_data";

pub const SYSTEM_PALLET: &str = "System";

pub const ACCOUNT_STORAGE_ENTRY: &str = "Account";

/// The tip attached to every extrinsic we submit.
pub const TIP: u128 = 100;

/// Version 4 extrinsics, with the top bit set when the extrinsic is signed.
pub const EXTRINSIC_FORMAT_VERSION: u8 = 4;
pub const SIGNED_EXTRINSIC_BIT: u8 = 0b1000_0000;

/// Signature payloads longer than this are hashed with blake2-256 before signing.
pub const MAX_UNHASHED_SIGNATURE_PAYLOAD_LENGTH: usize = 256;

/// Upper bound the DA chain places on the data argument of `submit_data`.
pub const MAX_BLOB_DATA_LENGTH: usize = 512 * 1024;

// ======= Settings =======

pub const CONFIG_ROOT: &str = "AVAIL_DA_CONFIG_ROOT";
pub const DEFAULT_CONFIG_ROOT: &str = "/etc/avail-da/";
pub const SETTINGS_FILE: &str = "config/Settings.toml";

pub const AVAIL_WS_ENDPOINT: &str = "avail.ws_endpoint";
pub const AVAIL_SIGNING_KEY_FILE: &str = "avail.signing_key_file";
pub const AVAIL_APP_ID: &str = "avail.app_id";
pub const AVAIL_ENABLED: &str = "avail.enabled";

pub const DEFAULT_AVAIL_WS_ENDPOINT: &str = "ws://127.0.0.1:9944";
pub const DEFAULT_AVAIL_SIGNING_KEY_FILE: &str = "/etc/avail-da/keys/signing_key_file";
pub const DEFAULT_AVAIL_APP_ID: u32 = 0;
