//! secp256k1 primitives shared by Ethereum and eth_secp256k1 native signatures.

mod recovery;

pub use recovery::{
    address_from_pubkey, address_from_sec1, compress_pubkey, parse_rsv_signature, recover_pubkey,
    recover_sender_from_signature_hash, verify_prehash, SIGNATURE_LENGTH,
};
