//! Native wrapper transactions for the admission pipeline.
//!
//! A [`Tx`] carries an ordered list of [`Message`]s, each either a native
//! ledger message or an Ethereum transaction. The extension options in the
//! body decide which admission chain handles it:
//!
//! - [`ExtensionOption::EthereumTx`]: the Ethereum chain
//! - [`ExtensionOption::Web3Tx`]: the legacy EIP-712 chain
//! - none or [`ExtensionOption::DynamicFeeTx`]: the native chain
//!
//! Sign bytes for native signatures come from [`sign_doc`]; the typed-data
//! hash for EIP-712 wallets comes from [`eip712`].

pub mod chain_id;
pub mod eip712;
pub mod msgs;
pub mod options;
pub mod pubkey;
pub mod sign_doc;
pub mod tx;

pub use chain_id::{parse_chain_id, ChainId};
pub use msgs::{Authorization, Message, NativeMsg, Packet, PacketKind};
pub use options::{ExtensionOption, Web3TxOption};
pub use pubkey::PubKey;
pub use sign_doc::SignerData;
pub use tx::{AuthInfo, Fee, SignMode, SignerInfo, Tx, TxBody};
