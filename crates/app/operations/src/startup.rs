//! Building the admission pipeline from a loaded configuration.

use tollgate_ante::{AnteHandler, HandlerOptions, Keepers};
use tollgate_tx::parse_chain_id;
use tracing::info;

use crate::config::NodeConfig;
use crate::errors::ConfigError;

/// Build the ante handler `config` describes over `keepers`.
///
/// # Errors
///
/// Returns `ValidationFailed` if the chain id does not parse or the policy
/// is rejected by the handler.
pub fn build_ante_handler(config: &NodeConfig, keepers: Keepers) -> Result<AnteHandler, ConfigError> {
    let chain_id = parse_chain_id(&config.chain.chain_id)
        .map_err(|err| ConfigError::ValidationFailed(vec![err.reason().to_string()]))?;
    let handler = AnteHandler::new(HandlerOptions::new(keepers, config.policy()))
        .map_err(|err| ConfigError::ValidationFailed(vec![err.reason().to_string()]))?;

    info!(
        chain_id = %config.chain.chain_id,
        eip155_chain_id = chain_id.eip155,
        evm_denom = %config.ante.evm_denom,
        allow_unprotected_txs = config.ante.allow_unprotected_txs,
        "ante handler ready"
    );
    Ok(handler)
}
