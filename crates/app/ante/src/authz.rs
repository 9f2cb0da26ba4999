//! Blocks message types that must never run through an authz grant.

use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::msgs::{MSG_CREATE_VESTING_ACCOUNT_TYPE_URL, MSG_SEND_TYPE_URL};
use tollgate_tx::{Authorization, Message, NativeMsg, Tx};
use tollgate_tx_eth::MSG_ETHEREUM_TX_TYPE_URL;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};

/// Deepest `MsgExec` nesting accepted.
pub const MAX_NESTED_MSGS: usize = 7;

/// Rejects disabled message types when they are executed through `MsgExec`
/// or authorized through `MsgGrant`.
pub struct AuthzLimiter {
    disabled: Vec<String>,
}

impl AuthzLimiter {
    pub fn new(disabled: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            disabled: disabled.into_iter().map(Into::into).collect(),
        }
    }

    fn is_disabled(&self, type_url: &str) -> bool {
        self.disabled.iter().any(|d| d == type_url)
    }

    fn check_disabled(&self, msgs: &[Message], nested: usize) -> AnteResult<()> {
        if nested >= MAX_NESTED_MSGS {
            return Err(ante_err!(
                Unauthorized,
                "found more nested msgs than permited. Limit is : {MAX_NESTED_MSGS}"
            ));
        }
        for msg in msgs {
            match msg {
                Message::Native(NativeMsg::Exec { msgs: inner, .. }) => {
                    self.check_disabled(inner, nested + 1)?;
                }
                Message::Native(NativeMsg::Grant { authorization, .. }) => {
                    let url = match authorization {
                        Authorization::Generic { msg_type_url } => msg_type_url.as_str(),
                        Authorization::Send { .. } => MSG_SEND_TYPE_URL,
                    };
                    if self.is_disabled(url) {
                        return Err(ante_err!(Unauthorized, "found disabled msg type: {url}"));
                    }
                }
                other => {
                    if nested > 0 && self.is_disabled(other.type_url()) {
                        return Err(ante_err!(
                            Unauthorized,
                            "found disabled msg type: {}",
                            other.type_url()
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for AuthzLimiter {
    fn default() -> Self {
        Self::new([MSG_ETHEREUM_TX_TYPE_URL, MSG_CREATE_VESTING_ACCOUNT_TYPE_URL])
    }
}

impl AnteDecorator for AuthzLimiter {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        self.check_disabled(tx.messages(), 0)?;
        next.run(ctx, tx, simulate)
    }
}
