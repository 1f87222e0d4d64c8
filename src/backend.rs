//! ChainBackend: the one seam between commands and the chain.
//!
//! Commands and the deployment tracker only need three things from the
//! network: who is signing, how tall the chain is, and a way to get a batch
//! of messages committed. `AkashClient` implements this over layer-climb;
//! tests implement it in memory.

use crate::error::DeployError;
use crate::msg::ChainMsg;
use crate::types::{TxMsg, TxResult};
use std::future::Future;

pub trait ChainBackend: Send + Sync {
    /// Bech32 address of the signing account.
    fn address(&self) -> String;

    /// Latest committed block height.
    fn block_height(&self) -> impl Future<Output = Result<u64, DeployError>> + Send;

    /// Sign and broadcast `msgs` as one transaction, waiting for commit.
    ///
    /// A transaction the chain rejects comes back as
    /// `DeployError::Transaction`. Nothing is retried.
    fn send_msgs(
        &self,
        msgs: Vec<TxMsg>,
    ) -> impl Future<Output = Result<TxResult, DeployError>> + Send;

    /// Validate and pack a single message, then send it. Validation
    /// failures return before anything touches the network.
    fn send<M: ChainMsg>(
        &self,
        msg: &M,
    ) -> impl Future<Output = Result<TxResult, DeployError>> + Send {
        let packed = msg.to_tx_msg();
        async move { self.send_msgs(vec![packed?]).await }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockChain;
    use super::*;
    use crate::deployment::DeploymentData;

    const OWNER: &str = "akash1qyqszqgpqyqszqgpqyqszqgpqyqszqgpjnp7du";

    #[tokio::test]
    async fn test_send_validates_before_broadcast() {
        let chain = MockChain::new(OWNER, 10);
        // dseq 0 fails ValidateBasic
        let tracker = DeploymentData::for_owner(OWNER);
        let err = chain.send(&tracker.msg_close()).await.unwrap_err();
        assert!(matches!(err, DeployError::Validation(_)));
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_packs_type_url() {
        let chain = MockChain::new(OWNER, 10);
        let tracker = DeploymentData::for_owner(OWNER).with_dseq(7);
        let res = chain.send(&tracker.msg_close()).await.unwrap();
        assert!(res.is_success());

        let sent = chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0].type_url, "/akash.deployment.v1beta4.MsgCloseDeployment");
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let mut chain = MockChain::new(OWNER, 10);
        chain.reject_with = Some((11, "out of gas".to_string()));
        let tracker = DeploymentData::for_owner(OWNER).with_dseq(7);

        let err = chain.send(&tracker.msg_close()).await.unwrap_err();
        match err {
            DeployError::Transaction { code, log } => {
                assert_eq!(code, 11);
                assert_eq!(log, "out of gas");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(chain.sent().len(), 1);
    }
}
