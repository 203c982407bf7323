use async_trait::async_trait;
use mir_status_types::{NodeId, NodeSnapshot};

use super::ApiResult;

/// Source of status polls.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// One snapshot per replica, in server order.
    async fn fetch_status(&self) -> ApiResult<Vec<NodeSnapshot>>;
}

/// Commands the dashboard can send to a replica.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Hand the node's pending actions to its application and clear them.
    async fn process(&self, node: NodeId) -> ApiResult<()>;

    /// Submit a client request through the node.
    async fn propose(&self, node: NodeId, payload: Vec<u8>) -> ApiResult<()>;

    /// Advance the node's logical clock by one tick.
    async fn tick(&self, node: NodeId) -> ApiResult<()>;
}
