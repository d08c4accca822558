//! Leaderboard display data.
//!
//! Peer standings come from an external feed and are shown as given; they
//! are never merged into, or ranked against, the local ledger.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One participant's standing as reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub name: String,
    pub coins: u64,
}

/// Read-only source of peer standings.
pub trait LeaderboardFeed: Send + Sync {
    /// Peers in display order.
    fn peers(&self) -> Result<Vec<Peer>>;
}

/// Feed backed by a fixed list, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    peers: Vec<Peer>,
}

impl StaticFeed {
    pub fn new(peers: Vec<Peer>) -> Self {
        Self { peers }
    }
}

impl LeaderboardFeed for StaticFeed {
    fn peers(&self) -> Result<Vec<Peer>> {
        Ok(self.peers.clone())
    }
}

/// The logged-in participant's own line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub account_id: String,
    pub display_name: String,
    pub coins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedPeer {
    /// 1-based position in feed order
    pub position: usize,
    pub name: String,
    pub coins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub you: Standing,
    pub peers: Vec<PositionedPeer>,
}

impl Leaderboard {
    pub fn new(you: Standing, peers: Vec<Peer>) -> Self {
        let peers = peers
            .into_iter()
            .enumerate()
            .map(|(idx, peer)| PositionedPeer {
                position: idx + 1,
                name: peer.name,
                coins: peer.coins,
            })
            .collect();
        Self { you, peers }
    }
}
