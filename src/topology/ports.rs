//! Port allocation scheme.
//!
//! Orderers, peers and storage backends occupy three disjoint port families.
//! Orderers use a stride of 100 from 7050, peers a stride of 10 from 7051 with
//! their event port two above, and storage backends a flat +1 per peer from
//! the configured host port. Container-side ports are the same for every
//! instance; containers are told apart by name.

pub const ORDERER_BASE_PORT: u16 = 7050;
pub const ORDERER_CONTAINER_PORT: u16 = 7050;
pub const ORDERER_STRIDE: u16 = 100;

pub const PEER_BASE_PORT: u16 = 7051;
pub const PEER_CONTAINER_PORT: u16 = 7051;
pub const EVENT_BASE_PORT: u16 = 7053;
pub const EVENT_CONTAINER_PORT: u16 = 7053;
pub const PEER_STRIDE: u16 = 10;

pub const MAX_PORT: u16 = u16::MAX;

/// External port of orderer `index` (0-based)
pub fn orderer_port(index: u32) -> u32 {
    ORDERER_BASE_PORT as u32 + ORDERER_STRIDE as u32 * index
}

/// External peer port for global peer offset `offset` (organization-major)
pub fn peer_port(offset: u32) -> u32 {
    PEER_BASE_PORT as u32 + PEER_STRIDE as u32 * offset
}

/// External event-stream port for global peer offset `offset`
pub fn event_port(offset: u32) -> u32 {
    EVENT_BASE_PORT as u32 + PEER_STRIDE as u32 * offset
}

/// External storage port for global peer offset `offset`
pub fn storage_port(host_port: u16, offset: u32) -> u32 {
    host_port as u32 + offset
}
