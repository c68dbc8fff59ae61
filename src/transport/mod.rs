//! Aggregator stream transport.
//!
//! One persistent TCP connection carries newline-delimited JSON messages to
//! the aggregator. `StreamClient` owns the connection lifecycle; everything
//! else hands it messages and never touches the socket.

mod client;

pub use client::{Connect, ConnectionState, StreamClient, StreamStats, TcpConnector};
