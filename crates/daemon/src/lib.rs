// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! aw-daemon: hosts the audit pipeline behind a control socket

pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use lifecycle::{startup, Config, DaemonState, LifecycleError};
pub use protocol::{ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
