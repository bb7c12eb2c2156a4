// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! aw-storage: segmented write-ahead log for audit records

mod codec;
mod log;
mod segment;

pub use codec::{JsonCodec, PayloadCodec, RawCodec};
pub use log::{read_after, DurableLog, LogOptions, Replay, WalError};
pub use segment::{
    list_segments, parse_segment_name, segment_name, summarize, Segment, SegmentSummary,
    SEGMENT_PREFIX,
};
