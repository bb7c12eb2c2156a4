// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload serialization for WAL lines

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::marker::PhantomData;

/// Turns payloads into single-line text and back.
///
/// The encoded form must not contain a newline; the log rejects any that do.
pub trait PayloadCodec: Send + Sync + 'static {
    type Payload;
    type Error: Error + Send + Sync + 'static;

    fn encode(&self, payload: &Self::Payload) -> Result<String, Self::Error>;
    fn decode(&self, line: &str) -> Result<Self::Payload, Self::Error>;
}

/// Compact JSON, one object per line
pub struct JsonCodec<P> {
    _payload: PhantomData<fn() -> P>,
}

impl<P> JsonCodec<P> {
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<P> Default for JsonCodec<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for JsonCodec<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<P> PayloadCodec for JsonCodec<P>
where
    P: Serialize + DeserializeOwned + 'static,
{
    type Payload = P;
    type Error = serde_json::Error;

    fn encode(&self, payload: &P) -> Result<String, serde_json::Error> {
        serde_json::to_string(payload)
    }

    fn decode(&self, line: &str) -> Result<P, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Passes payload text through untouched. Used for inspecting a folder
/// without knowing its payload type.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl PayloadCodec for RawCodec {
    type Payload = String;
    type Error = std::convert::Infallible;

    fn encode(&self, payload: &String) -> Result<String, Self::Error> {
        Ok(payload.clone())
    }

    fn decode(&self, line: &str) -> Result<String, Self::Error> {
        Ok(line.to_string())
    }
}
