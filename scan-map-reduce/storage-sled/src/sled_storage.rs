// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::{StorageError, StorageReader, Token, TokenRange};
use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const TOKEN_LEN: usize = 8;

/// Records keyed by `token ++ record id`, so that sled's key order is token
/// order and a token range maps to one contiguous key range.
pub struct SledStorage<R> {
    db: Arc<Db>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SledStorage<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> SledStorage<R>
where
    R: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(internal)?;
        debug!(path = %path.as_ref().display(), records = db.len(), "sled storage opened");
        Ok(Self::from_db(db))
    }

    /// A database removed from disk when the last handle is dropped.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open().map_err(internal)?;
        Ok(Self::from_db(db))
    }

    fn from_db(db: Db) -> Self {
        Self {
            db: Arc::new(db),
            _record: PhantomData,
        }
    }

    pub fn insert(&self, token: Token, record: &R) -> Result<(), StorageError> {
        let id = self.db.generate_id().map_err(internal)?;
        let value = bincode::serialize(record).map_err(|e| StorageError::Internal(e.to_string()))?;
        self.db.insert(encode_key(token, id), value).map_err(internal)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(internal)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl<R> StorageReader for SledStorage<R>
where
    R: Serialize + DeserializeOwned + Send + 'static,
{
    type Record = R;

    fn scan(
        &self,
        range: &TokenRange,
        on_record: &mut dyn FnMut(R) -> bool,
    ) -> Result<u64, StorageError> {
        let Some(first) = range.first_token() else {
            return Ok(0);
        };

        let mut delivered = 0u64;
        for entry in self.db.range(encode_token(first)..) {
            let (key, value) = entry.map_err(internal)?;
            if decode_token(&key)? > range.end() {
                break;
            }
            let record: R =
                bincode::deserialize(&value).map_err(|e| StorageError::Decode(e.to_string()))?;
            delivered += 1;
            if !on_record(record) {
                break;
            }
        }
        Ok(delivered)
    }
}

fn internal(e: sled::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

/// Flips the sign bit so that big-endian byte order matches signed order.
fn encode_token(token: Token) -> [u8; TOKEN_LEN] {
    ((token as u64) ^ (1 << 63)).to_be_bytes()
}

fn decode_token(key: &[u8]) -> Result<Token, StorageError> {
    let bytes: [u8; TOKEN_LEN] = key
        .get(..TOKEN_LEN)
        .and_then(|prefix| prefix.try_into().ok())
        .ok_or_else(|| StorageError::Decode(format!("key of {} bytes has no token", key.len())))?;
    Ok((u64::from_be_bytes(bytes) ^ (1 << 63)) as Token)
}

fn encode_key(token: Token, id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(TOKEN_LEN + 8);
    key.extend_from_slice(&encode_token(token));
    key.extend_from_slice(&id.to_be_bytes());
    key
}
