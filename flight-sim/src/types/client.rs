use std::net::SocketAddr;

use driver::RedisClient;

use crate::config::{Config, ROUTES_KEY};

use super::store::{FlightStore, StoreError};

/// Flight store backed by a hash on the key-value server.
///
/// Every flight is one field of the `routes` hash whose value is the JSON
/// document of the flight.
pub struct RedisStore {
    client: RedisClient,
    key: String,
}

impl RedisStore {
    /// Connects to the server named by `config` and checks it answers.
    pub fn connect(config: &Config) -> Result<Self, StoreError> {
        let client = RedisClient::connect_to(&config.host, config.port)?;
        Self::with_client(client)
    }

    /// Wraps an already connected client.
    pub fn with_client(mut client: RedisClient) -> Result<Self, StoreError> {
        client.ping()?;
        Ok(Self {
            client,
            key: ROUTES_KEY.to_string(),
        })
    }

    /// Uses another hash than `routes`, e.g. to keep test data apart.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.client.addr()
    }
}

impl FlightStore for RedisStore {
    fn get(&mut self, number: &str) -> Result<Option<String>, StoreError> {
        Ok(self.client.hget(&self.key, number)?)
    }

    fn get_all(&mut self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.client.hgetall(&self.key)?)
    }

    fn put(&mut self, number: &str, document: &str) -> Result<(), StoreError> {
        self.client.hset(&self.key, number, document)?;
        Ok(())
    }
}
