//! ragchat gateway: axum server exposing the streaming chat route over a
//! conversational retrieval chain.

pub mod config;
pub mod gateway;
pub mod relay;
pub mod route;
pub mod utils;

pub use config::{ConfigError, GatewayConfig, VectorStoreConfig};
pub use gateway::{
    Gateway,
    builder::{ConfiguredGateway, build_gateway},
    serve::{ServeHandle, serve, serve_gateway, serve_with_config},
};
pub use relay::{RelayError, RelayState, relay};
pub use route::{ApiError, router};
