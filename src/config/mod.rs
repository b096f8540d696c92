pub mod schema;

pub use schema::{
    AuthConfig, Config, FetchConfig, GatewayConfig, ObservabilityConfig, ReaderConfig,
};
