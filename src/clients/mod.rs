pub mod gateway;
pub mod traits;

pub use gateway::GatewayClient;
pub use traits::ChatClient;
