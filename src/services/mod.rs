pub mod agent_runtime;
pub mod mind;
pub mod scheduler;
pub mod sync_client;
pub mod void_store;
