pub mod void_api;
