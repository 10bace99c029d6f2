pub mod pkce;

mod client;

pub use client::{OpenRouterAuth, OpenRouterConfig, OpenRouterModel};
