// ABOUTME: Root library module exposing the platform adapters
// ABOUTME: Re-exports the platform-agnostic modules from vanir-core

pub mod platform;

// Re-export platform-agnostic modules from vanir-core
pub use vanir_core::config;
pub use vanir_core::conversation;
pub use vanir_core::dispatch;
pub use vanir_core::draft;
pub use vanir_core::error;
pub use vanir_core::forms;
pub use vanir_core::paths;
pub use vanir_core::presence;
pub use vanir_core::provider;
pub use vanir_core::session;
pub use vanir_core::store;
pub use vanir_core::traits;
pub use vanir_core::utils;
