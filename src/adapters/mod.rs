// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod rest;

pub use rest::RestBackend;
