//! Services that combine the domain layer with AI providers.

pub mod roadmap;
