//! Upstream meme knowledge-base integration.

pub mod client;
pub mod types;

pub use client::{KymClient, MemeSource};
pub use types::{EntryTarget, KymError, MemeEntry, MemeSection, SectionContent};
