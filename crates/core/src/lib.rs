//! Domain logic for the NanoMerch mock-up studio.
//!
//! Holds the scenario catalog, prompt resolution, the generation session,
//! scenario recovery for storyboard seeding, the storyboard collection and
//! document export. Nothing here knows about HTTP; the API crate drives a
//! [`studio::Studio`] and the gateway crate implements
//! [`gateway::ImageGateway`].

pub mod catalog;
pub mod error;
pub mod export;
pub mod gateway;
pub mod media;
pub mod prompt;
pub mod recovery;
pub mod session;
pub mod storyboard;
pub mod studio;
pub mod types;
