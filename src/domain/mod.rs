//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces and the click telemetry model independent
//! of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Durable store trait definitions
//! - [`click_event`] - Click context and queued payload model
//! - [`click_sampler`] - Per-request sampling decision
//! - [`reserved_paths`] - Path segments that never resolve as short codes
//!
//! # Click Processing Flow
//!
//! 1. The redirect middleware resolves a code and builds a [`click_event::ClickContext`]
//! 2. [`click_sampler::ClickSampler`] decides whether the hit is recorded in detail
//! 3. Sampled hits become a [`click_event::ClickPayload`] on the analytics queue
//! 4. The analytics sync persists payloads via [`repositories::ClickLogRepository`]

pub mod click_event;
pub mod click_sampler;
pub mod entities;
pub mod repositories;
pub mod reserved_paths;
