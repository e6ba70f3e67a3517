//! `glowstat` renders live system telemetry as brightness patterns on a small set of
//! single-color LEDs, arranged as rotating rings and pulsing bar graphs.
//!
//! # Structure
//!
//! * [animation]: the sensor-to-light engine (quota allocator, circular field, ring and bar
//!   animators)
//! * [dispatcher]: routes every configured channel through its animator once per frame
//! * [readings]: reading sources and the shared previous/current snapshot
//! * [instance]: the polling and rendering tasks, and the LED devices frames are written to
//! * [models]: configuration
//!
//! # License
//!
//! This source code is released under the [MIT-License](https://opensource.org/licenses/MIT)

#[macro_use]
extern crate tracing;

pub mod animation;
pub mod dispatcher;
pub mod instance;
pub mod models;
pub mod readings;
