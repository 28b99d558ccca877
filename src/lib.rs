// Telenode — periodic telemetry node core
//
// Sensor events are aggregated over a sliding reporting window, packed into
// a 9-byte frame and handed to the radio once it reports readiness.  All of
// it runs from one cooperative dispatch loop (`node::Node::poll`).

pub mod collaborators;
pub mod config;
pub mod console;
pub mod counters;
pub mod events;
pub mod frame;
pub mod ingest;
pub mod modem;
pub mod node;
pub mod orientation;
pub mod scheduler;
pub mod stat_buffer;
pub mod timer;

pub use collaborators::{Indicator, Sensors, Transport};
pub use config::{ClassifierConfig, ConfigError, NodeConfig};
pub use frame::{Frame, FrameFields};
pub use node::Node;
