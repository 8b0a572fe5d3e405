//! Discrete tick combat simulation.

pub mod character;
pub mod engine;
pub mod error;
pub mod queue;

pub use character::{Character, EffectResult, Ranks, ResultKind, Shield, MIN_STATUS_TICKS};
pub use engine::{Action, Simulation, SimulationConfig, SimulationResult, TickEvent, TraceMode};
pub use error::{Fault, Phase, SimulationError};
pub use queue::{
    seconds_to_ticks, ActionEffect, DotKey, DotState, EffectQueue, PendingEffect, QueueComponent, Resolved,
    ResolvedComponent, TICK_RATE,
};
