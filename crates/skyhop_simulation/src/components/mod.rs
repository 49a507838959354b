//! ECS компоненты симуляции
//!
//! - actor: ActorState (kinematic состояние), Controls (input snapshot)
//!
//! Платформы не компоненты: они живут упорядоченным списком в
//! `physics::PlatformSet` (порядок важен для tie-break коллизий).

pub mod actor;

pub use actor::*;
