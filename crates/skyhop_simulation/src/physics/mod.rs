//! Physics simulation module
//!
//! Платформер: один (или несколько независимых) kinematic акторов против
//! небольшого упорядоченного набора static / kinematic платформ.
//! Не rigid-body движок: нет вращений, broad-phase, CCD.
//!
//! - config: PhysicsConfig (тюнинг), CollisionPolicy
//! - platforms: Platform, PlatformSet (advance kinematic)
//! - collision: resolver с tie-break по высоте
//! - integrator: `step`: один кадр актора
//! - systems: ECS системы + PlatformerPhysicsPlugin

pub mod collision;
pub mod config;
pub mod integrator;
pub mod platforms;
pub mod systems;


// Re-export основных типов
pub use collision::{find_landing, resolve, Landing};
pub use config::{CollisionPolicy, PhysicsConfig, CONTACT_EPSILON};
pub use integrator::step;
pub use platforms::{PathDirection, Platform, PlatformId, PlatformKind, PlatformSet};
pub use systems::{spawn_actor, PlatformProxy, PlatformerPhysicsPlugin, PlatformerPhysicsSet};
