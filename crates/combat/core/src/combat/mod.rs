//! Combat resolution: damage values, outcome classifiers, and the resolver.

pub mod damage;
pub mod element;
pub mod resolver;
pub mod result;

pub use damage::Damage;
pub use element::Element;
pub use resolver::{AttackerSnapshot, DefenderSnapshot, resolve, resolve_heal};
pub use result::{AttackResult, AttackVerdict};
