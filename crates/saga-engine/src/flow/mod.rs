//! Sub-flow resolvers.
//!
//! Each module adds the operations of one slide kind to [`Engine`](crate::Engine):
//! the quest stepper inside a `quest` side-path, the choice, quiz and ending
//! resolvers, and the fixed customer mini-flow.

pub(crate) mod choice;
pub(crate) mod customer;
pub(crate) mod ending;
pub(crate) mod quest;
pub(crate) mod quiz;
