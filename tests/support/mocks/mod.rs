// tests/support/mocks/mod.rs
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod notification;
pub mod repos;
pub mod security;
pub mod time;

pub use notification::{CapturingNotifier, FailingNotifier, SentCode};
pub use repos::{
    CorruptRoleRepo, FailingRedemptionCodes, OrphanedUserLookup, UnavailableUserRepo,
    WithdrawableRoles,
};
pub use security::CountingHasher;
pub use time::{ManualClock, fixed_now};
