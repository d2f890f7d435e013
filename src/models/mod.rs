// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod notification;
pub mod profile;
pub mod resort;
pub mod ski_day;
pub mod stats;

pub use notification::{Notification, NotificationType};
pub use profile::Profile;
pub use resort::{ResortRecord, ResortStatus};
pub use ski_day::{SkiDayRecord, SkiType};
pub use stats::{AggregateStats, PersonalStats, VisitedResort};
