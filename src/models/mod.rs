// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models shared by the server and the client.

pub mod history;
pub mod user;

pub use history::{HistoryEntry, HistoryRecord, OptimizeRequest, OptimizeResponse};
pub use user::{Credentials, LoginResponse, MessageResponse, User, UserProfile};
