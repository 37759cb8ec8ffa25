// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod optimizer;
pub mod password;

pub use optimizer::{Optimization, OptimizerClient};
pub use password::{hash_password, verify_password};
