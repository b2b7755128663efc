// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 The Ember Authors

//! Shared test infrastructure for integration tests.
//!
//! Provides [`TestVm`], a thin wrapper over [`ember::vm::Vm`] that gives
//! tests a stateful VM they can drive across multiple `interpret` calls,
//! mirroring the teacher's `tests/common/test_vm.rs`.

#![allow(unused_imports)]

pub mod test_vm;

pub use test_vm::TestVm;
