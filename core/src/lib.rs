// Copyright (c) 2026 Lanwarden Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

pub mod control;
pub mod directory;
pub mod engine;
pub mod link;
pub mod network;
pub mod schedule;
pub mod system;
