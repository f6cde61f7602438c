// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only database operations.

pub mod activity;
pub mod approvals;
pub mod documents;
pub mod notifications;
pub mod orders;
pub mod users;
