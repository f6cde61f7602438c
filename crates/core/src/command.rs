// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use promo_ops_domain::StageId;

/// A production step requested against an order, as data only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionCommand {
    /// Move the current stage without recording completion.
    Advance {
        /// The stage to move to.
        target: StageId,
    },
    /// Mark the current stage complete and move to the next one.
    Complete {
        /// The stage being completed. Must be the current stage.
        stage: StageId,
    },
}

impl ProductionCommand {
    /// The name recorded in the activity log.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "AdvanceStage",
            Self::Complete { .. } => "CompleteStage",
        }
    }

    #[must_use]
    pub const fn stage(&self) -> StageId {
        match self {
            Self::Advance { target } => *target,
            Self::Complete { stage } => *stage,
        }
    }
}
