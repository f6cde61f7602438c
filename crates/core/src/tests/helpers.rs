// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use promo_ops_audit::{Actor, Cause};
use promo_ops_domain::{Order, OrderNumber, StageCatalog, StageId};

pub fn create_test_actor() -> Actor {
    Actor::user("csr-123")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Production update"))
}

pub fn create_test_order() -> Order {
    let mut order: Order =
        Order::new(OrderNumber::new("SO-1001").unwrap(), &StageCatalog::standard());
    order.order_id = Some(1);
    order
}

/// An order whose every stage before `current` is complete.
pub fn create_order_at(current: StageId) -> Order {
    let catalog: StageCatalog = StageCatalog::standard();
    let mut order: Order = create_test_order();
    for definition in catalog.stages() {
        if definition.id == current {
            break;
        }
        order.stages_completed.insert(definition.id);
    }
    order.current_stage = current;
    order
}

/// Asserts that no completed stage lies after the current stage.
pub fn assert_progression_invariant(order: &Order, catalog: &StageCatalog) {
    for stage in &order.stages_completed {
        assert!(
            !catalog.is_after(*stage, order.current_stage),
            "completed stage {stage} lies after current stage {}",
            order.current_stage
        );
    }
}
