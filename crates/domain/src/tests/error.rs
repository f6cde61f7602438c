// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, StageId};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::UnknownStage(String::from("polishing"));
    assert_eq!(format!("{err}"), "Unknown stage 'polishing'");

    let err: DomainError = DomainError::DuplicateStageOrder {
        order: 3,
        first: StageId::PoPlaced,
        second: StageId::OrderPlaced,
    };
    assert_eq!(
        format!("{err}"),
        "Stages 'po-placed' and 'order-placed' share catalog order 3"
    );

    let err: DomainError = DomainError::StageBeyondCurrent {
        stage: StageId::Invoiced,
        current: StageId::PoPlaced,
    };
    assert_eq!(
        format!("{err}"),
        "Stage 'invoiced' is marked complete but lies beyond current stage 'po-placed'"
    );

    let err: DomainError = DomainError::InvalidDecision(String::from("maybe"));
    assert_eq!(
        format!("{err}"),
        "Invalid decision 'maybe'. Must be 'approved' or 'declined'"
    );

    let err: DomainError = DomainError::VendorRequired;
    assert_eq!(format!("{err}"), "A purchase order requires a vendor");

    let err: DomainError = DomainError::InvalidQuantity {
        line_id: Some(4),
        value: -1,
    };
    assert_eq!(format!("{err}"), "Invalid quantity -1 on line 4");

    let err: DomainError = DomainError::InvalidQuantity {
        line_id: None,
        value: -1,
    };
    assert_eq!(format!("{err}"), "Invalid quantity -1");

    let err: DomainError = DomainError::UnknownLine(9);
    assert_eq!(format!("{err}"), "Line 9 is not part of the order");
}

#[test]
fn test_domain_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(DomainError::InvalidToken);
    assert_eq!(err.to_string(), "Malformed approval token");
}
