// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure classification of outbound delivery failures into actionable
//! classes, plus the deterministic address-correction pass used for
//! FORMAT-class errors.

pub mod interpreter;

pub use interpreter::{
    DeliveryInterpretation, ErrorClass, RecommendedAction, correct_address, interpret,
};
