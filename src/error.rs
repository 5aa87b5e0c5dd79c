// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Crate error types

use thiserror::Error;

/// Reasons a polygon fails validation.
///
/// The engine itself never raises these: invalid construction surfaces as
/// `None` from [`Polygon::new`]. [`Polygon::try_new`] exposes the reason for
/// callers that want to report it.
///
/// [`Polygon::new`]: crate::geometry::Polygon::new
/// [`Polygon::try_new`]: crate::geometry::Polygon::try_new
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    InsufficientVertices(usize),
    #[error("polygon has coincident adjacent vertices")]
    CoincidentVertices,
    #[error("polygon area is below tolerance")]
    DegenerateArea,
    #[error("polygon vertices are not coplanar")]
    NonPlanar,
}
