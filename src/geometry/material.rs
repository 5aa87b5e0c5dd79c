// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Opaque surface material tokens

use serde::{Deserialize, Serialize};

/// Opaque material token attached to polygons.
///
/// The engine never interprets the value; it only compares tokens for
/// equality and copies them across splits and merges. Hosts map tokens to
/// whatever color or shading data they maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material(pub u64);

impl Material {
    pub fn new(token: u64) -> Self {
        Self(token)
    }
}

impl From<u64> for Material {
    fn from(token: u64) -> Self {
        Self(token)
    }
}
