/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::{Precision, PrecisionResolutionStrategy};

#[cfg(feature = "yaml")]
mod yaml;

/// Timestamp handling of a [`LineWriter`](crate::LineWriter)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterConfig {
    pub precision: Precision,
    /// Applied to timestamps that are not a multiple of the precision unit
    pub resolution_strategy: PrecisionResolutionStrategy,
}

impl WriterConfig {
    pub const fn new(
        precision: Precision,
        resolution_strategy: PrecisionResolutionStrategy,
    ) -> Self {
        WriterConfig {
            precision,
            resolution_strategy,
        }
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }

    pub fn set_resolution_strategy(&mut self, strategy: PrecisionResolutionStrategy) {
        self.resolution_strategy = strategy;
    }
}
