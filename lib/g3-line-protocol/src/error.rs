/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;

use thiserror::Error;

use crate::LinePosition;

#[derive(Debug, Error)]
pub enum LineProtocolError {
    /// Malformed input detected while building a measure or a point
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),
    /// The writer was driven out of order, which is a bug in the caller
    #[error("invalid writer state {position:?}: {message}")]
    InvalidState {
        position: LinePosition,
        message: Cow<'static, str>,
    },
    #[error("out of range: {0}")]
    OutOfRange(Cow<'static, str>),
}

impl LineProtocolError {
    pub(crate) fn invalid_argument<M: Into<Cow<'static, str>>>(msg: M) -> Self {
        LineProtocolError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state<M: Into<Cow<'static, str>>>(
        position: LinePosition,
        msg: M,
    ) -> Self {
        LineProtocolError::InvalidState {
            position,
            message: msg.into(),
        }
    }

    pub(crate) fn out_of_range<M: Into<Cow<'static, str>>>(msg: M) -> Self {
        LineProtocolError::OutOfRange(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, LineProtocolError::InvalidArgument(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, LineProtocolError::InvalidState { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, LineProtocolError::OutOfRange(_))
    }
}
