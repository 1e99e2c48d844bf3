/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

/// Errors raised by fallible DOM operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The object is in an invalid state for the requested operation,
    /// mirroring the `InvalidStateError` DOMException.
    #[error("the object is in an invalid state")]
    InvalidState,
    /// A failure surfaced by an embedder callback.
    #[error("{0}")]
    Type(String),
}

/// The result of a fallible DOM operation.
pub type Fallible<T> = Result<T, Error>;

/// The result of a DOM operation with no return value.
pub type ErrorResult = Fallible<()>;
