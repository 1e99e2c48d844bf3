/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The DOM event propagation model of <https://dom.spec.whatwg.org/#events>:
//! the [`Event`] value object, the per-target listener registry
//! ([`EventTarget`]) and the dispatch algorithm with its capture and bubble
//! passes, shadow retargeting and activation behavior. The tree itself is
//! supplied by the embedder through the [`DomObject`] trait.

#![deny(unsafe_code)]

pub mod activation;
pub mod domobject;
pub mod error;
pub mod event;
mod eventdispatcher;
pub mod eventtarget;

pub use string_cache::DefaultAtom as Atom;

pub use crate::activation::Activatable;
pub use crate::domobject::{DomObject, DomRoot, same_object};
pub use crate::error::{Error, ErrorResult, Fallible};
pub use crate::event::{
    Event, EventBubbles, EventCancelable, EventFlags, EventInit, EventPathSegment, EventPhase,
    EventStatus,
};
pub use crate::eventtarget::{
    AddEventListenerOptions, AddEventListenerOptionsOrBoolean, EventListener,
    EventListenerOptions, EventListenerOptionsOrBoolean, EventTarget, EventTargetHelpers,
    ExceptionHandling, ListenerPhase,
};
