/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::cell::{Cell, Ref, RefCell};

use bitflags::bitflags;
use chrono::Utc;
use log::warn;

use crate::Atom;
use crate::domobject::{DomRoot, same_object};

bitflags! {
    /// The flag set of an event, <https://dom.spec.whatwg.org/#stop-propagation-flag>
    /// and friends.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct EventFlags: u8 {
        const STOP_PROPAGATION = 1 << 0;
        const STOP_IMMEDIATE_PROPAGATION = 1 << 1;
        const CANCELED = 1 << 2;
        const IN_PASSIVE_LISTENER = 1 << 3;
        const COMPOSED = 1 << 4;
        const INITIALIZED = 1 << 5;
        const DISPATCH = 1 << 6;
    }
}

/// <https://dom.spec.whatwg.org/#dom-event-eventphase>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum EventPhase {
    None = 0,
    Capturing = 1,
    AtTarget = 2,
    Bubbling = 3,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventBubbles {
    Bubbles,
    DoesNotBubble,
}

impl From<bool> for EventBubbles {
    fn from(bubbles: bool) -> Self {
        if bubbles {
            EventBubbles::Bubbles
        } else {
            EventBubbles::DoesNotBubble
        }
    }
}

impl From<EventBubbles> for bool {
    fn from(bubbles: EventBubbles) -> Self {
        match bubbles {
            EventBubbles::Bubbles => true,
            EventBubbles::DoesNotBubble => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventCancelable {
    Cancelable,
    NotCancelable,
}

impl From<bool> for EventCancelable {
    fn from(cancelable: bool) -> Self {
        if cancelable {
            EventCancelable::Cancelable
        } else {
            EventCancelable::NotCancelable
        }
    }
}

impl From<EventCancelable> for bool {
    fn from(cancelable: EventCancelable) -> Self {
        match cancelable {
            EventCancelable::Cancelable => true,
            EventCancelable::NotCancelable => false,
        }
    }
}

/// The outcome of a dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventStatus {
    Canceled,
    NotCanceled,
}

/// <https://dom.spec.whatwg.org/#dictdef-eventinit>
#[derive(Clone, Copy, Debug, Default)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
}

/// One segment of an event's propagation path.
/// <https://dom.spec.whatwg.org/#concept-event-path>
#[derive(Clone)]
pub struct EventPathSegment {
    pub(crate) invocation_target: DomRoot,
    pub(crate) shadow_adjusted_target: Option<DomRoot>,
    pub(crate) related_target: Option<DomRoot>,
    pub(crate) root_of_closed_tree: bool,
    pub(crate) slot_in_closed_tree: bool,
}

/// <https://dom.spec.whatwg.org/#interface-event>
pub struct Event {
    type_: RefCell<Atom>,
    flags: Cell<EventFlags>,
    phase: Cell<EventPhase>,
    bubbles: Cell<bool>,
    cancelable: Cell<bool>,
    trusted: Cell<bool>,
    target: RefCell<Option<DomRoot>>,
    current_target: RefCell<Option<DomRoot>>,
    related_target: RefCell<Option<DomRoot>>,
    path: RefCell<Vec<EventPathSegment>>,
    time_stamp: f64,
}

impl Event {
    pub fn new_uninitialized() -> Event {
        Event {
            type_: RefCell::new(Atom::from("")),
            flags: Cell::new(EventFlags::empty()),
            phase: Cell::new(EventPhase::None),
            bubbles: Cell::new(false),
            cancelable: Cell::new(false),
            trusted: Cell::new(false),
            target: RefCell::new(None),
            current_target: RefCell::new(None),
            related_target: RefCell::new(None),
            path: RefCell::new(Vec::new()),
            time_stamp: Utc::now().timestamp_millis() as f64,
        }
    }

    pub fn new(type_: Atom, bubbles: EventBubbles, cancelable: EventCancelable) -> Event {
        let event = Event::new_uninitialized();
        event.init_event(type_, bubbles.into(), cancelable.into());
        event
    }

    /// <https://dom.spec.whatwg.org/#dom-event-event>
    pub fn new_with_init(type_: Atom, init: &EventInit) -> Event {
        let event = Event::new(type_, init.bubbles.into(), init.cancelable.into());
        if init.composed {
            event.set_flag(EventFlags::COMPOSED, true);
        }
        event
    }

    /// <https://dom.spec.whatwg.org/#dom-event-initevent>
    pub fn init_event(&self, type_: Atom, bubbles: bool, cancelable: bool) {
        // Step 1.
        if self.dispatching() {
            return;
        }

        // Step 2, <https://dom.spec.whatwg.org/#concept-event-initialize>.
        let mut flags = self.flags.get();
        flags.insert(EventFlags::INITIALIZED);
        flags.remove(
            EventFlags::STOP_PROPAGATION |
                EventFlags::STOP_IMMEDIATE_PROPAGATION |
                EventFlags::CANCELED,
        );
        self.flags.set(flags);
        self.trusted.set(false);
        *self.target.borrow_mut() = None;
        *self.type_.borrow_mut() = type_;
        self.bubbles.set(bubbles);
        self.cancelable.set(cancelable);
    }

    pub fn type_(&self) -> Atom {
        self.type_.borrow().clone()
    }

    pub fn flags(&self) -> EventFlags {
        self.flags.get()
    }

    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles.get()
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable.get()
    }

    /// <https://dom.spec.whatwg.org/#dom-event-composed>
    pub fn composed(&self) -> bool {
        self.flags().contains(EventFlags::COMPOSED)
    }

    pub fn is_trusted(&self) -> bool {
        self.trusted.get()
    }

    /// Milliseconds at event creation.
    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    pub fn target(&self) -> Option<DomRoot> {
        self.target.borrow().clone()
    }

    pub fn current_target(&self) -> Option<DomRoot> {
        self.current_target.borrow().clone()
    }

    pub fn related_target(&self) -> Option<DomRoot> {
        self.related_target.borrow().clone()
    }

    /// Seeds the related target. The dispatcher retargets it against every
    /// object on the propagation path.
    pub fn init_related_target(&self, related_target: Option<DomRoot>) {
        *self.related_target.borrow_mut() = related_target;
    }

    /// <https://dom.spec.whatwg.org/#dom-event-defaultprevented>
    pub fn default_prevented(&self) -> bool {
        self.flags().contains(EventFlags::CANCELED)
    }

    pub fn status(&self) -> EventStatus {
        if self.default_prevented() {
            EventStatus::Canceled
        } else {
            EventStatus::NotCanceled
        }
    }

    /// <https://dom.spec.whatwg.org/#dom-event-stoppropagation>
    pub fn stop_propagation(&self) {
        self.set_flag(EventFlags::STOP_PROPAGATION, true);
    }

    /// <https://dom.spec.whatwg.org/#dom-event-stopimmediatepropagation>
    pub fn stop_immediate_propagation(&self) {
        self.set_flag(
            EventFlags::STOP_PROPAGATION | EventFlags::STOP_IMMEDIATE_PROPAGATION,
            true,
        );
    }

    /// <https://dom.spec.whatwg.org/#set-the-canceled-flag>
    pub fn prevent_default(&self) {
        if !self.cancelable.get() {
            return;
        }
        if self.flags().contains(EventFlags::IN_PASSIVE_LISTENER) {
            warn!(
                "preventDefault() ignored inside a passive listener for {}",
                self.type_.borrow()
            );
            return;
        }
        self.set_flag(EventFlags::CANCELED, true);
    }

    /// <https://dom.spec.whatwg.org/#dom-event-cancelbubble>
    pub fn cancel_bubble(&self) -> bool {
        self.flags().contains(EventFlags::STOP_PROPAGATION)
    }

    pub fn set_cancel_bubble(&self, value: bool) {
        // Assigning false never clears the flag.
        if value {
            self.stop_propagation();
        }
    }

    /// <https://dom.spec.whatwg.org/#dom-event-returnvalue>
    pub fn return_value(&self) -> bool {
        !self.default_prevented()
    }

    pub fn set_return_value(&self, value: bool) {
        if !value {
            self.prevent_default();
        }
    }

    /// Marks the event as generated by the implementation rather than by
    /// `dispatch_event()`. The `fire_*` helpers set this.
    pub fn set_trusted(&self, trusted: bool) {
        self.trusted.set(trusted);
    }

    /// <https://dom.spec.whatwg.org/#dom-event-composedpath>
    pub fn composed_path(&self) -> Vec<DomRoot> {
        // Steps 1-3.
        let path = self.path.borrow();
        if path.is_empty() {
            return Vec::new();
        }
        let current_target = match self.current_target.borrow().clone() {
            Some(current_target) => current_target,
            None => return Vec::new(),
        };

        // Steps 4-8.
        let mut composed_path = vec![current_target.clone()];
        let mut current_target_index = 0;
        let mut current_target_hidden_level = 0i32;
        for (index, segment) in path.iter().enumerate().rev() {
            if segment.root_of_closed_tree {
                current_target_hidden_level += 1;
            }
            if same_object(&segment.invocation_target, &current_target) {
                current_target_index = index;
                break;
            }
            if segment.slot_in_closed_tree {
                current_target_hidden_level -= 1;
            }
        }

        // Steps 9-11: everything before the current target that is not
        // hidden behind a closed tree.
        let mut current_hidden_level = current_target_hidden_level;
        let mut max_hidden_level = current_target_hidden_level;
        for segment in path[..current_target_index].iter().rev() {
            if segment.root_of_closed_tree {
                current_hidden_level += 1;
            }
            if current_hidden_level <= max_hidden_level {
                composed_path.insert(0, segment.invocation_target.clone());
            }
            if segment.slot_in_closed_tree {
                current_hidden_level -= 1;
                if current_hidden_level < max_hidden_level {
                    max_hidden_level = current_hidden_level;
                }
            }
        }

        // Steps 12-14.
        let mut current_hidden_level = current_target_hidden_level;
        let mut max_hidden_level = current_target_hidden_level;
        for segment in &path[current_target_index + 1..] {
            if segment.slot_in_closed_tree {
                current_hidden_level += 1;
            }
            if current_hidden_level <= max_hidden_level {
                composed_path.push(segment.invocation_target.clone());
            }
            if segment.root_of_closed_tree {
                current_hidden_level -= 1;
                if current_hidden_level < max_hidden_level {
                    max_hidden_level = current_hidden_level;
                }
            }
        }

        composed_path
    }

    pub(crate) fn dispatching(&self) -> bool {
        self.flags().contains(EventFlags::DISPATCH)
    }

    pub(crate) fn initialized(&self) -> bool {
        self.flags().contains(EventFlags::INITIALIZED)
    }

    pub(crate) fn set_flag(&self, flag: EventFlags, value: bool) {
        let mut flags = self.flags.get();
        flags.set(flag, value);
        self.flags.set(flags);
    }

    pub(crate) fn set_phase(&self, phase: EventPhase) {
        self.phase.set(phase);
    }

    pub(crate) fn set_type(&self, type_: Atom) {
        *self.type_.borrow_mut() = type_;
    }

    pub(crate) fn set_target(&self, target: Option<DomRoot>) {
        *self.target.borrow_mut() = target;
    }

    pub(crate) fn set_current_target(&self, current_target: Option<DomRoot>) {
        *self.current_target.borrow_mut() = current_target;
    }

    pub(crate) fn set_related_target(&self, related_target: Option<DomRoot>) {
        *self.related_target.borrow_mut() = related_target;
    }

    pub(crate) fn append_to_event_path(
        &self,
        invocation_target: DomRoot,
        shadow_adjusted_target: Option<DomRoot>,
        related_target: Option<DomRoot>,
    ) {
        self.path.borrow_mut().push(EventPathSegment {
            invocation_target,
            shadow_adjusted_target,
            related_target,
            root_of_closed_tree: false,
            slot_in_closed_tree: false,
        });
    }

    pub(crate) fn event_path(&self) -> Ref<'_, Vec<EventPathSegment>> {
        self.path.borrow()
    }

    pub(crate) fn clear_event_path(&self) {
        self.path.borrow_mut().clear();
    }
}
