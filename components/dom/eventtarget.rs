/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::hash::BuildHasherDefault;
use std::rc::Rc;

use fnv::FnvHasher;
use log::error;

use crate::Atom;
use crate::domobject::DomRoot;
use crate::error::{Error, ErrorResult, Fallible};
use crate::event::{Event, EventBubbles, EventCancelable, EventStatus};
use crate::eventdispatcher::dispatch_event;

/// Which pass of the dispatch algorithm a registration participates in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListenerPhase {
    Capturing,
    Bubbling,
}

/// A callback invoked when an event reaches a target it is registered on.
/// An `Err` return models a listener exception.
pub trait EventListener {
    fn handle_event(&self, event: &Event) -> ErrorResult;
}

/// Whether a listener failure is reported or propagated to the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExceptionHandling {
    Report,
    Rethrow,
}

/// How a listener came to be registered: through `addEventListener` or
/// through the event-handler IDL-attribute slot.
#[derive(Clone)]
pub enum EventListenerType {
    Additive(Rc<dyn EventListener>),
    Inline(Rc<dyn EventListener>),
}

impl EventListenerType {
    fn callback(&self) -> &Rc<dyn EventListener> {
        match *self {
            EventListenerType::Additive(ref listener) |
            EventListenerType::Inline(ref listener) => listener,
        }
    }

    pub(crate) fn call_or_handle_event(
        &self,
        event: &Event,
        handling: ExceptionHandling,
    ) -> ErrorResult {
        match self.callback().handle_event(event) {
            Err(err) if handling == ExceptionHandling::Report => {
                error!("event listener for {} failed: {}", event.type_(), err);
                Ok(())
            },
            result => result,
        }
    }
}

/// One registration in a target's listener list. Entries are shared with
/// in-flight dispatch snapshots; `removed` is the tombstone those snapshots
/// observe.
pub struct EventListenerEntry {
    pub(crate) phase: ListenerPhase,
    pub(crate) listener: EventListenerType,
    pub(crate) once: bool,
    pub(crate) passive: bool,
    removed: Cell<bool>,
}

impl EventListenerEntry {
    pub(crate) fn removed(&self) -> bool {
        self.removed.get()
    }

    fn matches(&self, callback: &Rc<dyn EventListener>, phase: ListenerPhase) -> bool {
        self.phase == phase && Rc::ptr_eq(self.listener.callback(), callback)
    }
}

/// <https://dom.spec.whatwg.org/#dictdef-eventlisteneroptions>
#[derive(Clone, Copy, Debug, Default)]
pub struct EventListenerOptions {
    pub capture: bool,
}

/// <https://dom.spec.whatwg.org/#dictdef-addeventlisteneroptions>
#[derive(Clone, Copy, Debug, Default)]
pub struct AddEventListenerOptions {
    pub parent: EventListenerOptions,
    pub once: bool,
    pub passive: bool,
}

/// The `(AddEventListenerOptions or boolean)` argument of
/// `addEventListener`; a bare boolean sets `capture`.
pub enum AddEventListenerOptionsOrBoolean {
    Options(AddEventListenerOptions),
    Boolean(bool),
}

impl From<AddEventListenerOptionsOrBoolean> for AddEventListenerOptions {
    fn from(options: AddEventListenerOptionsOrBoolean) -> Self {
        match options {
            AddEventListenerOptionsOrBoolean::Options(options) => options,
            AddEventListenerOptionsOrBoolean::Boolean(capture) => AddEventListenerOptions {
                parent: EventListenerOptions { capture },
                ..Default::default()
            },
        }
    }
}

/// The `(EventListenerOptions or boolean)` argument of
/// `removeEventListener`.
pub enum EventListenerOptionsOrBoolean {
    Options(EventListenerOptions),
    Boolean(bool),
}

impl From<EventListenerOptionsOrBoolean> for EventListenerOptions {
    fn from(options: EventListenerOptionsOrBoolean) -> Self {
        match options {
            EventListenerOptionsOrBoolean::Options(options) => options,
            EventListenerOptionsOrBoolean::Boolean(capture) => {
                EventListenerOptions { capture }
            },
        }
    }
}

/// <https://dom.spec.whatwg.org/#interface-eventtarget>
pub struct EventTarget {
    handlers: RefCell<HashMap<Atom, Vec<Rc<EventListenerEntry>>, BuildHasherDefault<FnvHasher>>>,
}

impl Default for EventTarget {
    fn default() -> Self {
        EventTarget::new()
    }
}

impl EventTarget {
    pub fn new() -> EventTarget {
        EventTarget {
            handlers: RefCell::new(Default::default()),
        }
    }

    /// <https://dom.spec.whatwg.org/#dom-eventtarget-addeventlistener>
    pub fn add_event_listener(
        &self,
        ty: Atom,
        listener: Option<Rc<dyn EventListener>>,
        options: AddEventListenerOptionsOrBoolean,
    ) {
        let Some(listener) = listener else { return };
        let options = AddEventListenerOptions::from(options);
        let phase = if options.parent.capture {
            ListenerPhase::Capturing
        } else {
            ListenerPhase::Bubbling
        };

        let mut handlers = self.handlers.borrow_mut();
        let entries = match handlers.entry(ty) {
            Occupied(entry) => entry.into_mut(),
            Vacant(entry) => entry.insert(Vec::new()),
        };

        // A registration with the same callback and capture flag already
        // exists; `once` and `passive` do not distinguish entries.
        if entries.iter().any(|entry| entry.matches(&listener, phase)) {
            return;
        }

        entries.push(Rc::new(EventListenerEntry {
            phase,
            listener: EventListenerType::Additive(listener),
            once: options.once,
            passive: options.passive,
            removed: Cell::new(false),
        }));
    }

    /// <https://dom.spec.whatwg.org/#dom-eventtarget-removeeventlistener>
    pub fn remove_event_listener(
        &self,
        ty: &Atom,
        listener: Option<Rc<dyn EventListener>>,
        options: EventListenerOptionsOrBoolean,
    ) {
        let Some(listener) = listener else { return };
        let options = EventListenerOptions::from(options);
        let phase = if options.capture {
            ListenerPhase::Capturing
        } else {
            ListenerPhase::Bubbling
        };

        let mut handlers = self.handlers.borrow_mut();
        if let Some(entries) = handlers.get_mut(ty) {
            if let Some(position) = entries
                .iter()
                .position(|entry| entry.matches(&listener, phase))
            {
                entries[position].removed.set(true);
                entries.remove(position);
            }
        }
    }

    /// Sets the event-handler IDL-attribute slot for `ty`. A previous inline
    /// handler is replaced without losing its position in the listener list.
    /// <https://html.spec.whatwg.org/multipage/#event-handler-attributes>
    pub fn set_event_handler(&self, ty: Atom, listener: Option<Rc<dyn EventListener>>) {
        let mut handlers = self.handlers.borrow_mut();
        let entries = match handlers.entry(ty) {
            Occupied(entry) => entry.into_mut(),
            Vacant(entry) => entry.insert(Vec::new()),
        };

        let position = entries
            .iter()
            .position(|entry| matches!(entry.listener, EventListenerType::Inline(_)));
        match (position, listener) {
            (Some(position), Some(listener)) => {
                entries[position].removed.set(true);
                entries[position] = Rc::new(EventListenerEntry {
                    phase: ListenerPhase::Bubbling,
                    listener: EventListenerType::Inline(listener),
                    once: false,
                    passive: false,
                    removed: Cell::new(false),
                });
            },
            (Some(position), None) => {
                entries[position].removed.set(true);
                entries.remove(position);
            },
            (None, Some(listener)) => {
                entries.push(Rc::new(EventListenerEntry {
                    phase: ListenerPhase::Bubbling,
                    listener: EventListenerType::Inline(listener),
                    once: false,
                    passive: false,
                    removed: Cell::new(false),
                }));
            },
            (None, None) => {},
        }
    }

    /// The current inline handler for `ty`, if any.
    pub fn event_handler(&self, ty: &Atom) -> Option<Rc<dyn EventListener>> {
        let handlers = self.handlers.borrow();
        handlers.get(ty).and_then(|entries| {
            entries.iter().find_map(|entry| match entry.listener {
                EventListenerType::Inline(ref listener) => Some(listener.clone()),
                EventListenerType::Additive(_) => None,
            })
        })
    }

    pub fn has_handlers(&self) -> bool {
        !self.handlers.borrow().is_empty()
    }

    /// Number of live registrations for `ty`.
    pub fn listener_count(&self, ty: &Atom) -> usize {
        self.handlers.borrow().get(ty).map_or(0, Vec::len)
    }

    /// Snapshot of the listener list for `ty`. Taken once per invocation, so
    /// listeners added during dispatch are not seen by it.
    pub(crate) fn get_listeners(&self, ty: &Atom) -> Vec<Rc<EventListenerEntry>> {
        self.handlers
            .borrow()
            .get(ty)
            .map_or_else(Vec::new, Vec::clone)
    }

    /// Tombstones `entry` and unlinks it from the listener list.
    pub(crate) fn remove_listener(&self, ty: &Atom, entry: &Rc<EventListenerEntry>) {
        entry.removed.set(true);
        let mut handlers = self.handlers.borrow_mut();
        if let Some(entries) = handlers.get_mut(ty) {
            if let Some(position) = entries.iter().position(|other| Rc::ptr_eq(other, entry)) {
                entries.remove(position);
            }
        }
    }
}

/// Dispatch helpers available on any object handle.
pub trait EventTargetHelpers {
    /// <https://dom.spec.whatwg.org/#dom-eventtarget-dispatchevent>
    fn dispatch_event(&self, event: &Event) -> Fallible<bool>;

    /// Dispatches `event` with an explicit target override: listeners see
    /// `target_override` as `event.target()` while `self` anchors the path.
    fn dispatch_event_with_target(&self, target_override: &DomRoot, event: &Event)
        -> EventStatus;

    fn fire_event(&self, name: Atom) -> Event;
    fn fire_bubbling_event(&self, name: Atom) -> Event;
    fn fire_cancelable_event(&self, name: Atom) -> Event;
    fn fire_bubbling_cancelable_event(&self, name: Atom) -> Event;
    fn fire_event_with_params(
        &self,
        name: Atom,
        bubbles: EventBubbles,
        cancelable: EventCancelable,
    ) -> Event;
}

impl EventTargetHelpers for DomRoot {
    fn dispatch_event(&self, event: &Event) -> Fallible<bool> {
        // Step 1.
        if event.dispatching() || !event.initialized() {
            return Err(Error::InvalidState);
        }

        // Step 2.
        event.set_trusted(false);

        // Step 3.
        Ok(match dispatch_event(self, None, event) {
            EventStatus::Canceled => false,
            EventStatus::NotCanceled => true,
        })
    }

    fn dispatch_event_with_target(
        &self,
        target_override: &DomRoot,
        event: &Event,
    ) -> EventStatus {
        dispatch_event(self, Some(target_override), event)
    }

    fn fire_event(&self, name: Atom) -> Event {
        self.fire_event_with_params(
            name,
            EventBubbles::DoesNotBubble,
            EventCancelable::NotCancelable,
        )
    }

    fn fire_bubbling_event(&self, name: Atom) -> Event {
        self.fire_event_with_params(name, EventBubbles::Bubbles, EventCancelable::NotCancelable)
    }

    fn fire_cancelable_event(&self, name: Atom) -> Event {
        self.fire_event_with_params(name, EventBubbles::DoesNotBubble, EventCancelable::Cancelable)
    }

    fn fire_bubbling_cancelable_event(&self, name: Atom) -> Event {
        self.fire_event_with_params(name, EventBubbles::Bubbles, EventCancelable::Cancelable)
    }

    fn fire_event_with_params(
        &self,
        name: Atom,
        bubbles: EventBubbles,
        cancelable: EventCancelable,
    ) -> Event {
        let event = Event::new(name, bubbles, cancelable);
        event.set_trusted(true);
        dispatch_event(self, None, &event);
        event
    }
}
