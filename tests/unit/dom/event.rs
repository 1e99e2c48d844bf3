/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::cell::Cell;
use std::rc::Rc;

use dom::{
    Atom, DomObject, Event, EventBubbles, EventCancelable, EventFlags, EventInit, EventPhase,
    EventStatus, EventTargetHelpers, same_object,
};

use crate::support::{TestNode, bubble_options, handle, listener};

#[test]
fn new_event_is_initialized() {
    let event = Event::new(
        Atom::from("push"),
        EventBubbles::Bubbles,
        EventCancelable::NotCancelable,
    );
    assert!(event.flags().contains(EventFlags::INITIALIZED));
    assert!(!event.composed());
    assert_eq!(&*event.type_(), "push");
    assert!(event.bubbles());
    assert!(!event.cancelable());
    assert_eq!(event.phase(), EventPhase::None);
    assert!(event.target().is_none());
    assert!(!event.is_trusted());
    assert!(event.time_stamp() > 0.0);
}

#[test]
fn uninitialized_event_has_no_flags() {
    let event = Event::new_uninitialized();
    assert_eq!(event.flags(), EventFlags::empty());
    assert_eq!(&*event.type_(), "");
}

#[test]
fn event_init_dictionary_controls_composed() {
    let event = Event::new_with_init(
        Atom::from("toggle"),
        &EventInit {
            bubbles: false,
            cancelable: true,
            composed: true,
        },
    );
    assert!(event.composed());
    assert!(event.cancelable());
    assert!(!event.bubbles());
}

#[test]
fn prevent_default_requires_cancelable() {
    let event = Event::new(
        Atom::from("input"),
        EventBubbles::Bubbles,
        EventCancelable::NotCancelable,
    );
    event.prevent_default();
    assert!(!event.default_prevented());
    assert_eq!(event.status(), EventStatus::NotCanceled);

    let event = Event::new(
        Atom::from("submit"),
        EventBubbles::Bubbles,
        EventCancelable::Cancelable,
    );
    event.prevent_default();
    assert!(event.default_prevented());
    assert_eq!(event.status(), EventStatus::Canceled);
}

#[test]
fn stop_immediate_propagation_implies_stop_propagation() {
    let event = Event::new(
        Atom::from("scroll"),
        EventBubbles::Bubbles,
        EventCancelable::NotCancelable,
    );
    event.stop_immediate_propagation();
    assert!(
        event
            .flags()
            .contains(EventFlags::STOP_PROPAGATION | EventFlags::STOP_IMMEDIATE_PROPAGATION)
    );
    assert!(event.cancel_bubble());
}

#[test]
fn cancel_bubble_maps_to_stop_propagation() {
    let event = Event::new(
        Atom::from("scroll"),
        EventBubbles::Bubbles,
        EventCancelable::NotCancelable,
    );
    assert!(!event.cancel_bubble());
    event.set_cancel_bubble(true);
    assert!(event.cancel_bubble());
    event.set_cancel_bubble(false);
    assert!(event.cancel_bubble());
}

#[test]
fn return_value_mirrors_the_canceled_flag() {
    let event = Event::new(
        Atom::from("beforeunload"),
        EventBubbles::DoesNotBubble,
        EventCancelable::Cancelable,
    );
    assert!(event.return_value());
    event.set_return_value(false);
    assert!(event.default_prevented());
    assert!(!event.return_value());
    // Assigning true never clears the canceled flag.
    event.set_return_value(true);
    assert!(event.default_prevented());
}

#[test]
fn init_event_resets_flags() {
    let event = Event::new(
        Atom::from("old"),
        EventBubbles::DoesNotBubble,
        EventCancelable::Cancelable,
    );
    event.prevent_default();
    event.stop_immediate_propagation();
    event.set_trusted(true);

    event.init_event(Atom::from("new"), true, false);
    assert_eq!(&*event.type_(), "new");
    assert!(event.bubbles());
    assert!(!event.cancelable());
    assert!(!event.default_prevented());
    assert!(!event.cancel_bubble());
    assert!(!event.is_trusted());
}

#[test]
fn init_event_is_ignored_during_dispatch() {
    let node = TestNode::new(None);
    let ty = Atom::from("change");
    node.event_target().add_event_listener(
        ty.clone(),
        Some(listener(|event| {
            event.init_event(Atom::from("renamed"), true, true);
            Ok(())
        })),
        bubble_options(),
    );

    let event = Event::new(
        ty,
        EventBubbles::DoesNotBubble,
        EventCancelable::NotCancelable,
    );
    assert!(handle(&node).dispatch_event(&event).unwrap());
    assert_eq!(&*event.type_(), "change");
    assert!(!event.bubbles());
}

#[test]
fn composed_path_is_empty_outside_dispatch() {
    let event = Event::new(
        Atom::from("ping"),
        EventBubbles::Bubbles,
        EventCancelable::NotCancelable,
    );
    assert!(event.composed_path().is_empty());
}

#[test]
fn composed_path_lists_the_propagation_path() {
    let parent = TestNode::new(None);
    let child = TestNode::new(Some(handle(&parent)));
    let saw = Rc::new(Cell::new(false));

    parent.event_target().add_event_listener(
        Atom::from("ping"),
        Some(listener({
            let child = handle(&child);
            let parent = handle(&parent);
            let saw = saw.clone();
            move |event| {
                let path = event.composed_path();
                assert_eq!(path.len(), 2);
                assert!(same_object(&path[0], &child));
                assert!(same_object(&path[1], &parent));
                saw.set(true);
                Ok(())
            }
        })),
        bubble_options(),
    );

    let event = Event::new(
        Atom::from("ping"),
        EventBubbles::Bubbles,
        EventCancelable::NotCancelable,
    );
    assert!(handle(&child).dispatch_event(&event).unwrap());
    assert!(saw.get());
    assert!(event.composed_path().is_empty());
}
