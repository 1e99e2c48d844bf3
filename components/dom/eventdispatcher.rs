/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The event dispatch algorithm,
//! <https://dom.spec.whatwg.org/#concept-event-dispatch>.

use crate::Atom;
use crate::domobject::{DomRoot, same_object};
use crate::event::{Event, EventFlags, EventPathSegment, EventPhase, EventStatus};
use crate::eventtarget::{ExceptionHandling, ListenerPhase};

/// <https://dom.spec.whatwg.org/#concept-event-dispatch>
pub(crate) fn dispatch_event(
    target: &DomRoot,
    pseudo_target: Option<&DomRoot>,
    event: &Event,
) -> EventStatus {
    debug_assert!(!event.dispatching());
    debug_assert!(event.initialized());
    debug_assert_eq!(event.phase(), EventPhase::None);

    // Step 1.
    event.set_flag(EventFlags::DISPATCH, true);

    // Step 2.
    let target_override = pseudo_target.unwrap_or(target).clone();

    // Step 3.
    let mut activation_target: Option<DomRoot> = None;

    // Step 4.
    let original_related_target = event.related_target();
    let related_target = original_related_target
        .as_ref()
        .map(|related| target.retarget(related));

    // Step 5: dispatch is skipped entirely when retargeting turned the
    // related target into the target itself.
    let skip_dispatch = related_target.as_ref().is_some_and(|related| {
        same_object(target, related) &&
            !original_related_target
                .as_ref()
                .is_some_and(|original| same_object(target, original))
    });

    if !skip_dispatch {
        let is_activation_event = &*event.type_() == "click";

        // Step 5.2.
        if is_activation_event && target.as_activatable().is_some() {
            activation_target = Some(target.clone());
        }

        // Step 5.3.
        event.append_to_event_path(target.clone(), Some(target_override), related_target);

        // Steps 5.4-5.9: walk up from the target, retargeting the related
        // target against every parent. `logical_target` is the current
        // shadow-adjusted target.
        let mut logical_target = target.clone();
        let mut parent = target.get_the_parent(event);
        while let Some(current) = parent {
            let related_target = original_related_target
                .as_ref()
                .map(|related| current.retarget(related));
            let root = logical_target
                .get_root_node()
                .unwrap_or_else(|| logical_target.clone());
            if root.is_shadow_including_inclusive_ancestor_of(&current) {
                // Step 5.9.6.
                if is_activation_event &&
                    event.bubbles() &&
                    activation_target.is_none() &&
                    current.as_activatable().is_some()
                {
                    activation_target = Some(current.clone());
                }
                event.append_to_event_path(current.clone(), None, related_target);
            } else if related_target
                .as_ref()
                .is_some_and(|related| same_object(&current, related))
            {
                // Step 5.10: the walk reached the retargeted related target.
                break;
            } else {
                // Step 5.11: a shadow boundary was crossed; the parent
                // becomes the shadow-adjusted target.
                logical_target = current.clone();
                if is_activation_event &&
                    activation_target.is_none() &&
                    logical_target.as_activatable().is_some()
                {
                    activation_target = Some(logical_target.clone());
                }
                event.append_to_event_path(
                    current.clone(),
                    Some(logical_target.clone()),
                    related_target,
                );
            }
            parent = current.get_the_parent(event);
        }

        // Step 5.12.
        event.set_phase(EventPhase::Capturing);
        if let Some(activatable) = activation_target
            .as_ref()
            .and_then(|target| target.as_activatable())
        {
            activatable.pre_click_activation();
        }

        // Steps 5.13-5.15.
        dispatch_to_listeners(event);
    }

    // Steps 6-10: teardown runs even when dispatch was skipped.
    event.set_phase(EventPhase::None);
    event.set_current_target(None);
    event.clear_event_path();
    event.set_flag(
        EventFlags::DISPATCH |
            EventFlags::STOP_PROPAGATION |
            EventFlags::STOP_IMMEDIATE_PROPAGATION,
        false,
    );

    // Step 11.
    if let Some(ref activation_target) = activation_target {
        if let Some(activatable) = activation_target.as_activatable() {
            if event.default_prevented() {
                activatable.canceled_activation();
            } else {
                activatable.activation_behavior(event, activation_target.event_target());
            }
        }
    }

    event.status()
}

// Steps 5.13-5.15 of the dispatch algorithm: the capture pass over the path
// from its end, then the target and bubble pass from its start. Only the
// stop-immediate flag cuts the passes short; a plain stopPropagation() lets
// the dispatch run to completion.
fn dispatch_to_listeners(event: &Event) {
    let path = event.event_path();

    for (index, segment) in path.iter().enumerate().rev() {
        if segment.shadow_adjusted_target.is_some() {
            continue;
        }
        event.set_phase(EventPhase::Capturing);
        invoke(event, &path, index, ListenerPhase::Capturing);
        if event.flags().contains(EventFlags::STOP_IMMEDIATE_PROPAGATION) {
            return;
        }
    }

    for (index, segment) in path.iter().enumerate() {
        if segment.shadow_adjusted_target.is_some() {
            event.set_phase(EventPhase::AtTarget);
        } else {
            if !event.bubbles() {
                continue;
            }
            event.set_phase(EventPhase::Bubbling);
        }
        invoke(event, &path, index, ListenerPhase::Bubbling);
        if event.flags().contains(EventFlags::STOP_IMMEDIATE_PROPAGATION) {
            return;
        }
    }
}

/// <https://dom.spec.whatwg.org/#concept-event-listener-invoke>
fn invoke(event: &Event, path: &[EventPathSegment], index: usize, phase: ListenerPhase) {
    let segment = &path[index];

    // Step 1: recompute the event's target from the path overrides. The
    // capture pass takes the override of the first segment carrying one,
    // from the end of the path; the bubble pass the one closest to the
    // invocation target, from the start.
    let adjusted_target = match phase {
        ListenerPhase::Capturing => path
            .iter()
            .rev()
            .find_map(|segment| segment.shadow_adjusted_target.clone()),
        ListenerPhase::Bubbling => path[..=index]
            .iter()
            .rev()
            .find_map(|segment| segment.shadow_adjusted_target.clone()),
    };
    event.set_target(adjusted_target);

    // Step 2.
    event.set_related_target(segment.related_target.clone());

    // Steps 5-8.
    event.set_current_target(Some(segment.invocation_target.clone()));
    let found = inner_invoke(event, &segment.invocation_target, phase);

    // Step 9: the legacy fallback for unprefixed animation and transition
    // events, for trusted events only.
    if !found && event.is_trusted() {
        if let Some(legacy_type) = legacy_prefixed_event_type(&event.type_()) {
            let original_type = event.type_();
            event.set_type(legacy_type);
            inner_invoke(event, &segment.invocation_target, phase);
            event.set_type(original_type);
        }
    }
}

/// <https://dom.spec.whatwg.org/#concept-event-listener-inner-invoke>
fn inner_invoke(event: &Event, object: &DomRoot, phase: ListenerPhase) -> bool {
    // Step 1.
    let mut found = false;

    // Step 2: iterate over a snapshot, so listeners added from a callback
    // are not run by this dispatch.
    let type_ = event.type_();
    for entry in object.event_target().get_listeners(&type_) {
        // Removed after the snapshot was taken.
        if entry.removed() {
            continue;
        }
        found = true;

        if entry.phase != phase {
            continue;
        }

        // Step 2.4: `once` registrations are unlinked before the callback
        // runs, so a re-dispatch from inside it cannot see them.
        if entry.once {
            object.event_target().remove_listener(&type_, &entry);
        }

        // Steps 2.6-2.8.
        if entry.passive {
            event.set_flag(EventFlags::IN_PASSIVE_LISTENER, true);
        }
        let _ = entry
            .listener
            .call_or_handle_event(event, ExceptionHandling::Report);
        event.set_flag(EventFlags::IN_PASSIVE_LISTENER, false);

        if event.flags().contains(EventFlags::STOP_IMMEDIATE_PROPAGATION) {
            break;
        }
    }

    found
}

// <https://dom.spec.whatwg.org/#concept-event-listener-invoke> step 9: the
// table of legacy vendor-prefixed event types.
fn legacy_prefixed_event_type(type_: &Atom) -> Option<Atom> {
    let legacy = match &**type_ {
        "animationend" => "webkitAnimationEnd",
        "animationiteration" => "webkitAnimationIteration",
        "animationstart" => "webkitAnimationStart",
        "transitionend" => "webkitTransitionEnd",
        _ => return None,
    };
    Some(Atom::from(legacy))
}
