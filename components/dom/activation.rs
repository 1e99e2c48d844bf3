/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::event::Event;
use crate::eventtarget::EventTarget;

/// Trait for objects with defined activation behavior.
pub trait Activatable {
    /// <https://html.spec.whatwg.org/multipage/#run-pre-click-activation-steps>
    fn pre_click_activation(&self) {}

    /// <https://html.spec.whatwg.org/multipage/#run-canceled-activation-steps>
    fn canceled_activation(&self) {}

    /// Run after dispatch when this object was selected as the activation
    /// target and the event was not canceled.
    /// <https://dom.spec.whatwg.org/#eventtarget-activation-behavior>
    fn activation_behavior(&self, event: &Event, target: &EventTarget);
}
