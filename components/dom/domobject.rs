/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::rc::Rc;

use crate::activation::Activatable;
use crate::event::Event;
use crate::eventtarget::EventTarget;

/// A shared handle to an object participating in event dispatch.
pub type DomRoot = Rc<dyn DomObject>;

/// The surface the dispatcher needs from an embedder's tree. Objects that do
/// not live in a tree can rely on the defaults and only supply their
/// [`EventTarget`].
pub trait DomObject {
    /// The listener registry of this object. Also its identity: two handles
    /// denote the same object iff they return the same address.
    fn event_target(&self) -> &EventTarget;

    /// <https://dom.spec.whatwg.org/#get-the-parent>
    fn get_the_parent(&self, _event: &Event) -> Option<DomRoot> {
        None
    }

    /// The shadow-including root of this object, or `None` when the object
    /// is its own root.
    /// <https://dom.spec.whatwg.org/#concept-tree-root>
    fn get_root_node(&self) -> Option<DomRoot> {
        None
    }

    /// <https://dom.spec.whatwg.org/#concept-shadow-including-inclusive-ancestor>
    ///
    /// The default holds for trees without shadow boundaries: everything
    /// reachable from a root through `get_the_parent` stays below it.
    fn is_shadow_including_inclusive_ancestor_of(&self, _object: &DomRoot) -> bool {
        true
    }

    /// Retarget `object` against `self`. Identity unless a shadow boundary
    /// lies between them.
    /// <https://dom.spec.whatwg.org/#retarget>
    fn retarget(&self, object: &DomRoot) -> DomRoot {
        object.clone()
    }

    /// Activation behavior hooks, for objects that have any.
    /// <https://dom.spec.whatwg.org/#eventtarget-activation-behavior>
    fn as_activatable(&self) -> Option<&dyn Activatable> {
        None
    }
}

/// Whether two handles denote the same object.
pub fn same_object(a: &DomRoot, b: &DomRoot) -> bool {
    std::ptr::eq(a.event_target(), b.event_target())
}
