// Copyright (C) 2024 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;

use rand::distributions::Alphanumeric;
use rand::Rng;
use webapp_prefs::OpenConfig;

use super::*;
use crate::utils::BackgroundRuntime;

const RED: i32 = 0xFFFF0000u32 as i32;

fn allocator(max_slots: usize) -> (BackgroundRuntime, WebAppAllocator) {
    webapp_utils::test::log::init();
    let runtime = BackgroundRuntime::new(2).unwrap();
    let prefs = PreferenceStore::open(&OpenConfig::new("webapps")).unwrap();
    let allocator = WebAppAllocator::new(prefs, max_slots, runtime.handle());
    (runtime, allocator)
}

fn random_identity() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("org.example.app{}", suffix.to_lowercase())
}

// @tc.name: ut_allocator_fresh
// @tc.desc: Test the first allocation on an empty store
// @tc.precon: NA
// @tc.step: 1. Allocate a slot for an identity without icon
// @tc.expect: Slot 0 is newly bound with an unknown color and no origin
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_fresh() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let allocation = allocator.find_or_allocate("org.a", "A", None).unwrap();
    assert_eq!(allocation.slot, Slot::new(0));
    assert!(allocation.newly_allocated);
    assert!(allocation.color_task.is_none());

    let prefs = allocator.prefs();
    assert_eq!(prefs.get_string("package-name-0").as_deref(), Some("org.a"));
    assert_eq!(prefs.get_int("color-0"), Some(UNKNOWN_COLOR));
    assert!(!prefs.contains("origin-0"));
    assert_eq!(allocator.get_identity(Slot::new(0)).as_deref(), Some("org.a"));
    assert_eq!(allocator.get_color(Slot::new(0)), UNKNOWN_COLOR);
}

// @tc.name: ut_allocator_idempotent
// @tc.desc: Test that an allocated identity keeps its slot untouched
// @tc.precon: NA
// @tc.step: 1. Allocate an identity and store an origin and color
//           2. Allocate the same identity again
// @tc.expect: Same slot, not new, binding unchanged
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_idempotent() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let slot = allocator.find_or_allocate("org.a", "A", None).unwrap().slot;
    allocator.set_origin(slot, "https://a.example").unwrap();
    allocator.set_color(slot, RED).unwrap();
    let before = allocator.prefs().all();

    let again = allocator
        .find_or_allocate("org.a", "A", Some(&Icon::solid(2, 2, [0, 0, 255, 255])))
        .unwrap();
    assert_eq!(again.slot, slot);
    assert!(!again.newly_allocated);
    assert!(again.color_task.is_none());
    assert_eq!(allocator.prefs().all(), before);
}

// @tc.name: ut_allocator_first_fit
// @tc.desc: Test that the lowest free slot is reused after a release
// @tc.precon: NA
// @tc.step: 1. Allocate a, b and c
//           2. Release b and allocate d
// @tc.expect: d takes slot 1, a and c keep theirs
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_first_fit() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        assert_eq!(
            allocator.find_or_allocate(id, id, None).unwrap().slot,
            Slot::new(i)
        );
    }
    let (slot, task) = allocator.release_by_identity("b").unwrap();
    assert_eq!(slot, Slot::new(1));
    task.join();

    assert_eq!(allocator.find_or_allocate("d", "d", None).unwrap().slot, Slot::new(1));
    assert_eq!(allocator.find_index_for_identity("a"), Some(Slot::new(0)));
    assert_eq!(allocator.find_index_for_identity("c"), Some(Slot::new(2)));
    assert_eq!(allocator.find_index_for_identity("b"), None);
}

// @tc.name: ut_allocator_exhausted
// @tc.desc: Test allocation when every slot is bound
// @tc.precon: NA
// @tc.step: 1. Fill three slots
//           2. Allocate a fourth identity
// @tc.expect: SlotExhausted is returned and the store is unchanged
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_exhausted() {
    let (_runtime, allocator) = allocator(3);
    for id in ["a", "b", "c"] {
        allocator.find_or_allocate(id, id, None).unwrap();
    }
    let before = allocator.prefs().all();
    let err = allocator.find_or_allocate("d", "d", None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SlotExhausted);
    assert_eq!(allocator.prefs().all(), before);
    assert_eq!(allocator.find_index_for_identity("d"), None);
}

// @tc.name: ut_allocator_concurrent
// @tc.desc: Test concurrent allocation of overlapping identities
// @tc.precon: NA
// @tc.step: 1. Allocate the same random identities from eight threads
// @tc.expect: Each identity is bound exactly once to a distinct slot
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_concurrent() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let identities: Vec<String> = (0..20).map(|_| random_identity()).collect();
    let unique: HashSet<&String> = identities.iter().collect();

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for id in &identities {
                    allocator.find_or_allocate(id, id, None).unwrap();
                }
            });
        }
    });

    let bindings = allocator.bindings();
    assert_eq!(bindings.len(), unique.len());
    let bound: HashSet<&String> = bindings.iter().map(|b| &b.identity).collect();
    assert_eq!(bound, unique);
    let slots: Vec<usize> = bindings.iter().map(|b| b.slot.index()).collect();
    assert_eq!(slots, (0..unique.len()).collect::<Vec<_>>());
}

// @tc.name: ut_allocator_color_async
// @tc.desc: Test that a background color update only writes the color
// @tc.precon: NA
// @tc.step: 1. Allocate with a red icon and store an origin
//           2. Join the color task
// @tc.expect: Color is red, identity and origin unchanged
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_color_async() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let icon = Icon::solid(4, 4, [255, 0, 0, 255]);
    let allocation = allocator.find_or_allocate("org.a", "A", Some(&icon)).unwrap();
    let slot = allocation.slot;
    allocation.color_task.unwrap().join();
    assert_eq!(allocator.get_color(slot), RED);

    allocator.set_origin(slot, "https://a.example").unwrap();
    allocator
        .update_color_async(slot, Icon::solid(4, 4, [0, 0, 255, 255]))
        .unwrap()
        .join();
    assert_eq!(allocator.get_color(slot), 0xFF0000FFu32 as i32);
    assert_eq!(allocator.get_identity(slot).as_deref(), Some("org.a"));
    assert_eq!(allocator.get_origin(slot).as_deref(), Some("https://a.example"));
}

// @tc.name: ut_allocator_color_failure
// @tc.desc: Test that a failed extraction stores the unknown color
// @tc.precon: NA
// @tc.step: 1. Allocate and set a color
//           2. Update the color from a fully transparent icon
// @tc.expect: The color becomes unknown
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_color_failure() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let slot = allocator.find_or_allocate("org.a", "A", None).unwrap().slot;
    allocator.set_color(slot, RED).unwrap();
    allocator
        .update_color_async(slot, Icon::solid(4, 4, [255, 0, 0, 0]))
        .unwrap()
        .join();
    assert_eq!(allocator.get_color(slot), UNKNOWN_COLOR);
    assert_eq!(allocator.get_identity(slot).as_deref(), Some("org.a"));
}

// @tc.name: ut_allocator_color_after_release
// @tc.desc: Test that no color is scheduled for a released slot
// @tc.precon: NA
// @tc.step: 1. Allocate and release a slot
//           2. Update its color
// @tc.expect: InvalidIdentity, the slot stays fully unbound
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_color_after_release() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let slot = allocator.find_or_allocate("org.a", "A", None).unwrap().slot;
    allocator.release_by_slot(slot).join();
    let err = allocator
        .update_color_async(slot, Icon::solid(4, 4, [255, 0, 0, 255]))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidIdentity);
    assert!(allocator.prefs().is_empty());
}

// @tc.name: ut_allocator_color_after_rebind
// @tc.desc: Test that a pending color is dropped once the slot is rebound
// @tc.precon: NA
// @tc.step: 1. Hold the only background thread busy
//           2. Schedule a red color for org.a, then rebind the slot to org.b
//           3. Let the background thread run
// @tc.expect: org.b keeps the unknown color
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_color_after_rebind() {
    webapp_utils::test::log::init();
    let runtime = BackgroundRuntime::new(1).unwrap();
    let prefs = PreferenceStore::open(&OpenConfig::new("webapps")).unwrap();
    let allocator = WebAppAllocator::new(prefs, MAX_SLOTS, runtime.handle());
    let slot = allocator.find_or_allocate("org.a", "A", None).unwrap().slot;

    let (gate, wait) = mpsc::channel::<()>();
    let blocker = BackgroundTask::spawn(&runtime.handle(), move || {
        let _ = wait.recv();
    });
    let color = allocator
        .update_color_async(slot, Icon::solid(4, 4, [255, 0, 0, 255]))
        .unwrap();

    let mut tx = allocator.begin();
    tx.clear(slot);
    tx.set_identity(slot, "org.b");
    tx.end().unwrap();

    gate.send(()).unwrap();
    blocker.join();
    color.join();
    assert_eq!(allocator.get_identity(slot).as_deref(), Some("org.b"));
    assert_eq!(allocator.get_color(slot), UNKNOWN_COLOR);
}

// @tc.name: ut_allocator_unbound_metadata
// @tc.desc: Test that a free slot takes no origin or color
// @tc.precon: NA
// @tc.step: 1. Set origin and color of a free slot
//           2. Update the binding of a free slot with an icon only
//           3. Store an origin for a free slot behind the allocator's back
// @tc.expect: InvalidIdentity each time, the origin lookup ignores the free slot
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_unbound_metadata() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let slot = Slot::new(5);
    let err = allocator.set_origin(slot, "https://x.example").unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidIdentity);
    let err = allocator.set_color(slot, RED).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidIdentity);
    let err = allocator
        .update_binding(slot, None, Some(&Icon::solid(2, 2, [255, 0, 0, 255])))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidIdentity);
    assert!(allocator.prefs().is_empty());
    assert_eq!(allocator.find_index_for_origin("https://x.example"), None);

    allocator
        .prefs()
        .edit()
        .put_string("origin-5", "https://x.example")
        .commit()
        .unwrap();
    assert_eq!(allocator.find_index_for_origin("https://x.example"), None);
}

// @tc.name: ut_allocator_release
// @tc.desc: Test releasing slots
// @tc.precon: NA
// @tc.step: 1. Allocate a slot with origin and color
//           2. Release it twice
//           3. Release an unknown identity
// @tc.expect: All keys are removed, the second release is harmless, unknown yields None
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_release() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let slot = allocator.find_or_allocate("org.a", "A", None).unwrap().slot;
    allocator.set_origin(slot, "https://a.example").unwrap();
    allocator.set_color(slot, RED).unwrap();

    allocator.release_by_slot(slot).join();
    assert!(allocator.prefs().is_empty());
    assert_eq!(allocator.get_identity(slot), None);
    assert_eq!(allocator.get_origin(slot), None);
    assert_eq!(allocator.get_color(slot), UNKNOWN_COLOR);

    allocator.release_by_slot(slot).join();
    assert!(allocator.prefs().is_empty());
    assert!(allocator.release_by_identity("org.a").is_none());
}

// @tc.name: ut_allocator_origin_lookup
// @tc.desc: Test that origin and identity lookups do not alias
// @tc.precon: NA
// @tc.step: 1. Allocate two slots and set an origin on the second
//           2. Look up the origin as origin and as identity
// @tc.expect: Only the origin lookup finds the second slot
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_origin_lookup() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    allocator.find_or_allocate("org.a", "A", None).unwrap();
    let slot = allocator.find_or_allocate("org.b", "B", None).unwrap().slot;
    allocator.set_origin(slot, "https://b.example").unwrap();

    assert_eq!(allocator.find_index_for_origin("https://b.example"), Some(slot));
    assert_eq!(allocator.find_index_for_identity("https://b.example"), None);
    assert_eq!(allocator.find_index_for_origin("org.b"), None);
}

// @tc.name: ut_allocator_update_binding
// @tc.desc: Test rewriting slot bindings
// @tc.precon: NA
// @tc.step: 1. Update a slot with an icon only
//           2. Update it with an identity only
//           3. Move that identity to another slot
// @tc.expect: Identity kept, color reset, old slot cleared
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_update_binding() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    let slot = allocator.find_or_allocate("org.a", "A", None).unwrap().slot;

    let task = allocator
        .update_binding(slot, None, Some(&Icon::solid(2, 2, [255, 0, 0, 255])))
        .unwrap();
    task.unwrap().join();
    assert_eq!(allocator.get_identity(slot).as_deref(), Some("org.a"));
    assert_eq!(allocator.get_color(slot), RED);

    assert!(allocator
        .update_binding(slot, Some("org.b"), None)
        .unwrap()
        .is_none());
    assert_eq!(allocator.get_identity(slot).as_deref(), Some("org.b"));
    assert_eq!(allocator.get_color(slot), UNKNOWN_COLOR);

    allocator
        .update_binding(Slot::new(5), Some("org.b"), None)
        .unwrap();
    assert_eq!(allocator.find_index_for_identity("org.b"), Some(Slot::new(5)));
    assert_eq!(allocator.get_identity(slot), None);
}

// @tc.name: ut_allocator_empty_identity
// @tc.desc: Test that an empty identity is never bound or found
// @tc.precon: NA
// @tc.step: 1. Look up and allocate the empty identity
// @tc.expect: Lookup misses, allocation fails with InvalidIdentity
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_empty_identity() {
    let (_runtime, allocator) = allocator(MAX_SLOTS);
    assert_eq!(allocator.find_index_for_identity(""), None);
    let err = allocator.find_or_allocate("", "", None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidIdentity);
    assert!(allocator.prefs().is_empty());
}

// @tc.name: ut_allocator_out_of_range
// @tc.desc: Test that out of range slots are rejected
// @tc.precon: NA
// @tc.step: 1. Read the identity of slot max_slots
// @tc.expect: The call panics
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
#[should_panic]
fn ut_allocator_out_of_range() {
    let (_runtime, allocator) = allocator(3);
    allocator.get_identity(Slot::new(3));
}

// @tc.name: ut_allocator_usable_after_out_of_range
// @tc.desc: Test that a rejected slot index does not break the allocator
// @tc.precon: NA
// @tc.step: 1. Read the color of slot max_slots and catch the panic
//           2. Panic inside a transaction on an out of range slot
//           3. Allocate and release
// @tc.expect: Both calls panic, later calls succeed
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_usable_after_out_of_range() {
    let (_runtime, allocator) = allocator(3);
    let res = panic::catch_unwind(AssertUnwindSafe(|| allocator.get_color(Slot::new(3))));
    assert!(res.is_err());
    let res = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut tx = allocator.begin();
        tx.set_identity(Slot::new(3), "org.a");
    }));
    assert!(res.is_err());

    let allocation = allocator.find_or_allocate("org.b", "B", None).unwrap();
    assert_eq!(allocation.slot, Slot::new(0));
    allocator.set_origin(allocation.slot, "https://b.example").unwrap();
    allocator.release_by_slot(allocation.slot).join();
    assert!(allocator.bindings().is_empty());
}

// @tc.name: ut_allocator_persist
// @tc.desc: Test that bindings survive reopening the store
// @tc.precon: NA
// @tc.step: 1. Allocate in a directory backed store
//           2. Reopen the store with a new allocator
// @tc.expect: The identity is found in the same slot with its origin
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_allocator_persist() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = BackgroundRuntime::new(1).unwrap();
    let mut config = OpenConfig::new("webapps");
    config.directory(dir.path());
    {
        let prefs = PreferenceStore::open(&config).unwrap();
        let allocator = WebAppAllocator::new(prefs, MAX_SLOTS, runtime.handle());
        allocator.find_or_allocate("org.a", "A", None).unwrap();
        let slot = allocator.find_or_allocate("org.b", "B", None).unwrap().slot;
        allocator.set_origin(slot, "https://b.example").unwrap();
    }
    let prefs = PreferenceStore::open(&config).unwrap();
    let allocator = WebAppAllocator::new(prefs, MAX_SLOTS, runtime.handle());
    assert_eq!(allocator.find_index_for_identity("org.b"), Some(Slot::new(1)));
    assert_eq!(
        allocator.bindings(),
        vec![
            SlotBinding {
                slot: Slot::new(0),
                identity: "org.a".to_string(),
                origin: None,
                color: UNKNOWN_COLOR,
            },
            SlotBinding {
                slot: Slot::new(1),
                identity: "org.b".to_string(),
                origin: Some("https://b.example".to_string()),
                color: UNKNOWN_COLOR,
            },
        ]
    );
}

// @tc.name: ut_slot_names
// @tc.desc: Test names derived from a slot index
// @tc.precon: NA
// @tc.step: 1. Derive profile, action and class of slot 7
// @tc.expect: Each name embeds the index
// @tc.type: FUNC
// @tc.require: issues#WEBAPP07
#[test]
fn ut_slot_names() {
    let slot = Slot::new(7);
    assert_eq!(slot.profile_name(), "webapp7");
    assert_eq!(slot.action("org.mozilla.gecko"), "org.mozilla.gecko.WEBAPP7");
    assert_eq!(slot.action("org.mozilla.fennec"), "org.mozilla.fennec.WEBAPP7");
    assert_eq!(
        slot.class_name("org.mozilla.fennec"),
        "org.mozilla.fennec.WebApps$WebApp7"
    );
    assert_eq!(slot.to_string(), "7");
}
