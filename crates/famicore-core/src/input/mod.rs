//! The input dispatcher: bindings, modifiers, the event queue and the
//! deferred-action machinery.
//!
//! Host events are queued raw and drained once per `$4016/$4017` access
//! (and at frame boundaries). Each event looks up its node in one of
//! eight hash buckets, resolves the current modifier set against the
//! node's mappings by longest prefix, and invokes the bound actions
//! through the sink the caller passes in. Digital actions are
//! reference-counted across overlapping bindings so a key and a pad
//! button mapped to the same action produce exactly one press and one
//! release.

pub mod action;
pub mod binding;
pub mod event;

use std::collections::HashMap;

use tracing::warn;

use crate::{
    error::Error,
    input::{
        action::{ActionId, ActionKind},
        binding::{Binding, MOD_KBD, MOD_KBD_BIT},
        event::{EventKey, EventType, InputEvent, pack_coords},
    },
};

const BUCKETS: usize = 8;
const MODIFIER_COUNT: usize = 8;
/// Axis deflection beyond half scale counts as "pressed".
const AXIS_PRESS_THRESHOLD: i32 = 32768 / 2;

/// Callback actions are delivered through.
pub type ActionSink<'a> = dyn FnMut(ActionId, u32) + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mapping {
    mod_bits: u8,
    action: ActionId,
}

#[derive(Debug, Clone)]
struct EventNode {
    key: EventKey,
    /// Modifier slot this event feeds, if it is a modifier source.
    modifier: Option<usize>,
    pressed: bool,
    mappings: Vec<Mapping>,
}

#[derive(Debug, Clone, Copy)]
struct QueuedEvent {
    event: InputEvent,
    processed: bool,
}

#[derive(Debug, Default)]
pub struct InputDispatcher {
    nodes: Vec<EventNode>,
    buckets: [Vec<usize>; BUCKETS],
    /// Per-action press reference counts.
    counts: HashMap<ActionId, i32>,
    queue: Vec<QueuedEvent>,
    mod_bits: u8,
    modifier_counts: [i32; MODIFIER_COUNT],
    ignore_events: bool,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    // Binding table ----------------------------------------------------------

    /// Register a binding line against a comma-separated action list.
    pub fn bind(&mut self, binding: &str, actions: &str) -> Result<(), Error> {
        let parsed = binding::parse(binding)?;
        for name in actions.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let action = action::lookup(name)
                .ok_or_else(|| Error::UnknownAction(name.into()))?;
            self.insert_mapping(parsed, action);
        }
        Ok(())
    }

    /// Declare an event source as one of the eight modifier slots.
    pub fn bind_modifier(&mut self, binding: &str, slot: usize) -> Result<(), Error> {
        if slot >= MODIFIER_COUNT {
            return Err(Error::BindingSyntax(format!("modifier slot {slot}")));
        }
        let parsed = binding::parse(binding)?;
        let node = self.node_index(parsed.key);
        self.nodes[node].modifier = Some(slot);
        Ok(())
    }

    fn insert_mapping(&mut self, binding: Binding, action: ActionId) {
        let compatible = match binding.key.kind {
            EventType::JoyAxis => action.kind() == ActionKind::Analog,
            EventType::MouseMotion => action.kind() == ActionKind::Mouse,
            _ => action.kind() == ActionKind::Digital,
        };
        if !compatible {
            warn!(?binding, ?action, "binding and action types do not match");
            return;
        }

        let node = self.node_index(binding.key);
        let mapping = Mapping {
            mod_bits: binding.mod_bits,
            action,
        };
        if !self.nodes[node].mappings.contains(&mapping) {
            self.nodes[node].mappings.push(mapping);
        }
    }

    fn node_index(&mut self, key: EventKey) -> usize {
        if let Some(found) = self.lookup_node(key) {
            return found;
        }
        self.nodes.push(EventNode {
            key,
            modifier: None,
            pressed: false,
            mappings: Vec::new(),
        });
        let index = self.nodes.len() - 1;
        self.buckets[bucket(key)].push(index);
        index
    }

    fn lookup_node(&self, key: EventKey) -> Option<usize> {
        self.buckets[bucket(key)]
            .iter()
            .copied()
            .find(|&i| self.nodes[i].key == key)
    }

    pub fn clear_bindings(&mut self) {
        self.nodes.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.counts.clear();
    }

    pub fn ignore_events(&mut self, ignore: bool) {
        self.ignore_events = ignore;
    }

    pub fn modifier_bits(&self) -> u8 {
        self.mod_bits
    }

    pub fn press_count(&self, action: ActionId) -> i32 {
        self.counts.get(&action).copied().unwrap_or(0)
    }

    // Queue ------------------------------------------------------------------

    pub fn queue(&mut self, event: InputEvent) {
        self.queue.push(QueuedEvent {
            event,
            processed: false,
        });
    }

    /// Drain the queue. With `force` false, deferred actions leave their
    /// event in the queue; with `force` true everything runs and the queue
    /// empties.
    pub fn process(&mut self, force: bool, sink: &mut ActionSink<'_>) {
        for i in 0..self.queue.len() {
            if !self.queue[i].processed {
                self.handle_event(i, force, sink);
            }
        }
        if force {
            self.queue.clear();
        }
    }

    fn handle_event(&mut self, queue_index: usize, force: bool, sink: &mut ActionSink<'_>) {
        self.queue[queue_index].processed = true;
        if self.ignore_events {
            return;
        }

        let raw = self.queue[queue_index].event;
        let Some(node_index) = self.lookup_node(raw.key()) else {
            return;
        };

        let was_pressed = self.nodes[node_index].pressed;
        let mut value = 0u32;
        let mut is_button = false;
        let mut is_axis = false;
        let mut motion: Option<InputEvent> = None;

        match raw {
            InputEvent::Keyboard { pressed, .. }
            | InputEvent::MouseButton { pressed, .. }
            | InputEvent::JoyButton { pressed, .. }
            | InputEvent::JoyAxisButton { pressed, .. }
            | InputEvent::JoyHat { pressed, .. } => {
                self.nodes[node_index].pressed = pressed;
                is_button = true;
            }
            InputEvent::JoyAxis { value: v, .. } => {
                is_axis = true;
                value = v as i32 as u32;
                self.nodes[node_index].pressed = i32::from(v).abs() > AXIS_PRESS_THRESHOLD;
            }
            InputEvent::MouseMotion { .. } => {
                motion = Some(raw);
            }
        }
        let pressed = self.nodes[node_index].pressed;

        let mut lookup_mods = self.mod_bits;
        if (is_button || is_axis) && was_pressed != pressed {
            let mut modifier = self.nodes[node_index].modifier;
            if modifier.is_some() {
                // Modifier sources can have bindings of their own, but only
                // modifier-less ones; keyboard lock overrides every slot
                // except its own.
                if raw.key().kind == EventType::Keyboard {
                    if self.mod_bits & MOD_KBD_BIT != 0 && modifier != Some(MOD_KBD) {
                        lookup_mods = MOD_KBD_BIT;
                        modifier = None;
                    } else {
                        lookup_mods = 0;
                    }
                } else {
                    lookup_mods = 0;
                }
            }
            if let Some(slot) = modifier {
                self.update_mod_bits(slot, pressed, sink);
            }
        } else if is_button && was_pressed == pressed {
            // Nothing left to do for a button that did not change.
            return;
        }

        let effective = self.effective_modifiers(node_index, lookup_mods);
        for m in 0..self.nodes[node_index].mappings.len() {
            let mapping = self.nodes[node_index].mappings[m];
            if mapping.mod_bits != effective {
                continue;
            }
            let action = mapping.action;

            if action.is_deferred() && !force {
                // Put the whole event back; it re-runs at the safe point.
                self.queue[queue_index].processed = false;
                self.nodes[node_index].pressed = was_pressed;
                return;
            }

            let mut call = true;
            let mut deliver = value;
            if action.kind() == ActionKind::Digital && is_button {
                if was_pressed == pressed {
                    continue;
                }
                let count = self.counts.entry(action).or_insert(0);
                let old = *count;
                if pressed {
                    *count += 1;
                } else if *count > 0 {
                    *count -= 1;
                }
                // Overlapping bindings: only the 0<->1 edges reach the
                // handler.
                if (old != 0 && *count != 0) || (old == 0 && *count == 0) {
                    call = false;
                }
                deliver = u32::from(pressed);
            }
            if let Some(InputEvent::MouseMotion { x, y, xrel, yrel, .. }) = motion {
                deliver = match action.category() {
                    // The light gun wants the beam position; everything
                    // else integrates deltas.
                    action::ActionCategory::Zapper1 | action::ActionCategory::Zapper2 => {
                        pack_coords(x, y)
                    }
                    _ => pack_coords(xrel, yrel),
                };
            }

            if call {
                sink(action, deliver);
            }
        }
    }

    // Modifiers --------------------------------------------------------------

    fn update_mod_bits(&mut self, slot: usize, set: bool, sink: &mut ActionSink<'_>) {
        let mut set = set;
        if slot == MOD_KBD {
            // Keyboard lock is a toggle: press flips, release is ignored.
            if !set {
                return;
            }
            set = self.mod_bits & MOD_KBD_BIT == 0;
        }

        if set {
            self.modifier_counts[slot] += 1;
        } else if self.modifier_counts[slot] > 0 {
            self.modifier_counts[slot] -= 1;
        }

        let new_bits = if self.modifier_counts[slot] != 0 {
            self.mod_bits | (1 << slot)
        } else {
            self.mod_bits & !(1 << slot)
        };
        if new_bits == self.mod_bits {
            return;
        }

        // A held key must transfer cleanly between mapping layers:
        // synthesise presses for actions that match the new modifier set,
        // then releases for those that only matched the old one.
        for pass in [Pass::Press, Pass::Release] {
            let mods = match pass {
                Pass::Press => new_bits,
                Pass::Release => self.mod_bits,
            };
            for node_index in 0..self.nodes.len() {
                if !self.nodes[node_index].pressed || self.nodes[node_index].modifier.is_some() {
                    continue;
                }
                let effective = self.effective_modifiers(node_index, mods);
                for m in 0..self.nodes[node_index].mappings.len() {
                    let mapping = self.nodes[node_index].mappings[m];
                    if mapping.mod_bits != effective
                        || mapping.action.kind() != ActionKind::Digital
                    {
                        continue;
                    }
                    let count = self.counts.entry(mapping.action).or_insert(0);
                    match pass {
                        Pass::Press => {
                            *count += 1;
                            if *count == 1 {
                                sink(mapping.action, 1);
                            }
                        }
                        Pass::Release => {
                            if *count == 0 {
                                continue;
                            }
                            *count -= 1;
                            if *count == 0 {
                                sink(mapping.action, 0);
                            }
                        }
                    }
                }
            }
        }

        self.mod_bits = new_bits;
    }

    /// Longest-prefix modifier resolution: the exact set, the set without
    /// keyboard lock, then no modifiers.
    fn effective_modifiers(&self, node_index: usize, mods: u8) -> u8 {
        let node = &self.nodes[node_index];
        let tries = [mods, mods & !MOD_KBD_BIT, 0];
        for (i, &candidate) in tries.iter().enumerate() {
            let found = node
                .mappings
                .iter()
                .any(|mapping| mapping.mod_bits == candidate);
            // Keyboard-lock mode only sees the exact set for key events.
            if node.key.kind == EventType::Keyboard && mods & MOD_KBD_BIT != 0 && i == 0 {
                return candidate;
            }
            if found || candidate == 0 {
                return candidate;
            }
        }
        0
    }

    // Focus loss -------------------------------------------------------------

    /// Release everything currently pressed so no emulated button stays
    /// stuck when the host window loses focus. Keyboard lock survives;
    /// every other modifier is dropped.
    pub fn release_all(&mut self, sink: &mut ActionSink<'_>) {
        for node_index in 0..self.nodes.len() {
            if !self.nodes[node_index].pressed {
                continue;
            }
            let effective = self.effective_modifiers(node_index, self.mod_bits);
            for m in 0..self.nodes[node_index].mappings.len() {
                let mapping = self.nodes[node_index].mappings[m];
                if mapping.mod_bits != effective {
                    continue;
                }
                let count = self.counts.entry(mapping.action).or_insert(0);
                if *count != 0 {
                    sink(mapping.action, 0);
                }
                *count = 0;
            }
            self.nodes[node_index].pressed = false;
        }

        self.modifier_counts = [0; MODIFIER_COUNT];
        self.mod_bits &= MOD_KBD_BIT;
    }
}

#[derive(Clone, Copy)]
enum Pass {
    Press,
    Release,
}

fn bucket(key: EventKey) -> usize {
    (key.index & 7) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::action::lookup;

    fn key_event(key: u32, pressed: bool) -> InputEvent {
        InputEvent::Keyboard { key, pressed }
    }

    fn drain(d: &mut InputDispatcher, force: bool) -> Vec<(ActionId, u32)> {
        let mut out = Vec::new();
        d.process(force, &mut |action, value| out.push((action, value)));
        out
    }

    #[test]
    fn binding_twice_is_idempotent() {
        let mut a = InputDispatcher::new();
        a.bind("Keyboard z", "controller1_a").expect("bind");
        let single = a.nodes.clone();
        a.bind("Keyboard z", "controller1_a").expect("bind");
        assert_eq!(a.nodes.len(), single.len());
        assert_eq!(a.nodes[0].mappings.len(), 1);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut d = InputDispatcher::new();
        assert!(matches!(
            d.bind("Keyboard z", "warp_core_eject"),
            Err(Error::UnknownAction(_))
        ));
    }

    #[test]
    fn overlapping_bindings_press_once() {
        let mut d = InputDispatcher::new();
        d.bind("Keyboard z", "controller1_a").expect("bind");
        d.bind("Joystick 0 Button 0", "controller1_a").expect("bind");
        let a = lookup("controller1_a").expect("action");

        d.queue(key_event('z' as u32, true));
        d.queue(InputEvent::JoyButton {
            device: 0,
            button: 0,
            pressed: true,
        });
        let calls = drain(&mut d, true);
        assert_eq!(calls, vec![(a, 1)]);
        assert_eq!(d.press_count(a), 2);

        d.queue(key_event('z' as u32, false));
        let calls = drain(&mut d, true);
        assert!(calls.is_empty());
        d.queue(InputEvent::JoyButton {
            device: 0,
            button: 0,
            pressed: false,
        });
        let calls = drain(&mut d, true);
        assert_eq!(calls, vec![(a, 0)]);
        assert_eq!(d.press_count(a), 0);
    }

    #[test]
    fn modifier_gates_the_binding() {
        let mut d = InputDispatcher::new();
        d.bind_modifier("Keyboard lctrl", 4).expect("modifier");
        d.bind("[CTRL] Keyboard r", "soft_reset").expect("bind");
        let reset = lookup("soft_reset").expect("action");

        // Without CTRL held, r does nothing.
        d.queue(key_event('r' as u32, true));
        d.queue(key_event('r' as u32, false));
        assert!(drain(&mut d, true).is_empty());

        // With CTRL held, exactly one press.
        d.queue(key_event(0x114, true));
        d.queue(key_event('r' as u32, true));
        let calls = drain(&mut d, true);
        assert_eq!(calls, vec![(reset, 1)]);

        // Releasing CTRL before r: the held key transfers to the
        // no-modifier layer (which has no mapping), releasing the action.
        d.queue(key_event(0x114, false));
        let calls = drain(&mut d, true);
        assert_eq!(calls, vec![(reset, 0)]);
        d.queue(key_event('r' as u32, false));
        assert!(drain(&mut d, true).is_empty());
        assert_eq!(d.press_count(reset), 0);
    }

    #[test]
    fn deferred_actions_wait_for_the_safe_point() {
        let mut d = InputDispatcher::new();
        d.bind("Keyboard f5", "quick_save_state").expect("bind");
        let save = lookup("quick_save_state").expect("action");

        d.queue(key_event(0x124, true));
        assert!(drain(&mut d, false).is_empty());
        // Still queued; the forced drain delivers it.
        let calls = drain(&mut d, true);
        assert_eq!(calls, vec![(save, 1)]);
    }

    #[test]
    fn release_all_unsticks_held_buttons() {
        let mut d = InputDispatcher::new();
        d.bind("Keyboard z", "controller1_a").expect("bind");
        let a = lookup("controller1_a").expect("action");

        d.queue(key_event('z' as u32, true));
        drain(&mut d, true);
        assert_eq!(d.press_count(a), 1);

        let mut released = Vec::new();
        d.release_all(&mut |action, value| released.push((action, value)));
        assert_eq!(released, vec![(a, 0)]);
        assert_eq!(d.press_count(a), 0);
    }

    #[test]
    fn matched_press_release_sequences_zero_every_count() {
        let mut d = InputDispatcher::new();
        d.bind("Keyboard z", "controller1_a").expect("bind");
        d.bind("Keyboard x", "controller1_b").expect("bind");
        for _ in 0..3 {
            d.queue(key_event('z' as u32, true));
            d.queue(key_event('x' as u32, true));
            d.queue(key_event('x' as u32, false));
            d.queue(key_event('z' as u32, false));
        }
        drain(&mut d, true);
        for desc in action::all() {
            assert_eq!(d.press_count(desc.id), 0, "{} stuck", desc.name);
        }
    }
}
