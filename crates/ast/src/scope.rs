use parking_lot::RwLock;
use rpds::HashTrieMapSync;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::{
    fmt, mem,
    sync::{Arc, Weak},
};

use crate::hir::{Closure, Val};

pub type Bindings = HashTrieMapSync<SmolStr, Val>;

/// A chain of binding frames. Cloning a `Scope` shares the frame, so closures
/// keep their defining frame alive for as long as they are reachable.
#[derive(Clone)]
pub struct Scope(Arc<Frame>);

struct Frame {
    bindings: RwLock<Bindings>,
    parent: Option<Scope>,
    sealed: bool,
}

/// Observes a frame without keeping it alive.
#[derive(Clone)]
pub struct WeakScope(Weak<Frame>);

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.0.upgrade().map(Scope)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindError {
    /// No frame on the chain owns the name.
    Unbound,
    /// The owning frame is sealed.
    Sealed,
}

impl Scope {
    /// A parentless frame that rejects every write.
    pub fn sealed(bindings: Bindings) -> Self {
        Self(Arc::new(Frame {
            bindings: RwLock::new(bindings),
            parent: None,
            sealed: true,
        }))
    }

    pub fn child(&self) -> Self {
        Self(Arc::new(Frame {
            bindings: RwLock::new(HashTrieMapSync::new_sync()),
            parent: Some(self.clone()),
            sealed: false,
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    pub fn is_sealed(&self) -> bool {
        self.0.sealed
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Arc::downgrade(&self.0))
    }

    /// Number of live handles to this frame: clones, child frames and
    /// closures that captured it.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Gives up the handle of the frame's owner (a run or a call). Frames that
    /// are then reachable only through closures bound inside themselves would
    /// never be freed, so their bindings are cleared to break the cycle.
    pub fn release(self) {
        if self.holders() == 1 {
            return;
        }

        for frame in Reachability::trace(&self).garbage() {
            frame.clear();
        }
    }

    fn clear(&self) {
        let bindings = mem::replace(&mut *self.0.bindings.write(), HashTrieMapSync::new_sync());
        drop(bindings);
    }

    /// Innermost binding of `key` along the chain.
    pub fn find(&self, key: &str) -> Option<Val> {
        let mut frame = Some(self);
        while let Some(scope) = frame {
            if let Some(val) = scope.0.bindings.read().get(key) {
                return Some(val.clone());
            }
            frame = scope.parent();
        }

        None
    }

    pub fn owns(&self, key: &str) -> bool {
        self.0.bindings.read().contains_key(key)
    }

    /// Binds `key` in this frame only, shadowing any outer binding.
    pub fn define(&self, key: SmolStr, val: Val) -> Result<(), BindError> {
        if self.is_sealed() {
            return Err(BindError::Sealed);
        }

        self.0.bindings.write().insert_mut(key, val);
        Ok(())
    }

    /// Overwrites the binding in the nearest frame that already owns `key`.
    pub fn set(&self, key: &str, val: Val) -> Result<(), BindError> {
        let mut frame = Some(self);
        while let Some(scope) = frame {
            if scope.owns(key) {
                if scope.is_sealed() {
                    return Err(BindError::Sealed);
                }

                scope.0.bindings.write().insert_mut(key.into(), val);
                return Ok(());
            }
            frame = scope.parent();
        }

        Err(BindError::Unbound)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .0
            .bindings
            .read()
            .keys()
            .cloned()
            .collect::<Vec<SmolStr>>();

        f.debug_struct("Scope")
            .field("names", &names)
            .field("sealed", &self.is_sealed())
            .field("parent", &self.0.parent)
            .finish()
    }
}

/// Trial deletion over the frames and closures reachable from one frame.
/// A node with more handles than the traced edges pointing at it is held from
/// outside (the stack, a result, another run) and keeps everything it reaches
/// alive. Whatever stays unreached is a dead cycle.
struct Reachability {
    target: usize,
    nodes: FxHashMap<usize, Entry>,
}

struct Entry {
    holders: usize,
    internal: usize,
    pinned: bool,
    edges: Vec<usize>,
    frame: Option<Scope>,
}

enum Held {
    Frame(Scope),
    Closure(Arc<Closure>),
}

fn frame_key(scope: &Scope) -> usize {
    Arc::as_ptr(&scope.0) as usize
}

fn closure_key(closure: &Arc<Closure>) -> usize {
    Arc::as_ptr(closure) as usize
}

impl Reachability {
    /// `owner` is the handle being released, so it does not count as an
    /// outside holder.
    fn trace(owner: &Scope) -> Self {
        let mut graph = Self {
            target: frame_key(owner),
            nodes: FxHashMap::default(),
        };

        // the owner's own handle is the first edge counted into it
        let mut work = Vec::new();
        graph.discover_frame(owner, &mut work);

        while let Some(held) = work.pop() {
            let (key, edges) = match held {
                Held::Frame(scope) => {
                    let mut edges = Vec::new();
                    // the sealed root only holds builtins
                    if !scope.is_sealed() {
                        if let Some(parent) = scope.parent() {
                            edges.push(graph.discover_frame(parent, &mut work));
                        }

                        let bindings = scope.0.bindings.read().clone();
                        for val in bindings.values() {
                            graph.discover_val(val, &mut edges, &mut work);
                        }
                    }
                    (frame_key(&scope), edges)
                }
                Held::Closure(closure) => {
                    let edges = vec![graph.discover_frame(&closure.scope, &mut work)];
                    (closure_key(&closure), edges)
                }
            };

            if let Some(entry) = graph.nodes.get_mut(&key) {
                entry.edges = edges;
            }
        }

        graph
    }

    /// Records the handle count before this trace clones the frame.
    fn discover_frame(&mut self, scope: &Scope, work: &mut Vec<Held>) -> usize {
        let key = frame_key(scope);
        let entry = self.nodes.entry(key).or_insert_with(|| {
            let entry = Entry {
                holders: scope.holders(),
                internal: 0,
                pinned: false,
                edges: Vec::new(),
                frame: Some(scope.clone()),
            };
            work.push(Held::Frame(scope.clone()));
            entry
        });
        entry.internal += 1;

        key
    }

    fn discover_closure(&mut self, closure: &Arc<Closure>, work: &mut Vec<Held>) -> usize {
        let key = closure_key(closure);
        let entry = self.nodes.entry(key).or_insert_with(|| {
            let entry = Entry {
                holders: Arc::strong_count(closure),
                internal: 0,
                pinned: false,
                edges: Vec::new(),
                frame: None,
            };
            work.push(Held::Closure(closure.clone()));
            entry
        });
        entry.internal += 1;

        key
    }

    fn discover_val(&mut self, val: &Val, edges: &mut Vec<usize>, work: &mut Vec<Held>) {
        match val {
            Val::Closure(closure) => edges.push(self.discover_closure(closure, work)),
            // array storage is shared between copies, so closures inside
            // arrays are treated as held from outside
            Val::Array(items) => {
                for item in items.iter() {
                    let mut nested = Vec::new();
                    self.discover_val(item, &mut nested, work);
                    for key in nested {
                        if let Some(entry) = self.nodes.get_mut(&key) {
                            entry.internal -= 1;
                            entry.pinned = true;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Frames no outside holder can reach.
    fn garbage(mut self) -> Vec<Scope> {
        let mut live = FxHashSet::default();
        let mut work = self
            .nodes
            .iter()
            .filter(|(_, entry)| entry.pinned || entry.holders > entry.internal)
            .map(|(key, _)| *key)
            .collect::<Vec<_>>();

        while let Some(key) = work.pop() {
            if !live.insert(key) {
                continue;
            }
            if let Some(entry) = self.nodes.get(&key) {
                work.extend(entry.edges.iter().copied());
            }
        }

        if live.contains(&self.target) {
            return Vec::new();
        }

        self.nodes
            .drain()
            .filter(|(key, _)| !live.contains(key))
            .filter_map(|(_, entry)| entry.frame)
            .filter(|frame| !frame.is_sealed())
            .collect()
    }
}
