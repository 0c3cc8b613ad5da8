//! Condition-based launch scheduler.
//!
//! Named one-shot conditions gate callbacks: a condition's callback runs once
//! every condition it depends on has been satisfied. Callbacks never run
//! inline; they are collected by an evaluation pass that runs on the next
//! frame of a [`FrameClock`], so several `satisfy` calls within one frame
//! settle into a single pass.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

/// Zero-argument action attached to a condition.
pub type Callback = Box<dyn FnOnce()>;

/// Misuse of the condition graph. These indicate a bug in the caller, not an
/// environmental failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    Undeclared(String),
    AlreadySatisfied(String),
    NotSatisfied(String),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undeclared(name) => write!(f, "scheduler condition '{name}' was never declared"),
            Self::AlreadySatisfied(name) => write!(f, "scheduler condition '{name}' set twice"),
            Self::NotSatisfied(name) => {
                write!(f, "reset called on unset scheduler condition '{name}'")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Source of "next frame" for deferred evaluation passes.
pub trait FrameClock {
    /// Run `frame` once, at the next frame boundary.
    fn request_frame(&self, frame: Box<dyn FnOnce()>);
}

/// A frame clock whose frames only run when the host advances it.
///
/// Used by native hosts and tests in place of the browser's animation frames.
#[derive(Default)]
pub struct QueuedFrames {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl QueuedFrames {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Number of frames waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the frames queued so far. Frames requested while these run are
    /// left for the next call. Returns how many frames ran.
    pub fn advance(&self) -> usize {
        let frames: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    /// Advance until no frames are queued, at most `max_ticks` times.
    /// Returns the number of ticks taken.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.pending() > 0 {
            self.advance();
            ticks += 1;
        }
        ticks
    }
}

impl FrameClock for QueuedFrames {
    fn request_frame(&self, frame: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(frame);
    }
}

struct Condition {
    satisfied: bool,
    pending: HashSet<String>,
    callback: Option<Callback>,
}

/// Keyed condition store. Iteration follows declaration order.
#[derive(Default)]
struct ConditionRegistry {
    order: Vec<String>,
    conditions: HashMap<String, Condition>,
}

impl ConditionRegistry {
    fn get(&self, name: &str) -> Result<&Condition, SchedulerError> {
        self.conditions
            .get(name)
            .ok_or_else(|| SchedulerError::Undeclared(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Condition, SchedulerError> {
        self.conditions
            .get_mut(name)
            .ok_or_else(|| SchedulerError::Undeclared(name.to_string()))
    }

    fn is_satisfied(&self, name: &str) -> Result<bool, SchedulerError> {
        Ok(self.get(name)?.satisfied)
    }

    /// The subset of `deps` not yet satisfied.
    fn unmet(&self, deps: &[&str]) -> Result<HashSet<String>, SchedulerError> {
        let mut pending = HashSet::new();
        for dep in deps {
            if !self.is_satisfied(dep)? {
                pending.insert(dep.to_string());
            }
        }
        Ok(pending)
    }

    fn declare(
        &mut self,
        name: &str,
        callback: Option<Callback>,
        deps: &[&str],
    ) -> Result<(), SchedulerError> {
        let pending = self.unmet(deps)?;
        if !self.conditions.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.conditions.insert(
            name.to_string(),
            Condition {
                satisfied: false,
                pending,
                callback,
            },
        );
        Ok(())
    }

    fn add_dependency(&mut self, name: &str, dep: &str) -> Result<(), SchedulerError> {
        self.get(name)?;
        if !self.is_satisfied(dep)? {
            self.get_mut(name)?.pending.insert(dep.to_string());
        }
        Ok(())
    }

    fn satisfy(&mut self, name: &str) -> Result<(), SchedulerError> {
        let condition = self.get_mut(name)?;
        if condition.satisfied {
            return Err(SchedulerError::AlreadySatisfied(name.to_string()));
        }
        condition.satisfied = true;
        for other in self.conditions.values_mut() {
            other.pending.remove(name);
        }
        Ok(())
    }

    fn reset(
        &mut self,
        name: &str,
        callback: Option<Callback>,
        deps: &[&str],
    ) -> Result<(), SchedulerError> {
        if !self.is_satisfied(name)? {
            return Err(SchedulerError::NotSatisfied(name.to_string()));
        }
        let pending = self.unmet(deps)?;
        let condition = self.get_mut(name)?;
        condition.satisfied = false;
        condition.pending = pending;
        condition.callback = callback;
        Ok(())
    }

    /// Take the callback of every unsatisfied condition with no unmet
    /// dependencies.
    fn take_runnable(&mut self) -> Vec<(String, Callback)> {
        let mut runnable = Vec::new();
        for name in &self.order {
            let Some(condition) = self.conditions.get_mut(name) else {
                continue;
            };
            if condition.satisfied || !condition.pending.is_empty() {
                continue;
            }
            if let Some(callback) = condition.callback.take() {
                runnable.push((name.clone(), callback));
            }
        }
        runnable
    }
}

struct SchedulerInner {
    registry: RefCell<ConditionRegistry>,
    clock: Rc<dyn FrameClock>,
    pass_requested: Cell<bool>,
}

/// Shared handle to a condition registry and its evaluation passes.
///
/// Cloning is cheap; all clones drive the same registry.
#[derive(Clone)]
pub struct LaunchScheduler {
    inner: Rc<SchedulerInner>,
}

impl LaunchScheduler {
    /// Create an empty scheduler. An evaluation pass is requested right away.
    pub fn new(clock: Rc<dyn FrameClock>) -> Self {
        let scheduler = Self {
            inner: Rc::new(SchedulerInner {
                registry: RefCell::new(ConditionRegistry::default()),
                clock,
                pass_requested: Cell::new(false),
            }),
        };
        scheduler.request_pass();
        scheduler
    }

    /// The clock evaluation passes are deferred to.
    pub fn clock(&self) -> Rc<dyn FrameClock> {
        self.inner.clock.clone()
    }

    /// Declare (or redeclare) an unsatisfied condition. Dependencies that are
    /// already satisfied are skipped.
    pub fn declare(
        &self,
        name: &str,
        callback: Option<Callback>,
        deps: &[&str],
    ) -> Result<(), SchedulerError> {
        let has_callback = callback.is_some();
        self.inner.registry.borrow_mut().declare(name, callback, deps)?;
        log::debug!("declared condition '{name}' (deps: {deps:?})");
        if has_callback {
            self.request_pass();
        }
        Ok(())
    }

    /// Make `name` wait on `dep` as well, unless `dep` is already satisfied.
    pub fn add_dependency(&self, name: &str, dep: &str) -> Result<(), SchedulerError> {
        self.inner.registry.borrow_mut().add_dependency(name, dep)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.inner.registry.borrow().conditions.contains_key(name)
    }

    pub fn is_satisfied(&self, name: &str) -> Result<bool, SchedulerError> {
        self.inner.registry.borrow().is_satisfied(name)
    }

    /// Mark `name` satisfied and release everything waiting on it. Runnable
    /// callbacks fire on the next evaluation pass.
    pub fn satisfy(&self, name: &str) -> Result<(), SchedulerError> {
        self.inner.registry.borrow_mut().satisfy(name)?;
        log::debug!("condition '{name}' satisfied");
        self.request_pass();
        Ok(())
    }

    /// Turn a satisfied condition back into a pending one with a fresh
    /// callback and dependency set.
    pub fn reset(
        &self,
        name: &str,
        callback: Option<Callback>,
        deps: &[&str],
    ) -> Result<(), SchedulerError> {
        let has_callback = callback.is_some();
        self.inner.registry.borrow_mut().reset(name, callback, deps)?;
        log::debug!("condition '{name}' reset (deps: {deps:?})");
        if has_callback {
            self.request_pass();
        }
        Ok(())
    }

    fn request_pass(&self) {
        if self.inner.pass_requested.replace(true) {
            return;
        }
        let weak: Weak<SchedulerInner> = Rc::downgrade(&self.inner);
        self.inner.clock.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                LaunchScheduler { inner }.run_pass();
            }
        }));
    }

    /// Fire every runnable callback. The registry is released before any
    /// callback runs, so callbacks may call back into the scheduler.
    fn run_pass(&self) {
        self.inner.pass_requested.set(false);
        let runnable = self.inner.registry.borrow_mut().take_runnable();
        for (name, callback) in runnable {
            log::debug!("running callback of condition '{name}'");
            callback();
        }
    }
}
