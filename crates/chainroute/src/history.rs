//! Navigation history shared by several routers.
//!
//! A [`History`] owns the mounted routers and the current fragment. Starting
//! it reads the initial location; each [`History::navigate`] records a new
//! entry and, when asked to, dispatches the fragment to the first router
//! that recognizes it. Routers mounted later are consulted first.

use std::fmt;
use std::rc::Rc;

use chainroute_pattern::{fragment_from_url, normalize_fragment};
use serde_json::Value;

use crate::error::RouterError;
use crate::router::{Dispatch, Router};

/// Handle to a router mounted on a [`History`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouterId(usize);

impl RouterId {
    /// Position of the router in mount order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A navigation announced at the history level.
#[derive(Debug, Clone, Copy)]
pub struct HistoryEvent<'a> {
    pub router: RouterId,
    pub name: &'a str,
    pub args: &'a [Value],
}

pub type HistoryListener = Rc<dyn Fn(&HistoryEvent<'_>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    /// Application root stripped from path-based URLs
    pub root: String,
    /// Record the initial fragment without dispatching it
    pub silent: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            silent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Dispatch the new fragment
    pub trigger: bool,
    /// Overwrite the current entry instead of adding one
    pub replace: bool,
}

impl NavigateOptions {
    pub fn trigger() -> Self {
        Self {
            trigger: true,
            replace: false,
        }
    }
}

/// What a call to [`History::navigate`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// The fragment was already current
    Unchanged,
    /// The entry was recorded without dispatching
    Recorded,
    Dispatched(Dispatch),
}

#[derive(Default)]
pub struct History {
    routers: Vec<Router>,
    listeners: Vec<HistoryListener>,
    root: String,
    started: bool,
    fragment: Option<String>,
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a router.
    pub fn mount(&mut self, router: Router) -> RouterId {
        let id = RouterId(self.routers.len());
        log::debug!("mounting router #{}", id.0);
        self.routers.push(router);
        id
    }

    pub fn router(&self, id: RouterId) -> Option<&Router> {
        self.routers.get(id.0)
    }

    pub fn router_mut(&mut self, id: RouterId) -> Option<&mut Router> {
        self.routers.get_mut(id.0)
    }

    /// Subscribes to every announced navigation of every mounted router.
    pub fn on_route<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&HistoryEvent<'_>) + 'static,
    {
        self.listeners.push(Rc::new(f));
        self
    }

    /// Reads the initial location and, unless `silent`, dispatches it.
    ///
    /// Returns `None` for a silent start.
    pub fn start(
        &mut self,
        url: &str,
        options: StartOptions,
    ) -> Result<Option<Dispatch>, RouterError> {
        if self.started {
            return Err(RouterError::AlreadyStarted);
        }
        self.started = true;
        self.root = options.root;

        let fragment = fragment_from_url(url, &self.root);
        log::debug!("history started at '{}'", fragment);
        self.entries.push(fragment.clone());
        self.fragment = Some(fragment.clone());

        if options.silent {
            return Ok(None);
        }
        self.load_url(&fragment).map(Some)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The current fragment, once started.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Recorded fragments, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Moves to `fragment`.
    ///
    /// Anything after a `#` is ignored. Navigating to the current fragment
    /// records and dispatches nothing.
    pub fn navigate(
        &mut self,
        fragment: &str,
        options: NavigateOptions,
    ) -> Result<Navigation, RouterError> {
        if !self.started {
            return Err(RouterError::NotStarted);
        }

        let fragment = normalize_fragment(fragment);
        let fragment = match fragment.split_once('#') {
            Some((before, _)) => before.to_string(),
            None => fragment,
        };
        if self.fragment.as_deref() == Some(fragment.as_str()) {
            return Ok(Navigation::Unchanged);
        }

        match (options.replace, self.entries.last_mut()) {
            (true, Some(last)) => *last = fragment.clone(),
            _ => self.entries.push(fragment.clone()),
        }
        self.fragment = Some(fragment.clone());

        if !options.trigger {
            return Ok(Navigation::Recorded);
        }
        self.load_url(&fragment).map(Navigation::Dispatched)
    }

    /// Makes `fragment` current and dispatches it without recording an entry.
    pub fn load_url(&mut self, fragment: &str) -> Result<Dispatch, RouterError> {
        let fragment = normalize_fragment(fragment);
        self.fragment = Some(fragment.clone());

        for (index, router) in self.routers.iter().enumerate().rev() {
            let Some((route, args)) = router.recognize(&fragment) else {
                continue;
            };
            let dispatch = router.execute(route, &fragment, args)?;
            if dispatch.is_announced() {
                if let Dispatch::Completed { name, args, .. } = &dispatch {
                    let event = HistoryEvent {
                        router: RouterId(index),
                        name,
                        args,
                    };
                    for listener in &self.listeners {
                        listener(&event);
                    }
                }
            }
            return Ok(dispatch);
        }

        log::debug!("no mounted router matched '{}'", fragment);
        Ok(Dispatch::NoMatch)
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("routers", &self.routers.len())
            .field("listeners", &self.listeners.len())
            .field("root", &self.root)
            .field("fragment", &self.fragment)
            .field("entries", &self.entries)
            .finish()
    }
}
