//! Breadth-first frontier with visit tracking
//!
//! Holds the FIFO queue of URLs waiting to be loaded and the ordered list of
//! pages that loaded successfully. A URL is never queued twice at once and
//! never queued again once visited. A page that failed to load is neither,
//! so a later page linking to it queues it for another attempt.

use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug)]
pub struct Frontier {
    /// URLs waiting to be loaded, in discovery order
    queue: VecDeque<Url>,

    /// Membership index over `queue`
    queued: HashSet<Url>,

    /// Successfully loaded pages, in visit order
    visited: Vec<Url>,

    /// Membership index over `visited`
    visited_index: HashSet<Url>,
}

impl Frontier {
    /// Creates a frontier holding only `seed`
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: Vec::new(),
            visited_index: HashSet::new(),
        };
        frontier.push(seed);
        frontier
    }

    /// Enqueues `url` unless it is already visited or waiting in the queue
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url) -> bool {
        if self.visited_index.contains(&url) || !self.queued.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the oldest queued URL
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records a successful load; returns false if it was already recorded
    pub fn mark_visited(&mut self, url: Url) -> bool {
        if !self.visited_index.insert(url.clone()) {
            return false;
        }
        self.visited.push(url);
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited_index.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Consumes the frontier, returning visited URLs in visit order
    pub fn into_visited(self) -> Vec<Url> {
        self.visited
    }
}
