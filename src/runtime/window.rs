use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::panel::Viewport;

pub type SubscriptionId = u64;

type ResizeCallback = Rc<RefCell<Box<dyn FnMut(u32)>>>;

/// Resize-notification capability of a top-level region.
pub trait ResizeObserver {
    /// Register a callback receiving the region's new width.
    fn subscribe(&self, on_resize: Box<dyn FnMut(u32)>) -> SubscriptionId;

    /// Returns false when the id was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn current_width(&self) -> u32;
}

/// Top-level window: owns its size, the viewports that follow it and the
/// resize listeners.
pub struct Window {
    width: Cell<u32>,
    height: Cell<u32>,
    listeners: RefCell<Vec<(SubscriptionId, ResizeCallback)>>,
    next_id: Cell<SubscriptionId>,
    viewports: RefCell<Vec<Weak<Viewport>>>,
    notifying: Cell<bool>,
    queued_widths: RefCell<VecDeque<u32>>,
}

impl Window {
    pub fn new(width: u32, height: u32) -> Rc<Self> {
        Rc::new(Self {
            width: Cell::new(width),
            height: Cell::new(height),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            viewports: RefCell::new(Vec::new()),
            notifying: Cell::new(false),
            queued_widths: RefCell::new(VecDeque::new()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Keep `viewport` sized to this window's width from now on.
    pub fn track_viewport(&self, viewport: &Rc<Viewport>) {
        viewport.fit_window(self.width());
        self.viewports.borrow_mut().push(Rc::downgrade(viewport));
    }

    /// Apply a new size, let tracked viewports follow, then notify listeners.
    ///
    /// Listeners are notified even when the width is unchanged; hosts do that
    /// on every drag step and debouncing is the listener's job. A resize made
    /// from inside a listener is delivered to every listener once the current
    /// round of notifications has finished.
    pub fn resize(&self, width: u32, height: u32) {
        self.width.set(width);
        self.height.set(height);
        self.viewports.borrow_mut().retain(|viewport| match viewport.upgrade() {
            Some(viewport) => {
                viewport.fit_window(width);
                true
            }
            None => false,
        });

        if self.notifying.replace(true) {
            self.queued_widths.borrow_mut().push_back(width);
            return;
        }
        let mut next = Some(width);
        while let Some(width) = next {
            self.notify(width);
            next = self.queued_widths.borrow_mut().pop_front();
        }
        self.notifying.set(false);
    }

    fn notify(&self, width: u32) {
        let snapshot: Vec<(SubscriptionId, ResizeCallback)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        for (id, callback) in snapshot {
            let still_subscribed = self.listeners.borrow().iter().any(|(live, _)| *live == id);
            if !still_subscribed {
                continue;
            }
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(width);
            }
        }
    }
}

impl ResizeObserver for Window {
    fn subscribe(&self, on_resize: Box<dyn FnMut(u32)>) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        let callback: ResizeCallback = Rc::new(RefCell::new(on_resize));
        self.listeners.borrow_mut().push((id, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(live, _)| *live != id);
        listeners.len() != before
    }

    fn current_width(&self) -> u32 {
        self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_notifies_every_listener() {
        let window = Window::new(230, 400);
        let seen = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let seen = Rc::clone(&seen);
            window.subscribe(Box::new(move |width| seen.borrow_mut().push(width)));
        }

        window.resize(140, 400);
        assert_eq!(*seen.borrow(), vec![140, 140]);
        assert_eq!(window.current_width(), 140);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let window = Window::new(100, 100);
        let hits = Rc::new(Cell::new(0));
        let id = {
            let hits = Rc::clone(&hits);
            window.subscribe(Box::new(move |_| hits.set(hits.get() + 1)))
        };
        window.resize(120, 100);
        assert!(window.unsubscribe(id));
        assert!(!window.unsubscribe(id));
        window.resize(130, 100);
        assert_eq!(hits.get(), 1);
        assert_eq!(window.listener_count(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_another_mid_notification() {
        let window = Window::new(100, 100);
        let second_hits = Rc::new(Cell::new(0));
        let second_id = Rc::new(Cell::new(0));
        {
            let weak = Rc::downgrade(&window);
            let second_id = Rc::clone(&second_id);
            window.subscribe(Box::new(move |_| {
                if let Some(window) = weak.upgrade() {
                    window.unsubscribe(second_id.get());
                }
            }));
        }
        let hits = Rc::clone(&second_hits);
        second_id.set(window.subscribe(Box::new(move |_| hits.set(hits.get() + 1))));

        window.resize(90, 100);
        assert_eq!(second_hits.get(), 0);
        assert_eq!(window.listener_count(), 1);
    }

    #[test]
    fn tracked_viewports_follow_and_are_pruned() {
        let window = Window::new(300, 200);
        let viewport = Rc::new(Viewport::new(0, 200).with_chrome(20));
        window.track_viewport(&viewport);
        assert_eq!(viewport.width(), 280);

        window.resize(160, 200);
        assert_eq!(viewport.width(), 140);

        drop(viewport);
        window.resize(150, 200);
        assert!(window.viewports.borrow().is_empty());
    }

    #[test]
    fn resize_from_a_listener_reaches_everyone_afterwards() {
        let window = Window::new(230, 100);
        let first_seen = Rc::new(RefCell::new(Vec::new()));
        let second_seen = Rc::new(RefCell::new(Vec::new()));
        {
            let weak = Rc::downgrade(&window);
            let seen = Rc::clone(&first_seen);
            window.subscribe(Box::new(move |width| {
                seen.borrow_mut().push(width);
                if width == 200 {
                    if let Some(window) = weak.upgrade() {
                        window.resize(180, 100);
                    }
                }
            }));
        }
        {
            let seen = Rc::clone(&second_seen);
            window.subscribe(Box::new(move |width| seen.borrow_mut().push(width)));
        }

        window.resize(200, 100);
        assert_eq!(*first_seen.borrow(), vec![200, 180]);
        assert_eq!(*second_seen.borrow(), vec![200, 180]);
        assert_eq!(window.width(), 180);
        assert!(window.queued_widths.borrow().is_empty());
    }
}
