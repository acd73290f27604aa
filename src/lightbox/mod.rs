//! Full-screen media viewer state.
//!
//! The viewer remembers which item is open and its index in the list the
//! visitor was looking at when it opened. That index belongs to the
//! filtered list of the moment: if the filter changes while the viewer is
//! open the index goes stale and is not re-derived.
//!
//! While open, the host must not scroll. The lock is taken by
//! [`Lightbox::open`] and released by [`Lightbox::close`] or when the
//! lightbox is dropped, so every exit path releases it.

use serde::Serialize;

use crate::models::GalleryItem;

/// The page hosting the viewer.
pub trait ScrollHost {
    fn suspend_scroll(&mut self);
    fn resume_scroll(&mut self);
}

/// A viewer with no page behind it, as used when the server computes
/// viewer navigation.
impl ScrollHost for () {
    fn suspend_scroll(&mut self) {}
    fn resume_scroll(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LightboxState {
    Closed,
    #[serde(rename_all = "camelCase")]
    Open { item_id: String, index: usize },
}

pub struct Lightbox<H: ScrollHost> {
    state: LightboxState,
    host: H,
    scroll_locked: bool,
}

impl<H: ScrollHost> Lightbox<H> {
    pub fn new(host: H) -> Self {
        Self {
            state: LightboxState::Closed,
            host,
            scroll_locked: false,
        }
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    #[cfg(test)]
    pub fn index(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { index, .. } => Some(index),
            LightboxState::Closed => None,
        }
    }

    /// Open on `item`, found at `index` of the currently filtered list.
    /// Opening while already open just moves the selection.
    pub fn open(&mut self, item: &GalleryItem, index: usize) {
        self.state = LightboxState::Open {
            item_id: item.id.clone(),
            index,
        };
        if !self.scroll_locked {
            self.host.suspend_scroll();
            self.scroll_locked = true;
        }
    }

    /// Advance with wrap-around. No-op when closed or when `items` has at
    /// most one entry.
    pub fn next<'a>(&mut self, items: &'a [GalleryItem]) -> Option<&'a GalleryItem> {
        self.step(items, |index, len| (index + 1) % len)
    }

    /// Step back with wrap-around; the inverse of [`Lightbox::next`].
    pub fn prev<'a>(&mut self, items: &'a [GalleryItem]) -> Option<&'a GalleryItem> {
        self.step(items, |index, len| (index % len + len - 1) % len)
    }

    fn step<'a>(
        &mut self,
        items: &'a [GalleryItem],
        advance: impl Fn(usize, usize) -> usize,
    ) -> Option<&'a GalleryItem> {
        let LightboxState::Open { index, .. } = self.state else {
            return None;
        };
        let len = items.len();
        if len <= 1 {
            return None;
        }

        let new_index = advance(index, len);
        let item = &items[new_index];
        self.state = LightboxState::Open {
            item_id: item.id.clone(),
            index: new_index,
        };
        Some(item)
    }

    pub fn close(&mut self) {
        self.state = LightboxState::Closed;
        if self.scroll_locked {
            self.host.resume_scroll();
            self.scroll_locked = false;
        }
    }
}

impl<H: ScrollHost> Drop for Lightbox<H> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use chrono::Utc;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Host that records whether scrolling is suspended.
    #[derive(Clone, Default)]
    struct Page {
        locked: Rc<Cell<bool>>,
        suspends: Rc<Cell<u32>>,
    }

    impl ScrollHost for Page {
        fn suspend_scroll(&mut self) {
            self.locked.set(true);
            self.suspends.set(self.suspends.get() + 1);
        }

        fn resume_scroll(&mut self) {
            self.locked.set(false);
        }
    }

    fn items(n: usize) -> Vec<GalleryItem> {
        (0..n)
            .map(|i| GalleryItem {
                id: format!("item-{}", i),
                url: format!("https://cdn.example.org/{}.jpg", i),
                caption: String::new(),
                kind: MediaKind::Photo,
                category: "events".to_string(),
                date: None,
                view_count: 0,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_next_wraps_around() {
        let list = items(3);
        let mut lb = Lightbox::new(());
        lb.open(&list[2], 2);

        let item = lb.next(&list).unwrap();
        assert_eq!(item.id, "item-0");
        assert_eq!(lb.index(), Some(0));
    }

    #[test]
    fn test_prev_wraps_around() {
        let list = items(3);
        let mut lb = Lightbox::new(());
        lb.open(&list[0], 0);

        assert_eq!(lb.prev(&list).unwrap().id, "item-2");
    }

    #[test]
    fn test_next_cycle_returns_to_start() {
        let list = items(5);
        let mut lb = Lightbox::new(());
        lb.open(&list[3], 3);
        for _ in 0..list.len() {
            lb.next(&list);
        }
        assert_eq!(lb.index(), Some(3));
    }

    #[test]
    fn test_prev_inverts_next() {
        let list = items(4);
        let mut lb = Lightbox::new(());
        for start in 0..list.len() {
            lb.open(&list[start], start);
            lb.next(&list);
            lb.prev(&list);
            assert_eq!(
                lb.state(),
                &LightboxState::Open {
                    item_id: list[start].id.clone(),
                    index: start
                }
            );
        }
    }

    #[test]
    fn test_navigation_disabled_for_single_item() {
        let list = items(1);
        let mut lb = Lightbox::new(());
        lb.open(&list[0], 0);
        assert!(lb.next(&list).is_none());
        assert!(lb.prev(&list).is_none());
        assert_eq!(lb.index(), Some(0));
    }

    #[test]
    fn test_navigation_when_closed_is_noop() {
        let list = items(3);
        let mut lb = Lightbox::new(());
        assert!(lb.next(&list).is_none());
        assert_eq!(lb.state(), &LightboxState::Closed);
    }

    #[test]
    fn test_stale_index_after_filter_shrinks() {
        let full = items(6);
        let mut lb = Lightbox::new(());
        lb.open(&full[5], 5);

        let narrowed = &full[..2];
        let item = lb.next(narrowed).unwrap();
        assert_eq!(item.id, "item-0");
        lb.open(&full[5], 5);
        assert_eq!(lb.prev(narrowed).unwrap().id, "item-0");
    }

    #[test]
    fn test_scroll_lock_released_on_close() {
        let page = Page::default();
        let list = items(2);
        let mut lb = Lightbox::new(page.clone());

        lb.open(&list[0], 0);
        assert!(page.locked.get());
        lb.open(&list[1], 1);
        assert_eq!(page.suspends.get(), 1);

        lb.close();
        assert!(!page.locked.get());
        assert!(!lb.is_open());
    }

    #[test]
    fn test_scroll_lock_released_on_drop() {
        let page = Page::default();
        let list = items(2);
        {
            let mut lb = Lightbox::new(page.clone());
            lb.open(&list[0], 0);
            assert!(page.locked.get());
        }
        assert!(!page.locked.get());
    }
}
