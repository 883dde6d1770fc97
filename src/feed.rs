//! Delivery of fetched page layouts to the owner of a container.
//!
//! Fetchers may run anywhere and finish in any order. They only hold a
//! [`PageSender`]; the single owner of the [`ChapterAreaContainer`] drains
//! the [`PageFeed`] and applies deliveries one at a time.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::alto::AltoLayout;
use crate::areas::ChapterAreaContainer;
use crate::error::Result;

/// A page's text layout, ready to be applied.
#[derive(Debug, Clone)]
pub struct PageDelivery {
    pub page_id: String,
    pub alto_href: String,
    pub layout: AltoLayout,
}

/// Produces the raw text-layout document for an href.
pub trait LayoutSource {
    fn fetch(&self, alto_href: &str) -> Result<Vec<u8>>;
}

/// Sending half of a [`PageFeed`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct PageSender {
    tx: Sender<PageDelivery>,
}

impl PageSender {
    /// Queue a delivery. Returns `false` once the feed is gone.
    pub fn send(&self, delivery: PageDelivery) -> bool {
        self.tx.send(delivery).is_ok()
    }

    /// Fetch and parse a page's layout, then queue it.
    ///
    /// Fetch and parse failures are logged; the page simply gets no
    /// highlight geometry.
    pub fn fetch_and_send(&self, source: &impl LayoutSource, page_id: &str, alto_href: &str) -> bool {
        let layout = match source.fetch(alto_href).and_then(|bytes| AltoLayout::from_bytes(&bytes)) {
            Ok(layout) => layout,
            Err(e) => {
                log::warn!("could not load text layout `{alto_href}` for `{page_id}`: {e}");
                return false;
            }
        };
        self.send(PageDelivery {
            page_id: page_id.to_string(),
            alto_href: alto_href.to_string(),
            layout,
        })
    }
}

/// Receiving half, owned next to the container.
#[derive(Debug)]
pub struct PageFeed {
    tx: Sender<PageDelivery>,
    rx: Receiver<PageDelivery>,
}

impl Default for PageFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFeed {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> PageSender {
        PageSender {
            tx: self.tx.clone(),
        }
    }

    /// Apply every queued delivery. Returns how many pages were new.
    pub fn drain_into(&self, areas: &mut ChapterAreaContainer) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(delivery) => {
                    if areas.add_page(&delivery.page_id, &delivery.alto_href, &delivery.layout) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Number of deliveries waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
