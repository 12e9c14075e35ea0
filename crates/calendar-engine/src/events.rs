//! Calendar events and the observer list that delivers them.

use std::fmt;

use chrono::NaiveDate;

use crate::keyboard::Key;
use crate::page::PageAddress;
use crate::transition::Transition;

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarEvent {
    /// The displayed pages were rebuilt.
    UpdatePages(Vec<PageAddress>),
    /// A move finished rebuilding the displayed pages.
    DidMove(Vec<PageAddress>),
    TransitionStart(Transition),
    TransitionEnd,
    DayClick(NaiveDate),
    DayMouseEnter(NaiveDate),
    DayMouseLeave(NaiveDate),
    DayFocusIn(NaiveDate),
    DayFocusOut(NaiveDate),
    DayKeydown { date: NaiveDate, key: Key },
    WeeknumberClick {
        weeknumber: u32,
        iso: bool,
        days: Vec<NaiveDate>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&CalendarEvent)>;

#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, callback: impl FnMut(&CalendarEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// Deliver `event` to every subscriber in subscription order.
    pub fn notify(&mut self, event: &CalendarEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
