//! Page transition selection and acknowledgment.
//!
//! The engine only picks the category of a page change. The animation is
//! the host's business; it reports completion through
//! `Calendar::on_transition_end`, which settles the [`TransitionHandle`]
//! returned by the navigation call that started it.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::grid::Page;
use crate::page::page_is_after_page;

/// Configured transition style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionStyle {
    None,
    Fade,
    #[default]
    SlideH,
    SlideV,
}

/// Transition category of one page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    None,
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::None => "none",
            Transition::Fade => "fade",
            Transition::SlideLeft => "slide-left",
            Transition::SlideRight => "slide-right",
            Transition::SlideUp => "slide-up",
            Transition::SlideDown => "slide-down",
        }
    }
}

/// Pick the transition from the previously displayed first page to the new
/// one.
///
/// `None` and `Fade` styles pass through. Without a previous page there is
/// nothing to animate. A view change fades, as does landing on the same
/// page; otherwise moving forward slides left (or up) and moving back
/// slides right (or down).
pub fn get_page_transition(old: Option<&Page>, new: &Page, style: TransitionStyle) -> Transition {
    match style {
        TransitionStyle::None => return Transition::None,
        TransitionStyle::Fade => return Transition::Fade,
        TransitionStyle::SlideH | TransitionStyle::SlideV => {}
    }
    let Some(old) = old else {
        return Transition::None;
    };
    if old.view != new.view {
        return Transition::Fade;
    }
    let vertical = style == TransitionStyle::SlideV;
    if page_is_after_page(&new.address, &old.address) {
        if vertical {
            Transition::SlideUp
        } else {
            Transition::SlideLeft
        }
    } else if page_is_after_page(&old.address, &new.address) {
        if vertical {
            Transition::SlideDown
        } else {
            Transition::SlideRight
        }
    } else {
        Transition::Fade
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Pending,
    Completed,
    /// A newer navigation replaced this one before it finished.
    Superseded,
}

#[derive(Debug)]
struct TransitionSlot {
    status: TransitionStatus,
    waker: Option<Waker>,
}

/// Completion handle of a page refresh.
///
/// Resolves to `Ok(())` once the host signals the end of the transition (or
/// immediately when no transition runs) and to
/// `Err(CalendarError::TransitionSuperseded)` when a newer refresh replaces
/// it first. Clones share one slot.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    slot: Rc<RefCell<TransitionSlot>>,
}

impl TransitionHandle {
    pub(crate) fn pending() -> Self {
        Self::with_status(TransitionStatus::Pending)
    }

    pub(crate) fn completed() -> Self {
        Self::with_status(TransitionStatus::Completed)
    }

    fn with_status(status: TransitionStatus) -> Self {
        TransitionHandle {
            slot: Rc::new(RefCell::new(TransitionSlot {
                status,
                waker: None,
            })),
        }
    }

    pub fn status(&self) -> TransitionStatus {
        self.slot.borrow().status
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TransitionStatus::Pending
    }

    /// Settle a pending handle. Settled handles stay as they are.
    pub(crate) fn settle(&self, status: TransitionStatus) {
        let waker = {
            let mut slot = self.slot.borrow_mut();
            if slot.status != TransitionStatus::Pending {
                return;
            }
            slot.status = status;
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl Future for TransitionHandle {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match slot.status {
            TransitionStatus::Pending => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            TransitionStatus::Completed => Poll::Ready(Ok(())),
            TransitionStatus::Superseded => Poll::Ready(Err(CalendarError::TransitionSuperseded)),
        }
    }
}
