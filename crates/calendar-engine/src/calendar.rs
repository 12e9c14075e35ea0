//! The navigation state machine.
//!
//! A [`Calendar`] owns the `rows × columns` pages on display, the page
//! cache, the attributes and the per-render [`DateRangeContext`]. Every
//! state change recomputes its dependents explicitly: pages first, then
//! attribute cells and day flags, then observers hear about it.
//!
//! Moving outside `[min_page, max_page]` is never an error; the move is
//! rejected with `false` and nothing changes.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{Months, NaiveDate};
use tracing::{debug, instrument, trace};

use crate::attribute::{Attribute, AttributeConfig, PopoverConfig, VisualProfile, DISABLED_KEY};
use crate::config::CalendarConfig;
use crate::context::{DateRangeCell, DateRangeContext};
use crate::error::{CalendarError, Result};
use crate::events::{CalendarEvent, Observers, SubscriptionId};
use crate::grid::{get_page, CalendarDay, Page, PageCache, PageConfig, PageLayout};
use crate::keyboard::{key_action, DayMove, KeyAction, KeyInput};
use crate::locale::{
    date_from_day_index, day_index, first_of_month, shift_days, DateParts, Locale,
};
use crate::page::{
    add_pages, page_address_for_date, page_is_after_page, page_is_before_page,
    page_is_between_pages, page_range_to_array, PageAddress, PageView,
};
use crate::popover::PopoverRegistry;
use crate::touch::{SwipeDetector, SwipeDirection, TouchPoint};
use crate::transition::{get_page_transition, Transition, TransitionHandle, TransitionStatus, TransitionStyle};

const AVAILABLE_KEY: &str = "available";

/// Options of [`Calendar::refresh_pages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Page to show; defaults to the current first page.
    pub page: Option<PageAddress>,
    /// 1-based slot `page` lands in; zero or negative counts from the end.
    pub position: i32,
    /// Skip clamping to `[min_page, max_page]`.
    pub force: bool,
    /// Overrides the configured transition style.
    pub transition: Option<TransitionStyle>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        RefreshOptions {
            page: None,
            position: 1,
            force: false,
            transition: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetOptions {
    pub position: i32,
    pub view: PageView,
    pub force: bool,
}

/// Where a move goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Page(PageAddress),
    /// The page of `view` containing the date.
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    pub position: i32,
    /// Switch to this view as part of the move.
    pub view: Option<PageView>,
    pub transition: Option<TransitionStyle>,
    pub force: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        MoveOptions {
            position: 1,
            view: None,
            transition: None,
            force: false,
        }
    }
}

/// Builds a [`Calendar`]. A locale is required.
#[derive(Debug, Default)]
pub struct CalendarBuilder {
    config: CalendarConfig,
    locale: Option<Locale>,
    today: Option<NaiveDate>,
    id: Option<String>,
}

impl CalendarBuilder {
    pub fn new(config: CalendarConfig) -> Self {
        CalendarBuilder {
            config,
            ..CalendarBuilder::default()
        }
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Pin "today" instead of reading the clock.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// # Errors
    /// `CalendarError::MissingDependency("locale")` without a locale;
    /// date, range and repeat errors from the configuration.
    pub fn build(self) -> Result<Calendar> {
        let locale = self.locale.ok_or(CalendarError::MissingDependency("locale"))?;
        let today = self.today.unwrap_or_else(|| locale.today());
        let id = self.id.unwrap_or_else(|| "calendar".to_string());
        let mut calendar = Calendar {
            popovers: PopoverRegistry::new(id.clone()),
            id,
            view: self.config.view,
            swipe: SwipeDetector::new(self.config.swipe),
            config: self.config,
            locale,
            today,
            min_date: None,
            max_date: None,
            cache: PageCache::new(),
            pages: Vec::new(),
            attributes: Vec::new(),
            disabled: None,
            available: None,
            context: DateRangeContext::new(),
            disabled_context: None,
            available_context: None,
            day_cells: HashMap::new(),
            popover_ids: HashMap::new(),
            focusable_day: None,
            focused_day: None,
            transition: Transition::None,
            in_transition: false,
            pending: None,
            suppressed_view_refreshes: 0,
            observers: Observers::default(),
        };
        calendar.rebuild_constraints()?;
        calendar.attributes = calendar.build_attributes(&calendar.config.attributes)?;
        calendar.register_popovers();

        let page = calendar.initial_page();
        let position = calendar.config.initial_page_position;
        calendar.refresh_pages(RefreshOptions {
            page: Some(page),
            position,
            force: false,
            transition: Some(TransitionStyle::None),
        });
        Ok(calendar)
    }
}

#[derive(Debug)]
pub struct Calendar {
    id: String,
    config: CalendarConfig,
    locale: Locale,
    today: NaiveDate,
    view: PageView,
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
    cache: PageCache,
    pages: Vec<Page>,
    attributes: Vec<Rc<Attribute>>,
    disabled: Option<Rc<Attribute>>,
    available: Option<Rc<Attribute>>,
    context: DateRangeContext<Attribute>,
    disabled_context: Option<DateRangeContext<Attribute>>,
    available_context: Option<DateRangeContext<Attribute>>,
    day_cells: HashMap<i64, Vec<DateRangeCell<Attribute>>>,
    /// Attribute key to popover id.
    popover_ids: HashMap<String, String>,
    popovers: PopoverRegistry,
    focusable_day: Option<i64>,
    focused_day: Option<i64>,
    transition: Transition,
    in_transition: bool,
    pending: Option<TransitionHandle>,
    suppressed_view_refreshes: u32,
    swipe: SwipeDetector,
    observers: Observers,
}

impl Calendar {
    pub fn builder(config: CalendarConfig) -> CalendarBuilder {
        CalendarBuilder::new(config)
    }

    // -- Accessors ----------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn view(&self) -> PageView {
        self.view
    }

    pub fn count(&self) -> u32 {
        self.config.count()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    pub fn last_page(&self) -> Option<&Page> {
        self.pages.last()
    }

    pub fn page_addresses(&self) -> Vec<PageAddress> {
        self.pages.iter().map(|page| page.address).collect()
    }

    /// Every displayed day, page by page.
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.pages.iter().flat_map(|page| page.view_days().iter())
    }

    /// The displayed cell for a date, if any page shows it.
    pub fn visible_day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        let index = day_index(date);
        self.pages.iter().find_map(|page| page.view_day(index))
    }

    /// Attribute cells of a displayed day, in paint order.
    pub fn day_cells(&self, date: NaiveDate) -> &[DateRangeCell<Attribute>] {
        self.day_cells
            .get(&day_index(date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn attributes(&self) -> &[Rc<Attribute>] {
        &self.attributes
    }

    pub fn disabled_attribute(&self) -> Option<&Attribute> {
        self.disabled.as_deref()
    }

    /// Cells of the host attributes. The disabled attribute is rendered
    /// separately and only merged into [`Calendar::day_cells`].
    pub fn context(&self) -> &DateRangeContext<Attribute> {
        &self.context
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub fn in_transition(&self) -> bool {
        self.in_transition
    }

    pub fn pending_transition(&self) -> Option<&TransitionHandle> {
        self.pending.as_ref()
    }

    pub fn popovers(&self) -> &PopoverRegistry {
        &self.popovers
    }

    /// Popover id registered for an attribute.
    pub fn popover_id(&self, attribute_key: &str) -> Option<&str> {
        self.popover_ids.get(attribute_key).map(String::as_str)
    }

    pub fn focusable_date(&self) -> Option<NaiveDate> {
        self.focusable_day.and_then(date_from_day_index)
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.focused_day.and_then(date_from_day_index)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&CalendarEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Lower bound of navigation: the configured page, else the page of
    /// `min_date` in the current view.
    pub fn min_page(&self) -> Option<PageAddress> {
        self.config.min_page.or_else(|| {
            self.min_date
                .map(|date| page_address_for_date(date, self.view, &self.locale))
        })
    }

    pub fn max_page(&self) -> Option<PageAddress> {
        self.config.max_page.or_else(|| {
            self.max_date
                .map(|date| page_address_for_date(date, self.view, &self.locale))
        })
    }

    /// Whether `date` is disabled by min/max, disabled ranges or the
    /// available ranges. Displayed days answer from their cached flag.
    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        if let Some(day) = self.visible_day(date) {
            return day.is_disabled;
        }
        let parts = self.locale.day_parts(date);
        let disabled = self
            .disabled
            .as_ref()
            .map_or(false, |attribute| attribute.covers_day(&parts, &self.locale));
        let unavailable = self
            .available
            .as_ref()
            .map_or(false, |attribute| !attribute.covers_day(&parts, &self.locale));
        disabled || unavailable
    }

    // -- Pages --------------------------------------------------------------

    fn initial_page(&self) -> PageAddress {
        if let Some(page) = self.config.initial_page {
            return page;
        }
        let pinned = self
            .attributes
            .iter()
            .filter(|attribute| attribute.pin_page)
            .find_map(|attribute| attribute.first_bounded_start());
        let date = pinned.map_or(self.today, DateParts::naive_date);
        page_address_for_date(date, self.view, &self.locale)
    }

    /// Compute the first and last page shown when `page` lands in slot
    /// `position`, clamped to `[min_page, max_page]` unless forced.
    pub fn get_target_page_range(&self, page: &PageAddress, options: TargetOptions) -> (PageAddress, PageAddress) {
        let count = self.count() as i32;
        let view = options.view;
        let to_add = if options.position > 0 {
            1 - options.position
        } else {
            -(count + options.position)
        };
        let mut from = add_pages(page, to_add, view, &self.locale);
        let mut to = add_pages(&from, count - 1, view, &self.locale);

        if !options.force {
            if let Some(min) = self.min_page() {
                if page_is_before_page(&from, &min) {
                    from = self.view_address(&min, view, false);
                    to = add_pages(&from, count - 1, view, &self.locale);
                }
            }
            if let Some(max) = self.max_page() {
                if page_is_after_page(&to, &max) {
                    to = self.view_address(&max, view, true);
                    from = add_pages(&to, 1 - count, view, &self.locale);
                }
            }
        }
        (from, to)
    }

    /// Express a bound page at the granularity of `view`: the first or last
    /// page of `view` that the bound covers.
    fn view_address(&self, page: &PageAddress, view: PageView, at_end: bool) -> PageAddress {
        let precise = match view {
            PageView::Monthly => true,
            PageView::Weekly => page.week.is_some() || page.day.is_some(),
            PageView::Daily => page.day.is_some(),
        };
        let date = if precise || !at_end {
            page.anchor_date(&self.locale)
        } else {
            shift_days(first_of_month(page.year, page.month as i32 + 1), -1)
        };
        page_address_for_date(date, view, &self.locale)
    }

    /// Rebuild the displayed pages.
    ///
    /// Supersedes any transition still pending. The returned handle
    /// resolves immediately when no transition runs, otherwise on
    /// [`Calendar::on_transition_end`].
    pub fn refresh_pages(&mut self, options: RefreshOptions) -> TransitionHandle {
        let page = options
            .page
            .or_else(|| self.pages.first().map(|page| page.address))
            .unwrap_or_else(|| self.initial_page());
        let (from, _) = self.get_target_page_range(
            &page,
            TargetOptions {
                position: options.position,
                view: self.view,
                force: options.force,
            },
        );

        let count = self.count();
        let mut pages = Vec::with_capacity(count as usize);
        for i in 0..count {
            let address = add_pages(&from, i as i32, self.view, &self.locale);
            let cached = self
                .cache
                .get_or_build(address.year, address.month, &self.locale, self.today);
            let config = PageConfig {
                address,
                view: self.view,
                layout: PageLayout::for_position(i + 1, self.config.rows.max(1), self.config.columns.max(1)),
                title_position: self.config.title_position,
                trim_weeks: self.config.trim_weeks,
                show_weeknumbers: self.config.show_weeknumbers,
                show_iso_weeknumbers: self.config.show_iso_weeknumbers,
            };
            pages.push(get_page(&config, &cached, &self.locale));
        }

        let style = options.transition.unwrap_or(self.config.transition);
        let transition = match pages.first() {
            Some(first) => get_page_transition(self.pages.first(), first, style),
            None => Transition::None,
        };
        if let Some(previous) = self.pending.take() {
            previous.settle(TransitionStatus::Superseded);
        }
        debug!(
            anchor = ?from,
            count,
            view = self.view.as_str(),
            transition = transition.as_str(),
            "refreshed pages"
        );

        self.pages = pages;
        self.transition = transition;
        self.recompute_attributes();
        self.observers
            .notify(&CalendarEvent::UpdatePages(self.page_addresses()));

        if transition == Transition::None {
            self.in_transition = false;
            TransitionHandle::completed()
        } else {
            self.in_transition = true;
            let handle = TransitionHandle::pending();
            self.pending = Some(handle.clone());
            handle
        }
    }

    fn target_page(&self, target: &MoveTarget, view: PageView) -> PageAddress {
        match target {
            MoveTarget::Page(page) => *page,
            MoveTarget::Date(date) => page_address_for_date(*date, view, &self.locale),
        }
    }

    /// Whether a move to `target` would show at least one page inside
    /// `[min_page, max_page]`. Never changes state.
    pub fn can_move(&self, target: &MoveTarget, options: &MoveOptions) -> bool {
        let view = options.view.unwrap_or(self.view);
        let page = self.target_page(target, view);
        let (from, to) = self.get_target_page_range(
            &page,
            TargetOptions {
                position: options.position,
                view,
                force: true,
            },
        );
        let (min, max) = (self.min_page(), self.max_page());
        page_range_to_array(&from, &to, view, &self.locale)
            .iter()
            .any(|page| page_is_between_pages(page, min.as_ref(), max.as_ref()))
    }

    /// Move the display to `target`. Returns `false`, changing nothing, when
    /// the move is out of bounds and not forced.
    pub fn move_to(&mut self, target: MoveTarget, options: MoveOptions) -> bool {
        if !options.force && !self.can_move(&target, &options) {
            debug!(?target, "move rejected");
            return false;
        }
        let view = options.view.unwrap_or(self.view);
        let view_changed = view != self.view;
        if view_changed {
            // The refresh below covers the view change.
            self.suppressed_view_refreshes += 1;
            self.set_view(view);
        }
        let page = self.target_page(&target, view);
        let (from, _) = self.get_target_page_range(
            &page,
            TargetOptions {
                position: options.position,
                view,
                force: options.force,
            },
        );
        let current = self.pages.first().map(|page| page.address);
        if view_changed || current != Some(from) {
            self.refresh_pages(RefreshOptions {
                page: Some(from),
                position: 1,
                force: true,
                transition: options.transition,
            });
        }
        self.observers
            .notify(&CalendarEvent::DidMove(self.page_addresses()));
        true
    }

    pub fn move_by(&mut self, pages: i32, options: MoveOptions) -> bool {
        match self.pages.first() {
            Some(first) => {
                let page = add_pages(&first.address, pages, self.view, &self.locale);
                self.move_to(MoveTarget::Page(page), options)
            }
            None => false,
        }
    }

    fn move_by_target(&self, pages: i32) -> Option<MoveTarget> {
        self.pages
            .first()
            .map(|first| MoveTarget::Page(add_pages(&first.address, pages, self.view, &self.locale)))
    }

    pub fn can_move_by(&self, pages: i32, options: &MoveOptions) -> bool {
        self.move_by_target(pages)
            .map_or(false, |target| self.can_move(&target, options))
    }

    pub fn move_prev(&mut self) -> bool {
        self.move_by(-(self.config.step() as i32), MoveOptions::default())
    }

    pub fn move_next(&mut self) -> bool {
        self.move_by(self.config.step() as i32, MoveOptions::default())
    }

    pub fn can_move_prev(&self) -> bool {
        self.can_move_by(-(self.config.step() as i32), &MoveOptions::default())
    }

    pub fn can_move_next(&self) -> bool {
        self.can_move_by(self.config.step() as i32, &MoveOptions::default())
    }

    // -- State changes ------------------------------------------------------

    /// Switch views, refreshing around the current first page unless a move
    /// already owns the refresh.
    pub fn set_view(&mut self, view: PageView) {
        if view == self.view {
            return;
        }
        self.view = view;
        if self.suppressed_view_refreshes > 0 {
            self.suppressed_view_refreshes -= 1;
            trace!(view = view.as_str(), "view refresh suppressed");
            return;
        }
        let anchor = self
            .focused_date()
            .filter(|date| self.visible_day(*date).is_some())
            .or_else(|| {
                self.pages
                    .first()
                    .map(|page| page.address.anchor_date(&self.locale))
            })
            .unwrap_or(self.today);
        let page = page_address_for_date(anchor, view, &self.locale);
        self.refresh_pages(RefreshOptions {
            page: Some(page),
            ..RefreshOptions::default()
        });
    }

    /// Replace the locale. Cached grids and attribute ranges are rebuilt.
    ///
    /// # Errors
    /// Propagates range errors from re-normalizing the configuration; the
    /// calendar keeps its previous locale in that case.
    pub fn set_locale(&mut self, locale: Locale) -> Result<()> {
        let previous = std::mem::replace(&mut self.locale, locale);
        let rebuilt = self
            .rebuild_constraints()
            .and_then(|()| self.build_attributes(&self.config.attributes));
        let attributes = match rebuilt {
            Ok(attributes) => attributes,
            Err(err) => {
                self.locale = previous;
                self.rebuild_constraints()?;
                return Err(err);
            }
        };
        self.attributes = attributes;
        self.cache.clear();
        let page = self.pages.first().map(|page| page.address);
        self.refresh_pages(RefreshOptions {
            page,
            transition: Some(TransitionStyle::None),
            ..RefreshOptions::default()
        });
        Ok(())
    }

    /// Change the number of displayed pages.
    pub fn set_layout(&mut self, rows: u32, columns: u32) {
        self.config.rows = rows.max(1);
        self.config.columns = columns.max(1);
        self.refresh_pages(RefreshOptions {
            transition: Some(TransitionStyle::None),
            ..RefreshOptions::default()
        });
    }

    /// Move "today". Cached grids carry `is_today`, so they are rebuilt.
    pub fn set_today(&mut self, today: NaiveDate) {
        if today == self.today {
            return;
        }
        self.today = today;
        self.cache.clear();
        self.refresh_pages(RefreshOptions {
            transition: Some(TransitionStyle::None),
            ..RefreshOptions::default()
        });
    }

    /// Replace the configured attributes.
    ///
    /// # Errors
    /// Propagates range errors; the current attributes stay in place.
    pub fn set_attributes(&mut self, configs: Vec<AttributeConfig>) -> Result<()> {
        self.attributes = self.build_attributes(&configs)?;
        self.config.attributes = configs;
        self.register_popovers();
        self.recompute_attributes();
        Ok(())
    }

    /// Insert an attribute, replacing any with the same key.
    pub fn upsert_attribute(&mut self, attribute: Attribute) {
        let attribute = Rc::new(attribute);
        match self.attributes.iter().position(|a| a.key == attribute.key) {
            Some(slot) => self.attributes[slot] = attribute,
            None => self.attributes.push(attribute),
        }
        self.register_popovers();
        self.recompute_attributes();
    }

    pub fn remove_attribute(&mut self, key: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|attribute| attribute.key != key);
        if self.attributes.len() == before {
            return false;
        }
        if let Some(id) = self.popover_ids.remove(key) {
            self.popovers.unregister(&id);
        }
        self.recompute_attributes();
        true
    }

    /// # Errors
    /// Propagates range errors, and rejects two attributes sharing a key.
    fn build_attributes(&self, configs: &[AttributeConfig]) -> Result<Vec<Rc<Attribute>>> {
        let mut keys = HashSet::with_capacity(configs.len());
        configs
            .iter()
            .enumerate()
            .map(|(position, config)| {
                let attribute = Attribute::from_config(config, position, &self.locale)?;
                if !keys.insert(attribute.key.clone()) {
                    return Err(CalendarError::DuplicateAttribute(attribute.key));
                }
                Ok(Rc::new(attribute))
            })
            .collect()
    }

    fn rebuild_constraints(&mut self) -> Result<()> {
        self.min_date = self
            .config
            .min_date
            .as_ref()
            .map(|source| self.locale.to_date(source).map(|date| date.date_naive()))
            .transpose()?;
        self.max_date = self
            .config
            .max_date
            .as_ref()
            .map(|source| self.locale.to_date(source).map(|date| date.date_naive()))
            .transpose()?;

        let has_disabled =
            self.min_date.is_some() || self.max_date.is_some() || !self.config.disabled_dates.is_empty();
        self.disabled = if has_disabled {
            Some(Rc::new(Attribute::disabled(
                self.config.min_date.as_ref(),
                self.config.max_date.as_ref(),
                &self.config.disabled_dates,
                &self.locale,
            )?))
        } else {
            None
        };
        self.available = if self.config.available_dates.is_empty() {
            None
        } else {
            let ranges = self.locale.ranges(&self.config.available_dates)?;
            Some(Rc::new(Attribute::new(AVAILABLE_KEY, ranges, 0, VisualProfile::default())))
        };
        Ok(())
    }

    fn register_popovers(&mut self) {
        for attribute in &self.attributes {
            let Some(popover) = &attribute.profile.popover else {
                continue;
            };
            if !self.popover_ids.contains_key(&attribute.key) {
                let id = self.popovers.register(popover.visibility, popover.is_interactive);
                self.popover_ids.insert(attribute.key.clone(), id);
            }
        }
    }

    /// Re-render every attribute against the displayed days and refresh the
    /// day flags that depend on them.
    ///
    /// Repeating ranges are expanded over the window widened backwards by
    /// the longest repeat occurrence, so occurrences starting before the
    /// first displayed day still reach into it.
    #[instrument(skip_all, fields(pages = self.pages.len()))]
    pub fn recompute_attributes(&mut self) {
        let mut indices: Vec<i64> = self.days().map(|day| day.day_index).collect();
        indices.sort_unstable();
        indices.dedup();
        let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
            self.context = DateRangeContext::new();
            self.disabled_context = None;
            self.day_cells.clear();
            return;
        };

        let lookback = self
            .attributes
            .iter()
            .chain(self.disabled.iter())
            .chain(self.available.iter())
            .map(|attribute| attribute.max_repeat_span())
            .max()
            .unwrap_or(0);
        let window: Vec<DateParts> = (first - lookback.max(1) + 1..=last)
            .filter_map(|index| self.locale.day_parts_for_index(index))
            .collect();

        // Host attributes may use any key, so the synthesized constraint
        // attributes get contexts of their own.
        let mut context = DateRangeContext::new();
        for attribute in &self.attributes {
            for range in attribute.ranges() {
                context.render(attribute, range, &window);
            }
        }
        let render_alone = |attribute: &Rc<Attribute>| {
            let mut alone = DateRangeContext::new();
            for range in attribute.ranges() {
                alone.render(attribute, range, &window);
            }
            alone
        };
        let disabled_context = self.disabled.as_ref().map(render_alone);
        self.available_context = self.available.as_ref().map(render_alone);

        self.day_cells.clear();
        for page in &self.pages {
            for day in page.view_days() {
                self.day_cells.entry(day.day_index).or_insert_with(|| {
                    let mut cells = context.get_cells(day);
                    if let Some(disabled) = &disabled_context {
                        cells.extend(disabled.get_cells(day));
                        cells.sort_by_key(|cell| cell.order);
                    }
                    cells
                });
            }
        }
        debug!(
            intervals = context.interval_count()
                + disabled_context.as_ref().map_or(0, DateRangeContext::interval_count),
            days = indices.len(),
            "recomputed attributes"
        );
        self.context = context;
        self.disabled_context = disabled_context;
        self.refresh_day_flags();
    }

    fn day_disabled(&self, index: i64) -> bool {
        let disabled = self
            .disabled_context
            .as_ref()
            .map_or(false, |disabled| disabled.cell_exists(DISABLED_KEY, index));
        let unavailable = self
            .available_context
            .as_ref()
            .map_or(false, |available| !available.cell_exists(AVAILABLE_KEY, index));
        disabled || unavailable
    }

    /// Refresh `is_disabled`, `is_focusable` and `is_focused` on every
    /// displayed day.
    fn refresh_day_flags(&mut self) {
        let visible = |index: Option<i64>| {
            index.filter(|&index| self.pages.iter().any(|page| page.view_day(index).is_some()))
        };
        let focusable = visible(self.focusable_day)
            .or_else(|| visible(Some(day_index(self.today))))
            .or_else(|| {
                self.pages.first().and_then(|page| {
                    page.view_days()
                        .iter()
                        .find(|day| page.view != PageView::Monthly || day.in_month)
                        .map(|day| day.day_index)
                })
            });
        let disabled: HashMap<i64, bool> = self
            .days()
            .map(|day| (day.day_index, self.day_disabled(day.day_index)))
            .collect();
        let focused = self.focused_day;

        for page in &mut self.pages {
            let view = page.view;
            for day in page.view_days_mut() {
                let owned = view != PageView::Monthly || day.in_month;
                day.is_disabled = disabled.get(&day.day_index).copied().unwrap_or(false);
                day.is_focusable = owned && Some(day.day_index) == focusable;
                day.is_focused = owned && Some(day.day_index) == focused;
            }
        }
        self.focusable_day = focusable;
    }

    // -- Focus and input ----------------------------------------------------

    /// Focus `date` if a page displays it.
    pub fn try_focus_date(&mut self, date: NaiveDate) -> bool {
        if self.visible_day(date).is_none() {
            return false;
        }
        let index = day_index(date);
        self.focusable_day = Some(index);
        self.focused_day = Some(index);
        self.refresh_day_flags();
        true
    }

    /// Focus `date`, moving its page into view first when needed.
    pub fn focus_date(&mut self, date: NaiveDate, options: MoveOptions) -> bool {
        if self.try_focus_date(date) {
            return true;
        }
        self.move_to(MoveTarget::Date(date), options) && self.try_focus_date(date)
    }

    pub fn on_day_keydown(&mut self, date: NaiveDate, input: KeyInput) -> bool {
        let Some(day) = self.visible_day(date).cloned() else {
            return false;
        };
        self.observers.notify(&CalendarEvent::DayKeydown {
            date,
            key: input.key,
        });
        let target = match key_action(input, &day) {
            KeyAction::Select => {
                self.on_day_click(date);
                return true;
            }
            KeyAction::Move(DayMove::Days(days)) => Some(shift_days(date, days)),
            KeyAction::Move(DayMove::Months(months)) => shift_months(date, months),
            KeyAction::Move(DayMove::Years(years)) => shift_months(date, years.saturating_mul(12)),
        };
        match target {
            Some(target) => self.focus_date(target, MoveOptions::default()),
            None => false,
        }
    }

    /// Popover ids of the attributes covering `date`.
    fn day_popovers(&self, date: NaiveDate, select: impl Fn(&PopoverConfig) -> bool) -> Vec<String> {
        self.day_cells(date)
            .iter()
            .filter(|cell| cell.data.profile.popover.as_ref().map_or(false, &select))
            .filter_map(|cell| self.popover_ids.get(&cell.data.key).cloned())
            .collect()
    }

    fn day_target(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.id, self.locale.day_id(date))
    }

    pub fn on_day_click(&mut self, date: NaiveDate) {
        let target = self.day_target(date);
        for id in self.day_popovers(date, |popover| popover.visibility.on_click()) {
            self.popovers.toggle(&id, &target);
        }
        self.observers.notify(&CalendarEvent::DayClick(date));
    }

    pub fn on_day_mouseenter(&mut self, date: NaiveDate) {
        let target = self.day_target(date);
        for id in self.day_popovers(date, |popover| popover.visibility.on_hover()) {
            self.popovers.show(&id, &target);
        }
        self.observers.notify(&CalendarEvent::DayMouseEnter(date));
    }

    pub fn on_day_mouseleave(&mut self, date: NaiveDate) {
        for id in self.day_popovers(date, |popover| popover.visibility.on_hover() && !popover.is_interactive) {
            self.popovers.hide(&id);
        }
        self.observers.notify(&CalendarEvent::DayMouseLeave(date));
    }

    pub fn on_day_focusin(&mut self, date: NaiveDate) {
        self.try_focus_date(date);
        let target = self.day_target(date);
        for id in self.day_popovers(date, |popover| popover.visibility.on_focus()) {
            self.popovers.show(&id, &target);
        }
        self.observers.notify(&CalendarEvent::DayFocusIn(date));
    }

    pub fn on_day_focusout(&mut self, date: NaiveDate) {
        if self.focused_day == Some(day_index(date)) {
            self.focused_day = None;
            self.refresh_day_flags();
        }
        for id in self.day_popovers(date, |popover| popover.visibility.on_focus()) {
            self.popovers.hide(&id);
        }
        self.observers.notify(&CalendarEvent::DayFocusOut(date));
    }

    /// A week number was clicked on page `page_index` (0-based), grid row
    /// `week` (1-based).
    pub fn on_weeknumber_click(&mut self, page_index: usize, week: u32, iso: bool) -> bool {
        let event = {
            let Some(page) = self.pages.get(page_index) else {
                return false;
            };
            let Some(row) = page.weeks.iter().find(|row| row.week == week) else {
                return false;
            };
            CalendarEvent::WeeknumberClick {
                weeknumber: if iso { row.iso_weeknumber } else { row.weeknumber },
                iso,
                days: page.week_days(row).iter().map(|day| day.date).collect(),
            }
        };
        self.observers.notify(&event);
        true
    }

    pub fn on_touch_start(&mut self, point: TouchPoint) {
        self.swipe.touch_start(point);
    }

    /// Finish a touch sequence; a swipe moves one step. Returns whether the
    /// display moved.
    pub fn on_touch_end(&mut self, point: TouchPoint) -> bool {
        match self.swipe.touch_end(point) {
            Some(SwipeDirection::Left) => self.move_next(),
            Some(SwipeDirection::Right) => self.move_prev(),
            None => false,
        }
    }

    pub fn on_transition_start(&mut self) {
        self.in_transition = true;
        self.observers
            .notify(&CalendarEvent::TransitionStart(self.transition));
    }

    /// The host finished animating; settles the pending handle.
    pub fn on_transition_end(&mut self) {
        self.in_transition = false;
        if let Some(pending) = self.pending.take() {
            pending.settle(TransitionStatus::Completed);
        }
        self.observers.notify(&CalendarEvent::TransitionEnd);
    }
}

fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}
