//! Shared components, resources, events, and states for Bargain Bin.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Title,
    /// Store, cart and library views are tabs of this state; the session
    /// clock runs for as long as we stay here.
    Shopping,
    Ending,
}

/// Frame ordering for the shop loop. Chained by `SessionPlugin`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopSet {
    Input,
    Transactions,
    Session,
    Rotation,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

pub const DEFAULT_STARTING_BALANCE_CENTS: i64 = 25_000;
pub const DEFAULT_SESSION_SECS: f32 = 180.0;
pub const DEFAULT_ROTATION_INTERVAL_SECS: f32 = 10.0;
pub const DEFAULT_ROTATION_SIZE: usize = 3;
pub const DEFAULT_CART_CAPACITY: usize = 10;

pub const MAX_QUALITY: f32 = 5.0;

// ═══════════════════════════════════════════════════════════════════════
// CATALOG
// ═══════════════════════════════════════════════════════════════════════

pub type ItemId = String;

/// A catalog entry as authored in `assets/catalog.ron`. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub display_name: String,
    pub base_price_cents: u32,
    /// Price multiplier: 0.25 means the player pays a quarter of the base price.
    pub discount: f32,
    #[serde(default)]
    pub cover_art: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub series_count: u32,
    pub category: String,
    pub quality: f32,
}

impl ItemDefinition {
    /// Project this definition into a displayable shop listing.
    pub fn to_pick(&self) -> ItemPick {
        ItemPick {
            id: self.id.clone(),
            title: self.display_name.clone(),
            icon: self.cover_art.clone(),
            quality: self.quality.clamp(0.0, MAX_QUALITY),
            original_price_cents: self.base_price_cents,
            discount: self.discount,
            category: self.category.clone(),
        }
    }
}

/// A concrete listing on the storefront. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPick {
    pub id: ItemId,
    pub title: String,
    pub icon: String,
    pub quality: f32,
    pub original_price_cents: u32,
    pub discount: f32,
    pub category: String,
}

impl ItemPick {
    /// What the player is charged: original × discount multiplier, rounded to
    /// whole cents.
    pub fn final_price_cents(&self) -> u64 {
        let raw = self.original_price_cents as f64 * self.discount as f64;
        if raw <= 0.0 {
            0
        } else {
            raw.round() as u64
        }
    }

    /// Percent off as shown on a card, e.g. multiplier 0.25 → "-75%".
    pub fn discount_label(&self) -> String {
        let off = ((1.0 - self.discount as f64) * 100.0).round() as i64;
        format!("-{}%", off)
    }
}

/// All item definitions, with an id index built once at load time.
#[derive(Resource, Debug, Clone, Default)]
pub struct ItemCatalog {
    pub items: Vec<ItemDefinition>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    /// Builds the catalog. Quality is clamped to 0–5, entries without an id are
    /// skipped, and for duplicate ids the first occurrence wins (later ones
    /// are dropped).
    pub fn from_definitions(definitions: Vec<ItemDefinition>) -> Self {
        let mut items = Vec::with_capacity(definitions.len());
        let mut index = HashMap::new();

        for mut def in definitions {
            if def.id.trim().is_empty() {
                warn!("[Catalog] Skipping definition '{}' with empty id", def.display_name);
                continue;
            }
            def.quality = def.quality.clamp(0.0, MAX_QUALITY);
            if index.contains_key(&def.id) {
                warn!("[Catalog] Duplicate item definition id: {}", def.id);
                continue;
            }
            index.insert(def.id.clone(), items.len());
            items.push(def);
        }

        Self { items, index }
    }

    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The picks currently on display, replaced wholesale on every rotation.
#[derive(Resource, Debug, Clone, Default)]
pub struct Storefront {
    pub picks: Vec<ItemPick>,
    pub rotations: u32,
}

impl Storefront {
    pub fn find(&self, id: &str) -> Option<&ItemPick> {
        self.picks.iter().find(|p| p.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// REFUSALS
// ═══════════════════════════════════════════════════════════════════════

/// Why a shop operation was rejected. Never fatal; the UI decides feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refusal {
    InsufficientFunds,
    CartFull,
    UnknownItem,
    NotInCart,
    InvalidIndex,
    CartEmpty,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Refusal::InsufficientFunds => "Not enough balance",
            Refusal::CartFull => "Cart is full",
            Refusal::UnknownItem => "That item is not on display",
            Refusal::NotInCart => "That item is not in the cart",
            Refusal::InvalidIndex => "No cart entry at that position",
            Refusal::CartEmpty => "Cart is empty",
        };
        f.write_str(msg)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════

/// Result of a balance mutation, used to emit notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    pub balance: u64,
    pub depleted: bool,
}

/// The player's spendable balance in cents. Never negative.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balance_cents: u64,
}

impl Ledger {
    pub fn balance(&self) -> u64 {
        self.balance_cents
    }

    /// Sets the balance for a new session. Negative amounts clamp to 0.
    pub fn init(&mut self, amount: i64) -> BalanceUpdate {
        self.balance_cents = amount.max(0) as u64;
        BalanceUpdate {
            balance: self.balance_cents,
            depleted: self.balance_cents == 0,
        }
    }

    /// All-or-nothing debit. Leaves the balance untouched when it cannot cover
    /// `amount`.
    pub fn spend(&mut self, amount: u64) -> Result<BalanceUpdate, Refusal> {
        if amount > self.balance_cents {
            return Err(Refusal::InsufficientFunds);
        }
        self.balance_cents -= amount;
        Ok(BalanceUpdate {
            balance: self.balance_cents,
            depleted: self.balance_cents == 0,
        })
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.balance_cents
    }

    /// Restores a previously captured balance (view hand-off).
    pub fn restore(&mut self, balance_cents: u64) {
        self.balance_cents = balance_cents;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CART
// ═══════════════════════════════════════════════════════════════════════

/// Ordered, bounded list of pending picks. Duplicates allowed.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<ItemPick>,
    capacity: usize,
}

impl Default for Cart {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CART_CAPACITY)
    }
}

impl Cart {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn add(&mut self, pick: ItemPick) -> Result<(), Refusal> {
        if self.is_full() {
            return Err(Refusal::CartFull);
        }
        self.items.push(pick);
        Ok(())
    }

    /// Removes the first entry with a matching id.
    pub fn remove_by_id(&mut self, id: &str) -> Result<ItemPick, Refusal> {
        let pos = self
            .items
            .iter()
            .position(|p| p.id == id)
            .ok_or(Refusal::NotInCart)?;
        Ok(self.items.remove(pos))
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ItemPick, Refusal> {
        if index >= self.items.len() {
            return Err(Refusal::InvalidIndex);
        }
        Ok(self.items.remove(index))
    }

    /// Empties the cart, returning how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    /// Drains every entry in order, leaving the cart empty.
    pub fn take_all(&mut self) -> Vec<ItemPick> {
        std::mem::take(&mut self.items)
    }

    pub fn items(&self) -> &[ItemPick] {
        &self.items
    }

    pub fn total_price_cents(&self) -> u64 {
        self.items.iter().map(ItemPick::final_price_cents).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|p| p.id == id)
    }

    pub fn count_of(&self, id: &str) -> usize {
        self.items.iter().filter(|p| p.id == id).count()
    }

    /// "count/capacity", e.g. "3/10".
    pub fn capacity_string(&self) -> String {
        format!("{}/{}", self.items.len(), self.capacity)
    }

    /// Per-id counts in order of first appearance.
    pub fn statistics(&self) -> Vec<(ItemId, usize)> {
        let mut stats: Vec<(ItemId, usize)> = Vec::new();
        for pick in &self.items {
            match stats.iter_mut().find(|(id, _)| *id == pick.id) {
                Some((_, n)) => *n += 1,
                None => stats.push((pick.id.clone(), 1)),
            }
        }
        stats
    }

    pub fn log_contents(&self) {
        if self.items.is_empty() {
            debug!("[Cart] Cart is empty");
            return;
        }
        for (i, pick) in self.items.iter().enumerate() {
            debug!(
                "[Cart] {}. {} - {}",
                i + 1,
                pick.title,
                format_cents(pick.final_price_cents())
            );
        }
        debug!("[Cart] Total: {}", format_cents(self.total_price_cents()));
        for (id, n) in self.statistics() {
            debug!("[Cart]   {} × {}", id, n);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LIBRARY
// ═══════════════════════════════════════════════════════════════════════

/// Everything the player owns this session. Append-only; buying the same
/// item twice yields two entries.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    owned: Vec<ItemPick>,
}

impl Library {
    pub fn add_item(&mut self, pick: ItemPick) {
        self.owned.push(pick);
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.owned.iter().any(|p| p.id == id)
    }

    /// Owned copy of the contents.
    pub fn snapshot(&self) -> Vec<ItemPick> {
        self.owned.clone()
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}

/// Aggregates shown on the library page.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct LibraryStats {
    pub total_items: usize,
    pub total_original_price_cents: u64,
    pub top_quality_count: usize,
    pub zero_quality_count: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION CLOCK
// ═══════════════════════════════════════════════════════════════════════

/// Which terminal screen a session ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Balance hit zero before the deadline.
    Depleted,
    /// Deadline passed without a single purchase.
    TimeoutNoSpend,
    /// Deadline passed after spending something.
    TimeoutSpent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Ended(SessionOutcome),
    /// The ledger was missing at start; the clock never runs this session.
    Disabled,
}

/// What a single clock tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTick {
    pub rotate: bool,
    pub ended: Option<SessionOutcome>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct SessionClock {
    phase: SessionPhase,
    time_left: f32,
    rotation_timer: f32,
    rotation_interval: f32,
    start_balance: u64,
    has_spent: bool,
}

impl SessionClock {
    /// Idle → Running.
    pub fn start(&mut self, duration_secs: f32, rotation_interval_secs: f32, start_balance: u64) {
        self.phase = SessionPhase::Running;
        self.time_left = duration_secs.max(0.0);
        self.rotation_interval = rotation_interval_secs;
        self.rotation_timer = rotation_interval_secs;
        self.start_balance = start_balance;
        self.has_spent = false;
    }

    /// Back to Idle so the next entry into `Shopping` begins a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn disable(&mut self) {
        self.phase = SessionPhase::Disabled;
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Seconds left on the countdown, never below zero.
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn start_balance(&self) -> u64 {
        self.start_balance
    }

    /// Sticky for the rest of the session once any balance drop is seen.
    pub fn has_spent(&self) -> bool {
        self.has_spent
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.phase {
            SessionPhase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Advances by `dt` real seconds. No effect unless Running.
    pub fn tick(&mut self, dt: f32) -> ClockTick {
        let mut out = ClockTick::default();
        if !self.is_running() {
            return out;
        }

        self.time_left -= dt;
        self.rotation_timer -= dt;

        if self.rotation_timer <= 0.0 {
            self.rotation_timer += self.rotation_interval;
            out.rotate = true;
        }

        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            let outcome = if self.has_spent {
                SessionOutcome::TimeoutSpent
            } else {
                SessionOutcome::TimeoutNoSpend
            };
            out.ended = self.finish(outcome);
        }
        out
    }

    /// Balance-changed listener. Marks the session as having spent, and ends
    /// it through the depletion path once the balance is gone.
    pub fn observe_balance(&mut self, balance: u64) -> Option<SessionOutcome> {
        if !self.is_running() {
            return None;
        }
        if balance < self.start_balance {
            self.has_spent = true;
        }
        if balance == 0 {
            return self.finish(SessionOutcome::Depleted);
        }
        None
    }

    /// Depleted listener.
    pub fn observe_depleted(&mut self) -> Option<SessionOutcome> {
        self.finish(SessionOutcome::Depleted)
    }

    // Running → Ended happens at most once.
    fn finish(&mut self, outcome: SessionOutcome) -> Option<SessionOutcome> {
        if !self.is_running() {
            return None;
        }
        self.phase = SessionPhase::Ended(outcome);
        Some(outcome)
    }

    /// Whole seconds left, rounded up.
    pub fn seconds_remaining(&self) -> u32 {
        self.time_left.max(0.0).ceil() as u32
    }

    /// "M:SS"
    pub fn display(&self) -> String {
        let s = self.seconds_remaining();
        format!("{}:{:02}", s / 60, s % 60)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SCORING
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    D,
    C,
    B,
    A,
    S,
}

impl Grade {
    pub fn headline(self) -> &'static str {
        match self {
            Grade::D => "Grade D",
            Grade::C => "Grade C",
            Grade::B => "Grade B",
            Grade::A => "Grade A",
            Grade::S => "Grade S",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            Grade::D => "Needs improvement",
            Grade::C => "Average haul",
            Grade::B => "Solid shopping",
            Grade::A => "Excellent bargains",
            Grade::S => "Perfect run",
        }
    }
}

/// Exclusive upper bounds for each grade bucket.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub min: f64,
    pub c: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            min: 0.0,
            c: 100.0,
            b: 500.0,
            a: 1000.0,
        }
    }
}

impl GradeThresholds {
    pub fn grade_for(&self, total: f64) -> Grade {
        if total < self.min {
            Grade::D
        } else if total < self.c {
            Grade::C
        } else if total < self.b {
            Grade::B
        } else if total < self.a {
            Grade::A
        } else {
            Grade::S
        }
    }
}

/// Written once when the outcome screen is entered.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FinalEvaluation {
    pub outcome: Option<SessionOutcome>,
    pub total_score: f64,
    pub grade: Option<Grade>,
    pub items_owned: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub starting_balance_cents: i64,
    pub duration_secs: f32,
    pub rotation_interval_secs: f32,
    pub rotation_size: usize,
    pub cart_capacity: usize,
    pub rng_seed: Option<u64>,
    pub grades: GradeThresholds,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            starting_balance_cents: DEFAULT_STARTING_BALANCE_CENTS,
            duration_secs: DEFAULT_SESSION_SECS,
            rotation_interval_secs: DEFAULT_ROTATION_INTERVAL_SECS,
            rotation_size: DEFAULT_ROTATION_SIZE,
            cart_capacity: DEFAULT_CART_CAPACITY,
            rng_seed: None,
            grades: GradeThresholds::default(),
        }
    }
}

impl ShopConfig {
    pub fn from_ron(src: &str) -> Result<Self, String> {
        ron::from_str(src).map_err(|e| format!("Config parse failed: {}", e))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: notifications
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct BalanceChangedEvent {
    pub balance: u64,
}

#[derive(Event, Debug, Clone)]
pub struct DepletedEvent;

#[derive(Event, Debug, Clone)]
pub struct CartChangedEvent;

#[derive(Event, Debug, Clone)]
pub struct LibraryChangedEvent;

#[derive(Event, Debug, Clone)]
pub struct RotateCatalogEvent;

/// A fresh session began (ledger opened, cart and library emptied).
#[derive(Event, Debug, Clone)]
pub struct SessionStartedEvent {
    pub starting_balance: u64,
}

/// Sent exactly once per session.
#[derive(Event, Debug, Clone)]
pub struct SessionEndedEvent {
    pub outcome: SessionOutcome,
}

#[derive(Event, Debug, Clone)]
pub struct ShopRefusedEvent {
    pub reason: Refusal,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: requests from the presentation layer
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct PurchaseRequestEvent {
    pub item_id: ItemId,
}

#[derive(Event, Debug, Clone)]
pub struct AddToCartRequestEvent {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartTarget {
    Item(ItemId),
    Index(usize),
}

#[derive(Event, Debug, Clone)]
pub struct RemoveFromCartRequestEvent {
    pub target: CartTarget,
}

#[derive(Event, Debug, Clone)]
pub struct CheckoutRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct ClearCartRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct RestartSessionEvent;

// ═══════════════════════════════════════════════════════════════════════
// FORMATTING
// ═══════════════════════════════════════════════════════════════════════

/// Format cents as a dollar string (e.g. 12345 → "$123.45").
pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
