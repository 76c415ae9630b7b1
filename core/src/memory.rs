// cartflow/src/memory.rs

//! In-memory collaborators. They back the integration tests, the benchmark and
//! the storefront demo, and double as a reference for what the remote side
//! is expected to do.

use crate::collaborators::{
  AddressError, AddressProvider, CurrencyContext, DraftOrderStore, PaymentConfirmation, PaymentReply, PaymentRequest,
  PriceRuleCatalog, RemoteError, SessionProvider,
};
use crate::model::{Address, DraftOrder, DraftOrderId, DraftOrderStatus, LineItem, PriceRule};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreVerb {
  FetchOpen,
  Create,
  Replace,
  Complete,
  Delete,
}

/// Snapshot of how often each store verb was called, failed calls included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
  pub fetch_open: usize,
  pub create: usize,
  pub replace: usize,
  pub complete: usize,
  pub delete: usize,
}

impl StoreCalls {
  pub fn writes(&self) -> usize {
    self.create + self.replace + self.complete + self.delete
  }

  pub fn total(&self) -> usize {
    self.fetch_open + self.writes()
  }
}

/// What the store knows about a variant. Used to fill in lines it persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
  pub title: String,
  pub variant_title: Option<String>,
  pub price: String,
  pub stock: i64,
}

impl VariantInfo {
  pub fn new(title: &str, price: &str, stock: i64) -> Self {
    Self {
      title: title.to_string(),
      variant_title: None,
      price: price.to_string(),
      stock,
    }
  }
}

#[derive(Debug, Clone)]
enum Injected {
  Fail(RemoteError),
  /// Only meaningful for deletes: answer `Ok(false)`.
  Decline,
}

#[derive(Debug, Default)]
struct Counters {
  fetch_open: AtomicUsize,
  create: AtomicUsize,
  replace: AtomicUsize,
  complete: AtomicUsize,
  delete: AtomicUsize,
}

impl Counters {
  fn bump(&self, verb: StoreVerb) {
    let counter = match verb {
      StoreVerb::FetchOpen => &self.fetch_open,
      StoreVerb::Create => &self.create,
      StoreVerb::Replace => &self.replace,
      StoreVerb::Complete => &self.complete,
      StoreVerb::Delete => &self.delete,
    };
    counter.fetch_add(1, Ordering::SeqCst);
  }

  fn snapshot(&self) -> StoreCalls {
    StoreCalls {
      fetch_open: self.fetch_open.load(Ordering::SeqCst),
      create: self.create.load(Ordering::SeqCst),
      replace: self.replace.load(Ordering::SeqCst),
      complete: self.complete.load(Ordering::SeqCst),
      delete: self.delete.load(Ordering::SeqCst),
    }
  }
}

/// Draft order store kept in a map. Whole-order replace semantics like the remote.
pub struct InMemoryDraftOrderStore {
  orders: RwLock<BTreeMap<DraftOrderId, DraftOrder>>,
  completed: RwLock<Vec<DraftOrder>>,
  variants: Mutex<HashMap<u64, VariantInfo>>,
  injected: Mutex<HashMap<StoreVerb, Injected>>,
  counters: Counters,
  next_order_id: AtomicU64,
  next_line_id: AtomicU64,
  latency: Option<Duration>,
}

impl Default for InMemoryDraftOrderStore {
  fn default() -> Self {
    Self {
      orders: RwLock::new(BTreeMap::new()),
      completed: RwLock::new(Vec::new()),
      variants: Mutex::new(HashMap::new()),
      injected: Mutex::new(HashMap::new()),
      counters: Counters::default(),
      next_order_id: AtomicU64::new(1001),
      next_line_id: AtomicU64::new(5001),
      latency: None,
    }
  }
}

impl InMemoryDraftOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_variant(self, variant_id: u64, info: VariantInfo) -> Self {
    self.variants.lock().insert(variant_id, info);
    self
  }

  /// Seeds an order as if it already existed remotely.
  pub fn with_order(mut self, order: DraftOrder) -> Self {
    self.next_order_id.fetch_max(order.id + 1, Ordering::SeqCst);
    self.orders.get_mut().insert(order.id, order);
    self
  }

  /// Sleeps this long inside every call, so interleavings show up in tests.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  pub fn set_stock(&self, variant_id: u64, stock: i64) {
    if let Some(info) = self.variants.lock().get_mut(&variant_id) {
      info.stock = stock;
    }
  }

  /// Every later call of `verb` fails with `error` until cleared.
  pub fn fail(&self, verb: StoreVerb, error: RemoteError) {
    self.injected.lock().insert(verb, Injected::Fail(error));
  }

  /// Deletes answer `Ok(false)` until cleared.
  pub fn decline_deletes(&self) {
    self.injected.lock().insert(StoreVerb::Delete, Injected::Decline);
  }

  pub fn clear_failure(&self, verb: StoreVerb) {
    self.injected.lock().remove(&verb);
  }

  pub fn calls(&self) -> StoreCalls {
    self.counters.snapshot()
  }

  pub async fn order(&self, id: DraftOrderId) -> Option<DraftOrder> {
    self.orders.read().await.get(&id).cloned()
  }

  pub async fn orders(&self) -> Vec<DraftOrder> {
    self.orders.read().await.values().cloned().collect()
  }

  pub async fn completed_orders(&self) -> Vec<DraftOrder> {
    self.completed.read().await.clone()
  }

  async fn enter(&self, verb: StoreVerb) -> Result<Option<Injected>, RemoteError> {
    self.counters.bump(verb);
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    match self.injected.lock().get(&verb).cloned() {
      Some(Injected::Fail(e)) => Err(e),
      other => Ok(other),
    }
  }

  fn fill_line(&self, mut line: LineItem) -> LineItem {
    if line.id.is_none() {
      line.id = Some(self.next_line_id.fetch_add(1, Ordering::SeqCst));
    }
    if let Some(info) = self.variants.lock().get(&line.variant_id) {
      if line.title.is_empty() {
        line.title = info.title.clone();
        line.variant_title = info.variant_title.clone();
      }
      line.price = info.price.clone();
      line.stock = Some(info.stock);
    }
    line
  }

  fn fill_totals(order: &mut DraftOrder) {
    let subtotal: Decimal = order
      .line_items
      .iter()
      .filter_map(|li| Decimal::from_str(&li.price).ok().map(|p| p * Decimal::from(li.quantity)))
      .sum();
    order.subtotal_price = Some(subtotal.to_string());
    order.total_price = Some(subtotal.to_string());
  }
}

#[async_trait]
impl DraftOrderStore for InMemoryDraftOrderStore {
  async fn fetch_all_open_draft_orders(&self) -> Result<Vec<DraftOrder>, RemoteError> {
    self.enter(StoreVerb::FetchOpen).await?;
    let orders = self.orders.read().await;
    Ok(orders.values().filter(|o| o.is_open()).cloned().collect())
  }

  async fn create_draft_order(&self, line_items: Vec<LineItem>, customer_email: &str) -> Result<DraftOrder, RemoteError> {
    self.enter(StoreVerb::Create).await?;
    let mut order = DraftOrder {
      id: self.next_order_id.fetch_add(1, Ordering::SeqCst),
      customer_email: customer_email.to_string(),
      status: DraftOrderStatus::Open,
      line_items: line_items.into_iter().map(|li| self.fill_line(li)).collect(),
      shipping_address: None,
      applied_discount: None,
      subtotal_price: None,
      total_price: None,
      order_id: None,
    };
    Self::fill_totals(&mut order);
    debug!(draft_order_id = order.id, "In-memory store: draft order created.");
    self.orders.write().await.insert(order.id, order.clone());
    Ok(order)
  }

  async fn replace_draft_order(&self, id: DraftOrderId, order: &DraftOrder) -> Result<DraftOrder, RemoteError> {
    self.enter(StoreVerb::Replace).await?;
    let mut orders = self.orders.write().await;
    let stored = orders.get_mut(&id).filter(|o| o.is_open()).ok_or(RemoteError::NotFound(id))?;

    stored.line_items = order.line_items.iter().cloned().map(|li| self.fill_line(li)).collect();
    stored.shipping_address = order.shipping_address.clone();
    stored.applied_discount = order.applied_discount.clone();
    Self::fill_totals(stored);
    Ok(stored.clone())
  }

  async fn complete_draft_order(&self, id: DraftOrderId) -> Result<(), RemoteError> {
    self.enter(StoreVerb::Complete).await?;
    let mut orders = self.orders.write().await;
    let stored = orders.get_mut(&id).filter(|o| o.is_open()).ok_or(RemoteError::NotFound(id))?;
    stored.status = DraftOrderStatus::Completed;
    stored.order_id = Some(id + 900_000);
    self.completed.write().await.push(stored.clone());
    Ok(())
  }

  async fn delete_draft_order(&self, id: DraftOrderId) -> Result<bool, RemoteError> {
    if let Some(Injected::Decline) = self.enter(StoreVerb::Delete).await? {
      return Ok(false);
    }
    Ok(self.orders.write().await.remove(&id).is_some())
  }
}

#[derive(Default)]
pub struct InMemoryPriceRuleCatalog {
  rules: Mutex<Vec<PriceRule>>,
  failure: Mutex<Option<RemoteError>>,
  fetches: AtomicUsize,
}

impl InMemoryPriceRuleCatalog {
  pub fn new(rules: Vec<PriceRule>) -> Self {
    Self {
      rules: Mutex::new(rules),
      ..Default::default()
    }
  }

  pub fn fail_with(&self, error: RemoteError) {
    *self.failure.lock() = Some(error);
  }

  pub fn fetches(&self) -> usize {
    self.fetches.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PriceRuleCatalog for InMemoryPriceRuleCatalog {
  async fn fetch_price_rules_with_codes(&self) -> Result<Vec<PriceRule>, RemoteError> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    if let Some(e) = self.failure.lock().clone() {
      return Err(e);
    }
    Ok(self.rules.lock().clone())
  }
}

/// Default addresses per customer, plus the answer to give when one is requested.
#[derive(Default)]
pub struct StaticAddressBook {
  defaults: Mutex<HashMap<String, Address>>,
  on_request: Mutex<Option<Address>>,
  requests: AtomicUsize,
}

impl StaticAddressBook {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_default(self, customer_email: &str, address: Address) -> Self {
    self.defaults.lock().insert(customer_email.to_string(), address);
    self
  }

  /// The address the customer "enters" when prompted. Without one, prompts are abandoned.
  pub fn answering_with(self, address: Address) -> Self {
    *self.on_request.lock() = Some(address);
    self
  }

  pub fn prompts(&self) -> usize {
    self.requests.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl AddressProvider for StaticAddressBook {
  async fn default_address(&self, customer_email: &str) -> Result<Option<Address>, AddressError> {
    Ok(self.defaults.lock().get(customer_email).cloned())
  }

  async fn ensure_default_address(&self, customer_email: &str) -> Result<Address, AddressError> {
    self.requests.fetch_add(1, Ordering::SeqCst);
    let address = self.on_request.lock().clone().ok_or(AddressError::Abandoned)?;
    self.defaults.lock().insert(customer_email.to_string(), address.clone());
    Ok(address)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentScript {
  Complete,
  Cancel,
  /// Drop the reply without answering.
  Dismiss,
  /// Keep the reply and never answer.
  Hold,
}

/// Payment sheet stand-in that answers every request the same scripted way.
pub struct ScriptedPayment {
  script: Mutex<PaymentScript>,
  requests: Mutex<Vec<PaymentRequest>>,
  held: Mutex<Vec<PaymentReply>>,
}

impl ScriptedPayment {
  pub fn new(script: PaymentScript) -> Self {
    Self {
      script: Mutex::new(script),
      requests: Mutex::new(Vec::new()),
      held: Mutex::new(Vec::new()),
    }
  }

  pub fn set_script(&self, script: PaymentScript) {
    *self.script.lock() = script;
  }

  pub fn requests(&self) -> Vec<PaymentRequest> {
    self.requests.lock().clone()
  }
}

impl PaymentConfirmation for ScriptedPayment {
  fn request_payment(&self, request: PaymentRequest, reply: PaymentReply) {
    debug!(amount = %request.amount, currency = %request.currency_code, "Scripted payment requested.");
    self.requests.lock().push(request);
    match *self.script.lock() {
      PaymentScript::Complete => reply.completed(),
      PaymentScript::Cancel => reply.cancelled(),
      PaymentScript::Dismiss => drop(reply),
      PaymentScript::Hold => self.held.lock().push(reply),
    }
  }
}

#[derive(Default)]
pub struct StaticSession {
  email: Mutex<Option<String>>,
}

impl StaticSession {
  pub fn signed_in(email: &str) -> Self {
    Self {
      email: Mutex::new(Some(email.to_string())),
    }
  }

  pub fn sign_out(&self) {
    *self.email.lock() = None;
  }
}

impl SessionProvider for StaticSession {
  fn current_customer_email(&self) -> Option<String> {
    self.email.lock().clone()
  }
}

pub struct FixedCurrency(pub String);

impl CurrencyContext for FixedCurrency {
  fn currency_code(&self) -> String {
    self.0.clone()
  }
}
