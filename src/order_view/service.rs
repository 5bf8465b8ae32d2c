use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use super::{PendingAction, ViewSettings, ViewState, ViewStatus};
use crate::api::{fetch_catalog, ApiResult, OrderApi};
use crate::clients::OrderViewClient;
use crate::debounce::Debouncer;
use crate::domain::{Order, OrderId};
use crate::error::ViewError;
use crate::filter::{filter_by_date, FilterCriteria, FilterPlan};
use crate::messages::{Completion, ViewRequest, ViewResponse};
use crate::selection::{
    build_order_payload, change_quantity, compute_total, toggle_selection, Selection,
};
use crate::session::Session;

/// Owns the order view state and is the only place it is mutated.
///
/// Network calls run on spawned tasks and come back as [`Completion`]
/// messages, so the service keeps answering while requests are outstanding.
/// Two counters keep late answers from clobbering newer ones: the baseline
/// token guards the full collection and the visible token guards the filtered
/// one.
pub struct OrderViewService<A: OrderApi> {
    receiver: mpsc::Receiver<ViewRequest>,
    sender: mpsc::WeakSender<ViewRequest>,
    api: Arc<A>,
    session: Session,
    settings: ViewSettings,
    state: ViewState,
    publisher: watch::Sender<ViewState>,
    debouncer: Debouncer,
    filter_generation: u64,
    baseline_token: u64,
    visible_token: u64,
    in_flight: HashSet<PendingAction>,
}

impl<A: OrderApi> OrderViewService<A> {
    pub fn new(api: Arc<A>, session: Session, settings: ViewSettings) -> (Self, OrderViewClient) {
        let (sender, receiver) = mpsc::channel(settings.buffer_size);
        let (publisher, state_rx) = watch::channel(ViewState::default());
        let service = Self {
            receiver,
            sender: sender.downgrade(),
            api,
            session,
            debouncer: Debouncer::new(settings.filter_debounce),
            settings,
            state: ViewState::default(),
            publisher,
            filter_generation: 0,
            baseline_token: 0,
            visible_token: 0,
            in_flight: HashSet::new(),
        };
        let client = OrderViewClient::new(sender, state_rx);
        (service, client)
    }

    #[instrument(name = "order_view", skip(self), fields(user_id = self.session.user.id, is_admin = self.session.is_admin))]
    pub async fn run(mut self) {
        info!("OrderViewService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ViewRequest::Reload { respond_to } => self.handle_reload(respond_to),
                ViewRequest::SetUserFilter {
                    user_id,
                    respond_to,
                } => {
                    self.state.criteria.selected_user_id = user_id;
                    self.criteria_changed(respond_to);
                }
                ViewRequest::SetStyleFilter { style, respond_to } => {
                    self.state.criteria.selected_furniture_type = style;
                    self.criteria_changed(respond_to);
                }
                ViewRequest::SetDateRange {
                    start,
                    end,
                    respond_to,
                } => {
                    self.state.criteria.start_date = start;
                    self.state.criteria.end_date = end;
                    self.criteria_changed(respond_to);
                }
                ViewRequest::ClearFilters { respond_to } => self.handle_clear_filters(respond_to),
                ViewRequest::DeleteOrder { id, respond_to } => self.handle_delete(id, respond_to),
                ViewRequest::LoadCatalog { respond_to } => self.handle_load_catalog(respond_to),
                ViewRequest::ToggleItem { option, respond_to } => {
                    let next = toggle_selection(&self.state.selection, &option);
                    self.replace_selection(next);
                    let _ = respond_to.send(Ok(()));
                }
                ViewRequest::ChangeQuantity {
                    key,
                    delta,
                    respond_to,
                } => {
                    let next = change_quantity(&self.state.selection, &key, delta);
                    self.replace_selection(next);
                    let _ = respond_to.send(Ok(()));
                }
                ViewRequest::SubmitOrder { respond_to } => self.handle_submit(respond_to),
                ViewRequest::Completed(completion) => self.handle_completion(completion),
                ViewRequest::Shutdown => {
                    info!("OrderViewService shutting down");
                    break;
                }
            }
        }

        self.debouncer.cancel();
        info!("OrderViewService stopped");
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }

    /// Marks `action` as outstanding, or reports it busy.
    fn begin(&mut self, action: PendingAction) -> Result<(), ViewError> {
        if self.in_flight.insert(action) {
            Ok(())
        } else {
            warn!(%action, "Rejected re-entrant request");
            Err(ViewError::Busy(action.to_string()))
        }
    }

    fn fail(&mut self, message: String) {
        self.state.status = ViewStatus::LoadError;
        self.state.error = Some(message);
    }

    fn succeed(&mut self) {
        self.state.status = ViewStatus::Loaded;
        self.state.error = None;
    }

    /// Runs `work` on its own task and feeds the outcome back as a completion.
    fn spawn_completion<F>(&self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let Some(sender) = self.sender.upgrade() else {
            warn!("Order view is closing, dropping background work");
            return;
        };
        tokio::spawn(async move {
            let completion = work.await;
            if sender.send(ViewRequest::Completed(completion)).await.is_err() {
                debug!("Order view stopped before completion arrived");
            }
        });
    }

    fn fetch_baseline(&self) -> impl Future<Output = ApiResult<Vec<Order>>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let is_admin = self.session.is_admin;
        let user_id = self.session.user.id;
        async move {
            if is_admin {
                api.list_orders().await
            } else {
                api.orders_by_user(user_id).await
            }
        }
    }

    fn start_baseline(&mut self, respond_to: Option<ViewResponse<()>>) {
        self.baseline_token += 1;
        let token = self.baseline_token;
        self.state.status = ViewStatus::Loading;
        self.publish();

        let fetch = self.fetch_baseline();
        self.spawn_completion(async move {
            Completion::BaselineLoaded {
                token,
                result: fetch.await,
                respond_to,
            }
        });
    }

    #[instrument(skip(self, respond_to))]
    fn handle_reload(&mut self, respond_to: ViewResponse<()>) {
        if let Err(e) = self.begin(PendingAction::Reload) {
            let _ = respond_to.send(Err(e));
            return;
        }
        debug!("Reloading baseline orders");
        self.start_baseline(Some(respond_to));
    }

    fn criteria_changed(&mut self, respond_to: ViewResponse<()>) {
        debug!(criteria = ?self.state.criteria, "Filter criteria changed");
        // results for the previous criteria are stale from here on
        self.visible_token += 1;
        self.state.filters_pending = true;
        self.state.status = ViewStatus::Loading;
        self.publish();
        self.schedule_recompute();
        let _ = respond_to.send(Ok(()));
    }

    fn schedule_recompute(&mut self) {
        self.filter_generation += 1;
        let generation = self.filter_generation;
        let Some(sender) = self.sender.upgrade() else {
            return;
        };
        self.debouncer.schedule(async move {
            let _ = sender
                .send(ViewRequest::Completed(Completion::FiltersDue { generation }))
                .await;
        });
    }

    /// Applies the winning filter to the loaded orders, or asks the backend for it.
    #[instrument(skip(self))]
    fn recompute(&mut self) {
        self.visible_token += 1;
        let token = self.visible_token;
        let plan = FilterPlan::resolve(&self.state.criteria, self.session.is_admin);
        debug!(?plan, token, "Recomputing visible orders");

        match plan {
            FilterPlan::ByUser(user_id) => {
                let api = Arc::clone(&self.api);
                self.fetch_visible(token, async move { api.orders_by_user(user_id).await });
            }
            FilterPlan::ByStyle(style) => {
                let api = Arc::clone(&self.api);
                self.fetch_visible(token, async move { api.orders_by_style(&style).await });
            }
            FilterPlan::ByDate { start, end } => {
                let visible = filter_by_date(&self.state.orders, start, end);
                self.show_visible(visible);
            }
            FilterPlan::All => {
                let visible = self.state.orders.clone();
                self.show_visible(visible);
            }
        }
    }

    fn show_visible(&mut self, visible: Vec<Order>) {
        self.state.visible = visible;
        self.state.filters_pending = false;
        self.succeed();
        self.publish();
    }

    fn fetch_visible<F>(&mut self, token: u64, fetch: F)
    where
        F: Future<Output = ApiResult<Vec<Order>>> + Send + 'static,
    {
        self.state.status = ViewStatus::Loading;
        self.publish();
        self.spawn_completion(async move {
            Completion::VisibleLoaded {
                token,
                result: fetch.await,
            }
        });
    }

    #[instrument(skip(self, respond_to))]
    fn handle_clear_filters(&mut self, respond_to: ViewResponse<()>) {
        info!("Clearing filters");
        self.debouncer.cancel();
        self.filter_generation += 1;
        // outstanding filter fetches are now stale
        self.visible_token += 1;
        self.state.criteria = FilterCriteria::default();
        self.state.filters_pending = true;
        self.in_flight.insert(PendingAction::Reload);
        self.start_baseline(Some(respond_to));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_delete(&mut self, id: OrderId, respond_to: ViewResponse<()>) {
        if let Err(e) = self.begin(PendingAction::Delete(id)) {
            let _ = respond_to.send(Err(e));
            return;
        }
        self.state.status = ViewStatus::Loading;
        self.publish();

        let api = Arc::clone(&self.api);
        self.spawn_completion(async move {
            let result = api.delete_order(id).await;
            Completion::OrderDeleted {
                id,
                result,
                respond_to,
            }
        });
    }

    #[instrument(skip(self, respond_to))]
    fn handle_load_catalog(&mut self, respond_to: ViewResponse<usize>) {
        if let Err(e) = self.begin(PendingAction::Catalog) {
            let _ = respond_to.send(Err(e));
            return;
        }

        let api = Arc::clone(&self.api);
        let styles = self.settings.catalog_styles.clone();
        let kinds = self.settings.catalog_kinds.clone();
        self.spawn_completion(async move {
            let catalog = fetch_catalog(api, &styles, &kinds).await;
            Completion::CatalogLoaded {
                catalog,
                respond_to,
            }
        });
    }

    fn replace_selection(&mut self, selection: Selection) {
        self.state.total = compute_total(&selection);
        self.state.selection = selection;
        self.publish();
    }

    #[instrument(skip(self, respond_to))]
    fn handle_submit(&mut self, respond_to: ViewResponse<Order>) {
        if self.state.selection.is_empty() {
            let _ = respond_to.send(Err(ViewError::EmptyCart));
            return;
        }
        if let Err(e) = self.begin(PendingAction::Submit) {
            let _ = respond_to.send(Err(e));
            return;
        }

        let payload = build_order_payload(&self.state.selection, &self.session.user);
        info!(items = payload.furnitures.len(), total = self.state.total, "Submitting order");
        self.state.status = ViewStatus::Loading;
        self.publish();

        let api = Arc::clone(&self.api);
        self.spawn_completion(async move {
            let result = api.create_order(&payload).await;
            Completion::OrderCreated { result, respond_to }
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::FiltersDue { generation } => {
                if generation != self.filter_generation {
                    debug!(generation, "Skipping superseded recompute");
                    return;
                }
                self.recompute();
            }
            Completion::BaselineLoaded {
                token,
                result,
                respond_to,
            } => self.on_baseline_loaded(token, result, respond_to),
            Completion::VisibleLoaded { token, result } => self.on_visible_loaded(token, result),
            Completion::OrderDeleted {
                id,
                result,
                respond_to,
            } => self.on_order_deleted(id, result, respond_to),
            Completion::OrderCreated { result, respond_to } => {
                self.on_order_created(result, respond_to)
            }
            Completion::CatalogLoaded {
                catalog,
                respond_to,
            } => {
                self.in_flight.remove(&PendingAction::Catalog);
                if catalog.is_empty() {
                    warn!("Catalog is empty");
                }
                let count = catalog.len();
                self.state.catalog = catalog;
                self.publish();
                let _ = respond_to.send(Ok(count));
            }
        }
    }

    fn on_baseline_loaded(
        &mut self,
        token: u64,
        result: ApiResult<Vec<Order>>,
        respond_to: Option<ViewResponse<()>>,
    ) {
        if token != self.baseline_token {
            debug!(token, latest = self.baseline_token, "Discarding superseded baseline");
            if let Some(respond_to) = respond_to {
                let _ = respond_to.send(Ok(()));
            }
            return;
        }
        self.in_flight.remove(&PendingAction::Reload);

        match result {
            Ok(orders) => {
                info!(count = orders.len(), "Baseline orders loaded");
                self.state.orders = orders;
                self.recompute();
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(Ok(()));
                }
            }
            Err(e) => {
                error!(error = %e, "Loading orders failed");
                self.state.filters_pending = false;
                self.fail(e.to_string());
                self.publish();
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(Err(e.into()));
                }
            }
        }
    }

    fn on_visible_loaded(&mut self, token: u64, result: ApiResult<Vec<Order>>) {
        if token != self.visible_token {
            debug!(token, latest = self.visible_token, "Discarding stale filter result");
            return;
        }

        self.state.filters_pending = false;
        match result {
            Ok(orders) => {
                debug!(count = orders.len(), "Filtered orders received");
                self.state.visible = orders;
                self.succeed();
            }
            Err(e) => {
                error!(error = %e, "Filtering orders failed");
                self.fail(e.to_string());
            }
        }
        self.publish();
    }

    fn on_order_deleted(&mut self, id: OrderId, result: ApiResult<()>, respond_to: ViewResponse<()>) {
        self.in_flight.remove(&PendingAction::Delete(id));

        let reply = match result {
            Ok(()) => {
                info!(order_id = id, "Order deleted");
                self.state.orders.retain(|o| o.id != id);
                self.state.visible.retain(|o| o.id != id);
                self.succeed();
                Ok(())
            }
            Err(e) => {
                error!(order_id = id, error = %e, "Deleting order failed");
                self.fail(e.to_string());
                Err(e.into())
            }
        };
        self.publish();
        let _ = respond_to.send(reply);
    }

    fn on_order_created(&mut self, result: ApiResult<Order>, respond_to: ViewResponse<Order>) {
        self.in_flight.remove(&PendingAction::Submit);

        let reply = match result {
            Ok(order) => {
                info!(order_id = order.id, price = order.price, "Order created");
                self.state.orders.push(order.clone());
                self.state.visible.push(order.clone());
                self.state.selection = Selection::new();
                self.state.total = 0.0;
                self.succeed();
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Creating order failed");
                self.fail(e.to_string());
                Err(e.into())
            }
        };
        self.publish();
        let _ = respond_to.send(reply);
    }
}
