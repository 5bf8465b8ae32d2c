#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveDateTime};

    use crate::app_system::{Config, OrderApp};
    use crate::clients::OrderViewClient;
    use crate::domain::{FurnitureOption, Order, OrderLineItem, User};
    use crate::error::{ApiError, ViewError};
    use crate::filter::{end_of_day, FilterCriteria};
    use crate::mock_api::MockOrderApi;
    use crate::order_view::{OrderViewService, ViewSettings, ViewStatus};
    use crate::session::Session;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn item(kind: &str, style: &str, price: f64) -> OrderLineItem {
        FurnitureOption::new(kind, style, "", price).to_line_item()
    }

    fn order(id: i64, user: &User, date: NaiveDateTime, items: Vec<OrderLineItem>) -> Order {
        Order {
            id,
            user_id: user.id,
            user: user.clone(),
            date,
            price: items.iter().map(|i| i.price).sum(),
            furnitures: items,
        }
    }

    fn ana() -> User {
        User::new(1, "Ana")
    }

    fn ben() -> User {
        User::new(2, "Ben")
    }

    fn sample_orders() -> Vec<Order> {
        vec![
            order(1, &ana(), at(2024, 3, 1, 10), vec![item("chair", "modern", 100.0)]),
            order(2, &ben(), at(2024, 3, 5, 15), vec![item("table", "rustic", 300.0)]),
            order(
                3,
                &ana(),
                at(2024, 3, 9, 9),
                vec![item("sofa", "rustic", 800.0), item("chair", "modern", 100.0)],
            ),
            order(4, &ben(), at(2024, 4, 2, 18), vec![item("bed", "classic", 650.0)]),
        ]
    }

    fn admin() -> Session {
        Session::new(User::new(99, "Admin"), "admin")
    }

    fn start_view(api: &Arc<MockOrderApi>, session: Session) -> OrderViewClient {
        let settings = ViewSettings {
            catalog_styles: vec!["modern".into(), "rustic".into()],
            catalog_kinds: vec!["chair".into(), "table".into()],
            ..ViewSettings::default()
        };
        let (service, client) = OrderViewService::new(Arc::clone(api), session, settings);
        tokio::spawn(service.run());
        client
    }

    #[tokio::test]
    async fn test_admin_baseline_loads_every_order() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, admin());
        assert_eq!(view.snapshot().status, ViewStatus::Idle);

        view.reload().await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.status, ViewStatus::Loaded);
        assert_eq!(state.order_ids(), vec![1, 2, 3, 4]);
        assert_eq!(state.visible_ids(), vec![1, 2, 3, 4]);
        assert_eq!(api.calls(), vec!["GET /orders"]);
    }

    #[tokio::test]
    async fn test_customer_baseline_is_own_orders() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, Session::new(ana(), "admin"));

        view.reload().await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.visible_ids(), vec![1, 3]);
        assert_eq!(api.calls(), vec!["GET /orders/by-user/1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_filter_takes_priority_over_style() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        view.set_user_filter(Some(2)).await.unwrap();
        view.set_style_filter(Some("modern".into())).await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.visible_ids(), vec![2, 4]);
        assert_eq!(api.calls_matching("GET /orders/by-user"), vec!["GET /orders/by-user/2"]);
        assert!(api.calls_matching("GET /orders/by-furniture-type").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_customer_cannot_filter_by_user() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, Session::new(ana(), "admin"));
        view.reload().await.unwrap();

        view.set_user_filter(Some(2)).await.unwrap();
        view.set_style_filter(Some("rustic".into())).await.unwrap();
        view.settled().await.unwrap();

        assert_eq!(api.calls_matching("GET /orders/by-user/2"), Vec::<String>::new());
        assert_eq!(
            api.calls_matching("GET /orders/by-furniture-type"),
            vec!["GET /orders/by-furniture-type?type=rustic"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_burst_recomputes_once_with_last_value() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        for style in ["modern", "classic", "rustic"] {
            view.set_style_filter(Some(style.into())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let state = view.settled().await.unwrap();

        assert_eq!(
            api.calls_matching("GET /orders/by-furniture-type"),
            vec!["GET /orders/by-furniture-type?type=rustic"]
        );
        assert_eq!(state.visible_ids(), vec![2, 3]);
        assert_eq!(state.criteria.selected_furniture_type.as_deref(), Some("rustic"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_date_filter_runs_locally_with_inclusive_end() {
        let mut orders = sample_orders();
        let end = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        orders.push(order(5, &ana(), end_of_day(end), vec![item("chair", "modern", 100.0)]));
        orders.push(order(
            6,
            &ana(),
            end_of_day(end) + chrono::Duration::milliseconds(1),
            vec![item("chair", "modern", 100.0)],
        ));
        let api = Arc::new(MockOrderApi::with_orders(orders));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        view.set_date_range(Some(start), Some(end)).await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.visible_ids(), vec![2, 3, 5]);
        assert_eq!(state.orders.len(), 6);
        assert_eq!(api.calls(), vec!["GET /orders"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_customer_date_filter_stays_within_own_orders() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, Session::new(ana(), "admin"));
        view.reload().await.unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        view.set_date_range(Some(start), None).await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.visible_ids(), vec![1, 3]);
        assert_eq!(api.calls(), vec!["GET /orders/by-user/1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_filter_response_is_ignored() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        api.delay("GET /orders/by-user/1", Duration::from_millis(1000));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        view.set_user_filter(Some(1)).await.unwrap();
        // debounce fires and the slow request goes out
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(api.calls_matching("GET /orders/by-user"), vec!["GET /orders/by-user/1"]);

        view.set_user_filter(None).await.unwrap();
        view.set_style_filter(Some("classic".into())).await.unwrap();
        let state = view.settled().await.unwrap();
        assert_eq!(state.visible_ids(), vec![4]);

        // let the slow answer arrive
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let state = view.snapshot();
        assert_eq!(state.visible_ids(), vec![4]);
        assert_eq!(state.status, ViewStatus::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_criteria_change_discards_outstanding_filter_fetch() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        api.delay("GET /orders/by-furniture-type?type=modern", Duration::from_millis(200));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        view.set_style_filter(Some("modern".into())).await.unwrap();
        // the modern request is out and answers during the next debounce window
        tokio::time::sleep(Duration::from_millis(400)).await;
        view.set_style_filter(Some("rustic".into())).await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.criteria.selected_furniture_type.as_deref(), Some("rustic"));
        assert_eq!(state.visible_ids(), vec![2, 3]);
        assert_eq!(
            api.calls_matching("GET /orders/by-furniture-type"),
            vec![
                "GET /orders/by-furniture-type?type=modern",
                "GET /orders/by-furniture-type?type=rustic",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_passes_through_loading() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        api.delay("GET /orders", Duration::from_millis(100));
        let view = start_view(&api, admin());
        let mut states = view.subscribe();
        assert_eq!(states.borrow().status, ViewStatus::Idle);

        let reloading = tokio::spawn({
            let view = view.clone();
            async move { view.reload().await }
        });
        states.wait_for(|s| s.status == ViewStatus::Loading).await.unwrap();
        states.wait_for(|s| s.status == ViewStatus::Loaded).await.unwrap();
        reloading.await.unwrap().unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        view.set_date_range(Some(start), None).await.unwrap();
        let pending = view.snapshot();
        assert_eq!(pending.status, ViewStatus::Loading);
        assert!(pending.filters_pending);

        let state = view.settled().await.unwrap();
        assert_eq!(state.status, ViewStatus::Loaded);
        assert_eq!(state.visible_ids(), vec![2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_filters_restores_baseline() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();
        view.set_style_filter(Some("classic".into())).await.unwrap();
        assert_eq!(view.settled().await.unwrap().visible_ids(), vec![4]);

        view.clear_filters().await.unwrap();
        let state = view.settled().await.unwrap();

        assert_eq!(state.criteria, FilterCriteria::default());
        assert_eq!(state.visible_ids(), vec![1, 2, 3, 4]);
        assert_eq!(
            api.calls(),
            vec![
                "GET /orders",
                "GET /orders/by-furniture-type?type=classic",
                "GET /orders",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_removes_order_from_both_collections() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        view.delete_order(2).await.unwrap();
        let state = view.snapshot();

        assert_eq!(state.order_ids(), vec![1, 3, 4]);
        assert_eq!(state.visible_ids(), vec![1, 3, 4]);
        assert_eq!(state.error, None);
        assert_eq!(api.calls().last().map(String::as_str), Some("DELETE /orders/2"));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_collections_and_reports() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let failure = ApiError::Status {
            status: 500,
            message: "database unavailable".into(),
        };
        api.fail("DELETE /orders/2", failure.clone());
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        let result = view.delete_order(2).await;
        let state = view.snapshot();

        assert_eq!(result, Err(ViewError::Api(failure.clone())));
        assert_eq!(state.order_ids(), vec![1, 2, 3, 4]);
        assert_eq!(state.visible_ids(), vec![1, 2, 3, 4]);
        assert_eq!(state.status, ViewStatus::LoadError);
        assert_eq!(state.error, Some(failure.to_string()));

        // still usable afterwards
        api.clear_failures();
        view.delete_order(2).await.unwrap();
        assert_eq!(view.snapshot().error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_delete_is_rejected_while_outstanding() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        api.delay("DELETE /orders/1", Duration::from_millis(500));
        let view = start_view(&api, admin());
        view.reload().await.unwrap();

        let (first, second) = tokio::join!(view.delete_order(1), view.delete_order(1));

        assert_eq!(first, Ok(()));
        assert!(matches!(second, Err(ViewError::Busy(_))));
        assert_eq!(api.calls_matching("DELETE").len(), 1);
    }

    #[tokio::test]
    async fn test_cart_submission_appends_order_and_empties_cart() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let view = start_view(&api, Session::new(ana(), "admin"));
        view.reload().await.unwrap();

        let chair = FurnitureOption::new("chair", "modern", "walnut", 120.0);
        let table = FurnitureOption::new("table", "rustic", "pine", 300.0);
        view.toggle_item(chair.clone()).await.unwrap();
        view.toggle_item(chair.clone()).await.unwrap();
        view.toggle_item(table.clone()).await.unwrap();
        view.change_quantity(table.key(), 1).await.unwrap();
        view.change_quantity(table.key(), -1).await.unwrap();

        let cart = view.snapshot();
        assert_eq!(cart.cart_items(), 3);
        assert_eq!(cart.total, 540.0);

        let created = view.submit_order().await.unwrap();
        let state = view.snapshot();

        assert_eq!(created.user_id, 1);
        assert_eq!(created.furnitures.len(), 3);
        assert_eq!(created.price, 540.0);
        assert!(state.selection.is_empty());
        assert_eq!(state.total, 0.0);
        assert_eq!(state.order_ids(), vec![1, 3, created.id]);
        assert_eq!(state.visible_ids(), vec![1, 3, created.id]);
        assert_eq!(api.stored_orders().len(), 5);
    }

    #[tokio::test]
    async fn test_oversized_quantity_change_keeps_view_running() {
        let api = Arc::new(MockOrderApi::new());
        let view = start_view(&api, Session::new(ana(), "admin"));
        let chair = FurnitureOption::new("chair", "modern", "walnut", 120.0);
        view.toggle_item(chair.clone()).await.unwrap();

        view.change_quantity(chair.key(), i64::MAX).await.unwrap();
        assert_eq!(view.snapshot().cart_items(), u32::MAX);

        view.change_quantity(chair.key(), i64::MIN).await.unwrap();
        assert_eq!(view.snapshot().cart_items(), 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_not_submitted() {
        let api = Arc::new(MockOrderApi::new());
        let view = start_view(&api, Session::new(ana(), "admin"));

        assert_eq!(view.submit_order().await, Err(ViewError::EmptyCart));
        assert!(api.calls_matching("POST").is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_the_cart() {
        let api = Arc::new(MockOrderApi::new());
        api.fail("POST /orders", ApiError::Unreachable("http://localhost:8080/api/orders".into()));
        let view = start_view(&api, Session::new(ana(), "admin"));
        view.toggle_item(FurnitureOption::new("bed", "classic", "", 650.0))
            .await
            .unwrap();

        let result = view.submit_order().await;
        let state = view.snapshot();

        assert!(matches!(result, Err(ViewError::Api(ApiError::Unreachable(_)))));
        assert_eq!(state.cart_items(), 1);
        assert!(state.error.unwrap().contains("Cannot reach"));
    }

    #[tokio::test]
    async fn test_catalog_loads_through_the_view() {
        let api = Arc::new(MockOrderApi::new());
        api.add_furniture(FurnitureOption::new("chair", "rustic", "pine", 60.0));
        api.add_furniture(FurnitureOption::new("table", "modern", "glass", 300.0));
        let view = start_view(&api, Session::new(ana(), "admin"));

        let count = view.load_catalog().await.unwrap();
        let catalog = view.snapshot().catalog;

        assert_eq!(count, 2);
        assert_eq!(catalog[0].key(), "tablemodernglass");
        assert_eq!(catalog[1].key(), "chairrusticpine");
        assert_eq!(api.calls_matching("GET /").len(), 4);
    }

    #[tokio::test]
    async fn test_order_app_starts_loaded_and_shuts_down() {
        let api = Arc::new(MockOrderApi::with_orders(sample_orders()));
        let config = Config::from_lookup(|_| None).unwrap();

        let app = OrderApp::start(api, admin(), &config).await;
        let state = app.view.settled().await.unwrap();
        assert_eq!(state.visible_ids(), vec![1, 2, 3, 4]);
        assert!(app.session.is_admin);

        app.shutdown().await.unwrap();
    }
}
