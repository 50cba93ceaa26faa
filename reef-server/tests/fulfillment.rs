//! End-to-end pipeline tests
//!
//! Drive the real engine through the HTTP router with in-process client
//! sessions: kitchen dashboard advancing, guest tracking choosing, both
//! converging through push events and reconciliation.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reef_client::{
    DashboardFilter, GuestTrackingSession, KitchenDashboardSession, LocalChannel, OrderChannel,
    Reconcile, ReconciliationPoller,
};
use reef_server::{Config, InMemoryCatalog, OrderStore, ServerState, TracingNotifier};
use shared::order::{
    CreateOrderInput, DeliveryLocation, MenuItem, OrderError, OrderItemInput, OrderStatus,
};

fn test_state() -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_str().unwrap(), 0);
    let store = OrderStore::open(config.db_path()).unwrap();
    let catalog = Arc::new(InMemoryCatalog::with_items(vec![
        MenuItem {
            id: "club-sandwich".to_string(),
            name: "Club Sandwich".to_string(),
            unit_price: 12.5,
        },
        MenuItem {
            id: "mango-smoothie".to_string(),
            name: "Mango Smoothie".to_string(),
            unit_price: 6.0,
        },
    ]));
    let state = ServerState::build(config, store, catalog, Arc::new(TracingNotifier));
    (state, dir)
}

fn local_channel(state: &ServerState) -> Arc<LocalChannel> {
    let broadcaster = state.broadcaster.clone();
    Arc::new(
        LocalChannel::builder()
            .with_router(reef_server::api::router(state.clone()))
            .with_event_source(move |topic| broadcaster.subscribe(topic.clone()))
            .build()
            .unwrap(),
    )
}

fn order_request() -> CreateOrderInput {
    CreateOrderInput {
        guest_name: "Ada Lovelace".to_string(),
        room_number: "101".to_string(),
        phone: Some("+34-600-000-001".to_string()),
        special_instructions: Some("No onions".to_string()),
        items: vec![
            OrderItemInput {
                menu_item_id: "club-sandwich".to_string(),
                quantity: 2,
            },
            OrderItemInput {
                menu_item_id: "mango-smoothie".to_string(),
                quantity: 1,
            },
        ],
    }
}

#[tokio::test]
async fn test_room_delivery_flow_converges_on_both_sessions() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    let order = channel.create_order(order_request()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, 31.0);

    let (mut dashboard, mut kitchen_events) =
        KitchenDashboardSession::open(channel.clone()).await.unwrap();
    let (mut tracking, mut guest_events) =
        GuestTrackingSession::open(channel.clone(), &order.order_id)
            .await
            .unwrap();

    // Kitchen advances to ready; the guest view follows each push
    for expected in [
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ] {
        dashboard.advance(&order.order_id).await.unwrap();
        assert_eq!(dashboard.rendered_status(&order.order_id), Some(expected));

        let event = guest_events.next().await.unwrap();
        tracking.apply_event(&event);
        assert_eq!(tracking.status(), expected);
    }

    // Ready: the guest chooses room delivery
    assert!(tracking.delivery_choice_open());
    tracking
        .choose_delivery(DeliveryLocation::Room)
        .await
        .unwrap();
    assert!(!tracking.delivery_choice_open());

    // The dashboard learns the choice from the push feed
    while dashboard
        .order(&order.order_id)
        .unwrap()
        .delivery_location
        .is_none()
    {
        let event = kitchen_events.next().await.unwrap();
        dashboard.apply_event(&event).await.unwrap();
    }

    // Delivering, then delivered
    dashboard.advance(&order.order_id).await.unwrap();
    assert_eq!(
        dashboard.rendered_status(&order.order_id),
        Some(OrderStatus::Delivering)
    );
    dashboard.advance(&order.order_id).await.unwrap();
    assert_eq!(
        dashboard.rendered_status(&order.order_id),
        Some(OrderStatus::Delivered)
    );

    while tracking.status() != OrderStatus::Delivered {
        let event = guest_events.next().await.unwrap();
        tracking.apply_event(&event);
    }

    // Delivered orders leave the active view but stay under "completed"
    assert!(dashboard.visible_orders().is_empty());
    dashboard.set_filter(DashboardFilter::Completed);
    assert_eq!(dashboard.visible_orders().len(), 1);
}

#[tokio::test]
async fn test_restaurant_pickup_skips_delivering_end_to_end() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    let order = channel.create_order(order_request()).await.unwrap();
    let (mut dashboard, _kitchen_events) =
        KitchenDashboardSession::open(channel.clone()).await.unwrap();
    let (mut tracking, mut guest_events) =
        GuestTrackingSession::open(channel.clone(), &order.order_id)
            .await
            .unwrap();

    for _ in 0..3 {
        dashboard.advance(&order.order_id).await.unwrap();
        let event = guest_events.next().await.unwrap();
        tracking.apply_event(&event);
    }
    assert_eq!(tracking.status(), OrderStatus::Ready);

    tracking
        .choose_delivery(DeliveryLocation::Restaurant)
        .await
        .unwrap();

    // The delivering step vanishes from the guest progress indicator
    let steps: Vec<OrderStatus> = tracking.progress().iter().map(|(s, _)| *s).collect();
    assert!(!steps.contains(&OrderStatus::Delivering));

    // The kitchen picks up the choice on its next poll
    dashboard.reconcile().await.unwrap();
    dashboard.advance(&order.order_id).await.unwrap();
    assert_eq!(
        dashboard.rendered_status(&order.order_id),
        Some(OrderStatus::Delivered)
    );

    while tracking.status() != OrderStatus::Delivered {
        let event = guest_events.next().await.unwrap();
        tracking.apply_event(&event);
    }
    assert!(tracking
        .order()
        .status_entered_at(OrderStatus::Delivering)
        .is_none());
}

#[tokio::test]
async fn test_two_terminals_racing_one_wins_one_rerenders() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    let order = channel.create_order(order_request()).await.unwrap();

    let (mut terminal_a, _events_a) =
        KitchenDashboardSession::open(channel.clone()).await.unwrap();
    let (mut terminal_b, _events_b) =
        KitchenDashboardSession::open(channel.clone()).await.unwrap();

    // Both operators press advance believing the order is pending
    terminal_a.advance(&order.order_id).await.unwrap();
    terminal_b.advance(&order.order_id).await.unwrap();

    // No double-advance happened, and both terminals show the truth
    let persisted = channel.get_order(&order.order_id).await.unwrap();
    assert_eq!(persisted.status, OrderStatus::Accepted);
    assert_eq!(
        terminal_a.rendered_status(&order.order_id),
        Some(OrderStatus::Accepted)
    );
    assert_eq!(
        terminal_b.rendered_status(&order.order_id),
        Some(OrderStatus::Accepted)
    );
}

#[tokio::test]
async fn test_stale_advance_round_trips_typed_error() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    let order = channel.create_order(order_request()).await.unwrap();
    channel
        .advance(&order.order_id, OrderStatus::Pending)
        .await
        .unwrap();

    let err = channel
        .advance(&order.order_id, OrderStatus::Pending)
        .await
        .unwrap_err();
    match err.as_order_error() {
        Some(OrderError::StaleTransition { expected, actual, .. }) => {
            assert_eq!(*expected, OrderStatus::Pending);
            assert_eq!(*actual, OrderStatus::Accepted);
        }
        other => panic!("expected stale transition, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_round_trips_terminal_state() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    let order = channel.create_order(order_request()).await.unwrap();
    channel.cancel(&order.order_id).await.unwrap();

    let err = channel.cancel(&order.order_id).await.unwrap_err();
    assert!(matches!(
        err.as_order_error(),
        Some(OrderError::TerminalState {
            status: OrderStatus::Cancelled,
            ..
        })
    ));
}

#[tokio::test]
async fn test_guest_contact_lookup_over_http() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    channel.create_order(order_request()).await.unwrap();

    let by_room = channel.list_by_guest_contact("101").await.unwrap();
    assert_eq!(by_room.len(), 1);

    let by_phone = channel
        .list_by_guest_contact("+34-600-000-001")
        .await
        .unwrap();
    assert_eq!(by_phone.len(), 1);

    assert!(channel.list_by_guest_contact("404").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reconciliation_repairs_missed_pushes() {
    let (state, _dir) = test_state();
    let channel = local_channel(&state);

    let order = channel.create_order(order_request()).await.unwrap();
    let (tracking, _guest_events) = GuestTrackingSession::open(channel.clone(), &order.order_id)
        .await
        .unwrap();
    let session = Arc::new(tokio::sync::Mutex::new(tracking));

    // The order moves on while this session's push channel is "down"
    // (events are simply never applied)
    channel
        .advance(&order.order_id, OrderStatus::Pending)
        .await
        .unwrap();
    channel
        .advance(&order.order_id, OrderStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(session.lock().await.status(), OrderStatus::Pending);

    let poller = ReconciliationPoller::new(Duration::from_millis(25));
    let token = poller.shutdown_token();
    let handle = poller.spawn(session.clone());

    // Within a few ticks the poll converges on authoritative state
    tokio::time::sleep(Duration::from_millis(120)).await;
    token.cancel();
    handle.await.unwrap();

    assert_eq!(session.lock().await.status(), OrderStatus::Preparing);
}
