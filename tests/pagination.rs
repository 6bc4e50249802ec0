mod common;

use common::{FakeTransport, object_row, param, query_of};
use locomatix::request::{ListObjects, SearchRegion};
use locomatix::{ErrorMode, FeedKey, Region, ServerErrorKind};
use pretty_assertions::assert_eq;
use serde_json::json;

fn speed_trap() -> Region {
    Region::circle(37.7749, -122.4194, 500.0)
}

#[test]
fn speed_trap_search_walks_every_page() {
    let fake = FakeTransport::new();
    fake.success(json!({
        "Objects": [
            object_row("car-a", "cars", 37.7750, -122.4195),
            object_row("car-b", "cars", 37.7751, -122.4190)
        ],
        "NextKey": "car-b"
    }))
    .success(json!({
        "Objects": [object_row("car-c", "cars", 37.7747, -122.4199)],
        "NextKey": null
    }));
    let client = fake.client();

    let ids = client
        .search_region_iter(&speed_trap(), &["cars"])
        .items()
        .map(|hit| hit.map(|h| h.object_id))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(ids, vec!["car-a", "car-b", "car-c"]);

    let sent = fake.requests();
    assert_eq!(sent.len(), 2);
    let first = query_of(&sent[0]);
    let second = query_of(&sent[1]);
    assert_eq!(param(&first, "startkey"), None);
    assert_eq!(param(&first, "fetchsize"), Some("20"));
    assert_eq!(param(&second, "startkey"), Some("car-b"));
    assert_eq!(
        param(&second, "predicate"),
        Some("SELECT *, LOCATION.* FROM cars")
    );
}

#[test]
fn paging_restarts_from_the_first_page() {
    let fake = FakeTransport::new();
    fake.success(json!({"Objects": [object_row("a", "cars", 0.0, 0.0)], "NextKey": null}));
    let client = fake.client();

    let mut request = ListObjects::feed(&FeedKey::new("cars"));
    request.paging.start_key = Some("stale".into());
    request.paging.fetch_size = 5;

    let pages: Vec<_> = client.paginate(request, ErrorMode::Propagate).collect();

    assert_eq!(pages.len(), 1);
    let query = query_of(&fake.last_request());
    assert_eq!(param(&query, "startkey"), None);
    assert_eq!(param(&query, "fetchsize"), Some("5"));
}

#[test]
fn stop_mode_swallows_a_failing_page() {
    let fake = FakeTransport::new();
    fake.success(json!({"Objects": [object_row("a", "cars", 0.0, 0.0)], "NextKey": "a"}))
        .status("InvalidStartKey");
    let client = fake.client();

    let rows: Vec<_> = client
        .list_objects_iter(&FeedKey::new("cars"))
        .items()
        .collect();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_ok());
    assert_eq!(fake.requests().len(), 2);
}

#[test]
fn propagate_mode_yields_the_error_once() {
    let fake = FakeTransport::new();
    fake.success(json!({"Objects": [object_row("a", "cars", 0.0, 0.0)], "NextKey": "a"}))
        .status("InvalidStartKey");
    let client = fake.client();

    let mut pages = client.paginate(ListObjects::feed(&FeedKey::new("cars")), ErrorMode::Propagate);

    assert!(pages.next().unwrap().is_ok());
    let err = pages.next().unwrap().unwrap_err();
    assert_eq!(err.server_kind(), Some(ServerErrorKind::InvalidStartKey));
    assert!(pages.next().is_none());
    assert_eq!(fake.requests().len(), 2);
}

#[test]
fn stop_mode_ends_on_an_empty_page() {
    let fake = FakeTransport::new();
    fake.success(json!({"Objects": [], "NextKey": "more"}));
    let client = fake.client();

    let pages: Vec<_> = client.search_region_iter(&speed_trap(), &["cars"]).collect();

    assert!(pages.is_empty());
    assert_eq!(fake.requests().len(), 1);
}

#[test]
fn propagate_mode_yields_empty_pages() {
    let fake = FakeTransport::new();
    fake.success(json!({"Objects": [], "NextKey": "more"}))
        .success(json!({"Objects": []}));
    let client = fake.client();

    let pages: Vec<_> = client
        .paginate(SearchRegion::new(speed_trap(), &["cars"]), ErrorMode::Propagate)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.data.rows.is_empty()));
}

#[test]
fn repeated_cursor_stops_iteration() {
    let fake = FakeTransport::new();
    fake.success(json!({"Objects": [object_row("a", "cars", 0.0, 0.0)], "NextKey": "k"}))
        .success(json!({"Objects": [object_row("b", "cars", 0.0, 0.0)], "NextKey": "k"}))
        .success(json!({"Objects": [object_row("c", "cars", 0.0, 0.0)], "NextKey": null}));
    let client = fake.client();

    let rows: Vec<_> = client
        .list_objects_iter(&FeedKey::new("cars"))
        .items()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(fake.pending(), 1);
}

#[test]
fn aggregate_pages_contribute_no_rows() {
    let fake = FakeTransport::new();
    fake.success(json!({"Count": 7, "NextKey": null}));
    let client = fake.client();

    let pages: Vec<_> = client
        .query_objects_iter("SELECT COUNT(*) FROM cars")
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].data.aggregate.as_ref().and_then(|a| a.count), Some(7));
}
