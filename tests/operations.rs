mod common;

use common::{FakeTransport, object_row, pairs, param, path_of, query_of};
use locomatix::{
    ActivationState, Callback, Error, Expiry, FeedKey, FenceKey, HttpMethod, LocationFix,
    NameValues, ObjectKey, ObjectRegion, Rectangle, Region, ServerErrorKind, Trigger,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn car_lifecycle_round_trip() {
    let fake = FakeTransport::new();
    fake.ok().ok().success(json!({
        "Location": {
            "Latitude": 37.7749,
            "Longitude": -122.4194,
            "Time": 1_262_304_060,
            "LocationNameValues": [{"Speed": "35"}]
        }
    }));
    let client = fake.client();
    let car = ObjectKey::new("car-a", "cars");

    client
        .create_object(
            &car,
            &NameValues::new().with("Name", "Cab A").with("Phone", "2992992"),
            None,
        )
        .unwrap();
    client
        .update_location(
            &car,
            LocationFix::new(37.7749, -122.4194, 1_262_304_060),
            &NameValues::new().with("Speed", "35"),
        )
        .unwrap();
    let location = client.get_location(&car, false).unwrap().into_data();

    assert_eq!(location.object_id.as_deref(), Some("car-a"));
    assert_eq!(location.feed.as_deref(), Some("cars"));
    assert_eq!(location.latitude, Some(37.7749));
    assert_eq!(location.longitude, Some(-122.4194));
    assert_eq!(location.time, Some(1_262_304_060));
    assert_eq!(location.name_values.get("Speed"), Some("35"));

    let sent = fake.requests();
    assert_eq!(sent.len(), 3);

    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].uri, "/feed/cars/object/car-a/create");
    let body = pairs(sent[0].body.as_deref().unwrap());
    assert_eq!(param(&body, "Name"), Some("Cab A"));
    assert_eq!(param(&body, "Phone"), Some("2992992"));

    assert_eq!(sent[1].method, HttpMethod::Put);
    assert_eq!(sent[1].uri, "/feed/cars/object/car-a/location/update");
    let body = pairs(sent[1].body.as_deref().unwrap());
    assert_eq!(param(&body, "latitude"), Some("37.7749"));
    assert_eq!(param(&body, "longitude"), Some("-122.4194"));
    assert_eq!(param(&body, "time"), Some("1262304060"));
    assert_eq!(param(&body, "Speed"), Some("35"));

    assert_eq!(sent[2].method, HttpMethod::Get);
    assert_eq!(path_of(&sent[2]), "/feed/cars/object/car-a/location/get");
    assert_eq!(param(&query_of(&sent[2]), "allowexpired"), Some("false"));
    assert_eq!(sent[2].body, None);
}

#[test]
fn create_object_with_initial_location_and_ttl() {
    let fake = FakeTransport::new();
    fake.ok();
    let client = fake.client();

    client
        .create_object(
            &ObjectKey::new("car-b", "cars"),
            &NameValues::new(),
            Some(LocationFix::new(10.5, 20.25, 1_000).with_ttl(600)),
        )
        .unwrap();

    let body = pairs(fake.last_request().body.as_deref().unwrap());
    assert_eq!(
        body,
        vec![
            ("latitude".to_string(), "10.5".to_string()),
            ("longitude".to_string(), "20.25".to_string()),
            ("time".to_string(), "1000".to_string()),
            ("ttl".to_string(), "600".to_string()),
        ]
    );
}

#[test]
fn creating_twice_reports_object_already_exists() {
    let fake = FakeTransport::new();
    fake.ok().status("ObjectAlreadyExists");
    let client = fake.client();
    let car = ObjectKey::new("car-a", "cars");

    client.create_object(&car, &NameValues::new(), None).unwrap();
    let err = client
        .create_object(&car, &NameValues::new(), None)
        .unwrap_err();

    assert_eq!(err.server_kind(), Some(ServerErrorKind::ObjectAlreadyExists));
    assert_eq!(err.to_string(), "ObjectAlreadyExists");
    assert_eq!(fake.requests().len(), 2);
}

#[test]
fn ids_are_escaped_in_paths() {
    let fake = FakeTransport::new();
    fake.ok();
    let client = fake.client();

    client
        .delete_object(&ObjectKey::new("taxi 7/b", "city cabs"))
        .unwrap();

    let sent = fake.last_request();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.uri, "/feed/city%20cabs/object/taxi%207%2Fb/delete");
}

#[test]
fn feed_creation_sends_expiries() {
    let fake = FakeTransport::new();
    fake.ok();
    let client = fake.client();

    client
        .create_feed(
            &FeedKey::new("cars"),
            Expiry::Seconds(86_400),
            Expiry::Forever,
            &NameValues::new().with("Fleet", "north"),
        )
        .unwrap();

    let sent = fake.last_request();
    assert_eq!(sent.uri, "/feed/cars/create");
    let body = pairs(sent.body.as_deref().unwrap());
    assert_eq!(param(&body, "objectexpiry"), Some("86400"));
    assert_eq!(param(&body, "locationexpiry"), Some("-1"));
    assert_eq!(param(&body, "Fleet"), Some("north"));
}

#[test]
fn zone_is_created_watching_another_feed() {
    let fake = FakeTransport::new();
    fake.ok();
    let client = fake.client();
    let zone = ObjectKey::new("car-a", "cars").zone("trap-alert");

    client
        .create_zone(
            &zone,
            ObjectRegion::circle(500.0),
            Trigger::Ingress,
            &Callback::url("http://alerts.example.com/hook"),
            &["speedtraps"],
        )
        .unwrap();

    let sent = fake.last_request();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.uri, "/feed/cars/object/car-a/zone/trap-alert/create");
    let body = pairs(sent.body.as_deref().unwrap());
    assert_eq!(param(&body, "region"), Some("Circle"));
    assert_eq!(param(&body, "radius"), Some("500"));
    assert_eq!(param(&body, "trigger"), Some("Ingress"));
    assert_eq!(param(&body, "callbacktype"), Some("url"));
    assert_eq!(
        param(&body, "callbackurl"),
        Some("http://alerts.example.com/hook")
    );
    assert_eq!(param(&body, "predicate"), Some("FROM speedtraps"));
}

#[test]
fn zone_is_decoded_from_get_zone() {
    let fake = FakeTransport::new();
    fake.success(json!({
        "Zone": {
            "ZoneID": "trap-alert",
            "FollowObject": {"ObjectID": "car-a", "Feed": "cars"},
            "Region": {"RegionType": "Circle", "RegionParams": {"Radius": 500}},
            "Trigger": "Ingress",
            "Callback": {"CallbackType": "URL", "CallbackURL": "http://alerts.example.com/hook"},
            "Predicate": "FROM speedtraps",
            "State": "Active"
        }
    }));
    let client = fake.client();

    let zone = client
        .get_zone(&ObjectKey::new("car-a", "cars").zone("trap-alert"))
        .unwrap()
        .into_data();

    assert_eq!(zone.zone_id, "trap-alert");
    assert_eq!(zone.object_id, "car-a");
    assert_eq!(zone.region, ObjectRegion::circle(500.0));
    assert_eq!(zone.trigger, Trigger::Ingress);
    assert_eq!(zone.callback, Callback::url("http://alerts.example.com/hook"));
    assert_eq!(zone.from_feeds, ["speedtraps"]);
    assert_eq!(zone.state, ActivationState::Active);
    assert_eq!(
        path_of(&fake.last_request()),
        "/feed/cars/object/car-a/zone/trap-alert/get"
    );
}

#[test]
fn zone_state_changes_report_server_conflicts() {
    let fake = FakeTransport::new();
    fake.ok().status("ZoneAlreadyActive");
    let client = fake.client();
    let zone = ObjectKey::new("car-a", "cars").zone("z1");

    client.activate_zone(&zone).unwrap();
    let err = client.activate_zone(&zone).unwrap_err();

    assert_eq!(err.server_kind(), Some(ServerErrorKind::ZoneAlreadyActive));
    let sent = fake.last_request();
    assert_eq!(sent.method, HttpMethod::Put);
    assert_eq!(sent.uri, "/feed/cars/object/car-a/zone/z1/activate");
}

#[test]
fn fence_round_trip() {
    let fake = FakeTransport::new();
    fake.ok().success(json!({
        "Fence": {
            "FenceID": "downtown",
            "Region": {
                "RegionType": "Circle",
                "RegionParams": {"Latitude": 37.79, "Longitude": -122.4, "Radius": 1200}
            },
            "Trigger": "IngressAndEgress",
            "Callback": {
                "CallbackType": "ApplePushNotification",
                "ApplePushNotificationInfo": {"Message": "entered", "Sound": "ping", "Token": "t0k"}
            },
            "Predicate": "FROM cars, trucks",
            "State": "Inactive"
        }
    }));
    let client = fake.client();
    let fence = FenceKey::new("downtown");
    let region = Region::circle(37.79, -122.4, 1200.0);
    let callback = Callback::apple_push("entered", "ping", "t0k");

    client
        .create_fence(&fence, &region, Trigger::IngressAndEgress, &callback, &["cars", "trucks"])
        .unwrap();
    let got = client.get_fence(&fence).unwrap().into_data();

    assert_eq!(got.region, region);
    assert_eq!(got.callback, callback);
    assert_eq!(got.trigger, Trigger::IngressAndEgress);
    assert_eq!(got.state, ActivationState::Inactive);
    assert_eq!(got.from_feeds, ["cars", "trucks"]);

    let create = &fake.requests()[0];
    assert_eq!(create.uri, "/fence/downtown/create");
    let body = pairs(create.body.as_deref().unwrap());
    assert_eq!(param(&body, "callbacktype"), Some("applepushnotification"));
    assert_eq!(param(&body, "applepushtoken"), Some("t0k"));
    assert_eq!(param(&body, "latitude"), Some("37.79"));
    assert_eq!(param(&body, "predicate"), Some("FROM cars, trucks"));
}

#[test]
fn histogram_grid_is_row_major() {
    let fake = FakeTransport::new();
    fake.success(json!({
        "HorizontalSlices": 3,
        "VerticalSlices": 2,
        "ObjectGrid": [0, 1, 2, 3, 4, 5]
    }));
    let client = fake.client();

    let grid = client
        .get_histogram(
            &FeedKey::new("cars"),
            Rectangle::new(37.0, -123.0, 38.0, -122.0),
            (3, 2),
            1_000,
            2_000,
        )
        .unwrap()
        .into_data();

    assert_eq!(grid.counts, vec![vec![0, 1, 2], vec![3, 4, 5]]);

    let query = query_of(&fake.last_request());
    assert_eq!(param(&query, "region"), Some("Rectangle"));
    assert_eq!(param(&query, "hslices"), Some("3"));
    assert_eq!(param(&query, "vslices"), Some("2"));
    assert_eq!(param(&query, "starttime"), Some("1000"));
    assert_eq!(param(&query, "endtime"), Some("2000"));
    assert_eq!(param(&query, "fetchsize"), None);
}

#[test]
fn uneven_histogram_grid_is_a_decode_error() {
    let fake = FakeTransport::new();
    fake.success(json!({
        "HorizontalSlices": 4,
        "VerticalSlices": 2,
        "ObjectGrid": [0, 1, 2, 3, 4]
    }));
    let client = fake.client();

    let err = client
        .query_histogram(
            "SELECT *, LOCATION.* FROM cars",
            Rectangle::new(0.0, 0.0, 1.0, 1.0),
            (4, 2),
            0,
            1,
        )
        .unwrap_err();

    assert!(matches!(err, Error::Decode { operation: "get_histogram", .. }));
}

#[test]
fn location_history_reads_older_objects_member() {
    let fake = FakeTransport::new();
    fake.success(json!({
        "Objects": [object_row("car-a", "cars", 1.0, 2.0), object_row("car-a", "cars", 1.5, 2.5)],
        "NextKey": null
    }));
    let client = fake.client();

    let page = client
        .get_location_history(&ObjectKey::new("car-a", "cars"), 100, 200)
        .unwrap()
        .into_data();

    let lats: Vec<_> = page.rows.iter().map(|l| l.latitude).collect();
    assert_eq!(lats, vec![Some(1.0), Some(1.5)]);
    assert!(page.is_last());

    let query = query_of(&fake.last_request());
    assert_eq!(
        param(&query, "predicate"),
        Some("SELECT LOCATION.* FROM cars WITH oid \"car-a\"")
    );
}

#[test]
fn count_query_yields_an_aggregate_page() {
    let fake = FakeTransport::new();
    fake.success(json!({
        "Count": 42,
        "Objects": [object_row("car-a", "cars", 1.0, 2.0)]
    }));
    let client = fake.client();

    let page = client
        .query_objects("SELECT COUNT(*) FROM cars")
        .unwrap()
        .into_data();

    assert!(page.rows.is_empty());
    assert_eq!(page.aggregate.and_then(|a| a.count), Some(42));
}

#[test]
fn repeated_reads_return_the_same_object_and_location() {
    let attributes = json!({
        "Object": {
            "ObjectID": "car-a",
            "Feed": "cars",
            "ObjectNameValues": [{"Name": "Cab A"}, {"License": "2992992"}]
        }
    });
    let location = json!({
        "Location": {
            "Latitude": 37.7749,
            "Longitude": -122.4194,
            "Time": 1_262_304_000,
            "LocationNameValues": [{"Speed": "35"}]
        }
    });
    let fake = FakeTransport::new();
    fake.success(attributes.clone())
        .success(attributes)
        .success(location.clone())
        .success(location);
    let client = fake.client();
    let car = ObjectKey::new("car-a", "cars");

    let first = client.get_attributes(&car).unwrap().into_data();
    let second = client.get_attributes(&car).unwrap().into_data();
    assert_eq!(first, second);
    assert_eq!(first.object_id, "car-a");
    assert_eq!(first.feed, "cars");
    assert_eq!(first.name_values.get("Name"), Some("Cab A"));
    assert_eq!(first.name_values.get("License"), Some("2992992"));
    assert!(first.location.is_none());

    let first = client.get_location(&car, false).unwrap().into_data();
    let second = client.get_location(&car, false).unwrap().into_data();
    assert_eq!(first, second);
    assert_eq!(first.latitude, Some(37.7749));
    assert_eq!(first.time, Some(1_262_304_000));
    assert_eq!(first.name_values.get("Speed"), Some("35"));
    assert_eq!(first.object_id.as_deref(), Some("car-a"));

    let sent = fake.requests();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0], sent[1]);
    assert_eq!(sent[2], sent[3]);
    assert!(sent.iter().all(|r| r.method == HttpMethod::Get));
    assert_eq!(path_of(&sent[0]), "/feed/cars/object/car-a/attributes/get");
    assert_eq!(path_of(&sent[2]), "/feed/cars/object/car-a/location/get");
}
