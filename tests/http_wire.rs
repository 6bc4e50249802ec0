//! Drives the real reqwest transport against a local mock server.

use std::net::TcpListener;
use std::time::Duration;

use locomatix::{Client, ClientConfig, Error, FeedKey, LocationFix, NameValues, ObjectKey};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    let url = url::Url::parse(&server.uri()).unwrap();
    ClientConfig::new("1234", "key-abc", "secret-xyz")
        .with_host(url.host_str().unwrap())
        .with_port(url.port().unwrap())
        .with_ssl(false)
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test(flavor = "multi_thread")]
async fn update_location_sends_headers_and_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/feed/cars/object/car-a/location/update"))
        .and(header("lx-custid", "1234"))
        .and(header("lx-custkey", "key-abc"))
        .and(header("lx-secretkey", "secret-xyz"))
        .and(header("lx-apiversion", "0.9"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("latitude=37.5"))
        .and(body_string_contains("longitude=-122.25"))
        .and(body_string_contains("time=1262304000"))
        .and(body_string_contains("Driver=Ann+Lee"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"Status":"Success","ExecutionTime":0.01}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let response = tokio::task::spawn_blocking(move || {
        let client = Client::new(config)?;
        client.update_location(
            &ObjectKey::new("car-a", "cars"),
            LocationFix::new(37.5, -122.25, 1_262_304_000),
            &NameValues::new().with("Driver", "Ann Lee"),
        )
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.message, "Success");
    assert_eq!(response.execution_time, Some(0.01));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_objects_sends_predicate_in_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/object/list"))
        .and(query_param("predicate", "SELECT * FROM cars"))
        .and(query_param("fetchsize", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"Status":"Success","Result":{"Objects":[
                {"ObjectID":"car-a","Feed":"cars","ObjectNameValues":[{"Name":"Cab A"}]}
            ],"NextKey":null}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let page = tokio::task::spawn_blocking(move || {
        Client::new(config)?.list_objects(&FeedKey::new("cars"))
    })
    .await
    .unwrap()
    .unwrap()
    .into_data();

    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].name_values.get("Name"), Some("Cab A"));
    assert!(page.rows[0].location.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/feed/cars/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Status":"FeedNotEmpty"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        Client::new(config)?.delete_feed(&FeedKey::new("cars"))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert_eq!(err.to_string(), "FeedNotEmpty");
}

#[test]
fn refused_connection_becomes_connection_failed() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new("1234", "key-abc", "secret-xyz")
        .with_host("127.0.0.1")
        .with_port(port)
        .with_ssl(false)
        .with_retry(2)
        .with_timeout(Duration::from_secs(2));

    let err = Client::new(config)
        .unwrap()
        .list_feeds()
        .unwrap_err();

    assert!(err.is_transport(), "{err:?}");
    assert!(matches!(err, Error::ConnectionFailed { port: p, .. } if p == port));
}
