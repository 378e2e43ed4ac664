//! Create/list lifecycle against the live mock CRM.
//!
//! # Design
//! Starts the mock CRM on a random port, then exercises every core client
//! operation over real HTTP using ureq. Validates that the core's request
//! building and response parsing work end-to-end with an actual server.

use cobj_core::{
    ApiErrorBody, CreateRecord, CrmClient, CrmError, HttpMethod, HttpRequest, HttpResponse,
    ObjectType, PAGE_LIMIT, PROPERTY_SET,
};

const TOKEN: &str = "integration-token";

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(&req.url);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        (HttpMethod::Post, body) => {
            let mut builder = agent.post(&req.url);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse { status, body }
}

fn start_mock_crm() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_crm::run(listener, TOKEN).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn create_and_list_lifecycle() {
    // Step 1: start the mock CRM on a random port.
    let addr = start_mock_crm();
    let client = CrmClient::new(&format!("http://{addr}"), TOKEN);
    let pets = ObjectType::new("pets");

    // Step 2: list, should be empty.
    let req = client.build_list_records(&pets, PROPERTY_SET, PAGE_LIMIT);
    let records = client.parse_list_records(execute(req)).unwrap();
    assert!(records.is_empty(), "expected empty list");

    // Step 3: create a record with two of the three properties.
    let input = CreateRecord::new()
        .with_property("name", "Garfield")
        .with_property("movie", "Garfield the Movie");
    let req = client.build_create_record(&pets, &input).unwrap();
    let created = client.parse_json(execute(req)).unwrap();
    assert_eq!(created["properties"]["name"], "Garfield");
    assert_eq!(created["properties"]["movie"], "Garfield the Movie");

    // Step 4: create a record with no properties at all.
    let req = client.build_create_record(&pets, &CreateRecord::new()).unwrap();
    let empty = client.parse_json(execute(req)).unwrap();
    assert_eq!(empty["properties"], serde_json::json!({}));

    // Step 5: list, both records with the requested property set.
    let req = client.build_list_records(&pets, PROPERTY_SET, PAGE_LIMIT);
    let records = client.parse_list_records(execute(req)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, created["id"]);
    assert_eq!(records[0].property("name"), Some("Garfield"));
    assert_eq!(records[0].property("actor"), None);
    assert_eq!(records[0].properties.len(), PROPERTY_SET.len());

    // Step 6: untyped request through the generic builder.
    let endpoint = format!("{}?limit=1", pets.endpoint());
    let req = client
        .request::<serde_json::Value>(HttpMethod::Get, &endpoint, None)
        .unwrap();
    let value = client.parse_json(execute(req)).unwrap();
    assert_eq!(value["results"].as_array().unwrap().len(), 1);
    assert!(value["paging"]["next"]["after"].is_string());

    // Step 7: a page larger than the CRM allows is rejected.
    let req = client.build_list_records(&pets, PROPERTY_SET, 500);
    let err = client.parse_list_records(execute(req)).unwrap_err();
    assert!(matches!(err, CrmError::Api { status: 400, .. }));
}

#[test]
fn wrong_credential_is_reported_as_structured_api_error() {
    let addr = start_mock_crm();
    let client = CrmClient::new(&format!("http://{addr}"), "not-the-token");

    let req = client.build_list_records(&ObjectType::new("pets"), PROPERTY_SET, PAGE_LIMIT);
    let err = client.parse_list_records(execute(req)).unwrap_err();
    match err {
        CrmError::Api {
            status: 401,
            body: ApiErrorBody::Structured(body),
        } => {
            assert_eq!(body.category.as_deref(), Some("INVALID_AUTHENTICATION"));
            assert!(body.correlation_id.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
