//! End-to-end test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP using ureq. Each request is routed first: a
//! direct route gets an agent without a proxy, a proxied route gets an agent
//! pointed at the planned proxy.

use std::net::SocketAddr;

use gitlab_core::{
    AccessLevel, ApiError, GitLabClient, HttpMethod, HttpRequest, HttpResponse, PatternProxyRoutePlanner,
    ProxyEndpoint, Route, RouteContext, RoutePlanner,
};

/// A port nothing listens on, standing in for an unreachable proxy.
const DEAD_PROXY: (&str, u16) = ("127.0.0.1", 1);

fn start_mock_server() -> SocketAddr {
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
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn agent_for(route: &Route) -> ureq::Agent {
    let proxy = route
        .proxy()
        .map(|p| ureq::Proxy::new(&p.url()).expect("valid proxy URL"));
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .proxy(proxy)
        .build()
        .new_agent()
}

fn with_headers<B>(builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |b, (key, value)| b.header(key.as_str(), value.as_str()))
}

/// Plan the route for `req`, then execute it with ureq.
///
/// 4xx/5xx responses come back as data so the core client interprets them;
/// only transport failures are `Err`.
fn execute(req: HttpRequest, planner: &dyn RoutePlanner) -> Result<HttpResponse, ureq::Error> {
    let host = req.target_host().expect("absolute request URL");
    let route = planner
        .determine_route(&host, &req, &RouteContext::default())
        .expect("routable host");
    let agent = agent_for(&route);
    let body = req.body.as_deref().unwrap_or_default().as_bytes();

    let mut response = match req.method {
        HttpMethod::Get => with_headers(agent.get(&req.url), &req.headers).call(),
        HttpMethod::Post => with_headers(agent.post(&req.url), &req.headers).send(body),
    }?;

    Ok(HttpResponse {
        status: response.status().as_u16(),
        headers: Vec::new(),
        body: response.body_mut().read_to_string().unwrap_or_default(),
    })
}

fn bypassing_planner() -> PatternProxyRoutePlanner {
    PatternProxyRoutePlanner::new(ProxyEndpoint::new(DEAD_PROXY.0, DEAD_PROXY.1), [r"127\.0\.0\.1", "localhost"])
        .unwrap()
}

#[test]
fn session_and_groups_lifecycle() {
    let addr = start_mock_server();
    let planner = bypassing_planner();
    let anonymous = GitLabClient::new(&format!("http://{addr}"));

    // Step 1: groups are off limits without a token.
    let err = anonymous
        .parse_list_groups(execute(anonymous.build_list_groups(), &planner).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    // Step 2: a bad password is rejected.
    let req = anonymous.build_login("username", "wrong").unwrap();
    let err = anonymous.parse_login(execute(req, &planner).unwrap()).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    // Step 3: log in.
    let req = anonymous.build_login("username", "password").unwrap();
    let session = anonymous.parse_login(execute(req, &planner).unwrap()).unwrap();
    assert_eq!(session.username(), "username");
    assert!(!session.is_blocked());

    let client = anonymous.clone().with_private_token(session.private_token());

    // Step 4: list groups.
    let groups = client
        .parse_list_groups(execute(client.build_list_groups(), &planner).unwrap())
        .unwrap();
    assert_eq!(groups.len(), 2);

    // Step 5: fetch a single group.
    let group = client
        .parse_get_group(execute(client.build_get_group(2), &planner).unwrap())
        .unwrap();
    assert_eq!(group, groups[0]);

    // Step 6: list its members.
    let members = client
        .parse_list_group_members(execute(client.build_list_group_members(group.id()), &planner).unwrap(), &group)
        .unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].access_level(), AccessLevel::Owner);
    assert!(members.iter().all(|m| m.group_name() == "groupname"));

    // Step 7: unknown group.
    let err = client
        .parse_get_group(execute(client.build_get_group(99), &planner).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn non_excluded_host_goes_through_the_proxy() {
    let addr = start_mock_server();
    let planner = PatternProxyRoutePlanner::new(ProxyEndpoint::new(DEAD_PROXY.0, DEAD_PROXY.1), ["localhost"]).unwrap();
    let client = GitLabClient::new(&format!("http://{addr}"));

    let req = client.build_login("username", "password").unwrap();
    let route = planner
        .determine_route(&req.target_host().unwrap(), &req, &RouteContext::default())
        .unwrap();
    assert_eq!(route.proxy(), Some(&ProxyEndpoint::new(DEAD_PROXY.0, DEAD_PROXY.1)));

    // The proxy is unreachable, so the request never makes it.
    assert!(execute(req, &planner).is_err());
}
