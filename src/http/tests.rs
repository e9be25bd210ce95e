use std::time::Duration;

use serde_json::{Value, json};

use super::test_support::{
    ScriptedTransport, json_response, run_async_test, unreachable_error,
};
use super::transport::join_target;
use super::*;
use crate::context::Context;
use crate::error::{AuthError, ConfigError, HttpError, StepError};
use crate::metrics::MetricsCollector;
use crate::model::{
    AuthBlock, BodyField, HttpMethod, JsonCheck, Scenario, Step, ValueOrRef,
};

fn request(path: &str) -> Step {
    Step::Request {
        method: HttpMethod::Get,
        path: path.to_owned(),
    }
}

fn expect_json(path: &str, check: JsonCheck) -> Step {
    Step::ExpectJson {
        path: path.to_owned(),
        check,
    }
}

fn scenario(name: &str, steps: Vec<Step>) -> Scenario {
    Scenario {
        name: name.to_owned(),
        steps,
    }
}

fn plan(steps: Vec<Step>) -> Result<ScenarioPlan, String> {
    let context: Context = [("id", "7"), ("owner", "alice")].into_iter().collect();
    ScenarioPlan::compile(&scenario("\"users\"", steps), &context).map_err(|err| err.to_string())
}

fn expectation(path: &str, check: ExpectedJson) -> Result<JsonExpectation, String> {
    Ok(JsonExpectation {
        path_text: path.to_owned(),
        path: compile_json_path(path).map_err(|err| err.to_string())?,
        check,
    })
}

#[test]
fn join_target_appends_to_base_path() -> Result<(), String> {
    let base = reqwest::Url::parse("http://host/api").map_err(|err| err.to_string())?;
    let cases = [
        ("/users/1", "http://host/api/users/1"),
        ("users?page=2", "http://host/api/users?page=2"),
        ("https://other/x", "https://other/x"),
    ];
    for (target, expected) in cases {
        let joined = join_target(&base, target).map_err(|err| err.to_string())?;
        if joined.as_str() != expected {
            return Err(format!("{} joined to {}", target, joined));
        }
    }
    Ok(())
}

#[test]
fn client_options_carry_bearer_token() -> Result<(), String> {
    let options =
        ClientOptions::new("http://localhost", Duration::from_secs(1)).with_bearer("abc");
    if options.bearer_token() != Some("abc") {
        return Err(format!("Unexpected headers: {:?}", options.default_headers));
    }
    Ok(())
}

#[test]
fn plan_interpolates_paths_and_unquotes_names() -> Result<(), String> {
    let plan = plan(vec![request("\"/users/${id}\"")])?;
    if plan.name() != "users" {
        return Err(format!("Unexpected name: {}", plan.name()));
    }
    match plan.steps() {
        [PlannedStep::Request { path, .. }] if path == "/users/7" => Ok(()),
        other => Err(format!("Unexpected steps: {:?}", other)),
    }
}

#[test]
fn plan_rejects_expectation_before_request() -> Result<(), String> {
    match plan(vec![Step::ExpectStatus { code: 200 }, request("/")]) {
        Err(message) if message.contains("before any request") => Ok(()),
        other => Err(format!("Expected authoring error, got {:?}", other.map(|_| ()))),
    }
}

#[test]
fn plan_reports_unknown_template_variable() -> Result<(), String> {
    let context = Context::default();
    match ScenarioPlan::compile(&scenario("s", vec![request("/${nope}")]), &context) {
        Err(ConfigError::UnknownTemplateVariable { name }) if name == "nope" => Ok(()),
        other => Err(format!("Expected unknown variable, got {:?}", other.map(|_| ()))),
    }
}

#[test]
fn json_path_accepts_bare_member_paths() -> Result<(), String> {
    let path = compile_json_path("\"data.token\"").map_err(|err| err.to_string())?;
    let body = json!({"data": {"token": "t"}});
    if path.query(&body).first() != Some(&json!("t")) {
        return Err("Bare path did not resolve from the root".to_owned());
    }
    if compile_json_path("$[").is_ok() {
        return Err("Expected malformed path to fail".to_owned());
    }
    Ok(())
}

#[test]
fn check_status_reports_both_codes() -> Result<(), String> {
    match check_status(200, 500) {
        Err(failure) if failure.to_string() == "Expected status 200, got 500" => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn check_json_applies_each_check_to_first_match() -> Result<(), String> {
    let body = json!({
        "results": [1, 2, 3],
        "owner": "alice",
        "count": 0,
        "meta": {},
        "name": "héllo"
    });

    let passing = [
        expectation("$.results", ExpectedJson::IsArray)?,
        expectation("$.owner", ExpectedJson::NotEmpty)?,
        expectation("$.owner", ExpectedJson::Equals("alice".to_owned()))?,
        expectation("$.results", ExpectedJson::HasSize(3))?,
        expectation("$.name", ExpectedJson::HasSize(5))?,
    ];
    for expectation in &passing {
        check_json(&body, expectation).map_err(|err| err.to_string())?;
    }

    let failing = [
        expectation("$.owner", ExpectedJson::IsArray)?,
        expectation("$.count", ExpectedJson::NotEmpty)?,
        expectation("$.meta", ExpectedJson::NotEmpty)?,
        expectation("$.count", ExpectedJson::Equals("0".to_owned()))?,
        expectation("$.count", ExpectedJson::HasSize(1))?,
        expectation("$.missing", ExpectedJson::NotEmpty)?,
    ];
    for expectation in &failing {
        if check_json(&body, expectation).is_ok() {
            return Err(format!("Expected {} to fail", expectation.path_text));
        }
    }
    Ok(())
}

#[test]
fn has_size_mismatch_describes_both_sizes() -> Result<(), String> {
    let body = json!({"results": [1, 2, 3]});
    let expectation = expectation("$.results", ExpectedJson::HasSize(2))?;
    match check_json(&body, &expectation) {
        Err(failure) if failure.to_string() == "JSON size mismatch, expected: 2, got: 3" => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn iteration_records_success() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::always(200, json!({"ok": true}));
        let plan = plan(vec![request("/health"), Step::ExpectStatus { code: 200 }])?;
        let collector = MetricsCollector::new();

        let outcome = run_scenario_iteration(&transport, &plan, &collector)
            .await
            .map_err(|err| err.to_string())?;

        if !outcome.passed() || outcome.requests != 1 {
            return Err(format!("Unexpected outcome: {:?}", outcome));
        }
        let records = collector.records();
        match records.as_slice() {
            [record] if record.success && record.status_code == 200 && record.path == "/health" => {
                Ok(())
            }
            other => Err(format!("Unexpected records: {:?}", other)),
        }
    })
}

#[test]
fn status_mismatch_marks_request_record_failed() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::always(500, Value::Null);
        let plan = plan(vec![
            request("/health"),
            Step::ExpectStatus { code: 200 },
            request("/never"),
        ])?;
        let collector = MetricsCollector::new();

        let outcome = run_scenario_iteration(&transport, &plan, &collector)
            .await
            .map_err(|err| err.to_string())?;

        if outcome.passed() {
            return Err("Expected failed iteration".to_owned());
        }
        if transport.calls().len() != 1 {
            return Err("Remaining steps should be skipped".to_owned());
        }
        let records = collector.records();
        match records.as_slice() {
            [record]
                if !record.success
                    && record
                        .error
                        .as_deref()
                        .is_some_and(|error| error.contains("200") && error.contains("500")) =>
            {
                Ok(())
            }
            other => Err(format!("Unexpected records: {:?}", other)),
        }
    })
}

#[test]
fn json_assertion_patches_preceding_record() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::always(200, json!({"results": [1, 2, 3]}));
        let plan = plan(vec![
            request("/items"),
            expect_json("$.results", JsonCheck::HasSize { size: 2 }),
        ])?;
        let collector = MetricsCollector::new();

        run_scenario_iteration(&transport, &plan, &collector)
            .await
            .map_err(|err| err.to_string())?;

        let records = collector.records();
        match records.as_slice() {
            [record] if !record.success => {
                let error = record.error.as_deref().unwrap_or_default();
                if error.contains("expected: 2") && error.contains("got: 3") {
                    Ok(())
                } else {
                    Err(format!("Unexpected error text: {}", error))
                }
            }
            other => Err(format!("Expected one failed record, got {:?}", other)),
        }
    })
}

#[test]
fn equals_uses_resolved_reference() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::always(200, json!({"owner": "alice"}));
        let plan = plan(vec![
            request("/items"),
            expect_json(
                "$.owner",
                JsonCheck::Equals {
                    value: ValueOrRef::reference("owner"),
                },
            ),
        ])?;
        let collector = MetricsCollector::new();
        let outcome = run_scenario_iteration(&transport, &plan, &collector)
            .await
            .map_err(|err| err.to_string())?;
        if !outcome.passed() {
            return Err(format!("Unexpected failure: {:?}", outcome.failure));
        }
        Ok(())
    })
}

#[test]
fn transport_failure_records_zero_status_and_stops() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::new(|request| Err(unreachable_error(&request.target)));
        let plan = plan(vec![request("/a"), request("/b")])?;
        let collector = MetricsCollector::new();

        let outcome = run_scenario_iteration(&transport, &plan, &collector)
            .await
            .map_err(|err| err.to_string())?;

        if outcome.requests != 1 || outcome.passed() {
            return Err(format!("Unexpected outcome: {:?}", outcome));
        }
        let records = collector.records();
        match records.as_slice() {
            [record] if !record.success && record.status_code == 0 => Ok(()),
            other => Err(format!("Unexpected records: {:?}", other)),
        }
    })
}

#[test]
fn invalid_json_body_is_an_assertion_failure() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::new(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"<html>".to_vec(),
            })
        });
        let plan = plan(vec![
            request("/page"),
            expect_json("$.x", JsonCheck::NotEmpty),
        ])?;
        let collector = MetricsCollector::new();
        match run_scenario_iteration(&transport, &plan, &collector).await {
            Ok(outcome) if !outcome.passed() => Ok(()),
            Ok(outcome) => Err(format!("Expected failure, got {:?}", outcome)),
            Err(StepError::NoResponseYet { .. }) => Err("Unexpected hard error".to_owned()),
            Err(err) => Err(err.to_string()),
        }
    })
}

fn auth_block(token_path: &str) -> AuthBlock {
    AuthBlock {
        endpoint: ValueOrRef::literal("\"/login\""),
        method: HttpMethod::Post,
        body: vec![
            BodyField {
                name: "username".to_owned(),
                value: ValueOrRef::reference("user"),
            },
            BodyField {
                name: "password".to_owned(),
                value: ValueOrRef::literal("secret"),
            },
        ],
        token_path: token_path.to_owned(),
    }
}

#[test]
fn preflight_extracts_token_and_sends_resolved_body() -> Result<(), String> {
    run_async_test(async {
        let transport = ScriptedTransport::always(200, json!({"data": {"token": "tok-1"}}));
        let context: Context = [("user", "alice")].into_iter().collect();

        let report = run_auth_preflight(&transport, &auth_block("$.data.token"), &context).await;
        let token = report.token.map_err(|err| err.to_string())?;
        if token != "tok-1" || report.endpoint != "/login" || report.method != HttpMethod::Post {
            return Err(format!("Unexpected preflight result: {} {}", token, report.endpoint));
        }

        let calls = transport.calls();
        let call = calls.first().ok_or("No login call")?;
        let expected = json!({"username": "alice", "password": "secret"});
        if call.json_body.as_ref() != Some(&expected) {
            return Err(format!("Unexpected login body: {:?}", call.json_body));
        }
        Ok(())
    })
}

#[test]
fn preflight_failures_are_reported_not_raised() -> Result<(), String> {
    run_async_test(async {
        let context: Context = [("user", "alice")].into_iter().collect();

        let rejected = ScriptedTransport::always(401, json!({"error": "nope"}));
        let report = run_auth_preflight(&rejected, &auth_block("$.token"), &context).await;
        if !matches!(report.token, Err(AuthError::Status { status: 401 })) {
            return Err(format!("Expected status failure, got {:?}", report.token));
        }

        let missing = ScriptedTransport::always(200, json!({"other": "x"}));
        let report = run_auth_preflight(&missing, &auth_block("$.token"), &context).await;
        match report.token {
            Err(err) if err.to_string() == "auth.login token not found using format $.token" => {}
            other => return Err(format!("Expected token miss, got {:?}", other)),
        }

        let empty = ScriptedTransport::always(200, json!({"token": ""}));
        let report = run_auth_preflight(&empty, &auth_block("$.token"), &context).await;
        if !matches!(report.token, Err(AuthError::TokenNotString)) {
            return Err(format!("Expected empty token failure, got {:?}", report.token));
        }

        let control = ScriptedTransport::always(200, json!({"token": "abc\ndef"}));
        let report = run_auth_preflight(&control, &auth_block("$.token"), &context).await;
        if !matches!(report.token, Err(AuthError::TokenNotHeaderSafe)) {
            return Err(format!("Expected header-unsafe token failure, got {:?}", report.token));
        }

        let unbound = Context::default();
        let report = run_auth_preflight(&empty, &auth_block("$.token"), &unbound).await;
        if !matches!(report.token, Err(AuthError::Resolve(_))) {
            return Err(format!("Expected resolution failure, got {:?}", report.token));
        }
        Ok(())
    })
}

#[test]
fn scripted_response_helper_encodes_json() -> Result<(), String> {
    let response = json_response(201, &json!({"id": 1}));
    if !response.is_success() || response.json().map_err(|err| err.to_string())? != json!({"id": 1})
    {
        return Err(format!("Unexpected response: {:?}", response));
    }
    Ok(())
}

#[test]
fn refused_connection_is_reported_as_unreachable() -> Result<(), String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    drop(listener);

    run_async_test(async move {
        let options = ClientOptions::new(format!("http://{}", addr), Duration::from_secs(2));
        let transport = ReqwestTransport::new(&options).map_err(|err| err.to_string())?;

        match transport.execute(HttpRequest::new(HttpMethod::Get, "/ping")).await {
            Err(HttpError::Unreachable { url, reason }) => {
                if !url.ends_with("/ping") || reason.is_empty() {
                    return Err(format!("Unexpected unreachable details: {} / {}", url, reason));
                }
                Ok(())
            }
            other => Err(format!("Expected Unreachable, got {:?}", other)),
        }
    })
}
