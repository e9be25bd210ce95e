use super::*;
use crate::error::ConfigError;
use crate::model::{AUTH_TOKEN_KEY, EnvironmentBinding, ValueOrRef, VariableBinding};

fn env_binding(name: &str, key: &str) -> EnvironmentBinding {
    EnvironmentBinding {
        name: name.to_owned(),
        key: key.to_owned(),
    }
}

fn var_binding(name: &str, value: ValueOrRef) -> VariableBinding {
    VariableBinding {
        name: name.to_owned(),
        value,
    }
}

fn fake_env(key: &str) -> Option<String> {
    match key {
        "API_HOST" => Some("https://api.test".to_owned()),
        "API_USER" => Some("alice".to_owned()),
        _ => None,
    }
}

#[test]
fn environment_reads_unquoted_keys() -> Result<(), String> {
    let bindings = vec![
        env_binding("host", "\"API_HOST\""),
        env_binding("user", "API_USER"),
    ];
    let resolved =
        resolve_environment_from(&bindings, fake_env).map_err(|err| err.to_string())?;
    if resolved.get("host").map(String::as_str) != Some("https://api.test") {
        return Err(format!("Unexpected host: {:?}", resolved.get("host")));
    }
    if resolved.get("user").map(String::as_str) != Some("alice") {
        return Err(format!("Unexpected user: {:?}", resolved.get("user")));
    }
    Ok(())
}

#[test]
fn environment_reports_missing_key() -> Result<(), String> {
    let bindings = vec![env_binding("token", "API_TOKEN")];
    match resolve_environment_from(&bindings, fake_env) {
        Err(ConfigError::MissingEnvironmentVariable { key }) if key == "API_TOKEN" => Ok(()),
        other => Err(format!("Expected missing API_TOKEN, got {:?}", other)),
    }
}

#[test]
fn variables_see_environment_and_earlier_variables() -> Result<(), String> {
    let environment: Bindings = [("host".to_owned(), "h".to_owned())].into_iter().collect();
    let bindings = vec![
        var_binding("base", ValueOrRef::reference("host")),
        var_binding("copy", ValueOrRef::reference("base")),
        var_binding("lit", ValueOrRef::literal("\"plain\"")),
    ];
    let resolved = resolve_variables(&bindings, &environment).map_err(|err| err.to_string())?;
    if resolved.get("copy").map(String::as_str) != Some("h") {
        return Err(format!("Unexpected copy: {:?}", resolved.get("copy")));
    }
    if resolved.get("lit").map(String::as_str) != Some("plain") {
        return Err(format!("Unexpected literal: {:?}", resolved.get("lit")));
    }
    Ok(())
}

#[test]
fn variables_cannot_forward_reference() -> Result<(), String> {
    let bindings = vec![
        var_binding("first", ValueOrRef::reference("second")),
        var_binding("second", ValueOrRef::literal("x")),
    ];
    match resolve_variables(&bindings, &Bindings::new()) {
        Err(ConfigError::UnresolvedReference { name }) if name == "second" => Ok(()),
        other => Err(format!("Expected unresolved 'second', got {:?}", other)),
    }
}

#[test]
fn merge_rejects_overlapping_names() -> Result<(), String> {
    let environment: Bindings = [("b", "1"), ("a", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
    let variables = environment.clone();
    match merge_contexts(environment, variables) {
        Err(ConfigError::DuplicateBinding { names }) if names == "a, b" => Ok(()),
        other => Err(format!("Expected duplicate a, b, got {:?}", other)),
    }
}

#[test]
fn merge_unions_disjoint_tables() -> Result<(), String> {
    let environment: Bindings = [("a".to_owned(), "1".to_owned())].into_iter().collect();
    let variables: Bindings = [("b".to_owned(), "2".to_owned())].into_iter().collect();
    let context = merge_contexts(environment, variables).map_err(|err| err.to_string())?;
    if context.len() != 2 || context.get("a") != Some("1") || context.get("b") != Some("2") {
        return Err(format!("Unexpected context: {:?}", context));
    }
    Ok(())
}

#[test]
fn target_resolution_distinguishes_absent_and_unbound() -> Result<(), String> {
    let context: Context = [("base", "http://localhost")].into_iter().collect();
    let resolved = resolve_target(Some(&ValueOrRef::reference("base")), &context)
        .map_err(|err| err.to_string())?;
    if resolved.as_deref() != Some("http://localhost") {
        return Err(format!("Unexpected target: {:?}", resolved));
    }
    if resolve_target(None, &context).map_err(|err| err.to_string())?.is_some() {
        return Err("Expected no target".to_owned());
    }
    if !matches!(
        resolve_target(Some(&ValueOrRef::reference("missing")), &context),
        Err(ConfigError::UnresolvedReference { .. })
    ) {
        return Err("Expected unresolved reference".to_owned());
    }
    Ok(())
}

#[test]
fn reserved_insert_refuses_existing_name() -> Result<(), String> {
    let mut context: Context = [(AUTH_TOKEN_KEY, "set")].into_iter().collect();
    match context.insert_reserved(AUTH_TOKEN_KEY, "token".to_owned()) {
        Err(ConfigError::ReservedNameConflict { name }) if name == AUTH_TOKEN_KEY => Ok(()),
        other => Err(format!("Expected reserved conflict, got {:?}", other)),
    }
}

#[test]
fn interpolate_substitutes_every_placeholder() -> Result<(), String> {
    let context: Context = [("a", "x"), ("b", "y")].into_iter().collect();
    let rendered = interpolate("${a}-${b}", &context).map_err(|err| err.to_string())?;
    if rendered != "x-y" {
        return Err(format!("Unexpected render: {}", rendered));
    }
    let quoted = interpolate("\"/users/${a}\"", &context).map_err(|err| err.to_string())?;
    if quoted != "/users/x" {
        return Err(format!("Unexpected quoted render: {}", quoted));
    }
    Ok(())
}

#[test]
fn interpolate_does_not_rescan_substituted_values() -> Result<(), String> {
    let context: Context = [("a", "${b}")].into_iter().collect();
    let rendered = interpolate("/${a}", &context).map_err(|err| err.to_string())?;
    if rendered != "/${b}" {
        return Err(format!("Unexpected render: {}", rendered));
    }
    Ok(())
}

#[test]
fn interpolate_leaves_non_identifiers_alone() -> Result<(), String> {
    let context: Context = [("a", "x")].into_iter().collect();
    let rendered =
        interpolate("/${1x}/${a}/${open", &context).map_err(|err| err.to_string())?;
    if rendered != "/${1x}/x/${open" {
        return Err(format!("Unexpected render: {}", rendered));
    }
    Ok(())
}

#[test]
fn interpolate_fails_on_unknown_name() -> Result<(), String> {
    let context: Context = [("a", "x")].into_iter().collect();
    match interpolate("/${a}/${missing}", &context) {
        Err(ConfigError::UnknownTemplateVariable { name }) if name == "missing" => Ok(()),
        other => Err(format!("Expected unknown variable, got {:?}", other)),
    }
}
